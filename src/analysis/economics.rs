use crate::config::liquidity_thresholds::{HIGH_MIN_VOLUME, MEDIUM_MIN_VOLUME};
use crate::types::{
    round2, AnalyzedOpportunity, ExpectedReturn, LiquidityProfile, LiquidityRating, Opportunity,
    Recommendation,
};

/// Net-return threshold (%) above which an opportunity is recommended outright.
const RECOMMEND_NET_PERCENT: f64 = 3.0;

/// Fee-adjusted economics of buying both legs with `investment` dollars.
///
/// Shares are bought at `total_cost` per pair of legs; each leg pays
/// `fee_rate` on the share of the investment spent on it.
pub fn expected_return(opportunity: &Opportunity, investment: f64, fee_rate: f64) -> ExpectedReturn {
    let total_cost = opportunity.total_cost;
    let shares = investment / total_cost;
    let gross_profit = shares * opportunity.profit;

    let opinion_fee = investment * (opportunity.opinion_price / total_cost) * fee_rate;
    let polymarket_fee = investment * (opportunity.polymarket_price / total_cost) * fee_rate;
    let fees = opinion_fee + polymarket_fee;

    let net_profit = gross_profit - fees;

    ExpectedReturn {
        investment,
        shares,
        gross_profit,
        fees,
        net_profit,
        net_profit_percent: round2(net_profit / investment * 100.0),
        is_profitable: net_profit > 0.0,
    }
}

pub fn liquidity(opportunity: &Opportunity) -> LiquidityProfile {
    let opinion_volume = opportunity.pair.opinion.volume;
    let polymarket_volume = opportunity.pair.polymarket.volume;

    let rating = if opinion_volume > HIGH_MIN_VOLUME && polymarket_volume > HIGH_MIN_VOLUME {
        LiquidityRating::High
    } else if opinion_volume > MEDIUM_MIN_VOLUME && polymarket_volume > MEDIUM_MIN_VOLUME {
        LiquidityRating::Medium
    } else {
        LiquidityRating::Low
    };

    LiquidityProfile {
        opinion_volume,
        polymarket_volume,
        polymarket_liquidity: opportunity.pair.polymarket.liquidity,
        rating,
    }
}

pub fn recommendation(returns: &ExpectedReturn, liquidity: &LiquidityProfile) -> Recommendation {
    if !returns.is_profitable {
        Recommendation::NotProfitable
    } else if liquidity.rating == LiquidityRating::Low {
        Recommendation::LowLiquidity
    } else if returns.net_profit_percent > RECOMMEND_NET_PERCENT {
        Recommendation::Recommended
    } else {
        Recommendation::Marginal
    }
}

/// Bundle returns, liquidity and recommendation. Never drops the opportunity.
pub fn full_analysis(opportunity: Opportunity, investment: f64, fee_rate: f64) -> AnalyzedOpportunity {
    let returns = expected_return(&opportunity, investment, fee_rate);
    let liquidity = liquidity(&opportunity);
    let recommendation = recommendation(&returns, &liquidity);
    AnalyzedOpportunity {
        opportunity,
        returns,
        liquidity,
        recommendation,
    }
}
