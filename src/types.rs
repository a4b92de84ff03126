use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

// ---------------------------------------------------------------------------
// Market records
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    #[default]
    Opinion,
    Polymarket,
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Platform::Opinion => "opinion",
            Platform::Polymarket => "polymarket",
        };
        write!(f, "{s}")
    }
}

/// One tradable binary outcome on one venue, normalized from the venue payload.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MarketRecord {
    pub platform: Platform,
    /// Venue-scoped id, unique per platform within one scan.
    pub id: String,
    /// The outcome option, e.g. "25 bps decrease".
    pub title: String,
    /// The event the option belongs to, e.g. "US FOMC Interest Rate".
    pub parent_title: String,
    pub full_title: String,
    /// Opinion only, e.g. "MAR".
    pub period: Option<String>,
    /// Opinion only, e.g. "US".
    pub country_code: Option<String>,
    /// Polymarket only.
    pub event_slug: Option<String>,
    /// Polymarket only.
    pub slug: Option<String>,
    pub yes_price: f64,
    pub no_price: f64,
    pub volume: f64,
    pub liquidity: f64,
    /// Lowercase matching tokens.
    pub keywords: BTreeSet<String>,
}

// ---------------------------------------------------------------------------
// Matching
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct MatchedPair {
    pub opinion: MarketRecord,
    pub polymarket: MarketRecord,
    pub match_score: u32,
    pub match_reason: String,
}

// ---------------------------------------------------------------------------
// Opportunities
// ---------------------------------------------------------------------------

/// Which pair of opposing legs is bought.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Buy YES on Opinion, NO on Polymarket.
    OpinionYesPolyNo,
    /// Buy NO on Opinion, YES on Polymarket.
    OpinionNoPolyYes,
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Strategy::OpinionYesPolyNo => "opinion_yes_poly_no",
            Strategy::OpinionNoPolyYes => "opinion_no_poly_yes",
        };
        write!(f, "{s}")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Side {
    Yes,
    No,
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Side::Yes => write!(f, "YES"),
            Side::No => write!(f, "NO"),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Opportunity {
    pub strategy: Strategy,
    pub pair: MatchedPair,
    pub opinion_side: Side,
    pub polymarket_side: Side,
    pub opinion_price: f64,
    pub polymarket_price: f64,
    pub total_cost: f64,
    /// Dollars per $1 notional.
    pub profit: f64,
    /// `profit / total_cost * 100`, rounded to 2 decimals.
    pub profit_percent: f64,
    pub description: String,
}

impl Opportunity {
    /// Dedup key: `{opinion_id}-{polymarket_id}-{strategy}`.
    pub fn key(&self) -> String {
        format!(
            "{}-{}-{}",
            self.pair.opinion.id, self.pair.polymarket.id, self.strategy
        )
    }
}

// ---------------------------------------------------------------------------
// Economics
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LiquidityRating {
    High,
    Medium,
    Low,
}

impl std::fmt::Display for LiquidityRating {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            LiquidityRating::High => "HIGH",
            LiquidityRating::Medium => "MEDIUM",
            LiquidityRating::Low => "LOW",
        };
        write!(f, "{s}")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Recommendation {
    /// Fees eat the whole spread.
    NotProfitable,
    /// Profitable on paper but at least one venue is thin.
    LowLiquidity,
    Recommended,
    /// Profitable, but the net margin is small.
    Marginal,
}

impl std::fmt::Display for Recommendation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Recommendation::NotProfitable => "⚠️ Not profitable after fees",
            Recommendation::LowLiquidity => "⚠️ Low liquidity, trade with caution",
            Recommendation::Recommended => "✅ Recommended",
            Recommendation::Marginal => "🔍 Worth a look, thin margin",
        };
        write!(f, "{s}")
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ExpectedReturn {
    pub investment: f64,
    pub shares: f64,
    pub gross_profit: f64,
    pub fees: f64,
    pub net_profit: f64,
    /// Rounded to 2 decimals.
    pub net_profit_percent: f64,
    pub is_profitable: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct LiquidityProfile {
    pub opinion_volume: f64,
    pub polymarket_volume: f64,
    pub polymarket_liquidity: f64,
    pub rating: LiquidityRating,
}

#[derive(Debug, Clone, Serialize)]
pub struct AnalyzedOpportunity {
    #[serde(flatten)]
    pub opportunity: Opportunity,
    pub returns: ExpectedReturn,
    pub liquidity: LiquidityProfile,
    pub recommendation: Recommendation,
}

/// Round to 2 decimal places, the precision percentages are reported at.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opportunity_key_combines_ids_and_strategy() {
        let pair = MatchedPair {
            opinion: MarketRecord { id: "op1".into(), ..Default::default() },
            polymarket: MarketRecord {
                platform: Platform::Polymarket,
                id: "pm9".into(),
                ..Default::default()
            },
            match_score: 10,
            match_reason: "manual mapping".into(),
        };
        let opp = Opportunity {
            strategy: Strategy::OpinionNoPolyYes,
            pair,
            opinion_side: Side::No,
            polymarket_side: Side::Yes,
            opinion_price: 0.4,
            polymarket_price: 0.5,
            total_cost: 0.9,
            profit: 0.1,
            profit_percent: 11.11,
            description: String::new(),
        };
        assert_eq!(opp.key(), "op1-pm9-opinion_no_poly_yes");
    }

    #[test]
    fn round2_rounds_half_away_from_zero() {
        assert_eq!(round2(11.111_111), 11.11);
        assert_eq!(round2(2.995_000_1), 3.0);
        assert_eq!(round2(0.0), 0.0);
    }
}
