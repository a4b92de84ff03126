use tracing::debug;

use crate::config::arb_bounds::{
    COST_EPSILON, MAX_PROFIT_PERCENT, MIN_PROFIT_PERCENT, MIN_TOTAL_COST, PERCENT_EPSILON,
    PRICE_FLOOR,
};
use crate::types::{round2, MatchedPair, Opportunity, Side, Strategy};

/// Screens matched pairs for cross-venue arbitrage.
///
/// Each pair is checked for two fixed strategies: Opinion YES + Polymarket NO,
/// and Opinion NO + Polymarket YES. A strategy is reported when its combined
/// cost is in `[0.50, threshold]` and its profit percent is in `[3, 50]`.
#[derive(Debug, Clone, Copy)]
pub struct ArbitrageDetector {
    threshold: f64,
}

impl ArbitrageDetector {
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Opportunities across all pairs, largest absolute profit first.
    pub fn detect(&self, pairs: &[MatchedPair]) -> Vec<Opportunity> {
        let mut opportunities = Vec::new();

        for pair in pairs {
            let op = &pair.opinion;
            let pm = &pair.polymarket;
            if [op.yes_price, op.no_price, pm.yes_price, pm.no_price]
                .iter()
                .any(|&p| p < PRICE_FLOOR)
            {
                debug!(
                    opinion_id = %op.id,
                    polymarket_id = %pm.id,
                    "[DETECTOR] skipping pair with missing quote",
                );
                continue;
            }

            for strategy in [Strategy::OpinionYesPolyNo, Strategy::OpinionNoPolyYes] {
                if let Some(opp) = self.evaluate(pair, strategy) {
                    opportunities.push(opp);
                }
            }
        }

        opportunities.sort_by(|a, b| b.profit.total_cmp(&a.profit));
        opportunities
    }

    fn evaluate(&self, pair: &MatchedPair, strategy: Strategy) -> Option<Opportunity> {
        let (opinion_side, polymarket_side, opinion_price, polymarket_price) = match strategy {
            Strategy::OpinionYesPolyNo => {
                (Side::Yes, Side::No, pair.opinion.yes_price, pair.polymarket.no_price)
            }
            Strategy::OpinionNoPolyYes => {
                (Side::No, Side::Yes, pair.opinion.no_price, pair.polymarket.yes_price)
            }
        };

        let total_cost = opinion_price + polymarket_price;
        if total_cost > self.threshold + COST_EPSILON || total_cost < MIN_TOTAL_COST - COST_EPSILON {
            return None;
        }

        let profit = 1.0 - total_cost;
        // Band applies to the unrounded ratio; rounding is for reporting only.
        let raw_percent = profit / total_cost * 100.0;
        if !(MIN_PROFIT_PERCENT - PERCENT_EPSILON..=MAX_PROFIT_PERCENT + PERCENT_EPSILON)
            .contains(&raw_percent)
        {
            return None;
        }
        let profit_percent = round2(raw_percent);

        Some(Opportunity {
            strategy,
            pair: pair.clone(),
            opinion_side,
            polymarket_side,
            opinion_price,
            polymarket_price,
            total_cost,
            profit,
            profit_percent,
            description: format!(
                "Buy Opinion {opinion_side} @{opinion_price:.3} + buy Polymarket {polymarket_side} @{polymarket_price:.3}"
            ),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{MarketRecord, Platform};

    fn pair(op_yes: f64, op_no: f64, pm_yes: f64, pm_no: f64) -> MatchedPair {
        MatchedPair {
            opinion: MarketRecord {
                platform: Platform::Opinion,
                id: "op".into(),
                yes_price: op_yes,
                no_price: op_no,
                ..Default::default()
            },
            polymarket: MarketRecord {
                platform: Platform::Polymarket,
                id: "pm".into(),
                yes_price: pm_yes,
                no_price: pm_no,
                ..Default::default()
            },
            match_score: 10,
            match_reason: "manual mapping".into(),
        }
    }

    fn detector() -> ArbitrageDetector {
        ArbitrageDetector::new(0.97)
    }

    #[test]
    fn strategy_one_textbook_case() {
        let opps = detector().detect(&[pair(0.40, 0.62, 0.52, 0.50)]);
        assert_eq!(opps.len(), 1);
        let o = &opps[0];
        assert_eq!(o.strategy, Strategy::OpinionYesPolyNo);
        assert_eq!((o.opinion_side, o.polymarket_side), (Side::Yes, Side::No));
        assert!((o.total_cost - 0.90).abs() < 1e-9);
        assert!((o.profit - 0.10).abs() < 1e-9);
        assert_eq!(o.profit_percent, 11.11);
        assert_eq!(o.description, "Buy Opinion YES @0.400 + buy Polymarket NO @0.500");
    }

    #[test]
    fn both_strategies_can_fire_and_sort_by_profit() {
        // S1: 0.45 + 0.45 = 0.90; S2: 0.48 + 0.40 = 0.88.
        let opps = detector().detect(&[pair(0.45, 0.48, 0.40, 0.45)]);
        assert_eq!(opps.len(), 2);
        assert_eq!(opps[0].strategy, Strategy::OpinionNoPolyYes);
        assert_eq!(opps[1].strategy, Strategy::OpinionYesPolyNo);
        assert!(opps[0].profit > opps[1].profit);
    }

    #[test]
    fn sorted_by_dollar_profit_across_pairs() {
        let opps = detector().detect(&[
            pair(0.47, 0.99, 0.99, 0.48), // S1 cost 0.95
            pair(0.40, 0.99, 0.99, 0.45), // S1 cost 0.85
            pair(0.45, 0.99, 0.99, 0.45), // S1 cost 0.90
        ]);
        let costs: Vec<f64> = opps.iter().map(|o| (o.total_cost * 100.0).round() / 100.0).collect();
        assert_eq!(costs, vec![0.85, 0.90, 0.95]);
    }

    #[test]
    fn quote_below_floor_skips_pair() {
        assert!(detector().detect(&[pair(0.40, 0.0005, 0.52, 0.50)]).is_empty());
        assert!(detector().detect(&[pair(0.40, 0.60, 0.0, 0.50)]).is_empty());
    }

    #[test]
    fn threshold_is_inclusive() {
        // 0.40 + 0.57 = 0.97 (within float noise).
        let opps = detector().detect(&[pair(0.40, 0.99, 0.99, 0.57)]);
        assert_eq!(opps.len(), 1);
        assert!((opps[0].total_cost - 0.97).abs() < 1e-9);
    }

    #[test]
    fn just_above_threshold_is_excluded() {
        assert!(detector().detect(&[pair(0.40, 0.99, 0.99, 0.5701)]).is_empty());
    }

    #[test]
    fn degenerate_cheap_quotes_are_rejected() {
        // Cost 0.49 is below the 0.50 floor, even though profit% would be huge.
        assert!(ArbitrageDetector::new(0.99).detect(&[pair(0.24, 0.99, 0.99, 0.25)]).is_empty());
    }

    #[test]
    fn profit_band_lower_edge() {
        let wide = ArbitrageDetector::new(0.99);

        // Exactly 3.00%: cost = 1 / 1.03.
        let at_three = wide.detect(&[pair(0.5, 0.99, 0.99, 1.0 / 1.03 - 0.5)]);
        assert_eq!(at_three.len(), 1);
        assert_eq!(at_three[0].profit_percent, 3.0);

        // 2.99%: cost = 1 / 1.0299.
        assert!(wide.detect(&[pair(0.5, 0.99, 0.99, 1.0 / 1.0299 - 0.5)]).is_empty());
    }

    #[test]
    fn profit_band_upper_edge() {
        let d = detector();

        // Exactly 50.00%: cost = 2/3.
        let at_fifty = d.detect(&[pair(1.0 / 3.0, 0.99, 0.99, 1.0 / 3.0)]);
        assert_eq!(at_fifty.len(), 1);
        assert_eq!(at_fifty[0].profit_percent, 50.0);

        // 50.01%: cost = 1 / 1.5001.
        assert!(d.detect(&[pair(0.3, 0.99, 0.99, 1.0 / 1.5001 - 0.3)]).is_empty());
    }

    #[test]
    fn band_is_checked_before_rounding() {
        // 0.3333 + 0.33335 = 0.66665 → 50.0037%, reported as 50.00 but outside the band.
        assert!(detector().detect(&[pair(0.3333, 0.99, 0.99, 0.33335)]).is_empty());

        // 0.97088 → 2.9993%, reported as 3.00 but outside the band.
        let d = ArbitrageDetector::new(0.975);
        assert!(d.detect(&[pair(0.47088, 0.99, 0.99, 0.5)]).is_empty());
    }

    #[test]
    fn no_pairs_no_opportunities() {
        assert!(detector().detect(&[]).is_empty());
    }
}
