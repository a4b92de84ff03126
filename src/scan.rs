use tracing::{debug, info};

use crate::analysis::full_analysis;
use crate::config::{Config, FIRST_CYCLE_PAIR_SAMPLE};
use crate::detector::{ArbitrageDetector, CooldownStore};
use crate::matcher::MarketMatcher;
use crate::types::{AnalyzedOpportunity, MarketRecord, Opportunity};

/// What one scan cycle produced.
#[derive(Debug, Default)]
pub struct ScanOutcome {
    /// Either venue returned nothing; no matching was attempted.
    pub skipped: bool,
    pub matched: usize,
    /// Opportunities the detector reported before dedup.
    pub detected: usize,
    /// Opportunities that survived the cooldown filter.
    pub fresh: usize,
    /// Fresh opportunities that are profitable after fees and clear
    /// `min_profit_percent`, in detector order.
    pub worthy: Vec<AnalyzedOpportunity>,
}

/// match → detect → dedup → analyze → filter, for one pair of venue snapshots.
pub struct ScanPipeline {
    matcher: MarketMatcher,
    detector: ArbitrageDetector,
    cooldown: CooldownStore,
    investment: f64,
    fee_rate: f64,
    min_profit_percent: f64,
    first_cycle: bool,
}

impl ScanPipeline {
    pub fn new(cfg: &Config, matcher: MarketMatcher) -> Self {
        Self {
            matcher,
            detector: ArbitrageDetector::new(cfg.threshold),
            cooldown: CooldownStore::new(cfg.notification_cooldown_ms),
            investment: cfg.analysis_investment,
            fee_rate: cfg.fee_rate,
            min_profit_percent: cfg.min_profit_percent,
            first_cycle: true,
        }
    }

    /// One cycle deduplicated against the wall clock.
    pub fn evaluate(&mut self, opinion: &[MarketRecord], polymarket: &[MarketRecord]) -> ScanOutcome {
        self.evaluate_with(opinion, polymarket, |cooldown, detected| cooldown.filter_new(detected))
    }

    /// One cycle deduplicated at `now_ms`.
    pub fn evaluate_at(
        &mut self,
        opinion: &[MarketRecord],
        polymarket: &[MarketRecord],
        now_ms: u64,
    ) -> ScanOutcome {
        self.evaluate_with(opinion, polymarket, |cooldown, detected| {
            cooldown.filter_new_at(detected, now_ms)
        })
    }

    fn evaluate_with(
        &mut self,
        opinion: &[MarketRecord],
        polymarket: &[MarketRecord],
        dedup: impl FnOnce(&mut CooldownStore, Vec<Opportunity>) -> Vec<Opportunity>,
    ) -> ScanOutcome {
        if opinion.is_empty() || polymarket.is_empty() {
            info!(
                opinion = opinion.len(),
                polymarket = polymarket.len(),
                "[SCAN] missing venue data, skipping cycle",
            );
            return ScanOutcome {
                skipped: true,
                ..Default::default()
            };
        }

        let pairs = self.matcher.match_all(opinion, polymarket);
        info!(matched = pairs.len(), "[SCAN] matched {} pairs", pairs.len());

        if self.first_cycle {
            self.first_cycle = false;
            for (i, pair) in pairs.iter().take(FIRST_CYCLE_PAIR_SAMPLE).enumerate() {
                info!(
                    score = pair.match_score,
                    "[SCAN] pair {}: {} ⇄ {} ({})",
                    i + 1,
                    pair.opinion.full_title,
                    pair.polymarket.full_title,
                    pair.match_reason,
                );
            }
        }

        let detected = self.detector.detect(&pairs);
        let detected_count = detected.len();
        let fresh = dedup(&mut self.cooldown, detected);
        let fresh_count = fresh.len();

        let worthy: Vec<AnalyzedOpportunity> = fresh
            .into_iter()
            .map(|opp| full_analysis(opp, self.investment, self.fee_rate))
            .filter(|a| {
                a.returns.is_profitable && a.returns.net_profit_percent >= self.min_profit_percent
            })
            .collect();

        debug!(
            detected = detected_count,
            fresh = fresh_count,
            worthy = worthy.len(),
            tracked = self.cooldown.tracked(),
            threshold = self.detector.threshold(),
            "[SCAN] cycle evaluated",
        );

        ScanOutcome {
            skipped: false,
            matched: pairs.len(),
            detected: detected_count,
            fresh: fresh_count,
            worthy,
        }
    }
}
