pub mod manual;
pub mod scoring;

use std::collections::HashSet;

use tracing::debug;

use crate::config::MIN_AUTO_MATCH_SCORE;
use crate::types::{MarketRecord, MatchedPair};
use manual::{default_mappings, match_with_mappings, ManualMapping};
use scoring::{match_reason, match_score, passes_gates};

/// Pairs Opinion records with Polymarket records describing the same outcome.
///
/// Manual mappings run first; whatever they consume is withheld from the
/// automatic keyword phase. The result is manual pairs followed by automatic
/// pairs in descending score order.
#[derive(Debug, Clone)]
pub struct MarketMatcher {
    mappings: Vec<ManualMapping>,
}

impl Default for MarketMatcher {
    fn default() -> Self {
        Self::new(default_mappings())
    }
}

impl MarketMatcher {
    pub fn new(mappings: Vec<ManualMapping>) -> Self {
        Self { mappings }
    }

    pub fn mappings(&self) -> &[ManualMapping] {
        &self.mappings
    }

    pub fn match_all(&self, opinion: &[MarketRecord], polymarket: &[MarketRecord]) -> Vec<MatchedPair> {
        let manual = match_with_mappings(&self.mappings, opinion, polymarket);

        let used_opinion: HashSet<&str> = manual.iter().map(|p| p.opinion.id.as_str()).collect();
        let used_poly: HashSet<&str> = manual.iter().map(|p| p.polymarket.id.as_str()).collect();

        let remaining_opinion: Vec<MarketRecord> = opinion
            .iter()
            .filter(|r| !used_opinion.contains(r.id.as_str()))
            .cloned()
            .collect();
        let remaining_poly: Vec<MarketRecord> = polymarket
            .iter()
            .filter(|r| !used_poly.contains(r.id.as_str()))
            .cloned()
            .collect();

        let automatic = match_by_keywords(&remaining_opinion, &remaining_poly);

        debug!(
            manual = manual.len(),
            automatic = automatic.len(),
            "[MATCHER] {} manual + {} automatic pairs",
            manual.len(),
            automatic.len(),
        );

        let mut pairs = manual;
        pairs.extend(automatic);
        pairs
    }
}

/// Automatic phase: score every Opinion × Polymarket combination, keep those
/// passing the gates with score ≥ 5, best first, one entry per id pair.
///
/// A record may still appear in several pairs with different partners; one
/// event with several priced options legitimately produces several pairs.
pub fn match_by_keywords(opinion: &[MarketRecord], polymarket: &[MarketRecord]) -> Vec<MatchedPair> {
    let mut accepted = Vec::new();

    for op in opinion {
        for pm in polymarket {
            let score = match_score(op, pm);
            if score < MIN_AUTO_MATCH_SCORE || !passes_gates(op, pm) {
                continue;
            }
            accepted.push(MatchedPair {
                opinion: op.clone(),
                polymarket: pm.clone(),
                match_score: score,
                match_reason: match_reason(op, pm),
            });
        }
    }

    // sort_by is stable: equal scores keep Opinion-major input order.
    accepted.sort_by(|a, b| b.match_score.cmp(&a.match_score));

    let mut seen: HashSet<(String, String)> = HashSet::new();
    accepted.retain(|p| seen.insert((p.opinion.id.clone(), p.polymarket.id.clone())));
    accepted
}
