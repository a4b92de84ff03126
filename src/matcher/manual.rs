use serde::{Deserialize, Serialize};

use crate::config::MANUAL_MATCH_SCORE;
use crate::error::Result;
use crate::keywords::OptionTraits;
use crate::types::{MarketRecord, MatchedPair};

pub const MANUAL_MATCH_REASON: &str = "manual mapping";

/// A known recurring event listed on both venues.
///
/// Opinion records are selected by `parent_title` substring plus exact
/// `period`; Polymarket records by exact `event_slug`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManualMapping {
    pub parent_title: String,
    pub period: String,
    pub event_slug: String,
}

impl ManualMapping {
    pub fn new(parent_title: &str, period: &str, event_slug: &str) -> Self {
        Self {
            parent_title: parent_title.to_string(),
            period: period.to_string(),
            event_slug: event_slug.to_string(),
        }
    }

    fn selects_opinion(&self, record: &MarketRecord) -> bool {
        record.parent_title.contains(&self.parent_title)
            && record.period.as_deref() == Some(self.period.as_str())
    }

    fn selects_polymarket(&self, record: &MarketRecord) -> bool {
        record.event_slug.as_deref() == Some(self.event_slug.as_str())
    }
}

/// Built-in table of central-bank decisions listed on both venues.
pub fn default_mappings() -> Vec<ManualMapping> {
    vec![
        ManualMapping::new("US FOMC Interest Rate", "JAN", "fed-decision-in-january"),
        ManualMapping::new("US FOMC Interest Rate", "MAR", "fed-decision-in-march"),
        ManualMapping::new("ECB Rates Decision (DFR)", "DEC", "ecb-rate-decision"),
        ManualMapping::new("BoJ Rate Decision", "DEC", "boj-rate-decision"),
    ]
}

/// Load a mapping table from a JSON array of `{parent_title, period, event_slug}`.
pub fn load_mappings(path: &str) -> Result<Vec<ManualMapping>> {
    let raw = std::fs::read_to_string(path)?;
    let mappings = serde_json::from_str(&raw)?;
    Ok(mappings)
}

/// Pair options inside each mapped event. Every selected Opinion option gets
/// at most one Polymarket partner.
pub fn match_with_mappings(
    mappings: &[ManualMapping],
    opinion: &[MarketRecord],
    polymarket: &[MarketRecord],
) -> Vec<MatchedPair> {
    let mut pairs = Vec::new();

    for mapping in mappings {
        let candidates: Vec<&MarketRecord> = polymarket
            .iter()
            .filter(|r| mapping.selects_polymarket(r))
            .collect();
        if candidates.is_empty() {
            continue;
        }

        for op in opinion.iter().filter(|r| mapping.selects_opinion(r)) {
            if let Some(pm) = best_option_match(op, &candidates) {
                pairs.push(MatchedPair {
                    opinion: op.clone(),
                    polymarket: pm.clone(),
                    match_score: MANUAL_MATCH_SCORE,
                    match_reason: MANUAL_MATCH_REASON.to_string(),
                });
            }
        }
    }

    pairs
}

/// Exact normalized-title match first, then the first structurally similar option.
fn best_option_match<'a>(
    op: &MarketRecord,
    candidates: &[&'a MarketRecord],
) -> Option<&'a MarketRecord> {
    let op_title = normalize_option_title(&op.title);
    if let Some(exact) = candidates
        .iter()
        .find(|pm| normalize_option_title(&pm.title) == op_title)
    {
        return Some(*exact);
    }

    candidates
        .iter()
        .find(|pm| is_similar_option(&op.title, &pm.title))
        .copied()
}

/// Lowercase, collapse whitespace, fold "no change" and "+" into single tokens.
pub fn normalize_option_title(title: &str) -> String {
    let collapsed = title
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase();
    collapsed
        .replace("no change", "nochange")
        .replace('+', "plus")
}

/// Same bps magnitude with the same direction flags, or both "no change".
pub fn is_similar_option(a: &str, b: &str) -> bool {
    let ta = OptionTraits::of(a);
    let tb = OptionTraits::of(b);

    if let (Some(bps_a), Some(bps_b)) = (&ta.bps, &tb.bps) {
        if bps_a == bps_b && ta.decrease == tb.decrease && ta.increase == tb.increase {
            return true;
        }
    }

    ta.no_change && tb.no_change
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Platform;

    fn opinion(id: &str, parent: &str, period: &str, title: &str) -> MarketRecord {
        MarketRecord {
            platform: Platform::Opinion,
            id: id.to_string(),
            title: title.to_string(),
            parent_title: parent.to_string(),
            period: Some(period.to_string()),
            ..Default::default()
        }
    }

    fn poly(id: &str, slug: &str, title: &str) -> MarketRecord {
        MarketRecord {
            platform: Platform::Polymarket,
            id: id.to_string(),
            title: title.to_string(),
            event_slug: Some(slug.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn normalization_folds_spacing_and_symbols() {
        assert_eq!(normalize_option_title("  50+   BPS  Decrease "), "50plus bps decrease");
        assert_eq!(normalize_option_title("No   Change"), "nochange");
    }

    #[test]
    fn similar_options_need_same_bps_and_direction() {
        assert!(is_similar_option("25 bps decrease", "Fed cuts 25bps (decrease)"));
        assert!(!is_similar_option("25 bps decrease", "25 bps increase"));
        assert!(!is_similar_option("25 bps decrease", "50 bps decrease"));
        assert!(is_similar_option("No change", "Rates unchanged"));
    }

    #[test]
    fn mapping_pairs_options_within_event() {
        let mappings = vec![ManualMapping::new("US FOMC Interest Rate", "MAR", "fed-decision-in-march")];
        let ops = vec![
            opinion("o1", "US FOMC Interest Rate", "MAR", "No change"),
            opinion("o2", "US FOMC Interest Rate", "MAR", "25 bps decrease"),
            opinion("o3", "US FOMC Interest Rate", "JAN", "No change"),
        ];
        let polys = vec![
            poly("p1", "fed-decision-in-march", "25 bps cut (decrease)"),
            poly("p2", "fed-decision-in-march", "No Change"),
            poly("p3", "fed-decision-in-january", "No change"),
        ];

        let pairs = match_with_mappings(&mappings, &ops, &polys);
        let ids: Vec<(&str, &str)> = pairs
            .iter()
            .map(|p| (p.opinion.id.as_str(), p.polymarket.id.as_str()))
            .collect();
        assert_eq!(ids, vec![("o1", "p2"), ("o2", "p1")]);
        assert!(pairs.iter().all(|p| p.match_score == 10));
        assert!(pairs.iter().all(|p| p.match_reason == MANUAL_MATCH_REASON));
    }

    #[test]
    fn unmatched_option_is_left_for_automatic_phase() {
        let mappings = vec![ManualMapping::new("BoJ Rate Decision", "DEC", "boj-rate-decision")];
        let ops = vec![opinion("o1", "BoJ Rate Decision", "DEC", "50 bps increase")];
        let polys = vec![poly("p1", "boj-rate-decision", "25 bps increase")];
        assert!(match_with_mappings(&mappings, &ops, &polys).is_empty());
    }

    #[test]
    fn synthetic_table_replaces_defaults() {
        let mappings = vec![ManualMapping::new("Synthetic", "Q1", "synthetic-slug")];
        let ops = vec![opinion("o1", "Synthetic Event", "Q1", "Yes")];
        let polys = vec![poly("p1", "synthetic-slug", "yes")];
        assert_eq!(match_with_mappings(&mappings, &ops, &polys).len(), 1);
        assert!(match_with_mappings(&default_mappings(), &ops, &polys).is_empty());
    }

    #[test]
    fn mapping_table_round_trips_through_json_file() {
        let path = std::env::temp_dir().join(format!("crossvenue-mappings-{}.json", std::process::id()));
        std::fs::write(
            &path,
            r#"[{"parent_title":"ECB Rates Decision (DFR)","period":"DEC","event_slug":"ecb-rate-decision"}]"#,
        )
        .unwrap();
        let loaded = load_mappings(path.to_str().unwrap()).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(loaded, vec![ManualMapping::new("ECB Rates Decision (DFR)", "DEC", "ecb-rate-decision")]);
    }
}
