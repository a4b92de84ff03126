//! Shared scan state for the status API.
//! Written by the scan loop and the notifier, read by the HTTP handlers.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use dashmap::DashMap;

use crate::scan::ScanOutcome;
use crate::types::AnalyzedOpportunity;

#[derive(Default)]
pub struct ScanBoard {
    started_at_ms: AtomicU64,
    scans: AtomicU64,
    skipped_scans: AtomicU64,
    errors: AtomicU64,
    notifications_sent: AtomicU64,
    /// Epoch ms of the last completed cycle (0 = none yet).
    last_scan_at_ms: AtomicU64,
    opinion_records: AtomicU64,
    polymarket_records: AtomicU64,
    last_matched_pairs: AtomicU64,
    opportunities_found: AtomicU64,
    /// opportunity key → analysis, replaced wholesale every non-skipped cycle
    latest: DashMap<String, AnalyzedOpportunity>,
}

/// Point-in-time copy of the board counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoardSnapshot {
    pub started_at_ms: u64,
    pub scans: u64,
    pub skipped_scans: u64,
    pub errors: u64,
    pub notifications_sent: u64,
    pub last_scan_at_ms: u64,
    pub opinion_records: u64,
    pub polymarket_records: u64,
    pub last_matched_pairs: u64,
    pub opportunities_found: u64,
}

impl ScanBoard {
    pub fn new(started_at_ms: u64) -> Arc<Self> {
        let board = Self::default();
        board.started_at_ms.store(started_at_ms, Ordering::Relaxed);
        Arc::new(board)
    }

    /// Fold one cycle into the counters. Skipped cycles only bump
    /// `skipped_scans`; everything else keeps the last real scan's values.
    pub fn record_scan(
        &self,
        opinion_records: usize,
        polymarket_records: usize,
        outcome: &ScanOutcome,
        now_ms: u64,
    ) {
        if outcome.skipped {
            self.skipped_scans.fetch_add(1, Ordering::Relaxed);
            return;
        }

        self.scans.fetch_add(1, Ordering::Relaxed);
        self.last_scan_at_ms.store(now_ms, Ordering::Relaxed);
        self.opinion_records.store(opinion_records as u64, Ordering::Relaxed);
        self.polymarket_records.store(polymarket_records as u64, Ordering::Relaxed);
        self.last_matched_pairs.store(outcome.matched as u64, Ordering::Relaxed);
        // Every detected opportunity counts, including ones later deduped or filtered.
        self.opportunities_found
            .fetch_add(outcome.detected as u64, Ordering::Relaxed);

        self.latest.clear();
        for analyzed in &outcome.worthy {
            self.latest.insert(analyzed.opportunity.key(), analyzed.clone());
        }
    }

    /// Returns the error count including this one.
    pub fn record_error(&self) -> u64 {
        self.errors.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub fn add_notifications_sent(&self, n: usize) {
        self.notifications_sent.fetch_add(n as u64, Ordering::Relaxed);
    }

    /// Last cycle's worthy opportunities, best net return first.
    pub fn latest_opportunities(&self) -> Vec<AnalyzedOpportunity> {
        let mut list: Vec<AnalyzedOpportunity> =
            self.latest.iter().map(|e| e.value().clone()).collect();
        list.sort_by(|a, b| {
            b.returns
                .net_profit_percent
                .total_cmp(&a.returns.net_profit_percent)
        });
        list
    }

    pub fn snapshot(&self) -> BoardSnapshot {
        BoardSnapshot {
            started_at_ms: self.started_at_ms.load(Ordering::Relaxed),
            scans: self.scans.load(Ordering::Relaxed),
            skipped_scans: self.skipped_scans.load(Ordering::Relaxed),
            errors: self.errors.load(Ordering::Relaxed),
            notifications_sent: self.notifications_sent.load(Ordering::Relaxed),
            last_scan_at_ms: self.last_scan_at_ms.load(Ordering::Relaxed),
            opinion_records: self.opinion_records.load(Ordering::Relaxed),
            polymarket_records: self.polymarket_records.load(Ordering::Relaxed),
            last_matched_pairs: self.last_matched_pairs.load(Ordering::Relaxed),
            opportunities_found: self.opportunities_found.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::full_analysis;
    use crate::types::{round2, MarketRecord, MatchedPair, Opportunity, Platform, Side, Strategy};

    fn analyzed(op_id: &str, op_price: f64, pm_price: f64) -> AnalyzedOpportunity {
        let total_cost = op_price + pm_price;
        let opp = Opportunity {
            strategy: Strategy::OpinionYesPolyNo,
            pair: MatchedPair {
                opinion: MarketRecord { id: op_id.into(), ..Default::default() },
                polymarket: MarketRecord {
                    platform: Platform::Polymarket,
                    id: "p".into(),
                    ..Default::default()
                },
                match_score: 10,
                match_reason: String::new(),
            },
            opinion_side: Side::Yes,
            polymarket_side: Side::No,
            opinion_price: op_price,
            polymarket_price: pm_price,
            total_cost,
            profit: 1.0 - total_cost,
            profit_percent: round2((1.0 - total_cost) / total_cost * 100.0),
            description: String::new(),
        };
        full_analysis(opp, 100.0, 0.02)
    }

    #[test]
    fn cycle_counters_accumulate() {
        let board = ScanBoard::new(100);
        let outcome = ScanOutcome {
            matched: 4,
            detected: 5,
            fresh: 3,
            worthy: vec![analyzed("a", 0.40, 0.50), analyzed("b", 0.45, 0.50)],
            ..Default::default()
        };
        board.record_scan(12, 30, &outcome, 5_000);
        board.record_scan(0, 30, &ScanOutcome { skipped: true, ..Default::default() }, 6_000);

        let s = board.snapshot();
        assert_eq!(s.started_at_ms, 100);
        assert_eq!(s.scans, 1);
        assert_eq!(s.skipped_scans, 1);
        assert_eq!(s.last_scan_at_ms, 5_000);
        assert_eq!(s.opinion_records, 12);
        assert_eq!(s.last_matched_pairs, 4);
        // Detected, not just the notifiable subset.
        assert_eq!(s.opportunities_found, 5);
    }

    #[test]
    fn skipped_cycle_keeps_previous_opportunities() {
        let board = ScanBoard::new(0);
        let outcome = ScanOutcome {
            worthy: vec![analyzed("a", 0.40, 0.50)],
            ..Default::default()
        };
        board.record_scan(1, 1, &outcome, 1);
        board.record_scan(0, 0, &ScanOutcome { skipped: true, ..Default::default() }, 2);
        assert_eq!(board.latest_opportunities().len(), 1);

        board.record_scan(1, 1, &ScanOutcome::default(), 3);
        assert!(board.latest_opportunities().is_empty());
    }

    #[test]
    fn latest_sorted_by_net_return() {
        let board = ScanBoard::new(0);
        let outcome = ScanOutcome {
            worthy: vec![analyzed("thin", 0.45, 0.50), analyzed("wide", 0.30, 0.50)],
            ..Default::default()
        };
        board.record_scan(1, 1, &outcome, 1);
        let ids: Vec<String> = board
            .latest_opportunities()
            .iter()
            .map(|a| a.opportunity.pair.opinion.id.clone())
            .collect();
        assert_eq!(ids, vec!["wide", "thin"]);
    }

    #[test]
    fn error_count_is_returned() {
        let board = ScanBoard::new(0);
        assert_eq!(board.record_error(), 1);
        assert_eq!(board.record_error(), 2);
        board.add_notifications_sent(3);
        assert_eq!(board.snapshot().notifications_sent, 3);
    }
}
