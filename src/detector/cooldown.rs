use std::collections::HashMap;
use std::time::{SystemTime, UNIX_EPOCH};

use tracing::debug;

use crate::config::DEDUP_RETENTION_MS;
use crate::types::Opportunity;

/// Remembers when each opportunity was last emitted so the same arbitrage is
/// not re-notified inside the cooldown window.
///
/// Owned by the scan loop; cycles never overlap so no locking is needed.
/// Entries older than 24 hours are purged after every filter call.
#[derive(Debug)]
pub struct CooldownStore {
    cooldown_ms: u64,
    /// opportunity key → last emission, epoch ms
    last_notified: HashMap<String, u64>,
}

impl CooldownStore {
    pub fn new(cooldown_ms: u64) -> Self {
        Self {
            cooldown_ms,
            last_notified: HashMap::new(),
        }
    }

    /// `filter_new_at` against the wall clock.
    pub fn filter_new(&mut self, opportunities: Vec<Opportunity>) -> Vec<Opportunity> {
        self.filter_new_at(opportunities, now_ms())
    }

    /// Keep opportunities never seen before or last emitted more than
    /// `cooldown_ms` ago, stamping each kept one with `now_ms`.
    pub fn filter_new_at(&mut self, opportunities: Vec<Opportunity>, now_ms: u64) -> Vec<Opportunity> {
        let fresh: Vec<Opportunity> = opportunities
            .into_iter()
            .filter(|opp| {
                let key = opp.key();
                let due = match self.last_notified.get(&key) {
                    None => true,
                    Some(&last) => now_ms.saturating_sub(last) > self.cooldown_ms,
                };
                if due {
                    self.last_notified.insert(key, now_ms);
                }
                due
            })
            .collect();

        self.purge_expired(now_ms);
        fresh
    }

    /// Drop entries older than the 24h retention window. Returns how many went.
    pub fn purge_expired(&mut self, now_ms: u64) -> usize {
        let before = self.last_notified.len();
        self.last_notified
            .retain(|_, &mut last| now_ms.saturating_sub(last) <= DEDUP_RETENTION_MS);
        let purged = before - self.last_notified.len();
        if purged > 0 {
            debug!(purged, remaining = self.last_notified.len(), "[COOLDOWN] purged expired entries");
        }
        purged
    }

    /// Keys currently remembered.
    pub fn tracked(&self) -> usize {
        self.last_notified.len()
    }
}

pub fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}
