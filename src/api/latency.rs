//! In-memory latency histogram for scan-cycle instrumentation.
//! Records wall time from the start of the venue fetches to the end of evaluation.

use std::sync::Mutex;
use std::time::Duration;

use crate::error::{AppError, Result};

/// Shared latency stats. Scan loop records, API reads.
/// Values stored in milliseconds.
pub struct LatencyStats {
    inner: Mutex<hdrhistogram::Histogram<u64>>,
}

impl LatencyStats {
    /// Tracks 1ms to 10 minutes, 3 significant figures.
    pub fn new() -> Result<Self> {
        let histogram = hdrhistogram::Histogram::new_with_bounds(1, 600_000, 3)
            .map_err(|e| AppError::Config(format!("latency histogram: {e}")))?;
        Ok(Self {
            inner: Mutex::new(histogram),
        })
    }

    pub fn record_ms(&self, ms: u64) {
        if let Ok(mut h) = self.inner.lock() {
            let _ = h.record(ms.max(1));
        }
    }

    pub fn record(&self, d: Duration) {
        let ms = d.as_millis().min(u128::from(u64::MAX)) as u64;
        self.record_ms(ms);
    }

    /// Return (p50_ms, p95_ms, p99_ms). None if no samples.
    pub fn percentiles(&self) -> (Option<u64>, Option<u64>, Option<u64>) {
        let Ok(h) = self.inner.lock() else {
            return (None, None, None);
        };
        if h.len() == 0 {
            return (None, None, None);
        }
        (
            Some(h.value_at_quantile(0.5)),
            Some(h.value_at_quantile(0.95)),
            Some(h.value_at_quantile(0.99)),
        )
    }

    pub fn max_ms(&self) -> Option<u64> {
        let h = self.inner.lock().ok()?;
        (h.len() > 0).then(|| h.max())
    }

    pub fn len(&self) -> u64 {
        self.inner.lock().map(|h| h.len()).unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_histogram_has_no_percentiles() {
        let stats = LatencyStats::new().unwrap();
        assert_eq!(stats.percentiles(), (None, None, None));
        assert_eq!(stats.max_ms(), None);
        assert_eq!(stats.len(), 0);
    }

    #[test]
    fn percentiles_follow_recorded_cycles() {
        let stats = LatencyStats::new().unwrap();
        for ms in 1..=100 {
            stats.record_ms(ms);
        }
        let (p50, p95, p99) = stats.percentiles();
        assert_eq!(p50, Some(50));
        assert_eq!(p95, Some(95));
        assert_eq!(p99, Some(99));
        assert_eq!(stats.max_ms(), Some(100));
    }

    #[test]
    fn sub_millisecond_cycles_count_as_one() {
        let stats = LatencyStats::new().unwrap();
        stats.record(Duration::from_micros(300));
        assert_eq!(stats.len(), 1);
        assert_eq!(stats.max_ms(), Some(1));
    }
}
