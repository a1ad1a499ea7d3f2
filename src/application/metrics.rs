//! Observability counters for the flow-reporting surface.
//!
//! All counters use atomic operations for thread-safe updates and can be
//! queried at any time.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Counters tracking flow-reporting activity.
#[derive(Debug, Clone, Default)]
pub struct Metrics {
    inner: Arc<MetricsInner>,
}

#[derive(Debug, Default)]
struct MetricsInner {
    inflows_recorded: AtomicU64,
    outflows_recorded: AtomicU64,
    outflows_diverted: AtomicU64,
    reports_rejected: AtomicU64,
}

impl Metrics {
    /// Create a zeroed metrics tracker.
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_inflow(&self) {
        self.inner.inflows_recorded.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_outflow(&self) {
        self.inner.outflows_recorded.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_diverted(&self) {
        self.inner.outflows_diverted.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_rejected(&self) {
        self.inner.reports_rejected.fetch_add(1, Ordering::Relaxed);
    }

    /// Inflow reports accepted.
    pub fn inflows_recorded(&self) -> u64 {
        self.inner.inflows_recorded.load(Ordering::Relaxed)
    }

    /// Outflow reports accepted (delivered or diverted).
    pub fn outflows_recorded(&self) -> u64 {
        self.inner.outflows_recorded.load(Ordering::Relaxed)
    }

    /// Outflows routed to recovery instead of the recipient.
    pub fn outflows_diverted(&self) -> u64 {
        self.inner.outflows_diverted.load(Ordering::Relaxed)
    }

    /// Reports refused by an admission guard or rolled back on settlement
    /// failure.
    pub fn reports_rejected(&self) -> u64 {
        self.inner.reports_rejected.load(Ordering::Relaxed)
    }

    /// Consistent point-in-time copy of all counters.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            inflows_recorded: self.inflows_recorded(),
            outflows_recorded: self.outflows_recorded(),
            outflows_diverted: self.outflows_diverted(),
            reports_rejected: self.reports_rejected(),
        }
    }
}

/// Point-in-time copy of the metrics counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MetricsSnapshot {
    pub inflows_recorded: u64,
    pub outflows_recorded: u64,
    pub outflows_diverted: u64,
    pub reports_rejected: u64,
}

impl MetricsSnapshot {
    /// Total accepted flow reports.
    pub fn total_flows(&self) -> u64 {
        self.inflows_recorded + self.outflows_recorded
    }

    /// Fraction of outflows that were diverted, in `0.0..=1.0`.
    pub fn diversion_rate(&self) -> f64 {
        if self.outflows_recorded == 0 {
            0.0
        } else {
            self.outflows_diverted as f64 / self.outflows_recorded as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_accumulate() {
        let metrics = Metrics::new();
        metrics.record_inflow();
        metrics.record_outflow();
        metrics.record_outflow();
        metrics.record_diverted();
        metrics.record_rejected();

        let snap = metrics.snapshot();
        assert_eq!(snap.inflows_recorded, 1);
        assert_eq!(snap.outflows_recorded, 2);
        assert_eq!(snap.outflows_diverted, 1);
        assert_eq!(snap.reports_rejected, 1);
        assert_eq!(snap.total_flows(), 3);
        assert_eq!(snap.diversion_rate(), 0.5);
    }

    #[test]
    fn diversion_rate_with_no_outflows_is_zero() {
        assert_eq!(Metrics::new().snapshot().diversion_rate(), 0.0);
    }

    #[test]
    fn clones_share_counters() {
        let metrics = Metrics::new();
        let clone = metrics.clone();
        clone.record_inflow();
        assert_eq!(metrics.inflows_recorded(), 1);
    }
}
