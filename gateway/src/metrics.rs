//! Metrics collection for gateway monitoring.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use cryptoconv_fx::RateDirection;

/// Gateway metrics.
pub struct Metrics {
    /// Conversion requests received.
    pub conversions_requested: AtomicU64,
    /// Conversions completed.
    pub conversions_succeeded: AtomicU64,
    /// Conversions completed through the direct market.
    pub conversions_direct: AtomicU64,
    /// Conversions completed through the inverse market.
    pub conversions_inverse: AtomicU64,
    /// Requests for which neither market exists.
    pub conversions_unsupported: AtomicU64,
    /// Requests that failed on the market data API.
    pub conversions_upstream_failed: AtomicU64,
    /// Requests rejected for bad parameters.
    pub conversions_rejected: AtomicU64,
}

impl Metrics {
    /// Create new metrics instance.
    pub fn new() -> Self {
        Self {
            conversions_requested: AtomicU64::new(0),
            conversions_succeeded: AtomicU64::new(0),
            conversions_direct: AtomicU64::new(0),
            conversions_inverse: AtomicU64::new(0),
            conversions_unsupported: AtomicU64::new(0),
            conversions_upstream_failed: AtomicU64::new(0),
            conversions_rejected: AtomicU64::new(0),
        }
    }

    /// Increment conversion requested.
    pub fn conversion_requested(&self) {
        self.conversions_requested.fetch_add(1, Ordering::Relaxed);
    }

    /// Record conversion success.
    pub fn conversion_succeeded(&self, direction: RateDirection) {
        self.conversions_succeeded.fetch_add(1, Ordering::Relaxed);
        match direction {
            RateDirection::Direct => self.conversions_direct.fetch_add(1, Ordering::Relaxed),
            RateDirection::Inverse => self.conversions_inverse.fetch_add(1, Ordering::Relaxed),
        };
    }

    /// Record unsupported market.
    pub fn conversion_unsupported(&self) {
        self.conversions_unsupported.fetch_add(1, Ordering::Relaxed);
    }

    /// Record market data failure.
    pub fn conversion_upstream_failed(&self) {
        self.conversions_upstream_failed.fetch_add(1, Ordering::Relaxed);
    }

    /// Record rejected request.
    pub fn conversion_rejected(&self) {
        self.conversions_rejected.fetch_add(1, Ordering::Relaxed);
    }

    /// Get current metrics snapshot.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            conversions_requested: self.conversions_requested.load(Ordering::Relaxed),
            conversions_succeeded: self.conversions_succeeded.load(Ordering::Relaxed),
            conversions_direct: self.conversions_direct.load(Ordering::Relaxed),
            conversions_inverse: self.conversions_inverse.load(Ordering::Relaxed),
            conversions_unsupported: self.conversions_unsupported.load(Ordering::Relaxed),
            conversions_upstream_failed: self.conversions_upstream_failed.load(Ordering::Relaxed),
            conversions_rejected: self.conversions_rejected.load(Ordering::Relaxed),
        }
    }

    /// Export metrics in Prometheus format.
    pub fn to_prometheus(&self) -> String {
        let snapshot = self.snapshot();
        format!(
            r#"# HELP cryptoconv_conversions_requested_total Conversion requests received
# TYPE cryptoconv_conversions_requested_total counter
cryptoconv_conversions_requested_total {}

# HELP cryptoconv_conversions_succeeded_total Conversions completed
# TYPE cryptoconv_conversions_succeeded_total counter
cryptoconv_conversions_succeeded_total {}

# HELP cryptoconv_conversions_by_direction_total Conversions completed by market orientation
# TYPE cryptoconv_conversions_by_direction_total counter
cryptoconv_conversions_by_direction_total{{direction="direct"}} {}
cryptoconv_conversions_by_direction_total{{direction="inverse"}} {}

# HELP cryptoconv_conversions_unsupported_total Requests for unlisted markets
# TYPE cryptoconv_conversions_unsupported_total counter
cryptoconv_conversions_unsupported_total {}

# HELP cryptoconv_conversions_upstream_failed_total Requests failed by the market data API
# TYPE cryptoconv_conversions_upstream_failed_total counter
cryptoconv_conversions_upstream_failed_total {}

# HELP cryptoconv_conversions_rejected_total Requests rejected for bad parameters
# TYPE cryptoconv_conversions_rejected_total counter
cryptoconv_conversions_rejected_total {}
"#,
            snapshot.conversions_requested,
            snapshot.conversions_succeeded,
            snapshot.conversions_direct,
            snapshot.conversions_inverse,
            snapshot.conversions_unsupported,
            snapshot.conversions_upstream_failed,
            snapshot.conversions_rejected,
        )
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Snapshot of metrics at a point in time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub conversions_requested: u64,
    pub conversions_succeeded: u64,
    pub conversions_direct: u64,
    pub conversions_inverse: u64,
    pub conversions_unsupported: u64,
    pub conversions_upstream_failed: u64,
    pub conversions_rejected: u64,
}

/// Shared metrics instance.
pub type SharedMetrics = Arc<Metrics>;
