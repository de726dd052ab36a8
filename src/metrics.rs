// src/metrics.rs
//! Metric names and the Prometheus recorder used by the binary.
//!
//! Library code only emits through the `metrics` facade; without an installed
//! recorder every call is a no-op.

use metrics::{describe_counter, describe_histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;

pub const ASSETS_SCORED: &str = "traction_assets_scored_total";
pub const COMPOSITE_ABSENT: &str = "traction_composite_absent_total";
pub const CATEGORY_ABSENT: &str = "traction_category_absent_total";
pub const SHILL_TIER: &str = "traction_shill_tier_total";
pub const LAG_RECORDS: &str = "traction_lag_records_total";
pub const LAG_TOPICS_DROPPED: &str = "traction_lag_topics_dropped_total";
pub const REPOSITORY_ERRORS: &str = "traction_repository_errors_total";
pub const RUN_MS: &str = "traction_run_ms";

/// One-time metrics registration (so series carry help text on /metrics).
pub fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!(ASSETS_SCORED, "Assets scored by the engine.");
        describe_counter!(
            COMPOSITE_ABSENT,
            "Assets without a measurable composite (no weighted category present)."
        );
        describe_counter!(
            CATEGORY_ABSENT,
            "Absent category signals, labelled by category."
        );
        describe_counter!(SHILL_TIER, "Shill Index classifications, labelled by tier.");
        describe_counter!(LAG_RECORDS, "Elite to retail lag records emitted.");
        describe_counter!(
            LAG_TOPICS_DROPPED,
            "Topics without forward elite to retail propagation."
        );
        describe_counter!(REPOSITORY_ERRORS, "Signal repository fetch errors.");
        describe_histogram!(RUN_MS, "Engine run time in milliseconds.");
    });
}

pub struct Metrics {
    pub handle: PrometheusHandle,
}

impl Metrics {
    /// Install the global Prometheus recorder.
    pub fn install() -> anyhow::Result<Self> {
        let handle = PrometheusBuilder::new().install_recorder()?;
        ensure_metrics_described();
        Ok(Self { handle })
    }

    /// Prometheus exposition text of everything recorded so far.
    pub fn render(&self) -> String {
        self.handle.render()
    }
}
