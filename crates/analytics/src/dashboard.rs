//! The full Observability pipeline over one input snapshot.
//!
//! ```text
//! results + metrics ─► filter ─┬─► aggregator ──┐
//!                              ├─► bucketer     ├─► Dashboard
//!                              └─► statistics ◄─┘
//! ```

use chrono::Utc;
use serde::Serialize;
use voxeval_core::{AnalyticsSnapshot, EvaluationResult, SuccessPolicy, Time, TimeWindow};

use crate::aggregator::{aggregate_metrics, MetricAggregates};
use crate::bucketer::{bucket_by_day, TimeSeriesPoint};
use crate::filter::filter_results;
use crate::stats::{derive_statistics, DerivedStatistics};

/// Everything the Observability views render for one window.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dashboard<'a> {
    /// Window applied
    pub window: TimeWindow,

    /// Clock reading the window was anchored to
    pub computed_at: Time,

    /// Results inside the window, in input order
    pub filtered: Vec<&'a EvaluationResult>,

    /// Per-metric aggregates
    pub aggregates: MetricAggregates,

    /// Daily means, ascending by date
    pub trend: Vec<TimeSeriesPoint>,

    /// Headline statistics
    pub stats: DerivedStatistics,
}

impl<'a> Dashboard<'a> {
    /// Run the pipeline against a fixed clock reading.
    pub fn compute(
        snapshot: &'a AnalyticsSnapshot,
        window: TimeWindow,
        now: Time,
        policy: &SuccessPolicy,
    ) -> Self {
        let filtered = filter_results(&snapshot.results, window, now);
        let completed: Vec<&EvaluationResult> = filtered
            .iter()
            .copied()
            .filter(|r| r.is_scored_completion())
            .collect();

        let aggregates = aggregate_metrics(&completed, &snapshot.metrics);
        let trend = bucket_by_day(&completed, &snapshot.metrics);
        let stats = derive_statistics(&filtered, &snapshot.metrics, &aggregates, policy);

        tracing::debug!(
            "Computed {} dashboard: {} results, {} completed, {} aggregates, {} days",
            window,
            filtered.len(),
            completed.len(),
            aggregates.len(),
            trend.len()
        );

        Self {
            window,
            computed_at: now,
            filtered,
            aggregates,
            trend,
            stats,
        }
    }

    /// Run the pipeline against the wall clock, read once.
    pub fn compute_now(
        snapshot: &'a AnalyticsSnapshot,
        window: TimeWindow,
        policy: &SuccessPolicy,
    ) -> Self {
        Self::compute(snapshot, window, Utc::now(), policy)
    }
}
