//! Evaluation analytics (Observability views)
//!
//! Time-windowed filtering, per-metric aggregation, daily trend bucketing,
//! and the derived headline statistics. Every function here is pure: the
//! same snapshot, window and clock always produce the same output.

#![warn(missing_docs)]

pub mod filter;
pub mod coerce;
pub mod aggregator;
pub mod bucketer;
pub mod stats;
pub mod dashboard;

pub use filter::filter_results;
pub use coerce::coerce_score;
pub use aggregator::{aggregate_metrics, AggregateMetric, MetricAggregates};
pub use bucketer::{bucket_by_day, day_key, group_by_day, TimeSeriesPoint};
pub use stats::{derive_statistics, find_success_metric, DerivedStatistics, SuccessSource};
pub use dashboard::Dashboard;
pub use voxeval_core::AnalyticsSnapshot;

#[cfg(test)]
pub(crate) mod fixtures;
