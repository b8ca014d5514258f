//! voxeval core data models.
//!
//! This crate defines the records exported by the evaluation backend
//! (results, metric definitions) and the locally owned configuration and
//! alert rules that the analytics layers operate on.

#![warn(missing_docs)]

// Identities
mod id;

// Backend records
mod metric;
mod result;
mod snapshot;

// Local configuration
mod alert;
mod config;
mod window;

// Re-exports
pub use id::*;

pub use metric::{MetricDefinition, MetricRole, MetricType};
pub use result::{EvaluationResult, MetricScore, ResultStatus, ScoreValue};
pub use snapshot::AnalyticsSnapshot;

pub use alert::{AggregateStatistic, AlertRule, AlertTarget, Comparison, NotificationChannel};
pub use config::{AnalyticsConfig, SuccessPolicy, DEFAULT_SUCCESS_NAME_MATCH};
pub use window::{TimeWindow, WindowError};

/// Timestamp type
pub type Time = chrono::DateTime<chrono::Utc>;
