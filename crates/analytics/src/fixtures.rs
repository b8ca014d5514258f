//! Shared test data.

use chrono::{Duration, TimeZone, Utc};
use voxeval_core::{EvaluationResult, MetricScore, MetricType, ResultStatus, Time};

/// Fixed clock for every test: 2024-03-10 12:00 UTC.
pub fn now() -> Time {
    Utc.with_ymd_and_hms(2024, 3, 10, 12, 0, 0).unwrap()
}

/// A result recorded `days_ago` days before [`now`].
pub fn result_at(id: &str, days_ago: f64, status: ResultStatus) -> EvaluationResult {
    let at = now() - Duration::milliseconds((days_ago * 86_400_000.0) as i64);
    EvaluationResult::new(id, at.to_rfc3339(), status)
}

/// A completed result recorded `days_ago` days before [`now`], with an empty score map.
pub fn completed_at(id: &str, days_ago: f64) -> EvaluationResult {
    let mut result = result_at(id, days_ago, ResultStatus::Completed);
    result.metric_scores = Some(Default::default());
    result
}

pub fn rating(value: f64) -> MetricScore {
    MetricScore::new(value, MetricType::Rating)
}

pub fn number(value: f64) -> MetricScore {
    MetricScore::new(value, MetricType::Number)
}

pub fn boolean(value: bool) -> MetricScore {
    MetricScore::new(value, MetricType::Boolean)
}
