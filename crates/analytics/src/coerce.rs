//! Score value coercion.

use voxeval_core::{MetricType, ScoreValue};

/// Convert a scored value to a number according to the metric's type.
///
/// Returns `None` when the value contributes nothing: non-numeric values for
/// numeric metrics, non-finite numbers, and metrics of unknown type. Boolean
/// metrics never drop a value: `true` is 1 and anything else is 0.
pub fn coerce_score(metric_type: MetricType, value: Option<&ScoreValue>) -> Option<f64> {
    match (metric_type, value) {
        (MetricType::Number | MetricType::Rating, Some(ScoreValue::Number(n))) => {
            n.is_finite().then_some(*n)
        }
        (MetricType::Number | MetricType::Rating, Some(ScoreValue::Text(text))) => text
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|n| n.is_finite()),
        (MetricType::Number | MetricType::Rating, Some(ScoreValue::Bool(_)) | None) => None,
        (MetricType::Boolean, Some(ScoreValue::Bool(true))) => Some(1.0),
        (MetricType::Boolean, _) => Some(0.0),
        (MetricType::Unknown, _) => None,
    }
}
