//! Metric definitions - the scoring dimensions attached to results.

use serde::{Deserialize, Serialize};
use crate::id::MetricId;

/// A named, typed scoring dimension.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricDefinition {
    /// Backend identifier
    pub id: MetricId,

    /// Display name
    pub name: String,

    /// Optional description shown alongside the metric
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Value type
    pub metric_type: MetricType,

    /// Whether this metric takes part in aggregation and trend views
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Declared role, if this metric has a platform-wide meaning
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<MetricRole>,
}

fn default_enabled() -> bool {
    true
}

impl MetricDefinition {
    /// Create an enabled metric without a role.
    pub fn new(id: impl Into<MetricId>, name: impl Into<String>, metric_type: MetricType) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: None,
            metric_type,
            enabled: true,
            role: None,
        }
    }

    /// Set the enabled flag.
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Set the declared role.
    pub fn with_role(mut self, role: MetricRole) -> Self {
        self.role = Some(role);
        self
    }

    /// Whether this metric is charted in daily trends.
    pub fn is_trend_metric(&self) -> bool {
        matches!(self.metric_type, MetricType::Number | MetricType::Rating)
    }
}

/// Metric value types.
///
/// `Rating` values arrive normalized to `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MetricType {
    /// Unbounded numeric value
    Number,
    /// Pass/fail
    Boolean,
    /// Normalized score
    Rating,
    /// Any type string this build does not know about
    #[serde(other)]
    Unknown,
}

impl MetricType {
    /// Get string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricType::Number => "number",
            MetricType::Boolean => "boolean",
            MetricType::Rating => "rating",
            MetricType::Unknown => "unknown",
        }
    }
}

/// Well-known roles a metric can be tagged with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricRole {
    /// The platform's canonical "was the caller's problem solved" metric
    SuccessIndicator,
}
