//! Identifiers for voxeval entities.
//!
//! Results and metrics are keyed by ids the backend hands out; alert rules
//! are created locally and get a ULID.

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use ulid::Ulid;

/// Backend identifier of an evaluation result.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResultId(String);

impl ResultId {
    /// Wrap a backend id.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The raw id.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ResultId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for ResultId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl std::fmt::Display for ResultId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Backend identifier of a metric definition.
///
/// Also the key of [`crate::EvaluationResult::metric_scores`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MetricId(String);

impl MetricId {
    /// Wrap a backend id.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The raw id.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for MetricId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for MetricId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl Borrow<str> for MetricId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for MetricId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Unique identifier for an AlertRule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AlertRuleId(Ulid);

impl AlertRuleId {
    /// Generate a new AlertRuleId
    pub fn new() -> Self {
        Self(Ulid::new())
    }
}

impl Default for AlertRuleId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for AlertRuleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl std::str::FromStr for AlertRuleId {
    type Err = ulid::DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.parse()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_metric_id_lookup_by_str() {
        let mut map = HashMap::new();
        map.insert(MetricId::from("m1"), 1);
        assert_eq!(map.get("m1"), Some(&1));
        assert_eq!(map.get("m2"), None);
    }

    #[test]
    fn test_metric_id_serializes_as_plain_string() {
        let json = serde_json::to_string(&MetricId::from("m1")).unwrap();
        assert_eq!(json, "\"m1\"");
    }

    #[test]
    fn test_alert_rule_id_roundtrips_through_display() {
        let id = AlertRuleId::new();
        let parsed: AlertRuleId = id.to_string().parse().unwrap();
        assert_eq!(id, parsed);
    }
}
