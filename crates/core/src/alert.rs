//! Alert model - metric thresholds and where to send notifications.

use serde::{Deserialize, Serialize};

use crate::id::{AlertRuleId, MetricId};
use crate::window::TimeWindow;
use crate::Time;

/// A threshold alert over one derived statistic.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertRule {
    /// Unique identifier
    pub id: AlertRuleId,

    /// Rule name
    pub name: String,

    /// Statistic being watched
    pub target: AlertTarget,

    /// How the observed value is compared to the threshold
    pub comparison: Comparison,

    /// Threshold value
    pub threshold: f64,

    /// Window the statistic is computed over
    #[serde(default)]
    pub window: TimeWindow,

    /// Disabled rules are never evaluated
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Where to deliver the alert when it fires
    #[serde(default)]
    pub channels: Vec<NotificationChannel>,

    /// When created
    pub created_at: Time,
}

fn default_enabled() -> bool {
    true
}

impl AlertRule {
    /// Create an enabled rule over the default window with no channels.
    pub fn new(
        name: impl Into<String>,
        target: AlertTarget,
        comparison: Comparison,
        threshold: f64,
    ) -> Self {
        Self {
            id: AlertRuleId::new(),
            name: name.into(),
            target,
            comparison,
            threshold,
            window: TimeWindow::default(),
            enabled: true,
            channels: Vec::new(),
            created_at: chrono::Utc::now(),
        }
    }

    /// Set the window.
    pub fn with_window(mut self, window: TimeWindow) -> Self {
        self.window = window;
        self
    }

    /// Add a notification channel.
    pub fn add_channel(mut self, channel: NotificationChannel) -> Self {
        self.channels.push(channel);
        self
    }

    /// Human-readable condition, e.g. `success rate below 80`.
    pub fn describe(&self) -> String {
        format!(
            "{} {} {}",
            self.target.describe(),
            self.comparison.as_str(),
            self.threshold
        )
    }
}

/// Statistic an alert watches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AlertTarget {
    /// One statistic of a metric's aggregate
    Metric {
        /// Metric to watch
        metric_id: MetricId,
        /// Which aggregate statistic
        statistic: AggregateStatistic,
    },

    /// Success rate percentage
    SuccessRate,

    /// Overall score
    OverallScore,

    /// Mean call duration in seconds
    AverageDuration,

    /// Number of failed results
    FailedCount,
}

impl AlertTarget {
    /// Short description for messages.
    pub fn describe(&self) -> String {
        match self {
            AlertTarget::Metric { metric_id, statistic } => {
                format!("{} of metric {}", statistic.as_str(), metric_id)
            }
            AlertTarget::SuccessRate => "success rate".to_string(),
            AlertTarget::OverallScore => "overall score".to_string(),
            AlertTarget::AverageDuration => "average duration".to_string(),
            AlertTarget::FailedCount => "failed count".to_string(),
        }
    }
}

/// Aggregate statistics an alert can read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AggregateStatistic {
    /// Mean value
    Average,
    /// Smallest value
    Min,
    /// Largest value
    Max,
    /// Number of values
    Count,
}

impl AggregateStatistic {
    /// Get string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            AggregateStatistic::Average => "average",
            AggregateStatistic::Min => "min",
            AggregateStatistic::Max => "max",
            AggregateStatistic::Count => "count",
        }
    }
}

impl std::str::FromStr for AggregateStatistic {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "average" | "avg" => Ok(AggregateStatistic::Average),
            "min" => Ok(AggregateStatistic::Min),
            "max" => Ok(AggregateStatistic::Max),
            "count" => Ok(AggregateStatistic::Count),
            other => Err(format!("unknown statistic '{}'", other)),
        }
    }
}

/// Threshold comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Comparison {
    /// Strictly greater
    Above,
    /// Greater or equal
    AtOrAbove,
    /// Strictly less
    Below,
    /// Less or equal
    AtOrBelow,
}

impl Comparison {
    /// Whether `observed` breaches `threshold`.
    pub fn holds(&self, observed: f64, threshold: f64) -> bool {
        match self {
            Comparison::Above => observed > threshold,
            Comparison::AtOrAbove => observed >= threshold,
            Comparison::Below => observed < threshold,
            Comparison::AtOrBelow => observed <= threshold,
        }
    }

    /// Get string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Comparison::Above => "above",
            Comparison::AtOrAbove => "at or above",
            Comparison::Below => "below",
            Comparison::AtOrBelow => "at or below",
        }
    }
}

/// Channel for delivering alert notifications.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NotificationChannel {
    /// Log through tracing
    Console,

    /// Generic webhook receiving the alert as JSON
    Webhook {
        /// Endpoint URL
        url: String,
    },

    /// Slack incoming webhook
    Slack {
        /// Incoming webhook URL
        webhook: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_comparison_boundaries() {
        assert!(Comparison::Above.holds(0.81, 0.8));
        assert!(!Comparison::Above.holds(0.8, 0.8));
        assert!(Comparison::AtOrAbove.holds(0.8, 0.8));
        assert!(Comparison::Below.holds(79.9, 80.0));
        assert!(!Comparison::Below.holds(80.0, 80.0));
        assert!(Comparison::AtOrBelow.holds(80.0, 80.0));
    }

    #[test]
    fn test_target_wire_format() {
        let target = AlertTarget::Metric {
            metric_id: MetricId::from("m1"),
            statistic: AggregateStatistic::Average,
        };
        let json = serde_json::to_value(&target).unwrap();
        assert_eq!(json["kind"], "metric");
        assert_eq!(json["metric_id"], "m1");
        assert_eq!(json["statistic"], "average");

        let parsed: AlertTarget = serde_json::from_str(r#"{"kind": "success_rate"}"#).unwrap();
        assert_eq!(parsed, AlertTarget::SuccessRate);
    }

    #[test]
    fn test_rule_description() {
        let rule = AlertRule::new("low success", AlertTarget::SuccessRate, Comparison::Below, 80.0);
        assert_eq!(rule.describe(), "success rate below 80");
        assert!(rule.enabled);
        assert_eq!(rule.window, TimeWindow::SevenDays);
    }

    #[test]
    fn test_channel_wire_format() {
        let channel: NotificationChannel =
            serde_json::from_str(r#"{"type": "webhook", "url": "https://hooks.example.com/a"}"#).unwrap();
        assert_eq!(
            channel,
            NotificationChannel::Webhook { url: "https://hooks.example.com/a".to_string() }
        );
    }
}
