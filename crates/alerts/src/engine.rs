//! Evaluate-then-deliver alert checks.

use serde::Serialize;
use voxeval_core::{AlertRule, AlertRuleId, AnalyticsSnapshot, NotificationChannel, Time};

use crate::evaluator::{AlertEvaluation, AlertEvaluator};
use crate::notifier::AlertNotifier;

/// A notification that could not be delivered.
#[derive(Debug, Clone, Serialize)]
pub struct DeliveryFailure {
    /// Rule whose alert failed
    pub rule_id: AlertRuleId,

    /// Channel that failed
    pub channel: NotificationChannel,

    /// Error text
    pub error: String,
}

/// Result of one alert check.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CheckReport {
    /// Every enabled rule's evaluation
    pub evaluations: Vec<AlertEvaluation>,

    /// Notifications sent successfully
    pub delivered: usize,

    /// Notifications that failed
    pub failures: Vec<DeliveryFailure>,
}

impl CheckReport {
    /// Evaluations that fired.
    pub fn triggered(&self) -> impl Iterator<Item = &AlertEvaluation> {
        self.evaluations.iter().filter(|e| e.triggered)
    }
}

/// Runs alert checks.
pub struct AlertEngine {
    evaluator: AlertEvaluator,
    notifier: Option<AlertNotifier>,
}

impl AlertEngine {
    /// Create an engine that only evaluates.
    pub fn new(evaluator: AlertEvaluator) -> Self {
        Self {
            evaluator,
            notifier: None,
        }
    }

    /// Deliver fired alerts through this notifier.
    pub fn with_notifier(mut self, notifier: AlertNotifier) -> Self {
        self.notifier = Some(notifier);
        self
    }

    /// Evaluate all rules and deliver the ones that fired.
    ///
    /// A failed delivery is recorded and does not stop the others.
    pub async fn check(
        &self,
        snapshot: &AnalyticsSnapshot,
        rules: &[AlertRule],
        now: Time,
    ) -> CheckReport {
        let evaluations = self.evaluator.evaluate(snapshot, rules, now);
        let mut report = CheckReport {
            evaluations,
            ..Default::default()
        };

        let Some(notifier) = &self.notifier else {
            return report;
        };

        for evaluation in report.evaluations.iter().filter(|e| e.triggered) {
            let Some(rule) = rules.iter().find(|r| r.id == evaluation.rule_id) else {
                continue;
            };
            for channel in &rule.channels {
                match notifier.deliver(channel, evaluation).await {
                    Ok(()) => report.delivered += 1,
                    Err(e) => {
                        tracing::warn!("Failed to deliver alert '{}': {}", rule.name, e);
                        report.failures.push(DeliveryFailure {
                            rule_id: rule.id,
                            channel: channel.clone(),
                            error: e.to_string(),
                        });
                    }
                }
            }
        }

        tracing::info!(
            "Alert check: {} evaluated, {} triggered, {} delivered, {} failed",
            report.evaluations.len(),
            report.triggered().count(),
            report.delivered,
            report.failures.len()
        );

        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use voxeval_core::{AlertTarget, Comparison, EvaluationResult, ResultStatus};

    fn snapshot() -> AnalyticsSnapshot {
        let now = Utc::now().to_rfc3339();
        AnalyticsSnapshot::new(
            vec![
                EvaluationResult::new("a", now.clone(), ResultStatus::Failed),
                EvaluationResult::new("b", now, ResultStatus::Failed),
            ],
            vec![],
        )
    }

    fn failing_rule() -> AlertRule {
        AlertRule::new("failures", AlertTarget::FailedCount, Comparison::AtOrAbove, 2.0)
            .add_channel(NotificationChannel::Console)
    }

    #[tokio::test]
    async fn test_check_without_notifier_only_evaluates() {
        let engine = AlertEngine::new(AlertEvaluator::default());
        let report = engine.check(&snapshot(), &[failing_rule()], Utc::now()).await;

        assert_eq!(report.triggered().count(), 1);
        assert_eq!(report.delivered, 0);
        assert!(report.failures.is_empty());
    }

    #[tokio::test]
    async fn test_check_delivers_to_console() {
        let engine = AlertEngine::new(AlertEvaluator::default())
            .with_notifier(AlertNotifier::new().unwrap());
        let quiet = AlertRule::new("quiet", AlertTarget::FailedCount, Comparison::Above, 5.0)
            .add_channel(NotificationChannel::Console);

        let report = engine
            .check(&snapshot(), &[failing_rule(), quiet], Utc::now())
            .await;

        assert_eq!(report.evaluations.len(), 2);
        assert_eq!(report.delivered, 1);
        assert!(report.failures.is_empty());
    }

    #[tokio::test]
    async fn test_unreachable_webhook_is_reported() {
        let engine = AlertEngine::new(AlertEvaluator::default())
            .with_notifier(AlertNotifier::new().unwrap());
        let rule = failing_rule().add_channel(NotificationChannel::Webhook {
            url: "http://127.0.0.1:9/hook".to_string(),
        });

        let report = engine.check(&snapshot(), &[rule], Utc::now()).await;

        assert_eq!(report.delivered, 1);
        assert_eq!(report.failures.len(), 1);
        assert!(matches!(report.failures[0].channel, NotificationChannel::Webhook { .. }));
    }
}
