//! Rule evaluation against computed dashboards.

use std::collections::BTreeMap;

use serde::Serialize;
use voxeval_analytics::Dashboard;
use voxeval_core::{
    AggregateStatistic, AlertRule, AlertRuleId, AlertTarget, AnalyticsSnapshot, SuccessPolicy,
    Time, TimeWindow,
};

/// Outcome of evaluating one rule.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlertEvaluation {
    /// Rule evaluated
    pub rule_id: AlertRuleId,

    /// Rule name
    pub rule_name: String,

    /// Human-readable condition
    pub condition: String,

    /// Window the statistic was computed over
    pub window: TimeWindow,

    /// Observed value; `None` when the target had no data
    pub observed: Option<f64>,

    /// Threshold compared against
    pub threshold: f64,

    /// Whether the rule fired
    pub triggered: bool,

    /// Clock reading the evaluation used
    pub evaluated_at: Time,
}

impl AlertEvaluation {
    /// One-line message for notifications.
    pub fn message(&self) -> String {
        match self.observed {
            Some(value) => format!(
                "[{}] {}: observed {:.3} over last {} (threshold {})",
                if self.triggered { "ALERT" } else { "ok" },
                self.rule_name,
                value,
                self.window,
                self.condition
            ),
            None => format!(
                "[no data] {}: nothing to compare over last {} ({})",
                self.rule_name, self.window, self.condition
            ),
        }
    }
}

/// Evaluates alert rules.
#[derive(Debug, Clone, Default)]
pub struct AlertEvaluator {
    policy: SuccessPolicy,
}

impl AlertEvaluator {
    /// Create an evaluator using the given success policy.
    pub fn new(policy: SuccessPolicy) -> Self {
        Self { policy }
    }

    /// Evaluate every enabled rule against the snapshot.
    ///
    /// One dashboard is computed per distinct window, all anchored to `now`.
    pub fn evaluate(
        &self,
        snapshot: &AnalyticsSnapshot,
        rules: &[AlertRule],
        now: Time,
    ) -> Vec<AlertEvaluation> {
        let mut dashboards: BTreeMap<TimeWindow, Dashboard<'_>> = BTreeMap::new();
        let mut evaluations = Vec::new();

        for rule in rules.iter().filter(|r| r.enabled) {
            let dashboard = dashboards
                .entry(rule.window)
                .or_insert_with(|| Dashboard::compute(snapshot, rule.window, now, &self.policy));

            let observed = observe(dashboard, &rule.target);
            let triggered = observed
                .map(|value| rule.comparison.holds(value, rule.threshold))
                .unwrap_or(false);

            tracing::debug!(
                "Alert rule '{}' observed {:?} (triggered: {})",
                rule.name,
                observed,
                triggered
            );

            evaluations.push(AlertEvaluation {
                rule_id: rule.id,
                rule_name: rule.name.clone(),
                condition: rule.describe(),
                window: rule.window,
                observed,
                threshold: rule.threshold,
                triggered,
                evaluated_at: now,
            });
        }

        evaluations
    }
}

/// Read the statistic a target points at.
fn observe(dashboard: &Dashboard<'_>, target: &AlertTarget) -> Option<f64> {
    let stats = &dashboard.stats;
    match target {
        AlertTarget::Metric { metric_id, statistic } => {
            let aggregate = dashboard.aggregates.get(metric_id.as_str())?;
            Some(match statistic {
                AggregateStatistic::Average => aggregate.average,
                AggregateStatistic::Min => aggregate.min,
                AggregateStatistic::Max => aggregate.max,
                AggregateStatistic::Count => aggregate.count as f64,
            })
        }
        AlertTarget::SuccessRate => (stats.total_results > 0).then_some(stats.success_rate),
        AlertTarget::OverallScore => {
            (!dashboard.aggregates.is_empty()).then_some(stats.overall_score)
        }
        AlertTarget::AverageDuration => {
            (stats.completed_count > 0).then_some(stats.avg_duration)
        }
        AlertTarget::FailedCount => Some(stats.failed_count as f64),
    }
}
