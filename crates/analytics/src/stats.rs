//! Headline statistics: counts, duration, overall score and success rate.

use serde::Serialize;
use voxeval_core::{
    EvaluationResult, MetricDefinition, MetricId, MetricRole, MetricType, ResultStatus,
    ScoreValue, SuccessPolicy,
};

use crate::aggregator::MetricAggregates;

/// Where the success rate came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SuccessSource {
    /// Share of scored results where the success metric is `true`
    Indicator {
        /// The success metric
        metric_id: MetricId,
    },

    /// Share of results that completed
    CompletionRatio,
}

/// Derived statistics for a filtered result set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DerivedStatistics {
    /// Results inside the window
    pub total_results: usize,

    /// Results with status `completed`
    pub completed_count: usize,

    /// Results with status `failed`
    pub failed_count: usize,

    /// Mean duration in seconds of scored completions that report one
    pub avg_duration: f64,

    /// Mean of aggregate averages
    pub overall_score: f64,

    /// Whether `overall_score` only averaged rating metrics
    pub rating_based_score: bool,

    /// Success rate as a percentage
    pub success_rate: f64,

    /// How `success_rate` was computed
    pub success_source: SuccessSource,
}

impl Default for DerivedStatistics {
    fn default() -> Self {
        Self {
            total_results: 0,
            completed_count: 0,
            failed_count: 0,
            avg_duration: 0.0,
            overall_score: 0.0,
            rating_based_score: false,
            success_rate: 0.0,
            success_source: SuccessSource::CompletionRatio,
        }
    }
}

/// Locate the metric that decides the success rate.
///
/// A declared `success_indicator` role wins over the name match. Within each
/// rule the first matching definition is used.
pub fn find_success_metric<'a>(
    metrics: &'a [MetricDefinition],
    policy: &SuccessPolicy,
) -> Option<&'a MetricDefinition> {
    if policy.use_declared_role {
        if let Some(metric) = metrics
            .iter()
            .find(|m| m.role == Some(MetricRole::SuccessIndicator))
        {
            return Some(metric);
        }
    }

    let needle = policy.name_match.as_deref()?.to_lowercase();
    if needle.is_empty() {
        return None;
    }
    metrics
        .iter()
        .find(|m| m.name.to_lowercase().contains(&needle))
}

/// Compute the headline statistics.
///
/// `filtered` is the full windowed result set; the completed-only figures
/// are derived from it here.
pub fn derive_statistics(
    filtered: &[&EvaluationResult],
    metrics: &[MetricDefinition],
    aggregates: &MetricAggregates,
    policy: &SuccessPolicy,
) -> DerivedStatistics {
    let total_results = filtered.len();
    let completed_count = count_status(filtered, ResultStatus::Completed);
    let failed_count = count_status(filtered, ResultStatus::Failed);

    let completed: Vec<&EvaluationResult> = filtered
        .iter()
        .copied()
        .filter(|r| r.is_scored_completion())
        .collect();

    let durations: Vec<f64> = completed.iter().filter_map(|r| r.duration_seconds).collect();
    let avg_duration = mean(&durations).unwrap_or(0.0);

    let rating_averages: Vec<f64> = aggregates
        .iter()
        .filter(|a| a.metric_type == MetricType::Rating)
        .map(|a| a.average)
        .collect();
    let (overall_score, rating_based_score) = match mean(&rating_averages) {
        Some(score) => (score, true),
        None => {
            let all: Vec<f64> = aggregates.iter().map(|a| a.average).collect();
            (mean(&all).unwrap_or(0.0), false)
        }
    };

    let (success_rate, success_source) = match find_success_metric(metrics, policy) {
        Some(metric) => {
            let scored: Vec<_> = completed
                .iter()
                .filter_map(|r| r.score(metric.id.as_str()))
                .collect();
            let successes = scored
                .iter()
                .filter(|s| s.value == Some(ScoreValue::Bool(true)))
                .count();
            (
                percentage(successes, scored.len()),
                SuccessSource::Indicator { metric_id: metric.id.clone() },
            )
        }
        None => (
            percentage(completed_count, total_results),
            SuccessSource::CompletionRatio,
        ),
    };

    DerivedStatistics {
        total_results,
        completed_count,
        failed_count,
        avg_duration,
        overall_score,
        rating_based_score,
        success_rate,
        success_source,
    }
}

fn count_status(results: &[&EvaluationResult], status: ResultStatus) -> usize {
    results.iter().filter(|r| r.status == status).count()
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

fn percentage(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}
