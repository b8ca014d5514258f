//! Per-metric aggregation over completed results.

use serde::Serialize;
use voxeval_core::{EvaluationResult, MetricDefinition, MetricId, MetricType};

use crate::coerce::coerce_score;

/// Count, mean and range of one metric over a result set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateMetric {
    /// Metric this aggregate belongs to
    pub metric_id: MetricId,

    /// Metric display name
    pub name: String,

    /// Metric type
    pub metric_type: MetricType,

    /// Contributing values, in result order
    pub values: Vec<f64>,

    /// Arithmetic mean
    pub average: f64,

    /// Smallest value
    pub min: f64,

    /// Largest value
    pub max: f64,

    /// Number of values
    pub count: usize,
}

impl AggregateMetric {
    /// Build from a non-empty value list. Returns `None` for an empty one.
    fn from_values(metric: &MetricDefinition, values: Vec<f64>) -> Option<Self> {
        if values.is_empty() {
            return None;
        }

        let sum: f64 = values.iter().sum();
        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let count = values.len();

        Some(Self {
            metric_id: metric.id.clone(),
            name: metric.name.clone(),
            metric_type: metric.metric_type,
            // Rounding in the sum can push the mean of equal values past them.
            average: (sum / count as f64).clamp(min, max),
            min,
            max,
            count,
            values,
        })
    }
}

/// Aggregates keyed by metric id, kept in metric definition order.
///
/// A metric with no contributing values has no entry at all.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct MetricAggregates {
    entries: Vec<AggregateMetric>,
}

impl MetricAggregates {
    /// Aggregate for a metric, if it had any values.
    pub fn get(&self, metric_id: &str) -> Option<&AggregateMetric> {
        self.entries.iter().find(|a| a.metric_id.as_str() == metric_id)
    }

    /// Whether the metric produced an aggregate.
    pub fn contains(&self, metric_id: &str) -> bool {
        self.get(metric_id).is_some()
    }

    /// Iterate in metric definition order.
    pub fn iter(&self) -> impl Iterator<Item = &AggregateMetric> {
        self.entries.iter()
    }

    /// Number of aggregates.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no metric produced an aggregate.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<'a> IntoIterator for &'a MetricAggregates {
    type Item = &'a AggregateMetric;
    type IntoIter = std::slice::Iter<'a, AggregateMetric>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Aggregate every enabled metric over `completed`.
///
/// `completed` should already be restricted to scored completions; results
/// without a score map are skipped regardless.
pub fn aggregate_metrics(
    completed: &[&EvaluationResult],
    metrics: &[MetricDefinition],
) -> MetricAggregates {
    let entries = metrics
        .iter()
        .filter(|metric| metric.enabled)
        .filter_map(|metric| {
            let values: Vec<f64> = completed
                .iter()
                .filter_map(|result| result.score(metric.id.as_str()))
                .filter_map(|score| coerce_score(metric.metric_type, score.value.as_ref()))
                .collect();
            AggregateMetric::from_values(metric, values)
        })
        .collect();

    MetricAggregates { entries }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{boolean, completed_at, number, rating};
    use voxeval_core::{MetricScore, ScoreValue};

    #[test]
    fn test_rating_aggregate() {
        let results = vec![
            completed_at("a", 1.0).with_score("m1", rating(0.8)),
            completed_at("b", 1.0).with_score("m1", rating(0.6)),
        ];
        let completed: Vec<_> = results.iter().collect();
        let metrics = vec![MetricDefinition::new("m1", "Empathy", MetricType::Rating)];

        let aggregates = aggregate_metrics(&completed, &metrics);
        let m1 = aggregates.get("m1").unwrap();
        assert!((m1.average - 0.7).abs() < 1e-12);
        assert_eq!(m1.min, 0.6);
        assert_eq!(m1.max, 0.8);
        assert_eq!(m1.count, 2);
        assert_eq!(m1.values, vec![0.8, 0.6]);
    }

    #[test]
    fn test_boolean_aggregate() {
        let results = vec![
            completed_at("a", 1.0).with_score("b1", boolean(true)),
            completed_at("b", 1.0).with_score("b1", boolean(false)),
            completed_at("c", 1.0).with_score("b1", boolean(true)),
        ];
        let completed: Vec<_> = results.iter().collect();
        let metrics = vec![MetricDefinition::new("b1", "Greeting", MetricType::Boolean)];

        let b1 = aggregate_metrics(&completed, &metrics).get("b1").cloned().unwrap();
        assert!((b1.average - 2.0 / 3.0).abs() < 1e-12);
        assert_eq!(b1.min, 0.0);
        assert_eq!(b1.max, 1.0);
        assert_eq!(b1.count, 3);
    }

    #[test]
    fn test_metric_without_values_is_omitted() {
        let results = vec![
            completed_at("a", 1.0).with_score("m1", rating(0.5)),
            completed_at("b", 1.0).with_score("m2", MetricScore::new("n/a", MetricType::Number)),
        ];
        let completed: Vec<_> = results.iter().collect();
        let metrics = vec![
            MetricDefinition::new("m1", "Empathy", MetricType::Rating),
            MetricDefinition::new("m2", "Turns", MetricType::Number),
            MetricDefinition::new("m3", "Latency", MetricType::Number),
        ];

        let aggregates = aggregate_metrics(&completed, &metrics);
        assert_eq!(aggregates.len(), 1);
        assert!(aggregates.contains("m1"));
        assert!(!aggregates.contains("m2"));
        assert!(!aggregates.contains("m3"));
    }

    #[test]
    fn test_disabled_and_unknown_metrics_are_skipped() {
        let results = vec![completed_at("a", 1.0)
            .with_score("m1", number(4.0))
            .with_score("m2", number(5.0))];
        let completed: Vec<_> = results.iter().collect();
        let metrics = vec![
            MetricDefinition::new("m1", "Turns", MetricType::Number).with_enabled(false),
            MetricDefinition::new("m2", "Tone", MetricType::Unknown),
        ];

        assert!(aggregate_metrics(&completed, &metrics).is_empty());
    }

    #[test]
    fn test_unparsable_values_are_dropped_not_zeroed() {
        let results = vec![
            completed_at("a", 1.0).with_score("m1", number(10.0)),
            completed_at("b", 1.0).with_score("m1", MetricScore::new("??", MetricType::Number)),
            completed_at("c", 1.0).with_score("m1", MetricScore::new("20", MetricType::Number)),
            completed_at("d", 1.0).with_score("m1", MetricScore::empty(MetricType::Number)),
        ];
        let completed: Vec<_> = results.iter().collect();
        let metrics = vec![MetricDefinition::new("m1", "Turns", MetricType::Number)];

        let m1 = aggregate_metrics(&completed, &metrics).get("m1").cloned().unwrap();
        assert_eq!(m1.values, vec![10.0, 20.0]);
        assert_eq!(m1.average, 15.0);
    }

    #[test]
    fn test_definition_type_drives_coercion() {
        // scored as a number, but the metric is now boolean
        let score = MetricScore {
            value: Some(ScoreValue::Bool(true)),
            score_type: MetricType::Number,
            metric_name: "Resolved".into(),
        };
        let results = vec![completed_at("a", 1.0).with_score("m1", score)];
        let completed: Vec<_> = results.iter().collect();
        let metrics = vec![MetricDefinition::new("m1", "Resolved", MetricType::Boolean)];

        assert_eq!(aggregate_metrics(&completed, &metrics).get("m1").unwrap().average, 1.0);
    }

    #[test]
    fn test_average_within_bounds() {
        let values = [0.12, 0.97, 0.33, 0.5, 0.5, 0.01, 0.88];
        let results: Vec<_> = values
            .iter()
            .enumerate()
            .map(|(i, v)| completed_at(&format!("r{}", i), 1.0).with_score("m1", rating(*v)))
            .collect();
        let completed: Vec<_> = results.iter().collect();
        let metrics = vec![MetricDefinition::new("m1", "Empathy", MetricType::Rating)];

        for aggregate in &aggregate_metrics(&completed, &metrics) {
            assert!(aggregate.min <= aggregate.average && aggregate.average <= aggregate.max);
            assert_eq!(aggregate.count, aggregate.values.len());
        }
    }

    #[test]
    fn test_repeated_values_average_stays_in_bounds() {
        let results: Vec<_> = (0..3)
            .map(|i| completed_at(&format!("r{}", i), 1.0).with_score("m1", rating(0.1)))
            .collect();
        let completed: Vec<_> = results.iter().collect();
        let metrics = vec![MetricDefinition::new("m1", "Empathy", MetricType::Rating)];

        let aggregates = aggregate_metrics(&completed, &metrics);
        let m1 = aggregates.get("m1").unwrap();
        assert_eq!(m1.min, 0.1);
        assert_eq!(m1.max, 0.1);
        assert_eq!(m1.average, 0.1);
    }
}
