//! Daily trend bucketing.

use std::collections::BTreeMap;

use serde::Serialize;
use voxeval_core::{EvaluationResult, MetricDefinition, Time};

use crate::coerce::coerce_score;

/// One calendar day of per-metric means, ready for charting.
///
/// Serializes flat: `{"date": "2024-03-05", "Empathy": 0.7, ...}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimeSeriesPoint {
    /// UTC day, `YYYY-MM-DD`
    pub date: String,

    /// Mean value per metric name; metrics without values that day are absent
    #[serde(flatten)]
    pub values: BTreeMap<String, f64>,
}

/// UTC calendar-day key for an instant.
pub fn day_key(at: Time) -> String {
    at.date_naive().format("%Y-%m-%d").to_string()
}

/// Group results by the UTC day they were recorded on.
///
/// Each result lands in exactly one bucket; results with an unparsable
/// timestamp land in none. Buckets keep result order.
pub fn group_by_day<'a>(
    completed: &[&'a EvaluationResult],
) -> BTreeMap<String, Vec<&'a EvaluationResult>> {
    let mut buckets: BTreeMap<String, Vec<&'a EvaluationResult>> = BTreeMap::new();
    for result in completed {
        if let Some(at) = result.recorded_at() {
            buckets.entry(day_key(at)).or_default().push(*result);
        }
    }
    buckets
}

/// Daily means of every enabled number/rating metric, ascending by date.
pub fn bucket_by_day(
    completed: &[&EvaluationResult],
    metrics: &[MetricDefinition],
) -> Vec<TimeSeriesPoint> {
    let trend_metrics: Vec<&MetricDefinition> = metrics
        .iter()
        .filter(|metric| metric.enabled && metric.is_trend_metric())
        .collect();

    group_by_day(completed)
        .into_iter()
        .map(|(date, day_results)| {
            let mut values = BTreeMap::new();
            for metric in &trend_metrics {
                let day_values: Vec<f64> = day_results
                    .iter()
                    .filter_map(|result| result.score(metric.id.as_str()))
                    .filter_map(|score| coerce_score(metric.metric_type, score.value.as_ref()))
                    .collect();
                if !day_values.is_empty() {
                    let min = day_values.iter().copied().fold(f64::INFINITY, f64::min);
                    let max = day_values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
                    let mean = day_values.iter().sum::<f64>() / day_values.len() as f64;
                    values.insert(metric.name.clone(), mean.clamp(min, max));
                }
            }
            TimeSeriesPoint { date, values }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{boolean, completed_at, number, rating};
    use voxeval_core::MetricType;

    fn metrics() -> Vec<MetricDefinition> {
        vec![
            MetricDefinition::new("m1", "Empathy", MetricType::Rating),
            MetricDefinition::new("m2", "Turns", MetricType::Number),
            MetricDefinition::new("b1", "Resolved", MetricType::Boolean),
        ]
    }

    #[test]
    fn test_single_day_average() {
        let results = vec![
            completed_at("a", 0.1).with_score("m1", rating(0.8)),
            completed_at("b", 0.2).with_score("m1", rating(0.6)),
        ];
        let completed: Vec<_> = results.iter().collect();

        let points = bucket_by_day(&completed, &metrics());
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].date, "2024-03-10");
        assert!((points[0].values["Empathy"] - 0.7).abs() < 1e-12);
        assert!(!points[0].values.contains_key("Turns"));
    }

    #[test]
    fn test_daily_mean_of_equal_values_is_exact() {
        let results: Vec<_> = (0..3)
            .map(|i| completed_at(&format!("r{}", i), 0.1).with_score("m1", rating(0.1)))
            .collect();
        let completed: Vec<_> = results.iter().collect();

        let points = bucket_by_day(&completed, &metrics());
        assert_eq!(points[0].values["Empathy"], 0.1);
    }

    #[test]
    fn test_points_sorted_by_date() {
        let results = vec![
            completed_at("a", 0.1).with_score("m2", number(3.0)),
            completed_at("b", 2.0).with_score("m2", number(5.0)),
            completed_at("c", 1.0).with_score("m2", number(7.0)),
        ];
        let completed: Vec<_> = results.iter().collect();

        let dates: Vec<_> = bucket_by_day(&completed, &metrics())
            .into_iter()
            .map(|p| p.date)
            .collect();
        assert_eq!(dates, vec!["2024-03-08", "2024-03-09", "2024-03-10"]);
    }

    #[test]
    fn test_missing_score_does_not_distort_daily_average() {
        let results = vec![
            completed_at("a", 0.1).with_score("m2", number(4.0)),
            completed_at("b", 0.2),
            completed_at("c", 0.3).with_score("m1", rating(0.9)),
            completed_at("d", 0.4).with_score("m2", number(8.0)),
        ];
        let completed: Vec<_> = results.iter().collect();

        let points = bucket_by_day(&completed, &metrics());
        assert_eq!(points[0].values["Turns"], 6.0);
        assert_eq!(points[0].values["Empathy"], 0.9);
    }

    #[test]
    fn test_boolean_metrics_not_charted() {
        let results = vec![completed_at("a", 0.1).with_score("b1", boolean(true))];
        let completed: Vec<_> = results.iter().collect();

        let points = bucket_by_day(&completed, &metrics());
        assert_eq!(points.len(), 1);
        assert!(points[0].values.is_empty());
    }

    #[test]
    fn test_day_key_uses_utc_date() {
        let mut late = completed_at("late", 0.0);
        late.timestamp = "2024-03-09T23:30:00-02:00".to_string();
        let results = vec![late];
        let completed: Vec<_> = results.iter().collect();

        let buckets = group_by_day(&completed);
        assert_eq!(buckets.keys().collect::<Vec<_>>(), vec!["2024-03-10"]);
    }

    #[test]
    fn test_every_result_in_exactly_one_bucket() {
        let results: Vec<_> = [0.0, 0.4, 1.2, 1.3, 2.9, 3.5, 3.6, 6.0]
            .iter()
            .enumerate()
            .map(|(i, days)| completed_at(&format!("r{}", i), *days))
            .collect();
        let completed: Vec<_> = results.iter().collect();

        let buckets = group_by_day(&completed);
        let mut seen: Vec<&str> = buckets
            .values()
            .flatten()
            .map(|r| r.id.as_str())
            .collect();
        seen.sort_unstable();
        let mut expected: Vec<&str> = results.iter().map(|r| r.id.as_str()).collect();
        expected.sort_unstable();
        assert_eq!(seen, expected);
    }

    #[test]
    fn test_point_serializes_flat() {
        let mut values = BTreeMap::new();
        values.insert("Empathy".to_string(), 0.5);
        let point = TimeSeriesPoint { date: "2024-03-10".into(), values };
        let json = serde_json::to_value(&point).unwrap();
        assert_eq!(json, serde_json::json!({"date": "2024-03-10", "Empathy": 0.5}));
    }
}
