//! Snapshot of backend data captured in one read.

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::metric::MetricDefinition;
use crate::result::EvaluationResult;
use crate::Time;

/// Results and metric definitions captured together.
///
/// Every derived view is computed from one snapshot, so analytics never mix
/// results and metric definitions from different fetches.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyticsSnapshot {
    /// Evaluation results in backend order
    pub results: Vec<EvaluationResult>,

    /// Metric definitions in backend order
    pub metrics: Vec<MetricDefinition>,

    /// When the snapshot was taken
    pub captured_at: Time,
}

impl AnalyticsSnapshot {
    /// Capture a snapshot now.
    pub fn new(results: Vec<EvaluationResult>, metrics: Vec<MetricDefinition>) -> Self {
        Self {
            results,
            metrics,
            captured_at: Utc::now(),
        }
    }

    /// Whether any result is still moving through its lifecycle.
    ///
    /// Callers use this to decide whether to keep refreshing.
    pub fn needs_polling(&self) -> bool {
        self.results.iter().any(|r| !r.status.is_terminal())
    }

    /// Results still in flight.
    pub fn pending_count(&self) -> usize {
        self.results.iter().filter(|r| !r.status.is_terminal()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ResultStatus;

    #[test]
    fn test_needs_polling_while_results_in_flight() {
        let mut snap = AnalyticsSnapshot::new(
            vec![
                EvaluationResult::new("a", "2024-03-10T10:00:00Z", ResultStatus::Completed),
                EvaluationResult::new("b", "2024-03-10T10:00:00Z", ResultStatus::Transcribing),
            ],
            vec![],
        );
        assert!(snap.needs_polling());
        assert_eq!(snap.pending_count(), 1);

        snap.results[1].status = ResultStatus::Failed;
        assert!(!snap.needs_polling());
    }

    #[test]
    fn test_empty_snapshot_does_not_poll() {
        assert!(!AnalyticsSnapshot::new(vec![], vec![]).needs_polling());
    }
}
