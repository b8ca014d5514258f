//! Trailing-window result filter.

use voxeval_core::{EvaluationResult, Time, TimeWindow};

/// Keep results recorded at or after `window.cutoff(now)`, in input order.
///
/// Results whose timestamp cannot be parsed are excluded.
pub fn filter_results<'a>(
    results: &'a [EvaluationResult],
    window: TimeWindow,
    now: Time,
) -> Vec<&'a EvaluationResult> {
    let cutoff = window.cutoff(now);

    results
        .iter()
        .filter(|result| match result.recorded_at() {
            Some(at) => at >= cutoff,
            None => {
                tracing::debug!(
                    "Excluding result {} with unparsable timestamp '{}'",
                    result.id,
                    result.timestamp
                );
                false
            }
        })
        .collect()
}
