//! Evaluation result model - one scored run of a voice-agent test call.

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::id::{MetricId, ResultId};
use crate::metric::MetricType;
use crate::Time;

/// An evaluation result as exported by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationResult {
    /// Backend identifier
    pub id: ResultId,

    /// Human-facing result id
    #[serde(default)]
    pub result_id: String,

    /// Display name
    #[serde(default)]
    pub name: String,

    /// When the evaluation was recorded, as delivered (ISO-8601)
    pub timestamp: String,

    /// Call duration in seconds
    #[serde(default)]
    pub duration_seconds: Option<f64>,

    /// Lifecycle status
    pub status: ResultStatus,

    /// Scores by metric id; present once the result is completed
    #[serde(default)]
    pub metric_scores: Option<HashMap<MetricId, MetricScore>>,
}

impl EvaluationResult {
    /// Create a result with no scores.
    pub fn new(id: impl Into<ResultId>, timestamp: impl Into<String>, status: ResultStatus) -> Self {
        let id = id.into();
        Self {
            result_id: id.to_string(),
            name: String::new(),
            id,
            timestamp: timestamp.into(),
            duration_seconds: None,
            status,
            metric_scores: None,
        }
    }

    /// Set the duration.
    pub fn with_duration(mut self, seconds: f64) -> Self {
        self.duration_seconds = Some(seconds);
        self
    }

    /// Add a score, creating the score map if needed.
    pub fn with_score(mut self, metric_id: impl Into<MetricId>, score: MetricScore) -> Self {
        self.metric_scores
            .get_or_insert_with(HashMap::new)
            .insert(metric_id.into(), score);
        self
    }

    /// Parse the timestamp into a UTC instant.
    ///
    /// Accepts RFC 3339 with any offset, offset-less ISO-8601 date-times
    /// (read as UTC) and bare `YYYY-MM-DD` dates (UTC midnight). Returns
    /// `None` for anything else.
    pub fn recorded_at(&self) -> Option<Time> {
        let raw = self.timestamp.trim();
        if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
            return Some(dt.with_timezone(&Utc));
        }
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
            return Some(naive.and_utc());
        }
        NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .ok()
            .and_then(|date| date.and_hms_opt(0, 0, 0))
            .map(|naive| naive.and_utc())
    }

    /// Completed with a score map: the set every aggregation reads from.
    pub fn is_scored_completion(&self) -> bool {
        self.status == ResultStatus::Completed && self.metric_scores.is_some()
    }

    /// Look up the score for a metric.
    pub fn score(&self, metric_id: &str) -> Option<&MetricScore> {
        self.metric_scores.as_ref()?.get(metric_id)
    }
}

/// Result lifecycle status.
///
/// Results move forward through these states; `Completed` and `Failed` are
/// terminal until an explicit re-evaluation resets the record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResultStatus {
    /// Waiting for a worker
    Queued,
    /// Dialing the agent
    CallInitiating,
    /// Call is ringing
    CallConnecting,
    /// Conversation under way
    CallInProgress,
    /// Call hung up, awaiting processing
    CallEnded,
    /// Recording is being transcribed
    Transcribing,
    /// Transcript is being scored
    Evaluating,
    /// Scored
    Completed,
    /// Gave up
    Failed,
}

impl ResultStatus {
    /// All statuses in lifecycle order.
    pub const ALL: [ResultStatus; 9] = [
        ResultStatus::Queued,
        ResultStatus::CallInitiating,
        ResultStatus::CallConnecting,
        ResultStatus::CallInProgress,
        ResultStatus::CallEnded,
        ResultStatus::Transcribing,
        ResultStatus::Evaluating,
        ResultStatus::Completed,
        ResultStatus::Failed,
    ];

    /// Whether the result has stopped changing.
    pub fn is_terminal(&self) -> bool {
        matches!(self, ResultStatus::Completed | ResultStatus::Failed)
    }

    /// Get string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            ResultStatus::Queued => "queued",
            ResultStatus::CallInitiating => "call_initiating",
            ResultStatus::CallConnecting => "call_connecting",
            ResultStatus::CallInProgress => "call_in_progress",
            ResultStatus::CallEnded => "call_ended",
            ResultStatus::Transcribing => "transcribing",
            ResultStatus::Evaluating => "evaluating",
            ResultStatus::Completed => "completed",
            ResultStatus::Failed => "failed",
        }
    }
}

/// A single metric's score on a result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricScore {
    /// Scored value; `None` when the backend sent null
    #[serde(default)]
    pub value: Option<ScoreValue>,

    /// Type the evaluator scored with
    #[serde(rename = "type", default = "unknown_type")]
    pub score_type: MetricType,

    /// Metric name at scoring time
    #[serde(default)]
    pub metric_name: String,
}

fn unknown_type() -> MetricType {
    MetricType::Unknown
}

impl MetricScore {
    /// Create a score.
    pub fn new(value: impl Into<ScoreValue>, score_type: MetricType) -> Self {
        Self {
            value: Some(value.into()),
            score_type,
            metric_name: String::new(),
        }
    }

    /// A score whose value was null.
    pub fn empty(score_type: MetricType) -> Self {
        Self {
            value: None,
            score_type,
            metric_name: String::new(),
        }
    }
}

/// Scored value. The JSON value's own type selects the variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ScoreValue {
    /// JSON boolean
    Bool(bool),
    /// JSON number
    Number(f64),
    /// JSON string, possibly holding a number
    Text(String),
}

impl From<bool> for ScoreValue {
    fn from(v: bool) -> Self {
        ScoreValue::Bool(v)
    }
}

impl From<f64> for ScoreValue {
    fn from(v: f64) -> Self {
        ScoreValue::Number(v)
    }
}

impl From<&str> for ScoreValue {
    fn from(v: &str) -> Self {
        ScoreValue::Text(v.to_string())
    }
}

impl From<String> for ScoreValue {
    fn from(v: String) -> Self {
        ScoreValue::Text(v)
    }
}
