//! Storage trait abstraction.

use async_trait::async_trait;
use voxeval_core::{
    AlertRule, AlertRuleId, AnalyticsConfig, AnalyticsSnapshot, EvaluationResult,
    MetricDefinition,
};

/// Error type for storage operations.
pub type Result<T> = std::result::Result<T, StorageError>;

/// Errors that can occur during storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Item not found
    #[error("Not found: {0}")]
    NotFound(String),
}

/// Storage abstraction for voxeval data.
///
/// This trait allows different storage backends to be plugged in.
#[async_trait]
pub trait Storage: Send + Sync {
    // === Backend exports ===

    /// Replace the stored evaluation results. Order is preserved.
    async fn save_results(&mut self, results: &[EvaluationResult]) -> Result<()>;

    /// Load all evaluation results, in stored order.
    async fn load_results(&self) -> Result<Vec<EvaluationResult>>;

    /// Replace the stored metric definitions. Order is preserved.
    async fn save_metrics(&mut self, metrics: &[MetricDefinition]) -> Result<()>;

    /// Load all metric definitions, in stored order.
    async fn load_metrics(&self) -> Result<Vec<MetricDefinition>>;

    /// Load results and metrics together as one snapshot.
    async fn load_snapshot(&self) -> Result<AnalyticsSnapshot> {
        let results = self.load_results().await?;
        let metrics = self.load_metrics().await?;
        Ok(AnalyticsSnapshot::new(results, metrics))
    }

    // === Configuration ===

    /// Load the analytics configuration, or the default if none is stored.
    async fn load_config(&self) -> Result<AnalyticsConfig>;

    /// Save the analytics configuration.
    async fn save_config(&mut self, config: &AnalyticsConfig) -> Result<()>;

    // === Alert rules ===

    /// Save an alert rule (create or update).
    async fn save_alert_rule(&mut self, rule: &AlertRule) -> Result<()>;

    /// Load an alert rule by ID.
    async fn load_alert_rule(&self, id: AlertRuleId) -> Result<Option<AlertRule>>;

    /// List all alert rules, oldest first.
    async fn list_alert_rules(&self) -> Result<Vec<AlertRule>>;

    /// Delete an alert rule.
    async fn delete_alert_rule(&mut self, id: AlertRuleId) -> Result<()>;
}
