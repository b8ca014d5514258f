//! JSON file storage implementation.
//!
//! Backend exports live in `results.json` and `metrics.json` as plain arrays.
//! Alert rules are one file each under `alerts/`, with small per-object meta
//! markers (version + updated_at) under `meta/alerts/`.

use std::path::{Path, PathBuf};

use tokio::fs;
use voxeval_core::{AlertRule, AlertRuleId, AnalyticsConfig, EvaluationResult, MetricDefinition};

use super::{Result, Storage, StorageError};

/// File-based JSON storage backend.
pub struct JsonStorage {
    root: PathBuf,
}

impl JsonStorage {
    /// Open storage rooted at `root`, creating the directories it needs.
    pub async fn new(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref().to_path_buf();

        fs::create_dir_all(root.join("alerts")).await?;
        fs::create_dir_all(root.join("meta").join("alerts")).await?;

        Ok(Self { root })
    }

    /// Storage root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn results_path(&self) -> PathBuf {
        self.root.join("results.json")
    }
    fn metrics_path(&self) -> PathBuf {
        self.root.join("metrics.json")
    }
    fn config_path(&self) -> PathBuf {
        self.root.join("config.json")
    }
    fn alert_path(&self, id: AlertRuleId) -> PathBuf {
        self.root.join("alerts").join(format!("{}.json", id))
    }

    fn meta_path(&self, kind: &str, id: &str) -> PathBuf {
        self.root.join("meta").join(kind).join(format!("{}.meta.json", id))
    }

    /// Read and increment per-object version, return new version.
    async fn bump_version(&self, kind: &str, id: &str) -> Result<u64> {
        let path = self.meta_path(kind, id);
        let mut version = 0u64;
        if let Ok(s) = fs::read_to_string(&path).await {
            if let Ok(json) = serde_json::from_str::<serde_json::Value>(&s) {
                if let Some(v) = json.get("version").and_then(|v| v.as_u64()) {
                    version = v;
                }
            }
        }
        version += 1;
        let meta = serde_json::json!({"version": version, "updated_at": chrono::Utc::now()});
        fs::write(&path, serde_json::to_string_pretty(&meta)?.as_bytes()).await?;
        Ok(version)
    }
}

#[async_trait::async_trait]
impl Storage for JsonStorage {
    async fn save_results(&mut self, results: &[EvaluationResult]) -> Result<()> {
        write_json(&self.results_path(), &results).await?;
        tracing::debug!("Stored {} evaluation results", results.len());
        Ok(())
    }

    async fn load_results(&self) -> Result<Vec<EvaluationResult>> {
        Ok(read_json(&self.results_path()).await?.unwrap_or_default())
    }

    async fn save_metrics(&mut self, metrics: &[MetricDefinition]) -> Result<()> {
        write_json(&self.metrics_path(), &metrics).await?;
        tracing::debug!("Stored {} metric definitions", metrics.len());
        Ok(())
    }

    async fn load_metrics(&self) -> Result<Vec<MetricDefinition>> {
        Ok(read_json(&self.metrics_path()).await?.unwrap_or_default())
    }

    async fn load_config(&self) -> Result<AnalyticsConfig> {
        Ok(read_json(&self.config_path()).await?.unwrap_or_default())
    }

    async fn save_config(&mut self, config: &AnalyticsConfig) -> Result<()> {
        write_json(&self.config_path(), config).await
    }

    async fn save_alert_rule(&mut self, rule: &AlertRule) -> Result<()> {
        write_json(&self.alert_path(rule.id), rule).await?;

        let id_str = rule.id.to_string();
        let version = self.bump_version("alerts", &id_str).await?;
        tracing::debug!("Saved alert rule {} (v{})", rule.id, version);
        Ok(())
    }

    async fn load_alert_rule(&self, id: AlertRuleId) -> Result<Option<AlertRule>> {
        read_json(&self.alert_path(id)).await
    }

    async fn list_alert_rules(&self) -> Result<Vec<AlertRule>> {
        let mut rules = list_dir(&self.root.join("alerts")).await?;
        rules.sort_by(|a: &AlertRule, b| a.created_at.cmp(&b.created_at));
        Ok(rules)
    }

    async fn delete_alert_rule(&mut self, id: AlertRuleId) -> Result<()> {
        match fs::remove_file(self.alert_path(id)).await {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(StorageError::NotFound(format!("alert rule {}", id)));
            }
            Err(e) => return Err(e.into()),
        }
        let meta = self.meta_path("alerts", &id.to_string());
        fs::remove_file(meta).await.or_else(|e| {
            if e.kind() == std::io::ErrorKind::NotFound { Ok(()) } else { Err(e) }
        })?;
        Ok(())
    }
}

async fn write_json<T: serde::Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    fs::write(path, json.as_bytes()).await?;
    Ok(())
}

async fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    match fs::read_to_string(path).await {
        Ok(json) => {
            let value = serde_json::from_str(&json)?;
            Ok(Some(value))
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

async fn list_dir<T: serde::de::DeserializeOwned>(dir: &Path) -> Result<Vec<T>> {
    let mut items = Vec::new();
    let mut rd = fs::read_dir(dir).await?;
    while let Some(entry) = rd.next_entry().await? {
        if entry.path().extension().and_then(|s| s.to_str()) != Some("json") {
            continue;
        }
        match read_json(&entry.path()).await {
            Ok(Some(item)) => items.push(item),
            Ok(None) => {}
            Err(e) => tracing::warn!("Skipping unreadable {}: {}", entry.path().display(), e),
        }
    }
    Ok(items)
}
