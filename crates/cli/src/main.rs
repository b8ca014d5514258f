//! voxeval CLI - evaluation analytics and metric alerts.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::info;
use tracing_subscriber::EnvFilter;
use voxeval_alerts::{AlertEngine, AlertEvaluator, AlertNotifier};
use voxeval_analytics::{Dashboard, SuccessSource};
use voxeval_core::{
    AggregateStatistic, AlertRule, AlertRuleId, AlertTarget, Comparison, EvaluationResult,
    MetricDefinition, NotificationChannel, ResultStatus, TimeWindow,
};
use voxeval_storage::{JsonStorage, Storage};

#[derive(Parser)]
#[command(name = "voxeval")]
#[command(about = "Voice-agent evaluation analytics", long_about = None)]
struct Cli {
    /// Data directory
    #[arg(long, global = true, default_value = ".voxeval")]
    data: PathBuf,

    /// Print JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Import results and metric definitions exported from the backend
    Import {
        /// Results export (JSON array)
        #[arg(long)]
        results: PathBuf,
        /// Metric definitions export (JSON array)
        #[arg(long)]
        metrics: PathBuf,
    },
    /// Show headline statistics
    Summary {
        /// Window in days (1, 4, 7 or 30)
        #[arg(long)]
        window: Option<TimeWindow>,
    },
    /// Show per-metric aggregates
    Metrics {
        /// Window in days (1, 4, 7 or 30)
        #[arg(long)]
        window: Option<TimeWindow>,
    },
    /// Show daily metric trends
    Trend {
        /// Window in days (1, 4, 7 or 30)
        #[arg(long)]
        window: Option<TimeWindow>,
    },
    /// Show result counts by status
    Status,
    /// Manage metric alerts
    Alerts {
        #[command(subcommand)]
        command: AlertCommands,
    },
}

#[derive(Subcommand)]
enum AlertCommands {
    /// List alert rules
    List,
    /// Add an alert rule
    Add {
        /// Rule name
        name: String,
        /// success-rate, overall-score, avg-duration, failed-count or metric:<id>[:<statistic>]
        #[arg(long)]
        target: String,
        /// How the observed value is compared
        #[arg(long, value_enum)]
        comparison: ComparisonArg,
        /// Threshold value
        #[arg(long, allow_hyphen_values = true)]
        threshold: f64,
        /// Window in days (1, 4, 7 or 30)
        #[arg(long, default_value = "7")]
        window: TimeWindow,
        /// Log the alert to the console
        #[arg(long)]
        console: bool,
        /// Webhook URL receiving the alert as JSON
        #[arg(long)]
        webhook: Vec<String>,
        /// Slack incoming webhook URL
        #[arg(long)]
        slack: Vec<String>,
    },
    /// Remove an alert rule
    Remove {
        /// Rule ID
        id: String,
    },
    /// Evaluate alert rules
    Check {
        /// Deliver fired alerts to their channels
        #[arg(long)]
        notify: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum ComparisonArg {
    Above,
    AtOrAbove,
    Below,
    AtOrBelow,
}

impl From<ComparisonArg> for Comparison {
    fn from(arg: ComparisonArg) -> Self {
        match arg {
            ComparisonArg::Above => Comparison::Above,
            ComparisonArg::AtOrAbove => Comparison::AtOrAbove,
            ComparisonArg::Below => Comparison::Below,
            ComparisonArg::AtOrBelow => Comparison::AtOrBelow,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut storage = JsonStorage::new(&cli.data)
        .await
        .with_context(|| format!("opening data directory {}", cli.data.display()))?;
    let config = storage.load_config().await?;

    match cli.command {
        Commands::Import { results, metrics } => {
            let results: Vec<EvaluationResult> = read_export(&results).await?;
            let metrics: Vec<MetricDefinition> = read_export(&metrics).await?;
            storage.save_results(&results).await?;
            storage.save_metrics(&metrics).await?;
            info!("Imported {} results and {} metrics", results.len(), metrics.len());
        }
        Commands::Summary { window } => {
            let snapshot = storage.load_snapshot().await?;
            let window = window.unwrap_or(config.default_window);
            let dash = Dashboard::compute_now(&snapshot, window, &config.success);

            if cli.json {
                print_json(&dash.stats)?;
            } else {
                print_summary(&dash, &snapshot.metrics);
            }
        }
        Commands::Metrics { window } => {
            let snapshot = storage.load_snapshot().await?;
            let window = window.unwrap_or(config.default_window);
            let dash = Dashboard::compute_now(&snapshot, window, &config.success);

            if cli.json {
                print_json(&dash.aggregates)?;
            } else {
                println!("Metrics (last {}, {} aggregated)", window, dash.aggregates.len());
                for aggregate in &dash.aggregates {
                    println!(
                        "  {:<28} {:<8} avg {:>8.3}  min {:>8.3}  max {:>8.3}  n={}",
                        aggregate.name,
                        aggregate.metric_type.as_str(),
                        aggregate.average,
                        aggregate.min,
                        aggregate.max,
                        aggregate.count,
                    );
                }
            }
        }
        Commands::Trend { window } => {
            let snapshot = storage.load_snapshot().await?;
            let window = window.unwrap_or(config.default_window);
            let dash = Dashboard::compute_now(&snapshot, window, &config.success);

            if cli.json {
                print_json(&dash.trend)?;
            } else {
                println!("Trend (last {}, {} days)", window, dash.trend.len());
                for point in &dash.trend {
                    let values = point
                        .values
                        .iter()
                        .map(|(name, value)| format!("{}={:.3}", name, value))
                        .collect::<Vec<_>>()
                        .join("  ");
                    println!("  {}  {}", point.date, values);
                }
            }
        }
        Commands::Status => {
            let snapshot = storage.load_snapshot().await?;
            let counts: Vec<(ResultStatus, usize)> = ResultStatus::ALL
                .iter()
                .map(|status| {
                    let n = snapshot.results.iter().filter(|r| r.status == *status).count();
                    (*status, n)
                })
                .filter(|(_, n)| *n > 0)
                .collect();

            if cli.json {
                let by_status: serde_json::Map<String, serde_json::Value> = counts
                    .iter()
                    .map(|(status, n)| (status.as_str().to_string(), (*n).into()))
                    .collect();
                print_json(&serde_json::json!({
                    "total": snapshot.results.len(),
                    "by_status": by_status,
                    "needs_polling": snapshot.needs_polling(),
                }))?;
            } else {
                println!("Results ({})", snapshot.results.len());
                for (status, n) in counts {
                    println!("  {}: {}", status.as_str().to_uppercase(), n);
                }
                if snapshot.needs_polling() {
                    println!("{} result(s) still in progress; refresh to update", snapshot.pending_count());
                }
            }
        }
        Commands::Alerts { command } => run_alerts(command, &mut storage, &config, cli.json).await?,
    }

    Ok(())
}

async fn run_alerts(
    command: AlertCommands,
    storage: &mut JsonStorage,
    config: &voxeval_core::AnalyticsConfig,
    json: bool,
) -> Result<()> {
    match command {
        AlertCommands::List => {
            let rules = storage.list_alert_rules().await?;
            if json {
                print_json(&rules)?;
            } else {
                println!("Alert rules ({})", rules.len());
                for rule in rules {
                    println!(
                        "  {} | {} | {} | last {} | {} channel(s){}",
                        rule.id,
                        rule.name,
                        rule.describe(),
                        rule.window,
                        rule.channels.len(),
                        if rule.enabled { "" } else { " | disabled" },
                    );
                }
            }
        }
        AlertCommands::Add {
            name,
            target,
            comparison,
            threshold,
            window,
            console,
            webhook,
            slack,
        } => {
            let target = parse_target(&target)?;
            let mut rule = AlertRule::new(name, target, comparison.into(), threshold).with_window(window);
            if console {
                rule = rule.add_channel(NotificationChannel::Console);
            }
            for url in webhook {
                rule = rule.add_channel(NotificationChannel::Webhook { url });
            }
            for url in slack {
                rule = rule.add_channel(NotificationChannel::Slack { webhook: url });
            }

            storage.save_alert_rule(&rule).await?;
            println!("Added alert rule: {} - {}", rule.id, rule.describe());
        }
        AlertCommands::Remove { id } => {
            let id: AlertRuleId = id.parse().map_err(|_| anyhow::anyhow!("Invalid alert rule ID"))?;
            storage.delete_alert_rule(id).await?;
            println!("Removed alert rule {}", id);
        }
        AlertCommands::Check { notify } => {
            let snapshot = storage.load_snapshot().await?;
            let rules = storage.list_alert_rules().await?;

            let mut engine = AlertEngine::new(AlertEvaluator::new(config.success.clone()));
            if notify {
                engine = engine.with_notifier(AlertNotifier::new()?);
            }
            let report = engine.check(&snapshot, &rules, chrono::Utc::now()).await;

            if json {
                print_json(&report)?;
            } else {
                for evaluation in &report.evaluations {
                    println!("  {}", evaluation.message());
                }
                println!(
                    "{} rule(s) evaluated, {} triggered",
                    report.evaluations.len(),
                    report.triggered().count()
                );
                if notify {
                    println!(
                        "{} notification(s) delivered, {} failed",
                        report.delivered,
                        report.failures.len()
                    );
                }
            }
        }
    }

    Ok(())
}

async fn read_export<T: serde::de::DeserializeOwned>(path: &std::path::Path) -> Result<T> {
    let text = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))
}

fn print_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_summary(dash: &Dashboard<'_>, metrics: &[MetricDefinition]) {
    let stats = &dash.stats;
    println!("Summary (last {}, {} results)", dash.window, stats.total_results);
    println!("  Completed: {}", stats.completed_count);
    println!("  Failed: {}", stats.failed_count);

    let source = match &stats.success_source {
        SuccessSource::Indicator { metric_id } => metrics
            .iter()
            .find(|m| &m.id == metric_id)
            .map(|m| m.name.clone())
            .unwrap_or_else(|| metric_id.to_string()),
        SuccessSource::CompletionRatio => "completion ratio".to_string(),
    };
    println!("  Success rate: {:.1}% ({})", stats.success_rate, source);
    println!("  Overall score: {}", format_score(stats.overall_score, stats.rating_based_score));
    println!("  Avg duration: {:.1}s", stats.avg_duration);
}

/// Rating averages live in [0, 1] and display as percentages.
fn format_score(score: f64, rating_based: bool) -> String {
    if rating_based {
        format!("{:.1}%", score * 100.0)
    } else {
        format!("{:.2}", score)
    }
}

fn parse_target(s: &str) -> Result<AlertTarget> {
    let target = match s {
        "success-rate" => AlertTarget::SuccessRate,
        "overall-score" => AlertTarget::OverallScore,
        "avg-duration" => AlertTarget::AverageDuration,
        "failed-count" => AlertTarget::FailedCount,
        other => {
            let Some(rest) = other.strip_prefix("metric:") else {
                bail!("unknown alert target '{}'", other);
            };
            let (metric_id, statistic) = match rest.split_once(':') {
                Some((id, stat)) => (id, stat.parse::<AggregateStatistic>().map_err(anyhow::Error::msg)?),
                None => (rest, AggregateStatistic::Average),
            };
            if metric_id.is_empty() {
                bail!("alert target '{}' has no metric id", other);
            }
            AlertTarget::Metric {
                metric_id: metric_id.into(),
                statistic,
            }
        }
    };
    Ok(target)
}
