//! Alert notification delivery.

use std::time::Duration;

use voxeval_core::NotificationChannel;

use crate::evaluator::AlertEvaluation;

/// Errors raised while delivering a notification.
#[derive(Debug, thiserror::Error)]
pub enum AlertError {
    /// Request could not be sent
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Receiver answered with a non-success status
    #[error("{url} responded with {status}")]
    Status {
        /// Endpoint
        url: String,
        /// HTTP status
        status: reqwest::StatusCode,
    },
}

/// Delivers fired alerts to notification channels.
#[derive(Debug, Clone)]
pub struct AlertNotifier {
    client: reqwest::Client,
}

impl AlertNotifier {
    /// Create a notifier with a 10 second request timeout.
    pub fn new() -> Result<Self, AlertError> {
        Self::with_timeout(Duration::from_secs(10))
    }

    /// Create a notifier with a custom request timeout.
    pub fn with_timeout(timeout: Duration) -> Result<Self, AlertError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }

    /// Send one alert to one channel.
    pub async fn deliver(
        &self,
        channel: &NotificationChannel,
        alert: &AlertEvaluation,
    ) -> Result<(), AlertError> {
        let message = alert.message();

        match channel {
            NotificationChannel::Console => {
                tracing::warn!("{}", message);
                Ok(())
            }
            NotificationChannel::Webhook { url } => {
                tracing::info!("Sending webhook to {}: {}", url, message);
                let response = self.client.post(url).json(alert).send().await?;
                check_status(url, response.status())
            }
            NotificationChannel::Slack { webhook } => {
                tracing::info!("Sending Slack alert to {}: {}", webhook, message);
                let body = slack_payload(&message);
                let response = self.client.post(webhook).json(&body).send().await?;
                check_status(webhook, response.status())
            }
        }
    }
}

fn check_status(url: &str, status: reqwest::StatusCode) -> Result<(), AlertError> {
    if status.is_success() {
        Ok(())
    } else {
        Err(AlertError::Status {
            url: url.to_string(),
            status,
        })
    }
}

/// Slack incoming webhook body.
fn slack_payload(message: &str) -> serde_json::Value {
    serde_json::json!({ "text": message })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use voxeval_core::{AlertRuleId, TimeWindow};

    fn fired() -> AlertEvaluation {
        AlertEvaluation {
            rule_id: AlertRuleId::new(),
            rule_name: "low success".to_string(),
            condition: "success rate below 80".to_string(),
            window: TimeWindow::SevenDays,
            observed: Some(62.5),
            threshold: 80.0,
            triggered: true,
            evaluated_at: Utc::now(),
        }
    }

    #[test]
    fn test_message_format() {
        assert_eq!(
            fired().message(),
            "[ALERT] low success: observed 62.500 over last 7d (threshold success rate below 80)"
        );
    }

    #[test]
    fn test_slack_payload() {
        let body = slack_payload("hello");
        assert_eq!(body, serde_json::json!({"text": "hello"}));
    }

    #[test]
    fn test_non_success_status_is_error() {
        assert!(check_status("https://hooks.example.com", reqwest::StatusCode::OK).is_ok());
        let err = check_status("https://hooks.example.com", reqwest::StatusCode::BAD_GATEWAY)
            .unwrap_err();
        assert!(matches!(err, AlertError::Status { .. }));
        assert!(err.to_string().contains("502"));
    }

    #[tokio::test]
    async fn test_console_delivery_succeeds() {
        let notifier = AlertNotifier::new().unwrap();
        notifier
            .deliver(&NotificationChannel::Console, &fired())
            .await
            .unwrap();
    }
}
