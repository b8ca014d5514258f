//! Analytics configuration.

use serde::{Deserialize, Serialize};

use crate::window::TimeWindow;

/// Name fragment that identifies the success metric on deployments that
/// predate declared metric roles.
pub const DEFAULT_SUCCESS_NAME_MATCH: &str = "problem resolution";

/// Configuration for the analytics views.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsConfig {
    /// Window used when none is given explicitly
    #[serde(default)]
    pub default_window: TimeWindow,

    /// How the success metric is located
    #[serde(default)]
    pub success: SuccessPolicy,
}

/// Policy for locating the metric that decides the success rate.
///
/// A metric tagged with [`crate::MetricRole::SuccessIndicator`] wins. The
/// name match is a fallback for metric sets without roles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuccessPolicy {
    /// Honor `role: success_indicator` on metric definitions
    #[serde(default = "default_true")]
    pub use_declared_role: bool,

    /// Case-insensitive name fragment; `None` disables name matching
    #[serde(default = "default_name_match")]
    pub name_match: Option<String>,
}

fn default_true() -> bool {
    true
}

fn default_name_match() -> Option<String> {
    Some(DEFAULT_SUCCESS_NAME_MATCH.to_string())
}

impl Default for SuccessPolicy {
    fn default() -> Self {
        Self {
            use_declared_role: true,
            name_match: default_name_match(),
        }
    }
}

impl SuccessPolicy {
    /// Only honor declared roles.
    pub fn declared_only() -> Self {
        Self {
            use_declared_role: true,
            name_match: None,
        }
    }
}
