//! Metric threshold alerts.
//!
//! Rules are evaluated against the same dashboards the Observability views
//! render; rules that fire are delivered to their notification channels.

#![warn(missing_docs)]

pub mod evaluator;
pub mod notifier;
pub mod engine;

pub use evaluator::{AlertEvaluation, AlertEvaluator};
pub use notifier::{AlertError, AlertNotifier};
pub use engine::{AlertEngine, CheckReport, DeliveryFailure};
