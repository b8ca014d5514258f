//! Trailing time windows applied before any aggregation.

use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::Time;

/// Error for window sizes outside the supported set.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WindowError {
    /// Day count not in {1, 4, 7, 30}
    #[error("unsupported window of {0} days (expected 1, 4, 7 or 30)")]
    Unsupported(u32),

    /// Text that is not a day count
    #[error("invalid window '{0}'")]
    Invalid(String),
}

/// Trailing N-day window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum TimeWindow {
    /// Last 24 hours
    OneDay,
    /// Last 4 days
    FourDays,
    /// Last 7 days
    #[default]
    SevenDays,
    /// Last 30 days
    ThirtyDays,
}

impl TimeWindow {
    /// All windows, shortest first.
    pub const ALL: [TimeWindow; 4] = [
        TimeWindow::OneDay,
        TimeWindow::FourDays,
        TimeWindow::SevenDays,
        TimeWindow::ThirtyDays,
    ];

    /// Window length in days.
    pub fn days(&self) -> u32 {
        match self {
            TimeWindow::OneDay => 1,
            TimeWindow::FourDays => 4,
            TimeWindow::SevenDays => 7,
            TimeWindow::ThirtyDays => 30,
        }
    }

    /// Earliest instant still inside the window ending at `now`.
    pub fn cutoff(&self, now: Time) -> Time {
        now - Duration::days(i64::from(self.days()))
    }
}

impl TryFrom<u32> for TimeWindow {
    type Error = WindowError;

    fn try_from(days: u32) -> Result<Self, Self::Error> {
        match days {
            1 => Ok(TimeWindow::OneDay),
            4 => Ok(TimeWindow::FourDays),
            7 => Ok(TimeWindow::SevenDays),
            30 => Ok(TimeWindow::ThirtyDays),
            other => Err(WindowError::Unsupported(other)),
        }
    }
}

impl From<TimeWindow> for u32 {
    fn from(window: TimeWindow) -> Self {
        window.days()
    }
}

impl std::str::FromStr for TimeWindow {
    type Err = WindowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let digits = trimmed.strip_suffix('d').unwrap_or(trimmed);
        let days: u32 = digits
            .parse()
            .map_err(|_| WindowError::Invalid(s.to_string()))?;
        TimeWindow::try_from(days)
    }
}

impl std::fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}d", self.days())
    }
}
