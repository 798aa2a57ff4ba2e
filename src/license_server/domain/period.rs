//! Relative time windows for usage queries.

use super::ParseUsagePeriodError;
use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Relative window ending now over which usage history is read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UsagePeriod {
    /// The last hour.
    Hour,
    /// The last six hours.
    SixHours,
    /// The last twelve hours.
    HalfDay,
    /// The last 24 hours.
    #[default]
    Day,
    /// The last seven days.
    Week,
    /// The last 30 days.
    Month,
    /// The last 365 days.
    Year,
}

impl UsagePeriod {
    /// Returns the canonical token.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Hour => "1h",
            Self::SixHours => "6h",
            Self::HalfDay => "12h",
            Self::Day => "24h",
            Self::Week => "1w",
            Self::Month => "1m",
            Self::Year => "1y",
        }
    }

    /// Returns the window length.
    #[must_use]
    pub const fn window(self) -> TimeDelta {
        match self {
            Self::Hour => TimeDelta::hours(1),
            Self::SixHours => TimeDelta::hours(6),
            Self::HalfDay => TimeDelta::hours(12),
            Self::Day => TimeDelta::hours(24),
            Self::Week => TimeDelta::days(7),
            Self::Month => TimeDelta::days(30),
            Self::Year => TimeDelta::days(365),
        }
    }

    /// Resolves the half-open `[start, end)` range ending at `now`.
    #[must_use]
    pub fn range_ending_at(self, now: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
        (now - self.window(), now)
    }
}

impl fmt::Display for UsagePeriod {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

impl TryFrom<&str> for UsagePeriod {
    type Error = ParseUsagePeriodError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "1h" => Ok(Self::Hour),
            "6h" => Ok(Self::SixHours),
            "12h" => Ok(Self::HalfDay),
            "24h" | "1d" => Ok(Self::Day),
            "1w" | "7d" => Ok(Self::Week),
            "1m" | "30d" => Ok(Self::Month),
            "1y" | "365d" => Ok(Self::Year),
            _ => Err(ParseUsagePeriodError(value.to_owned())),
        }
    }
}
