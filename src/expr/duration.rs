//! Duration units for date arithmetic and RANGE window frames.

use std::fmt;
use std::str::FromStr;

use crate::error::FrameError;

/// A calendar or clock unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DurationUnit {
    Years,
    Months,
    Weeks,
    Days,
    Hours,
    Minutes,
    Seconds,
    Milliseconds,
    Microseconds,
    Nanoseconds,
}

impl DurationUnit {
    pub const ALL: [DurationUnit; 10] = [
        DurationUnit::Years,
        DurationUnit::Months,
        DurationUnit::Weeks,
        DurationUnit::Days,
        DurationUnit::Hours,
        DurationUnit::Minutes,
        DurationUnit::Seconds,
        DurationUnit::Milliseconds,
        DurationUnit::Microseconds,
        DurationUnit::Nanoseconds,
    ];

    /// Upper-case plural name, as written in Pure (`DurationUnit.DAYS`).
    pub fn name(&self) -> &'static str {
        match self {
            DurationUnit::Years => "YEARS",
            DurationUnit::Months => "MONTHS",
            DurationUnit::Weeks => "WEEKS",
            DurationUnit::Days => "DAYS",
            DurationUnit::Hours => "HOURS",
            DurationUnit::Minutes => "MINUTES",
            DurationUnit::Seconds => "SECONDS",
            DurationUnit::Milliseconds => "MILLISECONDS",
            DurationUnit::Microseconds => "MICROSECONDS",
            DurationUnit::Nanoseconds => "NANOSECONDS",
        }
    }

    /// Upper-case singular name, as written in SQL intervals.
    pub fn singular(&self) -> &'static str {
        match self {
            DurationUnit::Years => "YEAR",
            DurationUnit::Months => "MONTH",
            DurationUnit::Weeks => "WEEK",
            DurationUnit::Days => "DAY",
            DurationUnit::Hours => "HOUR",
            DurationUnit::Minutes => "MINUTE",
            DurationUnit::Seconds => "SECOND",
            DurationUnit::Milliseconds => "MILLISECOND",
            DurationUnit::Microseconds => "MICROSECOND",
            DurationUnit::Nanoseconds => "NANOSECOND",
        }
    }

    /// Units `dateDiff` can count.
    pub fn supports_date_diff(&self) -> bool {
        !matches!(
            self,
            DurationUnit::Milliseconds | DurationUnit::Microseconds | DurationUnit::Nanoseconds
        )
    }

    pub fn to_pure(&self) -> String {
        format!("DurationUnit.{}", self.name())
    }
}

impl fmt::Display for DurationUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DurationUnit {
    type Err = FrameError;

    /// Case-insensitive plural name (`"days"`, `"DAYS"`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.to_uppercase();
        DurationUnit::ALL
            .iter()
            .find(|u| u.name() == upper)
            .copied()
            .ok_or_else(|| {
                let supported: Vec<String> = DurationUnit::ALL
                    .iter()
                    .map(|u| format!("'{}'", u.name().to_lowercase()))
                    .collect();
                FrameError::validation(format!(
                    "Invalid duration unit '{}'. Supported values: [{}]",
                    s,
                    supported.join(", ")
                ))
            })
    }
}
