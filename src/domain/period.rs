//! Reporting windows over journey creation time

use chrono::{DateTime, Days, Months, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

/// Error returned when a period string is outside `all|week|month|year`
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid period: {0}")]
pub struct ParsePeriodError(pub String);

/// Time-window selector for summary reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    /// No lower bound
    All,
    /// Last 7 days
    Week,
    /// Last calendar month
    Month,
    /// Last calendar year
    Year,
}

impl Period {
    pub const ALL_PERIODS: [Period; 4] = [Period::All, Period::Week, Period::Month, Period::Year];

    pub fn as_str(&self) -> &'static str {
        match self {
            Period::All => "all",
            Period::Week => "week",
            Period::Month => "month",
            Period::Year => "year",
        }
    }

    /// Earliest creation time included in this window, measured backward
    /// from the start of the UTC day containing `now`.
    /// Returns None for `All`.
    pub fn lower_bound(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        let start_of_day = start_of_day(now);
        let bound = match self {
            Period::All => return None,
            Period::Week => start_of_day.checked_sub_days(Days::new(7)),
            Period::Month => start_of_day.checked_sub_months(Months::new(1)),
            Period::Year => start_of_day.checked_sub_months(Months::new(12)),
        };
        // Only unrepresentable for dates near chrono's minimum
        Some(Utc.from_utc_datetime(&bound.unwrap_or(NaiveDateTime::MIN)))
    }
}

impl std::fmt::Display for Period {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Period {
    type Err = ParsePeriodError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(Period::All),
            "week" => Ok(Period::Week),
            "month" => Ok(Period::Month),
            "year" => Ok(Period::Year),
            other => Err(ParsePeriodError(other.to_string())),
        }
    }
}

fn start_of_day(now: DateTime<Utc>) -> NaiveDateTime {
    now.date_naive().and_time(chrono::NaiveTime::MIN)
}
