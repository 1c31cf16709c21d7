//! Statistics error taxonomy

use crate::domain::period::ParsePeriodError;
use crate::domain::types::JourneyId;
use crate::io::store::StoreError;
use thiserror::Error;

/// Error returned by every statistics operation
#[derive(Error, Debug)]
pub enum StatsError {
    /// Journey missing or owned by someone else. Both cases look identical.
    #[error("journey not found")]
    NotFound,

    /// Rejected before any store query ran
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Store failure or timeout, propagated unchanged
    #[error("data unavailable: {0}")]
    DataUnavailable(#[from] StoreError),

    /// Journey path contains a coordinate that cannot be measured
    #[error("journey {0} has malformed coordinates")]
    MalformedJourney(JourneyId),
}

impl From<ParsePeriodError> for StatsError {
    fn from(err: ParsePeriodError) -> Self {
        Self::InvalidArgument(err.to_string())
    }
}

impl StatsError {
    /// Stable code for callers mapping errors onto their own transport
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotFound => "NOT_FOUND",
            Self::InvalidArgument(_) => "INVALID_ARGUMENT",
            Self::DataUnavailable(_) => "DATA_UNAVAILABLE",
            Self::MalformedJourney(_) => "MALFORMED_JOURNEY",
        }
    }

    /// Whether a caller may reasonably retry
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::DataUnavailable(_))
    }
}
