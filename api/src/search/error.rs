use poem::http::StatusCode;
use std::fmt;

pub const STORE_UNAVAILABLE_MESSAGE: &str = "Search is temporarily unavailable";

/// Failures of a single search request
#[derive(Debug, Clone, PartialEq)]
pub enum SearchError {
    InvalidEnum {
        field: &'static str,
        value: String,
        allowed: String,
    },
    RangeConflict {
        min_rent: f64,
        max_rent: f64,
    },
    StoreUnavailable(String),
}

impl fmt::Display for SearchError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SearchError::InvalidEnum {
                field,
                value,
                allowed,
            } => write!(
                f,
                "Invalid value '{}' for {} (expected one of: {})",
                value, field, allowed
            ),
            SearchError::RangeConflict { min_rent, max_rent } => write!(
                f,
                "minRent ({}) must be less than maxRent ({})",
                min_rent, max_rent
            ),
            SearchError::StoreUnavailable(msg) => write!(f, "Backing store unavailable: {}", msg),
        }
    }
}

impl std::error::Error for SearchError {}

impl SearchError {
    pub fn code(&self) -> &'static str {
        match self {
            SearchError::InvalidEnum { .. } => "INVALID_ENUM",
            SearchError::RangeConflict { .. } => "RANGE_CONFLICT",
            SearchError::StoreUnavailable(_) => "STORE_UNAVAILABLE",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            SearchError::InvalidEnum { .. } | SearchError::RangeConflict { .. } => {
                StatusCode::BAD_REQUEST
            }
            SearchError::StoreUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    /// Message safe to show to end users. Store details stay in the logs.
    pub fn public_message(&self) -> String {
        match self {
            SearchError::StoreUnavailable(_) => STORE_UNAVAILABLE_MESSAGE.to_string(),
            other => other.to_string(),
        }
    }
}
