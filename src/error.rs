//! Crate error type
//!
//! Only configuration loading and the per-tick invariant check produce errors.
//! Spawn aborts are `None`, not errors.

use std::fmt;

#[derive(Debug)]
pub enum Error {
    /// A tuning value is out of its allowed range
    InvalidTuning { field: &'static str, reason: &'static str },
    /// Tuning or settings JSON could not be parsed
    Json(serde_json::Error),
    /// A run-state number became NaN or infinite
    NonFinite { field: &'static str },
    /// More than one laser beam is active
    LaserOverlap { count: usize },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidTuning { field, reason } => {
                write!(f, "invalid tuning value `{}`: {}", field, reason)
            }
            Error::Json(e) => write!(f, "malformed config: {}", e),
            Error::NonFinite { field } => write!(f, "run state `{}` is not finite", field),
            Error::LaserOverlap { count } => {
                write!(f, "{} laser beams active, at most one allowed", count)
            }
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Json(e) => Some(e),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Json(e)
    }
}
