//! Error handling.

use thiserror::Error;

/// Failure to read one fact from the host.
///
/// The engine absorbs both variants: `Unavailable` selects a fallback path and
/// `PartialUnavailable` turns the affected field into `None`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProbeError {
    /// The whole facility for this fact is missing on this host.
    #[error("{fact} is not available on this host")]
    Unavailable { fact: &'static str },
    /// The facility exists but this particular read failed.
    #[error("{fact} could not be read: {reason}")]
    PartialUnavailable { fact: &'static str, reason: String },
}

impl ProbeError {
    pub fn unavailable(fact: &'static str) -> Self {
        Self::Unavailable { fact }
    }

    pub fn partial(fact: &'static str, reason: impl Into<String>) -> Self {
        Self::PartialUnavailable {
            fact,
            reason: reason.into(),
        }
    }

    pub fn io(fact: &'static str, source: &std::io::Error) -> Self {
        Self::partial(fact, source.to_string())
    }

    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::Unavailable { .. })
    }
}

/// Errors that leave a capture. Everything else degrades to unknown values.
#[derive(Error, Debug, Clone, PartialEq)]
#[must_use]
pub enum CaptureError {
    #[error("invalid capture argument {field:?}: {value}")]
    InvalidArgument { field: &'static str, value: String },
    #[error("capture cancelled before completion")]
    Cancelled,
}

impl CaptureError {
    pub fn invalid(field: &'static str, value: impl ToString) -> Self {
        Self::InvalidArgument {
            field,
            value: value.to_string(),
        }
    }
}
