use thiserror::Error;

use crate::location::CoordinateError;

/// Why a single poll failed to produce a [crate::Fix]. Every variant is recoverable, the tracker
/// simply waits for the next tick.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FetchError {
    /// The endpoint couldn't be reached, timed out, or answered with a non-success status
    #[error("network error: {0}")]
    Network(String),
    /// The body wasn't the JSON shape we expect
    #[error("could not decode response: {0}")]
    Decode(String),
    /// A coordinate field wasn't a number
    #[error("{field} is not a number: {value:?}")]
    Parse { field: &'static str, value: String },
    /// The coordinate parsed but isn't on the globe
    #[error("coordinate out of range: {0}")]
    OutOfRange(#[from] CoordinateError),
}

impl FetchError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Network(_) => "network",
            Self::Decode(_) => "decode",
            Self::Parse { .. } => "parse",
            Self::OutOfRange(_) => "out-of-range",
        }
    }
}
