use std::{
    fmt,
    str::FromStr,
    sync::{
        Arc, Mutex,
        atomic::{AtomicU64, Ordering},
    },
};

use axum::http::StatusCode;

/// How the simulated endpoint answers position requests
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FailureMode {
    /// Normal open-notify response
    #[default]
    Healthy,
    /// HTTP 500
    ServerError,
    /// 200 with a body that isn't JSON
    Malformed,
    /// Valid JSON without `iss_position`
    MissingPosition,
    /// `iss_position.latitude` is not a number
    NonNumeric,
    /// Healthy response after a long delay
    Slow,
}

impl FailureMode {
    pub const ALL_MODES: [Self; 6] = [
        Self::Healthy,
        Self::ServerError,
        Self::Malformed,
        Self::MissingPosition,
        Self::NonNumeric,
        Self::Slow,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Healthy => "healthy",
            Self::ServerError => "server-error",
            Self::Malformed => "malformed",
            Self::MissingPosition => "missing-position",
            Self::NonNumeric => "non-numeric",
            Self::Slow => "slow",
        }
    }
}

impl fmt::Display for FailureMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnknownModeError;

impl From<UnknownModeError> for StatusCode {
    fn from(_: UnknownModeError) -> Self {
        StatusCode::BAD_REQUEST
    }
}

impl FromStr for FailureMode {
    type Err = UnknownModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL_MODES
            .into_iter()
            .find(|mode| mode.as_str().eq_ignore_ascii_case(s))
            .ok_or(UnknownModeError)
    }
}

type StateObj<T> = Arc<Mutex<T>>;

/// Shared state of the simulator, cheap to clone
#[derive(Debug, Clone, Default)]
pub struct SimState {
    mode: StateObj<FailureMode>,
    served: Arc<AtomicU64>,
}

impl SimState {
    pub fn mode(&self) -> FailureMode {
        *self.mode.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn set_mode(&self, mode: FailureMode) {
        *self.mode.lock().unwrap_or_else(|e| e.into_inner()) = mode;
    }

    /// Count a position request, returns the mode to answer it with
    pub fn begin_request(&self) -> FailureMode {
        self.served.fetch_add(1, Ordering::SeqCst);
        self.mode()
    }

    /// Number of position requests received so far, failed or not
    pub fn requests_served(&self) -> u64 {
        self.served.load(Ordering::SeqCst)
    }
}
