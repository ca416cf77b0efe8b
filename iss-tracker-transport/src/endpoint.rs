use std::time::Duration;

const API_PROTO: &str = "http";
const API_HOST: &str = "api.open-notify.org";

/// Path of the current-position resource, relative to the API root
pub const ISS_NOW_PATH: &str = "/iss-now.json";

pub const DEFAULT_ENDPOINT: &str = const_str::concat!(API_PROTO, "://", API_HOST, ISS_NOW_PATH);

/// How long a single request may take before it counts as a network failure
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Build the current-position URL for an API root such as `http://127.0.0.1:3537`
pub fn endpoint_url(base: &str) -> String {
    format!("{}{ISS_NOW_PATH}", base.trim_end_matches('/'))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetcherConfig {
    /// Full URL of the current-position resource
    pub endpoint: String,
    pub timeout: Duration,
}

impl FetcherConfig {
    pub fn with_endpoint(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            ..Default::default()
        }
    }
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}
