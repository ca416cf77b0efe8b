use iss_tracker_logic::{FetchError, FetchResult, LocationFetcher, prelude::*};
use log::debug;

use crate::{endpoint::FetcherConfig, response::decode_fix};

fn map_request_error(err: reqwest::Error) -> FetchError {
    if err.is_timeout() {
        FetchError::Network(format!("request timed out: {err}"))
    } else if err.is_connect() {
        FetchError::Network(format!("could not connect: {err}"))
    } else {
        FetchError::Network(err.to_string())
    }
}

/// Fetches the ISS position from an open-notify style endpoint over HTTP. Each call to
/// [LocationFetcher::fetch] makes exactly one GET request.
#[derive(Debug, Clone)]
pub struct OpenNotifyFetcher {
    client: reqwest::Client,
    endpoint: String,
}

impl OpenNotifyFetcher {
    pub fn new(config: FetcherConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self::with_client(client, config.endpoint))
    }

    /// Use an already configured client, its timeout applies instead of [FetcherConfig::timeout]
    pub fn with_client(client: reqwest::Client, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl LocationFetcher for OpenNotifyFetcher {
    async fn fetch(&self) -> FetchResult {
        debug!("GET {}", self.endpoint);

        let body = self
            .client
            .get(&self.endpoint)
            .send()
            .await
            .and_then(|resp| resp.error_for_status())
            .map_err(map_request_error)?
            .bytes()
            .await
            .map_err(map_request_error)?;

        decode_fix(&body)
    }
}
