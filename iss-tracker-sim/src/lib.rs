//! Stand-in for the open-notify `iss-now` API with switchable failure modes, for running the
//! tracker locally and in tests without hitting the real service.

mod orbit;
mod state;

use std::time::Duration;

use anyhow::Context;
use axum::{
    Json, Router,
    extract::{Path, State},
    http::{StatusCode, header},
    response::IntoResponse,
    routing::{get, post},
};
use log::{debug, info};
use serde::Serialize;
use serde_json::json;
use tokio::net::TcpListener;

pub use orbit::position_at;
pub use state::{FailureMode, SimState, UnknownModeError};

/// How long [FailureMode::Slow] holds a request before answering
pub const SLOW_RESPONSE_DELAY: Duration = Duration::from_secs(2);

#[derive(Debug, Serialize)]
struct IssPosition {
    latitude: String,
    longitude: String,
}

#[derive(Debug, Serialize)]
struct IssNow {
    message: &'static str,
    timestamp: i64,
    iss_position: IssPosition,
}

/// Status and body to answer a position request with, ignoring [FailureMode::Slow]'s delay
pub fn position_response(mode: FailureMode, unix_secs: i64) -> (StatusCode, String) {
    let (lat, long) = position_at(unix_secs);
    let mut latitude = format!("{lat:.4}");
    let longitude = format!("{long:.4}");

    match mode {
        FailureMode::ServerError => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal Server Error".to_string(),
            );
        }
        FailureMode::Malformed => {
            return (
                StatusCode::OK,
                "<html><body>Service Unavailable</body></html>".to_string(),
            );
        }
        FailureMode::MissingPosition => {
            let body = json!({ "message": "success", "timestamp": unix_secs });
            return (StatusCode::OK, body.to_string());
        }
        FailureMode::NonNumeric => latitude = "north".to_string(),
        FailureMode::Healthy | FailureMode::Slow => {}
    }

    let body = IssNow {
        message: "success",
        timestamp: unix_secs,
        iss_position: IssPosition {
            latitude,
            longitude,
        },
    };

    match serde_json::to_string(&body) {
        Ok(body) => (StatusCode::OK, body),
        Err(_) => (StatusCode::INTERNAL_SERVER_ERROR, String::new()),
    }
}

async fn iss_now(State(state): State<SimState>) -> impl IntoResponse {
    let mode = state.begin_request();
    debug!("Position request #{} ({mode})", state.requests_served());

    if mode == FailureMode::Slow {
        tokio::time::sleep(SLOW_RESPONSE_DELAY).await;
    }

    let (status, body) = position_response(mode, chrono::Utc::now().timestamp());
    (status, [(header::CONTENT_TYPE, "application/json")], body)
}

async fn set_mode(
    State(state): State<SimState>,
    Path(mode): Path<String>,
) -> Result<String, StatusCode> {
    let mode = mode.parse::<FailureMode>()?;
    info!("Switching to {mode} mode");
    state.set_mode(mode);
    Ok(mode.to_string())
}

async fn stats(State(state): State<SimState>) -> impl IntoResponse {
    Json(json!({
        "mode": state.mode().as_str(),
        "requests_served": state.requests_served(),
    }))
}

pub fn router(state: SimState) -> Router {
    Router::new()
        .route("/iss-now.json", get(iss_now))
        .route("/mode/{mode}", post(set_mode))
        .route("/stats", get(stats))
        .with_state(state)
}

/// Serve the simulator on an already bound listener until the task is dropped
pub async fn serve(listener: TcpListener, state: SimState) -> anyhow::Result<()> {
    axum::serve(listener, router(state))
        .await
        .context("Error while running simulator")
}
