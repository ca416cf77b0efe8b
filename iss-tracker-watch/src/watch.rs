use std::time::Duration;

use clap::Parser;
use iss_tracker_logic::{DEFAULT_MAX_TRACK_LEN, FetchError, Tracker, TrackerSettings, TrackerState};
use iss_tracker_transport::{DEFAULT_ENDPOINT, FetcherConfig, OpenNotifyFetcher};
use iss_watch_shared::{TrackSummary, describe_update, prelude::*};
use log::{info, warn};
use tokio::sync::mpsc;

#[derive(Parser)]
/// Follow the International Space Station and print every position update
struct Cli {
    /// Full URL of the current-position resource
    #[arg(long, default_value = DEFAULT_ENDPOINT)]
    endpoint: String,

    /// Milliseconds between polls
    #[arg(long, default_value_t = 2000)]
    interval_ms: u64,

    /// Maximum number of points kept in the track
    #[arg(long, default_value_t = DEFAULT_MAX_TRACK_LEN)]
    max_track: usize,

    /// Seconds before a single request is abandoned
    #[arg(long, default_value_t = 10)]
    timeout_secs: u64,

    /// Print each snapshot as a line of JSON instead of a summary line
    #[arg(long)]
    json: bool,

    /// Exit after this many successful updates
    #[arg(long)]
    ticks: Option<u64>,
}

fn print_update(state: &TrackerState, json: bool) -> Result {
    if json {
        let line = serde_json::to_string(state).context("Failed to serialize snapshot")?;
        println!("{line}");
    } else {
        println!("{}", describe_update(state));
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result {
    colog::init();

    let cli = Cli::parse();

    let settings = TrackerSettings {
        interval: Duration::from_millis(cli.interval_ms),
        max_track_len: cli.max_track,
    };

    let fetcher = OpenNotifyFetcher::new(FetcherConfig {
        endpoint: cli.endpoint,
        timeout: Duration::from_secs(cli.timeout_secs),
    })?;

    info!("Watching {}", fetcher.endpoint());

    let tracker = Tracker::new(fetcher, settings)?;

    let (tx, mut rx) = mpsc::unbounded_channel();

    tracker.subscribe(move |state: &TrackerState| {
        // Only fails once main has stopped listening
        tx.send(state.clone()).ok();
    });
    tracker.subscribe_errors(|why: &FetchError| warn!("Poll failed: {why}"));

    tracker.start_default()?;

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    let res = loop {
        tokio::select! {
            biased;

            res = &mut ctrl_c => {
                break res.context("Failed to listen for Ctrl-C");
            }

            update = rx.recv() => {
                let Some(state) = update else {
                    break Ok(());
                };

                if let Err(why) = print_update(&state, cli.json) {
                    break Err(why);
                }

                if cli.ticks.is_some_and(|ticks| state.updates >= ticks) {
                    break Ok(());
                }
            }
        }
    };

    tracker.stop().await;

    let summary = TrackSummary::from(&tracker.current_state().await);
    info!("Stopped: {summary}");

    res
}
