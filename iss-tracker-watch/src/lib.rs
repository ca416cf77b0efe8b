use std::fmt;

use iss_tracker_logic::{Coordinate, TrackerState};

pub mod prelude {
    pub use anyhow::Context;
    pub type Result<T = (), E = anyhow::Error> = std::result::Result<T, E>;
}

pub use prelude::*;

/// Coordinate as `51.2433°N 172.8160°W`
pub fn format_coordinate(coordinate: &Coordinate) -> String {
    let lat = coordinate.latitude();
    let long = coordinate.longitude();
    let ns = if lat < 0.0 { 'S' } else { 'N' };
    let ew = if long < 0.0 { 'W' } else { 'E' };
    format!("{:.4}°{ns} {:.4}°{ew}", lat.abs(), long.abs())
}

/// One human readable line for a published snapshot
pub fn describe_update(state: &TrackerState) -> String {
    let Some(coordinate) = &state.coordinate else {
        return "ISS position unknown".to_string();
    };

    let at = state
        .observed_at
        .map(|dt| dt.format("%H:%M:%S UTC").to_string())
        .unwrap_or_else(|| "unknown time".to_string());

    format!(
        "[{at}] ISS at {} (track: {} points)",
        format_coordinate(coordinate),
        state.track.len()
    )
}

#[derive(Debug, Clone, PartialEq)]
pub struct TrackSummary {
    pub updates: u64,
    pub points: usize,
    /// Number of separately drawable polylines, see [TrackerState::segments]
    pub segments: usize,
    pub first: Option<Coordinate>,
    pub last: Option<Coordinate>,
}

impl From<&TrackerState> for TrackSummary {
    fn from(state: &TrackerState) -> Self {
        Self {
            updates: state.updates,
            points: state.track.len(),
            segments: state.segments().len(),
            first: state.track.first().copied(),
            last: state.track.last().copied(),
        }
    }
}

impl fmt::Display for TrackSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} updates, {} points kept in {} segment(s)",
            self.updates, self.points, self.segments
        )?;
        if let (Some(first), Some(last)) = (&self.first, &self.last) {
            write!(
                f,
                ", from {} to {}",
                format_coordinate(first),
                format_coordinate(last)
            )?;
        }
        Ok(())
    }
}
