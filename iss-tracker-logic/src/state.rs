use serde::{Deserialize, Serialize};

use crate::{
    location::{Coordinate, Fix},
    track::{Track, split_segments},
    tracker::UtcDT,
};

/// Mutable state owned by a [crate::Tracker], never handed out directly
#[derive(Debug)]
pub(crate) struct TrackerCore {
    coordinate: Option<Coordinate>,
    observed_at: Option<UtcDT>,
    track: Track,
    updates: u64,
}

impl TrackerCore {
    pub fn new(max_track_len: usize) -> Self {
        Self {
            coordinate: None,
            observed_at: None,
            track: Track::new(max_track_len),
            updates: 0,
        }
    }

    pub fn apply(&mut self, fix: Fix) {
        self.coordinate = Some(fix.coordinate);
        self.observed_at = Some(fix.observed_at);
        self.track.push(fix.coordinate);
        self.updates += 1;
    }

    pub fn snapshot(&self) -> TrackerState {
        TrackerState {
            coordinate: self.coordinate,
            observed_at: self.observed_at,
            track: self.track.to_vec(),
            updates: self.updates,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
/// Immutable copy of a tracker's state, given to observers after every successful poll
pub struct TrackerState {
    /// Most recent coordinate, `None` until the first successful poll
    pub coordinate: Option<Coordinate>,
    /// When the source observed `coordinate`
    pub observed_at: Option<UtcDT>,
    /// Recent coordinates, oldest first
    pub track: Vec<Coordinate>,
    /// Number of successful polls applied since the tracker was created
    pub updates: u64,
}

impl TrackerState {
    /// See [Track::segments]
    pub fn segments(&self) -> Vec<Vec<Coordinate>> {
        split_segments(self.track.iter().copied())
    }
}
