use std::time::Duration;

use anyhow::ensure;
use serde::{Deserialize, Serialize};

use crate::prelude::*;

/// Default time between polls
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(2);

/// Default number of points kept in the track. One ISS orbit takes roughly 92 minutes, so at the
/// default interval this holds about the last orbit.
pub const DEFAULT_MAX_TRACK_LEN: usize = 2760;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// Settings for a [crate::Tracker]
pub struct TrackerSettings {
    /// Time between polls, in milliseconds when serialized
    #[serde(with = "millis")]
    pub interval: Duration,
    /// Maximum number of points kept in the track, oldest points are dropped first
    pub max_track_len: usize,
}

impl TrackerSettings {
    pub fn validate(&self) -> Result {
        ensure!(!self.interval.is_zero(), "Poll interval must be non-zero");
        ensure!(
            self.max_track_len >= 1,
            "Track must be allowed to hold at least one point"
        );
        Ok(())
    }
}

impl Default for TrackerSettings {
    fn default() -> Self {
        Self {
            interval: DEFAULT_INTERVAL,
            max_track_len: DEFAULT_MAX_TRACK_LEN,
        }
    }
}

mod millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_millis().try_into().unwrap_or(u64::MAX))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        u64::deserialize(d).map(Duration::from_millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        TrackerSettings::default()
            .validate()
            .expect("Default settings should be valid");
    }

    #[test]
    fn test_rejects_zero() {
        let settings = TrackerSettings {
            interval: Duration::ZERO,
            ..Default::default()
        };
        assert!(settings.validate().is_err());

        let settings = TrackerSettings {
            max_track_len: 0,
            ..Default::default()
        };
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_interval_as_millis() {
        let json = serde_json::to_string(&TrackerSettings::default()).unwrap();
        assert_eq!(json, r#"{"interval":2000,"max_track_len":2760}"#);

        let back: TrackerSettings =
            serde_json::from_str(r#"{"interval":250,"max_track_len":5}"#).unwrap();
        assert_eq!(back.interval, Duration::from_millis(250));
        assert_eq!(back.max_track_len, 5);
    }
}
