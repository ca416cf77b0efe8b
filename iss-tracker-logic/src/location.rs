use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{error::FetchError, tracker::UtcDT};

/// A "part" of a coordinate, in decimal degrees
pub type CoordinateComponent = f64;

pub const LATITUDE_RANGE: (CoordinateComponent, CoordinateComponent) = (-90.0, 90.0);
pub const LONGITUDE_RANGE: (CoordinateComponent, CoordinateComponent) = (-180.0, 180.0);

#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum CoordinateError {
    #[error("latitude must be between -90 and 90 degrees, got {0}")]
    Latitude(CoordinateComponent),
    #[error("longitude must be between -180 and 180 degrees, got {0}")]
    Longitude(CoordinateComponent),
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
/// A validated point on the globe (WGS84 decimal degrees)
pub struct Coordinate {
    latitude: CoordinateComponent,
    longitude: CoordinateComponent,
}

fn within(
    value: CoordinateComponent,
    (min, max): (CoordinateComponent, CoordinateComponent),
) -> bool {
    // NaN fails both comparisons
    value >= min && value <= max
}

impl Coordinate {
    pub fn new(
        latitude: CoordinateComponent,
        longitude: CoordinateComponent,
    ) -> Result<Self, CoordinateError> {
        if !within(latitude, LATITUDE_RANGE) {
            return Err(CoordinateError::Latitude(latitude));
        }
        if !within(longitude, LONGITUDE_RANGE) {
            return Err(CoordinateError::Longitude(longitude));
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }

    pub fn latitude(&self) -> CoordinateComponent {
        self.latitude
    }

    pub fn longitude(&self) -> CoordinateComponent {
        self.longitude
    }
}

#[derive(Deserialize)]
struct RawCoordinate {
    latitude: CoordinateComponent,
    longitude: CoordinateComponent,
}

// Deserializing goes through `new` so a snapshot read back from JSON can't hold an invalid point
impl<'de> Deserialize<'de> for Coordinate {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = RawCoordinate::deserialize(deserializer)?;
        Coordinate::new(raw.latitude, raw.longitude).map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
/// A coordinate as reported by a [LocationFetcher], along with when the source observed it
pub struct Fix {
    pub coordinate: Coordinate,
    pub observed_at: UtcDT,
}

pub type FetchResult = Result<Fix, FetchError>;

pub trait LocationFetcher: Send + Sync + 'static {
    /// Perform exactly one request for the current position. Implementations must not retry or
    /// cache, and must report every failure as a [FetchError] rather than panicking.
    fn fetch(&self) -> impl Future<Output = FetchResult> + Send;
}

impl<T: LocationFetcher> LocationFetcher for Arc<T> {
    fn fetch(&self) -> impl Future<Output = FetchResult> + Send {
        (**self).fetch()
    }
}
