mod error;
mod location;
mod observers;
mod settings;
mod state;
#[cfg(test)]
mod tests;
mod track;
mod tracker;

pub use error::FetchError;
pub use location::{
    Coordinate, CoordinateComponent, CoordinateError, FetchResult, Fix, LATITUDE_RANGE,
    LONGITUDE_RANGE, LocationFetcher,
};
pub use observers::{ErrorObserver, StateObserver, Subscription, SubscriptionId};
pub use settings::{DEFAULT_INTERVAL, DEFAULT_MAX_TRACK_LEN, TrackerSettings};
pub use state::TrackerState;
pub use track::Track;
pub use tracker::{TickOutcome, Tracker, UtcDT};

pub mod prelude {
    use anyhow::Error as AnyhowError;
    use std::result::Result as StdResult;
    pub type Result<T = (), E = AnyhowError> = StdResult<T, E>;
    pub use anyhow::Context;
}
