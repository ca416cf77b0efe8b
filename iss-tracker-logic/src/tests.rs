use std::{
    collections::VecDeque,
    sync::{
        Mutex,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use chrono::{TimeZone, Utc};

use crate::{Coordinate, FetchError, FetchResult, Fix, LocationFetcher};

pub fn fix(lat: f64, long: f64) -> Fix {
    Fix {
        coordinate: Coordinate::new(lat, long).expect("Invalid test coordinate"),
        observed_at: Utc
            .timestamp_opt(1_700_000_000, 0)
            .single()
            .expect("Invalid test timestamp"),
    }
}

/// Decrements the in-flight count even if the fetch future is dropped part way through
struct InFlight<'a>(&'a AtomicUsize);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Fetcher that plays back a script of results, then repeats a fallback forever
pub struct MockFetcher {
    script: Mutex<VecDeque<FetchResult>>,
    fallback: FetchResult,
    delay: Duration,
    calls: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl MockFetcher {
    fn new(script: VecDeque<FetchResult>, fallback: FetchResult) -> Self {
        Self {
            script: Mutex::new(script),
            fallback,
            delay: Duration::ZERO,
            calls: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        }
    }

    pub fn scripted(script: impl IntoIterator<Item = FetchResult>) -> Self {
        Self::new(
            script.into_iter().collect(),
            Err(FetchError::Network("Mock script exhausted".to_string())),
        )
    }

    pub fn repeating(result: FetchResult) -> Self {
        Self::new(VecDeque::new(), result)
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    fn next_result(&self) -> FetchResult {
        let mut script = self.script.lock().unwrap();
        script.pop_front().unwrap_or_else(|| self.fallback.clone())
    }
}

impl LocationFetcher for MockFetcher {
    async fn fetch(&self) -> FetchResult {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        let _in_flight = InFlight(&self.in_flight);
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        self.next_result()
    }
}
