use anyhow::ensure;
use chrono::{DateTime, Utc};
use log::{debug, error, info, warn};
use std::{
    sync::{
        Arc, Mutex as StdMutex, MutexGuard as StdMutexGuard,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};
use tokio::{sync::Mutex, task::JoinHandle, time::MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::{
    error::FetchError,
    location::LocationFetcher,
    observers::{ErrorObserver, ObserverRegistry, StateObserver, Subscription},
    prelude::*,
    settings::TrackerSettings,
    state::{TrackerCore, TrackerState},
};

/// Convenience alias for UTC DT
pub type UtcDT = DateTime<Utc>;

#[derive(Debug, Clone, PartialEq)]
/// What happened during a single tick
pub enum TickOutcome {
    /// The poll succeeded and observers were sent the new state
    Updated,
    /// The poll failed, state is unchanged
    Failed(FetchError),
    /// Another poll was still running, so this tick was skipped
    InFlight,
    /// The tracker isn't running (or was stopped mid-tick), nothing was applied
    Stopped,
}

enum RunState {
    Stopped,
    Running {
        interval: Duration,
        cancel: CancellationToken,
        task: JoinHandle<()>,
    },
}

impl RunState {
    /// A task that ended on its own (a panicking fetcher) counts as stopped
    fn is_live(&self) -> bool {
        matches!(self, Self::Running { task, .. } if !task.is_finished())
    }
}

/// Marks a fetch as in flight for as long as it's held
struct InFlightGuard<'a>(&'a AtomicBool);

impl<'a> InFlightGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

struct Shared<F: LocationFetcher> {
    fetcher: F,
    state: Mutex<TrackerCore>,
    observers: Arc<ObserverRegistry>,
    in_flight: AtomicBool,
}

impl<F: LocationFetcher> Shared<F> {
    /// Perform one fetch and apply the result, unless `cancel` fires first.
    async fn tick(&self, cancel: &CancellationToken) -> TickOutcome {
        if cancel.is_cancelled() {
            return TickOutcome::Stopped;
        }

        let Some(_guard) = InFlightGuard::acquire(&self.in_flight) else {
            debug!("Previous poll still in flight, skipping tick");
            return TickOutcome::InFlight;
        };

        let res = tokio::select! {
            biased;

            _ = cancel.cancelled() => {
                debug!("Tracker stopped while a poll was in flight, abandoning it");
                return TickOutcome::Stopped;
            }

            res = self.fetcher.fetch() => res,
        };

        // Taken for both outcomes so `stop` can use the lock as a barrier
        let mut state = self.state.lock().await;

        if cancel.is_cancelled() {
            debug!("Discarding poll result that arrived after stop");
            return TickOutcome::Stopped;
        }

        match res {
            Ok(fix) => {
                state.apply(fix);
                let snapshot = state.snapshot();
                debug!(
                    "ISS at ({}, {}), track has {} points",
                    fix.coordinate.latitude(),
                    fix.coordinate.longitude(),
                    snapshot.track.len()
                );
                self.observers.notify_state(&snapshot);
                TickOutcome::Updated
            }
            Err(why) => {
                warn!("Failed to poll ISS position ({}): {why}", why.kind());
                self.observers.notify_error(&why);
                TickOutcome::Failed(why)
            }
        }
    }

    async fn main_loop(&self, interval: Duration, cancel: CancellationToken) {
        let mut ticker = tokio::time::interval(interval);

        // A slow poll shouldn't cause a burst of catch-up polls afterward
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                biased;

                _ = cancel.cancelled() => {
                    break;
                }

                _ = ticker.tick() => {
                    if self.tick(&cancel).await == TickOutcome::Stopped {
                        break;
                    }
                }
            }
        }

        debug!("Tracker loop exited");
    }
}

/// Polls a [LocationFetcher] on a fixed interval, keeping the latest coordinate and a bounded
/// track, and publishing a [TrackerState] snapshot to subscribers after every successful poll.
///
/// The tracker starts out stopped. [Tracker::start] spawns the polling task onto the current
/// tokio runtime, [Tracker::stop] cancels it. At most one poll is ever in flight.
pub struct Tracker<F: LocationFetcher> {
    shared: Arc<Shared<F>>,
    run: StdMutex<RunState>,
    settings: TrackerSettings,
}

impl<F: LocationFetcher> Tracker<F> {
    pub fn new(fetcher: F, settings: TrackerSettings) -> Result<Self> {
        settings.validate().context("Invalid tracker settings")?;

        let shared = Shared {
            fetcher,
            state: Mutex::new(TrackerCore::new(settings.max_track_len)),
            observers: Arc::new(ObserverRegistry::default()),
            in_flight: AtomicBool::new(false),
        };

        Ok(Self {
            shared: Arc::new(shared),
            run: StdMutex::new(RunState::Stopped),
            settings,
        })
    }

    fn lock_run(&self) -> StdMutexGuard<'_, RunState> {
        self.run.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Settings the tracker was created with. [Tracker::start] may poll at a different interval,
    /// see [Tracker::interval].
    pub fn settings(&self) -> &TrackerSettings {
        &self.settings
    }

    pub fn is_running(&self) -> bool {
        self.lock_run().is_live()
    }

    /// Interval of the current run, `None` while stopped
    pub fn interval(&self) -> Option<Duration> {
        let run = self.lock_run();
        match &*run {
            RunState::Running { interval, .. } if run.is_live() => Some(*interval),
            _ => None,
        }
    }

    /// Start polling every `interval`, the first poll happens immediately.
    /// Returns `false` without doing anything if the tracker is already running.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(&self, interval: Duration) -> Result<bool> {
        ensure!(!interval.is_zero(), "Poll interval must be non-zero");

        let mut run = self.lock_run();

        if run.is_live() {
            debug!("Tracker already running, ignoring start");
            return Ok(false);
        }

        if let RunState::Running { cancel, .. } = &*run {
            warn!("Previous tracker task ended unexpectedly, replacing it");
            cancel.cancel();
        }

        let cancel = CancellationToken::new();
        let task = tokio::spawn({
            let shared = self.shared.clone();
            let cancel = cancel.clone();
            async move { shared.main_loop(interval, cancel).await }
        });

        *run = RunState::Running {
            interval,
            cancel,
            task,
        };

        info!("Tracker started, polling every {interval:?}");

        Ok(true)
    }

    /// [Tracker::start] with the interval from [TrackerSettings]
    pub fn start_default(&self) -> Result<bool> {
        self.start(self.settings.interval)
    }

    /// Stop polling. Once this returns no more state changes or notifications will happen, even
    /// if a poll was in flight. Returns `false` if the tracker wasn't running.
    pub async fn stop(&self) -> bool {
        let prev = {
            let mut run = self.lock_run();
            if let RunState::Running { cancel, .. } = &*run {
                cancel.cancel();
            }
            std::mem::replace(&mut *run, RunState::Stopped)
        };

        let was_running = if let RunState::Running { task, .. } = prev {
            if let Err(why) = task.await {
                error!("Tracker task ended abnormally: {why:?}");
            }
            true
        } else {
            false
        };

        // A tick may be mid-update, wait for it to see the cancellation. Done on both paths so a
        // stop racing another stop still returns after the last update.
        drop(self.shared.state.lock().await);

        if was_running {
            info!("Tracker stopped");
        }

        was_running
    }

    /// Poll right now instead of waiting for the next tick. Skipped if a poll is already in
    /// flight or the tracker is stopped.
    pub async fn poll_now(&self) -> TickOutcome {
        let cancel = {
            let run = self.lock_run();
            match &*run {
                RunState::Running { cancel, .. } if run.is_live() => cancel.clone(),
                _ => return TickOutcome::Stopped,
            }
        };

        self.shared.tick(&cancel).await
    }

    /// Get a snapshot of the current state
    pub async fn current_state(&self) -> TrackerState {
        self.shared.state.lock().await.snapshot()
    }

    /// Register an observer to receive a snapshot after every successful poll
    pub fn subscribe(&self, observer: impl StateObserver + 'static) -> Subscription {
        self.shared.observers.add_state(observer)
    }

    /// Register an observer to receive every failed poll
    pub fn subscribe_errors(&self, observer: impl ErrorObserver + 'static) -> Subscription {
        self.shared.observers.add_error(observer)
    }

    pub fn observer_count(&self) -> usize {
        self.shared.observers.len()
    }
}

impl<F: LocationFetcher> Drop for Tracker<F> {
    fn drop(&mut self) {
        if let RunState::Running { cancel, .. } = &*self.lock_run() {
            cancel.cancel();
        }
    }
}
