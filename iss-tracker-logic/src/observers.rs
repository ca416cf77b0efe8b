use std::{
    panic::{AssertUnwindSafe, catch_unwind},
    sync::{Arc, Mutex, MutexGuard, Weak},
};

use log::error;
use uuid::Uuid;

use crate::{error::FetchError, state::TrackerState};

pub type SubscriptionId = Uuid;

/// Receives a snapshot after every successful poll
pub trait StateObserver: Send + Sync {
    fn on_update(&self, state: &TrackerState);
}

impl<F: Fn(&TrackerState) + Send + Sync> StateObserver for F {
    fn on_update(&self, state: &TrackerState) {
        self(state)
    }
}

/// Receives every failed poll, for diagnostics. Failures never change tracker state.
pub trait ErrorObserver: Send + Sync {
    fn on_error(&self, error: &FetchError);
}

impl<F: Fn(&FetchError) + Send + Sync> ErrorObserver for F {
    fn on_error(&self, error: &FetchError) {
        self(error)
    }
}

/// Run a callback so a panic in it doesn't take the polling task down with it
fn isolated(kind: &str, id: SubscriptionId, callback: impl FnOnce()) {
    if catch_unwind(AssertUnwindSafe(callback)).is_err() {
        error!("{kind} observer {id} panicked, skipping it for this update");
    }
}

#[derive(Clone)]
enum Observer {
    State(Arc<dyn StateObserver>),
    Error(Arc<dyn ErrorObserver>),
}

/// Ordered list of observers, notified in registration order
#[derive(Default)]
pub(crate) struct ObserverRegistry {
    entries: Mutex<Vec<(SubscriptionId, Observer)>>,
}

impl ObserverRegistry {
    fn lock(&self) -> MutexGuard<'_, Vec<(SubscriptionId, Observer)>> {
        // Observers run outside the lock, so a poisoned list is still consistent
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn add(self: &Arc<Self>, observer: Observer) -> Subscription {
        let id = Uuid::new_v4();
        self.lock().push((id, observer));
        Subscription {
            id,
            registry: Arc::downgrade(self),
        }
    }

    pub fn add_state(self: &Arc<Self>, observer: impl StateObserver + 'static) -> Subscription {
        self.add(Observer::State(Arc::new(observer)))
    }

    pub fn add_error(self: &Arc<Self>, observer: impl ErrorObserver + 'static) -> Subscription {
        self.add(Observer::Error(Arc::new(observer)))
    }

    pub fn remove(&self, id: SubscriptionId) -> bool {
        let mut entries = self.lock();
        let before = entries.len();
        entries.retain(|(entry_id, _)| *entry_id != id);
        entries.len() != before
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Copy the current observers out so callbacks can (un)subscribe without deadlocking
    fn current(&self) -> Vec<(SubscriptionId, Observer)> {
        self.lock().clone()
    }

    pub fn notify_state(&self, state: &TrackerState) {
        for (id, observer) in self.current() {
            if let Observer::State(observer) = observer {
                isolated("State", id, || observer.on_update(state));
            }
        }
    }

    pub fn notify_error(&self, error: &FetchError) {
        for (id, observer) in self.current() {
            if let Observer::Error(observer) = observer {
                isolated("Error", id, || observer.on_error(error));
            }
        }
    }
}

/// Handle returned when subscribing, used to stop receiving updates. Dropping the handle does
/// *not* unsubscribe.
#[derive(Debug)]
pub struct Subscription {
    id: SubscriptionId,
    registry: Weak<ObserverRegistry>,
}

impl Subscription {
    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    /// Remove the observer, returns `false` if it was already removed or the tracker is gone
    pub fn unsubscribe(self) -> bool {
        self.registry
            .upgrade()
            .is_some_and(|registry| registry.remove(self.id))
    }
}

impl std::fmt::Debug for ObserverRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObserverRegistry")
            .field("observers", &self.len())
            .finish()
    }
}
