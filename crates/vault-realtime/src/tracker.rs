//! First-snapshot tracking across every registered subscription.

use std::collections::HashMap;

use tokio::sync::watch;

use vault_core::feed::Collection;

/// First-snapshot flags of the registered subscriptions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadState {
    /// Collection → whether its first snapshot has been applied.
    flags: HashMap<Collection, bool>,
}

impl LoadState {
    /// Whether every registered subscription has delivered its first
    /// snapshot. Vacuously true with no registrations.
    pub fn is_loaded(&self) -> bool {
        self.flags.values().all(|loaded| *loaded)
    }

    /// Registered collections still waiting for their first snapshot.
    pub fn pending(&self) -> Vec<Collection> {
        self.flags
            .iter()
            .filter(|(_, loaded)| !**loaded)
            .map(|(collection, _)| *collection)
            .collect()
    }

    /// Number of registered subscriptions.
    pub fn registered(&self) -> usize {
        self.flags.len()
    }
}

/// Publishes the load state of a projection.
///
/// "Loaded" is the conjunction of every registered subscription's flag,
/// never the flag of whichever subscription happened to register last.
/// Register every subscription before any of them can deliver.
#[derive(Debug)]
pub struct LoadTracker {
    state: watch::Sender<LoadState>,
}

impl LoadTracker {
    pub fn new() -> Self {
        Self {
            state: watch::Sender::new(LoadState::default()),
        }
    }

    /// Registers a subscription as not yet loaded. Re-registering keeps
    /// the existing flag.
    pub fn register(&self, collection: Collection) {
        self.state.send_modify(|state| {
            state.flags.entry(collection).or_insert(false);
        });
    }

    /// Records that `collection` delivered a snapshot. Ignored for
    /// collections that are not registered.
    pub fn mark_loaded(&self, collection: Collection) {
        self.state.send_if_modified(|state| match state.flags.get_mut(&collection) {
            Some(loaded) if !*loaded => {
                *loaded = true;
                true
            }
            _ => false,
        });
    }

    /// Drops a subscription from the conjunction.
    pub fn unregister(&self, collection: Collection) {
        self.state.send_modify(|state| {
            state.flags.remove(&collection);
        });
    }

    pub fn is_loaded(&self) -> bool {
        self.state.borrow().is_loaded()
    }

    /// Current flags.
    pub fn snapshot(&self) -> LoadState {
        self.state.borrow().clone()
    }

    /// Receiver notified on every flag change.
    pub fn subscribe(&self) -> watch::Receiver<LoadState> {
        self.state.subscribe()
    }
}

impl Default for LoadTracker {
    fn default() -> Self {
        Self::new()
    }
}
