//! Snapshot fan-out for a single collection.

use tokio::sync::mpsc;

use vault_core::feed::{Collection, Snapshot, Subscription};

/// Subscribers of one collection feed.
#[derive(Debug)]
pub struct FeedHub<T> {
    /// The collection this hub publishes.
    collection: Collection,
    /// Live subscriber channels.
    subscribers: Vec<mpsc::UnboundedSender<Snapshot<T>>>,
}

impl<T: Clone> FeedHub<T> {
    /// Creates a hub with no subscribers.
    pub fn new(collection: Collection) -> Self {
        Self {
            collection,
            subscribers: Vec::new(),
        }
    }

    /// Registers a subscriber and queues the current snapshot for it.
    pub fn subscribe(&mut self, current: Vec<T>) -> Subscription<T> {
        let (tx, rx) = mpsc::unbounded_channel();
        if tx.send(Snapshot::new(self.collection, current)).is_ok() {
            self.subscribers.push(tx);
        }
        rx
    }

    /// Sends `docs` to every subscriber, dropping the ones that went away.
    pub fn publish(&mut self, docs: Vec<T>) {
        let collection = self.collection;
        self.subscribers
            .retain(|tx| tx.send(Snapshot::new(collection, docs.clone())).is_ok());
    }

    /// Returns the number of live subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.iter().filter(|tx| !tx.is_closed()).count()
    }
}
