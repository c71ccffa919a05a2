use std::sync::Mutex;

use tokio::sync::mpsc;

/// Fans a single authoritative stream out to any number of subscribers.
///
/// The upstream feed is a bounded channel fed with a blocking `send` — the
/// authoritative stream (trades, metrics) is never dropped from. Each
/// registered subscriber gets its own bounded channel fed non-blockingly;
/// a subscriber that falls behind has its channel's messages dropped
/// rather than slowing down or blocking the broadcaster.
pub struct Hub<T: Clone + Send + 'static> {
    subscribers: Mutex<Vec<mpsc::Sender<T>>>,
    subscriber_capacity: usize,
}

impl<T: Clone + Send + 'static> Hub<T> {
    pub fn new(subscriber_capacity: usize) -> Self {
        Self {
            subscribers: Mutex::new(Vec::new()),
            subscriber_capacity,
        }
    }

    /// Registers a new subscriber and returns its receiving half.
    pub fn subscribe(&self) -> mpsc::Receiver<T> {
        let (tx, rx) = mpsc::channel(self.subscriber_capacity);
        self.subscribers.lock().expect("hub lock poisoned").push(tx);
        rx
    }

    /// Delivers one message to every currently-registered subscriber,
    /// dropping the message (and logging) for any that is full or closed.
    /// Closed subscribers are pruned from the registry.
    pub fn publish(&self, msg: T) {
        let mut subs = self.subscribers.lock().expect("hub lock poisoned");
        subs.retain(|tx| match tx.try_send(msg.clone()) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(_)) => {
                tracing::warn!("subscriber lagging, dropping message");
                true
            }
            Err(mpsc::error::TrySendError::Closed(_)) => false,
        });
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.lock().expect("hub lock poisoned").len()
    }
}
