//! Per-write state-change notifications.
//!
//! Listeners subscribe to one write id and are removed when their
//! [`Subscription`] is dropped, so a long batch never accumulates dead
//! listeners.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::mpsc;

use super::{WriteId, WriteState};

#[derive(Default)]
struct Listeners {
    next_token: u64,
    by_id: HashMap<WriteId, Vec<(u64, mpsc::UnboundedSender<WriteState>)>>,
}

/// Registry of state-change listeners keyed by write id.
#[derive(Clone, Default)]
pub struct StateRegistry {
    inner: Arc<Mutex<Listeners>>,
}

impl StateRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Listeners> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Subscribe to changes of `id`. The listener lives as long as the returned handle.
    pub fn subscribe(&self, id: WriteId) -> Subscription {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut listeners = self.lock();
        let token = listeners.next_token;
        listeners.next_token += 1;
        listeners.by_id.entry(id).or_default().push((token, tx));
        Subscription {
            registry: self.clone(),
            id,
            token,
            rx,
        }
    }

    /// Deliver `state` to every listener of `id`. Returns how many received it.
    pub fn publish(&self, id: WriteId, state: WriteState) -> usize {
        let mut listeners = self.lock();
        let Some(entries) = listeners.by_id.get_mut(&id) else {
            return 0;
        };
        entries.retain(|(_, tx)| tx.send(state).is_ok());
        let delivered = entries.len();
        if entries.is_empty() {
            listeners.by_id.remove(&id);
        }
        delivered
    }

    fn unsubscribe(&self, id: WriteId, token: u64) {
        let mut listeners = self.lock();
        if let Some(entries) = listeners.by_id.get_mut(&id) {
            entries.retain(|(t, _)| *t != token);
            if entries.is_empty() {
                listeners.by_id.remove(&id);
            }
        }
    }

    /// Number of live listeners across all ids.
    pub fn listener_count(&self) -> usize {
        self.lock().by_id.values().map(Vec::len).sum()
    }
}

impl std::fmt::Debug for StateRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StateRegistry")
            .field("listener_count", &self.listener_count())
            .finish()
    }
}

/// Live listener for one write id; unsubscribes on drop.
pub struct Subscription {
    registry: StateRegistry,
    id: WriteId,
    token: u64,
    rx: mpsc::UnboundedReceiver<WriteState>,
}

impl Subscription {
    pub fn id(&self) -> WriteId {
        self.id
    }

    /// Next state change for this id.
    pub async fn recv(&mut self) -> Option<WriteState> {
        self.rx.recv().await
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.registry.unsubscribe(self.id, self.token);
    }
}
