//! Waiting for one write to reach a terminal state.
//!
//! Three producers race into a single-assignment slot:
//! - poll: query the state once, right away (the write may already be done)
//! - event: the first terminal notification for this write id
//! - timeout: after the bound, re-poll once and settle with whatever is known
//!
//! The first settle wins; later ones are ignored. Once settled, the other
//! producers are aborted and the subscription is dropped (unsubscribed).

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::task::JoinSet;

use super::DownloadOutcome;
use crate::store::{WriteId, WriteService};

/// Which producer settled the wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Detection {
    Poll,
    Event,
    Timeout,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Settlement {
    pub outcome: DownloadOutcome,
    pub detected_by: Detection,
}

/// First-write-wins completion slot shared by the producers.
#[derive(Clone)]
pub(crate) struct CompletionSlot {
    settled: Arc<AtomicBool>,
    tx: Arc<Mutex<Option<oneshot::Sender<Settlement>>>>,
}

impl CompletionSlot {
    pub(crate) fn new() -> (Self, oneshot::Receiver<Settlement>) {
        let (tx, rx) = oneshot::channel();
        let slot = Self {
            settled: Arc::new(AtomicBool::new(false)),
            tx: Arc::new(Mutex::new(Some(tx))),
        };
        (slot, rx)
    }

    /// Settles the slot. Returns false if another producer already did.
    pub(crate) fn settle(&self, outcome: DownloadOutcome, detected_by: Detection) -> bool {
        if self
            .settled
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return false;
        }
        let tx = self.tx.lock().unwrap_or_else(|e| e.into_inner()).take();
        if let Some(tx) = tx {
            let _ = tx.send(Settlement {
                outcome,
                detected_by,
            });
        }
        true
    }

    pub(crate) fn is_settled(&self) -> bool {
        self.settled.load(Ordering::Acquire)
    }
}

/// Waits until write `id` is terminal, or until `timeout` elapses.
///
/// Always returns; an indeterminate state at the final re-poll yields
/// [`DownloadOutcome::Timeout`].
pub async fn wait_for_terminal(
    store: Arc<dyn WriteService>,
    id: WriteId,
    timeout: Duration,
) -> Settlement {
    let (slot, settled) = CompletionSlot::new();
    let mut producers = JoinSet::new();

    // Subscribe before the first poll so a transition in between is not lost.
    let mut subscription = store.registry().subscribe(id);
    {
        let slot = slot.clone();
        producers.spawn(async move {
            while let Some(state) = subscription.recv().await {
                if let Some(outcome) = DownloadOutcome::from_terminal(state) {
                    slot.settle(outcome, Detection::Event);
                    break;
                }
            }
        });
    }
    {
        let slot = slot.clone();
        let store = Arc::clone(&store);
        producers.spawn(async move {
            let state = store.query_state(id).await;
            if let Some(outcome) = state.and_then(DownloadOutcome::from_terminal) {
                slot.settle(outcome, Detection::Poll);
            }
        });
    }
    {
        let slot = slot.clone();
        let store = Arc::clone(&store);
        producers.spawn(async move {
            tokio::time::sleep(timeout).await;
            if slot.is_settled() {
                return;
            }
            let outcome = store
                .query_state(id)
                .await
                .and_then(DownloadOutcome::from_terminal)
                .unwrap_or(DownloadOutcome::Timeout);
            slot.settle(outcome, Detection::Timeout);
        });
    }

    let settlement = match settled.await {
        Ok(s) => s,
        // Every producer ended without settling (e.g. one panicked).
        Err(_) => Settlement {
            outcome: DownloadOutcome::Timeout,
            detected_by: Detection::Timeout,
        },
    };
    producers.shutdown().await;
    settlement
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orchestrator::testing::ScriptedStore;
    use crate::store::WriteState;

    const BOUND: Duration = Duration::from_secs(60);

    #[test]
    fn slot_is_single_assignment() {
        let (slot, mut rx) = CompletionSlot::new();
        assert!(slot.settle(DownloadOutcome::Complete, Detection::Event));
        assert!(!slot.settle(DownloadOutcome::Timeout, Detection::Timeout));
        let got = rx.try_recv().unwrap();
        assert_eq!(got.outcome, DownloadOutcome::Complete);
        assert_eq!(got.detected_by, Detection::Event);
    }

    #[tokio::test(start_paused = true)]
    async fn already_finished_write_resolves_by_poll() {
        let store = ScriptedStore::new();
        let id = store.insert_state(WriteState::Complete);
        let s = wait_for_terminal(store.clone_dyn(), id, BOUND).await;
        assert_eq!(s.outcome, DownloadOutcome::Complete);
        assert_eq!(s.detected_by, Detection::Poll);
        assert_eq!(store.registry_ref().listener_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn notification_resolves_and_unsubscribes() {
        let store = ScriptedStore::new();
        let id = store.insert_state(WriteState::InProgress);
        let publisher = store.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(2)).await;
            publisher.transition(id, WriteState::InProgress);
            publisher.transition(id, WriteState::Interrupted);
        });
        let s = wait_for_terminal(store.clone_dyn(), id, BOUND).await;
        assert_eq!(s.outcome, DownloadOutcome::Interrupted);
        assert_eq!(s.detected_by, Detection::Event);
        assert_eq!(store.registry_ref().listener_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn lost_notification_falls_back_to_final_poll() {
        let store = ScriptedStore::new();
        let id = store.insert_state(WriteState::InProgress);
        // State changes without any notification being published.
        let silent = store.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(5)).await;
            silent.set_silently(id, WriteState::Complete);
        });
        let s = wait_for_terminal(store.clone_dyn(), id, BOUND).await;
        assert_eq!(s.outcome, DownloadOutcome::Complete);
        assert_eq!(s.detected_by, Detection::Timeout);
    }

    #[tokio::test(start_paused = true)]
    async fn indeterminate_state_times_out() {
        let store = ScriptedStore::new();
        let id = store.insert_state(WriteState::InProgress);
        let started = tokio::time::Instant::now();
        let s = wait_for_terminal(store.clone_dyn(), id, BOUND).await;
        assert_eq!(s.outcome, DownloadOutcome::Timeout);
        assert!(started.elapsed() >= BOUND);
        assert_eq!(store.registry_ref().listener_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn unknown_write_times_out() {
        let store = ScriptedStore::new();
        let s = wait_for_terminal(store.clone_dyn(), WriteId(999), Duration::from_millis(10)).await;
        assert_eq!(s.outcome, DownloadOutcome::Timeout);
    }
}
