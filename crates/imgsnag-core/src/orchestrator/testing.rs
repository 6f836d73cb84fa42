//! Scripted write service for orchestrator tests.

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::store::{StateRegistry, SubmitError, WriteId, WriteRequest, WriteService, WriteState};

/// What the scripted store does with the next submission.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Behavior {
    Reject,
    CompleteAfter(Duration),
    InterruptAfter(Duration),
    /// Finishes without publishing a notification.
    CompleteSilently(Duration),
    /// Stays in progress forever.
    Hang,
}

#[derive(Default)]
struct Inner {
    next_id: u64,
    states: HashMap<WriteId, WriteState>,
    script: VecDeque<Behavior>,
    submitted: Vec<WriteRequest>,
    max_in_flight: usize,
}

#[derive(Clone, Default)]
pub(crate) struct ScriptedStore {
    inner: Arc<Mutex<Inner>>,
    registry: StateRegistry,
}

impl ScriptedStore {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_script(script: impl IntoIterator<Item = Behavior>) -> Self {
        let store = Self::new();
        store.inner.lock().unwrap().script = script.into_iter().collect();
        store
    }

    pub(crate) fn clone_dyn(&self) -> Arc<dyn WriteService> {
        Arc::new(self.clone())
    }

    pub(crate) fn registry_ref(&self) -> &StateRegistry {
        &self.registry
    }

    fn allocate(&self, state: WriteState) -> WriteId {
        let mut inner = self.inner.lock().unwrap();
        inner.next_id += 1;
        let id = WriteId(inner.next_id);
        inner.states.insert(id, state);
        id
    }

    pub(crate) fn insert_state(&self, state: WriteState) -> WriteId {
        self.allocate(state)
    }

    pub(crate) fn set_silently(&self, id: WriteId, state: WriteState) {
        self.inner.lock().unwrap().states.insert(id, state);
    }

    pub(crate) fn transition(&self, id: WriteId, state: WriteState) {
        self.set_silently(id, state);
        self.registry.publish(id, state);
    }

    pub(crate) fn submitted(&self) -> Vec<WriteRequest> {
        self.inner.lock().unwrap().submitted.clone()
    }

    pub(crate) fn max_in_flight(&self) -> usize {
        self.inner.lock().unwrap().max_in_flight
    }

    fn finish_later(&self, id: WriteId, after: Duration, state: WriteState, notify: bool) {
        let store = self.clone();
        tokio::spawn(async move {
            tokio::time::sleep(after).await;
            if notify {
                store.transition(id, state);
            } else {
                store.set_silently(id, state);
            }
        });
    }
}

#[async_trait]
impl WriteService for ScriptedStore {
    async fn submit(&self, request: WriteRequest) -> Result<WriteId, SubmitError> {
        let behavior = {
            let mut inner = self.inner.lock().unwrap();
            inner.submitted.push(request.clone());
            let in_flight = inner
                .states
                .values()
                .filter(|s| !s.is_terminal())
                .count()
                + 1;
            inner.max_in_flight = inner.max_in_flight.max(in_flight);
            inner
                .script
                .pop_front()
                .unwrap_or(Behavior::CompleteAfter(Duration::from_millis(5)))
        };
        if let Behavior::Reject = behavior {
            return Err(SubmitError::Rejected("scripted".into()));
        }
        let id = self.allocate(WriteState::InProgress);
        match behavior {
            Behavior::CompleteAfter(d) => self.finish_later(id, d, WriteState::Complete, true),
            Behavior::InterruptAfter(d) => self.finish_later(id, d, WriteState::Interrupted, true),
            Behavior::CompleteSilently(d) => self.finish_later(id, d, WriteState::Complete, false),
            Behavior::Hang | Behavior::Reject => {}
        }
        Ok(id)
    }

    async fn query_state(&self, id: WriteId) -> Option<WriteState> {
        self.inner.lock().unwrap().states.get(&id).copied()
    }

    fn registry(&self) -> &StateRegistry {
        &self.registry
    }
}
