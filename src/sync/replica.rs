use crate::state::{EffectKind, GameSnapshot, GameStore, ScheduledEffect, SchedulerRequest};
use crate::types::TimerState;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{watch, Mutex};
use tokio::task::AbortHandle;

/// One store plus the timers for its delayed effects.
///
/// Every mutation goes through [`Replica::mutate`], which publishes the new
/// snapshot to subscribers and turns the store's scheduler requests into
/// tokio tasks. Cloning shares the same replica.
#[derive(Clone)]
pub struct Replica {
    inner: Arc<Inner>,
}

struct Inner {
    state: Mutex<ReplicaState>,
    snapshot_tx: watch::Sender<GameSnapshot>,
}

struct ReplicaState {
    store: GameStore,
    effects: HashMap<EffectKind, AbortHandle>,
}

impl Replica {
    pub fn new(store: GameStore) -> Self {
        let (snapshot_tx, _rx) = watch::channel(store.snapshot().clone());
        Self {
            inner: Arc::new(Inner {
                state: Mutex::new(ReplicaState {
                    store,
                    effects: HashMap::new(),
                }),
                snapshot_tx,
            }),
        }
    }

    /// Run `f` against the store, then publish and schedule
    pub async fn mutate<R>(&self, f: impl FnOnce(&mut GameStore) -> R) -> R {
        let mut state = self.inner.state.lock().await;
        let result = f(&mut state.store);

        for request in state.store.drain_scheduler_requests() {
            match request {
                SchedulerRequest::Schedule(effect) => {
                    let handle = spawn_effect(Arc::clone(&self.inner), effect.clone());
                    if let Some(previous) = state.effects.insert(effect.kind, handle) {
                        previous.abort();
                    }
                }
                SchedulerRequest::Cancel(kind) => {
                    if let Some(previous) = state.effects.remove(&kind) {
                        previous.abort();
                    }
                }
            }
        }

        self.inner.publish(state.store.snapshot());
        result
    }

    /// Read the store under the same lock as mutations
    pub async fn inspect<R>(&self, f: impl FnOnce(&GameStore) -> R) -> R {
        let state = self.inner.state.lock().await;
        f(&state.store)
    }

    /// Latest published snapshot
    pub fn snapshot(&self) -> GameSnapshot {
        self.inner.snapshot_tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<GameSnapshot> {
        self.inner.snapshot_tx.subscribe()
    }

    pub fn timer(&self) -> TimerState {
        self.inner.snapshot_tx.borrow().timer
    }

    /// Advance the local countdown by one second
    pub async fn tick(&self) -> TimerState {
        self.mutate(|store| {
            store.tick();
            store.snapshot().timer
        })
        .await
    }

    pub async fn restore(&self, snapshot: GameSnapshot) {
        self.mutate(|store| store.restore(snapshot)).await
    }

    /// Number of delayed effects with a live timer task
    pub async fn pending_effects(&self) -> usize {
        let state = self.inner.state.lock().await;
        state.effects.values().filter(|h| !h.is_finished()).count()
    }
}

impl Inner {
    fn publish(&self, snapshot: &GameSnapshot) {
        self.snapshot_tx.send_if_modified(|current| {
            if current == snapshot {
                false
            } else {
                *current = snapshot.clone();
                true
            }
        });
    }
}

fn spawn_effect(inner: Arc<Inner>, effect: ScheduledEffect) -> AbortHandle {
    let task = tokio::spawn(async move {
        tokio::time::sleep(effect.delay).await;
        let mut state = inner.state.lock().await;
        if state.store.fire_deferred(&effect) {
            state.effects.remove(&effect.kind);
            inner.publish(state.store.snapshot());
        }
    });
    task.abort_handle()
}
