use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::RwLock;

use chrono::Utc;
use serde_json::Value;
use tokio::sync::watch;

use super::types::{Promise, PromiseState};

static COUNTER: AtomicUsize = AtomicUsize::new(1);

struct Slot {
    promise: Promise,
    seq: u64,
    // set while an execution owns this pending promise
    running: Option<watch::Receiver<Option<Promise>>>,
}

#[derive(Default)]
struct Slots {
    by_id: HashMap<String, Slot>,
    next_seq: u64,
}

/// Outcome of [`PromiseStore::claim`].
pub enum Claim {
    /// Already settled; replay it.
    Settled(Promise),
    /// Another execution owns the id; wait for it.
    Running(watch::Receiver<Option<Promise>>),
    /// The caller owns the execution and must [`PromiseStore::settle`] it.
    Owned(Execution),
}

pub struct Execution {
    pending: Promise,
    done: watch::Sender<Option<Promise>>,
}

/// In-memory promise store. Outlives any single execution context so
/// completed invocations can be replayed by id.
#[derive(Default)]
pub struct PromiseStore {
    slots: RwLock<Slots>,
}

impl PromiseStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Settled, running or owned: decided under a single write lock so one
    /// id never has two executions at once.
    ///
    /// A pending record whose owner went away without settling is taken
    /// over by the caller.
    pub fn claim(&self, id: &str, func: &str, args: Value) -> Claim {
        let mut slots = match self.slots.write() {
            Ok(lock) => lock,
            Err(poisoned) => poisoned.into_inner(),
        };

        if let Some(slot) = slots.by_id.get(id) {
            if slot.promise.is_completed() {
                return Claim::Settled(slot.promise.clone());
            }
            if let Some(running) = &slot.running {
                if running.has_changed().is_ok() {
                    return Claim::Running(running.clone());
                }
            }
        }

        let (done, running) = watch::channel(None);
        let pending = Promise {
            id: id.to_string(),
            func: func.to_string(),
            args,
            state: PromiseState::Pending,
            value: None,
            error: None,
            created_at: Utc::now(),
            completed_at: None,
        };
        let seq = slots.next_seq;
        slots.next_seq += 1;
        slots.by_id.insert(
            id.to_string(),
            Slot {
                promise: pending.clone(),
                seq,
                running: Some(running),
            },
        );
        Claim::Owned(Execution { pending, done })
    }

    /// Records the outcome of an owned execution and wakes its waiters.
    pub fn settle(&self, execution: Execution, outcome: Result<Value, String>) -> Promise {
        let Execution { mut pending, done } = execution;
        match outcome {
            Ok(value) => {
                pending.state = PromiseState::Resolved;
                pending.value = Some(value);
            }
            Err(error) => {
                pending.state = PromiseState::Rejected;
                pending.error = Some(error);
            }
        }
        pending.completed_at = Some(Utc::now());

        {
            let mut slots = match self.slots.write() {
                Ok(lock) => lock,
                Err(poisoned) => poisoned.into_inner(),
            };
            let existing = slots.by_id.get(&pending.id).map(|slot| slot.seq);
            let seq = match existing {
                Some(seq) => seq,
                None => {
                    let seq = slots.next_seq;
                    slots.next_seq += 1;
                    seq
                }
            };
            slots.by_id.insert(
                pending.id.clone(),
                Slot {
                    promise: pending.clone(),
                    seq,
                    running: None,
                },
            );
        }
        done.send_replace(Some(pending.clone()));
        pending
    }

    pub fn get(&self, id: &str) -> Option<Promise> {
        let slots = self.slots.read().ok()?;
        slots.by_id.get(id).map(|slot| slot.promise.clone())
    }

    /// Newest first, by claim order.
    pub fn list(&self, limit: usize) -> Vec<Promise> {
        let slots = match self.slots.read() {
            Ok(lock) => lock,
            Err(_) => return vec![],
        };
        let mut items: Vec<&Slot> = slots.by_id.values().collect();
        items.sort_by(|a, b| b.seq.cmp(&a.seq));
        items.into_iter().take(limit).map(|slot| slot.promise.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.slots.read().map(|slots| slots.by_id.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Waits for the owner of a running promise to settle it. `None` means the
/// owner went away first.
pub async fn wait_settled(mut running: watch::Receiver<Option<Promise>>) -> Option<Promise> {
    loop {
        let current = running.borrow().clone();
        if current.is_some() {
            return current;
        }
        if running.changed().await.is_err() {
            return running.borrow().clone();
        }
    }
}

pub fn next_id(func: &str) -> String {
    let count = COUNTER.fetch_add(1, Ordering::SeqCst);
    format!("{}_{}_{}", func, Utc::now().timestamp_millis(), count)
}
