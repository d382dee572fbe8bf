//! Request/reply correlation
//!
//! Every outbound read registers a pending request under a fresh msg
//! counter. The entry holds a oneshot reply slot and a deadline:
//! - the inbound reply takes the entry and fulfills the slot exactly once;
//!   it must come from the device and feature the request went to
//! - the caller awaits the slot through its [`ReplyHandle`]
//! - overdue entries fail with `RequestTimeout` and are dropped
//! - removing a remote device cancels all of its entries

use std::collections::HashMap;
use std::sync::{Arc, Weak};
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::oneshot;
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::error::{Result, SpineError};
use crate::model::{FeatureAddress, FunctionData, FunctionType, MsgCounter};

/// Default time to wait for a reply
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// What a reply slot resolves to: the replied data, or `None` for a bare
/// success result
pub type ReplyResult = Result<Option<FunctionData>>;

/// Entry taken out of the table when its reply arrives
#[derive(Debug)]
pub struct PendingEntry {
    pub msg_counter: MsgCounter,
    pub ski: String,
    pub function: FunctionType,
    /// Remote feature the request was sent to
    pub destination: FeatureAddress,
    reply_tx: oneshot::Sender<ReplyResult>,
}

impl PendingEntry {
    /// Resolve the caller's reply slot
    pub fn fulfill(self, result: ReplyResult) {
        if self.reply_tx.send(result).is_err() {
            debug!("Reply to {} arrived after the caller went away", self.msg_counter);
        }
    }
}

struct Slot {
    deadline: Instant,
    entry: PendingEntry,
}

/// Table of outstanding requests keyed by msg counter
pub struct PendingRequests {
    slots: Mutex<HashMap<MsgCounter, Slot>>,
    next_counter: Mutex<MsgCounter>,
    timeout: Duration,
}

impl PendingRequests {
    pub fn new(timeout: Duration) -> Arc<Self> {
        Arc::new(Self {
            slots: Mutex::new(HashMap::new()),
            next_counter: Mutex::new(1),
            timeout,
        })
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Mint a msg counter that is not currently pending
    pub fn next_msg_counter(&self) -> MsgCounter {
        let slots = self.slots.lock();
        let mut next = self.next_counter.lock();
        loop {
            let counter = *next;
            *next = next.wrapping_add(1).max(1);
            if !slots.contains_key(&counter) {
                return counter;
            }
        }
    }

    /// Register a request to feature `destination` of `ski` and return the
    /// caller's handle
    pub fn register(
        self: &Arc<Self>,
        ski: &str,
        function: FunctionType,
        destination: &FeatureAddress,
    ) -> ReplyHandle {
        self.expire_overdue();

        let msg_counter = self.next_msg_counter();
        let (reply_tx, reply_rx) = oneshot::channel();
        let deadline = Instant::now() + self.timeout;

        self.slots.lock().insert(
            msg_counter,
            Slot {
                deadline,
                entry: PendingEntry {
                    msg_counter,
                    ski: ski.to_string(),
                    function,
                    destination: destination.clone(),
                    reply_tx,
                },
            },
        );

        debug!("Pending: {} for {} at {} ({})", msg_counter, function, ski, destination);

        ReplyHandle {
            msg_counter,
            deadline,
            reply_rx,
            pending: Arc::downgrade(self),
        }
    }

    /// Take the entry a reply refers to
    pub fn take(&self, msg_counter: MsgCounter) -> Option<PendingEntry> {
        self.slots.lock().remove(&msg_counter).map(|slot| slot.entry)
    }

    /// Take the entry only if it was addressed to feature `source` of `ski`.
    /// A mismatching answer leaves the entry pending.
    pub fn take_for(&self, msg_counter: MsgCounter, ski: &str, source: &FeatureAddress) -> Option<PendingEntry> {
        let mut slots = self.slots.lock();
        match slots.get(&msg_counter) {
            Some(slot) if slot.entry.ski == ski && slot.entry.destination == *source => {
                slots.remove(&msg_counter).map(|slot| slot.entry)
            }
            Some(slot) => {
                warn!(
                    "Pending: {} answered by {} at {} but was sent to {} at {}",
                    msg_counter, source, ski, slot.entry.destination, slot.entry.ski
                );
                None
            }
            None => None,
        }
    }

    /// Drop an entry without resolving it
    pub fn remove(&self, msg_counter: MsgCounter) -> bool {
        self.slots.lock().remove(&msg_counter).is_some()
    }

    /// Fail and drop all entries past their deadline
    pub fn expire_overdue(&self) -> usize {
        let now = Instant::now();
        let expired: Vec<PendingEntry> = {
            let mut slots = self.slots.lock();
            let overdue: Vec<MsgCounter> = slots
                .iter()
                .filter(|(_, slot)| slot.deadline <= now)
                .map(|(counter, _)| *counter)
                .collect();
            overdue
                .into_iter()
                .filter_map(|counter| slots.remove(&counter))
                .map(|slot| slot.entry)
                .collect()
        };

        for entry in &expired {
            warn!("Pending: {} ({}) timed out", entry.msg_counter, entry.function);
        }
        let count = expired.len();
        for entry in expired {
            let counter = entry.msg_counter;
            entry.fulfill(Err(SpineError::RequestTimeout(counter)));
        }
        count
    }

    /// Cancel every entry addressed to `ski`
    pub fn cancel_device(&self, ski: &str) -> usize {
        let cancelled: Vec<PendingEntry> = {
            let mut slots = self.slots.lock();
            let counters: Vec<MsgCounter> = slots
                .iter()
                .filter(|(_, slot)| slot.entry.ski == ski)
                .map(|(counter, _)| *counter)
                .collect();
            counters
                .into_iter()
                .filter_map(|counter| slots.remove(&counter))
                .map(|slot| slot.entry)
                .collect()
        };

        let count = cancelled.len();
        for entry in cancelled {
            let counter = entry.msg_counter;
            entry.fulfill(Err(SpineError::Cancelled(counter)));
        }
        if count > 0 {
            debug!("Pending: cancelled {} requests to {}", count, ski);
        }
        count
    }

    pub fn contains(&self, msg_counter: MsgCounter) -> bool {
        self.slots.lock().contains_key(&msg_counter)
    }

    pub fn len(&self) -> usize {
        self.slots.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Caller side of a pending request
#[derive(Debug)]
pub struct ReplyHandle {
    msg_counter: MsgCounter,
    deadline: Instant,
    reply_rx: oneshot::Receiver<ReplyResult>,
    pending: Weak<PendingRequests>,
}

impl ReplyHandle {
    pub fn msg_counter(&self) -> MsgCounter {
        self.msg_counter
    }

    /// Non-blocking check for a reply
    pub fn try_result(&mut self) -> Option<ReplyResult> {
        self.reply_rx.try_recv().ok()
    }

    /// Wait for the reply until the request deadline
    pub async fn wait(self) -> ReplyResult {
        let ReplyHandle {
            msg_counter,
            deadline,
            reply_rx,
            pending,
        } = self;

        match tokio::time::timeout_at(deadline, reply_rx).await {
            Ok(Ok(result)) => result,
            Ok(Err(_)) => Err(SpineError::Cancelled(msg_counter)),
            Err(_) => {
                if let Some(pending) = pending.upgrade() {
                    pending.remove(msg_counter);
                }
                Err(SpineError::RequestTimeout(msg_counter))
            }
        }
    }
}
