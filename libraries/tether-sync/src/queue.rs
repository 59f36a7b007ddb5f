use crate::types::PendingItem;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// What to do when a bounded queue is full
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverflowPolicy {
    /// Evict the oldest item to make room
    #[default]
    DropOldest,
    /// Keep the queue as is and refuse the new item
    RejectNew,
}

/// Limits and durability of the pending queue
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueuePolicy {
    /// Maximum number of queued writes; `None` is unbounded
    #[serde(default)]
    pub max_pending: Option<usize>,
    #[serde(default)]
    pub overflow: OverflowPolicy,
    /// Mirror the queue into the local cache so it survives restarts
    #[serde(default)]
    pub persist: bool,
}

/// Result of pushing onto the queue
#[derive(Debug, Clone, PartialEq)]
pub enum Enqueued {
    Accepted,
    /// The new item went in; this one was evicted
    DroppedOldest(PendingItem),
    /// The new item was refused
    Rejected(PendingItem),
}

/// FIFO of writes that have not reached the remote store
#[derive(Debug, Clone, Default)]
pub struct PendingQueue {
    items: VecDeque<PendingItem>,
    policy: QueuePolicy,
}

impl PendingQueue {
    pub fn new(policy: QueuePolicy) -> Self {
        Self {
            items: VecDeque::new(),
            policy,
        }
    }

    /// Rebuild a queue from persisted items, applying the current bound.
    pub fn restore(policy: QueuePolicy, items: Vec<PendingItem>) -> Self {
        let mut queue = Self::new(policy);
        for item in items {
            queue.push(item);
        }
        queue
    }

    pub fn policy(&self) -> &QueuePolicy {
        &self.policy
    }

    pub fn push(&mut self, item: PendingItem) -> Enqueued {
        let Some(cap) = self.policy.max_pending else {
            self.items.push_back(item);
            return Enqueued::Accepted;
        };

        if self.items.len() < cap {
            self.items.push_back(item);
            return Enqueued::Accepted;
        }

        match self.policy.overflow {
            OverflowPolicy::DropOldest => match self.items.pop_front() {
                Some(oldest) => {
                    self.items.push_back(item);
                    Enqueued::DroppedOldest(oldest)
                }
                // cap == 0 keeps nothing
                None => Enqueued::Rejected(item),
            },
            OverflowPolicy::RejectNew => Enqueued::Rejected(item),
        }
    }

    /// Swap the queue for an empty one and hand back its contents in order.
    pub fn take_all(&mut self) -> Vec<PendingItem> {
        std::mem::take(&mut self.items).into()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PendingItem> {
        self.items.iter()
    }
}
