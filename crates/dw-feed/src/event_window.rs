use crate::{DEFAULT_WINDOW_SIZE, FeedEvent};

use std::collections::VecDeque;

/// Bounded, most-recent-first sequence of feed events.
///
/// Index 0 is the newest arrival. Once full, each push silently drops the
/// oldest event. Order is arrival order, never re-sorted.
#[derive(Debug, Clone, PartialEq)]
pub struct EventWindow {
    events: VecDeque<FeedEvent>,
    capacity: usize,
    total_received: u64,
}

impl EventWindow {
    /// A capacity of zero is raised to one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            events: VecDeque::with_capacity(capacity),
            capacity,
            total_received: 0,
        }
    }

    pub fn push(&mut self, event: FeedEvent) {
        self.events.push_front(event);
        self.events.truncate(self.capacity);
        self.total_received += 1;
    }

    pub fn get(&self, index: usize) -> Option<&FeedEvent> {
        self.events.get(index)
    }

    pub fn latest(&self) -> Option<&FeedEvent> {
        self.events.front()
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &FeedEvent> + ExactSizeIterator {
        self.events.iter()
    }

    pub fn to_vec(&self) -> Vec<FeedEvent> {
        self.events.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Events accepted since creation, including those already dropped.
    pub fn total_received(&self) -> u64 {
        self.total_received
    }
}

impl Default for EventWindow {
    fn default() -> Self {
        Self::new(DEFAULT_WINDOW_SIZE)
    }
}
