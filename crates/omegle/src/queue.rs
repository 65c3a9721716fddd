//! Inbound event queue
//!
//! Events are handed out strictly in arrival order: batches in the order
//! their replies were processed, events within a batch in document order.
//! The queue itself is not synchronised; the session keeps it behind its
//! state lock.

use omegle_protocol::Event;
use std::collections::VecDeque;

/// FIFO buffer of events waiting to be consumed.
#[derive(Debug, Default, Clone)]
pub struct EventQueue {
    events: VecDeque<Event>,
}

impl EventQueue {
    /// Create an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a batch, preserving its order. Returns how many were added.
    pub fn push<I>(&mut self, batch: I) -> usize
    where
        I: IntoIterator<Item = Event>,
    {
        let before = self.events.len();
        self.events.extend(batch);
        self.events.len() - before
    }

    /// Remove and return the oldest event.
    pub fn pop_oldest(&mut self) -> Option<Event> {
        self.events.pop_front()
    }

    /// The oldest event, left in place.
    pub fn peek_oldest(&self) -> Option<&Event> {
        self.events.front()
    }

    /// Number of queued events.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Whether the queue is empty.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
