//! Inbound message backlog

use heapless::Deque;

use super::parser::Publish;

/// Bounded FIFO of received messages
///
/// A full queue evicts its oldest entry to admit the new one.
pub struct PublishQueue<const N: usize> {
    messages: Deque<Publish, N>,
    evicted: u32,
}

impl<const N: usize> PublishQueue<N> {
    pub const fn new() -> Self {
        Self {
            messages: Deque::new(),
            evicted: 0,
        }
    }

    /// Queue a message, returning the one evicted to make room
    pub fn push(&mut self, publish: Publish) -> Option<Publish> {
        let evicted = if self.messages.is_full() {
            self.evicted = self.evicted.wrapping_add(1);
            self.messages.pop_front()
        } else {
            None
        };
        // Room was made above
        let _ = self.messages.push_back(publish);
        evicted
    }

    pub fn pop(&mut self) -> Option<Publish> {
        self.messages.pop_front()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }

    /// Messages dropped for lack of room since creation
    pub fn evicted(&self) -> u32 {
        self.evicted
    }
}

impl<const N: usize> Default for PublishQueue<N> {
    fn default() -> Self {
        Self::new()
    }
}
