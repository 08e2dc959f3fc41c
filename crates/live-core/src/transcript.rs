//! Rolling window of recent chat messages.

use std::collections::VecDeque;

/// Number of chat lines kept on screen.
pub const TRANSCRIPT_CAPACITY: usize = 50;

/// A chat comment relayed from the live stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatLine {
    pub user: String,
    pub comment: String,
}

/// Bounded FIFO of chat lines: append at the tail, evict the oldest from the
/// head once the capacity is exceeded.
#[derive(Debug, Clone)]
pub struct Transcript {
    lines: VecDeque<ChatLine>,
    capacity: usize,
}

impl Default for Transcript {
    fn default() -> Self {
        Self::with_capacity(TRANSCRIPT_CAPACITY)
    }
}

impl Transcript {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            lines: VecDeque::with_capacity(capacity + 1),
            capacity,
        }
    }

    /// Append a line, dropping the single oldest one if that overflows the
    /// window.
    pub fn append(&mut self, line: ChatLine) {
        self.lines.push_back(line);
        if self.lines.len() > self.capacity {
            self.lines.pop_front();
        }
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &ChatLine> {
        self.lines.iter()
    }

    pub fn latest(&self) -> Option<&ChatLine> {
        self.lines.back()
    }
}
