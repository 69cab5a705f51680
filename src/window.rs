//! Bounded FIFO window of recent outcomes awaiting display

use crate::types::outcome::Outcome;
use std::collections::VecDeque;

/// Number of outcomes kept between renders
pub const DISPLAY_CAPACITY: usize = 20;

/// Keeps the most recently pushed outcomes; pushing past capacity evicts the oldest.
#[derive(Debug, Clone)]
pub struct DisplayWindow {
    entries: VecDeque<Outcome>,
    capacity: usize,
}

impl DisplayWindow {
    /// Create a window with the default capacity
    pub fn new() -> Self {
        Self::with_capacity(DISPLAY_CAPACITY)
    }

    /// Create a window holding at most `capacity` outcomes (at least one)
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append an outcome, evicting the oldest entry when full
    pub fn push(&mut self, outcome: Outcome) {
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(outcome);
    }

    /// Current contents in insertion order; the window is left untouched
    pub fn drain(&self) -> Vec<Outcome> {
        self.entries.iter().cloned().collect()
    }

    /// Remove every entry, keeping the capacity
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for DisplayWindow {
    fn default() -> Self {
        Self::new()
    }
}
