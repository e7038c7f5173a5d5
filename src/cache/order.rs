//! Insertion Order Module
//!
//! Tracks the order keys were inserted in, for oldest-first eviction.

use std::collections::VecDeque;

// == Insertion Order ==
/// Keys in insertion order.
///
/// - Front = oldest insertion (next eviction candidate)
/// - Back = newest insertion
///
/// Reads never reorder keys: eviction is by insertion age, not by use.
#[derive(Debug, Default)]
pub struct InsertionOrder {
    order: VecDeque<String>,
}

impl InsertionOrder {
    pub fn new() -> Self {
        Self {
            order: VecDeque::new(),
        }
    }

    // == Push ==
    /// Records `key` as the newest insertion.
    ///
    /// A key that is already tracked moves to the back.
    pub fn push(&mut self, key: &str) {
        self.remove(key);
        self.order.push_back(key.to_string());
    }

    /// Stops tracking `key`.
    pub fn remove(&mut self, key: &str) {
        self.order.retain(|k| k != key);
    }

    /// Removes and returns the oldest-inserted key.
    pub fn pop_oldest(&mut self) -> Option<String> {
        self.order.pop_front()
    }

    pub fn peek_oldest(&self) -> Option<&String> {
        self.order.front()
    }

    pub fn clear(&mut self) {
        self.order.clear();
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}
