//! Bounded agent memory
//!
//! Memories are plain strings appended in order. When the log is full the
//! oldest entry is evicted first. On disk the log is just its entries; the
//! capacity comes from config when a world is loaded.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Append-only memory log with a fixed capacity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MemoryLog {
    /// Zero until `enforce_cap` runs on a deserialized log
    #[serde(skip)]
    capacity: usize,
    entries: VecDeque<String>,
}

impl MemoryLog {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            entries: VecDeque::new(),
        }
    }

    /// Seed a log with initial entries (still capped)
    pub fn with_entries<I, S>(capacity: usize, entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut log = Self::new(capacity);
        for entry in entries {
            log.push(entry);
        }
        log
    }

    pub fn push(&mut self, entry: impl Into<String>) {
        while self.entries.len() >= self.capacity.max(1) {
            self.entries.pop_front();
        }
        self.entries.push_back(entry.into());
    }

    /// The last `n` memories, oldest first
    pub fn recent(&self, n: usize) -> impl Iterator<Item = &str> {
        let skip = self.entries.len().saturating_sub(n);
        self.entries.iter().skip(skip).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(String::as_str)
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

    /// Re-apply the cap, e.g. after deserializing a log written with a
    /// larger capacity
    pub fn enforce_cap(&mut self, capacity: usize) {
        self.capacity = capacity.max(1);
        while self.entries.len() > self.capacity {
            self.entries.pop_front();
        }
    }
}

impl Default for MemoryLog {
    fn default() -> Self {
        Self::new(20)
    }
}
