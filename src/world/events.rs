//! Chronological event log
//!
//! The single record of world-affecting occurrences: chat, agent thoughts,
//! invasions, upgrades. Entries are immutable once appended and the log
//! only ever grows; readers get the newest entries first.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventCategory {
    Chat,
    Thought,
    Invasion,
    Evolution,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Channel {
    Global,
    Local,
    Thought,
    System,
}

/// Sender id used for world-originated entries
pub const SYSTEM_SENDER: &str = "system";

/// A single log entry; fields are read-only once written
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventLogEntry {
    id: Uuid,
    sender_id: String,
    sender_name: String,
    category: EventCategory,
    channel: Channel,
    content: String,
    stability_impact: Option<f32>,
    created_at: DateTime<Utc>,
}

impl EventLogEntry {
    pub fn new(
        sender_id: impl Into<String>,
        sender_name: impl Into<String>,
        category: EventCategory,
        channel: Channel,
        content: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            sender_id: sender_id.into(),
            sender_name: sender_name.into(),
            category,
            channel,
            content: content.into(),
            stability_impact: None,
            created_at,
        }
    }

    /// A world-originated entry on the SYSTEM channel
    pub fn system(category: EventCategory, content: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self::new(SYSTEM_SENDER, "Axiom Engine", category, Channel::System, content, now)
    }

    pub fn with_stability_impact(mut self, impact: f32) -> Self {
        self.stability_impact = Some(impact);
        self
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn sender_id(&self) -> &str {
        &self.sender_id
    }

    pub fn sender_name(&self) -> &str {
        &self.sender_name
    }

    pub fn category(&self) -> EventCategory {
        self.category
    }

    pub fn channel(&self) -> Channel {
        self.channel
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn stability_impact(&self) -> Option<f32> {
        self.stability_impact
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

/// Append-only event log, stored oldest first
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventLog {
    entries: Vec<EventLogEntry>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, entry: EventLogEntry) {
        self.entries.push(entry);
    }

    /// Up to `limit` entries, newest first
    pub fn recent(&self, limit: usize) -> impl Iterator<Item = &EventLogEntry> {
        self.entries.iter().rev().take(limit)
    }

    pub fn by_category(&self, category: EventCategory) -> impl Iterator<Item = &EventLogEntry> {
        self.entries.iter().rev().filter(move |e| e.category == category)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
