//! Host-side item records and their normalization into [`Item`]s.
//!
//! Tasks, events and notes each carry their own date field as free text.
//! `ItemStore::items` folds them into the single `timestamp` the radar
//! works with; text that does not parse is logged and dropped.

use crate::model::{Category, Item, ItemId, Priority};
use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::warn;

const LOCAL_FORMATS: [&str; 3] = ["%Y.%m.%d@%H:%M", "%Y-%m-%d %H:%M", "%Y-%m-%dT%H:%M"];

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct ItemStore {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub tasks: Vec<TaskRecord>,
    #[serde(default)]
    pub events: Vec<EventRecord>,
    #[serde(default)]
    pub notes: Vec<NoteRecord>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct TaskRecord {
    pub id: ItemId,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(default)]
    pub project: bool,
    #[serde(default)]
    pub done: bool,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct EventRecord {
    pub id: ItemId,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub starts_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(default)]
    pub done: bool,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct NoteRecord {
    pub id: ItemId,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(default)]
    pub inbox: bool,
    #[serde(default)]
    pub done: bool,
}

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum StoreError {
    #[error("item not found: {0}")]
    ItemNotFound(String),
    #[error("duplicate item id: {0}")]
    DuplicateId(String),
}

/// Everything needed to add one record, whatever its kind.
#[derive(Debug, Clone)]
pub struct NewItem {
    pub id: ItemId,
    pub title: String,
    pub category: Category,
    pub timestamp: Option<DateTime<Utc>>,
    pub priority: Option<Priority>,
}

impl ItemStore {
    pub fn named(name: impl Into<String>) -> Self {
        ItemStore {
            name: name.into(),
            ..ItemStore::default()
        }
    }

    /// Open records as radar items: tasks, then events, then notes.
    pub fn items(&self) -> Vec<Item> {
        let tasks = self.tasks.iter().filter(|t| !t.done).map(|t| Item {
            id: t.id.clone(),
            title: t.title.clone(),
            category: if t.project {
                Category::Project
            } else {
                Category::Task
            },
            timestamp: normalize_timestamp(&t.id, t.due.as_deref()),
            priority: t.priority,
        });
        let events = self.events.iter().filter(|e| !e.done).map(|e| Item {
            id: e.id.clone(),
            title: e.title.clone(),
            category: Category::Event,
            timestamp: normalize_timestamp(&e.id, e.starts_at.as_deref()),
            priority: e.priority,
        });
        let notes = self.notes.iter().filter(|n| !n.done).map(|n| Item {
            id: n.id.clone(),
            title: n.title.clone(),
            category: if n.inbox {
                Category::Inbox
            } else {
                Category::Note
            },
            timestamp: normalize_timestamp(&n.id, n.created_at.as_deref()),
            priority: n.priority,
        });
        tasks.chain(events).chain(notes).collect()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.tasks.iter().any(|t| t.id == id)
            || self.events.iter().any(|e| e.id == id)
            || self.notes.iter().any(|n| n.id == id)
    }

    /// Ids carried by more than one record, in first-seen order. Only hand
    /// edits can produce these; `add` refuses them.
    pub fn duplicate_ids(&self) -> Vec<&str> {
        let ids = self
            .tasks
            .iter()
            .map(|t| t.id.as_str())
            .chain(self.events.iter().map(|e| e.id.as_str()))
            .chain(self.notes.iter().map(|n| n.id.as_str()))
            .filter(|id| !id.trim().is_empty());
        let mut seen = HashSet::new();
        let mut repeated = Vec::new();
        for id in ids {
            if !seen.insert(id) && !repeated.contains(&id) {
                repeated.push(id);
            }
        }
        repeated
    }

    pub fn add(&mut self, new: NewItem) -> Result<(), StoreError> {
        if self.contains(&new.id) {
            return Err(StoreError::DuplicateId(new.id));
        }
        let stamp = new.timestamp.map(|dt| dt.to_rfc3339());
        match new.category {
            Category::Task | Category::Project => self.tasks.push(TaskRecord {
                id: new.id,
                title: new.title,
                due: stamp,
                priority: new.priority,
                project: new.category == Category::Project,
                done: false,
            }),
            Category::Event => self.events.push(EventRecord {
                id: new.id,
                title: new.title,
                starts_at: stamp,
                priority: new.priority,
                done: false,
            }),
            Category::Note | Category::Inbox => self.notes.push(NoteRecord {
                id: new.id,
                title: new.title,
                created_at: stamp,
                priority: new.priority,
                inbox: new.category == Category::Inbox,
                done: false,
            }),
        }
        Ok(())
    }

    pub fn mark_done(&mut self, id: &str) -> Result<(), StoreError> {
        if let Some(task) = self.tasks.iter_mut().find(|t| t.id == id) {
            task.done = true;
        } else if let Some(event) = self.events.iter_mut().find(|e| e.id == id) {
            event.done = true;
        } else if let Some(note) = self.notes.iter_mut().find(|n| n.id == id) {
            note.done = true;
        } else {
            return Err(StoreError::ItemNotFound(id.to_string()));
        }
        Ok(())
    }
}

/// Accepts RFC 3339 or a handful of UTC wall-clock formats.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in LOCAL_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| Utc.from_utc_datetime(&naive))
}

fn normalize_timestamp(id: &str, raw: Option<&str>) -> Option<DateTime<Utc>> {
    let raw = raw?;
    let parsed = parse_timestamp(raw);
    if parsed.is_none() && !raw.trim().is_empty() {
        warn!(id, raw, "unparseable timestamp, treating as absent");
    }
    parsed
}

pub fn format_timestamp(dt: &DateTime<Utc>) -> String {
    dt.format("%Y.%m.%d@%H:%M").to_string()
}
