use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

pub type ItemId = String;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Task,
    Event,
    Note,
    Inbox,
    Project,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
}

/// Angular wedge of the radar. Projects share the task wedge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sector {
    Tasks,
    Events,
    Notes,
    Inbox,
}

/// A read-only record as the radar sees it. Every per-kind date field
/// (due, start, creation) has already been folded into `timestamp`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub title: String,
    pub category: Category,
    pub timestamp: Option<DateTime<Utc>>,
    pub priority: Option<Priority>,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Task,
        Category::Event,
        Category::Note,
        Category::Inbox,
        Category::Project,
    ];

    pub fn key(self) -> &'static str {
        match self {
            Category::Task => "task",
            Category::Event => "event",
            Category::Note => "note",
            Category::Inbox => "inbox",
            Category::Project => "project",
        }
    }

    pub fn sector(self) -> Sector {
        match self {
            Category::Task | Category::Project => Sector::Tasks,
            Category::Event => Sector::Events,
            Category::Note => Sector::Notes,
            Category::Inbox => Sector::Inbox,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl Priority {
    pub fn label(self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }
}

impl Sector {
    /// Counter-clockwise from the positive x axis.
    pub const ALL: [Sector; 4] = [Sector::Tasks, Sector::Events, Sector::Notes, Sector::Inbox];

    pub fn label(self) -> &'static str {
        match self {
            Sector::Tasks => "Tasks",
            Sector::Events => "Events",
            Sector::Notes => "Notes",
            Sector::Inbox => "Inbox",
        }
    }

    pub fn shortcut(self) -> char {
        match self {
            Sector::Tasks => 't',
            Sector::Events => 'e',
            Sector::Notes => 'n',
            Sector::Inbox => 'i',
        }
    }

    pub fn from_shortcut(ch: char) -> Option<Sector> {
        let ch = ch.to_ascii_lowercase();
        Sector::ALL.into_iter().find(|s| s.shortcut() == ch)
    }

    pub(crate) fn ordinal(self) -> f64 {
        match self {
            Sector::Tasks => 0.0,
            Sector::Events => 1.0,
            Sector::Notes => 2.0,
            Sector::Inbox => 3.0,
        }
    }
}

impl Item {
    pub fn new(id: impl Into<ItemId>, title: impl Into<String>, category: Category) -> Self {
        Item {
            id: id.into(),
            title: title.into(),
            category,
            timestamp: None,
            priority: None,
        }
    }

    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = Some(priority);
        self
    }

    pub fn has_id(&self) -> bool {
        !self.id.trim().is_empty()
    }
}
