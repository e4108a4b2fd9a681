use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifecycle state of a task. The wire strings are fixed; existing
/// `tasks.json` files use the spaced forms.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum Status {
    #[default]
    #[serde(rename = "Not Started")]
    NotStarted,
    #[serde(rename = "In Progress")]
    InProgress,
    #[serde(rename = "Completed")]
    Completed,
}

impl Status {
    /// One step along the fixed cycle
    /// `NotStarted -> InProgress -> Completed -> NotStarted`.
    pub fn advanced(self) -> Self {
        match self {
            Status::NotStarted => Status::InProgress,
            Status::InProgress => Status::Completed,
            Status::Completed => Status::NotStarted,
        }
    }

    /// Ordinal used as the sort-by-status key: `NotStarted < InProgress <
    /// Completed`.
    pub fn rank(self) -> u8 {
        match self {
            Status::NotStarted => 0,
            Status::InProgress => 1,
            Status::Completed => 2,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Status::NotStarted => "Not Started",
            Status::InProgress => "In Progress",
            Status::Completed => "Completed",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: Uuid,

    pub name: String,

    pub description: String,

    /// Due date.
    pub date: DateTime<Utc>,

    #[serde(default)]
    pub status: Status,
}

impl Task {
    /// Name and description are taken as given; empty strings are valid.
    pub fn new(name: String, description: String, date: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            description,
            date,
            status: Status::NotStarted,
        }
    }

    /// Strictly before `now`. A task due exactly now is not overdue.
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        self.date < now
    }
}
