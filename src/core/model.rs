use chrono::{DateTime, FixedOffset};
use chrono_tz::Tz;
use serde::Serialize;

/// A related page and its cached display name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Relation {
    pub id: String,
    pub name: String,
}

/// How a todo points at its project. Older databases use a single-select
/// column, newer ones a relation to a project database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum ProjectRef {
    Label(String),
    Relations(Vec<Relation>),
}

/// A todo as read back from Notion. All instants are in the display timezone.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Todo {
    pub id: String,
    pub name: String,
    pub date: Option<DateTime<Tz>>,
    pub priority: Option<String>,
    pub project: Option<ProjectRef>,
    pub repeat: Option<String>,
    pub created: Option<DateTime<Tz>>,
    pub done: bool,
}

/// Fields accepted when creating a todo.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TodoCreate {
    pub name: String,
    pub date: Option<DateTime<FixedOffset>>,
    pub priority: Option<String>,
    pub project: Option<ProjectRef>,
    pub repeat: Option<String>,
    /// Ignored when creating; new todos always start incomplete.
    pub done: bool,
}

impl TodoCreate {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}
