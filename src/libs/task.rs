//! Task domain types shared by the store and the HTTP layer.

use chrono::NaiveDateTime;
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Display name recorded when the caller never identified themselves.
pub const ANONYMOUS: &str = "Anonymous";

/// Lifecycle state of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    #[default]
    Open,
    Completed,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Open => "open",
            TaskStatus::Completed => "completed",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a status string is neither `open` nor `completed`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid task status '{0}', expected 'open' or 'completed'")]
pub struct InvalidStatus(pub String);

impl FromStr for TaskStatus {
    type Err = InvalidStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "open" => Ok(TaskStatus::Open),
            "completed" => Ok(TaskStatus::Completed),
            other => Err(InvalidStatus(other.to_string())),
        }
    }
}

impl ToSql for TaskStatus {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for TaskStatus {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let raw = value.as_str()?;
        raw.parse().map_err(|e| FromSqlError::Other(Box::new(e)))
    }
}

/// A trackable unit of work.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub created_by: String,
    pub created_at: NaiveDateTime,
    pub status: TaskStatus,
    pub completed_at: Option<NaiveDateTime>,
}

/// Input for a task insert; everything else is defaulted by the store.
#[derive(Debug, Clone)]
pub struct NewTask {
    pub title: String,
    pub description: String,
    pub created_by: String,
}

impl NewTask {
    pub fn new(title: &str, description: &str, created_by: &str) -> Self {
        NewTask {
            title: title.to_string(),
            description: description.to_string(),
            created_by: created_by.to_string(),
        }
    }
}

/// Selection used when listing tasks.
#[derive(Debug, Clone)]
pub struct TaskFilter {
    pub status: TaskStatus,
    /// Substring matched against title, description and message bodies.
    pub search: Option<String>,
}

impl TaskFilter {
    pub fn status(status: TaskStatus) -> Self {
        TaskFilter { status, search: None }
    }

    /// Adds a search term. Blank terms leave the filter unchanged.
    pub fn with_search(mut self, query: &str) -> Self {
        let query = query.trim();
        self.search = if query.is_empty() { None } else { Some(query.to_string()) };
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_parses_known_values_only() {
        assert_eq!("open".parse::<TaskStatus>().unwrap(), TaskStatus::Open);
        assert_eq!("completed".parse::<TaskStatus>().unwrap(), TaskStatus::Completed);
        assert_eq!("done".parse::<TaskStatus>(), Err(InvalidStatus("done".into())));
        assert!("Open".parse::<TaskStatus>().is_err());
    }

    #[test]
    fn blank_search_is_dropped() {
        let filter = TaskFilter::status(TaskStatus::Open).with_search("   ");
        assert!(filter.search.is_none());

        let filter = TaskFilter::status(TaskStatus::Open).with_search("  bug ");
        assert_eq!(filter.search.as_deref(), Some("bug"));
    }
}
