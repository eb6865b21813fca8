//! Messages posted in a task's discussion thread.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// A threaded comment attached to a task.
///
/// `content` is what the thread shows and may have been rewritten before it
/// was stored; `original_content` is the text as the sender typed it and is
/// never modified after insert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskMessage {
    pub id: i64,
    pub task_id: i64,
    pub user_name: String,
    pub content: String,
    pub original_content: String,
    pub is_edited: bool,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone)]
pub struct NewTaskMessage {
    pub task_id: i64,
    pub user_name: String,
    pub content: String,
    pub original_content: String,
}

impl NewTaskMessage {
    pub fn new(task_id: i64, user_name: &str, content: &str, original_content: &str) -> Self {
        NewTaskMessage {
            task_id,
            user_name: user_name.to_string(),
            content: content.to_string(),
            original_content: original_content.to_string(),
        }
    }
}
