use super::db::{Db, DbError, DbResult};
use crate::libs::task_message::{NewTaskMessage, TaskMessage};
use rusqlite::{params, Row};

const SELECT_THREAD: &str = "SELECT id, task_id, user_name, content, original_content, is_edited, created_at
     FROM messages WHERE task_id = ?1 ORDER BY created_at ASC, id ASC";
const TASK_EXISTS: &str = "SELECT EXISTS(SELECT 1 FROM tasks WHERE id = ?1)";
const INSERT_MESSAGE: &str = "INSERT INTO messages (task_id, user_name, content, original_content) VALUES (?1, ?2, ?3, ?4)";
const UPDATE_MESSAGE: &str = "UPDATE messages SET content = ?1, is_edited = 1 WHERE id = ?2";
const DELETE_MESSAGE: &str = "DELETE FROM messages WHERE id = ?1";

/// Message repository for task discussion threads.
pub struct Messages {
    db: Db,
}

impl Messages {
    pub fn new(db: &Db) -> Self {
        Messages { db: db.clone() }
    }

    /// Appends a message to a task's thread.
    ///
    /// Fails with [`DbError::TaskNotFound`] when the task does not exist.
    pub fn insert(&self, message: &NewTaskMessage) -> DbResult<i64> {
        let mut conn = self.db.lock();
        let tx = conn.transaction()?;

        let exists: bool = tx.query_row(TASK_EXISTS, params![message.task_id], |row| row.get(0))?;
        if !exists {
            return Err(DbError::TaskNotFound(message.task_id));
        }

        tx.execute(
            INSERT_MESSAGE,
            params![message.task_id, message.user_name, message.content, message.original_content],
        )?;
        let id = tx.last_insert_rowid();
        tx.commit()?;

        Ok(id)
    }

    /// Returns the thread of `task_id` in chronological order.
    pub fn fetch(&self, task_id: i64) -> DbResult<Vec<TaskMessage>> {
        let conn = self.db.lock();
        let mut stmt = conn.prepare(SELECT_THREAD)?;
        let messages = stmt
            .query_map(params![task_id], Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(messages)
    }

    /// Replaces the content and marks the message as edited, even when the
    /// text is unchanged.
    pub fn update(&self, id: i64, content: &str) -> DbResult<usize> {
        let conn = self.db.lock();

        Ok(conn.execute(UPDATE_MESSAGE, params![content, id])?)
    }

    pub fn delete(&self, id: i64) -> DbResult<usize> {
        let conn = self.db.lock();

        Ok(conn.execute(DELETE_MESSAGE, params![id])?)
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<TaskMessage> {
        let content: String = row.get(3)?;
        // Legacy databases allow a NULL original_content.
        let original_content = row.get::<_, Option<String>>(4)?.unwrap_or_else(|| content.clone());

        Ok(TaskMessage {
            id: row.get(0)?,
            task_id: row.get(1)?,
            user_name: row.get(2)?,
            content,
            original_content,
            is_edited: row.get(5)?,
            created_at: row.get(6)?,
        })
    }
}
