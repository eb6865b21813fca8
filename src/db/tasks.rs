use super::db::{Db, DbResult};
use crate::libs::task::{NewTask, Task, TaskFilter, TaskStatus};
use rusqlite::{params, OptionalExtension, Row};

const TASK_COLUMNS: &str = "t.id, t.title, t.description, t.created_by, t.created_at, t.status, t.completed_at";
const INSERT_TASK: &str = "INSERT INTO tasks (title, description, created_by) VALUES (?1, ?2, ?3)";
const ORDER_NEWEST_FIRST: &str = "ORDER BY t.created_at DESC, t.id DESC";
const COMPLETE_TASK: &str = "UPDATE tasks SET status = ?1, completed_at = CURRENT_TIMESTAMP WHERE id = ?2";
const REOPEN_TASK: &str = "UPDATE tasks SET status = ?1, completed_at = NULL WHERE id = ?2";
const UPDATE_CONTENT: &str = "UPDATE tasks SET title = ?1, description = ?2 WHERE id = ?3";
const DELETE_TASK_MESSAGES: &str = "DELETE FROM messages WHERE task_id = ?1";
const DELETE_TASK: &str = "DELETE FROM tasks WHERE id = ?1";

/// Task repository.
///
/// Mutations return the number of affected rows; an unknown id affects zero
/// rows and is not an error.
pub struct Tasks {
    db: Db,
}

impl Tasks {
    pub fn new(db: &Db) -> Self {
        Tasks { db: db.clone() }
    }

    pub fn insert(&self, task: &NewTask) -> DbResult<i64> {
        let conn = self.db.lock();
        conn.execute(INSERT_TASK, params![task.title, task.description, task.created_by])?;

        Ok(conn.last_insert_rowid())
    }

    /// Lists tasks with the filter's status, newest first.
    ///
    /// With a search term, a task matches when its title, its description or
    /// the content of any of its messages contains the term. Each task is
    /// returned at most once.
    pub fn fetch(&self, filter: &TaskFilter) -> DbResult<Vec<Task>> {
        let conn = self.db.lock();

        let tasks = match &filter.search {
            None => {
                let sql = format!("SELECT {} FROM tasks t WHERE t.status = ?1 {}", TASK_COLUMNS, ORDER_NEWEST_FIRST);
                let mut stmt = conn.prepare(&sql)?;
                let rows = stmt.query_map(params![filter.status], Self::from_row)?;
                rows.collect::<Result<Vec<_>, _>>()?
            }
            Some(query) => {
                let sql = format!(
                    "SELECT DISTINCT {} FROM tasks t
                     LEFT JOIN messages m ON t.id = m.task_id
                     WHERE t.status = ?1
                     AND (t.title LIKE ?2 OR t.description LIKE ?2 OR m.content LIKE ?2)
                     {}",
                    TASK_COLUMNS, ORDER_NEWEST_FIRST
                );
                let pattern = format!("%{}%", query);
                let mut stmt = conn.prepare(&sql)?;
                let rows = stmt.query_map(params![filter.status, pattern], Self::from_row)?;
                rows.collect::<Result<Vec<_>, _>>()?
            }
        };

        Ok(tasks)
    }

    pub fn get_by_id(&self, id: i64) -> DbResult<Option<Task>> {
        let conn = self.db.lock();
        let sql = format!("SELECT {} FROM tasks t WHERE t.id = ?1", TASK_COLUMNS);
        let task = conn.query_row(&sql, params![id], Self::from_row).optional()?;

        Ok(task)
    }

    /// Moves a task between open and completed, keeping `completed_at` in step.
    pub fn update_status(&self, id: i64, status: TaskStatus) -> DbResult<usize> {
        let conn = self.db.lock();
        let sql = match status {
            TaskStatus::Completed => COMPLETE_TASK,
            TaskStatus::Open => REOPEN_TASK,
        };

        Ok(conn.execute(sql, params![status, id])?)
    }

    pub fn update_content(&self, id: i64, title: &str, description: &str) -> DbResult<usize> {
        let conn = self.db.lock();

        Ok(conn.execute(UPDATE_CONTENT, params![title, description, id])?)
    }

    /// Deletes the task together with its messages in one transaction.
    pub fn delete(&self, id: i64) -> DbResult<usize> {
        let mut conn = self.db.lock();
        let tx = conn.transaction()?;
        tx.execute(DELETE_TASK_MESSAGES, params![id])?;
        let deleted = tx.execute(DELETE_TASK, params![id])?;
        tx.commit()?;

        Ok(deleted)
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Task> {
        Ok(Task {
            id: row.get(0)?,
            title: row.get(1)?,
            description: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
            created_by: row.get(3)?,
            created_at: row.get(4)?,
            status: row.get(5)?,
            completed_at: row.get(6)?,
        })
    }
}
