//! Persistence layer for simpletask.
//!
//! Everything lives in one SQLite file holding two tables, `tasks` and
//! `messages`. A single [`db::Db`] handle owns the connection; the
//! repositories borrow it and take the lock per operation, wrapping
//! multi-statement work in a transaction.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use simpletask::db::{db::Db, messages::Messages, tasks::Tasks};
//! use simpletask::libs::task::NewTask;
//! use simpletask::libs::task_message::NewTaskMessage;
//!
//! let db = Db::open("simpletask.db")?;
//! let task_id = Tasks::new(&db).insert(&NewTask::new("Fix login", "", "Ada"))?;
//! Messages::new(&db).insert(&NewTaskMessage::new(task_id, "Ada", "On it", "on it"))?;
//! # Ok::<(), simpletask::db::db::DbError>(())
//! ```

/// Connection handle and error type.
pub mod db;

/// Versioned schema creation, applied when the database is opened.
pub mod migrations;

/// Task discussion threads.
pub mod messages;

/// Task CRUD, status transitions and search.
pub mod tasks;
