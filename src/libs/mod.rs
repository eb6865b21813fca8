//! Core library modules for simpletask.
//!
//! - [`config`]: layered configuration (defaults, JSON file, environment)
//! - [`data_storage`]: platform data directory resolution
//! - [`messages`]: message catalogue and console/log macros
//! - [`task`] and [`task_message`]: the domain types persisted by [`crate::db`]

pub mod config;
pub mod data_storage;
pub mod messages;
pub mod task;
pub mod task_message;
