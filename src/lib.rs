//! # Simpletask - task tracking with threaded discussion
//!
//! An HTTP+JSON service where users create tasks, discuss them in message
//! threads and can have titles, descriptions and messages rewritten into more
//! professional prose by a language model.
//!
//! ## Features
//!
//! - **Tasks**: create, edit, complete, reopen and delete; search across
//!   titles, descriptions and message bodies
//! - **Threads**: chronological messages per task, keeping the original text
//!   of every message next to its displayed text
//! - **AI rewriting**: optional, create-time only, falling back to the
//!   submitted text whenever the model is unavailable
//! - **Access control**: shared API key on every `/api/*` route and a signed
//!   per-client identity cookie
//!
//! ## Usage
//!
//! ```rust,no_run
//! use simpletask::commands::Cli;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     Cli::menu().await
//! }
//! ```

pub mod api;
pub mod commands;
pub mod db;
pub mod libs;
pub mod server;
