//! Human-readable text for every [`Message`] variant.
//!
//! The same strings serve console output, log lines and the `message` field
//! of JSON error bodies, so wording stays consistent across surfaces.
//!
//! ```rust
//! use simpletask::libs::messages::Message;
//!
//! assert_eq!(Message::TaskNotFound.to_string(), "Task not found");
//! ```

use super::types::Message;
use std::fmt::{Display, Formatter, Result};

impl Display for Message {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        let text = match self {
            // === TASK MESSAGES ===
            Message::TaskNotFound => "Task not found".to_string(),
            Message::TaskCreated(id) => format!("Task {} created", id),
            Message::TaskUpdated(id) => format!("Task {} updated", id),
            Message::TaskDeleted(id) => format!("Task {} deleted", id),
            Message::TaskTitleRequired => "Field 'title' is required".to_string(),
            Message::InvalidTaskStatus(status) => format!("Invalid status '{}', expected 'open' or 'completed'", status),

            // === THREAD MESSAGES ===
            Message::MessageCreated(id, task_id) => format!("Message {} posted to task {}", id, task_id),
            Message::MessageUpdated(id) => format!("Message {} updated", id),
            Message::MessageDeleted(id) => format!("Message {} deleted", id),
            Message::MessageContentRequired => "Field 'content' is required".to_string(),

            // === IDENTITY MESSAGES ===
            Message::UserIdentified(name) => format!("Session identified as {}", name),
            Message::UserNameRequired => "Field 'name' is required".to_string(),

            // === AUTHENTICATION MESSAGES ===
            Message::InvalidApiKey => "Invalid API Key".to_string(),
            Message::ServerApiKeyMissing => "CRITICAL: API_KEY not set in environment!".to_string(),
            Message::ServerApiKeyNotConfigured => "Server API Key not configured".to_string(),

            // === REWRITE MESSAGES ===
            Message::AiDisabled => "OPENAI_API_KEY not found. AI features will be disabled.".to_string(),
            Message::AiEnabled(model) => format!("AI rewriting enabled with model {}", model),
            Message::RewriteFailed(kind, reason) => format!("AI rewrite of {} failed, keeping original text: {}", kind, reason),
            Message::RewriteApplied(kind) => format!("AI rewrite of {} applied", kind),

            // === CONFIGURATION MESSAGES ===
            Message::ConfigLoaded(path) => format!("Configuration loaded from {}", path),
            Message::ConfigParseError(reason) => format!("Failed to parse configuration: {}", reason),

            // === SERVER MESSAGES ===
            Message::ServerListening(addr) => format!("Listening on http://{}", addr),
            Message::ServerShuttingDown => "Shutting down".to_string(),
            Message::InternalError => "Internal server error".to_string(),

            // === DATABASE MESSAGES ===
            Message::DatabaseInitialized(path) => format!("Database initialized at {}", path),
            Message::DatabaseOpened(path) => format!("Using database {}", path),
            Message::DatabaseVersion(version) => format!("Database schema version: {}", version),
            Message::DatabaseNeedsUpdate => "Database has pending migrations".to_string(),
            Message::DatabaseUpToDate => "Database is up to date".to_string(),
            Message::MigrationsFound(count) => format!("Found {} pending migration(s)", count),
            Message::RunningMigration(version, name) => format!("Running migration v{}: {}", version, name),
            Message::MigrationFailed(version, error) => format!("Migration v{} failed: {}", version, error),
            Message::AllMigrationsCompleted => "All migrations completed".to_string(),
            Message::MigrationHistory => "Migration history:".to_string(),
        };

        write!(f, "{}", text)
    }
}
