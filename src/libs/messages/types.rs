//! Catalogue of every user-facing and logged message.
//!
//! Variants carry the dynamic parts of their text; the wording itself lives
//! in the `Display` implementation in `display.rs`.

#[derive(Debug, Clone)]
pub enum Message {
    // === TASK MESSAGES ===
    TaskNotFound,
    TaskCreated(i64),
    TaskUpdated(i64),
    TaskDeleted(i64),
    TaskTitleRequired,
    InvalidTaskStatus(String),

    // === THREAD MESSAGES ===
    MessageCreated(i64, i64), // message id, task id
    MessageUpdated(i64),
    MessageDeleted(i64),
    MessageContentRequired,

    // === IDENTITY MESSAGES ===
    UserIdentified(String),
    UserNameRequired,

    // === AUTHENTICATION MESSAGES ===
    InvalidApiKey,
    ServerApiKeyMissing,
    ServerApiKeyNotConfigured,

    // === REWRITE MESSAGES ===
    AiDisabled,
    AiEnabled(String), // model
    RewriteFailed(String, String), // kind, reason
    RewriteApplied(String),        // kind

    // === CONFIGURATION MESSAGES ===
    ConfigLoaded(String),
    ConfigParseError(String),

    // === SERVER MESSAGES ===
    ServerListening(String),
    ServerShuttingDown,
    InternalError,

    // === DATABASE MESSAGES ===
    DatabaseInitialized(String),
    DatabaseOpened(String),
    DatabaseVersion(u32),
    DatabaseNeedsUpdate,
    DatabaseUpToDate,
    MigrationsFound(usize),
    RunningMigration(u32, String),
    MigrationFailed(u32, String),
    AllMigrationsCompleted,
    MigrationHistory,
}
