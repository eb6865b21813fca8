//! Message catalogue and output macros.
//!
//! [`Message`] enumerates every piece of text the application shows or logs;
//! the `msg_*` macros in [`macros`] route it to the console or to `tracing`.

pub mod display;
pub mod macros;
pub mod types;

pub use types::Message;
