//! Clients for external services.
//!
//! - [`openai`]: the language-model rewrite adapter used when tasks and
//!   messages are created

pub mod openai;

pub use openai::{Rewrite, Rewriter};
