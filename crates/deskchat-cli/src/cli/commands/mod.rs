//! Subcommand handlers.

pub mod agents;
pub mod chat;
pub mod reindex;
pub mod status;
pub mod upload;
