//! Finance Action Server
//!
//! Webhook actions for a conversational finance assistant:
//! - Income, expense and balance summaries from the finance backend
//! - Spending suggestions
//! - A redirect to the add-transaction page
//! - Free-form questions answered by a local model CLI
//!
//! TURN FLOW:
//! WEBHOOK → RESOLVE CONTEXT → CALL BACKEND / CLI → REPLY

pub mod actions;
pub mod api;
pub mod backend;
pub mod config;
pub mod context;
pub mod dispatcher;
pub mod error;
pub mod llm;
pub mod models;

pub use error::Result;

// Re-export common types
pub use models::*;
pub use actions::{create_default_registry, Action, ActionRegistry};
pub use config::ActionServerConfig;
