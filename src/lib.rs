//! Lynn - A drug delivery AI for tumor targeting with chemistry knowledge
//!
//! This library provides a conversational session over an external
//! chat-completion service, plus terminal, HTTP, and Telegram adapters
//! that all drive the same `respond` operation.

pub mod adapters;
pub mod chat;
pub mod config;
pub mod error;
pub mod knowledge;
pub mod llm;
pub mod ui;

pub use error::{Error, Result};
