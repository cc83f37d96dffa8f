//! Adapters module — front-end integrations.
//!
//! Each adapter maps an external interaction model onto the session's
//! `respond` operation; none of them touches session state directly.
//!
//! # Supported Channels
//!
//! - **Terminal** — Interactive REPL on stdin/stdout
//! - **HTTP** — JSON endpoint via axum
//! - **Telegram** — Telegram Bot API via teloxide

pub mod http;
pub mod telegram;
pub mod terminal;

/// Channel trait for long-running adapters.
///
/// All channel implementations must be [`Send`] + [`Sync`] for async compatibility.
pub trait Channel: Send + Sync {
    /// Channel name (e.g., "telegram", "http").
    fn name(&self) -> &str;

    /// Start listening for messages.
    fn start(&self) -> impl std::future::Future<Output = crate::Result<()>> + Send;

    /// Stop the channel.
    fn stop(&self) -> impl std::future::Future<Output = crate::Result<()>> + Send;
}
