//! Chat module — conversation core.
//!
//! This module contains:
//! - Message types (Role, Message)
//! - Session: one conversation, history plus the fixed system instruction
//! - SessionManager: bounded session-id → Session map for the HTTP and
//!   Telegram adapters

mod manager;
mod message;
mod session;

pub use manager::SessionManager;
pub use message::{Message, Role};
pub use session::{Session, MAX_HISTORY_MESSAGES};

/// The fixed persona preamble sent as the first message of every request.
pub fn default_system_instruction() -> String {
    let today = chrono::Local::now().format("%Y-%m-%d");

    format!(
        r#"You are Lynn, an AI assistant specializing in drug delivery systems and tumor targeting.
Your expertise includes:
- Various drug delivery systems (liposomes, nanoparticles, etc.)
- Tumor targeting mechanisms
- Tumor microenvironment
- Specific anticancer drugs
- EPR effect and other delivery concepts

Provide accurate, scientific information based on the latest research.
Current date: {}"#,
        today
    )
}
