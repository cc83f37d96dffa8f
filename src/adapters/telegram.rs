//! Telegram adapter using teloxide

use std::sync::Arc;

use teloxide::prelude::*;
use teloxide::types::{MediaKind, MessageKind};
use tracing::{debug, error, info};

use crate::chat::SessionManager;
use crate::config::TelegramConfig;
use crate::llm::CompletionClient;
use crate::Result;

use super::Channel;

/// Check a sender against the allow list. An empty list means open access.
fn is_allowed(allow_from: &[String], username: &str, id: &str) -> bool {
    if allow_from.is_empty() {
        return true;
    }
    allow_from
        .iter()
        .any(|allowed| allowed == username || allowed == id)
}

/// Telegram channel adapter.
///
/// Each chat id maps to its own session via the [`SessionManager`], whose
/// per-session mutex also serializes concurrent updates for one chat.
pub struct TelegramChannel<C: CompletionClient + Clone + 'static> {
    bot: Bot,
    config: TelegramConfig,
    sessions: Arc<SessionManager<C>>,
}

impl<C: CompletionClient + Clone> TelegramChannel<C> {
    pub fn new(config: TelegramConfig, sessions: Arc<SessionManager<C>>) -> Self {
        let bot = Bot::new(&config.token);
        Self {
            bot,
            config,
            sessions,
        }
    }

    async fn handle_message(&self, message: teloxide::types::Message) -> Result<()> {
        let chat_id = message.chat.id;
        let user = message.from();

        if !self.sender_allowed(user) {
            debug!("Ignoring message from unauthorized user: {:?}", user);
            return Ok(());
        }

        let text = match message.kind {
            MessageKind::Common(ref common) => match &common.media_kind {
                MediaKind::Text(media) => &media.text,
                _ => return Ok(()), // Ignore non-text messages
            },
            _ => return Ok(()),
        };

        info!("Received message from {}: {} chars", chat_id, text.len());

        let _ = self
            .bot
            .send_chat_action(chat_id, teloxide::types::ChatAction::Typing)
            .await;

        let session_key = format!("telegram:{}", chat_id);
        match self.sessions.respond(&session_key, text).await {
            Ok(reply) => {
                self.bot.send_message(chat_id, reply).await?;
            }
            Err(e) => {
                error!("Session processing error: {}", e);
                self.bot
                    .send_message(chat_id, format!("❌ Error: {}", e))
                    .await?;
            }
        }

        Ok(())
    }

    fn sender_allowed(&self, user: Option<&teloxide::types::User>) -> bool {
        let Some(user) = user else {
            return self.config.allow_from.is_empty();
        };
        let username = user.username.as_deref().unwrap_or("");
        let id = user.id.to_string();
        is_allowed(&self.config.allow_from, username, &id)
    }
}

async fn run_telegram_loop<C: CompletionClient + Clone + 'static>(channel: Arc<TelegramChannel<C>>) {
    let handler = Update::filter_message().endpoint(
        move |_bot: Bot, msg: teloxide::types::Message, channel: Arc<TelegramChannel<C>>| async move {
            if let Err(e) = channel.handle_message(msg).await {
                error!("Error handling telegram message: {}", e);
            }
            respond(())
        },
    );

    Dispatcher::builder(channel.bot.clone(), handler)
        .dependencies(dptree::deps![channel])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;
}

impl<C: CompletionClient + Clone + 'static> Channel for TelegramChannel<C> {
    fn name(&self) -> &str {
        "telegram"
    }

    fn start(&self) -> impl std::future::Future<Output = Result<()>> + Send {
        let this = Arc::new(Self {
            bot: self.bot.clone(),
            config: self.config.clone(),
            sessions: self.sessions.clone(),
        });

        async move {
            info!("Starting Telegram bot...");
            run_telegram_loop(this).await;
            Ok(())
        }
    }

    fn stop(&self) -> impl std::future::Future<Output = Result<()>> + Send {
        async { Ok(()) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_allow_list_is_open() {
        assert!(is_allowed(&[], "anyone", "123"));
    }

    #[test]
    fn test_allow_list_matches_username_or_id() {
        let allow = vec!["alice".to_string(), "4242".to_string()];
        assert!(is_allowed(&allow, "alice", "999"));
        assert!(is_allowed(&allow, "bob", "4242"));
        assert!(!is_allowed(&allow, "bob", "999"));
    }
}
