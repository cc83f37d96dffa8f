//! Conversation session - history plus the fixed system instruction.

use std::sync::Arc;

use tracing::{debug, info};

use crate::error::Error;
use crate::knowledge::KnowledgeBase;
use crate::llm::CompletionClient;
use crate::Result;

use super::message::Message;

/// Maximum stored history messages (10 user/assistant exchanges). Requests
/// carry at most this window plus the new user message. Prevents unbounded
/// growth over a long-lived session.
pub const MAX_HISTORY_MESSAGES: usize = 20;

/// One ongoing conversation.
///
/// A session is not safe for concurrent use; callers serialize access
/// (the adapters hold each session behind an async mutex).
pub struct Session<C: CompletionClient> {
    client: C,
    system_instruction: String,
    knowledge: Arc<KnowledgeBase>,
    history: Vec<Message>,
}

impl<C: CompletionClient> Session<C> {
    /// Create a new session.
    pub fn new(client: C, system_instruction: impl Into<String>, knowledge: Arc<KnowledgeBase>) -> Self {
        Self {
            client,
            system_instruction: system_instruction.into(),
            knowledge,
            history: Vec::new(),
        }
    }

    /// Process one user turn: append the user message, send the full
    /// ordered sequence to the completion service, record and return
    /// the reply.
    ///
    /// Whitespace-only input is rejected without contacting the service.
    /// On a service failure the user message is rolled back so the
    /// history keeps its strict user/assistant alternation.
    pub async fn respond(&mut self, user_text: &str) -> Result<String> {
        let user_text = user_text.trim();
        if user_text.is_empty() {
            return Err(Error::Input("message is empty".to_string()));
        }

        self.history.push(Message::user(user_text));
        let request = self.build_request(user_text);

        debug!("Sending {} messages to completion service", request.len());

        match self.client.complete(&request).await {
            Ok(reply) => {
                info!("Received reply: {} chars", reply.len());
                self.history.push(Message::assistant(reply.clone()));
                self.prune();
                Ok(reply)
            }
            Err(e) => {
                self.history.pop();
                Err(e)
            }
        }
    }

    /// Build the outbound sequence: one system message followed by the
    /// windowed history (which already ends with the new user message).
    ///
    /// Knowledge-base hits are folded into the system message rather than
    /// appended as a second one, so the first outbound message is always
    /// the single system instruction.
    ///
    /// The window covers whole exchanges plus the new user message, so it
    /// always starts on a user message and the alternation holds.
    fn build_request(&self, user_text: &str) -> Vec<Message> {
        let system = match self.knowledge.lookup(user_text) {
            Some(hit) => format!(
                "{}\n\nRelevant chemistry knowledge:\n{}",
                self.system_instruction, hit
            ),
            None => self.system_instruction.clone(),
        };

        let window_start = self.history.len().saturating_sub(MAX_HISTORY_MESSAGES + 1);

        let mut messages = Vec::with_capacity(self.history.len() - window_start + 1);
        messages.push(Message::system(system));
        messages.extend(self.history[window_start..].iter().cloned());
        messages
    }

    /// Drop the oldest exchanges once the stored history exceeds the window.
    fn prune(&mut self) {
        if self.history.len() > MAX_HISTORY_MESSAGES {
            let excess = self.history.len() - MAX_HISTORY_MESSAGES;
            self.history.drain(..excess);
        }
    }

    /// Current conversation history (system instruction excluded).
    pub fn history(&self) -> &[Message] {
        &self.history
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::message::Role;
    use crate::llm::FakeCompletionClient;

    fn session(client: FakeCompletionClient) -> Session<FakeCompletionClient> {
        Session::new(client, "You are Lynn.", Arc::new(KnowledgeBase::empty()))
    }

    #[tokio::test]
    async fn test_respond_round_trip() {
        let client = FakeCompletionClient::new(vec!["Liposomes are lipid vesicles."]);
        let mut session = session(client);

        let reply = session.respond("What are liposomes?").await.unwrap();
        assert_eq!(reply, "Liposomes are lipid vesicles.");
        assert_eq!(session.history().len(), 2);
        assert_eq!(session.history()[0].role, Role::User);
        assert_eq!(session.history()[1].role, Role::Assistant);
    }

    #[tokio::test]
    async fn test_request_ordering_invariant() {
        let client = FakeCompletionClient::new(vec!["a", "b", "c"]);
        let mut session = session(client.clone());

        session.respond("one").await.unwrap();
        session.respond("two").await.unwrap();
        session.respond("three").await.unwrap();

        let requests = client.requests();
        assert_eq!(requests.len(), 3);

        // Turn k carries the system instruction, the 2(k-1) prior messages,
        // and the new user message.
        for (k, request) in requests.iter().enumerate() {
            assert_eq!(request.len(), 1 + 2 * k + 1);
            assert_eq!(request[0].role, Role::System);
            for (i, msg) in request[1..].iter().enumerate() {
                let expected = if i % 2 == 0 { Role::User } else { Role::Assistant };
                assert_eq!(msg.role, expected);
            }
            assert_eq!(request.last().unwrap().content, ["one", "two", "three"][k]);
        }
    }

    #[tokio::test]
    async fn test_empty_input_never_reaches_service() {
        let client = FakeCompletionClient::new(vec!["unused"]);
        let mut session = session(client.clone());

        assert!(matches!(session.respond("").await, Err(Error::Input(_))));
        assert!(matches!(session.respond("   \t").await, Err(Error::Input(_))));
        assert!(client.requests().is_empty());
        assert!(session.history().is_empty());
    }

    #[tokio::test]
    async fn test_service_failure_rolls_back_history() {
        let client = FakeCompletionClient::failing();
        let mut session = session(client);

        let result = session.respond("hello").await;
        assert!(matches!(result, Err(Error::Service(_))));
        assert!(session.history().is_empty());
    }

    #[tokio::test]
    async fn test_history_window_is_bounded() {
        let replies: Vec<String> = (0..30).map(|i| format!("reply {i}")).collect();
        let client =
            FakeCompletionClient::new(replies.iter().map(|s| s.as_str()).collect());
        let mut session = session(client.clone());

        for i in 0..30 {
            session.respond(&format!("question {i}")).await.unwrap();
        }

        assert_eq!(session.history().len(), MAX_HISTORY_MESSAGES);

        // The last request still starts with the system instruction, carries
        // at most the window plus the new user message, and alternates.
        let requests = client.requests();
        let last = requests.last().unwrap();
        assert!(last.len() <= 1 + MAX_HISTORY_MESSAGES + 1);
        assert_eq!(last[0].role, Role::System);
        assert_eq!(last[1].role, Role::User);
        for (i, msg) in last[1..].iter().enumerate() {
            let expected = if i % 2 == 0 { Role::User } else { Role::Assistant };
            assert_eq!(msg.role, expected);
        }
        assert_eq!(last.last().unwrap().content, "question 29");
    }

    #[tokio::test]
    async fn test_knowledge_folds_into_single_system_message() {
        let knowledge = KnowledgeBase::from_json(
            r#"{"delivery_systems": [
                {"name": "Liposome", "description": "Spherical lipid bilayer vesicle."}
            ]}"#,
        )
        .unwrap();
        let client = FakeCompletionClient::new(vec!["ok"]);
        let mut session =
            Session::new(client.clone(), "You are Lynn.", Arc::new(knowledge));

        session.respond("Tell me about liposome carriers").await.unwrap();

        let requests = client.requests();
        let request = &requests[0];
        let system_count = request.iter().filter(|m| m.role == Role::System).count();
        assert_eq!(system_count, 1);
        assert!(request[0].content.contains("Spherical lipid bilayer vesicle."));
    }
}
