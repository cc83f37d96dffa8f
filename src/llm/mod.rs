//! Completion client trait and implementations.
//!
//! The external provider is treated as an opaque text-completion service:
//! an ordered message sequence goes in, one reply comes out.

mod openai;

pub use openai::OpenAiClient;

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::chat::Message;
use crate::error::Error;
use crate::Result;

/// Completion client trait - swappable provider abstraction
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Send the ordered message sequence and get one text completion
    async fn complete(&self, messages: &[Message]) -> Result<String>;

    /// Model identifier used by this client
    fn model(&self) -> &str;
}

/// Fake completion client for testing.
///
/// Records every request it receives so tests can assert on the exact
/// sequence presented to the service.
#[derive(Clone)]
pub struct FakeCompletionClient {
    inner: Arc<FakeInner>,
}

struct FakeInner {
    replies: Mutex<VecDeque<String>>,
    requests: Mutex<Vec<Vec<Message>>>,
    fail: bool,
}

impl FakeCompletionClient {
    /// Create with predefined replies, returned in order.
    pub fn new(replies: Vec<&str>) -> Self {
        Self {
            inner: Arc::new(FakeInner {
                replies: Mutex::new(replies.iter().map(|s| s.to_string()).collect()),
                requests: Mutex::new(Vec::new()),
                fail: false,
            }),
        }
    }

    /// Create a client whose every call fails with a service error.
    pub fn failing() -> Self {
        Self {
            inner: Arc::new(FakeInner {
                replies: Mutex::new(VecDeque::new()),
                requests: Mutex::new(Vec::new()),
                fail: true,
            }),
        }
    }

    /// All requests received so far.
    pub fn requests(&self) -> Vec<Vec<Message>> {
        self.inner.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl CompletionClient for FakeCompletionClient {
    async fn complete(&self, messages: &[Message]) -> Result<String> {
        if self.inner.fail {
            return Err(Error::Service("simulated service outage".to_string()));
        }

        self.inner.requests.lock().unwrap().push(messages.to_vec());

        self.inner
            .replies
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| Error::Service("no more fake replies".to_string()))
    }

    fn model(&self) -> &str {
        "fake-model"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_fake_client_replies_in_order() {
        let client = FakeCompletionClient::new(vec!["Hello!", "World!"]);

        let first = client.complete(&[Message::user("hi")]).await.unwrap();
        assert_eq!(first, "Hello!");

        let second = client.complete(&[Message::user("again")]).await.unwrap();
        assert_eq!(second, "World!");

        assert_eq!(client.requests().len(), 2);
    }

    #[tokio::test]
    async fn test_fake_client_failure() {
        let client = FakeCompletionClient::failing();
        let result = client.complete(&[Message::user("hi")]).await;
        assert!(matches!(result, Err(Error::Service(_))));
    }

    fn model_of<C: CompletionClient>(client: &C) -> &str {
        client.model()
    }

    #[test]
    fn test_model_resolves_through_trait() {
        assert_eq!(model_of(&FakeCompletionClient::new(vec![])), "fake-model");

        let openai = OpenAiClient::new("key", "https://api.example.com/v1", "gpt-4");
        assert_eq!(model_of(&openai), "gpt-4");
    }
}
