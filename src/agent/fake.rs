use std::collections::VecDeque;

use async_trait::async_trait;
use tokio::sync::Mutex;

use super::{ChatMessage, FunctionSchema, LlmError, LlmProvider, ModelReply};

/// Scripted provider: answers with queued replies in order and records
/// every conversation it was sent.
#[derive(Debug, Default)]
pub struct FakeProvider {
    replies: Mutex<VecDeque<ModelReply>>,
    requests: Mutex<Vec<(Vec<ChatMessage>, usize)>>,
}

impl FakeProvider {
    pub fn new(replies: impl IntoIterator<Item = ModelReply>) -> Self {
        Self {
            replies: Mutex::new(replies.into_iter().collect()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Conversations received so far, each with the number of functions
    /// offered.
    pub async fn requests(&self) -> Vec<(Vec<ChatMessage>, usize)> {
        self.requests.lock().await.clone()
    }
}

#[async_trait]
impl LlmProvider for FakeProvider {
    async fn complete(
        &self,
        messages: &[ChatMessage],
        functions: &[FunctionSchema],
    ) -> Result<ModelReply, LlmError> {
        self.requests
            .lock()
            .await
            .push((messages.to_vec(), functions.len()));
        self.replies
            .lock()
            .await
            .pop_front()
            .ok_or_else(|| LlmError::ParseError("no scripted reply left".to_string()))
    }
}
