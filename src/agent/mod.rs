//! Chat agent that answers recipe questions with the help of the SQL store.

pub mod fake;
mod functions;
mod openai;
mod prompts;

use std::fmt::Debug;
use std::sync::Arc;

use async_trait::async_trait;
use larder_db::RecipeStore;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

pub use fake::FakeProvider;
pub use functions::{AgentFunction, FunctionError};
pub use openai::OpenAiProvider;

#[derive(Error, Debug)]
pub enum LlmError {
    #[error("Request to the model failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    #[error("Model API returned {status}: {message}")]
    ApiError { status: u16, message: String },

    #[error("Could not parse the model response: {0}")]
    ParseError(String),

    #[error("LLM API key is not configured")]
    NotConfigured,
}

/// A function call requested by the model. `arguments` is the raw JSON
/// object text the model produced.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionCall {
    pub id: String,
    pub name: String,
    pub arguments: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ChatMessage {
    System(String),
    User(String),
    Assistant(String),
    FunctionCall(FunctionCall),
    FunctionResult {
        call_id: String,
        name: String,
        content: String,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum ModelReply {
    Text(String),
    FunctionCall(FunctionCall),
}

/// JSON-schema description of a callable function.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FunctionSchema {
    pub name: &'static str,
    pub description: &'static str,
    pub parameters: Value,
}

#[async_trait]
pub trait LlmProvider: Send + Sync + Debug {
    /// One model turn. An empty `functions` slice disables function calling.
    async fn complete(
        &self,
        messages: &[ChatMessage],
        functions: &[FunctionSchema],
    ) -> Result<ModelReply, LlmError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HistoryRole {
    User,
    Assistant,
}

/// Earlier turn of the conversation as the client sends it back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryMessage {
    pub role: HistoryRole,
    pub content: String,
}

impl From<&HistoryMessage> for ChatMessage {
    fn from(message: &HistoryMessage) -> Self {
        match message.role {
            HistoryRole::User => ChatMessage::User(message.content.clone()),
            HistoryRole::Assistant => ChatMessage::Assistant(message.content.clone()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatReply {
    pub reply: String,
    pub reasoning: Option<String>,
    pub chart: Option<Value>,
}

impl ChatReply {
    /// Reply shown when the conversation could not be completed.
    pub fn apology(error: &LlmError) -> Self {
        Self {
            reply: format!("I apologize, but I encountered an error: {}", error),
            reasoning: None,
            chart: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RecipeAgent {
    provider: Arc<dyn LlmProvider>,
    store: RecipeStore,
}

impl RecipeAgent {
    pub fn new(provider: Arc<dyn LlmProvider>, store: RecipeStore) -> Self {
        Self { provider, store }
    }

    pub fn store(&self) -> &RecipeStore {
        &self.store
    }

    /// Answer `message` in the context of `history`.
    ///
    /// When the model asks for a function, the function runs against the
    /// store, its JSON result goes back to the model for a final answer and
    /// is attached to the reply as `chart`. A failing function is reported
    /// to the model instead of ending the chat.
    #[tracing::instrument(skip_all, fields(history = history.len()))]
    pub async fn process_message(
        &self,
        message: &str,
        history: &[HistoryMessage],
    ) -> Result<ChatReply, LlmError> {
        let mut messages = Vec::with_capacity(history.len() + 4);
        messages.push(ChatMessage::System(prompts::SYSTEM_PROMPT.to_string()));
        messages.extend(history.iter().map(ChatMessage::from));
        messages.push(ChatMessage::User(message.to_string()));

        let schemas = AgentFunction::schemas();
        let call = match self.provider.complete(&messages, &schemas).await? {
            ModelReply::Text(reply) => {
                return Ok(ChatReply {
                    reply,
                    reasoning: None,
                    chart: None,
                });
            }
            ModelReply::FunctionCall(call) => call,
        };

        tracing::info!(function = %call.name, "Model requested a function");
        let (content, chart) = match self.run_function(&call).await {
            Ok(value) => (value.to_string(), Some(value)),
            Err(e) => {
                tracing::warn!(function = %call.name, error = %e, "Function call failed");
                (format!("Error executing function: {}", e), None)
            }
        };

        messages.push(ChatMessage::FunctionCall(call.clone()));
        messages.push(ChatMessage::FunctionResult {
            call_id: call.id.clone(),
            name: call.name.clone(),
            content,
        });

        let reply = match self.provider.complete(&messages, &[]).await? {
            ModelReply::Text(reply) => reply,
            ModelReply::FunctionCall(second) => {
                return Err(LlmError::ParseError(format!(
                    "expected a final answer, got a call to {}",
                    second.name
                )));
            }
        };

        Ok(ChatReply {
            reply,
            reasoning: Some(format!("Used {} to analyze your request", call.name)),
            chart,
        })
    }

    async fn run_function(&self, call: &FunctionCall) -> Result<Value, FunctionError> {
        let function = AgentFunction::parse(&call.name, &call.arguments)?;
        function.run(&self.store).await
    }
}
