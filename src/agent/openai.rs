use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{ChatMessage, FunctionCall, FunctionSchema, LlmError, LlmProvider, ModelReply};
use crate::config::LlmConfig;

const CONNECT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<WireTool<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_choice: Option<&'static str>,
}

#[derive(Debug, Serialize)]
struct WireTool<'a> {
    #[serde(rename = "type")]
    tool_type: &'static str,
    function: &'a FunctionSchema,
}

#[derive(Debug, Serialize)]
struct WireMessage {
    role: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_calls: Option<Vec<WireToolCall>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_call_id: Option<String>,
}

impl WireMessage {
    fn text(role: &'static str, content: &str) -> Self {
        Self {
            role,
            content: Some(content.to_string()),
            tool_calls: None,
            tool_call_id: None,
        }
    }
}

impl From<&ChatMessage> for WireMessage {
    fn from(message: &ChatMessage) -> Self {
        match message {
            ChatMessage::System(content) => Self::text("system", content),
            ChatMessage::User(content) => Self::text("user", content),
            ChatMessage::Assistant(content) => Self::text("assistant", content),
            ChatMessage::FunctionCall(call) => Self {
                role: "assistant",
                content: None,
                tool_calls: Some(vec![WireToolCall {
                    id: call.id.clone(),
                    call_type: "function".to_string(),
                    function: WireFunctionCall {
                        name: call.name.clone(),
                        arguments: call.arguments.clone(),
                    },
                }]),
                tool_call_id: None,
            },
            ChatMessage::FunctionResult {
                call_id, content, ..
            } => Self {
                role: "tool",
                content: Some(content.clone()),
                tool_calls: None,
                tool_call_id: Some(call_id.clone()),
            },
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct WireToolCall {
    id: String,
    #[serde(rename = "type")]
    call_type: String,
    function: WireFunctionCall,
}

#[derive(Debug, Serialize, Deserialize)]
struct WireFunctionCall {
    name: String,
    arguments: String,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
    #[serde(default)]
    tool_calls: Vec<WireToolCall>,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: String,
}

/// OpenAI-compatible chat completions client.
#[derive(Debug, Clone)]
pub struct OpenAiProvider {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl OpenAiProvider {
    pub fn new(config: &LlmConfig) -> Result<Self, LlmError> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
        })
    }

    fn parse_reply(body: &str) -> Result<ModelReply, LlmError> {
        let response: CompletionResponse =
            serde_json::from_str(body).map_err(|e| LlmError::ParseError(e.to_string()))?;
        let message = response
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message)
            .ok_or_else(|| LlmError::ParseError("response has no choices".to_string()))?;

        if let Some(call) = message.tool_calls.into_iter().next() {
            return Ok(ModelReply::FunctionCall(FunctionCall {
                id: call.id,
                name: call.function.name,
                arguments: call.function.arguments,
            }));
        }
        message
            .content
            .map(ModelReply::Text)
            .ok_or_else(|| LlmError::ParseError("response has neither content nor a tool call".to_string()))
    }

    fn error_message(body: &str) -> String {
        serde_json::from_str::<ErrorResponse>(body)
            .map(|response| response.error.message)
            .or_else(|_| serde_json::from_str::<Value>(body).map(|value| value.to_string()))
            .unwrap_or_else(|_| body.chars().take(500).collect())
    }
}

#[async_trait]
impl LlmProvider for OpenAiProvider {
    #[tracing::instrument(skip_all, fields(model = %self.model, messages = messages.len()))]
    async fn complete(
        &self,
        messages: &[ChatMessage],
        functions: &[FunctionSchema],
    ) -> Result<ModelReply, LlmError> {
        if self.api_key.is_empty() {
            return Err(LlmError::NotConfigured);
        }

        let request = CompletionRequest {
            model: &self.model,
            messages: messages.iter().map(WireMessage::from).collect(),
            tools: functions
                .iter()
                .map(|function| WireTool {
                    tool_type: "function",
                    function,
                })
                .collect(),
            tool_choice: (!functions.is_empty()).then_some("auto"),
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            let message = Self::error_message(&body);
            tracing::error!(status = status.as_u16(), %message, "Model API request failed");
            return Err(LlmError::ApiError {
                status: status.as_u16(),
                message,
            });
        }

        Self::parse_reply(&body)
    }
}
