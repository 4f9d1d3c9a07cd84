// Chat Completions wire format, shared by the OpenAI and Azure clients.
// Both providers accept the same request schema; they differ only in URL
// layout, auth header, and whether the model name travels in the body.

use crate::traits::{ChatOptions, ChatResponse, TokenUsage};
use crate::types::{Message, ToolCall};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// o1 and gpt-5 families reject `temperature` and rename the token cap
pub(crate) fn is_reasoning_model(model: &str) -> bool {
    model.starts_with("o1") || model.starts_with("gpt-5")
}

/// Build a chat completion request payload
///
/// `include_model` is false for Azure, where the deployment name is part of
/// the URL instead of the body.
pub(crate) fn chat_body(
    model: &str,
    include_model: bool,
    messages: &[Message],
    options: &ChatOptions,
) -> Result<Value> {
    let mut request = serde_json::json!({
        "messages": serde_json::to_value(messages)?,
    });

    let obj = request.as_object_mut().unwrap();

    if include_model {
        obj.insert("model".to_string(), serde_json::json!(model));
    }

    if let Some(temp) = options.temperature {
        if !is_reasoning_model(model) {
            obj.insert("temperature".to_string(), serde_json::json!(temp));
        }
    }
    if let Some(max_tokens) = options.max_tokens {
        let token_field = if is_reasoning_model(model) {
            "max_completion_tokens"
        } else {
            "max_tokens"
        };
        obj.insert(token_field.to_string(), serde_json::json!(max_tokens));
    }
    if let Some(tools) = &options.tools {
        obj.insert("tools".to_string(), serde_json::to_value(tools)?);
    }
    if let Some(tool_choice) = &options.tool_choice {
        obj.insert("tool_choice".to_string(), serde_json::to_value(tool_choice)?);
    }

    Ok(request)
}

// ============================================================================
// RESPONSE TYPES (Chat Completions)
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct ChatCompletionResponse {
    pub id: String,
    pub object: String,
    pub created: i64,
    pub model: String,
    pub choices: Vec<Choice>,
    pub usage: Usage,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct Choice {
    pub index: u32,
    pub message: ResponseMessage,
    pub finish_reason: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct ResponseMessage {
    pub role: String,
    pub content: Option<String>,
    pub tool_calls: Option<Vec<ToolCall>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

impl ChatCompletionResponse {
    /// Convert to the provider-agnostic response
    pub(crate) fn into_chat_response(self) -> Result<ChatResponse> {
        let raw = serde_json::to_value(&self)?;

        let (content, tool_calls, finish_reason) = match self.choices.into_iter().next() {
            Some(choice) => (
                choice.message.content,
                choice.message.tool_calls,
                choice.finish_reason,
            ),
            None => (None, None, None),
        };

        Ok(ChatResponse {
            content,
            tool_calls,
            usage: Some(TokenUsage {
                input_tokens: self.usage.prompt_tokens,
                output_tokens: self.usage.completion_tokens,
                total_tokens: self.usage.total_tokens,
            }),
            finish_reason,
            raw,
        })
    }
}
