use super::content::Content;
use super::tool::ToolCall;
use serde::{Deserialize, Serialize};

/// Provider-agnostic chat message, tagged by role on the wire
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "lowercase")]
pub enum Message {
    /// System prompt (instructions)
    System {
        content: Content,

        #[serde(skip_serializing_if = "Option::is_none")]
        name: Option<String>,
    },

    /// User/Human message
    #[serde(rename = "user")]
    Human {
        content: Content,

        #[serde(skip_serializing_if = "Option::is_none")]
        name: Option<String>,
    },

    /// Assistant message, optionally carrying tool-call directives
    #[serde(rename = "assistant")]
    AI {
        #[serde(skip_serializing_if = "Option::is_none")]
        content: Option<Content>,

        #[serde(skip_serializing_if = "Option::is_none")]
        tool_calls: Option<Vec<ToolCall>>,

        #[serde(skip_serializing_if = "Option::is_none")]
        name: Option<String>,
    },

    /// Tool result message, answering one tool call by id
    Tool {
        tool_call_id: String,
        content: Content,
    },
}

impl Message {
    /// Create system message
    pub fn system(content: impl Into<Content>) -> Self {
        Self::System {
            content: content.into(),
            name: None,
        }
    }

    /// Create human message
    pub fn human(content: impl Into<Content>) -> Self {
        Self::Human {
            content: content.into(),
            name: None,
        }
    }

    /// Create AI message with text
    pub fn ai(content: impl Into<Content>) -> Self {
        Self::AI {
            content: Some(content.into()),
            tool_calls: None,
            name: None,
        }
    }

    /// Create AI message that requests tool calls
    pub fn ai_with_tools(content: Option<Content>, tool_calls: Vec<ToolCall>) -> Self {
        Self::AI {
            content,
            tool_calls: Some(tool_calls),
            name: None,
        }
    }

    /// Create tool result message
    pub fn tool_result(tool_call_id: impl Into<String>, content: impl Into<Content>) -> Self {
        Self::Tool {
            tool_call_id: tool_call_id.into(),
            content: content.into(),
        }
    }

    /// Get role as string
    pub fn role(&self) -> &str {
        match self {
            Self::System { .. } => "system",
            Self::Human { .. } => "user",
            Self::AI { .. } => "assistant",
            Self::Tool { .. } => "tool",
        }
    }

    /// Textual content of the message, regardless of role
    pub fn content_text(&self) -> Option<&str> {
        match self {
            Self::System { content, .. } => content.as_text(),
            Self::Human { content, .. } => content.as_text(),
            Self::AI { content, .. } => content.as_ref().and_then(Content::as_text),
            Self::Tool { content, .. } => content.as_text(),
        }
    }

    /// True when this is an assistant message carrying at least one tool call
    pub fn has_tool_calls(&self) -> bool {
        matches!(
            self,
            Self::AI {
                tool_calls: Some(calls),
                ..
            } if !calls.is_empty()
        )
    }
}
