//! Chat-completion request/response payloads.

use crate::Result;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Request body for chat completions.
///
/// Messages are kept as raw JSON so proxied bodies reach the endpoint with
/// every caller-supplied field intact.
#[derive(Debug, Clone, Serialize)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<Value>,
    pub stream: bool,
}

impl ChatCompletionRequest {
    /// Non-streaming request carrying the given raw messages.
    pub fn new(model: impl Into<String>, messages: Vec<Value>) -> Self {
        Self {
            model: model.into(),
            messages,
            stream: false,
        }
    }

    /// Non-streaming request built from typed messages.
    pub fn from_messages(model: impl Into<String>, messages: &[ChatMessage]) -> Result<Self> {
        let messages = messages
            .iter()
            .map(serde_json::to_value)
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(Self::new(model, messages))
    }
}

/// Message content union: plain text or multipart input.
///
/// Variant order matters for `#[serde(untagged)]` decoding.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum ChatMessageContent {
    Text(String),
    Parts(Vec<MessagePart>),
}

/// One content segment in multipart message input.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MessagePart {
    #[serde(rename = "type")]
    pub part_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<ImageUrl>,
}

impl MessagePart {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            part_type: "text".to_string(),
            text: Some(text.into()),
            image_url: None,
        }
    }

    pub fn image_url(url: impl Into<String>) -> Self {
        Self {
            part_type: "image_url".to_string(),
            text: None,
            image_url: Some(ImageUrl { url: url.into() }),
        }
    }
}

/// Image URL wrapper; carries `data:` URLs for inline images.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ImageUrl {
    pub url: String,
}

/// Chat message object.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatMessage {
    pub role: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<ChatMessageContent>,
}

impl ChatMessage {
    pub fn system(text: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: Some(ChatMessageContent::Text(text.into())),
        }
    }

    pub fn user_parts(parts: Vec<MessagePart>) -> Self {
        Self {
            role: "user".to_string(),
            content: Some(ChatMessageContent::Parts(parts)),
        }
    }
}

/// Top-level chat completion response.
#[derive(Debug, Deserialize)]
pub struct ChatCompletionResponse {
    pub choices: Vec<ChatChoice>,
}

impl ChatCompletionResponse {
    /// Text content of the first choice, if it has any.
    pub fn first_text(&self) -> Option<&str> {
        self.choices
            .first()
            .and_then(|choice| match &choice.message.content {
                Some(ChatMessageContent::Text(text)) => Some(text.as_str()),
                _ => None,
            })
    }
}

/// Single choice item returned by chat completions.
#[derive(Debug, Deserialize)]
pub struct ChatChoice {
    pub message: ResponseMessage,
    pub finish_reason: Option<String>,
}

/// Message returned inside a choice; providers may omit `role`.
#[derive(Debug, Deserialize)]
pub struct ResponseMessage {
    pub role: Option<String>,
    #[serde(default)]
    pub content: Option<ChatMessageContent>,
}
