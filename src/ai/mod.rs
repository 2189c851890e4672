//! Completion service integration
//!
//! Provides the interface to the third-party chat-completion API used for
//! style transfer, plus an in-memory implementation for tests.

pub mod client;
pub mod mime;
pub mod mock;
pub mod types;

pub use client::CompletionClient;
pub use mock::MockCompletionClient;
pub use types::{
    ChatChoice, ChatCompletionRequest, ChatCompletionResponse, ChatMessage, ChatMessageContent,
    ImageUrl, MessagePart, ResponseMessage,
};

use crate::Result;
use async_trait::async_trait;

#[async_trait]
pub trait CompletionService: Send + Sync {
    /// Submit one non-streaming chat completion.
    async fn complete(&self, request: &ChatCompletionRequest) -> Result<ChatCompletionResponse>;
}
