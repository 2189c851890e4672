use super::types::{
    ChatChoice, ChatCompletionRequest, ChatCompletionResponse, ChatMessageContent, ResponseMessage,
};
use super::CompletionService;
use crate::{Error, Result};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const DEFAULT_MOCK_IMAGE_URL: &str = "https://cdn.example.com/styled.png";

#[derive(Debug, Clone)]
enum MockReply {
    Content(String),
    NoChoices,
    Upstream(String),
}

#[derive(Clone)]
pub struct MockCompletionClient {
    replies: Arc<Mutex<Vec<MockReply>>>,
    requests: Arc<Mutex<Vec<ChatCompletionRequest>>>,
    call_count: Arc<Mutex<usize>>,
    delay: Option<Duration>,
}

impl MockCompletionClient {
    pub fn new() -> Self {
        Self {
            replies: Arc::new(Mutex::new(Vec::new())),
            requests: Arc::new(Mutex::new(Vec::new())),
            call_count: Arc::new(Mutex::new(0)),
            delay: None,
        }
    }

    pub fn with_content_response(self, content: String) -> Self {
        self.replies.lock().unwrap().push(MockReply::Content(content));
        self
    }

    pub fn with_empty_choices(self) -> Self {
        self.replies.lock().unwrap().push(MockReply::NoChoices);
        self
    }

    pub fn with_upstream_error(self, message: String) -> Self {
        self.replies.lock().unwrap().push(MockReply::Upstream(message));
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn get_call_count(&self) -> usize {
        *self.call_count.lock().unwrap()
    }

    /// Requests received so far, oldest first.
    pub fn requests(&self) -> Vec<ChatCompletionRequest> {
        self.requests.lock().unwrap().clone()
    }

    fn next_reply(&self) -> MockReply {
        let mut count = self.call_count.lock().unwrap();
        *count += 1;

        let replies = self.replies.lock().unwrap();
        if replies.is_empty() {
            MockReply::Content(format!("Here you go: ![styled]({})", DEFAULT_MOCK_IMAGE_URL))
        } else {
            let index = (*count - 1) % replies.len();
            replies[index].clone()
        }
    }
}

impl Default for MockCompletionClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CompletionService for MockCompletionClient {
    async fn complete(&self, request: &ChatCompletionRequest) -> Result<ChatCompletionResponse> {
        self.requests.lock().unwrap().push(request.clone());
        let reply = self.next_reply();

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        match reply {
            MockReply::Content(content) => Ok(ChatCompletionResponse {
                choices: vec![ChatChoice {
                    message: ResponseMessage {
                        role: Some("assistant".to_string()),
                        content: Some(ChatMessageContent::Text(content)),
                    },
                    finish_reason: Some("stop".to_string()),
                }],
            }),
            MockReply::NoChoices => Ok(ChatCompletionResponse {
                choices: Vec::new(),
            }),
            MockReply::Upstream(message) => Err(Error::Upstream(message)),
        }
    }
}
