//! Style-transfer conversion client
//!
//! Builds the completion request for one image, submits it, and pulls the
//! resulting image URL out of the model's reply.

use crate::ai::{ChatCompletionRequest, ChatMessage, CompletionClient, CompletionService, MessagePart};
use crate::extract::extract_image_url;
use crate::image::ImagePayload;
use crate::models::Config;
use crate::{prompts, Error, Result};
use std::path::Path;

pub const DEFAULT_DOWNLOAD_NAME: &str = "ghibli_style_image.jpg";

/// Submit a request and resolve the image URL embedded in the first choice.
pub async fn resolve_image_url(
    completion: &dyn CompletionService,
    request: &ChatCompletionRequest,
) -> Result<String> {
    let response = completion.complete(request).await?;

    let content = response.first_text().ok_or_else(|| {
        Error::MalformedResponse("response has no choices[0].message.content text".to_string())
    })?;

    match extract_image_url(content) {
        Some(url) => {
            tracing::info!("Extracted image URL from completion response: {}", url);
            Ok(url)
        }
        None => {
            tracing::warn!(
                "No image URL found in completion response ({} chars)",
                content.len()
            );
            Err(Error::Extraction("no image URL in response".to_string()))
        }
    }
}

pub struct Converter {
    completion: Box<dyn CompletionService>,
    http: reqwest::Client,
    model: String,
    style: String,
}

impl Converter {
    pub fn new(completion: Box<dyn CompletionService>, model: String, style: String) -> Self {
        Self {
            completion,
            http: reqwest::Client::new(),
            model,
            style,
        }
    }

    /// Converter talking to the configured completion endpoint.
    pub fn from_config(config: &Config) -> Result<Self> {
        let client = CompletionClient::new(
            config.require_api_key()?.to_string(),
            config.base_url.clone(),
            config.timeout,
        )?;
        let http = client.http().clone();

        Ok(Self {
            completion: Box::new(client),
            http,
            model: config.model.clone(),
            style: config.style_name.clone(),
        })
    }

    pub fn build_request(&self, payload: &ImagePayload) -> Result<ChatCompletionRequest> {
        ChatCompletionRequest::from_messages(
            self.model.clone(),
            &[
                ChatMessage::system(prompts::SYSTEM.trim()),
                ChatMessage::user_parts(vec![
                    MessagePart::text(prompts::style_instruction(&self.style)),
                    MessagePart::image_url(payload.to_data_url()),
                ]),
            ],
        )
    }

    /// Restyle one image and return the URL of the result.
    pub async fn convert(&self, payload: &ImagePayload) -> Result<String> {
        tracing::info!(
            "Converting image ({} bytes, {}) with model {}",
            payload.bytes.len(),
            payload.mime,
            self.model
        );
        let request = self.build_request(payload)?;
        resolve_image_url(self.completion.as_ref(), &request).await
    }

    /// Fetch the converted image and write it to `dest`. Returns the byte count.
    pub async fn download(&self, url: &str, dest: &Path) -> Result<usize> {
        tracing::info!("Downloading result image to {}", dest.display());

        let response = self.http.get(url).send().await?;
        if !response.status().is_success() {
            return Err(Error::Upstream(format!(
                "image download failed (status {})",
                response.status()
            )));
        }

        let bytes = response.bytes().await?;
        tokio::fs::write(dest, &bytes).await?;
        Ok(bytes.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::MockCompletionClient;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn converter(mock: MockCompletionClient) -> Converter {
        Converter::new(
            Box::new(mock),
            "gpt-4o-image-vip".to_string(),
            "Studio Ghibli".to_string(),
        )
    }

    fn payload() -> ImagePayload {
        ImagePayload::new(vec![0xFF, 0xD8, 0xFF, 0xE0], "image/jpeg")
    }

    #[tokio::test]
    async fn test_build_request_shape() {
        let request = converter(MockCompletionClient::new())
            .build_request(&payload())
            .unwrap();

        assert_eq!(request.model, "gpt-4o-image-vip");
        assert!(!request.stream);
        assert_eq!(request.messages.len(), 2);
        assert_eq!(request.messages[0]["role"], "system");
        assert_eq!(request.messages[1]["role"], "user");

        let parts = &request.messages[1]["content"];
        assert_eq!(parts[0]["type"], "text");
        assert!(parts[0]["text"].as_str().unwrap().contains("Studio Ghibli"));
        assert_eq!(parts[1]["type"], "image_url");
        assert_eq!(
            parts[1]["image_url"]["url"],
            "data:image/jpeg;base64,/9j/4A=="
        );
    }

    #[tokio::test]
    async fn test_convert_returns_markdown_url() {
        let mock = MockCompletionClient::new()
            .with_content_response("here: ![x](https://cdn/a.jpg)".to_string());
        let calls = mock.clone();

        let url = converter(mock).convert(&payload()).await.unwrap();
        assert_eq!(url, "https://cdn/a.jpg");
        assert_eq!(calls.get_call_count(), 1);
    }

    #[tokio::test]
    async fn test_convert_without_url_is_extraction_error() {
        let mock = MockCompletionClient::new().with_content_response("no image produced".to_string());
        let err = converter(mock).convert(&payload()).await.unwrap_err();
        assert!(matches!(err, Error::Extraction(_)));
    }

    #[tokio::test]
    async fn test_convert_without_choices_is_malformed() {
        let mock = MockCompletionClient::new().with_empty_choices();
        let err = converter(mock).convert(&payload()).await.unwrap_err();
        assert!(matches!(err, Error::MalformedResponse(_)));
    }

    #[tokio::test]
    async fn test_convert_does_not_retry_upstream_errors() {
        let mock = MockCompletionClient::new().with_upstream_error("status 502".to_string());
        let calls = mock.clone();

        let err = converter(mock).convert(&payload()).await.unwrap_err();
        assert!(matches!(err, Error::Upstream(_)));
        assert_eq!(calls.get_call_count(), 1);
    }

    #[test]
    fn test_from_config_requires_api_key() {
        let result = Converter::from_config(&Config::default());
        assert!(matches!(result, Err(Error::Configuration(_))));
    }

    #[tokio::test]
    async fn test_download_writes_file() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/a.jpg"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![1u8, 2, 3]))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join(DEFAULT_DOWNLOAD_NAME);
        let written = converter(MockCompletionClient::new())
            .download(&format!("{}/a.jpg", server.uri()), &dest)
            .await
            .unwrap();

        assert_eq!(written, 3);
        assert_eq!(std::fs::read(&dest).unwrap(), vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_download_non_success_is_upstream_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let err = converter(MockCompletionClient::new())
            .download(&format!("{}/gone.jpg", server.uri()), &dir.path().join("x.jpg"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Upstream(_)));
    }
}
