use super::ImagePayload;
use crate::{Error, Result};
use base64::Engine as _;
use std::path::Path;

/// Base64 text of the payload bytes, without any data-URL prefix.
pub fn encode(payload: &ImagePayload) -> String {
    base64::engine::general_purpose::STANDARD.encode(&payload.bytes)
}

/// Read a file and return its base64 payload.
pub async fn encode_file(path: impl AsRef<Path>) -> Result<String> {
    let payload = ImagePayload::read(path).await?;
    Ok(encode(&payload))
}

/// Payload portion of a `data:<mime>;base64,<payload>` URL; other input is
/// returned unchanged.
pub fn strip_data_url_prefix(input: &str) -> &str {
    match input.strip_prefix("data:") {
        Some(rest) => match rest.split_once(',') {
            Some((header, payload)) if header.ends_with(";base64") => payload,
            _ => input,
        },
        None => input,
    }
}

/// Decode base64 text (optionally a data URL) back into bytes.
pub fn decode(input: &str) -> Result<Vec<u8>> {
    base64::engine::general_purpose::STANDARD
        .decode(strip_data_url_prefix(input).trim())
        .map_err(|e| Error::InvalidRequest(format!("invalid base64 image data: {}", e)))
}
