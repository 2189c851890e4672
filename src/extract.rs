//! Image URL extraction from free-form model replies.

use once_cell::sync::Lazy;
use regex::Regex;

// ── Lazy static regexes ──────────────────────────────────────────────────────

static MARKDOWN_IMAGE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"!\[.*?\]\((https?://[^)]+)\)").unwrap());

static BARE_IMAGE_URL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)https?://\S+\.(?:jpg|jpeg|png|gif)").unwrap());

// ── Public API ───────────────────────────────────────────────────────────────

/// Locate an image URL in free-form model output.
///
/// A markdown image (`![alt](url)`) wins over a bare `http(s)` URL ending in
/// an image extension. Returns `None` when neither shape is present.
pub fn extract_image_url(text: &str) -> Option<String> {
    if let Some(url) = MARKDOWN_IMAGE_RE
        .captures(text)
        .and_then(|caps| caps.get(1))
    {
        return Some(url.as_str().to_string());
    }

    BARE_IMAGE_URL_RE
        .find(text)
        .map(|m| m.as_str().to_string())
}
