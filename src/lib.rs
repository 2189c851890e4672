//! Image style-transfer client and proxy
//!
//! Encodes a user image, submits it to a multimodal chat-completion endpoint
//! with a fixed style-transfer prompt, and extracts the resulting image URL
//! from the model's free-form reply. The `server` module exposes the same flow
//! as an HTTP proxy that keeps the service credential off the browser.

pub mod ai;
pub mod convert;
pub mod error;
pub mod extract;
pub mod image;
pub mod jobs;
pub mod models;
pub mod prompts;
pub mod server;
pub mod session;

pub use error::{Error, Result};
