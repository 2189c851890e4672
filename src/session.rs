//! Conversion session state
//!
//! A single conversion attempt moves through an explicit finite state
//! machine. All changes go through [`ConversionState::transition`], and a
//! finished attempt always ends in `Succeeded` or `Failed`.

use crate::convert::Converter;
use crate::image::ImagePayload;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq)]
pub enum ConversionState {
    Idle,
    Ready { file: PathBuf },
    Encoding { file: PathBuf },
    Requesting,
    Succeeded { url: String },
    Failed { error: String },
}

#[derive(Debug, Clone, PartialEq)]
pub enum ConversionEvent {
    FileSelected(PathBuf),
    Start,
    Encoded,
    Completed(String),
    Failed(String),
    Reset,
}

impl ConversionState {
    pub fn transition(self, event: ConversionEvent) -> Self {
        use ConversionEvent as E;
        use ConversionState as S;

        match (self, event) {
            (state, E::FileSelected(_)) if state.is_busy() => {
                tracing::warn!("Ignoring file selection while a conversion is running");
                state
            }
            (_, E::FileSelected(file)) => S::Ready { file },
            (S::Ready { file }, E::Start) => S::Encoding { file },
            (S::Idle, E::Start) => S::Failed {
                error: "select an image first".to_string(),
            },
            (S::Encoding { .. }, E::Encoded) => S::Requesting,
            (S::Encoding { .. } | S::Requesting, E::Completed(url)) => S::Succeeded { url },
            (S::Encoding { .. } | S::Requesting, E::Failed(error)) => S::Failed { error },
            (_, E::Reset) => S::Idle,
            (state, event) => {
                tracing::warn!("Ignoring {:?} in state {:?}", event, state);
                state
            }
        }
    }

    pub fn is_busy(&self) -> bool {
        matches!(self, Self::Encoding { .. } | Self::Requesting)
    }

    pub fn is_finished(&self) -> bool {
        matches!(self, Self::Succeeded { .. } | Self::Failed { .. })
    }

    /// User-facing status line.
    pub fn status_line(&self) -> String {
        match self {
            Self::Idle => "Select an image to convert".to_string(),
            Self::Ready { file } => format!("Ready to convert {}", file.display()),
            Self::Encoding { .. } => "Preparing image...".to_string(),
            Self::Requesting => "Processing...".to_string(),
            Self::Succeeded { url } => format!("Conversion complete: {}", url),
            Self::Failed { error } => format!("Conversion failed: {}", error),
        }
    }
}

/// Drives one conversion through the state machine.
pub struct Session {
    state: ConversionState,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Self {
            state: ConversionState::Idle,
        }
    }

    pub fn state(&self) -> &ConversionState {
        &self.state
    }

    pub fn dispatch(&mut self, event: ConversionEvent) -> &ConversionState {
        let current = std::mem::replace(&mut self.state, ConversionState::Idle);
        self.state = current.transition(event);
        tracing::info!("{}", self.state.status_line());
        &self.state
    }

    /// Run the selected file through `converter`; resolves to a finished state.
    pub async fn run(&mut self, converter: &Converter) -> &ConversionState {
        self.dispatch(ConversionEvent::Start);
        let file = match &self.state {
            ConversionState::Encoding { file } => file.clone(),
            _ => return &self.state,
        };

        let payload = match ImagePayload::read(&file).await {
            Ok(payload) => payload,
            Err(e) => return self.dispatch(ConversionEvent::Failed(e.to_string())),
        };

        self.dispatch(ConversionEvent::Encoded);
        match converter.convert(&payload).await {
            Ok(url) => self.dispatch(ConversionEvent::Completed(url)),
            Err(e) => self.dispatch(ConversionEvent::Failed(e.to_string())),
        }
    }
}
