//! Proxy HTTP server
//!
//! Browser clients post chat-completion bodies here instead of calling the
//! completion endpoint directly, so the credential stays on the server.

use crate::ai::{ChatCompletionRequest, CompletionClient, CompletionService};
use crate::convert::resolve_image_url;
use crate::jobs::{JobStatus, JobStore};
use crate::models::{Config, ConvertResponse, ErrorBody};
use crate::{Error, Result};
use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use uuid::Uuid;

#[derive(Clone)]
pub struct AppState {
    completion: Option<Arc<dyn CompletionService>>,
    jobs: JobStore,
    production: bool,
}

impl AppState {
    pub fn new(
        completion: Option<Arc<dyn CompletionService>>,
        jobs: JobStore,
        production: bool,
    ) -> Self {
        Self {
            completion,
            jobs,
            production,
        }
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        let completion: Option<Arc<dyn CompletionService>> = match &config.api_key {
            Some(api_key) => Some(Arc::new(CompletionClient::new(
                api_key.clone(),
                config.base_url.clone(),
                config.timeout,
            )?)),
            None => {
                tracing::warn!("YUNWU_API_KEY not set; conversion requests will be rejected");
                None
            }
        };

        Ok(Self::new(
            completion,
            JobStore::new(config.job_ttl),
            config.production,
        ))
    }

    fn completion(&self) -> Result<Arc<dyn CompletionService>> {
        self.completion
            .clone()
            .ok_or_else(|| Error::Configuration("API key is not configured".to_string()))
    }

    fn error_response(&self, err: Error) -> Response {
        let (status, body) = match &err {
            Error::InvalidRequest(msg) => (
                StatusCode::BAD_REQUEST,
                ErrorBody {
                    error: msg.clone(),
                    message: None,
                    debug: None,
                },
            ),
            Error::Extraction(_) => (
                StatusCode::NOT_FOUND,
                ErrorBody {
                    error: "could not get an image URL from the response".to_string(),
                    message: None,
                    debug: None,
                },
            ),
            Error::Configuration(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorBody {
                    error: msg.clone(),
                    message: None,
                    debug: None,
                },
            ),
            Error::MalformedResponse(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorBody {
                    error: "received a response in an unexpected format".to_string(),
                    message: Some(msg.clone()),
                    debug: (!self.production).then(|| format!("{:?}", err)),
                },
            ),
            other => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorBody {
                    error: "error while processing the request".to_string(),
                    message: Some(other.to_string()),
                    debug: (!self.production).then(|| format!("{:?}", other)),
                },
            ),
        };

        if status.is_server_error() {
            tracing::error!("Request failed: {}", err);
        } else {
            tracing::info!("Request rejected ({}): {}", status, err);
        }
        (status, Json(body)).into_response()
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/convert", post(convert_endpoint))
        .route("/api/jobs", post(create_job))
        .route("/api/jobs/:id", get(get_job))
        .with_state(state)
}

pub async fn serve(config: Config) -> Result<()> {
    let state = AppState::from_config(&config)?;
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}

/// Validate an inbound `{model, messages}` body.
pub fn parse_convert_request(body: &[u8]) -> Result<ChatCompletionRequest> {
    let value: Value = serde_json::from_slice(body)
        .map_err(|_| Error::InvalidRequest("request body must be a JSON object".to_string()))?;

    let model = value
        .get("model")
        .and_then(Value::as_str)
        .filter(|model| !model.trim().is_empty())
        .ok_or_else(|| Error::InvalidRequest("incomplete request: model is required".to_string()))?;

    let messages = value
        .get("messages")
        .and_then(Value::as_array)
        .ok_or_else(|| {
            Error::InvalidRequest("incomplete request: messages must be an array".to_string())
        })?;

    if let Some(index) = messages
        .iter()
        .position(|message| message.get("role").and_then(Value::as_str).is_none())
    {
        return Err(Error::InvalidRequest(format!(
            "invalid messages: element {} must be an object with a string role",
            index
        )));
    }

    // Forwarded untouched; only the envelope is checked here.
    Ok(ChatCompletionRequest::new(model, messages.clone()))
}

async fn health() -> impl IntoResponse {
    Json(json!({"status": "ok"}))
}

async fn convert_endpoint(State(state): State<AppState>, body: Bytes) -> Response {
    let result = async {
        let request = parse_convert_request(&body)?;
        let completion = state.completion()?;
        resolve_image_url(completion.as_ref(), &request).await
    }
    .await;

    match result {
        Ok(image_url) => (StatusCode::OK, Json(ConvertResponse { image_url })).into_response(),
        Err(e) => state.error_response(e),
    }
}

async fn create_job(State(state): State<AppState>, body: Bytes) -> Response {
    let prepared = parse_convert_request(&body)
        .and_then(|request| Ok((request, state.completion()?)));
    let (request, completion) = match prepared {
        Ok(prepared) => prepared,
        Err(e) => return state.error_response(e),
    };

    let id = state.jobs.create().await;
    tracing::info!("Accepted conversion job {}", id);

    let jobs = state.jobs.clone();
    tokio::spawn(async move {
        let status = match resolve_image_url(completion.as_ref(), &request).await {
            Ok(image_url) => JobStatus::Succeeded { image_url },
            Err(e) => {
                tracing::error!("Conversion job {} failed: {}", id, e);
                JobStatus::Failed {
                    error: e.to_string(),
                }
            }
        };
        jobs.complete(id, status).await;
    });

    (
        StatusCode::ACCEPTED,
        Json(json!({"jobId": id, "status": "processing"})),
    )
        .into_response()
}

async fn get_job(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    let job = match Uuid::parse_str(&id) {
        Ok(id) => state.jobs.get(id).await,
        Err(_) => None,
    };

    match job {
        Some(job) => (StatusCode::OK, Json(job)).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(ErrorBody {
                error: format!("job {} not found", id),
                message: None,
                debug: None,
            }),
        )
            .into_response(),
    }
}
