//! Chat endpoints
//!
//! `/chat` runs the whole pipeline. `/process` and `/respond` expose its two
//! halves (classification, then response selection) for callers that split
//! them across services.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::{Json, Router, extract::State, routing::post};
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

use super::{ApiError, ApiState, blocking};
use crate::Error;
use crate::chat::ChatRequest;
use crate::intent::IntentLabel;

/// Response for `/chat`
#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub response: String,
    pub intent: IntentLabel,
}

/// Request body for `/process`
#[derive(Debug, Default, Deserialize)]
pub struct ProcessRequest {
    #[serde(default)]
    pub message: String,
}

/// Response for `/process`
#[derive(Debug, Serialize)]
pub struct ProcessResponse {
    pub intent: IntentLabel,
}

/// Request body for `/respond`
#[derive(Debug, Default, Deserialize)]
pub struct RespondRequest {
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub intent: String,
    #[serde(default)]
    pub message: String,
}

/// Response for `/respond`
#[derive(Debug, Serialize)]
pub struct RespondResponse {
    pub response: String,
}

/// Answer a message from a registered user
async fn chat(
    State(state): State<Arc<ApiState>>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, ApiError> {
    let Json(req) = payload?;
    let service = state.chat.clone();

    let reply = blocking(move || {
        let mut rng = StdRng::from_entropy();
        service.respond(&req, &mut rng)
    })
    .await?;

    Ok(Json(ChatResponse {
        response: reply.response,
        intent: reply.intent,
    }))
}

/// Classify a message without answering it
async fn process(
    State(state): State<Arc<ApiState>>,
    payload: Result<Json<ProcessRequest>, JsonRejection>,
) -> Result<Json<ProcessResponse>, ApiError> {
    let Json(req) = payload?;
    if req.message.trim().is_empty() {
        return Err(Error::Validation("message is required".to_string()).into());
    }

    let intent = state.chat.classifier().classify(&req.message);
    Ok(Json(ProcessResponse { intent }))
}

/// Answer a message whose intent the caller already resolved
async fn respond(
    State(state): State<Arc<ApiState>>,
    payload: Result<Json<RespondRequest>, JsonRejection>,
) -> Result<Json<RespondResponse>, ApiError> {
    let Json(req) = payload?;
    if req.intent.trim().is_empty() {
        return Err(Error::Validation("intent is required".to_string()).into());
    }
    let intent: IntentLabel = req.intent.parse()?;
    let service = state.chat.clone();

    let reply = blocking(move || {
        let mut rng = StdRng::from_entropy();
        service.respond_with_intent(&req.user_id, intent, &req.message, &mut rng)
    })
    .await?;

    Ok(Json(RespondResponse {
        response: reply.response,
    }))
}

/// Build chat router
pub fn router(state: Arc<ApiState>) -> Router {
    Router::new()
        .route("/chat", post(chat))
        .route("/process", post(process))
        .route("/respond", post(respond))
        .with_state(state)
}
