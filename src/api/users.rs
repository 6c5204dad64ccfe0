//! User lookup endpoints

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::get,
};
use serde::Serialize;

use super::{ApiError, ApiState, blocking};
use crate::Error;

/// Public view of a user
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub user_id: String,
    pub username: String,
}

/// Look up a user by ID
async fn get_user(
    State(state): State<Arc<ApiState>>,
    Path(user_id): Path<String>,
) -> Result<Json<UserResponse>, ApiError> {
    let users = state.chat.users().clone();

    let user = blocking(move || {
        users
            .find(&user_id)?
            .ok_or_else(|| Error::NotFound(format!("user {user_id}")))
    })
    .await?;

    Ok(Json(UserResponse {
        user_id: user.id,
        username: user.username,
    }))
}

/// Build users router
pub fn router(state: Arc<ApiState>) -> Router {
    Router::new()
        .route("/user/{user_id}", get(get_user))
        .with_state(state)
}
