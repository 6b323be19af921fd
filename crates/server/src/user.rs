use axum::{Extension, Json, extract::State, http::StatusCode, response::IntoResponse};

use crate::{ServerError, server::ServerState, types::user};
use engine::users;

pub async fn session(
    Extension(current): Extension<users::Model>,
) -> Result<impl IntoResponse, ServerError> {
    Ok(Json(user::SessionView {
        username: current.username,
        email: current.email,
    }))
}

/// Always answers 202 so the response does not reveal whether the account
/// exists. The issued code is logged in place of an outbound email.
pub async fn reset_request(
    State(state): State<ServerState>,
    Json(payload): Json<user::ResetRequest>,
) -> Result<impl IntoResponse, ServerError> {
    if let Some(code) = state.engine.request_password_reset(&payload.account).await? {
        tracing::info!("password reset code for '{}': {code}", payload.account);
    }

    Ok(StatusCode::ACCEPTED)
}

pub async fn reset_confirm(
    State(state): State<ServerState>,
    Json(payload): Json<user::ResetConfirm>,
) -> Result<impl IntoResponse, ServerError> {
    state
        .engine
        .confirm_password_reset(&payload.code, &payload.new_password)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
