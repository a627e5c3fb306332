use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;

use crate::api::v1::dto::{
    auth_request::AuthRequest,
    auth_response::{AuthResponse, RegisteredUserResponse},
};
use crate::error::AppError;
use crate::state::AppState;

pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<AuthRequest>,
) -> Result<(StatusCode, Json<RegisteredUserResponse>), AppError> {
    req.validate()
        .map_err(|msg| AppError::InvalidRequest(msg.to_string()))?;

    let user = state.accounts.register(&req.username, &req.password).await?;

    Ok((
        StatusCode::CREATED,
        Json(RegisteredUserResponse {
            id: user.id,
            username: user.username,
        }),
    ))
}

pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<AuthRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    req.validate()
        .map_err(|msg| AppError::InvalidRequest(msg.to_string()))?;

    let token = state.accounts.login(&req.username, &req.password).await?;

    Ok(Json(AuthResponse {
        access_token: token.access_token,
        token_type: token.token_type.to_string(),
        expires_in: token.expires_in,
    }))
}
