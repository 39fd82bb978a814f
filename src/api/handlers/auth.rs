use axum::{extract::State, response::IntoResponse, Json};
use crate::state::AppState;
use crate::api::dtos::{requests::UpdateProfileRequest, responses::Envelope};
use crate::api::extractors::{auth::AuthPrincipal, json::JsonBody};
use crate::error::AppError;
use std::sync::Arc;

/// Whoever the token belongs to, tagged with a `role` field.
pub async fn me(AuthPrincipal(principal): AuthPrincipal) -> Result<impl IntoResponse, AppError> {
    Ok(Json(Envelope::success().with("user", &principal)))
}

pub async fn update_profile(
    State(state): State<Arc<AppState>>,
    AuthPrincipal(principal): AuthPrincipal,
    JsonBody(payload): JsonBody<UpdateProfileRequest>,
) -> Result<impl IntoResponse, AppError> {
    let updated = state.accounts.update_profile(&principal, payload.into_changes()?).await?;

    Ok(Json(
        Envelope::success()
            .message("Profile updated successfully")
            .with("user", &updated),
    ))
}
