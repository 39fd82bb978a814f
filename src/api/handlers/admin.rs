use axum::{body::Bytes, extract::{Path, State}, http::StatusCode, response::IntoResponse, Json};
use crate::state::AppState;
use crate::api::dtos::{
    requests::{LoginRequest, RejectRequest, SignupRequest, UpdateMeRequest, UpdatePasswordRequest},
    responses::Envelope,
};
use crate::api::extractors::{auth::AdminUser, json::JsonBody};
use crate::api::handlers::session::start_session;
use crate::domain::models::principal::{Principal, Role};
use crate::error::AppError;
use std::sync::Arc;
use tower_cookies::Cookies;

/// First-run bootstrap. Refused once any administrator exists.
pub async fn signup(
    State(state): State<Arc<AppState>>,
    cookies: Cookies,
    JsonBody(payload): JsonBody<SignupRequest>,
) -> Result<impl IntoResponse, AppError> {
    let admin = state.accounts.signup_admin(payload.into_account()?).await?;
    let token = start_session(&state, &cookies, &admin.id)?;

    Ok((
        StatusCode::CREATED,
        Json(Envelope::success().token(token).with("admin", &admin)),
    ))
}

pub async fn login(
    State(state): State<Arc<AppState>>,
    cookies: Cookies,
    JsonBody(payload): JsonBody<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    let (email, password) = payload.credentials()?;
    let principal = state.accounts.login(Role::Admin, email, password).await?;
    let token = start_session(&state, &cookies, principal.id())?;

    Ok(Json(Envelope::success().token(token).with("admin", &principal)))
}

pub async fn me(AdminUser(admin): AdminUser) -> Result<impl IntoResponse, AppError> {
    Ok(Json(Envelope::success().with("admin", &admin)))
}

pub async fn update_me(
    State(state): State<Arc<AppState>>,
    AdminUser(admin): AdminUser,
    JsonBody(payload): JsonBody<UpdateMeRequest>,
) -> Result<impl IntoResponse, AppError> {
    let updated = state
        .accounts
        .update_profile(&Principal::Admin(admin), payload.into_changes()?)
        .await?;

    Ok(Json(Envelope::success().with("admin", &updated)))
}

pub async fn update_password(
    State(state): State<Arc<AppState>>,
    cookies: Cookies,
    AdminUser(admin): AdminUser,
    JsonBody(payload): JsonBody<UpdatePasswordRequest>,
) -> Result<impl IntoResponse, AppError> {
    let (current, new_password) = payload.into_passwords()?;
    let principal = Principal::Admin(admin);
    state.accounts.change_password(&principal, &current, &new_password).await?;
    let token = start_session(&state, &cookies, principal.id())?;

    Ok(Json(Envelope::success().token(token).with("admin", &principal)))
}

pub async fn pending_registrations(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
) -> Result<impl IntoResponse, AppError> {
    let pending = state.registrations.list_pending().await?;
    Ok(Json(Envelope::success().with_list("shopkeepers", &pending)))
}

pub async fn approve_shopkeeper(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let shopkeeper = state.registrations.approve(&id).await?;
    Ok(Json(Envelope::success().with("shopkeeper", &shopkeeper)))
}

/// The body is optional; `{"rejectionReason": "..."}` overrides the default reason.
pub async fn reject_shopkeeper(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<impl IntoResponse, AppError> {
    let request = if body.iter().all(u8::is_ascii_whitespace) {
        RejectRequest::default()
    } else {
        serde_json::from_slice::<RejectRequest>(&body)
            .map_err(|e| AppError::Validation(format!("Failed to parse the request body as JSON: {}", e)))?
    };

    state
        .registrations
        .reject(&id, request.rejection_reason.as_deref())
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_shopkeepers(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
) -> Result<impl IntoResponse, AppError> {
    let shopkeepers = state.registrations.list_approved().await?;
    Ok(Json(Envelope::success().with_list("shopkeepers", &shopkeepers)))
}

pub async fn get_shopkeeper(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let shopkeeper = state.registrations.find(&id).await?;
    Ok(Json(Envelope::success().with("shopkeeper", &shopkeeper)))
}

pub async fn list_customers(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
) -> Result<impl IntoResponse, AppError> {
    let customers = state.accounts.list_customers().await?;
    Ok(Json(Envelope::success().with_list("customers", &customers)))
}
