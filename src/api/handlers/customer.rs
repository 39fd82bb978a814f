use axum::{extract::{Path, State}, http::StatusCode, response::IntoResponse, Json};
use crate::state::AppState;
use crate::api::dtos::{
    requests::{LoginRequest, OrderJuiceRequest, SignupRequest, UpdateMeRequest, UpdatePasswordRequest},
    responses::Envelope,
};
use crate::api::extractors::{auth::CustomerUser, json::JsonBody};
use crate::api::handlers::session::start_session;
use crate::domain::models::principal::{Principal, Role};
use crate::error::AppError;
use std::sync::Arc;
use tower_cookies::Cookies;

pub async fn signup(
    State(state): State<Arc<AppState>>,
    cookies: Cookies,
    JsonBody(payload): JsonBody<SignupRequest>,
) -> Result<impl IntoResponse, AppError> {
    let customer = state.accounts.signup_customer(payload.into_account()?).await?;
    let token = start_session(&state, &cookies, &customer.id)?;

    Ok((
        StatusCode::CREATED,
        Json(Envelope::success().token(token).with("customer", &customer)),
    ))
}

pub async fn login(
    State(state): State<Arc<AppState>>,
    cookies: Cookies,
    JsonBody(payload): JsonBody<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    let (email, password) = payload.credentials()?;
    let principal = state.accounts.login(Role::Customer, email, password).await?;
    let token = start_session(&state, &cookies, principal.id())?;

    Ok(Json(Envelope::success().token(token).with("customer", &principal)))
}

pub async fn me(CustomerUser(customer): CustomerUser) -> Result<impl IntoResponse, AppError> {
    Ok(Json(Envelope::success().with("customer", &customer)))
}

pub async fn update_me(
    State(state): State<Arc<AppState>>,
    CustomerUser(customer): CustomerUser,
    JsonBody(payload): JsonBody<UpdateMeRequest>,
) -> Result<impl IntoResponse, AppError> {
    let updated = state
        .accounts
        .update_profile(&Principal::Customer(customer), payload.into_changes()?)
        .await?;

    Ok(Json(Envelope::success().with("customer", &updated)))
}

pub async fn update_password(
    State(state): State<Arc<AppState>>,
    cookies: Cookies,
    CustomerUser(customer): CustomerUser,
    JsonBody(payload): JsonBody<UpdatePasswordRequest>,
) -> Result<impl IntoResponse, AppError> {
    let (current, new_password) = payload.into_passwords()?;
    let principal = Principal::Customer(customer);
    state.accounts.change_password(&principal, &current, &new_password).await?;
    let token = start_session(&state, &cookies, principal.id())?;

    Ok(Json(Envelope::success().token(token).with("customer", &principal)))
}

pub async fn order_juice(
    State(state): State<Arc<AppState>>,
    CustomerUser(customer): CustomerUser,
    JsonBody(payload): JsonBody<OrderJuiceRequest>,
) -> Result<impl IntoResponse, AppError> {
    let order = state.orders.place_order(&customer.id, payload.into_order()?).await?;

    Ok((StatusCode::CREATED, Json(Envelope::success().with("order", &order))))
}

pub async fn my_orders(
    State(state): State<Arc<AppState>>,
    CustomerUser(customer): CustomerUser,
) -> Result<impl IntoResponse, AppError> {
    let grouped = state.orders.list_my_orders(&customer.id).await?;
    let mut envelope = Envelope::success().with("orders", &grouped);
    envelope.results = Some(grouped.pending.len() + grouped.completed.len());

    Ok(Json(envelope))
}

pub async fn cancel_order(
    State(state): State<Arc<AppState>>,
    CustomerUser(customer): CustomerUser,
    Path(order_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let order = state.orders.cancel_my_order(&customer.id, &order_id).await?;

    Ok(Json(Envelope::success().with("order", &order)))
}
