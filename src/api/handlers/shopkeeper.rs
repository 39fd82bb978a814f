use axum::{extract::{Path, Query, State}, http::StatusCode, response::IntoResponse, Json};
use crate::state::AppState;
use crate::api::dtos::{
    requests::{
        LoginRequest, ShopOrdersQuery, ShopkeeperSignupRequest, UpdateLocationRequest, UpdateMeRequest,
        UpdateOrderStatusRequest, UpdatePasswordRequest,
    },
    responses::{Envelope, PendingShopkeeper},
};
use crate::api::extractors::{auth::ShopkeeperUser, json::JsonBody};
use crate::api::handlers::session::start_session;
use crate::domain::models::principal::{Principal, Role};
use crate::error::AppError;
use std::sync::Arc;
use tower_cookies::Cookies;

/// Stores the application and notifies the administrator. No token is issued until approval.
pub async fn signup(
    State(state): State<Arc<AppState>>,
    JsonBody(payload): JsonBody<ShopkeeperSignupRequest>,
) -> Result<impl IntoResponse, AppError> {
    let created = state.registrations.submit(payload.into_application()?).await?;

    let summary = PendingShopkeeper {
        id: &created.id,
        name: &created.name,
        shop_name: &created.shop_name,
        email: &created.email,
        mobile_number: &created.mobile_number,
    };
    Ok((
        StatusCode::CREATED,
        Json(
            Envelope::success()
                .message("Registration successful! Your account is pending admin approval.")
                .with("shopkeeper", &summary),
        ),
    ))
}

pub async fn login(
    State(state): State<Arc<AppState>>,
    cookies: Cookies,
    JsonBody(payload): JsonBody<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    let (email, password) = payload.credentials()?;
    let principal = state.accounts.login(Role::Shopkeeper, email, password).await?;
    let token = start_session(&state, &cookies, principal.id())?;

    Ok(Json(Envelope::success().token(token).with("shopkeeper", &principal)))
}

pub async fn me(ShopkeeperUser(shopkeeper): ShopkeeperUser) -> Result<impl IntoResponse, AppError> {
    Ok(Json(Envelope::success().with("shopkeeper", &shopkeeper)))
}

pub async fn update_me(
    State(state): State<Arc<AppState>>,
    ShopkeeperUser(shopkeeper): ShopkeeperUser,
    JsonBody(payload): JsonBody<UpdateMeRequest>,
) -> Result<impl IntoResponse, AppError> {
    let updated = state
        .accounts
        .update_profile(&Principal::Shopkeeper(shopkeeper), payload.into_changes()?)
        .await?;

    Ok(Json(Envelope::success().with("shopkeeper", &updated)))
}

pub async fn update_location(
    State(state): State<Arc<AppState>>,
    ShopkeeperUser(shopkeeper): ShopkeeperUser,
    JsonBody(payload): JsonBody<UpdateLocationRequest>,
) -> Result<impl IntoResponse, AppError> {
    let updated = state.accounts.update_location(&shopkeeper.id, payload.into_point()?).await?;

    Ok(Json(Envelope::success().with("shopkeeper", &updated)))
}

pub async fn update_password(
    State(state): State<Arc<AppState>>,
    cookies: Cookies,
    ShopkeeperUser(shopkeeper): ShopkeeperUser,
    JsonBody(payload): JsonBody<UpdatePasswordRequest>,
) -> Result<impl IntoResponse, AppError> {
    let (current, new_password) = payload.into_passwords()?;
    let principal = Principal::Shopkeeper(shopkeeper);
    state.accounts.change_password(&principal, &current, &new_password).await?;
    let token = start_session(&state, &cookies, principal.id())?;

    Ok(Json(Envelope::success().token(token).with("shopkeeper", &principal)))
}

pub async fn deactivate(
    State(state): State<Arc<AppState>>,
    ShopkeeperUser(shopkeeper): ShopkeeperUser,
) -> Result<impl IntoResponse, AppError> {
    state.accounts.deactivate_shopkeeper(&shopkeeper.id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_orders(
    State(state): State<Arc<AppState>>,
    ShopkeeperUser(shopkeeper): ShopkeeperUser,
    Query(query): Query<ShopOrdersQuery>,
) -> Result<impl IntoResponse, AppError> {
    let orders = state.orders.list_shop_orders(&shopkeeper.id, query.status()?).await?;

    Ok(Json(Envelope::success().with_list("orders", &orders)))
}

pub async fn update_order_status(
    State(state): State<Arc<AppState>>,
    ShopkeeperUser(shopkeeper): ShopkeeperUser,
    Path(order_id): Path<String>,
    JsonBody(payload): JsonBody<UpdateOrderStatusRequest>,
) -> Result<impl IntoResponse, AppError> {
    let order = state
        .orders
        .advance_status(&shopkeeper.id, &order_id, payload.status()?)
        .await?;

    Ok(Json(Envelope::success().with("order", &order)))
}
