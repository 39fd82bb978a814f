use axum::{extract::{Path, Query, State}, response::IntoResponse, Json};
use crate::state::AppState;
use crate::api::dtos::{requests::NearbyQuery, responses::Envelope};
use crate::domain::services::shop_directory::DEFAULT_RADIUS_KM;
use crate::error::AppError;
use std::sync::Arc;

pub async fn locations(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, AppError> {
    let shops = state.shops.locations().await?;
    Ok(Json(Envelope::success().with_list("shops", &shops)))
}

pub async fn nearby(
    State(state): State<Arc<AppState>>,
    Query(query): Query<NearbyQuery>,
) -> Result<impl IntoResponse, AppError> {
    let (lat, lng, radius_km) = query.parse(DEFAULT_RADIUS_KM)?;
    let shops = state.shops.nearby(lat, lng, radius_km).await?;
    Ok(Json(Envelope::success().with_list("shops", &shops)))
}

pub async fn details(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let shop = state.shops.find(&id).await?;
    Ok(Json(Envelope::success().with("shop", &shop)))
}
