use axum::{response::IntoResponse, Json};
use crate::api::dtos::{requests::SimulateRequest, responses::Envelope};
use crate::api::extractors::json::JsonBody;
use crate::domain::services::simulator;
use crate::error::AppError;

/// Advances a machine snapshot by `elapsedHours` and reports what it can still produce.
pub async fn simulate(JsonBody(payload): JsonBody<SimulateRequest>) -> Result<impl IntoResponse, AppError> {
    if !payload.elapsed_hours.is_finite() || payload.elapsed_hours < 0.0 {
        return Err(AppError::Validation("elapsedHours must be a non-negative number".into()));
    }
    if !(0.0..=100.0).contains(&payload.state.battery_percentage) {
        return Err(AppError::Validation("batteryPercentage must be between 0 and 100".into()));
    }
    if !(0.0..=1.0).contains(&payload.state.solar_efficiency) {
        return Err(AppError::Validation("solarEfficiency must be between 0 and 1".into()));
    }

    let next = simulator::next_state(&payload.state, payload.elapsed_hours);
    let estimates = simulator::estimates(&next, payload.glasses);

    Ok(Json(
        Envelope::success()
            .with("state", &next)
            .with("estimates", &estimates),
    ))
}
