use axum::{
    extract::{FromRequest, Request},
    Json,
};
use crate::error::AppError;
use serde::de::DeserializeOwned;

/// `Json<T>` whose rejections use the JSON error body instead of axum's plain-text one.
pub struct JsonBody<T>(pub T);

impl<S, T> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(JsonBody(value)),
            Err(rejection) => Err(AppError::Validation(rejection.body_text())),
        }
    }
}
