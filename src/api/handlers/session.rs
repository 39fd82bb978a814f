use axum::{extract::State, response::IntoResponse, Json};
use crate::api::dtos::responses::Envelope;
use crate::api::extractors::auth::{LOGGED_OUT, SESSION_COOKIE};
use crate::state::AppState;
use crate::error::AppError;
use std::sync::Arc;
use tower_cookies::{Cookies, Cookie};
use tower_cookies::cookie::SameSite;
use time::Duration;
use tracing::info;

/// Issues a token for `principal_id` and mirrors it into the `jwt` cookie.
pub fn start_session(state: &AppState, cookies: &Cookies, principal_id: &str) -> Result<String, AppError> {
    let token = state.auth_service.issue_token(principal_id)?;
    let max_age = Duration::seconds(state.auth_service.expires_in().num_seconds());
    cookies.add(session_cookie(state, token.clone(), max_age));
    Ok(token)
}

fn session_cookie(state: &AppState, value: String, max_age: Duration) -> Cookie<'static> {
    let mut cookie = Cookie::new(SESSION_COOKIE, value);
    cookie.set_http_only(true);
    cookie.set_secure(state.config.public_base_url.starts_with("https://"));
    cookie.set_same_site(SameSite::Lax);
    cookie.set_path("/");
    cookie.set_max_age(max_age);
    cookie
}

/// Shared by the customer and shopkeeper logout routes. Tokens are stateless, so this only
/// overwrites the cookie.
pub async fn logout(
    State(state): State<Arc<AppState>>,
    cookies: Cookies,
) -> impl IntoResponse {
    cookies.add(session_cookie(&state, LOGGED_OUT.to_string(), Duration::seconds(10)));
    info!("Session cookie cleared");
    Json(Envelope::success())
}
