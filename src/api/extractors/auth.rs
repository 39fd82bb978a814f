use axum::{
    extract::{FromRef, FromRequestParts, Query},
    http::{header::AUTHORIZATION, request::Parts},
};
use crate::state::AppState;
use crate::domain::models::principal::{Admin, Customer, Principal, Role, Shopkeeper};
use crate::error::AppError;
use std::collections::HashMap;
use std::sync::Arc;
use tower_cookies::Cookies;
use tracing::Span;

pub const SESSION_COOKIE: &str = "jwt";
pub const LOGGED_OUT: &str = "loggedout";

/// Any authenticated admin, customer or shopkeeper.
///
/// The token is read from the `Authorization: Bearer` header, then an `?Authorization=Bearer ...`
/// query parameter, then the `jwt` cookie. The resolved principal is cached in the request
/// extensions so role extractors running after it do not hit the stores again.
#[derive(Debug, Clone)]
pub struct AuthPrincipal(pub Principal);

impl<S> FromRequestParts<S> for AuthPrincipal
where
    S: Send + Sync,
    Arc<AppState>: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        if let Some(principal) = parts.extensions.get::<Principal>() {
            return Ok(AuthPrincipal(principal.clone()));
        }

        let token = session_token(parts)
            .ok_or_else(|| AppError::Unauthorized("You are not logged in! Please log in to get access.".into()))?;

        let app_state = <Arc<AppState> as FromRef<S>>::from_ref(state);
        let claims = app_state.auth_service.verify_token(&token)?;

        let principal = app_state
            .identity
            .find_principal(&claims.sub)
            .await?
            .ok_or_else(|| AppError::Unauthorized("The user belonging to this token no longer exists.".into()))?;

        if principal.changed_password_after(claims.iat) {
            return Err(AppError::Unauthorized("User recently changed password! Please log in again.".into()));
        }

        Span::current().record("user_id", principal.id());
        Span::current().record("role", principal.role().as_str());

        parts.extensions.insert(principal.clone());
        Ok(AuthPrincipal(principal))
    }
}

fn session_token(parts: &Parts) -> Option<String> {
    if let Some(token) = parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(strip_bearer)
    {
        return Some(token);
    }

    if let Ok(Query(params)) = Query::<HashMap<String, String>>::try_from_uri(&parts.uri) {
        if let Some(token) = params.get("Authorization").and_then(|v| strip_bearer(v)) {
            return Some(token);
        }
    }

    parts
        .extensions
        .get::<Cookies>()
        .and_then(|cookies| cookies.get(SESSION_COOKIE))
        .map(|cookie| cookie.value().to_string())
        .filter(|v| !v.is_empty() && v != LOGGED_OUT)
}

fn strip_bearer(value: &str) -> Option<String> {
    value
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
}

pub fn restrict_to(principal: &Principal, roles: &[Role]) -> Result<(), AppError> {
    if roles.contains(&principal.role()) {
        Ok(())
    } else {
        Err(AppError::forbidden())
    }
}

pub struct AdminUser(pub Admin);

impl<S> FromRequestParts<S> for AdminUser
where
    S: Send + Sync,
    Arc<AppState>: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let AuthPrincipal(principal) = AuthPrincipal::from_request_parts(parts, state).await?;
        restrict_to(&principal, &[Role::Admin])?;
        match principal {
            Principal::Admin(admin) => Ok(AdminUser(admin)),
            _ => Err(AppError::forbidden()),
        }
    }
}

pub struct CustomerUser(pub Customer);

impl<S> FromRequestParts<S> for CustomerUser
where
    S: Send + Sync,
    Arc<AppState>: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let AuthPrincipal(principal) = AuthPrincipal::from_request_parts(parts, state).await?;
        restrict_to(&principal, &[Role::Customer])?;
        match principal {
            Principal::Customer(customer) => Ok(CustomerUser(customer)),
            _ => Err(AppError::forbidden()),
        }
    }
}

/// An approved shopkeeper. Accounts still awaiting approval are refused.
pub struct ShopkeeperUser(pub Shopkeeper);

impl<S> FromRequestParts<S> for ShopkeeperUser
where
    S: Send + Sync,
    Arc<AppState>: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let AuthPrincipal(principal) = AuthPrincipal::from_request_parts(parts, state).await?;
        restrict_to(&principal, &[Role::Shopkeeper])?;
        match principal {
            Principal::Shopkeeper(shopkeeper) if shopkeeper.active => Ok(ShopkeeperUser(shopkeeper)),
            Principal::Shopkeeper(_) => Err(AppError::Forbidden("Your account is not yet approved by admin.".into())),
            _ => Err(AppError::forbidden()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn parts(req: Request<()>) -> Parts {
        req.into_parts().0
    }

    #[test]
    fn header_token_wins() {
        let p = parts(
            Request::builder()
                .uri("/api/auth/me?Authorization=Bearer%20query")
                .header(AUTHORIZATION, "Bearer header")
                .body(())
                .unwrap(),
        );
        assert_eq!(session_token(&p).as_deref(), Some("header"));
    }

    #[test]
    fn query_token_is_a_fallback() {
        let p = parts(Request::builder().uri("/api/auth/me?Authorization=Bearer%20abc.def").body(()).unwrap());
        assert_eq!(session_token(&p).as_deref(), Some("abc.def"));
    }

    #[test]
    fn non_bearer_schemes_are_ignored() {
        let p = parts(Request::builder().uri("/").header(AUTHORIZATION, "Basic dXNlcg==").body(()).unwrap());
        assert_eq!(session_token(&p), None);
    }

    #[test]
    fn roles_are_checked() {
        let customer = Principal::Customer(Customer::new("A".into(), "a@x.com".into(), "h".into()));
        assert!(restrict_to(&customer, &[Role::Customer]).is_ok());
        assert!(matches!(restrict_to(&customer, &[Role::Admin]), Err(AppError::Forbidden(_))));
    }
}
