use axum::{
    body::Body,
    extract::Request,
    http::{header, HeaderValue, Method},
    routing::{delete, get, patch, post, put},
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use crate::state::AppState;
use crate::api::handlers::{admin, auth, customer, health, machine, session, shop, shopkeeper};
use tower_http::{
    classify::ServerErrorsFailureClass,
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};
use tower_cookies::CookieManagerLayer;
use tracing::{error, info, info_span, warn, Span};
use uuid::Uuid;

pub fn create_router(state: Arc<AppState>) -> Router {
    let cors = cors_layer(&state.config.frontend_url);

    let api = Router::new()
        // Customers
        .route("/customers/signup", post(customer::signup))
        .route("/customers/login", post(customer::login))
        .route("/customers/logout", get(session::logout))
        .route("/customers/me", get(customer::me))
        .route("/customers/updateMe", patch(customer::update_me))
        .route("/customers/update-password", patch(customer::update_password))
        .route("/customers/order-juice", post(customer::order_juice))
        .route("/customers/my-orders", get(customer::my_orders))
        .route("/customers/orders/{id}/cancel", patch(customer::cancel_order))

        // Shopkeepers
        .route("/shopkeepers/signup", post(shopkeeper::signup))
        .route("/shopkeepers/login", post(shopkeeper::login))
        .route("/shopkeepers/logout", get(session::logout))
        .route("/shopkeepers/me", get(shopkeeper::me))
        .route("/shopkeepers/update-me", patch(shopkeeper::update_me))
        .route("/shopkeepers/update-location", patch(shopkeeper::update_location))
        .route("/shopkeepers/update-password", patch(shopkeeper::update_password))
        .route("/shopkeepers/deactivate", delete(shopkeeper::deactivate))
        .route("/shopkeepers/orders", get(shopkeeper::list_orders))
        .route("/shopkeepers/orders/{id}/status", patch(shopkeeper::update_order_status))

        // Admin
        .route("/admin/signup", post(admin::signup))
        .route("/admin/login", post(admin::login))
        .route("/admin/me", get(admin::me))
        .route("/admin/update-me", patch(admin::update_me))
        .route("/admin/update-password", patch(admin::update_password))
        .route("/admin/pending-registrations", get(admin::pending_registrations))
        .route("/admin/approve-shopkeeper/{id}", patch(admin::approve_shopkeeper))
        .route("/admin/reject-shopkeeper/{id}", delete(admin::reject_shopkeeper))
        .route("/admin/shopkeepers", get(admin::list_shopkeepers))
        .route("/admin/shopkeepers/{id}", get(admin::get_shopkeeper))
        .route("/admin/customers", get(admin::list_customers))

        // Any principal
        .route("/auth/me", get(auth::me))
        .route("/auth/update-profile", put(auth::update_profile))

        // Public directory
        .route("/shops/locations", get(shop::locations))
        .route("/shops/nearby", get(shop::nearby))
        .route("/shops/{id}", get(shop::details))

        .route("/machines/simulate", post(machine::simulate));

    Router::new()
        .route("/health", get(health::health_check))
        .nest("/api", api)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request<Body>| {
                    let request_id = Uuid::new_v4().to_string();
                    info_span!(
                        "http_request",
                        request_id = %request_id,
                        method = ?request.method(),
                        uri = ?request.uri(),
                        version = ?request.version(),
                        user_id = tracing::field::Empty,
                        role = tracing::field::Empty,
                    )
                })
                .on_request(|request: &Request<Body>, _span: &Span| {
                    info!("started processing request: {} {}", request.method(), request.uri().path());
                })
                .on_response(|response: &axum::http::Response<Body>, latency: Duration, _span: &Span| {
                    info!(
                        status = response.status().as_u16(),
                        latency_ms = latency.as_millis(),
                        "finished processing request"
                    );
                })
                .on_failure(|error: ServerErrorsFailureClass, _latency: Duration, _span: &Span| {
                    error!("request failed: {:?}", error);
                })
        )
        .layer(CookieManagerLayer::new())
        .layer(cors)
        .with_state(state)
}

/// Browsers send the session cookie cross-origin, so the frontend origin is listed explicitly.
fn cors_layer(frontend_url: &str) -> CorsLayer {
    let origin = match frontend_url.trim_end_matches('/').parse::<HeaderValue>() {
        Ok(origin) => AllowOrigin::exact(origin),
        Err(_) => {
            warn!("FRONTEND_URL '{}' is not a valid origin, cross-origin requests will be refused", frontend_url);
            AllowOrigin::list(Vec::<HeaderValue>::new())
        }
    };

    CorsLayer::new()
        .allow_origin(origin)
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::PATCH, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
}
