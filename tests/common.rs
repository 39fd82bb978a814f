#![allow(dead_code)]

use juice_backend::{
    api::router::create_router,
    config::{Config, MailTransport},
    domain::{ports::EmailService, services::notification_service::email_templates},
    error::AppError,
    infra::factory::{run_sqlite_migrations, sqlite_repositories},
    state::AppState,
};
use sqlx::{sqlite::{SqliteConnectOptions, SqlitePoolOptions}, Pool, Sqlite};
use std::str::FromStr;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use uuid::Uuid;
use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use async_trait::async_trait;
use tower::ServiceExt;
use serde_json::{json, Value};

#[derive(Debug, Clone)]
pub struct SentMail {
    pub recipient: String,
    pub subject: String,
    pub html_body: String,
}

/// Records every message instead of sending it.
#[derive(Default)]
pub struct MockEmailService {
    pub outbox: Mutex<Vec<SentMail>>,
}

impl MockEmailService {
    pub fn sent(&self) -> Vec<SentMail> {
        self.outbox.lock().unwrap().clone()
    }

    pub fn sent_to(&self, recipient: &str) -> Vec<SentMail> {
        self.sent().into_iter().filter(|m| m.recipient == recipient).collect()
    }
}

#[async_trait]
impl EmailService for MockEmailService {
    async fn send(&self, recipient: &str, subject: &str, html_body: &str) -> Result<(), AppError> {
        self.outbox.lock().unwrap().push(SentMail {
            recipient: recipient.to_string(),
            subject: subject.to_string(),
            html_body: html_body.to_string(),
        });
        Ok(())
    }
}

pub const ADMIN_EMAIL: &str = "admin@tradtech.com";
pub const PASSWORD: &str = "pass1234";

pub struct TestApp {
    pub router: Router,
    pub pool: Pool<Sqlite>,
    pub db_filename: String,
    pub state: Arc<AppState>,
    pub mailer: Arc<MockEmailService>,
}

impl TestApp {
    pub async fn new() -> Self {
        let db_filename = format!("test_{}.db", Uuid::new_v4());
        let db_url = format!("sqlite://{}?mode=rwc", db_filename);

        let connection_options = SqliteConnectOptions::from_str(&db_url)
            .unwrap()
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .connect_with(connection_options)
            .await
            .expect("Failed to connect to test db");

        run_sqlite_migrations(&pool).await.expect("Failed to migrate test db");

        let config = Config {
            database_url: db_url,
            port: 0,
            jwt_secret: "test-secret-that-is-long-enough".to_string(),
            jwt_expires_in: Duration::from_secs(60 * 60),
            frontend_url: "http://localhost:5173".to_string(),
            public_base_url: "http://api.test".to_string(),
            admin_email: None,
            mail_transport: MailTransport::Log,
            mail_from: "TradTech <noreply@tradtech.com>".to_string(),
            support_email: "support@tradtech.com".to_string(),
            support_url: "https://tradtech.com/contact".to_string(),
            login_url: "http://localhost:5173/login".to_string(),
        };

        let mailer = Arc::new(MockEmailService::default());
        let templates = Arc::new(email_templates().expect("templates load"));
        let state = Arc::new(AppState::assemble(
            config,
            sqlite_repositories(pool.clone()),
            mailer.clone(),
            templates,
        ));

        let router = create_router(state.clone());

        Self { router, pool, db_filename, state, mailer }
    }

    pub async fn request(&self, method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.request(Method::GET, uri, token, None).await
    }

    pub async fn post(&self, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        self.request(Method::POST, uri, token, Some(body)).await
    }

    pub async fn patch(&self, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        self.request(Method::PATCH, uri, token, Some(body)).await
    }

    /// Creates the one administrator and returns its token.
    pub async fn admin_token(&self) -> String {
        let (status, body) = self
            .post(
                "/api/admin/signup",
                None,
                json!({ "name": "Root", "email": ADMIN_EMAIL, "password": PASSWORD, "passwordConfirm": PASSWORD }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "admin signup failed: {}", body);
        body["token"].as_str().unwrap().to_string()
    }

    /// Returns `(customer_id, token)`.
    pub async fn customer(&self, email: &str) -> (String, String) {
        let (status, body) = self
            .post(
                "/api/customers/signup",
                None,
                json!({ "name": "Asha", "email": email, "password": PASSWORD, "passwordConfirm": PASSWORD }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "customer signup failed: {}", body);
        (
            body["data"]["customer"]["_id"].as_str().unwrap().to_string(),
            body["token"].as_str().unwrap().to_string(),
        )
    }

    /// Submits a registration and returns the pending shopkeeper's id.
    pub async fn register_shop(&self, body: Value) -> String {
        let (status, body) = self.post("/api/shopkeepers/signup", None, body).await;
        assert_eq!(status, StatusCode::CREATED, "shopkeeper signup failed: {}", body);
        body["data"]["shopkeeper"]["_id"].as_str().unwrap().to_string()
    }

    /// Registers, approves and logs in a shopkeeper. Returns `(shopkeeper_id, token)`.
    pub async fn approved_shop(&self, admin_token: &str, tag: &str, lat: f64, lng: f64) -> (String, String) {
        let body = shopkeeper_signup(tag, lat, lng);
        let email = body["email"].as_str().unwrap().to_string();
        let id = self.register_shop(body).await;

        let (status, body) = self
            .patch(&format!("/api/admin/approve-shopkeeper/{}", id), Some(admin_token), json!({}))
            .await;
        assert_eq!(status, StatusCode::OK, "approval failed: {}", body);

        let token = self.login("shopkeepers", &email, PASSWORD).await;
        (id, token)
    }

    pub async fn login(&self, collection: &str, email: &str, password: &str) -> String {
        let (status, body) = self
            .post(&format!("/api/{}/login", collection), None, json!({ "email": email, "password": password }))
            .await;
        assert_eq!(status, StatusCode::OK, "login failed: {}", body);
        body["token"].as_str().unwrap().to_string()
    }
}

/// A complete shopkeeper signup body; `tag` keeps email, shop name and license unique.
pub fn shopkeeper_signup(tag: &str, lat: f64, lng: f64) -> Value {
    json!({
        "name": format!("Owner {}", tag),
        "shopName": format!("Cane Corner {}", tag),
        "email": format!("{}@shops.test", tag),
        "password": PASSWORD,
        "passwordConfirm": PASSWORD,
        "mobileNumber": "9876543210",
        "licenseNumber": format!("LIC-{}", tag),
        "address": { "location": { "coordinates": [lng, lat], "address": format!("{} Market Road", tag) } }
    })
}

impl Drop for TestApp {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.db_filename);
        let _ = std::fs::remove_file(format!("{}-wal", self.db_filename));
        let _ = std::fs::remove_file(format!("{}-shm", self.db_filename));
    }
}
