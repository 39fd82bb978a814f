use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use sqlx::{postgres::{PgPoolOptions, PgConnectOptions}, sqlite::{SqlitePoolOptions, SqliteJournalMode, SqliteConnectOptions}};
use sqlx::{PgPool, SqlitePool, ConnectOptions};
use tracing::info;
use tracing::log::LevelFilter;

use crate::config::{Config, MailTransport};
use crate::domain::ports::EmailService;
use crate::domain::services::notification_service::email_templates;
use crate::error::AppError;
use crate::state::{AppState, Repositories};
use crate::infra::email::{
    http_email_service::HttpEmailService, log_email_service::LogEmailService,
    smtp_email_service::SmtpEmailService,
};
use crate::infra::repositories::{
    postgres_admin_repo::PostgresAdminRepo, postgres_customer_repo::PostgresCustomerRepo,
    postgres_order_repo::PostgresOrderRepo, postgres_shopkeeper_repo::PostgresShopkeeperRepo,
    sqlite_admin_repo::SqliteAdminRepo, sqlite_customer_repo::SqliteCustomerRepo,
    sqlite_order_repo::SqliteOrderRepo, sqlite_shopkeeper_repo::SqliteShopkeeperRepo,
};

pub async fn bootstrap_state(config: &Config) -> Result<AppState, AppError> {
    let email_service = email_service(config)?;
    let templates = Arc::new(email_templates()?);
    let repos = connect_repositories(&config.database_url).await?;

    Ok(AppState::assemble(config.clone(), repos, email_service, templates))
}

pub fn email_service(config: &Config) -> Result<Arc<dyn EmailService>, AppError> {
    Ok(match &config.mail_transport {
        MailTransport::Http { url, token } => {
            info!("Mail transport: HTTP API at {}", url);
            Arc::new(HttpEmailService::new(url.clone(), token.clone(), config.mail_from.clone()))
        }
        MailTransport::Smtp { host, username, password } => {
            info!("Mail transport: SMTP relay {}", host);
            Arc::new(SmtpEmailService::new(host, username.clone(), password.clone(), config.mail_from.clone())?)
        }
        MailTransport::Log => {
            info!("Mail transport: log only, no email will leave this process");
            Arc::new(LogEmailService)
        }
    })
}

async fn connect_repositories(database_url: &str) -> Result<Repositories, AppError> {
    if database_url.starts_with("postgres://") || database_url.starts_with("postgresql://") {
        info!("Initializing PostgreSQL connection...");

        let opts: PgConnectOptions = database_url
            .parse::<PgConnectOptions>()?
            .log_statements(LevelFilter::Debug)
            .log_slow_statements(LevelFilter::Warn, Duration::from_millis(500));

        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect_with(opts)
            .await?;

        run_postgres_migrations(&pool).await?;
        Ok(postgres_repositories(pool))
    } else {
        info!("Initializing SQLite connection with WAL Mode...");

        let opts = SqliteConnectOptions::from_str(database_url)?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(Duration::from_secs(5))
            .log_statements(LevelFilter::Debug)
            .log_slow_statements(LevelFilter::Warn, Duration::from_millis(500));

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(opts)
            .await?;

        run_sqlite_migrations(&pool).await?;
        Ok(sqlite_repositories(pool))
    }
}

pub fn sqlite_repositories(pool: SqlitePool) -> Repositories {
    Repositories {
        admins: Arc::new(SqliteAdminRepo::new(pool.clone())),
        customers: Arc::new(SqliteCustomerRepo::new(pool.clone())),
        shopkeepers: Arc::new(SqliteShopkeeperRepo::new(pool.clone())),
        orders: Arc::new(SqliteOrderRepo::new(pool)),
    }
}

pub fn postgres_repositories(pool: PgPool) -> Repositories {
    Repositories {
        admins: Arc::new(PostgresAdminRepo::new(pool.clone())),
        customers: Arc::new(PostgresCustomerRepo::new(pool.clone())),
        shopkeepers: Arc::new(PostgresShopkeeperRepo::new(pool.clone())),
        orders: Arc::new(PostgresOrderRepo::new(pool)),
    }
}

async fn run_postgres_migrations(pool: &PgPool) -> Result<(), AppError> {
    sqlx::migrate!("./migrations/postgres")
        .run(pool)
        .await
        .map_err(|e| AppError::InternalWithMsg(format!("Postgres migrations failed: {}", e)))
}

pub async fn run_sqlite_migrations(pool: &SqlitePool) -> Result<(), AppError> {
    sqlx::migrate!("./migrations/sqlite")
        .run(pool)
        .await
        .map_err(|e| AppError::InternalWithMsg(format!("SQLite migrations failed: {}", e)))
}
