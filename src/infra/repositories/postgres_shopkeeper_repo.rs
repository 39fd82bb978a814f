use crate::domain::{
    models::principal::{GeoPoint, Shopkeeper},
    ports::ShopkeeperRepository,
};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::error;

const COLUMNS: &str = "id, name, shop_name, email, password_hash, mobile_number, license_number, longitude, latitude, address, active, approved_at, profile_pic, password_changed_at, created_at, updated_at";

pub struct PostgresShopkeeperRepo {
    pool: PgPool,
}

impl PostgresShopkeeperRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn not_found() -> AppError {
    AppError::NotFound("No shopkeeper found with that ID".into())
}

#[async_trait]
impl ShopkeeperRepository for PostgresShopkeeperRepo {
    async fn create(&self, sk: &Shopkeeper) -> Result<Shopkeeper, AppError> {
        sqlx::query_as::<_, Shopkeeper>(&format!(
            "INSERT INTO shopkeepers ({COLUMNS}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16) RETURNING {COLUMNS}"
        ))
            .bind(&sk.id)
            .bind(&sk.name)
            .bind(&sk.shop_name)
            .bind(&sk.email)
            .bind(&sk.password_hash)
            .bind(&sk.mobile_number)
            .bind(&sk.license_number)
            .bind(sk.location.longitude)
            .bind(sk.location.latitude)
            .bind(&sk.location.address)
            .bind(sk.active)
            .bind(sk.approved_at)
            .bind(&sk.profile_pic)
            .bind(sk.password_changed_at)
            .bind(sk.created_at)
            .bind(sk.updated_at)
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Shopkeeper>, AppError> {
        sqlx::query_as::<_, Shopkeeper>(&format!("SELECT {COLUMNS} FROM shopkeepers WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Shopkeeper>, AppError> {
        sqlx::query_as::<_, Shopkeeper>(&format!("SELECT {COLUMNS} FROM shopkeepers WHERE email = $1"))
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn list_pending(&self) -> Result<Vec<Shopkeeper>, AppError> {
        sqlx::query_as::<_, Shopkeeper>(&format!(
            "SELECT {COLUMNS} FROM shopkeepers WHERE active = FALSE AND approved_at IS NULL ORDER BY created_at DESC"
        ))
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn list_approved(&self) -> Result<Vec<Shopkeeper>, AppError> {
        sqlx::query_as::<_, Shopkeeper>(&format!(
            "SELECT {COLUMNS} FROM shopkeepers WHERE active = TRUE ORDER BY created_at DESC"
        ))
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn update(&self, sk: &Shopkeeper) -> Result<Shopkeeper, AppError> {
        sqlx::query_as::<_, Shopkeeper>(&format!(
            "UPDATE shopkeepers SET name = $1, email = $2, mobile_number = $3, profile_pic = $4, updated_at = $5 WHERE id = $6 RETURNING {COLUMNS}"
        ))
            .bind(&sk.name)
            .bind(&sk.email)
            .bind(&sk.mobile_number)
            .bind(&sk.profile_pic)
            .bind(sk.updated_at)
            .bind(&sk.id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)?
            .ok_or_else(not_found)
    }

    async fn update_location(&self, id: &str, location: &GeoPoint) -> Result<Shopkeeper, AppError> {
        sqlx::query_as::<_, Shopkeeper>(&format!(
            "UPDATE shopkeepers SET longitude = $1, latitude = $2, address = $3, updated_at = $4 WHERE id = $5 RETURNING {COLUMNS}"
        ))
            .bind(location.longitude)
            .bind(location.latitude)
            .bind(&location.address)
            .bind(Utc::now())
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)?
            .ok_or_else(not_found)
    }

    async fn update_password(&self, id: &str, password_hash: &str, changed_at: DateTime<Utc>) -> Result<(), AppError> {
        let result = sqlx::query("UPDATE shopkeepers SET password_hash = $1, password_changed_at = $2, updated_at = $3 WHERE id = $4")
            .bind(password_hash)
            .bind(changed_at)
            .bind(changed_at)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(AppError::Database)?;
        if result.rows_affected() == 0 {
            return Err(not_found());
        }
        Ok(())
    }

    async fn activate_if_pending(&self, id: &str) -> Result<bool, AppError> {
        let result = sqlx::query("UPDATE shopkeepers SET active = TRUE, approved_at = COALESCE(approved_at, $1), updated_at = $1 WHERE id = $2 AND active = FALSE")
            .bind(Utc::now())
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(AppError::Database)?;
        Ok(result.rows_affected() == 1)
    }

    async fn deactivate(&self, id: &str) -> Result<(), AppError> {
        let result = sqlx::query("UPDATE shopkeepers SET active = FALSE, updated_at = $1 WHERE id = $2")
            .bind(Utc::now())
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(AppError::Database)?;
        if result.rows_affected() == 0 {
            return Err(not_found());
        }
        Ok(())
    }

    async fn delete_if_pending(&self, id: &str) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM shopkeepers WHERE id = $1 AND active = FALSE AND approved_at IS NULL")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                error!("Postgres shopkeeper deletion failed: {:?}", e);
                AppError::Database(e)
            })?;
        Ok(result.rows_affected() == 1)
    }
}
