use crate::domain::{models::principal::Admin, ports::AdminRepository};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

const COLUMNS: &str = "id, name, email, password_hash, mobile_number, profile_pic, password_changed_at, created_at, updated_at";

pub struct PostgresAdminRepo {
    pool: PgPool,
}

impl PostgresAdminRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AdminRepository for PostgresAdminRepo {
    async fn create(&self, admin: &Admin) -> Result<Admin, AppError> {
        sqlx::query_as::<_, Admin>(&format!(
            "INSERT INTO admins ({COLUMNS}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) RETURNING {COLUMNS}"
        ))
            .bind(&admin.id)
            .bind(&admin.name)
            .bind(&admin.email)
            .bind(&admin.password_hash)
            .bind(&admin.mobile_number)
            .bind(&admin.profile_pic)
            .bind(admin.password_changed_at)
            .bind(admin.created_at)
            .bind(admin.updated_at)
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn count(&self) -> Result<i64, AppError> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM admins")
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Admin>, AppError> {
        sqlx::query_as::<_, Admin>(&format!("SELECT {COLUMNS} FROM admins WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Admin>, AppError> {
        sqlx::query_as::<_, Admin>(&format!("SELECT {COLUMNS} FROM admins WHERE email = $1"))
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn find_primary(&self) -> Result<Option<Admin>, AppError> {
        sqlx::query_as::<_, Admin>(&format!("SELECT {COLUMNS} FROM admins ORDER BY created_at ASC LIMIT 1"))
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn update(&self, admin: &Admin) -> Result<Admin, AppError> {
        sqlx::query_as::<_, Admin>(&format!(
            "UPDATE admins SET name = $1, email = $2, mobile_number = $3, profile_pic = $4, updated_at = $5 WHERE id = $6 RETURNING {COLUMNS}"
        ))
            .bind(&admin.name)
            .bind(&admin.email)
            .bind(&admin.mobile_number)
            .bind(&admin.profile_pic)
            .bind(admin.updated_at)
            .bind(&admin.id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)?
            .ok_or_else(|| AppError::NotFound("Admin not found".into()))
    }

    async fn update_password(&self, id: &str, password_hash: &str, changed_at: DateTime<Utc>) -> Result<(), AppError> {
        let result = sqlx::query("UPDATE admins SET password_hash = $1, password_changed_at = $2, updated_at = $3 WHERE id = $4")
            .bind(password_hash)
            .bind(changed_at)
            .bind(changed_at)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(AppError::Database)?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Admin not found".into()));
        }
        Ok(())
    }
}
