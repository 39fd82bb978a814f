use crate::domain::{models::principal::Customer, ports::CustomerRepository};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use sqlx::PgPool;

const COLUMNS: &str = "id, name, email, password_hash, mobile_number, profile_pic, password_changed_at, created_at, updated_at";

pub struct PostgresCustomerRepo {
    pool: PgPool,
}

impl PostgresCustomerRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn order_history(&self, customer_id: &str) -> Result<Vec<String>, AppError> {
        sqlx::query_scalar::<_, String>("SELECT order_id FROM customer_orders WHERE customer_id = $1 ORDER BY position ASC")
            .bind(customer_id)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }
}

#[async_trait]
impl CustomerRepository for PostgresCustomerRepo {
    async fn create(&self, customer: &Customer) -> Result<Customer, AppError> {
        sqlx::query_as::<_, Customer>(&format!(
            "INSERT INTO customers ({COLUMNS}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) RETURNING {COLUMNS}"
        ))
            .bind(&customer.id)
            .bind(&customer.name)
            .bind(&customer.email)
            .bind(&customer.password_hash)
            .bind(&customer.mobile_number)
            .bind(&customer.profile_pic)
            .bind(customer.password_changed_at)
            .bind(customer.created_at)
            .bind(customer.updated_at)
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Customer>, AppError> {
        let found = sqlx::query_as::<_, Customer>(&format!("SELECT {COLUMNS} FROM customers WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)?;

        match found {
            Some(mut customer) => {
                customer.orders = self.order_history(&customer.id).await?;
                Ok(Some(customer))
            }
            None => Ok(None),
        }
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Customer>, AppError> {
        let found = sqlx::query_as::<_, Customer>(&format!("SELECT {COLUMNS} FROM customers WHERE email = $1"))
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)?;

        match found {
            Some(mut customer) => {
                customer.orders = self.order_history(&customer.id).await?;
                Ok(Some(customer))
            }
            None => Ok(None),
        }
    }

    async fn list(&self) -> Result<Vec<Customer>, AppError> {
        let mut customers = sqlx::query_as::<_, Customer>(&format!("SELECT {COLUMNS} FROM customers ORDER BY created_at DESC"))
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)?;

        let rows = sqlx::query_as::<_, (String, String)>(
            "SELECT customer_id, order_id FROM customer_orders ORDER BY customer_id, position ASC"
        )
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)?;

        let mut history: HashMap<String, Vec<String>> = HashMap::new();
        for (customer_id, order_id) in rows {
            history.entry(customer_id).or_default().push(order_id);
        }
        for customer in &mut customers {
            customer.orders = history.remove(&customer.id).unwrap_or_default();
        }
        Ok(customers)
    }

    async fn update(&self, customer: &Customer) -> Result<Customer, AppError> {
        let mut updated = sqlx::query_as::<_, Customer>(&format!(
            "UPDATE customers SET name = $1, email = $2, mobile_number = $3, profile_pic = $4, updated_at = $5 WHERE id = $6 RETURNING {COLUMNS}"
        ))
            .bind(&customer.name)
            .bind(&customer.email)
            .bind(&customer.mobile_number)
            .bind(&customer.profile_pic)
            .bind(customer.updated_at)
            .bind(&customer.id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)?
            .ok_or_else(|| AppError::NotFound("Customer not found".into()))?;

        updated.orders = self.order_history(&updated.id).await?;
        Ok(updated)
    }

    async fn update_password(&self, id: &str, password_hash: &str, changed_at: DateTime<Utc>) -> Result<(), AppError> {
        let result = sqlx::query("UPDATE customers SET password_hash = $1, password_changed_at = $2, updated_at = $3 WHERE id = $4")
            .bind(password_hash)
            .bind(changed_at)
            .bind(changed_at)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(AppError::Database)?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Customer not found".into()));
        }
        Ok(())
    }
}
