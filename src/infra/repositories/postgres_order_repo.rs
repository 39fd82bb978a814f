use crate::domain::{
    models::order::{Order, OrderDetails, OrderDetailsRecord, OrderRecord, OrderStatus},
    ports::OrderRepository,
};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;

const COLUMNS: &str = "id, customer_id, shop_id, glass_size, quantity, price_per_glass, total_amount, payment_method, payment_status, status, ordered_at, updated_at";

const DETAILS_SELECT: &str = "SELECT o.id, o.customer_id, o.shop_id, o.glass_size, o.quantity, o.price_per_glass, o.total_amount,
        o.payment_method, o.payment_status, o.status, o.ordered_at, o.updated_at,
        s.shop_name, s.mobile_number AS shop_mobile_number, c.name AS customer_name, c.email AS customer_email
     FROM orders o
     JOIN shopkeepers s ON s.id = o.shop_id
     JOIN customers c ON c.id = o.customer_id";

pub struct PostgresOrderRepo {
    pool: PgPool,
}

impl PostgresOrderRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn into_details(records: Vec<OrderDetailsRecord>) -> Result<Vec<OrderDetails>, AppError> {
    records.into_iter().map(OrderDetails::try_from).collect()
}

#[async_trait]
impl OrderRepository for PostgresOrderRepo {
    async fn create_for_customer(&self, order: &Order) -> Result<Order, AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;

        let created = sqlx::query_as::<_, OrderRecord>(&format!(
            "INSERT INTO orders ({COLUMNS}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12) RETURNING {COLUMNS}"
        ))
            .bind(&order.id)
            .bind(&order.customer_id)
            .bind(&order.shop_id)
            .bind(i64::from(u32::from(order.glass_size)))
            .bind(order.quantity)
            .bind(order.price_per_glass)
            .bind(order.total_amount)
            .bind(order.payment_method.as_str())
            .bind(order.payment_status.as_str())
            .bind(order.status.as_str())
            .bind(order.ordered_at)
            .bind(order.updated_at)
            .fetch_one(&mut *tx)
            .await
            .map_err(AppError::Database)?;

        sqlx::query(
            "INSERT INTO customer_orders (customer_id, order_id, position)
             VALUES ($1, $2, (SELECT COALESCE(MAX(position), 0) + 1 FROM customer_orders WHERE customer_id = $3))",
        )
            .bind(&order.customer_id)
            .bind(&order.id)
            .bind(&order.customer_id)
            .execute(&mut *tx)
            .await
            .map_err(AppError::Database)?;

        tx.commit().await.map_err(AppError::Database)?;
        Order::try_from(created)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Order>, AppError> {
        sqlx::query_as::<_, OrderRecord>(&format!("SELECT {COLUMNS} FROM orders WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)?
            .map(Order::try_from)
            .transpose()
    }

    async fn find_details(&self, id: &str) -> Result<Option<OrderDetails>, AppError> {
        sqlx::query_as::<_, OrderDetailsRecord>(&format!("{DETAILS_SELECT} WHERE o.id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)?
            .map(OrderDetails::try_from)
            .transpose()
    }

    async fn list_by_customer(&self, customer_id: &str) -> Result<Vec<OrderDetails>, AppError> {
        let records = sqlx::query_as::<_, OrderDetailsRecord>(&format!(
            "{DETAILS_SELECT} WHERE o.customer_id = $1 ORDER BY o.ordered_at DESC"
        ))
            .bind(customer_id)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)?;
        into_details(records)
    }

    async fn list_by_shop(&self, shop_id: &str, status: Option<OrderStatus>) -> Result<Vec<OrderDetails>, AppError> {
        let records = match status {
            Some(status) => sqlx::query_as::<_, OrderDetailsRecord>(&format!(
                "{DETAILS_SELECT} WHERE o.shop_id = $1 AND o.status = $2 ORDER BY o.ordered_at DESC"
            ))
                .bind(shop_id)
                .bind(status.as_str())
                .fetch_all(&self.pool)
                .await,
            None => sqlx::query_as::<_, OrderDetailsRecord>(&format!(
                "{DETAILS_SELECT} WHERE o.shop_id = $1 ORDER BY o.ordered_at DESC"
            ))
                .bind(shop_id)
                .fetch_all(&self.pool)
                .await,
        }
        .map_err(AppError::Database)?;
        into_details(records)
    }

    async fn update_status(&self, id: &str, from: OrderStatus, to: OrderStatus) -> Result<bool, AppError> {
        let result = sqlx::query("UPDATE orders SET status = $1, updated_at = $2 WHERE id = $3 AND status = $4")
            .bind(to.as_str())
            .bind(Utc::now())
            .bind(id)
            .bind(from.as_str())
            .execute(&self.pool)
            .await
            .map_err(AppError::Database)?;
        Ok(result.rows_affected() == 1)
    }
}
