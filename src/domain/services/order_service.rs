use std::sync::Arc;
use crate::domain::{
    models::order::{GlassSize, GroupedOrders, NewOrderParams, Order, OrderDetails, OrderStatus, PaymentMethod},
    ports::{OrderRepository, ShopkeeperRepository},
};
use crate::error::AppError;
use tracing::info;

pub struct PlaceOrder {
    pub shop_id: String,
    pub glass_size: GlassSize,
    pub quantity: i64,
    pub payment_method: PaymentMethod,
}

pub struct OrderService {
    orders: Arc<dyn OrderRepository>,
    shopkeepers: Arc<dyn ShopkeeperRepository>,
}

impl OrderService {
    pub fn new(orders: Arc<dyn OrderRepository>, shopkeepers: Arc<dyn ShopkeeperRepository>) -> Self {
        Self { orders, shopkeepers }
    }

    pub async fn place_order(&self, customer_id: &str, request: PlaceOrder) -> Result<Order, AppError> {
        let order = Order::new(NewOrderParams {
            customer_id: customer_id.to_string(),
            shop_id: request.shop_id,
            glass_size: request.glass_size,
            quantity: request.quantity,
            payment_method: request.payment_method,
        })?;

        self.shopkeepers
            .find_by_id(&order.shop_id)
            .await?
            .filter(|shop| shop.active)
            .ok_or_else(|| AppError::NotFound("No shop found with that ID".into()))?;

        let created = self.orders.create_for_customer(&order).await?;

        info!(
            order_id = %created.id,
            customer_id = %customer_id,
            shop_id = %created.shop_id,
            total = created.total_amount,
            "Order placed"
        );
        Ok(created)
    }

    pub async fn list_my_orders(&self, customer_id: &str) -> Result<GroupedOrders, AppError> {
        let orders = self.orders.list_by_customer(customer_id).await?;
        Ok(GroupedOrders::from_orders(orders))
    }

    pub async fn list_shop_orders(&self, shop_id: &str, status: Option<OrderStatus>) -> Result<Vec<OrderDetails>, AppError> {
        self.orders.list_by_shop(shop_id, status).await
    }

    /// Moves an order the shop owns along the lifecycle.
    pub async fn advance_status(&self, shop_id: &str, order_id: &str, next: OrderStatus) -> Result<OrderDetails, AppError> {
        let order = self
            .orders
            .find_by_id(order_id)
            .await?
            .filter(|o| o.shop_id == shop_id)
            .ok_or_else(order_not_found)?;

        self.transition(&order, next).await
    }

    /// Customers may withdraw their own order until the shop starts preparing it.
    pub async fn cancel_my_order(&self, customer_id: &str, order_id: &str) -> Result<OrderDetails, AppError> {
        let order = self
            .orders
            .find_by_id(order_id)
            .await?
            .filter(|o| o.customer_id == customer_id)
            .ok_or_else(order_not_found)?;

        if order.status != OrderStatus::Pending {
            return Err(invalid_transition(order.status, OrderStatus::Cancelled));
        }
        self.transition(&order, OrderStatus::Cancelled).await
    }

    async fn transition(&self, order: &Order, next: OrderStatus) -> Result<OrderDetails, AppError> {
        if !order.status.can_transition_to(next) {
            return Err(invalid_transition(order.status, next));
        }
        if !self.orders.update_status(&order.id, order.status, next).await? {
            return Err(AppError::Conflict("Order was updated by someone else, please reload".into()));
        }
        info!(order_id = %order.id, from = %order.status, to = %next, "Order status changed");

        self.orders.find_details(&order.id).await?.ok_or_else(order_not_found)
    }
}

fn order_not_found() -> AppError {
    AppError::NotFound("No order found with that ID".into())
}

fn invalid_transition(from: OrderStatus, to: OrderStatus) -> AppError {
    AppError::Validation(format!("Cannot move order from {} to {}", from, to))
}
