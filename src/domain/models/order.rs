use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;
use crate::error::AppError;

pub const MAX_GLASSES_PER_ORDER: i64 = 100;

/// Enumerated cup volumes; each has a fixed unit price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum GlassSize {
    Ml250,
    Ml500,
}

impl GlassSize {
    pub fn millilitres(&self) -> u32 {
        match self {
            GlassSize::Ml250 => 250,
            GlassSize::Ml500 => 500,
        }
    }

    /// Unit price in whole rupees.
    pub fn price_per_glass(&self) -> i64 {
        match self {
            GlassSize::Ml250 => 35,
            GlassSize::Ml500 => 60,
        }
    }
}

impl TryFrom<u32> for GlassSize {
    type Error = String;

    fn try_from(ml: u32) -> Result<Self, Self::Error> {
        match ml {
            250 => Ok(GlassSize::Ml250),
            500 => Ok(GlassSize::Ml500),
            other => Err(format!("Glass size must be 250 or 500 ml, got {}", other)),
        }
    }
}

impl From<GlassSize> for u32 {
    fn from(size: GlassSize) -> Self {
        size.millilitres()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    Cash,
    Card,
    Online,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Completed,
    Failed,
    Refunded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OrderStatus {
    Pending,
    Preparing,
    Ready,
    PickedUp,
    Cancelled,
}

impl OrderStatus {
    /// `pending -> preparing -> ready -> picked-up`, with `cancelled` reachable
    /// from `pending` and `preparing` only.
    pub fn can_transition_to(&self, next: OrderStatus) -> bool {
        use OrderStatus::*;
        matches!(
            (self, next),
            (Pending, Preparing)
                | (Preparing, Ready)
                | (Ready, PickedUp)
                | (Pending, Cancelled)
                | (Preparing, Cancelled)
        )
    }

    pub fn is_open(&self) -> bool {
        matches!(self, OrderStatus::Pending | OrderStatus::Preparing)
    }

    pub fn is_fulfilled(&self) -> bool {
        matches!(self, OrderStatus::Ready | OrderStatus::PickedUp)
    }
}

macro_rules! text_enum {
    ($ty:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        impl $ty {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($ty::$variant => $text,)+
                }
            }
        }

        impl FromStr for $ty {
            type Err = AppError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok($ty::$variant),)+
                    other => Err(AppError::Validation(format!(
                        concat!("Unknown ", stringify!($ty), " '{}'"),
                        other
                    ))),
                }
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

text_enum!(PaymentMethod { Cash => "cash", Card => "card", Online => "online" });
text_enum!(PaymentStatus { Pending => "pending", Completed => "completed", Failed => "failed", Refunded => "refunded" });
text_enum!(OrderStatus {
    Pending => "pending",
    Preparing => "preparing",
    Ready => "ready",
    PickedUp => "picked-up",
    Cancelled => "cancelled",
});

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: String,
    pub customer_id: String,
    pub shop_id: String,
    pub glass_size: GlassSize,
    pub quantity: i64,
    pub price_per_glass: i64,
    pub total_amount: i64,
    pub payment_method: PaymentMethod,
    pub payment_status: PaymentStatus,
    pub status: OrderStatus,
    pub ordered_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

pub struct NewOrderParams {
    pub customer_id: String,
    pub shop_id: String,
    pub glass_size: GlassSize,
    pub quantity: i64,
    pub payment_method: PaymentMethod,
}

impl Order {
    pub fn new(params: NewOrderParams) -> Result<Self, AppError> {
        if !(1..=MAX_GLASSES_PER_ORDER).contains(&params.quantity) {
            return Err(AppError::Validation(format!(
                "Quantity must be between 1 and {}",
                MAX_GLASSES_PER_ORDER
            )));
        }
        let price_per_glass = params.glass_size.price_per_glass();
        let total_amount = price_per_glass
            .checked_mul(params.quantity)
            .ok_or_else(|| AppError::Validation("Order total is out of range".into()))?;
        let now = Utc::now();
        Ok(Self {
            id: Uuid::new_v4().to_string(),
            customer_id: params.customer_id,
            shop_id: params.shop_id,
            glass_size: params.glass_size,
            quantity: params.quantity,
            price_per_glass,
            total_amount,
            payment_method: params.payment_method,
            payment_status: PaymentStatus::Pending,
            status: OrderStatus::Pending,
            ordered_at: now,
            updated_at: now,
        })
    }
}

/// Row shape of the `orders` table; enums are stored as text.
#[derive(Debug, FromRow)]
pub struct OrderRecord {
    pub id: String,
    pub customer_id: String,
    pub shop_id: String,
    pub glass_size: i64,
    pub quantity: i64,
    pub price_per_glass: i64,
    pub total_amount: i64,
    pub payment_method: String,
    pub payment_status: String,
    pub status: String,
    pub ordered_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<OrderRecord> for Order {
    type Error = AppError;

    fn try_from(r: OrderRecord) -> Result<Self, Self::Error> {
        let glass_size = u32::try_from(r.glass_size)
            .map_err(|_| AppError::InternalWithMsg(format!("Corrupt glass size on order {}", r.id)))
            .and_then(|ml| GlassSize::try_from(ml).map_err(AppError::InternalWithMsg))?;
        Ok(Order {
            glass_size,
            quantity: r.quantity,
            price_per_glass: r.price_per_glass,
            total_amount: r.total_amount,
            payment_method: r.payment_method.parse()?,
            payment_status: r.payment_status.parse()?,
            status: r.status.parse()?,
            ordered_at: r.ordered_at,
            updated_at: r.updated_at,
            id: r.id,
            customer_id: r.customer_id,
            shop_id: r.shop_id,
        })
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShopSummary {
    pub id: String,
    pub shop_name: String,
    pub mobile_number: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerSummary {
    pub id: String,
    pub name: String,
    pub email: String,
}

/// An order joined with the display fields of its shop and customer.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderDetails {
    #[serde(flatten)]
    pub order: Order,
    pub shop: ShopSummary,
    pub customer: CustomerSummary,
}

#[derive(Debug, FromRow)]
pub struct OrderDetailsRecord {
    #[sqlx(flatten)]
    pub order: OrderRecord,
    pub shop_name: String,
    pub shop_mobile_number: String,
    pub customer_name: String,
    pub customer_email: String,
}

impl TryFrom<OrderDetailsRecord> for OrderDetails {
    type Error = AppError;

    fn try_from(r: OrderDetailsRecord) -> Result<Self, Self::Error> {
        let order = Order::try_from(r.order)?;
        Ok(OrderDetails {
            shop: ShopSummary {
                id: order.shop_id.clone(),
                shop_name: r.shop_name,
                mobile_number: r.shop_mobile_number,
            },
            customer: CustomerSummary {
                id: order.customer_id.clone(),
                name: r.customer_name,
                email: r.customer_email,
            },
            order,
        })
    }
}

/// Customer-facing split of an order history.
#[derive(Debug, Default, Serialize)]
pub struct GroupedOrders {
    pub pending: Vec<OrderDetails>,
    pub completed: Vec<OrderDetails>,
}

impl GroupedOrders {
    /// Open orders go to `pending`, fulfilled ones to `completed`; cancelled orders are dropped.
    pub fn from_orders(orders: Vec<OrderDetails>) -> Self {
        let mut grouped = GroupedOrders::default();
        for details in orders {
            if details.order.status.is_open() {
                grouped.pending.push(details);
            } else if details.order.status.is_fulfilled() {
                grouped.completed.push(details);
            }
        }
        grouped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn order_with(size: GlassSize, quantity: i64) -> Order {
        Order::new(NewOrderParams {
            customer_id: "c1".into(),
            shop_id: "s1".into(),
            glass_size: size,
            quantity,
            payment_method: PaymentMethod::Cash,
        })
        .unwrap()
    }

    fn details(status: OrderStatus) -> OrderDetails {
        let mut order = order_with(GlassSize::Ml250, 1);
        order.status = status;
        OrderDetails {
            order,
            shop: ShopSummary { id: "s1".into(), shop_name: "Shop".into(), mobile_number: "9876543210".into() },
            customer: CustomerSummary { id: "c1".into(), name: "A".into(), email: "a@x.com".into() },
        }
    }

    #[test]
    fn total_is_unit_price_times_quantity() {
        let order = order_with(GlassSize::Ml250, 3);
        assert_eq!(order.price_per_glass, 35);
        assert_eq!(order.total_amount, 105);

        let order = order_with(GlassSize::Ml500, 2);
        assert_eq!(order.price_per_glass, 60);
        assert_eq!(order.total_amount, 120);
    }

    #[test]
    fn quantity_outside_bounds_is_rejected() {
        for quantity in [0, MAX_GLASSES_PER_ORDER + 1, i64::MAX] {
            let result = Order::new(NewOrderParams {
                customer_id: "c1".into(),
                shop_id: "s1".into(),
                glass_size: GlassSize::Ml500,
                quantity,
                payment_method: PaymentMethod::Card,
            });
            assert!(matches!(result, Err(AppError::Validation(_))), "quantity {} accepted", quantity);
        }
        assert_eq!(order_with(GlassSize::Ml500, MAX_GLASSES_PER_ORDER).total_amount, 6_000);
    }

    #[test]
    fn new_orders_start_pending() {
        let order = order_with(GlassSize::Ml500, 1);
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.payment_status, PaymentStatus::Pending);
    }

    #[test]
    fn glass_size_only_accepts_known_volumes() {
        assert_eq!(GlassSize::try_from(250u32), Ok(GlassSize::Ml250));
        assert_eq!(GlassSize::try_from(500u32), Ok(GlassSize::Ml500));
        assert!(GlassSize::try_from(200u32).is_err());
        assert!(serde_json::from_str::<GlassSize>("330").is_err());
        assert_eq!(serde_json::to_string(&GlassSize::Ml500).unwrap(), "500");
    }

    #[test]
    fn transition_table() {
        use OrderStatus::*;
        assert!(Pending.can_transition_to(Preparing));
        assert!(Preparing.can_transition_to(Ready));
        assert!(Ready.can_transition_to(PickedUp));
        assert!(Pending.can_transition_to(Cancelled));
        assert!(Preparing.can_transition_to(Cancelled));

        assert!(!Pending.can_transition_to(Ready));
        assert!(!Pending.can_transition_to(PickedUp));
        assert!(!Ready.can_transition_to(Cancelled));
        assert!(!PickedUp.can_transition_to(Cancelled));
        assert!(!Cancelled.can_transition_to(Pending));
        assert!(!Ready.can_transition_to(Preparing));
    }

    #[test]
    fn status_text_round_trips_through_storage_form() {
        assert_eq!(OrderStatus::PickedUp.as_str(), "picked-up");
        assert_eq!("picked-up".parse::<OrderStatus>().unwrap(), OrderStatus::PickedUp);
        assert!("processing".parse::<OrderStatus>().is_err());
        assert_eq!(serde_json::to_string(&OrderStatus::PickedUp).unwrap(), "\"picked-up\"");
    }

    #[test]
    fn grouping_drops_cancelled_orders() {
        use OrderStatus::*;
        let grouped = GroupedOrders::from_orders(vec![
            details(Pending),
            details(Preparing),
            details(Ready),
            details(PickedUp),
            details(Cancelled),
        ]);
        assert_eq!(grouped.pending.len(), 2);
        assert_eq!(grouped.completed.len(), 2);
        assert!(grouped.pending.iter().chain(grouped.completed.iter())
            .all(|d| d.order.status != Cancelled));
    }
}
