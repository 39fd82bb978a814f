use crate::domain::models::{
    order::{Order, OrderDetails, OrderStatus},
    principal::{Admin, Customer, GeoPoint, Principal, Shopkeeper},
};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

#[async_trait]
pub trait AdminRepository: Send + Sync {
    async fn create(&self, admin: &Admin) -> Result<Admin, AppError>;
    async fn count(&self) -> Result<i64, AppError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<Admin>, AppError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<Admin>, AppError>;
    /// The oldest admin record; the marketplace has a single administrator.
    async fn find_primary(&self) -> Result<Option<Admin>, AppError>;
    async fn update(&self, admin: &Admin) -> Result<Admin, AppError>;
    async fn update_password(&self, id: &str, password_hash: &str, changed_at: DateTime<Utc>) -> Result<(), AppError>;
}

#[async_trait]
pub trait CustomerRepository: Send + Sync {
    async fn create(&self, customer: &Customer) -> Result<Customer, AppError>;
    /// Loads the customer together with their order history.
    async fn find_by_id(&self, id: &str) -> Result<Option<Customer>, AppError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<Customer>, AppError>;
    async fn list(&self) -> Result<Vec<Customer>, AppError>;
    async fn update(&self, customer: &Customer) -> Result<Customer, AppError>;
    async fn update_password(&self, id: &str, password_hash: &str, changed_at: DateTime<Utc>) -> Result<(), AppError>;
}

#[async_trait]
pub trait ShopkeeperRepository: Send + Sync {
    async fn create(&self, shopkeeper: &Shopkeeper) -> Result<Shopkeeper, AppError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<Shopkeeper>, AppError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<Shopkeeper>, AppError>;
    async fn list_pending(&self) -> Result<Vec<Shopkeeper>, AppError>;
    async fn list_approved(&self) -> Result<Vec<Shopkeeper>, AppError>;
    async fn update(&self, shopkeeper: &Shopkeeper) -> Result<Shopkeeper, AppError>;
    async fn update_location(&self, id: &str, location: &GeoPoint) -> Result<Shopkeeper, AppError>;
    async fn update_password(&self, id: &str, password_hash: &str, changed_at: DateTime<Utc>) -> Result<(), AppError>;
    /// Flips `active` to true only if it is currently false and stamps the first approval. Returns whether a row changed.
    async fn activate_if_pending(&self, id: &str) -> Result<bool, AppError>;
    async fn deactivate(&self, id: &str) -> Result<(), AppError>;
    /// Deletes the record only while it is still awaiting approval. Returns whether a row was removed.
    async fn delete_if_pending(&self, id: &str) -> Result<bool, AppError>;
}

#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Inserts the order and appends it to the customer's history atomically.
    async fn create_for_customer(&self, order: &Order) -> Result<Order, AppError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<Order>, AppError>;
    async fn find_details(&self, id: &str) -> Result<Option<OrderDetails>, AppError>;
    async fn list_by_customer(&self, customer_id: &str) -> Result<Vec<OrderDetails>, AppError>;
    async fn list_by_shop(&self, shop_id: &str, status: Option<OrderStatus>) -> Result<Vec<OrderDetails>, AppError>;
    /// Compare-and-swap on `status`. Returns whether the row was updated.
    async fn update_status(&self, id: &str, from: OrderStatus, to: OrderStatus) -> Result<bool, AppError>;
}

/// Resolves a principal id against every identity store.
#[async_trait]
pub trait IdentityLookup: Send + Sync {
    async fn find_principal(&self, id: &str) -> Result<Option<Principal>, AppError>;
}

#[async_trait]
pub trait EmailService: Send + Sync {
    async fn send(&self, recipient: &str, subject: &str, html_body: &str) -> Result<(), AppError>;
}
