pub mod sqlite_admin_repo;
pub mod sqlite_customer_repo;
pub mod sqlite_shopkeeper_repo;
pub mod sqlite_order_repo;

pub mod postgres_admin_repo;
pub mod postgres_customer_repo;
pub mod postgres_shopkeeper_repo;
pub mod postgres_order_repo;
