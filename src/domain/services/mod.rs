pub mod account_service;
pub mod auth_service;
pub mod geo;
pub mod identity;
pub mod notification_service;
pub mod order_service;
pub mod registration_service;
pub mod shop_directory;
pub mod simulator;
