pub mod auth;
pub mod machine;
pub mod order;
pub mod principal;
pub mod shop;
