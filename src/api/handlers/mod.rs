pub mod admin;
pub mod auth;
pub mod customer;
pub mod health;
pub mod machine;
pub mod session;
pub mod shop;
pub mod shopkeeper;
