use std::sync::Arc;
use crate::domain::ports::{
    AdminRepository, CustomerRepository, EmailService, IdentityLookup, OrderRepository,
    ShopkeeperRepository,
};
use crate::domain::services::{
    account_service::AccountService,
    auth_service::AuthService,
    identity::RepositoryIdentityLookup,
    notification_service::{MailLinks, NotificationService},
    order_service::OrderService,
    registration_service::RegistrationService,
    shop_directory::ShopDirectory,
};
use crate::config::Config;
use tera::Tera;

/// One store per backend, picked by the database URL.
pub struct Repositories {
    pub admins: Arc<dyn AdminRepository>,
    pub customers: Arc<dyn CustomerRepository>,
    pub shopkeepers: Arc<dyn ShopkeeperRepository>,
    pub orders: Arc<dyn OrderRepository>,
}

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub identity: Arc<dyn IdentityLookup>,
    pub auth_service: Arc<AuthService>,
    pub accounts: Arc<AccountService>,
    pub registrations: Arc<RegistrationService>,
    pub orders: Arc<OrderService>,
    pub shops: Arc<ShopDirectory>,
}

impl AppState {
    pub fn assemble(config: Config, repos: Repositories, email_service: Arc<dyn EmailService>, templates: Arc<Tera>) -> Self {
        let auth_service = Arc::new(AuthService::new(&config));

        let identity = Arc::new(RepositoryIdentityLookup::new(
            repos.admins.clone(),
            repos.customers.clone(),
            repos.shopkeepers.clone(),
        ));

        let notifier = Arc::new(NotificationService::new(
            email_service,
            templates,
            MailLinks::from(&config),
        ));

        let accounts = Arc::new(AccountService::new(
            repos.admins.clone(),
            repos.customers.clone(),
            repos.shopkeepers.clone(),
            auth_service.clone(),
        ));

        let registrations = Arc::new(RegistrationService::new(
            repos.shopkeepers.clone(),
            repos.admins.clone(),
            auth_service.clone(),
            notifier,
            config.admin_email.clone(),
        ));

        let orders = Arc::new(OrderService::new(repos.orders.clone(), repos.shopkeepers.clone()));
        let shops = Arc::new(ShopDirectory::new(repos.shopkeepers.clone()));

        Self {
            config,
            identity,
            auth_service,
            accounts,
            registrations,
            orders,
            shops,
        }
    }
}
