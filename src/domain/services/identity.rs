use std::sync::Arc;
use crate::domain::{
    models::principal::Principal,
    ports::{AdminRepository, CustomerRepository, IdentityLookup, ShopkeeperRepository},
};
use crate::error::AppError;
use async_trait::async_trait;

/// Looks an id up in all three identity stores at once.
pub struct RepositoryIdentityLookup {
    admins: Arc<dyn AdminRepository>,
    customers: Arc<dyn CustomerRepository>,
    shopkeepers: Arc<dyn ShopkeeperRepository>,
}

impl RepositoryIdentityLookup {
    pub fn new(
        admins: Arc<dyn AdminRepository>,
        customers: Arc<dyn CustomerRepository>,
        shopkeepers: Arc<dyn ShopkeeperRepository>,
    ) -> Self {
        Self { admins, customers, shopkeepers }
    }
}

#[async_trait]
impl IdentityLookup for RepositoryIdentityLookup {
    async fn find_principal(&self, id: &str) -> Result<Option<Principal>, AppError> {
        let (admin, customer, shopkeeper) = tokio::try_join!(
            self.admins.find_by_id(id),
            self.customers.find_by_id(id),
            self.shopkeepers.find_by_id(id),
        )?;

        // Ids are UUIDs so at most one store should answer; the order only matters if that breaks.
        Ok(admin
            .map(Principal::Admin)
            .or(customer.map(Principal::Customer))
            .or(shopkeeper.map(Principal::Shopkeeper)))
    }
}
