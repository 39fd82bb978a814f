use std::sync::Arc;
use crate::domain::{
    models::principal::{GeoPoint, NewShopkeeperParams, Shopkeeper},
    ports::{AdminRepository, ShopkeeperRepository},
    services::{
        auth_service::AuthService,
        notification_service::{NotificationService, DEFAULT_REJECTION_REASON},
    },
};
use crate::error::AppError;
use tracing::{info, warn};

/// A validated shopkeeper signup.
pub struct ShopkeeperApplication {
    pub name: String,
    pub shop_name: String,
    pub email: String,
    pub password: String,
    pub mobile_number: String,
    pub license_number: String,
    pub location: GeoPoint,
}

/// Submit, approve and reject shopkeeper registrations.
///
/// A submitted shopkeeper is stored with `active = false` and cannot log in. Approval flips the
/// flag; rejection deletes the record so the email, shop name and license can be reused.
/// Both transitions are conditional writes, so racing admins cannot approve a deleted
/// application or delete an approved shop.
pub struct RegistrationService {
    shopkeepers: Arc<dyn ShopkeeperRepository>,
    admins: Arc<dyn AdminRepository>,
    auth: Arc<AuthService>,
    notifier: Arc<NotificationService>,
    fallback_admin_email: Option<String>,
}

impl RegistrationService {
    pub fn new(
        shopkeepers: Arc<dyn ShopkeeperRepository>,
        admins: Arc<dyn AdminRepository>,
        auth: Arc<AuthService>,
        notifier: Arc<NotificationService>,
        fallback_admin_email: Option<String>,
    ) -> Self {
        Self { shopkeepers, admins, auth, notifier, fallback_admin_email }
    }

    pub async fn submit(&self, application: ShopkeeperApplication) -> Result<Shopkeeper, AppError> {
        let password_hash = self.auth.hash_password(&application.password)?;

        let shopkeeper = Shopkeeper::new(NewShopkeeperParams {
            name: application.name.trim().to_string(),
            shop_name: application.shop_name.trim().to_string(),
            email: application.email.trim().to_lowercase(),
            password_hash,
            mobile_number: application.mobile_number.trim().to_string(),
            license_number: application.license_number.trim().to_string(),
            location: application.location,
        });
        let created = self.shopkeepers.create(&shopkeeper).await?;
        info!(shopkeeper_id = %created.id, shop_name = %created.shop_name, "Shopkeeper registration submitted");

        match self.admin_recipient().await? {
            Some(admin_email) => {
                if let Err(e) = self.notifier.approval_request(&admin_email, &created).await {
                    warn!(shopkeeper_id = %created.id, error = %e, "Approval request email failed");
                }
            }
            None => warn!(shopkeeper_id = %created.id, "No administrator to notify about registration"),
        }

        Ok(created)
    }

    pub async fn approve(&self, id: &str) -> Result<Shopkeeper, AppError> {
        let mut shopkeeper = self.find(id).await?;
        if shopkeeper.active {
            info!(shopkeeper_id = %id, "Shopkeeper already approved, nothing to do");
            return Ok(shopkeeper);
        }

        if !self.shopkeepers.activate_if_pending(id).await? {
            // Lost a race: either another approval won (return it as-is) or it was rejected.
            return self.find(id).await;
        }
        shopkeeper.active = true;
        info!(shopkeeper_id = %id, shop_name = %shopkeeper.shop_name, "Shopkeeper approved");

        if let Err(e) = self.notifier.approved(&shopkeeper).await {
            warn!(shopkeeper_id = %id, error = %e, "Approval email failed");
        }
        Ok(shopkeeper)
    }

    pub async fn reject(&self, id: &str, reason: Option<&str>) -> Result<(), AppError> {
        let shopkeeper = self.find(id).await?;
        if !shopkeeper.is_pending() {
            return Err(AppError::Conflict("Shopkeeper is already approved and cannot be rejected".into()));
        }

        if !self.shopkeepers.delete_if_pending(id).await? {
            return match self.shopkeepers.find_by_id(id).await? {
                Some(_) => Err(AppError::Conflict("Shopkeeper is already approved and cannot be rejected".into())),
                None => Err(not_found()),
            };
        }
        info!(shopkeeper_id = %id, shop_name = %shopkeeper.shop_name, license = %shopkeeper.license_number, "Shopkeeper registration rejected and removed");

        let reason = reason
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .unwrap_or(DEFAULT_REJECTION_REASON);
        if let Err(e) = self.notifier.rejected(&shopkeeper, reason).await {
            warn!(shopkeeper_id = %id, error = %e, "Rejection email failed");
        }
        Ok(())
    }

    pub async fn find(&self, id: &str) -> Result<Shopkeeper, AppError> {
        self.shopkeepers.find_by_id(id).await?.ok_or_else(not_found)
    }

    pub async fn list_pending(&self) -> Result<Vec<Shopkeeper>, AppError> {
        self.shopkeepers.list_pending().await
    }

    pub async fn list_approved(&self) -> Result<Vec<Shopkeeper>, AppError> {
        self.shopkeepers.list_approved().await
    }

    async fn admin_recipient(&self) -> Result<Option<String>, AppError> {
        Ok(self
            .admins
            .find_primary()
            .await?
            .map(|admin| admin.email)
            .or_else(|| self.fallback_admin_email.clone()))
    }
}

fn not_found() -> AppError {
    AppError::NotFound("No shopkeeper found with that ID".into())
}
