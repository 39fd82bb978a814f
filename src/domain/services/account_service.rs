use std::sync::Arc;
use crate::domain::{
    models::principal::{Admin, Customer, GeoPoint, Principal, Role, Shopkeeper},
    ports::{AdminRepository, CustomerRepository, ShopkeeperRepository},
    services::auth_service::AuthService,
};
use crate::error::AppError;
use chrono::Utc;
use tracing::info;

pub struct NewAccount {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// Self-service profile fields. `None` leaves the stored value alone.
#[derive(Default)]
pub struct ProfileChanges {
    pub name: Option<String>,
    pub email: Option<String>,
    pub mobile_number: Option<String>,
    pub profile_pic: Option<String>,
}

pub struct AccountService {
    admins: Arc<dyn AdminRepository>,
    customers: Arc<dyn CustomerRepository>,
    shopkeepers: Arc<dyn ShopkeeperRepository>,
    auth: Arc<AuthService>,
}

impl AccountService {
    pub fn new(
        admins: Arc<dyn AdminRepository>,
        customers: Arc<dyn CustomerRepository>,
        shopkeepers: Arc<dyn ShopkeeperRepository>,
        auth: Arc<AuthService>,
    ) -> Self {
        Self { admins, customers, shopkeepers, auth }
    }

    pub async fn signup_customer(&self, account: NewAccount) -> Result<Customer, AppError> {
        let hash = self.auth.hash_password(&account.password)?;
        let customer = Customer::new(account.name.trim().to_string(), normalize_email(&account.email), hash);
        let created = self.customers.create(&customer).await?;
        info!(customer_id = %created.id, "Customer signed up");
        Ok(created)
    }

    /// Only the very first administrator can sign up; later calls are refused.
    pub async fn signup_admin(&self, account: NewAccount) -> Result<Admin, AppError> {
        if self.admins.count().await? > 0 {
            return Err(AppError::Validation("Admin already exists".into()));
        }
        let hash = self.auth.hash_password(&account.password)?;
        let admin = Admin::new(account.name.trim().to_string(), normalize_email(&account.email), hash);
        let created = self.admins.create(&admin).await?;
        info!(admin_id = %created.id, "Administrator created");
        Ok(created)
    }

    /// Inactive shopkeepers are indistinguishable from unknown ones here.
    pub async fn login(&self, role: Role, email: &str, password: &str) -> Result<Principal, AppError> {
        let email = normalize_email(email);
        let principal = match role {
            Role::Admin => self.admins.find_by_email(&email).await?.map(Principal::Admin),
            Role::Customer => self.customers.find_by_email(&email).await?.map(Principal::Customer),
            Role::Shopkeeper => self
                .shopkeepers
                .find_by_email(&email)
                .await?
                .filter(|s| s.active)
                .map(Principal::Shopkeeper),
        };

        match principal {
            Some(p) if self.auth.verify_password(password, p.password_hash()) => {
                info!(user_id = %p.id(), role = %p.role().as_str(), "Login succeeded");
                Ok(p)
            }
            _ => Err(AppError::Unauthorized("Incorrect email or password".into())),
        }
    }

    pub async fn update_profile(&self, principal: &Principal, changes: ProfileChanges) -> Result<Principal, AppError> {
        let email = changes.email.as_deref().map(normalize_email);
        let name = changes.name.map(|n| n.trim().to_string()).filter(|n| !n.is_empty());
        let now = Utc::now();

        let updated = match principal.clone() {
            Principal::Admin(mut a) => {
                apply(&mut a.name, name);
                apply(&mut a.email, email);
                if changes.mobile_number.is_some() {
                    a.mobile_number = changes.mobile_number;
                }
                apply(&mut a.profile_pic, changes.profile_pic);
                a.updated_at = now;
                Principal::Admin(self.admins.update(&a).await?)
            }
            Principal::Customer(mut c) => {
                apply(&mut c.name, name);
                apply(&mut c.email, email);
                if changes.mobile_number.is_some() {
                    c.mobile_number = changes.mobile_number;
                }
                apply(&mut c.profile_pic, changes.profile_pic);
                c.updated_at = now;
                Principal::Customer(self.customers.update(&c).await?)
            }
            Principal::Shopkeeper(mut s) => {
                apply(&mut s.name, name);
                apply(&mut s.email, email);
                apply(&mut s.mobile_number, changes.mobile_number);
                apply(&mut s.profile_pic, changes.profile_pic);
                s.updated_at = now;
                Principal::Shopkeeper(self.shopkeepers.update(&s).await?)
            }
        };

        info!(user_id = %updated.id(), "Profile updated");
        Ok(updated)
    }

    /// Checks the current password, stores the new hash and stamps `password_changed_at`,
    /// which invalidates every token issued before this second.
    pub async fn change_password(&self, principal: &Principal, current: &str, new_password: &str) -> Result<(), AppError> {
        if !self.auth.verify_password(current, principal.password_hash()) {
            return Err(AppError::Unauthorized("Your current password is wrong".into()));
        }

        let hash = self.auth.hash_password(new_password)?;
        let changed_at = Utc::now();
        match principal {
            Principal::Admin(a) => self.admins.update_password(&a.id, &hash, changed_at).await?,
            Principal::Customer(c) => self.customers.update_password(&c.id, &hash, changed_at).await?,
            Principal::Shopkeeper(s) => self.shopkeepers.update_password(&s.id, &hash, changed_at).await?,
        }
        info!(user_id = %principal.id(), "Password changed");
        Ok(())
    }

    pub async fn update_location(&self, shopkeeper_id: &str, location: GeoPoint) -> Result<Shopkeeper, AppError> {
        let updated = self.shopkeepers.update_location(shopkeeper_id, &location).await?;
        info!(shopkeeper_id = %shopkeeper_id, lng = location.longitude, lat = location.latitude, "Shop location updated");
        Ok(updated)
    }

    pub async fn deactivate_shopkeeper(&self, shopkeeper_id: &str) -> Result<(), AppError> {
        self.shopkeepers.deactivate(shopkeeper_id).await?;
        info!(shopkeeper_id = %shopkeeper_id, "Shopkeeper deactivated");
        Ok(())
    }

    pub async fn list_customers(&self) -> Result<Vec<Customer>, AppError> {
        self.customers.list().await
    }
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn apply(field: &mut String, value: Option<String>) {
    if let Some(v) = value {
        *field = v;
    }
}
