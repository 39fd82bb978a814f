use serde::{Deserialize, Serialize, Serializer};
use uuid::Uuid;
use chrono::{DateTime, Utc};
use sqlx::FromRow;

pub const DEFAULT_PROFILE_PIC: &str = "default.jpg";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Shopkeeper,
    Customer,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Shopkeeper => "shopkeeper",
            Role::Customer => "customer",
        }
    }
}

#[derive(Debug, FromRow, Clone)]
pub struct Admin {
    pub id: String,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub mobile_number: Option<String>,
    pub profile_pic: String,
    pub password_changed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Admin {
    pub fn new(name: String, email: String, password_hash: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            name,
            email,
            password_hash,
            mobile_number: None,
            profile_pic: DEFAULT_PROFILE_PIC.to_string(),
            password_changed_at: None,
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, FromRow, Clone)]
pub struct Customer {
    pub id: String,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub mobile_number: Option<String>,
    pub profile_pic: String,
    pub password_changed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Order history, oldest first. Filled by the repository from `customer_orders`.
    #[sqlx(skip)]
    pub orders: Vec<String>,
}

impl Customer {
    pub fn new(name: String, email: String, password_hash: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            name,
            email,
            password_hash,
            mobile_number: None,
            profile_pic: DEFAULT_PROFILE_PIC.to_string(),
            password_changed_at: None,
            created_at: now,
            updated_at: now,
            orders: Vec::new(),
        }
    }
}

/// Point coordinates plus the free-text address shown to customers.
#[derive(Debug, FromRow, Clone, PartialEq)]
pub struct GeoPoint {
    pub longitude: f64,
    pub latitude: f64,
    pub address: String,
}

impl GeoPoint {
    pub fn new(longitude: f64, latitude: f64, address: String) -> Option<Self> {
        let in_range = longitude.is_finite()
            && latitude.is_finite()
            && (-180.0..=180.0).contains(&longitude)
            && (-90.0..=90.0).contains(&latitude);
        in_range.then_some(Self { longitude, latitude, address })
    }
}

impl Serialize for GeoPoint {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        #[derive(Serialize)]
        struct Wire<'a> {
            #[serde(rename = "type")]
            kind: &'static str,
            coordinates: [f64; 2],
            address: &'a str,
        }

        Wire {
            kind: "Point",
            coordinates: [self.longitude, self.latitude],
            address: &self.address,
        }
        .serialize(serializer)
    }
}

#[derive(Debug, FromRow, Clone)]
pub struct Shopkeeper {
    pub id: String,
    pub name: String,
    pub shop_name: String,
    pub email: String,
    pub password_hash: String,
    pub mobile_number: String,
    pub license_number: String,
    #[sqlx(flatten)]
    pub location: GeoPoint,
    pub active: bool,
    /// Set on first approval and kept through later deactivation.
    pub approved_at: Option<DateTime<Utc>>,
    pub profile_pic: String,
    pub password_changed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

pub struct NewShopkeeperParams {
    pub name: String,
    pub shop_name: String,
    pub email: String,
    pub password_hash: String,
    pub mobile_number: String,
    pub license_number: String,
    pub location: GeoPoint,
}

impl Shopkeeper {
    /// Self-registered shopkeepers start inactive until an administrator approves them.
    pub fn new(params: NewShopkeeperParams) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            name: params.name,
            shop_name: params.shop_name,
            email: params.email,
            password_hash: params.password_hash,
            mobile_number: params.mobile_number,
            license_number: params.license_number,
            location: params.location,
            active: false,
            approved_at: None,
            profile_pic: DEFAULT_PROFILE_PIC.to_string(),
            password_changed_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Awaiting a first decision from an administrator.
    pub fn is_pending(&self) -> bool {
        !self.active && self.approved_at.is_none()
    }
}

// Outbound representations. The password hash never leaves the process.

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AdminView<'a> {
    #[serde(rename = "_id")]
    id: &'a str,
    name: &'a str,
    email: &'a str,
    role: Role,
    mobile_number: &'a Option<String>,
    profile_pic: &'a str,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Serialize for Admin {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        AdminView {
            id: &self.id,
            name: &self.name,
            email: &self.email,
            role: Role::Admin,
            mobile_number: &self.mobile_number,
            profile_pic: &self.profile_pic,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
        .serialize(serializer)
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CustomerView<'a> {
    #[serde(rename = "_id")]
    id: &'a str,
    name: &'a str,
    email: &'a str,
    role: Role,
    mobile_number: &'a Option<String>,
    profile_pic: &'a str,
    orders: &'a [String],
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Serialize for Customer {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        CustomerView {
            id: &self.id,
            name: &self.name,
            email: &self.email,
            role: Role::Customer,
            mobile_number: &self.mobile_number,
            profile_pic: &self.profile_pic,
            orders: &self.orders,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
        .serialize(serializer)
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ShopkeeperView<'a> {
    #[serde(rename = "_id")]
    id: &'a str,
    name: &'a str,
    shop_name: &'a str,
    email: &'a str,
    role: Role,
    mobile_number: &'a str,
    license_number: &'a str,
    location: &'a GeoPoint,
    active: bool,
    profile_pic: &'a str,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Serialize for Shopkeeper {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        ShopkeeperView {
            id: &self.id,
            name: &self.name,
            shop_name: &self.shop_name,
            email: &self.email,
            role: Role::Shopkeeper,
            mobile_number: &self.mobile_number,
            license_number: &self.license_number,
            location: &self.location,
            active: self.active,
            profile_pic: &self.profile_pic,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
        .serialize(serializer)
    }
}

/// Any authenticated actor, tagged by the store it was resolved from.
#[derive(Debug, Clone)]
pub enum Principal {
    Admin(Admin),
    Shopkeeper(Shopkeeper),
    Customer(Customer),
}

impl Principal {
    pub fn id(&self) -> &str {
        match self {
            Principal::Admin(a) => &a.id,
            Principal::Shopkeeper(s) => &s.id,
            Principal::Customer(c) => &c.id,
        }
    }

    pub fn role(&self) -> Role {
        match self {
            Principal::Admin(_) => Role::Admin,
            Principal::Shopkeeper(_) => Role::Shopkeeper,
            Principal::Customer(_) => Role::Customer,
        }
    }

    pub fn password_hash(&self) -> &str {
        match self {
            Principal::Admin(a) => &a.password_hash,
            Principal::Shopkeeper(s) => &s.password_hash,
            Principal::Customer(c) => &c.password_hash,
        }
    }

    pub fn password_changed_at(&self) -> Option<DateTime<Utc>> {
        match self {
            Principal::Admin(a) => a.password_changed_at,
            Principal::Shopkeeper(s) => s.password_changed_at,
            Principal::Customer(c) => c.password_changed_at,
        }
    }

    /// True when the password was changed after a token issued at `issued_at` (unix seconds).
    pub fn changed_password_after(&self, issued_at: i64) -> bool {
        self.password_changed_at()
            .is_some_and(|changed| changed.timestamp() > issued_at)
    }
}

impl Serialize for Principal {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Principal::Admin(a) => a.serialize(serializer),
            Principal::Shopkeeper(s) => s.serialize(serializer),
            Principal::Customer(c) => c.serialize(serializer),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn password_hash_is_never_serialized() {
        let customer = Customer::new("A".into(), "a@x.com".into(), "$argon2id$secret".into());
        let json = serde_json::to_value(Principal::Customer(customer)).unwrap();
        assert_eq!(json["role"], "customer");
        assert!(json.get("password").is_none());
        assert!(json.get("passwordHash").is_none());
        assert!(!json.to_string().contains("$argon2id$secret"));
    }

    #[test]
    fn shopkeeper_location_serializes_as_point() {
        let sk = Shopkeeper::new(NewShopkeeperParams {
            name: "Ravi".into(),
            shop_name: "Cane Corner".into(),
            email: "ravi@x.com".into(),
            password_hash: "hash".into(),
            mobile_number: "9876543210".into(),
            license_number: "LIC-1".into(),
            location: GeoPoint::new(77.59, 12.97, "MG Road".into()).unwrap(),
        });
        assert!(!sk.active);
        let json = serde_json::to_value(&sk).unwrap();
        assert_eq!(json["location"]["type"], "Point");
        assert_eq!(json["location"]["coordinates"][0], 77.59);
        assert_eq!(json["location"]["coordinates"][1], 12.97);
        assert_eq!(json["shopName"], "Cane Corner");
    }

    #[test]
    fn geo_point_rejects_out_of_range() {
        assert!(GeoPoint::new(181.0, 0.0, String::new()).is_none());
        assert!(GeoPoint::new(0.0, -91.0, String::new()).is_none());
        assert!(GeoPoint::new(f64::NAN, 0.0, String::new()).is_none());
        assert!(GeoPoint::new(-180.0, 90.0, String::new()).is_some());
    }

    #[test]
    fn password_change_invalidates_older_tokens() {
        let mut admin = Admin::new("Root".into(), "root@x.com".into(), "hash".into());
        let issued_at = Utc::now().timestamp() - 60;
        let principal = Principal::Admin(admin.clone());
        assert!(!principal.changed_password_after(issued_at));

        admin.password_changed_at = Some(Utc::now());
        let principal = Principal::Admin(admin.clone());
        assert!(principal.changed_password_after(issued_at));

        admin.password_changed_at = Some(Utc::now() - Duration::hours(1));
        let principal = Principal::Admin(admin);
        assert!(!principal.changed_password_after(issued_at));
    }
}
