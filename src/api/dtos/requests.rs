use std::sync::LazyLock;
use crate::domain::{
    models::{
        machine::MachineState,
        order::{GlassSize, OrderStatus, PaymentMethod},
        principal::GeoPoint,
    },
    services::{
        account_service::{NewAccount, ProfileChanges},
        order_service::PlaceOrder,
        registration_service::ShopkeeperApplication,
    },
};
use crate::error::AppError;
use regex::Regex;
use serde::Deserialize;
use serde_json::Value;
use validator::Validate;

/// Ten digits with an optional `+CC` country code, e.g. `+91 9876543210`.
pub static MOBILE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\+\d{1,3}[- ]?)?\d{10}$").expect("Invalid regex"));

const PASSWORD_ROUTE_HINT: &str = "This route is not for password updates. Please use /update-password.";

#[derive(Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    #[validate(required(message = "Please tell us your name"), length(min = 1, message = "Please tell us your name"))]
    pub name: Option<String>,
    #[validate(required(message = "Please provide your email"), email(message = "Please provide a valid email"))]
    pub email: Option<String>,
    #[validate(
        required(message = "Please provide a password"),
        length(min = 1, message = "Please provide a password"),
        must_match(other = "password_confirm", message = "Passwords are not the same!")
    )]
    pub password: Option<String>,
    #[validate(required(message = "Please confirm your password"))]
    pub password_confirm: Option<String>,
}

impl SignupRequest {
    pub fn into_account(self) -> Result<NewAccount, AppError> {
        self.validate()?;
        Ok(NewAccount {
            name: self.name.unwrap_or_default(),
            email: self.email.unwrap_or_default(),
            password: self.password.unwrap_or_default(),
        })
    }
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

impl LoginRequest {
    pub fn credentials(&self) -> Result<(&str, &str), AppError> {
        match (self.email.as_deref(), self.password.as_deref()) {
            (Some(email), Some(password)) if !email.trim().is_empty() && !password.is_empty() => Ok((email, password)),
            _ => Err(AppError::Validation("Please provide email and password!".into())),
        }
    }
}

#[derive(Deserialize)]
pub struct LocationInput {
    pub coordinates: Option<Vec<f64>>,
    pub address: Option<String>,
}

impl LocationInput {
    fn into_point(self) -> Result<GeoPoint, AppError> {
        parse_point(self.coordinates.as_deref(), self.address)
    }
}

#[derive(Deserialize)]
pub struct AddressInput {
    pub location: Option<LocationInput>,
}

#[derive(Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ShopkeeperSignupRequest {
    #[validate(required(message = "Please tell us your name"), length(min = 1, message = "Please tell us your name"))]
    pub name: Option<String>,
    #[validate(required(message = "Please provide your shop name"), length(min = 1, message = "Please provide your shop name"))]
    pub shop_name: Option<String>,
    #[validate(required(message = "Please provide your email"), email(message = "Please provide a valid email"))]
    pub email: Option<String>,
    #[validate(
        required(message = "Please provide a password"),
        length(min = 1, message = "Please provide a password"),
        must_match(other = "password_confirm", message = "Passwords are not the same!")
    )]
    pub password: Option<String>,
    #[validate(required(message = "Please confirm your password"))]
    pub password_confirm: Option<String>,
    #[validate(
        required(message = "Please provide your mobile number"),
        regex(path = "MOBILE_RE", message = "Please provide a valid mobile number")
    )]
    pub mobile_number: Option<String>,
    pub license_number: Option<String>,
    pub address: Option<AddressInput>,
}

impl ShopkeeperSignupRequest {
    /// License and coordinates are checked before the remaining fields.
    pub fn into_application(self) -> Result<ShopkeeperApplication, AppError> {
        let license_number = self
            .license_number
            .as_deref()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_string)
            .ok_or_else(|| AppError::Validation("License number is required for registration".into()))?;

        let location = self
            .address
            .as_ref()
            .and_then(|a| a.location.as_ref())
            .filter(|l| l.coordinates.is_some())
            .ok_or_else(|| AppError::Validation("Please provide location coordinates".into()))?;
        let location = parse_point(location.coordinates.as_deref(), location.address.clone())?;

        self.validate()?;

        Ok(ShopkeeperApplication {
            name: self.name.unwrap_or_default(),
            shop_name: self.shop_name.unwrap_or_default(),
            email: self.email.unwrap_or_default(),
            password: self.password.unwrap_or_default(),
            mobile_number: self.mobile_number.unwrap_or_default(),
            license_number,
            location,
        })
    }
}

/// `[longitude, latitude]` in GeoJSON order.
fn parse_point(coordinates: Option<&[f64]>, address: Option<String>) -> Result<GeoPoint, AppError> {
    let invalid = || AppError::Validation("Please provide valid coordinates [longitude, latitude]".into());
    match coordinates {
        Some([lng, lat]) => GeoPoint::new(*lng, *lat, address.unwrap_or_default()).ok_or_else(invalid),
        _ => Err(invalid()),
    }
}

#[derive(Deserialize)]
pub struct UpdateLocationRequest {
    #[serde(flatten)]
    pub location: LocationInput,
}

impl UpdateLocationRequest {
    pub fn into_point(self) -> Result<GeoPoint, AppError> {
        self.location.into_point()
    }
}

#[derive(Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateMeRequest {
    #[validate(length(min = 1, message = "Name cannot be empty"))]
    pub name: Option<String>,
    #[validate(email(message = "Please provide a valid email"))]
    pub email: Option<String>,
    #[validate(regex(path = "MOBILE_RE", message = "Please provide a valid mobile number"))]
    pub mobile_number: Option<String>,
    pub profile_pic: Option<String>,
    pub password: Option<Value>,
    pub password_confirm: Option<Value>,
}

impl UpdateMeRequest {
    pub fn into_changes(self) -> Result<ProfileChanges, AppError> {
        if self.password.is_some() || self.password_confirm.is_some() {
            return Err(AppError::Validation(PASSWORD_ROUTE_HINT.into()));
        }
        self.validate()?;
        Ok(ProfileChanges {
            name: self.name,
            email: self.email,
            mobile_number: self.mobile_number,
            profile_pic: self.profile_pic,
        })
    }
}

/// Body of `PUT /auth/update-profile`: only name and email are editable there.
#[derive(Deserialize, Validate)]
pub struct UpdateProfileRequest {
    #[validate(length(min = 1, message = "Name cannot be empty"))]
    pub name: Option<String>,
    #[validate(email(message = "Please provide a valid email"))]
    pub email: Option<String>,
}

impl UpdateProfileRequest {
    pub fn into_changes(self) -> Result<ProfileChanges, AppError> {
        self.validate()?;
        Ok(ProfileChanges {
            name: self.name,
            email: self.email,
            ..ProfileChanges::default()
        })
    }
}

#[derive(Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePasswordRequest {
    #[validate(required(message = "Please provide your current password"))]
    pub current_password: Option<String>,
    #[validate(
        required(message = "Please provide a password"),
        length(min = 1, message = "Please provide a password"),
        must_match(other = "password_confirm", message = "Passwords are not the same!")
    )]
    pub password: Option<String>,
    #[validate(required(message = "Please confirm your password"))]
    pub password_confirm: Option<String>,
}

impl UpdatePasswordRequest {
    /// `(current, new)`
    pub fn into_passwords(self) -> Result<(String, String), AppError> {
        self.validate()?;
        Ok((self.current_password.unwrap_or_default(), self.password.unwrap_or_default()))
    }
}

#[derive(Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct OrderJuiceRequest {
    #[validate(required(message = "Please choose a shop"), length(min = 1, message = "Please choose a shop"))]
    pub shop_id: Option<String>,
    #[validate(required(message = "Please choose a glass size"))]
    pub glass_size: Option<u32>,
    #[validate(required(message = "Please choose a quantity"), range(min = 1, message = "Minimum order quantity is 1"))]
    pub quantity: Option<i64>,
    #[validate(required(message = "Payment method is required"))]
    pub payment_method: Option<String>,
}

impl OrderJuiceRequest {
    pub fn into_order(self) -> Result<PlaceOrder, AppError> {
        self.validate()?;
        let glass_size = GlassSize::try_from(self.glass_size.unwrap_or_default()).map_err(AppError::Validation)?;
        let payment_method: PaymentMethod = self
            .payment_method
            .unwrap_or_default()
            .parse()
            .map_err(|_| AppError::Validation("Payment method is either: cash, card or online".into()))?;

        Ok(PlaceOrder {
            shop_id: self.shop_id.unwrap_or_default(),
            glass_size,
            quantity: self.quantity.unwrap_or_default(),
            payment_method,
        })
    }
}

#[derive(Deserialize)]
pub struct UpdateOrderStatusRequest {
    pub status: Option<String>,
}

impl UpdateOrderStatusRequest {
    pub fn status(&self) -> Result<OrderStatus, AppError> {
        self.status
            .as_deref()
            .ok_or_else(|| AppError::Validation("Please provide the new status".into()))?
            .parse()
    }
}

#[derive(Deserialize)]
pub struct ShopOrdersQuery {
    pub status: Option<String>,
}

impl ShopOrdersQuery {
    pub fn status(&self) -> Result<Option<OrderStatus>, AppError> {
        self.status.as_deref().map(str::parse).transpose()
    }
}

#[derive(Deserialize, Default)]
pub struct RejectRequest {
    #[serde(rename = "rejectionReason")]
    pub rejection_reason: Option<String>,
}

/// Query parameters arrive as text so a missing or malformed value maps to one message.
#[derive(Deserialize)]
pub struct NearbyQuery {
    pub lat: Option<String>,
    pub lng: Option<String>,
    pub radius: Option<String>,
}

impl NearbyQuery {
    /// `(lat, lng, radius_km)`
    pub fn parse(&self, default_radius_km: f64) -> Result<(f64, f64, f64), AppError> {
        let number = |v: &Option<String>| v.as_deref().and_then(|s| s.trim().parse::<f64>().ok()).filter(|n| n.is_finite());
        let (Some(lat), Some(lng)) = (number(&self.lat), number(&self.lng)) else {
            return Err(AppError::Validation("Please provide latitude and longitude".into()));
        };
        let radius = match &self.radius {
            None => default_radius_km,
            Some(_) => number(&self.radius)
                .ok_or_else(|| AppError::Validation("Radius must be a number of kilometres".into()))?,
        };
        Ok((lat, lng, radius))
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulateRequest {
    pub state: MachineState,
    pub elapsed_hours: f64,
    pub glasses: Option<u32>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn shopkeeper_body() -> Value {
        json!({
            "name": "Ravi",
            "shopName": "Cane Corner",
            "email": "ravi@x.com",
            "password": "p1",
            "passwordConfirm": "p1",
            "mobileNumber": "+91 9876543210",
            "licenseNumber": "LIC-1",
            "address": { "location": { "coordinates": [77.59, 12.97], "address": "MG Road" } }
        })
    }

    fn application(body: Value) -> Result<ShopkeeperApplication, AppError> {
        serde_json::from_value::<ShopkeeperSignupRequest>(body).unwrap().into_application()
    }

    fn message(err: AppError) -> String {
        match err {
            AppError::Validation(msg) => msg,
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn mobile_pattern() {
        assert!(MOBILE_RE.is_match("9876543210"));
        assert!(MOBILE_RE.is_match("+919876543210"));
        assert!(MOBILE_RE.is_match("+91-9876543210"));
        assert!(!MOBILE_RE.is_match("98765"));
        assert!(!MOBILE_RE.is_match("phone"));
    }

    #[test]
    fn complete_shopkeeper_signup_is_accepted() {
        let app = application(shopkeeper_body()).unwrap();
        assert_eq!(app.location.longitude, 77.59);
        assert_eq!(app.location.latitude, 12.97);
        assert_eq!(app.license_number, "LIC-1");
    }

    #[test]
    fn missing_license_is_reported_first() {
        let mut body = shopkeeper_body();
        body.as_object_mut().unwrap().remove("licenseNumber");
        body.as_object_mut().unwrap().remove("address");
        assert_eq!(message(application(body).err().unwrap()), "License number is required for registration");
    }

    #[test]
    fn missing_coordinates_are_rejected() {
        let mut body = shopkeeper_body();
        body["address"] = json!({ "location": { "address": "MG Road" } });
        assert_eq!(message(application(body).err().unwrap()), "Please provide location coordinates");
    }

    #[test]
    fn out_of_range_coordinates_are_rejected() {
        let mut body = shopkeeper_body();
        body["address"]["location"]["coordinates"] = json!([200.0, 12.97]);
        assert!(message(application(body).err().unwrap()).contains("valid coordinates"));
    }

    #[test]
    fn mismatched_passwords_are_rejected() {
        let req: SignupRequest = serde_json::from_value(json!({
            "name": "A", "email": "a@x.com", "password": "p1", "passwordConfirm": "p2"
        })).unwrap();
        assert_eq!(message(req.into_account().err().unwrap()), "Passwords are not the same!");
    }

    #[test]
    fn update_me_refuses_password_fields() {
        let req: UpdateMeRequest = serde_json::from_value(json!({ "name": "B", "password": "x" })).unwrap();
        assert_eq!(message(req.into_changes().err().unwrap()), PASSWORD_ROUTE_HINT);
    }

    #[test]
    fn order_request_rejects_unknown_glass_size() {
        let req: OrderJuiceRequest = serde_json::from_value(json!({
            "shopId": "s1", "glassSize": 330, "quantity": 1, "paymentMethod": "cash"
        })).unwrap();
        assert!(req.into_order().is_err());
    }

    #[test]
    fn nearby_requires_both_coordinates() {
        let q = NearbyQuery { lat: Some("12.9".into()), lng: None, radius: None };
        assert_eq!(message(q.parse(10.0).unwrap_err()), "Please provide latitude and longitude");

        let q = NearbyQuery { lat: Some("12.9".into()), lng: Some("77.5".into()), radius: None };
        assert_eq!(q.parse(10.0).unwrap(), (12.9, 77.5, 10.0));
    }
}
