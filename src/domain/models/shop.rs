use serde::Serialize;
use chrono::{DateTime, Utc};
use crate::domain::models::principal::{GeoPoint, Shopkeeper};

#[derive(Debug, Clone, Serialize)]
pub struct ShopContact {
    pub email: String,
    pub mobile: String,
}

/// Public view of a shopkeeper: no credentials, license or role.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Shop {
    pub id: String,
    pub shop_name: String,
    pub profile_pic: String,
    pub contact: ShopContact,
    pub location: GeoPoint,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance_meters: Option<f64>,
}

impl From<Shopkeeper> for Shop {
    fn from(sk: Shopkeeper) -> Self {
        Self {
            id: sk.id,
            shop_name: sk.shop_name,
            profile_pic: sk.profile_pic,
            contact: ShopContact {
                email: sk.email,
                mobile: sk.mobile_number,
            },
            location: sk.location,
            created_at: sk.created_at,
            distance_meters: None,
        }
    }
}
