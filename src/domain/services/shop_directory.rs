use std::sync::Arc;
use crate::domain::{
    models::{principal::Shopkeeper, shop::Shop},
    ports::ShopkeeperRepository,
    services::geo::haversine_m,
};
use crate::error::AppError;

pub const DEFAULT_RADIUS_KM: f64 = 10.0;

pub struct ShopDirectory {
    shopkeepers: Arc<dyn ShopkeeperRepository>,
}

impl ShopDirectory {
    pub fn new(shopkeepers: Arc<dyn ShopkeeperRepository>) -> Self {
        Self { shopkeepers }
    }

    pub async fn locations(&self) -> Result<Vec<Shop>, AppError> {
        let shops: Vec<Shop> = self
            .shopkeepers
            .list_approved()
            .await?
            .into_iter()
            .map(Shop::from)
            .collect();

        if shops.is_empty() {
            return Err(AppError::NotFound("No shops found".into()));
        }
        Ok(shops)
    }

    pub async fn nearby(&self, lat: f64, lng: f64, radius_km: f64) -> Result<Vec<Shop>, AppError> {
        if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lng) {
            return Err(AppError::Validation("Latitude or longitude out of range".into()));
        }
        if !(radius_km.is_finite() && radius_km > 0.0) {
            return Err(AppError::Validation("Radius must be a positive number of kilometres".into()));
        }

        let approved = self.shopkeepers.list_approved().await?;
        Ok(within_radius(approved, lat, lng, radius_km * 1000.0))
    }

    /// Public details for any registered shop, approved or not.
    pub async fn find(&self, id: &str) -> Result<Shop, AppError> {
        self.shopkeepers
            .find_by_id(id)
            .await?
            .map(Shop::from)
            .ok_or_else(|| AppError::NotFound("No shop found with that ID".into()))
    }
}

/// Shops within `radius_m` of the point, nearest first.
fn within_radius(shopkeepers: Vec<Shopkeeper>, lat: f64, lng: f64, radius_m: f64) -> Vec<Shop> {
    let mut shops: Vec<Shop> = shopkeepers
        .into_iter()
        .filter_map(|sk| {
            let d = haversine_m(lat, lng, sk.location.latitude, sk.location.longitude);
            (d <= radius_m).then(|| {
                let mut shop = Shop::from(sk);
                shop.distance_meters = Some(d);
                shop
            })
        })
        .collect();

    shops.sort_by(|a, b| a.distance_meters.partial_cmp(&b.distance_meters).unwrap_or(std::cmp::Ordering::Equal));
    shops
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::principal::{GeoPoint, NewShopkeeperParams};

    fn shop_at(name: &str, lat: f64, lng: f64) -> Shopkeeper {
        Shopkeeper::new(NewShopkeeperParams {
            name: name.into(),
            shop_name: name.into(),
            email: format!("{}@x.com", name),
            password_hash: "hash".into(),
            mobile_number: "9876543210".into(),
            license_number: format!("LIC-{}", name),
            location: GeoPoint::new(lng, lat, String::new()).unwrap(),
        })
    }

    #[test]
    fn nearest_first_and_radius_respected() {
        let shops = vec![
            shop_at("far", 12.97, 77.70),    // ~12 km east
            shop_at("near", 12.971, 77.591), // ~150 m
            shop_at("mid", 12.99, 77.59),    // ~2.2 km north
        ];
        let found = within_radius(shops, 12.97, 77.59, 10_000.0);

        let names: Vec<&str> = found.iter().map(|s| s.shop_name.as_str()).collect();
        assert_eq!(names, vec!["near", "mid"]);
        assert!(found.iter().all(|s| s.distance_meters.unwrap() <= 10_000.0));
    }
}
