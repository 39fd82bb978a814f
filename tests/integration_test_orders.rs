mod common;

use axum::http::StatusCode;
use common::{shopkeeper_signup, TestApp};
use serde_json::{json, Value};

struct Market {
    app: TestApp,
    shop_id: String,
    shop_token: String,
    customer_id: String,
    customer_token: String,
}

async fn market() -> Market {
    let app = TestApp::new().await;
    let admin = app.admin_token().await;
    let (shop_id, shop_token) = app.approved_shop(&admin, "juicy", 12.97, 77.59).await;
    let (customer_id, customer_token) = app.customer("buyer@x.com").await;
    Market { app, shop_id, shop_token, customer_id, customer_token }
}

impl Market {
    async fn order(&self, glass_size: u32, quantity: i64) -> Value {
        let (status, res) = self
            .app
            .post(
                "/api/customers/order-juice",
                Some(&self.customer_token),
                json!({ "shopId": self.shop_id, "glassSize": glass_size, "quantity": quantity, "paymentMethod": "cash" }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "order failed: {}", res);
        res["data"]["order"].clone()
    }

    async fn set_status(&self, order_id: &str, status: &str) -> (StatusCode, Value) {
        self.app
            .patch(
                &format!("/api/shopkeepers/orders/{}/status", order_id),
                Some(&self.shop_token),
                json!({ "status": status }),
            )
            .await
    }
}

fn ids(list: &Value) -> Vec<String> {
    list.as_array()
        .unwrap()
        .iter()
        .map(|o| o["id"].as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn test_place_order_prices_from_glass_size() {
    let m = market().await;

    let order = m.order(250, 3).await;
    assert_eq!(order["glassSize"], 250);
    assert_eq!(order["pricePerGlass"], 35);
    assert_eq!(order["totalAmount"], 105);
    assert_eq!(order["status"], "pending");
    assert_eq!(order["paymentStatus"], "pending");
    assert_eq!(order["customerId"], m.customer_id);

    let order = m.order(500, 2).await;
    assert_eq!(order["totalAmount"], 120);

    let (_, me) = m.app.get("/api/customers/me", Some(&m.customer_token)).await;
    assert_eq!(me["data"]["customer"]["orders"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_order_history_is_shown_in_every_customer_view() {
    let m = market().await;
    let first = m.order(250, 1).await;
    let second = m.order(500, 1).await;
    let expected = json!([first["id"], second["id"]]);

    let (status, res) = m
        .app
        .post("/api/customers/login", None, json!({ "email": "buyer@x.com", "password": common::PASSWORD }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(res["data"]["customer"]["orders"], expected);

    let admin = m.app.login("admin", common::ADMIN_EMAIL, common::PASSWORD).await;
    m.app.customer("idle@x.com").await;

    let (status, res) = m.app.get("/api/admin/customers", Some(&admin)).await;
    assert_eq!(status, StatusCode::OK);
    let customers = res["data"]["customers"].as_array().unwrap();
    let buyer = customers.iter().find(|c| c["_id"] == m.customer_id.as_str()).unwrap();
    assert_eq!(buyer["orders"], expected);
    let idle = customers.iter().find(|c| c["email"] == "idle@x.com").unwrap();
    assert_eq!(idle["orders"], json!([]));
}

#[tokio::test]
async fn test_order_validation() {
    let m = market().await;
    let place = |body: Value| {
        let app = &m.app;
        let token = m.customer_token.clone();
        async move { app.post("/api/customers/order-juice", Some(&token), body).await }
    };

    let (status, _) = place(json!({ "shopId": m.shop_id, "glassSize": 330, "quantity": 1, "paymentMethod": "cash" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, res) = place(json!({ "shopId": m.shop_id, "glassSize": 250, "quantity": 0, "paymentMethod": "cash" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(res["message"], "Minimum order quantity is 1");

    let (status, _) = place(json!({ "shopId": m.shop_id, "glassSize": 250, "quantity": 1, "paymentMethod": "barter" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, res) = place(json!({ "shopId": m.shop_id, "glassSize": 500, "quantity": 9_000_000_000_000_000_000_i64, "paymentMethod": "cash" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(res["message"], "Quantity must be between 1 and 100");

    let (status, _) = place(json!({ "shopId": m.shop_id, "glassSize": 250, "quantity": 101, "paymentMethod": "cash" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = place(json!({ "shopId": m.shop_id, "glassSize": 250 })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = place(json!({ "shopId": "missing", "glassSize": 250, "quantity": 1, "paymentMethod": "card" })).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let pending_shop = m.app.register_shop(shopkeeper_signup("notyet", 12.97, 77.59)).await;
    let (status, _) = place(json!({ "shopId": pending_shop, "glassSize": 250, "quantity": 1, "paymentMethod": "card" })).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM orders").fetch_one(&m.app.pool).await.unwrap();
    assert_eq!(count, 0);
}

#[tokio::test]
async fn test_my_orders_groups_and_drops_cancelled() {
    let m = market().await;
    let open = m.order(250, 1).await;
    let done = m.order(250, 1).await;
    let cancelled = m.order(500, 1).await;

    let done_id = done["id"].as_str().unwrap();
    for next in ["preparing", "ready"] {
        let (status, _) = m.set_status(done_id, next).await;
        assert_eq!(status, StatusCode::OK);
    }
    let (status, _) = m.set_status(cancelled["id"].as_str().unwrap(), "cancelled").await;
    assert_eq!(status, StatusCode::OK);

    let (status, res) = m.app.get("/api/customers/my-orders", Some(&m.customer_token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(res["results"], 2);

    let grouped = &res["data"]["orders"];
    assert_eq!(ids(&grouped["pending"]), vec![open["id"].as_str().unwrap().to_string()]);
    assert_eq!(ids(&grouped["completed"]), vec![done_id.to_string()]);

    let entry = &grouped["pending"][0];
    assert_eq!(entry["shop"]["shopName"], "Cane Corner juicy");
    assert_eq!(entry["shop"]["mobileNumber"], "9876543210");
    assert_eq!(entry["customer"]["email"], "buyer@x.com");
}

#[tokio::test]
async fn test_status_transitions() {
    let m = market().await;
    let order = m.order(250, 2).await;
    let id = order["id"].as_str().unwrap();

    let (status, res) = m.set_status(id, "ready").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(res["message"], "Cannot move order from pending to ready");

    let (status, _) = m.set_status(id, "teleported").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    for next in ["preparing", "ready", "picked-up"] {
        let (status, res) = m.set_status(id, next).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(res["data"]["order"]["status"], next);
    }

    let (status, res) = m.set_status(id, "cancelled").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(res["message"], "Cannot move order from picked-up to cancelled");
}

#[tokio::test]
async fn test_other_shop_cannot_touch_order() {
    let m = market().await;
    let order = m.order(250, 1).await;

    let (status, res) = m.app.post(
        "/api/admin/login",
        None,
        json!({ "email": common::ADMIN_EMAIL, "password": common::PASSWORD }),
    ).await;
    assert_eq!(status, StatusCode::OK);
    let admin = res["token"].as_str().unwrap().to_string();
    let (_, rival_token) = m.app.approved_shop(&admin, "rival", 12.98, 77.60).await;

    let (status, _) = m
        .app
        .patch(
            &format!("/api/shopkeepers/orders/{}/status", order["id"].as_str().unwrap()),
            Some(&rival_token),
            json!({ "status": "preparing" }),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, res) = m.app.get("/api/shopkeepers/orders", Some(&rival_token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(res["results"], 0);
}

#[tokio::test]
async fn test_shop_order_listing_filters_by_status() {
    let m = market().await;
    let first = m.order(250, 1).await;
    m.order(500, 1).await;
    m.set_status(first["id"].as_str().unwrap(), "preparing").await;

    let (status, res) = m.app.get("/api/shopkeepers/orders", Some(&m.shop_token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(res["results"], 2);

    let (status, res) = m.app.get("/api/shopkeepers/orders?status=preparing", Some(&m.shop_token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ids(&res["data"]["orders"]), vec![first["id"].as_str().unwrap().to_string()]);

    let (status, _) = m.app.get("/api/shopkeepers/orders?status=lost", Some(&m.shop_token)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_customer_cancels_only_own_pending_order() {
    let m = market().await;
    let order = m.order(250, 1).await;
    let id = order["id"].as_str().unwrap();
    let cancel_uri = format!("/api/customers/orders/{}/cancel", id);

    let (_, other_token) = m.app.customer("other@x.com").await;
    let (status, _) = m.app.patch(&cancel_uri, Some(&other_token), json!({})).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, res) = m.app.patch(&cancel_uri, Some(&m.customer_token), json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(res["data"]["order"]["status"], "cancelled");

    let preparing = m.order(250, 1).await;
    let preparing_id = preparing["id"].as_str().unwrap();
    m.set_status(preparing_id, "preparing").await;
    let (status, _) = m
        .app
        .patch(&format!("/api/customers/orders/{}/cancel", preparing_id), Some(&m.customer_token), json!({}))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
