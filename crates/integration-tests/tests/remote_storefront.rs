//! Storefront behaviour against a configured (mock) backend.

#![allow(clippy::unwrap_used)]

use serde_json::{Value, json};
use shopfront_core::{Order, OrderStatus, ProductId};
use shopfront_integration_tests::{MockBackend, TestApp, triggers_cart_update};

fn catalog() -> Vec<Value> {
    vec![
        json!({
            "id": 1,
            "name": "Linen Shirt",
            "brand": "Zara",
            "price": 1299,
            "preview": "https://img.test/1.jpg",
            "description": "Breathable summer linen.",
            "isAccessory": false
        }),
        json!({
            "id": 2,
            "name": "Steel Watch",
            "brand": "Titan",
            "price": 4999,
            "preview": "https://img.test/2.jpg",
            "isAccessory": true
        }),
        json!({
            "id": 3,
            "name": "Chinos",
            "price": "899",
            "isAccessory": "false"
        }),
    ]
}

async fn setup() -> (MockBackend, TestApp) {
    let backend = MockBackend::with_products(catalog()).await;
    let app = TestApp::remote(&backend).await;
    (backend, app)
}

#[tokio::test]
async fn listing_drops_accessories() {
    let (_backend, app) = setup().await;
    let html = app.page("/").await;

    assert!(html.contains("Linen Shirt"));
    assert!(html.contains("Chinos"));
    assert!(!html.contains("Steel Watch"));
    assert!(html.contains(r#"href="/products/1""#));
}

#[tokio::test]
async fn product_detail_by_path_and_query() {
    let (_backend, app) = setup().await;

    let html = app.page("/products/1").await;
    assert!(html.contains(r#"id="containerProduct""#));
    assert!(html.contains("Breathable summer linen."));

    let response = app.get("/contentDetails?id=3").await;
    assert_eq!(response.status(), 200);
    assert!(response.text().await.unwrap().contains("Chinos"));

    assert_eq!(app.get("/products/999").await.status(), 404);
    assert_eq!(app.get("/contentDetails").await.status(), 404);
}

#[tokio::test]
async fn remote_add_inserts_a_row_each_time() {
    let (backend, app) = setup().await;
    app.add_to_cart("1", "1").await;
    app.add_to_cart("1", "1").await;

    assert_eq!(backend.rows("cart").len(), 2);
    assert_eq!(app.badge().await, 2);
}

#[tokio::test]
async fn cart_page_joins_products() {
    let (_backend, app) = setup().await;
    app.add_to_cart("1", "2").await;
    app.add_to_cart("3", "1").await;
    app.add_to_cart("77", "1").await;

    let html = app.page("/cart").await;
    assert!(html.contains("Linen Shirt"));
    assert!(html.contains("Rs 2598"));
    assert!(html.contains("Total Items: 3"));
    assert!(html.contains("Total Amount: Rs 3497"));
}

#[tokio::test]
async fn failed_add_shows_alert_without_trigger() {
    let (backend, app) = setup().await;
    backend.fail_next("POST", "cart", 500, "boom");

    let response = app.add_to_cart("1", "1").await;
    assert!(!triggers_cart_update(&response));
    let html = response.text().await.unwrap();
    assert!(html.contains("Error adding to cart:"));
    assert!(html.contains("boom"));

    assert!(backend.rows("cart").is_empty());
    assert_eq!(app.badge().await, 0);
}

#[tokio::test]
async fn update_and_remove_use_row_ids() {
    let (backend, app) = setup().await;
    app.add_to_cart("1", "1").await;
    let id = backend.rows("cart")[0]["id"].to_string();

    app.post_form("/cart/update", &[("cart_id", id.as_str()), ("quantity", "3")])
        .await;
    assert_eq!(backend.rows("cart")[0]["quantity"], json!(3));
    assert_eq!(app.badge().await, 3);

    app.post_form("/cart/remove", &[("cart_id", id.as_str())])
        .await;
    assert!(backend.rows("cart").is_empty());
}

#[tokio::test]
async fn badge_falls_back_to_local_rows() {
    let (backend, app) = setup().await;
    app.add_to_cart("1", "2").await;
    assert_eq!(app.badge().await, 2);

    backend.fail_next("GET", "cart", 503, "unavailable");
    assert_eq!(app.badge().await, 0);
    assert_eq!(app.badge().await, 2);
}

#[tokio::test]
async fn address_is_mirrored_to_backend() {
    let (backend, app) = setup().await;
    let html = app.save_address("Asha Rao").await;
    assert!(html.contains("Address saved successfully!"));

    let rows = backend.rows("addresses");
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["city"], json!("Pune"));
}

#[tokio::test]
async fn address_backend_failure_is_kept_locally() {
    let (backend, app) = setup().await;
    backend.fail_next("POST", "addresses", 500, "down");

    let html = app.save_address("Asha Rao").await;
    assert!(html.contains("Address saved successfully!"));
    assert!(html.contains("Asha Rao"));
    assert!(backend.rows("addresses").is_empty());
}

#[tokio::test]
async fn remote_order_is_pending_and_clears_cart() {
    let (backend, app) = setup().await;
    app.add_to_cart("1", "2").await;
    app.save_address("Asha Rao").await;

    let response = app
        .post_form("/checkout/orders", &[("address", "0"), ("payment", "netbanking")])
        .await;
    assert!(triggers_cart_update(&response));
    let html = response.text().await.unwrap();
    assert!(html.contains("Order Placed Successfully!"));
    assert!(html.contains("Total: Rs 2598"));
    assert!(html.contains("Payment: Net Banking"));

    let rows = backend.rows("orders");
    assert_eq!(rows.len(), 1);
    assert!(rows[0]["items"].is_string());
    assert!(rows[0]["address"].is_string());

    let order: Order = serde_json::from_value(rows[0].clone()).unwrap();
    assert_eq!(order.status, OrderStatus::Pending);
    assert_eq!(order.items[0].product_id, ProductId::new(1));
    assert_eq!(order.address_name(), "Asha Rao");
    assert!(html.contains(&format!("Order ID: <strong>{}</strong>", rows[0]["id"])));

    assert!(backend.rows("cart").is_empty());
    assert_eq!(app.badge().await, 0);
}

#[tokio::test]
async fn rejected_order_shows_backend_error() {
    let (backend, app) = setup().await;
    app.add_to_cart("1", "1").await;
    app.save_address("Asha Rao").await;
    backend.fail_next("POST", "orders", 400, "bad order");

    let html = app
        .post_form("/checkout/orders", &[("address", "0")])
        .await
        .text()
        .await
        .unwrap();
    assert!(html.contains("Error placing order: Failed to place order (400): bad order"));
    assert!(backend.rows("orders").is_empty());
    assert_eq!(backend.rows("cart").len(), 1);
}

#[tokio::test]
async fn empty_order_response_is_synthesized() {
    let (backend, app) = setup().await;
    app.save_address("Asha Rao").await;
    backend.set_empty_inserts(true);

    let html = app
        .post_form("/checkout/orders", &[("address", "0"), ("payment", "cod")])
        .await
        .text()
        .await
        .unwrap();
    assert!(html.contains("Order Placed Successfully!"));
    assert!(html.contains("Payment: Cash on Delivery"));
    assert_eq!(backend.rows("orders").len(), 1);
}

#[tokio::test]
async fn login_against_auth_service() {
    let (backend, app) = setup().await;
    backend.add_account("asha@shop.test", "hunter22");

    let html = app
        .post_form(
            "/auth/login",
            &[("email", "asha@shop.test"), ("password", "hunter22")],
        )
        .await
        .text()
        .await
        .unwrap();
    assert!(html.contains("Welcome back, asha@shop.test!"));

    let other = app.new_visitor();
    let html = other
        .post_form(
            "/auth/login",
            &[("email", "asha@shop.test"), ("password", "wrong")],
        )
        .await
        .text()
        .await
        .unwrap();
    assert!(html.contains("Login stored locally (backend unavailable). Welcome, asha@shop.test!"));
}

#[tokio::test]
async fn signup_saves_profile_without_password() {
    let (backend, app) = setup().await;

    let html = app
        .post_form(
            "/auth/signup",
            &[
                ("name", "Asha"),
                ("email", "asha@shop.test"),
                ("password", "hunter22"),
            ],
        )
        .await
        .text()
        .await
        .unwrap();
    assert!(html.contains("Signup successful! Welcome, asha@shop.test"));

    let users = backend.rows("users");
    assert_eq!(users.len(), 1);
    assert_eq!(users[0]["email"], json!("asha@shop.test"));
    assert!(users[0].get("password").is_none());
    assert!(!users[0].to_string().contains("hunter22"));

    let popup = app.hx_get("/auth/popup").await.text().await.unwrap();
    assert!(popup.contains("asha@shop.test"));
}

#[tokio::test]
async fn signup_conflict_refetches_profile() {
    let (backend, app) = setup().await;
    backend.add_account("asha@shop.test", "hunter22");
    backend.seed(
        "users",
        vec![json!({ "id": 50, "email": "asha@shop.test", "metadata": null })],
    );
    // Existence check misses, so the insert hits the unique constraint.
    backend.fail_next("GET", "users", 500, "flaky");

    let html = app
        .post_form(
            "/auth/signup",
            &[("email", "asha@shop.test"), ("password", "hunter22")],
        )
        .await
        .text()
        .await
        .unwrap();
    assert!(html.contains("Signup successful! User saved to database. Welcome, asha@shop.test!"));
    assert_eq!(backend.rows("users").len(), 1);
}

#[tokio::test]
async fn signup_profile_rejection_is_reported() {
    let (backend, app) = setup().await;
    backend.fail_next("POST", "auth/signup", 503, "maintenance");
    backend.fail_next("POST", "users", 500, "insert failed");

    let html = app
        .post_form(
            "/auth/signup",
            &[("email", "asha@shop.test"), ("password", "hunter22")],
        )
        .await
        .text()
        .await
        .unwrap();
    assert!(html.contains("Signup failed: Failed to save user (500): insert failed"));
}

#[tokio::test]
async fn signup_tolerates_empty_profile_rejection() {
    let (backend, app) = setup().await;
    backend.fail_next("POST", "auth/signup", 503, "maintenance");
    backend.fail_next("POST", "users", 400, "");

    let html = app
        .post_form(
            "/auth/signup",
            &[("email", "asha@shop.test"), ("password", "hunter22")],
        )
        .await
        .text()
        .await
        .unwrap();
    assert!(html.contains("Signup successful! User saved to database. Welcome, asha@shop.test!"));

    let popup = app.hx_get("/auth/popup").await.text().await.unwrap();
    assert!(popup.contains("Logged in as <strong>asha@shop.test</strong>"));
}

#[tokio::test]
async fn signup_tolerates_unreadable_profile_row() {
    let (backend, app) = setup().await;
    backend.fail_next("POST", "auth/signup", 503, "maintenance");
    backend.fail_next("POST", "users", 201, "not json");

    let html = app
        .post_form(
            "/auth/signup",
            &[("email", "asha@shop.test"), ("password", "hunter22")],
        )
        .await
        .text()
        .await
        .unwrap();
    assert!(html.contains("Signup successful! User saved to database. Welcome, asha@shop.test!"));

    let popup = app.hx_get("/auth/popup").await.text().await.unwrap();
    assert!(popup.contains("asha@shop.test"));
}

#[tokio::test]
async fn unreachable_backend_order_shows_alert() {
    let app = TestApp::unreachable_backend().await;
    app.save_address("Asha Rao").await;

    let response = app
        .post_form("/checkout/orders", &[("address", "0"), ("payment", "upi")])
        .await;
    assert!(response.status().is_success());
    assert!(!triggers_cart_update(&response));

    let html = response.text().await.unwrap();
    assert!(html.contains("Error placing order: Failed to place order:"));
    assert!(html.contains(r#"name="address" value="0""#));
}
