//! Storefront behaviour with no backend configured: every visitor's state
//! lives in their session.

#![allow(clippy::unwrap_used)]

use shopfront_integration_tests::{TestApp, triggers_cart_update};

#[tokio::test]
async fn listing_explains_missing_backend() {
    let app = TestApp::local().await;
    let html = app.page("/").await;
    assert!(html.contains(r#"id="containerClothing""#));
    assert!(html.contains("Error: backend not configured. Set BACKEND_URL and BACKEND_ANON_KEY."));
}

#[tokio::test]
async fn add_to_cart_updates_badge() {
    let app = TestApp::local().await;
    assert_eq!(app.badge().await, 0);

    let response = app.add_to_cart("42", "1").await;
    assert!(triggers_cart_update(&response));
    let html = response.text().await.unwrap();
    assert!(html.contains("added to cart!"));

    assert_eq!(app.badge().await, 1);
}

#[tokio::test]
async fn adding_same_product_merges_lines() {
    let app = TestApp::local().await;
    app.add_to_cart("7", "1").await;
    app.add_to_cart("7", "1").await;

    assert_eq!(app.badge().await, 2);
    let cart = app.page("/cart").await;
    assert!(cart.contains("Total Items: 1"));
}

#[tokio::test]
async fn update_and_remove_by_line_id() {
    let app = TestApp::local().await;
    app.add_to_cart("5", "1").await;

    let response = app
        .post_form("/cart/update", &[("cart_id", "1"), ("quantity", "4")])
        .await;
    assert!(triggers_cart_update(&response));
    assert_eq!(app.badge().await, 4);

    app.post_form("/cart/update", &[("cart_id", "1"), ("quantity", "abc")])
        .await;
    assert_eq!(app.badge().await, 1);

    let response = app.post_form("/cart/remove", &[("cart_id", "1")]).await;
    assert!(triggers_cart_update(&response));
    assert!(response.text().await.unwrap().contains("Your cart is empty."));
    assert_eq!(app.badge().await, 0);
}

#[tokio::test]
async fn visitors_do_not_share_carts() {
    let app = TestApp::local().await;
    app.add_to_cart("1", "3").await;

    let other = app.new_visitor();
    assert_eq!(other.badge().await, 0);
    assert_eq!(app.badge().await, 3);
}

#[tokio::test]
async fn order_needs_an_address() {
    let app = TestApp::local().await;
    app.add_to_cart("9", "1").await;

    let html = app
        .post_form("/checkout/orders", &[("payment", "upi")])
        .await
        .text()
        .await
        .unwrap();
    assert!(html.contains("Please add an address first"));
    assert!(!html.contains("Order Placed"));
    assert_eq!(app.badge().await, 1);
}

#[tokio::test]
async fn order_needs_a_selected_address() {
    let app = TestApp::local().await;
    app.save_address("Asha Rao").await;

    let html = app
        .post_form("/checkout/orders", &[("payment", "cod")])
        .await
        .text()
        .await
        .unwrap();
    assert!(html.contains("Please select an address"));
}

#[tokio::test]
async fn blank_address_field_is_rejected() {
    let app = TestApp::local().await;
    let html = app
        .post_form(
            "/checkout/addresses",
            &[
                ("name", "Asha"),
                ("street", "12 MG Road"),
                ("city", "   "),
                ("zip", "411001"),
                ("phone", "98"),
            ],
        )
        .await
        .text()
        .await
        .unwrap();
    assert!(html.contains("Please fill all fields"));

    let list = app.hx_get("/checkout").await.text().await.unwrap();
    assert!(list.contains("No saved addresses."));
}

#[tokio::test]
async fn address_round_trip() {
    let app = TestApp::local().await;

    let html = app.save_address("Asha Rao").await;
    assert!(html.contains("Address saved successfully!"));
    assert!(html.contains("Asha Rao"));

    let html = app
        .post_form("/checkout/addresses/5/remove", &[])
        .await
        .text()
        .await
        .unwrap();
    assert!(html.contains("Asha Rao"));

    let html = app
        .post_form("/checkout/addresses/0/remove", &[])
        .await
        .text()
        .await
        .unwrap();
    assert!(!html.contains("Asha Rao"));
    assert!(html.contains("No saved addresses."));
}

#[tokio::test]
async fn empty_cart_order_has_zero_total() {
    let app = TestApp::local().await;
    app.save_address("Asha Rao").await;

    let response = app
        .post_form("/checkout/orders", &[("address", "0"), ("payment", "upi")])
        .await;
    assert!(triggers_cart_update(&response));
    let html = response.text().await.unwrap();
    assert!(html.contains("Order Placed Successfully!"));
    assert!(html.contains("Total: Rs 0"));
    assert!(html.contains("Payment: UPI"));
    assert!(html.contains("Delivering to: Asha Rao"));
    assert!(html.contains(r#"data-countdown="3""#));
}

#[tokio::test]
async fn order_clears_local_cart() {
    let app = TestApp::local().await;
    app.add_to_cart("3", "2").await;
    app.save_address("Asha Rao").await;

    let html = app
        .post_form("/checkout/orders", &[("address", "0")])
        .await
        .text()
        .await
        .unwrap();
    assert!(html.contains("Payment: Credit/Debit Card"));
    assert_eq!(app.badge().await, 0);
}

#[tokio::test]
async fn checkout_page_or_fragment() {
    let app = TestApp::local().await;

    let page = app.page("/checkout").await;
    assert!(page.contains("<html"));
    assert!(page.contains(r#"id="checkoutModal""#));

    let fragment = app.hx_get("/checkout").await.text().await.unwrap();
    assert!(!fragment.contains("<html"));
    assert!(fragment.contains(r#"id="checkoutModal""#));
}

#[tokio::test]
async fn local_login_and_logout() {
    let app = TestApp::local().await;

    let html = app
        .post_form(
            "/auth/login",
            &[("email", "asha@shop.test"), ("password", "hunter22")],
        )
        .await
        .text()
        .await
        .unwrap();
    assert!(html.contains("Login successful (local storage)!"));

    let popup = app.hx_get("/auth/popup").await.text().await.unwrap();
    assert!(popup.contains("asha@shop.test"));
    assert!(!popup.contains("<html"));

    app.post_form("/auth/logout", &[]).await;
    let popup = app.hx_get("/auth/popup").await.text().await.unwrap();
    assert!(popup.contains(r#"id="loginForm""#));
}

#[tokio::test]
async fn signup_needs_backend() {
    let app = TestApp::local().await;
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
    assert!(html.contains("Signup failed: backend not configured"));
}

#[tokio::test]
async fn login_rejects_malformed_email() {
    let app = TestApp::local().await;
    let html = app
        .post_form("/auth/login", &[("email", "nope"), ("password", "x")])
        .await
        .text()
        .await
        .unwrap();
    assert!(html.contains("Login failed:"));
    assert!(html.contains(r#"role="alert""#));
}
