//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                       - Clothing listing
//! GET  /health                 - Health check
//!
//! # Products
//! GET  /products/{id}          - Product detail
//! GET  /contentDetails?id=     - Product detail (legacy link form)
//!
//! # Cart (HTMX fragments)
//! GET  /cart                   - Cart page
//! POST /cart/add               - Add to cart (returns alert, triggers cart-updated)
//! POST /cart/update            - Update quantity (returns cart_items fragment)
//! POST /cart/remove            - Remove line (returns cart_items fragment)
//! GET  /cart/count             - Cart count badge (fragment)
//!
//! # Checkout (modal fragments)
//! GET  /checkout                         - Address list, payment, summary
//! GET  /checkout/addresses/new           - Add address form
//! POST /checkout/addresses               - Save address
//! POST /checkout/addresses/{index}/remove - Remove address
//! POST /checkout/orders                  - Place order
//!
//! # Auth
//! GET  /auth/login             - Login page
//! GET  /auth/popup             - Login/signup popup fragment
//! POST /auth/login             - Login action
//! POST /auth/signup            - Signup action
//! POST /auth/logout            - Logout action
//! ```

pub mod auth;
pub mod cart;
pub mod checkout;
pub mod home;
pub mod products;

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Router,
    http::HeaderMap,
    routing::{get, post},
};

use crate::state::AppState;

/// HTMX event fired after every cart mutation; the badge listens for it.
pub const CART_UPDATED_EVENT: &str = "cart-updated";

/// Alert fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/alert.html")]
pub struct AlertTemplate {
    pub kind: &'static str,
    pub message: String,
}

impl AlertTemplate {
    #[must_use]
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: "success",
            message: message.into(),
        }
    }

    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: "error",
            message: message.into(),
        }
    }
}

/// Whether the request was issued by htmx (fragment wanted).
#[must_use]
pub fn is_htmx(headers: &HeaderMap) -> bool {
    headers.contains_key("hx-request")
}

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new().route("/{id}", get(products::show))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/add", post(cart::add))
        .route("/update", post(cart::update))
        .route("/remove", post(cart::remove))
        .route("/count", get(cart::count))
}

/// Create the checkout routes router.
pub fn checkout_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(checkout::show))
        .route("/addresses", post(checkout::create_address))
        .route("/addresses/new", get(checkout::new_address))
        .route("/addresses/{index}/remove", post(checkout::remove_address))
        .route("/orders", post(checkout::place_order))
}

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/popup", get(auth::popup))
        .route("/signup", post(auth::signup))
        .route("/logout", post(auth::logout))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home::home))
        .nest("/products", product_routes())
        .route("/contentDetails", get(products::content_details))
        .nest("/cart", cart_routes())
        .nest("/checkout", checkout_routes())
        .nest("/auth", auth_routes())
}
