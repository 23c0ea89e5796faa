//! Cart route handlers.
//!
//! Cart mutations use HTMX for dynamic updates without full page reloads.
//! Every successful mutation answers with an `HX-Trigger: cart-updated`
//! header so the header badge re-fetches its count.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{AppendHeaders, IntoResponse, Response},
};
use serde::Deserialize;
use tracing::instrument;

use shopfront_core::{CartItem, CartItemId, Price, Product, ProductId, Quantity};

use crate::error::breadcrumb;
use crate::filters;
use crate::routes::{AlertTemplate, CART_UPDATED_EVENT};
use crate::services::CartService;
use crate::state::AppState;
use crate::storage::Storage;

/// Cart line display data for templates.
#[derive(Clone)]
pub struct CartLineView {
    pub cart_id: String,
    pub name: String,
    pub brand: String,
    pub price: String,
    pub preview: Option<String>,
    pub quantity: u32,
    pub subtotal: String,
}

/// Cart display data for templates.
#[derive(Clone)]
pub struct CartView {
    pub lines: Vec<CartLineView>,
    /// Number of cart lines, including lines whose product is unknown.
    pub total_items: usize,
    pub total: String,
}

impl CartView {
    /// Join cart lines to their products. Lines whose product is unknown
    /// are left out of the listing and the total.
    #[must_use]
    pub fn build(items: &[CartItem], products: &[Product]) -> Self {
        let mut total = Price::ZERO;
        let lines = items
            .iter()
            .filter_map(|item| {
                let product = products.iter().find(|p| p.id == item.product_id)?;
                let subtotal = product.price * item.quantity;
                total = total + subtotal;
                Some(CartLineView {
                    cart_id: item.id.map(|id| id.to_string()).unwrap_or_default(),
                    name: product.name.clone(),
                    brand: product
                        .brand
                        .clone()
                        .unwrap_or_else(|| "Brand".to_string()),
                    price: product.price.display(),
                    preview: product.preview.clone(),
                    quantity: item.quantity.get(),
                    subtotal: subtotal.display(),
                })
            })
            .collect();

        Self {
            lines,
            total_items: items.len(),
            total: total.display(),
        }
    }

    /// Whether the cart has no lines at all.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.total_items == 0
    }
}

/// Add to cart form data.
#[derive(Debug, Deserialize)]
pub struct AddToCartForm {
    pub product_id: String,
    pub name: Option<String>,
    pub quantity: Option<String>,
}

/// Update cart form data.
#[derive(Debug, Deserialize)]
pub struct UpdateCartForm {
    pub cart_id: String,
    #[serde(default)]
    pub quantity: String,
}

/// Remove from cart form data.
#[derive(Debug, Deserialize)]
pub struct RemoveFromCartForm {
    pub cart_id: String,
}

/// Cart page template.
#[derive(Template, WebTemplate)]
#[template(path = "cart/show.html")]
pub struct CartShowTemplate {
    pub cart: CartView,
}

/// Cart items fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_items.html")]
pub struct CartItemsTemplate {
    pub cart: CartView,
}

/// Cart count badge fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_count.html")]
pub struct CartCountTemplate {
    pub count: u32,
}

/// Load the cart and join it to the catalog.
async fn load_cart(state: &AppState, storage: &Storage) -> CartView {
    let items = CartService::new(storage).get_cart().await;
    let ids: Vec<ProductId> = items.iter().map(|i| i.product_id).collect();
    let products = state
        .catalog()
        .products_by_ids(&ids)
        .await
        .unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Failed to fetch cart products");
            Vec::new()
        });
    CartView::build(&items, &products)
}

fn cart_items_response(cart: CartView) -> Response {
    (
        AppendHeaders([("HX-Trigger", CART_UPDATED_EVENT)]),
        CartItemsTemplate { cart },
    )
        .into_response()
}

/// Display cart page.
#[instrument(skip(state, storage))]
pub async fn show(State(state): State<AppState>, storage: Storage) -> impl IntoResponse {
    CartShowTemplate {
        cart: load_cart(&state, &storage).await,
    }
}

/// Add item to cart (HTMX).
///
/// Returns an alert fragment; on success also an HTMX trigger to update
/// the cart count badge.
#[instrument(skip(storage))]
pub async fn add(storage: Storage, Form(form): Form<AddToCartForm>) -> Response {
    let Ok(product_id) = form.product_id.parse::<ProductId>() else {
        return AlertTemplate::error("Error adding to cart: invalid product").into_response();
    };
    let quantity = form
        .quantity
        .as_deref()
        .map_or(Quantity::ONE, Quantity::from_input);

    match CartService::new(&storage)
        .add_to_cart(product_id, quantity)
        .await
    {
        Ok(()) => {
            breadcrumb(
                "cart",
                "Added to cart",
                &[("product_id", &product_id.to_string())],
            );
            let name = form
                .name
                .filter(|n| !n.trim().is_empty())
                .unwrap_or_else(|| "Item".to_string());
            (
                AppendHeaders([("HX-Trigger", CART_UPDATED_EVENT)]),
                AlertTemplate::success(format!("{name} added to cart!")),
            )
                .into_response()
        }
        Err(e) => {
            tracing::error!(error = %e, "Add to cart error");
            AlertTemplate::error(format!("Error adding to cart: {e}")).into_response()
        }
    }
}

/// Update cart line quantity (HTMX).
///
/// Non-numeric or non-positive input is treated as one unit.
#[instrument(skip(state, storage))]
pub async fn update(
    State(state): State<AppState>,
    storage: Storage,
    Form(form): Form<UpdateCartForm>,
) -> Response {
    let quantity = Quantity::from_input(&form.quantity);
    match form.cart_id.parse::<CartItemId>() {
        Ok(cart_id) => {
            if let Err(e) = CartService::new(&storage)
                .update_cart_quantity(cart_id, quantity)
                .await
            {
                tracing::error!(error = %e, "Update cart error");
            }
        }
        Err(_) => tracing::warn!(cart_id = %form.cart_id, "Invalid cart line id"),
    }
    cart_items_response(load_cart(&state, &storage).await)
}

/// Remove cart line (HTMX).
#[instrument(skip(state, storage))]
pub async fn remove(
    State(state): State<AppState>,
    storage: Storage,
    Form(form): Form<RemoveFromCartForm>,
) -> Response {
    match form.cart_id.parse::<CartItemId>() {
        Ok(cart_id) => {
            if let Err(e) = CartService::new(&storage).remove_from_cart(cart_id).await {
                tracing::error!(error = %e, "Remove from cart error");
            }
        }
        Err(_) => tracing::warn!(cart_id = %form.cart_id, "Invalid cart line id"),
    }
    cart_items_response(load_cart(&state, &storage).await)
}

/// Get cart count badge (HTMX).
#[instrument(skip(storage))]
pub async fn count(storage: Storage) -> impl IntoResponse {
    CartCountTemplate {
        count: CartService::new(&storage).cart_count().await,
    }
}
