//! Home page route handler: the clothing listing.

use askama::Template;
use askama_web::WebTemplate;
use axum::{extract::State, response::IntoResponse};
use tracing::instrument;

use shopfront_core::Product;

use crate::filters;
use crate::services::CatalogError;
use crate::state::AppState;

/// Product card display data for templates.
#[derive(Clone)]
pub struct ProductCardView {
    pub id: String,
    pub name: String,
    pub brand: String,
    pub price: String,
    pub preview: Option<String>,
}

impl From<&Product> for ProductCardView {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id.to_string(),
            name: product.name.clone(),
            brand: product.brand.clone().unwrap_or_default(),
            price: product.price.display(),
            preview: product.preview.clone(),
        }
    }
}

/// Home page template.
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub products: Vec<ProductCardView>,
    /// Shown instead of the grid when set.
    pub message: Option<String>,
    pub is_error: bool,
}

impl HomeTemplate {
    fn from_result(result: Result<Vec<Product>, CatalogError>) -> Self {
        match result {
            Ok(products) if products.is_empty() => Self {
                products: Vec::new(),
                message: Some("No products available".to_string()),
                is_error: false,
            },
            Ok(products) => Self {
                products: products.iter().map(ProductCardView::from).collect(),
                message: None,
                is_error: false,
            },
            Err(CatalogError::NotConfigured) => Self {
                products: Vec::new(),
                message: Some(
                    "Error: backend not configured. Set BACKEND_URL and BACKEND_ANON_KEY."
                        .to_string(),
                ),
                is_error: true,
            },
            Err(e) => Self {
                products: Vec::new(),
                message: Some(format!("Error loading products: {e}")),
                is_error: true,
            },
        }
    }
}

/// Display the clothing listing.
#[instrument(skip(state))]
pub async fn home(State(state): State<AppState>) -> impl IntoResponse {
    let result = state.catalog().clothing().await;
    match &result {
        Ok(products) => tracing::debug!(count = products.len(), "Rendered clothing items"),
        Err(e) => tracing::error!(error = %e, "Products fetch error"),
    }
    HomeTemplate::from_result(result)
}
