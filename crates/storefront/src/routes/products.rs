//! Product detail route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
};
use serde::Deserialize;
use tracing::instrument;

use shopfront_core::{Product, ProductId};

use crate::error::{AppError, Result};
use crate::filters;
use crate::state::AppState;

/// Product detail display data for templates.
#[derive(Clone)]
pub struct ProductDetailView {
    pub id: String,
    pub name: String,
    pub brand: String,
    pub price: String,
    pub description: String,
    /// Gallery images; the catalog carries a single preview per product.
    pub images: Vec<String>,
}

impl From<Product> for ProductDetailView {
    fn from(product: Product) -> Self {
        Self {
            id: product.id.to_string(),
            name: product.name,
            brand: product.brand.unwrap_or_default(),
            price: product.price.display(),
            description: product.description.unwrap_or_default(),
            images: product.preview.into_iter().collect(),
        }
    }
}

/// Product detail page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/show.html")]
pub struct ProductShowTemplate {
    pub product: ProductDetailView,
}

/// `?id=` query of the legacy detail link.
#[derive(Debug, Deserialize)]
pub struct ContentDetailsQuery {
    pub id: Option<String>,
}

fn parse_id(raw: &str) -> Result<ProductId> {
    raw.parse()
        .map_err(|_| AppError::NotFound(format!("product {raw}")))
}

async fn render(state: &AppState, id: ProductId) -> Result<ProductShowTemplate> {
    let product = state.catalog().product(id).await?;
    Ok(ProductShowTemplate {
        product: product.into(),
    })
}

/// Display product detail page.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse> {
    render(&state, parse_id(&id)?).await
}

/// Display product detail page from `/contentDetails?id=`.
#[instrument(skip(state))]
pub async fn content_details(
    State(state): State<AppState>,
    Query(query): Query<ContentDetailsQuery>,
) -> Result<impl IntoResponse> {
    let raw = query
        .id
        .ok_or_else(|| AppError::NotFound("product id missing".to_string()))?;
    render(&state, parse_id(&raw)?).await
}
