//! Product catalog reads.
//!
//! Products are read-only for the storefront, so the list and single-product
//! responses are cached in memory (5-minute TTL). Lookups by id list for the
//! cart page go straight to the backend.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use shopfront_core::{Product, ProductId};
use thiserror::Error;
use tracing::{debug, instrument};

use crate::backend::{Backend, BackendError, CacheKey, CacheValue, Filter};
use crate::storage::Resource;

const CACHE_CAPACITY: u64 = 1000;
const CACHE_TTL: Duration = Duration::from_secs(300);

/// Errors from catalog reads.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// No backend to read products from.
    #[error("backend not configured")]
    NotConfigured,

    /// No product with the requested id.
    #[error("product not found: {0}")]
    NotFound(ProductId),

    /// The backend read failed.
    #[error(transparent)]
    Backend(#[from] BackendError),
}

/// Cached product catalog.
#[derive(Clone)]
pub struct Catalog {
    inner: Arc<CatalogInner>,
}

struct CatalogInner {
    backend: Backend,
    cache: Cache<CacheKey, CacheValue>,
}

impl Catalog {
    /// Create a catalog over `backend`.
    #[must_use]
    pub fn new(backend: Backend) -> Self {
        let cache = Cache::builder()
            .max_capacity(CACHE_CAPACITY)
            .time_to_live(CACHE_TTL)
            .build();

        Self {
            inner: Arc::new(CatalogInner { backend, cache }),
        }
    }

    /// All products.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::NotConfigured` without a backend, or the
    /// backend error when the read fails.
    #[instrument(skip(self))]
    pub async fn products(&self) -> Result<Vec<Product>, CatalogError> {
        if let Some(CacheValue::Products(products)) = self.inner.cache.get(&CacheKey::Products).await
        {
            debug!("Cache hit for products");
            return Ok(products);
        }

        let Backend::Remote(client) = &self.inner.backend else {
            return Err(CatalogError::NotConfigured);
        };
        let products: Vec<Product> = client
            .select(Resource::Products.table(), &Filter::new().select("*"))
            .await?;

        self.inner
            .cache
            .insert(CacheKey::Products, CacheValue::Products(products.clone()))
            .await;

        Ok(products)
    }

    /// Products for the clothing listing (accessories dropped).
    ///
    /// # Errors
    ///
    /// As [`Catalog::products`].
    pub async fn clothing(&self) -> Result<Vec<Product>, CatalogError> {
        let mut products = self.products().await?;
        products.retain(Product::is_clothing);
        Ok(products)
    }

    /// A single product by id.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::NotFound` if no row has this id, or as
    /// [`Catalog::products`].
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn product(&self, id: ProductId) -> Result<Product, CatalogError> {
        let key = CacheKey::Product(id);
        if let Some(CacheValue::Product(product)) = self.inner.cache.get(&key).await {
            debug!("Cache hit for product");
            return Ok(*product);
        }

        let Backend::Remote(client) = &self.inner.backend else {
            return Err(CatalogError::NotConfigured);
        };
        let product = client
            .select::<Product>(
                Resource::Products.table(),
                &Filter::new().select("*").eq("id", id),
            )
            .await?
            .into_iter()
            .next()
            .ok_or(CatalogError::NotFound(id))?;

        self.inner
            .cache
            .insert(key, CacheValue::Product(Box::new(product.clone())))
            .await;

        Ok(product)
    }

    /// Products whose ids are in `ids`. Unknown ids are simply absent.
    ///
    /// Without a backend there is nothing to join against, so the result is
    /// empty rather than an error.
    ///
    /// # Errors
    ///
    /// Returns the backend error when the read fails.
    #[instrument(skip(self, ids), fields(count = ids.len()))]
    pub async fn products_by_ids(&self, ids: &[ProductId]) -> Result<Vec<Product>, CatalogError> {
        let Backend::Remote(client) = &self.inner.backend else {
            return Ok(Vec::new());
        };
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        Ok(client
            .select(
                Resource::Products.table(),
                &Filter::new().in_list("id", ids).select("*"),
            )
            .await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unconfigured_catalog() {
        let catalog = Catalog::new(Backend::Local);
        assert!(matches!(
            catalog.products().await,
            Err(CatalogError::NotConfigured)
        ));
        assert!(matches!(
            catalog.product(ProductId::new(1)).await,
            Err(CatalogError::NotConfigured)
        ));
        assert!(
            catalog
                .products_by_ids(&[ProductId::new(1)])
                .await
                .is_ok_and(|p| p.is_empty())
        );
    }
}
