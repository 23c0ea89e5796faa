//! State handed to every handler: configuration, the chosen backend and the
//! cached catalog.

use std::sync::Arc;

use crate::backend::Backend;
use crate::config::StorefrontConfig;
use crate::services::Catalog;

#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    backend: Backend,
    catalog: Catalog,
}

impl AppState {
    /// Chooses the backend once, from `config.backend`.
    #[must_use]
    pub fn new(config: StorefrontConfig) -> Self {
        let backend = Backend::from_config(&config.backend);
        let catalog = Catalog::new(backend.clone());

        Self {
            inner: Arc::new(AppStateInner {
                config,
                backend,
                catalog,
            }),
        }
    }

    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    #[must_use]
    pub fn backend(&self) -> &Backend {
        &self.inner.backend
    }

    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.inner.catalog
    }
}
