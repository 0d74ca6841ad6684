//! Application state shared across handlers.

use std::path::Path;
use std::sync::Arc;

use techmart_core::{Catalog, CatalogError};

use crate::config::StorefrontConfig;
use crate::middleware::SessionLocks;

/// Error loading the product catalog at startup.
#[derive(Debug, thiserror::Error)]
pub enum CatalogLoadError {
    #[error("failed to read catalog file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid catalog file {path}: {source}")]
    Invalid {
        path: String,
        #[source]
        source: CatalogError,
    },
}

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to the
/// configuration and the read-only catalog. Carts are not shared: each
/// visitor's cart lives in their session, and `session_locks` keeps that
/// visitor's mutating requests from overlapping.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    catalog: Arc<Catalog>,
    session_locks: SessionLocks,
}

impl AppState {
    /// Create a new application state.
    #[must_use]
    pub fn new(config: StorefrontConfig, catalog: Catalog) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                config,
                catalog: Arc::new(catalog),
                session_locks: SessionLocks::default(),
            }),
        }
    }

    /// Create application state, loading the catalog the configuration points at.
    ///
    /// # Errors
    ///
    /// Returns an error if a configured catalog file cannot be read or parsed.
    pub fn from_config(config: StorefrontConfig) -> Result<Self, CatalogLoadError> {
        let catalog = match &config.catalog_path {
            Some(path) => load_catalog(path)?,
            None => Catalog::demo(),
        };
        Ok(Self::new(config, catalog))
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the product catalog.
    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.inner.catalog
    }

    /// Get a shared handle to the product catalog, for building cart managers.
    #[must_use]
    pub fn catalog_handle(&self) -> Arc<Catalog> {
        Arc::clone(&self.inner.catalog)
    }

    /// Per-session locks held by mutating requests.
    #[must_use]
    pub fn session_locks(&self) -> &SessionLocks {
        &self.inner.session_locks
    }
}

/// Read a JSON catalog from disk.
///
/// # Errors
///
/// Returns an error if the file cannot be read or is not a valid catalog.
pub fn load_catalog(path: &Path) -> Result<Catalog, CatalogLoadError> {
    let display = path.display().to_string();
    let json = std::fs::read_to_string(path).map_err(|source| CatalogLoadError::Io {
        path: display.clone(),
        source,
    })?;
    Catalog::from_json(&json).map_err(|source| CatalogLoadError::Invalid {
        path: display,
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_config_defaults_to_demo_catalog() {
        let state = AppState::from_config(StorefrontConfig::default()).expect("demo catalog");
        assert_eq!(state.catalog().len(), 6);
        assert!(Arc::ptr_eq(&state.catalog_handle(), &state.catalog_handle()));
    }

    #[test]
    fn test_load_catalog_missing_file() {
        let result = load_catalog(Path::new("/nonexistent/techmart-catalog.json"));
        assert!(matches!(result, Err(CatalogLoadError::Io { .. })));
    }
}
