//! Content store collaborator.
//!
//! Every record the storefront reads or writes lives in an external
//! create/read service addressed by collection name. The [`ContentStore`]
//! trait is the only seam to it; pages never talk HTTP directly.
//!
//! # Implementations
//!
//! - [`HttpContentStore`] - REST client with a `moka` read cache (default 5 minute TTL)
//! - [`MemoryContentStore`] - In-process store, seeded with the bundled sample catalog
//!
//! # Example
//!
//! ```rust,ignore
//! use gemline_core::entities::Product;
//!
//! let products: Vec<Product> = state.content().all::<Product>().await?;
//! let product: Product = state.content().by_id::<Product>("ring-001").await?;
//! ```

mod http;
mod memory;

pub use http::HttpContentStore;
pub use memory::MemoryContentStore;

use std::sync::Arc;

use async_trait::async_trait;
use gemline_core::entities::Record;
use serde_json::Value;
use thiserror::Error;

use crate::config::ContentStoreConfig;

/// Errors that can occur when talking to the content store.
#[derive(Debug, Error)]
pub enum ContentStoreError {
    /// HTTP request failed (connection, timeout, body read).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The store answered with an unexpected status.
    #[error("content store returned {status}: {body}")]
    Status { status: u16, body: String },

    /// A record or response body had an unexpected shape.
    #[error("decode error: {0}")]
    Decode(#[from] serde_json::Error),

    /// No record with this ID in the collection.
    #[error("{collection}/{id} not found")]
    NotFound { collection: String, id: String },

    /// Rate limited by the store.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// The store could not be reached or seeded.
    #[error("content store unavailable: {0}")]
    Unavailable(String),
}

impl ContentStoreError {
    /// Whether this is a missing-record error.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Open the store `config` points at.
///
/// A configured URL selects [`HttpContentStore`]; otherwise an in-memory
/// store seeded with the sample catalog is returned.
///
/// # Errors
///
/// Returns an error if the HTTP client cannot be built or the sample
/// catalog does not decode.
pub fn connect(config: &ContentStoreConfig) -> Result<Arc<dyn ContentStore>, ContentStoreError> {
    match (config.url.clone(), config.api_key.clone()) {
        (Some(url), Some(api_key)) => {
            tracing::info!(url = %url, "Using remote content store");
            Ok(Arc::new(HttpContentStore::new(url, api_key, config)?))
        }
        _ => {
            tracing::info!("No content store configured, using bundled sample catalog");
            Ok(Arc::new(MemoryContentStore::with_sample_catalog()?))
        }
    }
}

/// Generic create/read access to named collections.
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// All records of a collection, in store order.
    async fn get_all(&self, collection: &str) -> Result<Vec<Value>, ContentStoreError>;

    /// One record by `_id`.
    ///
    /// Returns [`ContentStoreError::NotFound`] when no record has this ID.
    async fn get_by_id(&self, collection: &str, id: &str) -> Result<Value, ContentStoreError>;

    /// Store a new record and return it as saved, including `_id`.
    async fn create(&self, collection: &str, record: Value) -> Result<Value, ContentStoreError>;

    /// Readiness probe. Defaults to listing the product collection.
    async fn check(&self) -> Result<(), ContentStoreError> {
        self.get_all(gemline_core::entities::Product::COLLECTION)
            .await
            .map(|_| ())
    }
}

impl dyn ContentStore + '_ {
    /// All records of `R`'s collection.
    ///
    /// Records that do not decode as `R` are skipped with a warning so one
    /// malformed entry does not empty a whole page.
    ///
    /// # Errors
    ///
    /// Returns an error if the collection cannot be fetched.
    pub async fn all<R: Record>(&self) -> Result<Vec<R>, ContentStoreError> {
        let items = self.get_all(R::COLLECTION).await?;
        Ok(items
            .into_iter()
            .filter_map(|item| match serde_json::from_value::<R>(item) {
                Ok(record) => Some(record),
                Err(e) => {
                    tracing::warn!(collection = R::COLLECTION, error = %e, "Skipping malformed record");
                    None
                }
            })
            .collect())
    }

    /// One record of `R`'s collection.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for an unknown ID, or a fetch/decode error.
    pub async fn by_id<R: Record>(&self, id: &str) -> Result<R, ContentStoreError> {
        let item = self.get_by_id(R::COLLECTION, id).await?;
        Ok(serde_json::from_value(item)?)
    }

    /// Store `record` in its collection and return the saved record.
    ///
    /// # Errors
    ///
    /// Returns an error if the record cannot be encoded or the store rejects it.
    pub async fn insert<R: Record + Sync>(&self, record: &R) -> Result<Value, ContentStoreError> {
        let value = serde_json::to_value(record)?;
        self.create(R::COLLECTION, value).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use gemline_core::entities::{Notification, Product};
    use serde_json::json;

    use super::*;

    #[test]
    fn test_error_display() {
        let err = ContentStoreError::NotFound {
            collection: "jewelryproducts".to_string(),
            id: "p-9".to_string(),
        };
        assert_eq!(err.to_string(), "jewelryproducts/p-9 not found");
        assert!(err.is_not_found());
        assert_eq!(
            ContentStoreError::RateLimited(30).to_string(),
            "Rate limited, retry after 30 seconds"
        );
    }

    #[tokio::test]
    async fn test_typed_reads_skip_malformed_records() {
        let store: Arc<dyn ContentStore> = Arc::new(MemoryContentStore::new());
        store
            .create(Product::COLLECTION, json!({ "_id": "ok", "productName": "Ring" }))
            .await
            .unwrap();
        store
            .create(Product::COLLECTION, json!({ "_id": "bad", "isVipItem": "yes" }))
            .await
            .unwrap();

        let products = store.all::<Product>().await.unwrap();
        assert_eq!(products.len(), 1);
        assert_eq!(products[0].name_or_empty(), "Ring");

        let product = store.by_id::<Product>("ok").await.unwrap();
        assert_eq!(product.id.as_str(), "ok");
    }

    #[tokio::test]
    async fn test_empty_collection_reads_as_empty() {
        let store: Arc<dyn ContentStore> = Arc::new(MemoryContentStore::new());
        assert!(store.all::<Notification>().await.unwrap().is_empty());
        assert!(store.check().await.is_ok());
    }
}
