//! In-process content store.
//!
//! Used when no remote store is configured, and by tests.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use gemline_core::entities::{Product, Record};
use serde_json::{Map, Value};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{ContentStore, ContentStoreError};

/// Sample catalog bundled with the binary.
const SAMPLE_PRODUCTS: &str = include_str!("../../content/sample_products.json");

/// Content store holding every collection in memory.
#[derive(Debug, Default)]
pub struct MemoryContentStore {
    collections: RwLock<HashMap<String, Vec<Value>>>,
}

impl MemoryContentStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store whose product collection holds the bundled sample catalog.
    ///
    /// # Errors
    ///
    /// Returns an error if the bundled catalog is not a JSON array.
    pub fn with_sample_catalog() -> Result<Self, ContentStoreError> {
        let products: Vec<Value> = serde_json::from_str(SAMPLE_PRODUCTS)?;
        Ok(Self::with_records(Product::COLLECTION, products))
    }

    /// Create a store with one pre-filled collection.
    #[must_use]
    pub fn with_records(collection: &str, records: Vec<Value>) -> Self {
        let mut collections = HashMap::new();
        collections.insert(collection.to_string(), records);
        Self {
            collections: RwLock::new(collections),
        }
    }
}

#[async_trait]
impl ContentStore for MemoryContentStore {
    async fn get_all(&self, collection: &str) -> Result<Vec<Value>, ContentStoreError> {
        let collections = self.collections.read().await;
        Ok(collections.get(collection).cloned().unwrap_or_default())
    }

    async fn get_by_id(&self, collection: &str, id: &str) -> Result<Value, ContentStoreError> {
        let collections = self.collections.read().await;
        collections
            .get(collection)
            .and_then(|items| {
                items
                    .iter()
                    .find(|item| item.get("_id").and_then(Value::as_str) == Some(id))
            })
            .cloned()
            .ok_or_else(|| ContentStoreError::NotFound {
                collection: collection.to_string(),
                id: id.to_string(),
            })
    }

    async fn create(&self, collection: &str, record: Value) -> Result<Value, ContentStoreError> {
        let Value::Object(mut fields) = record else {
            return Err(ContentStoreError::Unavailable(format!(
                "{collection} records must be JSON objects"
            )));
        };
        stamp_system_fields(&mut fields);
        let saved = Value::Object(fields);

        self.collections
            .write()
            .await
            .entry(collection.to_string())
            .or_default()
            .push(saved.clone());

        tracing::debug!(collection, "Record created in memory store");
        Ok(saved)
    }
}

/// Fill in `_id` and `_createdDate` the way the remote store does.
fn stamp_system_fields(fields: &mut Map<String, Value>) {
    fields
        .entry("_id")
        .or_insert_with(|| Value::String(Uuid::new_v4().to_string()));
    fields
        .entry("_createdDate")
        .or_insert_with(|| Value::String(Utc::now().to_rfc3339()));
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use gemline_core::entities::ContactSubmission;
    use serde_json::json;

    use super::*;

    #[tokio::test]
    async fn test_create_assigns_system_fields() {
        let store = MemoryContentStore::new();
        let saved = store
            .create(ContactSubmission::COLLECTION, json!({ "senderName": "Ada" }))
            .await
            .unwrap();

        let id = saved["_id"].as_str().unwrap().to_string();
        assert!(Uuid::parse_str(&id).is_ok());
        assert!(saved["_createdDate"].is_string());

        let fetched = store
            .get_by_id(ContactSubmission::COLLECTION, &id)
            .await
            .unwrap();
        assert_eq!(fetched, saved);
    }

    #[tokio::test]
    async fn test_create_keeps_given_id() {
        let store = MemoryContentStore::new();
        let saved = store
            .create("notifications", json!({ "_id": "n-1", "title": "Hi" }))
            .await
            .unwrap();
        assert_eq!(saved["_id"], "n-1");
        assert_eq!(store.get_all("notifications").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_create_rejects_non_objects() {
        let store = MemoryContentStore::new();
        assert!(store.create("notifications", json!([1, 2])).await.is_err());
    }

    #[tokio::test]
    async fn test_get_by_id_missing() {
        let store = MemoryContentStore::new();
        let err = store.get_by_id(Product::COLLECTION, "nope").await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_sample_catalog_decodes() {
        let store = MemoryContentStore::with_sample_catalog().unwrap();
        let items = store.get_all(Product::COLLECTION).await.unwrap();
        assert!(!items.is_empty());
        for item in items {
            let product: Product = serde_json::from_value(item).unwrap();
            assert!(product.name.is_some());
        }
    }
}
