//! REST client for the remote content store.
//!
//! Reads are cached with `moka`; concurrent misses for the same key share a
//! single outbound request. Each request carries the configured timeout, and
//! dropping the caller's future cancels it.

use std::sync::Arc;

use async_trait::async_trait;
use moka::future::Cache;
use reqwest::StatusCode;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, instrument};
use url::Url;

use super::{ContentStore, ContentStoreError};
use crate::config::ContentStoreConfig;

/// Cache key for collection reads.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
enum CacheKey {
    Items(String),
    Item { collection: String, id: String },
}

/// Cached value types.
#[derive(Debug, Clone)]
enum CacheValue {
    Items(Arc<Vec<Value>>),
    Item(Arc<Value>),
}

#[derive(Deserialize)]
struct ItemsResponse {
    items: Vec<Value>,
}

#[derive(Serialize, Deserialize)]
struct ItemEnvelope {
    item: Value,
}

/// Client for the remote content store.
#[derive(Clone)]
pub struct HttpContentStore {
    inner: Arc<HttpContentStoreInner>,
}

struct HttpContentStoreInner {
    client: reqwest::Client,
    base_url: Url,
    api_key: SecretString,
    cache: Cache<CacheKey, CacheValue>,
}

impl HttpContentStore {
    /// Create a client for `base_url` using the configured key, timeout and cache TTL.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(
        base_url: Url,
        api_key: SecretString,
        config: &ContentStoreConfig,
    ) -> Result<Self, ContentStoreError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("gemline-storefront/", env!("CARGO_PKG_VERSION")))
            .build()?;

        let cache = Cache::builder()
            .max_capacity(1000)
            .time_to_live(config.cache_ttl)
            .build();

        Ok(Self {
            inner: Arc::new(HttpContentStoreInner {
                client,
                base_url,
                api_key,
                cache,
            }),
        })
    }

    fn items_url(&self, collection: &str) -> Result<Url, ContentStoreError> {
        self.endpoint(&["collections", collection, "items"])
    }

    fn item_url(&self, collection: &str, id: &str) -> Result<Url, ContentStoreError> {
        self.endpoint(&["collections", collection, "items", id])
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, ContentStoreError> {
        let mut url = self.inner.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| {
                ContentStoreError::Unavailable(format!(
                    "content store URL cannot be a base: {}",
                    self.inner.base_url
                ))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Send a request and decode a successful JSON body.
    async fn send<T: for<'de> Deserialize<'de>>(
        &self,
        request: reqwest::RequestBuilder,
        missing: impl FnOnce() -> ContentStoreError,
    ) -> Result<T, ContentStoreError> {
        let response = request
            .bearer_auth(self.inner.api_key.expose_secret())
            .send()
            .await?;

        let status = response.status();

        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(1);
            return Err(ContentStoreError::RateLimited(retry_after));
        }

        if status == StatusCode::NOT_FOUND {
            return Err(missing());
        }

        let body = response.text().await?;

        if !status.is_success() {
            tracing::error!(
                status = %status,
                body = %body.chars().take(500).collect::<String>(),
                "Content store returned non-success status"
            );
            return Err(ContentStoreError::Status {
                status: status.as_u16(),
                body: body.chars().take(200).collect(),
            });
        }

        serde_json::from_str(&body).map_err(|e| {
            tracing::error!(
                error = %e,
                body = %body.chars().take(500).collect::<String>(),
                "Failed to parse content store response"
            );
            ContentStoreError::Decode(e)
        })
    }

    async fn fetch_items(&self, collection: &str) -> Result<Vec<Value>, ContentStoreError> {
        let url = self.items_url(collection)?;
        let response: ItemsResponse = self
            .send(self.inner.client.get(url), || ContentStoreError::NotFound {
                collection: collection.to_string(),
                id: String::new(),
            })
            .await?;
        Ok(response.items)
    }

    async fn fetch_item(&self, collection: &str, id: &str) -> Result<Value, ContentStoreError> {
        let url = self.item_url(collection, id)?;
        self.send(self.inner.client.get(url), || ContentStoreError::NotFound {
            collection: collection.to_string(),
            id: id.to_string(),
        })
        .await
    }
}

/// Recover an owned error from one shared by coalesced cache loads.
fn unshare(err: Arc<ContentStoreError>) -> ContentStoreError {
    Arc::try_unwrap(err).unwrap_or_else(|shared| match shared.as_ref() {
        ContentStoreError::NotFound { collection, id } => ContentStoreError::NotFound {
            collection: collection.clone(),
            id: id.clone(),
        },
        ContentStoreError::RateLimited(secs) => ContentStoreError::RateLimited(*secs),
        ContentStoreError::Status { status, body } => ContentStoreError::Status {
            status: *status,
            body: body.clone(),
        },
        other => ContentStoreError::Unavailable(other.to_string()),
    })
}

#[async_trait]
impl ContentStore for HttpContentStore {
    #[instrument(skip(self))]
    async fn get_all(&self, collection: &str) -> Result<Vec<Value>, ContentStoreError> {
        let key = CacheKey::Items(collection.to_string());
        let value = self
            .inner
            .cache
            .try_get_with(key, async {
                debug!("Cache miss for collection");
                self.fetch_items(collection)
                    .await
                    .map(|items| CacheValue::Items(Arc::new(items)))
            })
            .await
            .map_err(unshare)?;

        match value {
            CacheValue::Items(items) => Ok(items.as_ref().clone()),
            CacheValue::Item(_) => Err(ContentStoreError::Unavailable(
                "cache entry has the wrong shape".to_string(),
            )),
        }
    }

    #[instrument(skip(self))]
    async fn get_by_id(&self, collection: &str, id: &str) -> Result<Value, ContentStoreError> {
        let key = CacheKey::Item {
            collection: collection.to_string(),
            id: id.to_string(),
        };
        let value = self
            .inner
            .cache
            .try_get_with(key, async {
                debug!("Cache miss for record");
                self.fetch_item(collection, id)
                    .await
                    .map(|item| CacheValue::Item(Arc::new(item)))
            })
            .await
            .map_err(unshare)?;

        match value {
            CacheValue::Item(item) => Ok(item.as_ref().clone()),
            CacheValue::Items(_) => Err(ContentStoreError::Unavailable(
                "cache entry has the wrong shape".to_string(),
            )),
        }
    }

    #[instrument(skip(self, record))]
    async fn create(&self, collection: &str, record: Value) -> Result<Value, ContentStoreError> {
        let url = self.items_url(collection)?;
        let request = self
            .inner
            .client
            .post(url)
            .json(&ItemEnvelope { item: record });
        let saved: ItemEnvelope = self
            .send(request, || ContentStoreError::NotFound {
                collection: collection.to_string(),
                id: String::new(),
            })
            .await?;

        self.inner
            .cache
            .invalidate(&CacheKey::Items(collection.to_string()))
            .await;

        tracing::info!(collection, "Record created");
        Ok(saved.item)
    }
}
