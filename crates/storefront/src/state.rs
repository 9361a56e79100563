//! Application state shared across handlers.

use std::sync::Arc;

use crate::config::StorefrontConfig;
use crate::content_store::{self, ContentStore, ContentStoreError};
use crate::identity::MemberClient;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to the
/// content store, the identity provider client and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    content: Arc<dyn ContentStore>,
    identity: Option<MemberClient>,
}

impl AppState {
    /// Create application state from configuration.
    ///
    /// Uses the remote content store when `CONTENT_STORE_URL` is set, and an
    /// in-memory store seeded with the sample catalog otherwise.
    ///
    /// # Errors
    ///
    /// Returns an error if the content store client cannot be created.
    pub fn new(config: StorefrontConfig) -> Result<Self, ContentStoreError> {
        let content = content_store::connect(&config.content_store)?;
        Ok(Self::with_content_store(config, content))
    }

    /// Create application state around an existing content store.
    #[must_use]
    pub fn with_content_store(config: StorefrontConfig, content: Arc<dyn ContentStore>) -> Self {
        let identity = config.identity.as_ref().map(MemberClient::new);
        if identity.is_none() {
            tracing::warn!("Identity provider not configured, member sign-in is disabled");
        }

        Self {
            inner: Arc::new(AppStateInner {
                config,
                content,
                identity,
            }),
        }
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get the content store.
    #[must_use]
    pub fn content(&self) -> &dyn ContentStore {
        self.inner.content.as_ref()
    }

    /// Get the identity provider client, if sign-in is configured.
    #[must_use]
    pub fn identity(&self) -> Option<&MemberClient> {
        self.inner.identity.as_ref()
    }
}
