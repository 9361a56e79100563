//! Integration tests for Gemline.
//!
//! Each test spawns the full storefront router on an ephemeral port, backed
//! by an in-memory content store and a mock identity provider, and drives it
//! over HTTP with a cookie-keeping `reqwest` client.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p gemline-integration-tests
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! let ctx = TestContext::spawn(vec![]).await;
//! let resp = ctx.get("/health").await;
//! assert_eq!(resp.status(), 200);
//! ```

use std::collections::HashMap;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use axum::{
    Form, Json, Router,
    extract::{Query, State},
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
};
use gemline_storefront::config::{ContentStoreConfig, IdentityConfig, StorefrontConfig};
use gemline_storefront::content_store::{ContentStore, ContentStoreError, MemoryContentStore};
use gemline_storefront::routes;
use gemline_storefront::state::AppState;
use reqwest::Client;
use secrecy::SecretString;
use serde_json::{Value, json};
use tokio::net::TcpListener;
use url::Url;

/// Authorization code the mock issuer hands out.
pub const AUTH_CODE: &str = "mock-auth-code";
/// Access token the mock issuer accepts at userinfo.
pub const ACCESS_TOKEN: &str = "mock-access-token";
/// ID token returned with the access token.
pub const ID_TOKEN: &str = "mock-id-token";

const CLIENT_ID: &str = "gemline-storefront";
const CLIENT_SECRET: &str = "mock-client-secret";
const SESSION_SECRET: &str = "k7Qp2vLx9RzT4mWc8NbY3hJd6FsG1aEu";

async fn bind() -> (TcpListener, SocketAddr) {
    let listener = TcpListener::bind(SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 0))
        .await
        .expect("Failed to bind test listener");
    let addr = listener.local_addr().expect("Listener has no address");
    (listener, addr)
}

// =============================================================================
// Mock identity provider
// =============================================================================

#[derive(Clone)]
struct IssuerState {
    profile: Value,
    logouts: Arc<AtomicUsize>,
}

/// Minimal OAuth issuer: approves every authorization request.
pub struct MockIssuer {
    pub url: Url,
    logouts: Arc<AtomicUsize>,
}

impl MockIssuer {
    /// Start the issuer; `profile` is served from the userinfo endpoint.
    pub async fn spawn(profile: Value) -> Self {
        let logouts = Arc::new(AtomicUsize::new(0));
        let state = IssuerState {
            profile,
            logouts: Arc::clone(&logouts),
        };

        let app = Router::new()
            .route("/oauth/authorize", get(authorize))
            .route("/oauth/token", post(token))
            .route("/oauth/userinfo", get(userinfo))
            .route("/oauth/logout", get(logout))
            .with_state(state);

        let (listener, addr) = bind().await;
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Self {
            url: Url::parse(&format!("http://{addr}/")).expect("Valid issuer URL"),
            logouts,
        }
    }

    /// How many times the logout endpoint was visited.
    #[must_use]
    pub fn logout_count(&self) -> usize {
        self.logouts.load(Ordering::SeqCst)
    }
}

async fn authorize(Query(params): Query<HashMap<String, String>>) -> Response {
    let (Some(redirect_uri), Some(state)) = (params.get("redirect_uri"), params.get("state"))
    else {
        return (StatusCode::BAD_REQUEST, "missing redirect_uri or state").into_response();
    };
    if params.get("client_id").map(String::as_str) != Some(CLIENT_ID) {
        return (StatusCode::BAD_REQUEST, "unknown client").into_response();
    }
    let Ok(mut url) = Url::parse(redirect_uri) else {
        return (StatusCode::BAD_REQUEST, "invalid redirect_uri").into_response();
    };
    url.query_pairs_mut()
        .append_pair("code", AUTH_CODE)
        .append_pair("state", state);
    Redirect::to(url.as_str()).into_response()
}

async fn token(Form(params): Form<HashMap<String, String>>) -> Response {
    let valid = params.get("grant_type").map(String::as_str) == Some("authorization_code")
        && params.get("code").map(String::as_str) == Some(AUTH_CODE)
        && params.get("client_secret").map(String::as_str) == Some(CLIENT_SECRET);
    if !valid {
        return (StatusCode::BAD_REQUEST, Json(json!({"error": "invalid_grant"}))).into_response();
    }
    Json(json!({
        "access_token": ACCESS_TOKEN,
        "id_token": ID_TOKEN,
        "expires_in": 3600,
    }))
    .into_response()
}

async fn userinfo(State(state): State<IssuerState>, headers: HeaderMap) -> Response {
    let expected = format!("Bearer {ACCESS_TOKEN}");
    let authorized = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        == Some(expected.as_str());
    if !authorized {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    Json(state.profile).into_response()
}

async fn logout(
    State(state): State<IssuerState>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    state.logouts.fetch_add(1, Ordering::SeqCst);
    params.get("post_logout_redirect_uri").map_or_else(
        || StatusCode::OK.into_response(),
        |uri| Redirect::to(uri).into_response(),
    )
}

/// Profile returned by the mock issuer unless a test supplies its own.
#[must_use]
pub fn default_profile() -> Value {
    json!({
        "sub": "member-42",
        "nickname": "Ada",
        "given_name": "Ada",
        "email": "ada@gemline.io",
        "email_verified": true,
        "created_at": "2024-01-05T10:00:00Z",
        "last_login_at": "2024-06-01T08:30:00Z",
    })
}

// =============================================================================
// Unreachable content store
// =============================================================================

/// Content store that fails every call, as if the service were down.
pub struct UnreachableStore;

fn unreachable() -> ContentStoreError {
    ContentStoreError::Unavailable("connection refused".to_string())
}

#[async_trait]
impl ContentStore for UnreachableStore {
    async fn get_all(&self, _collection: &str) -> Result<Vec<Value>, ContentStoreError> {
        Err(unreachable())
    }

    async fn get_by_id(&self, _collection: &str, _id: &str) -> Result<Value, ContentStoreError> {
        Err(unreachable())
    }

    async fn create(&self, _collection: &str, _record: Value) -> Result<Value, ContentStoreError> {
        Err(unreachable())
    }
}

// =============================================================================
// Storefront under test
// =============================================================================

/// A running storefront with its collaborators.
pub struct TestContext {
    /// Client that keeps cookies and follows redirects.
    pub client: Client,
    pub base_url: String,
    pub store: Arc<MemoryContentStore>,
    pub issuer: MockIssuer,
}

impl TestContext {
    /// Start a storefront whose product collection holds `products`.
    pub async fn spawn(products: Vec<Value>) -> Self {
        Self::spawn_with_profile(products, default_profile()).await
    }

    /// Start a storefront whose identity provider returns `profile`.
    pub async fn spawn_with_profile(products: Vec<Value>, profile: Value) -> Self {
        let store = Arc::new(MemoryContentStore::with_records("jewelryproducts", products));
        Self::launch(store.clone(), store, profile).await
    }

    /// Start a storefront whose content store is down.
    ///
    /// `store` stays empty; nothing the storefront does reaches it.
    pub async fn spawn_unreachable() -> Self {
        Self::launch(
            Arc::new(UnreachableStore),
            Arc::new(MemoryContentStore::new()),
            default_profile(),
        )
        .await
    }

    async fn launch(
        content: Arc<dyn ContentStore>,
        store: Arc<MemoryContentStore>,
        profile: Value,
    ) -> Self {
        let issuer = MockIssuer::spawn(profile).await;

        let (listener, addr) = bind().await;
        let base_url = format!("http://{addr}");
        let config = StorefrontConfig {
            host: addr.ip(),
            port: addr.port(),
            base_url: base_url.clone(),
            session_secret: SecretString::from(SESSION_SECRET.to_string()),
            content_store: ContentStoreConfig::default(),
            identity: Some(IdentityConfig {
                issuer_url: issuer.url.clone(),
                client_id: CLIENT_ID.to_string(),
                client_secret: SecretString::from(CLIENT_SECRET.to_string()),
            }),
            sentry_dsn: None,
            sentry_environment: None,
        };

        let app = routes::app(AppState::with_content_store(config, content));
        tokio::spawn(async move {
            let _ = axum::serve(
                listener,
                app.into_make_service_with_connect_info::<SocketAddr>(),
            )
            .await;
        });

        let client = Client::builder()
            .cookie_store(true)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            base_url,
            store,
            issuer,
        }
    }

    /// Absolute URL for a storefront path.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// GET a storefront path, following redirects.
    pub async fn get(&self, path: &str) -> reqwest::Response {
        self.client
            .get(self.url(path))
            .send()
            .await
            .expect("GET request failed")
    }

    /// POST a form to a storefront path, following redirects.
    pub async fn post_form(&self, path: &str, form: &[(&str, &str)]) -> reqwest::Response {
        self.client
            .post(self.url(path))
            .form(form)
            .send()
            .await
            .expect("POST request failed")
    }

    /// Pick `role`, then run the whole sign-in round trip.
    ///
    /// Returns the page the member lands on.
    pub async fn sign_in(&self, role: &str) -> reqwest::Response {
        let chosen = self.post_form("/auth/role", &[("role", role)]).await;
        assert_eq!(chosen.status(), StatusCode::OK);
        self.get("/auth/login").await
    }
}

/// A product record as the content store holds it.
#[must_use]
pub fn product(id: &str, name: &str, price: u32, public: bool) -> Value {
    json!({
        "_id": id,
        "_createdDate": "2024-04-01T00:00:00Z",
        "productName": name,
        "description": format!("{name} from the Gemline test catalog."),
        "sku": format!("JWL-{id}"),
        "price": price,
        "isVisibleToPublic": public,
        "isVisibleToRetailers": !public,
        "moderationStatus": "approved",
    })
}
