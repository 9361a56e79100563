//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                       - Home page
//! GET  /health                 - Liveness check
//! GET  /health/ready           - Readiness check (content store)
//!
//! # Catalog
//! GET  /catalog                - Product listing with search, price filter and sort
//! GET  /catalog/clear          - Reset filters, keep the view mode
//! GET  /product/{id}           - Product detail
//! GET  /product/{id}/compare   - Original/enhanced image comparison
//!
//! # Contact
//! GET  /contact                - Contact form
//! POST /contact                - Submit contact form (rate limited)
//!
//! # Auth
//! GET  /auth                   - Role selection and sign-in prompt
//! POST /auth/role              - Store selected role, show onboarding step
//! GET  /auth/login             - Redirect to the identity provider (rate limited)
//! GET  /auth/callback          - Handle OAuth callback (rate limited)
//! POST /auth/logout            - Sign out
//!
//! # Members (sign-in required)
//! GET  /profile                - Member profile
//! GET  /dashboard              - Member dashboard
//! GET  /upload                 - Product upload form
//! POST /upload                 - Submit product (multipart)
//! GET  /analytics              - Placeholder
//! GET  /notifications          - Placeholder
//! GET  /moderation             - Placeholder
//!
//! # Anything else
//! *                            - Redirect to /
//! ```

pub mod account;
pub mod auth;
pub mod catalog;
pub mod contact;
pub mod health;
pub mod home;
pub mod products;
pub mod upload;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware as axum_middleware,
    response::Redirect,
    routing::{get, post},
};
use tower_http::{services::ServeDir, trace::TraceLayer};

use crate::middleware::{
    auth_rate_limiter, contact_rate_limiter, create_session_layer, request_id_middleware,
    security_headers_middleware,
};
use crate::state::AppState;

/// Directory served under `/static`.
const STATIC_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/static");

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(auth::roles))
        .route("/role", post(auth::select_role))
        .route("/login", get(auth::login).layer(auth_rate_limiter()))
        .route("/callback", get(auth::callback).layer(auth_rate_limiter()))
        .route("/logout", post(auth::logout))
}

/// Create the catalog and product routes router.
pub fn catalog_routes() -> Router<AppState> {
    Router::new()
        .route("/catalog", get(catalog::index))
        .route("/catalog/clear", get(catalog::clear))
        .route("/product/{id}", get(products::show))
        .route("/product/{id}/compare", get(products::compare))
}

/// Create the member routes router.
pub fn member_routes() -> Router<AppState> {
    Router::new()
        .route("/profile", get(account::profile))
        .route("/dashboard", get(account::dashboard))
        .route(
            "/upload",
            get(upload::show)
                .post(upload::submit)
                .layer(DefaultBodyLimit::max(upload::UPLOAD_BODY_LIMIT)),
        )
        .route("/analytics", get(account::analytics))
        .route("/notifications", get(account::notifications))
        .route("/moderation", get(account::moderation))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home::home))
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        .merge(catalog_routes())
        .route(
            "/contact",
            get(contact::show).merge(post(contact::submit).layer(contact_rate_limiter())),
        )
        .nest("/auth", auth_routes())
        .merge(member_routes())
        .fallback(|| async { Redirect::to("/") })
}

/// Build the complete application with middleware.
pub fn app(state: AppState) -> Router {
    let session_layer = create_session_layer(state.config());

    routes()
        .nest_service("/static", ServeDir::new(STATIC_DIR))
        .layer(session_layer)
        .layer(axum_middleware::from_fn(security_headers_middleware))
        .layer(axum_middleware::from_fn(request_id_middleware))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
        // Sentry layers (outermost for full request coverage)
        .layer(sentry_tower::NewSentryLayer::new_from_top())
        .layer(sentry_tower::SentryHttpLayer::new().enable_transaction())
}
