//! HTTP middleware stack for the storefront.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (hub per request, transaction)
//! 2. `TraceLayer` (request span)
//! 3. Request ID
//! 4. Security headers
//! 5. Session layer (tower-sessions, in-memory store)
//! 6. Rate limiting on the contact form and sign-in routes (governor)

pub mod auth;
pub mod rate_limit;
pub mod request_id;
pub mod security_headers;
pub mod session;

pub use auth::{GateRejection, MemberSession, clear_current_member, set_current_member};
pub use rate_limit::{auth_rate_limiter, contact_rate_limiter};
pub use request_id::{RequestId, request_id_middleware};
pub use security_headers::security_headers_middleware;
pub use session::create_session_layer;
