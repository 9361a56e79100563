//! Domain models for the storefront.

pub mod session;

pub use session::{CurrentMember, keys as session_keys};
