//! Gemline storefront library.
//!
//! The public catalog, sign-in flow and member back-office, exposed as a
//! library so the binary, the CLI and the integration tests share one router.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod content_store;
pub mod error;
pub mod filters;
pub mod identity;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod state;
