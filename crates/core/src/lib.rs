//! Gemline Core - Shared domain types and storefront logic.
//!
//! This crate provides the types and pure logic used across all Gemline components:
//! - `storefront` - Public jewelry marketplace and member back-office
//! - `cli` - Command-line tools for seeding and inspecting the catalog
//!
//! # Architecture
//!
//! The core crate contains only types, traits and pure functions - no I/O,
//! no HTTP clients, no session handling. Every page behaviour that can be
//! expressed as a function of its inputs lives here so it can be tested
//! without a server.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for IDs, prices, emails, statuses and roles
//! - [`entities`] - Records stored in the content store
//! - [`catalog`] - Visibility, search, price filter and sort pipeline
//! - [`access`] - Sign-in gate for member-only pages
//! - [`compare`] - Before/after image comparison state
//! - [`upload`] - Product upload form validation

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod access;
pub mod catalog;
pub mod compare;
pub mod entities;
pub mod types;
pub mod upload;

pub use types::*;
