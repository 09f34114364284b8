//! Food Delivery Core - Shared types library.
//!
//! This crate provides common types used across all food delivery components:
//! - `client` - API client, session store and page controllers
//! - `cli` - Command-line front end that drives the client
//!
//! # Architecture
//!
//! The core crate contains only types and traits - no I/O, no storage access,
//! no HTTP clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, prices, roles and statuses

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
