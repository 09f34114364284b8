//! Food delivery browser client.
//!
//! Three layers, bottom up:
//!
//! - [`api`] - typed wrapper over the backend REST API
//! - [`session`] - session id and current user in durable key-value storage
//! - [`routes`] - page controllers that render into a [`page::Document`]
//!
//! [`browser::Browser`] ties them together into a headless tab that follows
//! navigations.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod browser;
pub mod config;
pub mod error;
pub mod page;
pub mod routes;
pub mod session;
pub mod state;

#[cfg(test)]
mod testing;

pub use api::{ApiClient, ApiError, FoodApi};
pub use browser::Browser;
pub use config::ClientConfig;
pub use state::AppState;
