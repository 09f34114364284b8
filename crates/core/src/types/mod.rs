//! Core types for the food delivery client.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod id;
pub mod price;
pub mod status;

pub use id::*;
pub use price::{Price, PriceError};
pub use status::*;
