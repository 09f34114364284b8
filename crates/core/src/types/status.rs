//! Role and status enums.
//!
//! The backend sends both as free-form upper-case strings. Known values map
//! to dedicated variants; anything else is kept verbatim so it can still be
//! displayed.

use core::fmt;

use serde::{Deserialize, Serialize};

/// User role as reported by the backend.
///
/// Only `ADMIN` changes client behavior (post-login destination).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(from = "String", into = "String")]
pub enum Role {
    Admin,
    #[default]
    Customer,
    Other(String),
}

impl Role {
    /// Returns the wire representation (e.g. `ADMIN`).
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Admin => "ADMIN",
            Self::Customer => "CUSTOMER",
            Self::Other(role) => role,
        }
    }

    /// Whether this role lands on the admin dashboard after login.
    #[must_use]
    pub const fn is_admin(&self) -> bool {
        matches!(self, Self::Admin)
    }

    /// CSS class suffix for role badges.
    #[must_use]
    pub fn css_class(&self) -> String {
        self.as_str().to_lowercase()
    }
}

impl From<String> for Role {
    fn from(value: String) -> Self {
        match value.as_str() {
            "ADMIN" => Self::Admin,
            "CUSTOMER" => Self::Customer,
            _ => Self::Other(value),
        }
    }
}

impl From<Role> for String {
    fn from(role: Role) -> Self {
        match role {
            Role::Other(value) => value,
            known => known.as_str().to_owned(),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Order lifecycle status.
///
/// Parsing is case-insensitive; the original spelling is kept for display.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct OrderStatus {
    kind: OrderStatusKind,
    raw: String,
}

/// Known order statuses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OrderStatusKind {
    Pending,
    Confirmed,
    Preparing,
    OutForDelivery,
    Delivered,
    Cancelled,
    Unknown,
}

impl OrderStatus {
    /// The recognized status, or [`OrderStatusKind::Unknown`].
    #[must_use]
    pub const fn kind(&self) -> OrderStatusKind {
        self.kind
    }

    /// The status exactly as the backend sent it.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// CSS class suffix for status badges.
    #[must_use]
    pub fn css_class(&self) -> String {
        self.raw.to_lowercase()
    }
}

impl From<String> for OrderStatus {
    fn from(raw: String) -> Self {
        let kind = match raw.to_ascii_uppercase().as_str() {
            "PENDING" => OrderStatusKind::Pending,
            "CONFIRMED" => OrderStatusKind::Confirmed,
            "PREPARING" => OrderStatusKind::Preparing,
            "OUT_FOR_DELIVERY" => OrderStatusKind::OutForDelivery,
            "DELIVERED" => OrderStatusKind::Delivered,
            "CANCELLED" | "CANCELED" => OrderStatusKind::Cancelled,
            _ => OrderStatusKind::Unknown,
        };
        Self { kind, raw }
    }
}

impl From<&str> for OrderStatus {
    fn from(raw: &str) -> Self {
        Self::from(raw.to_owned())
    }
}

impl From<OrderStatus> for String {
    fn from(status: OrderStatus) -> Self {
        status.raw
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}
