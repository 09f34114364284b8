//! Typed schemas for every backend request and response.
//!
//! Responses are validated at the client boundary: a body that does not
//! match these shapes fails deserialization instead of leaking missing
//! fields into the rendered page.

use std::num::NonZeroU32;

use food_delivery_core::{CategoryId, MenuItemId, OrderId, OrderStatus, Price, Role};
use serde::{Deserialize, Serialize};

// =============================================================================
// Users
// =============================================================================

/// Cached identity of the logged-in user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub username: String,
    pub role: Role,
    #[serde(default)]
    pub email: String,
}

/// Login request body.
#[derive(Debug, Serialize)]
pub struct LoginRequest<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

/// Raw login response; see [`LoginOutcome`].
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    success: bool,
    message: Option<String>,
    session_id: Option<String>,
    username: Option<String>,
    role: Option<Role>,
    email: Option<String>,
}

/// A session granted by the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginSession {
    pub session_id: String,
    pub user: User,
    pub message: Option<String>,
}

/// Result of `POST /login`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "LoginResponse")]
pub enum LoginOutcome {
    Accepted(LoginSession),
    Rejected { message: Option<String> },
}

impl TryFrom<LoginResponse> for LoginOutcome {
    type Error = String;

    fn try_from(response: LoginResponse) -> Result<Self, Self::Error> {
        if !response.success {
            return Ok(Self::Rejected {
                message: response.message,
            });
        }

        let session_id = response
            .session_id
            .filter(|id| !id.is_empty())
            .ok_or("successful login response is missing sessionId")?;
        let username = response
            .username
            .ok_or("successful login response is missing username")?;
        let role = response
            .role
            .ok_or("successful login response is missing role")?;

        Ok(Self::Accepted(LoginSession {
            session_id,
            user: User {
                username,
                role,
                email: response.email.unwrap_or_default(),
            },
            message: response.message,
        }))
    }
}

/// Registration form contents, sent as-is to `POST /register`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Registration {
    pub username: String,
    pub password: String,
    pub email: String,
    pub full_name: String,
    pub phone: String,
}

#[derive(Debug, Deserialize)]
pub struct RegisterResponse {
    success: bool,
    message: Option<String>,
}

/// Result of `POST /register`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "RegisterResponse")]
pub enum RegisterOutcome {
    Registered { message: Option<String> },
    Rejected { message: Option<String> },
}

impl From<RegisterResponse> for RegisterOutcome {
    fn from(response: RegisterResponse) -> Self {
        if response.success {
            Self::Registered {
                message: response.message,
            }
        } else {
            Self::Rejected {
                message: response.message,
            }
        }
    }
}

/// Profile returned by `GET /user/profile`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Profile {
    pub username: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub role: Role,
}

// =============================================================================
// Menu
// =============================================================================

/// A menu item.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuItem {
    pub id: MenuItemId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: Price,
    #[serde(default)]
    pub category: String,
    pub image_url: Option<String>,
    #[serde(default)]
    pub vegetarian: bool,
    pub factory_type: String,
    #[serde(default = "default_true")]
    pub available: bool,
}

const fn default_true() -> bool {
    true
}

/// A menu category from `GET /categories`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
}

// =============================================================================
// Cart
// =============================================================================

/// Line to add to the session's cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItemRequest {
    pub item_id: MenuItemId,
    pub food_type: String,
    pub quantity: u32,
}

/// `POST /cart/add` body: the session id merged with the line fields.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AddToCartBody<'a> {
    pub session_id: &'a str,
    #[serde(flatten)]
    pub item: &'a CartItemRequest,
}

/// Body for endpoints that only take the session id.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SessionBody<'a> {
    pub session_id: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddToCartResponse {
    success: bool,
    message: Option<String>,
    cart_total: Option<Price>,
    item_count: Option<u32>,
}

/// Result of `POST /cart/add`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "AddToCartResponse")]
pub enum AddToCartOutcome {
    Added {
        item_count: u32,
        cart_total: Option<Price>,
        message: Option<String>,
    },
    Rejected {
        message: Option<String>,
    },
}

impl TryFrom<AddToCartResponse> for AddToCartOutcome {
    type Error = String;

    fn try_from(response: AddToCartResponse) -> Result<Self, Self::Error> {
        if !response.success {
            return Ok(Self::Rejected {
                message: response.message,
            });
        }

        Ok(Self::Added {
            item_count: response
                .item_count
                .ok_or("successful add-to-cart response is missing itemCount")?,
            cart_total: response.cart_total,
            message: response.message,
        })
    }
}

/// One line of the server-computed cart.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CartLine {
    pub name: String,
    pub price: Price,
    pub quantity: NonZeroU32,
    pub total: Price,
}

/// Server-computed cart returned by `GET /cart`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartSnapshot {
    #[serde(default)]
    pub items: Vec<CartLine>,
    pub subtotal: Price,
    pub delivery_fee: Price,
    pub tax: Price,
    pub total: Price,
    #[serde(default)]
    pub item_count: u32,
}

impl CartSnapshot {
    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Generic `{ success, message }` acknowledgement.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Acknowledgement {
    pub success: bool,
    pub message: Option<String>,
}

// =============================================================================
// Orders
// =============================================================================

/// `POST /order` body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRequest {
    pub session_id: String,
    pub username: String,
    pub address: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_method: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceOrderResponse {
    success: bool,
    message: Option<String>,
    order_id: Option<OrderId>,
}

/// Result of `POST /order`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "PlaceOrderResponse")]
pub enum PlaceOrderOutcome {
    Placed {
        order_id: OrderId,
        message: Option<String>,
    },
    Rejected {
        message: Option<String>,
    },
}

impl TryFrom<PlaceOrderResponse> for PlaceOrderOutcome {
    type Error = String;

    fn try_from(response: PlaceOrderResponse) -> Result<Self, Self::Error> {
        if !response.success {
            return Ok(Self::Rejected {
                message: response.message,
            });
        }

        Ok(Self::Placed {
            order_id: response
                .order_id
                .ok_or("successful order response is missing orderId")?,
            message: response.message,
        })
    }
}

/// A past order from `GET /order`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub order_id: OrderId,
    pub order_number: String,
    pub status: OrderStatus,
    pub created_at: String,
    pub total_amount: Price,
    #[serde(default)]
    pub delivery_address: String,
}

// =============================================================================
// Health
// =============================================================================

/// `GET /test` health report. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HealthStatus {
    pub status: Option<String>,
    pub service: Option<String>,
    pub database: Option<String>,
    pub timestamp: Option<i64>,
    pub version: Option<String>,
    pub database_status: Option<String>,
    pub user_count: Option<u64>,
    pub menu_item_count: Option<u64>,
    pub order_count: Option<u64>,
}
