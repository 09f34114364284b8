//! Test doubles for controller tests.

#![allow(clippy::unwrap_used)]

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde_json::{Value, json};

use food_delivery_core::{MenuItemId, Role};

use crate::api::types::{
    Acknowledgement, AddToCartOutcome, CartItemRequest, CartSnapshot, Category, HealthStatus,
    LoginOutcome, MenuItem, Order, OrderRequest, PlaceOrderOutcome, Profile, RegisterOutcome,
    Registration, User,
};
use crate::api::{ApiError, ApiResult, FoodApi};
use crate::session::MemoryStore;
use crate::state::AppState;

/// Canned backend: each method answers with a configured JSON body or
/// HTTP failure, and every call is recorded.
#[derive(Debug, Default)]
pub struct FakeApi {
    replies: Mutex<HashMap<&'static str, Result<Value, (u16, String)>>>,
    calls: Mutex<Vec<(&'static str, String)>>,
}

impl FakeApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `method` with `body`.
    pub fn reply(self, method: &'static str, body: Value) -> Self {
        self.replies.lock().unwrap().insert(method, Ok(body));
        self
    }

    /// Fail `method` with an HTTP error.
    pub fn fail(self, method: &'static str, status: u16, message: &str) -> Self {
        self.replies
            .lock()
            .unwrap()
            .insert(method, Err((status, message.to_owned())));
        self
    }

    /// Every call made so far as `(method, argument summary)`.
    pub fn calls(&self) -> Vec<(&'static str, String)> {
        self.calls.lock().unwrap().clone()
    }

    /// Number of calls made to `method`.
    pub fn count(&self, method: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(name, _)| *name == method)
            .count()
    }

    fn answer<T: DeserializeOwned>(&self, method: &'static str, args: String) -> ApiResult<T> {
        self.calls.lock().unwrap().push((method, args));

        let reply = self.replies.lock().unwrap().get(method).cloned();
        match reply {
            Some(Ok(body)) => serde_json::from_value(body).map_err(|e| ApiError::Schema {
                endpoint: method.to_owned(),
                reason: e.to_string(),
            }),
            Some(Err((status, message))) => {
                Err(ApiError::from_status(status, json!({ "message": message })))
            }
            None => Err(ApiError::from_status(
                503,
                json!({ "message": format!("no fake reply for {method}") }),
            )),
        }
    }
}

impl FoodApi for FakeApi {
    async fn login(&self, username: &str, _password: &str) -> ApiResult<LoginOutcome> {
        self.answer("login", username.to_owned())
    }

    async fn register(&self, registration: &Registration) -> ApiResult<RegisterOutcome> {
        self.answer("register", serde_json::to_string(registration).unwrap())
    }

    async fn get_user_profile(&self, username: &str) -> ApiResult<Profile> {
        self.answer("get_user_profile", username.to_owned())
    }

    async fn get_menu(&self) -> ApiResult<Vec<MenuItem>> {
        self.answer("get_menu", String::new())
    }

    async fn get_categories(&self) -> ApiResult<Vec<Category>> {
        self.answer("get_categories", String::new())
    }

    async fn get_menu_item(&self, id: MenuItemId) -> ApiResult<MenuItem> {
        self.answer("get_menu_item", id.to_string())
    }

    async fn add_to_cart(
        &self,
        session_id: &str,
        item: &CartItemRequest,
    ) -> ApiResult<AddToCartOutcome> {
        self.answer(
            "add_to_cart",
            format!(
                "{session_id}:{}:{}:{}",
                item.item_id, item.food_type, item.quantity
            ),
        )
    }

    async fn get_cart(&self, session_id: &str) -> ApiResult<CartSnapshot> {
        self.answer("get_cart", session_id.to_owned())
    }

    async fn clear_cart(&self, session_id: &str) -> ApiResult<Acknowledgement> {
        self.answer("clear_cart", session_id.to_owned())
    }

    async fn place_order(&self, order: &OrderRequest) -> ApiResult<PlaceOrderOutcome> {
        self.answer("place_order", serde_json::to_string(order).unwrap())
    }

    async fn get_orders(&self, username: &str) -> ApiResult<Vec<Order>> {
        self.answer("get_orders", username.to_owned())
    }

    async fn test_connection(&self) -> ApiResult<HealthStatus> {
        self.answer("test_connection", String::new())
    }
}

/// State over a fake backend and in-memory storage.
pub fn state(api: FakeApi) -> AppState<FakeApi, MemoryStore> {
    AppState::new(api, MemoryStore::new(), Duration::from_millis(3000))
}

/// Persist a logged-in session for `username`.
pub fn log_in(state: &AppState<FakeApi, MemoryStore>, username: &str, role: Role) {
    state.session().set_session_id("session-1").unwrap();
    state
        .session()
        .set_current_user(&User {
            username: username.to_owned(),
            role,
            email: format!("{username}@food.test"),
        })
        .unwrap();
}

/// A backend that reports healthy with an empty cart.
pub fn healthy() -> FakeApi {
    FakeApi::new()
        .reply(
            "test_connection",
            json!({ "status": "online", "userCount": 2, "menuItemCount": 5 }),
        )
        .reply("get_cart", empty_cart())
}

pub fn empty_cart() -> Value {
    json!({ "items": [], "subtotal": 0, "deliveryFee": 0, "tax": 0, "total": 0, "itemCount": 0 })
}

pub fn menu_item(id: u64, name: &str, category: &str, price: f64) -> Value {
    json!({
        "id": id,
        "name": name,
        "description": format!("Fresh {name}"),
        "price": price,
        "category": category,
        "vegetarian": false,
        "factoryType": category.to_uppercase(),
    })
}
