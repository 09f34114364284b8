//! In-process fake of the food delivery backend.
//!
//! [`FakeBackend::start`] serves the REST API on an ephemeral local port so
//! tests can drive the real `ApiClient` and `Browser` end to end.
//!
//! # Seed Data
//!
//! - Users: `alice` / `secret` (ADMIN), `bob` / `secret` (CUSTOMER)
//! - Menu: Margherita (1), Pepperoni (2), Cheeseburger (3), Garden Salad (4)
//! - Categories: Pizza, Burger, Salad
//!
//! Logging in as `crash` answers HTTP 500. `/ping` answers `text/plain`
//! and `/gateway` answers an HTML 502 page.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{Value, json};
use tokio::net::TcpListener;

use food_delivery_client::api::{ApiClient, ApiResult};
use food_delivery_client::session::MemoryStore;
use food_delivery_client::{AppState, ClientConfig};

/// Password every seeded user logs in with.
pub const PASSWORD: &str = "secret";

/// Timestamp stamped on every order the fake creates.
pub const ORDER_CREATED_AT: &str = "2024-03-05 18:20:00";

type Reply = (StatusCode, Json<Value>);

#[derive(Debug, Clone)]
struct Account {
    password: String,
    role: &'static str,
    email: String,
    phone: Option<String>,
}

#[derive(Debug, Clone, Copy)]
struct Dish {
    id: i32,
    name: &'static str,
    category: &'static str,
    price_cents: i64,
    vegetarian: bool,
    factory_type: &'static str,
    image_url: Option<&'static str>,
}

const MENU: &[Dish] = &[
    Dish {
        id: 1,
        name: "Margherita",
        category: "Pizza",
        price_cents: 1250,
        vegetarian: true,
        factory_type: "PIZZA",
        image_url: None,
    },
    Dish {
        id: 2,
        name: "Pepperoni",
        category: "Pizza",
        price_cents: 1400,
        vegetarian: false,
        factory_type: "PIZZA",
        image_url: None,
    },
    Dish {
        id: 3,
        name: "Cheeseburger",
        category: "Burger",
        price_cents: 999,
        vegetarian: false,
        factory_type: "BURGER",
        image_url: Some("images/food/burger.jpg"),
    },
    Dish {
        id: 4,
        name: "Garden Salad",
        category: "Salad",
        price_cents: 750,
        vegetarian: true,
        factory_type: "SALAD",
        image_url: None,
    },
];

const CATEGORIES: &[&str] = &["Pizza", "Burger", "Salad"];

const DELIVERY_FEE_CENTS: i64 = 299;
const TAX_PERCENT: i64 = 8;

#[derive(Debug, Clone)]
struct StoredOrder {
    id: i32,
    username: String,
    total_cents: i64,
    address: String,
}

#[derive(Debug, Default)]
struct Backend {
    accounts: HashMap<String, Account>,
    sessions: HashMap<String, String>,
    carts: HashMap<String, Vec<(i32, u32)>>,
    orders: Vec<StoredOrder>,
    next_session: u32,
    authorization: Vec<Option<String>>,
}

type Shared = Arc<Mutex<Backend>>;

fn lock(shared: &Shared) -> std::sync::MutexGuard<'_, Backend> {
    shared.lock().unwrap_or_else(PoisonError::into_inner)
}

#[allow(clippy::cast_precision_loss)]
fn dollars(cents: i64) -> f64 {
    cents as f64 / 100.0
}

fn ok(body: Value) -> Reply {
    (StatusCode::OK, Json(body))
}

fn not_found(message: &str) -> Reply {
    (StatusCode::NOT_FOUND, Json(json!({ "message": message })))
}

fn dish_json(dish: &Dish) -> Value {
    json!({
        "id": dish.id,
        "name": dish.name,
        "description": format!("Freshly made {}", dish.name.to_lowercase()),
        "price": dollars(dish.price_cents),
        "category": dish.category,
        "imageUrl": dish.image_url,
        "vegetarian": dish.vegetarian,
        "factoryType": dish.factory_type,
        "available": true,
    })
}

fn find_dish(id: i32) -> Option<&'static Dish> {
    MENU.iter().find(|dish| dish.id == id)
}

impl Backend {
    fn seeded() -> Self {
        let mut backend = Self::default();
        for (username, role) in [("alice", "ADMIN"), ("bob", "CUSTOMER")] {
            backend.accounts.insert(
                username.to_owned(),
                Account {
                    password: PASSWORD.to_owned(),
                    role,
                    email: format!("{username}@food.test"),
                    phone: None,
                },
            );
        }
        backend
    }

    fn cart_json(&self, session_id: &str) -> Value {
        let lines = self.carts.get(session_id).map_or(&[][..], Vec::as_slice);

        let mut subtotal = 0;
        let mut item_count = 0;
        let items: Vec<Value> = lines
            .iter()
            .filter_map(|(id, quantity)| {
                let dish = find_dish(*id)?;
                let total = dish.price_cents * i64::from(*quantity);
                subtotal += total;
                item_count += quantity;
                Some(json!({
                    "name": dish.name,
                    "price": dollars(dish.price_cents),
                    "quantity": quantity,
                    "total": dollars(total),
                }))
            })
            .collect();

        let delivery_fee = if items.is_empty() { 0 } else { DELIVERY_FEE_CENTS };
        let tax = subtotal * TAX_PERCENT / 100;

        json!({
            "items": items,
            "subtotal": dollars(subtotal),
            "deliveryFee": dollars(delivery_fee),
            "tax": dollars(tax),
            "total": dollars(subtotal + delivery_fee + tax),
            "itemCount": item_count,
        })
    }

    fn cart_total_cents(&self, session_id: &str) -> i64 {
        let subtotal: i64 = self
            .carts
            .get(session_id)
            .into_iter()
            .flatten()
            .filter_map(|(id, quantity)| {
                find_dish(*id).map(|dish| dish.price_cents * i64::from(*quantity))
            })
            .sum();
        subtotal + DELIVERY_FEE_CENTS + subtotal * TAX_PERCENT / 100
    }
}

// =============================================================================
// Handlers
// =============================================================================

#[derive(Deserialize)]
struct LoginBody {
    username: String,
    password: String,
}

async fn login(
    State(shared): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<LoginBody>,
) -> Reply {
    let mut backend = lock(&shared);
    record_auth(&mut backend, &headers);

    if body.username == "crash" {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "message": "Internal failure" })),
        );
    }

    let Some(account) = backend
        .accounts
        .get(&body.username)
        .filter(|account| account.password == body.password)
        .cloned()
    else {
        return ok(json!({ "success": false, "message": "Invalid username or password" }));
    };

    backend.next_session += 1;
    let session_id = format!("session-{}", backend.next_session);
    backend
        .sessions
        .insert(session_id.clone(), body.username.clone());

    ok(json!({
        "success": true,
        "message": "Login successful",
        "sessionId": session_id,
        "username": body.username,
        "role": account.role,
        "email": account.email,
    }))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RegisterBody {
    username: String,
    password: String,
    email: String,
    #[allow(dead_code)]
    full_name: String,
    phone: String,
}

async fn register(State(shared): State<Shared>, Json(body): Json<RegisterBody>) -> Reply {
    let mut backend = lock(&shared);
    if backend.accounts.contains_key(&body.username) {
        return ok(json!({ "success": false, "message": "Username already exists" }));
    }

    backend.accounts.insert(
        body.username,
        Account {
            password: body.password,
            role: "CUSTOMER",
            email: body.email,
            phone: Some(body.phone).filter(|p| !p.is_empty()),
        },
    );
    ok(json!({ "success": true, "message": "Registration successful" }))
}

#[derive(Deserialize)]
struct UsernameQuery {
    username: String,
}

async fn profile(State(shared): State<Shared>, Query(query): Query<UsernameQuery>) -> Reply {
    let backend = lock(&shared);
    match backend.accounts.get(&query.username) {
        Some(account) => ok(json!({
            "username": query.username,
            "email": account.email,
            "phone": account.phone,
            "role": account.role,
        })),
        None => not_found("User not found"),
    }
}

async fn menu(State(shared): State<Shared>, headers: HeaderMap) -> Reply {
    record_auth(&mut lock(&shared), &headers);
    ok(Value::Array(MENU.iter().map(dish_json).collect()))
}

async fn categories() -> Reply {
    let categories: Vec<Value> = CATEGORIES
        .iter()
        .zip(1..)
        .map(|(name, id)| json!({ "id": id, "name": name, "description": null }))
        .collect();
    ok(Value::Array(categories))
}

async fn menu_item(Path(id): Path<i32>) -> Reply {
    find_dish(id).map_or_else(|| not_found("Menu item not found"), |dish| ok(dish_json(dish)))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AddToCartBody {
    session_id: String,
    item_id: i32,
    #[allow(dead_code)]
    food_type: String,
    quantity: u32,
}

async fn add_to_cart(State(shared): State<Shared>, Json(body): Json<AddToCartBody>) -> Reply {
    let mut backend = lock(&shared);
    if !backend.sessions.contains_key(&body.session_id) {
        return ok(json!({ "success": false, "message": "Invalid session" }));
    }
    if find_dish(body.item_id).is_none() {
        return ok(json!({ "success": false, "message": "Menu item not found" }));
    }

    let lines = backend.carts.entry(body.session_id.clone()).or_default();
    match lines.iter_mut().find(|(id, _)| *id == body.item_id) {
        Some((_, quantity)) => *quantity += body.quantity,
        None => lines.push((body.item_id, body.quantity)),
    }

    let cart = backend.cart_json(&body.session_id);
    ok(json!({
        "success": true,
        "message": "Item added to cart",
        "cartTotal": cart["total"],
        "itemCount": cart["itemCount"],
    }))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SessionQuery {
    session_id: String,
}

async fn cart(State(shared): State<Shared>, Query(query): Query<SessionQuery>) -> Reply {
    ok(lock(&shared).cart_json(&query.session_id))
}

async fn clear_cart(State(shared): State<Shared>, Json(body): Json<SessionQuery>) -> Reply {
    lock(&shared).carts.remove(&body.session_id);
    ok(json!({ "success": true, "message": "Cart cleared" }))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct OrderBody {
    session_id: String,
    username: String,
    address: String,
}

async fn place_order(State(shared): State<Shared>, Json(body): Json<OrderBody>) -> Reply {
    let mut backend = lock(&shared);
    let has_lines = backend
        .carts
        .get(&body.session_id)
        .is_some_and(|lines| !lines.is_empty());
    if !has_lines {
        return ok(json!({ "success": false, "message": "Cart is empty" }));
    }

    let total_cents = backend.cart_total_cents(&body.session_id);
    backend.carts.remove(&body.session_id);

    let id = i32::try_from(backend.orders.len()).unwrap_or(i32::MAX - 1) + 1;
    backend.orders.push(StoredOrder {
        id,
        username: body.username,
        total_cents,
        address: body.address,
    });

    ok(json!({ "success": true, "message": "Order placed successfully", "orderId": id }))
}

async fn orders(State(shared): State<Shared>, Query(query): Query<UsernameQuery>) -> Reply {
    let backend = lock(&shared);
    let orders: Vec<Value> = backend
        .orders
        .iter()
        .filter(|order| order.username == query.username)
        .map(|order| {
            json!({
                "orderId": order.id,
                "orderNumber": format!("ORD-{:08}", order.id),
                "status": "PENDING",
                "createdAt": ORDER_CREATED_AT,
                "totalAmount": dollars(order.total_cents),
                "deliveryAddress": order.address,
            })
        })
        .collect();
    ok(Value::Array(orders))
}

async fn health(State(shared): State<Shared>) -> Reply {
    let backend = lock(&shared);
    ok(json!({
        "status": "online",
        "service": "food-delivery-backend",
        "database": "connected",
        "version": "1.0.0",
        "userCount": backend.accounts.len(),
        "menuItemCount": MENU.len(),
        "orderCount": backend.orders.len(),
    }))
}

async fn ping() -> ([(header::HeaderName, &'static str); 1], &'static str) {
    ([(header::CONTENT_TYPE, "text/plain; charset=utf-8")], "pong")
}

async fn gateway_down() -> (StatusCode, [(header::HeaderName, &'static str); 1], &'static str) {
    (
        StatusCode::BAD_GATEWAY,
        [(header::CONTENT_TYPE, "text/html")],
        "<html><body><h1>502 Bad Gateway</h1></body></html>",
    )
}

fn record_auth(backend: &mut Backend, headers: &HeaderMap) {
    let value = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned);
    backend.authorization.push(value);
}

// =============================================================================
// Server
// =============================================================================

/// A running fake backend.
#[derive(Debug)]
pub struct FakeBackend {
    addr: SocketAddr,
    shared: Shared,
}

impl FakeBackend {
    /// Bind an ephemeral port and serve in the background.
    ///
    /// # Errors
    ///
    /// Returns error if the listener cannot be bound.
    pub async fn start() -> std::io::Result<Self> {
        let shared: Shared = Arc::new(Mutex::new(Backend::seeded()));

        let app = Router::new()
            .route("/api/login", post(login))
            .route("/api/register", post(register))
            .route("/api/user/profile", get(profile))
            .route("/api/menu", get(menu))
            .route("/api/menu/{id}", get(menu_item))
            .route("/api/categories", get(categories))
            .route("/api/cart/add", post(add_to_cart))
            .route("/api/cart/clear", post(clear_cart))
            .route("/api/cart", get(cart))
            .route("/api/order", post(place_order).get(orders))
            .route("/api/test", get(health))
            .route("/api/ping", get(ping))
            .route("/api/gateway", get(gateway_down))
            .with_state(Arc::clone(&shared));

        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                tracing::error!(error = %e, "Fake backend stopped");
            }
        });

        Ok(Self { addr, shared })
    }

    /// API base URL, e.g. `http://127.0.0.1:49152/api`.
    pub fn base_url(&self) -> String {
        format!("http://{}/api", self.addr)
    }

    /// Client configuration pointing at this backend.
    pub fn config(&self) -> ClientConfig {
        ClientConfig {
            api_base_url: self.base_url(),
            notification_duration: Duration::from_millis(3000),
            ..ClientConfig::default()
        }
    }

    /// State over the real HTTP client and in-memory storage.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be built.
    pub fn state(&self) -> ApiResult<AppState<ApiClient, MemoryStore>> {
        state_for(&self.config())
    }

    /// `Authorization` headers seen on `/login` and `/menu`, oldest first.
    pub fn authorization_headers(&self) -> Vec<Option<String>> {
        lock(&self.shared).authorization.clone()
    }

    /// Number of carts currently holding lines.
    pub fn open_carts(&self) -> usize {
        lock(&self.shared)
            .carts
            .values()
            .filter(|lines| !lines.is_empty())
            .count()
    }
}

/// State over the real HTTP client for an arbitrary configuration.
///
/// # Errors
///
/// Returns error if the HTTP client cannot be built.
pub fn state_for(config: &ClientConfig) -> ApiResult<AppState<ApiClient, MemoryStore>> {
    Ok(AppState::new(
        ApiClient::new(config)?,
        MemoryStore::new(),
        config.notification_duration,
    ))
}

/// A base URL nothing is listening on.
///
/// # Errors
///
/// Returns error if no port could be reserved.
pub async fn offline_base_url() -> std::io::Result<String> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    drop(listener);
    Ok(format!("http://{addr}/api"))
}
