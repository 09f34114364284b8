//! REST client for the food delivery backend.
//!
//! # Architecture
//!
//! - One generic [`ApiClient::request`] is the single chokepoint for all
//!   network traffic; every endpoint method is a thin typed binding over it
//! - Error and success responses are normalized into [`ApiResponse`] or
//!   [`ApiError`]; every failure is logged before it is returned
//! - No retries, no timeout, no caching: each call is one best-effort attempt
//! - Page controllers depend on the [`FoodApi`] trait, so tests can swap in
//!   a fake backend
//!
//! # Example
//!
//! ```rust,ignore
//! use food_delivery_client::api::{ApiClient, FoodApi};
//!
//! let api = ApiClient::new(&config)?;
//! let menu = api.get_menu().await?;
//! let cart = api.get_cart("session-id").await?;
//! ```

pub mod types;

pub use reqwest::Method;

use std::future::Future;

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderValue};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::instrument;
use url::Url;

use food_delivery_core::MenuItemId;

use crate::config::ClientConfig;
use types::{
    Acknowledgement, AddToCartBody, AddToCartOutcome, CartItemRequest, CartSnapshot, Category,
    HealthStatus, LoginOutcome, LoginRequest, MenuItem, Order, OrderRequest, PlaceOrderOutcome,
    Profile, RegisterOutcome, Registration, SessionBody,
};

/// Errors that can occur when talking to the backend.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The backend answered with a non-success status.
    #[error("{message}")]
    Http {
        status: u16,
        message: String,
        payload: serde_json::Value,
    },

    /// No response was obtained (connection refused, DNS, TLS, ...).
    #[error("Network error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The configured base URL and endpoint do not form a valid URL.
    #[error("Invalid request URL: {0}")]
    Url(#[from] url::ParseError),

    /// The backend answered successfully with a body of the wrong shape.
    #[error("Unexpected response from {endpoint}: {reason}")]
    Schema { endpoint: String, reason: String },
}

impl ApiError {
    /// HTTP status code, if the backend responded at all.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            Self::Transport(_) | Self::Url(_) | Self::Schema { .. } => None,
        }
    }

    /// Build an HTTP failure from a status and a (possibly empty) error body.
    ///
    /// The message is the body's non-empty `message` string, or `HTTP <status>`.
    #[must_use]
    pub fn from_status(status: u16, payload: serde_json::Value) -> Self {
        let message = payload
            .get("message")
            .and_then(serde_json::Value::as_str)
            .filter(|message| !message.is_empty())
            .map_or_else(|| format!("HTTP {status}"), str::to_owned);

        Self::Http {
            status,
            message,
            payload,
        }
    }
}

/// Result type alias for backend calls.
pub type ApiResult<T> = Result<T, ApiError>;

/// A successful response body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiResponse {
    /// Body declared as `application/json`.
    Json(serde_json::Value),
    /// Any other body, returned verbatim.
    Text(String),
}

/// Path and query of a backend route, relative to the base URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    path: String,
    query: Vec<(&'static str, String)>,
}

impl Endpoint {
    /// Create an endpoint for `path` (e.g. `/menu`).
    #[must_use]
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            query: Vec::new(),
        }
    }

    /// Append a query parameter. Values are URL-encoded when sent.
    #[must_use]
    pub fn query(mut self, key: &'static str, value: impl Into<String>) -> Self {
        self.query.push((key, value.into()));
        self
    }

    /// The route path.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }
}

impl std::fmt::Display for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.path)
    }
}

// =============================================================================
// FoodApi
// =============================================================================

/// Backend operations used by the page controllers.
///
/// Each method maps 1:1 to a fixed backend route. None validate their
/// arguments beyond what JSON serialization requires.
pub trait FoodApi: Sync {
    /// `POST /login`
    fn login(&self, username: &str, password: &str)
    -> impl Future<Output = ApiResult<LoginOutcome>> + Send;

    /// `POST /register`
    fn register(&self, registration: &Registration)
    -> impl Future<Output = ApiResult<RegisterOutcome>> + Send;

    /// `GET /user/profile?username=`
    fn get_user_profile(&self, username: &str) -> impl Future<Output = ApiResult<Profile>> + Send;

    /// `GET /menu`
    fn get_menu(&self) -> impl Future<Output = ApiResult<Vec<MenuItem>>> + Send;

    /// `GET /categories`
    fn get_categories(&self) -> impl Future<Output = ApiResult<Vec<Category>>> + Send;

    /// `GET /menu/{id}`
    fn get_menu_item(&self, id: MenuItemId) -> impl Future<Output = ApiResult<MenuItem>> + Send;

    /// `POST /cart/add`
    fn add_to_cart(
        &self,
        session_id: &str,
        item: &CartItemRequest,
    ) -> impl Future<Output = ApiResult<AddToCartOutcome>> + Send;

    /// `GET /cart?sessionId=`
    fn get_cart(&self, session_id: &str) -> impl Future<Output = ApiResult<CartSnapshot>> + Send;

    /// `POST /cart/clear`
    fn clear_cart(&self, session_id: &str) -> impl Future<Output = ApiResult<Acknowledgement>> + Send;

    /// `POST /order`
    fn place_order(&self, order: &OrderRequest)
    -> impl Future<Output = ApiResult<PlaceOrderOutcome>> + Send;

    /// `GET /order?username=`
    fn get_orders(&self, username: &str) -> impl Future<Output = ApiResult<Vec<Order>>> + Send;

    /// `GET /test`
    fn test_connection(&self) -> impl Future<Output = ApiResult<HealthStatus>> + Send;
}

// =============================================================================
// ApiClient
// =============================================================================

/// HTTP client for the food delivery backend.
#[derive(Clone)]
pub struct ApiClient {
    client: reqwest::Client,
    base_url: String,
    auth_token: Option<SecretString>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .field("auth_token", &self.auth_token.as_ref().map(|_| "[REDACTED]"))
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    /// Create a new API client from configuration.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(config: &ClientConfig) -> ApiResult<Self> {
        let client = reqwest::Client::builder().build()?;

        Ok(Self {
            client,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            auth_token: config.api_token.clone(),
        })
    }

    /// The base URL every endpoint is appended to.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Resolve an endpoint against the base URL, encoding its query pairs.
    fn url_for(&self, endpoint: &Endpoint) -> ApiResult<Url> {
        let mut url = Url::parse(&format!("{}{}", self.base_url, endpoint.path)).map_err(|e| {
            tracing::error!(error = %e, endpoint = %endpoint, "API request URL is invalid");
            ApiError::Url(e)
        })?;

        if !endpoint.query.is_empty() {
            url.query_pairs_mut()
                .extend_pairs(endpoint.query.iter().map(|(k, v)| (*k, v.as_str())));
        }

        Ok(url)
    }

    /// Issue one request and normalize the outcome.
    ///
    /// Sends `Content-Type: application/json`, adds `Authorization: Bearer`
    /// only when `auth_token` is given, and serializes `body` when present.
    ///
    /// # Errors
    ///
    /// - [`ApiError::Http`] for a non-success status (message from the error
    ///   body's `message` field, or `HTTP <status>`)
    /// - [`ApiError::Transport`] when no response was obtained
    #[instrument(skip(self, body, auth_token), fields(endpoint = %endpoint))]
    pub async fn request<B: Serialize + ?Sized>(
        &self,
        method: Method,
        endpoint: &Endpoint,
        body: Option<&B>,
        auth_token: Option<&SecretString>,
    ) -> ApiResult<ApiResponse> {
        let url = self.url_for(endpoint)?;

        let mut request = self
            .client
            .request(method, url.clone())
            .header(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        if let Some(token) = auth_token {
            request = request.header(
                AUTHORIZATION,
                format!("Bearer {}", token.expose_secret()),
            );
        }

        if let Some(body) = body {
            request = request.json(body);
        }

        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => {
                tracing::error!(error = %e, url = %url, "API request failed");
                return Err(ApiError::Transport(e));
            }
        };

        let status = response.status();

        if !status.is_success() {
            // Error bodies are optional; anything unparsable becomes `{}`
            let payload = response
                .json::<serde_json::Value>()
                .await
                .unwrap_or_else(|_| serde_json::json!({}));
            let err = ApiError::from_status(status.as_u16(), payload);
            tracing::error!(status = status.as_u16(), error = %err, "API request failed");
            return Err(err);
        }

        let is_json = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|value| value.contains("application/json"));

        let result = if is_json {
            response.json::<serde_json::Value>().await.map(ApiResponse::Json)
        } else {
            response.text().await.map(ApiResponse::Text)
        };

        result.map_err(|e| {
            tracing::error!(error = %e, "API response body could not be read");
            ApiError::Transport(e)
        })
    }

    /// Issue a request and decode the JSON body into `T`.
    async fn fetch<T, B>(&self, method: Method, endpoint: Endpoint, body: Option<&B>) -> ApiResult<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let response = self
            .request(method, &endpoint, body, self.auth_token.as_ref())
            .await?;
        decode(&endpoint, response)
    }

    async fn get<T: DeserializeOwned>(&self, endpoint: Endpoint) -> ApiResult<T> {
        self.fetch::<T, ()>(Method::GET, endpoint, None).await
    }

    async fn post<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        endpoint: Endpoint,
        body: &B,
    ) -> ApiResult<T> {
        self.fetch(Method::POST, endpoint, Some(body)).await
    }
}

/// Decode a success body into the expected schema.
fn decode<T: DeserializeOwned>(endpoint: &Endpoint, response: ApiResponse) -> ApiResult<T> {
    let value = match response {
        ApiResponse::Json(value) => value,
        ApiResponse::Text(_) => {
            let err = ApiError::Schema {
                endpoint: endpoint.path.clone(),
                reason: "expected a JSON body".to_string(),
            };
            tracing::error!(error = %err, "API response rejected");
            return Err(err);
        }
    };

    serde_json::from_value(value).map_err(|e| {
        let err = ApiError::Schema {
            endpoint: endpoint.path.clone(),
            reason: e.to_string(),
        };
        tracing::error!(error = %err, "API response rejected");
        err
    })
}

impl FoodApi for ApiClient {
    #[instrument(skip(self, password))]
    async fn login(&self, username: &str, password: &str) -> ApiResult<LoginOutcome> {
        self.post(Endpoint::new("/login"), &LoginRequest { username, password })
            .await
    }

    #[instrument(skip_all, fields(username = %registration.username))]
    async fn register(&self, registration: &Registration) -> ApiResult<RegisterOutcome> {
        self.post(Endpoint::new("/register"), registration).await
    }

    #[instrument(skip(self))]
    async fn get_user_profile(&self, username: &str) -> ApiResult<Profile> {
        self.get(Endpoint::new("/user/profile").query("username", username))
            .await
    }

    #[instrument(skip(self))]
    async fn get_menu(&self) -> ApiResult<Vec<MenuItem>> {
        self.get(Endpoint::new("/menu")).await
    }

    #[instrument(skip(self))]
    async fn get_categories(&self) -> ApiResult<Vec<Category>> {
        self.get(Endpoint::new("/categories")).await
    }

    #[instrument(skip(self))]
    async fn get_menu_item(&self, id: MenuItemId) -> ApiResult<MenuItem> {
        self.get(Endpoint::new(format!("/menu/{id}"))).await
    }

    #[instrument(skip(self, session_id))]
    async fn add_to_cart(
        &self,
        session_id: &str,
        item: &CartItemRequest,
    ) -> ApiResult<AddToCartOutcome> {
        self.post(
            Endpoint::new("/cart/add"),
            &AddToCartBody { session_id, item },
        )
        .await
    }

    #[instrument(skip_all)]
    async fn get_cart(&self, session_id: &str) -> ApiResult<CartSnapshot> {
        self.get(Endpoint::new("/cart").query("sessionId", session_id))
            .await
    }

    #[instrument(skip_all)]
    async fn clear_cart(&self, session_id: &str) -> ApiResult<Acknowledgement> {
        self.post(Endpoint::new("/cart/clear"), &SessionBody { session_id })
            .await
    }

    #[instrument(skip_all, fields(username = %order.username))]
    async fn place_order(&self, order: &OrderRequest) -> ApiResult<PlaceOrderOutcome> {
        self.post(Endpoint::new("/order"), order).await
    }

    #[instrument(skip(self))]
    async fn get_orders(&self, username: &str) -> ApiResult<Vec<Order>> {
        self.get(Endpoint::new("/order").query("username", username))
            .await
    }

    #[instrument(skip(self))]
    async fn test_connection(&self) -> ApiResult<HealthStatus> {
        self.get(Endpoint::new("/test")).await
    }
}
