//! HTTP client for the remote storefront API.
//!
//! Every call returns the decoded JSON body or a [`SyncError`]. Non-2xx responses
//! surface the server's `{"error": ...}` message when it sends one.

use std::time::Duration;

use reqwest::{Client, Method, RequestBuilder, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};

use super::SyncError;
use crate::domain::aggregates::{Order, Product, ReturnDocument};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest<'a> {
    pub username: &'a str,
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest<'a> {
    pub username_or_email: &'a str,
    pub password: &'a str,
}

/// The user fields the API echoes back. Any of them may be missing.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RemoteUser {
    pub id: Option<String>,
    pub username: Option<String>,
    pub email: Option<String>,
}

impl RemoteUser {
    /// Accepts `userId` or `_id`, at the top level or under `user`.
    fn from_body(body: &Value) -> Self {
        static NULL: Value = Value::Null;
        let scopes = [body, body.get("user").unwrap_or(&NULL)];
        let pick = |names: &[&str]| {
            scopes.iter().flat_map(|scope| names.iter().filter_map(move |n| scope.get(*n))).find_map(|v| match v {
                Value::String(s) if !s.is_empty() => Some(s.clone()),
                Value::Number(n) => Some(n.to_string()),
                _ => None,
            })
        };
        Self { id: pick(&["userId", "_id", "id"]), username: pick(&["username"]), email: pick(&["email"]) }
    }
}

/// Client for the remote storefront API.
pub struct ApiClient {
    client: Client,
    base_url: Url,
}

impl ApiClient {
    /// Creates a client for `base_url` (e.g. `https://host:3002/api`).
    pub fn new(base_url: &str, timeout_secs: u64) -> Result<Self, SyncError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(concat!("campus-storefront/", env!("CARGO_PKG_VERSION")))
            .build()?;

        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised).map_err(|e| SyncError::InvalidBaseUrl(format!("'{base_url}': {e}")))?;
        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &Url { &self.base_url }

    /// Appends percent-encoded path segments and non-empty query pairs to the base URL.
    pub(crate) fn endpoint(&self, segments: &[&str], query: &[(&str, Option<&str>)]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        let pairs: Vec<_> = query.iter().filter_map(|(k, v)| v.filter(|v| !v.is_empty()).map(|v| (*k, v))).collect();
        if !pairs.is_empty() {
            url.query_pairs_mut().extend_pairs(pairs);
        }
        url
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder { self.client.request(method, url) }

    async fn send(&self, request: RequestBuilder, context: &str) -> Result<Value, SyncError> {
        let resp = request.send().await?;
        let status = resp.status();
        let text = resp.text().await?;
        let body = if text.trim().is_empty() { Value::Null } else {
            serde_json::from_str(&text).map_err(|source| SyncError::Deserialize { context: context.to_string(), source })?
        };
        if !status.is_success() {
            let message = body.get("error").and_then(Value::as_str).unwrap_or("request failed").to_string();
            return Err(SyncError::Api { status: status.as_u16(), message });
        }
        Ok(body)
    }

    /// Lists are returned either bare or wrapped in an object under `key`.
    fn decode_list<T: DeserializeOwned>(body: Value, key: &str, context: &str) -> Result<Vec<T>, SyncError> {
        let list = match body {
            Value::Object(mut map) => map.remove(key).unwrap_or(Value::Array(vec![])),
            Value::Null => Value::Array(vec![]),
            other => other,
        };
        serde_json::from_value(list).map_err(|source| SyncError::Deserialize { context: context.to_string(), source })
    }

    pub async fn register_user(&self, user: &RegisterRequest<'_>) -> Result<RemoteUser, SyncError> {
        let url = self.endpoint(&["users", "register"], &[]);
        let body = self.send(self.request(Method::POST, url).json(user), "register").await?;
        Ok(RemoteUser::from_body(&body))
    }

    pub async fn login_user(&self, credentials: &LoginRequest<'_>) -> Result<RemoteUser, SyncError> {
        let url = self.endpoint(&["users", "login"], &[]);
        let body = self.send(self.request(Method::POST, url).json(credentials), "login").await?;
        Ok(RemoteUser::from_body(&body))
    }

    pub async fn upsert_product(&self, product: &Product) -> Result<Value, SyncError> {
        let url = self.endpoint(&["products"], &[]);
        self.send(self.request(Method::POST, url).json(product), "upsert product").await
    }

    pub async fn bulk_sync_products(&self, products: &[Product]) -> Result<Value, SyncError> {
        let url = self.endpoint(&["products", "bulk"], &[]);
        self.send(self.request(Method::POST, url).json(&json!({ "products": products })), "bulk sync products").await
    }

    pub async fn get_products(&self, product_id: Option<&str>, description: Option<&str>) -> Result<Vec<Product>, SyncError> {
        let url = self.endpoint(&["products"], &[("productId", product_id), ("description", description)]);
        let body = self.send(self.request(Method::GET, url), "get products").await?;
        Self::decode_list(body, "products", "get products")
    }

    pub async fn update_product(&self, product_id: &str, product: &Product) -> Result<Value, SyncError> {
        let url = self.endpoint(&["products", product_id], &[]);
        self.send(self.request(Method::PUT, url).json(product), "update product").await
    }

    pub async fn delete_product(&self, product_id: &str) -> Result<(), SyncError> {
        let url = self.endpoint(&["products", product_id], &[]);
        self.send(self.request(Method::DELETE, url), "delete product").await.map(|_| ())
    }

    pub async fn create_order(&self, order: &Order) -> Result<Value, SyncError> {
        let url = self.endpoint(&["orders"], &[]);
        self.send(self.request(Method::POST, url).json(order), "create order").await
    }

    pub async fn get_orders(&self, order_id: Option<&str>, email: Option<&str>) -> Result<Vec<Order>, SyncError> {
        let url = self.endpoint(&["orders"], &[("orderId", order_id), ("email", email)]);
        let body = self.send(self.request(Method::GET, url), "get orders").await?;
        Self::decode_list(body, "orders", "get orders")
    }

    pub async fn create_return(&self, document: &ReturnDocument) -> Result<Value, SyncError> {
        let url = self.endpoint(&["returns"], &[]);
        self.send(self.request(Method::POST, url).json(document), "create return").await
    }

    pub async fn get_returns(&self, order_number: Option<&str>, email: Option<&str>) -> Result<Vec<ReturnDocument>, SyncError> {
        let url = self.endpoint(&["returns"], &[("orderNumber", order_number), ("email", email)]);
        let body = self.send(self.request(Method::GET, url), "get returns").await?;
        Self::decode_list(body, "returns", "get returns")
    }
}
