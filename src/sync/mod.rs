//! Best-effort mirroring of local writes to the remote API
//!
//! Local storage is the source of truth. [`SyncBridge::publish`] hands domain events to
//! a background task and returns immediately; failures are logged and never undo the
//! local write. Signup and login call the [`ApiClient`] directly and await it.

mod client;

pub use client::{ApiClient, LoginRequest, RegisterRequest, RemoteUser};

use std::sync::Arc;

use thiserror::Error;

use crate::domain::events::{DomainEvent, OrderEvent, ProductEvent, ReturnEvent};

/// Errors returned by the remote API client.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Network, TLS or timeout failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid API base URL {0}")]
    InvalidBaseUrl(String),

    /// The API answered with a non-2xx status.
    #[error("API returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("remote API is not configured")]
    Disabled,
}

#[derive(Clone, Default)]
pub struct SyncBridge {
    client: Option<Arc<ApiClient>>,
}

impl SyncBridge {
    pub fn new(client: ApiClient) -> Self { Self { client: Some(Arc::new(client)) } }
    pub fn disabled() -> Self { Self { client: None } }
    pub fn is_enabled(&self) -> bool { self.client.is_some() }
    pub fn client(&self) -> Result<&ApiClient, SyncError> { self.client.as_deref().ok_or(SyncError::Disabled) }

    /// Mirrors events in order on one background task. Does nothing when disabled.
    pub fn publish(&self, events: Vec<DomainEvent>) -> Option<tokio::task::JoinHandle<()>> {
        let client = self.client.clone()?;
        if events.is_empty() { return None; }
        Some(tokio::spawn(async move {
            for event in events {
                tracing::debug!(event = event.name(), "mirroring to remote API");
                if let Err(e) = dispatch(&client, &event).await {
                    tracing::warn!(event = event.name(), error = %e, "remote mirror failed");
                }
            }
        }))
    }
}

/// Sends one event to its endpoint.
pub async fn dispatch(client: &ApiClient, event: &DomainEvent) -> Result<(), SyncError> {
    match event {
        DomainEvent::Product(ProductEvent::Created { product }) => client.upsert_product(product).await.map(|_| ()),
        DomainEvent::Product(ProductEvent::Updated { product }) => client.update_product(&product.product_id, product).await.map(|_| ()),
        DomainEvent::Product(ProductEvent::Deleted { product_id }) => client.delete_product(product_id).await,
        DomainEvent::Product(ProductEvent::Seeded { products }) => client.bulk_sync_products(products).await.map(|_| ()),
        DomainEvent::Order(OrderEvent::Submitted { order }) => client.create_order(order).await.map(|_| ()),
        DomainEvent::Return(ReturnEvent::Submitted { document }) => client.create_return(document).await.map(|_| ()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disabled_bridge_publishes_nothing() {
        let bridge = SyncBridge::disabled();
        assert!(!bridge.is_enabled());
        assert!(matches!(bridge.client(), Err(SyncError::Disabled)));
        assert!(bridge.publish(vec![DomainEvent::Product(ProductEvent::Deleted { product_id: "1".into() })]).is_none());
    }
}
