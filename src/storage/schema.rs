//! Document schema versioning
//!
//! Version 0 is anything written before `schemaVersion` existed: carts stored as
//! `{items: [...]}`, products with `productDesc`/`productUOM` and numeric prices.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use super::{DocumentStore, StorageError, StorageKey};
use crate::domain::aggregates::{CartItem, Order, Product};

pub const SCHEMA_VERSION: u32 = 1;

impl DocumentStore {
    /// Brings stored documents up to [`SCHEMA_VERSION`]. Returns the version now stored.
    pub async fn migrate(&self) -> Result<u32, StorageError> {
        let current = self.load_document::<u32>(StorageKey::SchemaVersion).await?.unwrap_or(0);
        if current >= SCHEMA_VERSION { return Ok(current); }

        self.unwrap_legacy_cart().await?;
        self.rewrite_collection::<CartItem>(StorageKey::ShoppingCart).await?;
        self.rewrite_collection::<Product>(StorageKey::Products).await?;
        self.rewrite_collection::<Order>(StorageKey::OrderHistory).await?;
        if let Some(order) = self.load_document::<Order>(StorageKey::CurrentOrder).await? {
            self.save_document(StorageKey::CurrentOrder, &order).await?;
        }

        self.save_document(StorageKey::SchemaVersion, &SCHEMA_VERSION).await?;
        tracing::info!(from = current, to = SCHEMA_VERSION, "storage schema migrated");
        Ok(SCHEMA_VERSION)
    }

    async fn unwrap_legacy_cart(&self) -> Result<(), StorageError> {
        let Some(raw) = self.raw(StorageKey::ShoppingCart).await? else { return Ok(()) };
        if let Ok(Value::Object(mut cart)) = serde_json::from_str::<Value>(&raw) {
            let items = match cart.remove("items") {
                Some(Value::Array(items)) => items,
                _ => Vec::new(),
            };
            self.save_collection(StorageKey::ShoppingCart, &items).await?;
        }
        Ok(())
    }

    /// Re-reads a collection through its lenient decoder and writes it back canonically.
    /// If any record is unreadable the stored value is left in place.
    async fn rewrite_collection<T: Serialize + DeserializeOwned>(&self, key: StorageKey) -> Result<(), StorageError> {
        let Some(raw) = self.raw(key).await? else { return Ok(()) };
        match serde_json::from_str::<Vec<T>>(&raw) {
            Ok(items) => self.save_collection(key, &items).await,
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "skipping migration of unreadable collection");
                Ok(())
            }
        }
    }
}
