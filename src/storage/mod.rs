//! Key/value document storage
//!
//! A [`Storage`] backend holds raw strings by key. [`DocumentStore`] sits on top and
//! reads and writes whole JSON values under the fixed [`StorageKey`]s. Unreadable
//! collections come back empty; backend failures are returned as [`StorageError`].

mod memory;
mod schema;
mod sqlite;

pub use memory::MemoryStorage;
pub use schema::SCHEMA_VERSION;
pub use sqlite::SqliteStorage;

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StorageKey {
    Products,
    ShoppingCart,
    Shoppers,
    ReturnsDraft,
    CurrentOrder,
    OrderHistory,
    CurrentUser,
    ReturnHistory,
    SchemaVersion,
}

impl StorageKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Products => "products",
            Self::ShoppingCart => "shoppingCart",
            Self::Shoppers => "shoppers",
            Self::ReturnsDraft => "returnsDraft",
            Self::CurrentOrder => "currentOrder",
            Self::OrderHistory => "orderHistory",
            Self::CurrentUser => "currentUser",
            Self::ReturnHistory => "returnHistory",
            Self::SchemaVersion => "schemaVersion",
        }
    }
}

impl fmt::Display for StorageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

/// Errors from a storage backend.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("migration error: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),

    #[error("failed to encode {key}: {source}")]
    Encode { key: StorageKey, source: serde_json::Error },
}

/// Raw string storage by key, the `localStorage` contract.
#[async_trait]
pub trait Storage: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
    async fn remove(&self, key: &str) -> Result<(), StorageError>;
}

#[derive(Clone)]
pub struct DocumentStore {
    backend: Arc<dyn Storage>,
}

impl DocumentStore {
    pub fn new(backend: Arc<dyn Storage>) -> Self { Self { backend } }

    pub fn in_memory() -> Self { Self::new(Arc::new(MemoryStorage::new())) }

    /// Reads a JSON array. Missing, empty or malformed values read as an empty collection;
    /// records that fail to decode are skipped and the rest are kept.
    pub async fn load_collection<T: DeserializeOwned>(&self, key: StorageKey) -> Result<Vec<T>, StorageError> {
        let Some(raw) = self.backend.get(key.as_str()).await? else { return Ok(Vec::new()) };
        if raw.trim().is_empty() { return Ok(Vec::new()); }
        let records = match serde_json::from_str::<Value>(&raw) {
            Ok(Value::Array(records)) => records,
            Ok(_) => {
                tracing::warn!(key = %key, "stored collection is not an array, treating as empty");
                return Ok(Vec::new());
            }
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "stored collection is unreadable, treating as empty");
                return Ok(Vec::new());
            }
        };
        Ok(records
            .into_iter()
            .enumerate()
            .filter_map(|(index, record)| match serde_json::from_value(record) {
                Ok(item) => Some(item),
                Err(e) => {
                    tracing::warn!(key = %key, index, error = %e, "skipping unreadable record");
                    None
                }
            })
            .collect())
    }

    pub async fn save_collection<T: Serialize>(&self, key: StorageKey, items: &[T]) -> Result<(), StorageError> {
        self.save_document(key, &items).await
    }

    /// Reads a single JSON document. Malformed values read as absent.
    pub async fn load_document<T: DeserializeOwned>(&self, key: StorageKey) -> Result<Option<T>, StorageError> {
        let Some(raw) = self.backend.get(key.as_str()).await? else { return Ok(None) };
        match serde_json::from_str::<Option<T>>(&raw) {
            Ok(doc) => Ok(doc),
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "stored document is unreadable, ignoring");
                Ok(None)
            }
        }
    }

    pub async fn save_document<T: Serialize + ?Sized>(&self, key: StorageKey, doc: &T) -> Result<(), StorageError> {
        let raw = serde_json::to_string(doc).map_err(|source| StorageError::Encode { key, source })?;
        self.backend.set(key.as_str(), &raw).await
    }

    pub async fn remove(&self, key: StorageKey) -> Result<(), StorageError> { self.backend.remove(key.as_str()).await }

    pub(crate) async fn raw(&self, key: StorageKey) -> Result<Option<String>, StorageError> { self.backend.get(key.as_str()).await }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Note { text: String }

    #[tokio::test]
    async fn test_missing_collection_is_empty() {
        let store = DocumentStore::in_memory();
        let notes: Vec<Note> = store.load_collection(StorageKey::Shoppers).await.unwrap();
        assert!(notes.is_empty());
    }

    #[tokio::test]
    async fn test_corrupt_collection_is_empty() {
        let backend = Arc::new(MemoryStorage::new());
        backend.set("shoppers", "{not json").await.unwrap();
        let store = DocumentStore::new(backend);
        let notes: Vec<Note> = store.load_collection(StorageKey::Shoppers).await.unwrap();
        assert!(notes.is_empty());
    }

    #[tokio::test]
    async fn test_bad_record_does_not_hide_the_rest() {
        let backend = Arc::new(MemoryStorage::new());
        backend.set("shoppers", r#"[{"text":"kept"},{"text":null},{"other":1},{"text":"also kept"}]"#).await.unwrap();
        let store = DocumentStore::new(backend);
        let notes: Vec<Note> = store.load_collection(StorageKey::Shoppers).await.unwrap();
        assert_eq!(notes, vec![Note { text: "kept".into() }, Note { text: "also kept".into() }]);
    }

    #[tokio::test]
    async fn test_non_array_collection_is_empty() {
        let backend = Arc::new(MemoryStorage::new());
        backend.set("shoppers", r#"{"text":"not a list"}"#).await.unwrap();
        let store = DocumentStore::new(backend);
        let notes: Vec<Note> = store.load_collection(StorageKey::Shoppers).await.unwrap();
        assert!(notes.is_empty());
    }

    #[tokio::test]
    async fn test_collection_round_trip() {
        let store = DocumentStore::in_memory();
        store.save_collection(StorageKey::Shoppers, &[Note { text: "hi".into() }]).await.unwrap();
        let notes: Vec<Note> = store.load_collection(StorageKey::Shoppers).await.unwrap();
        assert_eq!(notes, vec![Note { text: "hi".into() }]);
    }

    #[tokio::test]
    async fn test_document_null_and_remove() {
        let store = DocumentStore::in_memory();
        store.save_document(StorageKey::CurrentUser, &Option::<Note>::None).await.unwrap();
        assert_eq!(store.load_document::<Note>(StorageKey::CurrentUser).await.unwrap(), None);
        store.save_document(StorageKey::CurrentUser, &Note { text: "me".into() }).await.unwrap();
        assert!(store.load_document::<Note>(StorageKey::CurrentUser).await.unwrap().is_some());
        store.remove(StorageKey::CurrentUser).await.unwrap();
        assert_eq!(store.load_document::<Note>(StorageKey::CurrentUser).await.unwrap(), None);
    }
}
