//! Storefront operations
//!
//! [`Storefront`] owns the document store, the sync bridge and the write lock. Every
//! mutating operation holds the lock across its read-modify-write of the stored
//! collections, then hands any domain events to the bridge after the write lands.

mod accounts;
mod cart;
mod catalog;
mod checkout;
mod returns;

pub use cart::AddToCart;
pub use checkout::{mock_card, CheckoutRequest};
pub use returns::{PreviousOrder, ReturnDraftView};

use tokio::sync::{Mutex, MutexGuard};

use crate::storage::DocumentStore;
use crate::sync::SyncBridge;

pub struct Storefront {
    store: DocumentStore,
    sync: SyncBridge,
    write_lock: Mutex<()>,
}

impl Storefront {
    pub fn new(store: DocumentStore, sync: SyncBridge) -> Self { Self { store, sync, write_lock: Mutex::new(()) } }

    /// Migrates stored documents to the current schema before serving.
    pub async fn open(store: DocumentStore, sync: SyncBridge) -> crate::Result<Self> {
        let version = store.migrate().await?;
        tracing::debug!(schema_version = version, "document store ready");
        Ok(Self::new(store, sync))
    }

    async fn write(&self) -> MutexGuard<'_, ()> { self.write_lock.lock().await }
}
