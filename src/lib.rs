//! Campus Storefront
//!
//! Form handling and document storage for a small storefront.
//!
//! ## Features
//! - Signup, login and shopper registration
//! - Product management with upsert, lookup and seeding
//! - Shopping cart and shipping/billing checkout
//! - Returns against previous orders
//! - Best-effort mirroring to a remote API

pub mod config;
pub mod domain;
pub mod routes;
pub mod services;
pub mod storage;
pub mod sync;
pub mod validation;

use thiserror::Error;

use crate::domain::aggregates::{CartError, CatalogError, OrderError, ReturnError};
use crate::storage::StorageError;
use crate::sync::SyncError;
use crate::validation::FieldErrors;

// =============================================================================
// Error Types
// =============================================================================

#[derive(Error, Debug)]
pub enum StorefrontError {
    #[error("validation failed: {0}")]
    Validation(FieldErrors),

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("{0}")]
    Conflict(String),

    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("remote API error: {0}")]
    Sync(#[from] SyncError),
}

impl From<FieldErrors> for StorefrontError { fn from(e: FieldErrors) -> Self { Self::Validation(e) } }
impl From<CatalogError> for StorefrontError { fn from(_: CatalogError) -> Self { Self::NotFound("Product") } }

impl From<CartError> for StorefrontError {
    fn from(e: CartError) -> Self {
        match e {
            CartError::ItemNotFound => Self::NotFound("Cart item"),
            CartError::QuantityTooLarge => Self::Validation(FieldErrors::single("quantity", e.to_string())),
        }
    }
}

impl From<OrderError> for StorefrontError {
    fn from(e: OrderError) -> Self {
        match e {
            OrderError::EmptyCart => Self::Conflict(e.to_string()),
            OrderError::MissingShippingChoice => Self::Validation(FieldErrors::single("shippingMethod", e.to_string())),
        }
    }
}

impl From<ReturnError> for StorefrontError {
    fn from(e: ReturnError) -> Self {
        match e {
            ReturnError::EmptyDraft => Self::Conflict(e.to_string()),
            ReturnError::NoSuchLine(_) => Self::NotFound("Return item"),
        }
    }
}

pub type Result<T> = std::result::Result<T, StorefrontError>;
