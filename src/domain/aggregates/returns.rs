//! Return drafts and submitted return documents

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::order::Order;
use super::product::Catalog;

pub const UNKNOWN_PRODUCT_DESC: &str = "(Unknown / not in current product list)";
pub const FROM_ORDER_REASON: &str = "Selected from previous order";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReturnItem {
    pub product_id: String,
    #[serde(default, alias = "productDescription")]
    pub product_desc: String,
    #[serde(default)]
    pub reason: String,
    #[serde(default = "one")]
    pub qty: u32,
}

fn one() -> u32 { 1 }

impl ReturnItem {
    /// Describes the item from the current catalog, or marks it unknown.
    pub fn describe(product_id: &str, reason: &str, qty: u32, catalog: &Catalog) -> Self {
        let product_desc = catalog
            .find(product_id)
            .map(|p| p.product_description.clone())
            .unwrap_or_else(|| UNKNOWN_PRODUCT_DESC.to_string());
        Self { product_id: product_id.trim().to_string(), product_desc, reason: reason.trim().to_string(), qty: qty.max(1) }
    }
}

/// The persisted `returnsDraft` array.
#[derive(Clone, Debug, Default)]
pub struct ReturnDraft {
    items: Vec<ReturnItem>,
}

impl ReturnDraft {
    pub fn new(items: Vec<ReturnItem>) -> Self { Self { items } }
    pub fn items(&self) -> &[ReturnItem] { &self.items }
    pub fn into_items(self) -> Vec<ReturnItem> { self.items }
    pub fn is_empty(&self) -> bool { self.items.is_empty() }

    pub fn push(&mut self, item: ReturnItem) { self.items.push(item); }

    pub fn remove(&mut self, index: usize) -> Result<ReturnItem, ReturnError> {
        if index >= self.items.len() { return Err(ReturnError::NoSuchLine(index)); }
        Ok(self.items.remove(index))
    }

    /// Replaces the draft with every line of a previous order.
    pub fn fill_from_order(&mut self, order: &Order) {
        self.items = order
            .line_items()
            .iter()
            .map(|item| ReturnItem {
                product_id: item.product_id.clone(),
                product_desc: item.product_description.clone(),
                reason: FROM_ORDER_REASON.to_string(),
                qty: item.quantity.value().max(1),
            })
            .collect();
    }

    pub fn clear(&mut self) { self.items.clear(); }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReturnDocument {
    pub shopper_email: String,
    pub order_number: String,
    pub return_date: DateTime<Utc>,
    pub items: Vec<ReturnItem>,
}

impl ReturnDocument {
    pub fn submit(shopper_email: &str, order_number: &str, draft: &ReturnDraft, now: DateTime<Utc>) -> Result<Self, ReturnError> {
        if draft.is_empty() { return Err(ReturnError::EmptyDraft); }
        Ok(Self {
            shopper_email: shopper_email.trim().to_string(),
            order_number: order_number.trim().to_string(),
            return_date: now,
            items: draft.items().to_vec(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)] pub enum ReturnError { EmptyDraft, NoSuchLine(usize) }
impl std::error::Error for ReturnError {}
impl std::fmt::Display for ReturnError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyDraft => write!(f, "Add at least one item to the return"),
            Self::NoSuchLine(i) => write!(f, "No return item at position {i}"),
        }
    }
}
