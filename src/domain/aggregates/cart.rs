//! Shopping cart aggregate

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::product::Product;
use crate::domain::value_objects::{decimal_or_zero, Money, Quantity, Weight};

/// One cart line. Price and weight are stored as JSON numbers, the way the cart
/// has always been persisted; reads also accept decimal strings and `null`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub product_id: String,
    #[serde(default)]
    pub product_description: String,
    #[serde(default)]
    pub product_category: String,
    #[serde(serialize_with = "rust_decimal::serde::float::serialize", deserialize_with = "decimal_or_zero")]
    pub product_price: Decimal,
    #[serde(default, serialize_with = "rust_decimal::serde::float::serialize", deserialize_with = "decimal_or_zero")]
    pub product_weight: Decimal,
    #[serde(default = "Quantity::one")]
    pub quantity: Quantity,
    #[serde(default)]
    pub added_at: DateTime<Utc>,
}

impl CartItem {
    pub fn from_product(product: &Product, quantity: Quantity, now: DateTime<Utc>) -> Self {
        Self {
            product_id: product.product_id.clone(),
            product_description: product.product_description.clone(),
            product_category: product.product_category.clone(),
            product_price: product.product_price.amount(),
            product_weight: product.weight_or_zero().value(),
            quantity,
            added_at: now,
        }
    }

    pub fn line_total(&self) -> Money { Money::new(self.product_price * Decimal::from(self.quantity.value())) }
    pub fn line_weight(&self) -> Weight { Weight::new(self.product_weight * Decimal::from(self.quantity.value())) }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartTotals {
    pub item_count: u32,
    pub total_price: Money,
    pub total_weight: Weight,
}

/// Cart preview with a fresh id on every render.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartDocument {
    pub cart_id: String,
    pub items: Vec<CartItem>,
    pub totals: CartTotals,
    pub last_updated: DateTime<Utc>,
}

/// The stored `shoppingCart` array, one line per product id.
#[derive(Clone, Debug, Default)]
pub struct Cart {
    items: Vec<CartItem>,
}

impl Cart {
    pub fn new(items: Vec<CartItem>) -> Self { Self { items } }
    pub fn items(&self) -> &[CartItem] { &self.items }
    pub fn into_items(self) -> Vec<CartItem> { self.items }
    pub fn is_empty(&self) -> bool { self.items.is_empty() }
    pub fn len(&self) -> usize { self.items.len() }
    pub fn find(&self, product_id: &str) -> Option<&CartItem> { self.items.iter().find(|i| i.product_id == product_id) }

    /// Adds a product, summing quantities when the id is already in the cart.
    pub fn add(&mut self, product: &Product, quantity: Quantity, now: DateTime<Utc>) -> &CartItem {
        let index = match self.items.iter().position(|i| i.product_id == product.product_id) {
            Some(index) => {
                let line = &mut self.items[index];
                line.quantity = line.quantity.add(quantity);
                index
            }
            None => {
                self.items.push(CartItem::from_product(product, quantity, now));
                self.items.len() - 1
            }
        };
        &self.items[index]
    }

    /// Sets a line's quantity; anything below one removes the line.
    pub fn update_quantity(&mut self, product_id: &str, quantity: i64) -> Result<Option<&CartItem>, CartError> {
        let index = self.items.iter().position(|i| i.product_id == product_id).ok_or(CartError::ItemNotFound)?;
        if quantity < 1 {
            self.items.remove(index);
            return Ok(None);
        }
        let quantity = u32::try_from(quantity).ok().and_then(|q| Quantity::new(q).ok()).ok_or(CartError::QuantityTooLarge)?;
        self.items[index].quantity = quantity;
        Ok(Some(&self.items[index]))
    }

    pub fn remove(&mut self, product_id: &str) -> Result<CartItem, CartError> {
        let index = self.items.iter().position(|i| i.product_id == product_id).ok_or(CartError::ItemNotFound)?;
        Ok(self.items.remove(index))
    }

    pub fn clear(&mut self) { self.items.clear(); }

    pub fn totals(&self) -> CartTotals {
        let (count, price, weight) = self.items.iter().fold((0u32, Decimal::ZERO, Decimal::ZERO), |(c, p, w), item| {
            let qty = Decimal::from(item.quantity.value());
            (c.saturating_add(item.quantity.value()), p + item.product_price * qty, w + item.product_weight * qty)
        });
        CartTotals { item_count: count, total_price: Money::new(price), total_weight: Weight::new(weight) }
    }

    pub fn document(&self, now: DateTime<Utc>) -> CartDocument {
        CartDocument { cart_id: cart_id(now), items: self.items.clone(), totals: self.totals(), last_updated: now }
    }
}

fn cart_id(now: DateTime<Utc>) -> String {
    let suffix = uuid::Uuid::new_v4().simple().to_string();
    format!("cart_{}_{}", now.timestamp_millis(), &suffix[..9])
}

#[derive(Debug, Clone, PartialEq, Eq)] pub enum CartError { ItemNotFound, QuantityTooLarge }
impl std::error::Error for CartError {}
impl std::fmt::Display for CartError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self { Self::ItemNotFound => write!(f, "Item not in cart"), Self::QuantityTooLarge => write!(f, "Quantity is too large") }
    }
}
