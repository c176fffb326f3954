use chrono::Utc;
use serde::Deserialize;

use super::Storefront;
use crate::domain::aggregates::{Cart, CartDocument};
use crate::domain::value_objects::Quantity;
use crate::storage::StorageKey;
use crate::validation::FieldErrors;
use crate::{Result, StorefrontError};

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddToCart {
    pub product_id: String,
    #[serde(default = "one")]
    pub quantity: i64,
}

fn one() -> i64 { 1 }

fn positive(quantity: i64) -> Result<Quantity> {
    u32::try_from(quantity)
        .ok()
        .and_then(|q| Quantity::new(q).ok())
        .ok_or_else(|| StorefrontError::Validation(FieldErrors::single("quantity", "Quantity must be at least 1")))
}

impl Storefront {
    pub(crate) async fn load_cart(&self) -> Result<Cart> { Ok(Cart::new(self.store.load_collection(StorageKey::ShoppingCart).await?)) }

    async fn save_cart(&self, cart: &Cart) -> Result<()> { Ok(self.store.save_collection(StorageKey::ShoppingCart, cart.items()).await?) }

    pub async fn cart(&self) -> Result<CartDocument> { Ok(self.load_cart().await?.document(Utc::now())) }

    pub async fn add_to_cart(&self, request: AddToCart) -> Result<CartDocument> {
        let quantity = positive(request.quantity)?;
        let _guard = self.write().await;
        let product = self.product(request.product_id.trim()).await?;
        let mut cart = self.load_cart().await?;
        let line = cart.add(&product, quantity, Utc::now());
        tracing::info!(product_id = %line.product_id, quantity = line.quantity.value(), "added to cart");
        self.save_cart(&cart).await?;
        Ok(cart.document(Utc::now()))
    }

    /// Sets a line's quantity; zero or less removes it.
    pub async fn update_cart_item(&self, product_id: &str, quantity: i64) -> Result<CartDocument> {
        let _guard = self.write().await;
        let mut cart = self.load_cart().await?;
        cart.update_quantity(product_id, quantity)?;
        self.save_cart(&cart).await?;
        Ok(cart.document(Utc::now()))
    }

    pub async fn remove_cart_item(&self, product_id: &str) -> Result<CartDocument> {
        let _guard = self.write().await;
        let mut cart = self.load_cart().await?;
        cart.remove(product_id)?;
        self.save_cart(&cart).await?;
        Ok(cart.document(Utc::now()))
    }

    pub async fn clear_cart(&self) -> Result<CartDocument> {
        let _guard = self.write().await;
        let mut cart = self.load_cart().await?;
        cart.clear();
        self.save_cart(&cart).await?;
        tracing::info!("cart cleared");
        Ok(cart.document(Utc::now()))
    }
}
