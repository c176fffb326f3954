use std::collections::HashSet;

use chrono::Utc;
use serde::Deserialize;

use super::Storefront;
use crate::domain::aggregates::{Cart, CurrentUser, Order, ShippingQuote};
use crate::domain::events::{DomainEvent, OrderEvent};
use crate::domain::value_objects::{CardBrand, MockCard};
use crate::storage::StorageKey;
use crate::validation::{BillingForm, FieldErrors, FormSchema, ShippingForm};
use crate::{Result, StorefrontError};

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CheckoutRequest {
    pub shipping: ShippingForm,
    pub billing: BillingForm,
}

impl CheckoutRequest {
    /// Validates both forms together and returns billing with the address resolved.
    fn validated_billing(&self) -> Result<BillingForm> {
        let billing = self.billing.resolved_against(&self.shipping);
        let mut errors = FieldErrors::new();
        if let Err(e) = self.shipping.check() { errors.merge(e); }
        if let Err(e) = billing.check() { errors.merge(e); }
        errors.into_result()?;
        Ok(billing)
    }
}

/// Demo billing details for a card brand name.
pub fn mock_card(brand: &str) -> Result<&'static MockCard> {
    CardBrand::parse(brand).map(MockCard::for_brand).ok_or(StorefrontError::NotFound("Test card"))
}

impl Storefront {
    /// Shipping cost and delivery estimate for the current cart.
    pub async fn quote(&self, shipping: &ShippingForm) -> Result<ShippingQuote> {
        let mut errors = FieldErrors::new();
        if shipping.carrier().is_none() { errors.insert("shippingCarrier", "Please select a shipping carrier"); }
        if shipping.method().is_none() { errors.insert("shippingMethod", "Please select a shipping method"); }
        let (Some(carrier), Some(method)) = (shipping.carrier(), shipping.method()) else {
            return Err(StorefrontError::Validation(errors));
        };
        let totals = self.load_cart().await?.totals();
        Ok(ShippingQuote::new(carrier, method, &totals, Utc::now().date_naive()))
    }

    /// Turns the cart into an order: stores it as the current order, appends it to the
    /// history, empties the cart and mirrors it.
    pub async fn place_order(&self, request: CheckoutRequest) -> Result<Order> {
        let billing = request.validated_billing()?;

        let _guard = self.write().await;
        let cart = self.load_cart().await?;
        let user: Option<CurrentUser> = self.store.load_document(StorageKey::CurrentUser).await?;
        let order = Order::place(&request.shipping, &billing, &cart, user.as_ref().map(|u| u.email.as_str()), Utc::now())?;

        self.store.save_document(StorageKey::CurrentOrder, &order).await?;
        let mut history: Vec<Order> = self.store.load_collection(StorageKey::OrderHistory).await?;
        history.push(order.clone());
        self.store.save_collection(StorageKey::OrderHistory, &history).await?;
        self.store.save_collection(StorageKey::ShoppingCart, Cart::default().items()).await?;

        tracing::info!(order_id = %order.order_id, total = %order.totals.total, test_mode = order.test_mode, "order submitted");
        self.sync.publish(vec![DomainEvent::Order(OrderEvent::Submitted { order: order.clone() })]);
        Ok(order)
    }

    pub async fn current_order(&self) -> Result<Option<Order>> { Ok(self.store.load_document(StorageKey::CurrentOrder).await?) }

    pub async fn order_history(&self) -> Result<Vec<Order>> { Ok(self.store.load_collection(StorageKey::OrderHistory).await?) }

    /// History plus the current order, one entry per order id, newest first.
    pub async fn previous_orders(&self) -> Result<Vec<Order>> {
        let mut orders = self.order_history().await?;
        orders.extend(self.current_order().await?);
        let mut seen = HashSet::new();
        orders.retain(|o| !o.order_id.is_empty() && seen.insert(o.order_id.clone()));
        orders.sort_by(|a, b| b.submitted_at.cmp(&a.submitted_at));
        Ok(orders)
    }
}
