//! Order aggregate: shipping choices, pricing and the submitted order document

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc, Weekday};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::cart::{Cart, CartItem, CartTotals};
use crate::domain::value_objects::{round2, CardNumber, Money, Weight};
use crate::validation::{BillingForm, ShippingForm};

pub const HANDLING_FEE: Decimal = Decimal::from_parts(299, 0, 0, false, 2);
pub const OVERWEIGHT_RATE: Decimal = Decimal::from_parts(50, 0, 0, false, 2);
pub const FREE_WEIGHT: Decimal = Decimal::from_parts(5, 0, 0, false, 0);
pub const UNKNOWN_SHOPPER_EMAIL: &str = "unknown@customer.com";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Carrier {
    #[serde(rename = "FedEx")] FedEx,
    #[serde(rename = "UPS")] Ups,
    #[serde(rename = "DHL")] Dhl,
}

impl Carrier {
    pub const ALL: [Carrier; 3] = [Carrier::FedEx, Carrier::Ups, Carrier::Dhl];
    pub fn as_str(&self) -> &'static str { match self { Self::FedEx => "FedEx", Self::Ups => "UPS", Self::Dhl => "DHL" } }
}

impl FromStr for Carrier {
    type Err = ParseChoiceError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL.into_iter().find(|c| c.as_str() == s.trim()).ok_or(ParseChoiceError)
    }
}

impl fmt::Display for Carrier { fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) } }

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShippingMethod {
    Overnight,
    #[serde(rename = "2nd Day")] SecondDay,
    Ground,
}

impl ShippingMethod {
    pub const ALL: [ShippingMethod; 3] = [ShippingMethod::Overnight, ShippingMethod::SecondDay, ShippingMethod::Ground];
    pub fn as_str(&self) -> &'static str { match self { Self::Overnight => "Overnight", Self::SecondDay => "2nd Day", Self::Ground => "Ground" } }
    pub fn transit_days(&self) -> i64 { match self { Self::Overnight => 1, Self::SecondDay => 2, Self::Ground => 5 } }
}

impl FromStr for ShippingMethod {
    type Err = ParseChoiceError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL.into_iter().find(|m| m.as_str() == s.trim()).ok_or(ParseChoiceError)
    }
}

impl fmt::Display for ShippingMethod { fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) } }

#[derive(Debug, Clone, PartialEq, Eq)] pub struct ParseChoiceError;
impl std::error::Error for ParseChoiceError {}
impl fmt::Display for ParseChoiceError { fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "unknown shipping option") } }

/// Base rate per carrier and method, before handling and overweight charges.
pub fn base_rate(carrier: Carrier, method: ShippingMethod) -> Decimal {
    use Carrier::*;
    use ShippingMethod::*;
    let cents = match (carrier, method) {
        (FedEx, Overnight) => 2599, (FedEx, SecondDay) => 1599, (FedEx, Ground) => 899,
        (Ups, Overnight) => 2499, (Ups, SecondDay) => 1499, (Ups, Ground) => 799,
        (Dhl, Overnight) => 2699, (Dhl, SecondDay) => 1699, (Dhl, Ground) => 999,
    };
    Decimal::new(cents, 2)
}

/// `rate + max(0, weight - 5) * 0.50 + 2.99`
pub fn shipping_cost(carrier: Carrier, method: ShippingMethod, weight: Weight) -> Money {
    let overweight = (weight.value() - FREE_WEIGHT).max(Decimal::ZERO);
    Money::new(base_rate(carrier, method) + overweight * OVERWEIGHT_RATE + HANDLING_FEE)
}

/// Transit days from `from`, pushed forward to the next weekday.
pub fn estimate_delivery(method: ShippingMethod, from: NaiveDate) -> NaiveDate {
    let mut date = from + Duration::days(method.transit_days());
    while matches!(date.weekday(), Weekday::Sat | Weekday::Sun) {
        date = date + Duration::days(1);
    }
    date
}

pub fn format_delivery(date: NaiveDate) -> String { date.format("%A, %B %-d, %Y").to_string() }

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingQuote {
    pub carrier: Carrier,
    pub method: ShippingMethod,
    pub shipping_cost: Money,
    pub estimated_delivery: String,
    pub subtotal: Money,
    pub total: Money,
}

impl ShippingQuote {
    pub fn new(carrier: Carrier, method: ShippingMethod, totals: &CartTotals, today: NaiveDate) -> Self {
        let shipping_cost = shipping_cost(carrier, method, totals.total_weight);
        Self {
            carrier,
            method,
            shipping_cost,
            estimated_delivery: format_delivery(estimate_delivery(method, today)),
            subtotal: totals.total_price,
            total: Money::new(round2(totals.total_price.amount() + shipping_cost.amount())),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OrderShopper { pub email: String }

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OrderShipping {
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub carrier: String,
    pub method: String,
    pub estimated_delivery: String,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OrderBilling {
    pub cardholder_name: String,
    pub card_last4: String,
    pub expiry_date: String,
    pub same_as_shipping: bool,
    pub billing_address: String,
    pub billing_city: String,
    pub billing_state: String,
    pub billing_zip_code: String,
    pub is_test_card: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderCart {
    #[serde(default)]
    pub items: Vec<CartItem>,
    #[serde(default)]
    pub totals: CartTotals,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OrderTotals {
    pub subtotal: Money,
    pub shipping: Money,
    pub total: Money,
}

/// A submitted order. Built once at checkout and never modified.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub order_id: String,
    #[serde(default)]
    pub shopper: OrderShopper,
    #[serde(default)]
    pub shipping: OrderShipping,
    #[serde(default)]
    pub billing: OrderBilling,
    #[serde(default)]
    pub cart: Option<OrderCart>,
    #[serde(default)]
    pub items: Vec<CartItem>,
    #[serde(default)]
    pub totals: OrderTotals,
    #[serde(default)]
    pub special_instructions: String,
    #[serde(default)]
    pub submitted_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub test_mode: bool,
}

impl Order {
    /// Builds the order from validated shipping and billing forms. `billing` is expected
    /// to be resolved against `shipping` already.
    pub fn place(shipping: &ShippingForm, billing: &BillingForm, cart: &Cart, shopper_email: Option<&str>, now: DateTime<Utc>) -> Result<Self, OrderError> {
        if cart.is_empty() { return Err(OrderError::EmptyCart); }
        let (carrier, method) = shipping.carrier().zip(shipping.method()).ok_or(OrderError::MissingShippingChoice)?;
        let totals = cart.totals();
        let quote = ShippingQuote::new(carrier, method, &totals, now.date_naive());
        let card = CardNumber::parse(&billing.card_number);
        let is_test_card = card.is_mock();
        let instructions = shipping.special_instructions.trim();
        let email = shopper_email.map(str::trim).filter(|e| !e.is_empty()).unwrap_or(UNKNOWN_SHOPPER_EMAIL);

        Ok(Self {
            order_id: format!("ORD-{}", now.timestamp_millis()),
            shopper: OrderShopper { email: email.to_string() },
            shipping: OrderShipping {
                address: shipping.address.trim().to_string(),
                city: shipping.city.trim().to_string(),
                state: shipping.state.trim().to_uppercase(),
                zip_code: shipping.zip_code.trim().to_string(),
                carrier: carrier.as_str().to_string(),
                method: method.as_str().to_string(),
                estimated_delivery: quote.estimated_delivery.clone(),
            },
            billing: OrderBilling {
                cardholder_name: billing.cardholder_name.trim().to_string(),
                card_last4: card.last4().to_string(),
                expiry_date: billing.expiry_date.trim().to_string(),
                same_as_shipping: billing.same_as_shipping,
                billing_address: billing.billing_address.trim().to_string(),
                billing_city: billing.billing_city.trim().to_string(),
                billing_state: billing.billing_state.trim().to_uppercase(),
                billing_zip_code: billing.billing_zip_code.trim().to_string(),
                is_test_card,
            },
            cart: Some(OrderCart { items: cart.items().to_vec(), totals: totals.clone() }),
            items: cart.items().to_vec(),
            totals: OrderTotals { subtotal: quote.subtotal, shipping: quote.shipping_cost, total: quote.total },
            special_instructions: if instructions.is_empty() { "None".to_string() } else { instructions.to_string() },
            submitted_at: Some(now),
            test_mode: is_test_card,
        })
    }

    /// Line items, falling back to the nested cart copy for orders that only carry that.
    pub fn line_items(&self) -> &[CartItem] {
        match &self.cart {
            Some(cart) if self.items.is_empty() => &cart.items,
            _ => &self.items,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)] pub enum OrderError { EmptyCart, MissingShippingChoice }
impl std::error::Error for OrderError {}
impl fmt::Display for OrderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self { Self::EmptyCart => write!(f, "Your cart is empty"), Self::MissingShippingChoice => write!(f, "Select a carrier and shipping method") }
    }
}
