//! Typed form schemas

use serde::{Deserialize, Deserializer};
use serde_json::Value;
use validator::Validate;

use super::rules::{self, RuleResult};
use super::{FieldErrors, FormSchema};
use crate::domain::aggregates::{Carrier, ShippingMethod};

/// Form inputs arrive as strings, but JSON clients often send numbers for numeric fields.
fn lenient_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    })
}

// ---------------------------------------------------------------------------
// Signup / login
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct SignupForm {
    #[validate(custom = "signup_username")]
    pub username: String,
    #[validate(custom = "signup_email")]
    pub email: String,
    #[validate(custom = "signup_password")]
    pub password: String,
    pub confirm_password: String,
    pub terms: bool,
}

fn signup_username(value: &str) -> RuleResult {
    rules::min_length(value, 3, "Username is required.", "Username must be at least 3 characters.")
}

fn signup_email(value: &str) -> RuleResult {
    rules::email(value, "Email is required.", "Please enter a valid email address.")
}

fn signup_password(value: &str) -> RuleResult {
    rules::min_length(value, 6, "Password is required.", "Password must be at least 6 characters.")
}

impl FormSchema for SignupForm {
    fn cross_field(&self, errors: &mut FieldErrors) {
        let confirm = self.confirm_password.trim();
        if confirm.is_empty() {
            errors.insert("confirmPassword", "Please confirm your password.");
        } else if confirm != self.password.trim() {
            errors.insert("confirmPassword", "Passwords do not match.");
        }
        if !self.terms {
            errors.insert("terms", "You must agree to the terms and conditions.");
        }
    }
}

#[derive(Clone, Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct LoginForm {
    #[validate(custom = "login_identity")]
    pub username_or_email: String,
    #[validate(custom = "login_password")]
    pub password: String,
}

fn login_identity(value: &str) -> RuleResult { rules::required(value, "Username or email is required.").map(|_| ()) }
fn login_password(value: &str) -> RuleResult { rules::required(value, "Password is required.").map(|_| ()) }

impl FormSchema for LoginForm {}

// ---------------------------------------------------------------------------
// Shopper management
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct ShopperForm {
    #[validate(custom = "rules::shopper_name")]
    pub shopper_name: String,
    #[validate(custom = "shopper_email")]
    pub shopper_email: String,
    #[validate(custom = "rules::phone_number")]
    pub shopper_phone_number: String,
    #[validate(custom = "rules::shopper_age")]
    #[serde(deserialize_with = "lenient_string")]
    pub shopper_age: String,
    #[validate(custom = "shopper_address")]
    pub shopper_address: String,
    pub terms: bool,
}

fn shopper_email(value: &str) -> RuleResult {
    rules::email(value, "Email is required", "Enter a valid email (e.g., joe@test.com)")
}

fn shopper_address(value: &str) -> RuleResult {
    rules::min_length(value, 5, "Address is required", "Address must be at least 5 characters")
}

impl FormSchema for ShopperForm {
    fn cross_field(&self, errors: &mut FieldErrors) {
        if !self.terms {
            errors.insert("terms", "You must agree to the terms and conditions");
        }
    }
}

// ---------------------------------------------------------------------------
// Product management
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct ProductForm {
    #[validate(custom = "rules::product_id")]
    pub product_id: String,
    #[validate(custom = "product_description")]
    pub product_description: String,
    #[validate(custom = "product_category")]
    pub product_category: String,
    #[validate(custom = "product_subcategory")]
    pub product_subcategory: String,
    #[validate(custom = "product_unit")]
    pub product_unit: String,
    #[validate(custom = "rules::product_price")]
    #[serde(deserialize_with = "lenient_string")]
    pub product_price: String,
    #[validate(custom = "rules::product_weight")]
    #[serde(deserialize_with = "lenient_string")]
    pub product_weight: String,
}

fn product_description(value: &str) -> RuleResult {
    rules::min_length(value, 5, "Product description is required", "Product description must be at least 5 characters")
}

fn product_category(value: &str) -> RuleResult { rules::required(value, "Product category is required").map(|_| ()) }
fn product_subcategory(value: &str) -> RuleResult { rules::required(value, "Product subcategory is required").map(|_| ()) }
fn product_unit(value: &str) -> RuleResult { rules::required(value, "Product unit of measure is required").map(|_| ()) }

impl FormSchema for ProductForm {}

// ---------------------------------------------------------------------------
// Checkout
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct ShippingForm {
    #[validate(custom = "rules::street_address")]
    pub address: String,
    #[validate(custom = "shipping_city")]
    pub city: String,
    #[validate(custom = "shipping_state")]
    pub state: String,
    #[validate(custom = "shipping_zip")]
    pub zip_code: String,
    #[validate(custom = "shipping_carrier")]
    pub shipping_carrier: String,
    #[validate(custom = "shipping_method")]
    pub shipping_method: String,
    pub special_instructions: String,
}

fn shipping_city(value: &str) -> RuleResult { rules::city(value, "City is required") }
fn shipping_state(value: &str) -> RuleResult { rules::us_state(value, "State is required") }
fn shipping_zip(value: &str) -> RuleResult { rules::zip_code(value, "ZIP code is required") }

fn shipping_carrier(value: &str) -> RuleResult {
    value.parse::<Carrier>().map(|_| ()).map_err(|_| rules::fail("carrier", "Please select a shipping carrier"))
}

fn shipping_method(value: &str) -> RuleResult {
    value.parse::<ShippingMethod>().map(|_| ()).map_err(|_| rules::fail("method", "Please select a shipping method"))
}

impl FormSchema for ShippingForm {}

impl ShippingForm {
    pub fn carrier(&self) -> Option<Carrier> { self.shipping_carrier.parse().ok() }
    pub fn method(&self) -> Option<ShippingMethod> { self.shipping_method.parse().ok() }
}

#[derive(Clone, Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct BillingForm {
    #[validate(custom = "rules::cardholder_name")]
    pub cardholder_name: String,
    #[validate(custom = "rules::card_number")]
    pub card_number: String,
    #[validate(custom = "rules::expiry_date")]
    pub expiry_date: String,
    pub cvv: String,
    #[validate(custom = "rules::billing_address")]
    pub billing_address: String,
    #[validate(custom = "billing_city")]
    pub billing_city: String,
    #[validate(custom = "billing_state")]
    pub billing_state: String,
    #[validate(custom = "billing_zip")]
    pub billing_zip_code: String,
    pub same_as_shipping: bool,
}

impl Default for BillingForm {
    fn default() -> Self {
        Self {
            cardholder_name: String::new(),
            card_number: String::new(),
            expiry_date: String::new(),
            cvv: String::new(),
            billing_address: String::new(),
            billing_city: String::new(),
            billing_state: String::new(),
            billing_zip_code: String::new(),
            same_as_shipping: true,
        }
    }
}

fn billing_city(value: &str) -> RuleResult { rules::city(value, "Billing city is required") }
fn billing_state(value: &str) -> RuleResult { rules::us_state(value, "Billing state is required") }
fn billing_zip(value: &str) -> RuleResult { rules::zip_code(value, "Billing ZIP code is required") }

impl FormSchema for BillingForm {
    fn cross_field(&self, errors: &mut FieldErrors) {
        if let Err(e) = rules::cvv(&self.cvv, &self.card_number) {
            errors.insert("cvv", e.message.map(|m| m.to_string()).unwrap_or_default());
        }
    }
}

impl BillingForm {
    /// With `sameAsShipping` set, the billing address fields take the shipping values.
    pub fn resolved_against(&self, shipping: &ShippingForm) -> BillingForm {
        let mut billing = self.clone();
        if billing.same_as_shipping {
            billing.billing_address = shipping.address.clone();
            billing.billing_city = shipping.city.clone();
            billing.billing_state = shipping.state.clone();
            billing.billing_zip_code = shipping.zip_code.clone();
        }
        billing
    }
}

// ---------------------------------------------------------------------------
// Returns
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct ReturnHeaderForm {
    #[validate(custom = "rules::return_email")]
    pub return_email: String,
    pub order_number: String,
    pub selected_order: String,
}

impl FormSchema for ReturnHeaderForm {
    fn cross_field(&self, errors: &mut FieldErrors) {
        if self.order_number.trim().is_empty() && self.selected_order.trim().is_empty() {
            errors.insert("orderNumber", "Enter an order number or select a previous order");
        }
    }
}

impl ReturnHeaderForm {
    /// The typed order number, or the selected previous order when nothing was typed.
    pub fn effective_order_number(&self) -> &str {
        let typed = self.order_number.trim();
        if typed.is_empty() { self.selected_order.trim() } else { typed }
    }
}

#[derive(Clone, Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct ReturnItemForm {
    #[validate(custom = "return_product")]
    pub product_id: String,
    #[validate(custom = "return_reason")]
    pub reason: String,
    #[validate(custom = "rules::return_qty")]
    #[serde(deserialize_with = "lenient_string")]
    pub qty: String,
}

fn return_product(value: &str) -> RuleResult { rules::required(value, "Enter a Product ID").map(|_| ()) }
fn return_reason(value: &str) -> RuleResult { rules::required(value, "Select a reason").map(|_| ()) }

impl FormSchema for ReturnItemForm {}

impl ReturnItemForm {
    pub fn quantity(&self) -> u32 { self.qty.trim().parse().unwrap_or(1) }
}
