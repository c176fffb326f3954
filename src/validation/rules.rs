//! Field rules shared by the storefront forms.
//!
//! Every rule has the `validator` custom-function shape, `Fn(&str) -> Result<(), ValidationError>`,
//! or is a parameterized helper that form-specific wrappers call with their own messages.
//! A rule reports only its first failing check.

use std::borrow::Cow;
use std::sync::LazyLock;

use chrono::{Datelike, NaiveDate, Utc};
use regex::Regex;
use rust_decimal::Decimal;
use validator::ValidationError;

use crate::domain::value_objects::CardNumber;

pub type RuleResult = Result<(), ValidationError>;

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex"));
static LOOSE_EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\S+@\S+\.\S+$").expect("valid email regex"));
static ZIP_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{5}(-\d{4})?$").expect("valid zip regex"));
static STREET_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9\s\-#.,]+$").expect("valid street regex"));
static CITY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z\s\-'.]+$").expect("valid city regex"));
static PERSON_NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z\s\-.']+$").expect("valid name regex"));
static SHOPPER_NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z][A-Za-z .'-]*$").expect("valid name regex"));
static PRODUCT_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9_-]+$").expect("valid product id regex"));
static EXPIRY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{2}/\d{2}$").expect("valid expiry regex"));

pub const US_STATE_CODES: [&str; 50] = [
    "AL", "AK", "AZ", "AR", "CA", "CO", "CT", "DE", "FL", "GA", "HI", "ID", "IL", "IN", "IA",
    "KS", "KY", "LA", "ME", "MD", "MA", "MI", "MN", "MS", "MO", "MT", "NE", "NV", "NH", "NJ",
    "NM", "NY", "NC", "ND", "OH", "OK", "OR", "PA", "RI", "SC", "SD", "TN", "TX", "UT", "VT",
    "VA", "WA", "WV", "WI", "WY",
];

/// Builds a rule failure carrying a user-facing message.
pub fn fail(code: &'static str, message: impl Into<Cow<'static, str>>) -> ValidationError {
    let mut error = ValidationError::new(code);
    error.message = Some(message.into());
    error
}

/// Trims the value and fails with `message` when nothing is left.
pub fn required<'a>(value: &'a str, message: &'static str) -> Result<&'a str, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() { return Err(fail("required", message)); }
    Ok(trimmed)
}

pub fn is_email(value: &str) -> bool { EMAIL_RE.is_match(value) }

pub fn email(value: &str, required_msg: &'static str, invalid_msg: &'static str) -> RuleResult {
    let value = required(value, required_msg)?;
    if !is_email(value) { return Err(fail("email", invalid_msg)); }
    Ok(())
}

pub fn min_length(value: &str, min: usize, required_msg: &'static str, short_msg: &'static str) -> RuleResult {
    let value = required(value, required_msg)?;
    if value.chars().count() < min { return Err(fail("length", short_msg)); }
    Ok(())
}

pub fn zip_code(value: &str, required_msg: &'static str) -> RuleResult {
    let value = required(value, required_msg)?;
    if !ZIP_RE.is_match(value) { return Err(fail("zip", "ZIP code must be 5 digits or 5+4 format")); }
    Ok(())
}

pub fn us_state(value: &str, required_msg: &'static str) -> RuleResult {
    let value = required(value, required_msg)?;
    if value.len() != 2 || !value.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(fail("state", "State must be a 2-letter code"));
    }
    let upper = value.to_ascii_uppercase();
    if !US_STATE_CODES.contains(&upper.as_str()) {
        return Err(fail("state", "Please enter a valid US state code"));
    }
    Ok(())
}

pub fn city(value: &str, required_msg: &'static str) -> RuleResult {
    let value = required(value, required_msg)?;
    let len = value.chars().count();
    if len < 2 { return Err(fail("length", "City name is too short")); }
    if len > 50 { return Err(fail("length", "City name must be less than 50 characters")); }
    if !CITY_RE.is_match(value) {
        return Err(fail("city", "City can only contain letters, spaces, hyphens, and apostrophes"));
    }
    Ok(())
}

fn address_length(value: &str) -> RuleResult {
    let len = value.chars().count();
    if len < 5 { return Err(fail("length", "Address must be at least 5 characters")); }
    if len > 100 { return Err(fail("length", "Address must be less than 100 characters")); }
    Ok(())
}

pub fn street_address(value: &str) -> RuleResult {
    let value = required(value, "Street address is required")?;
    address_length(value)?;
    if !STREET_RE.is_match(value) { return Err(fail("address", "Address contains invalid characters")); }
    Ok(())
}

pub fn billing_address(value: &str) -> RuleResult {
    let value = required(value, "Billing address is required")?;
    address_length(value)
}

pub fn cardholder_name(value: &str) -> RuleResult {
    let value = required(value, "Cardholder name is required")?;
    let len = value.chars().count();
    if len < 2 { return Err(fail("length", "Name is too short")); }
    if len > 50 { return Err(fail("length", "Name must be less than 50 characters")); }
    if !PERSON_NAME_RE.is_match(value) {
        return Err(fail("name", "Name can only contain letters, spaces, hyphens, and apostrophes"));
    }
    Ok(())
}

/// Mock cards pass outright; anything else must be 13-19 digits with a valid Luhn sum.
pub fn card_number(value: &str) -> RuleResult {
    required(value, "Credit card number is required")?;
    let card = CardNumber::parse(value);
    if card.is_mock() { return Ok(()); }
    if !card.is_numeric() { return Err(fail("card", "Card number must contain only digits")); }
    if card.len() < 13 { return Err(fail("card", "Card number is too short")); }
    if card.len() > 19 { return Err(fail("card", "Card number is too long")); }
    if !card.passes_luhn() { return Err(fail("card", "Invalid credit card number")); }
    Ok(())
}

pub fn expiry_date(value: &str) -> RuleResult { expiry_date_at(value, Utc::now().date_naive()) }

/// `MM/YY` expiry check against a fixed day.
pub fn expiry_date_at(value: &str, today: NaiveDate) -> RuleResult {
    let value = required(value, "Expiry date is required")?;
    if !EXPIRY_RE.is_match(value) { return Err(fail("expiry", "Expiry date must be in MM/YY format")); }
    let (month, year) = value.split_once('/').unwrap_or_default();
    let month: u32 = month.parse().unwrap_or_default();
    let year: i32 = year.parse().unwrap_or_default();
    let current_year = today.year() % 100;
    let current_month = today.month();

    if !(1..=12).contains(&month) { return Err(fail("expiry", "Invalid month (must be 01-12)")); }
    if year < current_year || (year == current_year && month < current_month) {
        return Err(fail("expiry", "Card has expired"));
    }
    if year > current_year + 20 { return Err(fail("expiry", "Invalid expiry year")); }
    Ok(())
}

pub fn cvv(value: &str, card_number: &str) -> RuleResult {
    required(value, "CVV is required")?;
    if !value.bytes().all(|b| b.is_ascii_digit()) { return Err(fail("cvv", "CVV must contain only digits")); }
    let expected = CardNumber::parse(card_number).expected_cvv_len();
    if value.len() != expected { return Err(fail("cvv", format!("CVV must be {expected} digits"))); }
    Ok(())
}

pub fn product_id(value: &str) -> RuleResult {
    let value = required(value, "Product ID is required")?;
    if !PRODUCT_ID_RE.is_match(value) {
        return Err(fail("product_id", "Product ID can only contain numbers, hyphens, and underscores"));
    }
    Ok(())
}

/// Price between 0.01 and 999,999.99 written with exactly two decimals.
pub fn product_price(value: &str) -> RuleResult {
    let value = required(value, "Product price is required")?;
    let in_range = value
        .parse::<Decimal>()
        .map(|price| price >= Decimal::new(1, 2) && price <= Decimal::new(99_999_999, 2))
        .unwrap_or(false);
    if !in_range { return Err(fail("range", "Price must be between $0.01 and $999,999.99")); }
    match value.split_once('.') {
        Some((_, cents)) if cents.len() == 2 => Ok(()),
        _ => Err(fail("price", "Price must be a valid monetary value with exactly two decimal places (e.g., 49.99, 100.00)")),
    }
}

/// Optional weight; blank passes.
pub fn product_weight(value: &str) -> RuleResult {
    let value = value.trim();
    if value.is_empty() { return Ok(()); }
    let valid = value
        .parse::<Decimal>()
        .map(|weight| weight >= Decimal::ZERO && weight <= Decimal::from(1000))
        .unwrap_or(false);
    if !valid { return Err(fail("weight", "Weight must be a positive number up to 1000 kg")); }
    Ok(())
}

pub fn shopper_name(value: &str) -> RuleResult {
    let value = required(value, "Full name is required")?;
    if !SHOPPER_NAME_RE.is_match(value) { return Err(fail("name", "Use letters and spaces only")); }
    Ok(())
}

pub fn phone_number(value: &str) -> RuleResult {
    let value = required(value, "Phone number is required")?;
    if value.chars().filter(char::is_ascii_digit).count() < 10 {
        return Err(fail("phone", "Enter at least 10 digits"));
    }
    Ok(())
}

pub fn shopper_age(value: &str) -> RuleResult {
    let value = required(value, "Age is required")?;
    match value.parse::<u32>() {
        Ok(age) if (13..=120).contains(&age) => Ok(()),
        _ => Err(fail("age", "Age must be a number between 13 and 120")),
    }
}

pub fn return_email(value: &str) -> RuleResult {
    let value = value.trim();
    if value.is_empty() || !LOOSE_EMAIL_RE.is_match(value) { return Err(fail("email", "Enter a valid email")); }
    Ok(())
}

pub fn return_qty(value: &str) -> RuleResult {
    match value.trim().parse::<u32>() {
        Ok(qty) if qty >= 1 => Ok(()),
        _ => Err(fail("qty", "Qty must be 1 or more")),
    }
}
