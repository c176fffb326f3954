//! Shopper records and the signed-in user

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::validation::ShopperForm;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Shopper {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub age: Option<u32>,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub agreed_to_terms: bool,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Shopper {
    pub fn register(form: &ShopperForm, now: DateTime<Utc>) -> Self {
        Self {
            name: form.shopper_name.trim().to_string(),
            email: form.shopper_email.trim().to_string(),
            phone: form.shopper_phone_number.trim().to_string(),
            age: form.shopper_age.trim().parse().ok(),
            address: form.shopper_address.trim().to_string(),
            agreed_to_terms: form.terms,
            created_at: Some(now),
        }
    }

    /// Case-insensitive substring match on name or email.
    pub fn matches(&self, term: &str) -> bool {
        let term = term.trim().to_lowercase();
        self.name.to_lowercase().contains(&term) || self.email.to_lowercase().contains(&term)
    }
}

/// The signed-in user. `_id` is null when the account was only stored locally.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CurrentUser {
    #[serde(rename = "_id", default)]
    pub id: Option<String>,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
}
