use chrono::Utc;

use super::Storefront;
use crate::domain::aggregates::{CurrentUser, Shopper};
use crate::storage::StorageKey;
use crate::sync::{LoginRequest, RegisterRequest};
use crate::validation::{rules, FieldErrors, FormSchema, LoginForm, ShopperForm, SignupForm};
use crate::{Result, StorefrontError};

impl Storefront {
    /// Creates the account remotely when an API is configured and remembers the user.
    pub async fn signup(&self, form: SignupForm) -> Result<CurrentUser> {
        form.check()?;
        let username = form.username.trim();
        let email = form.email.trim();
        let id = match self.sync.client() {
            Ok(client) => client.register_user(&RegisterRequest { username, email, password: &form.password }).await?.id,
            Err(_) => None,
        };
        let user = CurrentUser { id, username: username.to_string(), email: email.to_string() };

        let _guard = self.write().await;
        self.store.save_document(StorageKey::CurrentUser, &user).await?;
        tracing::info!(username = %user.username, remote = user.id.is_some(), "account created");
        Ok(user)
    }

    pub async fn login(&self, form: LoginForm) -> Result<CurrentUser> {
        form.check()?;
        let client = self.sync.client()?;
        let identifier = form.username_or_email.trim();
        let remote = client.login_user(&LoginRequest { username_or_email: identifier, password: &form.password }).await?;
        let typed_email = rules::is_email(identifier);
        let user = CurrentUser {
            id: remote.id,
            username: remote.username.unwrap_or_else(|| if typed_email { String::new() } else { identifier.to_string() }),
            email: remote.email.unwrap_or_else(|| if typed_email { identifier.to_string() } else { String::new() }),
        };

        let _guard = self.write().await;
        self.store.save_document(StorageKey::CurrentUser, &user).await?;
        tracing::info!(username = %user.username, "logged in");
        Ok(user)
    }

    pub async fn current_user(&self) -> Result<Option<CurrentUser>> { Ok(self.store.load_document(StorageKey::CurrentUser).await?) }

    pub async fn register_shopper(&self, form: ShopperForm) -> Result<Shopper> {
        form.check()?;
        let shopper = Shopper::register(&form, Utc::now());

        let _guard = self.write().await;
        let mut shoppers: Vec<Shopper> = self.store.load_collection(StorageKey::Shoppers).await?;
        shoppers.push(shopper.clone());
        self.store.save_collection(StorageKey::Shoppers, &shoppers).await?;
        tracing::info!(email = %shopper.email, total = shoppers.len(), "shopper registered");
        Ok(shopper)
    }

    pub async fn shoppers(&self) -> Result<Vec<Shopper>> { Ok(self.store.load_collection(StorageKey::Shoppers).await?) }

    pub async fn search_shoppers(&self, term: &str) -> Result<Vec<Shopper>> {
        if term.trim().is_empty() {
            return Err(StorefrontError::Validation(FieldErrors::single("search", "Please enter a search term")));
        }
        Ok(self.shoppers().await?.into_iter().filter(|s| s.matches(term)).collect())
    }
}
