use chrono::Utc;

use super::Storefront;
use crate::domain::aggregates::{Catalog, Product, UpsertOutcome};
use crate::storage::StorageKey;
use crate::validation::{FieldErrors, FormSchema, ProductForm};
use crate::{Result, StorefrontError};

impl Storefront {
    pub(super) async fn catalog(&self) -> Result<Catalog> { Ok(Catalog::new(self.store.load_collection(StorageKey::Products).await?)) }

    async fn save_catalog(&self, catalog: &Catalog) -> Result<()> {
        Ok(self.store.save_collection(StorageKey::Products, catalog.products()).await?)
    }

    pub async fn products(&self) -> Result<Vec<Product>> { Ok(self.catalog().await?.into_products()) }

    pub async fn search_products(&self, term: &str) -> Result<Vec<Product>> {
        Ok(self.catalog().await?.search(term).into_iter().cloned().collect())
    }

    pub async fn product(&self, product_id: &str) -> Result<Product> {
        self.catalog().await?.find(product_id).cloned().ok_or(StorefrontError::NotFound("Product"))
    }

    /// Finds the product to load into the edit form.
    pub async fn lookup_product(&self, term: &str) -> Result<Product> {
        if term.trim().is_empty() {
            return Err(StorefrontError::Validation(FieldErrors::single("term", "Enter a Product ID or description")));
        }
        self.catalog().await?.lookup(term).cloned().ok_or(StorefrontError::NotFound("Product"))
    }

    pub async fn save_product(&self, form: ProductForm) -> Result<(Product, UpsertOutcome)> {
        form.check()?;
        let product = Product::from_form(&form);

        let _guard = self.write().await;
        let mut catalog = self.catalog().await?;
        let outcome = catalog.upsert(product, Utc::now());
        self.save_catalog(&catalog).await?;
        let saved = catalog.find(&form.product_id).cloned().ok_or(StorefrontError::NotFound("Product"))?;
        tracing::info!(product_id = %saved.product_id, ?outcome, "product saved");
        self.sync.publish(catalog.take_events());
        Ok((saved, outcome))
    }

    pub async fn delete_product(&self, product_id: &str) -> Result<Product> {
        let _guard = self.write().await;
        let mut catalog = self.catalog().await?;
        let removed = catalog.remove(product_id)?;
        self.save_catalog(&catalog).await?;
        tracing::info!(product_id = %removed.product_id, "product deleted");
        self.sync.publish(catalog.take_events());
        Ok(removed)
    }

    /// Drops the whole catalog. Local only.
    pub async fn reset_catalog(&self) -> Result<()> {
        let _guard = self.write().await;
        self.store.remove(StorageKey::Products).await?;
        tracing::info!("product catalog reset");
        Ok(())
    }

    /// Stores seed products when the catalog is empty and bulk-syncs them.
    /// Returns how many were stored.
    pub async fn seed_products(&self, products: Vec<Product>) -> Result<usize> {
        let _guard = self.write().await;
        let mut catalog = self.catalog().await?;
        if !catalog.seed(products, Utc::now()) { return Ok(0); }
        self.save_catalog(&catalog).await?;
        tracing::info!(count = catalog.len(), "product catalog seeded");
        self.sync.publish(catalog.take_events());
        Ok(catalog.len())
    }
}
