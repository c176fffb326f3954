//! Product documents and the catalog collection

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::domain::events::{DomainEvent, ProductEvent};
use crate::domain::value_objects::{Money, Weight};
use crate::validation::ProductForm;

/// Seed files sometimes carry numeric product ids.
fn id_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    })
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    #[serde(deserialize_with = "id_string")]
    pub product_id: String,
    #[serde(default, alias = "productDesc")]
    pub product_description: String,
    #[serde(default)]
    pub product_category: String,
    #[serde(default)]
    pub product_subcategory: String,
    #[serde(default, alias = "productUOM")]
    pub product_unit: String,
    #[serde(default)]
    pub product_price: Money,
    #[serde(default)]
    pub product_weight: Option<Weight>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Product {
    /// Builds the stored document from a validated form. Timestamps are stamped on upsert.
    pub fn from_form(form: &ProductForm) -> Self {
        let weight = form.product_weight.trim();
        Self {
            product_id: form.product_id.trim().to_string(),
            product_description: form.product_description.trim().to_string(),
            product_category: form.product_category.trim().to_string(),
            product_subcategory: form.product_subcategory.trim().to_string(),
            product_unit: form.product_unit.trim().to_string(),
            product_price: Money::new(form.product_price.trim().parse().unwrap_or(Decimal::ZERO)),
            product_weight: if weight.is_empty() { None } else { weight.parse::<Decimal>().ok().map(Weight::new) },
            created_at: None,
            updated_at: None,
        }
    }

    pub fn weight_or_zero(&self) -> Weight { self.product_weight.unwrap_or_else(Weight::zero) }

    fn matches_id(&self, product_id: &str) -> bool { self.product_id.trim() == product_id.trim() }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UpsertOutcome { Inserted, Updated }

/// The stored product collection, keyed by `productId`.
#[derive(Clone, Debug, Default)]
pub struct Catalog {
    products: Vec<Product>,
    events: Vec<DomainEvent>,
}

impl Catalog {
    pub fn new(products: Vec<Product>) -> Self { Self { products, events: vec![] } }
    pub fn products(&self) -> &[Product] { &self.products }
    pub fn into_products(self) -> Vec<Product> { self.products }
    pub fn len(&self) -> usize { self.products.len() }
    pub fn is_empty(&self) -> bool { self.products.is_empty() }

    pub fn find(&self, product_id: &str) -> Option<&Product> {
        self.products.iter().find(|p| p.matches_id(product_id))
    }

    /// Replaces the product with the same id, keeping its original `createdAt`, or appends it.
    pub fn upsert(&mut self, mut product: Product, now: DateTime<Utc>) -> UpsertOutcome {
        product.updated_at = Some(now);
        if let Some(existing) = self.products.iter_mut().find(|p| p.matches_id(&product.product_id)) {
            product.created_at = Some(existing.created_at.unwrap_or(now));
            *existing = product.clone();
            self.raise_event(DomainEvent::Product(ProductEvent::Updated { product }));
            UpsertOutcome::Updated
        } else {
            product.created_at = Some(now);
            self.products.push(product.clone());
            self.raise_event(DomainEvent::Product(ProductEvent::Created { product }));
            UpsertOutcome::Inserted
        }
    }

    /// Loads seed products into an empty catalog. Returns false and changes nothing
    /// when products already exist.
    pub fn seed(&mut self, products: Vec<Product>, now: DateTime<Utc>) -> bool {
        if !self.products.is_empty() || products.is_empty() { return false; }
        self.products = products
            .into_iter()
            .map(|mut p| {
                p.created_at.get_or_insert(now);
                p.updated_at.get_or_insert(now);
                p
            })
            .collect();
        self.raise_event(DomainEvent::Product(ProductEvent::Seeded { products: self.products.clone() }));
        true
    }

    pub fn remove(&mut self, product_id: &str) -> Result<Product, CatalogError> {
        let index = self.products.iter().position(|p| p.matches_id(product_id)).ok_or(CatalogError::ProductNotFound)?;
        let removed = self.products.remove(index);
        self.raise_event(DomainEvent::Product(ProductEvent::Deleted { product_id: removed.product_id.clone() }));
        Ok(removed)
    }

    pub fn take_events(&mut self) -> Vec<DomainEvent> { std::mem::take(&mut self.events) }
    fn raise_event(&mut self, e: DomainEvent) { self.events.push(e); }

    /// Lookup for the edit form: an all-digit term matches ids exactly, anything else
    /// also matches description substrings. First hit wins.
    pub fn lookup(&self, term: &str) -> Option<&Product> {
        let term = term.trim().to_lowercase();
        if term.is_empty() { return None; }
        let id_only = term.chars().all(|c| c.is_ascii_digit());
        self.products.iter().find(|p| {
            let id_hit = p.product_id.trim().to_lowercase() == term;
            id_hit || (!id_only && p.product_description.to_lowercase().contains(&term))
        })
    }

    /// Shopping search: digits match inside ids, text matches ids or descriptions.
    /// An empty term lists everything.
    pub fn search(&self, term: &str) -> Vec<&Product> {
        let term = term.trim().to_lowercase();
        if term.is_empty() { return self.products.iter().collect(); }
        let id_only = term.chars().all(|c| c.is_ascii_digit());
        self.products
            .iter()
            .filter(|p| {
                let id_hit = p.product_id.trim().to_lowercase().contains(&term);
                id_hit || (!id_only && p.product_description.to_lowercase().contains(&term))
            })
            .collect()
    }
}

pub const CATEGORIES: [(&str, &[&str]); 10] = [
    ("Computers & Accessories", &["Laptops", "Desktops", "Monitors", "Keyboards & Mice", "Docking Stations", "External Storage (HDDs, SSDs)"]),
    ("Mobile Devices", &["Smartphones", "Tablets", "Smartwatches", "Phone Cases & Screen Protectors", "Chargers & Power Banks"]),
    ("Audio & Music", &["Headphones & Earbuds", "Bluetooth Speakers", "Soundbars", "Home Audio Systems", "Microphones"]),
    ("Cameras & Photography", &["Digital Cameras", "Action Cameras (e.g., GoPro)", "Drones", "Camera Lenses", "Tripods & Mounts"]),
    ("Home Entertainment", &["Smart TVs", "Streaming Devices (e.g., Roku, Fire Stick)", "Projectors", "Gaming Consoles"]),
    ("Gaming", &["Consoles (PlayStation, Xbox, Nintendo)", "Gaming PCs", "Controllers & Accessories", "VR Headsets", "Gaming Chairs"]),
    ("Smart Home & IoT", &["Smart Lights", "Smart Thermostats", "Smart Plugs", "Home Security Cameras", "Video Doorbells"]),
    ("Cables & Components", &["HDMI, USB, Ethernet Cables", "Adapters & Converters", "Internal PC Components (RAM, GPUs, CPUs)", "Cooling Systems"]),
    ("Office Tech", &["Printers & Scanners", "Routers & Modems", "Webcams", "Networking Equipment"]),
    ("Tech Lifestyle & Wearables", &["Fitness Trackers", "Smart Glasses", "E-Readers", "Tech Backpacks & Organizers"]),
];

pub fn category_names() -> Vec<&'static str> { CATEGORIES.iter().map(|(name, _)| *name).collect() }

/// Subcategories offered for a category; unknown categories have none.
pub fn subcategories_for(category: &str) -> &'static [&'static str] {
    CATEGORIES.iter().find(|(name, _)| *name == category).map(|(_, subs)| *subs).unwrap_or(&[])
}

#[derive(Debug, Clone, PartialEq, Eq)] pub enum CatalogError { ProductNotFound }
impl std::error::Error for CatalogError {}
impl std::fmt::Display for CatalogError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result { write!(f, "Product not found") }
}
