//! Products accepted for trade-in and their internal base prices.

mod import;

pub use import::{CatalogImportError, CatalogImporter};

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::RwLock;

/// Identifier wrapper for catalog products.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ProductId(pub String);

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceCategory {
    Camera,
    Phone,
    Laptop,
    Tablet,
}

impl DeviceCategory {
    pub const fn label(self) -> &'static str {
        match self {
            DeviceCategory::Camera => "camera",
            DeviceCategory::Phone => "phone",
            DeviceCategory::Laptop => "laptop",
            DeviceCategory::Tablet => "tablet",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "camera" | "cameras" | "dslr" => Some(Self::Camera),
            "phone" | "phones" | "mobile" => Some(Self::Phone),
            "laptop" | "laptops" => Some(Self::Laptop),
            "tablet" | "tablets" => Some(Self::Tablet),
            _ => None,
        }
    }
}

/// A tradeable device model.
///
/// `base_price` is the internal valuation baseline fed to the calculator;
/// `display_price` is the marketing figure shown to customers and never priced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub brand: String,
    pub category: DeviceCategory,
    pub base_price: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_price: Option<i64>,
}

/// Product lookup abstraction so the valuation service can be exercised in isolation.
pub trait ProductCatalog: Send + Sync {
    fn fetch(&self, id: &ProductId) -> Result<Option<Product>, CatalogError>;
}

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("catalog unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Default)]
pub struct InMemoryCatalog {
    products: RwLock<HashMap<ProductId, Product>>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_products<I>(products: I) -> Self
    where
        I: IntoIterator<Item = Product>,
    {
        let catalog = Self::new();
        for product in products {
            catalog.upsert(product);
        }
        catalog
    }

    pub fn upsert(&self, product: Product) {
        self.products
            .write()
            .expect("catalog lock poisoned")
            .insert(product.id.clone(), product);
    }

    pub fn len(&self) -> usize {
        self.products.read().expect("catalog lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Products ordered by id, for listings.
    pub fn products(&self) -> Vec<Product> {
        let guard = self.products.read().expect("catalog lock poisoned");
        let mut products: Vec<_> = guard.values().cloned().collect();
        products.sort_by(|a, b| a.id.cmp(&b.id));
        products
    }
}

impl ProductCatalog for InMemoryCatalog {
    fn fetch(&self, id: &ProductId) -> Result<Option<Product>, CatalogError> {
        let guard = self.products.read().expect("catalog lock poisoned");
        Ok(guard.get(id).cloned())
    }
}
