//! Product records and related types.

use chrono::{DateTime, Utc};
use common::{Money, ProductId, Sku};
use serde::{Deserialize, Serialize};

/// Lifecycle status of a product.
///
/// Products are never hard-deleted; retiring a product is a status change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ProductStatus {
    #[default]
    Active,
    Inactive,
    Discontinued,
}

impl ProductStatus {
    /// Returns the status name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            ProductStatus::Active => "active",
            ProductStatus::Inactive => "inactive",
            ProductStatus::Discontinued => "discontinued",
        }
    }
}

impl std::fmt::Display for ProductStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Physical dimensions of a product, in centimeters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct Dimensions {
    pub length: f64,
    pub width: f64,
    pub height: f64,
}

/// A product record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    /// Unique product identifier.
    pub id: ProductId,

    /// Unique human-readable stock-keeping unit.
    pub sku: Sku,

    pub name: String,
    pub description: String,

    /// Unit sale price.
    pub price: Money,

    /// Unit cost.
    pub cost: Money,

    /// Units on hand. Unsigned: stock can never go negative.
    pub stock: u32,

    /// Stock level at or below which a restocking alert is raised.
    pub low_stock_threshold: u32,

    pub category: String,
    pub status: ProductStatus,
    pub images: Vec<String>,

    /// Shipping weight in kilograms.
    pub weight: f64,
    pub dimensions: Dimensions,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Returns true if the product is at or below its low-stock threshold.
    pub fn is_low_stock(&self) -> bool {
        self.stock <= self.low_stock_threshold
    }
}

/// Input for creating a product: everything but identity and timestamps.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewProduct {
    pub sku: Sku,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: Money,
    #[serde(default)]
    pub cost: Money,
    pub stock: u32,
    pub low_stock_threshold: u32,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub status: ProductStatus,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub weight: f64,
    #[serde(default)]
    pub dimensions: Dimensions,
}

/// Partial update for a product; `None` fields are left untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProductPatch {
    pub sku: Option<Sku>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Money>,
    pub cost: Option<Money>,
    pub stock: Option<u32>,
    pub low_stock_threshold: Option<u32>,
    pub category: Option<String>,
    pub status: Option<ProductStatus>,
    pub images: Option<Vec<String>>,
    pub weight: Option<f64>,
    pub dimensions: Option<Dimensions>,
}

impl ProductPatch {
    /// Creates a patch that only changes the stock level.
    pub fn stock(stock: u32) -> Self {
        Self {
            stock: Some(stock),
            ..Self::default()
        }
    }

    /// Applies the provided fields to the product.
    pub fn apply(&self, product: &mut Product) {
        if let Some(sku) = &self.sku {
            product.sku = sku.clone();
        }
        if let Some(name) = &self.name {
            product.name = name.clone();
        }
        if let Some(description) = &self.description {
            product.description = description.clone();
        }
        if let Some(price) = self.price {
            product.price = price;
        }
        if let Some(cost) = self.cost {
            product.cost = cost;
        }
        if let Some(stock) = self.stock {
            product.stock = stock;
        }
        if let Some(threshold) = self.low_stock_threshold {
            product.low_stock_threshold = threshold;
        }
        if let Some(category) = &self.category {
            product.category = category.clone();
        }
        if let Some(status) = self.status {
            product.status = status;
        }
        if let Some(images) = &self.images {
            product.images = images.clone();
        }
        if let Some(weight) = self.weight {
            product.weight = weight;
        }
        if let Some(dimensions) = self.dimensions {
            product.dimensions = dimensions;
        }
    }
}

/// Filter for product listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductFilter {
    /// Only products with `active` status.
    Active,
    /// Only products at or below their low-stock threshold.
    LowStock,
}

/// A restocking alert appended when stock crosses down to its threshold.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LowStockAlert {
    pub product_id: ProductId,
    pub product_name: String,
    pub stock: u32,
    pub threshold: u32,
    pub at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_product() -> Product {
        Product {
            id: ProductId::new(),
            sku: Sku::new("RICE-5KG"),
            name: "Rice 5kg".to_string(),
            description: String::new(),
            price: Money::from_cents(450),
            cost: Money::from_cents(300),
            stock: 80,
            low_stock_threshold: 15,
            category: "grains".to_string(),
            status: ProductStatus::Active,
            images: vec![],
            weight: 5.0,
            dimensions: Dimensions::default(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn patch_applies_only_provided_fields() {
        let mut product = sample_product();
        let patch = ProductPatch {
            name: Some("Premium Rice 5kg".to_string()),
            stock: Some(40),
            ..ProductPatch::default()
        };

        patch.apply(&mut product);

        assert_eq!(product.name, "Premium Rice 5kg");
        assert_eq!(product.stock, 40);
        assert_eq!(product.price.cents(), 450);
        assert_eq!(product.sku.as_str(), "RICE-5KG");
    }

    #[test]
    fn low_stock_at_threshold() {
        let mut product = sample_product();
        assert!(!product.is_low_stock());

        product.stock = 15;
        assert!(product.is_low_stock());

        product.stock = 16;
        assert!(!product.is_low_stock());
    }

    #[test]
    fn product_status_serializes_snake_case() {
        let json = serde_json::to_string(&ProductStatus::Discontinued).unwrap();
        assert_eq!(json, "\"discontinued\"");
    }

    #[test]
    fn new_product_defaults_optional_fields() {
        let json = serde_json::json!({
            "sku": "RICE-5KG",
            "name": "Rice 5kg",
            "price": 450,
            "stock": 80,
            "low_stock_threshold": 15
        });
        let input: NewProduct = serde_json::from_value(json).unwrap();
        assert_eq!(input.status, ProductStatus::Active);
        assert!(input.images.is_empty());
        assert!(input.cost.is_zero());
    }
}
