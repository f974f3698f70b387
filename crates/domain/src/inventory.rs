//! Product catalog operations with read-through caching.

use std::sync::Arc;

use cache::{Cache, keys};
use common::ProductId;
use store::{
    InventoryStore, LowStockAlert, NewProduct, Product, ProductFilter, ProductPatch, StoreError,
};

use crate::cached;
use crate::error::{DomainError, Result};

/// Catalog and stock operations over an [`InventoryStore`].
///
/// List reads go through the cache; every mutation invalidates the product
/// listing keys so the next read repopulates them.
pub struct InventoryService<I, C>
where
    I: InventoryStore,
    C: Cache,
{
    inventory: Arc<I>,
    cache: Arc<C>,
}

impl<I, C> InventoryService<I, C>
where
    I: InventoryStore,
    C: Cache,
{
    pub fn new(inventory: Arc<I>, cache: Arc<C>) -> Self {
        Self { inventory, cache }
    }

    /// Validates and adds a product to the catalog.
    #[tracing::instrument(skip(self, input), fields(sku = %input.sku))]
    pub async fn add_product(&self, input: NewProduct) -> Result<Product> {
        if input.sku.is_empty() {
            return Err(DomainError::Validation("SKU must not be empty".into()));
        }
        if input.name.trim().is_empty() {
            return Err(DomainError::Validation(
                "Product name must not be empty".into(),
            ));
        }
        if input.price.is_negative() || input.cost.is_negative() {
            return Err(DomainError::Validation(
                "Price and cost must not be negative".into(),
            ));
        }

        let product = self.inventory.add_product(input).await?;
        metrics::counter!("products_created_total").increment(1);
        tracing::info!(product_id = %product.id, "product added");

        self.invalidate_product_lists().await;
        Ok(product)
    }

    /// Retrieves a product, failing if it does not exist.
    pub async fn get_product(&self, id: ProductId) -> Result<Product> {
        self.inventory
            .get_product(id)
            .await?
            .ok_or(DomainError::Store(StoreError::ProductNotFound(id)))
    }

    /// Merges the provided fields into a product.
    #[tracing::instrument(skip(self, patch))]
    pub async fn update_product(&self, id: ProductId, patch: ProductPatch) -> Result<Product> {
        if let Some(sku) = &patch.sku {
            if sku.is_empty() {
                return Err(DomainError::Validation("SKU must not be empty".into()));
            }
        }
        if let Some(name) = &patch.name {
            if name.trim().is_empty() {
                return Err(DomainError::Validation(
                    "Product name must not be empty".into(),
                ));
            }
        }

        let product = self.inventory.update_product(id, patch).await?;
        self.invalidate_product_lists().await;
        Ok(product)
    }

    /// Sets a product's stock level.
    #[tracing::instrument(skip(self))]
    pub async fn update_stock(&self, id: ProductId, stock: u32) -> Result<Product> {
        let product = self.inventory.set_stock(id, stock).await?;
        self.invalidate_product_lists().await;
        Ok(product)
    }

    /// Applies a batch of stock updates. Unknown product ids are skipped.
    /// The listing cache is invalidated once for the whole batch.
    #[tracing::instrument(skip(self, updates), fields(batch_size = updates.len()))]
    pub async fn bulk_update_stock(&self, updates: &[(ProductId, u32)]) -> Result<Vec<Product>> {
        let updated = self.inventory.bulk_set_stock(updates).await?;
        tracing::info!(
            requested = updates.len(),
            applied = updated.len(),
            "bulk stock update applied"
        );
        self.invalidate_product_lists().await;
        Ok(updated)
    }

    /// Lists products, serving the unfiltered and active listings from the
    /// cache. The low-stock listing is always computed fresh so it reflects
    /// the latest decrements.
    #[tracing::instrument(skip(self))]
    pub async fn list_products(&self, filter: Option<ProductFilter>) -> Result<Vec<Product>> {
        let cache_slot = match filter {
            None => Some((keys::ALL_PRODUCTS, keys::ALL_PRODUCTS_TTL)),
            Some(ProductFilter::Active) => Some((keys::ACTIVE_PRODUCTS, keys::ACTIVE_PRODUCTS_TTL)),
            Some(ProductFilter::LowStock) => None,
        };

        if let Some((key, _)) = cache_slot {
            if let Some(products) = cached::fetch(self.cache.as_ref(), key).await {
                return Ok(products);
            }
        }

        let products = self.inventory.list_products(filter).await?;
        if let Some((key, ttl)) = cache_slot {
            cached::put(self.cache.as_ref(), key, ttl, &products).await;
        }
        Ok(products)
    }

    /// Returns the low-stock alert log.
    pub async fn alerts(&self) -> Result<Vec<LowStockAlert>> {
        Ok(self.inventory.alerts().await?)
    }

    async fn invalidate_product_lists(&self) {
        cached::invalidate(
            self.cache.as_ref(),
            &[keys::ALL_PRODUCTS, keys::ACTIVE_PRODUCTS],
        )
        .await;
    }
}
