//! Inventory store: authoritative product records and stock arithmetic.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use common::{Clock, IdGenerator, ProductId, RandomIds, Sku, SystemClock};
use tokio::sync::RwLock;

use crate::{
    LowStockAlert, NewProduct, Product, ProductFilter, ProductPatch, Result, StoreError,
};

/// Core trait for inventory store implementations.
///
/// All implementations must be thread-safe (Send + Sync). Stock-changing
/// operations append a [`LowStockAlert`] whenever a product's stock crosses
/// down to its threshold — one alert per downward crossing, never per read.
#[async_trait]
pub trait InventoryStore: Send + Sync {
    /// Adds a product, assigning identity and timestamps.
    ///
    /// Fails with `DuplicateSku` if a product with the same SKU exists.
    async fn add_product(&self, input: NewProduct) -> Result<Product>;

    /// Retrieves a product by ID. Returns None if it doesn't exist.
    async fn get_product(&self, id: ProductId) -> Result<Option<Product>>;

    /// Merges the provided fields into the product and bumps `updated_at`.
    async fn update_product(&self, id: ProductId, patch: ProductPatch) -> Result<Product>;

    /// Sets the stock level. Specialization of [`Self::update_product`]
    /// restricted to the stock field.
    async fn set_stock(&self, id: ProductId, stock: u32) -> Result<Product>;

    /// Applies each stock update in order. Missing product ids are skipped,
    /// never fatal to the batch. Returns the products that were updated.
    async fn bulk_set_stock(&self, updates: &[(ProductId, u32)]) -> Result<Vec<Product>>;

    /// Atomically decrements stock by `quantity`.
    ///
    /// Fails with `InsufficientStock` when the decrement would underflow;
    /// stock is left untouched in that case.
    async fn decrement_stock(&self, id: ProductId, quantity: u32) -> Result<Product>;

    /// Adds `quantity` back to stock. Compensation counterpart of
    /// [`Self::decrement_stock`].
    async fn restore_stock(&self, id: ProductId, quantity: u32) -> Result<Product>;

    /// Lists products, optionally filtered.
    async fn list_products(&self, filter: Option<ProductFilter>) -> Result<Vec<Product>>;

    /// Returns the low-stock alert log, oldest first.
    async fn alerts(&self) -> Result<Vec<LowStockAlert>>;
}

/// Returns true if a stock change crossed down to the threshold.
///
/// Evaluated against the post-update threshold so that a patch lowering
/// both stock and threshold is judged consistently.
fn crossed_low_stock(old_stock: u32, new_stock: u32, threshold: u32) -> bool {
    new_stock <= threshold && old_stock > threshold
}

struct InventoryState {
    products: HashMap<ProductId, Product>,
    sku_index: HashMap<Sku, ProductId>,
    alerts: Vec<LowStockAlert>,
}

/// In-memory inventory store.
///
/// All mutations run under a single write lock, so the conditional
/// decrement is atomic with respect to concurrent order creation.
#[derive(Clone)]
pub struct InMemoryInventoryStore {
    state: Arc<RwLock<InventoryState>>,
    clock: Arc<dyn Clock>,
    ids: Arc<dyn IdGenerator>,
}

impl InMemoryInventoryStore {
    /// Creates an empty store with the system clock and random ids.
    pub fn new() -> Self {
        Self::with_sources(Arc::new(SystemClock), Arc::new(RandomIds))
    }

    /// Creates an empty store with injected time and id sources.
    pub fn with_sources(clock: Arc<dyn Clock>, ids: Arc<dyn IdGenerator>) -> Self {
        Self {
            state: Arc::new(RwLock::new(InventoryState {
                products: HashMap::new(),
                sku_index: HashMap::new(),
                alerts: Vec::new(),
            })),
            clock,
            ids,
        }
    }

    /// Returns the number of products stored.
    pub async fn product_count(&self) -> usize {
        self.state.read().await.products.len()
    }

    fn record_alert(state: &mut InventoryState, product: &Product, at: chrono::DateTime<chrono::Utc>) {
        metrics::counter!("low_stock_alerts_total").increment(1);
        tracing::warn!(
            product_id = %product.id,
            stock = product.stock,
            threshold = product.low_stock_threshold,
            "product crossed low-stock threshold"
        );
        state.alerts.push(LowStockAlert {
            product_id: product.id,
            product_name: product.name.clone(),
            stock: product.stock,
            threshold: product.low_stock_threshold,
            at,
        });
    }

    /// Applies a mutation to a product under the write lock, bumping
    /// `updated_at` and recording a low-stock alert on a downward crossing.
    async fn mutate(
        &self,
        id: ProductId,
        f: impl FnOnce(&mut Product) -> Result<()>,
    ) -> Result<Product> {
        let now = self.clock.now();
        let mut state = self.state.write().await;

        let mut product = state
            .products
            .get(&id)
            .cloned()
            .ok_or(StoreError::ProductNotFound(id))?;

        let old_stock = product.stock;
        f(&mut product)?;
        product.updated_at = now;

        if crossed_low_stock(old_stock, product.stock, product.low_stock_threshold) {
            Self::record_alert(&mut state, &product, now);
        }

        state.products.insert(id, product.clone());
        Ok(product)
    }
}

impl Default for InMemoryInventoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl InventoryStore for InMemoryInventoryStore {
    async fn add_product(&self, input: NewProduct) -> Result<Product> {
        let now = self.clock.now();
        let mut state = self.state.write().await;

        if state.sku_index.contains_key(&input.sku) {
            return Err(StoreError::DuplicateSku(input.sku));
        }

        let id = self.ids.product_id();
        let product = Product {
            id,
            sku: input.sku.clone(),
            name: input.name,
            description: input.description,
            price: input.price,
            cost: input.cost,
            stock: input.stock,
            low_stock_threshold: input.low_stock_threshold,
            category: input.category,
            status: input.status,
            images: input.images,
            weight: input.weight,
            dimensions: input.dimensions,
            created_at: now,
            updated_at: now,
        };

        state.sku_index.insert(input.sku, id);
        state.products.insert(id, product.clone());
        Ok(product)
    }

    async fn get_product(&self, id: ProductId) -> Result<Option<Product>> {
        Ok(self.state.read().await.products.get(&id).cloned())
    }

    async fn update_product(&self, id: ProductId, patch: ProductPatch) -> Result<Product> {
        let now = self.clock.now();
        let mut state = self.state.write().await;

        let mut product = state
            .products
            .get(&id)
            .cloned()
            .ok_or(StoreError::ProductNotFound(id))?;

        // The uniqueness index must change in the same critical section as
        // the merge; a second lock acquisition would let a concurrent rename
        // read a stale SKU and leave a dangling index entry.
        if let Some(new_sku) = &patch.sku {
            if product.sku != *new_sku {
                if state.sku_index.contains_key(new_sku) {
                    return Err(StoreError::DuplicateSku(new_sku.clone()));
                }
                state.sku_index.remove(&product.sku);
                state.sku_index.insert(new_sku.clone(), id);
            }
        }

        let old_stock = product.stock;
        patch.apply(&mut product);
        product.updated_at = now;

        if crossed_low_stock(old_stock, product.stock, product.low_stock_threshold) {
            Self::record_alert(&mut state, &product, now);
        }

        state.products.insert(id, product.clone());
        Ok(product)
    }

    async fn set_stock(&self, id: ProductId, stock: u32) -> Result<Product> {
        self.update_product(id, ProductPatch::stock(stock)).await
    }

    async fn bulk_set_stock(&self, updates: &[(ProductId, u32)]) -> Result<Vec<Product>> {
        let mut updated = Vec::new();
        for (id, stock) in updates {
            match self.set_stock(*id, *stock).await {
                Ok(product) => updated.push(product),
                Err(StoreError::ProductNotFound(id)) => {
                    tracing::debug!(product_id = %id, "skipping bulk stock update for unknown product");
                }
                Err(e) => return Err(e),
            }
        }
        Ok(updated)
    }

    async fn decrement_stock(&self, id: ProductId, quantity: u32) -> Result<Product> {
        self.mutate(id, |product| {
            product.stock =
                product
                    .stock
                    .checked_sub(quantity)
                    .ok_or(StoreError::InsufficientStock {
                        product_id: product.id,
                        requested: quantity,
                        available: product.stock,
                    })?;
            Ok(())
        })
        .await
    }

    async fn restore_stock(&self, id: ProductId, quantity: u32) -> Result<Product> {
        self.mutate(id, |product| {
            product.stock = product.stock.saturating_add(quantity);
            Ok(())
        })
        .await
    }

    async fn list_products(&self, filter: Option<ProductFilter>) -> Result<Vec<Product>> {
        let state = self.state.read().await;
        let products = state
            .products
            .values()
            .filter(|p| match filter {
                None => true,
                Some(ProductFilter::Active) => p.status == crate::ProductStatus::Active,
                Some(ProductFilter::LowStock) => p.is_low_stock(),
            })
            .cloned()
            .collect();
        Ok(products)
    }

    async fn alerts(&self) -> Result<Vec<LowStockAlert>> {
        Ok(self.state.read().await.alerts.clone())
    }
}
