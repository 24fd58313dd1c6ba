//! Product store trait and in-memory implementation.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::{Money, ProductId};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::{Result, StoreError};

/// A persisted product record with its available stock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    /// Current unit price. Order lines copy this value at placement time.
    pub price: Money,
    /// Stock available for allocation to new orders.
    pub quantity: u32,
    pub created_at: DateTime<Utc>,
}

/// Payload for adding a product to the catalog.
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub id: ProductId,
    pub name: String,
    pub price: Money,
    pub quantity: u32,
}

/// One product's share of a bulk stock deduction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StockDeduction {
    pub product_id: ProductId,
    pub quantity: u32,
}

/// Operations the domain services need from product storage.
#[async_trait]
pub trait ProductStore: Send + Sync {
    /// Persists a new product and returns the stored record.
    async fn create(&self, new: NewProduct) -> Result<Product>;

    /// Batch lookup: returns the products whose ids matched, silently
    /// omitting ids the store does not hold. Callers reconcile the
    /// returned set against what they asked for.
    async fn find_all_by_id(&self, ids: &[ProductId]) -> Result<Vec<Product>>;

    /// Conditionally deducts stock for every listed product in one
    /// atomic step. Fails without deducting anything if any product is
    /// missing or any deduction would drive its quantity negative.
    async fn deduct(&self, deductions: &[StockDeduction]) -> Result<()>;
}

/// In-memory product store.
#[derive(Debug, Clone, Default)]
pub struct InMemoryProductStore {
    products: Arc<RwLock<HashMap<ProductId, Product>>>,
}

impl InMemoryProductStore {
    /// Creates a new empty product store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the current stock level for a product, if it exists.
    pub async fn quantity_of(&self, id: &ProductId) -> Option<u32> {
        self.products.read().await.get(id).map(|p| p.quantity)
    }

    /// Returns the number of stored products.
    pub async fn product_count(&self) -> usize {
        self.products.read().await.len()
    }
}

#[async_trait]
impl ProductStore for InMemoryProductStore {
    async fn create(&self, new: NewProduct) -> Result<Product> {
        let mut products = self.products.write().await;

        if products.contains_key(&new.id) {
            return Err(StoreError::DuplicateKey(new.id.to_string()));
        }

        let product = Product {
            id: new.id.clone(),
            name: new.name,
            price: new.price,
            quantity: new.quantity,
            created_at: Utc::now(),
        };
        products.insert(new.id, product.clone());
        Ok(product)
    }

    async fn find_all_by_id(&self, ids: &[ProductId]) -> Result<Vec<Product>> {
        let products = self.products.read().await;
        Ok(ids
            .iter()
            .filter_map(|id| products.get(id).cloned())
            .collect())
    }

    async fn deduct(&self, deductions: &[StockDeduction]) -> Result<()> {
        let mut products = self.products.write().await;

        // A product may appear on several lines; the check has to be
        // against the combined total, not per line.
        let mut totals: Vec<(&ProductId, u32)> = Vec::new();
        for d in deductions {
            match totals.iter_mut().find(|(id, _)| *id == &d.product_id) {
                Some((_, total)) => *total += d.quantity,
                None => totals.push((&d.product_id, d.quantity)),
            }
        }

        // Validate everything under the write lock before touching any
        // quantity, so a failure leaves stock untouched.
        for (id, total) in &totals {
            let product = products
                .get(*id)
                .ok_or_else(|| StoreError::ProductNotFound((*id).clone()))?;
            if product.quantity < *total {
                return Err(StoreError::InsufficientStock {
                    product_id: (*id).clone(),
                    requested: *total,
                    available: product.quantity,
                });
            }
        }

        for (id, total) in totals {
            if let Some(product) = products.get_mut(id) {
                product.quantity -= total;
            }
        }
        Ok(())
    }
}
