//! Store error types.

use common::ProductId;
use thiserror::Error;

/// Errors surfaced by store implementations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A unique constraint was violated (e.g. duplicate customer email).
    #[error("duplicate key: {0}")]
    DuplicateKey(String),

    /// A conditional stock deduction would drive a product's quantity
    /// negative. Nothing is deducted when this is returned.
    #[error("insufficient stock for {product_id}: requested {requested}, available {available}")]
    InsufficientStock {
        product_id: ProductId,
        requested: u32,
        available: u32,
    },

    /// A deduction referenced a product the store does not hold.
    #[error("product not found: {0}")]
    ProductNotFound(ProductId),

    /// Backend failure reported by a store implementation.
    #[error("store backend error: {0}")]
    Backend(String),
}
