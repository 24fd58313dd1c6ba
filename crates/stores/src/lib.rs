//! Store layer for the order-placement core.
//!
//! Each entity gets a trait describing the operations the domain services
//! depend on, plus an in-memory implementation backed by
//! `Arc<tokio::sync::RwLock<_>>`. A database-backed implementation would
//! slot in behind the same traits.

mod customer;
mod error;
mod order;
mod product;

pub use customer::{Customer, CustomerStore, InMemoryCustomerStore, NewCustomer};
pub use error::StoreError;
pub use order::{InMemoryOrderStore, NewOrder, NewOrderLine, Order, OrderLine, OrderStore};
pub use product::{InMemoryProductStore, NewProduct, Product, ProductStore, StockDeduction};

/// Convenience alias used throughout the store layer.
pub type Result<T> = std::result::Result<T, StoreError>;
