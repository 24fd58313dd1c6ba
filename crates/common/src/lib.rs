//! Shared types for the order-placement core.
//!
//! Identifier newtypes and a cents-backed money type, used by the store
//! layer and the domain services alike.

mod money;
mod types;

pub use money::Money;
pub use types::{CustomerId, OrderId, ProductId};
