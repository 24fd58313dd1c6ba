//! Route handlers and shared application state.

pub mod customers;
pub mod health;
pub mod metrics;
pub mod orders;
pub mod products;

use domain::{CustomerOnboarding, OrderPlacement};
use stores::{CustomerStore, OrderStore, ProductStore};

/// Shared application state accessible from all handlers.
pub struct AppState<C, P, O>
where
    C: CustomerStore,
    P: ProductStore,
    O: OrderStore,
{
    pub onboarding: CustomerOnboarding<C>,
    pub placement: OrderPlacement<C, P, O>,
    pub products: P,
    pub orders: O,
}
