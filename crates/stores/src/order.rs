//! Order store trait and in-memory implementation.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::{CustomerId, Money, OrderId, ProductId};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::Result;

/// A line item on a persisted order.
///
/// `price` is the unit price copied from the product at placement time.
/// It is never recomputed from the product afterwards, so later price
/// changes leave historical orders alone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLine {
    pub product_id: ProductId,
    pub quantity: u32,
    pub price: Money,
}

/// A persisted order.
///
/// Holds the customer by id (a non-owning reference); the lines belong
/// exclusively to the order, in the same order they were requested.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    /// Store-assigned identifier.
    pub id: OrderId,
    pub customer_id: CustomerId,
    pub lines: Vec<OrderLine>,
    pub created_at: DateTime<Utc>,
}

impl Order {
    /// Returns the order total across all lines.
    pub fn total(&self) -> Money {
        self.lines.iter().map(|l| l.price.multiply(l.quantity)).sum()
    }
}

/// One line of an order creation payload.
#[derive(Debug, Clone)]
pub struct NewOrderLine {
    pub product_id: ProductId,
    pub quantity: u32,
    pub price: Money,
}

/// Payload for creating an order. The store assigns the order id.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub customer_id: CustomerId,
    pub lines: Vec<NewOrderLine>,
}

/// Operations the domain services need from order storage.
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Persists an order with all its lines in one atomic creation and
    /// returns the stored record, including the persisted lines. Callers
    /// use the *returned* lines for any follow-up computation, since a
    /// store may re-key them.
    async fn create(&self, new: NewOrder) -> Result<Order>;

    /// Looks up an order by id.
    async fn find_by_id(&self, id: OrderId) -> Result<Option<Order>>;
}

/// In-memory order store.
#[derive(Debug, Clone, Default)]
pub struct InMemoryOrderStore {
    orders: Arc<RwLock<HashMap<OrderId, Order>>>,
}

impl InMemoryOrderStore {
    /// Creates a new empty order store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored orders.
    pub async fn order_count(&self) -> usize {
        self.orders.read().await.len()
    }
}

#[async_trait]
impl OrderStore for InMemoryOrderStore {
    async fn create(&self, new: NewOrder) -> Result<Order> {
        let order = Order {
            id: OrderId::new(),
            customer_id: new.customer_id,
            lines: new
                .lines
                .into_iter()
                .map(|l| OrderLine {
                    product_id: l.product_id,
                    quantity: l.quantity,
                    price: l.price,
                })
                .collect(),
            created_at: Utc::now(),
        };
        self.orders.write().await.insert(order.id, order.clone());
        Ok(order)
    }

    async fn find_by_id(&self, id: OrderId) -> Result<Option<Order>> {
        Ok(self.orders.read().await.get(&id).cloned())
    }
}
