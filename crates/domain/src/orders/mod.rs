//! Order placement.
//!
//! The pipeline runs in a strict sequence: resolve the customer, resolve
//! the requested products in one batch, validate ids and quantities
//! against that snapshot, snapshot prices into lines, persist the order,
//! then deduct stock. Validation never mutates anything; the order
//! creation is the single point of no return.

use std::collections::HashMap;

use common::{CustomerId, ProductId};
use serde::Deserialize;
use stores::{
    CustomerStore, NewOrder, NewOrderLine, Order, OrderStore, Product, ProductStore,
    StockDeduction, StoreError,
};
use thiserror::Error;

/// One requested product/quantity pair, as submitted by the caller.
#[derive(Debug, Clone, Deserialize)]
pub struct RequestedLine {
    pub product_id: ProductId,
    pub quantity: u32,
}

/// One line whose requested quantity exceeded the available stock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StockViolation {
    pub product_id: ProductId,
    /// The quantity the caller asked for.
    pub requested: u32,
    /// The stock available when the request was validated.
    pub available: u32,
}

impl std::fmt::Display for StockViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "the quantity {} is not available for {}",
            self.requested, self.product_id
        )
    }
}

fn join_ids(ids: &[ProductId]) -> String {
    ids.iter()
        .map(ProductId::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

fn join_violations(violations: &[StockViolation]) -> String {
    violations
        .iter()
        .map(StockViolation::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Errors that can occur while placing an order.
#[derive(Debug, Error)]
pub enum PlaceOrderError {
    /// No customer exists with the given id.
    #[error("could not find any customer with the given id {0}")]
    CustomerNotFound(CustomerId),

    /// The request contained no lines at all.
    #[error("an order must contain at least one line")]
    EmptyRequest,

    /// A line requested a quantity of zero.
    #[error("invalid quantity 0 for {0} (must be greater than 0)")]
    ZeroQuantity(ProductId),

    /// None of the requested product ids resolved.
    #[error("could not find any products with the given ids")]
    NoProductsFound,

    /// Some requested product ids did not resolve. Carries every
    /// missing id, in request order.
    #[error("could not find products with ids: {}", join_ids(.0))]
    ProductsMissing(Vec<ProductId>),

    /// Requested quantities exceeded available stock. Carries every
    /// violating line, in request order.
    #[error("{}", join_violations(.0))]
    InsufficientStock(Vec<StockViolation>),

    /// The store failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Places orders against the customer, product, and order stores.
pub struct OrderPlacement<C, P, O> {
    customers: C,
    products: P,
    orders: O,
}

impl<C, P, O> OrderPlacement<C, P, O>
where
    C: CustomerStore,
    P: ProductStore,
    O: OrderStore,
{
    /// Creates the service over the given stores.
    pub fn new(customers: C, products: P, orders: O) -> Self {
        Self {
            customers,
            products,
            orders,
        }
    }

    /// Places an order for a customer.
    ///
    /// On success the returned order's lines carry price snapshots taken
    /// at this call, and each referenced product's stock has been
    /// lowered by exactly the quantities ordered. On any validation
    /// failure no store has been written.
    #[tracing::instrument(skip(self))]
    pub async fn place_order(
        &self,
        customer_id: CustomerId,
        requested: Vec<RequestedLine>,
    ) -> Result<Order, PlaceOrderError> {
        let result = self.run_pipeline(customer_id, requested).await;
        match &result {
            Ok(_) => metrics::counter!("orders_placed_total").increment(1),
            Err(_) => metrics::counter!("orders_rejected_total").increment(1),
        }
        result
    }

    async fn run_pipeline(
        &self,
        customer_id: CustomerId,
        requested: Vec<RequestedLine>,
    ) -> Result<Order, PlaceOrderError> {
        let customer = self
            .customers
            .find_by_id(customer_id)
            .await?
            .ok_or(PlaceOrderError::CustomerNotFound(customer_id))?;

        if requested.is_empty() {
            return Err(PlaceOrderError::EmptyRequest);
        }
        if let Some(line) = requested.iter().find(|l| l.quantity == 0) {
            return Err(PlaceOrderError::ZeroQuantity(line.product_id.clone()));
        }

        let ids: Vec<ProductId> = requested.iter().map(|l| l.product_id.clone()).collect();
        let resolved = self.products.find_all_by_id(&ids).await?;
        if resolved.is_empty() {
            return Err(PlaceOrderError::NoProductsFound);
        }
        let by_id: HashMap<&ProductId, &Product> =
            resolved.iter().map(|p| (&p.id, p)).collect();

        let missing: Vec<ProductId> = requested
            .iter()
            .filter(|l| !by_id.contains_key(&l.product_id))
            .map(|l| l.product_id.clone())
            .collect();
        if !missing.is_empty() {
            return Err(PlaceOrderError::ProductsMissing(missing));
        }

        // Every requested id resolved, so the indexing below cannot miss.
        let violations: Vec<StockViolation> = requested
            .iter()
            .filter_map(|l| {
                let product = by_id[&l.product_id];
                (product.quantity < l.quantity).then(|| StockViolation {
                    product_id: l.product_id.clone(),
                    requested: l.quantity,
                    available: product.quantity,
                })
            })
            .collect();
        if !violations.is_empty() {
            return Err(PlaceOrderError::InsufficientStock(violations));
        }

        // Price snapshots: copied values, deliberately decoupled from any
        // later catalog price change.
        let lines: Vec<NewOrderLine> = requested
            .iter()
            .map(|l| NewOrderLine {
                product_id: l.product_id.clone(),
                quantity: l.quantity,
                price: by_id[&l.product_id].price,
            })
            .collect();

        let order = self
            .orders
            .create(NewOrder {
                customer_id: customer.id,
                lines,
            })
            .await?;

        // Deduct from the persisted lines, not the locally built ones;
        // the store may have re-keyed them. The deduction is conditional
        // at the store, so a concurrent placement that consumed the same
        // stock since the snapshot read fails here instead of overdrawing.
        let deductions: Vec<StockDeduction> = order
            .lines
            .iter()
            .map(|l| StockDeduction {
                product_id: l.product_id.clone(),
                quantity: l.quantity,
            })
            .collect();
        self.products.deduct(&deductions).await?;

        Ok(order)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::Money;
    use stores::{
        InMemoryCustomerStore, InMemoryOrderStore, InMemoryProductStore, NewCustomer, NewProduct,
    };

    struct Fixture {
        service: OrderPlacement<InMemoryCustomerStore, InMemoryProductStore, InMemoryOrderStore>,
        customers: InMemoryCustomerStore,
        products: InMemoryProductStore,
        orders: InMemoryOrderStore,
    }

    async fn fixture() -> (Fixture, CustomerId) {
        let customers = InMemoryCustomerStore::new();
        let products = InMemoryProductStore::new();
        let orders = InMemoryOrderStore::new();

        let customer = customers
            .create(NewCustomer {
                name: "Ada".to_string(),
                email: "ada@example.com".to_string(),
            })
            .await
            .unwrap();

        let service =
            OrderPlacement::new(customers.clone(), products.clone(), orders.clone());
        (
            Fixture {
                service,
                customers,
                products,
                orders,
            },
            customer.id,
        )
    }

    async fn stock(fx: &Fixture, id: &str, price_cents: i64, quantity: u32) {
        fx.products
            .create(NewProduct {
                id: ProductId::new(id),
                name: format!("Product {id}"),
                price: Money::from_cents(price_cents),
                quantity,
            })
            .await
            .unwrap();
    }

    fn line(id: &str, quantity: u32) -> RequestedLine {
        RequestedLine {
            product_id: ProductId::new(id),
            quantity,
        }
    }

    #[tokio::test]
    async fn successful_placement_snapshots_prices_and_deducts_stock() {
        let (fx, customer_id) = fixture().await;
        stock(&fx, "P1", 1000, 5).await;
        stock(&fx, "P2", 250, 10).await;

        let order = fx
            .service
            .place_order(customer_id, vec![line("P1", 2), line("P2", 4)])
            .await
            .unwrap();

        assert_eq!(order.customer_id, customer_id);
        assert_eq!(order.lines.len(), 2);
        assert_eq!(order.lines[0].product_id.as_str(), "P1");
        assert_eq!(order.lines[0].price.cents(), 1000);
        assert_eq!(order.lines[1].price.cents(), 250);
        assert_eq!(order.total().cents(), 2 * 1000 + 4 * 250);

        assert_eq!(fx.products.quantity_of(&ProductId::new("P1")).await, Some(3));
        assert_eq!(fx.products.quantity_of(&ProductId::new("P2")).await, Some(6));
        assert_eq!(fx.orders.order_count().await, 1);
    }

    #[tokio::test]
    async fn unknown_customer_fails_with_zero_writes() {
        let (fx, _) = fixture().await;
        stock(&fx, "P1", 1000, 5).await;

        let result = fx
            .service
            .place_order(CustomerId::new(), vec![line("P1", 1)])
            .await;

        assert!(matches!(result, Err(PlaceOrderError::CustomerNotFound(_))));
        assert_eq!(fx.orders.order_count().await, 0);
        assert_eq!(fx.products.quantity_of(&ProductId::new("P1")).await, Some(5));
    }

    #[tokio::test]
    async fn empty_request_is_rejected() {
        let (fx, customer_id) = fixture().await;

        let result = fx.service.place_order(customer_id, vec![]).await;

        assert!(matches!(result, Err(PlaceOrderError::EmptyRequest)));
        assert_eq!(fx.orders.order_count().await, 0);
    }

    #[tokio::test]
    async fn zero_quantity_line_is_rejected() {
        let (fx, customer_id) = fixture().await;
        stock(&fx, "P1", 1000, 5).await;

        let result = fx
            .service
            .place_order(customer_id, vec![line("P1", 0)])
            .await;

        assert!(matches!(
            result,
            Err(PlaceOrderError::ZeroQuantity(ref id)) if id.as_str() == "P1"
        ));
        assert_eq!(fx.orders.order_count().await, 0);
    }

    #[tokio::test]
    async fn entirely_unknown_products_fail() {
        let (fx, customer_id) = fixture().await;

        let result = fx
            .service
            .place_order(customer_id, vec![line("GHOST", 1)])
            .await;

        assert!(matches!(result, Err(PlaceOrderError::NoProductsFound)));
        assert_eq!(fx.orders.order_count().await, 0);
    }

    #[tokio::test]
    async fn missing_ids_are_all_reported_in_request_order() {
        let (fx, customer_id) = fixture().await;
        stock(&fx, "P1", 1000, 5).await;

        let result = fx
            .service
            .place_order(
                customer_id,
                vec![line("M1", 1), line("P1", 1), line("M2", 1)],
            )
            .await;

        match result {
            Err(PlaceOrderError::ProductsMissing(missing)) => {
                let ids: Vec<&str> = missing.iter().map(ProductId::as_str).collect();
                assert_eq!(ids, vec!["M1", "M2"]);
            }
            other => panic!("expected ProductsMissing, got {other:?}"),
        }
        assert_eq!(fx.orders.order_count().await, 0);
        assert_eq!(fx.products.quantity_of(&ProductId::new("P1")).await, Some(5));
    }

    #[tokio::test]
    async fn missing_ids_message_enumerates_every_id() {
        let (fx, customer_id) = fixture().await;
        stock(&fx, "P1", 1000, 5).await;

        let err = fx
            .service
            .place_order(customer_id, vec![line("M1", 1), line("P1", 1), line("M2", 1)])
            .await
            .unwrap_err();

        assert_eq!(
            err.to_string(),
            "could not find products with ids: M1, M2"
        );
    }

    #[tokio::test]
    async fn insufficient_stock_reports_every_violation_in_request_order() {
        let (fx, customer_id) = fixture().await;
        stock(&fx, "P1", 1000, 3).await;
        stock(&fx, "P2", 500, 1).await;
        stock(&fx, "P3", 500, 10).await;

        let result = fx
            .service
            .place_order(
                customer_id,
                vec![line("P1", 5), line("P3", 2), line("P2", 2)],
            )
            .await;

        match result {
            Err(PlaceOrderError::InsufficientStock(violations)) => {
                assert_eq!(
                    violations,
                    vec![
                        StockViolation {
                            product_id: ProductId::new("P1"),
                            requested: 5,
                            available: 3,
                        },
                        StockViolation {
                            product_id: ProductId::new("P2"),
                            requested: 2,
                            available: 1,
                        },
                    ]
                );
            }
            other => panic!("expected InsufficientStock, got {other:?}"),
        }
        assert_eq!(fx.orders.order_count().await, 0);
        assert_eq!(fx.products.quantity_of(&ProductId::new("P1")).await, Some(3));
        assert_eq!(fx.products.quantity_of(&ProductId::new("P3")).await, Some(10));
    }

    #[tokio::test]
    async fn insufficient_stock_message_names_requested_quantity_and_product() {
        let (fx, customer_id) = fixture().await;
        stock(&fx, "P1", 1000, 3).await;

        let err = fx
            .service
            .place_order(customer_id, vec![line("P1", 5)])
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "the quantity 5 is not available for P1");
    }

    #[tokio::test]
    async fn repeated_product_lines_deduct_their_combined_quantity() {
        let (fx, customer_id) = fixture().await;
        stock(&fx, "P1", 1000, 10).await;

        let order = fx
            .service
            .place_order(customer_id, vec![line("P1", 2), line("P1", 2)])
            .await
            .unwrap();

        assert_eq!(order.lines.len(), 2);
        assert_eq!(fx.products.quantity_of(&ProductId::new("P1")).await, Some(6));
    }

    #[tokio::test]
    async fn repeated_lines_overdrawing_combined_stock_fail_after_persistence() {
        let (fx, customer_id) = fixture().await;
        stock(&fx, "P1", 1000, 4).await;

        // Each line alone passes the snapshot validation; the conditional
        // deduction catches the combined overdraw and leaves stock alone.
        let result = fx
            .service
            .place_order(customer_id, vec![line("P1", 3), line("P1", 3)])
            .await;

        assert!(matches!(
            result,
            Err(PlaceOrderError::Store(StoreError::InsufficientStock { .. }))
        ));
        assert_eq!(fx.products.quantity_of(&ProductId::new("P1")).await, Some(4));
        // The order itself was already persisted; there is no
        // compensating delete in this core.
        assert_eq!(fx.orders.order_count().await, 1);
    }

    #[tokio::test]
    async fn failed_validation_is_repeatable_with_identical_outcome() {
        let (fx, customer_id) = fixture().await;
        stock(&fx, "P1", 1000, 3).await;

        for _ in 0..2 {
            let err = fx
                .service
                .place_order(customer_id, vec![line("P1", 5)])
                .await
                .unwrap_err();
            assert!(matches!(err, PlaceOrderError::InsufficientStock(_)));
        }

        assert_eq!(fx.products.quantity_of(&ProductId::new("P1")).await, Some(3));
        assert_eq!(fx.orders.order_count().await, 0);
        assert_eq!(fx.customers.customer_count().await, 1);
    }
}
