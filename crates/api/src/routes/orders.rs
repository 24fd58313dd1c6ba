//! Order placement and lookup endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use chrono::{DateTime, Utc};
use common::{CustomerId, OrderId, ProductId};
use domain::RequestedLine;
use serde::{Deserialize, Serialize};
use stores::{CustomerStore, Order, OrderStore, ProductStore};

use crate::error::ApiError;

use super::AppState;

#[derive(Deserialize)]
pub struct PlaceOrderRequest {
    pub customer_id: String,
    pub lines: Vec<OrderLineRequest>,
}

#[derive(Deserialize)]
pub struct OrderLineRequest {
    pub product_id: String,
    pub quantity: u32,
}

#[derive(Serialize)]
pub struct OrderResponse {
    pub id: String,
    pub customer_id: String,
    pub lines: Vec<OrderLineResponse>,
    pub total_cents: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Serialize)]
pub struct OrderLineResponse {
    pub product_id: String,
    pub quantity: u32,
    pub price_cents: i64,
}

impl From<Order> for OrderResponse {
    fn from(order: Order) -> Self {
        let total_cents = order.total().cents();
        Self {
            id: order.id.to_string(),
            customer_id: order.customer_id.to_string(),
            lines: order
                .lines
                .into_iter()
                .map(|l| OrderLineResponse {
                    product_id: l.product_id.to_string(),
                    quantity: l.quantity,
                    price_cents: l.price.cents(),
                })
                .collect(),
            total_cents,
            created_at: order.created_at,
        }
    }
}

fn parse_customer_id(raw: &str) -> Result<CustomerId, ApiError> {
    let uuid = uuid::Uuid::parse_str(raw)
        .map_err(|e| ApiError::BadRequest(format!("invalid customer_id: {e}")))?;
    Ok(CustomerId::from_uuid(uuid))
}

/// POST /orders — places an order for a customer.
#[tracing::instrument(skip(state, req))]
pub async fn create<C, P, O>(
    State(state): State<Arc<AppState<C, P, O>>>,
    Json(req): Json<PlaceOrderRequest>,
) -> Result<(StatusCode, Json<OrderResponse>), ApiError>
where
    C: CustomerStore + 'static,
    P: ProductStore + 'static,
    O: OrderStore + 'static,
{
    let customer_id = parse_customer_id(&req.customer_id)?;
    let requested = req
        .lines
        .into_iter()
        .map(|l| RequestedLine {
            product_id: ProductId::new(l.product_id),
            quantity: l.quantity,
        })
        .collect();

    let order = state.placement.place_order(customer_id, requested).await?;
    Ok((StatusCode::CREATED, Json(order.into())))
}

/// GET /orders/{id} — fetches a persisted order.
#[tracing::instrument(skip(state))]
pub async fn get<C, P, O>(
    State(state): State<Arc<AppState<C, P, O>>>,
    Path(id): Path<String>,
) -> Result<Json<OrderResponse>, ApiError>
where
    C: CustomerStore + 'static,
    P: ProductStore + 'static,
    O: OrderStore + 'static,
{
    let uuid = uuid::Uuid::parse_str(&id)
        .map_err(|e| ApiError::BadRequest(format!("invalid order id: {e}")))?;
    let order = state
        .orders
        .find_by_id(OrderId::from_uuid(uuid))
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("order not found: {id}")))?;
    Ok(Json(order.into()))
}
