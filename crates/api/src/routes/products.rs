//! Product catalog endpoint.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use chrono::{DateTime, Utc};
use common::{Money, ProductId};
use serde::{Deserialize, Serialize};
use stores::{CustomerStore, NewProduct, OrderStore, Product, ProductStore};

use crate::error::ApiError;

use super::AppState;

#[derive(Deserialize)]
pub struct CreateProductRequest {
    pub id: String,
    pub name: String,
    pub price_cents: i64,
    pub quantity: u32,
}

#[derive(Serialize)]
pub struct ProductResponse {
    pub id: String,
    pub name: String,
    pub price_cents: i64,
    pub quantity: u32,
    pub created_at: DateTime<Utc>,
}

impl From<Product> for ProductResponse {
    fn from(product: Product) -> Self {
        Self {
            id: product.id.to_string(),
            name: product.name,
            price_cents: product.price.cents(),
            quantity: product.quantity,
            created_at: product.created_at,
        }
    }
}

/// POST /products — adds a product with its initial stock.
#[tracing::instrument(skip(state, req))]
pub async fn create<C, P, O>(
    State(state): State<Arc<AppState<C, P, O>>>,
    Json(req): Json<CreateProductRequest>,
) -> Result<(StatusCode, Json<ProductResponse>), ApiError>
where
    C: CustomerStore + 'static,
    P: ProductStore + 'static,
    O: OrderStore + 'static,
{
    let price = Money::from_cents(req.price_cents);
    if price.is_negative() {
        return Err(ApiError::BadRequest(format!(
            "price cannot be negative: {}",
            req.price_cents
        )));
    }

    let product = state
        .products
        .create(NewProduct {
            id: ProductId::new(req.id),
            name: req.name,
            price,
            quantity: req.quantity,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(product.into())))
}
