//! Customer onboarding endpoint.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use stores::{Customer, CustomerStore, OrderStore, ProductStore};

use crate::error::ApiError;

use super::AppState;

#[derive(Deserialize)]
pub struct RegisterCustomerRequest {
    pub name: String,
    pub email: String,
}

#[derive(Serialize)]
pub struct CustomerResponse {
    pub id: String,
    pub name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

impl From<Customer> for CustomerResponse {
    fn from(customer: Customer) -> Self {
        Self {
            id: customer.id.to_string(),
            name: customer.name,
            email: customer.email,
            created_at: customer.created_at,
        }
    }
}

/// POST /customers — registers a new customer.
#[tracing::instrument(skip(state, req))]
pub async fn create<C, P, O>(
    State(state): State<Arc<AppState<C, P, O>>>,
    Json(req): Json<RegisterCustomerRequest>,
) -> Result<(StatusCode, Json<CustomerResponse>), ApiError>
where
    C: CustomerStore + 'static,
    P: ProductStore + 'static,
    O: OrderStore + 'static,
{
    let customer = state.onboarding.register(&req.name, &req.email).await?;
    Ok((StatusCode::CREATED, Json(customer.into())))
}
