//! API error types with HTTP response mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use domain::{OnboardingError, PlaceOrderError};
use stores::StoreError;

/// API-level error type that maps to HTTP responses.
#[derive(Debug)]
pub enum ApiError {
    /// Resource not found.
    NotFound(String),
    /// Bad request from the client.
    BadRequest(String),
    /// Customer onboarding failure.
    Onboarding(OnboardingError),
    /// Order placement failure.
    Placement(PlaceOrderError),
    /// Store failure outside a domain service.
    Store(StoreError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Onboarding(err) => onboarding_error_to_response(err),
            ApiError::Placement(err) => placement_error_to_response(err),
            ApiError::Store(err) => store_error_to_response(err),
        };

        let body = serde_json::json!({ "error": message });
        (status, axum::Json(body)).into_response()
    }
}

fn onboarding_error_to_response(err: OnboardingError) -> (StatusCode, String) {
    let status = match &err {
        OnboardingError::EmptyNameOrEmail => StatusCode::BAD_REQUEST,
        OnboardingError::EmailTaken { .. } => StatusCode::CONFLICT,
        OnboardingError::Store(store_err) => return store_error_status(store_err, err.to_string()),
    };
    (status, err.to_string())
}

fn placement_error_to_response(err: PlaceOrderError) -> (StatusCode, String) {
    let status = match &err {
        PlaceOrderError::CustomerNotFound(_) | PlaceOrderError::NoProductsFound => {
            StatusCode::NOT_FOUND
        }
        PlaceOrderError::EmptyRequest
        | PlaceOrderError::ZeroQuantity(_)
        | PlaceOrderError::ProductsMissing(_) => StatusCode::BAD_REQUEST,
        PlaceOrderError::InsufficientStock(_) => StatusCode::CONFLICT,
        PlaceOrderError::Store(store_err) => return store_error_status(store_err, err.to_string()),
    };
    (status, err.to_string())
}

fn store_error_to_response(err: StoreError) -> (StatusCode, String) {
    let message = err.to_string();
    store_error_status(&err, message)
}

fn store_error_status(err: &StoreError, message: String) -> (StatusCode, String) {
    match err {
        StoreError::DuplicateKey(_) | StoreError::InsufficientStock { .. } => {
            (StatusCode::CONFLICT, message)
        }
        StoreError::ProductNotFound(_) => (StatusCode::NOT_FOUND, message),
        StoreError::Backend(_) => {
            tracing::error!(error = %message, "store backend error");
            (StatusCode::INTERNAL_SERVER_ERROR, message)
        }
    }
}

impl From<OnboardingError> for ApiError {
    fn from(err: OnboardingError) -> Self {
        ApiError::Onboarding(err)
    }
}

impl From<PlaceOrderError> for ApiError {
    fn from(err: PlaceOrderError) -> Self {
        ApiError::Placement(err)
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        ApiError::Store(err)
    }
}
