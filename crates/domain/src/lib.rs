//! Domain services for the order-placement core.
//!
//! Two services, each taking its stores as explicit constructor
//! parameters bound by the store traits:
//! - [`CustomerOnboarding`] — registers customers, enforcing email
//!   uniqueness.
//! - [`OrderPlacement`] — the validation → pricing → persistence →
//!   deduction pipeline.
//!
//! All failures are returned as plain enum values; nothing is retried
//! or logged away inside the services.

pub mod customers;
pub mod orders;

pub use customers::{CustomerOnboarding, OnboardingError};
pub use orders::{OrderPlacement, PlaceOrderError, RequestedLine, StockViolation};
