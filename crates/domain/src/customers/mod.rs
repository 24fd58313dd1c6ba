//! Customer onboarding.

use stores::{Customer, CustomerStore, NewCustomer, StoreError};
use thiserror::Error;

/// Errors that can occur while registering a customer.
#[derive(Debug, Error)]
pub enum OnboardingError {
    /// Name or email was empty or absent.
    #[error("name and email cannot be empty")]
    EmptyNameOrEmail,

    /// A customer already holds this email address.
    #[error("a customer with email {email} already exists")]
    EmailTaken { email: String },

    /// The store failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Registers new customers, enforcing required fields and email
/// uniqueness before anything is written.
pub struct CustomerOnboarding<C> {
    customers: C,
}

impl<C: CustomerStore> CustomerOnboarding<C> {
    /// Creates the service over the given customer store.
    pub fn new(customers: C) -> Self {
        Self { customers }
    }

    /// Registers a customer.
    ///
    /// Exactly one store write happens on success; every failure path
    /// leaves the store untouched.
    #[tracing::instrument(skip(self))]
    pub async fn register(&self, name: &str, email: &str) -> Result<Customer, OnboardingError> {
        if name.is_empty() || email.is_empty() {
            return Err(OnboardingError::EmptyNameOrEmail);
        }

        if self.customers.find_by_email(email).await?.is_some() {
            return Err(OnboardingError::EmailTaken {
                email: email.to_string(),
            });
        }

        let customer = self
            .customers
            .create(NewCustomer {
                name: name.to_string(),
                email: email.to_string(),
            })
            .await?;

        metrics::counter!("customers_registered_total").increment(1);
        Ok(customer)
    }
}
