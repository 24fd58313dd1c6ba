//! Customer store trait and in-memory implementation.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::CustomerId;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::{Result, StoreError};

/// A persisted customer record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    /// Store-assigned identifier.
    pub id: CustomerId,
    pub name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

/// Payload for creating a customer. The store assigns the id.
#[derive(Debug, Clone)]
pub struct NewCustomer {
    pub name: String,
    pub email: String,
}

/// Operations the domain services need from customer storage.
#[async_trait]
pub trait CustomerStore: Send + Sync {
    /// Looks up a customer by id.
    async fn find_by_id(&self, id: CustomerId) -> Result<Option<Customer>>;

    /// Looks up a customer by email address.
    async fn find_by_email(&self, email: &str) -> Result<Option<Customer>>;

    /// Persists a new customer and returns the stored record.
    async fn create(&self, new: NewCustomer) -> Result<Customer>;
}

/// In-memory customer store.
///
/// Enforces email uniqueness the way a database unique index would, in
/// addition to the domain-level duplicate check.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCustomerStore {
    customers: Arc<RwLock<HashMap<CustomerId, Customer>>>,
}

impl InMemoryCustomerStore {
    /// Creates a new empty customer store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored customers.
    pub async fn customer_count(&self) -> usize {
        self.customers.read().await.len()
    }
}

#[async_trait]
impl CustomerStore for InMemoryCustomerStore {
    async fn find_by_id(&self, id: CustomerId) -> Result<Option<Customer>> {
        Ok(self.customers.read().await.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Customer>> {
        Ok(self
            .customers
            .read()
            .await
            .values()
            .find(|c| c.email == email)
            .cloned())
    }

    async fn create(&self, new: NewCustomer) -> Result<Customer> {
        let mut customers = self.customers.write().await;

        if customers.values().any(|c| c.email == new.email) {
            return Err(StoreError::DuplicateKey(new.email));
        }

        let customer = Customer {
            id: CustomerId::new(),
            name: new.name,
            email: new.email,
            created_at: Utc::now(),
        };
        customers.insert(customer.id, customer.clone());
        Ok(customer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_customer(name: &str, email: &str) -> NewCustomer {
        NewCustomer {
            name: name.to_string(),
            email: email.to_string(),
        }
    }

    #[tokio::test]
    async fn create_assigns_fresh_id() {
        let store = InMemoryCustomerStore::new();

        let a = store
            .create(new_customer("Ada", "ada@example.com"))
            .await
            .unwrap();
        let b = store
            .create(new_customer("Grace", "grace@example.com"))
            .await
            .unwrap();

        assert_ne!(a.id, b.id);
        assert_eq!(store.customer_count().await, 2);
    }

    #[tokio::test]
    async fn find_by_id_and_email() {
        let store = InMemoryCustomerStore::new();
        let created = store
            .create(new_customer("Ada", "ada@example.com"))
            .await
            .unwrap();

        let by_id = store.find_by_id(created.id).await.unwrap();
        assert_eq!(by_id, Some(created.clone()));

        let by_email = store.find_by_email("ada@example.com").await.unwrap();
        assert_eq!(by_email, Some(created));

        assert!(store.find_by_id(CustomerId::new()).await.unwrap().is_none());
        assert!(
            store
                .find_by_email("nobody@example.com")
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn duplicate_email_rejected() {
        let store = InMemoryCustomerStore::new();
        store
            .create(new_customer("Ada", "ada@example.com"))
            .await
            .unwrap();

        let result = store.create(new_customer("Imposter", "ada@example.com")).await;

        assert!(matches!(result, Err(StoreError::DuplicateKey(_))));
        assert_eq!(store.customer_count().await, 1);
    }
}
