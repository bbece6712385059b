//! Beer persistence abstractions.
//!
//! The service layer only sees [`BeerRepository`]; the concrete store is picked
//! at startup (in-memory for dev/tests, Postgres otherwise).

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use beerstock_inventory::{Beer, BeerId, NewBeer};

pub mod in_memory;
pub mod postgres;

pub use in_memory::InMemoryBeerRepository;
pub use postgres::PostgresBeerRepository;

#[derive(Debug, Error)]
pub enum RepositoryError {
    /// The store's uniqueness constraint on `name` rejected a write.
    #[error("a beer named {0} is already stored")]
    DuplicateName(String),

    /// An update targeted a row that no longer exists.
    #[error("beer {0} is not stored")]
    Missing(BeerId),

    /// A stored row could not be turned back into a valid beer.
    #[error("corrupt beer row: {0}")]
    Corrupt(String),

    #[error("database error during {operation}: {message}")]
    Database {
        operation: &'static str,
        message: String,
    },

    #[error("in-memory store lock poisoned")]
    Poisoned,
}

/// Durable record of beers.
///
/// Iteration order of [`BeerRepository::find_all`] is creation order for both
/// bundled stores; callers must not rely on anything stronger.
#[async_trait]
pub trait BeerRepository: Send + Sync {
    async fn find_by_id(&self, id: BeerId) -> Result<Option<Beer>, RepositoryError>;

    /// Exact (case-sensitive) match on name.
    async fn find_by_name(&self, name: &str) -> Result<Option<Beer>, RepositoryError>;

    async fn find_all(&self) -> Result<Vec<Beer>, RepositoryError>;

    /// Persist a new beer and return it with its server-assigned id.
    async fn insert(&self, beer: NewBeer) -> Result<Beer, RepositoryError>;

    /// Overwrite the stored state of an existing beer.
    async fn save(&self, beer: &Beer) -> Result<Beer, RepositoryError>;

    /// Remove a beer. Deleting an absent id is a no-op.
    async fn delete_by_id(&self, id: BeerId) -> Result<(), RepositoryError>;
}

#[async_trait]
impl<S> BeerRepository for Arc<S>
where
    S: BeerRepository + ?Sized,
{
    async fn find_by_id(&self, id: BeerId) -> Result<Option<Beer>, RepositoryError> {
        (**self).find_by_id(id).await
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Beer>, RepositoryError> {
        (**self).find_by_name(name).await
    }

    async fn find_all(&self) -> Result<Vec<Beer>, RepositoryError> {
        (**self).find_all().await
    }

    async fn insert(&self, beer: NewBeer) -> Result<Beer, RepositoryError> {
        (**self).insert(beer).await
    }

    async fn save(&self, beer: &Beer) -> Result<Beer, RepositoryError> {
        (**self).save(beer).await
    }

    async fn delete_by_id(&self, id: BeerId) -> Result<(), RepositoryError> {
        (**self).delete_by_id(id).await
    }
}
