use std::collections::BTreeMap;
use std::sync::RwLock;

use async_trait::async_trait;

use beerstock_inventory::{Beer, BeerId, NewBeer};

use super::{BeerRepository, RepositoryError};

/// In-memory beer store for tests/dev.
///
/// Keyed by id; ids are time-ordered so map order is creation order. Names are
/// kept unique the same way the Postgres table's constraint does.
#[derive(Debug, Default)]
pub struct InMemoryBeerRepository {
    inner: RwLock<BTreeMap<BeerId, Beer>>,
}

impl InMemoryBeerRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BeerRepository for InMemoryBeerRepository {
    async fn find_by_id(&self, id: BeerId) -> Result<Option<Beer>, RepositoryError> {
        let map = self.inner.read().map_err(|_| RepositoryError::Poisoned)?;
        Ok(map.get(&id).cloned())
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Beer>, RepositoryError> {
        let map = self.inner.read().map_err(|_| RepositoryError::Poisoned)?;
        Ok(map.values().find(|b| b.name() == name).cloned())
    }

    async fn find_all(&self) -> Result<Vec<Beer>, RepositoryError> {
        let map = self.inner.read().map_err(|_| RepositoryError::Poisoned)?;
        Ok(map.values().cloned().collect())
    }

    async fn insert(&self, beer: NewBeer) -> Result<Beer, RepositoryError> {
        let mut map = self.inner.write().map_err(|_| RepositoryError::Poisoned)?;
        if map.values().any(|b| b.name() == beer.name()) {
            return Err(RepositoryError::DuplicateName(beer.name().to_string()));
        }

        let beer = beer.into_beer(BeerId::generate());
        map.insert(beer.id(), beer.clone());
        Ok(beer)
    }

    async fn save(&self, beer: &Beer) -> Result<Beer, RepositoryError> {
        let mut map = self.inner.write().map_err(|_| RepositoryError::Poisoned)?;
        if map
            .values()
            .any(|b| b.id() != beer.id() && b.name() == beer.name())
        {
            return Err(RepositoryError::DuplicateName(beer.name().to_string()));
        }

        match map.get_mut(&beer.id()) {
            Some(slot) => {
                *slot = beer.clone();
                Ok(beer.clone())
            }
            None => Err(RepositoryError::Missing(beer.id())),
        }
    }

    async fn delete_by_id(&self, id: BeerId) -> Result<(), RepositoryError> {
        let mut map = self.inner.write().map_err(|_| RepositoryError::Poisoned)?;
        map.remove(&id);
        Ok(())
    }
}
