//! Application services: beer catalog use cases and their wiring.

use std::sync::Arc;

use thiserror::Error;
use tracing::instrument;

use beerstock_core::DomainError;
use beerstock_infra::{
    BeerRepository, InMemoryBeerRepository, PostgresBeerRepository, RepositoryError, StorageConfig,
};
use beerstock_inventory::{Beer, BeerId, StockExceeded};

use crate::app::dto::BeerDto;
use crate::app::mapper;

/// What a failed lookup was looking for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BeerLookup {
    Id(BeerId),
    Name(String),
}

impl core::fmt::Display for BeerLookup {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            BeerLookup::Id(id) => write!(f, "id {id}"),
            BeerLookup::Name(name) => write!(f, "name {name}"),
        }
    }
}

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Beer with name {0} already registered in the system.")]
    AlreadyRegistered(String),

    #[error("Beer with {0} not found in the system.")]
    NotFound(BeerLookup),

    #[error(transparent)]
    StockExceeded(#[from] StockExceeded),

    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Repository(RepositoryError),
}

impl From<RepositoryError> for ServiceError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::DuplicateName(name) => ServiceError::AlreadyRegistered(name),
            RepositoryError::Missing(id) => ServiceError::NotFound(BeerLookup::Id(id)),
            other => ServiceError::Repository(other),
        }
    }
}

/// Beer catalog use cases: uniqueness on create, existence on
/// read/update/delete, bounds on stock adjustment.
///
/// Adjustments are read-modify-write against the repository and are not
/// atomic with respect to concurrent adjustments of the same beer.
#[derive(Clone)]
pub struct BeerService<R> {
    repository: R,
}

impl<R> BeerService<R>
where
    R: BeerRepository,
{
    pub fn new(repository: R) -> Self {
        Self { repository }
    }

    #[instrument(skip(self, dto), fields(name = %dto.name), err)]
    pub async fn create_beer(&self, dto: BeerDto) -> Result<BeerDto, ServiceError> {
        let new_beer = mapper::to_model(&dto)?;

        if self.repository.find_by_name(new_beer.name()).await?.is_some() {
            return Err(ServiceError::AlreadyRegistered(new_beer.name().to_string()));
        }

        let saved = self.repository.insert(new_beer).await?;
        tracing::info!(beer_id = %saved.id(), "beer registered");
        Ok(mapper::to_dto(&saved))
    }

    #[instrument(skip(self), err)]
    pub async fn find_by_name(&self, name: &str) -> Result<BeerDto, ServiceError> {
        let name = name.trim();
        let beer = self
            .repository
            .find_by_name(name)
            .await?
            .ok_or_else(|| ServiceError::NotFound(BeerLookup::Name(name.to_string())))?;
        Ok(mapper::to_dto(&beer))
    }

    #[instrument(skip(self), err)]
    pub async fn list_all(&self) -> Result<Vec<BeerDto>, ServiceError> {
        let beers = self.repository.find_all().await?;
        Ok(beers.iter().map(mapper::to_dto).collect())
    }

    #[instrument(skip(self), fields(beer_id = %id), err)]
    pub async fn delete_by_id(&self, id: BeerId) -> Result<(), ServiceError> {
        self.verify_if_exists(id).await?;
        self.repository.delete_by_id(id).await?;
        tracing::info!("beer deleted");
        Ok(())
    }

    #[instrument(skip(self), fields(beer_id = %id), err)]
    pub async fn increment(&self, id: BeerId, quantity: u32) -> Result<BeerDto, ServiceError> {
        let mut beer = self.verify_if_exists(id).await?;
        let stock = beer.increment(quantity)?;
        let saved = self.repository.save(&beer).await?;
        tracing::info!(stock, "stock incremented");
        Ok(mapper::to_dto(&saved))
    }

    #[instrument(skip(self), fields(beer_id = %id), err)]
    pub async fn decrement(&self, id: BeerId, quantity: u32) -> Result<BeerDto, ServiceError> {
        let mut beer = self.verify_if_exists(id).await?;
        let stock = beer.decrement(quantity)?;
        let saved = self.repository.save(&beer).await?;
        tracing::info!(stock, "stock decremented");
        Ok(mapper::to_dto(&saved))
    }

    async fn verify_if_exists(&self, id: BeerId) -> Result<Beer, ServiceError> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or(ServiceError::NotFound(BeerLookup::Id(id)))
    }
}

/// Services shared by all request handlers.
#[derive(Clone)]
pub struct AppServices {
    beers: BeerService<Arc<dyn BeerRepository>>,
}

impl AppServices {
    pub fn new(repository: Arc<dyn BeerRepository>) -> Self {
        Self {
            beers: BeerService::new(repository),
        }
    }

    /// Services backed by a fresh in-memory store (dev/tests).
    pub fn in_memory() -> Self {
        Self::new(Arc::new(InMemoryBeerRepository::new()))
    }

    pub fn beers(&self) -> &BeerService<Arc<dyn BeerRepository>> {
        &self.beers
    }
}

/// Wire services against the configured store.
pub async fn build_services(storage: &StorageConfig) -> anyhow::Result<AppServices> {
    match storage {
        StorageConfig::InMemory => {
            tracing::info!("using in-memory beer store");
            Ok(AppServices::in_memory())
        }
        StorageConfig::Postgres {
            database_url,
            max_connections,
        } => {
            let repository = PostgresBeerRepository::connect(database_url, *max_connections).await?;
            repository.ensure_schema().await?;
            tracing::info!(max_connections, "using postgres beer store");
            Ok(AppServices::new(Arc::new(repository)))
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use beerstock_inventory::{BeerType, NewBeer};

    use super::*;

    const VALID_INCREMENT_QUANTITY: u32 = 40;
    const INVALID_INCREMENT_QUANTITY: u32 = 41;
    const VALID_DECREMENT_QUANTITY: u32 = 10;
    const INVALID_DECREMENT_QUANTITY: u32 = 11;

    fn beer_dto() -> BeerDto {
        BeerDto {
            id: None,
            name: "Brahma".to_string(),
            brand: "Ambev".to_string(),
            max: 50,
            quantity: 10,
            beer_type: BeerType::Lager,
        }
    }

    /// Wraps the in-memory store and counts deletes.
    #[derive(Default)]
    struct SpyRepository {
        inner: InMemoryBeerRepository,
        deletes: AtomicUsize,
    }

    #[async_trait]
    impl BeerRepository for SpyRepository {
        async fn find_by_id(&self, id: BeerId) -> Result<Option<Beer>, RepositoryError> {
            self.inner.find_by_id(id).await
        }

        async fn find_by_name(&self, name: &str) -> Result<Option<Beer>, RepositoryError> {
            self.inner.find_by_name(name).await
        }

        async fn find_all(&self) -> Result<Vec<Beer>, RepositoryError> {
            self.inner.find_all().await
        }

        async fn insert(&self, beer: NewBeer) -> Result<Beer, RepositoryError> {
            self.inner.insert(beer).await
        }

        async fn save(&self, beer: &Beer) -> Result<Beer, RepositoryError> {
            self.inner.save(beer).await
        }

        async fn delete_by_id(&self, id: BeerId) -> Result<(), RepositoryError> {
            self.deletes.fetch_add(1, Ordering::SeqCst);
            self.inner.delete_by_id(id).await
        }
    }

    /// Store whose every call fails.
    struct BrokenRepository;

    #[async_trait]
    impl BeerRepository for BrokenRepository {
        async fn find_by_id(&self, _id: BeerId) -> Result<Option<Beer>, RepositoryError> {
            Err(broken())
        }

        async fn find_by_name(&self, _name: &str) -> Result<Option<Beer>, RepositoryError> {
            Err(broken())
        }

        async fn find_all(&self) -> Result<Vec<Beer>, RepositoryError> {
            Err(broken())
        }

        async fn insert(&self, _beer: NewBeer) -> Result<Beer, RepositoryError> {
            Err(broken())
        }

        async fn save(&self, _beer: &Beer) -> Result<Beer, RepositoryError> {
            Err(broken())
        }

        async fn delete_by_id(&self, _id: BeerId) -> Result<(), RepositoryError> {
            Err(broken())
        }
    }

    fn broken() -> RepositoryError {
        RepositoryError::Database {
            operation: "test",
            message: "connection refused".to_string(),
        }
    }

    fn service() -> BeerService<Arc<SpyRepository>> {
        BeerService::new(Arc::new(SpyRepository::default()))
    }

    async fn created(service: &BeerService<Arc<SpyRepository>>) -> BeerDto {
        service.create_beer(beer_dto()).await.unwrap()
    }

    #[tokio::test]
    async fn valid_beer_is_created() {
        let service = service();
        let created = created(&service).await;

        assert!(created.id.is_some());
        assert_eq!(BeerDto { id: None, ..created.clone() }, beer_dto());

        let found = service.find_by_name("Brahma").await.unwrap();
        assert_eq!(found, created);
    }

    #[tokio::test]
    async fn already_registered_beer_is_rejected() {
        let service = service();
        created(&service).await;

        let err = service.create_beer(beer_dto()).await.unwrap_err();
        assert!(matches!(err, ServiceError::AlreadyRegistered(ref name) if name == "Brahma"));
        assert_eq!(
            err.to_string(),
            "Beer with name Brahma already registered in the system."
        );
        assert_eq!(service.list_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn create_rejects_quantity_above_max() {
        let service = service();
        let dto = BeerDto {
            quantity: 60,
            ..beer_dto()
        };

        let err = service.create_beer(dto).await.unwrap_err();
        assert!(matches!(err, ServiceError::Domain(_)));
    }

    #[tokio::test]
    async fn non_existing_name_is_not_found() {
        let err = service().find_by_name("Brahma").await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(BeerLookup::Name(ref n)) if n == "Brahma"));
        assert_eq!(err.to_string(), "Beer with name Brahma not found in the system.");
    }

    #[tokio::test]
    async fn list_all_returns_every_beer() {
        let service = service();
        assert!(service.list_all().await.unwrap().is_empty());

        let created = created(&service).await;
        assert_eq!(service.list_all().await.unwrap(), vec![created]);
    }

    #[tokio::test]
    async fn existing_beer_is_deleted() {
        let repo = Arc::new(SpyRepository::default());
        let service = BeerService::new(repo.clone());
        let id = created(&service).await.id.unwrap();

        service.delete_by_id(id).await.unwrap();

        assert_eq!(repo.deletes.load(Ordering::SeqCst), 1);
        assert!(service.list_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn deleting_unknown_id_is_not_found_and_skips_store() {
        let repo = Arc::new(SpyRepository::default());
        let service = BeerService::new(repo.clone());
        let id = BeerId::generate();

        let err = service.delete_by_id(id).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(BeerLookup::Id(missing)) if missing == id));
        assert_eq!(repo.deletes.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn increment_adds_to_existing_quantity() {
        let service = service();
        let id = created(&service).await.id.unwrap();

        let incremented = service.increment(id, VALID_INCREMENT_QUANTITY).await.unwrap();
        assert_eq!(incremented.quantity, 50);
        assert!(incremented.quantity <= incremented.max);
        assert_eq!(service.find_by_name("Brahma").await.unwrap().quantity, 50);
    }

    #[tokio::test]
    async fn increment_is_limited_only_by_max() {
        let service = service();
        let dto = BeerDto { max: 500, quantity: 0, ..beer_dto() };
        let id = service.create_beer(dto).await.unwrap().id.unwrap();

        let incremented = service.increment(id, 150).await.unwrap();
        assert_eq!(incremented.quantity, 150);
        assert_eq!(service.find_by_name("Brahma").await.unwrap().quantity, 150);
    }

    #[tokio::test]
    async fn increment_unknown_id_is_not_found() {
        let err = service()
            .increment(BeerId::generate(), VALID_INCREMENT_QUANTITY)
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(BeerLookup::Id(_))));
    }

    #[tokio::test]
    async fn increment_past_max_is_rejected_and_stock_kept() {
        let service = service();
        let id = created(&service).await.id.unwrap();

        let err = service.increment(id, INVALID_INCREMENT_QUANTITY).await.unwrap_err();
        match err {
            ServiceError::StockExceeded(StockExceeded::AboveMax {
                id: rejected,
                delta,
                max,
                current,
            }) => {
                assert_eq!(rejected, id);
                assert_eq!((delta, max, current), (41, 50, 10));
            }
            other => panic!("expected StockExceeded, got {other:?}"),
        }
        assert_eq!(service.find_by_name("Brahma").await.unwrap().quantity, 10);
    }

    #[tokio::test]
    async fn decrement_subtracts_from_existing_quantity() {
        let service = service();
        let id = created(&service).await.id.unwrap();

        let decremented = service.decrement(id, VALID_DECREMENT_QUANTITY).await.unwrap();
        assert_eq!(decremented.quantity, 0);
    }

    #[tokio::test]
    async fn decrement_unknown_id_is_not_found() {
        let err = service()
            .decrement(BeerId::generate(), VALID_DECREMENT_QUANTITY)
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(BeerLookup::Id(_))));
    }

    #[tokio::test]
    async fn decrement_below_zero_is_rejected_and_stock_kept() {
        let service = service();
        let id = created(&service).await.id.unwrap();

        let err = service.decrement(id, INVALID_DECREMENT_QUANTITY).await.unwrap_err();
        assert!(matches!(
            err,
            ServiceError::StockExceeded(StockExceeded::BelowZero { current: 10, .. })
        ));
        assert_eq!(service.find_by_name("Brahma").await.unwrap().quantity, 10);
    }

    #[tokio::test]
    async fn store_failures_surface_as_repository_errors() {
        let service = BeerService::new(BrokenRepository);

        assert!(matches!(
            service.list_all().await,
            Err(ServiceError::Repository(RepositoryError::Database { .. }))
        ));
        assert!(matches!(
            service.create_beer(beer_dto()).await,
            Err(ServiceError::Repository(_))
        ));
    }

    #[test]
    fn store_duplicate_maps_to_already_registered() {
        let err = ServiceError::from(RepositoryError::DuplicateName("Brahma".into()));
        assert!(matches!(err, ServiceError::AlreadyRegistered(ref n) if n == "Brahma"));
    }
}
