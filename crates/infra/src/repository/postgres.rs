//! Postgres-backed beer store.
//!
//! ## Error Mapping
//!
//! | SQLx Error | PostgreSQL Error Code | RepositoryError |
//! |------------|----------------------|-----------------|
//! | Database (unique violation) | `23505` | `DuplicateName` (insert/save only) |
//! | Database (other) | Any other | `Database` |
//! | PoolClosed / other | N/A | `Database` |
//!
//! Quantity updates are plain `UPDATE ... WHERE id = $1`; concurrent adjustments
//! of the same row are last-writer-wins.

use std::sync::Arc;

use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use sqlx::Row;
use tracing::instrument;
use uuid::Uuid;

use beerstock_core::EntityId;
use beerstock_inventory::{Beer, BeerId, BeerType, NewBeer};

use super::{BeerRepository, RepositoryError};

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS beers (
    id           UUID PRIMARY KEY,
    name         TEXT NOT NULL UNIQUE,
    brand        TEXT NOT NULL,
    max_quantity INTEGER NOT NULL CHECK (max_quantity > 0),
    quantity     INTEGER NOT NULL CHECK (quantity >= 0 AND quantity <= max_quantity),
    beer_type    TEXT NOT NULL
)
"#;

const SELECT_COLUMNS: &str = "SELECT id, name, brand, max_quantity, quantity, beer_type FROM beers";

/// Postgres-backed beer repository.
///
/// Uses the SQLx connection pool, which is `Send + Sync` and cheap to clone.
#[derive(Debug, Clone)]
pub struct PostgresBeerRepository {
    pool: Arc<PgPool>,
}

impl PostgresBeerRepository {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    /// Open a pool against `database_url`.
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, RepositoryError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await
            .map_err(|e| map_sqlx_error("connect", e))?;
        Ok(Self::new(pool))
    }

    /// Create the `beers` table if it does not exist yet.
    #[instrument(skip(self), err)]
    pub async fn ensure_schema(&self) -> Result<(), RepositoryError> {
        sqlx::query(SCHEMA)
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("ensure_schema", e))?;
        Ok(())
    }
}

#[async_trait]
impl BeerRepository for PostgresBeerRepository {
    #[instrument(skip(self), fields(beer_id = %id), err)]
    async fn find_by_id(&self, id: BeerId) -> Result<Option<Beer>, RepositoryError> {
        let row = sqlx::query(&format!("{SELECT_COLUMNS} WHERE id = $1"))
            .bind(id.0.as_uuid())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_by_id", e))?;

        row.as_ref().map(row_to_beer).transpose()
    }

    #[instrument(skip(self), err)]
    async fn find_by_name(&self, name: &str) -> Result<Option<Beer>, RepositoryError> {
        let row = sqlx::query(&format!("{SELECT_COLUMNS} WHERE name = $1"))
            .bind(name)
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_by_name", e))?;

        row.as_ref().map(row_to_beer).transpose()
    }

    #[instrument(skip(self), err)]
    async fn find_all(&self) -> Result<Vec<Beer>, RepositoryError> {
        let rows = sqlx::query(&format!("{SELECT_COLUMNS} ORDER BY id ASC"))
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_all", e))?;

        rows.iter().map(row_to_beer).collect()
    }

    #[instrument(skip(self, beer), fields(name = %beer.name()), err)]
    async fn insert(&self, beer: NewBeer) -> Result<Beer, RepositoryError> {
        let beer = beer.into_beer(BeerId::generate());

        sqlx::query(
            r#"
            INSERT INTO beers (id, name, brand, max_quantity, quantity, beer_type)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(beer.id().0.as_uuid())
        .bind(beer.name())
        .bind(beer.brand())
        .bind(to_column(beer.max())?)
        .bind(to_column(beer.quantity())?)
        .bind(beer.beer_type().as_str())
        .execute(&*self.pool)
        .await
        .map_err(|e| map_write_error("insert", beer.name(), e))?;

        Ok(beer)
    }

    #[instrument(skip(self, beer), fields(beer_id = %beer.id()), err)]
    async fn save(&self, beer: &Beer) -> Result<Beer, RepositoryError> {
        let result = sqlx::query(
            r#"
            UPDATE beers
            SET name = $2, brand = $3, max_quantity = $4, quantity = $5, beer_type = $6
            WHERE id = $1
            "#,
        )
        .bind(beer.id().0.as_uuid())
        .bind(beer.name())
        .bind(beer.brand())
        .bind(to_column(beer.max())?)
        .bind(to_column(beer.quantity())?)
        .bind(beer.beer_type().as_str())
        .execute(&*self.pool)
        .await
        .map_err(|e| map_write_error("save", beer.name(), e))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::Missing(beer.id()));
        }
        Ok(beer.clone())
    }

    #[instrument(skip(self), fields(beer_id = %id), err)]
    async fn delete_by_id(&self, id: BeerId) -> Result<(), RepositoryError> {
        sqlx::query("DELETE FROM beers WHERE id = $1")
            .bind(id.0.as_uuid())
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete_by_id", e))?;
        Ok(())
    }
}

fn row_to_beer(row: &PgRow) -> Result<Beer, RepositoryError> {
    let corrupt = |e: sqlx::Error| RepositoryError::Corrupt(e.to_string());

    let id: Uuid = row.try_get("id").map_err(corrupt)?;
    let name: String = row.try_get("name").map_err(corrupt)?;
    let brand: String = row.try_get("brand").map_err(corrupt)?;
    let max: i32 = row.try_get("max_quantity").map_err(corrupt)?;
    let quantity: i32 = row.try_get("quantity").map_err(corrupt)?;
    let beer_type: String = row.try_get("beer_type").map_err(corrupt)?;

    let beer_type: BeerType = beer_type
        .parse()
        .map_err(|e| RepositoryError::Corrupt(format!("beer {id}: {e}")))?;

    Beer::restore(
        BeerId::new(EntityId::from_uuid(id)),
        name,
        brand,
        from_column("max_quantity", max)?,
        from_column("quantity", quantity)?,
        beer_type,
    )
    .map_err(|e| RepositoryError::Corrupt(format!("beer {id}: {e}")))
}

fn to_column(value: u32) -> Result<i32, RepositoryError> {
    i32::try_from(value).map_err(|_| RepositoryError::Corrupt(format!("{value} does not fit an INTEGER column")))
}

fn from_column(column: &str, value: i32) -> Result<u32, RepositoryError> {
    u32::try_from(value).map_err(|_| RepositoryError::Corrupt(format!("negative {column}: {value}")))
}

fn map_write_error(operation: &'static str, name: &str, err: sqlx::Error) -> RepositoryError {
    if is_unique_violation(&err) {
        RepositoryError::DuplicateName(name.to_string())
    } else {
        map_sqlx_error(operation, err)
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.code().as_deref() == Some("23505"),
        _ => false,
    }
}

fn map_sqlx_error(operation: &'static str, err: sqlx::Error) -> RepositoryError {
    let message = match err {
        sqlx::Error::Database(db_err) => db_err.message().to_string(),
        sqlx::Error::PoolClosed => "connection pool closed".to_string(),
        other => other.to_string(),
    };
    RepositoryError::Database { operation, message }
}
