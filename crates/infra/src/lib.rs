//! Infrastructure layer: persistence adapters and configuration.

pub mod config;
pub mod repository;

pub use config::{AppConfig, ConfigError, StorageConfig};
pub use repository::{BeerRepository, InMemoryBeerRepository, PostgresBeerRepository, RepositoryError};
