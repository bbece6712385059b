//! Inventory domain module.
//!
//! Business rules for the beer catalog, implemented as deterministic domain
//! logic (no IO, no HTTP, no storage).

pub mod beer;

pub use beer::{Beer, BeerId, BeerType, MAX_NAME_LEN, MAX_STOCK_CEILING, NewBeer, StockExceeded};
