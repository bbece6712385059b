use core::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use beerstock_core::{DomainError, DomainResult, EntityId};

/// Longest accepted name or brand, in characters.
pub const MAX_NAME_LEN: usize = 200;

/// Highest stock ceiling a beer may be registered with.
pub const MAX_STOCK_CEILING: u32 = 500;

/// Beer identifier (server-assigned).
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BeerId(pub EntityId);

impl BeerId {
    pub fn new(id: EntityId) -> Self {
        Self(id)
    }

    /// Allocate a fresh, time-ordered id.
    pub fn generate() -> Self {
        Self(EntityId::new())
    }
}

impl core::fmt::Display for BeerId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

impl FromStr for BeerId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<EntityId>()
            .map(Self)
            .map_err(|_| DomainError::invalid_id(format!("not a valid beer id: {s}")))
    }
}

/// Beer style category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum BeerType {
    Lager,
    Malzbier,
    Witbier,
    Weiss,
    Ale,
    Ipa,
    Stout,
}

impl BeerType {
    pub const ALL: [BeerType; 7] = [
        BeerType::Lager,
        BeerType::Malzbier,
        BeerType::Witbier,
        BeerType::Weiss,
        BeerType::Ale,
        BeerType::Ipa,
        BeerType::Stout,
    ];

    /// Wire/storage spelling.
    pub fn as_str(&self) -> &'static str {
        match self {
            BeerType::Lager => "LAGER",
            BeerType::Malzbier => "MALZBIER",
            BeerType::Witbier => "WITBIER",
            BeerType::Weiss => "WEISS",
            BeerType::Ale => "ALE",
            BeerType::Ipa => "IPA",
            BeerType::Stout => "STOUT",
        }
    }
}

impl core::fmt::Display for BeerType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BeerType {
    type Err = DomainError;

    /// Accepts exactly the upper-case spelling, the same rule serde applies.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BeerType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| DomainError::validation(format!("unknown beer type: {s}")))
    }
}

/// Raised when an adjustment would push stock outside `0..=max`.
///
/// Both variants carry the stock level *before* the rejected adjustment; the
/// beer itself is left untouched.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StockExceeded {
    #[error(
        "{delta} Beers informed with ID {id} to increment, exceeds the max stock capacity: {max}. Current Amount: {current}"
    )]
    AboveMax {
        id: BeerId,
        delta: u32,
        max: u32,
        current: u32,
    },

    #[error("{delta} Beers informed with ID {id} to decrement, goes below zero. Current Amount: {current}")]
    BelowZero {
        id: BeerId,
        delta: u32,
        max: u32,
        current: u32,
    },
}

impl StockExceeded {
    pub fn id(&self) -> BeerId {
        match self {
            StockExceeded::AboveMax { id, .. } | StockExceeded::BelowZero { id, .. } => *id,
        }
    }

    pub fn delta(&self) -> u32 {
        match self {
            StockExceeded::AboveMax { delta, .. } | StockExceeded::BelowZero { delta, .. } => *delta,
        }
    }

    pub fn current(&self) -> u32 {
        match self {
            StockExceeded::AboveMax { current, .. } | StockExceeded::BelowZero { current, .. } => {
                *current
            }
        }
    }
}

/// A validated beer that has not been assigned an id yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBeer {
    name: String,
    brand: String,
    max: u32,
    quantity: u32,
    beer_type: BeerType,
}

impl NewBeer {
    /// Build a new beer, checking the stock invariant `0 <= quantity <= max`.
    pub fn new(
        name: impl Into<String>,
        brand: impl Into<String>,
        max: u32,
        quantity: u32,
        beer_type: BeerType,
    ) -> DomainResult<Self> {
        let name = required_text("name", name.into())?;
        let brand = required_text("brand", brand.into())?;
        check_stock(max, quantity)?;

        Ok(Self {
            name,
            brand,
            max,
            quantity,
            beer_type,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn brand(&self) -> &str {
        &self.brand
    }

    pub fn max(&self) -> u32 {
        self.max
    }

    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    pub fn beer_type(&self) -> BeerType {
        self.beer_type
    }

    /// Attach the id assigned by the store.
    pub fn into_beer(self, id: BeerId) -> Beer {
        Beer {
            id,
            name: self.name,
            brand: self.brand,
            max: self.max,
            quantity: self.quantity,
            beer_type: self.beer_type,
        }
    }
}

/// Entity: a stock-tracked beer.
///
/// Quantity changes only through [`Beer::increment`] and [`Beer::decrement`],
/// both of which keep `0 <= quantity <= max`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Beer {
    id: BeerId,
    name: String,
    brand: String,
    max: u32,
    quantity: u32,
    beer_type: BeerType,
}

impl Beer {
    /// Rebuild a beer from persisted fields.
    pub fn restore(
        id: BeerId,
        name: impl Into<String>,
        brand: impl Into<String>,
        max: u32,
        quantity: u32,
        beer_type: BeerType,
    ) -> DomainResult<Self> {
        check_stock(max, quantity)?;
        Ok(Self {
            id,
            name: name.into(),
            brand: brand.into(),
            max,
            quantity,
            beer_type,
        })
    }

    pub fn id(&self) -> BeerId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn brand(&self) -> &str {
        &self.brand
    }

    pub fn max(&self) -> u32 {
        self.max
    }

    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    pub fn beer_type(&self) -> BeerType {
        self.beer_type
    }

    /// Add `delta` units. Reaching `max` exactly is allowed.
    pub fn increment(&mut self, delta: u32) -> Result<u32, StockExceeded> {
        let candidate = self
            .quantity
            .checked_add(delta)
            .filter(|candidate| *candidate <= self.max)
            .ok_or(StockExceeded::AboveMax {
                id: self.id,
                delta,
                max: self.max,
                current: self.quantity,
            })?;

        self.quantity = candidate;
        Ok(candidate)
    }

    /// Remove `delta` units. Reaching zero exactly is allowed.
    pub fn decrement(&mut self, delta: u32) -> Result<u32, StockExceeded> {
        let candidate = self
            .quantity
            .checked_sub(delta)
            .ok_or(StockExceeded::BelowZero {
                id: self.id,
                delta,
                max: self.max,
                current: self.quantity,
            })?;

        self.quantity = candidate;
        Ok(candidate)
    }
}

fn required_text(field: &str, value: String) -> DomainResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(DomainError::validation(format!("{field} cannot be empty")));
    }
    if trimmed.chars().count() > MAX_NAME_LEN {
        return Err(DomainError::validation(format!(
            "{field} must be at most {MAX_NAME_LEN} characters"
        )));
    }
    Ok(trimmed.to_string())
}

fn check_stock(max: u32, quantity: u32) -> DomainResult<()> {
    if max == 0 {
        return Err(DomainError::validation("max must be positive"));
    }
    if quantity > max {
        return Err(DomainError::invariant(format!(
            "quantity {quantity} exceeds max {max}"
        )));
    }
    Ok(())
}
