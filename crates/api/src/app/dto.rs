use serde::{Deserialize, Serialize};

use beerstock_core::{DomainError, DomainResult};
use beerstock_inventory::{BeerId, BeerType, MAX_NAME_LEN, MAX_STOCK_CEILING};

// -------------------------
// Transfer representations
// -------------------------

/// API-facing shape of a beer.
///
/// `id` is absent for a beer that has not been persisted yet; any id sent in a
/// create request is ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BeerDto {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<BeerId>,
    pub name: String,
    pub brand: String,
    pub max: i64,
    pub quantity: i64,
    #[serde(rename = "type")]
    pub beer_type: BeerType,
}

impl BeerDto {
    /// Field-level preconditions checked before the request reaches the service.
    pub fn validate(&self) -> DomainResult<()> {
        check_text("name", &self.name)?;
        check_text("brand", &self.brand)?;

        if !(1..=i64::from(MAX_STOCK_CEILING)).contains(&self.max) {
            return Err(DomainError::validation(format!(
                "max must be between 1 and {MAX_STOCK_CEILING}"
            )));
        }
        if self.quantity < 0 {
            return Err(DomainError::validation("quantity cannot be negative"));
        }
        if self.quantity > self.max {
            return Err(DomainError::validation("quantity cannot exceed max"));
        }
        Ok(())
    }
}

/// Body of an increment/decrement request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuantityDto {
    pub quantity: i64,
}

impl QuantityDto {
    /// Returns the validated delta. Only positivity is checked here; whether the
    /// delta fits the target beer is decided when it is applied.
    pub fn validate(&self) -> DomainResult<u32> {
        if self.quantity < 1 {
            return Err(DomainError::validation("quantity must be positive"));
        }
        u32::try_from(self.quantity).map_err(|_| DomainError::validation("quantity out of range"))
    }
}

fn check_text(field: &str, value: &str) -> DomainResult<()> {
    let len = value.trim().chars().count();
    if len == 0 {
        return Err(DomainError::validation(format!("{field} is required")));
    }
    if len > MAX_NAME_LEN {
        return Err(DomainError::validation(format!(
            "{field} must be at most {MAX_NAME_LEN} characters"
        )));
    }
    Ok(())
}
