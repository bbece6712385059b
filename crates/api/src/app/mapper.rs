//! Conversions between stored beers and their transfer representation.

use beerstock_core::{DomainError, DomainResult};
use beerstock_inventory::{Beer, NewBeer};

use crate::app::dto::BeerDto;

/// Build an unsaved beer from a transfer representation (its `id` is ignored).
pub fn to_model(dto: &BeerDto) -> DomainResult<NewBeer> {
    let max = u32::try_from(dto.max).map_err(|_| DomainError::validation("max out of range"))?;
    let quantity =
        u32::try_from(dto.quantity).map_err(|_| DomainError::validation("quantity out of range"))?;

    NewBeer::new(dto.name.as_str(), dto.brand.as_str(), max, quantity, dto.beer_type)
}

pub fn to_dto(beer: &Beer) -> BeerDto {
    BeerDto {
        id: Some(beer.id()),
        name: beer.name().to_string(),
        brand: beer.brand().to_string(),
        max: i64::from(beer.max()),
        quantity: i64::from(beer.quantity()),
        beer_type: beer.beer_type(),
    }
}

#[cfg(test)]
mod tests {
    use beerstock_inventory::{BeerId, BeerType};

    use super::*;

    #[test]
    fn model_and_dto_carry_the_same_fields() {
        let dto = BeerDto {
            id: None,
            name: "Brahma".to_string(),
            brand: "Ambev".to_string(),
            max: 50,
            quantity: 10,
            beer_type: BeerType::Lager,
        };

        let id = BeerId::generate();
        let beer = to_model(&dto).unwrap().into_beer(id);
        let back = to_dto(&beer);

        assert_eq!(back, BeerDto { id: Some(id), ..dto });
    }

    #[test]
    fn negative_numbers_do_not_map() {
        let dto = BeerDto {
            id: None,
            name: "Brahma".to_string(),
            brand: "Ambev".to_string(),
            max: -1,
            quantity: 0,
            beer_type: BeerType::Lager,
        };
        assert!(matches!(to_model(&dto), Err(DomainError::Validation(_))));
    }
}
