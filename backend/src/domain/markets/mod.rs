//! Market aggregate: entities, taxonomy, validation and reconciliation.
//!
//! Everything here is storage agnostic. The aggregate service in
//! [`crate::domain::market_service`] wires these pieces to the store port.

mod cancellation;
mod error;
mod model;
mod reconciler;
mod taxonomy;
pub(crate) mod uniqueness;
mod validation;

pub use cancellation::Cancellation;
pub use error::{MarketError, UniquenessConflict};
pub use model::{
    CreateMarketRequest, Market, MarketId, MarketScalars, MarketSubGroup, NewMarket, NewSubGroup,
    SubGroupChangeRequest, SubGroupId, SubGroupListing, UpdateMarketRequest,
    sort_sub_group_listings,
};
pub use reconciler::{
    ParsedSubGroupChange, SubGroupPlan, parse_for_create, parse_for_update, reconcile,
};
pub use taxonomy::{
    ParseTaxonomyError, Region, SubRegion, is_valid_sub_region, sub_regions_for_name,
    sub_regions_of,
};
pub use validation::{
    CheckedScalars, FieldError, FieldErrors, LongMarketCode, MARKET_CODE_LEN, MarketCode, MarketName,
    MarketValidationError, NAME_MAX, SubGroupCode, SubGroupName, check_scalars,
    sub_group_field,
};

#[cfg(test)]
pub(crate) mod test_fixtures {
    use chrono::Utc;

    use super::*;

    /// Market with two subgroups ("North"/"N" and "South"/"S").
    pub(crate) fn sample_market(id: i64) -> Market {
        let now = Utc::now();
        let market_id = MarketId::new(id);
        Market {
            id: market_id,
            name: MarketName::new(format!("Market {id}")).expect("valid name"),
            code: MarketCode::new("GB").expect("valid code"),
            long_market_code: LongMarketCode::new("E-GB.LN.CE").expect("valid long code"),
            region: Region::Euro,
            sub_region: SubRegion::Europe,
            sub_groups: vec![
                MarketSubGroup {
                    id: SubGroupId::new(id * 100 + 1),
                    market_id,
                    name: SubGroupName::new("North").expect("valid name"),
                    code: SubGroupCode::new("N").expect("valid code"),
                },
                MarketSubGroup {
                    id: SubGroupId::new(id * 100 + 2),
                    market_id,
                    name: SubGroupName::new("South").expect("valid name"),
                    code: SubGroupCode::new("S").expect("valid code"),
                },
            ],
            created_at: now,
            updated_at: now,
        }
    }
}
