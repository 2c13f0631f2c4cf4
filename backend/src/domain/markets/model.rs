//! Market aggregate and subgroup entities.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::taxonomy::{Region, SubRegion};
use super::validation::{LongMarketCode, MarketCode, MarketName, SubGroupCode, SubGroupName};

/// Store-assigned market identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MarketId(i64);

/// Store-assigned subgroup identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubGroupId(i64);

macro_rules! id_newtype {
    ($name:ident) => {
        impl $name {
            pub const fn new(value: i64) -> Self {
                Self(value)
            }

            pub const fn get(self) -> i64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Display::fmt(&self.0, f)
            }
        }

        impl From<$name> for i64 {
            fn from(value: $name) -> Self {
                value.0
            }
        }
    };
}

id_newtype!(MarketId);
id_newtype!(SubGroupId);

/// Persisted subgroup, owned by exactly one market.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketSubGroup {
    pub id: SubGroupId,
    pub market_id: MarketId,
    #[serde(rename = "subGroupName")]
    pub name: SubGroupName,
    #[serde(rename = "subGroupCode")]
    pub code: SubGroupCode,
}

/// Market aggregate as loaded from the store.
///
/// ## Invariants
/// - `sub_region` belongs to `region`.
/// - Subgroup names and codes are unique within the market, ignoring case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Market {
    pub id: MarketId,
    pub name: MarketName,
    pub code: MarketCode,
    pub long_market_code: LongMarketCode,
    pub region: Region,
    pub sub_region: SubRegion,
    pub sub_groups: Vec<MarketSubGroup>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Market {
    /// Subgroup with the given identifier, if this market owns it.
    pub fn sub_group(&self, id: SubGroupId) -> Option<&MarketSubGroup> {
        self.sub_groups.iter().find(|sub| sub.id == id)
    }
}

/// Subgroup awaiting its first write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSubGroup {
    pub name: SubGroupName,
    pub code: SubGroupCode,
}

/// Fully validated market awaiting insertion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMarket {
    pub name: MarketName,
    pub code: MarketCode,
    pub long_market_code: LongMarketCode,
    pub region: Region,
    pub sub_region: SubRegion,
    pub sub_groups: Vec<NewSubGroup>,
}

/// Scalar columns written by an update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarketScalars {
    pub name: MarketName,
    pub code: MarketCode,
    pub long_market_code: LongMarketCode,
    pub region: Region,
    pub sub_region: SubRegion,
}

/// Flat subgroup row returned by subgroup listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubGroupListing {
    pub id: SubGroupId,
    pub market_id: MarketId,
    pub market_code: MarketCode,
    pub sub_group_name: SubGroupName,
    pub sub_group_code: SubGroupCode,
}

/// Order subgroup listings: numeric codes first, then alphabetic codes,
/// each group sorted by code and then by market code.
pub fn sort_sub_group_listings(rows: &mut [SubGroupListing]) {
    rows.sort_by(|a, b| {
        let key = |row: &SubGroupListing| {
            let code = row.sub_group_code.as_ref();
            let alphabetic = !code.chars().all(|c| c.is_ascii_digit());
            (alphabetic, code.to_owned(), row.market_code.as_ref().to_owned(), row.id)
        };
        key(a).cmp(&key(b))
    });
}

/// Caller-supplied change to one subgroup.
///
/// Interpretation depends on the path: on create every item without the
/// deletion flag becomes a new subgroup; on update the identifier and flags
/// select between add, edit, delete and leave untouched.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubGroupChangeRequest {
    #[serde(default)]
    pub sub_group_id: Option<SubGroupId>,
    #[serde(default)]
    pub sub_group_name: String,
    #[serde(default)]
    pub sub_group_code: String,
    #[serde(default)]
    pub requested_deletion: bool,
    #[serde(default)]
    pub requested_edit: bool,
}

impl SubGroupChangeRequest {
    /// New subgroup with no identifier and no flags.
    pub fn add(name: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            sub_group_name: name.into(),
            sub_group_code: code.into(),
            ..Self::default()
        }
    }

    /// Overwrite the name and code of an existing subgroup.
    pub fn edit(id: SubGroupId, name: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            sub_group_id: Some(id),
            sub_group_name: name.into(),
            sub_group_code: code.into(),
            requested_edit: true,
            ..Self::default()
        }
    }

    /// Remove an existing subgroup.
    pub fn delete(id: SubGroupId) -> Self {
        Self {
            sub_group_id: Some(id),
            requested_deletion: true,
            ..Self::default()
        }
    }

    /// Existing subgroup echoed back without changes.
    pub fn keep(sub_group: &MarketSubGroup) -> Self {
        Self {
            sub_group_id: Some(sub_group.id),
            sub_group_name: sub_group.name.to_string(),
            sub_group_code: sub_group.code.to_string(),
            ..Self::default()
        }
    }
}

/// Input to `create_market`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateMarketRequest {
    pub name: String,
    pub code: String,
    pub long_market_code: String,
    pub region: Region,
    pub sub_region: SubRegion,
    pub sub_groups: Vec<SubGroupChangeRequest>,
}

/// Input to `update_market`; `None` scalars keep the stored value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateMarketRequest {
    pub id: MarketId,
    pub name: Option<String>,
    pub code: Option<String>,
    pub long_market_code: Option<String>,
    pub region: Region,
    pub sub_region: SubRegion,
    pub sub_groups: Vec<SubGroupChangeRequest>,
}
