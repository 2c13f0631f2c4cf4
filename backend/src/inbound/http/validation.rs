//! Shared validation helpers for inbound HTTP adapters.
//!
//! Region and sub-region values arrive either as numeric codes or as names.
//! Parse failures are collected as field errors so a single response lists
//! every problem with the taxonomy fields.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;

use crate::domain::{Error, FieldErrors, Region, SubRegion};

/// Newtype wrapper for HTTP field names to provide type safety.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FieldName(&'static str);

impl FieldName {
    pub(crate) const REGION: Self = Self("region");
    pub(crate) const SUB_REGION: Self = Self("subRegion");
    pub(crate) const REGIONS: Self = Self("regions");

    fn as_str(self) -> &'static str {
        self.0
    }
}

/// Region or sub-region given as a numeric code or a name.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, ToSchema)]
#[serde(untagged)]
pub enum TaxonomyInput {
    #[schema(example = 1)]
    Code(i16),
    #[schema(example = "EURO")]
    Name(String),
}

impl TaxonomyInput {
    fn parse<T: FromStr>(&self) -> Option<T> {
        match self {
            Self::Code(code) => code.to_string().parse().ok(),
            Self::Name(name) => name.parse().ok(),
        }
    }

    fn raw(&self) -> String {
        match self {
            Self::Code(code) => code.to_string(),
            Self::Name(name) => name.clone(),
        }
    }
}

fn parse_taxonomy<T: FromStr>(
    value: Option<&TaxonomyInput>,
    field: FieldName,
    label: &str,
    errors: &mut FieldErrors,
) -> Option<T> {
    let Some(value) = value else {
        errors.push(field.as_str(), format!("{label} is required"));
        return None;
    };
    let parsed = value.parse();
    if parsed.is_none() {
        errors.push(field.as_str(), format!("unknown {label}: {}", value.raw()));
    }
    parsed
}

/// Parse the region and sub-region of a market payload together.
///
/// Both fields are checked before returning so a request with two bad
/// values reports both in `errors`.
pub(crate) fn parse_region_pair(
    region: Option<&TaxonomyInput>,
    sub_region: Option<&TaxonomyInput>,
    errors: &mut FieldErrors,
) -> Option<(Region, SubRegion)> {
    let region = parse_taxonomy(region, FieldName::REGION, "region", errors);
    let sub_region = parse_taxonomy(sub_region, FieldName::SUB_REGION, "sub-region", errors);
    region.zip(sub_region)
}

/// Parse a comma-separated list of region names or codes.
///
/// Blank entries are skipped; an unknown entry rejects the whole list.
pub(crate) fn parse_region_list(raw: &str) -> Result<Vec<Region>, Error> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .enumerate()
        .map(|(index, entry)| {
            Region::from_str(entry).map_err(|_| {
                Error::invalid_request(format!("unknown region: {entry}")).with_details(json!({
                    "field": FieldName::REGIONS.as_str(),
                    "index": index,
                    "value": entry,
                }))
            })
        })
        .collect()
}
