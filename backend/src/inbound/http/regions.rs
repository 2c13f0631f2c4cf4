//! Taxonomy lookup handlers.
//!
//! ```text
//! GET /api/v1/regions
//! GET /api/v1/regions/{region}/subregions
//! ```
//!
//! The taxonomy is compiled in, so these handlers never touch the store.

use actix_web::{get, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{Region, SubRegion, sub_regions_for_name};

/// Numeric code and canonical name of a taxonomy entry.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, ToSchema)]
pub struct TaxonomyEntry {
    #[schema(example = 1)]
    pub id: i16,
    #[schema(example = "EURO")]
    pub name: String,
}

impl From<Region> for TaxonomyEntry {
    fn from(region: Region) -> Self {
        Self {
            id: region.code(),
            name: region.as_str().to_owned(),
        }
    }
}

impl From<SubRegion> for TaxonomyEntry {
    fn from(sub_region: SubRegion) -> Self {
        Self {
            id: sub_region.code(),
            name: sub_region.as_str().to_owned(),
        }
    }
}

/// List every region.
#[utoipa::path(
    get,
    path = "/api/v1/regions",
    responses((status = 200, description = "Regions", body = [TaxonomyEntry])),
    tags = ["taxonomy"],
    operation_id = "listRegions"
)]
#[get("/regions")]
pub async fn list_regions() -> web::Json<Vec<TaxonomyEntry>> {
    web::Json(Region::ALL.into_iter().map(TaxonomyEntry::from).collect())
}

/// List the sub-regions of a region given by name or code.
///
/// An unknown region yields an empty list.
#[utoipa::path(
    get,
    path = "/api/v1/regions/{region}/subregions",
    params(("region" = String, Path, description = "Region name or numeric code")),
    responses((status = 200, description = "Sub-regions", body = [TaxonomyEntry])),
    tags = ["taxonomy"],
    operation_id = "listSubRegions"
)]
#[get("/regions/{region}/subregions")]
pub async fn list_sub_regions(path: web::Path<String>) -> web::Json<Vec<TaxonomyEntry>> {
    let subs = sub_regions_for_name(&path.into_inner());
    web::Json(subs.iter().copied().map(TaxonomyEntry::from).collect())
}
