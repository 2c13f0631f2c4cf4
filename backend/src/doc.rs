//! OpenAPI documentation configuration.
//!
//! This module defines the [`ApiDoc`] struct which generates the OpenAPI
//! document for the REST API. It registers:
//!
//! - **Paths**: market, subgroup, taxonomy and health endpoints
//! - **Schemas**: domain type wrappers from
//!   [`crate::inbound::http::schemas`] that describe domain payloads without
//!   coupling domain types to utoipa
//!
//! The generated document is used by Swagger UI (debug builds) and
//! exported via `cargo run --bin openapi-dump` for external tooling.

use utoipa::OpenApi;

use crate::inbound::http::markets::{
    CreatedMarketResponse, ExistsResponse, MarketRequest,
};
use crate::inbound::http::regions::TaxonomyEntry;
use crate::inbound::http::schemas::{
    ErrorCodeSchema, ErrorSchema, FieldErrorSchema, MarketSchema, MarketSubGroupSchema,
    RegionSchema, SubGroupChangeSchema, SubGroupListingSchema, SubRegionSchema,
};
use crate::inbound::http::validation::TaxonomyInput;

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Market reference data API",
        description = "Markets, their subgroups and the region taxonomy."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    paths(
        crate::inbound::http::markets::create_market,
        crate::inbound::http::markets::update_market,
        crate::inbound::http::markets::delete_market,
        crate::inbound::http::markets::get_market,
        crate::inbound::http::markets::list_markets,
        crate::inbound::http::markets::market_name_exists,
        crate::inbound::http::markets::market_code_exists,
        crate::inbound::http::subgroups::list_sub_groups,
        crate::inbound::http::regions::list_regions,
        crate::inbound::http::regions::list_sub_regions,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        ErrorSchema,
        ErrorCodeSchema,
        FieldErrorSchema,
        MarketSchema,
        MarketSubGroupSchema,
        RegionSchema,
        SubRegionSchema,
        SubGroupChangeSchema,
        SubGroupListingSchema,
        MarketRequest,
        CreatedMarketResponse,
        ExistsResponse,
        TaxonomyEntry,
        TaxonomyInput,
    )),
    tags(
        (name = "markets", description = "Market aggregate and subgroup operations"),
        (name = "taxonomy", description = "Fixed region and sub-region lookups"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
