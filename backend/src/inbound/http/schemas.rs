//! OpenAPI schema definitions for domain types.
//!
//! Domain types remain framework-agnostic by not deriving `ToSchema`. This
//! module provides the schema definitions required for OpenAPI documentation
//! using utoipa's external schema registration.
//!
//! The schema wrappers mirror the serialised shape of their domain types but
//! live in the inbound adapter layer where framework concerns belong.

use utoipa::ToSchema;

/// OpenAPI schema for [`crate::domain::ErrorCode`].
///
/// Stable machine-readable error codes returned in API error responses.
#[derive(ToSchema)]
#[schema(as = crate::domain::ErrorCode)]
pub enum ErrorCodeSchema {
    /// The request is malformed or fails validation.
    #[schema(rename = "invalid_request")]
    InvalidRequest,
    /// The requested resource does not exist.
    #[schema(rename = "not_found")]
    NotFound,
    /// The request collides with existing state.
    #[schema(rename = "conflict")]
    Conflict,
    /// The store is unreachable or the request was cancelled.
    #[schema(rename = "service_unavailable")]
    ServiceUnavailable,
    /// An unexpected error occurred on the server.
    #[schema(rename = "internal_error")]
    InternalError,
}

/// OpenAPI schema for [`crate::domain::Error`].
///
/// Validation failures list offending fields under `details.fieldErrors`;
/// uniqueness conflicts name the clashing field under `details.field`.
#[derive(ToSchema)]
#[schema(as = crate::domain::Error)]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct ErrorSchema {
    /// Stable machine-readable error code.
    #[schema(example = "invalid_request")]
    code: ErrorCodeSchema,
    /// Human-readable message returned to clients.
    #[schema(example = "request failed validation")]
    message: String,
    /// Correlation identifier for tracing this error across systems.
    #[schema(rename = "traceId", example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    trace_id: Option<String>,
    /// Supplementary error details for clients.
    details: Option<serde_json::Value>,
}

/// OpenAPI schema for [`crate::domain::FieldError`].
#[derive(ToSchema)]
#[schema(as = crate::domain::FieldError)]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct FieldErrorSchema {
    /// Request field path, for example `subGroups[1].subGroupCode`.
    #[schema(example = "code")]
    field: String,
    #[schema(example = "market code must be exactly 2 characters")]
    message: String,
}

/// OpenAPI schema for [`crate::domain::Region`].
#[derive(ToSchema)]
#[schema(as = crate::domain::Region)]
pub enum RegionSchema {
    #[schema(rename = "EURO")]
    Euro,
    #[schema(rename = "LAAPA")]
    Laapa,
    #[schema(rename = "NOAM")]
    Noam,
}

/// OpenAPI schema for [`crate::domain::SubRegion`].
#[derive(ToSchema)]
#[schema(as = crate::domain::SubRegion)]
pub enum SubRegionSchema {
    Europe,
    LatinAmerica,
    AsiaPacific,
    Africa,
    America,
    Canada,
}

/// OpenAPI schema for [`crate::domain::MarketSubGroup`].
#[derive(ToSchema)]
#[schema(as = crate::domain::MarketSubGroup, rename_all = "camelCase")]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct MarketSubGroupSchema {
    #[schema(example = 101)]
    id: i64,
    #[schema(example = 1)]
    market_id: i64,
    #[schema(example = "North")]
    sub_group_name: String,
    #[schema(example = "N")]
    sub_group_code: String,
}

/// OpenAPI schema for [`crate::domain::Market`].
///
/// Market aggregate with its subgroups attached.
#[derive(ToSchema)]
#[schema(as = crate::domain::Market, rename_all = "camelCase")]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct MarketSchema {
    #[schema(example = 1)]
    id: i64,
    #[schema(example = "United Kingdom")]
    name: String,
    /// Two alphabetic characters, stored upper-case.
    #[schema(example = "GB")]
    code: String,
    #[schema(example = "E-GB.LN.CE")]
    long_market_code: String,
    region: RegionSchema,
    sub_region: SubRegionSchema,
    sub_groups: Vec<MarketSubGroupSchema>,
    created_at: String,
    updated_at: String,
}

/// OpenAPI schema for [`crate::domain::SubGroupChangeRequest`].
///
/// On create every item not flagged for deletion is added. On update an
/// item without `subGroupId` is added, `requestedDeletion` removes the
/// identified subgroup, `requestedEdit` rewrites it and an identified item
/// with neither flag is left untouched.
#[derive(ToSchema)]
#[schema(as = crate::domain::SubGroupChangeRequest, rename_all = "camelCase")]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct SubGroupChangeSchema {
    sub_group_id: Option<i64>,
    #[schema(example = "North")]
    sub_group_name: Option<String>,
    #[schema(example = "N")]
    sub_group_code: Option<String>,
    #[schema(default = false)]
    requested_deletion: Option<bool>,
    #[schema(default = false)]
    requested_edit: Option<bool>,
}

/// OpenAPI schema for [`crate::domain::SubGroupListing`].
#[derive(ToSchema)]
#[schema(as = crate::domain::SubGroupListing, rename_all = "camelCase")]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct SubGroupListingSchema {
    id: i64,
    market_id: i64,
    #[schema(example = "GB")]
    market_code: String,
    sub_group_name: String,
    sub_group_code: String,
}
