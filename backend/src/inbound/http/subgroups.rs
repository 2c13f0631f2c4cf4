//! Subgroup listing handler.
//!
//! ```text
//! GET /api/v1/market-subgroups?marketCode=GB
//! ```

use actix_web::{get, web};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::domain::SubGroupListing;
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::{ErrorSchema, SubGroupListingSchema};
use crate::inbound::http::state::HttpState;

/// Optional market filter for the subgroup listing.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query, rename_all = "camelCase")]
pub struct SubGroupListQuery {
    /// Market code, matched ignoring case. Blank lists every market.
    pub market_code: Option<String>,
}

/// List subgroups with their owning market code.
///
/// Numeric subgroup codes sort before alphabetic ones; ties break on the
/// market code.
#[utoipa::path(
    get,
    path = "/api/v1/market-subgroups",
    params(SubGroupListQuery),
    responses(
        (status = 200, description = "Subgroups", body = [SubGroupListingSchema]),
        (status = 503, description = "Store unavailable", body = ErrorSchema)
    ),
    tags = ["markets"],
    operation_id = "listMarketSubGroups"
)]
#[get("/market-subgroups")]
pub async fn list_sub_groups(
    state: web::Data<HttpState>,
    query: web::Query<SubGroupListQuery>,
) -> ApiResult<web::Json<Vec<SubGroupListing>>> {
    let rows = state
        .markets_query
        .list_sub_groups(query.into_inner().market_code)
        .await?;
    Ok(web::Json(rows))
}
