//! Market HTTP handlers.
//!
//! ```text
//! POST   /api/v1/markets
//! GET    /api/v1/markets?search=uk | ?regions=1,3
//! GET    /api/v1/markets/name-exists?name=France
//! GET    /api/v1/markets/code-exists?code=FR
//! GET    /api/v1/markets/{id}
//! PUT    /api/v1/markets/{id}
//! DELETE /api/v1/markets/{id}
//! ```
//!
//! Handlers only translate payloads; validation, reconciliation and
//! uniqueness checks live in the market service. A payload whose taxonomy
//! cannot be parsed never reaches the service, so its remaining fields are
//! run through the same domain validators to report everything at once.

use actix_web::{HttpResponse, delete, get, post, put, web};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::{
    CreateMarketRequest, FieldErrors, Market, MarketError, MarketId, SubGroupChangeRequest,
    UpdateMarketRequest, check_scalars, parse_for_create, parse_for_update,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::{ErrorSchema, MarketSchema, SubGroupChangeSchema};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{TaxonomyInput, parse_region_list, parse_region_pair};

/// Request payload for creating or updating a market.
///
/// On update, omitted `name`, `code` and `longMarketCode` keep their stored
/// values. `region` and `subRegion` are always required.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MarketRequest {
    #[schema(example = "United Kingdom")]
    pub name: Option<String>,
    #[schema(example = "GB")]
    pub code: Option<String>,
    #[schema(example = "E-GB.LN.CE")]
    pub long_market_code: Option<String>,
    pub region: Option<TaxonomyInput>,
    pub sub_region: Option<TaxonomyInput>,
    #[serde(default)]
    #[schema(value_type = Vec<SubGroupChangeSchema>)]
    pub sub_groups: Vec<SubGroupChangeRequest>,
}

/// Response payload for a created market.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct CreatedMarketResponse {
    #[schema(example = 1)]
    pub id: i64,
}

/// Response payload for the existence checks.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct ExistsResponse {
    pub exists: bool,
}

/// Optional filters for listing markets. `search` wins over `regions`.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct MarketListQuery {
    /// Case-insensitive text matched against name, code and long code.
    pub search: Option<String>,
    /// Comma-separated region codes or names, for example `1,3`.
    pub regions: Option<String>,
}

/// Query string for `GET /markets/name-exists`.
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct NameQuery {
    #[serde(default)]
    pub name: String,
}

/// Query string for `GET /markets/code-exists`.
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CodeQuery {
    #[serde(default)]
    pub code: String,
}

fn parse_create_request(payload: MarketRequest) -> ApiResult<CreateMarketRequest> {
    let mut taxonomy_errors = FieldErrors::new();
    let taxonomy = parse_region_pair(
        payload.region.as_ref(),
        payload.sub_region.as_ref(),
        &mut taxonomy_errors,
    );
    let name = payload.name.unwrap_or_default();
    let code = payload.code.unwrap_or_default();
    let long_market_code = payload.long_market_code.unwrap_or_default();
    let Some((region, sub_region)) = taxonomy else {
        let mut errors = FieldErrors::new();
        check_scalars(Some(name), Some(code), Some(long_market_code), &mut errors);
        errors.append(taxonomy_errors);
        parse_for_create(&payload.sub_groups, &mut errors);
        return Err(MarketError::FieldValidation(errors.into_inner()).into());
    };
    Ok(CreateMarketRequest {
        name,
        code,
        long_market_code,
        region,
        sub_region,
        sub_groups: payload.sub_groups,
    })
}

fn parse_update_request(id: MarketId, payload: MarketRequest) -> ApiResult<UpdateMarketRequest> {
    let mut taxonomy_errors = FieldErrors::new();
    let taxonomy = parse_region_pair(
        payload.region.as_ref(),
        payload.sub_region.as_ref(),
        &mut taxonomy_errors,
    );
    let Some((region, sub_region)) = taxonomy else {
        let mut errors = FieldErrors::new();
        check_scalars(
            payload.name,
            payload.code,
            payload.long_market_code,
            &mut errors,
        );
        errors.append(taxonomy_errors);
        parse_for_update(&payload.sub_groups, &mut errors);
        return Err(MarketError::FieldValidation(errors.into_inner()).into());
    };
    Ok(UpdateMarketRequest {
        id,
        name: payload.name,
        code: payload.code,
        long_market_code: payload.long_market_code,
        region,
        sub_region,
        sub_groups: payload.sub_groups,
    })
}

/// Create a market together with its subgroups.
#[utoipa::path(
    post,
    path = "/api/v1/markets",
    request_body = MarketRequest,
    responses(
        (status = 201, description = "Market created", body = CreatedMarketResponse),
        (status = 400, description = "Validation or taxonomy failure", body = ErrorSchema),
        (status = 409, description = "Name, code or subgroup already taken", body = ErrorSchema),
        (status = 503, description = "Store unavailable", body = ErrorSchema)
    ),
    tags = ["markets"],
    operation_id = "createMarket"
)]
#[post("/markets")]
pub async fn create_market(
    state: web::Data<HttpState>,
    payload: web::Json<MarketRequest>,
) -> ApiResult<HttpResponse> {
    let request = parse_create_request(payload.into_inner())?;
    let id = state
        .markets
        .create_market(request, &state.cancellation())
        .await?;
    Ok(HttpResponse::Created().json(CreatedMarketResponse { id: id.get() }))
}

/// Update a market's scalars and apply subgroup changes atomically.
#[utoipa::path(
    put,
    path = "/api/v1/markets/{id}",
    params(("id" = i64, Path, description = "Market identifier")),
    request_body = MarketRequest,
    responses(
        (status = 200, description = "Updated market", body = MarketSchema),
        (status = 400, description = "Validation or taxonomy failure", body = ErrorSchema),
        (status = 404, description = "Market not found", body = ErrorSchema),
        (status = 409, description = "Uniqueness conflict", body = ErrorSchema),
        (status = 503, description = "Store unavailable", body = ErrorSchema)
    ),
    tags = ["markets"],
    operation_id = "updateMarket"
)]
#[put("/markets/{id}")]
pub async fn update_market(
    state: web::Data<HttpState>,
    path: web::Path<i64>,
    payload: web::Json<MarketRequest>,
) -> ApiResult<web::Json<Market>> {
    let request = parse_update_request(MarketId::new(path.into_inner()), payload.into_inner())?;
    let market = state
        .markets
        .update_market(request, &state.cancellation())
        .await?;
    Ok(web::Json(market))
}

/// Delete a market that owns no subgroups.
#[utoipa::path(
    delete,
    path = "/api/v1/markets/{id}",
    params(("id" = i64, Path, description = "Market identifier")),
    responses(
        (status = 204, description = "Market deleted"),
        (status = 404, description = "Market not found", body = ErrorSchema),
        (status = 409, description = "Market still owns subgroups", body = ErrorSchema)
    ),
    tags = ["markets"],
    operation_id = "deleteMarket"
)]
#[delete("/markets/{id}")]
pub async fn delete_market(
    state: web::Data<HttpState>,
    path: web::Path<i64>,
) -> ApiResult<HttpResponse> {
    state
        .markets
        .delete_market(MarketId::new(path.into_inner()), &state.cancellation())
        .await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Fetch one market with its subgroups.
#[utoipa::path(
    get,
    path = "/api/v1/markets/{id}",
    params(("id" = i64, Path, description = "Market identifier")),
    responses(
        (status = 200, description = "Market", body = MarketSchema),
        (status = 404, description = "Market not found", body = ErrorSchema)
    ),
    tags = ["markets"],
    operation_id = "getMarket"
)]
#[get("/markets/{id}")]
pub async fn get_market(
    state: web::Data<HttpState>,
    path: web::Path<i64>,
) -> ApiResult<web::Json<Market>> {
    let market = state
        .markets_query
        .get_market(MarketId::new(path.into_inner()))
        .await?;
    Ok(web::Json(market))
}

/// List markets, optionally filtered by text or regions.
#[utoipa::path(
    get,
    path = "/api/v1/markets",
    params(MarketListQuery),
    responses(
        (status = 200, description = "Markets ordered by identifier", body = [MarketSchema]),
        (status = 400, description = "Unknown region in filter", body = ErrorSchema)
    ),
    tags = ["markets"],
    operation_id = "listMarkets"
)]
#[get("/markets")]
pub async fn list_markets(
    state: web::Data<HttpState>,
    query: web::Query<MarketListQuery>,
) -> ApiResult<web::Json<Vec<Market>>> {
    let MarketListQuery { search, regions } = query.into_inner();
    let markets = match (search, regions) {
        (Some(text), _) => state.markets_query.search_markets(&text).await?,
        (None, Some(raw)) => {
            let regions = parse_region_list(&raw)?;
            state.markets_query.filter_markets_by_regions(&regions).await?
        }
        (None, None) => state.markets_query.list_markets().await?,
    };
    Ok(web::Json(markets))
}

/// Report whether a market name is taken, ignoring case.
#[utoipa::path(
    get,
    path = "/api/v1/markets/name-exists",
    params(NameQuery),
    responses((status = 200, description = "Existence flag", body = ExistsResponse)),
    tags = ["markets"],
    operation_id = "marketNameExists"
)]
#[get("/markets/name-exists")]
pub async fn market_name_exists(
    state: web::Data<HttpState>,
    query: web::Query<NameQuery>,
) -> ApiResult<web::Json<ExistsResponse>> {
    let exists = state.markets_query.market_name_exists(&query.name).await?;
    Ok(web::Json(ExistsResponse { exists }))
}

/// Report whether a market code is taken, ignoring case.
#[utoipa::path(
    get,
    path = "/api/v1/markets/code-exists",
    params(CodeQuery),
    responses((status = 200, description = "Existence flag", body = ExistsResponse)),
    tags = ["markets"],
    operation_id = "marketCodeExists"
)]
#[get("/markets/code-exists")]
pub async fn market_code_exists(
    state: web::Data<HttpState>,
    query: web::Query<CodeQuery>,
) -> ApiResult<web::Json<ExistsResponse>> {
    let exists = state.markets_query.market_code_exists(&query.code).await?;
    Ok(web::Json(ExistsResponse { exists }))
}

/// Register market routes. Literal paths precede `{id}` so they are not
/// shadowed.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(market_name_exists)
        .service(market_code_exists)
        .service(list_markets)
        .service(create_market)
        .service(get_market)
        .service(update_market)
        .service(delete_market);
}
