//! HTTP inbound adapter exposing REST endpoints.

pub mod error;
pub mod health;
pub mod markets;
pub mod regions;
pub mod schemas;
pub mod state;
pub mod subgroups;
pub mod validation;

pub use error::ApiResult;

use actix_web::web;

/// Register every `/api/v1` route on `cfg`.
pub fn configure_api(cfg: &mut web::ServiceConfig) {
    cfg.configure(markets::configure)
        .service(subgroups::list_sub_groups)
        .service(regions::list_regions)
        .service(regions::list_sub_regions);
}
