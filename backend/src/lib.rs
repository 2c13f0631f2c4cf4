//! Market reference data backend.
//!
//! Markets own subgroups and sit in a fixed region taxonomy. The domain
//! module keeps every aggregate consistent; inbound and outbound adapters
//! expose it over HTTP and persist it in PostgreSQL.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use middleware::Trace;
