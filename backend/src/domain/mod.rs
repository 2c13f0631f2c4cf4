//! Domain primitives, aggregates and services.
//!
//! Purpose: hold the market aggregate and its consistency rules independent
//! of HTTP and SQL. Adapters reach the domain only through the traits in
//! [`ports`].
//!
//! Public surface:
//! - Error / ErrorCode: transport-agnostic error payload.
//! - TraceId: request correlation identifier.
//! - Market aggregate types, taxonomy and validators (re-exported from
//!   `markets`).
//! - MarketService: implementation of the market driving ports.

pub mod error;
pub mod market_service;
pub mod markets;
pub mod ports;
pub mod trace_id;

pub use self::error::{Error, ErrorCode};
pub use self::market_service::MarketService;
pub use self::markets::*;
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
