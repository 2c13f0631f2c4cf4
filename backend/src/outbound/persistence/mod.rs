//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! This module provides the market store behind the `MarketRepository`
//! port, backed by PostgreSQL via Diesel with async support through
//! `diesel-async` and `bb8` connection pooling.
//!
//! # Architecture
//!
//! - **Thin adapters**: the repository only translates between Diesel rows
//!   and domain types. Validation and reconciliation live in the domain.
//! - **Internal models**: row structs (`models.rs`) and table definitions
//!   (`schema.rs`) never leave this module.
//! - **Database-enforced uniqueness**: case-insensitive unique indexes back
//!   the domain checks, and violations surface as conflict errors.
//!
//! # Example
//!
//! ```ignore
//! use market_backend::outbound::persistence::{DbPool, DieselMarketRepository, PoolConfig};
//!
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/markets")).await?;
//! let repo = DieselMarketRepository::new(pool);
//! ```

mod diesel_error_mapping;
mod diesel_market_repository;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_market_repository::DieselMarketRepository;
pub use migrations::{migrate_schema, run_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};
