//! Internal Diesel row structs for database operations.
//!
//! These types never leave the persistence layer; the repository converts
//! them to domain types before returning.

use chrono::{DateTime, Utc};
use diesel::prelude::*;

use super::schema::{market_sub_groups, markets};

/// Row struct for reading from the markets table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = markets)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct MarketRow {
    pub id: i64,
    pub name: String,
    pub code: String,
    pub long_market_code: String,
    pub region: i16,
    pub sub_region: i16,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Insertable struct for new markets.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = markets)]
pub(crate) struct NewMarketRow<'a> {
    pub name: &'a str,
    pub code: &'a str,
    pub long_market_code: &'a str,
    pub region: i16,
    pub sub_region: i16,
}

/// Changeset for the scalar columns of an existing market.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = markets)]
pub(crate) struct MarketUpdate<'a> {
    pub name: &'a str,
    pub code: &'a str,
    pub long_market_code: &'a str,
    pub region: i16,
    pub sub_region: i16,
}

/// Row struct for reading from the market_sub_groups table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = market_sub_groups)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct SubGroupRow {
    pub id: i64,
    pub market_id: i64,
    pub sub_group_name: String,
    pub sub_group_code: String,
}

/// Insertable struct for subgroups.
///
/// `id` is set only when a rewritten subgroup is re-inserted under its
/// existing identifier.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = market_sub_groups)]
pub(crate) struct NewSubGroupRow<'a> {
    pub id: Option<i64>,
    pub market_id: i64,
    pub sub_group_name: &'a str,
    pub sub_group_code: &'a str,
}
