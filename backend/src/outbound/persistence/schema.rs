//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match `backend/migrations` exactly. Regenerate
//! with `diesel print-schema` after changing a migration.

diesel::table! {
    /// Markets. Name and code are unique ignoring case.
    markets (id) {
        id -> Int8,
        name -> Varchar,
        code -> Varchar,
        long_market_code -> Varchar,
        /// Numeric region code (1..=3).
        region -> Int2,
        /// Numeric sub-region code (1..=6).
        sub_region -> Int2,
        created_at -> Timestamptz,
        /// Maintained by the `markets_touch_updated_at` trigger.
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Subgroups, each owned by exactly one market.
    market_sub_groups (id) {
        id -> Int8,
        market_id -> Int8,
        sub_group_name -> Varchar,
        sub_group_code -> Varchar,
    }
}

diesel::joinable!(market_sub_groups -> markets (market_id));
diesel::allow_tables_to_appear_in_same_query!(markets, market_sub_groups);
