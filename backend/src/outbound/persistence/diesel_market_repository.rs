//! PostgreSQL-backed `MarketRepository` implementation using Diesel ORM.
//!
//! Markets and subgroups live in two tables linked by `market_id`. Reads
//! load market rows first and attach their subgroups with one extra query.
//! Writes run inside a transaction so a market and its subgroup deltas are
//! applied together or not at all.

use std::collections::HashMap;

use async_trait::async_trait;
use diesel::prelude::*;
use diesel::sql_types::Text;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, AsyncPgConnection, RunQueryDsl};

use crate::domain::ports::{MarketRepository, MarketRepositoryError};
use crate::domain::{
    LongMarketCode, Market, MarketCode, MarketId, MarketName, MarketScalars, MarketSubGroup,
    NewMarket, Region, SubGroupCode, SubGroupId, SubGroupListing, SubGroupName, SubGroupPlan,
    SubRegion,
};

use super::diesel_error_mapping::{
    TransactionError, ensure_rewritten_rows_present, map_diesel_error, map_pool_error,
    map_transaction_error,
};
use super::models::{
    MarketRow, MarketUpdate, NewMarketRow, NewSubGroupRow, SubGroupRow,
};
use super::pool::DbPool;
use super::schema::{market_sub_groups, markets};

diesel::define_sql_function! {
    /// PostgreSQL `lower(text)`.
    fn lower(value: Text) -> Text;
}

/// Diesel-backed implementation of the `MarketRepository` port.
#[derive(Clone)]
pub struct DieselMarketRepository {
    pool: DbPool,
}

impl DieselMarketRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn corrupt_row(table: &str, id: i64, detail: impl std::fmt::Display) -> MarketRepositoryError {
    tracing::warn!(table, id, %detail, "stored row failed domain validation");
    MarketRepositoryError::query(format!("stored {table} row {id} is invalid"))
}

fn sub_group_from_row(row: SubGroupRow) -> Result<MarketSubGroup, MarketRepositoryError> {
    let table = "market_sub_groups";
    Ok(MarketSubGroup {
        id: SubGroupId::new(row.id),
        market_id: MarketId::new(row.market_id),
        name: SubGroupName::new(row.sub_group_name)
            .map_err(|err| corrupt_row(table, row.id, err))?,
        code: SubGroupCode::new(row.sub_group_code)
            .map_err(|err| corrupt_row(table, row.id, err))?,
    })
}

fn market_from_rows(
    row: MarketRow,
    sub_groups: Vec<SubGroupRow>,
) -> Result<Market, MarketRepositoryError> {
    let table = "markets";
    let id = row.id;
    Ok(Market {
        id: MarketId::new(id),
        name: MarketName::new(row.name).map_err(|err| corrupt_row(table, id, err))?,
        code: MarketCode::new(row.code).map_err(|err| corrupt_row(table, id, err))?,
        long_market_code: LongMarketCode::new(row.long_market_code)
            .map_err(|err| corrupt_row(table, id, err))?,
        region: Region::from_code(row.region)
            .ok_or_else(|| corrupt_row(table, id, format!("region {}", row.region)))?,
        sub_region: SubRegion::from_code(row.sub_region)
            .ok_or_else(|| corrupt_row(table, id, format!("sub-region {}", row.sub_region)))?,
        sub_groups: sub_groups
            .into_iter()
            .map(sub_group_from_row)
            .collect::<Result<_, _>>()?,
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}

/// Attach subgroups to market rows, preserving row order.
async fn load_aggregates(
    conn: &mut AsyncPgConnection,
    rows: Vec<MarketRow>,
) -> Result<Vec<(MarketRow, Vec<SubGroupRow>)>, diesel::result::Error> {
    if rows.is_empty() {
        return Ok(Vec::new());
    }
    let ids: Vec<i64> = rows.iter().map(|row| row.id).collect();
    let sub_rows: Vec<SubGroupRow> = market_sub_groups::table
        .filter(market_sub_groups::market_id.eq_any(&ids))
        .order(market_sub_groups::id.asc())
        .select(SubGroupRow::as_select())
        .load(conn)
        .await?;

    let mut by_market: HashMap<i64, Vec<SubGroupRow>> = HashMap::new();
    for sub in sub_rows {
        by_market.entry(sub.market_id).or_default().push(sub);
    }
    Ok(rows
        .into_iter()
        .map(|row| {
            let subs = by_market.remove(&row.id).unwrap_or_default();
            (row, subs)
        })
        .collect())
}

fn into_markets(
    loaded: Vec<(MarketRow, Vec<SubGroupRow>)>,
) -> Result<Vec<Market>, MarketRepositoryError> {
    loaded
        .into_iter()
        .map(|(row, subs)| market_from_rows(row, subs))
        .collect()
}

/// Escape `LIKE` metacharacters so user text matches literally.
fn like_pattern(text: &str) -> String {
    let mut pattern = String::with_capacity(text.len() + 2);
    pattern.push('%');
    for c in text.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

impl DieselMarketRepository {
    async fn load_where<F>(&self, query: F) -> Result<Vec<Market>, MarketRepositoryError>
    where
        F: FnOnce() -> markets::BoxedQuery<'static, diesel::pg::Pg> + Send,
    {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<MarketRow> = query()
            .order(markets::id.asc())
            .select(MarketRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        let loaded = load_aggregates(&mut conn, rows)
            .await
            .map_err(map_diesel_error)?;
        into_markets(loaded)
    }

    async fn load_one<F>(&self, query: F) -> Result<Option<Market>, MarketRepositoryError>
    where
        F: FnOnce() -> markets::BoxedQuery<'static, diesel::pg::Pg> + Send,
    {
        Ok(self.load_where(|| query().limit(1)).await?.into_iter().next())
    }
}

#[async_trait]
impl MarketRepository for DieselMarketRepository {
    async fn find_by_id(&self, id: MarketId) -> Result<Option<Market>, MarketRepositoryError> {
        self.load_one(|| markets::table.filter(markets::id.eq(id.get())).into_boxed())
            .await
    }

    async fn find_by_name(
        &self,
        name: &MarketName,
    ) -> Result<Option<Market>, MarketRepositoryError> {
        let name = name.as_ref().to_owned();
        self.load_one(move || {
            markets::table
                .filter(lower(markets::name).eq(lower(name)))
                .into_boxed()
        })
        .await
    }

    async fn find_by_code(
        &self,
        code: &MarketCode,
    ) -> Result<Option<Market>, MarketRepositoryError> {
        let code = code.as_ref().to_owned();
        self.load_one(move || {
            markets::table
                .filter(lower(markets::code).eq(lower(code)))
                .into_boxed()
        })
        .await
    }

    async fn insert(&self, market: &NewMarket) -> Result<MarketId, MarketRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let id = conn
            .transaction(|conn| {
                async move {
                    let row = NewMarketRow {
                        name: market.name.as_ref(),
                        code: market.code.as_ref(),
                        long_market_code: market.long_market_code.as_ref(),
                        region: market.region.code(),
                        sub_region: market.sub_region.code(),
                    };
                    let id: i64 = diesel::insert_into(markets::table)
                        .values(&row)
                        .returning(markets::id)
                        .get_result(conn)
                        .await?;

                    let sub_rows: Vec<NewSubGroupRow<'_>> = market
                        .sub_groups
                        .iter()
                        .map(|sub| NewSubGroupRow {
                            id: None,
                            market_id: id,
                            sub_group_name: sub.name.as_ref(),
                            sub_group_code: sub.code.as_ref(),
                        })
                        .collect();
                    if !sub_rows.is_empty() {
                        diesel::insert_into(market_sub_groups::table)
                            .values(&sub_rows)
                            .execute(conn)
                            .await?;
                    }
                    Ok::<_, diesel::result::Error>(id)
                }
                .scope_boxed()
            })
            .await
            .map_err(map_diesel_error)?;
        Ok(MarketId::new(id))
    }

    async fn commit_update(
        &self,
        id: MarketId,
        scalars: &MarketScalars,
        plan: &SubGroupPlan,
    ) -> Result<Option<Market>, MarketRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let market_id = id.get();
        let loaded = conn
            .transaction(|conn| {
                async move {
                    let changes = MarketUpdate {
                        name: scalars.name.as_ref(),
                        code: scalars.code.as_ref(),
                        long_market_code: scalars.long_market_code.as_ref(),
                        region: scalars.region.code(),
                        sub_region: scalars.sub_region.code(),
                    };
                    let touched = diesel::update(markets::table.find(market_id))
                        .set(&changes)
                        .execute(conn)
                        .await?;
                    if touched == 0 {
                        return Ok(None);
                    }

                    let removed: Vec<i64> = plan.to_remove.iter().map(|id| id.get()).collect();
                    if !removed.is_empty() {
                        diesel::delete(
                            market_sub_groups::table
                                .filter(market_sub_groups::market_id.eq(market_id))
                                .filter(market_sub_groups::id.eq_any(&removed)),
                        )
                        .execute(conn)
                        .await?;
                    }

                    // Rewritten rows are deleted and re-inserted under their own
                    // ids so swapped names or codes never collide mid-statement.
                    // A row deleted concurrently must not come back.
                    let rewritten: Vec<i64> =
                        plan.to_update.iter().map(|sub| sub.id.get()).collect();
                    if !rewritten.is_empty() {
                        let vacated = diesel::delete(
                            market_sub_groups::table
                                .filter(market_sub_groups::market_id.eq(market_id))
                                .filter(market_sub_groups::id.eq_any(&rewritten)),
                        )
                        .execute(conn)
                        .await?;
                        ensure_rewritten_rows_present(rewritten.len(), vacated)?;
                    }

                    let rows: Vec<NewSubGroupRow<'_>> = plan
                        .to_update
                        .iter()
                        .map(|sub| NewSubGroupRow {
                            id: Some(sub.id.get()),
                            market_id,
                            sub_group_name: sub.name.as_ref(),
                            sub_group_code: sub.code.as_ref(),
                        })
                        .chain(plan.to_add.iter().map(|sub| NewSubGroupRow {
                            id: None,
                            market_id,
                            sub_group_name: sub.name.as_ref(),
                            sub_group_code: sub.code.as_ref(),
                        }))
                        .collect();
                    for row in &rows {
                        diesel::insert_into(market_sub_groups::table)
                            .values(row)
                            .execute(conn)
                            .await?;
                    }

                    let row: MarketRow = markets::table
                        .find(market_id)
                        .select(MarketRow::as_select())
                        .first(conn)
                        .await?;
                    let mut loaded = load_aggregates(conn, vec![row]).await?;
                    Ok::<_, TransactionError>(loaded.pop())
                }
                .scope_boxed()
            })
            .await
            .map_err(map_transaction_error)?;

        loaded
            .map(|(row, subs)| market_from_rows(row, subs))
            .transpose()
    }

    async fn delete(&self, id: MarketId) -> Result<bool, MarketRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let deleted = diesel::delete(markets::table.find(id.get()))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(deleted > 0)
    }

    async fn list(&self) -> Result<Vec<Market>, MarketRepositoryError> {
        self.load_where(|| markets::table.into_boxed()).await
    }

    async fn search(&self, text: &str) -> Result<Vec<Market>, MarketRepositoryError> {
        let pattern = like_pattern(text);
        self.load_where(move || {
            markets::table
                .filter(
                    markets::name
                        .ilike(pattern.clone())
                        .or(markets::code.ilike(pattern.clone()))
                        .or(markets::long_market_code.ilike(pattern)),
                )
                .into_boxed()
        })
        .await
    }

    async fn filter_by_regions(
        &self,
        regions: &[Region],
    ) -> Result<Vec<Market>, MarketRepositoryError> {
        let codes: Vec<i16> = regions.iter().map(|region| region.code()).collect();
        self.load_where(move || {
            markets::table
                .filter(markets::region.eq_any(codes))
                .into_boxed()
        })
        .await
    }

    async fn list_sub_groups(
        &self,
        market_code: Option<MarketCode>,
    ) -> Result<Vec<SubGroupListing>, MarketRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let mut query = market_sub_groups::table
            .inner_join(markets::table)
            .select((SubGroupRow::as_select(), markets::code))
            .into_boxed();
        if let Some(code) = market_code {
            query = query.filter(lower(markets::code).eq(lower(code.as_ref().to_owned())));
        }
        let rows: Vec<(SubGroupRow, String)> = query
            .order(market_sub_groups::id.asc())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        rows.into_iter()
            .map(|(sub, code)| {
                let market_code = MarketCode::new(code)
                    .map_err(|err| corrupt_row("markets", sub.market_id, err))?;
                let sub = sub_group_from_row(sub)?;
                Ok(SubGroupListing {
                    id: sub.id,
                    market_id: sub.market_id,
                    market_code,
                    sub_group_name: sub.name,
                    sub_group_code: sub.code,
                })
            })
            .collect()
    }
}
