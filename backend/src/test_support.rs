//! Test utilities for the backend crate.
//!
//! This module provides shared helpers for both unit tests (in `src/`) and
//! integration tests (in `tests/`). It is compiled for tests and behind the
//! `test-support` feature.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::Utc;

use crate::domain::ports::{MarketRepository, MarketRepositoryError};
use crate::domain::{
    Market, MarketCode, MarketId, MarketName, MarketScalars, MarketSubGroup, NewMarket, Region,
    SubGroupId, SubGroupListing, SubGroupPlan,
};

#[derive(Debug, Default)]
struct Store {
    markets: BTreeMap<MarketId, Market>,
    next_market_id: i64,
    next_sub_group_id: i64,
    failure: Option<MarketRepositoryError>,
}

impl Store {
    fn check_failure(&self) -> Result<(), MarketRepositoryError> {
        match &self.failure {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }

    fn allocate_market_id(&mut self) -> MarketId {
        self.next_market_id += 1;
        MarketId::new(self.next_market_id)
    }

    fn allocate_sub_group_id(&mut self) -> SubGroupId {
        self.next_sub_group_id += 1;
        SubGroupId::new(self.next_sub_group_id)
    }

    /// Enforce the same uniqueness rules as the database indexes.
    fn check_unique(&self, candidate: &Market) -> Result<(), MarketRepositoryError> {
        for other in self.markets.values().filter(|m| m.id != candidate.id) {
            if other.name.eq_ignore_case(&candidate.name) {
                return Err(MarketRepositoryError::conflict(
                    "unique violation on markets_name_lower_idx",
                ));
            }
            if other.code.eq_ignore_case(&candidate.code) {
                return Err(MarketRepositoryError::conflict(
                    "unique violation on markets_code_lower_idx",
                ));
            }
        }
        for (i, sub) in candidate.sub_groups.iter().enumerate() {
            for later in &candidate.sub_groups[i + 1..] {
                if sub.name.eq_ignore_case(&later.name) {
                    return Err(MarketRepositoryError::conflict(
                        "unique violation on market_sub_groups_name_lower_idx",
                    ));
                }
                if sub.code.eq_ignore_case(&later.code) {
                    return Err(MarketRepositoryError::conflict(
                        "unique violation on market_sub_groups_code_lower_idx",
                    ));
                }
            }
        }
        Ok(())
    }
}

/// Thread-safe in-memory market store.
///
/// Writes are applied to a copy of the aggregate and swapped in only after
/// the uniqueness rules pass, so a rejected write leaves nothing behind.
///
/// # Examples
///
/// ```
/// use market_backend::test_support::InMemoryMarketRepository;
///
/// let repo = InMemoryMarketRepository::new();
/// assert_eq!(repo.market_count(), 0);
/// ```
#[derive(Debug, Default)]
pub struct InMemoryMarketRepository {
    store: Mutex<Store>,
}

impl InMemoryMarketRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Store> {
        self.store.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Make every subsequent call fail with `failure`, or recover with `None`.
    pub fn set_failure(&self, failure: Option<MarketRepositoryError>) {
        self.lock().failure = failure;
    }

    pub fn market_count(&self) -> usize {
        self.lock().markets.len()
    }

    /// Snapshot of every stored market.
    pub fn snapshot(&self) -> Vec<Market> {
        self.lock().markets.values().cloned().collect()
    }

    fn select(
        &self,
        keep: impl Fn(&Market) -> bool,
    ) -> Result<Vec<Market>, MarketRepositoryError> {
        let store = self.lock();
        store.check_failure()?;
        Ok(store.markets.values().filter(|m| keep(m)).cloned().collect())
    }
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

#[async_trait]
impl MarketRepository for InMemoryMarketRepository {
    async fn find_by_id(&self, id: MarketId) -> Result<Option<Market>, MarketRepositoryError> {
        let store = self.lock();
        store.check_failure()?;
        Ok(store.markets.get(&id).cloned())
    }

    async fn find_by_name(
        &self,
        name: &MarketName,
    ) -> Result<Option<Market>, MarketRepositoryError> {
        Ok(self
            .select(|m| m.name.eq_ignore_case(name))?
            .into_iter()
            .next())
    }

    async fn find_by_code(
        &self,
        code: &MarketCode,
    ) -> Result<Option<Market>, MarketRepositoryError> {
        Ok(self
            .select(|m| m.code.eq_ignore_case(code))?
            .into_iter()
            .next())
    }

    async fn insert(&self, market: &NewMarket) -> Result<MarketId, MarketRepositoryError> {
        let mut store = self.lock();
        store.check_failure()?;
        let now = Utc::now();
        let id = MarketId::new(store.next_market_id + 1);
        let sub_groups = market
            .sub_groups
            .iter()
            .enumerate()
            .map(|(offset, sub)| MarketSubGroup {
                id: SubGroupId::new(store.next_sub_group_id + 1 + offset as i64),
                market_id: id,
                name: sub.name.clone(),
                code: sub.code.clone(),
            })
            .collect();
        let candidate = Market {
            id,
            name: market.name.clone(),
            code: market.code.clone(),
            long_market_code: market.long_market_code.clone(),
            region: market.region,
            sub_region: market.sub_region,
            sub_groups,
            created_at: now,
            updated_at: now,
        };
        store.check_unique(&candidate)?;

        store.allocate_market_id();
        for _ in &candidate.sub_groups {
            store.allocate_sub_group_id();
        }
        store.markets.insert(id, candidate);
        Ok(id)
    }

    async fn commit_update(
        &self,
        id: MarketId,
        scalars: &MarketScalars,
        plan: &SubGroupPlan,
    ) -> Result<Option<Market>, MarketRepositoryError> {
        let mut store = self.lock();
        store.check_failure()?;
        let Some(current) = store.markets.get(&id) else {
            return Ok(None);
        };

        let mut candidate = current.clone();
        candidate.name = scalars.name.clone();
        candidate.code = scalars.code.clone();
        candidate.long_market_code = scalars.long_market_code.clone();
        candidate.region = scalars.region;
        candidate.sub_region = scalars.sub_region;
        candidate.updated_at = Utc::now();

        candidate
            .sub_groups
            .retain(|sub| !plan.to_remove.contains(&sub.id));
        for updated in &plan.to_update {
            let Some(slot) = candidate.sub_groups.iter_mut().find(|s| s.id == updated.id) else {
                return Err(MarketRepositoryError::conflict(format!(
                    "edited subgroup {} no longer exists",
                    updated.id
                )));
            };
            slot.name = updated.name.clone();
            slot.code = updated.code.clone();
        }
        let first_new = store.next_sub_group_id + 1;
        candidate
            .sub_groups
            .extend(plan.to_add.iter().enumerate().map(|(offset, sub)| {
                MarketSubGroup {
                    id: SubGroupId::new(first_new + offset as i64),
                    market_id: id,
                    name: sub.name.clone(),
                    code: sub.code.clone(),
                }
            }));
        store.check_unique(&candidate)?;

        for _ in &plan.to_add {
            store.allocate_sub_group_id();
        }
        store.markets.insert(id, candidate.clone());
        Ok(Some(candidate))
    }

    async fn delete(&self, id: MarketId) -> Result<bool, MarketRepositoryError> {
        let mut store = self.lock();
        store.check_failure()?;
        match store.markets.get(&id) {
            None => Ok(false),
            Some(market) if !market.sub_groups.is_empty() => Err(MarketRepositoryError::conflict(
                "foreign key violation on market_sub_groups_market_id_fkey",
            )),
            Some(_) => Ok(store.markets.remove(&id).is_some()),
        }
    }

    async fn list(&self) -> Result<Vec<Market>, MarketRepositoryError> {
        self.select(|_| true)
    }

    async fn search(&self, text: &str) -> Result<Vec<Market>, MarketRepositoryError> {
        self.select(|m| {
            contains_ignore_case(m.name.as_ref(), text)
                || contains_ignore_case(m.code.as_ref(), text)
                || contains_ignore_case(m.long_market_code.as_ref(), text)
        })
    }

    async fn filter_by_regions(
        &self,
        regions: &[Region],
    ) -> Result<Vec<Market>, MarketRepositoryError> {
        self.select(|m| regions.contains(&m.region))
    }

    async fn list_sub_groups(
        &self,
        market_code: Option<MarketCode>,
    ) -> Result<Vec<SubGroupListing>, MarketRepositoryError> {
        let markets = self.select(|m| {
            market_code
                .as_ref()
                .is_none_or(|code| m.code.eq_ignore_case(code))
        })?;
        let mut rows: Vec<SubGroupListing> = markets
            .into_iter()
            .flat_map(|market| {
                let code = market.code;
                market
                    .sub_groups
                    .into_iter()
                    .map(move |sub| SubGroupListing {
                        id: sub.id,
                        market_id: sub.market_id,
                        market_code: code.clone(),
                        sub_group_name: sub.name,
                        sub_group_code: sub.code,
                    })
            })
            .collect();
        rows.sort_by_key(|row| row.id);
        Ok(rows)
    }
}
