//! Port for market persistence.
//!
//! The [`MarketRepository`] trait is the only way the domain reaches stored
//! markets. Adapters must treat a market and its subgroups as one aggregate:
//! `insert` and `commit_update` either apply every change or none.

use async_trait::async_trait;

use crate::domain::{
    Market, MarketCode, MarketId, MarketName, MarketScalars, NewMarket, Region, SubGroupListing,
    SubGroupPlan,
};

use super::define_port_error;

define_port_error! {
    /// Errors raised by market repository adapters.
    pub enum MarketRepositoryError {
        /// The store could not be reached.
        Connection { message: String } =>
            "market repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "market repository query failed: {message}",
        /// A unique index rejected the write.
        Conflict { message: String } =>
            "market repository rejected a conflicting write: {message}",
    }
}

/// Storage contract for the market aggregate.
///
/// Name and code lookups ignore case. Listings return markets ordered by
/// identifier with their subgroups attached.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MarketRepository: Send + Sync {
    /// Load one market with its subgroups.
    async fn find_by_id(&self, id: MarketId) -> Result<Option<Market>, MarketRepositoryError>;

    /// Market whose name equals `name`, ignoring case.
    async fn find_by_name(
        &self,
        name: &MarketName,
    ) -> Result<Option<Market>, MarketRepositoryError>;

    /// Market whose code equals `code`, ignoring case.
    async fn find_by_code(
        &self,
        code: &MarketCode,
    ) -> Result<Option<Market>, MarketRepositoryError>;

    /// Insert a market and all of its subgroups atomically.
    async fn insert(&self, market: &NewMarket) -> Result<MarketId, MarketRepositoryError>;

    /// Overwrite the scalars of market `id` and apply `plan` to its
    /// subgroups in one transaction, then reload the aggregate.
    ///
    /// Returns `None` when the market no longer exists, and a conflict when a
    /// subgroup in `plan.to_update` has been deleted since it was loaded.
    async fn commit_update(
        &self,
        id: MarketId,
        scalars: &MarketScalars,
        plan: &SubGroupPlan,
    ) -> Result<Option<Market>, MarketRepositoryError>;

    /// Delete a market that owns no subgroups.
    ///
    /// Returns `false` when nothing was deleted.
    async fn delete(&self, id: MarketId) -> Result<bool, MarketRepositoryError>;

    /// Every market.
    async fn list(&self) -> Result<Vec<Market>, MarketRepositoryError>;

    /// Markets whose name, code or long code contains `text`, ignoring case.
    async fn search(&self, text: &str) -> Result<Vec<Market>, MarketRepositoryError>;

    /// Markets in any of `regions`.
    async fn filter_by_regions(
        &self,
        regions: &[Region],
    ) -> Result<Vec<Market>, MarketRepositoryError>;

    /// Subgroup rows, optionally restricted to one market code.
    async fn list_sub_groups(
        &self,
        market_code: Option<MarketCode>,
    ) -> Result<Vec<SubGroupListing>, MarketRepositoryError>;
}

/// Empty store used where persistence is not under test.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureMarketRepository;

#[async_trait]
impl MarketRepository for FixtureMarketRepository {
    async fn find_by_id(&self, _id: MarketId) -> Result<Option<Market>, MarketRepositoryError> {
        Ok(None)
    }

    async fn find_by_name(
        &self,
        _name: &MarketName,
    ) -> Result<Option<Market>, MarketRepositoryError> {
        Ok(None)
    }

    async fn find_by_code(
        &self,
        _code: &MarketCode,
    ) -> Result<Option<Market>, MarketRepositoryError> {
        Ok(None)
    }

    async fn insert(&self, _market: &NewMarket) -> Result<MarketId, MarketRepositoryError> {
        Ok(MarketId::new(1))
    }

    async fn commit_update(
        &self,
        _id: MarketId,
        _scalars: &MarketScalars,
        _plan: &SubGroupPlan,
    ) -> Result<Option<Market>, MarketRepositoryError> {
        Ok(None)
    }

    async fn delete(&self, _id: MarketId) -> Result<bool, MarketRepositoryError> {
        Ok(false)
    }

    async fn list(&self) -> Result<Vec<Market>, MarketRepositoryError> {
        Ok(Vec::new())
    }

    async fn search(&self, _text: &str) -> Result<Vec<Market>, MarketRepositoryError> {
        Ok(Vec::new())
    }

    async fn filter_by_regions(
        &self,
        _regions: &[Region],
    ) -> Result<Vec<Market>, MarketRepositoryError> {
        Ok(Vec::new())
    }

    async fn list_sub_groups(
        &self,
        _market_code: Option<MarketCode>,
    ) -> Result<Vec<SubGroupListing>, MarketRepositoryError> {
        Ok(Vec::new())
    }
}
