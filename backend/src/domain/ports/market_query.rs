//! Driving port for market reads.

use async_trait::async_trait;

use crate::domain::{Market, MarketError, MarketId, Region, SubGroupListing};

/// Read-only market use-cases.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MarketQuery: Send + Sync {
    async fn get_market(&self, id: MarketId) -> Result<Market, MarketError>;

    async fn list_markets(&self) -> Result<Vec<Market>, MarketError>;

    /// Case-insensitive substring match over name, code and long code.
    /// Blank text lists every market.
    async fn search_markets(&self, text: &str) -> Result<Vec<Market>, MarketError>;

    /// Markets in any of `regions`; an empty slice lists every market.
    async fn filter_markets_by_regions(
        &self,
        regions: &[Region],
    ) -> Result<Vec<Market>, MarketError>;

    async fn market_name_exists(&self, name: &str) -> Result<bool, MarketError>;

    async fn market_code_exists(&self, code: &str) -> Result<bool, MarketError>;

    /// Subgroups ordered numeric codes first, optionally for one market code.
    async fn list_sub_groups(
        &self,
        market_code: Option<String>,
    ) -> Result<Vec<SubGroupListing>, MarketError>;
}

/// Query stub backed by nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureMarketQuery;

#[async_trait]
impl MarketQuery for FixtureMarketQuery {
    async fn get_market(&self, id: MarketId) -> Result<Market, MarketError> {
        Err(MarketError::NotFound(id))
    }

    async fn list_markets(&self) -> Result<Vec<Market>, MarketError> {
        Ok(Vec::new())
    }

    async fn search_markets(&self, _text: &str) -> Result<Vec<Market>, MarketError> {
        Ok(Vec::new())
    }

    async fn filter_markets_by_regions(
        &self,
        _regions: &[Region],
    ) -> Result<Vec<Market>, MarketError> {
        Ok(Vec::new())
    }

    async fn market_name_exists(&self, _name: &str) -> Result<bool, MarketError> {
        Ok(false)
    }

    async fn market_code_exists(&self, _code: &str) -> Result<bool, MarketError> {
        Ok(false)
    }

    async fn list_sub_groups(
        &self,
        _market_code: Option<String>,
    ) -> Result<Vec<SubGroupListing>, MarketError> {
        Ok(Vec::new())
    }
}
