//! Driving port for market mutations.
//!
//! Inbound adapters call [`MarketCommand`] to create, update and delete
//! markets. Implementations validate and reconcile the whole aggregate before
//! issuing a single atomic write.

use async_trait::async_trait;

use crate::domain::{
    Cancellation, CreateMarketRequest, Market, MarketError, MarketId, UpdateMarketRequest,
};

/// Mutating market use-cases.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MarketCommand: Send + Sync {
    /// Validate and persist a new market with its subgroups.
    ///
    /// # Errors
    ///
    /// Field, taxonomy and uniqueness failures abort before any write.
    async fn create_market(
        &self,
        request: CreateMarketRequest,
        cancellation: &Cancellation,
    ) -> Result<MarketId, MarketError>;

    /// Apply scalar changes and subgroup deltas to an existing market and
    /// return the reloaded aggregate.
    async fn update_market(
        &self,
        request: UpdateMarketRequest,
        cancellation: &Cancellation,
    ) -> Result<Market, MarketError>;

    /// Remove a market that owns no subgroups.
    async fn delete_market(
        &self,
        id: MarketId,
        cancellation: &Cancellation,
    ) -> Result<(), MarketError>;
}

/// Command stub that accepts creates and rejects everything else as missing.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureMarketCommand;

#[async_trait]
impl MarketCommand for FixtureMarketCommand {
    async fn create_market(
        &self,
        _request: CreateMarketRequest,
        cancellation: &Cancellation,
    ) -> Result<MarketId, MarketError> {
        cancellation.ensure_active()?;
        Ok(MarketId::new(1))
    }

    async fn update_market(
        &self,
        request: UpdateMarketRequest,
        _cancellation: &Cancellation,
    ) -> Result<Market, MarketError> {
        Err(MarketError::NotFound(request.id))
    }

    async fn delete_market(
        &self,
        id: MarketId,
        _cancellation: &Cancellation,
    ) -> Result<(), MarketError> {
        Err(MarketError::NotFound(id))
    }
}
