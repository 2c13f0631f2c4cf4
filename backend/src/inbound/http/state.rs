//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports (use-cases) and remain testable without I/O.

use std::sync::Arc;
use std::time::Duration;

use crate::domain::ports::{
    FixtureMarketCommand, FixtureMarketQuery, MarketCommand, MarketQuery, MarketRepository,
};
use crate::domain::{Cancellation, MarketService};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub markets: Arc<dyn MarketCommand>,
    pub markets_query: Arc<dyn MarketQuery>,
    command_timeout: Option<Duration>,
}

impl HttpState {
    /// Construct state from explicit port implementations.
    pub fn new(markets: Arc<dyn MarketCommand>, markets_query: Arc<dyn MarketQuery>) -> Self {
        Self {
            markets,
            markets_query,
            command_timeout: None,
        }
    }

    /// Wire both ports to one [`MarketService`] over `repo`.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    ///
    /// use market_backend::domain::ports::FixtureMarketRepository;
    /// use market_backend::inbound::http::state::HttpState;
    ///
    /// let state = HttpState::from_repository(Arc::new(FixtureMarketRepository));
    /// let _query = state.markets_query.clone();
    /// ```
    pub fn from_repository<R>(repo: Arc<R>) -> Self
    where
        R: MarketRepository + 'static,
    {
        let service = Arc::new(MarketService::new(repo));
        Self::new(service.clone(), service)
    }

    /// Abandon mutations that have not reached their commit within `timeout`.
    #[must_use]
    pub fn with_command_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.command_timeout = timeout;
        self
    }

    /// Cancellation for one mutating request.
    pub(crate) fn cancellation(&self) -> Cancellation {
        self.command_timeout
            .map_or_else(Cancellation::never, Cancellation::after)
    }
}

impl Default for HttpState {
    /// Fixture ports for wiring tests that never reach a store.
    fn default() -> Self {
        Self::new(Arc::new(FixtureMarketCommand), Arc::new(FixtureMarketQuery))
    }
}
