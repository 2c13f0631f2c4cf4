//! Domain ports and supporting types for the hexagonal boundary.

mod macros;
pub(crate) use macros::define_port_error;

mod market_command;
mod market_query;
mod market_repository;

#[cfg(test)]
pub use market_command::MockMarketCommand;
pub use market_command::{FixtureMarketCommand, MarketCommand};
#[cfg(test)]
pub use market_query::MockMarketQuery;
pub use market_query::{FixtureMarketQuery, MarketQuery};
#[cfg(test)]
pub use market_repository::MockMarketRepository;
pub use market_repository::{FixtureMarketRepository, MarketRepository, MarketRepositoryError};
