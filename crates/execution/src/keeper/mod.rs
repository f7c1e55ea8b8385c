//! Rebalance keeper.
//!
//! Watches factory-created pools, decides when a pool's main balance has
//! drifted far enough from its targets, submits the rebalance and records
//! the outcome. A pool whose rate source starts answering with spoofed
//! query results is quarantined and the circuit breaker is tripped.

mod decision;
mod executor;
mod target;

pub use decision::*;
pub use executor::*;
pub use target::*;

use linear_pool_domain::Address;
use linear_pool_domain::errors::Revert;
use thiserror::Error;

/// Keeper errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeeperError {
    #[error("contract call reverted: {0}")]
    Revert(#[from] Revert),
    #[error("pool {0:?} was not created by this factory")]
    NotFromFactory(Address),
    #[error("pool {0:?} has no rebalancer")]
    NoRebalancer(Address),
    #[error("pool {0:?} is already watched")]
    AlreadyWatched(Address),
    #[error("circuit breaker open")]
    CircuitOpen,
}
