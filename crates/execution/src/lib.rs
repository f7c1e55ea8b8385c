//! Off-chain rebalance keeper for Euler linear pools.
//!
//! This crate provides:
//! - Rebalance decisions from pool balances and targets
//! - A keeper loop submitting rebalances for watched pools
//! - Emergency controls and circuit breaker
//! - Pool lifecycle tracking

/// Prelude module for convenient imports.
pub mod prelude;

/// Emergency controls and circuit breaker.
pub mod emergency;
/// Rebalance keeper.
pub mod keeper;
/// Pool lifecycle tracking.
pub mod lifecycle;
