//! Simulated chain hosting the Euler linear pool contracts.
//!
//! This crate provides:
//! - An in-process chain with atomic transactions and receipts
//! - ERC-20 ledgers and a mock Euler eToken lending market
//! - A vault with pool registration, swaps and asset manager operations
//! - The Euler linear pool, its factory and its rebalancer
//! - Async contract handles and deployment helpers

/// Prelude module for convenient imports.
pub mod prelude;

/// Chain state, transactions and receipts.
pub mod chain;
/// Async handles over deployed contracts.
pub mod contracts;
/// Factory deployment helpers.
pub mod deployment;
/// ERC-20 ledgers.
pub mod erc20;
/// Euler eToken, linear pool, factory and rebalancer.
pub mod euler;
/// Protocol fee percentages provider.
pub mod fees;
/// Side-effect-free swap queries.
pub mod queries;
/// Vault: pool registry, balances and swaps.
pub mod vault;

#[cfg(test)]
pub(crate) mod testing;
