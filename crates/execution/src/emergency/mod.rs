//! Emergency controls for the rebalance keeper.
//!
//! Provides safety mechanisms for automated rebalancing:
//! - Circuit breaker for consecutive failures
//! - Immediate trip when a rate source turns malicious

mod circuit_breaker;

pub use circuit_breaker::*;
