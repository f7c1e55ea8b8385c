//! Prelude module for convenient imports.
//!
//! This module re-exports the most commonly used types from the crate.
//!
//! # Example
//!
//! ```rust
//! use linear_pool_execution::prelude::*;
//! ```

// Emergency
pub use crate::emergency::{CircuitBreaker, CircuitBreakerConfig, CircuitBreakerStats, CircuitState};

// Keeper
pub use crate::keeper::{
    Decision, DecisionConfig, DecisionEngine, KeeperConfig, KeeperError, ManagedPool, PoolOutcome,
    PoolSnapshot, RebalanceKeeper, RebalanceOutcome, RebalanceTarget, TickReport,
};

// Lifecycle
pub use crate::lifecycle::{
    AggregateStats, EventData, FailureData, LifecycleEvent, LifecycleEventType, LifecycleTracker,
    PoolSummary, QuarantineData, RebalanceData, RebalanceDirection,
};
