//! Lifecycle events recorded by the keeper.

use linear_pool_domain::{Address, U256};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Type of lifecycle event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LifecycleEventType {
    /// The pool was rebalanced.
    Rebalanced,
    /// A rebalance attempt reverted.
    RebalanceFailed,
    /// The pool was taken out of rotation.
    Quarantined,
    /// The pool was put back into rotation.
    Released,
}

/// A lifecycle event for a pool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LifecycleEvent {
    /// Event ID.
    pub id: String,
    /// Event type.
    pub event_type: LifecycleEventType,
    /// Pool address.
    pub pool: Address,
    /// Block the transaction was mined in.
    pub block_number: Option<u64>,
    /// Timestamp.
    pub timestamp: chrono::DateTime<chrono::Utc>,
    /// Event-specific data.
    pub data: EventData,
}

impl LifecycleEvent {
    /// Creates a new lifecycle event.
    pub fn new(event_type: LifecycleEventType, pool: Address, data: EventData) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            event_type,
            pool,
            block_number: None,
            timestamp: chrono::Utc::now(),
            data,
        }
    }

    /// Sets the block number.
    #[must_use]
    pub fn with_block(mut self, block_number: u64) -> Self {
        self.block_number = Some(block_number);
        self
    }
}

/// Event-specific data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum EventData {
    /// Rebalance data.
    Rebalance(RebalanceData),
    /// Failure data.
    Failure(FailureData),
    /// Quarantine data.
    Quarantine(QuarantineData),
    /// Release carries nothing.
    Release,
}

/// Which side of the targets the main balance was on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RebalanceDirection {
    /// Main balance below the lower target.
    LackOfMain,
    /// Main balance above the upper target.
    ExcessOfMain,
}

/// Data for rebalance event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RebalanceData {
    /// Rebalancer that ran.
    pub rebalancer: Address,
    /// Side of the targets the pool was on.
    pub direction: RebalanceDirection,
    /// Main balance before, raw units.
    pub main_before: U256,
    /// Main balance after, raw units.
    pub main_after: U256,
    /// Main token paid to the recipient, raw units.
    pub reward: U256,
    /// Reward in main token units, `None` when it does not fit a `Decimal`.
    pub reward_display: Option<Decimal>,
    /// Who received the reward.
    pub recipient: Address,
}

/// Data for a failed rebalance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailureData {
    /// Revert reason.
    pub reason: String,
}

/// Data for a quarantine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuarantineData {
    /// Revert reason that caused it.
    pub reason: String,
}
