//! Decides whether a pool needs its rebalancer to run.

use crate::lifecycle::RebalanceDirection;
use linear_pool_domain::{Address, U256};

/// Pool state the decision is taken on. All amounts are raw main token units.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolSnapshot {
    /// Pool address.
    pub pool: Address,
    /// Main token balance (cash + managed).
    pub main_balance: U256,
    /// Wrapped token balance.
    pub wrapped_balance: U256,
    /// Lower target.
    pub lower_target: U256,
    /// Upper target.
    pub upper_target: U256,
    /// Wrapped token rate, 18 decimals.
    pub wrapped_rate: U256,
    /// Main token decimals.
    pub main_decimals: u8,
}

impl PoolSnapshot {
    /// Main balance the rebalancer aims for.
    pub fn desired_main_balance(&self) -> U256 {
        (self.lower_target + self.upper_target) / 2
    }

    /// Whether the main balance lies within `[lower, upper]`.
    pub fn within_targets(&self) -> bool {
        self.main_balance >= self.lower_target && self.main_balance <= self.upper_target
    }

    /// Distance between the main balance and the desired balance.
    pub fn deviation(&self) -> U256 {
        let desired = self.desired_main_balance();
        if self.main_balance > desired {
            self.main_balance - desired
        } else {
            desired - self.main_balance
        }
    }
}

/// Configuration for the decision engine.
#[derive(Debug, Clone)]
pub struct DecisionConfig {
    /// Only rebalance once the main balance leaves the targets.
    pub outside_targets_only: bool,
    /// Deviations up to this many raw main units are ignored.
    pub min_deviation: U256,
}

impl Default for DecisionConfig {
    fn default() -> Self {
        Self {
            outside_targets_only: true,
            min_deviation: U256::zero(),
        }
    }
}

/// What the keeper should do with a pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Leave the pool alone.
    Hold,
    /// Run the rebalancer.
    Rebalance { direction: RebalanceDirection },
}

impl Decision {
    pub fn requires_transaction(&self) -> bool {
        !matches!(self, Decision::Hold)
    }

    pub fn description(&self) -> &'static str {
        match self {
            Decision::Hold => "hold",
            Decision::Rebalance {
                direction: RebalanceDirection::LackOfMain,
            } => "rebalance: unwrap into main",
            Decision::Rebalance {
                direction: RebalanceDirection::ExcessOfMain,
            } => "rebalance: wrap excess main",
        }
    }
}

/// Turns pool snapshots into decisions.
#[derive(Debug, Clone, Default)]
pub struct DecisionEngine {
    config: DecisionConfig,
}

impl DecisionEngine {
    pub fn new(config: DecisionConfig) -> Self {
        Self { config }
    }

    pub fn set_config(&mut self, config: DecisionConfig) {
        self.config = config;
    }

    pub fn decide(&self, snapshot: &PoolSnapshot) -> Decision {
        if snapshot.deviation() <= self.config.min_deviation {
            return Decision::Hold;
        }
        if self.config.outside_targets_only && snapshot.within_targets() {
            return Decision::Hold;
        }

        let direction = if snapshot.main_balance < snapshot.desired_main_balance() {
            RebalanceDirection::LackOfMain
        } else {
            RebalanceDirection::ExcessOfMain
        };
        Decision::Rebalance { direction }
    }
}
