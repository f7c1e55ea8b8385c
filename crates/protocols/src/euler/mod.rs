//! Euler integration: the eToken rate source, the linear pool built on it,
//! the pool's rebalancer and the factory that deploys both.

mod factory;
mod pool;
mod rebalancer;
mod token;

pub use factory::{CreatePoolParams, EulerLinearPoolFactory, FactoryArgs, FactoryVersioning};
pub use pool::{
    EulerLinearPool, INITIAL_BPT_SUPPLY, LinearPoolBalances, MAX_SWAP_FEE_PERCENTAGE,
    MAX_UPPER_TARGET, MIN_SWAP_FEE_PERCENTAGE, NewLinearPool,
};
pub use rebalancer::EulerLinearPoolRebalancer;
pub use token::{EulerToken, MockEulerToken, NON_MALICIOUS_REVERT};
