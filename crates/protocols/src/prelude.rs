//! Prelude module for convenient imports.
//!
//! This module re-exports the most commonly used types from the crate.
//!
//! # Example
//!
//! ```rust
//! use linear_pool_protocols::prelude::*;
//! ```

// Chain
pub use crate::chain::{BlockInfo, Chain, ChainState, Event, Log, Receipt};

// Contracts
pub use crate::contracts::{
    Erc20Contract, EulerTokenContract, FactoryContract, FeesProviderContract, LinearPoolContract,
    QueriesContract, RebalancerContract, VaultContract,
};

// Deployment
pub use crate::deployment::{
    DeploymentError, EULER_PROTOCOL, FactoryDeployment, ProtocolDeployment, deploy_euler_token,
    deploy_factory, deploy_token,
};

// Euler
pub use crate::euler::{
    CreatePoolParams, EulerLinearPool, EulerLinearPoolFactory, EulerLinearPoolRebalancer,
    EulerToken, FactoryArgs, FactoryVersioning, INITIAL_BPT_SUPPLY, LinearPoolBalances,
    MAX_SWAP_FEE_PERCENTAGE, MAX_UPPER_TARGET, MIN_SWAP_FEE_PERCENTAGE, MockEulerToken,
    NON_MALICIOUS_REVERT,
};

// Vault
pub use crate::vault::{
    FundManagement, PoolBalanceOp, PoolTokenInfo, PoolTokens, SingleSwap, TokenBalance, Vault,
};
