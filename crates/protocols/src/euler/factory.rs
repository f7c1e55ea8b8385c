//! Factory for Euler linear pools.
//!
//! Every pool comes with its own rebalancer, installed as the asset manager
//! of the pool's main and wrapped tokens.

use super::pool::NewLinearPool;
use crate::chain::{ChainState, Event};
use linear_pool_domain::errors::Revert;
use linear_pool_domain::{Address, U256};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Version tags and Euler protocol address of a versioned factory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FactoryVersioning {
    pub factory_version: String,
    pub pool_version: String,
    pub euler_protocol: Address,
}

/// Factory constructor arguments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FactoryArgs {
    pub vault: Address,
    pub protocol_fee_percentages_provider: Address,
    pub balancer_queries: Address,
    pub versioning: Option<FactoryVersioning>,
}

/// Arguments of `create`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatePoolParams {
    pub name: String,
    pub symbol: String,
    pub main_token: Address,
    pub wrapped_token: Address,
    /// In main token units.
    pub upper_target: U256,
    pub swap_fee_percentage: U256,
    pub owner: Address,
}

#[derive(Debug, Clone)]
pub struct EulerLinearPoolFactory {
    args: FactoryArgs,
    deployer: Address,
    pools: Vec<Address>,
    rebalancers: Vec<Address>,
    disabled: bool,
}

impl EulerLinearPoolFactory {
    pub fn vault(&self) -> Address {
        self.args.vault
    }

    pub fn protocol_fee_percentages_provider(&self) -> Address {
        self.args.protocol_fee_percentages_provider
    }

    pub fn balancer_queries(&self) -> Address {
        self.args.balancer_queries
    }

    pub fn version(&self) -> Option<&str> {
        self.args
            .versioning
            .as_ref()
            .map(|v| v.factory_version.as_str())
    }

    pub fn pool_version(&self) -> Option<&str> {
        self.args
            .versioning
            .as_ref()
            .map(|v| v.pool_version.as_str())
    }

    /// Configured Euler protocol, if the factory is versioned.
    pub fn euler_protocol(&self) -> Option<Address> {
        self.args.versioning.as_ref().map(|v| v.euler_protocol)
    }

    pub fn is_pool_from_factory(&self, pool: Address) -> bool {
        self.pools.contains(&pool)
    }

    pub fn last_created_pool(&self) -> Option<Address> {
        self.pools.last().copied()
    }

    /// Rebalancer created together with `pool`.
    pub fn rebalancer_of(&self, pool: Address) -> Option<Address> {
        self.pools
            .iter()
            .position(|p| *p == pool)
            .map(|i| self.rebalancers[i])
    }

    pub fn is_disabled(&self) -> bool {
        self.disabled
    }
}

impl ChainState {
    pub fn deploy_euler_linear_pool_factory(
        &mut self,
        deployer: Address,
        args: FactoryArgs,
    ) -> Result<Address, Revert> {
        // References must point at deployed contracts of the right kind.
        self.vault(args.vault)?;
        self.fee_provider(args.protocol_fee_percentages_provider)?;
        self.balancer_queries(args.balancer_queries)?;

        let address = self.allocate_address();
        self.factories.insert(
            address,
            EulerLinearPoolFactory {
                args,
                deployer,
                pools: Vec::new(),
                rebalancers: Vec::new(),
                disabled: false,
            },
        );
        Ok(address)
    }

    /// Creates a pool and its rebalancer. Emits `PoolCreated`.
    pub fn factory_create(
        &mut self,
        factory: Address,
        params: CreatePoolParams,
    ) -> Result<Address, Revert> {
        let state = self.factory(factory)?;
        if state.disabled {
            return Err(Revert::Disabled);
        }
        let vault = state.args.vault;
        let queries = state.args.balancer_queries;
        let euler_protocol = state.euler_protocol().unwrap_or(params.wrapped_token);
        let version = state.pool_version().map(str::to_owned);

        if self.euler_underlying_asset(params.wrapped_token)? != params.main_token {
            warn!(
                main = ?params.main_token,
                wrapped = ?params.wrapped_token,
                "Wrapped token underlying does not match main token"
            );
            return Err(Revert::TokensMismatch);
        }

        let rebalancer = self.allocate_address();
        let pool = self.deploy_euler_linear_pool(NewLinearPool {
            vault,
            name: params.name,
            symbol: params.symbol,
            main_token: params.main_token,
            wrapped_token: params.wrapped_token,
            upper_target: params.upper_target,
            asset_manager: rebalancer,
            swap_fee_percentage: params.swap_fee_percentage,
            owner: params.owner,
            version,
        })?;
        self.deploy_rebalancer_at(rebalancer, pool, queries, euler_protocol)?;

        let state = self.factory_mut(factory)?;
        state.pools.push(pool);
        state.rebalancers.push(rebalancer);
        self.emit(factory, Event::PoolCreated { pool });
        info!(factory = ?factory, pool = ?pool, rebalancer = ?rebalancer, "Pool created");
        Ok(pool)
    }

    /// Stops the factory from creating further pools. Deployer only.
    pub fn factory_disable(&mut self, factory: Address, caller: Address) -> Result<(), Revert> {
        let state = self.factory_mut(factory)?;
        if caller != state.deployer {
            return Err(Revert::SenderNotAllowed);
        }
        state.disabled = true;
        self.emit(factory, Event::FactoryDisabled);
        Ok(())
    }
}
