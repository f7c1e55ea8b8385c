//! Pools the keeper can drive.

use super::{KeeperError, PoolSnapshot};
use async_trait::async_trait;
use linear_pool_domain::errors::Revert;
use linear_pool_domain::{Address, U256};
use linear_pool_protocols::prelude::*;

/// Result of a submitted rebalance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RebalanceOutcome {
    /// Main token paid to the recipient.
    pub reward: U256,
    /// Main balance after the rebalance.
    pub main_after: U256,
    /// Block the rebalance was mined in.
    pub block_number: u64,
}

/// A pool together with the rebalancer allowed to move its balances.
#[async_trait]
pub trait RebalanceTarget: Send + Sync {
    /// Pool address.
    fn pool(&self) -> Address;

    /// Rebalancer address.
    fn rebalancer(&self) -> Address;

    /// Reads the pool. Fails like the pool's own rate query would.
    async fn snapshot(&self) -> Result<PoolSnapshot, Revert>;

    /// Reward `rebalance` would pay right now, without submitting it.
    async fn preview(&self, recipient: Address) -> Result<U256, Revert>;

    /// Submits `rebalance(recipient)`.
    async fn rebalance(&self, recipient: Address) -> Result<RebalanceOutcome, Revert>;
}

/// A factory-created linear pool and its rebalancer.
#[derive(Debug, Clone)]
pub struct ManagedPool {
    pool: LinearPoolContract,
    rebalancer: RebalancerContract,
    main_decimals: u8,
}

impl ManagedPool {
    /// Looks `pool` up in `factory`, signing with the factory handle's account.
    pub async fn from_factory(
        factory: &FactoryContract,
        pool: Address,
    ) -> Result<Self, KeeperError> {
        if !factory.is_pool_from_factory(pool).await? {
            return Err(KeeperError::NotFromFactory(pool));
        }
        let rebalancer = factory
            .rebalancer_of(pool)
            .await?
            .ok_or(KeeperError::NoRebalancer(pool))?;

        let pool = factory.linear_pool(pool);
        let main = Erc20Contract::new(
            pool.chain().clone(),
            pool.get_main_token().await?,
            factory.signer(),
        );
        Ok(Self {
            main_decimals: main.decimals().await?,
            rebalancer: factory.rebalancer(rebalancer),
            pool,
        })
    }

    pub fn pool_contract(&self) -> &LinearPoolContract {
        &self.pool
    }

    pub fn rebalancer_contract(&self) -> &RebalancerContract {
        &self.rebalancer
    }
}

#[async_trait]
impl RebalanceTarget for ManagedPool {
    fn pool(&self) -> Address {
        self.pool.address()
    }

    fn rebalancer(&self) -> Address {
        self.rebalancer.address()
    }

    async fn snapshot(&self) -> Result<PoolSnapshot, Revert> {
        let wrapped_rate = self.pool.get_wrapped_token_rate().await?;
        let balances = self.pool.get_balances().await?;
        let (lower_target, upper_target) = self.pool.get_targets().await?;
        Ok(PoolSnapshot {
            pool: self.pool.address(),
            main_balance: balances.main,
            wrapped_balance: balances.wrapped,
            lower_target,
            upper_target,
            wrapped_rate,
            main_decimals: self.main_decimals,
        })
    }

    async fn preview(&self, recipient: Address) -> Result<U256, Revert> {
        self.rebalancer.static_rebalance(recipient).await
    }

    async fn rebalance(&self, recipient: Address) -> Result<RebalanceOutcome, Revert> {
        let (reward, receipt) = self.rebalancer.rebalance(recipient).await?;
        let balances = self.pool.get_balances().await?;
        Ok(RebalanceOutcome {
            reward,
            main_after: balances.main,
            block_number: receipt.block_number,
        })
    }
}
