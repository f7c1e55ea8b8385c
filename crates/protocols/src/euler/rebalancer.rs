//! Rebalancer for Euler linear pools.
//!
//! Registered as the asset manager of a pool's main and wrapped tokens, the
//! rebalancer moves the main balance back to the middle of the target range.
//! It prices the move with a swap quote, so the pool ends up exactly as if
//! someone had swapped against it, and whatever main token is left over
//! after wrapping or unwrapping at Euler goes to the caller's recipient.

use super::token::EulerToken;
use crate::chain::ChainState;
use crate::vault::{PoolBalanceOp, SingleSwap};
use linear_pool_domain::enums::SwapKind;
use linear_pool_domain::errors::{MathError, Revert};
use linear_pool_domain::math::fixed_point as fp;
use linear_pool_domain::value_objects::PoolId;
use linear_pool_domain::{Address, U256};
use tracing::{debug, info};

#[derive(Debug, Clone)]
pub struct EulerLinearPoolRebalancer {
    address: Address,
    pool: Address,
    vault: Address,
    queries: Address,
    pool_id: PoolId,
    main_token: Address,
    wrapped_token: Address,
    euler_protocol: Address,
}

impl EulerLinearPoolRebalancer {
    pub fn address(&self) -> Address {
        self.address
    }

    pub fn pool(&self) -> Address {
        self.pool
    }

    pub fn vault(&self) -> Address {
        self.vault
    }

    pub fn queries(&self) -> Address {
        self.queries
    }

    /// Spender the rebalancer approves when wrapping main tokens.
    pub fn euler_protocol(&self) -> Address {
        self.euler_protocol
    }
}

impl ChainState {
    /// Installs a rebalancer for `pool` at a previously allocated address and
    /// grants the approvals it needs.
    pub(crate) fn deploy_rebalancer_at(
        &mut self,
        address: Address,
        pool: Address,
        queries: Address,
        euler_protocol: Address,
    ) -> Result<(), Revert> {
        let pool_state = self.linear_pool(pool)?;
        let rebalancer = EulerLinearPoolRebalancer {
            address,
            pool,
            vault: pool_state.vault(),
            queries,
            pool_id: pool_state.pool_id(),
            main_token: pool_state.main_token(),
            wrapped_token: pool_state.wrapped_token(),
            euler_protocol,
        };

        self.erc20_approve(rebalancer.main_token, address, rebalancer.vault, U256::MAX)?;
        self.erc20_approve(rebalancer.wrapped_token, address, rebalancer.vault, U256::MAX)?;
        self.erc20_approve(rebalancer.main_token, address, euler_protocol, U256::MAX)?;

        self.rebalancers.insert(address, rebalancer);
        Ok(())
    }

    /// Rebalances the pool and sends the surplus main token to `recipient`.
    /// Returns the amount sent.
    pub fn rebalancer_rebalance(
        &mut self,
        rebalancer: Address,
        caller: Address,
        recipient: Address,
    ) -> Result<U256, Revert> {
        self.rebalancer_rebalance_with_extra_main(rebalancer, caller, recipient, U256::zero())
    }

    /// Like [`ChainState::rebalancer_rebalance`], but first pulls
    /// `extra_main` from the caller to cover rounding shortfalls when
    /// unwrapping.
    pub fn rebalancer_rebalance_with_extra_main(
        &mut self,
        rebalancer: Address,
        caller: Address,
        recipient: Address,
        extra_main: U256,
    ) -> Result<U256, Revert> {
        let r = self.rebalancer(rebalancer)?.clone();
        if !extra_main.is_zero() {
            self.erc20_transfer_from(r.main_token, r.address, caller, r.address, extra_main)?;
        }

        // A compromised rate source fails the whole rebalance up front.
        self.linear_pool_wrapped_token_rate(r.pool)?;

        let current = self.linear_pool_balances(r.pool)?.main;
        let (lower, upper) = self.linear_pool_targets(r.pool)?;
        let desired = fp::add(lower, upper)? / 2;

        if current < desired {
            self.rebalance_lack_of_main(&r, desired - current)?;
        } else if current > desired {
            self.rebalance_excess_of_main(&r, current - desired)?;
        }

        let reward = self.erc20_balance_of(r.main_token, r.address)?;
        if !reward.is_zero() {
            self.erc20_transfer(r.main_token, r.address, recipient, reward)?;
        }
        info!(
            pool = ?r.pool,
            from = %current,
            to = %desired,
            reward = %reward,
            "Pool rebalanced"
        );
        Ok(reward)
    }

    /// Buys `amount` main into the pool with wrapped taken out of it.
    fn rebalance_lack_of_main(
        &mut self,
        r: &EulerLinearPoolRebalancer,
        amount: U256,
    ) -> Result<(), Revert> {
        let wrapped_out = self.queries_query_swap(
            r.queries,
            &SingleSwap {
                pool_id: r.pool_id,
                kind: SwapKind::GivenIn,
                asset_in: r.main_token,
                asset_out: r.wrapped_token,
                amount,
            },
        )?;
        debug!(main_in = %amount, wrapped_out = %wrapped_out, "Rebalancing lack of main");

        self.take_from_pool(r, r.wrapped_token, wrapped_out)?;
        let underlying = self.euler_convert_balance_to_underlying(r.wrapped_token, wrapped_out)?;
        self.euler_withdraw(r.wrapped_token, r.address, underlying)?;
        self.give_to_pool(r, r.main_token, amount)
    }

    /// Sells `amount` main out of the pool for freshly wrapped tokens.
    fn rebalance_excess_of_main(
        &mut self,
        r: &EulerLinearPoolRebalancer,
        amount: U256,
    ) -> Result<(), Revert> {
        let wrapped_in = self.queries_query_swap(
            r.queries,
            &SingleSwap {
                pool_id: r.pool_id,
                kind: SwapKind::GivenOut,
                asset_in: r.wrapped_token,
                asset_out: r.main_token,
                amount,
            },
        )?;
        debug!(main_out = %amount, wrapped_in = %wrapped_in, "Rebalancing excess of main");

        self.take_from_pool(r, r.main_token, amount)?;
        let to_wrap = self.required_tokens_to_wrap(r.wrapped_token, wrapped_in)?;
        self.euler_deposit(r.wrapped_token, r.address, to_wrap)?;
        self.give_to_pool(r, r.wrapped_token, wrapped_in)
    }

    /// Underlying needed to mint at least `wrapped_amount` eTokens.
    fn required_tokens_to_wrap(
        &self,
        wrapped_token: Address,
        wrapped_amount: U256,
    ) -> Result<U256, Revert> {
        let etoken = self.euler_token(wrapped_token)?;
        let underlying = etoken
            .convert_balance_to_underlying(wrapped_amount)
            .map_err(Revert::bubble_up_non_malicious)?;
        let minted = etoken
            .convert_underlying_to_balance(underlying)
            .map_err(Revert::bubble_up_non_malicious)?;
        if minted < wrapped_amount {
            Ok(underlying
                .checked_add(U256::one())
                .ok_or(MathError::AddOverflow)?)
        } else {
            Ok(underlying)
        }
    }

    /// Withdraws `amount` of `token` from the pool and reports it as gone.
    fn take_from_pool(
        &mut self,
        r: &EulerLinearPoolRebalancer,
        token: Address,
        amount: U256,
    ) -> Result<(), Revert> {
        let managed = self
            .vault_get_pool_token_info(r.vault, r.pool_id, token)?
            .managed;
        self.vault_manage_pool_balance(
            r.vault,
            r.address,
            &[
                PoolBalanceOp::withdraw(r.pool_id, token, amount),
                PoolBalanceOp::update(r.pool_id, token, managed),
            ],
        )
    }

    /// Reports `amount` of `token` as managed and deposits it into the pool.
    fn give_to_pool(
        &mut self,
        r: &EulerLinearPoolRebalancer,
        token: Address,
        amount: U256,
    ) -> Result<(), Revert> {
        let managed = self
            .vault_get_pool_token_info(r.vault, r.pool_id, token)?
            .managed;
        self.vault_manage_pool_balance(
            r.vault,
            r.address,
            &[
                PoolBalanceOp::update(r.pool_id, token, fp::add(managed, amount)?),
                PoolBalanceOp::deposit(r.pool_id, token, amount),
            ],
        )
    }
}
