use super::PoolTokens;
use crate::chain::{ChainState, Event};
use linear_pool_domain::enums::SwapKind;
use linear_pool_domain::errors::{MathError, Revert};
use linear_pool_domain::value_objects::PoolId;
use linear_pool_domain::{Address, U256};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// A swap against a single pool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SingleSwap {
    pub pool_id: PoolId,
    pub kind: SwapKind,
    pub asset_in: Address,
    pub asset_out: Address,
    /// Amount in for `GivenIn`, amount out for `GivenOut`.
    pub amount: U256,
}

/// Where swap input comes from and output goes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FundManagement {
    pub sender: Address,
    pub recipient: Address,
}

/// What the vault hands a pool when asking it to price a swap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwapRequest {
    pub kind: SwapKind,
    pub token_in: Address,
    pub token_out: Address,
    pub amount: U256,
    pub pool_id: PoolId,
    pub last_change_block: u64,
    pub from: Address,
    pub to: Address,
}

impl ChainState {
    /// Prices a swap without executing it. Returns `(amount_in, amount_out)`.
    pub fn vault_query_swap(
        &self,
        vault: Address,
        swap: &SingleSwap,
    ) -> Result<(U256, U256), Revert> {
        let funds = FundManagement {
            sender: vault,
            recipient: vault,
        };
        self.price_swap(vault, swap, &funds)
    }

    /// Executes a single swap and returns the calculated amount: the amount
    /// out for `GivenIn`, the amount in for `GivenOut`.
    pub fn vault_swap(
        &mut self,
        vault: Address,
        caller: Address,
        swap: &SingleSwap,
        funds: &FundManagement,
        limit: U256,
        deadline: u64,
    ) -> Result<U256, Revert> {
        if self.block().timestamp > deadline {
            return Err(Revert::SwapDeadline);
        }
        if funds.sender != caller {
            return Err(Revert::SenderNotAllowed);
        }

        let (amount_in, amount_out) = self.price_swap(vault, swap, funds)?;
        let within_limit = match swap.kind {
            SwapKind::GivenIn => amount_out >= limit,
            SwapKind::GivenOut => amount_in <= limit,
        };
        if !within_limit {
            return Err(Revert::SwapLimit);
        }

        let block = self.block().number;
        let registration = self.vault_mut(vault)?.pool_mut(&swap.pool_id)?;
        let balance_in = registration.balance_mut(swap.asset_in)?;
        balance_in.cash = balance_in
            .cash
            .checked_add(amount_in)
            .ok_or(MathError::AddOverflow)?;
        balance_in.last_change_block = block;
        let balance_out = registration.balance_mut(swap.asset_out)?;
        balance_out.cash = balance_out
            .cash
            .checked_sub(amount_out)
            .ok_or(Revert::InsufficientCash)?;
        balance_out.last_change_block = block;

        self.erc20_transfer_from(swap.asset_in, vault, funds.sender, vault, amount_in)?;
        self.erc20_transfer(swap.asset_out, vault, funds.recipient, amount_out)?;

        self.emit(
            vault,
            Event::Swap {
                pool_id: swap.pool_id,
                token_in: swap.asset_in,
                token_out: swap.asset_out,
                amount_in,
                amount_out,
            },
        );
        debug!(
            pool_id = %swap.pool_id,
            amount_in = %amount_in,
            amount_out = %amount_out,
            "Swap executed"
        );

        Ok(match swap.kind {
            SwapKind::GivenIn => amount_out,
            SwapKind::GivenOut => amount_in,
        })
    }

    fn price_swap(
        &self,
        vault: Address,
        swap: &SingleSwap,
        funds: &FundManagement,
    ) -> Result<(U256, U256), Revert> {
        if swap.amount.is_zero() {
            return Err(Revert::UnknownAmountInFirstSwap);
        }
        if swap.asset_in == swap.asset_out {
            return Err(Revert::CannotSwapSameToken);
        }

        let registration = self.vault(vault)?.pool(&swap.pool_id)?;
        let pool_tokens: PoolTokens = registration.pool_tokens()?;
        let cash_out = registration.balance(swap.asset_out)?.cash;
        registration.balance(swap.asset_in)?;

        let request = SwapRequest {
            kind: swap.kind,
            token_in: swap.asset_in,
            token_out: swap.asset_out,
            amount: swap.amount,
            pool_id: swap.pool_id,
            last_change_block: pool_tokens.last_change_block,
            from: funds.sender,
            to: funds.recipient,
        };
        let calculated =
            self.linear_pool_on_swap(registration.pool(), vault, &request, &pool_tokens)?;

        let (amount_in, amount_out) = match swap.kind {
            SwapKind::GivenIn => (swap.amount, calculated),
            SwapKind::GivenOut => (calculated, swap.amount),
        };
        if amount_out > cash_out {
            return Err(Revert::InsufficientCash);
        }
        Ok((amount_in, amount_out))
    }
}
