use crate::chain::{ChainState, Event};
use linear_pool_domain::enums::PoolBalanceOpKind;
use linear_pool_domain::errors::{MathError, Revert};
use linear_pool_domain::value_objects::PoolId;
use linear_pool_domain::{Address, U256};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Asset manager operation on one pool token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolBalanceOp {
    pub kind: PoolBalanceOpKind,
    pub pool_id: PoolId,
    pub token: Address,
    pub amount: U256,
}

impl PoolBalanceOp {
    pub fn withdraw(pool_id: PoolId, token: Address, amount: U256) -> Self {
        Self {
            kind: PoolBalanceOpKind::Withdraw,
            pool_id,
            token,
            amount,
        }
    }

    pub fn deposit(pool_id: PoolId, token: Address, amount: U256) -> Self {
        Self {
            kind: PoolBalanceOpKind::Deposit,
            pool_id,
            token,
            amount,
        }
    }

    pub fn update(pool_id: PoolId, token: Address, amount: U256) -> Self {
        Self {
            kind: PoolBalanceOpKind::Update,
            pool_id,
            token,
            amount,
        }
    }
}

impl ChainState {
    /// Applies asset manager operations in order. The caller must be the
    /// asset manager of every token touched.
    pub fn vault_manage_pool_balance(
        &mut self,
        vault: Address,
        caller: Address,
        ops: &[PoolBalanceOp],
    ) -> Result<(), Revert> {
        for op in ops {
            self.apply_pool_balance_op(vault, caller, op)?;
        }
        Ok(())
    }

    fn apply_pool_balance_op(
        &mut self,
        vault: Address,
        caller: Address,
        op: &PoolBalanceOp,
    ) -> Result<(), Revert> {
        let block = self.block().number;
        let registration = self.vault_mut(vault)?.pool_mut(&op.pool_id)?;
        if registration.asset_manager(op.token) != caller {
            return Err(Revert::SenderNotAssetManager);
        }
        let balance = registration.balance_mut(op.token)?;

        match op.kind {
            PoolBalanceOpKind::Withdraw => {
                balance.cash = balance
                    .cash
                    .checked_sub(op.amount)
                    .ok_or(Revert::InsufficientCash)?;
                balance.managed = balance
                    .managed
                    .checked_add(op.amount)
                    .ok_or(MathError::AddOverflow)?;
                balance.last_change_block = block;
                self.erc20_transfer(op.token, vault, caller, op.amount)?;
            }
            PoolBalanceOpKind::Deposit => {
                balance.managed = balance
                    .managed
                    .checked_sub(op.amount)
                    .ok_or(Revert::InsufficientManaged)?;
                balance.cash = balance
                    .cash
                    .checked_add(op.amount)
                    .ok_or(MathError::AddOverflow)?;
                balance.last_change_block = block;
                self.erc20_transfer_from(op.token, vault, caller, vault, op.amount)?;
            }
            PoolBalanceOpKind::Update => {
                balance.managed = op.amount;
                balance.last_change_block = block;
            }
        }

        self.emit(
            vault,
            Event::PoolBalanceManaged {
                pool_id: op.pool_id,
                asset_manager: caller,
                token: op.token,
                kind: op.kind,
                amount: op.amount,
            },
        );
        debug!(
            pool_id = %op.pool_id,
            kind = ?op.kind,
            amount = %op.amount,
            "Pool balance managed"
        );
        Ok(())
    }
}
