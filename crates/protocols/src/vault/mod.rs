//! Vault: pool registry and token balances.
//!
//! The vault custodies every pool's tokens. Each registered token keeps a
//! `cash` balance held by the vault and a `managed` balance held by its
//! asset manager; pools price swaps against the sum of both.

mod balances;
mod swaps;

pub use balances::PoolBalanceOp;
pub use swaps::{FundManagement, SingleSwap, SwapRequest};

use crate::chain::{ChainState, Event};
use linear_pool_domain::enums::PoolSpecialization;
use linear_pool_domain::errors::{MathError, Revert};
use linear_pool_domain::value_objects::PoolId;
use linear_pool_domain::{Address, U256, ZERO_ADDRESS};
use serde::Serialize;
use std::collections::HashMap;
use tracing::debug;

/// Balance of one pool token, split between vault and asset manager.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TokenBalance {
    pub cash: U256,
    pub managed: U256,
    pub last_change_block: u64,
}

impl TokenBalance {
    pub fn total(&self) -> Result<U256, MathError> {
        self.cash
            .checked_add(self.managed)
            .ok_or(MathError::AddOverflow)
    }
}

/// Result of `get_pool_token_info`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PoolTokenInfo {
    pub cash: U256,
    pub managed: U256,
    pub last_change_block: u64,
    pub asset_manager: Address,
}

/// Result of `get_pool_tokens`: registered tokens and their total balances.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PoolTokens {
    pub tokens: Vec<Address>,
    pub balances: Vec<U256>,
    pub last_change_block: u64,
}

impl PoolTokens {
    pub fn index_of(&self, token: Address) -> Option<usize> {
        self.tokens.iter().position(|t| *t == token)
    }

    pub fn balance_of(&self, token: Address) -> Option<U256> {
        self.index_of(token).map(|i| self.balances[i])
    }
}

#[derive(Debug, Clone)]
pub struct PoolRegistration {
    pool: Address,
    specialization: PoolSpecialization,
    tokens: Vec<Address>,
    balances: HashMap<Address, TokenBalance>,
    asset_managers: HashMap<Address, Address>,
}

impl PoolRegistration {
    pub fn pool(&self) -> Address {
        self.pool
    }

    pub fn specialization(&self) -> PoolSpecialization {
        self.specialization
    }

    pub fn tokens(&self) -> &[Address] {
        &self.tokens
    }

    fn balance(&self, token: Address) -> Result<&TokenBalance, Revert> {
        self.balances.get(&token).ok_or(Revert::TokenNotRegistered)
    }

    fn balance_mut(&mut self, token: Address) -> Result<&mut TokenBalance, Revert> {
        self.balances
            .get_mut(&token)
            .ok_or(Revert::TokenNotRegistered)
    }

    fn asset_manager(&self, token: Address) -> Address {
        self.asset_managers
            .get(&token)
            .copied()
            .unwrap_or(ZERO_ADDRESS)
    }

    fn pool_tokens(&self) -> Result<PoolTokens, Revert> {
        let mut balances = Vec::with_capacity(self.tokens.len());
        let mut last_change_block = 0;
        for token in &self.tokens {
            let balance = self.balance(*token)?;
            balances.push(balance.total()?);
            last_change_block = last_change_block.max(balance.last_change_block);
        }
        Ok(PoolTokens {
            tokens: self.tokens.clone(),
            balances,
            last_change_block,
        })
    }
}

/// State of a deployed vault.
#[derive(Debug, Clone, Default)]
pub struct Vault {
    pools: HashMap<PoolId, PoolRegistration>,
    next_pool_nonce: u64,
}

impl Vault {
    pub fn pool(&self, pool_id: &PoolId) -> Result<&PoolRegistration, Revert> {
        self.pools.get(pool_id).ok_or(Revert::InvalidPoolId)
    }

    fn pool_mut(&mut self, pool_id: &PoolId) -> Result<&mut PoolRegistration, Revert> {
        self.pools.get_mut(pool_id).ok_or(Revert::InvalidPoolId)
    }

    pub fn pool_count(&self) -> usize {
        self.pools.len()
    }
}

impl ChainState {
    pub fn deploy_vault(&mut self) -> Address {
        let address = self.allocate_address();
        self.vaults.insert(address, Vault::default());
        address
    }

    /// Registers the calling contract as a pool.
    pub fn vault_register_pool(
        &mut self,
        vault: Address,
        caller: Address,
        specialization: PoolSpecialization,
    ) -> Result<PoolId, Revert> {
        let state = self.vault_mut(vault)?;
        let pool_id = PoolId::new(caller, specialization, state.next_pool_nonce);
        state.next_pool_nonce += 1;
        state.pools.insert(
            pool_id,
            PoolRegistration {
                pool: caller,
                specialization,
                tokens: Vec::new(),
                balances: HashMap::new(),
                asset_managers: HashMap::new(),
            },
        );

        self.emit(
            vault,
            Event::PoolRegistered {
                pool_id,
                pool: caller,
                specialization,
            },
        );
        debug!(%pool_id, pool = ?caller, "Pool registered");
        Ok(pool_id)
    }

    /// Registers `tokens` for a pool, keeping the registry sorted by address.
    pub fn vault_register_tokens(
        &mut self,
        vault: Address,
        caller: Address,
        pool_id: PoolId,
        tokens: &[Address],
        asset_managers: &[Address],
    ) -> Result<(), Revert> {
        if tokens.len() != asset_managers.len() {
            return Err(Revert::InputLengthMismatch);
        }

        let registration = self.vault_mut(vault)?.pool_mut(&pool_id)?;
        if registration.pool != caller {
            return Err(Revert::CallerNotPool);
        }

        for (token, manager) in tokens.iter().zip(asset_managers) {
            if token.is_zero() {
                return Err(Revert::InvalidToken);
            }
            if registration.balances.contains_key(token) {
                return Err(Revert::TokenAlreadyRegistered);
            }
            registration.tokens.push(*token);
            registration
                .balances
                .insert(*token, TokenBalance::default());
            registration.asset_managers.insert(*token, *manager);
        }
        registration.tokens.sort();

        self.emit(
            vault,
            Event::TokensRegistered {
                pool_id,
                tokens: tokens.to_vec(),
                asset_managers: asset_managers.to_vec(),
            },
        );
        Ok(())
    }

    pub fn vault_get_pool_tokens(
        &self,
        vault: Address,
        pool_id: PoolId,
    ) -> Result<PoolTokens, Revert> {
        self.vault(vault)?.pool(&pool_id)?.pool_tokens()
    }

    pub fn vault_get_pool_token_info(
        &self,
        vault: Address,
        pool_id: PoolId,
        token: Address,
    ) -> Result<PoolTokenInfo, Revert> {
        let registration = self.vault(vault)?.pool(&pool_id)?;
        let balance = registration.balance(token)?;
        Ok(PoolTokenInfo {
            cash: balance.cash,
            managed: balance.managed,
            last_change_block: balance.last_change_block,
            asset_manager: registration.asset_manager(token),
        })
    }

    /// Credits tokens the vault already holds to a pool's cash. Pools use
    /// this to account for BPT minted straight to the vault.
    pub(crate) fn vault_credit_pool_cash(
        &mut self,
        vault: Address,
        pool_id: PoolId,
        token: Address,
        amount: U256,
    ) -> Result<(), Revert> {
        let block = self.block().number;
        let balance = self.vault_mut(vault)?.pool_mut(&pool_id)?.balance_mut(token)?;
        balance.cash = balance
            .cash
            .checked_add(amount)
            .ok_or(MathError::AddOverflow)?;
        balance.last_change_block = block;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pool_address() -> Address {
        Address::from_low_u64_be(0xb00)
    }

    fn setup() -> (ChainState, Address, PoolId, Address, Address) {
        let mut state = ChainState::default();
        let vault = state.deploy_vault();
        let dai = state.deploy_erc20("Dai", "DAI", 18);
        let edai = state.deploy_erc20("Euler Dai", "eDAI", 18);
        let pool_id = state
            .vault_register_pool(vault, pool_address(), PoolSpecialization::General)
            .unwrap();
        (state, vault, pool_id, dai, edai)
    }

    #[test]
    fn test_register_pool_assigns_increasing_nonces() {
        let mut state = ChainState::default();
        let vault = state.deploy_vault();

        let first = state
            .vault_register_pool(vault, pool_address(), PoolSpecialization::General)
            .unwrap();
        let second = state
            .vault_register_pool(vault, pool_address(), PoolSpecialization::General)
            .unwrap();

        assert_eq!(first.nonce(), 0);
        assert_eq!(second.nonce(), 1);
        assert_eq!(first.pool_address(), pool_address());
        assert_eq!(state.vault(vault).unwrap().pool_count(), 2);
    }

    #[test]
    fn test_register_tokens_sorts_and_records_managers() {
        let (mut state, vault, pool_id, dai, edai) = setup();
        let manager = Address::from_low_u64_be(0x77);

        state
            .vault_register_tokens(vault, pool_address(), pool_id, &[edai, dai], &[manager, ZERO_ADDRESS])
            .unwrap();

        let tokens = state.vault_get_pool_tokens(vault, pool_id).unwrap();
        assert_eq!(tokens.tokens, vec![dai, edai]);
        assert_eq!(tokens.balances, vec![U256::zero(), U256::zero()]);

        let info = state
            .vault_get_pool_token_info(vault, pool_id, edai)
            .unwrap();
        assert_eq!(info.asset_manager, manager);
        let info = state.vault_get_pool_token_info(vault, pool_id, dai).unwrap();
        assert_eq!(info.asset_manager, ZERO_ADDRESS);
    }

    #[test]
    fn test_register_tokens_rejects_bad_input() {
        let (mut state, vault, pool_id, dai, edai) = setup();

        let not_pool = Address::from_low_u64_be(0x99);
        assert_eq!(
            state.vault_register_tokens(vault, not_pool, pool_id, &[dai], &[ZERO_ADDRESS]),
            Err(Revert::CallerNotPool)
        );
        assert_eq!(
            state.vault_register_tokens(vault, pool_address(), pool_id, &[dai, edai], &[ZERO_ADDRESS]),
            Err(Revert::InputLengthMismatch)
        );
        assert_eq!(
            state.vault_register_tokens(
                vault,
                pool_address(),
                pool_id,
                &[dai, dai],
                &[ZERO_ADDRESS, ZERO_ADDRESS]
            ),
            Err(Revert::TokenAlreadyRegistered)
        );
    }

    #[test]
    fn test_unknown_pool_and_token() {
        let (state, vault, pool_id, dai, _) = setup();
        let unknown = PoolId::new(pool_address(), PoolSpecialization::General, 42);

        assert_eq!(
            state.vault_get_pool_tokens(vault, unknown).unwrap_err(),
            Revert::InvalidPoolId
        );
        assert_eq!(
            state
                .vault_get_pool_token_info(vault, pool_id, dai)
                .unwrap_err(),
            Revert::TokenNotRegistered
        );
    }
}
