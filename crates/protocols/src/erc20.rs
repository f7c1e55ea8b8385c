//! ERC-20 ledgers.
//!
//! Every token lives in [`ChainState`] keyed by its address, including the
//! Euler eTokens and the linear pools' BPT.

use crate::chain::{ChainState, Event};
use linear_pool_domain::entities::Token;
use linear_pool_domain::errors::{MathError, Revert};
use linear_pool_domain::{Address, U256};
use std::collections::HashMap;

/// Balances, allowances and metadata of one token.
#[derive(Debug, Clone)]
pub struct Erc20 {
    name: String,
    symbol: String,
    decimals: u8,
    total_supply: U256,
    balances: HashMap<Address, U256>,
    allowances: HashMap<(Address, Address), U256>,
}

impl Erc20 {
    pub fn new(name: impl Into<String>, symbol: impl Into<String>, decimals: u8) -> Self {
        Self {
            name: name.into(),
            symbol: symbol.into(),
            decimals,
            total_supply: U256::zero(),
            balances: HashMap::new(),
            allowances: HashMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn decimals(&self) -> u8 {
        self.decimals
    }

    pub fn total_supply(&self) -> U256 {
        self.total_supply
    }

    pub fn balance_of(&self, account: Address) -> U256 {
        self.balances.get(&account).copied().unwrap_or_default()
    }

    pub fn allowance(&self, owner: Address, spender: Address) -> U256 {
        self.allowances
            .get(&(owner, spender))
            .copied()
            .unwrap_or_default()
    }

    /// Token metadata for the ledger deployed at `address`.
    pub fn metadata(&self, address: Address) -> Token {
        Token::new(address, self.symbol.clone(), self.decimals, self.name.clone())
    }

    fn mint(&mut self, to: Address, amount: U256) -> Result<(), Revert> {
        self.total_supply = self
            .total_supply
            .checked_add(amount)
            .ok_or(MathError::AddOverflow)?;
        let balance = self.balances.entry(to).or_default();
        *balance = balance.checked_add(amount).ok_or(MathError::AddOverflow)?;
        Ok(())
    }

    fn burn(&mut self, from: Address, amount: U256) -> Result<(), Revert> {
        let balance = self.balance_of(from);
        if balance < amount {
            return Err(Revert::TransferExceedsBalance);
        }
        self.balances.insert(from, balance - amount);
        self.total_supply -= amount;
        Ok(())
    }

    fn move_balance(&mut self, from: Address, to: Address, amount: U256) -> Result<(), Revert> {
        let from_balance = self.balance_of(from);
        if from_balance < amount {
            return Err(Revert::TransferExceedsBalance);
        }
        self.balances.insert(from, from_balance - amount);
        let to_balance = self.balances.entry(to).or_default();
        *to_balance = to_balance
            .checked_add(amount)
            .ok_or(MathError::AddOverflow)?;
        Ok(())
    }

    fn spend_allowance(
        &mut self,
        owner: Address,
        spender: Address,
        amount: U256,
    ) -> Result<(), Revert> {
        let allowance = self.allowance(owner, spender);
        // U256::MAX is an infinite approval
        if allowance == U256::MAX {
            return Ok(());
        }
        if allowance < amount {
            return Err(Revert::TransferExceedsAllowance);
        }
        self.allowances.insert((owner, spender), allowance - amount);
        Ok(())
    }
}

impl ChainState {
    pub fn deploy_erc20(&mut self, name: &str, symbol: &str, decimals: u8) -> Address {
        let address = self.allocate_address();
        self.erc20s
            .insert(address, Erc20::new(name, symbol, decimals));
        address
    }

    pub fn erc20_balance_of(&self, token: Address, account: Address) -> Result<U256, Revert> {
        Ok(self.erc20(token)?.balance_of(account))
    }

    pub fn erc20_transfer(
        &mut self,
        token: Address,
        from: Address,
        to: Address,
        amount: U256,
    ) -> Result<(), Revert> {
        self.erc20_mut(token)?.move_balance(from, to, amount)?;
        self.emit(
            token,
            Event::Transfer {
                from,
                to,
                value: amount,
            },
        );
        Ok(())
    }

    pub fn erc20_transfer_from(
        &mut self,
        token: Address,
        spender: Address,
        from: Address,
        to: Address,
        amount: U256,
    ) -> Result<(), Revert> {
        let ledger = self.erc20_mut(token)?;
        ledger.spend_allowance(from, spender, amount)?;
        ledger.move_balance(from, to, amount)?;
        self.emit(
            token,
            Event::Transfer {
                from,
                to,
                value: amount,
            },
        );
        Ok(())
    }

    pub fn erc20_approve(
        &mut self,
        token: Address,
        owner: Address,
        spender: Address,
        amount: U256,
    ) -> Result<(), Revert> {
        self.erc20_mut(token)?
            .allowances
            .insert((owner, spender), amount);
        self.emit(
            token,
            Event::Approval {
                owner,
                spender,
                value: amount,
            },
        );
        Ok(())
    }

    /// Mints new tokens. Test tokens expose this as a public faucet.
    pub fn erc20_mint(&mut self, token: Address, to: Address, amount: U256) -> Result<(), Revert> {
        self.erc20_mut(token)?.mint(to, amount)?;
        self.emit(
            token,
            Event::Transfer {
                from: Address::zero(),
                to,
                value: amount,
            },
        );
        Ok(())
    }

    pub(crate) fn erc20_burn(
        &mut self,
        token: Address,
        from: Address,
        amount: U256,
    ) -> Result<(), Revert> {
        self.erc20_mut(token)?.burn(from, amount)?;
        self.emit(
            token,
            Event::Transfer {
                from,
                to: Address::zero(),
                value: amount,
            },
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn account(n: u64) -> Address {
        Address::from_low_u64_be(0x1000 + n)
    }

    #[test]
    fn test_transfer_moves_balance() {
        let mut state = ChainState::default();
        let dai = state.deploy_erc20("Dai", "DAI", 18);
        state.erc20_mint(dai, account(1), U256::from(100)).unwrap();

        state
            .erc20_transfer(dai, account(1), account(2), U256::from(40))
            .unwrap();

        let ledger = state.erc20(dai).unwrap();
        assert_eq!(ledger.balance_of(account(1)), U256::from(60));
        assert_eq!(ledger.balance_of(account(2)), U256::from(40));
        assert_eq!(ledger.total_supply(), U256::from(100));
    }

    #[test]
    fn test_transfer_exceeding_balance() {
        let mut state = ChainState::default();
        let dai = state.deploy_erc20("Dai", "DAI", 18);

        let result = state.erc20_transfer(dai, account(1), account(2), U256::one());
        assert_eq!(result, Err(Revert::TransferExceedsBalance));
    }

    #[test]
    fn test_transfer_from_spends_allowance() {
        let mut state = ChainState::default();
        let dai = state.deploy_erc20("Dai", "DAI", 18);
        state.erc20_mint(dai, account(1), U256::from(100)).unwrap();
        state
            .erc20_approve(dai, account(1), account(3), U256::from(30))
            .unwrap();

        state
            .erc20_transfer_from(dai, account(3), account(1), account(2), U256::from(20))
            .unwrap();
        assert_eq!(
            state.erc20(dai).unwrap().allowance(account(1), account(3)),
            U256::from(10)
        );

        let result =
            state.erc20_transfer_from(dai, account(3), account(1), account(2), U256::from(20));
        assert_eq!(result, Err(Revert::TransferExceedsAllowance));
    }

    #[test]
    fn test_infinite_allowance_is_not_spent() {
        let mut state = ChainState::default();
        let dai = state.deploy_erc20("Dai", "DAI", 18);
        state.erc20_mint(dai, account(1), U256::from(100)).unwrap();
        state
            .erc20_approve(dai, account(1), account(3), U256::MAX)
            .unwrap();

        state
            .erc20_transfer_from(dai, account(3), account(1), account(2), U256::from(100))
            .unwrap();
        assert_eq!(
            state.erc20(dai).unwrap().allowance(account(1), account(3)),
            U256::MAX
        );
    }

    #[test]
    fn test_burn_reduces_supply() {
        let mut state = ChainState::default();
        let dai = state.deploy_erc20("Dai", "DAI", 18);
        state.erc20_mint(dai, account(1), U256::from(10)).unwrap();
        state.erc20_burn(dai, account(1), U256::from(4)).unwrap();

        let ledger = state.erc20(dai).unwrap();
        assert_eq!(ledger.total_supply(), U256::from(6));
        assert_eq!(ledger.metadata(dai).symbol, "DAI");
    }
}
