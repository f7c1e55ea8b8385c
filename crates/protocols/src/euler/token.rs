//! Mock Euler eToken.
//!
//! The eToken is an 18-decimal ERC-20 whose balance converts to the
//! underlying asset at an adjustable exchange rate. Its conversion views can
//! be told to revert, either with a plain reason or with data shaped like a
//! vault query result, to model a compromised rate source.

use crate::chain::ChainState;
use crate::erc20::Erc20;
use linear_pool_domain::enums::RevertType;
use linear_pool_domain::errors::{
    JOIN_EXIT_QUERY_SELECTOR, MathError, Revert, RevertData, SWAP_QUERY_SELECTOR,
};
use linear_pool_domain::math::fixed_point as fp;
use linear_pool_domain::{Address, U256};
use tracing::debug;

/// Reason used by [`RevertType::NonMalicious`].
pub const NON_MALICIOUS_REVERT: &str = "NON_MALICIOUS_REVERT";

/// Rate interface the linear pool and rebalancer rely on.
pub trait EulerToken {
    /// Asset the eToken is a claim on.
    fn underlying_asset(&self) -> Address;

    /// Underlying amount an eToken `balance` is worth.
    fn convert_balance_to_underlying(&self, balance: U256) -> Result<U256, RevertData>;

    /// eToken balance `underlying` is worth.
    fn convert_underlying_to_balance(&self, underlying: U256) -> Result<U256, RevertData>;
}

#[derive(Debug, Clone)]
pub struct MockEulerToken {
    underlying: Address,
    underlying_decimals: u8,
    euler_protocol: Address,
    exchange_rate_multiplicator: U256,
    revert_type: RevertType,
}

impl MockEulerToken {
    pub fn euler_protocol(&self) -> Address {
        self.euler_protocol
    }

    pub fn exchange_rate_multiplicator(&self) -> U256 {
        self.exchange_rate_multiplicator
    }

    pub fn revert_type(&self) -> RevertType {
        self.revert_type
    }

    fn decimals_factor(&self) -> U256 {
        fp::exp10(18u32.saturating_sub(self.underlying_decimals as u32))
    }

    fn maybe_revert(&self) -> Result<(), RevertData> {
        match self.revert_type {
            RevertType::DoNotRevert => Ok(()),
            RevertType::NonMalicious => Err(RevertData::from_reason(NON_MALICIOUS_REVERT)),
            // offset, length, then two amounts
            RevertType::MaliciousSwapQuery => Err(RevertData::with_selector(
                SWAP_QUERY_SELECTOR,
                &[0x20, 2, 1, 2],
            )),
            // bpt amount, offset, length, then two amounts
            RevertType::MaliciousJoinExitQuery => Err(RevertData::with_selector(
                JOIN_EXIT_QUERY_SELECTOR,
                &[1, 0x40, 2, 1, 2],
            )),
        }
    }

    fn to_underlying(&self, balance: U256, round_up: bool) -> Result<U256, MathError> {
        fp::div(
            fp::mul(balance, self.exchange_rate_multiplicator)?,
            self.decimals_factor(),
            round_up,
        )
    }

    fn to_balance(&self, underlying: U256, round_up: bool) -> Result<U256, MathError> {
        fp::div(
            fp::mul(underlying, self.decimals_factor())?,
            self.exchange_rate_multiplicator,
            round_up,
        )
    }
}

impl EulerToken for MockEulerToken {
    fn underlying_asset(&self) -> Address {
        self.underlying
    }

    fn convert_balance_to_underlying(&self, balance: U256) -> Result<U256, RevertData> {
        self.maybe_revert()?;
        self.to_underlying(balance, false)
            .map_err(|e| RevertData::from_reason(&e.to_string()))
    }

    fn convert_underlying_to_balance(&self, underlying: U256) -> Result<U256, RevertData> {
        self.maybe_revert()?;
        self.to_balance(underlying, false)
            .map_err(|e| RevertData::from_reason(&e.to_string()))
    }
}

impl ChainState {
    /// Deploys an eToken over `underlying`. Deposits are pulled with an
    /// allowance granted to `euler_protocol`, which defaults to the token
    /// itself and also holds the deposited underlying.
    pub fn deploy_mock_euler_token(
        &mut self,
        name: &str,
        symbol: &str,
        underlying: Address,
        euler_protocol: Option<Address>,
    ) -> Result<Address, Revert> {
        let underlying_decimals = self.erc20(underlying)?.decimals();
        let address = self.allocate_address();
        self.erc20s.insert(address, Erc20::new(name, symbol, 18));
        self.euler_tokens.insert(
            address,
            MockEulerToken {
                underlying,
                underlying_decimals,
                euler_protocol: euler_protocol.unwrap_or(address),
                exchange_rate_multiplicator: U256::one(),
                revert_type: RevertType::DoNotRevert,
            },
        );
        Ok(address)
    }

    pub fn euler_underlying_asset(&self, token: Address) -> Result<Address, Revert> {
        Ok(self.euler_token(token)?.underlying_asset())
    }

    pub fn euler_convert_balance_to_underlying(
        &self,
        token: Address,
        balance: U256,
    ) -> Result<U256, Revert> {
        self.euler_token(token)?
            .convert_balance_to_underlying(balance)
            .map_err(Revert::bubble_up_non_malicious)
    }

    pub fn euler_set_exchange_rate_multiplicator(
        &mut self,
        token: Address,
        multiplicator: U256,
    ) -> Result<(), Revert> {
        if multiplicator.is_zero() {
            return Err(MathError::ZeroDivision.into());
        }
        self.euler_token_mut(token)?.exchange_rate_multiplicator = multiplicator;
        debug!(token = ?token, multiplicator = %multiplicator, "Exchange rate changed");
        Ok(())
    }

    pub fn euler_set_revert_type(
        &mut self,
        token: Address,
        revert_type: RevertType,
    ) -> Result<(), Revert> {
        self.euler_token_mut(token)?.revert_type = revert_type;
        Ok(())
    }

    /// Deposits `amount` of underlying and mints the eTokens it is worth,
    /// rounding down. Returns the eTokens minted.
    pub fn euler_deposit(
        &mut self,
        token: Address,
        caller: Address,
        amount: U256,
    ) -> Result<U256, Revert> {
        let etoken = self.euler_token(token)?;
        let (underlying, protocol) = (etoken.underlying, etoken.euler_protocol);
        let minted = etoken.to_balance(amount, false)?;

        self.erc20_transfer_from(underlying, protocol, caller, protocol, amount)?;
        self.erc20_mint(token, caller, minted)?;
        Ok(minted)
    }

    /// Withdraws `amount` of underlying, burning the eTokens it is worth
    /// rounded up. Returns the eTokens burned.
    pub fn euler_withdraw(
        &mut self,
        token: Address,
        caller: Address,
        amount: U256,
    ) -> Result<U256, Revert> {
        let etoken = self.euler_token(token)?;
        let (underlying, protocol) = (etoken.underlying, etoken.euler_protocol);
        let burned = etoken.to_balance(amount, true)?;

        self.erc20_burn(token, caller, burned)?;
        self.erc20_transfer(underlying, protocol, caller, amount)?;
        Ok(burned)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use linear_pool_domain::math::fixed_point::ONE;

    fn user() -> Address {
        Address::from_low_u64_be(0x1001)
    }

    fn setup(decimals: u8) -> (ChainState, Address, Address) {
        let mut state = ChainState::default();
        let main = state.deploy_erc20("Main", "MAIN", decimals);
        let etoken = state
            .deploy_mock_euler_token("Euler Main", "eMAIN", main, None)
            .unwrap();
        (state, main, etoken)
    }

    #[test]
    fn test_conversion_follows_multiplicator() {
        let (mut state, main, etoken) = setup(18);
        let token = state.euler_token(etoken).unwrap();
        assert_eq!(token.underlying_asset(), main);
        assert_eq!(token.convert_balance_to_underlying(ONE), Ok(ONE));

        state
            .euler_set_exchange_rate_multiplicator(etoken, U256::from(2))
            .unwrap();
        let token = state.euler_token(etoken).unwrap();
        assert_eq!(token.convert_balance_to_underlying(ONE), Ok(ONE * 2));
        assert_eq!(token.convert_underlying_to_balance(ONE * 2), Ok(ONE));
    }

    #[test]
    fn test_conversion_scales_to_underlying_decimals() {
        let (state, _, etoken) = setup(6);
        let token = state.euler_token(etoken).unwrap();
        assert_eq!(
            token.convert_balance_to_underlying(ONE),
            Ok(U256::from(1_000_000))
        );
        assert_eq!(
            token.convert_underlying_to_balance(U256::from(1_000_000)),
            Ok(ONE)
        );
    }

    #[test]
    fn test_revert_types() {
        let (mut state, _, etoken) = setup(18);

        state
            .euler_set_revert_type(etoken, RevertType::NonMalicious)
            .unwrap();
        let data = state
            .euler_token(etoken)
            .unwrap()
            .convert_balance_to_underlying(ONE)
            .unwrap_err();
        assert_eq!(data.reason().as_deref(), Some(NON_MALICIOUS_REVERT));
        assert!(!data.is_query_result());

        state
            .euler_set_revert_type(etoken, RevertType::MaliciousSwapQuery)
            .unwrap();
        let data = state
            .euler_token(etoken)
            .unwrap()
            .convert_balance_to_underlying(ONE)
            .unwrap_err();
        assert_eq!(data.selector(), Some(SWAP_QUERY_SELECTOR));

        state
            .euler_set_revert_type(etoken, RevertType::MaliciousJoinExitQuery)
            .unwrap();
        let data = state
            .euler_token(etoken)
            .unwrap()
            .convert_underlying_to_balance(ONE)
            .unwrap_err();
        assert_eq!(data.selector(), Some(JOIN_EXIT_QUERY_SELECTOR));
    }

    #[test]
    fn test_deposit_and_withdraw() {
        let (mut state, main, etoken) = setup(18);
        state.erc20_mint(main, user(), ONE * 10).unwrap();
        state
            .erc20_approve(main, user(), etoken, U256::MAX)
            .unwrap();
        state
            .euler_set_exchange_rate_multiplicator(etoken, U256::from(2))
            .unwrap();

        let minted = state.euler_deposit(etoken, user(), ONE * 10).unwrap();
        assert_eq!(minted, ONE * 5);
        assert_eq!(state.erc20_balance_of(main, etoken).unwrap(), ONE * 10);

        let burned = state.euler_withdraw(etoken, user(), ONE * 4).unwrap();
        assert_eq!(burned, ONE * 2);
        assert_eq!(state.erc20_balance_of(etoken, user()).unwrap(), ONE * 3);
        assert_eq!(state.erc20_balance_of(main, user()).unwrap(), ONE * 4);
    }

    #[test]
    fn test_deposit_requires_allowance_to_protocol() {
        let (mut state, main, etoken) = setup(18);
        state.erc20_mint(main, user(), ONE).unwrap();

        assert_eq!(
            state.euler_deposit(etoken, user(), ONE),
            Err(Revert::TransferExceedsAllowance)
        );
    }
}
