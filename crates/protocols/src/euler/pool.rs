//! Euler linear pool.
//!
//! Pairs a main token with its Euler eToken and a pre-minted BPT, all three
//! registered in the vault. Swaps between any two of them are priced with
//! linear math at the eToken's exchange rate.

use super::token::EulerToken;
use crate::chain::{ChainState, Event};
use crate::erc20::Erc20;
use crate::vault::{PoolTokens, SwapRequest};
use linear_pool_domain::enums::{PoolSpecialization, SwapKind};
use linear_pool_domain::errors::Revert;
use linear_pool_domain::math::fixed_point::{self as fp, ONE};
use linear_pool_domain::math::linear_math::{self as lm, Params};
use linear_pool_domain::value_objects::PoolId;
use linear_pool_domain::{Address, U256, ZERO_ADDRESS};
use serde::Serialize;
use tracing::{debug, warn};

/// 1e12 (0.0001%)
pub const MIN_SWAP_FEE_PERCENTAGE: U256 = U256([1_000_000_000_000, 0, 0, 0]);
/// 1e17 (10%)
pub const MAX_SWAP_FEE_PERCENTAGE: U256 = U256([100_000_000_000_000_000, 0, 0, 0]);
/// 2^96 - 1
pub const MAX_UPPER_TARGET: U256 = U256([u64::MAX, 0xffff_ffff, 0, 0]);
/// 2^112 - 1, minted to the vault at creation.
pub const INITIAL_BPT_SUPPLY: U256 = U256([u64::MAX, 0xffff_ffff_ffff, 0, 0]);

/// Constructor arguments of a linear pool.
#[derive(Debug, Clone)]
pub struct NewLinearPool {
    pub vault: Address,
    pub name: String,
    pub symbol: String,
    pub main_token: Address,
    pub wrapped_token: Address,
    /// In main token units.
    pub upper_target: U256,
    pub asset_manager: Address,
    pub swap_fee_percentage: U256,
    pub owner: Address,
    pub version: Option<String>,
}

/// Raw balances of a linear pool in the vault.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LinearPoolBalances {
    pub main: U256,
    pub wrapped: U256,
    pub bpt: U256,
}

#[derive(Debug, Clone)]
pub struct EulerLinearPool {
    address: Address,
    vault: Address,
    pool_id: PoolId,
    main_token: Address,
    wrapped_token: Address,
    asset_manager: Address,
    main_scaling_factor: U256,
    wrapped_scaling_factor: U256,
    rate_scale_factor: U256,
    swap_fee_percentage: U256,
    // upscaled to 18 decimals
    lower_target: U256,
    upper_target: U256,
    owner: Address,
    version: Option<String>,
}

impl EulerLinearPool {
    pub fn address(&self) -> Address {
        self.address
    }

    pub fn vault(&self) -> Address {
        self.vault
    }

    pub fn pool_id(&self) -> PoolId {
        self.pool_id
    }

    pub fn main_token(&self) -> Address {
        self.main_token
    }

    pub fn wrapped_token(&self) -> Address {
        self.wrapped_token
    }

    /// Rebalancer managing the main and wrapped balances.
    pub fn asset_manager(&self) -> Address {
        self.asset_manager
    }

    pub fn owner(&self) -> Address {
        self.owner
    }

    pub fn swap_fee_percentage(&self) -> U256 {
        self.swap_fee_percentage
    }

    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    /// Scaling factors of main, wrapped and BPT.
    pub fn scaling_factors(&self) -> [U256; 3] {
        [self.main_scaling_factor, self.wrapped_scaling_factor, ONE]
    }

    fn scaling_factor(&self, token: Address) -> Result<U256, Revert> {
        if token == self.main_token {
            Ok(self.main_scaling_factor)
        } else if token == self.wrapped_token {
            Ok(self.wrapped_scaling_factor)
        } else if token == self.address {
            Ok(ONE)
        } else {
            Err(Revert::InvalidToken)
        }
    }

    fn params(&self, rate: U256) -> Params {
        Params {
            fee: self.swap_fee_percentage,
            lower_target: self.lower_target,
            upper_target: self.upper_target,
            rate,
        }
    }

    fn balances(&self, pool_tokens: &PoolTokens) -> Result<LinearPoolBalances, Revert> {
        let balance = |token| pool_tokens.balance_of(token).ok_or(Revert::TokenNotRegistered);
        Ok(LinearPoolBalances {
            main: balance(self.main_token)?,
            wrapped: balance(self.wrapped_token)?,
            bpt: balance(self.address)?,
        })
    }

    fn is_main_balance_within_targets(&self, upscaled_main: U256) -> bool {
        upscaled_main >= self.lower_target && upscaled_main <= self.upper_target
    }
}

fn check_swap_fee(fee: U256) -> Result<(), Revert> {
    if fee < MIN_SWAP_FEE_PERCENTAGE {
        return Err(Revert::MinSwapFeePercentage);
    }
    if fee > MAX_SWAP_FEE_PERCENTAGE {
        return Err(Revert::MaxSwapFeePercentage);
    }
    Ok(())
}

impl ChainState {
    /// Deploys a pool, registers it and its tokens in the vault and mints
    /// the full BPT supply to the vault.
    pub(crate) fn deploy_euler_linear_pool(&mut self, args: NewLinearPool) -> Result<Address, Revert> {
        if self.euler_underlying_asset(args.wrapped_token)? != args.main_token {
            return Err(Revert::TokensMismatch);
        }
        check_swap_fee(args.swap_fee_percentage)?;
        if args.upper_target > MAX_UPPER_TARGET {
            return Err(Revert::UpperTargetTooHigh);
        }

        let main_decimals = self.erc20(args.main_token)?.decimals();
        let wrapped_decimals = self.erc20(args.wrapped_token)?.decimals();
        let main_scaling_factor = fp::scaling_factor(main_decimals)?;
        let wrapped_scaling_factor = fp::scaling_factor(wrapped_decimals)?;
        let rate_scale_factor = fp::exp10(18 - main_decimals as u32);
        let upper_target = fp::mul_down(args.upper_target, main_scaling_factor)?;

        let address = self.allocate_address();
        self.erc20s
            .insert(address, Erc20::new(&args.name, &args.symbol, 18));

        let pool_id = self.vault_register_pool(args.vault, address, PoolSpecialization::General)?;
        self.vault_register_tokens(
            args.vault,
            address,
            pool_id,
            &[args.main_token, args.wrapped_token, address],
            &[args.asset_manager, args.asset_manager, ZERO_ADDRESS],
        )?;
        self.erc20_mint(address, args.vault, INITIAL_BPT_SUPPLY)?;
        self.vault_credit_pool_cash(args.vault, pool_id, address, INITIAL_BPT_SUPPLY)?;

        self.emit(
            address,
            Event::TargetsSet {
                token: args.main_token,
                lower_target: U256::zero(),
                upper_target: args.upper_target,
            },
        );
        self.emit(
            address,
            Event::SwapFeePercentageChanged {
                swap_fee_percentage: args.swap_fee_percentage,
            },
        );

        self.pools.insert(
            address,
            EulerLinearPool {
                address,
                vault: args.vault,
                pool_id,
                main_token: args.main_token,
                wrapped_token: args.wrapped_token,
                asset_manager: args.asset_manager,
                main_scaling_factor,
                wrapped_scaling_factor,
                rate_scale_factor,
                swap_fee_percentage: args.swap_fee_percentage,
                lower_target: U256::zero(),
                upper_target,
                owner: args.owner,
                version: args.version,
            },
        );
        debug!(pool = ?address, %pool_id, "Linear pool deployed");
        Ok(address)
    }

    /// Exchange rate of the wrapped token in 18-decimal fixed point.
    ///
    /// # Errors
    /// `MALICIOUS_QUERY_REVERT` when the eToken reverts with data shaped
    /// like a query result; any other revert is passed through.
    pub fn linear_pool_wrapped_token_rate(&self, pool: Address) -> Result<U256, Revert> {
        let state = self.linear_pool(pool)?;
        let rate = self
            .euler_token(state.wrapped_token)?
            .convert_balance_to_underlying(ONE)
            .map_err(|data| {
                let revert = Revert::bubble_up_non_malicious(data);
                if revert.is_malicious_query() {
                    warn!(pool = ?pool, token = ?state.wrapped_token, "Malicious query revert from rate provider");
                }
                revert
            })?;
        Ok(fp::mul(rate, state.rate_scale_factor)?)
    }

    /// Targets in main token units.
    pub fn linear_pool_targets(&self, pool: Address) -> Result<(U256, U256), Revert> {
        let state = self.linear_pool(pool)?;
        Ok((
            fp::div_down(state.lower_target, state.main_scaling_factor)?,
            fp::div_down(state.upper_target, state.main_scaling_factor)?,
        ))
    }

    pub fn linear_pool_balances(&self, pool: Address) -> Result<LinearPoolBalances, Revert> {
        let state = self.linear_pool(pool)?;
        let pool_tokens = self.vault_get_pool_tokens(state.vault, state.pool_id)?;
        state.balances(&pool_tokens)
    }

    /// BPT in circulation: total supply minus what the vault still holds
    /// for the pool.
    pub fn linear_pool_virtual_supply(&self, pool: Address) -> Result<U256, Revert> {
        let total_supply = self.erc20(pool)?.total_supply();
        let balances = self.linear_pool_balances(pool)?;
        Ok(fp::sub(total_supply, balances.bpt)?)
    }

    /// Value of one BPT in main token terms.
    pub fn linear_pool_rate(&self, pool: Address) -> Result<U256, Revert> {
        let state = self.linear_pool(pool)?;
        let balances = self.linear_pool_balances(pool)?;
        let virtual_supply = self.linear_pool_virtual_supply(pool)?;
        if virtual_supply.is_zero() {
            return Ok(ONE);
        }

        let params = state.params(self.linear_pool_wrapped_token_rate(pool)?);
        let main = fp::mul_down(balances.main, state.main_scaling_factor)?;
        let wrapped = fp::mul_down(balances.wrapped, state.wrapped_scaling_factor)?;
        let invariant = lm::calc_invariant(lm::to_nominal(main, &params)?, wrapped, &params)?;
        Ok(fp::div_down(invariant, virtual_supply)?)
    }

    fn linear_pool_upscaled_main_balance(&self, pool: Address) -> Result<U256, Revert> {
        let state = self.linear_pool(pool)?;
        let balances = self.linear_pool_balances(pool)?;
        Ok(fp::mul_down(balances.main, state.main_scaling_factor)?)
    }

    /// Sets both targets, in main token units. The current main balance must
    /// lie within both the old and the new range.
    pub fn linear_pool_set_targets(
        &mut self,
        pool: Address,
        caller: Address,
        lower_target: U256,
        upper_target: U256,
    ) -> Result<(), Revert> {
        let main_balance = self.linear_pool_upscaled_main_balance(pool)?;
        let state = self.linear_pool_mut(pool)?;
        if caller != state.owner {
            return Err(Revert::SenderNotAllowed);
        }
        if lower_target > upper_target {
            return Err(Revert::LowerGreaterThanUpperTarget);
        }
        if upper_target > MAX_UPPER_TARGET {
            return Err(Revert::UpperTargetTooHigh);
        }

        let lower = fp::mul_down(lower_target, state.main_scaling_factor)?;
        let upper = fp::mul_down(upper_target, state.main_scaling_factor)?;
        let within_new = main_balance >= lower && main_balance <= upper;
        if !state.is_main_balance_within_targets(main_balance) || !within_new {
            return Err(Revert::OutOfTargetRange);
        }
        state.lower_target = lower;
        state.upper_target = upper;
        let main_token = state.main_token;

        self.emit(
            pool,
            Event::TargetsSet {
                token: main_token,
                lower_target,
                upper_target,
            },
        );
        debug!(pool = ?pool, lower = %lower_target, upper = %upper_target, "Targets set");
        Ok(())
    }

    /// Changes the swap fee. Only allowed while the main balance is within
    /// the targets, since the fee prices the distance outside them.
    pub fn linear_pool_set_swap_fee_percentage(
        &mut self,
        pool: Address,
        caller: Address,
        swap_fee_percentage: U256,
    ) -> Result<(), Revert> {
        let main_balance = self.linear_pool_upscaled_main_balance(pool)?;
        let state = self.linear_pool_mut(pool)?;
        if caller != state.owner {
            return Err(Revert::SenderNotAllowed);
        }
        check_swap_fee(swap_fee_percentage)?;
        if !state.is_main_balance_within_targets(main_balance) {
            return Err(Revert::OutOfTargetRange);
        }
        state.swap_fee_percentage = swap_fee_percentage;

        self.emit(
            pool,
            Event::SwapFeePercentageChanged {
                swap_fee_percentage,
            },
        );
        Ok(())
    }

    /// Prices a swap for the vault. Returns the amount out for `GivenIn`
    /// and the amount in for `GivenOut`, in the tokens' own decimals.
    pub(crate) fn linear_pool_on_swap(
        &self,
        pool: Address,
        vault: Address,
        request: &SwapRequest,
        pool_tokens: &PoolTokens,
    ) -> Result<U256, Revert> {
        let state = self.linear_pool(pool)?;
        if vault != state.vault {
            return Err(Revert::SenderNotAllowed);
        }

        let factor_in = state.scaling_factor(request.token_in)?;
        let factor_out = state.scaling_factor(request.token_out)?;
        let balances = state.balances(pool_tokens)?;
        let main = fp::mul_down(balances.main, state.main_scaling_factor)?;
        let wrapped = fp::mul_down(balances.wrapped, state.wrapped_scaling_factor)?;
        let bpt_supply = fp::sub(self.erc20(pool)?.total_supply(), balances.bpt)?;
        let params = state.params(self.linear_pool_wrapped_token_rate(pool)?);

        let (main_token, wrapped_token) = (state.main_token, state.wrapped_token);
        let pair = (request.token_in, request.token_out);

        match request.kind {
            SwapKind::GivenIn => {
                let amount = fp::mul_down(request.amount, factor_in)?;
                let out = if pair == (main_token, wrapped_token) {
                    lm::calc_wrapped_out_per_main_in(amount, main, &params)?
                } else if pair == (wrapped_token, main_token) {
                    lm::calc_main_out_per_wrapped_in(amount, main, &params)?
                } else if pair == (main_token, pool) {
                    lm::calc_bpt_out_per_main_in(amount, main, wrapped, bpt_supply, &params)?
                } else if pair == (pool, main_token) {
                    lm::calc_main_out_per_bpt_in(amount, main, wrapped, bpt_supply, &params)?
                } else if pair == (wrapped_token, pool) {
                    lm::calc_bpt_out_per_wrapped_in(amount, main, wrapped, bpt_supply, &params)?
                } else if pair == (pool, wrapped_token) {
                    lm::calc_wrapped_out_per_bpt_in(amount, main, wrapped, bpt_supply, &params)?
                } else {
                    return Err(Revert::InvalidToken);
                };
                Ok(fp::div_down(out, factor_out)?)
            }
            SwapKind::GivenOut => {
                let amount = fp::mul_down(request.amount, factor_out)?;
                let amount_in = if pair == (main_token, wrapped_token) {
                    lm::calc_main_in_per_wrapped_out(amount, main, &params)?
                } else if pair == (wrapped_token, main_token) {
                    lm::calc_wrapped_in_per_main_out(amount, main, &params)?
                } else if pair == (main_token, pool) {
                    lm::calc_main_in_per_bpt_out(amount, main, wrapped, bpt_supply, &params)?
                } else if pair == (pool, main_token) {
                    lm::calc_bpt_in_per_main_out(amount, main, wrapped, bpt_supply, &params)?
                } else if pair == (wrapped_token, pool) {
                    lm::calc_wrapped_in_per_bpt_out(amount, main, wrapped, bpt_supply, &params)?
                } else if pair == (pool, wrapped_token) {
                    lm::calc_bpt_in_per_wrapped_out(amount, main, wrapped, bpt_supply, &params)?
                } else {
                    return Err(Revert::InvalidToken);
                };
                Ok(fp::div_up(amount_in, factor_in)?)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Fixture, fp, lp, owner, tenths, trader};
    use crate::vault::{FundManagement, SingleSwap};
    use linear_pool_domain::enums::RevertType;
    use linear_pool_domain::errors::RevertData;

    #[test]
    fn test_wrapped_token_rate_follows_exchange_rate() {
        let mut f = Fixture::new(0);
        assert_eq!(f.state.linear_pool_wrapped_token_rate(f.pool), Ok(ONE));

        f.state
            .euler_set_exchange_rate_multiplicator(f.wrapped, U256::from(2))
            .unwrap();
        assert_eq!(f.state.linear_pool_wrapped_token_rate(f.pool), Ok(ONE * 2));

        f.state
            .euler_set_exchange_rate_multiplicator(f.wrapped, U256::one())
            .unwrap();
        assert_eq!(f.state.linear_pool_wrapped_token_rate(f.pool), Ok(ONE));
    }

    #[test]
    fn test_wrapped_token_rate_detects_malicious_queries() {
        let mut f = Fixture::new(0);

        for revert_type in [
            RevertType::MaliciousSwapQuery,
            RevertType::MaliciousJoinExitQuery,
        ] {
            f.state.euler_set_revert_type(f.wrapped, revert_type).unwrap();
            let err = f.state.linear_pool_wrapped_token_rate(f.pool).unwrap_err();
            assert_eq!(err, Revert::MaliciousQueryRevert);
            assert_eq!(err.to_string(), "MALICIOUS_QUERY_REVERT");
        }
    }

    #[test]
    fn test_wrapped_token_rate_bubbles_other_reverts() {
        let mut f = Fixture::new(0);
        f.state
            .euler_set_revert_type(f.wrapped, RevertType::NonMalicious)
            .unwrap();

        let err = f.state.linear_pool_wrapped_token_rate(f.pool).unwrap_err();
        assert_eq!(
            err,
            Revert::Bubbled(RevertData::from_reason("NON_MALICIOUS_REVERT"))
        );
        assert_eq!(err.to_string(), "NON_MALICIOUS_REVERT");
    }

    #[test]
    fn test_pool_state_after_creation() {
        let f = Fixture::new(100);
        let pool = f.state.linear_pool(f.pool).unwrap();

        assert_eq!(pool.main_token(), f.main);
        assert_eq!(pool.wrapped_token(), f.wrapped);
        assert_eq!(pool.owner(), owner());
        assert_eq!(pool.asset_manager(), f.rebalancer);
        assert_eq!(pool.scaling_factors(), [ONE, ONE, ONE]);
        assert_eq!(pool.version(), None);
        assert_eq!(
            f.state.linear_pool_targets(f.pool),
            Ok((U256::zero(), fp(100)))
        );
        assert_eq!(f.state.linear_pool_virtual_supply(f.pool), Ok(U256::zero()));
        assert_eq!(f.state.linear_pool_rate(f.pool), Ok(ONE));
        assert_eq!(
            f.state.erc20(f.pool).unwrap().total_supply(),
            INITIAL_BPT_SUPPLY
        );
    }

    #[test]
    fn test_first_join_mints_nominal_value() {
        let mut f = Fixture::new(100);

        // 50 above the upper target at 1% costs 0.5
        let bpt_out = f.join_main(fp(150));

        assert_eq!(bpt_out, tenths(1495));
        assert_eq!(f.state.erc20_balance_of(f.pool, lp()), Ok(tenths(1495)));
        assert_eq!(f.state.linear_pool_virtual_supply(f.pool), Ok(tenths(1495)));
        assert_eq!(f.balances().main, fp(150));
        assert_eq!(f.state.linear_pool_rate(f.pool), Ok(ONE));
    }

    #[test]
    fn test_swap_below_lower_target_charges_fee() {
        let mut f = Fixture::new(100);
        f.join_main(fp(80));
        f.state
            .linear_pool_set_targets(f.pool, owner(), fp(40), fp(100))
            .unwrap();
        f.state.euler_deposit(f.wrapped, trader(), fp(100)).unwrap();

        let (main, wrapped) = (f.main, f.wrapped);
        let wrapped_in = f.swap(trader(), SwapKind::GivenOut, wrapped, main, fp(60));

        // 20 below the lower target at 1% costs 0.2
        assert_eq!(wrapped_in, tenths(602));
        let balances = f.balances();
        assert_eq!(balances.main, fp(20));
        assert_eq!(balances.wrapped, tenths(602));
    }

    #[test]
    fn test_swap_within_targets_uses_rate() {
        let mut f = Fixture::new(100);
        f.join_main(fp(50));
        f.state
            .euler_set_exchange_rate_multiplicator(f.wrapped, U256::from(2))
            .unwrap();
        let minted = f.state.euler_deposit(f.wrapped, trader(), fp(40)).unwrap();
        assert_eq!(minted, fp(20));

        let (main, wrapped) = (f.main, f.wrapped);
        let main_out = f.swap(trader(), SwapKind::GivenIn, wrapped, main, fp(10));

        assert_eq!(main_out, fp(20));
        assert_eq!(f.balances().main, fp(30));
    }

    #[test]
    fn test_vault_swap_checks() {
        let mut f = Fixture::new(100);
        let pool_id = f.state.linear_pool(f.pool).unwrap().pool_id();
        let swap = SingleSwap {
            pool_id,
            kind: SwapKind::GivenIn,
            asset_in: f.main,
            asset_out: f.pool,
            amount: fp(10),
        };
        let funds = FundManagement {
            sender: lp(),
            recipient: lp(),
        };

        let deadline = f.state.block().timestamp - 1;
        assert_eq!(
            f.state.vault_swap(f.vault, lp(), &swap, &funds, U256::zero(), deadline),
            Err(Revert::SwapDeadline)
        );
        assert_eq!(
            f.state
                .vault_swap(f.vault, lp(), &swap, &funds, fp(11), u64::MAX),
            Err(Revert::SwapLimit)
        );
        assert_eq!(
            f.state
                .vault_swap(f.vault, trader(), &swap, &funds, U256::zero(), u64::MAX),
            Err(Revert::SenderNotAllowed)
        );

        let same_token = SingleSwap {
            asset_out: f.main,
            ..swap
        };
        assert_eq!(
            f.state
                .vault_swap(f.vault, lp(), &same_token, &funds, U256::zero(), u64::MAX),
            Err(Revert::CannotSwapSameToken)
        );
    }

    #[test]
    fn test_set_targets_validation() {
        let mut f = Fixture::new(100);

        assert_eq!(
            f.state
                .linear_pool_set_targets(f.pool, lp(), U256::zero(), fp(50)),
            Err(Revert::SenderNotAllowed)
        );
        assert_eq!(
            f.state
                .linear_pool_set_targets(f.pool, owner(), fp(60), fp(50)),
            Err(Revert::LowerGreaterThanUpperTarget)
        );
        assert_eq!(
            f.state.linear_pool_set_targets(
                f.pool,
                owner(),
                U256::zero(),
                MAX_UPPER_TARGET + 1
            ),
            Err(Revert::UpperTargetTooHigh)
        );
        // main balance is 0, outside [10, 100]
        assert_eq!(
            f.state
                .linear_pool_set_targets(f.pool, owner(), fp(10), fp(100)),
            Err(Revert::OutOfTargetRange)
        );

        f.state
            .linear_pool_set_targets(f.pool, owner(), U256::zero(), fp(50))
            .unwrap();
        assert_eq!(
            f.state.linear_pool_targets(f.pool),
            Ok((U256::zero(), fp(50)))
        );
    }

    #[test]
    fn test_set_targets_requires_balance_within_old_range() {
        let mut f = Fixture::new(100);
        f.join_main(fp(150));

        assert_eq!(
            f.state
                .linear_pool_set_targets(f.pool, owner(), U256::zero(), fp(200)),
            Err(Revert::OutOfTargetRange)
        );
    }

    #[test]
    fn test_set_swap_fee_percentage() {
        let mut f = Fixture::new(100);

        assert_eq!(
            f.state
                .linear_pool_set_swap_fee_percentage(f.pool, owner(), U256::one()),
            Err(Revert::MinSwapFeePercentage)
        );
        assert_eq!(
            f.state.linear_pool_set_swap_fee_percentage(
                f.pool,
                owner(),
                MAX_SWAP_FEE_PERCENTAGE + 1
            ),
            Err(Revert::MaxSwapFeePercentage)
        );
        assert_eq!(
            f.state
                .linear_pool_set_swap_fee_percentage(f.pool, lp(), MIN_SWAP_FEE_PERCENTAGE),
            Err(Revert::SenderNotAllowed)
        );

        f.state
            .linear_pool_set_swap_fee_percentage(f.pool, owner(), MAX_SWAP_FEE_PERCENTAGE)
            .unwrap();
        assert_eq!(
            f.state.linear_pool(f.pool).unwrap().swap_fee_percentage(),
            MAX_SWAP_FEE_PERCENTAGE
        );
    }
}
