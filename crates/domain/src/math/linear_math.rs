//! Swap math for linear pools.
//!
//! A linear pool values its main token at par and its wrapped token at
//! `rate`. While the main balance stays within `[lower_target,
//! upper_target]` swaps are fee-free; outside that range the pool charges
//! `fee` on the distance to the nearest target, which is expressed by
//! converting real main balances into *nominal* ones. The invariant is
//! `nominal_main + wrapped * rate`, and BPT is priced against it.
//!
//! All amounts are upscaled to 18 decimals. Amounts out round down and
//! amounts in round up.

use super::fixed_point::{self as fp, ONE};
use crate::errors::MathError;
use primitive_types::U256;
use serde::{Deserialize, Serialize};

/// Pricing parameters of a linear pool at a given moment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Params {
    pub fee: U256,
    pub lower_target: U256,
    pub upper_target: U256,
    pub rate: U256,
}

pub fn to_nominal(real: U256, params: &Params) -> Result<U256, MathError> {
    if real < params.lower_target {
        let fees = fp::mul_down(params.lower_target - real, params.fee)?;
        fp::sub(real, fees)
    } else if real <= params.upper_target {
        Ok(real)
    } else {
        let fees = fp::mul_down(real - params.upper_target, params.fee)?;
        fp::sub(real, fees)
    }
}

pub fn from_nominal(nominal: U256, params: &Params) -> Result<U256, MathError> {
    if nominal < params.lower_target {
        let numerator = fp::add(nominal, fp::mul_down(params.fee, params.lower_target)?)?;
        fp::div_down(numerator, fp::add(ONE, params.fee)?)
    } else if nominal <= params.upper_target {
        Ok(nominal)
    } else {
        let numerator = fp::sub(nominal, fp::mul_down(params.fee, params.upper_target)?)?;
        fp::div_down(numerator, fp::sub(ONE, params.fee)?)
    }
}

pub fn calc_invariant(
    nominal_main_balance: U256,
    wrapped_balance: U256,
    params: &Params,
) -> Result<U256, MathError> {
    fp::add(nominal_main_balance, fp::mul_down(wrapped_balance, params.rate)?)
}

// Main <-> wrapped

pub fn calc_wrapped_out_per_main_in(
    main_in: U256,
    main_balance: U256,
    params: &Params,
) -> Result<U256, MathError> {
    let previous_nominal_main = to_nominal(main_balance, params)?;
    let after_nominal_main = to_nominal(fp::add(main_balance, main_in)?, params)?;
    let delta_nominal_main = fp::sub(after_nominal_main, previous_nominal_main)?;
    fp::div_down(delta_nominal_main, params.rate)
}

pub fn calc_wrapped_in_per_main_out(
    main_out: U256,
    main_balance: U256,
    params: &Params,
) -> Result<U256, MathError> {
    let previous_nominal_main = to_nominal(main_balance, params)?;
    let after_nominal_main = to_nominal(fp::sub(main_balance, main_out)?, params)?;
    let delta_nominal_main = fp::sub(previous_nominal_main, after_nominal_main)?;
    fp::div_up(delta_nominal_main, params.rate)
}

pub fn calc_main_out_per_wrapped_in(
    wrapped_in: U256,
    main_balance: U256,
    params: &Params,
) -> Result<U256, MathError> {
    let previous_nominal_main = to_nominal(main_balance, params)?;
    let delta_nominal_main = fp::mul_down(wrapped_in, params.rate)?;
    let after_nominal_main = fp::sub(previous_nominal_main, delta_nominal_main)?;
    let new_main_balance = from_nominal(after_nominal_main, params)?;
    fp::sub(main_balance, new_main_balance)
}

pub fn calc_main_in_per_wrapped_out(
    wrapped_out: U256,
    main_balance: U256,
    params: &Params,
) -> Result<U256, MathError> {
    let previous_nominal_main = to_nominal(main_balance, params)?;
    let delta_nominal_main = fp::mul_up(wrapped_out, params.rate)?;
    let after_nominal_main = fp::add(previous_nominal_main, delta_nominal_main)?;
    let new_main_balance = from_nominal(after_nominal_main, params)?;
    fp::sub(new_main_balance, main_balance)
}

// Main <-> BPT

pub fn calc_bpt_out_per_main_in(
    main_in: U256,
    main_balance: U256,
    wrapped_balance: U256,
    bpt_supply: U256,
    params: &Params,
) -> Result<U256, MathError> {
    if bpt_supply.is_zero() {
        // The first mint sets BPT supply equal to the invariant.
        return to_nominal(main_in, params);
    }

    let previous_nominal_main = to_nominal(main_balance, params)?;
    let after_nominal_main = to_nominal(fp::add(main_balance, main_in)?, params)?;
    let delta_nominal_main = fp::sub(after_nominal_main, previous_nominal_main)?;
    let invariant = calc_invariant(previous_nominal_main, wrapped_balance, params)?;
    fp::div(fp::mul(bpt_supply, delta_nominal_main)?, invariant, false)
}

pub fn calc_bpt_in_per_main_out(
    main_out: U256,
    main_balance: U256,
    wrapped_balance: U256,
    bpt_supply: U256,
    params: &Params,
) -> Result<U256, MathError> {
    let previous_nominal_main = to_nominal(main_balance, params)?;
    let after_nominal_main = to_nominal(fp::sub(main_balance, main_out)?, params)?;
    let delta_nominal_main = fp::sub(previous_nominal_main, after_nominal_main)?;
    let invariant = calc_invariant(previous_nominal_main, wrapped_balance, params)?;
    fp::div(fp::mul(bpt_supply, delta_nominal_main)?, invariant, true)
}

pub fn calc_main_out_per_bpt_in(
    bpt_in: U256,
    main_balance: U256,
    wrapped_balance: U256,
    bpt_supply: U256,
    params: &Params,
) -> Result<U256, MathError> {
    let previous_nominal_main = to_nominal(main_balance, params)?;
    let invariant = calc_invariant(previous_nominal_main, wrapped_balance, params)?;
    let delta_nominal_main = fp::div(fp::mul(invariant, bpt_in)?, bpt_supply, false)?;
    let after_nominal_main = fp::sub(previous_nominal_main, delta_nominal_main)?;
    let new_main_balance = from_nominal(after_nominal_main, params)?;
    fp::sub(main_balance, new_main_balance)
}

pub fn calc_main_in_per_bpt_out(
    bpt_out: U256,
    main_balance: U256,
    wrapped_balance: U256,
    bpt_supply: U256,
    params: &Params,
) -> Result<U256, MathError> {
    if bpt_supply.is_zero() {
        return from_nominal(bpt_out, params);
    }

    let previous_nominal_main = to_nominal(main_balance, params)?;
    let invariant = calc_invariant(previous_nominal_main, wrapped_balance, params)?;
    let delta_nominal_main = fp::div(fp::mul(invariant, bpt_out)?, bpt_supply, true)?;
    let after_nominal_main = fp::add(previous_nominal_main, delta_nominal_main)?;
    let new_main_balance = from_nominal(after_nominal_main, params)?;
    fp::sub(new_main_balance, main_balance)
}

// Wrapped <-> BPT

pub fn calc_bpt_out_per_wrapped_in(
    wrapped_in: U256,
    main_balance: U256,
    wrapped_balance: U256,
    bpt_supply: U256,
    params: &Params,
) -> Result<U256, MathError> {
    if bpt_supply.is_zero() {
        return fp::mul_down(wrapped_in, params.rate);
    }

    let nominal_main = to_nominal(main_balance, params)?;
    let previous_invariant = calc_invariant(nominal_main, wrapped_balance, params)?;
    let new_wrapped_balance = fp::add(wrapped_balance, wrapped_in)?;
    let new_invariant = calc_invariant(nominal_main, new_wrapped_balance, params)?;
    let new_bpt_balance = fp::div(fp::mul(bpt_supply, new_invariant)?, previous_invariant, false)?;
    fp::sub(new_bpt_balance, bpt_supply)
}

pub fn calc_bpt_in_per_wrapped_out(
    wrapped_out: U256,
    main_balance: U256,
    wrapped_balance: U256,
    bpt_supply: U256,
    params: &Params,
) -> Result<U256, MathError> {
    let nominal_main = to_nominal(main_balance, params)?;
    let previous_invariant = calc_invariant(nominal_main, wrapped_balance, params)?;
    let new_wrapped_balance = fp::sub(wrapped_balance, wrapped_out)?;
    let new_invariant = calc_invariant(nominal_main, new_wrapped_balance, params)?;
    let new_bpt_balance = fp::div(fp::mul(bpt_supply, new_invariant)?, previous_invariant, false)?;
    fp::sub(bpt_supply, new_bpt_balance)
}

pub fn calc_wrapped_out_per_bpt_in(
    bpt_in: U256,
    main_balance: U256,
    wrapped_balance: U256,
    bpt_supply: U256,
    params: &Params,
) -> Result<U256, MathError> {
    let nominal_main = to_nominal(main_balance, params)?;
    let previous_invariant = calc_invariant(nominal_main, wrapped_balance, params)?;
    let new_bpt_balance = fp::sub(bpt_supply, bpt_in)?;
    let new_invariant = fp::div(fp::mul(new_bpt_balance, previous_invariant)?, bpt_supply, true)?;
    let new_wrapped_balance = fp::div_up(fp::sub(new_invariant, nominal_main)?, params.rate)?;
    fp::sub(wrapped_balance, new_wrapped_balance)
}

pub fn calc_wrapped_in_per_bpt_out(
    bpt_out: U256,
    main_balance: U256,
    wrapped_balance: U256,
    bpt_supply: U256,
    params: &Params,
) -> Result<U256, MathError> {
    if bpt_supply.is_zero() {
        return fp::div_up(bpt_out, params.rate);
    }

    let nominal_main = to_nominal(main_balance, params)?;
    let previous_invariant = calc_invariant(nominal_main, wrapped_balance, params)?;
    let new_bpt_balance = fp::add(bpt_supply, bpt_out)?;
    let new_invariant = fp::div(fp::mul(new_bpt_balance, previous_invariant)?, bpt_supply, true)?;
    let new_wrapped_balance = fp::div_up(fp::sub(new_invariant, nominal_main)?, params.rate)?;
    fp::sub(new_wrapped_balance, wrapped_balance)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fp(units: u64) -> U256 {
        U256::from(units) * ONE
    }

    /// `units / 10` in fixed point.
    fn tenths(units: u64) -> U256 {
        U256::from(units) * ONE / U256::from(10)
    }

    fn params(lower: u64, upper: u64) -> Params {
        Params {
            fee: ONE / U256::from(100), // 1%
            lower_target: fp(lower),
            upper_target: fp(upper),
            rate: ONE,
        }
    }

    #[test]
    fn test_nominal_inside_targets_is_identity() {
        let p = params(40, 100);
        assert_eq!(to_nominal(fp(70), &p).unwrap(), fp(70));
        assert_eq!(from_nominal(fp(70), &p).unwrap(), fp(70));
    }

    #[test]
    fn test_nominal_below_lower_target() {
        // 20 - 1% * (40 - 20) = 19.8
        let p = params(40, 100);
        assert_eq!(to_nominal(fp(20), &p).unwrap(), tenths(198));
        assert_eq!(from_nominal(tenths(198), &p).unwrap(), fp(20));
    }

    #[test]
    fn test_nominal_above_upper_target() {
        // 150 - 1% * (150 - 100) = 149.5
        let p = params(0, 100);
        assert_eq!(to_nominal(fp(150), &p).unwrap(), tenths(1495));
        assert_eq!(from_nominal(tenths(1495), &p).unwrap(), fp(150));
    }

    #[test]
    fn test_nominal_underflow_far_below_target() {
        let p = params(40, 100);
        assert_eq!(to_nominal(U256::zero(), &p), Err(MathError::SubOverflow));
    }

    #[test]
    fn test_wrapped_in_for_main_out_pays_fee_below_target() {
        // Taking main from 80 to 20 crosses the lower target.
        let p = params(40, 100);
        let wrapped_in = calc_wrapped_in_per_main_out(fp(60), fp(80), &p).unwrap();
        assert_eq!(wrapped_in, tenths(602));
    }

    #[test]
    fn test_wrapped_out_for_main_in_earns_bonus_below_target() {
        let p = params(40, 100);
        let wrapped_out = calc_wrapped_out_per_main_in(fp(50), fp(20), &p).unwrap();
        assert_eq!(wrapped_out, tenths(502));
    }

    #[test]
    fn test_main_wrapped_swaps_preserve_invariant() {
        let p = Params {
            rate: fp(2),
            ..params(40, 100)
        };
        let main = fp(90);
        let wrapped = fp(10);
        let before = calc_invariant(to_nominal(main, &p).unwrap(), wrapped, &p).unwrap();

        let main_out = calc_main_out_per_wrapped_in(fp(5), main, &p).unwrap();
        let after = calc_invariant(
            to_nominal(main - main_out, &p).unwrap(),
            wrapped + fp(5),
            &p,
        )
        .unwrap();

        assert_eq!(main_out, fp(10));
        assert_eq!(before, after);
    }

    #[test]
    fn test_main_in_per_wrapped_out_matches_rate_inside_targets() {
        let p = Params {
            rate: fp(2),
            ..params(0, 100)
        };
        assert_eq!(
            calc_main_in_per_wrapped_out(fp(10), fp(30), &p).unwrap(),
            fp(20)
        );
    }

    #[test]
    fn test_first_bpt_mint_equals_nominal_value() {
        let p = params(0, 100);
        assert_eq!(
            calc_bpt_out_per_main_in(fp(80), U256::zero(), U256::zero(), U256::zero(), &p)
                .unwrap(),
            fp(80)
        );
        assert_eq!(
            calc_bpt_out_per_wrapped_in(fp(5), U256::zero(), U256::zero(), U256::zero(), &p)
                .unwrap(),
            fp(5)
        );
        assert_eq!(
            calc_main_in_per_bpt_out(fp(80), U256::zero(), U256::zero(), U256::zero(), &p)
                .unwrap(),
            fp(80)
        );
    }

    #[test]
    fn test_bpt_pricing_is_proportional_to_invariant() {
        // invariant = 80 + 20 * 1 = 100, supply = 50 -> 1 BPT = 2 value units
        let p = params(0, 100);
        let (main, wrapped, supply) = (fp(80), fp(20), fp(50));

        assert_eq!(
            calc_bpt_out_per_main_in(fp(10), main, wrapped, supply, &p).unwrap(),
            fp(5)
        );
        assert_eq!(
            calc_bpt_in_per_main_out(fp(10), main, wrapped, supply, &p).unwrap(),
            fp(5)
        );
        assert_eq!(
            calc_main_out_per_bpt_in(fp(5), main, wrapped, supply, &p).unwrap(),
            fp(10)
        );
        assert_eq!(
            calc_main_in_per_bpt_out(fp(5), main, wrapped, supply, &p).unwrap(),
            fp(10)
        );
        assert_eq!(
            calc_bpt_out_per_wrapped_in(fp(10), main, wrapped, supply, &p).unwrap(),
            fp(5)
        );
        assert_eq!(
            calc_bpt_in_per_wrapped_out(fp(10), main, wrapped, supply, &p).unwrap(),
            fp(5)
        );
        assert_eq!(
            calc_wrapped_out_per_bpt_in(fp(5), main, wrapped, supply, &p).unwrap(),
            fp(10)
        );
        assert_eq!(
            calc_wrapped_in_per_bpt_out(fp(5), main, wrapped, supply, &p).unwrap(),
            fp(10)
        );
    }

    #[test]
    fn test_zero_rate_is_rejected() {
        let p = Params {
            rate: U256::zero(),
            ..params(0, 100)
        };
        assert_eq!(
            calc_wrapped_out_per_main_in(fp(1), fp(1), &p),
            Err(MathError::ZeroDivision)
        );
    }
}
