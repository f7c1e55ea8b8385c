//! 18-decimal fixed point arithmetic on `U256`.
//!
//! Every operation is checked and rounds in an explicit direction, so
//! callers can round amounts out down and amounts in up.

use crate::errors::MathError;
use primitive_types::U256;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

/// 1.0 in 18-decimal fixed point.
pub const ONE: U256 = U256([1_000_000_000_000_000_000, 0, 0, 0]);

pub fn add(a: U256, b: U256) -> Result<U256, MathError> {
    a.checked_add(b).ok_or(MathError::AddOverflow)
}

pub fn sub(a: U256, b: U256) -> Result<U256, MathError> {
    a.checked_sub(b).ok_or(MathError::SubOverflow)
}

/// Plain integer multiplication.
pub fn mul(a: U256, b: U256) -> Result<U256, MathError> {
    a.checked_mul(b).ok_or(MathError::MulOverflow)
}

/// Plain integer division, rounding in the requested direction.
pub fn div(a: U256, b: U256, round_up: bool) -> Result<U256, MathError> {
    if b.is_zero() {
        return Err(MathError::ZeroDivision);
    }
    if round_up && !a.is_zero() {
        Ok((a - 1) / b + 1)
    } else {
        Ok(a / b)
    }
}

pub fn mul_down(a: U256, b: U256) -> Result<U256, MathError> {
    Ok(mul(a, b)? / ONE)
}

pub fn mul_up(a: U256, b: U256) -> Result<U256, MathError> {
    let product = mul(a, b)?;
    if product.is_zero() {
        Ok(U256::zero())
    } else {
        Ok((product - 1) / ONE + 1)
    }
}

pub fn div_down(a: U256, b: U256) -> Result<U256, MathError> {
    if b.is_zero() {
        return Err(MathError::ZeroDivision);
    }
    Ok(mul(a, ONE)? / b)
}

pub fn div_up(a: U256, b: U256) -> Result<U256, MathError> {
    if b.is_zero() {
        return Err(MathError::ZeroDivision);
    }
    if a.is_zero() {
        return Ok(U256::zero());
    }
    Ok((mul(a, ONE)? - 1) / b + 1)
}

/// `1 - x`, saturating at zero.
pub fn complement(x: U256) -> U256 {
    if x < ONE { ONE - x } else { U256::zero() }
}

/// `10^exponent`.
pub fn exp10(exponent: u32) -> U256 {
    U256::exp10(exponent as usize)
}

/// Scaling factor that upscales an amount with `decimals` to 18 decimals,
/// itself expressed in fixed point.
pub fn scaling_factor(decimals: u8) -> Result<U256, MathError> {
    let diff = 18u32
        .checked_sub(decimals as u32)
        .ok_or(MathError::SubOverflow)?;
    mul(ONE, exp10(diff))
}

const MAX_DECIMAL_SCALE: u32 = 28;

/// Converts a raw amount with `decimals` into a human-readable decimal.
pub fn to_decimal(value: U256, decimals: u32) -> Result<Decimal, MathError> {
    if value.bits() > 127 {
        return Err(MathError::DecimalConversion);
    }
    Decimal::try_from_i128_with_scale(value.as_u128() as i128, decimals)
        .map_err(|_| MathError::DecimalConversion)
}

/// Converts a decimal into a raw amount with `decimals`, truncating.
/// `Decimal` carries at most 28 fractional digits.
pub fn from_decimal(value: Decimal, decimals: u32) -> Result<U256, MathError> {
    if decimals > MAX_DECIMAL_SCALE {
        return Err(MathError::DecimalConversion);
    }
    let multiplier = Decimal::from_i128_with_scale(10i128.pow(decimals), 0);
    let raw = value
        .checked_mul(multiplier)
        .ok_or(MathError::DecimalConversion)?
        .trunc()
        .to_u128()
        .ok_or(MathError::DecimalConversion)?;
    Ok(U256::from(raw))
}
