//! Domain types and math for Euler linear pools.
//!
//! This crate holds everything that does not need a chain to exist:
//! - Fixed point arithmetic on 18-decimal `U256` values
//! - Linear pool swap math (nominal balances, invariant, BPT pricing)
//! - Pool identifiers and version metadata
//! - Revert reasons shared by every simulated contract

/// Token entities.
pub mod entities;
/// Shared enumerations.
pub mod enums;
/// Revert reasons and math errors.
pub mod errors;
/// Fixed point and linear pool math.
pub mod math;
/// Value objects.
pub mod value_objects;

pub use primitive_types::{H160, H256, U256};

/// 20-byte account identifier.
pub type Address = H160;

/// The zero address, used for "no asset manager" and similar.
pub const ZERO_ADDRESS: Address = H160::zero();
