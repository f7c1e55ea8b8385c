//! Revert reasons and math errors.
//!
//! Every failing contract call in the simulated chain surfaces as a
//! [`Revert`]. Reasons display as the fixed strings callers match on,
//! e.g. `TOKENS_MISMATCH` or `MALICIOUS_QUERY_REVERT`.

use crate::Address;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Selector of `Error(string)`.
pub const ERROR_STRING_SELECTOR: [u8; 4] = [0x08, 0xc3, 0x79, 0xa0];

/// Marker the vault prefixes to swap query results before reverting.
pub const SWAP_QUERY_SELECTOR: [u8; 4] = [0xfa, 0x61, 0xcc, 0x12];

/// Marker pools prefix to join/exit query results before reverting.
pub const JOIN_EXIT_QUERY_SELECTOR: [u8; 4] = [0x43, 0xad, 0xba, 0xfb];

/// Arithmetic failures in fixed point and linear math.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MathError {
    #[error("ADD_OVERFLOW")]
    AddOverflow,
    #[error("SUB_OVERFLOW")]
    SubOverflow,
    #[error("MUL_OVERFLOW")]
    MulOverflow,
    #[error("ZERO_DIVISION")]
    ZeroDivision,
    #[error("value does not fit in a decimal")]
    DecimalConversion,
}

/// Raw data returned by a reverting call.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RevertData(pub Vec<u8>);

impl RevertData {
    /// ABI-encodes `Error(reason)`.
    pub fn from_reason(reason: &str) -> Self {
        let bytes = reason.as_bytes();
        let padded_len = bytes.len().div_ceil(32) * 32;

        let mut data = Vec::with_capacity(4 + 64 + padded_len);
        data.extend_from_slice(&ERROR_STRING_SELECTOR);
        data.extend_from_slice(&word(0x20));
        data.extend_from_slice(&word(bytes.len() as u64));
        data.extend_from_slice(bytes);
        data.resize(4 + 64 + padded_len, 0);
        Self(data)
    }

    /// Selector followed by a list of 32-byte words.
    pub fn with_selector(selector: [u8; 4], words: &[u64]) -> Self {
        let mut data = Vec::with_capacity(4 + 32 * words.len());
        data.extend_from_slice(&selector);
        for w in words {
            data.extend_from_slice(&word(*w));
        }
        Self(data)
    }

    pub fn selector(&self) -> Option<[u8; 4]> {
        self.0.get(..4).map(|s| [s[0], s[1], s[2], s[3]])
    }

    /// Decodes the reason of an `Error(string)` payload.
    pub fn reason(&self) -> Option<String> {
        if self.selector()? != ERROR_STRING_SELECTOR {
            return None;
        }
        let len_word = self.0.get(36..68)?;
        // Lengths beyond 8 bytes never fit in memory anyway.
        if len_word[..24].iter().any(|b| *b != 0) {
            return None;
        }
        let len = u64::from_be_bytes(len_word[24..32].try_into().ok()?) as usize;
        let bytes = self.0.get(68..68usize.checked_add(len)?)?;
        String::from_utf8(bytes.to_vec()).ok()
    }

    /// Whether the data looks like a query result rather than an error.
    pub fn is_query_result(&self) -> bool {
        matches!(
            self.selector(),
            Some(SWAP_QUERY_SELECTOR) | Some(JOIN_EXIT_QUERY_SELECTOR)
        )
    }
}

impl fmt::Display for RevertData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(reason) = self.reason() {
            return write!(f, "{reason}");
        }
        write!(f, "0x")?;
        for b in &self.0 {
            write!(f, "{b:02x}")?;
        }
        Ok(())
    }
}

fn word(value: u64) -> [u8; 32] {
    let mut w = [0u8; 32];
    w[24..].copy_from_slice(&value.to_be_bytes());
    w
}

/// Reason a simulated contract call reverted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Revert {
    // Linear pool
    #[error("TOKENS_MISMATCH")]
    TokensMismatch,
    #[error("MALICIOUS_QUERY_REVERT")]
    MaliciousQueryRevert,
    #[error("MIN_SWAP_FEE_PERCENTAGE")]
    MinSwapFeePercentage,
    #[error("MAX_SWAP_FEE_PERCENTAGE")]
    MaxSwapFeePercentage,
    #[error("LOWER_GREATER_THAN_UPPER_TARGET")]
    LowerGreaterThanUpperTarget,
    #[error("UPPER_TARGET_TOO_HIGH")]
    UpperTargetTooHigh,
    #[error("OUT_OF_TARGET_RANGE")]
    OutOfTargetRange,
    #[error("INVALID_TOKEN")]
    InvalidToken,

    // Access control
    #[error("SENDER_NOT_ALLOWED")]
    SenderNotAllowed,
    #[error("DISABLED")]
    Disabled,

    // Vault
    #[error("INVALID_POOL_ID")]
    InvalidPoolId,
    #[error("CALLER_NOT_POOL")]
    CallerNotPool,
    #[error("TOKEN_NOT_REGISTERED")]
    TokenNotRegistered,
    #[error("TOKEN_ALREADY_REGISTERED")]
    TokenAlreadyRegistered,
    #[error("SENDER_NOT_ASSET_MANAGER")]
    SenderNotAssetManager,
    #[error("SWAP_LIMIT")]
    SwapLimit,
    #[error("SWAP_DEADLINE")]
    SwapDeadline,
    #[error("CANNOT_SWAP_SAME_TOKEN")]
    CannotSwapSameToken,
    #[error("UNKNOWN_AMOUNT_IN_FIRST_SWAP")]
    UnknownAmountInFirstSwap,
    #[error("INSUFFICIENT_CASH")]
    InsufficientCash,
    #[error("INSUFFICIENT_MANAGED")]
    InsufficientManaged,
    #[error("INPUT_LENGTH_MISMATCH")]
    InputLengthMismatch,

    // Fees provider
    #[error("FEE_PERCENTAGE_TOO_HIGH")]
    FeePercentageTooHigh,

    // ERC20
    #[error("ERC20_TRANSFER_EXCEEDS_BALANCE")]
    TransferExceedsBalance,
    #[error("ERC20_TRANSFER_EXCEEDS_ALLOWANCE")]
    TransferExceedsAllowance,

    #[error("no contract of the expected kind at {0:?}")]
    ContractNotFound(Address),
    #[error(transparent)]
    Math(#[from] MathError),
    /// Revert data passed through from a callee unchanged.
    #[error("{0}")]
    Bubbled(RevertData),
}

impl Revert {
    /// Wraps revert data coming back from an external call, turning
    /// spoofed query results into [`Revert::MaliciousQueryRevert`].
    pub fn bubble_up_non_malicious(data: RevertData) -> Self {
        if data.is_query_result() {
            Self::MaliciousQueryRevert
        } else {
            Self::Bubbled(data)
        }
    }

    pub fn is_malicious_query(&self) -> bool {
        matches!(self, Self::MaliciousQueryRevert)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reason_round_trip() {
        let data = RevertData::from_reason("NON_MALICIOUS_REVERT");
        assert_eq!(data.selector(), Some(ERROR_STRING_SELECTOR));
        assert_eq!(data.0.len(), 4 + 64 + 32);
        assert_eq!(data.reason().as_deref(), Some("NON_MALICIOUS_REVERT"));
        assert_eq!(data.to_string(), "NON_MALICIOUS_REVERT");
    }

    #[test]
    fn test_query_markers_are_malicious() {
        let swap = RevertData::with_selector(SWAP_QUERY_SELECTOR, &[1, 2]);
        let join_exit = RevertData::with_selector(JOIN_EXIT_QUERY_SELECTOR, &[3]);

        assert_eq!(
            Revert::bubble_up_non_malicious(swap),
            Revert::MaliciousQueryRevert
        );
        assert_eq!(
            Revert::bubble_up_non_malicious(join_exit),
            Revert::MaliciousQueryRevert
        );
    }

    #[test]
    fn test_plain_errors_bubble_up() {
        let data = RevertData::from_reason("NON_MALICIOUS_REVERT");
        let revert = Revert::bubble_up_non_malicious(data.clone());
        assert_eq!(revert, Revert::Bubbled(data));
        assert_eq!(revert.to_string(), "NON_MALICIOUS_REVERT");
        assert!(!revert.is_malicious_query());
    }

    #[test]
    fn test_reason_with_oversized_length_is_rejected() {
        let mut data = RevertData::from_reason("NON_MALICIOUS_REVERT");
        data.0[60..68].copy_from_slice(&u64::MAX.to_be_bytes());
        assert_eq!(data.reason(), None);
        assert!(data.to_string().starts_with("0x08c379a0"));
    }

    #[test]
    fn test_short_data_is_not_a_query() {
        assert!(!RevertData(vec![0xfa, 0x61]).is_query_result());
        assert_eq!(RevertData(vec![0xab]).to_string(), "0xab");
    }
}
