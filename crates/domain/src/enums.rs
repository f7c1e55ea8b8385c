use serde::{Deserialize, Serialize};

/// Direction in which a swap amount is fixed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SwapKind {
    /// The amount in is fixed, the amount out is computed.
    GivenIn,
    /// The amount out is fixed, the amount in is computed.
    GivenOut,
}

/// Vault pool specialization, encoded in the pool id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PoolSpecialization {
    General,
    MinimalSwapInfo,
    TwoToken,
}

impl PoolSpecialization {
    pub fn as_u16(self) -> u16 {
        match self {
            Self::General => 0,
            Self::MinimalSwapInfo => 1,
            Self::TwoToken => 2,
        }
    }

    pub fn from_u16(value: u16) -> Option<Self> {
        match value {
            0 => Some(Self::General),
            1 => Some(Self::MinimalSwapInfo),
            2 => Some(Self::TwoToken),
            _ => None,
        }
    }
}

/// Asset manager operation on a pool token balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PoolBalanceOpKind {
    /// Moves cash to managed and sends the tokens to the asset manager.
    Withdraw,
    /// Moves managed to cash and pulls the tokens from the asset manager.
    Deposit,
    /// Overwrites the managed balance.
    Update,
}

/// Behaviour of the mock lending token when its rate is queried.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RevertType {
    #[default]
    DoNotRevert,
    /// Reverts with a plain reason string.
    NonMalicious,
    /// Reverts with data shaped like a vault swap query result.
    MaliciousSwapQuery,
    /// Reverts with data shaped like a pool join/exit query result.
    MaliciousJoinExitQuery,
}

/// Fee types known to the protocol fee percentages provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProtocolFeeType {
    Swap,
    FlashLoan,
    Yield,
    Aum,
}
