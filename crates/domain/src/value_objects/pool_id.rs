use crate::enums::PoolSpecialization;
use crate::{Address, H256};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Vault-scoped pool identifier.
///
/// Layout: pool address (20 bytes), specialization (2 bytes, big-endian),
/// registration nonce (10 bytes, big-endian).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PoolId(pub H256);

impl PoolId {
    pub fn new(pool: Address, specialization: PoolSpecialization, nonce: u64) -> Self {
        let mut bytes = [0u8; 32];
        bytes[..20].copy_from_slice(pool.as_bytes());
        bytes[20..22].copy_from_slice(&specialization.as_u16().to_be_bytes());
        // u64 nonce fills the low 8 of the 10 nonce bytes
        bytes[24..].copy_from_slice(&nonce.to_be_bytes());
        Self(H256(bytes))
    }

    pub fn pool_address(&self) -> Address {
        Address::from_slice(&self.0.as_bytes()[..20])
    }

    pub fn specialization(&self) -> Option<PoolSpecialization> {
        let b = self.0.as_bytes();
        PoolSpecialization::from_u16(u16::from_be_bytes([b[20], b[21]]))
    }

    pub fn nonce(&self) -> u64 {
        let b = self.0.as_bytes();
        let mut nonce = [0u8; 8];
        nonce.copy_from_slice(&b[24..]);
        u64::from_be_bytes(nonce)
    }
}

impl fmt::Display for PoolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.0)
    }
}
