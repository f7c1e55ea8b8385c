use super::events::{Event, Log, Receipt};
use crate::erc20::Erc20;
use crate::euler::{EulerLinearPool, EulerLinearPoolFactory, EulerLinearPoolRebalancer, MockEulerToken};
use crate::fees::ProtocolFeePercentagesProvider;
use crate::queries::BalancerQueries;
use crate::vault::Vault;
use linear_pool_domain::Address;
use linear_pool_domain::errors::Revert;
use std::collections::HashMap;

/// 2022-11-13T00:00:00Z
const GENESIS_TIMESTAMP: u64 = 1_668_297_600;
const BLOCK_TIME_SECS: u64 = 12;
/// Contract addresses are allocated upwards from here.
const CONTRACT_ADDRESS_BASE: u64 = 0xc000_0000;

/// Block the state is currently executing in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockInfo {
    pub number: u64,
    pub timestamp: u64,
}

/// Complete state of the simulated chain.
///
/// Contracts are kept in one map per kind so that a call can borrow the
/// contract it executes on and the contracts it reads at the same time.
#[derive(Debug, Clone)]
pub struct ChainState {
    block: BlockInfo,
    next_contract: u64,
    logs: Vec<Log>,
    pub(crate) erc20s: HashMap<Address, Erc20>,
    pub(crate) euler_tokens: HashMap<Address, MockEulerToken>,
    pub(crate) vaults: HashMap<Address, Vault>,
    pub(crate) fee_providers: HashMap<Address, ProtocolFeePercentagesProvider>,
    pub(crate) queries: HashMap<Address, BalancerQueries>,
    pub(crate) factories: HashMap<Address, EulerLinearPoolFactory>,
    pub(crate) pools: HashMap<Address, EulerLinearPool>,
    pub(crate) rebalancers: HashMap<Address, EulerLinearPoolRebalancer>,
}

impl Default for ChainState {
    fn default() -> Self {
        Self {
            block: BlockInfo {
                number: 0,
                timestamp: GENESIS_TIMESTAMP,
            },
            next_contract: 0,
            logs: Vec::new(),
            erc20s: HashMap::new(),
            euler_tokens: HashMap::new(),
            vaults: HashMap::new(),
            fee_providers: HashMap::new(),
            queries: HashMap::new(),
            factories: HashMap::new(),
            pools: HashMap::new(),
            rebalancers: HashMap::new(),
        }
    }
}

macro_rules! contract_accessors {
    ($($field:ident: $ty:ty => $get:ident, $get_mut:ident;)*) => {
        impl ChainState {
            $(
                pub fn $get(&self, address: Address) -> Result<&$ty, Revert> {
                    self.$field
                        .get(&address)
                        .ok_or(Revert::ContractNotFound(address))
                }

                #[allow(dead_code)]
                pub(crate) fn $get_mut(&mut self, address: Address) -> Result<&mut $ty, Revert> {
                    self.$field
                        .get_mut(&address)
                        .ok_or(Revert::ContractNotFound(address))
                }
            )*
        }
    };
}

contract_accessors! {
    erc20s: Erc20 => erc20, erc20_mut;
    euler_tokens: MockEulerToken => euler_token, euler_token_mut;
    vaults: Vault => vault, vault_mut;
    fee_providers: ProtocolFeePercentagesProvider => fee_provider, fee_provider_mut;
    queries: BalancerQueries => balancer_queries, balancer_queries_mut;
    factories: EulerLinearPoolFactory => factory, factory_mut;
    pools: EulerLinearPool => linear_pool, linear_pool_mut;
    rebalancers: EulerLinearPoolRebalancer => rebalancer, rebalancer_mut;
}

impl ChainState {
    pub fn block(&self) -> BlockInfo {
        self.block
    }

    /// Reserves the address of the next contract to be deployed.
    pub(crate) fn allocate_address(&mut self) -> Address {
        let address = Address::from_low_u64_be(CONTRACT_ADDRESS_BASE + self.next_contract);
        self.next_contract += 1;
        address
    }

    pub(crate) fn emit(&mut self, address: Address, event: Event) {
        self.logs.push(Log { address, event });
    }

    pub(crate) fn begin_block(&mut self) {
        self.block.number += 1;
        self.block.timestamp += BLOCK_TIME_SECS;
        self.logs.clear();
    }

    pub(crate) fn end_block(&mut self) -> Receipt {
        Receipt {
            block_number: self.block.number,
            logs: std::mem::take(&mut self.logs),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_addresses_are_unique_and_ordered() {
        let mut state = ChainState::default();
        let a = state.allocate_address();
        let b = state.allocate_address();
        assert!(a < b);
    }

    #[test]
    fn test_missing_contract() {
        let state = ChainState::default();
        let nowhere = Address::from_low_u64_be(1);
        assert_eq!(
            state.vault(nowhere).unwrap_err(),
            Revert::ContractNotFound(nowhere)
        );
    }
}
