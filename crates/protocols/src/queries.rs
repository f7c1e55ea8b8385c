use crate::chain::ChainState;
use crate::vault::SingleSwap;
use linear_pool_domain::enums::SwapKind;
use linear_pool_domain::errors::Revert;
use linear_pool_domain::{Address, U256};

/// Read-only helper that quotes swaps against a vault.
#[derive(Debug, Clone)]
pub struct BalancerQueries {
    vault: Address,
}

impl BalancerQueries {
    pub fn vault(&self) -> Address {
        self.vault
    }
}

impl ChainState {
    pub fn deploy_balancer_queries(&mut self, vault: Address) -> Address {
        let address = self.allocate_address();
        self.queries.insert(address, BalancerQueries { vault });
        address
    }

    /// Calculated amount of `swap`: amount out for `GivenIn`, amount in for
    /// `GivenOut`.
    pub fn queries_query_swap(&self, queries: Address, swap: &SingleSwap) -> Result<U256, Revert> {
        let vault = self.balancer_queries(queries)?.vault;
        let (amount_in, amount_out) = self.vault_query_swap(vault, swap)?;
        Ok(match swap.kind {
            SwapKind::GivenIn => amount_out,
            SwapKind::GivenOut => amount_in,
        })
    }
}
