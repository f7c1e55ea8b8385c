//! In-process chain that hosts every simulated contract.
//!
//! Views take a read lock on the state. Transactions take the write lock,
//! snapshot the state, and either commit with a [`Receipt`] or restore the
//! snapshot when the call reverts, so a failing call never leaves partial
//! effects behind.

mod events;
mod state;

pub use events::{Event, Log, Receipt};
pub use state::{BlockInfo, ChainState};

use linear_pool_domain::errors::Revert;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

/// Shared handle to the simulated chain.
#[derive(Clone, Default)]
pub struct Chain {
    state: Arc<RwLock<ChainState>>,
}

impl Chain {
    /// Creates an empty chain at the genesis block.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs a read-only call against the current state.
    pub async fn call<T, F>(&self, f: F) -> Result<T, Revert>
    where
        F: FnOnce(&ChainState) -> Result<T, Revert>,
    {
        let state = self.state.read().await;
        f(&state)
    }

    /// Executes a transaction in a new block.
    ///
    /// # Errors
    /// Returns the revert reason; the state is left exactly as it was.
    pub async fn transact<T, F>(&self, f: F) -> Result<(T, Receipt), Revert>
    where
        F: FnOnce(&mut ChainState) -> Result<T, Revert>,
    {
        let mut state = self.state.write().await;
        let snapshot = state.clone();

        state.begin_block();
        match f(&mut state) {
            Ok(value) => {
                let receipt = state.end_block();
                debug!(
                    block = receipt.block_number,
                    logs = receipt.logs.len(),
                    "Transaction committed"
                );
                Ok((value, receipt))
            }
            Err(revert) => {
                *state = snapshot;
                debug!(reason = %revert, "Transaction reverted");
                Err(revert)
            }
        }
    }

    /// Runs a state-changing call against a throwaway copy of the state.
    pub async fn simulate<T, F>(&self, f: F) -> Result<T, Revert>
    where
        F: FnOnce(&mut ChainState) -> Result<T, Revert>,
    {
        let mut scratch = self.state.read().await.clone();
        scratch.begin_block();
        f(&mut scratch)
    }

    /// Current block.
    pub async fn block(&self) -> BlockInfo {
        self.state.read().await.block()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use linear_pool_domain::{Address, U256};

    fn alice() -> Address {
        Address::from_low_u64_be(0xa11ce)
    }

    #[tokio::test]
    async fn test_transact_commits_and_advances_block() {
        let chain = Chain::new();
        let before = chain.block().await;

        let (token, receipt) = chain
            .transact(|s| Ok(s.deploy_erc20("Dai", "DAI", 18)))
            .await
            .unwrap();
        chain
            .transact(|s| s.erc20_mint(token, alice(), U256::from(5)))
            .await
            .unwrap();

        assert_eq!(receipt.block_number, before.number + 1);
        assert_eq!(chain.block().await.number, before.number + 2);
        let balance = chain
            .call(|s| s.erc20_balance_of(token, alice()))
            .await
            .unwrap();
        assert_eq!(balance, U256::from(5));
    }

    #[tokio::test]
    async fn test_revert_restores_state() {
        let chain = Chain::new();
        let (token, _) = chain
            .transact(|s| Ok(s.deploy_erc20("Dai", "DAI", 18)))
            .await
            .unwrap();
        let block = chain.block().await;

        let result = chain
            .transact(|s| {
                s.erc20_mint(token, alice(), U256::from(5))?;
                Err::<(), _>(Revert::TokensMismatch)
            })
            .await;

        assert_eq!(result.unwrap_err(), Revert::TokensMismatch);
        assert_eq!(chain.block().await, block);
        let balance = chain
            .call(|s| s.erc20_balance_of(token, alice()))
            .await
            .unwrap();
        assert!(balance.is_zero());
    }

    #[tokio::test]
    async fn test_simulate_discards_changes() {
        let chain = Chain::new();
        let (token, _) = chain
            .transact(|s| Ok(s.deploy_erc20("Dai", "DAI", 18)))
            .await
            .unwrap();

        let simulated = chain
            .simulate(|s| {
                s.erc20_mint(token, alice(), U256::from(7))?;
                s.erc20_balance_of(token, alice())
            })
            .await
            .unwrap();

        assert_eq!(simulated, U256::from(7));
        let balance = chain
            .call(|s| s.erc20_balance_of(token, alice()))
            .await
            .unwrap();
        assert!(balance.is_zero());
    }
}
