//! Async handles over deployed contracts.
//!
//! A handle pairs the shared [`Chain`] with a contract address and the
//! account that signs its transactions. Views go through [`Chain::call`],
//! state-changing methods through [`Chain::transact`] and return the
//! [`Receipt`].

use crate::chain::{Chain, Receipt};
use crate::euler::{CreatePoolParams, EulerToken, LinearPoolBalances};
use crate::vault::{FundManagement, PoolBalanceOp, PoolTokenInfo, PoolTokens, SingleSwap};
use linear_pool_domain::entities::Token;
use linear_pool_domain::enums::{ProtocolFeeType, RevertType};
use linear_pool_domain::errors::Revert;
use linear_pool_domain::value_objects::PoolId;
use linear_pool_domain::{Address, U256};

macro_rules! contract_handle {
    ($($(#[$meta:meta])* $name:ident;)*) => {
        $(
            $(#[$meta])*
            #[derive(Clone)]
            pub struct $name {
                chain: Chain,
                address: Address,
                from: Address,
            }

            impl $name {
                pub fn new(chain: Chain, address: Address, from: Address) -> Self {
                    Self { chain, address, from }
                }

                pub fn address(&self) -> Address {
                    self.address
                }

                /// Account signing this handle's transactions.
                pub fn signer(&self) -> Address {
                    self.from
                }

                pub fn chain(&self) -> &Chain {
                    &self.chain
                }

                /// Same contract, transactions signed by `from`.
                pub fn connect(&self, from: Address) -> Self {
                    Self {
                        chain: self.chain.clone(),
                        address: self.address,
                        from,
                    }
                }
            }

            impl std::fmt::Debug for $name {
                fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                    f.debug_struct(stringify!($name))
                        .field("address", &self.address)
                        .field("from", &self.from)
                        .finish()
                }
            }
        )*
    };
}

contract_handle! {
    /// ERC-20 token.
    Erc20Contract;
    /// Mock Euler eToken.
    EulerTokenContract;
    /// Vault.
    VaultContract;
    /// Swap query helper.
    QueriesContract;
    /// Protocol fee percentages provider.
    FeesProviderContract;
    /// Euler linear pool.
    LinearPoolContract;
    /// Rebalancer of one linear pool.
    RebalancerContract;
    /// Euler linear pool factory.
    FactoryContract;
}

impl Erc20Contract {
    pub async fn symbol(&self) -> Result<String, Revert> {
        let token = self.address;
        self.chain
            .call(|s| Ok(s.erc20(token)?.symbol().to_string()))
            .await
    }

    pub async fn decimals(&self) -> Result<u8, Revert> {
        let token = self.address;
        self.chain.call(|s| Ok(s.erc20(token)?.decimals())).await
    }

    /// Address, symbol, decimals and name in one call.
    pub async fn token(&self) -> Result<Token, Revert> {
        let token = self.address;
        self.chain.call(|s| Ok(s.erc20(token)?.metadata(token))).await
    }

    pub async fn total_supply(&self) -> Result<U256, Revert> {
        let token = self.address;
        self.chain.call(|s| Ok(s.erc20(token)?.total_supply())).await
    }

    pub async fn balance_of(&self, account: Address) -> Result<U256, Revert> {
        let token = self.address;
        self.chain
            .call(|s| s.erc20_balance_of(token, account))
            .await
    }

    pub async fn allowance(&self, owner: Address, spender: Address) -> Result<U256, Revert> {
        let token = self.address;
        self.chain
            .call(|s| Ok(s.erc20(token)?.allowance(owner, spender)))
            .await
    }

    pub async fn approve(&self, spender: Address, amount: U256) -> Result<Receipt, Revert> {
        let (token, from) = (self.address, self.from);
        let ((), receipt) = self
            .chain
            .transact(|s| s.erc20_approve(token, from, spender, amount))
            .await?;
        Ok(receipt)
    }

    pub async fn transfer(&self, to: Address, amount: U256) -> Result<Receipt, Revert> {
        let (token, from) = (self.address, self.from);
        let ((), receipt) = self
            .chain
            .transact(|s| s.erc20_transfer(token, from, to, amount))
            .await?;
        Ok(receipt)
    }

    /// Test tokens mint to anyone.
    pub async fn mint(&self, to: Address, amount: U256) -> Result<Receipt, Revert> {
        let token = self.address;
        let ((), receipt) = self
            .chain
            .transact(|s| s.erc20_mint(token, to, amount))
            .await?;
        Ok(receipt)
    }
}

impl EulerTokenContract {
    pub fn as_erc20(&self) -> Erc20Contract {
        Erc20Contract::new(self.chain.clone(), self.address, self.from)
    }

    pub async fn underlying_asset(&self) -> Result<Address, Revert> {
        let token = self.address;
        self.chain.call(|s| s.euler_underlying_asset(token)).await
    }

    pub async fn convert_balance_to_underlying(&self, balance: U256) -> Result<U256, Revert> {
        let token = self.address;
        self.chain
            .call(|s| {
                s.euler_token(token)?
                    .convert_balance_to_underlying(balance)
                    .map_err(Revert::Bubbled)
            })
            .await
    }

    pub async fn set_exchange_rate_multiplicator(
        &self,
        multiplicator: U256,
    ) -> Result<Receipt, Revert> {
        let token = self.address;
        let ((), receipt) = self
            .chain
            .transact(|s| s.euler_set_exchange_rate_multiplicator(token, multiplicator))
            .await?;
        Ok(receipt)
    }

    pub async fn set_revert_type(&self, revert_type: RevertType) -> Result<Receipt, Revert> {
        let token = self.address;
        let ((), receipt) = self
            .chain
            .transact(|s| s.euler_set_revert_type(token, revert_type))
            .await?;
        Ok(receipt)
    }

    /// Deposits underlying; returns the eTokens minted.
    pub async fn deposit(&self, amount: U256) -> Result<(U256, Receipt), Revert> {
        let (token, from) = (self.address, self.from);
        self.chain
            .transact(|s| s.euler_deposit(token, from, amount))
            .await
    }

    /// Withdraws underlying; returns the eTokens burned.
    pub async fn withdraw(&self, amount: U256) -> Result<(U256, Receipt), Revert> {
        let (token, from) = (self.address, self.from);
        self.chain
            .transact(|s| s.euler_withdraw(token, from, amount))
            .await
    }
}

impl VaultContract {
    pub async fn get_pool_tokens(&self, pool_id: PoolId) -> Result<PoolTokens, Revert> {
        let vault = self.address;
        self.chain
            .call(|s| s.vault_get_pool_tokens(vault, pool_id))
            .await
    }

    pub async fn get_pool_token_info(
        &self,
        pool_id: PoolId,
        token: Address,
    ) -> Result<PoolTokenInfo, Revert> {
        let vault = self.address;
        self.chain
            .call(|s| s.vault_get_pool_token_info(vault, pool_id, token))
            .await
    }

    /// Returns the calculated amount of the swap.
    pub async fn swap(
        &self,
        swap: SingleSwap,
        funds: FundManagement,
        limit: U256,
        deadline: u64,
    ) -> Result<(U256, Receipt), Revert> {
        let (vault, from) = (self.address, self.from);
        self.chain
            .transact(|s| s.vault_swap(vault, from, &swap, &funds, limit, deadline))
            .await
    }

    pub async fn manage_pool_balance(&self, ops: Vec<PoolBalanceOp>) -> Result<Receipt, Revert> {
        let (vault, from) = (self.address, self.from);
        let ((), receipt) = self
            .chain
            .transact(|s| s.vault_manage_pool_balance(vault, from, &ops))
            .await?;
        Ok(receipt)
    }
}

impl QueriesContract {
    pub async fn query_swap(&self, swap: SingleSwap) -> Result<U256, Revert> {
        let queries = self.address;
        self.chain
            .call(|s| s.queries_query_swap(queries, &swap))
            .await
    }
}

impl FeesProviderContract {
    pub async fn get_fee_type_percentage(&self, fee_type: ProtocolFeeType) -> Result<U256, Revert> {
        let provider = self.address;
        self.chain
            .call(|s| Ok(s.fee_provider(provider)?.fee_type_percentage(fee_type)))
            .await
    }

    pub async fn set_fee_type_percentage(
        &self,
        fee_type: ProtocolFeeType,
        percentage: U256,
    ) -> Result<Receipt, Revert> {
        let (provider, from) = (self.address, self.from);
        let ((), receipt) = self
            .chain
            .transact(|s| s.fees_set_fee_type_percentage(provider, from, fee_type, percentage))
            .await?;
        Ok(receipt)
    }
}

impl LinearPoolContract {
    pub async fn get_pool_id(&self) -> Result<PoolId, Revert> {
        let pool = self.address;
        self.chain.call(|s| Ok(s.linear_pool(pool)?.pool_id())).await
    }

    pub async fn get_vault(&self) -> Result<Address, Revert> {
        let pool = self.address;
        self.chain.call(|s| Ok(s.linear_pool(pool)?.vault())).await
    }

    pub async fn get_main_token(&self) -> Result<Address, Revert> {
        let pool = self.address;
        self.chain
            .call(|s| Ok(s.linear_pool(pool)?.main_token()))
            .await
    }

    pub async fn get_wrapped_token(&self) -> Result<Address, Revert> {
        let pool = self.address;
        self.chain
            .call(|s| Ok(s.linear_pool(pool)?.wrapped_token()))
            .await
    }

    pub async fn get_scaling_factors(&self) -> Result<[U256; 3], Revert> {
        let pool = self.address;
        self.chain
            .call(|s| Ok(s.linear_pool(pool)?.scaling_factors()))
            .await
    }

    pub async fn get_swap_fee_percentage(&self) -> Result<U256, Revert> {
        let pool = self.address;
        self.chain
            .call(|s| Ok(s.linear_pool(pool)?.swap_fee_percentage()))
            .await
    }

    pub async fn get_owner(&self) -> Result<Address, Revert> {
        let pool = self.address;
        self.chain.call(|s| Ok(s.linear_pool(pool)?.owner())).await
    }

    /// Rebalancer registered as the pool's asset manager.
    pub async fn get_asset_manager(&self) -> Result<Address, Revert> {
        let pool = self.address;
        self.chain
            .call(|s| Ok(s.linear_pool(pool)?.asset_manager()))
            .await
    }

    pub async fn version(&self) -> Result<Option<String>, Revert> {
        let pool = self.address;
        self.chain
            .call(|s| Ok(s.linear_pool(pool)?.version().map(str::to_owned)))
            .await
    }

    pub async fn get_wrapped_token_rate(&self) -> Result<U256, Revert> {
        let pool = self.address;
        self.chain
            .call(|s| s.linear_pool_wrapped_token_rate(pool))
            .await
    }

    pub async fn get_rate(&self) -> Result<U256, Revert> {
        let pool = self.address;
        self.chain.call(|s| s.linear_pool_rate(pool)).await
    }

    pub async fn get_virtual_supply(&self) -> Result<U256, Revert> {
        let pool = self.address;
        self.chain
            .call(|s| s.linear_pool_virtual_supply(pool))
            .await
    }

    /// `(lower, upper)` in main token units.
    pub async fn get_targets(&self) -> Result<(U256, U256), Revert> {
        let pool = self.address;
        self.chain.call(|s| s.linear_pool_targets(pool)).await
    }

    pub async fn get_balances(&self) -> Result<LinearPoolBalances, Revert> {
        let pool = self.address;
        self.chain.call(|s| s.linear_pool_balances(pool)).await
    }

    pub async fn set_targets(&self, lower: U256, upper: U256) -> Result<Receipt, Revert> {
        let (pool, from) = (self.address, self.from);
        let ((), receipt) = self
            .chain
            .transact(|s| s.linear_pool_set_targets(pool, from, lower, upper))
            .await?;
        Ok(receipt)
    }

    pub async fn set_swap_fee_percentage(&self, fee: U256) -> Result<Receipt, Revert> {
        let (pool, from) = (self.address, self.from);
        let ((), receipt) = self
            .chain
            .transact(|s| s.linear_pool_set_swap_fee_percentage(pool, from, fee))
            .await?;
        Ok(receipt)
    }
}

impl RebalancerContract {
    pub async fn get_pool(&self) -> Result<Address, Revert> {
        let rebalancer = self.address;
        self.chain
            .call(|s| Ok(s.rebalancer(rebalancer)?.pool()))
            .await
    }

    /// Returns the main token paid to `recipient`.
    pub async fn rebalance(&self, recipient: Address) -> Result<(U256, Receipt), Revert> {
        let (rebalancer, from) = (self.address, self.from);
        self.chain
            .transact(|s| s.rebalancer_rebalance(rebalancer, from, recipient))
            .await
    }

    pub async fn rebalance_with_extra_main(
        &self,
        recipient: Address,
        extra_main: U256,
    ) -> Result<(U256, Receipt), Revert> {
        let (rebalancer, from) = (self.address, self.from);
        self.chain
            .transact(|s| {
                s.rebalancer_rebalance_with_extra_main(rebalancer, from, recipient, extra_main)
            })
            .await
    }

    /// Runs `rebalance` against a copy of the state and returns the reward.
    pub async fn static_rebalance(&self, recipient: Address) -> Result<U256, Revert> {
        let (rebalancer, from) = (self.address, self.from);
        self.chain
            .simulate(|s| s.rebalancer_rebalance(rebalancer, from, recipient))
            .await
    }
}

impl FactoryContract {
    /// Creates a pool. The new address is in the receipt's `PoolCreated`.
    pub async fn create(&self, params: CreatePoolParams) -> Result<Receipt, Revert> {
        let factory = self.address;
        let (_, receipt) = self
            .chain
            .transact(|s| s.factory_create(factory, params))
            .await?;
        Ok(receipt)
    }

    pub async fn disable(&self) -> Result<Receipt, Revert> {
        let (factory, from) = (self.address, self.from);
        let ((), receipt) = self
            .chain
            .transact(|s| s.factory_disable(factory, from))
            .await?;
        Ok(receipt)
    }

    pub async fn is_pool_from_factory(&self, pool: Address) -> Result<bool, Revert> {
        let factory = self.address;
        self.chain
            .call(|s| Ok(s.factory(factory)?.is_pool_from_factory(pool)))
            .await
    }

    pub async fn last_created_pool(&self) -> Result<Option<Address>, Revert> {
        let factory = self.address;
        self.chain
            .call(|s| Ok(s.factory(factory)?.last_created_pool()))
            .await
    }

    pub async fn version(&self) -> Result<Option<String>, Revert> {
        let factory = self.address;
        self.chain
            .call(|s| Ok(s.factory(factory)?.version().map(str::to_owned)))
            .await
    }

    pub async fn pool_version(&self) -> Result<Option<String>, Revert> {
        let factory = self.address;
        self.chain
            .call(|s| Ok(s.factory(factory)?.pool_version().map(str::to_owned)))
            .await
    }

    pub async fn rebalancer_of(&self, pool: Address) -> Result<Option<Address>, Revert> {
        let factory = self.address;
        self.chain
            .call(|s| Ok(s.factory(factory)?.rebalancer_of(pool)))
            .await
    }

    pub fn linear_pool(&self, pool: Address) -> LinearPoolContract {
        LinearPoolContract::new(self.chain.clone(), pool, self.from)
    }

    pub fn rebalancer(&self, rebalancer: Address) -> RebalancerContract {
        RebalancerContract::new(self.chain.clone(), rebalancer, self.from)
    }
}
