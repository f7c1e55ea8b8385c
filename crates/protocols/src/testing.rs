//! Shared fixture: DAI, its eToken, a vault with queries and a fee provider,
//! a factory, and one pool created through it.

use crate::chain::ChainState;
use crate::euler::{CreatePoolParams, FactoryArgs, LinearPoolBalances};
use crate::vault::{FundManagement, SingleSwap};
use linear_pool_domain::enums::SwapKind;
use linear_pool_domain::math::fixed_point::ONE;
use linear_pool_domain::{Address, U256};

/// 1%
pub(crate) const POOL_SWAP_FEE_PERCENTAGE: U256 = U256([10_000_000_000_000_000, 0, 0, 0]);

pub(crate) fn deployer() -> Address {
    Address::from_low_u64_be(0x1000)
}

pub(crate) fn lp() -> Address {
    Address::from_low_u64_be(0x1001)
}

pub(crate) fn trader() -> Address {
    Address::from_low_u64_be(0x1002)
}

pub(crate) fn owner() -> Address {
    Address::from_low_u64_be(0x1003)
}

pub(crate) fn recipient() -> Address {
    Address::from_low_u64_be(0x1004)
}

/// `units` whole tokens in 18 decimals.
pub(crate) fn fp(units: u64) -> U256 {
    U256::from(units) * ONE
}

/// `units / 10` whole tokens in 18 decimals.
pub(crate) fn tenths(units: u64) -> U256 {
    U256::from(units) * ONE / 10
}

pub(crate) struct Fixture {
    pub state: ChainState,
    pub vault: Address,
    pub queries: Address,
    pub fee_provider: Address,
    pub factory: Address,
    pub main: Address,
    pub wrapped: Address,
    pub pool: Address,
    pub rebalancer: Address,
}

impl Fixture {
    /// Creates the pool with `upper_target` whole DAI and a 1% fee.
    pub(crate) fn new(upper_target: u64) -> Self {
        Self::with_main("DAI", 18, upper_target)
    }

    /// Same pool over a main token with `decimals`, targets and balances in
    /// whole tokens of that precision.
    pub(crate) fn with_main(symbol: &str, decimals: u8, upper_target: u64) -> Self {
        let mut state = ChainState::default();

        let main = state.deploy_erc20(symbol, symbol, decimals);
        let e_symbol = format!("e{symbol}");
        let wrapped = state
            .deploy_mock_euler_token(&e_symbol, &e_symbol, main, None)
            .unwrap();
        let unit = U256::exp10(decimals as usize);

        let vault = state.deploy_vault();
        let fee_provider = state.deploy_fee_percentages_provider(vault, deployer());
        let queries = state.deploy_balancer_queries(vault);
        let factory = state
            .deploy_euler_linear_pool_factory(
                deployer(),
                FactoryArgs {
                    vault,
                    protocol_fee_percentages_provider: fee_provider,
                    balancer_queries: queries,
                    versioning: None,
                },
            )
            .unwrap();

        let mut params = Self::create_params(main, wrapped, 0);
        params.upper_target = U256::from(upper_target) * unit;
        let pool = state.factory_create(factory, params).unwrap();
        let rebalancer = state.factory(factory).unwrap().rebalancer_of(pool).unwrap();

        for account in [lp(), trader()] {
            state.erc20_mint(main, account, U256::from(1000) * unit).unwrap();
            state.erc20_approve(main, account, vault, U256::MAX).unwrap();
            state
                .erc20_approve(wrapped, account, vault, U256::MAX)
                .unwrap();
            state
                .erc20_approve(main, account, wrapped, U256::MAX)
                .unwrap();
        }

        Self {
            state,
            vault,
            queries,
            fee_provider,
            factory,
            main,
            wrapped,
            pool,
            rebalancer,
        }
    }

    pub(crate) fn create_params(
        main: Address,
        wrapped: Address,
        upper_target: u64,
    ) -> CreatePoolParams {
        CreatePoolParams {
            name: "Euler Balancer Pool Token".to_string(),
            symbol: "EBPT".to_string(),
            main_token: main,
            wrapped_token: wrapped,
            upper_target: fp(upper_target),
            swap_fee_percentage: POOL_SWAP_FEE_PERCENTAGE,
            owner: owner(),
        }
    }

    pub(crate) fn swap(
        &mut self,
        account: Address,
        kind: SwapKind,
        asset_in: Address,
        asset_out: Address,
        amount: U256,
    ) -> U256 {
        let pool_id = self.state.linear_pool(self.pool).unwrap().pool_id();
        let limit = match kind {
            SwapKind::GivenIn => U256::zero(),
            SwapKind::GivenOut => U256::MAX,
        };
        self.state
            .vault_swap(
                self.vault,
                account,
                &SingleSwap {
                    pool_id,
                    kind,
                    asset_in,
                    asset_out,
                    amount,
                },
                &FundManagement {
                    sender: account,
                    recipient: account,
                },
                limit,
                u64::MAX,
            )
            .unwrap()
    }

    /// LP adds `amount` main and receives BPT.
    pub(crate) fn join_main(&mut self, amount: U256) -> U256 {
        let (main, pool) = (self.main, self.pool);
        self.swap(lp(), SwapKind::GivenIn, main, pool, amount)
    }

    pub(crate) fn balances(&self) -> LinearPoolBalances {
        self.state.linear_pool_balances(self.pool).unwrap()
    }
}
