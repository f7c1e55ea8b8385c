//! End-to-end scenario on a fresh simulated chain.

use crate::config::ScenarioConfig;
use anyhow::{Context, Result};
use linear_pool_domain::enums::SwapKind;
use linear_pool_domain::errors::MathError;
use linear_pool_domain::math::fixed_point;
use linear_pool_domain::{Address, U256};
use linear_pool_execution::prelude::*;
use linear_pool_protocols::prelude::*;
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::info;

const MAIN_DECIMALS: u32 = 18;

pub fn deployer() -> Address {
    Address::from_low_u64_be(0x1000)
}

pub fn liquidity_provider() -> Address {
    Address::from_low_u64_be(0x1001)
}

pub fn keeper_account() -> Address {
    Address::from_low_u64_be(0x1005)
}

/// What the scenario observed.
#[derive(Debug, Clone)]
pub struct ScenarioReport {
    pub factory_version: Option<String>,
    pub main_symbol: String,
    pub pool: Address,
    pub rebalancer: Address,
    pub main_asset_manager: Address,
    pub wrapped_asset_manager: Address,
    pub bpt_asset_manager: Address,
    /// Wrapped token rate, or the revert reason of the rate query.
    pub wrapped_rate: Result<Decimal, String>,
    pub before: LinearPoolBalances,
    pub after: LinearPoolBalances,
    pub targets: (U256, U256),
    pub outcome: PoolOutcome,
    pub reward: Decimal,
    pub circuit: CircuitState,
}

pub fn to_units(value: U256) -> Result<Decimal, MathError> {
    fixed_point::to_decimal(value, MAIN_DECIMALS)
}

/// Whole-token rendering, or the raw amount when it does not fit a `Decimal`.
pub fn format_units(value: U256) -> String {
    match to_units(value) {
        Ok(units) => units.normalize().to_string(),
        Err(_) => format!("{value} wei"),
    }
}

/// Deploys the stack, creates a pool, joins it with main, applies the
/// configured rate behaviour and lets the keeper evaluate the pool once.
pub async fn run(config: &ScenarioConfig) -> Result<ScenarioReport> {
    let chain = Chain::new();
    let main = deploy_token(&chain, "Dai Stablecoin", "DAI", 18, deployer()).await?;
    let wrapped = deploy_euler_token(
        &chain,
        "Euler Pool: Dai Stablecoin",
        "eDAI",
        main.address(),
        config.euler_protocol,
        deployer(),
    )
    .await?;
    let deployment = ProtocolDeployment::deploy(&chain, deployer(), config.euler_protocol).await?;

    let receipt = deployment
        .factory
        .create(CreatePoolParams {
            name: "Balancer Euler Boosted Pool (DAI)".to_string(),
            symbol: "bb-e-DAI".to_string(),
            main_token: main.address(),
            wrapped_token: wrapped.address(),
            upper_target: U256::from(config.upper_target) * fixed_point::ONE,
            swap_fee_percentage: fixed_point::from_decimal(config.swap_fee, MAIN_DECIMALS)?,
            owner: deployer(),
        })
        .await?;
    let pool = receipt
        .pool_created()
        .context("create emitted no PoolCreated event")?;
    info!(pool = ?pool, block = receipt.block_number, "Pool created");

    let managed = ManagedPool::from_factory(&deployment.factory, pool).await?;
    let pool_id = managed.pool_contract().get_pool_id().await?;
    let manager = |token| deployment.vault.get_pool_token_info(pool_id, token);
    let main_asset_manager = manager(main.address()).await?.asset_manager;
    let wrapped_asset_manager = manager(wrapped.address()).await?.asset_manager;
    let bpt_asset_manager = manager(pool).await?.asset_manager;

    if config.join_amount > 0 {
        let amount = U256::from(config.join_amount) * fixed_point::ONE;
        let lp = liquidity_provider();
        main.mint(lp, amount).await?;
        main.connect(lp)
            .approve(deployment.vault.address(), U256::MAX)
            .await?;
        deployment
            .vault
            .connect(lp)
            .swap(
                SingleSwap {
                    pool_id,
                    kind: SwapKind::GivenIn,
                    asset_in: main.address(),
                    asset_out: pool,
                    amount,
                },
                FundManagement {
                    sender: lp,
                    recipient: lp,
                },
                U256::zero(),
                u64::MAX,
            )
            .await?;
    }

    wrapped
        .set_exchange_rate_multiplicator(U256::from(config.exchange_rate_multiplicator))
        .await?;
    wrapped.set_revert_type(config.revert_type).await?;

    let wrapped_rate = managed
        .pool_contract()
        .get_wrapped_token_rate()
        .await
        .map_err(|e| e.to_string())
        .and_then(|rate| to_units(rate).map_err(|e| e.to_string()));
    let before = managed.pool_contract().get_balances().await?;
    let targets = managed.pool_contract().get_targets().await?;

    let keeper = RebalanceKeeper::new(KeeperConfig {
        recipient: keeper_account(),
        ..Default::default()
    });
    let managed = Arc::new(managed);
    keeper.watch(managed.clone()).await?;
    let outcome = keeper.evaluate(&*managed).await;

    Ok(ScenarioReport {
        factory_version: deployment.factory.version().await?,
        main_symbol: main.token().await?.symbol,
        pool,
        rebalancer: managed.rebalancer(),
        main_asset_manager,
        wrapped_asset_manager,
        bpt_asset_manager,
        wrapped_rate,
        before,
        after: managed.pool_contract().get_balances().await?,
        targets,
        outcome,
        reward: to_units(main.balance_of(keeper_account()).await?)?,
        circuit: keeper.circuit_breaker().state().await,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use linear_pool_domain::ZERO_ADDRESS;
    use linear_pool_domain::enums::RevertType;
    use rust_decimal_macros::dec;

    #[test]
    fn test_format_units() {
        assert_eq!(format_units(fixed_point::ONE * 3 / 2), "1.5");
        assert_eq!(format_units(U256::zero()), "0");
        assert!(to_units(U256::MAX).is_err());
        assert_eq!(format_units(U256::MAX), format!("{} wei", U256::MAX));
    }

    #[tokio::test]
    async fn test_default_scenario_rebalances() {
        let report = run(&ScenarioConfig::default()).await.unwrap();

        assert_eq!(report.factory_version, None);
        assert_eq!(report.main_symbol, "DAI");
        assert_eq!(report.main_asset_manager, report.rebalancer);
        assert_eq!(report.wrapped_asset_manager, report.rebalancer);
        assert_eq!(report.bpt_asset_manager, ZERO_ADDRESS);
        assert_eq!(report.wrapped_rate, Ok(dec!(1)));
        assert_eq!(to_units(report.before.main).unwrap(), dec!(60));
        assert_eq!(to_units(report.after.main).unwrap(), dec!(20));
        assert_eq!(report.reward, dec!(0.2));
        assert!(matches!(report.outcome, PoolOutcome::Rebalanced { .. }));
        assert_eq!(report.circuit, CircuitState::Closed);
    }

    #[tokio::test]
    async fn test_malicious_scenario_quarantines() {
        let config = ScenarioConfig {
            revert_type: RevertType::MaliciousJoinExitQuery,
            ..Default::default()
        };
        let report = run(&config).await.unwrap();

        assert_eq!(
            report.wrapped_rate,
            Err("MALICIOUS_QUERY_REVERT".to_string())
        );
        assert_eq!(report.outcome, PoolOutcome::Quarantined);
        assert_eq!(report.before, report.after);
        assert_eq!(report.reward, Decimal::ZERO);
        assert_eq!(report.circuit, CircuitState::Open);
    }

    #[tokio::test]
    async fn test_rebalanced_factory_is_versioned() {
        let config = ScenarioConfig {
            euler_protocol: Some(EULER_PROTOCOL),
            ..Default::default()
        };
        let report = run(&config).await.unwrap();

        let version = report.factory_version.unwrap();
        assert!(version.contains("20221113-euler-rebalanced-linear-pool"));
        assert_eq!(report.reward, dec!(0.2));
    }

    #[tokio::test]
    async fn test_rate_follows_multiplicator() {
        let config = ScenarioConfig {
            exchange_rate_multiplicator: 2,
            join_amount: 0,
            ..Default::default()
        };
        let report = run(&config).await.unwrap();

        assert_eq!(report.wrapped_rate, Ok(dec!(2)));
        assert_eq!(report.outcome, PoolOutcome::Held);
    }
}
