//! Command Line Interface for Euler linear pools.
use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use dotenv::dotenv;
use linear_pool_domain::enums::RevertType;
use linear_pool_domain::value_objects::VersionInfo;
use linear_pool_execution::prelude::*;
use linear_pool_protocols::prelude::EULER_PROTOCOL;
use rust_decimal::Decimal;
use std::path::PathBuf;

mod config;
mod scenario;

use config::ScenarioConfig;
use scenario::{ScenarioReport, format_units};

#[derive(Parser)]
#[command(name = "linear-pool-cli")]
#[command(about = "Euler linear pool factory and rebalancer CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Deploy a pool on a fresh chain, join it and let the keeper rebalance
    Scenario {
        /// JSON scenario config
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Upper target in whole main tokens
        #[arg(long)]
        upper_target: Option<u64>,

        /// Main tokens swapped into the pool
        #[arg(long)]
        join: Option<u64>,

        /// Swap fee as a fraction (0.01 = 1%)
        #[arg(long)]
        swap_fee: Option<Decimal>,

        /// eToken exchange rate multiplicator
        #[arg(short, long)]
        multiplicator: Option<u64>,

        /// eToken behaviour when its rate is queried
        #[arg(short, long, value_enum)]
        revert_type: Option<RevertArg>,

        /// Euler protocol address; deploys the rebalanced factory
        #[arg(long)]
        euler_protocol: Option<String>,
    },
    /// Print the rebalanced deployment's version metadata
    Versions,
}

#[derive(Clone, Copy, ValueEnum)]
enum RevertArg {
    None,
    NonMalicious,
    MaliciousSwapQuery,
    MaliciousJoinExitQuery,
}

impl From<RevertArg> for RevertType {
    fn from(arg: RevertArg) -> Self {
        match arg {
            RevertArg::None => RevertType::DoNotRevert,
            RevertArg::NonMalicious => RevertType::NonMalicious,
            RevertArg::MaliciousSwapQuery => RevertType::MaliciousSwapQuery,
            RevertArg::MaliciousJoinExitQuery => RevertType::MaliciousJoinExitQuery,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Scenario {
            config,
            upper_target,
            join,
            swap_fee,
            multiplicator,
            revert_type,
            euler_protocol,
        } => {
            let mut scenario = match config {
                Some(path) => ScenarioConfig::from_file(&path)?,
                None => ScenarioConfig::default(),
            }
            .with_env(|key| std::env::var(key).ok())?;

            if let Some(upper_target) = upper_target {
                scenario.upper_target = upper_target;
            }
            if let Some(join) = join {
                scenario.join_amount = join;
            }
            if let Some(swap_fee) = swap_fee {
                scenario.swap_fee = swap_fee;
            }
            if let Some(multiplicator) = multiplicator {
                scenario.exchange_rate_multiplicator = multiplicator;
            }
            if let Some(revert_type) = revert_type {
                scenario.revert_type = revert_type.into();
            }
            if let Some(euler_protocol) = euler_protocol {
                scenario.euler_protocol = Some(config::parse_address(&euler_protocol)?);
            }

            println!("🏗️  Deploying vault, factory and DAI/eDAI pool...");
            let report = scenario::run(&scenario).await?;
            print_report(&scenario, &report);
        }
        Commands::Versions => {
            println!("📦 Rebalanced Euler linear pool deployment");
            println!("   Factory:         {}", VersionInfo::euler_factory().to_json()?);
            println!("   Pool:            {}", VersionInfo::euler_pool().to_json()?);
            println!("   Euler protocol:  {:?}", EULER_PROTOCOL);
        }
    }

    Ok(())
}

fn print_report(config: &ScenarioConfig, report: &ScenarioReport) {
    println!(
        "✅ Pool {:?} ({})",
        report.pool,
        chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC")
    );
    match &report.factory_version {
        Some(version) => println!("   Factory version: {version}"),
        None => println!("   Factory version: unversioned"),
    }
    println!("   Rebalancer:      {:?}", report.rebalancer);
    println!(
        "   Asset managers:  main {:?} | wrapped {:?} | BPT {:?}",
        report.main_asset_manager, report.wrapped_asset_manager, report.bpt_asset_manager
    );

    println!();
    println!("📈 Wrapped Token Rate");
    match &report.wrapped_rate {
        Ok(rate) => println!(
            "   {} (multiplicator {})",
            rate.normalize(),
            config.exchange_rate_multiplicator
        ),
        Err(reason) => println!("   ❌ reverted: {reason}"),
    }

    println!();
    println!("⚖️  Balances");
    println!("{:<10} | {:>14} | {:>14}", "Token", "Before", "After");
    println!("{}", "-".repeat(44));
    for (name, before, after) in [
        ("Main", report.before.main, report.after.main),
        ("Wrapped", report.before.wrapped, report.after.wrapped),
    ] {
        println!(
            "{:<10} | {:>14} | {:>14}",
            name,
            format_units(before),
            format_units(after)
        );
    }
    println!(
        "   Targets: [{}, {}]",
        format_units(report.targets.0),
        format_units(report.targets.1)
    );

    println!();
    println!("🤖 Keeper");
    match &report.outcome {
        PoolOutcome::Held => println!("   Pool within targets, nothing to do"),
        PoolOutcome::Previewed { reward } => {
            println!("   Would rebalance for {}", format_units(*reward))
        }
        PoolOutcome::Rebalanced { block_number, .. } => println!(
            "   Rebalanced in block {block_number}, reward {} {}",
            report.reward.normalize(),
            report.main_symbol
        ),
        PoolOutcome::Skipped => println!("   Pool quarantined, skipped"),
        PoolOutcome::Quarantined => {
            println!("   🚨 Malicious rate source, pool quarantined")
        }
        PoolOutcome::Failed { reason } => println!("   ❌ Rebalance failed: {reason}"),
    }
    println!("   Circuit breaker: {:?}", report.circuit);
}
