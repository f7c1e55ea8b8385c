//! Keeper loop driving rebalances across watched pools.

use super::{
    Decision, DecisionConfig, DecisionEngine, KeeperError, PoolSnapshot, RebalanceOutcome,
    RebalanceTarget,
};
use crate::emergency::{CircuitBreaker, CircuitBreakerConfig};
use crate::lifecycle::{
    FailureData, LifecycleTracker, QuarantineData, RebalanceData, RebalanceDirection,
};
use linear_pool_domain::errors::Revert;
use linear_pool_domain::math::fixed_point;
use linear_pool_domain::{Address, U256, ZERO_ADDRESS};
use rust_decimal::Decimal;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::interval;
use tracing::{debug, error, info, warn};

/// Configuration for the keeper.
#[derive(Debug, Clone)]
pub struct KeeperConfig {
    /// Evaluation interval in seconds.
    pub eval_interval_secs: u64,
    /// Account receiving rebalance rewards.
    pub recipient: Address,
    /// Whether to submit rebalances automatically.
    pub auto_execute: bool,
    /// Dry run mode - preview the reward but don't submit.
    pub dry_run: bool,
    /// Whether a malicious query revert takes the pool out of rotation.
    pub quarantine_on_malicious_query: bool,
}

impl Default for KeeperConfig {
    fn default() -> Self {
        Self {
            eval_interval_secs: 60,
            recipient: ZERO_ADDRESS,
            auto_execute: true,
            dry_run: false,
            quarantine_on_malicious_query: true,
        }
    }
}

/// What happened to one pool during a tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PoolOutcome {
    /// Pool within its targets.
    Held,
    /// Rebalance warranted but not submitted.
    Previewed { reward: U256 },
    /// Rebalance submitted.
    Rebalanced { reward: U256, block_number: u64 },
    /// Pool was already quarantined.
    Skipped,
    /// Rate source turned malicious, pool quarantined.
    Quarantined,
    /// Call reverted for another reason.
    Failed { reason: String },
}

/// Tally of one tick.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickReport {
    pub evaluated: u32,
    pub held: u32,
    pub previewed: u32,
    pub rebalanced: u32,
    pub skipped: u32,
    pub quarantined: u32,
    pub failed: u32,
    /// Main token paid out this tick, raw units summed across pools.
    pub total_reward: U256,
}

impl TickReport {
    fn add(&mut self, outcome: &PoolOutcome) {
        self.evaluated += 1;
        match outcome {
            PoolOutcome::Held => self.held += 1,
            PoolOutcome::Previewed { .. } => self.previewed += 1,
            PoolOutcome::Rebalanced { reward, .. } => {
                self.rebalanced += 1;
                self.total_reward = self.total_reward.saturating_add(*reward);
            }
            PoolOutcome::Skipped => self.skipped += 1,
            PoolOutcome::Quarantined => self.quarantined += 1,
            PoolOutcome::Failed { .. } => self.failed += 1,
        }
    }
}

/// Keeps watched pools near the middle of their targets.
pub struct RebalanceKeeper {
    /// Watched pools.
    targets: RwLock<Vec<Arc<dyn RebalanceTarget>>>,
    /// Decision engine.
    decision_engine: DecisionEngine,
    /// Circuit breaker.
    circuit_breaker: Arc<CircuitBreaker>,
    /// Lifecycle tracker.
    lifecycle: Arc<LifecycleTracker>,
    /// Configuration.
    config: KeeperConfig,
    /// Running flag.
    running: AtomicBool,
}

impl RebalanceKeeper {
    /// Creates a new keeper.
    pub fn new(config: KeeperConfig) -> Self {
        Self::with_components(
            config,
            DecisionConfig::default(),
            CircuitBreakerConfig::default(),
        )
    }

    pub fn with_components(
        config: KeeperConfig,
        decision: DecisionConfig,
        circuit_breaker: CircuitBreakerConfig,
    ) -> Self {
        Self {
            targets: RwLock::new(Vec::new()),
            decision_engine: DecisionEngine::new(decision),
            circuit_breaker: Arc::new(CircuitBreaker::new(circuit_breaker)),
            lifecycle: Arc::new(LifecycleTracker::new()),
            config,
            running: AtomicBool::new(false),
        }
    }

    /// Starts watching a pool.
    pub async fn watch(&self, target: Arc<dyn RebalanceTarget>) -> Result<(), KeeperError> {
        let mut targets = self.targets.write().await;
        if targets.iter().any(|t| t.pool() == target.pool()) {
            return Err(KeeperError::AlreadyWatched(target.pool()));
        }
        info!(pool = ?target.pool(), rebalancer = ?target.rebalancer(), "Watching pool");
        targets.push(target);
        Ok(())
    }

    /// Number of watched pools.
    pub async fn watched(&self) -> usize {
        self.targets.read().await.len()
    }

    /// Sets the decision engine configuration.
    pub fn set_decision_config(&mut self, config: DecisionConfig) {
        self.decision_engine.set_config(config);
    }

    /// Enables or disables dry run mode.
    pub fn set_dry_run(&mut self, dry_run: bool) {
        self.config.dry_run = dry_run;
    }

    pub fn config(&self) -> &KeeperConfig {
        &self.config
    }

    /// Gets the circuit breaker.
    pub fn circuit_breaker(&self) -> &Arc<CircuitBreaker> {
        &self.circuit_breaker
    }

    /// Gets the lifecycle tracker.
    pub fn lifecycle(&self) -> &Arc<LifecycleTracker> {
        &self.lifecycle
    }

    /// Puts a quarantined pool back into rotation.
    pub async fn release(&self, pool: Address) -> bool {
        self.lifecycle.record_release(pool).await
    }

    /// Starts the keeper loop.
    pub async fn start(&self) {
        self.running.store(true, Ordering::SeqCst);

        let mut ticker = interval(Duration::from_secs(self.config.eval_interval_secs));

        info!(
            interval_secs = self.config.eval_interval_secs,
            auto_execute = self.config.auto_execute,
            dry_run = self.config.dry_run,
            "Starting rebalance keeper"
        );

        while self.running.load(Ordering::SeqCst) {
            ticker.tick().await;
            if !self.running.load(Ordering::SeqCst) {
                break;
            }

            match self.run_once().await {
                Ok(report) => debug!(?report, "Keeper tick finished"),
                Err(KeeperError::CircuitOpen) => warn!("Circuit breaker open, skipping evaluation"),
                Err(e) => error!(error = %e, "Keeper tick failed"),
            }
        }

        info!("Rebalance keeper stopped");
    }

    /// Stops the keeper loop after the current tick.
    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Evaluates every watched pool once.
    pub async fn run_once(&self) -> Result<TickReport, KeeperError> {
        if !self.circuit_breaker.is_allowed().await {
            return Err(KeeperError::CircuitOpen);
        }

        let targets = self.targets.read().await.clone();
        debug!(count = targets.len(), "Evaluating pools");

        let mut report = TickReport::default();
        for target in targets {
            // A trip earlier in this tick halts the rest of it.
            if !self.circuit_breaker.is_allowed().await {
                break;
            }
            let outcome = self.evaluate(target.as_ref()).await;
            report.add(&outcome);
        }
        Ok(report)
    }

    /// Evaluates a single pool and records the outcome.
    pub async fn evaluate(&self, target: &dyn RebalanceTarget) -> PoolOutcome {
        let pool = target.pool();
        if self.lifecycle.is_quarantined(&pool).await {
            debug!(pool = ?pool, "Pool quarantined, skipping");
            return PoolOutcome::Skipped;
        }

        match self.try_evaluate(target).await {
            Ok(outcome) => outcome,
            Err(revert) => self.handle_revert(target, revert).await,
        }
    }

    async fn try_evaluate(&self, target: &dyn RebalanceTarget) -> Result<PoolOutcome, Revert> {
        let snapshot = target.snapshot().await?;
        let decision = self.decision_engine.decide(&snapshot);
        let Decision::Rebalance { direction } = decision else {
            debug!(pool = ?snapshot.pool, main = %snapshot.main_balance, "Pool within targets");
            return Ok(PoolOutcome::Held);
        };

        info!(
            pool = ?snapshot.pool,
            decision = decision.description(),
            dry_run = self.config.dry_run,
            "Decision requires action"
        );

        if self.config.dry_run || !self.config.auto_execute {
            let reward = target.preview(self.config.recipient).await?;
            info!(pool = ?snapshot.pool, reward = %reward, "Rebalance previewed");
            return Ok(PoolOutcome::Previewed { reward });
        }

        let outcome = target.rebalance(self.config.recipient).await?;
        self.lifecycle
            .record_rebalance(
                snapshot.pool,
                outcome.block_number,
                rebalance_data(target, &snapshot, direction, &outcome, self.config.recipient),
            )
            .await;
        self.circuit_breaker.record_success().await;

        Ok(PoolOutcome::Rebalanced {
            reward: outcome.reward,
            block_number: outcome.block_number,
        })
    }

    async fn handle_revert(&self, target: &dyn RebalanceTarget, revert: Revert) -> PoolOutcome {
        let pool = target.pool();
        let reason = revert.to_string();

        if revert.is_malicious_query() && self.config.quarantine_on_malicious_query {
            self.lifecycle
                .record_quarantine(pool, QuarantineData { reason })
                .await;
            self.circuit_breaker.record_malicious_query(pool).await;
            return PoolOutcome::Quarantined;
        }

        self.lifecycle
            .record_failure(
                pool,
                FailureData {
                    reason: reason.clone(),
                },
            )
            .await;
        self.circuit_breaker.record_failure().await;
        PoolOutcome::Failed { reason }
    }
}

/// Reward in whole main tokens, if it fits a `Decimal`.
fn reward_in_units(reward: U256, main_decimals: u8) -> Option<Decimal> {
    fixed_point::to_decimal(reward, u32::from(main_decimals)).ok()
}

fn rebalance_data(
    target: &dyn RebalanceTarget,
    snapshot: &PoolSnapshot,
    direction: RebalanceDirection,
    outcome: &RebalanceOutcome,
    recipient: Address,
) -> RebalanceData {
    RebalanceData {
        rebalancer: target.rebalancer(),
        direction,
        main_before: snapshot.main_balance,
        main_after: outcome.main_after,
        reward: outcome.reward,
        reward_display: reward_in_units(outcome.reward, snapshot.main_decimals),
        recipient,
    }
}
