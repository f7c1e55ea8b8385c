//! Lifecycle tracker for pool history.

use super::{
    EventData, FailureData, LifecycleEvent, LifecycleEventType, QuarantineData, RebalanceData,
};
use linear_pool_domain::{Address, U256};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, warn};

/// Summary of a pool's lifecycle.
#[derive(Debug, Clone)]
pub struct PoolSummary {
    /// Pool address.
    pub pool: Address,
    /// When the pool was first recorded.
    pub first_seen: chrono::DateTime<chrono::Utc>,
    /// When the pool was last rebalanced.
    pub last_rebalance_at: Option<chrono::DateTime<chrono::Utc>>,
    /// Number of rebalances.
    pub rebalance_count: u32,
    /// Number of failed rebalance attempts.
    pub failure_count: u32,
    /// Total main token paid out, raw units.
    pub total_reward: U256,
    /// Whether the pool is out of rotation.
    pub quarantined: bool,
}

impl PoolSummary {
    fn new(pool: Address, at: chrono::DateTime<chrono::Utc>) -> Self {
        Self {
            pool,
            first_seen: at,
            last_rebalance_at: None,
            rebalance_count: 0,
            failure_count: 0,
            total_reward: U256::zero(),
            quarantined: false,
        }
    }
}

/// Tracks lifecycle events for all pools.
pub struct LifecycleTracker {
    /// Events by pool.
    events: Arc<RwLock<HashMap<Address, Vec<LifecycleEvent>>>>,
    /// Pool summaries.
    summaries: Arc<RwLock<HashMap<Address, PoolSummary>>>,
}

impl LifecycleTracker {
    /// Creates a new lifecycle tracker.
    #[must_use]
    pub fn new() -> Self {
        Self {
            events: Arc::new(RwLock::new(HashMap::new())),
            summaries: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Records a successful rebalance.
    pub async fn record_rebalance(&self, pool: Address, block_number: u64, data: RebalanceData) {
        let event = LifecycleEvent::new(
            LifecycleEventType::Rebalanced,
            pool,
            EventData::Rebalance(data.clone()),
        )
        .with_block(block_number);
        let at = event.timestamp;

        self.add_event(pool, event).await;

        {
            let mut summaries = self.summaries.write().await;
            let summary = summaries
                .entry(pool)
                .or_insert_with(|| PoolSummary::new(pool, at));
            summary.rebalance_count += 1;
            summary.last_rebalance_at = Some(at);
            summary.total_reward = summary.total_reward.saturating_add(data.reward);
        }

        info!(
            pool = ?pool,
            block = block_number,
            direction = ?data.direction,
            reward = ?data.reward_display,
            "Pool rebalanced"
        );
    }

    /// Records a reverted rebalance attempt.
    pub async fn record_failure(&self, pool: Address, data: FailureData) {
        let event = LifecycleEvent::new(
            LifecycleEventType::RebalanceFailed,
            pool,
            EventData::Failure(data.clone()),
        );
        let at = event.timestamp;

        self.add_event(pool, event).await;

        self.summaries
            .write()
            .await
            .entry(pool)
            .or_insert_with(|| PoolSummary::new(pool, at))
            .failure_count += 1;

        warn!(pool = ?pool, reason = %data.reason, "Rebalance failed");
    }

    /// Takes a pool out of rotation.
    pub async fn record_quarantine(&self, pool: Address, data: QuarantineData) {
        let event = LifecycleEvent::new(
            LifecycleEventType::Quarantined,
            pool,
            EventData::Quarantine(data.clone()),
        );
        let at = event.timestamp;

        self.add_event(pool, event).await;

        self.summaries
            .write()
            .await
            .entry(pool)
            .or_insert_with(|| PoolSummary::new(pool, at))
            .quarantined = true;

        warn!(pool = ?pool, reason = %data.reason, "Pool quarantined");
    }

    /// Puts a quarantined pool back into rotation. Returns `false` if it
    /// was not quarantined.
    pub async fn record_release(&self, pool: Address) -> bool {
        {
            let mut summaries = self.summaries.write().await;
            match summaries.get_mut(&pool) {
                Some(summary) if summary.quarantined => summary.quarantined = false,
                _ => return false,
            }
        }

        let event = LifecycleEvent::new(LifecycleEventType::Released, pool, EventData::Release);
        self.add_event(pool, event).await;

        info!(pool = ?pool, "Pool released from quarantine");
        true
    }

    async fn add_event(&self, pool: Address, event: LifecycleEvent) {
        let mut events = self.events.write().await;
        events.entry(pool).or_default().push(event);
    }

    /// Gets all events for a pool.
    pub async fn get_events(&self, pool: &Address) -> Vec<LifecycleEvent> {
        self.events
            .read()
            .await
            .get(pool)
            .cloned()
            .unwrap_or_default()
    }

    /// Gets the summary for a pool.
    pub async fn get_summary(&self, pool: &Address) -> Option<PoolSummary> {
        self.summaries.read().await.get(pool).cloned()
    }

    /// Whether the pool is out of rotation.
    pub async fn is_quarantined(&self, pool: &Address) -> bool {
        self.summaries
            .read()
            .await
            .get(pool)
            .is_some_and(|s| s.quarantined)
    }

    /// Gets all pool summaries.
    pub async fn get_all_summaries(&self) -> Vec<PoolSummary> {
        self.summaries.read().await.values().cloned().collect()
    }

    /// Gets quarantined pools only.
    pub async fn get_quarantined_pools(&self) -> Vec<PoolSummary> {
        self.summaries
            .read()
            .await
            .values()
            .filter(|s| s.quarantined)
            .cloned()
            .collect()
    }

    /// Gets aggregate statistics.
    pub async fn get_aggregate_stats(&self) -> AggregateStats {
        let summaries = self.summaries.read().await;

        let mut stats = AggregateStats::default();

        for summary in summaries.values() {
            stats.total_pools += 1;
            if summary.quarantined {
                stats.quarantined_pools += 1;
            }
            stats.total_rebalances += summary.rebalance_count;
            stats.total_failures += summary.failure_count;
            stats.total_reward = stats.total_reward.saturating_add(summary.total_reward);
        }

        stats
    }
}

impl Default for LifecycleTracker {
    fn default() -> Self {
        Self::new()
    }
}

/// Aggregate statistics across all pools.
#[derive(Debug, Clone, Default)]
pub struct AggregateStats {
    /// Pools tracked.
    pub total_pools: u32,
    /// Pools out of rotation.
    pub quarantined_pools: u32,
    /// Rebalances performed.
    pub total_rebalances: u32,
    /// Failed rebalance attempts.
    pub total_failures: u32,
    /// Main token paid out across pools, raw units.
    pub total_reward: U256,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lifecycle::RebalanceDirection;
    use rust_decimal_macros::dec;

    fn rebalance_data(reward: u64) -> RebalanceData {
        RebalanceData {
            rebalancer: Address::from_low_u64_be(2),
            direction: RebalanceDirection::LackOfMain,
            main_before: U256::from(10u64),
            main_after: U256::from(70u64),
            reward: U256::from(reward),
            reward_display: Some(dec!(0.2)),
            recipient: Address::from_low_u64_be(3),
        }
    }

    #[tokio::test]
    async fn test_lifecycle_tracker() {
        let tracker = LifecycleTracker::new();
        let pool = Address::from_low_u64_be(1);

        tracker.record_rebalance(pool, 5, rebalance_data(2)).await;
        tracker.record_rebalance(pool, 9, rebalance_data(3)).await;

        let events = tracker.get_events(&pool).await;
        assert_eq!(events.len(), 2);
        assert_eq!(events[1].block_number, Some(9));

        let summary = tracker.get_summary(&pool).await.unwrap();
        assert_eq!(summary.rebalance_count, 2);
        assert_eq!(summary.total_reward, U256::from(5u64));
        assert!(summary.last_rebalance_at.is_some());
        assert!(!summary.quarantined);
    }

    #[tokio::test]
    async fn test_quarantine_and_release() {
        let tracker = LifecycleTracker::new();
        let pool = Address::from_low_u64_be(1);

        assert!(!tracker.record_release(pool).await);

        tracker
            .record_quarantine(
                pool,
                QuarantineData {
                    reason: "MALICIOUS_QUERY_REVERT".to_string(),
                },
            )
            .await;
        assert!(tracker.is_quarantined(&pool).await);
        assert_eq!(tracker.get_quarantined_pools().await.len(), 1);

        assert!(tracker.record_release(pool).await);
        assert!(!tracker.is_quarantined(&pool).await);

        let types: Vec<_> = tracker
            .get_events(&pool)
            .await
            .iter()
            .map(|e| e.event_type)
            .collect();
        assert_eq!(
            types,
            vec![LifecycleEventType::Quarantined, LifecycleEventType::Released]
        );
    }

    #[tokio::test]
    async fn test_aggregate_stats() {
        let tracker = LifecycleTracker::new();
        let a = Address::from_low_u64_be(1);
        let b = Address::from_low_u64_be(2);

        tracker.record_rebalance(a, 1, rebalance_data(4)).await;
        tracker
            .record_failure(
                b,
                FailureData {
                    reason: "NON_MALICIOUS_REVERT".to_string(),
                },
            )
            .await;
        tracker
            .record_quarantine(
                b,
                QuarantineData {
                    reason: "MALICIOUS_QUERY_REVERT".to_string(),
                },
            )
            .await;

        let stats = tracker.get_aggregate_stats().await;
        assert_eq!(stats.total_pools, 2);
        assert_eq!(stats.quarantined_pools, 1);
        assert_eq!(stats.total_rebalances, 1);
        assert_eq!(stats.total_failures, 1);
        assert_eq!(stats.total_reward, U256::from(4u64));
    }
}
