//! Tests for builder modules

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use weighted_task_pool::builders::{build_pools, PoolBuilder};
use weighted_task_pool::config::{PoolConfig, SchedulerConfig};
use weighted_task_pool::core::InMemoryAuditSink;
use weighted_task_pool::runtime::TokioSpawner;

fn config(capacity: u32) -> PoolConfig {
    PoolConfig {
        capacity,
        cancel_timeout_secs: 30,
    }
}

#[test]
fn test_pool_builder_defaults() {
    let builder = PoolBuilder::new("reports", config(100));
    assert_eq!(builder.name(), "reports");
    assert_eq!(builder.config().capacity, 100);
    assert_eq!(builder.config().cancel_timeout_secs, 30);
}

#[tokio::test]
async fn test_pool_builder_overrides() {
    let pool = PoolBuilder::new("reports", config(1))
        .capacity(6)
        .cancel_timeout(Duration::from_secs(5))
        .audit(Arc::new(InMemoryAuditSink::new(8)))
        .build(TokioSpawner::try_current().unwrap())
        .unwrap();

    assert_eq!(pool.name(), "reports");
    assert_eq!(pool.capacity(), 6);
    assert_eq!(pool.limits().cancel_timeout, Duration::from_secs(5));
    assert_eq!(pool.available_workers(), 6);
}

#[tokio::test]
async fn test_pool_builder_keeps_sub_second_cancel_timeout() {
    let builder = PoolBuilder::new("reports", config(2)).cancel_timeout(Duration::from_millis(500));
    assert_eq!(builder.config().cancel_timeout_secs, 1);

    let pool = builder.build(TokioSpawner::try_current().unwrap()).unwrap();
    assert_eq!(pool.limits().cancel_timeout, Duration::from_millis(500));
}

#[tokio::test]
async fn test_pool_builder_rejects_zero_cancel_timeout() {
    let result = PoolBuilder::new("reports", config(2))
        .cancel_timeout(Duration::ZERO)
        .build(TokioSpawner::try_current().unwrap());
    assert!(result.is_err());
}

#[tokio::test]
async fn test_pool_builder_rejects_zero_capacity() {
    let result = PoolBuilder::new("reports", config(0)).build(TokioSpawner::try_current().unwrap());
    assert!(result.is_err());
}

#[tokio::test]
async fn test_build_pools_from_config() {
    let mut pools = HashMap::new();
    pools.insert("reports".to_string(), config(4));
    pools.insert("exports".to_string(), config(2));

    let spawner = TokioSpawner::try_current().unwrap();
    let built = build_pools(&SchedulerConfig { pools }, &spawner).unwrap();

    assert_eq!(built.len(), 2);
    assert_eq!(built["reports"].capacity(), 4);
    assert_eq!(built["exports"].capacity(), 2);
    assert_eq!(built["exports"].name(), "exports");
}
