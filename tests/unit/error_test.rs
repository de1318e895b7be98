//! Tests for error types

use std::time::Duration;

use weighted_task_pool::core::{PoolError, TaskError};

#[test]
fn test_invalid_config_error() {
    let err = PoolError::InvalidConfig("capacity must be greater than 0".to_string());
    assert_eq!(
        format!("{err}"),
        "invalid configuration: capacity must be greater than 0"
    );
}

#[test]
fn test_insufficient_capacity_error() {
    let err = PoolError::InsufficientCapacity {
        requested: 3,
        available: 1,
    };
    assert_eq!(format!("{err}"), "insufficient capacity: requested 3, available 1");
}

#[test]
fn test_cost_exceeds_capacity_error() {
    let err = PoolError::CostExceedsCapacity {
        cost: 5,
        capacity: 4,
    };
    assert_eq!(format!("{err}"), "task cost 5 exceeds pool capacity 4");
}

#[test]
fn test_zero_cost_error() {
    assert_eq!(PoolError::ZeroCost.to_string(), "task cost must be at least 1");
}

#[test]
fn test_task_errors() {
    assert_eq!(
        TaskError::Failed("disk full".into()).to_string(),
        "task failed: disk full"
    );
    assert_eq!(
        TaskError::Cancel("gone".into()).to_string(),
        "cancel failed: gone"
    );
    assert_eq!(
        TaskError::Timeout(Duration::from_millis(250)).to_string(),
        "timed out after 250ms"
    );
}
