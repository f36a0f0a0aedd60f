//! Integration test against a live Redis instance.
//!
//! Requires `REDIS_URL` to point at a disposable instance; skipped by
//! default since CI here has no Redis fixture wired up.

use serde_json::json;
use std::sync::Arc;
use worthit_connection::{ConnectionManager, ManagerConfig};
use worthit_queue::{Priority, QueueConfig, Task, TaskQueue};

async fn queue() -> TaskQueue {
    let redis_url = std::env::var("REDIS_URL").expect("REDIS_URL must be set for this test");
    let manager = ConnectionManager::connect(&redis_url, false, ManagerConfig::default())
        .expect("valid redis url");
    TaskQueue::new(manager, QueueConfig::default())
}

#[tokio::test]
#[ignore = "requires a live Redis instance"]
async fn high_priority_task_dequeues_before_normal() {
    let queue = queue().await;

    queue
        .enqueue(Task::new(
            "product_analysis",
            json!({"url": "https://example.com/a"}),
            Priority::Normal,
        ))
        .await
        .unwrap();
    let high_id = queue
        .enqueue(Task::new(
            "product_analysis",
            json!({"url": "https://example.com/b"}),
            Priority::High,
        ))
        .await
        .unwrap();

    let first = queue.dequeue().await.unwrap().expect("a task to dequeue");
    assert_eq!(first.id, high_id);
}
