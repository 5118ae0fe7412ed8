//! # Portal Task Queue
//!
//! This crate provides the durable background task queue for the Portal
//! platform. Mutations that trigger cascade work (purging a deleted
//! entity's content, purging a removed member's content, sending an
//! invitation notification) enqueue a task and return; a worker drains
//! the queue independently.
//!
//! ## Overview
//!
//! The portal-tasks crate handles:
//! - **Tasks**: Durable (kind + payload) records with attempt bookkeeping
//! - **Queue**: Enqueue / claim / complete / fail over a backend
//! - **Worker**: Drains the queue through registered handlers
//!
//! ## Guarantees
//!
//! - A task id is processed to completion at most once: a redelivered,
//!   already-completed task is acknowledged without re-invoking its
//!   handler.
//! - Handlers are required to be idempotent anyway; the combination makes
//!   every cascade individually retryable.
//! - Failing a task returns it to pending until its attempt budget is
//!   exhausted, then parks it as failed for inspection.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use portal_tasks::{MemoryTaskQueue, Task, TaskKind, TaskQueue, Worker};
//!
//! # async fn demo() -> Result<(), portal_tasks::TaskQueueError> {
//! let queue = Arc::new(MemoryTaskQueue::new());
//! queue
//!     .enqueue(Task::new(
//!         TaskKind::PurgeEntityContent,
//!         serde_json::json!({ "entity_id": uuid::Uuid::now_v7() }),
//!     ))
//!     .await?;
//!
//! let worker = Worker::new(queue.clone());
//! worker.run_once().await?;
//! # Ok(())
//! # }
//! ```

pub mod queue;
pub mod task;

// Re-export main types for convenience
pub use queue::{
    MemoryTaskQueue, TaskHandler, TaskQueue, TaskQueueError, TaskQueueResult, TaskQueueStats,
    Worker,
};
pub use task::{Task, TaskKind, TaskStatus};
