//! Task queue and worker
//!
//! This module provides the queue abstraction that mutations enqueue
//! cascade work into, plus the worker loop that drains it. The queue is
//! the durability boundary: a slow or failing cascade can never block or
//! fail the mutation that scheduled it.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use thiserror::Error;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::task::{Task, TaskKind, TaskStatus};

/// Task queue error types.
#[derive(Debug, Error)]
pub enum TaskQueueError {
    /// Failed to enqueue a task
    #[error("Failed to enqueue task: {0}")]
    EnqueueError(String),

    /// Task not found
    #[error("Task not found: {0}")]
    NotFound(Uuid),

    /// Handler failed to process a task
    #[error("Handler error: {0}")]
    HandlerError(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

/// Result type for task queue operations.
pub type TaskQueueResult<T> = Result<T, TaskQueueError>;

/// Handler trait for processing tasks of particular kinds.
///
/// Handlers must be idempotent: the worker may hand the same task to a
/// handler more than once across restarts, and the second run must leave
/// the system unchanged.
#[async_trait]
pub trait TaskHandler: Send + Sync {
    /// Process one task.
    async fn handle(&self, task: &Task) -> TaskQueueResult<()>;

    /// The task kinds this handler accepts.
    fn kinds(&self) -> Vec<TaskKind>;
}

/// Durable queue of background tasks.
#[async_trait]
pub trait TaskQueue: Send + Sync {
    /// Enqueue a task for later processing.
    async fn enqueue(&self, task: Task) -> TaskQueueResult<Uuid>;

    /// Claim up to `limit` due tasks, incrementing their attempt count.
    async fn claim_due(&self, limit: usize) -> TaskQueueResult<Vec<Task>>;

    /// Mark a task completed. Completing an already-completed task is a
    /// no-op, which is what makes task retries safe.
    async fn complete(&self, task_id: Uuid) -> TaskQueueResult<()>;

    /// Record a failed attempt. The task returns to pending until it
    /// exhausts its attempts, then parks as failed.
    async fn fail(&self, task_id: Uuid, reason: &str) -> TaskQueueResult<()>;

    /// Look up a task by id.
    async fn get(&self, task_id: Uuid) -> TaskQueueResult<Option<Task>>;

    /// Get queue statistics.
    async fn stats(&self) -> TaskQueueStats;
}

/// Task queue statistics.
#[derive(Debug, Clone, Default)]
pub struct TaskQueueStats {
    /// Tasks currently pending
    pub pending: usize,
    /// Tasks completed
    pub completed: usize,
    /// Tasks that exhausted their attempts
    pub failed: usize,
    /// Total tasks ever enqueued
    pub enqueued: u64,
}

/// In-memory task queue implementation.
///
/// Suitable for single-process deployments and testing. The tasks table
/// is the source of truth; a completed task id stays in the table so a
/// duplicate completion or redelivery is detectable.
pub struct MemoryTaskQueue {
    tasks: Arc<RwLock<HashMap<Uuid, Task>>>,
    enqueued: Arc<RwLock<u64>>,
    max_attempts: u32,
}

impl std::fmt::Debug for MemoryTaskQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryTaskQueue")
            .field("max_attempts", &self.max_attempts)
            .finish()
    }
}

impl MemoryTaskQueue {
    /// Create a new in-memory queue with the default attempt budget.
    pub fn new() -> Self {
        Self::with_max_attempts(5)
    }

    /// Create with a custom attempt budget.
    pub fn with_max_attempts(max_attempts: u32) -> Self {
        Self {
            tasks: Arc::new(RwLock::new(HashMap::new())),
            enqueued: Arc::new(RwLock::new(0)),
            max_attempts,
        }
    }
}

impl Default for MemoryTaskQueue {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TaskQueue for MemoryTaskQueue {
    async fn enqueue(&self, task: Task) -> TaskQueueResult<Uuid> {
        let id = task.id;
        {
            let mut tasks = self.tasks.write().await;
            tasks.insert(id, task);
        }
        {
            let mut enqueued = self.enqueued.write().await;
            *enqueued += 1;
        }
        tracing::debug!(task_id = %id, "Task enqueued");
        Ok(id)
    }

    async fn claim_due(&self, limit: usize) -> TaskQueueResult<Vec<Task>> {
        let now = Utc::now();
        let mut tasks = self.tasks.write().await;

        let mut due: Vec<Uuid> = tasks
            .values()
            .filter(|t| t.is_due(now))
            .map(|t| t.id)
            .collect();
        due.sort();
        due.truncate(limit);

        let mut claimed = Vec::with_capacity(due.len());
        for id in due {
            if let Some(task) = tasks.get_mut(&id) {
                task.attempts += 1;
                claimed.push(task.clone());
            }
        }
        Ok(claimed)
    }

    async fn complete(&self, task_id: Uuid) -> TaskQueueResult<()> {
        let mut tasks = self.tasks.write().await;
        let task = tasks
            .get_mut(&task_id)
            .ok_or(TaskQueueError::NotFound(task_id))?;

        if task.status == TaskStatus::Completed {
            // Duplicate completion; redelivery already happened.
            return Ok(());
        }

        task.status = TaskStatus::Completed;
        task.finished_at = Some(Utc::now());
        tracing::debug!(task_id = %task_id, kind = task.kind.as_str(), "Task completed");
        Ok(())
    }

    async fn fail(&self, task_id: Uuid, reason: &str) -> TaskQueueResult<()> {
        let mut tasks = self.tasks.write().await;
        let task = tasks
            .get_mut(&task_id)
            .ok_or(TaskQueueError::NotFound(task_id))?;

        if task.attempts >= self.max_attempts {
            task.status = TaskStatus::Failed;
            task.finished_at = Some(Utc::now());
            tracing::warn!(
                task_id = %task_id,
                kind = task.kind.as_str(),
                attempts = task.attempts,
                reason,
                "Task exhausted attempts"
            );
        } else {
            tracing::debug!(task_id = %task_id, reason, "Task attempt failed, will retry");
        }
        Ok(())
    }

    async fn get(&self, task_id: Uuid) -> TaskQueueResult<Option<Task>> {
        let tasks = self.tasks.read().await;
        Ok(tasks.get(&task_id).cloned())
    }

    async fn stats(&self) -> TaskQueueStats {
        let tasks = self.tasks.read().await;
        let mut stats = TaskQueueStats {
            enqueued: *self.enqueued.read().await,
            ..Default::default()
        };
        for task in tasks.values() {
            match task.status {
                TaskStatus::Pending => stats.pending += 1,
                TaskStatus::Completed => stats.completed += 1,
                TaskStatus::Failed => stats.failed += 1,
            }
        }
        stats
    }
}

/// Worker that drains a task queue through registered handlers.
///
/// A task that is already completed when claimed (a redelivery) is
/// acknowledged without invoking its handler; together with idempotent
/// handlers this makes every cascade individually retryable.
pub struct Worker {
    queue: Arc<dyn TaskQueue>,
    handlers: Vec<Arc<dyn TaskHandler>>,
    batch_size: usize,
}

impl Worker {
    /// Create a worker over a queue.
    pub fn new(queue: Arc<dyn TaskQueue>) -> Self {
        Self {
            queue,
            handlers: Vec::new(),
            batch_size: 32,
        }
    }

    /// Register a handler.
    pub fn register(mut self, handler: Arc<dyn TaskHandler>) -> Self {
        self.handlers.push(handler);
        self
    }

    /// Process one batch of due tasks. Returns how many tasks were
    /// dispatched to a handler.
    ///
    /// Callers drive this in a loop (or from a scheduler tick); keeping
    /// the drain step explicit makes the worker deterministic in tests.
    pub async fn run_once(&self) -> TaskQueueResult<usize> {
        let claimed = self.queue.claim_due(self.batch_size).await?;
        let mut dispatched = 0;

        for task in claimed {
            if task.status == TaskStatus::Completed {
                continue;
            }

            let handler = self
                .handlers
                .iter()
                .find(|h| h.kinds().contains(&task.kind));

            let Some(handler) = handler else {
                tracing::warn!(task_id = %task.id, kind = task.kind.as_str(), "No handler for task kind");
                self.queue.fail(task.id, "no handler registered").await?;
                continue;
            };

            match handler.handle(&task).await {
                Ok(()) => {
                    self.queue.complete(task.id).await?;
                    dispatched += 1;
                }
                Err(e) => {
                    self.queue.fail(task.id, &e.to_string()).await?;
                }
            }
        }

        Ok(dispatched)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingHandler {
        kind: TaskKind,
        runs: AtomicUsize,
    }

    #[async_trait]
    impl TaskHandler for CountingHandler {
        async fn handle(&self, _task: &Task) -> TaskQueueResult<()> {
            self.runs.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        fn kinds(&self) -> Vec<TaskKind> {
            vec![self.kind]
        }
    }

    #[tokio::test]
    async fn test_enqueue_and_complete() {
        let queue = MemoryTaskQueue::new();
        let task = Task::new(TaskKind::PurgeMemberContent, serde_json::json!({}));
        let id = queue.enqueue(task).await.unwrap();

        let claimed = queue.claim_due(10).await.unwrap();
        assert_eq!(claimed.len(), 1);
        assert_eq!(claimed[0].attempts, 1);

        queue.complete(id).await.unwrap();
        let stats = queue.stats().await;
        assert_eq!(stats.completed, 1);
        assert_eq!(stats.pending, 0);
    }

    #[tokio::test]
    async fn test_duplicate_completion_is_noop() {
        let queue = MemoryTaskQueue::new();
        let id = queue
            .enqueue(Task::new(TaskKind::PurgeEntityContent, serde_json::json!({})))
            .await
            .unwrap();

        queue.complete(id).await.unwrap();
        queue.complete(id).await.unwrap();

        let stats = queue.stats().await;
        assert_eq!(stats.completed, 1);
    }

    #[tokio::test]
    async fn test_completed_tasks_are_not_due() {
        let queue = MemoryTaskQueue::new();
        let id = queue
            .enqueue(Task::new(TaskKind::NotifyInvitation, serde_json::json!({})))
            .await
            .unwrap();
        queue.complete(id).await.unwrap();

        let claimed = queue.claim_due(10).await.unwrap();
        assert!(claimed.is_empty());
    }

    #[tokio::test]
    async fn test_worker_dispatches_and_completes() {
        let queue = Arc::new(MemoryTaskQueue::new());
        let handler = Arc::new(CountingHandler {
            kind: TaskKind::PurgeMemberContent,
            runs: AtomicUsize::new(0),
        });

        queue
            .enqueue(Task::new(TaskKind::PurgeMemberContent, serde_json::json!({})))
            .await
            .unwrap();

        let worker = Worker::new(queue.clone()).register(handler.clone());
        let dispatched = worker.run_once().await.unwrap();
        assert_eq!(dispatched, 1);
        assert_eq!(handler.runs.load(Ordering::SeqCst), 1);

        // Second drain finds nothing; the task is completed.
        let dispatched = worker.run_once().await.unwrap();
        assert_eq!(dispatched, 0);
        assert_eq!(handler.runs.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_worker_retries_failing_handler() {
        struct FailingHandler;

        #[async_trait]
        impl TaskHandler for FailingHandler {
            async fn handle(&self, _task: &Task) -> TaskQueueResult<()> {
                Err(TaskQueueError::HandlerError("boom".into()))
            }

            fn kinds(&self) -> Vec<TaskKind> {
                vec![TaskKind::PurgeEntityContent]
            }
        }

        let queue = Arc::new(MemoryTaskQueue::with_max_attempts(2));
        let id = queue
            .enqueue(Task::new(TaskKind::PurgeEntityContent, serde_json::json!({})))
            .await
            .unwrap();

        let worker = Worker::new(queue.clone()).register(Arc::new(FailingHandler));
        worker.run_once().await.unwrap();
        worker.run_once().await.unwrap();

        let task = queue.get(id).await.unwrap().unwrap();
        assert_eq!(task.status, TaskStatus::Failed);
        assert_eq!(task.attempts, 2);
    }
}
