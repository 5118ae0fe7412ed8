//! Task envelope types
//!
//! This module defines the durable task record that queue backends store
//! and workers consume. A task is a kind plus a serialized payload; the
//! envelope carries the bookkeeping needed for retries and idempotence.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Kinds of background work the platform schedules.
///
/// Cascade work is never performed inline with the mutation that caused
/// it; the primary mutation commits, then a task of the matching kind is
/// enqueued for a worker to pick up.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum TaskKind {
    /// Purge content owned by a removed member within one entity.
    PurgeMemberContent,

    /// Purge all dependent content of a deleted entity.
    PurgeEntityContent,

    /// Deliver an invitation notification.
    NotifyInvitation,
}

impl TaskKind {
    /// Get the string representation of the kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskKind::PurgeMemberContent => "purge_member_content",
            TaskKind::PurgeEntityContent => "purge_entity_content",
            TaskKind::NotifyInvitation => "notify_invitation",
        }
    }
}

/// Lifecycle status of a task.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Waiting to be claimed by a worker
    Pending,

    /// Finished successfully; re-running is a no-op
    Completed,

    /// Gave up after exhausting attempts
    Failed,
}

/// A durable unit of background work.
///
/// Tasks are identified by a stable id; a worker that processes the same
/// task twice must treat the second run as a no-op. Payloads are plain
/// JSON so queue backends do not need to know every payload shape.
///
/// # Examples
///
/// ```
/// use portal_tasks::{Task, TaskKind};
/// use uuid::Uuid;
///
/// let task = Task::new(
///     TaskKind::PurgeEntityContent,
///     serde_json::json!({ "entity_id": Uuid::now_v7() }),
/// );
/// assert_eq!(task.attempts, 0);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    /// Unique task ID
    pub id: Uuid,

    /// What kind of work this is
    pub kind: TaskKind,

    /// Lifecycle status
    pub status: TaskStatus,

    /// Kind-specific payload
    pub payload: serde_json::Value,

    /// How many times a worker has attempted this task
    pub attempts: u32,

    /// When the task was enqueued
    pub created_at: DateTime<Utc>,

    /// Earliest time a worker may claim the task
    pub scheduled_at: DateTime<Utc>,

    /// When the task reached a terminal status
    pub finished_at: Option<DateTime<Utc>>,

    /// Correlation ID for tracing back to the originating mutation
    pub correlation_id: Option<String>,
}

impl Task {
    /// Create a new pending task scheduled for immediate pickup.
    pub fn new(kind: TaskKind, payload: serde_json::Value) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            kind,
            status: TaskStatus::Pending,
            payload,
            attempts: 0,
            created_at: now,
            scheduled_at: now,
            finished_at: None,
            correlation_id: None,
        }
    }

    /// Delay the earliest pickup time.
    pub fn with_delay(mut self, delay: chrono::Duration) -> Self {
        self.scheduled_at = self.created_at + delay;
        self
    }

    /// Set a correlation ID for tracing.
    pub fn with_correlation_id(mut self, correlation_id: impl Into<String>) -> Self {
        self.correlation_id = Some(correlation_id.into());
        self
    }

    /// Parse the payload into a specific type.
    pub fn parse_payload<T: for<'de> Deserialize<'de>>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_value(self.payload.clone())
    }

    /// Check if the task is ready to be claimed at `now`.
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.status == TaskStatus::Pending && self.scheduled_at <= now
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_creation() {
        let task = Task::new(TaskKind::PurgeMemberContent, serde_json::json!({"x": 1}));
        assert_eq!(task.status, TaskStatus::Pending);
        assert_eq!(task.attempts, 0);
        assert!(task.finished_at.is_none());
        assert!(task.is_due(Utc::now()));
    }

    #[test]
    fn test_task_with_delay() {
        let task = Task::new(TaskKind::NotifyInvitation, serde_json::json!({}))
            .with_delay(chrono::Duration::minutes(5));
        assert!(!task.is_due(Utc::now()));
        assert!(task.is_due(Utc::now() + chrono::Duration::minutes(6)));
    }

    #[test]
    fn test_task_payload_round_trip() {
        #[derive(Serialize, Deserialize, PartialEq, Debug)]
        struct Payload {
            entity_id: Uuid,
        }
        let payload = Payload {
            entity_id: Uuid::now_v7(),
        };
        let task = Task::new(
            TaskKind::PurgeEntityContent,
            serde_json::to_value(&payload).unwrap(),
        );
        let parsed: Payload = task.parse_payload().unwrap();
        assert_eq!(parsed, payload);
    }
}
