//! Task instance record and its scoring state machine.
//!
//! # Responsibility
//! - Model one occurrence of a template assigned to a user on one date.
//! - Own the pure `Assigned -> SelfEvaluated -> Validated` transitions.
//!
//! # Invariants
//! - `Validated` is terminal: `locked_at` is set exactly once and every
//!   later mutation fails with a lock error.
//! - `parent_score` is set exactly at the transition into `Validated`.
//! - Self-evaluation is optional; validation may happen from `Assigned`.

use crate::model::member::UserId;
use crate::model::score::Score;
use crate::model::template::TemplateId;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier for a task instance.
pub type TaskId = Uuid;

/// Lifecycle state of a task instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Created by the generator, untouched by the assignee.
    Assigned,
    /// The assignee submitted a self-score; still open for changes.
    SelfEvaluated,
    /// Supervisor validation locked the task. Terminal.
    Validated,
}

/// Mutation attempted on a validated (locked) task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskLocked {
    pub task_uuid: TaskId,
}

impl Display for TaskLocked {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "task {} is validated and locked", self.task_uuid)
    }
}

impl Error for TaskLocked {}

/// One occurrence of a template assigned to a user on a specific date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub uuid: TaskId,
    pub template_uuid: TemplateId,
    pub user_uuid: UserId,
    /// Calendar day, no time component.
    pub date: NaiveDate,
    pub status: TaskStatus,
    pub self_score: Option<Score>,
    pub parent_score: Option<Score>,
    pub parent_comment: Option<String>,
    /// Set exactly once, at validation.
    pub locked_at: Option<DateTime<Utc>>,
}

impl Task {
    /// Creates a fresh assignment with a generated stable ID.
    pub fn assigned(template_uuid: TemplateId, user_uuid: UserId, date: NaiveDate) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            template_uuid,
            user_uuid,
            date,
            status: TaskStatus::Assigned,
            self_score: None,
            parent_score: None,
            parent_comment: None,
            locked_at: None,
        }
    }

    /// Returns whether supervisor validation already locked this task.
    pub fn is_locked(&self) -> bool {
        self.status == TaskStatus::Validated
    }

    /// Records the assignee's self-evaluation.
    ///
    /// Allowed from `Assigned` and `SelfEvaluated`; re-submission while
    /// unvalidated overwrites the prior self-score.
    ///
    /// # Errors
    /// - [`TaskLocked`] when the task is already validated.
    pub fn submit_self_score(&mut self, score: Score) -> Result<(), TaskLocked> {
        if self.is_locked() {
            return Err(TaskLocked {
                task_uuid: self.uuid,
            });
        }
        self.self_score = Some(score);
        self.status = TaskStatus::SelfEvaluated;
        Ok(())
    }

    /// Applies supervisor validation and locks the task.
    ///
    /// Allowed from `Assigned` (self-evaluation is optional) and
    /// `SelfEvaluated`, never from `Validated`.
    ///
    /// # Errors
    /// - [`TaskLocked`] when the task is already validated.
    pub fn validate(
        &mut self,
        parent_score: Score,
        comment: Option<String>,
        locked_at: DateTime<Utc>,
    ) -> Result<(), TaskLocked> {
        if self.is_locked() {
            return Err(TaskLocked {
                task_uuid: self.uuid,
            });
        }
        self.parent_score = Some(parent_score);
        self.parent_comment = comment;
        self.status = TaskStatus::Validated;
        self.locked_at = Some(locked_at);
        Ok(())
    }
}
