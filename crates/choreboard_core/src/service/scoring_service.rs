//! Scoring use-case service.
//!
//! # Responsibility
//! - Drive the `Assigned -> SelfEvaluated -> Validated` state machine
//!   against persistence.
//! - Validate raw score input before any transition runs.
//!
//! # Invariants
//! - A validated task is never mutated; attempts fail with `TaskLocked`.
//! - Writes are status-guarded: a concurrent transition surfaces as
//!   `StaleStatus` for the caller to reload and retry, never as a silent
//!   overwrite.

use crate::model::score::{Score, ScoreError};
use crate::model::task::{Task, TaskId};
use crate::repo::task_repo::TaskRepository;
use crate::repo::RepoError;
use chrono::Utc;
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Errors from scoring transitions.
#[derive(Debug)]
pub enum ScoringError {
    /// Score outside `0..=100`.
    InvalidScore(ScoreError),
    /// Mutation attempted on a validated task.
    TaskLocked(TaskId),
    /// Target task does not exist.
    TaskNotFound(TaskId),
    /// Lost an optimistic-concurrency race; reload and retry.
    StaleStatus(TaskId),
    /// Persistence-layer failure.
    Repo(RepoError),
    /// Internal consistency mismatch between write and read-back.
    InconsistentState(&'static str),
}

impl Display for ScoringError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidScore(err) => write!(f, "{err}"),
            Self::TaskLocked(id) => write!(f, "task {id} is validated and locked"),
            Self::TaskNotFound(id) => write!(f, "task not found: {id}"),
            Self::StaleStatus(id) => {
                write!(f, "task {id} changed concurrently; reload and retry")
            }
            Self::Repo(err) => write!(f, "{err}"),
            Self::InconsistentState(details) => write!(f, "inconsistent task state: {details}"),
        }
    }
}

impl Error for ScoringError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidScore(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for ScoringError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound(id) => Self::TaskNotFound(id),
            RepoError::StaleStatus(id) => Self::StaleStatus(id),
            other => Self::Repo(other),
        }
    }
}

impl From<ScoreError> for ScoringError {
    fn from(value: ScoreError) -> Self {
        Self::InvalidScore(value)
    }
}

/// Scoring service facade over the task repository.
pub struct ScoringService<R: TaskRepository> {
    repo: R,
}

impl<R: TaskRepository> ScoringService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Records the assignee's self-evaluation.
    ///
    /// Allowed while the task is unvalidated; re-submission overwrites the
    /// prior self-score. Returns the task as persisted.
    ///
    /// # Errors
    /// - `InvalidScore` for scores outside `0..=100`.
    /// - `TaskNotFound` when the task does not exist.
    /// - `TaskLocked` when the task is already validated.
    /// - `StaleStatus` when a concurrent transition won the race.
    pub fn submit_self_score(&self, task_id: TaskId, score: i64) -> Result<Task, ScoringError> {
        let score = Score::new(score)?;
        let mut task = self.load(task_id)?;
        let expected_status = task.status;

        task.submit_self_score(score)
            .map_err(|locked| ScoringError::TaskLocked(locked.task_uuid))?;
        self.repo.update_task_guarded(&task, expected_status)?;

        info!(
            "event=task_self_score module=scoring status=ok task={} score={}",
            task_id, score
        );
        self.reload(task_id)
    }

    /// Applies supervisor validation: sets the parent score and optional
    /// comment, moves the task to `Validated` and locks it.
    ///
    /// Allowed from `Assigned` (self-evaluation is optional) and
    /// `SelfEvaluated`. Returns the task as persisted.
    ///
    /// # Errors
    /// - `InvalidScore` for scores outside `0..=100`.
    /// - `TaskNotFound` when the task does not exist.
    /// - `TaskLocked` when the task is already validated.
    /// - `StaleStatus` when a concurrent transition won the race.
    pub fn validate_task(
        &self,
        task_id: TaskId,
        parent_score: i64,
        comment: Option<String>,
    ) -> Result<Task, ScoringError> {
        let parent_score = Score::new(parent_score)?;
        let mut task = self.load(task_id)?;
        let expected_status = task.status;

        task.validate(parent_score, comment, Utc::now())
            .map_err(|locked| ScoringError::TaskLocked(locked.task_uuid))?;
        self.repo.update_task_guarded(&task, expected_status)?;

        info!(
            "event=task_validate module=scoring status=ok task={} score={}",
            task_id, parent_score
        );
        self.reload(task_id)
    }

    /// Gets one task by stable ID.
    pub fn get_task(&self, task_id: TaskId) -> Result<Option<Task>, ScoringError> {
        self.repo.get_task(task_id).map_err(Into::into)
    }

    fn load(&self, task_id: TaskId) -> Result<Task, ScoringError> {
        self.repo
            .get_task(task_id)?
            .ok_or(ScoringError::TaskNotFound(task_id))
    }

    fn reload(&self, task_id: TaskId) -> Result<Task, ScoringError> {
        self.repo
            .get_task(task_id)?
            .ok_or(ScoringError::InconsistentState(
                "updated task not found in read-back",
            ))
    }
}
