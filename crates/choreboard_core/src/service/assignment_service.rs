//! Task instance generation use-case service.
//!
//! # Responsibility
//! - Decide, per template/user/date, whether a task instance must exist.
//! - Create at most one instance per occurrence key, idempotently.
//!
//! # Invariants
//! - Cross-group template/user pairs are rejected, never silently skipped.
//! - Re-running generation for the same arguments never duplicates work;
//!   a lost creation race collapses into `Skipped(AlreadyGenerated)`.
//! - No instance is generated for dates before the template's creation day.

use crate::model::member::User;
use crate::model::task::Task;
use crate::model::template::TaskTemplate;
use crate::repo::task_repo::TaskRepository;
use crate::repo::RepoError;
use chrono::NaiveDate;
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Why generation produced no new task. Expected, frequent outcomes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The date predates the template's creation day.
    BeforeTemplateStart,
    /// The recurrence rule does not cover this date.
    NotScheduled,
    /// An instance for this occurrence key already exists.
    AlreadyGenerated,
}

/// Outcome of one generation call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationOutcome {
    Created(Task),
    Skipped(SkipReason),
}

/// Errors from task generation.
#[derive(Debug)]
pub enum AssignmentError {
    /// Template and user belong to different groups.
    ScopeMismatch {
        template_group: Uuid,
        user_group: Uuid,
    },
    /// Persistence-layer failure.
    Repo(RepoError),
}

impl Display for AssignmentError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ScopeMismatch {
                template_group,
                user_group,
            } => write!(
                f,
                "template group {template_group} does not match user group {user_group}"
            ),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for AssignmentError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            Self::ScopeMismatch { .. } => None,
        }
    }
}

impl From<RepoError> for AssignmentError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// Summary of one batch generation run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct GenerationReport {
    pub created: Vec<Task>,
    pub skipped: usize,
    pub failed: usize,
}

/// Generation service facade over the task repository.
pub struct AssignmentService<R: TaskRepository> {
    repo: R,
}

impl<R: TaskRepository> AssignmentService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Generates the task instance for one template/user/date, if due.
    ///
    /// Safe to invoke repeatedly (daily batch, backfill): an existing
    /// instance, a non-matching date, or a pre-creation date all yield
    /// [`GenerationOutcome::Skipped`], and exactly one row is ever created
    /// per occurrence key even under concurrent callers.
    ///
    /// # Errors
    /// - `ScopeMismatch` when `user.group_uuid != template.group_uuid`.
    /// - `Repo` for persistence failures.
    pub fn generate(
        &self,
        template: &TaskTemplate,
        user: &User,
        date: NaiveDate,
    ) -> Result<GenerationOutcome, AssignmentError> {
        if user.group_uuid != template.group_uuid {
            return Err(AssignmentError::ScopeMismatch {
                template_group: template.group_uuid,
                user_group: user.group_uuid,
            });
        }

        if date < template.created_on {
            return Ok(GenerationOutcome::Skipped(SkipReason::BeforeTemplateStart));
        }

        if self
            .repo
            .find_occurrence(template.uuid, user.uuid, date)?
            .is_some()
        {
            return Ok(GenerationOutcome::Skipped(SkipReason::AlreadyGenerated));
        }

        if !template.recurrence.matches(date) {
            return Ok(GenerationOutcome::Skipped(SkipReason::NotScheduled));
        }

        let task = Task::assigned(template.uuid, user.uuid, date);
        match self.repo.create_task(&task) {
            Ok(_) => {
                info!(
                    "event=task_generate module=assignment status=created template={} user={} date={}",
                    template.uuid, user.uuid, date
                );
                Ok(GenerationOutcome::Created(task))
            }
            // A concurrent caller won the insert; both intents are satisfied
            // by the single stored row.
            Err(RepoError::DuplicateOccurrence { .. }) => {
                Ok(GenerationOutcome::Skipped(SkipReason::AlreadyGenerated))
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Runs generation for every template against one user for one date.
    ///
    /// Batch semantics: per-item failures are logged and counted, not
    /// propagated, so a backfill can make progress past bad rows.
    pub fn generate_for_user(
        &self,
        templates: &[TaskTemplate],
        user: &User,
        date: NaiveDate,
    ) -> GenerationReport {
        let mut report = GenerationReport::default();
        for template in templates {
            match self.generate(template, user, date) {
                Ok(GenerationOutcome::Created(task)) => report.created.push(task),
                Ok(GenerationOutcome::Skipped(_)) => report.skipped += 1,
                Err(err) => {
                    warn!(
                        "event=task_generate module=assignment status=error template={} user={} date={} error={}",
                        template.uuid, user.uuid, date, err
                    );
                    report.failed += 1;
                }
            }
        }
        report
    }
}
