//! Task instance repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Persist task instances keyed by `(template, user, date)`.
//! - Surface the storage-level guarantees the engine's contract rests on:
//!   the occurrence uniqueness constraint and status-guarded updates.
//!
//! # Invariants
//! - `create_task` maps a lost uniqueness race to `DuplicateOccurrence`.
//! - `update_task_guarded` only writes when the stored `status` still
//!   matches the caller's expectation; a stale status is `StaleStatus`.
//! - Read paths reject inconsistent persisted state instead of masking it.

use crate::model::member::UserId;
use crate::model::score::Score;
use crate::model::task::{Task, TaskId, TaskStatus};
use crate::model::template::TemplateId;
use crate::repo::{
    ensure_connection_ready, parse_date, parse_epoch_ms, parse_uuid, RepoError, RepoResult,
};
use chrono::NaiveDate;
use rusqlite::{params, Connection, Row};

const TASK_SELECT_SQL: &str = "SELECT
    uuid,
    template_uuid,
    user_uuid,
    date,
    status,
    self_score,
    parent_score,
    parent_comment,
    locked_at
FROM tasks";

/// Repository interface for task instance persistence.
pub trait TaskRepository {
    fn create_task(&self, task: &Task) -> RepoResult<TaskId>;
    fn get_task(&self, id: TaskId) -> RepoResult<Option<Task>>;
    /// Looks up the instance for one `(template, user, date)` occurrence key.
    fn find_occurrence(
        &self,
        template_uuid: TemplateId,
        user_uuid: UserId,
        date: NaiveDate,
    ) -> RepoResult<Option<Task>>;
    /// Writes scoring fields only if the stored status still equals
    /// `expected_status` (optimistic concurrency).
    fn update_task_guarded(&self, task: &Task, expected_status: TaskStatus) -> RepoResult<()>;
    fn list_for_user_on(&self, user_uuid: UserId, date: NaiveDate) -> RepoResult<Vec<Task>>;
}

/// SQLite-backed task repository.
pub struct SqliteTaskRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteTaskRepository<'conn> {
    /// Constructs a repository from a migrated/ready connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(
            conn,
            &[(
                "tasks",
                &[
                    "uuid",
                    "template_uuid",
                    "user_uuid",
                    "date",
                    "status",
                    "self_score",
                    "parent_score",
                    "parent_comment",
                    "locked_at",
                ],
            )],
        )?;
        Ok(Self { conn })
    }
}

impl TaskRepository for SqliteTaskRepository<'_> {
    fn create_task(&self, task: &Task) -> RepoResult<TaskId> {
        let result = self.conn.execute(
            "INSERT INTO tasks (
                uuid,
                template_uuid,
                user_uuid,
                date,
                status,
                self_score,
                parent_score,
                parent_comment,
                locked_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9);",
            params![
                task.uuid.to_string(),
                task.template_uuid.to_string(),
                task.user_uuid.to_string(),
                task.date.to_string(),
                status_to_db(task.status),
                task.self_score.map(|score| i64::from(score.value())),
                task.parent_score.map(|score| i64::from(score.value())),
                task.parent_comment.as_deref(),
                task.locked_at.map(|at| at.timestamp_millis()),
            ],
        );

        match result {
            Ok(_) => Ok(task.uuid),
            Err(err) if is_unique_violation(&err) => Err(RepoError::DuplicateOccurrence {
                template_uuid: task.template_uuid,
                user_uuid: task.user_uuid,
                date: task.date,
            }),
            Err(err) => Err(err.into()),
        }
    }

    fn get_task(&self, id: TaskId) -> RepoResult<Option<Task>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{TASK_SELECT_SQL} WHERE uuid = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_task_row(row)?));
        }
        Ok(None)
    }

    fn find_occurrence(
        &self,
        template_uuid: TemplateId,
        user_uuid: UserId,
        date: NaiveDate,
    ) -> RepoResult<Option<Task>> {
        let mut stmt = self.conn.prepare(&format!(
            "{TASK_SELECT_SQL}
             WHERE template_uuid = ?1
               AND user_uuid = ?2
               AND date = ?3;"
        ))?;
        let mut rows = stmt.query(params![
            template_uuid.to_string(),
            user_uuid.to_string(),
            date.to_string(),
        ])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_task_row(row)?));
        }
        Ok(None)
    }

    fn update_task_guarded(&self, task: &Task, expected_status: TaskStatus) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE tasks
             SET
                status = ?3,
                self_score = ?4,
                parent_score = ?5,
                parent_comment = ?6,
                locked_at = ?7,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE uuid = ?1
               AND status = ?2;",
            params![
                task.uuid.to_string(),
                status_to_db(expected_status),
                status_to_db(task.status),
                task.self_score.map(|score| i64::from(score.value())),
                task.parent_score.map(|score| i64::from(score.value())),
                task.parent_comment.as_deref(),
                task.locked_at.map(|at| at.timestamp_millis()),
            ],
        )?;

        if changed == 0 {
            let exists: i64 = self.conn.query_row(
                "SELECT EXISTS(SELECT 1 FROM tasks WHERE uuid = ?1);",
                [task.uuid.to_string()],
                |row| row.get(0),
            )?;
            if exists == 0 {
                return Err(RepoError::NotFound(task.uuid));
            }
            return Err(RepoError::StaleStatus(task.uuid));
        }

        Ok(())
    }

    fn list_for_user_on(&self, user_uuid: UserId, date: NaiveDate) -> RepoResult<Vec<Task>> {
        let mut stmt = self.conn.prepare(&format!(
            "{TASK_SELECT_SQL}
             WHERE user_uuid = ?1
               AND date = ?2
             ORDER BY uuid ASC;"
        ))?;
        let mut rows = stmt.query(params![user_uuid.to_string(), date.to_string()])?;
        let mut tasks = Vec::new();
        while let Some(row) = rows.next()? {
            tasks.push(parse_task_row(row)?);
        }
        Ok(tasks)
    }
}

fn parse_task_row(row: &Row<'_>) -> RepoResult<Task> {
    let uuid_text: String = row.get("uuid")?;
    let template_text: String = row.get("template_uuid")?;
    let user_text: String = row.get("user_uuid")?;
    let date_text: String = row.get("date")?;
    let status_text: String = row.get("status")?;
    let status = parse_status(&status_text).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid status value `{status_text}` in tasks.status"
        ))
    })?;

    let self_score = parse_score_column(row.get("self_score")?, "tasks.self_score")?;
    let parent_score = parse_score_column(row.get("parent_score")?, "tasks.parent_score")?;
    let locked_at = match row.get::<_, Option<i64>>("locked_at")? {
        Some(value) => Some(parse_epoch_ms(value, "tasks.locked_at")?),
        None => None,
    };

    let task = Task {
        uuid: parse_uuid(&uuid_text, "tasks.uuid")?,
        template_uuid: parse_uuid(&template_text, "tasks.template_uuid")?,
        user_uuid: parse_uuid(&user_text, "tasks.user_uuid")?,
        date: parse_date(&date_text, "tasks.date")?,
        status,
        self_score,
        parent_score,
        parent_comment: row.get("parent_comment")?,
        locked_at,
    };

    // Cross-field consistency of the stored state machine.
    match task.status {
        TaskStatus::SelfEvaluated if task.self_score.is_none() => {
            return Err(RepoError::InvalidData(format!(
                "self_evaluated task {} without self_score",
                task.uuid
            )));
        }
        TaskStatus::Validated if task.parent_score.is_none() || task.locked_at.is_none() => {
            return Err(RepoError::InvalidData(format!(
                "validated task {} without parent_score/locked_at",
                task.uuid
            )));
        }
        _ => {}
    }

    Ok(task)
}

fn parse_score_column(value: Option<i64>, context: &str) -> RepoResult<Option<Score>> {
    match value {
        Some(raw) => Score::new(raw).map(Some).map_err(|_| {
            RepoError::InvalidData(format!("invalid score value `{raw}` in {context}"))
        }),
        None => Ok(None),
    }
}

fn status_to_db(status: TaskStatus) -> &'static str {
    match status {
        TaskStatus::Assigned => "assigned",
        TaskStatus::SelfEvaluated => "self_evaluated",
        TaskStatus::Validated => "validated",
    }
}

fn parse_status(value: &str) -> Option<TaskStatus> {
    match value {
        "assigned" => Some(TaskStatus::Assigned),
        "self_evaluated" => Some(TaskStatus::SelfEvaluated),
        "validated" => Some(TaskStatus::Validated),
        _ => None,
    }
}

fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(inner, _)
            if inner.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
    )
}
