//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define use-case oriented data access contracts.
//! - Isolate SQLite query details from service/business orchestration.
//!
//! # Invariants
//! - Repository writes enforce model validation before SQL mutations.
//! - Repository APIs return semantic errors (`NotFound`, `StaleStatus`,
//!   `DuplicateOccurrence`) in addition to DB transport errors.
//! - Repositories refuse connections whose schema is not migration-ready.

use crate::db::migrations::latest_version;
use crate::db::DbError;
use crate::model::task::TaskId;
use crate::model::template::TemplateValidationError;
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use rusqlite::Connection;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub mod category_repo;
pub mod member_repo;
pub mod task_repo;
pub mod template_repo;

pub type RepoResult<T> = Result<T, RepoError>;

/// Generic repository error for persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Validation(TemplateValidationError),
    Db(DbError),
    NotFound(Uuid),
    InvalidData(String),
    /// A task instance already exists for this `(template, user, date)` key.
    DuplicateOccurrence {
        template_uuid: Uuid,
        user_uuid: Uuid,
        date: NaiveDate,
    },
    /// Guarded update lost an optimistic-concurrency race on `status`.
    StaleStatus(TaskId),
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "record not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
            Self::DuplicateOccurrence {
                template_uuid,
                user_uuid,
                date,
            } => write!(
                f,
                "task already exists for template {template_uuid}, user {user_uuid}, date {date}"
            ),
            Self::StaleStatus(id) => {
                write!(f, "task {id} changed concurrently; reload and retry")
            }
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "connection schema version {actual_version} does not match expected {expected_version}; run migrations first"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "required table `{table}` is missing")
            }
            Self::MissingRequiredColumn { table, column } => {
                write!(f, "required column `{table}.{column}` is missing")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<TemplateValidationError> for RepoError {
    fn from(value: TemplateValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Verifies that the connection has all migrations applied and the listed
/// tables/columns present. Called by every repository `try_new`.
pub(crate) fn ensure_connection_ready(
    conn: &Connection,
    requirements: &[(&'static str, &[&'static str])],
) -> RepoResult<()> {
    let expected = latest_version();
    let actual: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    if actual != expected {
        return Err(RepoError::UninitializedConnection {
            expected_version: expected,
            actual_version: actual,
        });
    }

    for &(table, columns) in requirements {
        if !table_exists(conn, table)? {
            return Err(RepoError::MissingRequiredTable(table));
        }
        for &column in columns {
            if !table_has_column(conn, table, column)? {
                return Err(RepoError::MissingRequiredColumn { table, column });
            }
        }
    }

    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> RepoResult<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let current: String = row.get(1)?;
        if current == column {
            return Ok(true);
        }
    }
    Ok(false)
}

pub(crate) fn parse_uuid(value: &str, context: &str) -> RepoResult<Uuid> {
    Uuid::parse_str(value)
        .map_err(|_| RepoError::InvalidData(format!("invalid uuid value `{value}` in {context}")))
}

pub(crate) fn parse_date(value: &str, context: &str) -> RepoResult<NaiveDate> {
    value.parse().map_err(|_| {
        RepoError::InvalidData(format!("invalid ISO date value `{value}` in {context}"))
    })
}

pub(crate) fn parse_epoch_ms(value: i64, context: &str) -> RepoResult<DateTime<Utc>> {
    Utc.timestamp_millis_opt(value).single().ok_or_else(|| {
        RepoError::InvalidData(format!("invalid epoch-ms timestamp `{value}` in {context}"))
    })
}

pub(crate) fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}
