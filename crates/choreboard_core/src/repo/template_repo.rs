//! Task template repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Persist task templates, including their recurrence rule.
//! - Keep the recurrence column mapping inside the persistence boundary.
//!
//! # Invariants
//! - Write paths call `TaskTemplate::validate()` before SQL mutations.
//! - Recurrence rows are parsed back through the validating constructors;
//!   invalid persisted rules surface as `InvalidData`, never as silently
//!   non-matching schedules.

use crate::model::member::GroupId;
use crate::model::recurrence::Recurrence;
use crate::model::template::{TaskTemplate, TemplateId};
use crate::repo::{ensure_connection_ready, parse_date, parse_uuid, RepoError, RepoResult};
use chrono::NaiveDate;
use rusqlite::{params, Connection, Row};

const TEMPLATE_SELECT_SQL: &str = "SELECT
    uuid,
    group_uuid,
    category_uuid,
    legacy_category_title,
    name,
    points,
    icon,
    description,
    recurrence_kind,
    recurrence_days,
    recurrence_start,
    recurrence_interval,
    created_on
FROM task_templates";

/// Repository interface for task template persistence.
pub trait TemplateRepository {
    fn create_template(&self, template: &TaskTemplate) -> RepoResult<TemplateId>;
    fn get_template(&self, id: TemplateId) -> RepoResult<Option<TaskTemplate>>;
    fn list_templates_for_group(&self, group_uuid: GroupId) -> RepoResult<Vec<TaskTemplate>>;
}

/// SQLite-backed template repository.
pub struct SqliteTemplateRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteTemplateRepository<'conn> {
    /// Constructs a repository from a migrated/ready connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(
            conn,
            &[(
                "task_templates",
                &[
                    "uuid",
                    "group_uuid",
                    "category_uuid",
                    "legacy_category_title",
                    "name",
                    "points",
                    "recurrence_kind",
                    "recurrence_days",
                    "recurrence_start",
                    "recurrence_interval",
                    "created_on",
                ],
            )],
        )?;
        Ok(Self { conn })
    }
}

impl TemplateRepository for SqliteTemplateRepository<'_> {
    fn create_template(&self, template: &TaskTemplate) -> RepoResult<TemplateId> {
        template.validate()?;

        let (kind, days, start, interval) = recurrence_to_columns(&template.recurrence);
        self.conn.execute(
            "INSERT INTO task_templates (
                uuid,
                group_uuid,
                category_uuid,
                legacy_category_title,
                name,
                points,
                icon,
                description,
                recurrence_kind,
                recurrence_days,
                recurrence_start,
                recurrence_interval,
                created_on
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13);",
            params![
                template.uuid.to_string(),
                template.group_uuid.to_string(),
                template.category_uuid.map(|id| id.to_string()),
                template.legacy_category_title.as_deref(),
                template.name.as_str(),
                template.points,
                template.icon.as_deref(),
                template.description.as_deref(),
                kind,
                days,
                start.map(|date| date.to_string()),
                interval,
                template.created_on.to_string(),
            ],
        )?;
        Ok(template.uuid)
    }

    fn get_template(&self, id: TemplateId) -> RepoResult<Option<TaskTemplate>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{TEMPLATE_SELECT_SQL} WHERE uuid = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_template_row(row)?));
        }
        Ok(None)
    }

    fn list_templates_for_group(&self, group_uuid: GroupId) -> RepoResult<Vec<TaskTemplate>> {
        let mut stmt = self.conn.prepare(&format!(
            "{TEMPLATE_SELECT_SQL}
             WHERE group_uuid = ?1
             ORDER BY name ASC, uuid ASC;"
        ))?;
        let mut rows = stmt.query([group_uuid.to_string()])?;
        let mut templates = Vec::new();
        while let Some(row) = rows.next()? {
            templates.push(parse_template_row(row)?);
        }
        Ok(templates)
    }
}

fn parse_template_row(row: &Row<'_>) -> RepoResult<TaskTemplate> {
    let uuid_text: String = row.get("uuid")?;
    let group_text: String = row.get("group_uuid")?;
    let category_uuid = match row.get::<_, Option<String>>("category_uuid")? {
        Some(value) => Some(parse_uuid(&value, "task_templates.category_uuid")?),
        None => None,
    };
    let created_on_text: String = row.get("created_on")?;

    let points: i64 = row.get("points")?;
    let points = u32::try_from(points).map_err(|_| {
        RepoError::InvalidData(format!(
            "invalid points value `{points}` in task_templates.points"
        ))
    })?;

    let recurrence = parse_recurrence_columns(row)?;

    let template = TaskTemplate {
        uuid: parse_uuid(&uuid_text, "task_templates.uuid")?,
        group_uuid: parse_uuid(&group_text, "task_templates.group_uuid")?,
        category_uuid,
        legacy_category_title: row.get("legacy_category_title")?,
        name: row.get("name")?,
        points,
        icon: row.get("icon")?,
        description: row.get("description")?,
        recurrence,
        created_on: parse_date(&created_on_text, "task_templates.created_on")?,
    };
    template.validate()?;
    Ok(template)
}

fn recurrence_to_columns(
    recurrence: &Recurrence,
) -> (
    &'static str,
    Option<String>,
    Option<NaiveDate>,
    Option<u32>,
) {
    match recurrence {
        Recurrence::Daily => ("daily", None, None, None),
        Recurrence::Weekday => ("weekday", None, None, None),
        Recurrence::Weekend => ("weekend", None, None, None),
        Recurrence::Monday => ("monday", None, None, None),
        Recurrence::Tuesday => ("tuesday", None, None, None),
        Recurrence::Wednesday => ("wednesday", None, None, None),
        Recurrence::Thursday => ("thursday", None, None, None),
        Recurrence::Friday => ("friday", None, None, None),
        Recurrence::Saturday => ("saturday", None, None, None),
        Recurrence::Sunday => ("sunday", None, None, None),
        Recurrence::WeeklyDays(days) => {
            let csv = days
                .indices()
                .iter()
                .map(u8::to_string)
                .collect::<Vec<_>>()
                .join(",");
            ("weekly_days", Some(csv), None, None)
        }
        Recurrence::EveryNDays(cadence) => (
            "every_n_days",
            None,
            Some(cadence.start()),
            Some(cadence.interval_days()),
        ),
    }
}

fn parse_recurrence_columns(row: &Row<'_>) -> RepoResult<Recurrence> {
    let kind: String = row.get("recurrence_kind")?;
    match kind.as_str() {
        "daily" => Ok(Recurrence::Daily),
        "weekday" => Ok(Recurrence::Weekday),
        "weekend" => Ok(Recurrence::Weekend),
        "monday" => Ok(Recurrence::Monday),
        "tuesday" => Ok(Recurrence::Tuesday),
        "wednesday" => Ok(Recurrence::Wednesday),
        "thursday" => Ok(Recurrence::Thursday),
        "friday" => Ok(Recurrence::Friday),
        "saturday" => Ok(Recurrence::Saturday),
        "sunday" => Ok(Recurrence::Sunday),
        "weekly_days" => {
            let csv: Option<String> = row.get("recurrence_days")?;
            let csv = csv.ok_or_else(|| {
                RepoError::InvalidData(
                    "weekly_days rule without recurrence_days in task_templates".to_string(),
                )
            })?;
            let days = parse_day_csv(&csv)?;
            Recurrence::weekly_days(&days).map_err(|err| {
                RepoError::InvalidData(format!(
                    "invalid weekly_days value `{csv}` in task_templates.recurrence_days: {err}"
                ))
            })
        }
        "every_n_days" => {
            let start: Option<String> = row.get("recurrence_start")?;
            let interval: Option<i64> = row.get("recurrence_interval")?;
            let (start, interval) = match (start, interval) {
                (Some(start), Some(interval)) => (start, interval),
                _ => {
                    return Err(RepoError::InvalidData(
                        "every_n_days rule without start/interval in task_templates".to_string(),
                    ));
                }
            };
            let start = parse_date(&start, "task_templates.recurrence_start")?;
            let interval = u32::try_from(interval).map_err(|_| {
                RepoError::InvalidData(format!(
                    "invalid interval value `{interval}` in task_templates.recurrence_interval"
                ))
            })?;
            Recurrence::every_n_days(start, interval).map_err(|err| {
                RepoError::InvalidData(format!(
                    "invalid every_n_days rule in task_templates: {err}"
                ))
            })
        }
        other => Err(RepoError::InvalidData(format!(
            "invalid recurrence kind `{other}` in task_templates.recurrence_kind"
        ))),
    }
}

fn parse_day_csv(csv: &str) -> RepoResult<Vec<u8>> {
    csv.split(',')
        .map(|part| {
            part.trim().parse::<u8>().map_err(|_| {
                RepoError::InvalidData(format!(
                    "invalid weekday index `{part}` in task_templates.recurrence_days"
                ))
            })
        })
        .collect()
}
