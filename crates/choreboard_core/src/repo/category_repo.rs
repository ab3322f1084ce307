//! Category repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Persist structured category rows introduced by the categorization
//!   redesign.
//! - Provide the scoped title lookups the legacy-title resolver needs.
//!
//! # Invariants
//! - Title lookups only ever see active rows.
//! - By-id reads return inactive rows too, for already-linked templates.

use crate::model::category::{Category, CategoryId};
use crate::model::member::GroupId;
use crate::repo::{bool_to_int, ensure_connection_ready, parse_uuid, RepoError, RepoResult};
use rusqlite::{params, Connection, Row};

const CATEGORY_SELECT_SQL: &str = "SELECT
    uuid,
    group_uuid,
    title,
    display,
    is_active
FROM categories";

/// Repository interface for category persistence and resolution lookups.
pub trait CategoryRepository {
    fn create_category(&self, category: &Category) -> RepoResult<CategoryId>;
    /// Finds the active category with this title in the given scope.
    /// `group_uuid = None` searches system categories only.
    fn find_active_by_title(
        &self,
        group_uuid: Option<GroupId>,
        title: &str,
    ) -> RepoResult<Option<Category>>;
    /// Reads one category by id, active or not.
    fn get_category(&self, id: CategoryId) -> RepoResult<Option<Category>>;
    fn set_category_active(&self, id: CategoryId, is_active: bool) -> RepoResult<()>;
}

/// SQLite-backed category repository.
pub struct SqliteCategoryRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteCategoryRepository<'conn> {
    /// Constructs a repository from a migrated/ready connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(
            conn,
            &[(
                "categories",
                &["uuid", "group_uuid", "title", "display", "is_active"],
            )],
        )?;
        Ok(Self { conn })
    }
}

impl CategoryRepository for SqliteCategoryRepository<'_> {
    fn create_category(&self, category: &Category) -> RepoResult<CategoryId> {
        self.conn.execute(
            "INSERT INTO categories (uuid, group_uuid, title, display, is_active)
             VALUES (?1, ?2, ?3, ?4, ?5);",
            params![
                category.uuid.to_string(),
                category.group_uuid.map(|id| id.to_string()),
                category.title.as_str(),
                category.display.as_str(),
                bool_to_int(category.is_active),
            ],
        )?;
        Ok(category.uuid)
    }

    fn find_active_by_title(
        &self,
        group_uuid: Option<GroupId>,
        title: &str,
    ) -> RepoResult<Option<Category>> {
        let (scope_sql, scope_param) = match group_uuid {
            Some(id) => ("group_uuid = ?2", Some(id.to_string())),
            None => ("group_uuid IS NULL AND ?2 IS NULL", None),
        };
        let mut stmt = self.conn.prepare(&format!(
            "{CATEGORY_SELECT_SQL}
             WHERE title = ?1
               AND is_active = 1
               AND {scope_sql};"
        ))?;
        let mut rows = stmt.query(params![title, scope_param])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_category_row(row)?));
        }
        Ok(None)
    }

    fn get_category(&self, id: CategoryId) -> RepoResult<Option<Category>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{CATEGORY_SELECT_SQL} WHERE uuid = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_category_row(row)?));
        }
        Ok(None)
    }

    fn set_category_active(&self, id: CategoryId, is_active: bool) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE categories SET is_active = ?2 WHERE uuid = ?1;",
            params![id.to_string(), bool_to_int(is_active)],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }
        Ok(())
    }
}

fn parse_category_row(row: &Row<'_>) -> RepoResult<Category> {
    let uuid_text: String = row.get("uuid")?;
    let group_uuid = match row.get::<_, Option<String>>("group_uuid")? {
        Some(value) => Some(parse_uuid(&value, "categories.group_uuid")?),
        None => None,
    };
    let is_active = match row.get::<_, i64>("is_active")? {
        0 => false,
        1 => true,
        other => {
            return Err(RepoError::InvalidData(format!(
                "invalid is_active value `{other}` in categories.is_active"
            )));
        }
    };

    Ok(Category {
        uuid: parse_uuid(&uuid_text, "categories.uuid")?,
        group_uuid,
        title: row.get("title")?,
        display: row.get("display")?,
        is_active,
    })
}
