//! Group/user repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Persist the tenant boundary (`groups`) and its members (`users`).
//! - Keep role mapping between domain enum and storage strings here.

use crate::model::member::{Group, GroupId, Role, User, UserId};
use crate::repo::{ensure_connection_ready, parse_uuid, RepoError, RepoResult};
use rusqlite::{params, Connection, Row};

const USER_SELECT_SQL: &str = "SELECT
    uuid,
    group_uuid,
    role,
    display_name
FROM users";

/// Repository interface for group/user administration.
pub trait MemberRepository {
    fn create_group(&self, group: &Group) -> RepoResult<GroupId>;
    fn get_group(&self, id: GroupId) -> RepoResult<Option<Group>>;
    fn create_user(&self, user: &User) -> RepoResult<UserId>;
    fn get_user(&self, id: UserId) -> RepoResult<Option<User>>;
    /// Lists the group's children, the audience of generated tasks.
    fn list_children(&self, group_uuid: GroupId) -> RepoResult<Vec<User>>;
}

/// SQLite-backed member repository.
pub struct SqliteMemberRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteMemberRepository<'conn> {
    /// Constructs a repository from a migrated/ready connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(
            conn,
            &[
                ("groups", &["uuid", "name"]),
                ("users", &["uuid", "group_uuid", "role", "display_name"]),
            ],
        )?;
        Ok(Self { conn })
    }
}

impl MemberRepository for SqliteMemberRepository<'_> {
    fn create_group(&self, group: &Group) -> RepoResult<GroupId> {
        self.conn.execute(
            "INSERT INTO groups (uuid, name) VALUES (?1, ?2);",
            params![group.uuid.to_string(), group.name.as_str()],
        )?;
        Ok(group.uuid)
    }

    fn get_group(&self, id: GroupId) -> RepoResult<Option<Group>> {
        let mut stmt = self
            .conn
            .prepare("SELECT uuid, name FROM groups WHERE uuid = ?1;")?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            let uuid_text: String = row.get("uuid")?;
            return Ok(Some(Group {
                uuid: parse_uuid(&uuid_text, "groups.uuid")?,
                name: row.get("name")?,
            }));
        }
        Ok(None)
    }

    fn create_user(&self, user: &User) -> RepoResult<UserId> {
        self.conn.execute(
            "INSERT INTO users (uuid, group_uuid, role, display_name)
             VALUES (?1, ?2, ?3, ?4);",
            params![
                user.uuid.to_string(),
                user.group_uuid.to_string(),
                role_to_db(user.role),
                user.display_name.as_str(),
            ],
        )?;
        Ok(user.uuid)
    }

    fn get_user(&self, id: UserId) -> RepoResult<Option<User>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{USER_SELECT_SQL} WHERE uuid = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_user_row(row)?));
        }
        Ok(None)
    }

    fn list_children(&self, group_uuid: GroupId) -> RepoResult<Vec<User>> {
        let mut stmt = self.conn.prepare(&format!(
            "{USER_SELECT_SQL}
             WHERE group_uuid = ?1
               AND role = 'child'
             ORDER BY display_name ASC, uuid ASC;"
        ))?;
        let mut rows = stmt.query([group_uuid.to_string()])?;
        let mut users = Vec::new();
        while let Some(row) = rows.next()? {
            users.push(parse_user_row(row)?);
        }
        Ok(users)
    }
}

fn parse_user_row(row: &Row<'_>) -> RepoResult<User> {
    let uuid_text: String = row.get("uuid")?;
    let group_text: String = row.get("group_uuid")?;
    let role_text: String = row.get("role")?;
    let role = parse_role(&role_text).ok_or_else(|| {
        RepoError::InvalidData(format!("invalid role value `{role_text}` in users.role"))
    })?;

    Ok(User {
        uuid: parse_uuid(&uuid_text, "users.uuid")?,
        group_uuid: parse_uuid(&group_text, "users.group_uuid")?,
        role,
        display_name: row.get("display_name")?,
    })
}

fn role_to_db(role: Role) -> &'static str {
    match role {
        Role::Supervisor => "supervisor",
        Role::Child => "child",
    }
}

fn parse_role(value: &str) -> Option<Role> {
    match value {
        "supervisor" => Some(Role::Supervisor),
        "child" => Some(Role::Child),
        _ => None,
    }
}
