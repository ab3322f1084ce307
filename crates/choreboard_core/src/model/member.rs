//! Group and user domain records.
//!
//! # Responsibility
//! - Model the tenant boundary (`Group`) and its members.
//!
//! # Invariants
//! - Every user belongs to exactly one group.
//! - `group_uuid` is the only tenant key; the historical "family" naming is
//!   a data-migration concern outside this crate.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier for a group (tenant boundary).
pub type GroupId = Uuid;

/// Stable identifier for a user.
pub type UserId = Uuid;

/// Tenant boundary owning users, templates and (optionally) categories.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub uuid: GroupId,
    pub name: String,
}

impl Group {
    /// Creates a group with a generated stable ID.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            name: name.into(),
        }
    }
}

/// Member role within a group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Parent or teacher; creates templates, validates and scores tasks.
    Supervisor,
    /// Receives task instances and self-evaluates them.
    Child,
}

/// Group member receiving or supervising tasks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub uuid: UserId,
    pub group_uuid: GroupId,
    pub role: Role,
    pub display_name: String,
}

impl User {
    /// Creates a user with a generated stable ID.
    pub fn new(group_uuid: GroupId, role: Role, display_name: impl Into<String>) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            group_uuid,
            role,
            display_name: display_name.into(),
        }
    }
}
