//! Category domain record.
//!
//! # Invariants
//! - `title` is a technical identifier, unique per scope among active rows.
//! - `group_uuid = None` marks a system category visible to every group.
//! - Inactive categories stay addressable by id for already-linked
//!   templates, but are invisible to title resolution.

use crate::model::member::GroupId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier for a category.
pub type CategoryId = Uuid;

/// Task category, either system-owned or group-owned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub uuid: CategoryId,
    /// Owning group; `None` for system categories shared across groups.
    pub group_uuid: Option<GroupId>,
    /// Technical title used by legacy templates and title resolution.
    pub title: String,
    /// Human-facing display label.
    pub display: String,
    pub is_active: bool,
}

impl Category {
    /// Creates an active category with a generated stable ID.
    pub fn new(
        group_uuid: Option<GroupId>,
        title: impl Into<String>,
        display: impl Into<String>,
    ) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            group_uuid,
            title: title.into(),
            display: display.into(),
            is_active: true,
        }
    }

    /// Returns whether this is a system category (not owned by any group).
    pub fn is_system(&self) -> bool {
        self.group_uuid.is_none()
    }
}
