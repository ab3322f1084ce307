//! Task template domain record.
//!
//! # Responsibility
//! - Define the recurring task definition owned by a group.
//! - Validate template fields before persistence.
//!
//! # Invariants
//! - `points` is strictly positive.
//! - A template links a category by id, by legacy technical title, or both;
//!   never neither. Legacy titles predate the categorization redesign and
//!   are bridged to structured rows by the category resolver.
//! - `created_on` is the earliest date the generator may instantiate.

use crate::model::category::CategoryId;
use crate::model::member::GroupId;
use crate::model::recurrence::Recurrence;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier for a task template.
pub type TemplateId = Uuid;

/// Template validation error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateValidationError {
    /// `points` must be >= 1.
    NonPositivePoints,
    /// `name` is blank after trim.
    BlankName,
    /// Neither `category_uuid` nor `legacy_category_title` is set.
    MissingCategory,
}

impl Display for TemplateValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NonPositivePoints => write!(f, "template points must be at least 1"),
            Self::BlankName => write!(f, "template name must not be blank"),
            Self::MissingCategory => {
                write!(f, "template must reference a category by id or legacy title")
            }
        }
    }
}

impl Error for TemplateValidationError {}

/// Recurring task definition with a schedule rule and point value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskTemplate {
    pub uuid: TemplateId,
    pub group_uuid: GroupId,
    /// Structured category link; `None` only on un-migrated legacy rows.
    pub category_uuid: Option<CategoryId>,
    /// Free-text technical title written before the categorization redesign.
    pub legacy_category_title: Option<String>,
    pub name: String,
    pub points: u32,
    pub icon: Option<String>,
    pub description: Option<String>,
    pub recurrence: Recurrence,
    /// Calendar day the template came into existence.
    pub created_on: NaiveDate,
}

impl TaskTemplate {
    /// Creates a template with a generated stable ID and no optional fields.
    pub fn new(
        group_uuid: GroupId,
        name: impl Into<String>,
        points: u32,
        recurrence: Recurrence,
        created_on: NaiveDate,
    ) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            group_uuid,
            category_uuid: None,
            legacy_category_title: None,
            name: name.into(),
            points,
            icon: None,
            description: None,
            recurrence,
            created_on,
        }
    }

    /// Checks field-level invariants before persistence.
    ///
    /// # Errors
    /// - `NonPositivePoints` when `points == 0`.
    /// - `BlankName` when `name` trims to empty.
    /// - `MissingCategory` when no category link is present.
    pub fn validate(&self) -> Result<(), TemplateValidationError> {
        if self.points == 0 {
            return Err(TemplateValidationError::NonPositivePoints);
        }
        if self.name.trim().is_empty() {
            return Err(TemplateValidationError::BlankName);
        }
        if self.category_uuid.is_none() && self.legacy_category_title.is_none() {
            return Err(TemplateValidationError::MissingCategory);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{TaskTemplate, TemplateValidationError};
    use crate::model::recurrence::Recurrence;
    use chrono::NaiveDate;
    use uuid::Uuid;

    fn template() -> TaskTemplate {
        let mut template = TaskTemplate::new(
            Uuid::new_v4(),
            "water the plants",
            10,
            Recurrence::Daily,
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        );
        template.legacy_category_title = Some("household".to_string());
        template
    }

    #[test]
    fn validate_accepts_complete_template() {
        template().validate().unwrap();
    }

    #[test]
    fn validate_rejects_zero_points() {
        let mut invalid = template();
        invalid.points = 0;
        assert_eq!(
            invalid.validate(),
            Err(TemplateValidationError::NonPositivePoints)
        );
    }

    #[test]
    fn validate_rejects_blank_name() {
        let mut invalid = template();
        invalid.name = "   ".to_string();
        assert_eq!(invalid.validate(), Err(TemplateValidationError::BlankName));
    }

    #[test]
    fn validate_rejects_missing_category_link() {
        let mut invalid = template();
        invalid.category_uuid = None;
        invalid.legacy_category_title = None;
        assert_eq!(
            invalid.validate(),
            Err(TemplateValidationError::MissingCategory)
        );
    }
}
