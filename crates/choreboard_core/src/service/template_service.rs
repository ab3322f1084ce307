//! Task template use-case service.
//!
//! # Responsibility
//! - Create and list task templates with validated fields.
//! - Resolve category references, including legacy free-text titles, at
//!   the write path.
//!
//! # Invariants
//! - Created templates always carry a structured `category_uuid`.
//! - A category referenced by id must be system-owned or owned by the
//!   template's group; cross-group references are rejected.

use crate::model::category::CategoryId;
use crate::model::member::GroupId;
use crate::model::recurrence::Recurrence;
use crate::model::template::{TaskTemplate, TemplateId, TemplateValidationError};
use crate::repo::category_repo::CategoryRepository;
use crate::repo::template_repo::TemplateRepository;
use crate::repo::RepoError;
use crate::service::category_service::{CategoryService, CategoryServiceError};
use chrono::NaiveDate;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Category reference carried by a template-creation request.
///
/// `LegacyTitle` models pre-redesign input that only names a category by
/// technical title; it is resolved to a structured row before persistence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CategoryRef {
    ById(CategoryId),
    LegacyTitle(String),
}

/// Request model for creating a task template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTemplateRequest {
    pub group_uuid: GroupId,
    pub name: String,
    pub category: CategoryRef,
    pub points: u32,
    pub icon: Option<String>,
    pub description: Option<String>,
    pub recurrence: Recurrence,
    pub created_on: NaiveDate,
}

/// Errors from template use-cases.
#[derive(Debug)]
pub enum TemplateServiceError {
    /// Field-level validation failure.
    Validation(TemplateValidationError),
    /// Referenced category does not exist.
    CategoryNotFound(CategoryId),
    /// Referenced category belongs to another group.
    CategoryScopeMismatch {
        category_uuid: CategoryId,
        category_group: Uuid,
        template_group: GroupId,
    },
    /// Legacy title resolution failure.
    Category(CategoryServiceError),
    /// Target template does not exist.
    TemplateNotFound(TemplateId),
    /// Persistence-layer failure.
    Repo(RepoError),
}

impl Display for TemplateServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::CategoryNotFound(id) => write!(f, "category not found: {id}"),
            Self::CategoryScopeMismatch {
                category_uuid,
                category_group,
                template_group,
            } => write!(
                f,
                "category {category_uuid} belongs to group {category_group}, not {template_group}"
            ),
            Self::Category(err) => write!(f, "{err}"),
            Self::TemplateNotFound(id) => write!(f, "template not found: {id}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for TemplateServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Category(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for TemplateServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::Validation(err) => Self::Validation(err),
            RepoError::NotFound(id) => Self::TemplateNotFound(id),
            other => Self::Repo(other),
        }
    }
}

impl From<CategoryServiceError> for TemplateServiceError {
    fn from(value: CategoryServiceError) -> Self {
        Self::Category(value)
    }
}

/// Template service facade over template and category repositories.
pub struct TemplateService<T: TemplateRepository, C: CategoryRepository> {
    repo: T,
    categories: CategoryService<C>,
}

impl<T: TemplateRepository, C: CategoryRepository> TemplateService<T, C> {
    /// Creates a service from a template repository and a category service.
    pub fn new(repo: T, categories: CategoryService<C>) -> Self {
        Self { repo, categories }
    }

    /// Creates a template, resolving its category reference first.
    ///
    /// Legacy titles are bridged to a structured category row; the original
    /// title is kept alongside the resolved id for audit/migration.
    pub fn create_template(
        &self,
        request: NewTemplateRequest,
    ) -> Result<TaskTemplate, TemplateServiceError> {
        let (category_uuid, legacy_title) = match &request.category {
            CategoryRef::ById(id) => {
                let category = self
                    .categories
                    .get_category(*id)?
                    .ok_or(TemplateServiceError::CategoryNotFound(*id))?;
                if let Some(owner) = category.group_uuid {
                    if owner != request.group_uuid {
                        return Err(TemplateServiceError::CategoryScopeMismatch {
                            category_uuid: *id,
                            category_group: owner,
                            template_group: request.group_uuid,
                        });
                    }
                }
                (*id, None)
            }
            CategoryRef::LegacyTitle(title) => {
                let category = self
                    .categories
                    .resolve_legacy_title(request.group_uuid, title)?;
                (category.uuid, Some(category.title))
            }
        };

        let mut template = TaskTemplate::new(
            request.group_uuid,
            request.name,
            request.points,
            request.recurrence,
            request.created_on,
        );
        template.category_uuid = Some(category_uuid);
        template.legacy_category_title = legacy_title;
        template.icon = request.icon;
        template.description = request.description;

        self.repo.create_template(&template)?;
        Ok(template)
    }

    /// Gets one template by stable ID.
    pub fn get_template(
        &self,
        id: TemplateId,
    ) -> Result<Option<TaskTemplate>, TemplateServiceError> {
        self.repo.get_template(id).map_err(Into::into)
    }

    /// Lists the group's templates sorted by name.
    pub fn list_templates(
        &self,
        group_uuid: GroupId,
    ) -> Result<Vec<TaskTemplate>, TemplateServiceError> {
        self.repo
            .list_templates_for_group(group_uuid)
            .map_err(Into::into)
    }
}
