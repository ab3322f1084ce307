//! Category use-case service and legacy-title resolver.
//!
//! # Responsibility
//! - Create and deactivate category rows with normalized technical titles.
//! - Bridge legacy free-text category titles to structured rows.
//!
//! # Invariants
//! - Group-owned categories shadow system categories of the same title.
//! - Inactive categories never resolve by title, but stay readable by id.
//! - Title resolution is a compatibility shim for templates written before
//!   the categorization redesign; retire it once every template links a
//!   `category_uuid` directly.

use crate::model::category::{Category, CategoryId};
use crate::model::member::GroupId;
use crate::repo::category_repo::CategoryRepository;
use crate::repo::RepoError;
use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fmt::{Display, Formatter};

static TITLE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z0-9_]+$").expect("valid title regex"));

/// Errors from category use-cases.
#[derive(Debug)]
pub enum CategoryServiceError {
    /// Title is not a valid technical identifier after normalization.
    InvalidTitle(String),
    /// Display label is blank after trim.
    BlankDisplay,
    /// No active category resolves for this scope and title.
    NotFound {
        group_uuid: GroupId,
        title: String,
    },
    /// Persistence-layer failure.
    Repo(RepoError),
}

impl Display for CategoryServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidTitle(value) => write!(f, "invalid category title: `{value}`"),
            Self::BlankDisplay => write!(f, "category display label must not be blank"),
            Self::NotFound { group_uuid, title } => write!(
                f,
                "no active category `{title}` for group {group_uuid} or system scope"
            ),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for CategoryServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for CategoryServiceError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// Category service facade over repository implementations.
pub struct CategoryService<R: CategoryRepository> {
    repo: R,
}

impl<R: CategoryRepository> CategoryService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Creates an active category in the given scope.
    ///
    /// `group_uuid = None` creates a system category visible to all groups.
    pub fn create_category(
        &self,
        group_uuid: Option<GroupId>,
        title: &str,
        display: &str,
    ) -> Result<Category, CategoryServiceError> {
        let title = normalize_title(title)
            .ok_or_else(|| CategoryServiceError::InvalidTitle(title.to_string()))?;
        let display = display.trim();
        if display.is_empty() {
            return Err(CategoryServiceError::BlankDisplay);
        }

        let category = Category::new(group_uuid, title, display);
        self.repo.create_category(&category)?;
        Ok(category)
    }

    /// Resolves a legacy free-text title to the active category it names.
    ///
    /// Lookup order: active group-owned category first, then active system
    /// category. Compatibility shim for templates predating the
    /// categorization redesign.
    ///
    /// # Errors
    /// - `InvalidTitle` when the title normalizes to nothing usable.
    /// - `NotFound` when neither scope has an active match.
    pub fn resolve_legacy_title(
        &self,
        group_uuid: GroupId,
        title: &str,
    ) -> Result<Category, CategoryServiceError> {
        let normalized = normalize_title(title)
            .ok_or_else(|| CategoryServiceError::InvalidTitle(title.to_string()))?;

        if let Some(category) = self
            .repo
            .find_active_by_title(Some(group_uuid), &normalized)?
        {
            return Ok(category);
        }
        if let Some(category) = self.repo.find_active_by_title(None, &normalized)? {
            return Ok(category);
        }

        Err(CategoryServiceError::NotFound {
            group_uuid,
            title: normalized,
        })
    }

    /// Gets one category by id, active or not.
    ///
    /// Inactive categories stay addressable here so templates that already
    /// link them keep resolving their display data.
    pub fn get_category(&self, id: CategoryId) -> Result<Option<Category>, CategoryServiceError> {
        self.repo.get_category(id).map_err(Into::into)
    }

    /// Hides a category from title resolution without unlinking templates.
    pub fn deactivate_category(&self, id: CategoryId) -> Result<(), CategoryServiceError> {
        self.repo
            .set_category_active(id, false)
            .map_err(Into::into)
    }
}

/// Normalizes a technical title: trim, lowercase, shape check.
///
/// Returns `None` when the result is not a valid `[a-z0-9_]+` identifier.
pub fn normalize_title(title: &str) -> Option<String> {
    let normalized = title.trim().to_lowercase();
    if TITLE_RE.is_match(&normalized) {
        Some(normalized)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::normalize_title;

    #[test]
    fn normalize_title_trims_and_lowercases() {
        assert_eq!(normalize_title("  Study "), Some("study".to_string()));
        assert_eq!(normalize_title("house_work2"), Some("house_work2".to_string()));
    }

    #[test]
    fn normalize_title_rejects_invalid_shapes() {
        assert_eq!(normalize_title(""), None);
        assert_eq!(normalize_title("   "), None);
        assert_eq!(normalize_title("has space"), None);
        assert_eq!(normalize_title("émile"), None);
    }
}
