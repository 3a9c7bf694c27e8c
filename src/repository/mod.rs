// src/repository/mod.rs
//! Data access for every marketplace resource.
//!
//! Each resource repository follows the same shape: resolve the caller's
//! organization scope (scoped resources only), assemble the filtered list
//! query, execute it as a count plus a page window and return `Page<T>`.

pub mod assignments;
pub mod directory;
#[cfg(test)]
pub(crate) mod fixtures;
pub mod patch;
pub mod proposals;
pub mod query;
pub mod recruiter_candidates;
pub mod recruiters;
pub mod reputations;
pub mod scope;
pub mod soft_delete;

pub use assignments::AssignmentRepository;
pub use directory::DirectoryRepository;
pub use patch::PatchBuilder;
pub use proposals::ProposalRepository;
pub use query::{ListParams, ListQuery, Page, Param, SortColumns, SortOrder};
pub use recruiter_candidates::RecruiterCandidateRepository;
pub use recruiters::RecruiterRepository;
pub use reputations::ReputationRepository;
pub use scope::OrganizationScope;
pub use soft_delete::SoftDelete;

use thiserror::Error;

/// Errors surfaced by the repositories.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Query executor failure, propagated unchanged
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// `sort_by` named a column outside the resource's whitelist
    #[error("Unsupported sort column: {0}")]
    UnsupportedSort(String),
}

pub type RepositoryResult<T> = std::result::Result<T, RepositoryError>;

/// Re-read of a row this request just inserted
pub(crate) fn inserted<T>(row: Option<T>) -> RepositoryResult<T> {
    row.ok_or(RepositoryError::Database(sqlx::Error::RowNotFound))
}

/// Filters carrying the shared page/sort fields expose them as `ListParams`.
pub trait Paginated {
    fn list_params(&self) -> ListParams;
}

macro_rules! impl_paginated {
    ($($filter:ty),+ $(,)?) => {
        $(
            impl $crate::repository::Paginated for $filter {
                fn list_params(&self) -> $crate::repository::ListParams {
                    $crate::repository::ListParams {
                        page: self.page.get(),
                        limit: self.limit.get(),
                        sort_by: self.sort_by.clone(),
                        sort_order: self.sort_order.get(),
                    }
                }
            }
        )+
    };
}

impl_paginated!(
    recruiters::RecruiterFilter,
    assignments::AssignmentFilter,
    recruiter_candidates::RecruiterCandidateFilter,
    reputations::ReputationFilter,
    proposals::ProposalFilter,
);
