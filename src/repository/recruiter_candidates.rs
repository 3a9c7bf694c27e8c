// src/repository/recruiter_candidates.rs
//! Links between a recruiter and a candidate they represent, optionally tied
//! to a job.

use chrono::{DateTime, Utc};
use rocket::{FromForm, FromFormField};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

use super::patch::PatchBuilder;
use super::query::{ListQuery, Page, Param, SortColumns, SortOrder};
use super::scope::OrganizationScope;
use super::soft_delete::SoftDelete;
use super::{inserted, Paginated, RepositoryResult};
use crate::utils::new_id;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, FromFormField)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum LinkStatus {
    Active,
    Hired,
    Inactive,
}

impl LinkStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Hired => "hired",
            Self::Inactive => "inactive",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct RecruiterCandidate {
    pub id: String,
    pub recruiter_id: String,
    pub candidate_id: String,
    pub job_id: Option<String>,
    pub notes: Option<String>,
    pub status: LinkStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub recruiter_name: String,
    pub candidate_name: String,
    pub candidate_email: Option<String>,
    pub job_title: Option<String>,
    pub organization_id: Option<String>,
}

#[derive(Debug, Clone, Default, FromForm)]
pub struct RecruiterCandidateFilter {
    pub search: Option<String>,
    pub status: Param<LinkStatus>,
    pub recruiter_id: Option<String>,
    pub candidate_id: Option<String>,
    pub job_id: Option<String>,
    pub page: Param<u32>,
    pub limit: Param<u32>,
    pub sort_by: Option<String>,
    pub sort_order: Param<SortOrder>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewRecruiterCandidate {
    pub recruiter_id: String,
    pub candidate_id: String,
    pub job_id: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateRecruiterCandidate {
    pub job_id: Option<String>,
    pub notes: Option<String>,
    pub status: Option<LinkStatus>,
}

const SELECT: &str = "rc.id AS id, rc.recruiter_id AS recruiter_id, \
    rc.candidate_id AS candidate_id, rc.job_id AS job_id, rc.notes AS notes, \
    rc.status AS status, rc.created_at AS created_at, rc.updated_at AS updated_at, \
    r.full_name AS recruiter_name, c.full_name AS candidate_name, \
    c.email AS candidate_email, j.title AS job_title, j.organization_id AS organization_id";
const FROM: &str = "recruiter_candidates rc \
    JOIN recruiters r ON r.id = rc.recruiter_id \
    JOIN candidates c ON c.id = rc.candidate_id \
    LEFT JOIN jobs j ON j.id = rc.job_id";

const SORT: SortColumns = SortColumns {
    default: "created_at",
    default_order: SortOrder::Desc,
    columns: &[
        ("created_at", "rc.created_at"),
        ("updated_at", "rc.updated_at"),
    ],
};

const SOFT_DELETE: SoftDelete = SoftDelete {
    table: "recruiter_candidates",
    status_column: "status",
    inactive_value: "inactive",
};

pub struct RecruiterCandidateRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> RecruiterCandidateRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Scoped through the linked job. Links without a job carry no
    /// organization and only show up for unscoped callers.
    pub async fn list(
        &self,
        caller_id: &str,
        filter: &RecruiterCandidateFilter,
    ) -> RepositoryResult<Page<RecruiterCandidate>> {
        let scope = OrganizationScope::resolve(self.pool, caller_id).await?;

        ListQuery::new(SELECT, FROM)
            .scoped("j.organization_id", &scope)
            .search(&["c.full_name", "c.email"], filter.search.as_deref())
            .equals("rc.status", filter.status.get().map(LinkStatus::as_str))
            .equals("rc.recruiter_id", filter.recruiter_id.as_deref())
            .equals("rc.candidate_id", filter.candidate_id.as_deref())
            .equals("rc.job_id", filter.job_id.as_deref())
            .fetch_page(self.pool, &SORT, &filter.list_params())
            .await
    }

    pub async fn find_by_id(&self, id: &str) -> RepositoryResult<Option<RecruiterCandidate>> {
        ListQuery::new(SELECT, FROM)
            .equals("rc.id", Some(id))
            .fetch_optional(self.pool)
            .await
    }

    pub async fn create(&self, new: &NewRecruiterCandidate) -> RepositoryResult<RecruiterCandidate> {
        let id = new_id();
        let now = Utc::now();

        sqlx::query(
            r#"
            INSERT INTO recruiter_candidates
                (id, recruiter_id, candidate_id, job_id, notes, status, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(&new.recruiter_id)
        .bind(&new.candidate_id)
        .bind(&new.job_id)
        .bind(&new.notes)
        .bind(LinkStatus::Active.as_str())
        .bind(now)
        .bind(now)
        .execute(self.pool)
        .await?;

        app_log!(
            info,
            "Linked candidate {} to recruiter {} ({})",
            new.candidate_id,
            new.recruiter_id,
            id
        );
        inserted(self.find_by_id(&id).await?)
    }

    pub async fn update(
        &self,
        id: &str,
        update: &UpdateRecruiterCandidate,
    ) -> RepositoryResult<Option<RecruiterCandidate>> {
        let mut patch = PatchBuilder::new("recruiter_candidates");
        patch
            .set("job_id", update.job_id.clone())
            .set("notes", update.notes.clone())
            .set("status", update.status.map(LinkStatus::as_str));

        if !patch.execute(self.pool, id).await? {
            return Ok(None);
        }
        self.find_by_id(id).await
    }

    pub async fn soft_delete(&self, id: &str) -> RepositoryResult<()> {
        SOFT_DELETE.apply(self.pool, id).await
    }
}
