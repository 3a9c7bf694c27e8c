// src/repository/assignments.rs
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
pub enum AssignmentStatus {
    Active,
    Completed,
    Cancelled,
}

impl AssignmentStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }
}

/// Assignment row enriched with recruiter, job and organization fields
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Assignment {
    pub id: String,
    pub recruiter_id: String,
    pub job_id: String,
    pub assigned_by: Option<String>,
    pub notes: Option<String>,
    pub status: AssignmentStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub recruiter_name: String,
    pub recruiter_email: String,
    pub job_title: String,
    pub organization_id: String,
    pub organization_name: String,
}

#[derive(Debug, Clone, Default, FromForm)]
pub struct AssignmentFilter {
    pub search: Option<String>,
    pub status: Param<AssignmentStatus>,
    pub recruiter_id: Option<String>,
    pub job_id: Option<String>,
    pub page: Param<u32>,
    pub limit: Param<u32>,
    pub sort_by: Option<String>,
    pub sort_order: Param<SortOrder>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewAssignment {
    pub recruiter_id: String,
    pub job_id: String,
    pub assigned_by: Option<String>,
    pub notes: Option<String>,
    pub status: Option<AssignmentStatus>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateAssignment {
    pub notes: Option<String>,
    pub status: Option<AssignmentStatus>,
}

const SELECT: &str = "a.id AS id, a.recruiter_id AS recruiter_id, a.job_id AS job_id, \
    a.assigned_by AS assigned_by, a.notes AS notes, a.status AS status, \
    a.created_at AS created_at, a.updated_at AS updated_at, \
    r.full_name AS recruiter_name, r.email AS recruiter_email, \
    j.title AS job_title, j.organization_id AS organization_id, o.name AS organization_name";
const FROM: &str = "assignments a \
    JOIN recruiters r ON r.id = a.recruiter_id \
    JOIN jobs j ON j.id = a.job_id \
    JOIN organizations o ON o.id = j.organization_id";

const SORT: SortColumns = SortColumns {
    default: "created_at",
    default_order: SortOrder::Desc,
    columns: &[
        ("created_at", "a.created_at"),
        ("updated_at", "a.updated_at"),
        ("status", "a.status"),
    ],
};

const SOFT_DELETE: SoftDelete = SoftDelete {
    table: "assignments",
    status_column: "status",
    inactive_value: "cancelled",
};

pub struct AssignmentRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> AssignmentRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Assignments visible to the caller through the job's organization
    pub async fn list(
        &self,
        caller_id: &str,
        filter: &AssignmentFilter,
    ) -> RepositoryResult<Page<Assignment>> {
        let scope = OrganizationScope::resolve(self.pool, caller_id).await?;

        ListQuery::new(SELECT, FROM)
            .scoped("j.organization_id", &scope)
            .search(&["a.notes", "j.title"], filter.search.as_deref())
            .equals("a.status", filter.status.get().map(AssignmentStatus::as_str))
            .equals("a.recruiter_id", filter.recruiter_id.as_deref())
            .equals("a.job_id", filter.job_id.as_deref())
            .fetch_page(self.pool, &SORT, &filter.list_params())
            .await
    }

    pub async fn find_by_id(&self, id: &str) -> RepositoryResult<Option<Assignment>> {
        ListQuery::new(SELECT, FROM)
            .equals("a.id", Some(id))
            .fetch_optional(self.pool)
            .await
    }

    pub async fn create(&self, new: &NewAssignment) -> RepositoryResult<Assignment> {
        let id = new_id();
        let now = Utc::now();
        let status = new.status.unwrap_or(AssignmentStatus::Active);

        sqlx::query(
            r#"
            INSERT INTO assignments
                (id, recruiter_id, job_id, assigned_by, notes, status, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(&new.recruiter_id)
        .bind(&new.job_id)
        .bind(&new.assigned_by)
        .bind(&new.notes)
        .bind(status.as_str())
        .bind(now)
        .bind(now)
        .execute(self.pool)
        .await?;

        app_log!(
            info,
            "Assigned recruiter {} to job {} ({})",
            new.recruiter_id,
            new.job_id,
            id
        );
        inserted(self.find_by_id(&id).await?)
    }

    pub async fn update(
        &self,
        id: &str,
        update: &UpdateAssignment,
    ) -> RepositoryResult<Option<Assignment>> {
        let mut patch = PatchBuilder::new("assignments");
        patch
            .set("notes", update.notes.clone())
            .set("status", update.status.map(AssignmentStatus::as_str));

        if !patch.execute(self.pool, id).await? {
            return Ok(None);
        }
        self.find_by_id(id).await
    }

    /// Cancels the assignment; the recruiter and job are untouched
    pub async fn soft_delete(&self, id: &str) -> RepositoryResult<()> {
        SOFT_DELETE.apply(self.pool, id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::fixtures::{marketplace, ACME_USER, GLOBEX_USER, LONER};
    use crate::repository::RecruiterRepository;
    use crate::repository::recruiters::RecruiterStatus;

    fn assignment(recruiter_id: &str, job_id: &str, notes: &str) -> NewAssignment {
        NewAssignment {
            recruiter_id: recruiter_id.to_string(),
            job_id: job_id.to_string(),
            assigned_by: Some(ACME_USER.to_string()),
            notes: Some(notes.to_string()),
            status: None,
        }
    }

    #[tokio::test]
    async fn create_returns_enriched_row() {
        let m = marketplace().await;
        let repo = AssignmentRepository::new(m.db.pool());

        let created = repo
            .create(&assignment(&m.recruiter.id, &m.acme_job.id, "Priority hire"))
            .await
            .unwrap();

        assert_eq!(created.status, AssignmentStatus::Active);
        assert_eq!(created.recruiter_name, "Jane Doe");
        assert_eq!(created.recruiter_email, "jane@talent.io");
        assert_eq!(created.job_title, "Senior Rust Engineer");
        assert_eq!(created.organization_name, "Acme Corp");
        assert_eq!(created.organization_id, m.acme.id);
    }

    #[tokio::test]
    async fn list_is_scoped_to_caller_organizations() {
        let m = marketplace().await;
        let repo = AssignmentRepository::new(m.db.pool());
        repo.create(&assignment(&m.recruiter.id, &m.acme_job.id, "a")).await.unwrap();
        repo.create(&assignment(&m.other_recruiter.id, &m.acme_job.id, "b")).await.unwrap();
        repo.create(&assignment(&m.recruiter.id, &m.globex_job.id, "c")).await.unwrap();

        let acme = repo.list(ACME_USER, &AssignmentFilter::default()).await.unwrap();
        assert_eq!(acme.total, 2);
        assert!(acme.data.iter().all(|a| a.organization_id == m.acme.id));

        let globex = repo.list(GLOBEX_USER, &AssignmentFilter::default()).await.unwrap();
        assert_eq!(globex.total, 1);
        assert_eq!(globex.data[0].job_title, "Account Executive");
    }

    #[tokio::test]
    async fn caller_without_organizations_sees_unscoped_rows() {
        let m = marketplace().await;
        let repo = AssignmentRepository::new(m.db.pool());
        repo.create(&assignment(&m.recruiter.id, &m.acme_job.id, "a")).await.unwrap();
        repo.create(&assignment(&m.recruiter.id, &m.globex_job.id, "b")).await.unwrap();

        // Current behavior: no memberships means no scoping at all.
        let page = repo.list(LONER, &AssignmentFilter::default()).await.unwrap();
        assert_eq!(page.total, 2);
    }

    #[tokio::test]
    async fn filters_combine_with_and() {
        let m = marketplace().await;
        let repo = AssignmentRepository::new(m.db.pool());
        repo.create(&assignment(&m.recruiter.id, &m.acme_job.id, "urgent")).await.unwrap();
        repo.create(&assignment(&m.other_recruiter.id, &m.acme_job.id, "urgent")).await.unwrap();

        let by_search = AssignmentFilter {
            search: Some("URGENT".to_string()),
            ..Default::default()
        };
        let by_search_and_recruiter = AssignmentFilter {
            recruiter_id: Some(m.recruiter.id.clone()),
            ..by_search.clone()
        };

        assert_eq!(repo.list(ACME_USER, &by_search).await.unwrap().total, 2);
        let narrowed = repo.list(ACME_USER, &by_search_and_recruiter).await.unwrap();
        assert_eq!(narrowed.total, 1);
        assert_eq!(narrowed.data[0].recruiter_id, m.recruiter.id);

        // search also covers the job title
        let by_title = AssignmentFilter {
            search: Some("rust".to_string()),
            ..Default::default()
        };
        assert_eq!(repo.list(ACME_USER, &by_title).await.unwrap().total, 2);
    }

    #[tokio::test]
    async fn soft_delete_cancels_without_cascading() {
        let m = marketplace().await;
        let repo = AssignmentRepository::new(m.db.pool());
        let created = repo
            .create(&assignment(&m.recruiter.id, &m.acme_job.id, "a"))
            .await
            .unwrap();

        repo.soft_delete(&created.id).await.unwrap();
        repo.soft_delete(&created.id).await.unwrap();

        let fetched = repo.find_by_id(&created.id).await.unwrap().unwrap();
        assert_eq!(fetched.status, AssignmentStatus::Cancelled);

        let recruiter = RecruiterRepository::new(m.db.pool())
            .find_by_id(&m.recruiter.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(recruiter.status, RecruiterStatus::Active);

        let cancelled = AssignmentFilter {
            status: Some(AssignmentStatus::Cancelled).into(),
            ..Default::default()
        };
        assert_eq!(repo.list(ACME_USER, &cancelled).await.unwrap().total, 1);
    }

    #[tokio::test]
    async fn update_patches_status_and_notes() {
        let m = marketplace().await;
        let repo = AssignmentRepository::new(m.db.pool());
        let created = repo
            .create(&assignment(&m.recruiter.id, &m.acme_job.id, "a"))
            .await
            .unwrap();

        let updated = repo
            .update(
                &created.id,
                &UpdateAssignment {
                    status: Some(AssignmentStatus::Completed),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.status, AssignmentStatus::Completed);
        assert_eq!(updated.notes.as_deref(), Some("a"));

        assert!(repo.find_by_id("missing").await.unwrap().is_none());
    }
}
