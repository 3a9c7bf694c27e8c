// src/repository/proposals.rs
//! Recruiter proposals: a candidate put forward for a job, with a fee.

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
pub enum ProposalStatus {
    Pending,
    Accepted,
    Rejected,
    Cancelled,
}

impl ProposalStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Accepted => "accepted",
            Self::Rejected => "rejected",
            Self::Cancelled => "cancelled",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Proposal {
    pub id: String,
    pub recruiter_id: String,
    pub job_id: String,
    pub candidate_id: String,
    pub message: Option<String>,
    pub fee: Option<f64>,
    pub status: ProposalStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub recruiter_name: String,
    pub recruiter_email: String,
    pub job_title: String,
    pub organization_id: String,
    pub company_name: String,
    pub candidate_name: String,
}

#[derive(Debug, Clone, Default, FromForm)]
pub struct ProposalFilter {
    pub search: Option<String>,
    pub status: Param<ProposalStatus>,
    pub recruiter_id: Option<String>,
    pub job_id: Option<String>,
    pub candidate_id: Option<String>,
    pub page: Param<u32>,
    pub limit: Param<u32>,
    pub sort_by: Option<String>,
    pub sort_order: Param<SortOrder>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewProposal {
    pub recruiter_id: String,
    pub job_id: String,
    pub candidate_id: String,
    pub message: Option<String>,
    pub fee: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateProposal {
    pub message: Option<String>,
    pub fee: Option<f64>,
    pub status: Option<ProposalStatus>,
}

const SELECT: &str = "p.id AS id, p.recruiter_id AS recruiter_id, p.job_id AS job_id, \
    p.candidate_id AS candidate_id, p.message AS message, p.fee AS fee, p.status AS status, \
    p.created_at AS created_at, p.updated_at AS updated_at, \
    r.full_name AS recruiter_name, r.email AS recruiter_email, \
    j.title AS job_title, j.organization_id AS organization_id, o.name AS company_name, \
    c.full_name AS candidate_name";
const FROM: &str = "proposals p \
    JOIN recruiters r ON r.id = p.recruiter_id \
    JOIN jobs j ON j.id = p.job_id \
    JOIN organizations o ON o.id = j.organization_id \
    JOIN candidates c ON c.id = p.candidate_id";

const SORT: SortColumns = SortColumns {
    default: "created_at",
    default_order: SortOrder::Desc,
    columns: &[
        ("created_at", "p.created_at"),
        ("updated_at", "p.updated_at"),
        ("fee", "p.fee"),
    ],
};

const SOFT_DELETE: SoftDelete = SoftDelete {
    table: "proposals",
    status_column: "status",
    inactive_value: "cancelled",
};

pub struct ProposalRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> ProposalRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn list(
        &self,
        caller_id: &str,
        filter: &ProposalFilter,
    ) -> RepositoryResult<Page<Proposal>> {
        let scope = OrganizationScope::resolve(self.pool, caller_id).await?;

        ListQuery::new(SELECT, FROM)
            .scoped("j.organization_id", &scope)
            .search(&["p.message", "c.full_name"], filter.search.as_deref())
            .equals("p.status", filter.status.get().map(ProposalStatus::as_str))
            .equals("p.recruiter_id", filter.recruiter_id.as_deref())
            .equals("p.job_id", filter.job_id.as_deref())
            .equals("p.candidate_id", filter.candidate_id.as_deref())
            .fetch_page(self.pool, &SORT, &filter.list_params())
            .await
    }

    pub async fn find_by_id(&self, id: &str) -> RepositoryResult<Option<Proposal>> {
        ListQuery::new(SELECT, FROM)
            .equals("p.id", Some(id))
            .fetch_optional(self.pool)
            .await
    }

    pub async fn create(&self, new: &NewProposal) -> RepositoryResult<Proposal> {
        let id = new_id();
        let now = Utc::now();

        sqlx::query(
            r#"
            INSERT INTO proposals
                (id, recruiter_id, job_id, candidate_id, message, fee, status, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(&new.recruiter_id)
        .bind(&new.job_id)
        .bind(&new.candidate_id)
        .bind(&new.message)
        .bind(new.fee)
        .bind(ProposalStatus::Pending.as_str())
        .bind(now)
        .bind(now)
        .execute(self.pool)
        .await?;

        app_log!(
            info,
            "Recruiter {} proposed candidate {} for job {} ({})",
            new.recruiter_id,
            new.candidate_id,
            new.job_id,
            id
        );
        inserted(self.find_by_id(&id).await?)
    }

    pub async fn update(
        &self,
        id: &str,
        update: &UpdateProposal,
    ) -> RepositoryResult<Option<Proposal>> {
        let mut patch = PatchBuilder::new("proposals");
        patch
            .set("message", update.message.clone())
            .set("fee", update.fee)
            .set("status", update.status.map(ProposalStatus::as_str));

        if !patch.execute(self.pool, id).await? {
            return Ok(None);
        }
        self.find_by_id(id).await
    }

    pub async fn soft_delete(&self, id: &str) -> RepositoryResult<()> {
        SOFT_DELETE.apply(self.pool, id).await
    }
}
