// src/repository/reputations.rs
use chrono::{DateTime, Utc};
use rocket::{FromForm, FromFormField};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

use super::patch::PatchBuilder;
use super::query::{ListQuery, Page, Param, SortColumns, SortOrder};
use super::soft_delete::SoftDelete;
use super::{inserted, Paginated, RepositoryResult};
use crate::utils::new_id;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, FromFormField)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum ReputationStatus {
    Active,
    Inactive,
}

impl ReputationStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Reputation {
    pub id: String,
    pub recruiter_id: String,
    pub rating: f64,
    pub review_count: i64,
    pub placements: i64,
    pub summary: Option<String>,
    pub status: ReputationStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub recruiter_name: String,
    pub recruiter_email: String,
}

#[derive(Debug, Clone, Default, FromForm)]
pub struct ReputationFilter {
    pub search: Option<String>,
    pub status: Param<ReputationStatus>,
    pub recruiter_id: Option<String>,
    pub min_rating: Param<f64>,
    pub page: Param<u32>,
    pub limit: Param<u32>,
    pub sort_by: Option<String>,
    pub sort_order: Param<SortOrder>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewReputation {
    pub recruiter_id: String,
    #[serde(default)]
    pub rating: f64,
    #[serde(default)]
    pub review_count: i64,
    #[serde(default)]
    pub placements: i64,
    pub summary: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateReputation {
    pub rating: Option<f64>,
    pub review_count: Option<i64>,
    pub placements: Option<i64>,
    pub summary: Option<String>,
    pub status: Option<ReputationStatus>,
}

const SELECT: &str = "rr.id AS id, rr.recruiter_id AS recruiter_id, rr.rating AS rating, \
    rr.review_count AS review_count, rr.placements AS placements, rr.summary AS summary, \
    rr.status AS status, rr.created_at AS created_at, rr.updated_at AS updated_at, \
    r.full_name AS recruiter_name, r.email AS recruiter_email";
const FROM: &str = "recruiter_reputations rr JOIN recruiters r ON r.id = rr.recruiter_id";

const SORT: SortColumns = SortColumns {
    default: "rating",
    default_order: SortOrder::Desc,
    columns: &[
        ("rating", "rr.rating"),
        ("review_count", "rr.review_count"),
        ("placements", "rr.placements"),
        ("created_at", "rr.created_at"),
    ],
};

const SOFT_DELETE: SoftDelete = SoftDelete {
    table: "recruiter_reputations",
    status_column: "status",
    inactive_value: "inactive",
};

pub struct ReputationRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> ReputationRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Reputations are public marketplace data and are not scoped.
    pub async fn list(
        &self,
        caller_id: &str,
        filter: &ReputationFilter,
    ) -> RepositoryResult<Page<Reputation>> {
        app_log!(debug, "Listing reputations for caller {}", caller_id);

        ListQuery::new(SELECT, FROM)
            .search(&["r.full_name"], filter.search.as_deref())
            .equals("rr.status", filter.status.get().map(ReputationStatus::as_str))
            .equals("rr.recruiter_id", filter.recruiter_id.as_deref())
            .at_least("rr.rating", filter.min_rating.get())
            .fetch_page(self.pool, &SORT, &filter.list_params())
            .await
    }

    pub async fn find_by_id(&self, id: &str) -> RepositoryResult<Option<Reputation>> {
        ListQuery::new(SELECT, FROM)
            .equals("rr.id", Some(id))
            .fetch_optional(self.pool)
            .await
    }

    pub async fn create(&self, new: &NewReputation) -> RepositoryResult<Reputation> {
        let id = new_id();
        let now = Utc::now();

        sqlx::query(
            r#"
            INSERT INTO recruiter_reputations
                (id, recruiter_id, rating, review_count, placements, summary, status, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(&new.recruiter_id)
        .bind(new.rating)
        .bind(new.review_count)
        .bind(new.placements)
        .bind(&new.summary)
        .bind(ReputationStatus::Active.as_str())
        .bind(now)
        .bind(now)
        .execute(self.pool)
        .await?;

        app_log!(info, "Recorded reputation for recruiter {} ({})", new.recruiter_id, id);
        inserted(self.find_by_id(&id).await?)
    }

    pub async fn update(
        &self,
        id: &str,
        update: &UpdateReputation,
    ) -> RepositoryResult<Option<Reputation>> {
        let mut patch = PatchBuilder::new("recruiter_reputations");
        patch
            .set("rating", update.rating)
            .set("review_count", update.review_count)
            .set("placements", update.placements)
            .set("summary", update.summary.clone())
            .set("status", update.status.map(ReputationStatus::as_str));

        if !patch.execute(self.pool, id).await? {
            return Ok(None);
        }
        self.find_by_id(id).await
    }

    pub async fn soft_delete(&self, id: &str) -> RepositoryResult<()> {
        SOFT_DELETE.apply(self.pool, id).await
    }
}
