// src/repository/recruiters.rs
use chrono::{DateTime, Utc};
use clap::ValueEnum;
use rocket::{FromForm, FromFormField};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

use super::patch::PatchBuilder;
use super::query::{ListQuery, Page, Param, SortColumns, SortOrder};
use super::soft_delete::SoftDelete;
use super::{Paginated, RepositoryResult};
use crate::utils::new_id;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, FromFormField, ValueEnum,
)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum RecruiterStatus {
    Active,
    Pending,
    Inactive,
}

impl RecruiterStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Pending => "pending",
            Self::Inactive => "inactive",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Recruiter {
    pub id: String,
    pub user_id: Option<String>,
    pub full_name: String,
    pub email: String,
    pub specialization: Option<String>,
    pub bio: Option<String>,
    pub status: RecruiterStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, FromForm)]
pub struct RecruiterFilter {
    pub search: Option<String>,
    pub status: Param<RecruiterStatus>,
    pub specialization: Option<String>,
    pub page: Param<u32>,
    pub limit: Param<u32>,
    pub sort_by: Option<String>,
    pub sort_order: Param<SortOrder>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewRecruiter {
    pub user_id: Option<String>,
    pub full_name: String,
    pub email: String,
    pub specialization: Option<String>,
    pub bio: Option<String>,
    pub status: Option<RecruiterStatus>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateRecruiter {
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub specialization: Option<String>,
    pub bio: Option<String>,
    pub status: Option<RecruiterStatus>,
}

const SELECT: &str = "r.id AS id, r.user_id AS user_id, r.full_name AS full_name, \
    r.email AS email, r.specialization AS specialization, r.bio AS bio, \
    r.status AS status, r.created_at AS created_at, r.updated_at AS updated_at";
const FROM: &str = "recruiters r";

const SORT: SortColumns = SortColumns {
    default: "created_at",
    default_order: SortOrder::Desc,
    columns: &[
        ("created_at", "r.created_at"),
        ("updated_at", "r.updated_at"),
        ("full_name", "r.full_name"),
    ],
};

const SOFT_DELETE: SoftDelete = SoftDelete {
    table: "recruiters",
    status_column: "status",
    inactive_value: "inactive",
};

pub struct RecruiterRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> RecruiterRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Recruiters are marketplace-wide; the caller is only recorded.
    pub async fn list(
        &self,
        caller_id: &str,
        filter: &RecruiterFilter,
    ) -> RepositoryResult<Page<Recruiter>> {
        app_log!(debug, "Listing recruiters for caller {}", caller_id);

        ListQuery::new(SELECT, FROM)
            .search(&["r.full_name", "r.email"], filter.search.as_deref())
            .equals("r.status", filter.status.get().map(RecruiterStatus::as_str))
            .contains("r.specialization", filter.specialization.as_deref())
            .fetch_page(self.pool, &SORT, &filter.list_params())
            .await
    }

    pub async fn find_by_id(&self, id: &str) -> RepositoryResult<Option<Recruiter>> {
        ListQuery::new(SELECT, FROM)
            .equals("r.id", Some(id))
            .fetch_optional(self.pool)
            .await
    }

    pub async fn create(&self, new: &NewRecruiter) -> RepositoryResult<Recruiter> {
        let now = Utc::now();
        let recruiter = Recruiter {
            id: new_id(),
            user_id: new.user_id.clone(),
            full_name: new.full_name.clone(),
            email: new.email.clone(),
            specialization: new.specialization.clone(),
            bio: new.bio.clone(),
            status: new.status.unwrap_or(RecruiterStatus::Pending),
            created_at: now,
            updated_at: now,
        };

        sqlx::query(
            r#"
            INSERT INTO recruiters
                (id, user_id, full_name, email, specialization, bio, status, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&recruiter.id)
        .bind(&recruiter.user_id)
        .bind(&recruiter.full_name)
        .bind(&recruiter.email)
        .bind(&recruiter.specialization)
        .bind(&recruiter.bio)
        .bind(recruiter.status.as_str())
        .bind(now)
        .bind(now)
        .execute(self.pool)
        .await?;

        app_log!(info, "Created recruiter: {} ({})", recruiter.full_name, recruiter.id);
        Ok(recruiter)
    }

    pub async fn update(
        &self,
        id: &str,
        update: &UpdateRecruiter,
    ) -> RepositoryResult<Option<Recruiter>> {
        let mut patch = PatchBuilder::new("recruiters");
        patch
            .set("full_name", update.full_name.clone())
            .set("email", update.email.clone())
            .set("specialization", update.specialization.clone())
            .set("bio", update.bio.clone())
            .set("status", update.status.map(RecruiterStatus::as_str));

        if !patch.execute(self.pool, id).await? {
            return Ok(None);
        }
        self.find_by_id(id).await
    }

    pub async fn soft_delete(&self, id: &str) -> RepositoryResult<()> {
        SOFT_DELETE.apply(self.pool, id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Database;
    use crate::repository::{ListParams, RepositoryError};
    use rocket::form::{Form, Lenient};

    fn parse_filter(query: &str) -> rocket::form::Result<'_, RecruiterFilter> {
        Form::<Lenient<RecruiterFilter>>::parse(query).map(Lenient::into_inner)
    }

    #[test]
    fn test_query_string_filter_parsing() {
        let filter = parse_filter("status=active&limit=10&sort_order=asc").unwrap();
        assert_eq!(filter.status.get(), Some(RecruiterStatus::Active));
        assert_eq!(filter.list_params().window().limit, 10);
        assert_eq!(filter.sort_order.get(), Some(SortOrder::Asc));

        let sparse = parse_filter("sort_by=full_name").unwrap();
        assert!(sparse.status.get().is_none());
        assert_eq!(
            sparse.list_params(),
            ListParams {
                sort_by: Some("full_name".to_string()),
                ..ListParams::default()
            }
        );

        assert!(parse_filter("status=archived").is_err());
        assert!(parse_filter("page=-1").is_err());
        assert!(parse_filter("limit=abc").is_err());
        assert!(parse_filter("sort_order=sideways").is_err());
    }

    fn recruiter(name: &str, email: &str, specialization: &str, status: RecruiterStatus) -> NewRecruiter {
        NewRecruiter {
            user_id: None,
            full_name: name.to_string(),
            email: email.to_string(),
            specialization: Some(specialization.to_string()),
            bio: None,
            status: Some(status),
        }
    }

    async fn seeded() -> Database {
        let db = Database::in_memory().await.unwrap();
        let repo = RecruiterRepository::new(db.pool());
        for new in [
            recruiter("Jane Doe", "jane@acme.io", "Backend Engineering", RecruiterStatus::Active),
            recruiter("John Roe", "john@globex.io", "Sales", RecruiterStatus::Active),
            recruiter("Ann Acme", "ann@initech.io", "Engineering Management", RecruiterStatus::Pending),
            recruiter("Bob Stone", "bob@acme.io", "Finance", RecruiterStatus::Inactive),
        ] {
            repo.create(&new).await.unwrap();
        }
        db
    }

    #[tokio::test]
    async fn search_matches_name_or_email_case_insensitively() {
        let db = seeded().await;
        let repo = RecruiterRepository::new(db.pool());

        let filter = RecruiterFilter {
            search: Some("ACME".to_string()),
            ..Default::default()
        };
        let page = repo.list("caller", &filter).await.unwrap();

        // "Ann Acme" by name, jane@ and bob@ by email
        assert_eq!(page.total, 3);
        assert_eq!(page.data.len(), 3);
    }

    #[tokio::test]
    async fn search_folds_accented_names() {
        let db = seeded().await;
        let repo = RecruiterRepository::new(db.pool());
        repo.create(&recruiter(
            "Élodie Durand",
            "elodie@talent.fr",
            "Design",
            RecruiterStatus::Active,
        ))
        .await
        .unwrap();

        let filter = RecruiterFilter {
            search: Some("élodie".to_string()),
            ..Default::default()
        };
        let page = repo.list("caller", &filter).await.unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.data[0].full_name, "Élodie Durand");

        let filter = RecruiterFilter {
            search: Some("DURAND".to_string()),
            ..Default::default()
        };
        assert_eq!(repo.list("caller", &filter).await.unwrap().total, 1);
    }

    #[tokio::test]
    async fn additional_filters_never_widen_results() {
        let db = seeded().await;
        let repo = RecruiterRepository::new(db.pool());

        let base = RecruiterFilter {
            specialization: Some("engineering".to_string()),
            ..Default::default()
        };
        let narrowed = RecruiterFilter {
            status: Some(RecruiterStatus::Active).into(),
            ..base.clone()
        };

        let base_total = repo.list("caller", &base).await.unwrap().total;
        let narrowed_page = repo.list("caller", &narrowed).await.unwrap();

        assert_eq!(base_total, 2);
        assert_eq!(narrowed_page.total, 1);
        assert!(narrowed_page.total <= base_total);
        assert_eq!(narrowed_page.data[0].full_name, "Jane Doe");
    }

    #[tokio::test]
    async fn unsupported_sort_is_rejected() {
        let db = seeded().await;
        let repo = RecruiterRepository::new(db.pool());

        let filter = RecruiterFilter {
            sort_by: Some("password".to_string()),
            ..Default::default()
        };
        let result = repo.list("caller", &filter).await;
        assert!(matches!(result, Err(RepositoryError::UnsupportedSort(col)) if col == "password"));
    }

    #[tokio::test]
    async fn sort_by_name_ascending() {
        let db = seeded().await;
        let repo = RecruiterRepository::new(db.pool());

        let filter = RecruiterFilter {
            sort_by: Some("full_name".to_string()),
            sort_order: Some(SortOrder::Asc).into(),
            ..Default::default()
        };
        let names: Vec<String> = repo
            .list("caller", &filter)
            .await
            .unwrap()
            .data
            .into_iter()
            .map(|r| r.full_name)
            .collect();
        assert_eq!(names, vec!["Ann Acme", "Bob Stone", "Jane Doe", "John Roe"]);
    }

    #[tokio::test]
    async fn soft_delete_is_terminal_and_idempotent() {
        let db = seeded().await;
        let repo = RecruiterRepository::new(db.pool());
        let created = repo
            .create(&recruiter("Temp", "temp@x.io", "Ops", RecruiterStatus::Active))
            .await
            .unwrap();

        repo.soft_delete(&created.id).await.unwrap();
        let first = repo.find_by_id(&created.id).await.unwrap().unwrap();
        assert_eq!(first.status, RecruiterStatus::Inactive);
        assert!(first.updated_at >= created.updated_at);

        repo.soft_delete(&created.id).await.unwrap();
        let second = repo.find_by_id(&created.id).await.unwrap().unwrap();
        assert_eq!(second.status, RecruiterStatus::Inactive);

        // unknown ids are not an error either
        repo.soft_delete("missing").await.unwrap();
    }

    #[tokio::test]
    async fn not_found_returns_none() {
        let db = seeded().await;
        let repo = RecruiterRepository::new(db.pool());
        assert!(repo.find_by_id("missing").await.unwrap().is_none());
        assert!(repo
            .update("missing", &UpdateRecruiter::default())
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn update_changes_only_provided_fields() {
        let db = seeded().await;
        let repo = RecruiterRepository::new(db.pool());
        let created = repo
            .create(&recruiter("Temp", "temp@x.io", "Ops", RecruiterStatus::Pending))
            .await
            .unwrap();

        let updated = repo
            .update(
                &created.id,
                &UpdateRecruiter {
                    bio: Some("Ten years in ops hiring".to_string()),
                    status: Some(RecruiterStatus::Active),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
            .unwrap();

        assert_eq!(updated.full_name, "Temp");
        assert_eq!(updated.specialization.as_deref(), Some("Ops"));
        assert_eq!(updated.bio.as_deref(), Some("Ten years in ops hiring"));
        assert_eq!(updated.status, RecruiterStatus::Active);
    }
}
