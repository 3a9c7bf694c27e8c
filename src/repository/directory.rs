// src/repository/directory.rs
//! Organizations, memberships, jobs and candidates: the rows other resources
//! are scoped by and enriched from.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

use super::RepositoryResult;
use crate::utils::new_id;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Organization {
    pub id: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct OrganizationMember {
    pub id: String,
    pub organization_id: String,
    pub user_id: String,
    pub role: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Job {
    pub id: String,
    pub organization_id: String,
    pub title: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Candidate {
    pub id: String,
    pub full_name: String,
    pub email: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

pub struct DirectoryRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> DirectoryRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create_organization(&self, name: &str) -> RepositoryResult<Organization> {
        let now = Utc::now();
        let organization = Organization {
            id: new_id(),
            name: name.to_string(),
            created_at: now,
            updated_at: now,
        };

        sqlx::query(
            r#"
            INSERT INTO organizations (id, name, created_at, updated_at)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(&organization.id)
        .bind(&organization.name)
        .bind(now)
        .bind(now)
        .execute(self.pool)
        .await?;

        app_log!(info, "Created organization: {} ({})", name, organization.id);
        Ok(organization)
    }

    pub async fn find_organization(&self, id: &str) -> RepositoryResult<Option<Organization>> {
        let organization = sqlx::query_as::<_, Organization>(
            "SELECT id, name, created_at, updated_at FROM organizations WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(organization)
    }

    pub async fn add_member(
        &self,
        organization_id: &str,
        user_id: &str,
        role: &str,
    ) -> RepositoryResult<OrganizationMember> {
        let member = OrganizationMember {
            id: new_id(),
            organization_id: organization_id.to_string(),
            user_id: user_id.to_string(),
            role: role.to_string(),
            created_at: Utc::now(),
        };

        sqlx::query(
            r#"
            INSERT INTO organization_members (id, organization_id, user_id, role, created_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&member.id)
        .bind(&member.organization_id)
        .bind(&member.user_id)
        .bind(&member.role)
        .bind(member.created_at)
        .execute(self.pool)
        .await?;

        app_log!(
            info,
            "Added {} to organization {} as {}",
            user_id,
            organization_id,
            role
        );
        Ok(member)
    }

    pub async fn is_member(&self, organization_id: &str, user_id: &str) -> RepositoryResult<bool> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM organization_members WHERE organization_id = ? AND user_id = ?",
        )
        .bind(organization_id)
        .bind(user_id)
        .fetch_one(self.pool)
        .await?;

        Ok(count > 0)
    }

    pub async fn create_job(&self, organization_id: &str, title: &str) -> RepositoryResult<Job> {
        let now = Utc::now();
        let job = Job {
            id: new_id(),
            organization_id: organization_id.to_string(),
            title: title.to_string(),
            status: "open".to_string(),
            created_at: now,
            updated_at: now,
        };

        sqlx::query(
            r#"
            INSERT INTO jobs (id, organization_id, title, status, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&job.id)
        .bind(&job.organization_id)
        .bind(&job.title)
        .bind(&job.status)
        .bind(now)
        .bind(now)
        .execute(self.pool)
        .await?;

        Ok(job)
    }

    pub async fn create_candidate(
        &self,
        full_name: &str,
        email: Option<&str>,
    ) -> RepositoryResult<Candidate> {
        let now = Utc::now();
        let candidate = Candidate {
            id: new_id(),
            full_name: full_name.to_string(),
            email: email.map(str::to_string),
            created_at: now,
            updated_at: now,
        };

        sqlx::query(
            r#"
            INSERT INTO candidates (id, full_name, email, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&candidate.id)
        .bind(&candidate.full_name)
        .bind(&candidate.email)
        .bind(now)
        .bind(now)
        .execute(self.pool)
        .await?;

        Ok(candidate)
    }
}
