// src/repository/scope.rs
//! Caller organization scoping for multi-tenant resources

use sqlx::SqlitePool;

use super::RepositoryResult;

/// The organizations a caller may see rows for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrganizationScope {
    Organizations(Vec<String>),
    /// Caller belongs to no organization. Scoping is skipped and the caller
    /// sees every row; kept as-is until the product decides otherwise.
    Unscoped,
}

impl OrganizationScope {
    /// Look up the caller's memberships. This is a separate read from the
    /// list query that follows it; the two are not in one transaction.
    pub async fn resolve(pool: &SqlitePool, caller_id: &str) -> RepositoryResult<Self> {
        let organization_ids: Vec<String> = sqlx::query_scalar(
            r#"
            SELECT organization_id
            FROM organization_members
            WHERE user_id = ?
            ORDER BY organization_id
            "#,
        )
        .bind(caller_id)
        .fetch_all(pool)
        .await?;

        if organization_ids.is_empty() {
            app_log!(
                warn,
                "Caller {} has no organization memberships, listing unscoped",
                caller_id
            );
            return Ok(Self::Unscoped);
        }

        Ok(Self::Organizations(organization_ids))
    }

    pub fn organization_ids(&self) -> Option<&[String]> {
        match self {
            Self::Organizations(ids) => Some(ids),
            Self::Unscoped => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Database;
    use crate::repository::DirectoryRepository;

    #[tokio::test]
    async fn resolves_memberships_for_caller() {
        let db = Database::in_memory().await.unwrap();
        let directory = DirectoryRepository::new(db.pool());
        let acme = directory.create_organization("Acme").await.unwrap();
        let globex = directory.create_organization("Globex").await.unwrap();
        directory.add_member(&acme.id, "user-1", "admin").await.unwrap();
        directory.add_member(&globex.id, "user-2", "member").await.unwrap();

        let scope = OrganizationScope::resolve(db.pool(), "user-1").await.unwrap();
        assert_eq!(scope, OrganizationScope::Organizations(vec![acme.id]));
    }

    #[tokio::test]
    async fn caller_without_memberships_is_unscoped() {
        let db = Database::in_memory().await.unwrap();
        let scope = OrganizationScope::resolve(db.pool(), "nobody").await.unwrap();
        assert_eq!(scope, OrganizationScope::Unscoped);
        assert!(scope.organization_ids().is_none());
    }
}
