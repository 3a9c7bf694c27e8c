// src/invitations.rs
//! Organization invitations: issue a token, look it up, accept it.

use chrono::{DateTime, Duration, Utc};
use rocket::http::Status;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::Database;
use crate::repository::{DirectoryRepository, RepositoryError};
use crate::utils::{new_id, new_token, normalize_email};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum InvitationStatus {
    Pending,
    Accepted,
    Expired,
    Revoked,
}

/// Invitation joined with the name of the organization it grants access to
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct InvitationView {
    pub id: String,
    pub token: String,
    pub organization_id: String,
    pub organization_name: String,
    pub email: String,
    pub role: String,
    pub status: InvitationStatus,
    pub invited_by: Option<String>,
    pub expires_at: DateTime<Utc>,
    pub accepted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl InvitationView {
    fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.status == InvitationStatus::Expired || self.expires_at < now
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AcceptedInvitation {
    pub organization_id: String,
    pub organization_name: String,
    pub role: String,
    pub accepted_at: DateTime<Utc>,
}

#[derive(Debug, Error)]
pub enum InvitationError {
    #[error("Invitation not found")]
    NotFound,

    #[error("Invitation has already been accepted")]
    AlreadyAccepted,

    #[error("Invitation has been revoked")]
    Revoked,

    #[error("Invitation has expired")]
    Expired,

    #[error("Invitation was issued to a different email address")]
    EmailMismatch,

    #[error("Already a member of this organization")]
    AlreadyMember,

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl InvitationError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotFound => "INVITATION_NOT_FOUND",
            Self::AlreadyAccepted => "INVITATION_ALREADY_ACCEPTED",
            Self::Revoked => "INVITATION_REVOKED",
            Self::Expired => "INVITATION_EXPIRED",
            Self::EmailMismatch => "INVITATION_EMAIL_MISMATCH",
            Self::AlreadyMember => "ALREADY_MEMBER",
            Self::Database(_) | Self::Repository(_) => "DATABASE_ERROR",
        }
    }

    /// Text safe to show the caller; database details stay in the logs
    pub fn message(&self) -> String {
        match self {
            Self::Database(_) | Self::Repository(_) => "Database error occurred".to_string(),
            other => other.to_string(),
        }
    }

    pub fn status(&self) -> Status {
        match self {
            Self::NotFound => Status::NotFound,
            Self::AlreadyAccepted | Self::AlreadyMember => Status::Conflict,
            Self::Revoked | Self::Expired => Status::Gone,
            Self::EmailMismatch => Status::Forbidden,
            Self::Database(_) | Self::Repository(_) => Status::InternalServerError,
        }
    }
}

const SELECT_VIEW: &str = r#"
    SELECT i.id AS id, i.token AS token, i.organization_id AS organization_id,
           o.name AS organization_name, i.email AS email, i.role AS role,
           i.status AS status, i.invited_by AS invited_by, i.expires_at AS expires_at,
           i.accepted_at AS accepted_at, i.created_at AS created_at
    FROM invitations i
    JOIN organizations o ON o.id = i.organization_id
    WHERE i.token = ?
"#;

pub struct InvitationService<'a> {
    db: &'a Database,
}

impl<'a> InvitationService<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    pub async fn create(
        &self,
        organization_id: &str,
        email: &str,
        role: &str,
        invited_by: Option<&str>,
        ttl: Duration,
    ) -> Result<InvitationView, InvitationError> {
        let token = new_token();
        let now = Utc::now();

        sqlx::query(
            r#"
            INSERT INTO invitations
                (id, token, organization_id, email, role, status, invited_by, expires_at, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, 'pending', ?, ?, ?, ?)
            "#,
        )
        .bind(new_id())
        .bind(&token)
        .bind(organization_id)
        .bind(normalize_email(email))
        .bind(role)
        .bind(invited_by)
        .bind(now + ttl)
        .bind(now)
        .bind(now)
        .execute(self.db.pool())
        .await?;

        app_log!(info, "Invited {} to organization {} as {}", email, organization_id, role);
        self.lookup(&token).await
    }

    pub async fn lookup(&self, token: &str) -> Result<InvitationView, InvitationError> {
        sqlx::query_as::<_, InvitationView>(SELECT_VIEW)
            .bind(token)
            .fetch_optional(self.db.pool())
            .await?
            .ok_or(InvitationError::NotFound)
    }

    /// Validate the invitation against the caller and, if everything checks
    /// out, add the membership and close the invitation in one transaction.
    pub async fn accept(
        &self,
        token: &str,
        caller_id: &str,
        caller_email: &str,
    ) -> Result<AcceptedInvitation, InvitationError> {
        let invitation = self.lookup(token).await?;
        let now = Utc::now();

        match invitation.status {
            InvitationStatus::Accepted => return Err(InvitationError::AlreadyAccepted),
            InvitationStatus::Revoked => return Err(InvitationError::Revoked),
            InvitationStatus::Pending | InvitationStatus::Expired => {}
        }

        if invitation.is_expired(now) {
            self.mark_expired(&invitation.id).await?;
            app_log!(info, "Invitation {} expired at {}", invitation.id, invitation.expires_at);
            return Err(InvitationError::Expired);
        }

        if normalize_email(&invitation.email) != normalize_email(caller_email) {
            app_log!(
                warn,
                "Caller {} tried to accept invitation {} issued to another address",
                caller_id,
                invitation.id
            );
            return Err(InvitationError::EmailMismatch);
        }

        let directory = DirectoryRepository::new(self.db.pool());
        if directory
            .is_member(&invitation.organization_id, caller_id)
            .await?
        {
            return Err(InvitationError::AlreadyMember);
        }

        let mut tx = self.db.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO organization_members (id, organization_id, user_id, role, created_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(new_id())
        .bind(&invitation.organization_id)
        .bind(caller_id)
        .bind(&invitation.role)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        let closed = sqlx::query(
            r#"
            UPDATE invitations
            SET status = 'accepted', accepted_at = ?, updated_at = ?
            WHERE id = ? AND status = 'pending'
            "#,
        )
        .bind(now)
        .bind(now)
        .bind(&invitation.id)
        .execute(&mut *tx)
        .await?;

        if closed.rows_affected() == 0 {
            // Another request accepted it between the read and the write
            tx.rollback().await?;
            return Err(InvitationError::AlreadyAccepted);
        }

        tx.commit().await?;

        app_log!(
            info,
            "User {} joined organization {} as {}",
            caller_id,
            invitation.organization_id,
            invitation.role
        );

        Ok(AcceptedInvitation {
            organization_id: invitation.organization_id,
            organization_name: invitation.organization_name,
            role: invitation.role,
            accepted_at: now,
        })
    }

    async fn mark_expired(&self, id: &str) -> Result<(), InvitationError> {
        sqlx::query(
            "UPDATE invitations SET status = 'expired', updated_at = ? WHERE id = ? AND status = 'pending'",
        )
        .bind(Utc::now())
        .bind(id)
        .execute(self.db.pool())
        .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::directory::Organization;

    const ALICE: &str = "user-alice";

    async fn setup() -> (Database, Organization) {
        let db = Database::in_memory().await.unwrap();
        let org = DirectoryRepository::new(db.pool())
            .create_organization("Acme Corp")
            .await
            .unwrap();
        (db, org)
    }

    async fn invite(db: &Database, org: &Organization, ttl: Duration) -> InvitationView {
        InvitationService::new(db)
            .create(&org.id, "alice@example.com", "recruiter", Some("owner"), ttl)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn accept_adds_membership_and_closes_invitation() {
        let (db, org) = setup().await;
        let invitation = invite(&db, &org, Duration::days(7)).await;
        assert_eq!(invitation.status, InvitationStatus::Pending);
        assert_eq!(invitation.organization_name, "Acme Corp");
        assert_eq!(invitation.token.len(), 32);

        let service = InvitationService::new(&db);
        let accepted = service
            .accept(&invitation.token, ALICE, "Alice@Example.com")
            .await
            .unwrap();
        assert_eq!(accepted.organization_id, org.id);
        assert_eq!(accepted.role, "recruiter");

        assert!(DirectoryRepository::new(db.pool())
            .is_member(&org.id, ALICE)
            .await
            .unwrap());

        let view = service.lookup(&invitation.token).await.unwrap();
        assert_eq!(view.status, InvitationStatus::Accepted);
        assert!(view.accepted_at.is_some());

        let again = service.accept(&invitation.token, ALICE, "alice@example.com").await;
        assert!(matches!(again, Err(InvitationError::AlreadyAccepted)));
    }

    #[tokio::test]
    async fn unknown_token_is_not_found() {
        let (db, _) = setup().await;
        let result = InvitationService::new(&db)
            .accept("does-not-exist", ALICE, "alice@example.com")
            .await;
        assert!(matches!(result, Err(InvitationError::NotFound)));
    }

    #[tokio::test]
    async fn expired_invitation_is_rejected_and_marked() {
        let (db, org) = setup().await;
        let invitation = invite(&db, &org, Duration::hours(-1)).await;
        let service = InvitationService::new(&db);

        let result = service.accept(&invitation.token, ALICE, "alice@example.com").await;
        assert!(matches!(result, Err(InvitationError::Expired)));

        let view = service.lookup(&invitation.token).await.unwrap();
        assert_eq!(view.status, InvitationStatus::Expired);

        // still expired on retry
        let retry = service.accept(&invitation.token, ALICE, "alice@example.com").await;
        assert!(matches!(retry, Err(InvitationError::Expired)));
    }

    #[tokio::test]
    async fn revoked_invitation_is_rejected() {
        let (db, org) = setup().await;
        let invitation = invite(&db, &org, Duration::days(1)).await;
        sqlx::query("UPDATE invitations SET status = 'revoked' WHERE id = ?")
            .bind(&invitation.id)
            .execute(db.pool())
            .await
            .unwrap();

        let result = InvitationService::new(&db)
            .accept(&invitation.token, ALICE, "alice@example.com")
            .await;
        assert!(matches!(result, Err(InvitationError::Revoked)));
    }

    #[tokio::test]
    async fn different_email_is_rejected() {
        let (db, org) = setup().await;
        let invitation = invite(&db, &org, Duration::days(1)).await;

        let result = InvitationService::new(&db)
            .accept(&invitation.token, ALICE, "mallory@example.com")
            .await;
        assert!(matches!(result, Err(InvitationError::EmailMismatch)));
        assert!(!DirectoryRepository::new(db.pool())
            .is_member(&org.id, ALICE)
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn existing_member_is_rejected() {
        let (db, org) = setup().await;
        DirectoryRepository::new(db.pool())
            .add_member(&org.id, ALICE, "admin")
            .await
            .unwrap();
        let invitation = invite(&db, &org, Duration::days(1)).await;

        let service = InvitationService::new(&db);
        let result = service.accept(&invitation.token, ALICE, "alice@example.com").await;
        assert!(matches!(result, Err(InvitationError::AlreadyMember)));

        let view = service.lookup(&invitation.token).await.unwrap();
        assert_eq!(view.status, InvitationStatus::Pending);
    }

    #[test]
    fn test_error_codes_and_statuses() {
        assert_eq!(InvitationError::Expired.code(), "INVITATION_EXPIRED");
        assert_eq!(InvitationError::Expired.status(), Status::Gone);
        assert_eq!(InvitationError::EmailMismatch.status(), Status::Forbidden);
        assert_eq!(InvitationError::AlreadyMember.status(), Status::Conflict);

        let db_error = InvitationError::Database(sqlx::Error::PoolTimedOut);
        assert_eq!(db_error.code(), "DATABASE_ERROR");
        assert_eq!(db_error.message(), "Database error occurred");
    }
}
