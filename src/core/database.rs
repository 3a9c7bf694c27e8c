// src/core/database.rs
//! Connection management and schema migrations

use anyhow::{Context, Result};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Sqlite, SqlitePool, Transaction};
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS organizations (
        id TEXT PRIMARY KEY,
        name TEXT NOT NULL,
        created_at TEXT NOT NULL DEFAULT (datetime('now')),
        updated_at TEXT NOT NULL DEFAULT (datetime('now'))
    );
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS organization_members (
        id TEXT PRIMARY KEY,
        organization_id TEXT NOT NULL REFERENCES organizations(id),
        user_id TEXT NOT NULL,
        role TEXT NOT NULL DEFAULT 'member',
        created_at TEXT NOT NULL DEFAULT (datetime('now')),
        UNIQUE (organization_id, user_id)
    );
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS jobs (
        id TEXT PRIMARY KEY,
        organization_id TEXT NOT NULL REFERENCES organizations(id),
        title TEXT NOT NULL,
        status TEXT NOT NULL DEFAULT 'open',
        created_at TEXT NOT NULL DEFAULT (datetime('now')),
        updated_at TEXT NOT NULL DEFAULT (datetime('now'))
    );
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS candidates (
        id TEXT PRIMARY KEY,
        full_name TEXT NOT NULL,
        email TEXT,
        created_at TEXT NOT NULL DEFAULT (datetime('now')),
        updated_at TEXT NOT NULL DEFAULT (datetime('now'))
    );
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS recruiters (
        id TEXT PRIMARY KEY,
        user_id TEXT,
        full_name TEXT NOT NULL,
        email TEXT NOT NULL,
        specialization TEXT,
        bio TEXT,
        status TEXT NOT NULL DEFAULT 'pending'
            CHECK (status IN ('active', 'pending', 'inactive')),
        created_at TEXT NOT NULL DEFAULT (datetime('now')),
        updated_at TEXT NOT NULL DEFAULT (datetime('now'))
    );
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS assignments (
        id TEXT PRIMARY KEY,
        recruiter_id TEXT NOT NULL REFERENCES recruiters(id),
        job_id TEXT NOT NULL REFERENCES jobs(id),
        assigned_by TEXT,
        notes TEXT,
        status TEXT NOT NULL DEFAULT 'active'
            CHECK (status IN ('active', 'completed', 'cancelled')),
        created_at TEXT NOT NULL DEFAULT (datetime('now')),
        updated_at TEXT NOT NULL DEFAULT (datetime('now'))
    );
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS recruiter_candidates (
        id TEXT PRIMARY KEY,
        recruiter_id TEXT NOT NULL REFERENCES recruiters(id),
        candidate_id TEXT NOT NULL REFERENCES candidates(id),
        job_id TEXT REFERENCES jobs(id),
        notes TEXT,
        status TEXT NOT NULL DEFAULT 'active'
            CHECK (status IN ('active', 'hired', 'inactive')),
        created_at TEXT NOT NULL DEFAULT (datetime('now')),
        updated_at TEXT NOT NULL DEFAULT (datetime('now'))
    );
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS recruiter_reputations (
        id TEXT PRIMARY KEY,
        recruiter_id TEXT NOT NULL REFERENCES recruiters(id),
        rating REAL NOT NULL DEFAULT 0,
        review_count INTEGER NOT NULL DEFAULT 0,
        placements INTEGER NOT NULL DEFAULT 0,
        summary TEXT,
        status TEXT NOT NULL DEFAULT 'active'
            CHECK (status IN ('active', 'inactive')),
        created_at TEXT NOT NULL DEFAULT (datetime('now')),
        updated_at TEXT NOT NULL DEFAULT (datetime('now'))
    );
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS proposals (
        id TEXT PRIMARY KEY,
        recruiter_id TEXT NOT NULL REFERENCES recruiters(id),
        job_id TEXT NOT NULL REFERENCES jobs(id),
        candidate_id TEXT NOT NULL REFERENCES candidates(id),
        message TEXT,
        fee REAL,
        status TEXT NOT NULL DEFAULT 'pending'
            CHECK (status IN ('pending', 'accepted', 'rejected', 'cancelled')),
        created_at TEXT NOT NULL DEFAULT (datetime('now')),
        updated_at TEXT NOT NULL DEFAULT (datetime('now'))
    );
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS invitations (
        id TEXT PRIMARY KEY,
        token TEXT NOT NULL UNIQUE,
        organization_id TEXT NOT NULL REFERENCES organizations(id),
        email TEXT NOT NULL,
        role TEXT NOT NULL DEFAULT 'member',
        status TEXT NOT NULL DEFAULT 'pending'
            CHECK (status IN ('pending', 'accepted', 'expired', 'revoked')),
        invited_by TEXT,
        expires_at TEXT NOT NULL,
        accepted_at TEXT,
        created_at TEXT NOT NULL DEFAULT (datetime('now')),
        updated_at TEXT NOT NULL DEFAULT (datetime('now'))
    );
    "#,
];

const INDEXES: &[&str] = &[
    "CREATE INDEX IF NOT EXISTS idx_members_user ON organization_members(user_id);",
    "CREATE INDEX IF NOT EXISTS idx_jobs_organization ON jobs(organization_id);",
    "CREATE INDEX IF NOT EXISTS idx_recruiters_status ON recruiters(status);",
    "CREATE INDEX IF NOT EXISTS idx_assignments_job ON assignments(job_id);",
    "CREATE INDEX IF NOT EXISTS idx_assignments_recruiter ON assignments(recruiter_id);",
    "CREATE INDEX IF NOT EXISTS idx_links_recruiter ON recruiter_candidates(recruiter_id);",
    "CREATE INDEX IF NOT EXISTS idx_reputations_recruiter ON recruiter_reputations(recruiter_id);",
    "CREATE INDEX IF NOT EXISTS idx_proposals_job ON proposals(job_id);",
    "CREATE INDEX IF NOT EXISTS idx_proposals_recruiter ON proposals(recruiter_id);",
];

pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Create new database connection with automatic setup
    pub async fn new(database_path: &Path) -> Result<Self> {
        if let Some(parent) = database_path.parent() {
            tokio::fs::create_dir_all(parent).await.with_context(|| {
                format!("Failed to create database directory: {}", parent.display())
            })?;
        }

        // REGEXP backs the case-insensitive search predicate
        let options = SqliteConnectOptions::new()
            .filename(database_path)
            .create_if_missing(true)
            .with_regexp();
        let pool = SqlitePool::connect_with(options).await.with_context(|| {
            format!("Failed to connect to database: {}", database_path.display())
        })?;

        app_log!(
            info,
            "Database connection established: {}",
            database_path.display()
        );

        let db = Self { pool };
        db.migrate().await?;
        Ok(db)
    }

    /// Private in-memory database. A single pinned connection keeps the
    /// schema alive for the lifetime of the pool.
    pub async fn in_memory() -> Result<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?.with_regexp();
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None::<Duration>)
            .max_lifetime(None::<Duration>)
            .connect_with(options)
            .await
            .context("Failed to open in-memory database")?;

        let db = Self { pool };
        db.migrate().await?;
        Ok(db)
    }

    /// Get pool reference for repositories
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Start a transaction on the shared pool
    pub async fn begin(&self) -> sqlx::Result<Transaction<'static, Sqlite>> {
        self.pool.begin().await
    }

    /// Run database migrations
    async fn migrate(&self) -> Result<()> {
        for statement in SCHEMA.iter().chain(INDEXES) {
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .context("Failed to run database migration")?;
        }

        app_log!(info, "Database migrations completed");
        Ok(())
    }

    /// Check database health
    pub async fn health_check(&self) -> Result<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .context("Database health check failed")?;
        Ok(())
    }
}
