// src/repository/fixtures.rs
//! Shared seed data for repository tests

use crate::core::Database;
use crate::repository::directory::{Candidate, Job, Organization};
use crate::repository::recruiters::{NewRecruiter, Recruiter, RecruiterStatus};
use crate::repository::{DirectoryRepository, RecruiterRepository};

pub const ACME_USER: &str = "acme-user";
pub const GLOBEX_USER: &str = "globex-user";
pub const LONER: &str = "no-org-user";

pub struct Marketplace {
    pub db: Database,
    pub acme: Organization,
    pub globex: Organization,
    pub acme_job: Job,
    pub globex_job: Job,
    pub recruiter: Recruiter,
    pub other_recruiter: Recruiter,
    pub candidate: Candidate,
    pub other_candidate: Candidate,
}

pub fn new_recruiter(name: &str, email: &str) -> NewRecruiter {
    NewRecruiter {
        user_id: None,
        full_name: name.to_string(),
        email: email.to_string(),
        specialization: None,
        bio: None,
        status: Some(RecruiterStatus::Active),
    }
}

/// Two organizations with one member and one job each, two recruiters,
/// two candidates. `LONER` belongs to no organization.
pub async fn marketplace() -> Marketplace {
    let db = Database::in_memory().await.unwrap();
    let directory = DirectoryRepository::new(db.pool());
    let recruiters = RecruiterRepository::new(db.pool());

    let acme = directory.create_organization("Acme Corp").await.unwrap();
    let globex = directory.create_organization("Globex").await.unwrap();
    directory.add_member(&acme.id, ACME_USER, "admin").await.unwrap();
    directory.add_member(&globex.id, GLOBEX_USER, "admin").await.unwrap();

    let acme_job = directory.create_job(&acme.id, "Senior Rust Engineer").await.unwrap();
    let globex_job = directory.create_job(&globex.id, "Account Executive").await.unwrap();

    let recruiter = recruiters
        .create(&new_recruiter("Jane Doe", "jane@talent.io"))
        .await
        .unwrap();
    let other_recruiter = recruiters
        .create(&new_recruiter("John Roe", "john@talent.io"))
        .await
        .unwrap();

    let candidate = directory
        .create_candidate("Ada Lovelace", Some("ada@example.com"))
        .await
        .unwrap();
    let other_candidate = directory
        .create_candidate("Grace Hopper", Some("grace@example.com"))
        .await
        .unwrap();

    Marketplace {
        db,
        acme,
        globex,
        acme_job,
        globex_job,
        recruiter,
        other_recruiter,
        candidate,
        other_candidate,
    }
}
