// src/admin_cli.rs
use crate::core::{ConfigManager, Database};
use crate::invitations::InvitationService;
use crate::repository::recruiters::{NewRecruiter, RecruiterFilter, RecruiterStatus};
use crate::repository::{DirectoryRepository, RecruiterRepository};
use anyhow::Result;
use clap::{Parser, Subcommand};
use serde::Deserialize;
use std::path::PathBuf;

/// Caller id recorded for reads made from the command line
const ADMIN_CALLER: &str = "network-admin";

#[derive(Parser)]
#[command(name = "network-admin")]
#[command(about = "Administer organizations, invitations and recruiters")]
pub struct AdminCli {
    #[command(subcommand)]
    pub command: AdminCommand,

    /// Defaults to the database_path of the active config.yaml environment
    #[arg(long)]
    pub database_path: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum AdminCommand {
    /// Initialize the database
    Init,
    /// Create an organization
    AddOrganization { name: String },
    /// Add a user to an organization
    AddMember {
        organization_id: String,
        user_id: String,
        #[arg(long, default_value = "member")]
        role: String,
    },
    /// Issue an invitation token
    Invite {
        organization_id: String,
        email: String,
        #[arg(long, default_value = "member")]
        role: String,
        #[arg(long, default_value_t = 7)]
        days: i64,
        #[arg(long)]
        invited_by: Option<String>,
    },
    /// Import recruiters from a CSV file (full_name,email,specialization,bio)
    ImportRecruiters { csv_file: PathBuf },
    /// List recruiters
    ListRecruiters {
        #[arg(long, value_enum)]
        status: Option<RecruiterStatus>,
        #[arg(long)]
        search: Option<String>,
    },
    /// Soft delete a recruiter
    DeactivateRecruiter { id: String },
}

#[derive(Debug, Deserialize)]
struct RecruiterRecord {
    full_name: String,
    email: String,
    #[serde(default)]
    specialization: Option<String>,
    #[serde(default)]
    bio: Option<String>,
}

/// Parsed rows plus one message per rejected line
fn parse_recruiter_csv(content: &str) -> (Vec<NewRecruiter>, Vec<String>) {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(content.as_bytes());

    let mut recruiters = Vec::new();
    let mut errors = Vec::new();

    for (line, result) in reader.deserialize::<RecruiterRecord>().enumerate() {
        match result {
            Ok(record) if record.full_name.is_empty() || record.email.is_empty() => {
                errors.push(format!("row {}: empty full_name or email", line + 1));
            }
            Ok(record) => recruiters.push(NewRecruiter {
                user_id: None,
                full_name: record.full_name,
                email: record.email,
                specialization: record.specialization.filter(|s| !s.is_empty()),
                bio: record.bio.filter(|s| !s.is_empty()),
                status: Some(RecruiterStatus::Pending),
            }),
            Err(e) => errors.push(format!("row {}: {}", line + 1, e)),
        }
    }

    (recruiters, errors)
}

pub async fn handle_admin_command(cli: AdminCli) -> Result<()> {
    let database_path = match cli.database_path {
        Some(path) => path,
        None => ConfigManager::load()?.environment.database_path,
    };
    let db = Database::new(&database_path).await?;
    let directory = DirectoryRepository::new(db.pool());
    let recruiters = RecruiterRepository::new(db.pool());

    match cli.command {
        AdminCommand::Init => {
            app_log!(info, "✅ Database initialized at: {}", database_path.display());
        }

        AdminCommand::AddOrganization { name } => {
            let organization = directory.create_organization(&name).await?;
            app_log!(info, "✅ Organization created: {} ({})", organization.name, organization.id);
        }

        AdminCommand::AddMember {
            organization_id,
            user_id,
            role,
        } => {
            if directory.find_organization(&organization_id).await?.is_none() {
                anyhow::bail!("Organization '{}' not found", organization_id);
            }
            if directory.is_member(&organization_id, &user_id).await? {
                app_log!(info, "⚠️  {} is already a member of {}", user_id, organization_id);
                return Ok(());
            }
            directory.add_member(&organization_id, &user_id, &role).await?;
            app_log!(info, "✅ {} added to {} as {}", user_id, organization_id, role);
        }

        AdminCommand::Invite {
            organization_id,
            email,
            role,
            days,
            invited_by,
        } => {
            let invitation = InvitationService::new(&db)
                .create(
                    &organization_id,
                    &email,
                    &role,
                    invited_by.as_deref(),
                    chrono::Duration::days(days),
                )
                .await?;
            app_log!(info, "✅ Invitation created for {}", invitation.email);
            app_log!(info, "   Organization: {}", invitation.organization_name);
            app_log!(info, "   Token: {}", invitation.token);
            app_log!(info, "   Expires: {}", invitation.expires_at.format("%Y-%m-%d %H:%M UTC"));
        }

        AdminCommand::ImportRecruiters { csv_file } => {
            if !csv_file.exists() {
                anyhow::bail!("CSV file not found: {}", csv_file.display());
            }

            let content = tokio::fs::read_to_string(&csv_file).await?;
            let (records, errors) = parse_recruiter_csv(&content);
            for error in &errors {
                app_log!(warn, "⚠️  Skipping {}", error);
            }

            let mut success_count = 0;
            let mut error_count = errors.len();
            for record in records {
                match recruiters.create(&record).await {
                    Ok(recruiter) => {
                        success_count += 1;
                        app_log!(info, "✅ Added: {} <{}>", recruiter.full_name, recruiter.email);
                    }
                    Err(e) => {
                        error_count += 1;
                        app_log!(error, "❌ Failed to add {}: {}", record.email, e);
                    }
                }
            }

            app_log!(info, "Import completed:");
            app_log!(info, "  ✅ Success: {}", success_count);
            app_log!(info, "  ❌ Errors:  {}", error_count);
        }

        AdminCommand::ListRecruiters { status, search } => {
            let filter = RecruiterFilter {
                status: status.into(),
                search,
                limit: Some(crate::repository::query::MAX_PAGE_LIMIT).into(),
                ..Default::default()
            };
            let page = recruiters.list(ADMIN_CALLER, &filter).await?;

            if page.data.is_empty() {
                app_log!(info, "No recruiters found.");
            } else {
                app_log!(
                    info,
                    "{:<38} {:<25} {:<30} {:<10}",
                    "ID",
                    "Name",
                    "Email",
                    "Status"
                );
                app_log!(info, "{}", "-".repeat(105));
                for recruiter in &page.data {
                    app_log!(
                        info,
                        "{:<38} {:<25} {:<30} {:<10}",
                        recruiter.id,
                        recruiter.full_name,
                        recruiter.email,
                        recruiter.status.as_str()
                    );
                }
                app_log!(info, "Showing {} of {}", page.data.len(), page.total);
            }
        }

        AdminCommand::DeactivateRecruiter { id } => {
            if recruiters.find_by_id(&id).await?.is_none() {
                app_log!(info, "❌ No recruiter found with id: {}", id);
                return Ok(());
            }
            recruiters.soft_delete(&id).await?;
            app_log!(info, "✅ Recruiter deactivated: {}", id);
        }
    }

    Ok(())
}
