// src/repository/soft_delete.rs
use chrono::Utc;
use sqlx::SqlitePool;

use super::RepositoryResult;

/// Where a resource keeps its lifecycle state and which value retires a row.
#[derive(Debug, Clone, Copy)]
pub struct SoftDelete {
    pub table: &'static str,
    pub status_column: &'static str,
    pub inactive_value: &'static str,
}

impl SoftDelete {
    /// Set the status to the inactive value and bump `updated_at`.
    ///
    /// Unconditional update: repeated calls converge on the same state and
    /// concurrent writers race with last-write-wins. Related rows are left
    /// untouched and a missing id is not an error.
    pub async fn apply(&self, pool: &SqlitePool, id: &str) -> RepositoryResult<()> {
        let sql = format!(
            "UPDATE {} SET {} = ?, updated_at = ? WHERE id = ?",
            self.table, self.status_column
        );

        let result = sqlx::query(&sql)
            .bind(self.inactive_value)
            .bind(Utc::now())
            .bind(id)
            .execute(pool)
            .await?;

        if result.rows_affected() == 0 {
            app_log!(debug, "Soft delete on {} matched no row for id {}", self.table, id);
        } else {
            app_log!(
                info,
                "Soft deleted {} {} (status -> {})",
                self.table,
                id,
                self.inactive_value
            );
        }

        Ok(())
    }
}
