// src/repository/patch.rs
use chrono::Utc;
use sqlx::{Encode, QueryBuilder, Sqlite, SqlitePool, Type};

use super::RepositoryResult;

/// PATCH-style `UPDATE`: only provided fields are written, `updated_at`
/// always moves forward.
pub struct PatchBuilder<'args> {
    builder: QueryBuilder<'args, Sqlite>,
}

impl<'args> PatchBuilder<'args> {
    pub fn new(table: &'static str) -> Self {
        let mut builder = QueryBuilder::new("UPDATE ");
        builder.push(table).push(" SET updated_at = ").push_bind(Utc::now());
        Self { builder }
    }

    pub fn set<T>(&mut self, column: &'static str, value: Option<T>) -> &mut Self
    where
        T: 'args + Encode<'args, Sqlite> + Type<Sqlite>,
    {
        if let Some(value) = value {
            self.builder.push(", ").push(column).push(" = ").push_bind(value);
        }
        self
    }

    /// Returns false when no row has this id
    pub async fn execute(mut self, pool: &SqlitePool, id: &str) -> RepositoryResult<bool> {
        self.builder.push(" WHERE id = ").push_bind(id.to_string());
        let result = self.builder.build().execute(pool).await?;
        Ok(result.rows_affected() > 0)
    }
}
