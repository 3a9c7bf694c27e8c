// src/repository/query.rs
//! Filtered, sorted, offset-paginated list queries over one logical table.

use rocket::form::{self, ValueField};
use rocket::FromFormField;
use serde::{Deserialize, Serialize};
use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, QueryBuilder, Sqlite, SqlitePool};

use super::scope::OrganizationScope;
use super::{RepositoryError, RepositoryResult};
use crate::utils::{non_blank, search_pattern};

pub const DEFAULT_PAGE_LIMIT: u32 = 25;
pub const MAX_PAGE_LIMIT: u32 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, FromFormField)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    fn as_sql(self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

/// Optional query-string value. A missing field is `None`; a value that
/// fails to parse rejects the whole form instead of being dropped.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Param<T>(Option<T>);

impl<T: Copy> Param<T> {
    pub fn get(&self) -> Option<T> {
        self.0
    }
}

impl<T> Default for Param<T> {
    fn default() -> Self {
        Param(None)
    }
}

impl<T> From<Option<T>> for Param<T> {
    fn from(value: Option<T>) -> Self {
        Param(value)
    }
}

impl<'v, T: form::FromFormField<'v>> form::FromFormField<'v> for Param<T> {
    fn from_value(field: ValueField<'v>) -> form::Result<'v, Self> {
        T::from_value(field).map(|value| Param(Some(value)))
    }

    fn default() -> Option<Self> {
        Some(Param(None))
    }
}

/// Page and sort fields shared by every resource filter
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListParams {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub sort_by: Option<String>,
    pub sort_order: Option<SortOrder>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub page: u32,
    pub limit: u32,
    pub offset: i64,
}

impl ListParams {
    pub fn new(page: u32, limit: u32) -> Self {
        Self {
            page: Some(page),
            limit: Some(limit),
            ..Self::default()
        }
    }

    /// Page 0 counts as page 1; a zero limit falls back to the default and
    /// anything above `MAX_PAGE_LIMIT` is capped.
    pub fn window(&self) -> Window {
        let page = self.page.unwrap_or(1).max(1);
        let limit = match self.limit {
            None | Some(0) => DEFAULT_PAGE_LIMIT,
            Some(limit) => limit.min(MAX_PAGE_LIMIT),
        };
        Window {
            page,
            limit,
            offset: (i64::from(page) - 1) * i64::from(limit),
        }
    }
}

/// `{ data, total }`: one page of rows plus the full filtered count
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub data: Vec<T>,
    pub total: i64,
}

/// Whitelist of sortable columns for one resource (public name → SQL column)
pub struct SortColumns {
    pub default: &'static str,
    pub default_order: SortOrder,
    pub columns: &'static [(&'static str, &'static str)],
}

impl SortColumns {
    pub fn resolve(&self, params: &ListParams) -> RepositoryResult<(&'static str, SortOrder)> {
        let requested = non_blank(params.sort_by.as_deref()).unwrap_or(self.default);
        let column = self
            .columns
            .iter()
            .find(|(name, _)| *name == requested)
            .map(|(_, column)| *column)
            .ok_or_else(|| RepositoryError::UnsupportedSort(requested.to_string()))?;

        Ok((column, params.sort_order.unwrap_or(self.default_order)))
    }
}

#[derive(Debug, Clone)]
enum Predicate {
    Equals {
        column: &'static str,
        value: String,
    },
    /// Case-insensitive literal substring match, OR-combined across columns
    Contains {
        columns: Vec<&'static str>,
        pattern: String,
    },
    AtLeast {
        column: &'static str,
        value: f64,
    },
    InSet {
        column: &'static str,
        values: Vec<String>,
    },
}

impl Predicate {
    fn push_to<'args>(&self, builder: &mut QueryBuilder<'args, Sqlite>) {
        match self {
            Predicate::Equals { column, value } => {
                builder.push(*column).push(" = ").push_bind(value.clone());
            }
            Predicate::Contains { columns, pattern } => {
                builder.push("(");
                for (i, column) in columns.iter().enumerate() {
                    if i > 0 {
                        builder.push(" OR ");
                    }
                    builder
                        .push("COALESCE(")
                        .push(*column)
                        .push(", '') REGEXP ")
                        .push_bind(pattern.clone());
                }
                builder.push(")");
            }
            Predicate::AtLeast { column, value } => {
                builder.push(*column).push(" >= ").push_bind(*value);
            }
            Predicate::InSet { column, values } => {
                builder.push(*column).push(" IN (");
                let mut separated = builder.separated(", ");
                for value in values {
                    separated.push_bind(value.clone());
                }
                separated.push_unseparated(")");
            }
        }
    }
}

/// A projection over a fixed FROM/JOIN clause plus AND-combined predicates.
#[derive(Debug, Clone)]
pub struct ListQuery {
    select: &'static str,
    from: &'static str,
    predicates: Vec<Predicate>,
}

impl ListQuery {
    pub fn new(select: &'static str, from: &'static str) -> Self {
        Self {
            select,
            from,
            predicates: Vec::new(),
        }
    }

    /// Free-text search over one or two columns; blank text adds nothing
    pub fn search(mut self, columns: &[&'static str], text: Option<&str>) -> Self {
        if let Some(text) = non_blank(text) {
            self.predicates.push(Predicate::Contains {
                columns: columns.to_vec(),
                pattern: search_pattern(text),
            });
        }
        self
    }

    pub fn contains(self, column: &'static str, text: Option<&str>) -> Self {
        self.search(&[column], text)
    }

    pub fn equals(mut self, column: &'static str, value: Option<&str>) -> Self {
        if let Some(value) = value {
            self.predicates.push(Predicate::Equals {
                column,
                value: value.to_string(),
            });
        }
        self
    }

    pub fn at_least(mut self, column: &'static str, value: Option<f64>) -> Self {
        if let Some(value) = value {
            self.predicates.push(Predicate::AtLeast { column, value });
        }
        self
    }

    /// Restrict `column` to the caller's organizations. An unscoped caller
    /// (no memberships) adds no predicate at all.
    pub fn scoped(mut self, column: &'static str, scope: &OrganizationScope) -> Self {
        if let Some(ids) = scope.organization_ids() {
            self.predicates.push(Predicate::InSet {
                column,
                values: ids.to_vec(),
            });
        }
        self
    }

    fn push_where<'args>(&self, builder: &mut QueryBuilder<'args, Sqlite>) {
        for (i, predicate) in self.predicates.iter().enumerate() {
            builder.push(if i == 0 { " WHERE " } else { " AND " });
            predicate.push_to(builder);
        }
    }

    fn count_builder<'args>(&self) -> QueryBuilder<'args, Sqlite> {
        let mut builder = QueryBuilder::new("SELECT COUNT(*) FROM ");
        builder.push(self.from);
        self.push_where(&mut builder);
        builder
    }

    fn select_builder<'args>(&self) -> QueryBuilder<'args, Sqlite> {
        let mut builder = QueryBuilder::new("SELECT ");
        builder.push(self.select).push(" FROM ").push(self.from);
        self.push_where(&mut builder);
        builder
    }

    /// Count the filtered set, then fetch the requested window of it
    pub async fn fetch_page<T>(
        &self,
        pool: &SqlitePool,
        sort: &SortColumns,
        params: &ListParams,
    ) -> RepositoryResult<Page<T>>
    where
        T: for<'r> FromRow<'r, SqliteRow> + Send + Unpin,
    {
        let (sort_column, sort_order) = sort.resolve(params)?;
        let window = params.window();

        let mut count = self.count_builder();
        let total: i64 = count.build_query_scalar().fetch_one(pool).await?;

        let mut page = self.select_builder();
        page.push(" ORDER BY ")
            .push(sort_column)
            .push(" ")
            .push(sort_order.as_sql())
            .push(" LIMIT ")
            .push_bind(i64::from(window.limit))
            .push(" OFFSET ")
            .push_bind(window.offset);

        let data = page.build_query_as::<T>().fetch_all(pool).await?;

        tracing::debug!(
            from = self.from,
            total,
            returned = data.len(),
            page = window.page,
            limit = window.limit,
            "list query executed"
        );

        Ok(Page { data, total })
    }

    /// Single row through the same projection; `None` when nothing matches
    pub async fn fetch_optional<T>(&self, pool: &SqlitePool) -> RepositoryResult<Option<T>>
    where
        T: for<'r> FromRow<'r, SqliteRow> + Send + Unpin,
    {
        let mut builder = self.select_builder();
        builder.push(" LIMIT 1");
        Ok(builder.build_query_as::<T>().fetch_optional(pool).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Database;
    use chrono::Utc;

    const ORG_SORT: SortColumns = SortColumns {
        default: "name",
        default_order: SortOrder::Asc,
        columns: &[("name", "o.name"), ("created_at", "o.created_at")],
    };

    #[derive(Debug, sqlx::FromRow)]
    struct OrgRow {
        id: String,
        name: String,
    }

    fn org_query() -> ListQuery {
        ListQuery::new("o.id, o.name", "organizations o")
    }

    async fn seed(db: &Database, names: &[&str]) {
        for (i, name) in names.iter().enumerate() {
            sqlx::query(
                "INSERT INTO organizations (id, name, created_at, updated_at) VALUES (?, ?, ?, ?)",
            )
            .bind(format!("org-{i}"))
            .bind(*name)
            .bind(Utc::now())
            .bind(Utc::now())
            .execute(db.pool())
            .await
            .unwrap();
        }
    }

    #[test]
    fn test_window_defaults_and_clamping() {
        assert_eq!(
            ListParams::default().window(),
            Window { page: 1, limit: 25, offset: 0 }
        );
        assert_eq!(ListParams::new(0, 0).window().page, 1);
        assert_eq!(ListParams::new(1, 0).window().limit, DEFAULT_PAGE_LIMIT);
        assert_eq!(ListParams::new(1, 500).window().limit, MAX_PAGE_LIMIT);
        assert_eq!(ListParams::new(3, 10).window().offset, 20);
    }

    #[test]
    fn test_sort_resolution() {
        let default = ORG_SORT.resolve(&ListParams::default()).unwrap();
        assert_eq!(default, ("o.name", SortOrder::Asc));

        let params = ListParams {
            sort_by: Some("created_at".to_string()),
            sort_order: Some(SortOrder::Desc),
            ..ListParams::default()
        };
        assert_eq!(
            ORG_SORT.resolve(&params).unwrap(),
            ("o.created_at", SortOrder::Desc)
        );

        let params = ListParams {
            sort_by: Some("name; DROP TABLE organizations".to_string()),
            ..ListParams::default()
        };
        assert!(matches!(
            ORG_SORT.resolve(&params),
            Err(RepositoryError::UnsupportedSort(_))
        ));
    }

    #[test]
    fn test_where_clause_rendering() {
        let scope = OrganizationScope::Organizations(vec!["a".into(), "b".into()]);
        let query = ListQuery::new("p.id", "proposals p JOIN jobs j ON j.id = p.job_id")
            .search(&["p.message", "j.title"], Some("rust"))
            .equals("p.status", Some("pending"))
            .equals("p.recruiter_id", None)
            .at_least("p.fee", Some(10.0))
            .scoped("j.organization_id", &scope);

        let builder = query.count_builder();
        assert_eq!(
            builder.sql(),
            "SELECT COUNT(*) FROM proposals p JOIN jobs j ON j.id = p.job_id \
             WHERE (COALESCE(p.message, '') REGEXP ? OR COALESCE(j.title, '') REGEXP ?) \
             AND p.status = ? AND p.fee >= ? AND j.organization_id IN (?, ?)"
        );
    }

    #[test]
    fn test_unscoped_and_blank_filters_add_nothing() {
        let query = ListQuery::new("o.id", "organizations o")
            .search(&["o.name"], Some("   "))
            .scoped("o.id", &OrganizationScope::Unscoped);
        assert_eq!(query.count_builder().sql(), "SELECT COUNT(*) FROM organizations o");
    }

    #[tokio::test]
    async fn pagination_returns_window_and_full_total() {
        let db = Database::in_memory().await.unwrap();
        let names = ["a", "b", "c", "d", "e", "f", "g"];
        seed(&db, &names).await;

        let limit = 3u32;
        let n = names.len() as i64;
        for page in 1..=4u32 {
            let result: Page<OrgRow> = org_query()
                .fetch_page(db.pool(), &ORG_SORT, &ListParams::new(page, limit))
                .await
                .unwrap();
            let expected = (i64::from(limit)).min((n - i64::from(page - 1) * i64::from(limit)).max(0));
            assert_eq!(result.data.len() as i64, expected, "page {page}");
            assert_eq!(result.total, n);
        }
    }

    #[tokio::test]
    async fn search_is_case_insensitive_and_literal() {
        let db = Database::in_memory().await.unwrap();
        seed(&db, &["Acme Corp", "Globex", "100% Recruiting"]).await;

        let found: Page<OrgRow> = org_query()
            .search(&["o.name"], Some("acme"))
            .fetch_page(db.pool(), &ORG_SORT, &ListParams::default())
            .await
            .unwrap();
        assert_eq!(found.total, 1);
        assert_eq!(found.data[0].name, "Acme Corp");

        let wildcard: Page<OrgRow> = org_query()
            .search(&["o.name"], Some("%"))
            .fetch_page(db.pool(), &ORG_SORT, &ListParams::default())
            .await
            .unwrap();
        assert_eq!(wildcard.total, 1);
        assert_eq!(wildcard.data[0].name, "100% Recruiting");

        let dot: Page<OrgRow> = org_query()
            .search(&["o.name"], Some("."))
            .fetch_page(db.pool(), &ORG_SORT, &ListParams::default())
            .await
            .unwrap();
        assert_eq!(dot.total, 0);
    }

    #[tokio::test]
    async fn search_folds_non_ascii_case() {
        let db = Database::in_memory().await.unwrap();
        seed(&db, &["Élodie Durand", "Elodie Martin", "ÖZTÜRK Staffing"]).await;

        let accented: Page<OrgRow> = org_query()
            .search(&["o.name"], Some("élodie"))
            .fetch_page(db.pool(), &ORG_SORT, &ListParams::default())
            .await
            .unwrap();
        assert_eq!(accented.total, 1);
        assert_eq!(accented.data[0].name, "Élodie Durand");

        let upper: Page<OrgRow> = org_query()
            .search(&["o.name"], Some("öztürk"))
            .fetch_page(db.pool(), &ORG_SORT, &ListParams::default())
            .await
            .unwrap();
        assert_eq!(upper.total, 1);
    }

    #[tokio::test]
    async fn fetch_optional_distinguishes_missing_rows() {
        let db = Database::in_memory().await.unwrap();
        seed(&db, &["Acme Corp"]).await;

        let row: Option<OrgRow> = org_query()
            .equals("o.id", Some("org-0"))
            .fetch_optional(db.pool())
            .await
            .unwrap();
        assert_eq!(row.map(|r| r.id), Some("org-0".to_string()));

        let missing: Option<OrgRow> = org_query()
            .equals("o.id", Some("nope"))
            .fetch_optional(db.pool())
            .await
            .unwrap();
        assert!(missing.is_none());
    }
}
