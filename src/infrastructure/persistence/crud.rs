use crate::domain::ports::repository::CrudRepository;
use crate::infrastructure::http::middleware::error::ApiResult;
use crate::infrastructure::persistence::Database;
use crate::shared::pagination::PageRequest;
use async_trait::async_trait;
use sqlx::any::{AnyArguments, AnyRow};
use sqlx::query::Query;
use sqlx::{Any, Row, ValueRef};
use std::str::FromStr;

pub type AnyQuery<'q> = Query<'q, Any, AnyArguments<'q>>;

/// Row mapping for a flat table keyed by a TEXT `id` column.
pub trait Table: Sized + Send + Sync + Unpin + 'static {
    const TABLE: &'static str;
    /// Every persisted column, with `id` last.
    const COLUMNS: &'static [&'static str];
    const ORDER_BY: &'static str;
    /// Human name used in not-found messages.
    const NAME: &'static str;

    fn id(&self) -> &str;
    fn from_row(row: &AnyRow) -> Result<Self, sqlx::Error>;
    /// Binds the values in `COLUMNS` order.
    fn bind_columns<'q>(&'q self, query: AnyQuery<'q>) -> AnyQuery<'q>;
}

/// Reads a TEXT column into a type parsed with `FromStr`.
pub(crate) fn parse_column<T>(row: &AnyRow, column: &str) -> Result<T, sqlx::Error>
where
    T: FromStr<Err = String>,
{
    let raw: String = row.try_get(column)?;
    raw.parse().map_err(|e: String| sqlx::Error::ColumnDecode {
        index: column.to_string(),
        source: e.into(),
    })
}

/// Reads a nullable TEXT column; SQL NULL becomes `None`.
pub(crate) fn optional_text(row: &AnyRow, column: &str) -> Result<Option<String>, sqlx::Error> {
    if row.try_get_raw(column)?.is_null() {
        return Ok(None);
    }
    row.try_get::<String, _>(column).map(Some)
}

/// Case-folded form of a name, stored alongside it for substring search.
pub(crate) fn search_key(value: &str) -> String {
    value.trim().to_lowercase()
}

/// Search term for an optional `?q=` filter; blank means no filter.
pub(crate) fn search_term(query: Option<&str>) -> Option<String> {
    query
        .map(str::trim)
        .filter(|q| !q.is_empty())
        .map(search_key)
}

pub(crate) fn flag(row: &AnyRow, column: &str) -> Result<bool, sqlx::Error> {
    Ok(row.try_get::<i64, _>(column)? != 0)
}

fn column_list<T: Table>() -> String {
    T::COLUMNS.join(", ")
}

#[async_trait]
impl<T: Table> CrudRepository<T> for Database {
    async fn find_by_id(&self, id: &str) -> ApiResult<Option<T>> {
        let sql = format!(
            "SELECT {} FROM {} WHERE id = ?",
            column_list::<T>(),
            T::TABLE
        );
        let row = sqlx::query(&sql).bind(id).fetch_optional(&self.pool).await?;

        Ok(row.map(|row| T::from_row(&row)).transpose()?)
    }

    async fn list(&self, page: PageRequest) -> ApiResult<Vec<T>> {
        let sql = format!(
            "SELECT {} FROM {} ORDER BY {} LIMIT ? OFFSET ?",
            column_list::<T>(),
            T::TABLE,
            T::ORDER_BY
        );
        let rows = sqlx::query(&sql)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.iter().map(T::from_row).collect::<Result<_, _>>()?)
    }

    async fn count(&self) -> ApiResult<i64> {
        let sql = format!("SELECT COUNT(*) AS total FROM {}", T::TABLE);
        let row = sqlx::query(&sql).fetch_one(&self.pool).await?;
        Ok(row.try_get("total")?)
    }

    async fn exists(&self, id: &str) -> ApiResult<bool> {
        let sql = format!("SELECT COUNT(*) AS total FROM {} WHERE id = ?", T::TABLE);
        let row = sqlx::query(&sql).bind(id).fetch_one(&self.pool).await?;
        Ok(row.try_get::<i64, _>("total")? > 0)
    }

    async fn insert(&self, entity: &T) -> ApiResult<()> {
        let placeholders = vec!["?"; T::COLUMNS.len()].join(", ");
        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            T::TABLE,
            column_list::<T>(),
            placeholders
        );
        entity
            .bind_columns(sqlx::query(&sql))
            .execute(&self.pool)
            .await?;
        tracing::debug!("Inserted {} {}", T::NAME, entity.id());
        Ok(())
    }

    async fn update(&self, entity: &T) -> ApiResult<bool> {
        // `id` is the last column, so the same bind order serves the WHERE clause
        let assignments = T::COLUMNS
            .iter()
            .filter(|c| **c != "id")
            .map(|c| format!("{} = ?", c))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!("UPDATE {} SET {} WHERE id = ?", T::TABLE, assignments);
        let result = entity
            .bind_columns(sqlx::query(&sql))
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            tracing::debug!("{} {} not updated: no such row", T::NAME, entity.id());
        }
        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, id: &str) -> ApiResult<bool> {
        let sql = format!("DELETE FROM {} WHERE id = ?", T::TABLE);
        let result = sqlx::query(&sql).bind(id).execute(&self.pool).await?;
        Ok(result.rows_affected() > 0)
    }
}
