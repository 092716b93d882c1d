use crate::domain::entities::{Department, DepartmentHead, DepartmentHeadDetails};
use crate::domain::ports::department_repository::DepartmentRepository;
use crate::infrastructure::http::middleware::error::ApiResult;
use crate::infrastructure::persistence::crud::{optional_text, AnyQuery, Table};
use crate::infrastructure::persistence::Database;
use async_trait::async_trait;
use sqlx::any::AnyRow;
use sqlx::Row;

impl Table for Department {
    const TABLE: &'static str = "departments";
    const COLUMNS: &'static [&'static str] =
        &["name", "description", "created_at", "updated_at", "id"];
    const ORDER_BY: &'static str = "name COLLATE NOCASE";
    const NAME: &'static str = "Department";

    fn id(&self) -> &str {
        &self.id
    }

    fn from_row(row: &AnyRow) -> Result<Self, sqlx::Error> {
        Ok(Department {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            description: optional_text(row, "description")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }

    fn bind_columns<'q>(&'q self, query: AnyQuery<'q>) -> AnyQuery<'q> {
        query
            .bind(&self.name)
            .bind(self.description.as_deref())
            .bind(&self.created_at)
            .bind(&self.updated_at)
            .bind(&self.id)
    }
}

const HEAD_DETAILS_SELECT: &str =
    "SELECT h.id, h.doctor_id, d.name AS doctor_name, h.department_id,
            dep.name AS department_name, h.appointed_at
     FROM department_heads h
     INNER JOIN doctors d ON d.id = h.doctor_id
     INNER JOIN departments dep ON dep.id = h.department_id";

fn head_details_from_row(row: &AnyRow) -> Result<DepartmentHeadDetails, sqlx::Error> {
    Ok(DepartmentHeadDetails {
        id: row.try_get("id")?,
        doctor_id: row.try_get("doctor_id")?,
        doctor_name: row.try_get("doctor_name")?,
        department_id: row.try_get("department_id")?,
        department_name: row.try_get("department_name")?,
        appointed_at: row.try_get("appointed_at")?,
    })
}

#[async_trait]
impl DepartmentRepository for Database {
    async fn find_by_name(&self, name: &str) -> ApiResult<Option<Department>> {
        let row = sqlx::query(
            "SELECT id, name, description, created_at, updated_at
             FROM departments
             WHERE name = ? COLLATE NOCASE",
        )
        .bind(name.trim())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|row| Department::from_row(&row)).transpose()?)
    }

    async fn find_head(&self, department_id: &str) -> ApiResult<Option<DepartmentHeadDetails>> {
        let sql = format!("{} WHERE h.department_id = ?", HEAD_DETAILS_SELECT);
        let row = sqlx::query(&sql)
            .bind(department_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(|row| head_details_from_row(&row)).transpose()?)
    }

    async fn list_heads(&self) -> ApiResult<Vec<DepartmentHeadDetails>> {
        let sql = format!("{} ORDER BY dep.name COLLATE NOCASE", HEAD_DETAILS_SELECT);
        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;

        Ok(rows
            .iter()
            .map(head_details_from_row)
            .collect::<Result<_, _>>()?)
    }

    async fn replace_head(&self, head: &DepartmentHead) -> ApiResult<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM department_heads WHERE department_id = ?")
            .bind(&head.department_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query(
            "INSERT INTO department_heads (id, doctor_id, department_id, appointed_at)
             VALUES (?, ?, ?, ?)",
        )
        .bind(&head.id)
        .bind(&head.doctor_id)
        .bind(&head.department_id)
        .bind(&head.appointed_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn remove_head(&self, department_id: &str) -> ApiResult<bool> {
        let result = sqlx::query("DELETE FROM department_heads WHERE department_id = ?")
            .bind(department_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
