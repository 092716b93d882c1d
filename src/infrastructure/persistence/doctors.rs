use crate::domain::entities::Doctor;
use crate::domain::ports::doctor_repository::DoctorRepository;
use crate::infrastructure::http::middleware::error::ApiResult;
use crate::infrastructure::persistence::crud::{AnyQuery, Table};
use crate::infrastructure::persistence::Database;
use crate::shared::pagination::PageRequest;
use async_trait::async_trait;
use sqlx::any::AnyRow;
use sqlx::Row;

impl Table for Doctor {
    const TABLE: &'static str = "doctors";
    const COLUMNS: &'static [&'static str] = &[
        "name",
        "specialty",
        "department_id",
        "license_number",
        "created_at",
        "updated_at",
        "id",
    ];
    const ORDER_BY: &'static str = "name COLLATE NOCASE";
    const NAME: &'static str = "Doctor";

    fn id(&self) -> &str {
        &self.id
    }

    fn from_row(row: &AnyRow) -> Result<Self, sqlx::Error> {
        Ok(Doctor {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            specialty: row.try_get("specialty")?,
            department_id: row.try_get("department_id")?,
            license_number: row.try_get("license_number")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }

    fn bind_columns<'q>(&'q self, query: AnyQuery<'q>) -> AnyQuery<'q> {
        query
            .bind(&self.name)
            .bind(&self.specialty)
            .bind(&self.department_id)
            .bind(&self.license_number)
            .bind(&self.created_at)
            .bind(&self.updated_at)
            .bind(&self.id)
    }
}

const DOCTOR_SELECT: &str =
    "SELECT id, name, specialty, department_id, license_number, created_at, updated_at
     FROM doctors";

#[async_trait]
impl DoctorRepository for Database {
    async fn find_by_license_number(&self, license_number: &str) -> ApiResult<Option<Doctor>> {
        let sql = format!("{} WHERE license_number = ?", DOCTOR_SELECT);
        let row = sqlx::query(&sql)
            .bind(license_number)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(|row| Doctor::from_row(&row)).transpose()?)
    }

    async fn list_by_department(&self, department_id: &str) -> ApiResult<Vec<Doctor>> {
        let sql = format!(
            "{} WHERE department_id = ? ORDER BY name COLLATE NOCASE",
            DOCTOR_SELECT
        );
        let rows = sqlx::query(&sql)
            .bind(department_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.iter().map(Doctor::from_row).collect::<Result<_, _>>()?)
    }

    async fn list_filtered(
        &self,
        department_id: Option<&str>,
        page: PageRequest,
    ) -> ApiResult<(Vec<Doctor>, i64)> {
        let sql = format!(
            "{} WHERE (? IS NULL OR department_id = ?)
             ORDER BY name COLLATE NOCASE
             LIMIT ? OFFSET ?",
            DOCTOR_SELECT
        );
        let rows = sqlx::query(&sql)
            .bind(department_id)
            .bind(department_id)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(&self.pool)
            .await?;

        let total: i64 = sqlx::query(
            "SELECT COUNT(*) AS total FROM doctors WHERE (? IS NULL OR department_id = ?)",
        )
        .bind(department_id)
        .bind(department_id)
        .fetch_one(&self.pool)
        .await?
        .try_get("total")?;

        let doctors = rows.iter().map(Doctor::from_row).collect::<Result<_, _>>()?;
        Ok((doctors, total))
    }
}
