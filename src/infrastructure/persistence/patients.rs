use crate::domain::entities::Patient;
use crate::domain::ports::patient_repository::PatientRepository;
use crate::infrastructure::http::middleware::error::ApiResult;
use crate::infrastructure::persistence::crud::{
    optional_text, parse_column, search_key, search_term, AnyQuery, Table,
};
use crate::infrastructure::persistence::Database;
use crate::shared::pagination::PageRequest;
use async_trait::async_trait;
use sqlx::any::AnyRow;
use sqlx::Row;

impl Table for Patient {
    const TABLE: &'static str = "patients";
    const COLUMNS: &'static [&'static str] = &[
        "name",
        "search_name",
        "identification_number",
        "birth_date",
        "sex",
        "phone",
        "address",
        "created_at",
        "updated_at",
        "id",
    ];
    const ORDER_BY: &'static str = "name COLLATE NOCASE";
    const NAME: &'static str = "Patient";

    fn id(&self) -> &str {
        &self.id
    }

    fn from_row(row: &AnyRow) -> Result<Self, sqlx::Error> {
        Ok(Patient {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            identification_number: row.try_get("identification_number")?,
            birth_date: row.try_get("birth_date")?,
            sex: parse_column(row, "sex")?,
            phone: optional_text(row, "phone")?,
            address: optional_text(row, "address")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }

    fn bind_columns<'q>(&'q self, query: AnyQuery<'q>) -> AnyQuery<'q> {
        query
            .bind(&self.name)
            .bind(search_key(&self.name))
            .bind(&self.identification_number)
            .bind(&self.birth_date)
            .bind(self.sex.to_string())
            .bind(self.phone.as_deref())
            .bind(self.address.as_deref())
            .bind(&self.created_at)
            .bind(&self.updated_at)
            .bind(&self.id)
    }
}

const PATIENT_SELECT: &str = "SELECT id, name, identification_number, birth_date, sex, phone,
            address, created_at, updated_at
     FROM patients";

#[async_trait]
impl PatientRepository for Database {
    async fn find_by_identification_number(&self, number: &str) -> ApiResult<Option<Patient>> {
        let sql = format!("{} WHERE identification_number = ?", PATIENT_SELECT);
        let row = sqlx::query(&sql)
            .bind(number.trim())
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(|row| Patient::from_row(&row)).transpose()?)
    }

    async fn search(
        &self,
        name: Option<&str>,
        page: PageRequest,
    ) -> ApiResult<(Vec<Patient>, i64)> {
        let term = search_term(name);

        let sql = format!(
            "{} WHERE (? IS NULL OR instr(search_name, ?) > 0)
             ORDER BY name COLLATE NOCASE
             LIMIT ? OFFSET ?",
            PATIENT_SELECT
        );
        let rows = sqlx::query(&sql)
            .bind(term.as_deref())
            .bind(term.as_deref())
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(&self.pool)
            .await?;

        let total: i64 = sqlx::query(
            "SELECT COUNT(*) AS total FROM patients
             WHERE (? IS NULL OR instr(search_name, ?) > 0)",
        )
        .bind(term.as_deref())
        .bind(term.as_deref())
        .fetch_one(&self.pool)
        .await?
        .try_get("total")?;

        let patients = rows.iter().map(Patient::from_row).collect::<Result<_, _>>()?;
        Ok((patients, total))
    }
}
