use crate::domain::entities::{Medication, StockDepartment, StockDetails};
use crate::domain::ports::medication_repository::{MedicationRepository, StockRepository};
use crate::infrastructure::http::middleware::error::ApiResult;
use crate::infrastructure::persistence::crud::{
    parse_column, search_key, search_term, AnyQuery, Table,
};
use crate::infrastructure::persistence::Database;
use crate::shared::pagination::PageRequest;
use crate::shared::timestamps::now_rfc3339;
use async_trait::async_trait;
use sqlx::any::AnyRow;
use sqlx::Row;

impl Table for Medication {
    const TABLE: &'static str = "medications";
    const COLUMNS: &'static [&'static str] = &[
        "name",
        "search_name",
        "presentation",
        "dosage_mg",
        "batch_number",
        "expiration_date",
        "warehouse_quantity",
        "min_quantity",
        "max_quantity",
        "created_at",
        "updated_at",
        "id",
    ];
    const ORDER_BY: &'static str = "name COLLATE NOCASE, expiration_date";
    const NAME: &'static str = "Medication";

    fn id(&self) -> &str {
        &self.id
    }

    fn from_row(row: &AnyRow) -> Result<Self, sqlx::Error> {
        Ok(Medication {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            presentation: parse_column(row, "presentation")?,
            dosage_mg: row.try_get("dosage_mg")?,
            batch_number: row.try_get("batch_number")?,
            expiration_date: row.try_get("expiration_date")?,
            warehouse_quantity: row.try_get("warehouse_quantity")?,
            min_quantity: row.try_get("min_quantity")?,
            max_quantity: row.try_get("max_quantity")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }

    fn bind_columns<'q>(&'q self, query: AnyQuery<'q>) -> AnyQuery<'q> {
        query
            .bind(&self.name)
            .bind(search_key(&self.name))
            .bind(self.presentation.to_string())
            .bind(self.dosage_mg)
            .bind(&self.batch_number)
            .bind(&self.expiration_date)
            .bind(self.warehouse_quantity)
            .bind(self.min_quantity)
            .bind(self.max_quantity)
            .bind(&self.created_at)
            .bind(&self.updated_at)
            .bind(&self.id)
    }
}

impl Table for StockDepartment {
    const TABLE: &'static str = "stock_departments";
    const COLUMNS: &'static [&'static str] = &[
        "department_id",
        "medication_id",
        "quantity",
        "min_quantity",
        "max_quantity",
        "updated_at",
        "id",
    ];
    const ORDER_BY: &'static str = "department_id, medication_id";
    const NAME: &'static str = "Stock entry";

    fn id(&self) -> &str {
        &self.id
    }

    fn from_row(row: &AnyRow) -> Result<Self, sqlx::Error> {
        Ok(StockDepartment {
            id: row.try_get("id")?,
            department_id: row.try_get("department_id")?,
            medication_id: row.try_get("medication_id")?,
            quantity: row.try_get("quantity")?,
            min_quantity: row.try_get("min_quantity")?,
            max_quantity: row.try_get("max_quantity")?,
            updated_at: row.try_get("updated_at")?,
        })
    }

    fn bind_columns<'q>(&'q self, query: AnyQuery<'q>) -> AnyQuery<'q> {
        query
            .bind(&self.department_id)
            .bind(&self.medication_id)
            .bind(self.quantity)
            .bind(self.min_quantity)
            .bind(self.max_quantity)
            .bind(&self.updated_at)
            .bind(&self.id)
    }
}

const MEDICATION_SELECT: &str = "SELECT id, name, presentation, dosage_mg, batch_number,
            expiration_date, warehouse_quantity, min_quantity, max_quantity,
            created_at, updated_at
     FROM medications";

const STOCK_SELECT: &str = "SELECT id, department_id, medication_id, quantity, min_quantity,
            max_quantity, updated_at
     FROM stock_departments";

fn stock_details_from_row(row: &AnyRow) -> Result<StockDetails, sqlx::Error> {
    let quantity: i64 = row.try_get("quantity")?;
    let min_quantity: i64 = row.try_get("min_quantity")?;
    Ok(StockDetails {
        id: row.try_get("id")?,
        department_id: row.try_get("department_id")?,
        medication_id: row.try_get("medication_id")?,
        medication_name: row.try_get("medication_name")?,
        quantity,
        min_quantity,
        max_quantity: row.try_get("max_quantity")?,
        below_minimum: quantity < min_quantity,
        updated_at: row.try_get("updated_at")?,
    })
}

#[async_trait]
impl MedicationRepository for Database {
    async fn search(
        &self,
        name: Option<&str>,
        page: PageRequest,
    ) -> ApiResult<(Vec<Medication>, i64)> {
        let term = search_term(name);

        let sql = format!(
            "{} WHERE (? IS NULL OR instr(search_name, ?) > 0)
             ORDER BY name COLLATE NOCASE, expiration_date
             LIMIT ? OFFSET ?",
            MEDICATION_SELECT
        );
        let rows = sqlx::query(&sql)
            .bind(term.as_deref())
            .bind(term.as_deref())
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(&self.pool)
            .await?;

        let total: i64 = sqlx::query(
            "SELECT COUNT(*) AS total FROM medications
             WHERE (? IS NULL OR instr(search_name, ?) > 0)",
        )
        .bind(term.as_deref())
        .bind(term.as_deref())
        .fetch_one(&self.pool)
        .await?
        .try_get("total")?;

        let medications = rows
            .iter()
            .map(Medication::from_row)
            .collect::<Result<_, _>>()?;
        Ok((medications, total))
    }

    async fn find_by_name_and_batch(
        &self,
        name: &str,
        batch_number: &str,
    ) -> ApiResult<Option<Medication>> {
        let sql = format!("{} WHERE name = ? AND batch_number = ?", MEDICATION_SELECT);
        let row = sqlx::query(&sql)
            .bind(name)
            .bind(batch_number)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(|row| Medication::from_row(&row)).transpose()?)
    }

    async fn list_expiring_before(&self, date: &str) -> ApiResult<Vec<Medication>> {
        let sql = format!(
            "{} WHERE expiration_date < ? ORDER BY expiration_date, name COLLATE NOCASE",
            MEDICATION_SELECT
        );
        let rows = sqlx::query(&sql).bind(date).fetch_all(&self.pool).await?;

        Ok(rows
            .iter()
            .map(Medication::from_row)
            .collect::<Result<_, _>>()?)
    }

    async fn list_below_minimum(&self) -> ApiResult<Vec<Medication>> {
        let sql = format!(
            "{} WHERE warehouse_quantity < min_quantity
             ORDER BY (min_quantity - warehouse_quantity) DESC, name COLLATE NOCASE",
            MEDICATION_SELECT
        );
        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;

        Ok(rows
            .iter()
            .map(Medication::from_row)
            .collect::<Result<_, _>>()?)
    }
}

#[async_trait]
impl StockRepository for Database {
    async fn find_for(
        &self,
        department_id: &str,
        medication_id: &str,
    ) -> ApiResult<Option<StockDepartment>> {
        let sql = format!(
            "{} WHERE department_id = ? AND medication_id = ?",
            STOCK_SELECT
        );
        let row = sqlx::query(&sql)
            .bind(department_id)
            .bind(medication_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(|row| StockDepartment::from_row(&row)).transpose()?)
    }

    async fn list_by_department(&self, department_id: &str) -> ApiResult<Vec<StockDetails>> {
        let rows = sqlx::query(
            "SELECT s.id, s.department_id, s.medication_id, m.name AS medication_name,
                    s.quantity, s.min_quantity, s.max_quantity, s.updated_at
             FROM stock_departments s
             INNER JOIN medications m ON m.id = s.medication_id
             WHERE s.department_id = ?
             ORDER BY m.name COLLATE NOCASE",
        )
        .bind(department_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .iter()
            .map(stock_details_from_row)
            .collect::<Result<_, _>>()?)
    }

    async fn adjust_quantity(&self, id: &str, delta: i64) -> ApiResult<Option<StockDepartment>> {
        let mut tx = self.pool.begin().await?;

        // The guard keeps the quantity from going negative
        let result = sqlx::query(
            "UPDATE stock_departments
             SET quantity = quantity + ?, updated_at = ?
             WHERE id = ? AND quantity + ? >= 0",
        )
        .bind(delta)
        .bind(now_rfc3339())
        .bind(id)
        .bind(delta)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            tx.rollback().await?;
            return Ok(None);
        }

        let sql = format!("{} WHERE id = ?", STOCK_SELECT);
        let row = sqlx::query(&sql).bind(id).fetch_one(&mut *tx).await?;
        let stock = StockDepartment::from_row(&row)?;

        tx.commit().await?;
        Ok(Some(stock))
    }
}
