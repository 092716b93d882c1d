use crate::domain::entities::{
    ConsultationFact, ConsumptionRow, DashboardSummary, DerivationFact, MonthlyCount,
};
use crate::domain::ports::analytics_repository::AnalyticsRepository;
use crate::infrastructure::http::middleware::error::ApiResult;
use crate::infrastructure::persistence::crud::flag;
use crate::infrastructure::persistence::Database;
use async_trait::async_trait;
use sqlx::Row;

#[async_trait]
impl AnalyticsRepository for Database {
    async fn consultation_facts(
        &self,
        from: &str,
        to: &str,
        department_id: Option<&str>,
    ) -> ApiResult<Vec<ConsultationFact>> {
        let rows = sqlx::query(
            "SELECT c.doctor_id, doc.name AS doctor_name, c.department_id,
                    dep.name AS department_name, c.patient_id, c.consultation_date,
                    CASE WHEN c.outcome = 'derived' THEN 1 ELSE 0 END AS derived
             FROM consultations c
             INNER JOIN doctors doc ON doc.id = c.doctor_id
             INNER JOIN departments dep ON dep.id = c.department_id
             WHERE c.consultation_date >= ? AND c.consultation_date <= ?
               AND (? IS NULL OR c.department_id = ?)
             ORDER BY c.consultation_date",
        )
        .bind(from)
        .bind(to)
        .bind(department_id)
        .bind(department_id)
        .fetch_all(&self.pool)
        .await?;

        let mut facts = Vec::with_capacity(rows.len());
        for row in rows {
            facts.push(ConsultationFact {
                doctor_id: row.try_get("doctor_id")?,
                doctor_name: row.try_get("doctor_name")?,
                department_id: row.try_get("department_id")?,
                department_name: row.try_get("department_name")?,
                patient_id: row.try_get("patient_id")?,
                consultation_date: row.try_get("consultation_date")?,
                derived: flag(&row, "derived")?,
            });
        }
        Ok(facts)
    }

    async fn derivation_facts(&self, from: &str, to: &str) -> ApiResult<Vec<DerivationFact>> {
        let rows = sqlx::query(
            "SELECT patient_id, origin_department_id, derivation_date
             FROM derivations
             WHERE derivation_date >= ? AND derivation_date <= ?
             ORDER BY derivation_date",
        )
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await?;

        let mut facts = Vec::with_capacity(rows.len());
        for row in rows {
            facts.push(DerivationFact {
                patient_id: row.try_get("patient_id")?,
                origin_department_id: row.try_get("origin_department_id")?,
                derivation_date: row.try_get("derivation_date")?,
            });
        }
        Ok(facts)
    }

    async fn monthly_counts(
        &self,
        from: &str,
        to: &str,
        department_id: Option<&str>,
    ) -> ApiResult<Vec<MonthlyCount>> {
        let rows = sqlx::query(
            "SELECT c.department_id, dep.name AS department_name,
                    substr(c.consultation_date, 1, 7) AS month,
                    COUNT(*) AS consultations
             FROM consultations c
             INNER JOIN departments dep ON dep.id = c.department_id
             WHERE c.consultation_date >= ? AND c.consultation_date <= ?
               AND (? IS NULL OR c.department_id = ?)
             GROUP BY c.department_id, dep.name, substr(c.consultation_date, 1, 7)
             ORDER BY dep.name, month",
        )
        .bind(from)
        .bind(to)
        .bind(department_id)
        .bind(department_id)
        .fetch_all(&self.pool)
        .await?;

        let mut counts = Vec::with_capacity(rows.len());
        for row in rows {
            counts.push(MonthlyCount {
                department_id: row.try_get("department_id")?,
                department_name: row.try_get("department_name")?,
                month: row.try_get("month")?,
                consultations: row.try_get("consultations")?,
            });
        }
        Ok(counts)
    }

    async fn consumption_rows(
        &self,
        from: &str,
        to: &str,
        department_id: Option<&str>,
    ) -> ApiResult<Vec<ConsumptionRow>> {
        let rows = sqlx::query(
            "SELECT cm.medication_id, m.name AS medication_name,
                    c.department_id, dep.name AS department_name,
                    COALESCE(SUM(cm.quantity), 0) AS quantity,
                    COUNT(DISTINCT cm.consultation_id) AS consultations
             FROM consultation_medications cm
             INNER JOIN consultations c ON c.id = cm.consultation_id
             INNER JOIN medications m ON m.id = cm.medication_id
             INNER JOIN departments dep ON dep.id = c.department_id
             WHERE c.consultation_date >= ? AND c.consultation_date <= ?
               AND (? IS NULL OR c.department_id = ?)
             GROUP BY cm.medication_id, m.name, c.department_id, dep.name",
        )
        .bind(from)
        .bind(to)
        .bind(department_id)
        .bind(department_id)
        .fetch_all(&self.pool)
        .await?;

        let mut consumption = Vec::with_capacity(rows.len());
        for row in rows {
            consumption.push(ConsumptionRow {
                medication_id: row.try_get("medication_id")?,
                medication_name: row.try_get("medication_name")?,
                department_id: row.try_get("department_id")?,
                department_name: row.try_get("department_name")?,
                quantity: row.try_get("quantity")?,
                consultations: row.try_get("consultations")?,
            });
        }
        Ok(consumption)
    }

    async fn department_names(
        &self,
        department_id: Option<&str>,
    ) -> ApiResult<Vec<(String, String)>> {
        let rows = sqlx::query(
            "SELECT id, name FROM departments
             WHERE (? IS NULL OR id = ?)
             ORDER BY name COLLATE NOCASE",
        )
        .bind(department_id)
        .bind(department_id)
        .fetch_all(&self.pool)
        .await?;

        let mut names = Vec::with_capacity(rows.len());
        for row in rows {
            names.push((row.try_get("id")?, row.try_get("name")?));
        }
        Ok(names)
    }

    async fn dashboard_summary(&self) -> ApiResult<DashboardSummary> {
        let row = sqlx::query(
            "SELECT
                (SELECT COUNT(*) FROM patients) AS patients,
                (SELECT COUNT(*) FROM doctors) AS doctors,
                (SELECT COUNT(*) FROM departments) AS departments,
                (SELECT COUNT(*) FROM warehouse_requests
                    WHERE status = 'pending') AS pending_requests,
                (SELECT COUNT(*) FROM medications
                    WHERE warehouse_quantity < min_quantity) AS below_minimum",
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(DashboardSummary {
            patients: row.try_get("patients")?,
            doctors: row.try_get("doctors")?,
            departments: row.try_get("departments")?,
            pending_warehouse_requests: row.try_get("pending_requests")?,
            medications_below_minimum: row.try_get("below_minimum")?,
        })
    }
}
