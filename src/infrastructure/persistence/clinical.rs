use std::collections::HashMap;

use crate::domain::entities::{
    Consultation, ConsultationDetails, Derivation, DerivationDetails, Prescription,
    PrescriptionDetails, Referral, ReferralDetails,
};
use crate::domain::ports::clinical_repository::{
    ConsultationQuery, ConsultationRepository, DerivationRepository, ReferralRepository,
};
use crate::infrastructure::http::middleware::error::ApiResult;
use crate::infrastructure::persistence::crud::{optional_text, parse_column, AnyQuery, Table};
use crate::infrastructure::persistence::Database;
use crate::shared::pagination::PageRequest;
use crate::shared::timestamps::now_rfc3339;
use async_trait::async_trait;
use sqlx::any::AnyRow;
use sqlx::Row;

// Derivations

impl Table for Derivation {
    const TABLE: &'static str = "derivations";
    const COLUMNS: &'static [&'static str] = &[
        "patient_id",
        "origin_department_id",
        "destination_department_id",
        "derivation_date",
        "reason",
        "created_at",
        "id",
    ];
    const ORDER_BY: &'static str = "derivation_date DESC, created_at DESC";
    const NAME: &'static str = "Derivation";

    fn id(&self) -> &str {
        &self.id
    }

    fn from_row(row: &AnyRow) -> Result<Self, sqlx::Error> {
        Ok(Derivation {
            id: row.try_get("id")?,
            patient_id: row.try_get("patient_id")?,
            origin_department_id: row.try_get("origin_department_id")?,
            destination_department_id: row.try_get("destination_department_id")?,
            derivation_date: row.try_get("derivation_date")?,
            reason: optional_text(row, "reason")?,
            created_at: row.try_get("created_at")?,
        })
    }

    fn bind_columns<'q>(&'q self, query: AnyQuery<'q>) -> AnyQuery<'q> {
        query
            .bind(&self.patient_id)
            .bind(&self.origin_department_id)
            .bind(&self.destination_department_id)
            .bind(&self.derivation_date)
            .bind(self.reason.as_deref())
            .bind(&self.created_at)
            .bind(&self.id)
    }
}

const DERIVATION_DETAILS_SELECT: &str = "SELECT d.id, d.patient_id, p.name AS patient_name,
            d.origin_department_id, o.name AS origin_department_name,
            d.destination_department_id, t.name AS destination_department_name,
            d.derivation_date, d.reason, d.created_at
     FROM derivations d
     INNER JOIN patients p ON p.id = d.patient_id
     INNER JOIN departments o ON o.id = d.origin_department_id
     INNER JOIN departments t ON t.id = d.destination_department_id";

fn derivation_details_from_row(row: &AnyRow) -> Result<DerivationDetails, sqlx::Error> {
    Ok(DerivationDetails {
        id: row.try_get("id")?,
        patient_id: row.try_get("patient_id")?,
        patient_name: row.try_get("patient_name")?,
        origin_department_id: row.try_get("origin_department_id")?,
        origin_department_name: row.try_get("origin_department_name")?,
        destination_department_id: row.try_get("destination_department_id")?,
        destination_department_name: row.try_get("destination_department_name")?,
        derivation_date: row.try_get("derivation_date")?,
        reason: optional_text(row, "reason")?,
        created_at: row.try_get("created_at")?,
    })
}

#[async_trait]
impl DerivationRepository for Database {
    async fn find_details(&self, id: &str) -> ApiResult<Option<DerivationDetails>> {
        let sql = format!("{} WHERE d.id = ?", DERIVATION_DETAILS_SELECT);
        let row = sqlx::query(&sql).bind(id).fetch_optional(&self.pool).await?;

        Ok(row.map(|row| derivation_details_from_row(&row)).transpose()?)
    }

    async fn list_details(
        &self,
        patient_id: Option<&str>,
        page: PageRequest,
    ) -> ApiResult<(Vec<DerivationDetails>, i64)> {
        let sql = format!(
            "{} WHERE (? IS NULL OR d.patient_id = ?)
             ORDER BY d.derivation_date DESC, d.created_at DESC
             LIMIT ? OFFSET ?",
            DERIVATION_DETAILS_SELECT
        );
        let rows = sqlx::query(&sql)
            .bind(patient_id)
            .bind(patient_id)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(&self.pool)
            .await?;

        let total: i64 = sqlx::query(
            "SELECT COUNT(*) AS total FROM derivations WHERE (? IS NULL OR patient_id = ?)",
        )
        .bind(patient_id)
        .bind(patient_id)
        .fetch_one(&self.pool)
        .await?
        .try_get("total")?;

        let items = rows
            .iter()
            .map(derivation_details_from_row)
            .collect::<Result<_, _>>()?;
        Ok((items, total))
    }

    async fn list_for_patient(&self, patient_id: &str) -> ApiResult<Vec<DerivationDetails>> {
        let sql = format!(
            "{} WHERE d.patient_id = ? ORDER BY d.derivation_date DESC, d.created_at DESC",
            DERIVATION_DETAILS_SELECT
        );
        let rows = sqlx::query(&sql)
            .bind(patient_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows
            .iter()
            .map(derivation_details_from_row)
            .collect::<Result<_, _>>()?)
    }
}

// Referrals

impl Table for Referral {
    const TABLE: &'static str = "referrals";
    const COLUMNS: &'static [&'static str] = &[
        "patient_id",
        "external_post",
        "destination_department_id",
        "referral_date",
        "reason",
        "created_at",
        "id",
    ];
    const ORDER_BY: &'static str = "referral_date DESC, created_at DESC";
    const NAME: &'static str = "Referral";

    fn id(&self) -> &str {
        &self.id
    }

    fn from_row(row: &AnyRow) -> Result<Self, sqlx::Error> {
        Ok(Referral {
            id: row.try_get("id")?,
            patient_id: row.try_get("patient_id")?,
            external_post: row.try_get("external_post")?,
            destination_department_id: row.try_get("destination_department_id")?,
            referral_date: row.try_get("referral_date")?,
            reason: optional_text(row, "reason")?,
            created_at: row.try_get("created_at")?,
        })
    }

    fn bind_columns<'q>(&'q self, query: AnyQuery<'q>) -> AnyQuery<'q> {
        query
            .bind(&self.patient_id)
            .bind(&self.external_post)
            .bind(&self.destination_department_id)
            .bind(&self.referral_date)
            .bind(self.reason.as_deref())
            .bind(&self.created_at)
            .bind(&self.id)
    }
}

const REFERRAL_DETAILS_SELECT: &str = "SELECT r.id, r.patient_id, p.name AS patient_name,
            r.external_post, r.destination_department_id,
            t.name AS destination_department_name, r.referral_date, r.reason, r.created_at
     FROM referrals r
     INNER JOIN patients p ON p.id = r.patient_id
     INNER JOIN departments t ON t.id = r.destination_department_id";

fn referral_details_from_row(row: &AnyRow) -> Result<ReferralDetails, sqlx::Error> {
    Ok(ReferralDetails {
        id: row.try_get("id")?,
        patient_id: row.try_get("patient_id")?,
        patient_name: row.try_get("patient_name")?,
        external_post: row.try_get("external_post")?,
        destination_department_id: row.try_get("destination_department_id")?,
        destination_department_name: row.try_get("destination_department_name")?,
        referral_date: row.try_get("referral_date")?,
        reason: optional_text(row, "reason")?,
        created_at: row.try_get("created_at")?,
    })
}

#[async_trait]
impl ReferralRepository for Database {
    async fn find_details(&self, id: &str) -> ApiResult<Option<ReferralDetails>> {
        let sql = format!("{} WHERE r.id = ?", REFERRAL_DETAILS_SELECT);
        let row = sqlx::query(&sql).bind(id).fetch_optional(&self.pool).await?;

        Ok(row.map(|row| referral_details_from_row(&row)).transpose()?)
    }

    async fn list_details(
        &self,
        patient_id: Option<&str>,
        page: PageRequest,
    ) -> ApiResult<(Vec<ReferralDetails>, i64)> {
        let sql = format!(
            "{} WHERE (? IS NULL OR r.patient_id = ?)
             ORDER BY r.referral_date DESC, r.created_at DESC
             LIMIT ? OFFSET ?",
            REFERRAL_DETAILS_SELECT
        );
        let rows = sqlx::query(&sql)
            .bind(patient_id)
            .bind(patient_id)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(&self.pool)
            .await?;

        let total: i64 = sqlx::query(
            "SELECT COUNT(*) AS total FROM referrals WHERE (? IS NULL OR patient_id = ?)",
        )
        .bind(patient_id)
        .bind(patient_id)
        .fetch_one(&self.pool)
        .await?
        .try_get("total")?;

        let items = rows
            .iter()
            .map(referral_details_from_row)
            .collect::<Result<_, _>>()?;
        Ok((items, total))
    }

    async fn list_for_patient(&self, patient_id: &str) -> ApiResult<Vec<ReferralDetails>> {
        let sql = format!(
            "{} WHERE r.patient_id = ? ORDER BY r.referral_date DESC, r.created_at DESC",
            REFERRAL_DETAILS_SELECT
        );
        let rows = sqlx::query(&sql)
            .bind(patient_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows
            .iter()
            .map(referral_details_from_row)
            .collect::<Result<_, _>>()?)
    }
}

// Consultations

impl Table for Consultation {
    const TABLE: &'static str = "consultations";
    const COLUMNS: &'static [&'static str] = &[
        "kind",
        "source_id",
        "doctor_id",
        "department_id",
        "patient_id",
        "consultation_date",
        "diagnosis",
        "treatment",
        "outcome",
        "created_at",
        "id",
    ];
    const ORDER_BY: &'static str = "consultation_date DESC, created_at DESC";
    const NAME: &'static str = "Consultation";

    fn id(&self) -> &str {
        &self.id
    }

    fn from_row(row: &AnyRow) -> Result<Self, sqlx::Error> {
        Ok(Consultation {
            id: row.try_get("id")?,
            kind: parse_column(row, "kind")?,
            source_id: row.try_get("source_id")?,
            doctor_id: row.try_get("doctor_id")?,
            department_id: row.try_get("department_id")?,
            patient_id: row.try_get("patient_id")?,
            consultation_date: row.try_get("consultation_date")?,
            diagnosis: row.try_get("diagnosis")?,
            treatment: optional_text(row, "treatment")?,
            outcome: parse_column(row, "outcome")?,
            created_at: row.try_get("created_at")?,
        })
    }

    fn bind_columns<'q>(&'q self, query: AnyQuery<'q>) -> AnyQuery<'q> {
        query
            .bind(self.kind.to_string())
            .bind(&self.source_id)
            .bind(&self.doctor_id)
            .bind(&self.department_id)
            .bind(&self.patient_id)
            .bind(&self.consultation_date)
            .bind(&self.diagnosis)
            .bind(self.treatment.as_deref())
            .bind(self.outcome.to_string())
            .bind(&self.created_at)
            .bind(&self.id)
    }
}

const CONSULTATION_DETAILS_SELECT: &str = "SELECT c.id, c.kind, c.source_id, c.doctor_id,
            doc.name AS doctor_name, c.department_id, dep.name AS department_name,
            c.patient_id, p.name AS patient_name, c.consultation_date, c.diagnosis,
            c.treatment, c.outcome, c.created_at
     FROM consultations c
     INNER JOIN doctors doc ON doc.id = c.doctor_id
     INNER JOIN departments dep ON dep.id = c.department_id
     INNER JOIN patients p ON p.id = c.patient_id";

const CONSULTATION_FILTER: &str = "(? IS NULL OR c.kind = ?)
       AND (? IS NULL OR c.doctor_id = ?)
       AND (? IS NULL OR c.patient_id = ?)";

fn consultation_details_from_row(row: &AnyRow) -> Result<ConsultationDetails, sqlx::Error> {
    Ok(ConsultationDetails {
        id: row.try_get("id")?,
        kind: parse_column(row, "kind")?,
        source_id: row.try_get("source_id")?,
        doctor_id: row.try_get("doctor_id")?,
        doctor_name: row.try_get("doctor_name")?,
        department_id: row.try_get("department_id")?,
        department_name: row.try_get("department_name")?,
        patient_id: row.try_get("patient_id")?,
        patient_name: row.try_get("patient_name")?,
        consultation_date: row.try_get("consultation_date")?,
        diagnosis: row.try_get("diagnosis")?,
        treatment: optional_text(row, "treatment")?,
        outcome: parse_column(row, "outcome")?,
        prescriptions: Vec::new(),
        created_at: row.try_get("created_at")?,
    })
}

fn bind_consultation_filter<'q>(
    query: AnyQuery<'q>,
    filter: &'q ConsultationQuery,
) -> AnyQuery<'q> {
    query
        .bind(filter.kind.as_deref())
        .bind(filter.kind.as_deref())
        .bind(filter.doctor_id.as_deref())
        .bind(filter.doctor_id.as_deref())
        .bind(filter.patient_id.as_deref())
        .bind(filter.patient_id.as_deref())
}

impl Database {
    /// Loads prescriptions for the given consultations and attaches them in place.
    async fn attach_prescriptions(
        &self,
        consultations: &mut [ConsultationDetails],
    ) -> ApiResult<()> {
        if consultations.is_empty() {
            return Ok(());
        }

        let placeholders = vec!["?"; consultations.len()].join(", ");
        let sql = format!(
            "SELECT cm.consultation_id, cm.medication_id, m.name AS medication_name, cm.quantity
             FROM consultation_medications cm
             INNER JOIN medications m ON m.id = cm.medication_id
             WHERE cm.consultation_id IN ({})
             ORDER BY m.name COLLATE NOCASE",
            placeholders
        );
        let mut query = sqlx::query(&sql);
        for consultation in consultations.iter() {
            query = query.bind(consultation.id.clone());
        }
        let rows = query.fetch_all(&self.pool).await?;

        let mut by_consultation: HashMap<String, Vec<PrescriptionDetails>> = HashMap::new();
        for row in rows {
            let consultation_id: String = row.try_get("consultation_id")?;
            by_consultation
                .entry(consultation_id)
                .or_default()
                .push(PrescriptionDetails {
                    medication_id: row.try_get("medication_id")?,
                    medication_name: row.try_get("medication_name")?,
                    quantity: row.try_get("quantity")?,
                });
        }

        for consultation in consultations.iter_mut() {
            if let Some(prescriptions) = by_consultation.remove(&consultation.id) {
                consultation.prescriptions = prescriptions;
            }
        }
        Ok(())
    }
}

#[async_trait]
impl ConsultationRepository for Database {
    async fn create_with_prescriptions(
        &self,
        consultation: &Consultation,
        prescriptions: &[Prescription],
    ) -> ApiResult<Option<String>> {
        let mut tx = self.pool.begin().await?;

        let insert_sql = format!(
            "INSERT INTO consultations ({}) VALUES ({})",
            Consultation::COLUMNS.join(", "),
            vec!["?"; Consultation::COLUMNS.len()].join(", ")
        );
        consultation
            .bind_columns(sqlx::query(&insert_sql))
            .execute(&mut *tx)
            .await?;

        let now = now_rfc3339();
        for prescription in prescriptions {
            let dispensed = sqlx::query(
                "UPDATE stock_departments
                 SET quantity = quantity - ?, updated_at = ?
                 WHERE department_id = ? AND medication_id = ? AND quantity >= ?",
            )
            .bind(prescription.quantity)
            .bind(&now)
            .bind(&consultation.department_id)
            .bind(&prescription.medication_id)
            .bind(prescription.quantity)
            .execute(&mut *tx)
            .await?;

            if dispensed.rows_affected() == 0 {
                tx.rollback().await?;
                return Ok(Some(prescription.medication_id.clone()));
            }

            sqlx::query(
                "INSERT INTO consultation_medications (consultation_id, medication_id, quantity)
                 VALUES (?, ?, ?)",
            )
            .bind(&prescription.consultation_id)
            .bind(&prescription.medication_id)
            .bind(prescription.quantity)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(None)
    }

    async fn find_details(&self, id: &str) -> ApiResult<Option<ConsultationDetails>> {
        let sql = format!("{} WHERE c.id = ?", CONSULTATION_DETAILS_SELECT);
        let row = sqlx::query(&sql).bind(id).fetch_optional(&self.pool).await?;

        let Some(row) = row else {
            return Ok(None);
        };
        let mut details = vec![consultation_details_from_row(&row)?];
        self.attach_prescriptions(&mut details).await?;
        Ok(details.pop())
    }

    async fn list_details(
        &self,
        query: &ConsultationQuery,
        page: PageRequest,
    ) -> ApiResult<(Vec<ConsultationDetails>, i64)> {
        let sql = format!(
            "{} WHERE {}
             ORDER BY c.consultation_date DESC, c.created_at DESC
             LIMIT ? OFFSET ?",
            CONSULTATION_DETAILS_SELECT, CONSULTATION_FILTER
        );
        let rows = bind_consultation_filter(sqlx::query(&sql), query)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(&self.pool)
            .await?;

        let count_sql = format!(
            "SELECT COUNT(*) AS total FROM consultations c WHERE {}",
            CONSULTATION_FILTER
        );
        let total: i64 = bind_consultation_filter(sqlx::query(&count_sql), query)
            .fetch_one(&self.pool)
            .await?
            .try_get("total")?;

        let mut items = rows
            .iter()
            .map(consultation_details_from_row)
            .collect::<Result<Vec<_>, _>>()?;
        self.attach_prescriptions(&mut items).await?;
        Ok((items, total))
    }

    async fn list_for_patient(&self, patient_id: &str) -> ApiResult<Vec<ConsultationDetails>> {
        let sql = format!(
            "{} WHERE c.patient_id = ? ORDER BY c.consultation_date DESC, c.created_at DESC",
            CONSULTATION_DETAILS_SELECT
        );
        let rows = sqlx::query(&sql)
            .bind(patient_id)
            .fetch_all(&self.pool)
            .await?;

        let mut items = rows
            .iter()
            .map(consultation_details_from_row)
            .collect::<Result<Vec<_>, _>>()?;
        self.attach_prescriptions(&mut items).await?;
        Ok(items)
    }

    async fn count_for_source(&self, kind: &str, source_id: &str) -> ApiResult<i64> {
        let row = sqlx::query(
            "SELECT COUNT(*) AS total FROM consultations WHERE kind = ? AND source_id = ?",
        )
        .bind(kind)
        .bind(source_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(row.try_get("total")?)
    }
}
