use std::collections::HashMap;

use crate::domain::entities::{
    RequestStatus, WarehouseRequest, WarehouseRequestDetails, WarehouseRequestItem,
    WarehouseRequestItemDetails,
};
use crate::domain::ports::warehouse_repository::{ApprovalOutcome, WarehouseRepository};
use crate::infrastructure::http::middleware::error::ApiResult;
use crate::infrastructure::persistence::crud::{optional_text, parse_column};
use crate::infrastructure::persistence::Database;
use crate::shared::pagination::PageRequest;
use async_trait::async_trait;
use sqlx::any::AnyRow;
use sqlx::Row;
use uuid::Uuid;

const DETAILS_SELECT: &str = "SELECT w.id, w.department_id, d.name AS department_name, w.status,
            w.requested_at, w.resolved_at, w.notes
     FROM warehouse_requests w
     INNER JOIN departments d ON d.id = w.department_id";

fn details_from_row(row: &AnyRow) -> Result<WarehouseRequestDetails, sqlx::Error> {
    Ok(WarehouseRequestDetails {
        id: row.try_get("id")?,
        department_id: row.try_get("department_id")?,
        department_name: row.try_get("department_name")?,
        status: parse_column(row, "status")?,
        requested_at: row.try_get("requested_at")?,
        resolved_at: optional_text(row, "resolved_at")?,
        notes: optional_text(row, "notes")?,
        items: Vec::new(),
    })
}

impl Database {
    async fn attach_request_items(
        &self,
        requests: &mut [WarehouseRequestDetails],
    ) -> ApiResult<()> {
        if requests.is_empty() {
            return Ok(());
        }

        let placeholders = vec!["?"; requests.len()].join(", ");
        let sql = format!(
            "SELECT i.request_id, i.medication_id, m.name AS medication_name, i.quantity
             FROM warehouse_request_items i
             INNER JOIN medications m ON m.id = i.medication_id
             WHERE i.request_id IN ({})
             ORDER BY m.name COLLATE NOCASE",
            placeholders
        );
        let mut query = sqlx::query(&sql);
        for request in requests.iter() {
            query = query.bind(request.id.clone());
        }
        let rows = query.fetch_all(&self.pool).await?;

        let mut by_request: HashMap<String, Vec<WarehouseRequestItemDetails>> = HashMap::new();
        for row in rows {
            let request_id: String = row.try_get("request_id")?;
            by_request
                .entry(request_id)
                .or_default()
                .push(WarehouseRequestItemDetails {
                    medication_id: row.try_get("medication_id")?,
                    medication_name: row.try_get("medication_name")?,
                    quantity: row.try_get("quantity")?,
                });
        }

        for request in requests.iter_mut() {
            if let Some(items) = by_request.remove(&request.id) {
                request.items = items;
            }
        }
        Ok(())
    }
}

#[async_trait]
impl WarehouseRepository for Database {
    async fn create_request(&self, request: &WarehouseRequest) -> ApiResult<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "INSERT INTO warehouse_requests
                (id, department_id, status, requested_at, resolved_at, notes)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&request.id)
        .bind(&request.department_id)
        .bind(request.status.to_string())
        .bind(&request.requested_at)
        .bind(request.resolved_at.as_deref())
        .bind(request.notes.as_deref())
        .execute(&mut *tx)
        .await?;

        for item in &request.items {
            sqlx::query(
                "INSERT INTO warehouse_request_items (request_id, medication_id, quantity)
                 VALUES (?, ?, ?)",
            )
            .bind(&request.id)
            .bind(&item.medication_id)
            .bind(item.quantity)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn find_request(&self, id: &str) -> ApiResult<Option<WarehouseRequest>> {
        let row = sqlx::query(
            "SELECT id, department_id, status, requested_at, resolved_at, notes
             FROM warehouse_requests
             WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let item_rows = sqlx::query(
            "SELECT medication_id, quantity FROM warehouse_request_items WHERE request_id = ?",
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        let items = item_rows
            .iter()
            .map(|r| {
                Ok(WarehouseRequestItem {
                    medication_id: r.try_get("medication_id")?,
                    quantity: r.try_get("quantity")?,
                })
            })
            .collect::<Result<Vec<_>, sqlx::Error>>()?;

        Ok(Some(WarehouseRequest {
            id: row.try_get("id")?,
            department_id: row.try_get("department_id")?,
            status: parse_column(&row, "status")?,
            requested_at: row.try_get("requested_at")?,
            resolved_at: optional_text(&row, "resolved_at")?,
            notes: optional_text(&row, "notes")?,
            items,
        }))
    }

    async fn find_details(&self, id: &str) -> ApiResult<Option<WarehouseRequestDetails>> {
        let sql = format!("{} WHERE w.id = ?", DETAILS_SELECT);
        let row = sqlx::query(&sql).bind(id).fetch_optional(&self.pool).await?;

        let Some(row) = row else {
            return Ok(None);
        };
        let mut details = vec![details_from_row(&row)?];
        self.attach_request_items(&mut details).await?;
        Ok(details.pop())
    }

    async fn list_details(
        &self,
        department_id: Option<&str>,
        status: Option<RequestStatus>,
        page: PageRequest,
    ) -> ApiResult<(Vec<WarehouseRequestDetails>, i64)> {
        let status = status.map(|s| s.to_string());

        let sql = format!(
            "{} WHERE (? IS NULL OR w.department_id = ?) AND (? IS NULL OR w.status = ?)
             ORDER BY w.requested_at DESC
             LIMIT ? OFFSET ?",
            DETAILS_SELECT
        );
        let rows = sqlx::query(&sql)
            .bind(department_id)
            .bind(department_id)
            .bind(status.as_deref())
            .bind(status.as_deref())
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(&self.pool)
            .await?;

        let total: i64 = sqlx::query(
            "SELECT COUNT(*) AS total FROM warehouse_requests
             WHERE (? IS NULL OR department_id = ?) AND (? IS NULL OR status = ?)",
        )
        .bind(department_id)
        .bind(department_id)
        .bind(status.as_deref())
        .bind(status.as_deref())
        .fetch_one(&self.pool)
        .await?
        .try_get("total")?;

        let mut items = rows
            .iter()
            .map(details_from_row)
            .collect::<Result<Vec<_>, _>>()?;
        self.attach_request_items(&mut items).await?;
        Ok((items, total))
    }

    async fn approve_request(&self, id: &str, resolved_at: &str) -> ApiResult<ApprovalOutcome> {
        let mut tx = self.pool.begin().await?;

        // Only a pending request can be claimed
        let claimed = sqlx::query(
            "UPDATE warehouse_requests SET status = 'approved', resolved_at = ?
             WHERE id = ? AND status = 'pending'",
        )
        .bind(resolved_at)
        .bind(id)
        .execute(&mut *tx)
        .await?;

        let header =
            sqlx::query("SELECT department_id, status FROM warehouse_requests WHERE id = ?")
                .bind(id)
                .fetch_one(&mut *tx)
                .await?;
        let department_id: String = header.try_get("department_id")?;

        if claimed.rows_affected() == 0 {
            let status: RequestStatus = parse_column(&header, "status")?;
            tx.rollback().await?;
            return Ok(ApprovalOutcome::NotPending(status));
        }

        let item_rows = sqlx::query(
            "SELECT medication_id, quantity FROM warehouse_request_items WHERE request_id = ?",
        )
        .bind(id)
        .fetch_all(&mut *tx)
        .await?;

        for item in &item_rows {
            let medication_id: String = item.try_get("medication_id")?;
            let quantity: i64 = item.try_get("quantity")?;

            let taken = sqlx::query(
                "UPDATE medications
                 SET warehouse_quantity = warehouse_quantity - ?, updated_at = ?
                 WHERE id = ? AND warehouse_quantity >= ?",
            )
            .bind(quantity)
            .bind(resolved_at)
            .bind(&medication_id)
            .bind(quantity)
            .execute(&mut *tx)
            .await?;

            if taken.rows_affected() == 0 {
                tx.rollback().await?;
                return Ok(ApprovalOutcome::InsufficientWarehouseStock { medication_id });
            }

            // New rows start with min 0 and max equal to the delivered quantity;
            // existing rows raise max when the delivery overflows it.
            sqlx::query(
                "INSERT INTO stock_departments
                    (id, department_id, medication_id, quantity, min_quantity, max_quantity,
                     updated_at)
                 VALUES (?, ?, ?, ?, 0, ?, ?)
                 ON CONFLICT(department_id, medication_id) DO UPDATE SET
                    quantity = stock_departments.quantity + excluded.quantity,
                    max_quantity = MAX(stock_departments.max_quantity,
                                       stock_departments.quantity + excluded.quantity),
                    updated_at = excluded.updated_at",
            )
            .bind(Uuid::new_v4().to_string())
            .bind(&department_id)
            .bind(&medication_id)
            .bind(quantity)
            .bind(quantity)
            .bind(resolved_at)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(ApprovalOutcome::Approved)
    }

    async fn reject_request(
        &self,
        id: &str,
        resolved_at: &str,
        notes: Option<&str>,
    ) -> ApiResult<bool> {
        let result = sqlx::query(
            "UPDATE warehouse_requests
             SET status = 'rejected', resolved_at = ?, notes = COALESCE(?, notes)
             WHERE id = ? AND status = 'pending'",
        )
        .bind(resolved_at)
        .bind(notes)
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_pending_request(&self, id: &str) -> ApiResult<bool> {
        let result =
            sqlx::query("DELETE FROM warehouse_requests WHERE id = ? AND status = 'pending'")
                .bind(id)
                .execute(&self.pool)
                .await?;
        Ok(result.rows_affected() > 0)
    }
}
