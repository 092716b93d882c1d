mod helpers;

use helpers::*;
use polyclinic::domain::entities::{
    AdjustStockRequest, CreateWarehouseRequest, MedicationFilter, RequestStatus, ResolveRequest,
    WarehouseRequestFilter, WarehouseRequestItem,
};
use polyclinic::infrastructure::http::middleware::ApiError;
use polyclinic::shared::pagination::PageRequest;

fn request_for(department_id: &str, items: &[(&str, i64)]) -> CreateWarehouseRequest {
    CreateWarehouseRequest {
        department_id: department_id.to_string(),
        notes: Some("Monthly replenishment".to_string()),
        items: items
            .iter()
            .map(|(medication_id, quantity)| WarehouseRequestItem {
                medication_id: medication_id.to_string(),
                quantity: *quantity,
            })
            .collect(),
    }
}

#[tokio::test]
async fn test_approval_moves_stock_into_department() {
    let (db, state) = setup_test_state().await;

    let pharmacy = create_test_department(&state, "Pediatrics").await;
    let paracetamol = create_test_medication(&state, "Paracetamol", 200).await;
    let ibuprofen = create_test_medication(&state, "Ibuprofen", 50).await;
    // Existing stock row for one medication only
    stock_department(&state, &pharmacy.id, &ibuprofen.id, 5).await;

    let created = state
        .warehouse_service
        .create(request_for(
            &pharmacy.id,
            &[(&paracetamol.id, 30), (&ibuprofen.id, 10)],
        ))
        .await
        .unwrap();
    assert_eq!(created.status, RequestStatus::Pending);
    assert_eq!(created.items.len(), 2);
    assert!(created.resolved_at.is_none());

    let approved = state.warehouse_service.approve(&created.id).await.unwrap();
    assert_eq!(approved.status, RequestStatus::Approved);
    assert!(approved.resolved_at.is_some());

    let warehouse = state.medication_service.get(&paracetamol.id).await.unwrap();
    assert_eq!(warehouse.warehouse_quantity, 170);
    let warehouse = state.medication_service.get(&ibuprofen.id).await.unwrap();
    assert_eq!(warehouse.warehouse_quantity, 40);

    let stock = state
        .medication_service
        .list_department_stock(&pharmacy.id)
        .await
        .unwrap();
    let paracetamol_stock = stock
        .iter()
        .find(|s| s.medication_id == paracetamol.id)
        .expect("stock row created on approval");
    assert_eq!(paracetamol_stock.quantity, 30);
    assert_eq!(paracetamol_stock.min_quantity, 0);
    assert_eq!(paracetamol_stock.max_quantity, 30);

    let ibuprofen_stock = stock
        .iter()
        .find(|s| s.medication_id == ibuprofen.id)
        .expect("existing stock row kept");
    assert_eq!(ibuprofen_stock.quantity, 15);

    let again = state.warehouse_service.approve(&created.id).await;
    assert!(matches!(again, Err(ApiError::Conflict(_))));

    teardown_test_db(db).await;
}

#[tokio::test]
async fn test_insufficient_warehouse_stock_rolls_back() {
    let (db, state) = setup_test_state().await;

    let department = create_test_department(&state, "Oncology").await;
    let plenty = create_test_medication(&state, "Ondansetron", 100).await;
    let scarce = create_test_medication(&state, "Cisplatin", 3).await;

    let created = state
        .warehouse_service
        .create(request_for(&department.id, &[(&plenty.id, 10), (&scarce.id, 4)]))
        .await
        .unwrap();

    let result = state.warehouse_service.approve(&created.id).await;
    assert!(matches!(result, Err(ApiError::Conflict(_))));

    let unchanged = state.medication_service.get(&plenty.id).await.unwrap();
    assert_eq!(unchanged.warehouse_quantity, 100);
    let still_pending = state.warehouse_service.get(&created.id).await.unwrap();
    assert_eq!(still_pending.status, RequestStatus::Pending);
    assert!(state
        .medication_service
        .list_department_stock(&department.id)
        .await
        .unwrap()
        .is_empty());

    teardown_test_db(db).await;
}

#[tokio::test]
async fn test_reject_and_delete_rules() {
    let (db, state) = setup_test_state().await;

    let department = create_test_department(&state, "Geriatrics").await;
    let medication = create_test_medication(&state, "Metformin", 100).await;

    let rejected = state
        .warehouse_service
        .create(request_for(&department.id, &[(&medication.id, 10)]))
        .await
        .unwrap();
    let resolved = state
        .warehouse_service
        .reject(
            &rejected.id,
            ResolveRequest {
                notes: Some("Budget exhausted".to_string()),
            },
        )
        .await
        .unwrap();
    assert_eq!(resolved.status, RequestStatus::Rejected);
    assert_eq!(resolved.notes.as_deref(), Some("Budget exhausted"));

    let cannot_delete = state.warehouse_service.delete(&rejected.id).await;
    assert!(matches!(cannot_delete, Err(ApiError::Conflict(_))));
    let cannot_approve = state.warehouse_service.approve(&rejected.id).await;
    assert!(matches!(cannot_approve, Err(ApiError::Conflict(_))));

    let pending = state
        .warehouse_service
        .create(request_for(&department.id, &[(&medication.id, 1)]))
        .await
        .unwrap();
    state.warehouse_service.delete(&pending.id).await.unwrap();
    let gone = state.warehouse_service.get(&pending.id).await;
    assert!(matches!(gone, Err(ApiError::NotFound(_))));

    teardown_test_db(db).await;
}

#[tokio::test]
async fn test_request_validation() {
    let (db, state) = setup_test_state().await;

    let department = create_test_department(&state, "Urology").await;
    let medication = create_test_medication(&state, "Tamsulosin", 10).await;

    let empty = state
        .warehouse_service
        .create(request_for(&department.id, &[]))
        .await;
    assert!(matches!(empty, Err(ApiError::Validation(_))));

    let duplicated = state
        .warehouse_service
        .create(request_for(
            &department.id,
            &[(&medication.id, 1), (&medication.id, 2)],
        ))
        .await;
    assert!(matches!(duplicated, Err(ApiError::Validation(_))));

    match state
        .warehouse_service
        .create(request_for(&department.id, &[("no-such-medication", 1)]))
        .await
    {
        Err(ApiError::Validation(errors)) => assert_eq!(errors[0].field, "items[0]"),
        other => panic!("expected validation error, got {:?}", other.map(|r| r.id)),
    }

    teardown_test_db(db).await;
}

#[tokio::test]
async fn test_list_filters_by_status() {
    let (db, state) = setup_test_state().await;

    let department = create_test_department(&state, "Nephrology").await;
    let medication = create_test_medication(&state, "Furosemide", 100).await;

    let first = state
        .warehouse_service
        .create(request_for(&department.id, &[(&medication.id, 5)]))
        .await
        .unwrap();
    state
        .warehouse_service
        .create(request_for(&department.id, &[(&medication.id, 5)]))
        .await
        .unwrap();
    state.warehouse_service.approve(&first.id).await.unwrap();

    let pending = state
        .warehouse_service
        .list(
            WarehouseRequestFilter {
                department_id: Some(department.id.clone()),
                status: Some("pending".to_string()),
            },
            PageRequest::default(),
        )
        .await
        .unwrap();
    assert_eq!(pending.pagination.total_count, 1);

    let invalid = state
        .warehouse_service
        .list(
            WarehouseRequestFilter {
                department_id: None,
                status: Some("lost".to_string()),
            },
            PageRequest::default(),
        )
        .await;
    assert!(matches!(invalid, Err(ApiError::Validation(_))));

    teardown_test_db(db).await;
}

#[tokio::test]
async fn test_stock_adjustment_never_goes_negative() {
    let (db, state) = setup_test_state().await;

    let department = create_test_department(&state, "Endocrinology").await;
    let medication = create_test_medication(&state, "Insulin", 10).await;
    let stock = stock_department(&state, &department.id, &medication.id, 4).await;

    let adjusted = state
        .medication_service
        .adjust_stock(&stock.id, AdjustStockRequest { delta: -3 })
        .await
        .unwrap();
    assert_eq!(adjusted.quantity, 1);

    let result = state
        .medication_service
        .adjust_stock(&stock.id, AdjustStockRequest { delta: -2 })
        .await;
    assert!(matches!(result, Err(ApiError::Conflict(_))));

    let unchanged = state.medication_service.get_stock(&stock.id).await.unwrap();
    assert_eq!(unchanged.quantity, 1);

    teardown_test_db(db).await;
}

#[tokio::test]
async fn test_request_without_notes_reads_back() {
    let (db, state) = setup_test_state().await;

    let surgery = create_test_department(&state, "Surgery").await;
    let lidocaine = create_test_medication(&state, "Lidocaine", 80).await;

    let mut request = request_for(&surgery.id, &[(&lidocaine.id, 4)]);
    request.notes = None;
    let created = state.warehouse_service.create(request).await.unwrap();

    let fetched = state.warehouse_service.get(&created.id).await.unwrap();
    assert!(fetched.notes.is_none());
    assert!(fetched.resolved_at.is_none());

    let listed = state
        .warehouse_service
        .list(WarehouseRequestFilter::default(), PageRequest::default())
        .await
        .unwrap();
    assert_eq!(listed.pagination.total_count, 1);
    assert!(listed.items[0].notes.is_none());

    teardown_test_db(db).await;
}

#[tokio::test]
async fn test_medication_search_matches_literally_across_scripts() {
    let (db, state) = setup_test_state().await;

    create_test_medication(&state, "Ácido Fólico", 40).await;
    create_test_medication(&state, "Amoxicillin", 40).await;

    let search = |q: &str| {
        let state = state.clone();
        let q = q.to_string();
        async move {
            state
                .medication_service
                .list(MedicationFilter { q: Some(q) }, PageRequest::default())
                .await
                .unwrap()
        }
    };

    assert_eq!(search("_").await.pagination.total_count, 0);
    assert_eq!(search("ácido").await.pagination.total_count, 1);
    assert_eq!(search("FÓLICO").await.pagination.total_count, 1);
    assert_eq!(search("AMOX").await.items[0].name, "Amoxicillin");

    teardown_test_db(db).await;
}
