mod helpers;

use helpers::*;
use polyclinic::domain::entities::{AppointHeadRequest, DepartmentRequest, DoctorFilter};
use polyclinic::infrastructure::http::middleware::ApiError;
use polyclinic::shared::pagination::PageRequest;

#[tokio::test]
async fn test_department_crud_round_trip() {
    let (db, state) = setup_test_state().await;

    let created = create_test_department(&state, "Cardiology").await;
    assert_eq!(created.id.len(), 36);

    let fetched = state.department_service.get(&created.id).await.unwrap();
    assert_eq!(fetched.name, "Cardiology");

    let updated = state
        .department_service
        .update(
            &created.id,
            DepartmentRequest {
                name: "Cardiology & Vascular".to_string(),
                description: None,
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.name, "Cardiology & Vascular");
    assert!(updated.description.is_none());

    let refetched = state.department_service.get(&created.id).await.unwrap();
    assert!(refetched.description.is_none());
    let listed = state
        .department_service
        .list(PageRequest::default())
        .await
        .unwrap();
    assert!(listed.items[0].description.is_none());

    state.department_service.delete(&created.id).await.unwrap();
    let missing = state.department_service.get(&created.id).await;
    assert!(matches!(missing, Err(ApiError::NotFound(_))));

    teardown_test_db(db).await;
}

#[tokio::test]
async fn test_department_name_is_unique_ignoring_case() {
    let (db, state) = setup_test_state().await;

    create_test_department(&state, "Neurology").await;
    let duplicate = state
        .department_service
        .create(DepartmentRequest {
            name: "NEUROLOGY".to_string(),
            description: None,
        })
        .await;
    assert!(matches!(duplicate, Err(ApiError::Conflict(_))));

    teardown_test_db(db).await;
}

#[tokio::test]
async fn test_department_name_validation() {
    let (db, state) = setup_test_state().await;

    let result = state
        .department_service
        .create(DepartmentRequest {
            name: " ".to_string(),
            description: None,
        })
        .await;
    match result {
        Err(ApiError::Validation(errors)) => assert_eq!(errors[0].field, "name"),
        other => panic!("expected validation error, got {:?}", other.map(|d| d.id)),
    }

    teardown_test_db(db).await;
}

#[tokio::test]
async fn test_department_list_is_paged() {
    let (db, state) = setup_test_state().await;

    for name in ["Oncology", "Pediatrics", "Radiology"] {
        create_test_department(&state, name).await;
    }

    let first = state
        .department_service
        .list(PageRequest::new(1, 2))
        .await
        .unwrap();
    assert_eq!(first.items.len(), 2);
    assert_eq!(first.pagination.total_count, 3);
    assert_eq!(first.pagination.total_pages, 2);

    let second = state
        .department_service
        .list(PageRequest::new(2, 2))
        .await
        .unwrap();
    assert_eq!(second.items.len(), 1);

    teardown_test_db(db).await;
}

#[tokio::test]
async fn test_department_with_doctors_cannot_be_deleted() {
    let (db, state) = setup_test_state().await;

    let department = create_test_department(&state, "Dermatology").await;
    create_test_doctor(&state, &department.id, "Dr. Ana Torres").await;

    let result = state.department_service.delete(&department.id).await;
    assert!(matches!(result, Err(ApiError::Conflict(_))));

    let doctors = state
        .department_service
        .list_doctors(&department.id)
        .await
        .unwrap();
    assert_eq!(doctors.len(), 1);

    teardown_test_db(db).await;
}

#[tokio::test]
async fn test_doctor_requires_existing_department() {
    let (db, state) = setup_test_state().await;

    let result = state
        .doctor_service
        .create(polyclinic::domain::entities::DoctorRequest {
            name: "Dr. Ghost".to_string(),
            specialty: "Surgery".to_string(),
            department_id: "missing".to_string(),
            license_number: "LIC-0001".to_string(),
        })
        .await;
    match result {
        Err(ApiError::Validation(errors)) => {
            assert!(errors.iter().any(|e| e.field == "department_id"))
        }
        other => panic!("expected validation error, got {:?}", other.map(|d| d.id)),
    }

    teardown_test_db(db).await;
}

#[tokio::test]
async fn test_doctor_filter_and_license_lookup() {
    let (db, state) = setup_test_state().await;

    let cardio = create_test_department(&state, "Cardiology").await;
    let neuro = create_test_department(&state, "Neurology").await;
    let doctor = create_test_doctor(&state, &cardio.id, "Dr. Luis Pérez").await;
    create_test_doctor(&state, &neuro.id, "Dr. Marta Gil").await;

    let filtered = state
        .doctor_service
        .list(
            DoctorFilter {
                department_id: Some(cardio.id.clone()),
            },
            PageRequest::default(),
        )
        .await
        .unwrap();
    assert_eq!(filtered.pagination.total_count, 1);
    assert_eq!(filtered.items[0].id, doctor.id);

    let by_license = state
        .doctor_service
        .find_by_license_number(&doctor.license_number)
        .await
        .unwrap();
    assert_eq!(by_license.id, doctor.id);

    teardown_test_db(db).await;
}

#[tokio::test]
async fn test_appoint_head_replaces_previous_head() {
    let (db, state) = setup_test_state().await;

    let department = create_test_department(&state, "Surgery").await;
    let first = create_test_doctor(&state, &department.id, "Dr. First").await;
    let second = create_test_doctor(&state, &department.id, "Dr. Second").await;

    let head = state
        .department_service
        .appoint_head(
            &department.id,
            AppointHeadRequest {
                doctor_id: first.id.clone(),
            },
        )
        .await
        .unwrap();
    assert_eq!(head.doctor_name, "Dr. First");
    assert_eq!(head.department_name, "Surgery");

    state
        .department_service
        .appoint_head(
            &department.id,
            AppointHeadRequest {
                doctor_id: second.id.clone(),
            },
        )
        .await
        .unwrap();

    let current = state.department_service.get_head(&department.id).await.unwrap();
    assert_eq!(current.doctor_id, second.id);
    assert_eq!(state.department_service.list_heads().await.unwrap().len(), 1);

    state
        .department_service
        .remove_head(&department.id)
        .await
        .unwrap();
    let gone = state.department_service.get_head(&department.id).await;
    assert!(matches!(gone, Err(ApiError::NotFound(_))));

    teardown_test_db(db).await;
}

#[tokio::test]
async fn test_head_must_belong_to_department() {
    let (db, state) = setup_test_state().await;

    let surgery = create_test_department(&state, "Surgery").await;
    let pediatrics = create_test_department(&state, "Pediatrics").await;
    let outsider = create_test_doctor(&state, &pediatrics.id, "Dr. Outsider").await;

    let result = state
        .department_service
        .appoint_head(
            &surgery.id,
            AppointHeadRequest {
                doctor_id: outsider.id,
            },
        )
        .await;
    assert!(matches!(result, Err(ApiError::Validation(_))));

    teardown_test_db(db).await;
}
