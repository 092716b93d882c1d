mod helpers;

use helpers::*;
use polyclinic::domain::entities::{PatientFilter, PatientRequest};
use polyclinic::infrastructure::http::middleware::ApiError;
use polyclinic::shared::pagination::PageRequest;

fn patient_request(name: &str, identification_number: &str) -> PatientRequest {
    PatientRequest {
        name: name.to_string(),
        identification_number: identification_number.to_string(),
        birth_date: "1970-01-20".to_string(),
        sex: "male".to_string(),
        phone: None,
        address: Some("12 Harbour Street".to_string()),
    }
}

#[tokio::test]
async fn test_patient_create_and_lookup_by_identification() {
    let (db, state) = setup_test_state().await;

    let created = state
        .patient_service
        .create(patient_request("Carlos Méndez", "85010112345"))
        .await
        .unwrap();

    let found = state
        .patient_service
        .find_by_identification_number("85010112345")
        .await
        .unwrap();
    assert_eq!(found.id, created.id);

    let missing = state
        .patient_service
        .find_by_identification_number("000000000")
        .await;
    assert!(matches!(missing, Err(ApiError::NotFound(_))));

    teardown_test_db(db).await;
}

#[tokio::test]
async fn test_duplicate_identification_number_conflicts() {
    let (db, state) = setup_test_state().await;

    state
        .patient_service
        .create(patient_request("First Patient", "123456789"))
        .await
        .unwrap();
    let duplicate = state
        .patient_service
        .create(patient_request("Second Patient", "123456789"))
        .await;
    assert!(matches!(duplicate, Err(ApiError::Conflict(_))));

    teardown_test_db(db).await;
}

#[tokio::test]
async fn test_patient_validation_collects_every_field() {
    let (db, state) = setup_test_state().await;

    let result = state
        .patient_service
        .create(PatientRequest {
            name: "X".to_string(),
            identification_number: "12AB".to_string(),
            birth_date: "2999-01-01".to_string(),
            sex: "unknown".to_string(),
            phone: Some("call me".to_string()),
            address: None,
        })
        .await;

    match result {
        Err(ApiError::Validation(errors)) => {
            let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
            for field in ["name", "identification_number", "birth_date", "sex", "phone"] {
                assert!(fields.contains(&field), "missing error for {}", field);
            }
        }
        other => panic!("expected validation error, got {:?}", other.map(|p| p.id)),
    }

    teardown_test_db(db).await;
}

#[tokio::test]
async fn test_patient_search_is_case_insensitive_substring() {
    let (db, state) = setup_test_state().await;

    create_test_patient(&state, "María González").await;
    create_test_patient(&state, "Pedro Gonzalo").await;
    create_test_patient(&state, "Lucía Fernández").await;

    let results = state
        .patient_service
        .list(
            PatientFilter {
                q: Some("gonz".to_string()),
            },
            PageRequest::default(),
        )
        .await
        .unwrap();
    assert_eq!(results.pagination.total_count, 2);

    let everyone = state
        .patient_service
        .list(PatientFilter::default(), PageRequest::default())
        .await
        .unwrap();
    assert_eq!(everyone.items.len(), 3);

    teardown_test_db(db).await;
}

#[tokio::test]
async fn test_patient_search_matches_literally_across_scripts() {
    let (db, state) = setup_test_state().await;

    create_test_patient(&state, "Óscar Pérez").await;
    create_test_patient(&state, "Ana Lucía Soto").await;
    create_test_patient(&state, "Pedro Gonzalo").await;

    let search = |q: &str| {
        let state = state.clone();
        let q = q.to_string();
        async move {
            state
                .patient_service
                .list(PatientFilter { q: Some(q) }, PageRequest::default())
                .await
                .unwrap()
        }
    };

    assert_eq!(search("_").await.pagination.total_count, 0);
    assert_eq!(search("%").await.pagination.total_count, 0);

    let oscar = search("óscar").await;
    assert_eq!(oscar.pagination.total_count, 1);
    assert_eq!(oscar.items[0].name, "Óscar Pérez");
    assert_eq!(search("ÓSCAR").await.pagination.total_count, 1);
    assert_eq!(search("LUCÍA").await.pagination.total_count, 1);
    assert_eq!(search("  pérez ").await.pagination.total_count, 1);
    assert_eq!(search("   ").await.pagination.total_count, 3);

    teardown_test_db(db).await;
}

#[tokio::test]
async fn test_patient_without_contact_details_reads_back() {
    let (db, state) = setup_test_state().await;

    let mut request = patient_request("Inés Vidal", "90020254321");
    request.address = None;
    let created = state.patient_service.create(request).await.unwrap();

    let fetched = state.patient_service.get(&created.id).await.unwrap();
    assert!(fetched.phone.is_none());
    assert!(fetched.address.is_none());

    let listed = state
        .patient_service
        .list(PatientFilter::default(), PageRequest::default())
        .await
        .unwrap();
    assert_eq!(listed.items.len(), 1);
    assert!(listed.items[0].address.is_none());

    let renamed = state
        .patient_service
        .update(&created.id, patient_request("Inés Vidal Roca", "90020254321"))
        .await
        .unwrap();
    assert_eq!(renamed.address.as_deref(), Some("12 Harbour Street"));
    let found = state
        .patient_service
        .list(
            PatientFilter {
                q: Some("roca".to_string()),
            },
            PageRequest::default(),
        )
        .await
        .unwrap();
    assert_eq!(found.pagination.total_count, 1);

    teardown_test_db(db).await;
}

#[tokio::test]
async fn test_patient_update_keeps_identity() {
    let (db, state) = setup_test_state().await;

    let created = create_test_patient(&state, "Rosa Díaz").await;
    let mut request = patient_request("Rosa Díaz Pérez", &created.identification_number);
    request.sex = "female".to_string();

    let updated = state
        .patient_service
        .update(&created.id, request)
        .await
        .unwrap();
    assert_eq!(updated.id, created.id);
    assert_eq!(updated.name, "Rosa Díaz Pérez");
    assert_eq!(updated.created_at, created.created_at);

    teardown_test_db(db).await;
}

#[tokio::test]
async fn test_history_and_delete_restriction() {
    let (db, state) = setup_test_state().await;

    let patient = create_test_patient(&state, "Elena Ruiz").await;
    let emergency = create_test_department(&state, "Emergency").await;
    let cardio = create_test_department(&state, "Cardiology").await;

    create_test_derivation(&state, &patient.id, &emergency.id, &cardio.id, &days_ago(5)).await;
    create_test_referral(&state, &patient.id, &emergency.id, &days_ago(10)).await;

    let history = state.patient_service.history(&patient.id).await.unwrap();
    assert_eq!(history.patient.id, patient.id);
    assert_eq!(history.derivations.len(), 1);
    assert_eq!(history.referrals.len(), 1);
    assert!(history.consultations.is_empty());
    assert_eq!(history.derivations[0].destination_department_name, "Cardiology");

    let result = state.patient_service.delete(&patient.id).await;
    assert!(matches!(result, Err(ApiError::Conflict(_))));

    teardown_test_db(db).await;
}

#[tokio::test]
async fn test_derivation_rejects_same_origin_and_destination() {
    let (db, state) = setup_test_state().await;

    let patient = create_test_patient(&state, "Jorge Sanz").await;
    let department = create_test_department(&state, "Orthopedics").await;

    let result = state
        .derivation_service
        .create(polyclinic::domain::entities::CreateDerivationRequest {
            patient_id: patient.id,
            origin_department_id: department.id.clone(),
            destination_department_id: department.id,
            derivation_date: days_ago(1),
            reason: None,
        })
        .await;
    assert!(matches!(result, Err(ApiError::Validation(_))));

    teardown_test_db(db).await;
}
