mod helpers;

use helpers::*;
use polyclinic::domain::entities::{
    ConsumptionQuery, CreateWarehouseRequest, MonthlyAveragesQuery, PrescriptionRequest,
    SuccessRateQuery, WarehouseRequestItem,
};
use polyclinic::infrastructure::http::middleware::{ApiError, AppState};

async fn consult(
    state: &AppState,
    source_id: &str,
    doctor_id: &str,
    department_id: &str,
    date: &str,
    outcome: &str,
) {
    state
        .consultation_service
        .create(consultation_request(
            "derivation",
            source_id,
            doctor_id,
            department_id,
            date,
            outcome,
        ))
        .await
        .expect("Failed to create consultation");
}

#[tokio::test]
async fn test_doctor_success_rates() {
    let (db, state) = setup_test_state().await;

    let emergency = create_test_department(&state, "Emergency").await;
    let cardiology = create_test_department(&state, "Cardiology").await;
    let neurology = create_test_department(&state, "Neurology").await;
    let cardiologist = create_test_doctor(&state, &cardiology.id, "Dr. Yang").await;
    let neurologist = create_test_doctor(&state, &neurology.id, "Dr. Shepherd").await;

    let relapsed = create_test_patient(&state, "Luis Pérez").await;
    let recovered = create_test_patient(&state, "Marta Díaz").await;
    let transferred = create_test_patient(&state, "Jorge Ruiz").await;

    for patient in [&relapsed, &recovered, &transferred] {
        let derivation = create_test_derivation(
            &state,
            &patient.id,
            &emergency.id,
            &cardiology.id,
            &days_ago(30),
        )
        .await;
        let outcome = if patient.id == transferred.id { "derived" } else { "resolved" };
        consult(
            &state,
            &derivation.id,
            &cardiologist.id,
            &cardiology.id,
            &days_ago(25),
            outcome,
        )
        .await;
    }

    // Sent on from Cardiology five days after a "resolved" consultation
    let onward = create_test_derivation(
        &state,
        &relapsed.id,
        &cardiology.id,
        &neurology.id,
        &days_ago(20),
    )
    .await;
    consult(
        &state,
        &onward.id,
        &neurologist.id,
        &neurology.id,
        &days_ago(15),
        "resolved",
    )
    .await;

    let rates = state
        .analytics_service
        .doctor_success_rates(SuccessRateQuery {
            from: Some(days_ago(60)),
            to: Some(days_ago(0)),
            follow_up_days: Some(30),
            department_id: None,
        })
        .await
        .unwrap();

    assert_eq!(rates.len(), 2);
    assert_eq!(rates[0].doctor_name, "Dr. Shepherd");
    assert_eq!(rates[0].success_rate, 1.0);
    assert_eq!(rates[1].doctor_name, "Dr. Yang");
    assert_eq!(rates[1].total_consultations, 3);
    assert_eq!(rates[1].successful_consultations, 1);
    assert_eq!(rates[1].success_rate, 0.3333);

    // A zero-day follow-up no longer counts the onward derivation
    let strict = state
        .analytics_service
        .doctor_success_rates(SuccessRateQuery {
            from: Some(days_ago(60)),
            to: Some(days_ago(0)),
            follow_up_days: Some(0),
            department_id: Some(cardiology.id.clone()),
        })
        .await
        .unwrap();
    assert_eq!(strict.len(), 1);
    assert_eq!(strict[0].successful_consultations, 2);

    teardown_test_db(db).await;
}

#[tokio::test]
async fn test_success_rate_window_validation() {
    let (db, state) = setup_test_state().await;

    let inverted = state
        .analytics_service
        .doctor_success_rates(SuccessRateQuery {
            from: Some(days_ago(1)),
            to: Some(days_ago(10)),
            ..Default::default()
        })
        .await;
    assert!(matches!(inverted, Err(ApiError::Validation(_))));

    let follow_up = state
        .analytics_service
        .doctor_success_rates(SuccessRateQuery {
            follow_up_days: Some(400),
            ..Default::default()
        })
        .await;
    assert!(matches!(follow_up, Err(ApiError::Validation(_))));

    let last_day = state
        .analytics_service
        .doctor_success_rates(SuccessRateQuery {
            from: Some("9999-12-01".to_string()),
            to: Some("9999-12-31".to_string()),
            ..Default::default()
        })
        .await;
    match last_day {
        Err(ApiError::Validation(errors)) => assert_eq!(errors[0].field, "to"),
        other => panic!("expected a validation error, got {:?}", other.map(|r| r.len())),
    }

    let same_day = state
        .analytics_service
        .doctor_success_rates(SuccessRateQuery {
            from: Some("9999-12-31".to_string()),
            to: Some("9999-12-31".to_string()),
            follow_up_days: Some(0),
            ..Default::default()
        })
        .await
        .unwrap();
    assert!(same_day.is_empty());

    let empty = state
        .analytics_service
        .doctor_success_rates(SuccessRateQuery::default())
        .await
        .unwrap();
    assert!(empty.is_empty());

    teardown_test_db(db).await;
}

#[tokio::test]
async fn test_monthly_averages_zero_fill() {
    let (db, state) = setup_test_state().await;

    let emergency = create_test_department(&state, "Emergency").await;
    let dermatology = create_test_department(&state, "Dermatology").await;
    let doctor = create_test_doctor(&state, &dermatology.id, "Dr. Bailey").await;
    let patient = create_test_patient(&state, "Rosa Vidal").await;
    let derivation = create_test_derivation(
        &state,
        &patient.id,
        &emergency.id,
        &dermatology.id,
        &days_ago(50),
    )
    .await;

    // Both dates fall in a month before the current one
    for date in [days_ago(40), days_ago(41)] {
        consult(&state, &derivation.id, &doctor.id, &dermatology.id, &date, "follow_up").await;
    }

    let report = state
        .analytics_service
        .monthly_averages(MonthlyAveragesQuery {
            months: Some(6),
            department_id: None,
        })
        .await
        .unwrap();

    assert_eq!(report.months, 6);
    assert_eq!(report.departments.len(), 2);
    let derm = report
        .departments
        .iter()
        .find(|d| d.department_id == dermatology.id)
        .unwrap();
    assert_eq!(derm.by_month.len(), 6);
    assert_eq!(derm.total_consultations, 2);
    assert_eq!(derm.by_month.values().sum::<i64>(), 2);
    assert_eq!(derm.average_per_month, 0.33);

    let er = report
        .departments
        .iter()
        .find(|d| d.department_id == emergency.id)
        .unwrap();
    assert_eq!(er.total_consultations, 0);
    assert!(er.by_month.values().all(|count| *count == 0));

    let invalid = state
        .analytics_service
        .monthly_averages(MonthlyAveragesQuery {
            months: Some(0),
            department_id: None,
        })
        .await;
    assert!(matches!(invalid, Err(ApiError::Validation(_))));

    teardown_test_db(db).await;
}

#[tokio::test]
async fn test_medication_consumption_ranking() {
    let (db, state) = setup_test_state().await;

    let emergency = create_test_department(&state, "Emergency").await;
    let pulmonology = create_test_department(&state, "Pulmonology").await;
    let doctor = create_test_doctor(&state, &pulmonology.id, "Dr. Webber").await;
    let patient = create_test_patient(&state, "Elena Soto").await;
    let derivation = create_test_derivation(
        &state,
        &patient.id,
        &emergency.id,
        &pulmonology.id,
        &days_ago(20),
    )
    .await;

    let salbutamol = create_test_medication(&state, "Salbutamol", 100).await;
    let prednisone = create_test_medication(&state, "Prednisone", 100).await;
    stock_department(&state, &pulmonology.id, &salbutamol.id, 50).await;
    stock_department(&state, &pulmonology.id, &prednisone.id, 50).await;

    for (date, salbutamol_qty) in [(days_ago(10), 5), (days_ago(5), 3)] {
        let mut request = consultation_request(
            "derivation",
            &derivation.id,
            &doctor.id,
            &pulmonology.id,
            &date,
            "follow_up",
        );
        request.prescriptions = vec![
            PrescriptionRequest {
                medication_id: salbutamol.id.clone(),
                quantity: salbutamol_qty,
            },
            PrescriptionRequest {
                medication_id: prednisone.id.clone(),
                quantity: 2,
            },
        ];
        state.consultation_service.create(request).await.unwrap();
    }

    let consumption = state
        .analytics_service
        .medication_consumption(ConsumptionQuery::default())
        .await
        .unwrap();
    assert_eq!(consumption.len(), 2);
    assert_eq!(consumption[0].medication_name, "Salbutamol");
    assert_eq!(consumption[0].total_quantity, 8);
    assert_eq!(consumption[0].consultations, 2);
    assert_eq!(consumption[0].by_department.len(), 1);
    assert_eq!(consumption[0].by_department[0].department_name, "Pulmonology");
    assert_eq!(consumption[1].total_quantity, 4);

    let top = state
        .analytics_service
        .medication_consumption(ConsumptionQuery {
            limit: Some(1),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(top.len(), 1);
    assert_eq!(top[0].medication_id, salbutamol.id);

    let outside_window = state
        .analytics_service
        .medication_consumption(ConsumptionQuery {
            from: Some(days_ago(90)),
            to: Some(days_ago(60)),
            ..Default::default()
        })
        .await
        .unwrap();
    assert!(outside_window.is_empty());

    teardown_test_db(db).await;
}

#[tokio::test]
async fn test_dashboard_summary_counts() {
    let (db, state) = setup_test_state().await;

    let department = create_test_department(&state, "Rheumatology").await;
    create_test_doctor(&state, &department.id, "Dr. Karev").await;
    create_test_patient(&state, "Iván Castro").await;
    create_test_patient(&state, "Lucía Gómez").await;
    let scarce = create_test_medication(&state, "Methotrexate", 5).await;
    create_test_medication(&state, "Folic Acid", 500).await;

    state
        .warehouse_service
        .create(CreateWarehouseRequest {
            department_id: department.id.clone(),
            notes: None,
            items: vec![WarehouseRequestItem {
                medication_id: scarce.id.clone(),
                quantity: 2,
            }],
        })
        .await
        .unwrap();

    let summary = state.analytics_service.summary().await.unwrap();
    assert_eq!(summary.patients, 2);
    assert_eq!(summary.doctors, 1);
    assert_eq!(summary.departments, 1);
    assert_eq!(summary.pending_warehouse_requests, 1);
    assert_eq!(summary.medications_below_minimum, 1);

    teardown_test_db(db).await;
}
