use polyclinic::domain::entities::*;
use polyclinic::infrastructure::http::middleware::AppState;
use time::{Duration, OffsetDateTime};
use uuid::Uuid;

pub fn days_ago(days: i64) -> String {
    let date = OffsetDateTime::now_utc().date() - Duration::days(days);
    polyclinic::shared::timestamps::format_date(date)
}

fn unique_digits(len: usize) -> String {
    Uuid::new_v4()
        .as_u128()
        .to_string()
        .chars()
        .take(len)
        .collect()
}

pub async fn create_test_department(state: &AppState, name: &str) -> DepartmentResponse {
    state
        .department_service
        .create(DepartmentRequest {
            name: name.to_string(),
            description: Some(format!("{} department", name)),
        })
        .await
        .expect("Failed to create department")
}

pub async fn create_test_doctor(
    state: &AppState,
    department_id: &str,
    name: &str,
) -> DoctorResponse {
    let license = format!("LIC-{}", unique_digits(8));
    state
        .doctor_service
        .create(DoctorRequest {
            name: name.to_string(),
            specialty: "General Medicine".to_string(),
            department_id: department_id.to_string(),
            license_number: license,
        })
        .await
        .expect("Failed to create doctor")
}

pub async fn create_test_patient(state: &AppState, name: &str) -> PatientResponse {
    state
        .patient_service
        .create(PatientRequest {
            name: name.to_string(),
            identification_number: unique_digits(10),
            birth_date: "1985-06-15".to_string(),
            sex: "female".to_string(),
            phone: Some("+53 555-1234".to_string()),
            address: None,
        })
        .await
        .expect("Failed to create patient")
}

pub async fn create_test_medication(
    state: &AppState,
    name: &str,
    warehouse_quantity: i64,
) -> MedicationResponse {
    state
        .medication_service
        .create(MedicationRequest {
            name: name.to_string(),
            presentation: "tablet".to_string(),
            dosage_mg: 500.0,
            batch_number: format!("B-{}", unique_digits(6)),
            expiration_date: "2030-12-31".to_string(),
            warehouse_quantity,
            min_quantity: 10,
            max_quantity: 1000,
        })
        .await
        .expect("Failed to create medication")
}

pub async fn stock_department(
    state: &AppState,
    department_id: &str,
    medication_id: &str,
    quantity: i64,
) -> StockDepartment {
    state
        .medication_service
        .upsert_stock(
            department_id,
            UpsertStockRequest {
                medication_id: medication_id.to_string(),
                quantity,
                min_quantity: 0,
                max_quantity: 500,
            },
        )
        .await
        .expect("Failed to stock department")
}

pub async fn create_test_derivation(
    state: &AppState,
    patient_id: &str,
    origin_department_id: &str,
    destination_department_id: &str,
    date: &str,
) -> DerivationDetails {
    state
        .derivation_service
        .create(CreateDerivationRequest {
            patient_id: patient_id.to_string(),
            origin_department_id: origin_department_id.to_string(),
            destination_department_id: destination_department_id.to_string(),
            derivation_date: date.to_string(),
            reason: Some("Further evaluation".to_string()),
        })
        .await
        .expect("Failed to create derivation")
}

pub async fn create_test_referral(
    state: &AppState,
    patient_id: &str,
    destination_department_id: &str,
    date: &str,
) -> ReferralDetails {
    state
        .referral_service
        .create(CreateReferralRequest {
            patient_id: patient_id.to_string(),
            external_post: "North Community Clinic".to_string(),
            destination_department_id: destination_department_id.to_string(),
            referral_date: date.to_string(),
            reason: None,
        })
        .await
        .expect("Failed to create referral")
}

pub fn consultation_request(
    kind: &str,
    source_id: &str,
    doctor_id: &str,
    department_id: &str,
    date: &str,
    outcome: &str,
) -> CreateConsultationRequest {
    CreateConsultationRequest {
        kind: kind.to_string(),
        source_id: source_id.to_string(),
        doctor_id: doctor_id.to_string(),
        department_id: department_id.to_string(),
        consultation_date: date.to_string(),
        diagnosis: "Seasonal influenza".to_string(),
        treatment: Some("Rest and fluids".to_string()),
        outcome: outcome.to_string(),
        prescriptions: vec![],
    }
}
