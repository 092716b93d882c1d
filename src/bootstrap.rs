use crate::application::services::*;
use crate::config::Config;
use crate::domain::entities::{Department, Derivation, Doctor, Medication, Patient, Referral};
use crate::domain::ports::{
    AnalyticsRepository, ConsultationRepository, CrudRepository, DepartmentRepository,
    DerivationRepository, DoctorRepository, MedicationRepository, PatientRepository,
    ReferralRepository, StockRepository, UserRepository, WarehouseRepository,
};
use crate::infrastructure::http::middleware::{ApiResult, AppState};
use crate::infrastructure::persistence::Database;
use crate::shared::LoginRateLimiter;
use std::sync::Arc;

/// Wires every service to the shared database handle.
pub fn build_app_state(db: Database, config: &Config) -> AppState {
    let db = Arc::new(db);

    let departments: Arc<dyn DepartmentRepository> = db.clone();
    let department_rows: Arc<dyn CrudRepository<Department>> = db.clone();
    let doctors: Arc<dyn DoctorRepository> = db.clone();
    let doctor_rows: Arc<dyn CrudRepository<Doctor>> = db.clone();
    let patients: Arc<dyn PatientRepository> = db.clone();
    let patient_rows: Arc<dyn CrudRepository<Patient>> = db.clone();
    let medications: Arc<dyn MedicationRepository> = db.clone();
    let medication_rows: Arc<dyn CrudRepository<Medication>> = db.clone();
    let stock: Arc<dyn StockRepository> = db.clone();
    let derivations: Arc<dyn DerivationRepository> = db.clone();
    let derivation_rows: Arc<dyn CrudRepository<Derivation>> = db.clone();
    let referrals: Arc<dyn ReferralRepository> = db.clone();
    let referral_rows: Arc<dyn CrudRepository<Referral>> = db.clone();
    let consultations: Arc<dyn ConsultationRepository> = db.clone();
    let warehouse: Arc<dyn WarehouseRepository> = db.clone();
    let users: Arc<dyn UserRepository> = db.clone();
    let analytics: Arc<dyn AnalyticsRepository> = db;

    let tokens = JwtTokenService::new(
        &config.jwt_secret,
        &config.jwt_issuer,
        &config.jwt_audience,
        config.jwt_expiration_minutes,
    );

    AppState {
        identity_service: IdentityService::new(
            users,
            doctor_rows.clone(),
            tokens,
            LoginRateLimiter::new(),
        ),
        department_service: DepartmentService::new(departments, doctors.clone()),
        doctor_service: DoctorService::new(doctors, department_rows.clone()),
        patient_service: PatientService::new(
            patients,
            derivations.clone(),
            referrals.clone(),
            consultations.clone(),
        ),
        medication_service: MedicationService::new(
            medications,
            stock,
            department_rows.clone(),
        ),
        derivation_service: DerivationService::new(
            derivations.clone(),
            patient_rows.clone(),
            department_rows.clone(),
            consultations.clone(),
        ),
        referral_service: ReferralService::new(
            referrals.clone(),
            patient_rows,
            department_rows.clone(),
            consultations.clone(),
        ),
        consultation_service: ConsultationService::new(
            consultations,
            derivation_rows,
            referral_rows,
            doctor_rows,
            medication_rows.clone(),
        ),
        warehouse_service: WarehouseService::new(warehouse, department_rows, medication_rows),
        analytics_service: AnalyticsService::new(analytics),
    }
}

/// Ensure the configured admin account exists and holds the Admin role.
pub async fn initialize_admin(state: &AppState, config: &Config) -> ApiResult<()> {
    tracing::info!("Checking for admin user initialization");
    state
        .identity_service
        .ensure_admin(
            &config.admin_username,
            &config.admin_email,
            &config.admin_password,
        )
        .await
}
