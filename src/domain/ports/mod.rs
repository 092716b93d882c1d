pub mod analytics_repository;
pub mod clinical_repository;
pub mod department_repository;
pub mod doctor_repository;
pub mod medication_repository;
pub mod patient_repository;
pub mod repository;
pub mod user_repository;
pub mod warehouse_repository;

pub use analytics_repository::AnalyticsRepository;
pub use clinical_repository::{
    ConsultationQuery, ConsultationRepository, DerivationRepository, ReferralRepository,
};
pub use department_repository::DepartmentRepository;
pub use doctor_repository::DoctorRepository;
pub use medication_repository::{MedicationRepository, StockRepository};
pub use patient_repository::PatientRepository;
pub use repository::CrudRepository;
pub use user_repository::UserRepository;
pub use warehouse_repository::{ApprovalOutcome, WarehouseRepository};
