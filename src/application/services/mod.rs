pub mod analytics_service;
pub mod consultation_service;
pub mod department_service;
pub mod derivation_service;
pub mod doctor_service;
pub mod identity_service;
pub mod jwt_service;
pub mod medication_service;
pub mod password;
pub mod patient_service;
pub mod permission_service;
pub mod referral_service;
pub mod warehouse_service;

pub use analytics_service::AnalyticsService;
pub use consultation_service::ConsultationService;
pub use department_service::DepartmentService;
pub use derivation_service::DerivationService;
pub use doctor_service::DoctorService;
pub use identity_service::IdentityService;
pub use jwt_service::{AccessToken, Claims, JwtTokenService};
pub use medication_service::MedicationService;
pub use patient_service::PatientService;
pub use permission_service::{policy, PermissionService};
pub use referral_service::ReferralService;
pub use warehouse_service::WarehouseService;
