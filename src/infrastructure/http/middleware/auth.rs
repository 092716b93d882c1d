use crate::application::services::{
    AnalyticsService, ConsultationService, DepartmentService, DerivationService, DoctorService,
    IdentityService, MedicationService, PatientService, PermissionService, ReferralService,
    WarehouseService,
};
use crate::domain::entities::{Role, RoleName, User};
use crate::infrastructure::http::middleware::error::{ApiError, ApiResult};
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

#[derive(Clone)]
pub struct AppState {
    pub identity_service: IdentityService,
    pub department_service: DepartmentService,
    pub doctor_service: DoctorService,
    pub patient_service: PatientService,
    pub medication_service: MedicationService,
    pub derivation_service: DerivationService,
    pub referral_service: ReferralService,
    pub consultation_service: ConsultationService,
    pub warehouse_service: WarehouseService,
    pub analytics_service: AnalyticsService,
}

/// Validate the bearer token and attach the caller to the request.
///
/// The user is reloaded on every request so deactivation takes effect
/// before the token expires.
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = request
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or(ApiError::Unauthorized)?;

    let (user, roles) = state.identity_service.authenticate(token).await?;

    request
        .extensions_mut()
        .insert(AuthenticatedUser { user, roles });

    Ok(next.run(request).await)
}

#[derive(Clone, Debug)]
pub struct AuthenticatedUser {
    pub user: User,
    pub roles: Vec<Role>,
}

impl AuthenticatedUser {
    /// 403 unless the caller holds one of `allowed`.
    pub fn require(&self, allowed: &[RoleName]) -> ApiResult<()> {
        PermissionService::require_any_role(&self.roles, allowed)
    }
}
