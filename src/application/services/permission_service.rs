use crate::domain::entities::{Role, RoleName};
use crate::infrastructure::http::middleware::error::{ApiError, ApiResult};

/// Role sets allowed per route group.
pub mod policy {
    use crate::domain::entities::RoleName::{self, *};

    pub const ADMIN: &[RoleName] = &[Admin];
    pub const CLINICAL_INTAKE: &[RoleName] = &[Admin, Receptionist, Doctor];
    pub const CONSULTATIONS: &[RoleName] = &[Admin, Doctor];
    pub const PHARMACY: &[RoleName] = &[Admin, WarehouseManager];
    pub const WAREHOUSE_REQUESTERS: &[RoleName] = &[Admin, DepartmentHead];
    pub const ANALYTICS: &[RoleName] = &[Admin, DepartmentHead];
}

/// Role checks; access is granted if ANY assigned role is allowed.
pub struct PermissionService;

impl PermissionService {
    pub fn has_role(roles: &[Role], role: RoleName) -> bool {
        roles.iter().any(|r| r.name == role.as_str())
    }

    pub fn has_any_role(roles: &[Role], allowed: &[RoleName]) -> bool {
        allowed.iter().any(|role| Self::has_role(roles, *role))
    }

    pub fn require_any_role(roles: &[Role], allowed: &[RoleName]) -> ApiResult<()> {
        if Self::has_any_role(roles, allowed) {
            Ok(())
        } else {
            let names: Vec<&str> = allowed.iter().map(|r| r.as_str()).collect();
            Err(ApiError::Forbidden(format!(
                "Requires one of the roles: {}",
                names.join(", ")
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn role(name: &str) -> Role {
        Role {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.to_string(),
            description: None,
        }
    }

    #[test]
    fn test_any_role_union() {
        let roles = vec![role("Receptionist"), role("WarehouseManager")];
        assert!(PermissionService::has_any_role(&roles, policy::PHARMACY));
        assert!(PermissionService::has_any_role(&roles, policy::CLINICAL_INTAKE));
        assert!(!PermissionService::has_any_role(&roles, policy::ANALYTICS));
    }

    #[test]
    fn test_no_roles_is_forbidden() {
        let result = PermissionService::require_any_role(&[], policy::ADMIN);
        assert!(matches!(result, Err(ApiError::Forbidden(_))));
    }

    #[test]
    fn test_admin_passes_every_policy() {
        let roles = vec![role("Admin")];
        for allowed in [
            policy::ADMIN,
            policy::CLINICAL_INTAKE,
            policy::CONSULTATIONS,
            policy::PHARMACY,
            policy::WAREHOUSE_REQUESTERS,
            policy::ANALYTICS,
        ] {
            assert!(PermissionService::require_any_role(&roles, allowed).is_ok());
        }
    }
}
