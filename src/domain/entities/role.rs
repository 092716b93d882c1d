use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Role {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
}

/// Built-in roles seeded by the identity migration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RoleName {
    Admin,
    DepartmentHead,
    Doctor,
    Receptionist,
    WarehouseManager,
}

impl RoleName {
    pub const ALL: [RoleName; 5] = [
        RoleName::Admin,
        RoleName::DepartmentHead,
        RoleName::Doctor,
        RoleName::Receptionist,
        RoleName::WarehouseManager,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RoleName::Admin => "Admin",
            RoleName::DepartmentHead => "DepartmentHead",
            RoleName::Doctor => "Doctor",
            RoleName::Receptionist => "Receptionist",
            RoleName::WarehouseManager => "WarehouseManager",
        }
    }
}

impl std::fmt::Display for RoleName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for RoleName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RoleName::ALL
            .into_iter()
            .find(|r| r.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("Unknown role: {}", s))
    }
}

#[derive(Debug, Deserialize)]
pub struct AssignRoleRequest {
    pub role: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_name_parse_case_insensitive() {
        assert_eq!("warehousemanager".parse::<RoleName>(), Ok(RoleName::WarehouseManager));
        assert_eq!(" Admin ".parse::<RoleName>(), Ok(RoleName::Admin));
        assert!("Nurse".parse::<RoleName>().is_err());
    }
}
