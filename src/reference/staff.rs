// 👥 Staff Roles - default rates and system access

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RateType {
    /// Paid per hour worked
    Hourly,
    /// Paid per plate served
    PerPlate,
}

impl RateType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RateType::Hourly => "hourly",
            RateType::PerPlate => "per_plate",
        }
    }

    pub fn unit(&self) -> &'static str {
        match self {
            RateType::Hourly => "/h",
            RateType::PerPlate => "/plate",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StaffRole {
    pub id: &'static str,
    pub name: &'static str,
    pub default_rate: f64,
    pub rate_type: RateType,
    /// Whether people in this role may be given a dashboard login
    pub can_access_system: bool,
}

pub const ROLES: &[StaffRole] = &[
    StaffRole {
        id: "chef",
        name: "Chef",
        default_rate: 45.0,
        rate_type: RateType::Hourly,
        can_access_system: true,
    },
    StaffRole {
        id: "cocinero",
        name: "Cocinero",
        default_rate: 3.5,
        rate_type: RateType::PerPlate,
        can_access_system: false,
    },
    StaffRole {
        id: "mesero",
        name: "Mesero",
        default_rate: 18.0,
        rate_type: RateType::Hourly,
        can_access_system: false,
    },
    StaffRole {
        id: "bartender",
        name: "Bartender",
        default_rate: 22.0,
        rate_type: RateType::Hourly,
        can_access_system: false,
    },
    StaffRole {
        id: "coordinador",
        name: "Coordinador de Eventos",
        default_rate: 35.0,
        rate_type: RateType::Hourly,
        can_access_system: true,
    },
];

pub fn find_role(id: &str) -> Option<&'static StaffRole> {
    ROLES.iter().find(|r| r.id == id)
}

/// Default rate for a role, 0.0 when the role is unknown
pub fn default_rate_for(id: &str) -> f64 {
    find_role(id).map(|r| r.default_rate).unwrap_or(0.0)
}

pub fn roles_with_system_access() -> Vec<&'static StaffRole> {
    ROLES.iter().filter(|r| r.can_access_system).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_role() {
        let role = find_role("cocinero").unwrap();
        assert_eq!(role.rate_type, RateType::PerPlate);
        assert!(!role.can_access_system);
        assert!(find_role("dj").is_none());
    }

    #[test]
    fn test_default_rate_for() {
        assert_eq!(default_rate_for("chef"), 45.0);
        assert_eq!(default_rate_for("dj"), 0.0);
    }

    #[test]
    fn test_roles_with_system_access() {
        let ids: Vec<&str> = roles_with_system_access().iter().map(|r| r.id).collect();
        assert_eq!(ids, vec!["chef", "coordinador"]);
    }
}
