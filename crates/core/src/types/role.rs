//! User roles and the rank table used for permission checks.

use core::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::UnknownVariant;

/// Role of an office user.
///
/// Roles form a total order: `Administrator > Lawyer > Secretary`. A user
/// satisfies a required role when their rank is at least the required rank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Full access, including user management.
    #[serde(rename = "admin")]
    Administrator,
    /// Case management and financial reports.
    Lawyer,
    /// Clients, tasks and calendar only.
    Secretary,
}

impl Role {
    /// Every role, highest rank first.
    pub const ALL: [Self; 3] = [Self::Administrator, Self::Lawyer, Self::Secretary];

    /// Position in the hierarchy. Values outside the closed set rank 0,
    /// which is why the lowest real role starts at 1.
    #[must_use]
    pub const fn rank(self) -> u8 {
        match self {
            Self::Administrator => 3,
            Self::Lawyer => 2,
            Self::Secretary => 1,
        }
    }

    /// Whether this role's capabilities include those of `required`.
    #[must_use]
    pub const fn satisfies(self, required: Self) -> bool {
        self.rank() >= required.rank()
    }

    /// Text stored in the `users.role` column.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Administrator => "admin",
            Self::Lawyer => "lawyer",
            Self::Secretary => "secretary",
        }
    }

    /// Whether users with this role can be assigned to cases.
    #[must_use]
    pub const fn can_be_assigned_cases(self) -> bool {
        matches!(self, Self::Administrator | Self::Lawyer)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" | "administrator" => Ok(Self::Administrator),
            "lawyer" => Ok(Self::Lawyer),
            "secretary" => Ok(Self::Secretary),
            _ => Err(UnknownVariant::new("role", s)),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_ranks_are_strictly_ordered() {
        assert!(Role::Administrator.rank() > Role::Lawyer.rank());
        assert!(Role::Lawyer.rank() > Role::Secretary.rank());
        assert!(Role::Secretary.rank() > 0);
    }

    #[test]
    fn test_satisfies() {
        assert!(Role::Administrator.satisfies(Role::Lawyer));
        assert!(Role::Lawyer.satisfies(Role::Lawyer));
        assert!(!Role::Secretary.satisfies(Role::Lawyer));
        assert!(Role::Secretary.satisfies(Role::Secretary));
        assert!(!Role::Lawyer.satisfies(Role::Administrator));
    }

    #[test]
    fn test_case_assignment_roles() {
        assert!(Role::Administrator.can_be_assigned_cases());
        assert!(Role::Lawyer.can_be_assigned_cases());
        assert!(!Role::Secretary.can_be_assigned_cases());
    }

    #[test]
    fn test_parse_accepts_both_admin_spellings() {
        assert_eq!("admin".parse::<Role>().unwrap(), Role::Administrator);
        assert_eq!(
            "administrator".parse::<Role>().unwrap(),
            Role::Administrator
        );
        assert_eq!("lawyer".parse::<Role>().unwrap(), Role::Lawyer);
    }

    #[test]
    fn test_parse_is_case_sensitive() {
        let err = "Lawyer".parse::<Role>().unwrap_err();
        assert_eq!(err.kind, "role");
        assert_eq!(err.value, "Lawyer");
    }

    #[test]
    fn test_display_matches_stored_form() {
        for role in Role::ALL {
            assert_eq!(role.to_string().parse::<Role>().unwrap(), role);
        }
    }

    #[test]
    fn test_serde_uses_stored_form() {
        let json = serde_json::to_string(&Role::Administrator).unwrap();
        assert_eq!(json, "\"admin\"");
    }
}
