//! Role-based permission checks.
//!
//! Roles form a total order (administrator > lawyer > secretary); a session
//! holds a permission when its role ranks at least as high as the one
//! required.

use law_office_core::Role;

use super::Session;
use crate::error::OfficeError;
use crate::models::CurrentUser;

/// Answers capability questions for one session.
#[derive(Debug, Clone, Copy)]
pub struct Gate<'a> {
    session: &'a Session,
}

impl<'a> Gate<'a> {
    #[must_use]
    pub const fn new(session: &'a Session) -> Self {
        Self { session }
    }

    /// Whether the session may act at `required` level.
    ///
    /// Always false without a login. `None` only requires a login.
    #[must_use]
    pub fn has_permission(&self, required: Option<Role>) -> bool {
        match (self.session.current_user(), required) {
            (None, _) => false,
            (Some(_), None) => true,
            (Some(user), Some(required)) => user.role.satisfies(required),
        }
    }

    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.session
            .current_user()
            .is_some_and(|user| user.role == Role::Administrator)
    }

    #[must_use]
    pub fn is_lawyer_or_above(&self) -> bool {
        self.has_permission(Some(Role::Lawyer))
    }

    #[must_use]
    pub fn can_manage_users(&self) -> bool {
        self.is_admin()
    }

    #[must_use]
    pub fn can_manage_cases(&self) -> bool {
        self.has_permission(Some(Role::Lawyer))
    }

    #[must_use]
    pub fn can_view_financial_reports(&self) -> bool {
        self.has_permission(Some(Role::Lawyer))
    }

    /// The logged-in user if `allowed` holds.
    ///
    /// # Errors
    ///
    /// Returns `OfficeError::Unauthenticated` without a login and
    /// `OfficeError::Forbidden(action)` if `allowed` is false.
    pub fn require(
        &self,
        allowed: bool,
        action: &'static str,
    ) -> Result<&'a CurrentUser, OfficeError> {
        let user = self.session.require_user()?;
        if !allowed {
            tracing::warn!(user_id = %user.id, role = %user.role, action, "Permission denied");
            return Err(OfficeError::Forbidden(action));
        }
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use law_office_core::UserId;

    use super::*;

    fn session_as(role: Role) -> Session {
        Session::signed_in(CurrentUser {
            id: UserId::new(1),
            username: "someone".to_owned(),
            full_name: "Some One".to_owned(),
            role,
            email: None,
            phone: None,
        })
    }

    #[test]
    fn test_lawyer_permission_by_role() {
        assert!(session_as(Role::Administrator).gate().has_permission(Some(Role::Lawyer)));
        assert!(session_as(Role::Lawyer).gate().has_permission(Some(Role::Lawyer)));
        assert!(!session_as(Role::Secretary).gate().has_permission(Some(Role::Lawyer)));
        assert!(!Session::new().gate().has_permission(Some(Role::Lawyer)));
    }

    #[test]
    fn test_no_requirement_still_needs_login() {
        assert!(session_as(Role::Secretary).gate().has_permission(None));
        assert!(!Session::new().gate().has_permission(None));
    }

    #[test]
    fn test_capability_table() {
        for role in Role::ALL {
            let session = session_as(role);
            let gate = session.gate();
            let admin = role == Role::Administrator;
            let lawyer_or_above = role != Role::Secretary;

            assert_eq!(gate.is_admin(), admin, "{role}");
            assert_eq!(gate.can_manage_users(), admin, "{role}");
            assert_eq!(gate.is_lawyer_or_above(), lawyer_or_above, "{role}");
            assert_eq!(gate.can_manage_cases(), lawyer_or_above, "{role}");
            assert_eq!(gate.can_view_financial_reports(), lawyer_or_above, "{role}");
        }

        let anonymous = Session::new();
        let gate = anonymous.gate();
        assert!(!gate.is_admin());
        assert!(!gate.can_manage_cases());
    }

    #[test]
    fn test_require_distinguishes_login_from_role() {
        let anonymous = Session::new();
        assert!(matches!(
            anonymous.gate().require(true, "list clients"),
            Err(OfficeError::Unauthenticated)
        ));

        let secretary = session_as(Role::Secretary);
        let gate = secretary.gate();
        assert!(matches!(
            gate.require(gate.can_manage_cases(), "create case"),
            Err(OfficeError::Forbidden("create case"))
        ));
        assert!(gate.require(true, "list clients").is_ok());
    }
}
