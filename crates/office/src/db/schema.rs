//! Table catalogue and foreign-key lifecycle rules.
//!
//! SQLite enforces the constraints in the migration; this module declares the
//! same relationships in Rust so repositories can check them up front and
//! report which dependents block a delete.

use sqlx::SqliteConnection;

use super::RepositoryError;

use DeletePolicy::{ParentSoftDeleted, Restrict};
use Table::{Appointments, CaseSessions, Cases, Clients, Documents, Invoices, Tasks, Users};

/// Every table in the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    Users,
    Clients,
    Cases,
    Tasks,
    Appointments,
    Documents,
    Invoices,
    CaseSessions,
    Settings,
}

impl Table {
    /// All tables, parents before children.
    pub const ALL: [Self; 9] = [
        Self::Users,
        Self::Clients,
        Self::Cases,
        Self::Tasks,
        Self::Appointments,
        Self::Documents,
        Self::Invoices,
        Self::CaseSessions,
        Self::Settings,
    ];

    /// SQL table name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Users => "users",
            Self::Clients => "clients",
            Self::Cases => "cases",
            Self::Tasks => "tasks",
            Self::Appointments => "appointments",
            Self::Documents => "documents",
            Self::Invoices => "invoices",
            Self::CaseSessions => "case_sessions",
            Self::Settings => "settings",
        }
    }

    /// Singular noun used in messages.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Users => "user",
            Self::Clients => "client",
            Self::Cases => "case",
            Self::Tasks => "task",
            Self::Appointments => "appointment",
            Self::Documents => "document",
            Self::Invoices => "invoice",
            Self::CaseSessions => "hearing",
            Self::Settings => "setting",
        }
    }
}

/// What happens to a child row when its parent is deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeletePolicy {
    /// The parent cannot be deleted while children reference it.
    Restrict,
    /// The parent is only ever deactivated, so the reference stays valid.
    ParentSoftDeleted,
}

/// A declared foreign key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ForeignKey {
    pub child: Table,
    pub column: &'static str,
    pub parent: Table,
    pub on_delete: DeletePolicy,
}

const fn fk(
    child: Table,
    column: &'static str,
    parent: Table,
    on_delete: DeletePolicy,
) -> ForeignKey {
    ForeignKey {
        child,
        column,
        parent,
        on_delete,
    }
}

/// Every foreign key in the schema.
pub const FOREIGN_KEYS: &[ForeignKey] = &[
    fk(Cases, "client_id", Clients, Restrict),
    fk(Tasks, "client_id", Clients, Restrict),
    fk(Appointments, "client_id", Clients, Restrict),
    fk(Documents, "client_id", Clients, Restrict),
    fk(Invoices, "client_id", Clients, Restrict),
    fk(Tasks, "case_id", Cases, Restrict),
    fk(Appointments, "case_id", Cases, Restrict),
    fk(Documents, "case_id", Cases, Restrict),
    fk(Invoices, "case_id", Cases, Restrict),
    fk(CaseSessions, "case_id", Cases, Restrict),
    fk(Clients, "created_by", Users, ParentSoftDeleted),
    fk(Cases, "created_by", Users, ParentSoftDeleted),
    fk(Cases, "assigned_lawyer_id", Users, ParentSoftDeleted),
    fk(Tasks, "assigned_to", Users, ParentSoftDeleted),
    fk(Tasks, "created_by", Users, ParentSoftDeleted),
    fk(Appointments, "created_by", Users, ParentSoftDeleted),
    fk(Documents, "uploaded_by", Users, ParentSoftDeleted),
    fk(Invoices, "created_by", Users, ParentSoftDeleted),
    fk(CaseSessions, "created_by", Users, ParentSoftDeleted),
];

/// Foreign keys that block deleting a row of `parent`.
pub fn restricting(parent: Table) -> impl Iterator<Item = &'static ForeignKey> {
    FOREIGN_KEYS
        .iter()
        .filter(move |fk| fk.parent == parent && fk.on_delete == Restrict)
}

/// Fail with `Integrity` if any row still references `parent` row `id`.
///
/// The message lists each blocking table with its row count, e.g.
/// `client 4 is still referenced by 2 case(s), 1 invoice(s)`.
pub(crate) async fn ensure_no_dependents(
    conn: &mut SqliteConnection,
    parent: Table,
    id: i64,
) -> Result<(), RepositoryError> {
    let mut blockers = Vec::new();

    for fk in restricting(parent) {
        let sql = format!(
            "SELECT COUNT(*) FROM {} WHERE {} = ?",
            fk.child.name(),
            fk.column
        );
        let count: i64 = sqlx::query_scalar(&sql)
            .bind(id)
            .fetch_one(&mut *conn)
            .await?;

        if count > 0 {
            blockers.push(format!("{count} {}(s)", fk.child.label()));
        }
    }

    if blockers.is_empty() {
        return Ok(());
    }

    Err(RepositoryError::Integrity(format!(
        "{} {id} is still referenced by {}",
        parent.label(),
        blockers.join(", ")
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clients_are_restricted_by_every_child() {
        let children: Vec<Table> = restricting(Clients).map(|fk| fk.child).collect();
        assert_eq!(children, vec![Cases, Tasks, Appointments, Documents, Invoices]);
    }

    #[test]
    fn test_cases_are_restricted_by_hearings() {
        assert!(restricting(Cases).any(|fk| fk.child == CaseSessions));
    }

    #[test]
    fn test_users_never_restrict() {
        assert_eq!(restricting(Users).count(), 0);
        assert!(
            FOREIGN_KEYS
                .iter()
                .filter(|fk| fk.parent == Users)
                .all(|fk| fk.on_delete == ParentSoftDeleted)
        );
    }

    #[test]
    fn test_parents_precede_children_in_catalogue() {
        let position = |t: Table| Table::ALL.iter().position(|x| *x == t);
        for fk in FOREIGN_KEYS {
            assert!(position(fk.parent) < position(fk.child), "{fk:?}");
        }
    }
}
