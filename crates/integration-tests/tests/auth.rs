//! Login, logout and permission checks against a real store.

#![allow(clippy::unwrap_used)]

use law_office::OfficeError;
use law_office::models::CaseFields;
use law_office_core::Role;
use law_office_integration_tests::{TestContext, client_named};

#[tokio::test]
async fn test_alice_login_lifecycle() {
    let ctx = TestContext::new().await;
    let alice = ctx.create_user("alice", "pw123", Role::Lawyer).await;

    let mut session = ctx.login("alice", "pw123").await;
    assert!(session.is_authenticated());
    assert_eq!(session.current_user().unwrap().role, Role::Lawyer);
    assert!(session.gate().can_manage_cases());
    assert!(!session.gate().can_manage_users());
    session.logout();
    assert!(!session.is_authenticated());

    let wrong = ctx.login("alice", "wrong").await;
    assert!(!wrong.is_authenticated());

    assert!(ctx.users().deactivate_user(&ctx.admin, alice).await.unwrap());
    let after = ctx.login("alice", "pw123").await;
    assert!(!after.is_authenticated());
}

#[tokio::test]
async fn test_lawyer_permission_across_roles() {
    let ctx = TestContext::new().await;
    let lawyer = ctx.session_for("larry", Role::Lawyer).await;
    let secretary = ctx.session_for("sam", Role::Secretary).await;
    let nobody = ctx.login("ghost", "pw").await;

    assert!(ctx.admin.gate().has_permission(Some(Role::Lawyer)));
    assert!(lawyer.gate().has_permission(Some(Role::Lawyer)));
    assert!(!secretary.gate().has_permission(Some(Role::Lawyer)));
    assert!(!nobody.gate().has_permission(Some(Role::Lawyer)));
}

#[tokio::test]
async fn test_role_change_applies_at_next_login() {
    let ctx = TestContext::new().await;
    let id = ctx.create_user("sam", "pw", Role::Secretary).await;
    let before = ctx.login("sam", "pw").await;

    let promote = law_office::models::UserChanges {
        role: Some(Role::Lawyer),
        ..Default::default()
    };
    assert!(ctx.users().update_user(&ctx.admin, id, &promote).await.unwrap());

    let acme = ctx.records().create_client(&before, &client_named("Acme")).await.unwrap();
    let fields = CaseFields::new("2026/1", "Acme v. Smith", acme.id);
    assert!(matches!(
        ctx.records().create_case(&before, &fields).await,
        Err(OfficeError::Forbidden(_))
    ));

    let after = ctx.login("sam", "pw").await;
    ctx.records().create_case(&after, &fields).await.unwrap();
}
