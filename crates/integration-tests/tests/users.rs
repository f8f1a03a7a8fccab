//! Account management through the user directory.

#![allow(clippy::unwrap_used)]

use law_office::OfficeError;
use law_office::models::UserChanges;
use law_office_core::{Email, Role};
use law_office_integration_tests::{TestContext, secret};

#[tokio::test]
async fn test_duplicate_username_conflicts_even_when_inactive() {
    let ctx = TestContext::new().await;
    let id = ctx.create_user("alice", "pw123", Role::Lawyer).await;

    let err = ctx
        .users()
        .create(&ctx.admin, "alice", secret("x"), "Other", Role::Secretary, None, None)
        .await
        .unwrap_err();
    assert!(matches!(err, OfficeError::Conflict { field: "username", .. }));

    ctx.users().deactivate_user(&ctx.admin, id).await.unwrap();
    let err = ctx
        .users()
        .create(&ctx.admin, "alice", secret("x"), "Other", Role::Secretary, None, None)
        .await
        .unwrap_err();
    assert!(matches!(err, OfficeError::Conflict { .. }));
}

#[tokio::test]
async fn test_deactivated_user_is_kept_but_hidden_from_lists() {
    let ctx = TestContext::new().await;
    let id = ctx.create_user("alice", "pw123", Role::Lawyer).await;
    ctx.users().deactivate_user(&ctx.admin, id).await.unwrap();

    let stored = ctx.users().find_by_id(&ctx.admin, id).await.unwrap().unwrap();
    assert!(!stored.is_active);

    let active = ctx.users().list_active(&ctx.admin).await.unwrap();
    assert!(active.iter().all(|u| u.id != id));
}

#[tokio::test]
async fn test_update_profile_fields() {
    let ctx = TestContext::new().await;
    let id = ctx.create_user("alice", "pw123", Role::Lawyer).await;

    let changes = UserChanges {
        email: Some(Some(Email::parse("alice@example.com").unwrap())),
        phone: Some(Some("555-0100".to_owned())),
        ..UserChanges::default()
    };
    assert!(ctx.users().update_user(&ctx.admin, id, &changes).await.unwrap());

    let user = ctx.users().find_by_username(&ctx.admin, "alice").await.unwrap().unwrap();
    assert_eq!(user.email.unwrap().as_str(), "alice@example.com");
    assert_eq!(user.phone.as_deref(), Some("555-0100"));
    assert!(user.updated_at >= user.created_at);

    let clear = UserChanges {
        phone: Some(None),
        ..UserChanges::default()
    };
    assert!(ctx.users().update_user(&ctx.admin, id, &clear).await.unwrap());
    let user = ctx.users().find_by_id(&ctx.admin, id).await.unwrap().unwrap();
    assert!(user.phone.is_none());
}

#[tokio::test]
async fn test_rename_to_taken_username_conflicts() {
    let ctx = TestContext::new().await;
    ctx.create_user("alice", "pw123", Role::Lawyer).await;
    let bob = ctx.create_user("bob", "pw", Role::Secretary).await;

    let rename = UserChanges {
        username: Some("alice".to_owned()),
        ..UserChanges::default()
    };
    assert!(matches!(
        ctx.users().update_user(&ctx.admin, bob, &rename).await,
        Err(OfficeError::Conflict { .. })
    ));
}

#[tokio::test]
async fn test_lawyer_cannot_edit_someone_else() {
    let ctx = TestContext::new().await;
    let bob = ctx.create_user("bob", "pw", Role::Secretary).await;
    let alice = ctx.session_for("alice", Role::Lawyer).await;

    let changes = UserChanges {
        full_name: Some("Robert".to_owned()),
        ..UserChanges::default()
    };
    assert!(matches!(
        ctx.users().update_user(&alice, bob, &changes).await,
        Err(OfficeError::Forbidden(_))
    ));
}

#[tokio::test]
async fn test_blank_password_rejected() {
    let ctx = TestContext::new().await;
    let err = ctx
        .users()
        .create(&ctx.admin, "carol", secret(""), "Carol", Role::Lawyer, None, None)
        .await
        .unwrap_err();
    assert!(matches!(err, OfficeError::Validation(_)));
    assert!(ctx.users().is_username_available(&ctx.admin, "carol", None).await.unwrap());
}
