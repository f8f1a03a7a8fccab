//! Snapshots and restores of the whole store.

#![allow(clippy::unwrap_used)]

use law_office::OfficeError;
use law_office::services::maintenance;
use law_office_core::Role;
use law_office_integration_tests::{TestContext, client_named};

#[tokio::test]
async fn test_restore_returns_store_to_snapshot() {
    let mut ctx = TestContext::new().await;
    let records = ctx.records();
    records.create_client(&ctx.admin, &client_named("Acme")).await.unwrap();
    ctx.create_user("alice", "pw123", Role::Lawyer).await;

    let clients_before = ctx.records().list_clients(&ctx.admin).await.unwrap();
    let users_before = ctx.users().list_active(&ctx.admin).await.unwrap();

    let snapshot = maintenance::backup(&ctx.admin, &ctx.db, None)
        .await
        .unwrap()
        .unwrap();
    let name = snapshot.file_name().unwrap().to_string_lossy().into_owned();
    assert!(name.starts_with("law_office_backup_"));
    assert!(name.ends_with(".db"));

    ctx.records().create_client(&ctx.admin, &client_named("Globex")).await.unwrap();
    ctx.create_user("bob", "pw", Role::Secretary).await;

    assert!(maintenance::restore(&ctx.admin, &mut ctx.db, &snapshot).await.unwrap());

    assert_eq!(ctx.records().list_clients(&ctx.admin).await.unwrap(), clients_before);
    assert_eq!(ctx.users().list_active(&ctx.admin).await.unwrap(), users_before);
    assert!(!ctx.login("bob", "pw").await.is_authenticated());
    assert!(ctx.login("alice", "pw123").await.is_authenticated());
}

#[tokio::test]
async fn test_backup_to_explicit_path() {
    let ctx = TestContext::new().await;
    let target = ctx.dir.path().join("manual.db");

    let written = maintenance::backup(&ctx.admin, &ctx.db, Some(&target))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(written, target);

    let original = std::fs::read(ctx.db.path()).unwrap();
    let copy = std::fs::read(&target).unwrap();
    assert_eq!(original, copy);
}

#[tokio::test]
async fn test_restore_of_garbage_leaves_store_intact() {
    let mut ctx = TestContext::new().await;
    ctx.records().create_client(&ctx.admin, &client_named("Acme")).await.unwrap();

    let bogus = ctx.dir.path().join("not-a-db.db");
    std::fs::write(&bogus, b"definitely not sqlite").unwrap();

    assert!(!maintenance::restore(&ctx.admin, &mut ctx.db, &bogus).await.unwrap());
    assert_eq!(ctx.records().list_clients(&ctx.admin).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_lawyer_cannot_restore() {
    let mut ctx = TestContext::new().await;
    let alice = ctx.session_for("alice", Role::Lawyer).await;
    let snapshot = maintenance::backup(&ctx.admin, &ctx.db, None)
        .await
        .unwrap()
        .unwrap();

    assert!(matches!(
        maintenance::restore(&alice, &mut ctx.db, &snapshot).await,
        Err(OfficeError::Forbidden(_))
    ));
}
