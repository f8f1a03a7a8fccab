//! Relational integrity: references, uniqueness and restricted deletes.

#![allow(clippy::unwrap_used)]

use chrono::NaiveDate;
use law_office::OfficeError;
use law_office::models::{CaseFields, CaseSessionFields, InvoiceFields, TaskFields};
use law_office_core::{Amount, CaseId, ClientId, Role, UserId};
use law_office_integration_tests::{TestContext, client_named};

#[tokio::test]
async fn test_client_with_case_cannot_be_deleted() {
    let ctx = TestContext::new().await;
    let lawyer = ctx.session_for("alice", Role::Lawyer).await;
    let records = ctx.records();

    let acme = records.create_client(&lawyer, &client_named("Acme")).await.unwrap();
    let case = records
        .create_case(&lawyer, &CaseFields::new("2026/7", "Acme v. Smith", acme.id))
        .await
        .unwrap();

    let err = records.delete_client(&lawyer, acme.id).await.unwrap_err();
    assert!(matches!(err, OfficeError::Integrity(_)));
    assert!(err.to_string().contains("case"));

    assert!(records.get_client(&lawyer, acme.id).await.unwrap().is_some());
    assert!(records.get_case(&lawyer, case.id).await.unwrap().is_some());
}

#[tokio::test]
async fn test_case_requires_existing_client() {
    let ctx = TestContext::new().await;
    let records = ctx.records();

    let err = records
        .create_case(&ctx.admin, &CaseFields::new("2026/1", "Orphan", ClientId::new(404)))
        .await
        .unwrap_err();
    assert!(matches!(err, OfficeError::Integrity(_)));
    assert!(records.list_cases(&ctx.admin).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_duplicate_case_number_conflicts() {
    let ctx = TestContext::new().await;
    let records = ctx.records();
    let acme = records.create_client(&ctx.admin, &client_named("Acme")).await.unwrap();

    records
        .create_case(&ctx.admin, &CaseFields::new("2026/1", "First", acme.id))
        .await
        .unwrap();
    let err = records
        .create_case(&ctx.admin, &CaseFields::new("2026/1", "Second", acme.id))
        .await
        .unwrap_err();
    assert!(matches!(err, OfficeError::Conflict { field: "case_number", .. }));
    assert_eq!(records.list_cases(&ctx.admin).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_case_requires_existing_lawyer() {
    let ctx = TestContext::new().await;
    let records = ctx.records();
    let acme = records.create_client(&ctx.admin, &client_named("Acme")).await.unwrap();

    let mut fields = CaseFields::new("2026/2", "Acme v. Jones", acme.id);
    fields.assigned_lawyer_id = Some(UserId::new(999));
    assert!(matches!(
        records.create_case(&ctx.admin, &fields).await,
        Err(OfficeError::Integrity(_))
    ));
}

#[tokio::test]
async fn test_case_dependents_block_delete() {
    let ctx = TestContext::new().await;
    let records = ctx.records();
    let acme = records.create_client(&ctx.admin, &client_named("Acme")).await.unwrap();
    let case = records
        .create_case(&ctx.admin, &CaseFields::new("2026/3", "Acme v. Smith", acme.id))
        .await
        .unwrap();

    let hearing_at = NaiveDate::from_ymd_opt(2026, 11, 2)
        .unwrap()
        .and_hms_opt(9, 30, 0)
        .unwrap();
    let hearing = records
        .schedule_hearing(&ctx.admin, &CaseSessionFields::new(case.id, hearing_at))
        .await
        .unwrap();

    assert!(matches!(
        records.delete_case(&ctx.admin, case.id).await,
        Err(OfficeError::Integrity(_))
    ));

    records.delete_hearing(&ctx.admin, hearing.id).await.unwrap();
    records.delete_case(&ctx.admin, case.id).await.unwrap();
    records.delete_client(&ctx.admin, acme.id).await.unwrap();
}

#[tokio::test]
async fn test_task_with_missing_case_is_rejected() {
    let ctx = TestContext::new().await;
    let task = TaskFields {
        title: "Prepare brief".to_owned(),
        case_id: Some(CaseId::new(77)),
        ..TaskFields::default()
    };
    assert!(matches!(
        ctx.records().create_task(&ctx.admin, &task).await,
        Err(OfficeError::Integrity(_))
    ));
}

#[tokio::test]
async fn test_invoice_total_and_unique_number() {
    let ctx = TestContext::new().await;
    let records = ctx.records();
    let acme = records.create_client(&ctx.admin, &client_named("Acme")).await.unwrap();

    let mut fields = InvoiceFields::new(
        "INV-2026-001",
        acme.id,
        "1000.00".parse::<Amount>().unwrap(),
        NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(),
    );
    fields.tax_amount = "150.00".parse::<Amount>().unwrap();
    let invoice = records.create_invoice(&ctx.admin, &fields).await.unwrap();
    assert_eq!(invoice.total_amount.to_string(), "1150.00");

    assert!(matches!(
        records.create_invoice(&ctx.admin, &fields).await,
        Err(OfficeError::Conflict { field: "invoice_number", .. })
    ));

    assert!(matches!(
        records.delete_client(&ctx.admin, acme.id).await,
        Err(OfficeError::Integrity(_))
    ));
}

#[tokio::test]
async fn test_updated_at_moves_created_at_does_not() {
    let ctx = TestContext::new().await;
    let records = ctx.records();
    let created = records.create_client(&ctx.admin, &client_named("Acme")).await.unwrap();

    let mut fields = client_named("Acme Holdings");
    fields.notes = Some("renamed".to_owned());
    let updated = records.update_client(&ctx.admin, created.id, &fields).await.unwrap();

    assert_eq!(updated.created_at, created.created_at);
    assert!(updated.updated_at >= created.updated_at);
    assert_eq!(updated.name, "Acme Holdings");
}
