use std::sync::Arc;

use chrono::Duration;
use labdesk_core::AppError;
use labdesk_domain::{AuditAction, LabModule, Role, User};

use crate::test_support::{FakeLabStore, fixed_now, staff};
use crate::{AuditEvent, AuditLogQuery, AuditRepository, AuthorizationService};

use super::AuditService;

async fn seeded(admin: &User, receptionist: &User) -> Arc<FakeLabStore> {
    let store = FakeLabStore::with_users(&[admin.clone(), receptionist.clone()]).await;
    let events = [
        (receptionist.id(), AuditAction::PatientRegistered),
        (receptionist.id(), AuditAction::InvoiceCreated),
        (admin.id(), AuditAction::InvoiceLocked),
        (admin.id(), AuditAction::UserCreated),
    ];

    for (offset, (actor, action)) in (0_i64..).zip(events) {
        store
            .append_event(AuditEvent {
                actor,
                action,
                resource_id: format!("resource-{offset}"),
                detail: None,
                recorded_at: fixed_now() + Duration::minutes(offset),
            })
            .await
            .unwrap_or_else(|_| unreachable!());
    }

    store
}

fn build_service(store: &Arc<FakeLabStore>) -> AuditService {
    AuditService::new(AuthorizationService::new(store.clone()), store.clone())
}

#[tokio::test]
async fn list_events_returns_newest_first() {
    let admin = staff("root", Role::Admin);
    let receptionist = staff("rita", Role::Receptionist);
    let store = seeded(&admin, &receptionist).await;
    let service = build_service(&store);

    let entries = service
        .list_events(admin.id(), AuditLogQuery::default())
        .await
        .unwrap_or_default();

    assert_eq!(
        entries.iter().map(|entry| entry.action).collect::<Vec<_>>(),
        vec![
            AuditAction::UserCreated,
            AuditAction::InvoiceLocked,
            AuditAction::InvoiceCreated,
            AuditAction::PatientRegistered,
        ]
    );
}

#[tokio::test]
async fn list_events_filters_by_module_and_actor() {
    let admin = staff("root", Role::Admin);
    let receptionist = staff("rita", Role::Receptionist);
    let store = seeded(&admin, &receptionist).await;
    let service = build_service(&store);

    let invoices = service
        .list_events(
            admin.id(),
            AuditLogQuery {
                module: Some(LabModule::Invoices),
                ..AuditLogQuery::default()
            },
        )
        .await
        .unwrap_or_default();
    let by_receptionist_in_invoices = service
        .list_events(
            admin.id(),
            AuditLogQuery {
                module: Some(LabModule::Invoices),
                actor: Some(receptionist.id()),
                ..AuditLogQuery::default()
            },
        )
        .await
        .unwrap_or_default();

    assert_eq!(invoices.len(), 2);
    assert_eq!(by_receptionist_in_invoices.len(), 1);
    assert_eq!(
        by_receptionist_in_invoices[0].action,
        AuditAction::InvoiceCreated
    );
}

#[tokio::test]
async fn list_events_applies_offset_and_limit() {
    let admin = staff("root", Role::Admin);
    let receptionist = staff("rita", Role::Receptionist);
    let store = seeded(&admin, &receptionist).await;
    let service = build_service(&store);

    let page = service
        .list_events(
            admin.id(),
            AuditLogQuery {
                limit: 2,
                offset: 1,
                ..AuditLogQuery::default()
            },
        )
        .await
        .unwrap_or_default();

    assert_eq!(
        page.iter().map(|entry| entry.action).collect::<Vec<_>>(),
        vec![AuditAction::InvoiceLocked, AuditAction::InvoiceCreated]
    );
}

#[tokio::test]
async fn non_admin_cannot_read_audit_trail() {
    let admin = staff("root", Role::Admin);
    let receptionist = staff("rita", Role::Receptionist);
    let store = seeded(&admin, &receptionist).await;
    let service = build_service(&store);

    let result = service
        .list_events(receptionist.id(), AuditLogQuery::default())
        .await;

    assert!(matches!(result, Err(AppError::Forbidden(_))));
}
