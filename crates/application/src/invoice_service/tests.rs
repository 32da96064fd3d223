use std::sync::Arc;

use labdesk_core::AppError;
use labdesk_domain::{
    Action, Doctor, InvoiceId, InvoiceStatus, LabModule, LabTest, Patient, PatientId, Permission,
    Role, TestId, User,
};

use crate::AuthorizationService;
use crate::test_support::{FakeLabStore, content, fixed_clock, line, staff};

use super::InvoiceService;

struct Fixture {
    store: Arc<FakeLabStore>,
    service: InvoiceService,
    admin: User,
    receptionist: User,
    accountant: User,
    patient: Patient,
    doctor: Doctor,
    cbc: LabTest,
    lipid: LabTest,
}

async fn fixture() -> Fixture {
    let admin = staff("root", Role::Admin);
    let receptionist = staff("rita", Role::Receptionist);
    let accountant = staff("abe", Role::Accountant);
    let store =
        FakeLabStore::with_users(&[admin.clone(), receptionist.clone(), accountant.clone()]).await;
    let patient = store.seed_patient("Amal Perera").await;
    let doctor = store.seed_doctor("Dr. Silva").await;
    let cbc = store.seed_test("CBC", "Hematology", 800.0).await;
    let lipid = store
        .seed_test("Lipid Profile", "Biochemistry", 1200.0)
        .await;
    let service = InvoiceService::new(
        AuthorizationService::new(store.clone()),
        store.clone(),
        store.clone(),
        store.clone(),
        fixed_clock(),
    );

    Fixture {
        store,
        service,
        admin,
        receptionist,
        accountant,
        patient,
        doctor,
        cbc,
        lipid,
    }
}

#[tokio::test]
async fn create_invoice_numbers_and_totals_draft() {
    let fx = fixture().await;

    let invoice = fx
        .service
        .create_invoice(
            fx.receptionist.id(),
            content(
                &fx.patient,
                &fx.doctor,
                vec![line(&fx.cbc, 1), line(&fx.lipid, 2)],
                500.0,
            ),
        )
        .await
        .unwrap_or_else(|_| unreachable!());

    assert_eq!(invoice.invoice_number(), "INV0001");
    assert_eq!(invoice.total_amount(), 3200.0);
    assert_eq!(invoice.final_amount(), 2700.0);
    assert_eq!(invoice.status(), InvoiceStatus::Draft);
    assert!(!invoice.is_locked());
    assert_eq!(invoice.created_by(), fx.receptionist.id());
    assert_eq!(
        fx.store.audit_actions().await,
        vec!["invoices.invoice.created"]
    );
}

#[tokio::test]
async fn invoice_numbers_follow_current_count() {
    let fx = fixture().await;
    let input = content(&fx.patient, &fx.doctor, vec![line(&fx.cbc, 1)], 0.0);

    let first = fx
        .service
        .create_invoice(fx.receptionist.id(), input.clone())
        .await
        .unwrap_or_else(|_| unreachable!());
    let second = fx
        .service
        .create_invoice(fx.receptionist.id(), input)
        .await
        .unwrap_or_else(|_| unreachable!());

    assert_eq!(first.invoice_number(), "INV0001");
    assert_eq!(second.invoice_number(), "INV0002");
}

#[tokio::test]
async fn create_invoice_rejects_empty_items_and_unknown_patient() {
    let fx = fixture().await;

    let empty = fx
        .service
        .create_invoice(
            fx.receptionist.id(),
            content(&fx.patient, &fx.doctor, Vec::new(), 0.0),
        )
        .await;

    let mut unknown_patient = content(&fx.patient, &fx.doctor, vec![line(&fx.cbc, 1)], 0.0);
    unknown_patient.patient_id = PatientId::new();
    let missing = fx
        .service
        .create_invoice(fx.receptionist.id(), unknown_patient)
        .await;

    assert!(matches!(empty, Err(AppError::Validation(_))));
    assert!(matches!(missing, Err(AppError::NotFound(_))));
    assert!(fx.store.invoices.lock().await.is_empty());
}

#[tokio::test]
async fn create_invoice_rejects_tests_missing_from_catalog() {
    let fx = fixture().await;
    let mut unknown = line(&fx.cbc, 1);
    unknown.test_id = TestId::new();

    let result = fx
        .service
        .create_invoice(
            fx.receptionist.id(),
            content(
                &fx.patient,
                &fx.doctor,
                vec![line(&fx.lipid, 1), unknown],
                0.0,
            ),
        )
        .await;

    assert!(matches!(result, Err(AppError::NotFound(_))));
    assert!(fx.store.invoices.lock().await.is_empty());
    assert!(fx.store.audit_actions().await.is_empty());
}

#[tokio::test]
async fn receptionist_cannot_edit_invoice() {
    let fx = fixture().await;
    let invoice = fx
        .service
        .create_invoice(
            fx.receptionist.id(),
            content(&fx.patient, &fx.doctor, vec![line(&fx.cbc, 1)], 0.0),
        )
        .await
        .unwrap_or_else(|_| unreachable!());

    let result = fx
        .service
        .update_invoice(
            fx.receptionist.id(),
            invoice.id(),
            content(&fx.patient, &fx.doctor, vec![line(&fx.cbc, 2)], 0.0),
        )
        .await;

    assert!(matches!(result, Err(AppError::Forbidden(_))));
}

#[tokio::test]
async fn update_invoice_recomputes_totals_and_keeps_number() {
    let fx = fixture().await;
    let input = content(&fx.patient, &fx.doctor, vec![line(&fx.cbc, 1)], 0.0);
    let first = fx
        .service
        .create_invoice(fx.receptionist.id(), input.clone())
        .await
        .unwrap_or_else(|_| unreachable!());
    fx.service
        .create_invoice(fx.receptionist.id(), input)
        .await
        .unwrap_or_else(|_| unreachable!());

    let revised = fx
        .service
        .update_invoice(
            fx.accountant.id(),
            first.id(),
            content(&fx.patient, &fx.doctor, vec![line(&fx.lipid, 3)], 100.0),
        )
        .await
        .unwrap_or_else(|_| unreachable!());

    assert_eq!(revised.invoice_number(), "INV0001");
    assert_eq!(revised.total_amount(), 3600.0);
    assert_eq!(revised.final_amount(), 3500.0);
}

#[tokio::test]
async fn locked_invoice_edit_requires_unlock_permission() {
    let fx = fixture().await;
    let invoice = fx
        .service
        .create_invoice(
            fx.receptionist.id(),
            content(&fx.patient, &fx.doctor, vec![line(&fx.cbc, 1)], 0.0),
        )
        .await
        .unwrap_or_else(|_| unreachable!());
    fx.service
        .set_locked(fx.admin.id(), invoice.id(), true)
        .await
        .unwrap_or_else(|_| unreachable!());

    let revision = content(&fx.patient, &fx.doctor, vec![line(&fx.cbc, 2)], 0.0);
    let by_accountant = fx
        .service
        .update_invoice(fx.accountant.id(), invoice.id(), revision.clone())
        .await;
    let status_by_accountant = fx
        .service
        .set_status(fx.accountant.id(), invoice.id(), InvoiceStatus::Paid)
        .await;
    let by_admin = fx
        .service
        .update_invoice(fx.admin.id(), invoice.id(), revision)
        .await;

    assert!(matches!(by_accountant, Err(AppError::Forbidden(_))));
    assert!(matches!(status_by_accountant, Err(AppError::Forbidden(_))));
    assert_eq!(
        by_admin.map(|invoice| invoice.total_amount()).ok(),
        Some(1600.0)
    );
}

#[tokio::test]
async fn granted_unlock_lets_accountant_revise_locked_invoice() {
    let fx = fixture().await;
    let invoice = fx
        .service
        .create_invoice(
            fx.receptionist.id(),
            content(&fx.patient, &fx.doctor, vec![line(&fx.cbc, 1)], 0.0),
        )
        .await
        .unwrap_or_else(|_| unreachable!());
    fx.service
        .set_locked(fx.admin.id(), invoice.id(), true)
        .await
        .unwrap_or_else(|_| unreachable!());
    {
        let mut users = fx.store.users.lock().await;
        if let Some(accountant) = users
            .iter_mut()
            .find(|user| user.id() == fx.accountant.id())
        {
            accountant.replace_custom_grants(vec![Permission::on(
                LabModule::Invoices,
                &[Action::Unlock],
            )]);
        }
    }

    let status = fx
        .service
        .set_status(fx.accountant.id(), invoice.id(), InvoiceStatus::Finalized)
        .await;

    assert_eq!(
        status.map(|invoice| invoice.status()).ok(),
        Some(InvoiceStatus::Finalized)
    );
}

#[tokio::test]
async fn locking_and_unlocking_need_their_own_actions() {
    let fx = fixture().await;
    let invoice = fx
        .service
        .create_invoice(
            fx.receptionist.id(),
            content(&fx.patient, &fx.doctor, vec![line(&fx.cbc, 1)], 0.0),
        )
        .await
        .unwrap_or_else(|_| unreachable!());
    {
        let mut users = fx.store.users.lock().await;
        if let Some(accountant) = users
            .iter_mut()
            .find(|user| user.id() == fx.accountant.id())
        {
            accountant.replace_custom_grants(vec![Permission::on(
                LabModule::Invoices,
                &[Action::Lock],
            )]);
        }
    }

    let locked = fx
        .service
        .set_locked(fx.accountant.id(), invoice.id(), true)
        .await;
    let unlocked = fx
        .service
        .set_locked(fx.accountant.id(), invoice.id(), false)
        .await;

    assert_eq!(locked.map(|invoice| invoice.is_locked()).ok(), Some(true));
    assert!(matches!(unlocked, Err(AppError::Forbidden(_))));
}

#[tokio::test]
async fn locked_invoice_cannot_be_deleted() {
    let fx = fixture().await;
    let invoice = fx
        .service
        .create_invoice(
            fx.receptionist.id(),
            content(&fx.patient, &fx.doctor, vec![line(&fx.cbc, 1)], 0.0),
        )
        .await
        .unwrap_or_else(|_| unreachable!());
    fx.service
        .set_locked(fx.admin.id(), invoice.id(), true)
        .await
        .unwrap_or_else(|_| unreachable!());

    let locked_delete = fx.service.delete_invoice(fx.admin.id(), invoice.id()).await;
    fx.service
        .set_locked(fx.admin.id(), invoice.id(), false)
        .await
        .unwrap_or_else(|_| unreachable!());
    let unlocked_delete = fx.service.delete_invoice(fx.admin.id(), invoice.id()).await;

    assert!(matches!(locked_delete, Err(AppError::Conflict(_))));
    assert!(unlocked_delete.is_ok());
    assert!(fx.store.invoices.lock().await.is_empty());
    assert_eq!(
        fx.store.audit_actions().await,
        vec![
            "invoices.invoice.created",
            "invoices.invoice.locked",
            "invoices.invoice.unlocked",
            "invoices.invoice.deleted",
        ]
    );
}

#[tokio::test]
async fn get_invoice_reports_missing_invoice() {
    let fx = fixture().await;

    let result = fx
        .service
        .get_invoice(fx.receptionist.id(), InvoiceId::new())
        .await;

    assert!(matches!(result, Err(AppError::NotFound(_))));
}
