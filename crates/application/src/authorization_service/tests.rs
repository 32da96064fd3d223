use labdesk_core::AppError;
use labdesk_domain::{Action, LabModule, Permission, Role, UserId};

use crate::test_support::{FakeLabStore, staff};

use super::AuthorizationService;

#[tokio::test]
async fn require_permission_allows_role_default_grant() {
    let receptionist = staff("rita", Role::Receptionist);
    let store = FakeLabStore::with_users(std::slice::from_ref(&receptionist)).await;
    let service = AuthorizationService::new(store);

    let result = service
        .require_permission(receptionist.id(), LabModule::Invoices, Action::Create)
        .await;

    assert_eq!(result.map(|user| user.id()).ok(), Some(receptionist.id()));
}

#[tokio::test]
async fn require_permission_denies_missing_grant() {
    let receptionist = staff("rita", Role::Receptionist);
    let store = FakeLabStore::with_users(std::slice::from_ref(&receptionist)).await;
    let service = AuthorizationService::new(store);

    let result = service
        .require_permission(receptionist.id(), LabModule::Invoices, Action::Delete)
        .await;

    assert!(matches!(result, Err(AppError::Forbidden(_))));
}

#[tokio::test]
async fn require_permission_rejects_unknown_actor() {
    let store = FakeLabStore::with_users(&[]).await;
    let service = AuthorizationService::new(store);

    let result = service
        .require_permission(UserId::new(), LabModule::Dashboard, Action::View)
        .await;

    assert!(matches!(result, Err(AppError::Unauthorized(_))));
}

#[tokio::test]
async fn deactivated_admin_is_treated_as_signed_out() {
    let mut admin = staff("root", Role::Admin);
    admin.set_active(false);
    let store = FakeLabStore::with_users(std::slice::from_ref(&admin)).await;
    let service = AuthorizationService::new(store);

    let allowed = service
        .has_permission(Some(admin.id()), "dashboard", Action::View)
        .await
        .unwrap_or(true);
    let required = service
        .require_permission(admin.id(), LabModule::Dashboard, Action::View)
        .await;

    assert!(!allowed);
    assert!(matches!(required, Err(AppError::Unauthorized(_))));
}

#[tokio::test]
async fn has_permission_without_actor_is_false() {
    let store = FakeLabStore::with_users(&[]).await;
    let service = AuthorizationService::new(store);

    let allowed = service
        .has_permission(None, "dashboard", Action::View)
        .await
        .unwrap_or(true);

    assert!(!allowed);
}

#[tokio::test]
async fn custom_grants_are_read_on_every_check() {
    let helper = staff("hana", Role::LabHelper);
    let store = FakeLabStore::with_users(std::slice::from_ref(&helper)).await;
    let service = AuthorizationService::new(store.clone());

    let before = service
        .has_permission(Some(helper.id()), "stock", Action::View)
        .await
        .unwrap_or(true);

    let granted = helper
        .clone()
        .with_custom_grants(vec![Permission::on(LabModule::Stock, &[Action::View])]);
    store.users.lock().await[0] = granted;

    let after = service
        .has_permission(Some(helper.id()), "stock", Action::View)
        .await
        .unwrap_or_default();

    assert!(!before);
    assert!(after);
}

#[tokio::test]
async fn accessible_modules_follow_role_defaults() {
    let accountant = staff("abe", Role::Accountant);
    let store = FakeLabStore::with_users(std::slice::from_ref(&accountant)).await;
    let service = AuthorizationService::new(store);

    let modules = service
        .accessible_modules(Some(accountant.id()))
        .await
        .unwrap_or_default();

    assert_eq!(
        modules,
        vec![
            LabModule::Invoices,
            LabModule::Expenses,
            LabModule::Analytics
        ]
    );
}
