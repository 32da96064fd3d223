use std::sync::Arc;

use labdesk_core::AppError;
use labdesk_domain::{
    Invoice, InvoiceId, Report, ReportContent, ReportId, ReportTestResult, Role, StockItem,
    StockItemId, User,
};

use crate::AuthorizationService;
use crate::test_support::{FakeLabStore, content, fixed_clock, fixed_now, line, staff};

use super::AnalyticsService;

struct Fixture {
    store: Arc<FakeLabStore>,
    service: AnalyticsService,
    manager: User,
    accountant: User,
    helper: User,
}

async fn fixture() -> Fixture {
    let manager = staff("mona", Role::Manager);
    let accountant = staff("abe", Role::Accountant);
    let helper = staff("hana", Role::LabHelper);
    let store =
        FakeLabStore::with_users(&[manager.clone(), accountant.clone(), helper.clone()]).await;

    let patient = store.seed_patient("Amal Perera").await;
    let silva = store.seed_doctor("Dr. Silva").await;
    let fernando = store.seed_doctor("Dr. Fernando").await;
    let cbc = store.seed_test("CBC", "Hematology", 800.0).await;
    let lipid = store
        .seed_test("Lipid Profile", "Biochemistry", 1200.0)
        .await;

    let first = Invoice::new(
        InvoiceId::new(),
        "INV0001",
        content(&patient, &silva, vec![line(&cbc, 1)], 0.0),
        fixed_now(),
        manager.id(),
    )
    .unwrap_or_else(|_| unreachable!());
    let second = Invoice::new(
        InvoiceId::new(),
        "INV0002",
        content(&patient, &fernando, vec![line(&lipid, 2)], 400.0),
        fixed_now(),
        manager.id(),
    )
    .unwrap_or_else(|_| unreachable!());

    let report = Report::new(
        ReportId::new(),
        second.id(),
        patient.id,
        fernando.id,
        ReportContent {
            tests: vec![
                ReportTestResult {
                    test_id: lipid.id,
                    test_name: lipid.name.clone(),
                    result: "190".to_owned(),
                    normal_range: "< 200".to_owned(),
                    unit: Some("mg/dL".to_owned()),
                    is_abnormal: false,
                },
                ReportTestResult {
                    test_id: cbc.id,
                    test_name: cbc.name.clone(),
                    result: "11.0".to_owned(),
                    normal_range: "12.0 - 15.5".to_owned(),
                    unit: Some("g/dL".to_owned()),
                    is_abnormal: true,
                },
            ],
            template_id: None,
            interpretation: None,
            critical_values: false,
        },
        fixed_now(),
        manager.id(),
    )
    .unwrap_or_else(|_| unreachable!());

    store.invoices.lock().await.extend([first, second]);
    store.reports.lock().await.push(report);
    store.stock.lock().await.push(StockItem {
        id: StockItemId::new(),
        name: "CBC reagent".to_owned(),
        category: "Reagents".to_owned(),
        current_stock: 3,
        reorder_level: 5,
        unit: "Kit".to_owned(),
    });

    let service = AnalyticsService::new(
        AuthorizationService::new(store.clone()),
        store.clone(),
        store.clone(),
        store.clone(),
        store.clone(),
        fixed_clock(),
    );

    Fixture {
        store,
        service,
        manager,
        accountant,
        helper,
    }
}

#[tokio::test]
async fn analytics_report_combines_every_aggregate() {
    let fx = fixture().await;

    let report = fx
        .service
        .analytics_report(fx.accountant.id())
        .await
        .unwrap_or_else(|_| unreachable!());

    assert_eq!(report.generated_at, fixed_now());
    assert_eq!(report.summary.total_revenue, 2800.0);
    assert_eq!(report.summary.total_tests, 2);
    assert_eq!(report.monthly.len(), 12);
    assert_eq!(
        report.monthly.last().map(|bucket| bucket.revenue),
        Some(2800.0)
    );
    assert_eq!(
        report
            .categories
            .iter()
            .map(|entry| entry.category.as_str())
            .collect::<Vec<_>>(),
        vec!["Biochemistry", "Hematology"]
    );
    assert_eq!(
        report
            .doctors
            .iter()
            .map(|entry| entry.name.as_str())
            .collect::<Vec<_>>(),
        vec!["Dr. Fernando", "Dr. Silva"]
    );
}

#[tokio::test]
async fn export_requires_export_permission() {
    let fx = fixture().await;

    let result = fx.service.export_analytics(fx.accountant.id()).await;

    assert!(matches!(result, Err(AppError::Forbidden(_))));
    assert!(fx.store.audit.lock().await.is_empty());
}

#[tokio::test]
async fn export_returns_pretty_json_and_audits() {
    let fx = fixture().await;

    let payload = fx
        .service
        .export_analytics(fx.manager.id())
        .await
        .unwrap_or_default();
    let parsed: serde_json::Value = serde_json::from_str(&payload).unwrap_or_default();

    assert!(payload.contains('\n'));
    assert_eq!(parsed["summary"]["total_revenue"], 2800.0);
    assert_eq!(
        fx.store.audit_actions().await,
        vec!["analytics.snapshot.exported"]
    );
}

#[tokio::test]
async fn lab_helper_sees_dashboard_but_not_analytics() {
    let fx = fixture().await;

    let dashboard = fx
        .service
        .dashboard(fx.helper.id())
        .await
        .unwrap_or_else(|_| unreachable!());
    let analytics = fx.service.analytics_report(fx.helper.id()).await;

    assert_eq!(dashboard.total_patients, 1);
    assert_eq!(dashboard.today_patients, 1);
    assert_eq!(dashboard.today_revenue, 2800.0);
    assert_eq!(dashboard.pending_reports, 1);
    assert_eq!(dashboard.low_stock_items, 1);
    assert!(matches!(analytics, Err(AppError::Forbidden(_))));
}
