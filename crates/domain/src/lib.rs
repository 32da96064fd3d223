//! Domain entities, invariants and the pure authorization and billing rules.

#![forbid(unsafe_code)]

mod analytics;
mod audit;
mod authorization;
mod billing;
mod dashboard;
mod identifiers;
mod registry;
mod report;
mod security;
mod user;

pub use analytics::{
    AnalyticsSummary, CategoryCount, DOCTOR_RANKING_LIMIT, DoctorPerformance, MonthKey,
    MonthlyBucket, ROLLUP_MONTHS, analytics_summary, category_distribution, doctor_performance,
    monthly_rollup, trailing_months,
};
pub use audit::AuditEntry;
pub use authorization::{accessible_modules, grants_allow, has_permission};
pub use billing::{
    INVOICE_NUMBER_PREFIX, INVOICE_NUMBER_WIDTH, Invoice, InvoiceContent, InvoiceLineItem,
    InvoiceStatus, InvoiceTotals, compute_final_amount, compute_invoice_totals, compute_subtotal,
    format_invoice_number,
};
pub use dashboard::{DashboardSnapshot, RECENT_ACTIVITY_LIMIT, dashboard_snapshot};
pub use identifiers::{
    AuditEntryId, DoctorId, ExpenseId, InvoiceId, PatientId, ReportId, StockItemId, TestId, UserId,
};
pub use registry::{Doctor, Expense, Gender, LabTest, Patient, StockItem, StockMovement};
pub use report::{Report, ReportContent, ReportStatus, ReportTestResult};
pub use security::{
    ALL_MODULES, Action, AuditAction, LabModule, Permission, Role, default_permissions_for,
};
pub use user::{EmailAddress, User};
