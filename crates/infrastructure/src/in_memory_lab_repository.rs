use async_trait::async_trait;
use labdesk_application::{
    AuditEvent, AuditRepository, InvoiceRepository, RegistryRepository, ReportRepository,
    UserRepository,
};
use labdesk_core::{AppError, AppResult};
use labdesk_domain::{
    AuditEntry, AuditEntryId, Doctor, DoctorId, EmailAddress, Expense, ExpenseId, Invoice,
    InvoiceId, LabTest, Patient, PatientId, Report, ReportId, StockItem, StockItemId, TestId,
    User, UserId,
};
use tokio::sync::RwLock;
use tracing::debug;

mod audit;
mod billing;
mod registry;
mod table;
mod users;

use table::OrderedTable;

/// In-memory repository backing every lab port.
///
/// Each collection sits behind its own lock and lists rows in insertion order.
#[derive(Debug, Default)]
pub struct InMemoryLabRepository {
    users: RwLock<OrderedTable<UserId, User>>,
    invoices: RwLock<OrderedTable<InvoiceId, Invoice>>,
    reports: RwLock<OrderedTable<ReportId, Report>>,
    patients: RwLock<OrderedTable<PatientId, Patient>>,
    doctors: RwLock<OrderedTable<DoctorId, Doctor>>,
    tests: RwLock<OrderedTable<TestId, LabTest>>,
    expenses: RwLock<OrderedTable<ExpenseId, Expense>>,
    stock: RwLock<OrderedTable<StockItemId, StockItem>>,
    audit: RwLock<Vec<AuditEntry>>,
}

impl InMemoryLabRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}
