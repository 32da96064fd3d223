//! Application services and ports.

#![forbid(unsafe_code)]

mod analytics_service;
mod audit_service;
mod authorization_service;
mod invoice_service;
mod lab_ports;
mod registry_service;
mod report_service;
mod user_service;

#[cfg(test)]
mod test_support;

pub use analytics_service::{AnalyticsReport, AnalyticsService};
pub use audit_service::AuditService;
pub use authorization_service::AuthorizationService;
pub use invoice_service::InvoiceService;
pub use lab_ports::{
    AuditEvent, AuditLogQuery, AuditRepository, Clock, InvoiceRepository, RegistryRepository,
    ReportRepository, UserRepository,
};
pub use registry_service::{
    NewDoctor, NewExpense, NewLabTest, NewPatient, NewStockItem, RegistryService,
};
pub use report_service::{CreateReportInput, ReportService};
pub use user_service::{CreateUserInput, UserService};
