mod audit;
mod billing;
mod clock;
mod registry;
mod users;

pub use audit::{AuditEvent, AuditLogQuery, AuditRepository};
pub use billing::{InvoiceRepository, ReportRepository};
pub use clock::Clock;
pub use registry::RegistryRepository;
pub use users::UserRepository;
