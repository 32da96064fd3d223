use async_trait::async_trait;
use labdesk_core::AppResult;
use labdesk_domain::{Invoice, InvoiceId, Report, ReportId};

/// Repository port for invoices.
#[async_trait]
pub trait InvoiceRepository: Send + Sync {
    /// Returns how many invoices currently exist.
    async fn count_invoices(&self) -> AppResult<usize>;

    /// Finds an invoice by identifier.
    async fn find_invoice(&self, invoice_id: InvoiceId) -> AppResult<Option<Invoice>>;

    /// Lists invoices in creation order.
    async fn list_invoices(&self) -> AppResult<Vec<Invoice>>;

    /// Inserts or replaces an invoice.
    async fn save_invoice(&self, invoice: Invoice) -> AppResult<()>;

    /// Removes an invoice.
    async fn delete_invoice(&self, invoice_id: InvoiceId) -> AppResult<()>;
}

/// Repository port for lab reports.
#[async_trait]
pub trait ReportRepository: Send + Sync {
    /// Finds a report by identifier.
    async fn find_report(&self, report_id: ReportId) -> AppResult<Option<Report>>;

    /// Lists reports in creation order.
    async fn list_reports(&self) -> AppResult<Vec<Report>>;

    /// Inserts or replaces a report.
    async fn save_report(&self, report: Report) -> AppResult<()>;

    /// Removes a report.
    async fn delete_report(&self, report_id: ReportId) -> AppResult<()>;
}
