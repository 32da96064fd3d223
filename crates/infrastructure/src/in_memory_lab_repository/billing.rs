use super::*;

#[async_trait]
impl InvoiceRepository for InMemoryLabRepository {
    async fn count_invoices(&self) -> AppResult<usize> {
        Ok(self.invoices.read().await.len())
    }

    async fn find_invoice(&self, invoice_id: InvoiceId) -> AppResult<Option<Invoice>> {
        Ok(self.invoices.read().await.get(invoice_id))
    }

    async fn list_invoices(&self) -> AppResult<Vec<Invoice>> {
        Ok(self.invoices.read().await.values())
    }

    async fn save_invoice(&self, invoice: Invoice) -> AppResult<()> {
        self.invoices.write().await.upsert(invoice.id(), invoice);
        Ok(())
    }

    async fn delete_invoice(&self, invoice_id: InvoiceId) -> AppResult<()> {
        self.invoices
            .write()
            .await
            .remove(invoice_id)
            .map(|_| ())
            .ok_or_else(|| AppError::NotFound(format!("invoice '{invoice_id}' does not exist")))
    }
}

#[async_trait]
impl ReportRepository for InMemoryLabRepository {
    async fn find_report(&self, report_id: ReportId) -> AppResult<Option<Report>> {
        Ok(self.reports.read().await.get(report_id))
    }

    async fn list_reports(&self) -> AppResult<Vec<Report>> {
        Ok(self.reports.read().await.values())
    }

    async fn save_report(&self, report: Report) -> AppResult<()> {
        self.reports.write().await.upsert(report.id(), report);
        Ok(())
    }

    async fn delete_report(&self, report_id: ReportId) -> AppResult<()> {
        self.reports
            .write()
            .await
            .remove(report_id)
            .map(|_| ())
            .ok_or_else(|| AppError::NotFound(format!("report '{report_id}' does not exist")))
    }
}
