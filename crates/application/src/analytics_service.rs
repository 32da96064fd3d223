use std::sync::Arc;

use chrono::{DateTime, Utc};
use labdesk_core::{AppError, AppResult};
use labdesk_domain::{
    Action, AnalyticsSummary, AuditAction, CategoryCount, DashboardSnapshot, DoctorPerformance,
    LabModule, MonthlyBucket, UserId, analytics_summary, category_distribution,
    dashboard_snapshot, doctor_performance, monthly_rollup,
};
use serde::Serialize;
use tracing::info;

use crate::{
    AuditEvent, AuditRepository, AuthorizationService, Clock, InvoiceRepository,
    RegistryRepository, ReportRepository,
};

/// Analytics view assembled from every invoice, report, expense and patient.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalyticsReport {
    /// When the report was computed.
    pub generated_at: DateTime<Utc>,
    /// Headline totals.
    pub summary: AnalyticsSummary,
    /// Trailing twelve months, oldest first.
    pub monthly: Vec<MonthlyBucket>,
    /// Reported tests per catalog category.
    pub categories: Vec<CategoryCount>,
    /// Top referring doctors by revenue.
    pub doctors: Vec<DoctorPerformance>,
}

/// Application service for analytics and the landing dashboard.
#[derive(Clone)]
pub struct AnalyticsService {
    authorization_service: AuthorizationService,
    invoices: Arc<dyn InvoiceRepository>,
    reports: Arc<dyn ReportRepository>,
    registry: Arc<dyn RegistryRepository>,
    audit_repository: Arc<dyn AuditRepository>,
    clock: Arc<dyn Clock>,
}

impl AnalyticsService {
    /// Creates a new analytics service.
    #[must_use]
    pub fn new(
        authorization_service: AuthorizationService,
        invoices: Arc<dyn InvoiceRepository>,
        reports: Arc<dyn ReportRepository>,
        registry: Arc<dyn RegistryRepository>,
        audit_repository: Arc<dyn AuditRepository>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            authorization_service,
            invoices,
            reports,
            registry,
            audit_repository,
            clock,
        }
    }

    /// Computes the analytics report as of the current clock.
    pub async fn analytics_report(&self, actor: UserId) -> AppResult<AnalyticsReport> {
        self.authorization_service
            .require_permission(actor, LabModule::Analytics, Action::View)
            .await?;

        self.build_report().await
    }

    /// Returns the analytics report as pretty-printed JSON and audits the export.
    pub async fn export_analytics(&self, actor: UserId) -> AppResult<String> {
        self.authorization_service
            .require_permission(actor, LabModule::Analytics, Action::Export)
            .await?;

        let report = self.build_report().await?;
        let payload = serde_json::to_string_pretty(&report).map_err(|error| {
            AppError::Internal(format!("failed to serialize analytics export: {error}"))
        })?;

        self.audit_repository
            .append_event(AuditEvent {
                actor,
                action: AuditAction::AnalyticsExported,
                resource_id: report.generated_at.to_rfc3339(),
                detail: Some(format!("exported {} bytes", payload.len())),
                recorded_at: self.clock.now(),
            })
            .await?;

        info!(actor = %actor, bytes = payload.len(), "analytics exported");
        Ok(payload)
    }

    /// Computes the dashboard counters as of the current clock.
    pub async fn dashboard(&self, actor: UserId) -> AppResult<DashboardSnapshot> {
        self.authorization_service
            .require_permission(actor, LabModule::Dashboard, Action::View)
            .await?;

        let patients = self.registry.list_patients().await?;
        let invoices = self.invoices.list_invoices().await?;
        let reports = self.reports.list_reports().await?;
        let stock = self.registry.list_stock_items().await?;
        let activity = self.audit_repository.list_entries().await?;

        Ok(dashboard_snapshot(
            self.clock.now(),
            &patients,
            &invoices,
            &reports,
            &stock,
            &activity,
        ))
    }

    async fn build_report(&self) -> AppResult<AnalyticsReport> {
        let invoices = self.invoices.list_invoices().await?;
        let reports = self.reports.list_reports().await?;
        let expenses = self.registry.list_expenses().await?;
        let patients = self.registry.list_patients().await?;
        let tests = self.registry.list_tests().await?;
        let doctors = self.registry.list_doctors().await?;
        let generated_at = self.clock.now();

        Ok(AnalyticsReport {
            generated_at,
            summary: analytics_summary(&invoices, &expenses, &reports),
            monthly: monthly_rollup(
                generated_at.date_naive(),
                &invoices,
                &expenses,
                &patients,
                &reports,
            ),
            categories: category_distribution(&reports, &tests),
            doctors: doctor_performance(&invoices, &doctors),
        })
    }
}

#[cfg(test)]
mod tests;
