//! Lab reports produced against billed invoices.

use std::sync::Arc;

use labdesk_core::{AppError, AppResult};
use labdesk_domain::{
    Action, AuditAction, InvoiceId, LabModule, Report, ReportContent, ReportId, ReportStatus,
    User, UserId,
};
use tracing::info;

use crate::authorization_service::ensure_allowed;
use crate::{
    AuditEvent, AuditRepository, AuthorizationService, Clock, InvoiceRepository,
    ReportRepository,
};

/// Input payload for creating a report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateReportInput {
    /// Finalized or paid invoice the report is produced for.
    pub invoice_id: InvoiceId,
    /// Results and interpretation.
    pub content: ReportContent,
}

/// Application service for lab reports.
#[derive(Clone)]
pub struct ReportService {
    authorization_service: AuthorizationService,
    reports: Arc<dyn ReportRepository>,
    invoices: Arc<dyn InvoiceRepository>,
    audit_repository: Arc<dyn AuditRepository>,
    clock: Arc<dyn Clock>,
}

impl ReportService {
    /// Creates a new report service.
    #[must_use]
    pub fn new(
        authorization_service: AuthorizationService,
        reports: Arc<dyn ReportRepository>,
        invoices: Arc<dyn InvoiceRepository>,
        audit_repository: Arc<dyn AuditRepository>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            authorization_service,
            reports,
            invoices,
            audit_repository,
            clock,
        }
    }

    /// Creates a pending report for a finalized or paid invoice.
    ///
    /// Patient and doctor are copied from the invoice.
    pub async fn create_report(
        &self,
        actor: UserId,
        input: CreateReportInput,
    ) -> AppResult<Report> {
        self.authorization_service
            .require_permission(actor, LabModule::Reports, Action::Create)
            .await?;

        let invoice = self
            .invoices
            .find_invoice(input.invoice_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("invoice '{}' does not exist", input.invoice_id))
            })?;
        if !invoice.status().is_reportable() {
            return Err(AppError::Conflict(format!(
                "invoice {} is {}; reports need a finalized or paid invoice",
                invoice.invoice_number(),
                invoice.status().as_str()
            )));
        }

        let report = Report::new(
            ReportId::new(),
            invoice.id(),
            invoice.patient_id(),
            invoice.doctor_id(),
            input.content,
            self.clock.now(),
            actor,
        )?;

        self.reports.save_report(report.clone()).await?;
        self.append_audit(
            actor,
            AuditAction::ReportCreated,
            report.id(),
            format!(
                "created report for {} with {} results",
                invoice.invoice_number(),
                report.tests().len()
            ),
        )
        .await?;

        info!(
            actor = %actor,
            report_id = %report.id(),
            invoice_number = invoice.invoice_number(),
            "report created"
        );

        Ok(report)
    }

    /// Replaces the report results.
    pub async fn update_report(
        &self,
        actor: UserId,
        report_id: ReportId,
        content: ReportContent,
    ) -> AppResult<Report> {
        let user = self
            .authorization_service
            .require_permission(actor, LabModule::Reports, Action::Edit)
            .await?;
        let mut report = self.find_existing(report_id).await?;
        ensure_unlocked_or_may_unlock(&user, &report)?;

        report.revise(content)?;
        self.reports.save_report(report.clone()).await?;

        self.append_audit(
            actor,
            AuditAction::ReportUpdated,
            report_id,
            format!("revised results, {} abnormal", report.abnormal_count()),
        )
        .await?;

        Ok(report)
    }

    /// Moves the report to another status.
    ///
    /// Verification needs `reports:verify` and a completed report, and stamps
    /// the verifier. Leaving `locked` needs `reports:unlock`.
    pub async fn set_status(
        &self,
        actor: UserId,
        report_id: ReportId,
        status: ReportStatus,
    ) -> AppResult<Report> {
        let user = self
            .authorization_service
            .require_permission(actor, LabModule::Reports, Action::Edit)
            .await?;
        let mut report = self.find_existing(report_id).await?;
        let previous = report.status();
        if status != ReportStatus::Locked {
            ensure_unlocked_or_may_unlock(&user, &report)?;
        }

        if status == ReportStatus::Verified {
            ensure_allowed(&user, LabModule::Reports, Action::Verify)?;
            report.verify(actor, self.clock.now())?;
        } else {
            report.set_status(status)?;
        }

        self.reports.save_report(report.clone()).await?;
        self.append_audit(
            actor,
            AuditAction::ReportStatusChanged,
            report_id,
            format!("moved from {} to {}", previous.as_str(), status.as_str()),
        )
        .await?;

        Ok(report)
    }

    /// Deletes a report that is not locked.
    pub async fn delete_report(&self, actor: UserId, report_id: ReportId) -> AppResult<()> {
        self.authorization_service
            .require_permission(actor, LabModule::Reports, Action::Delete)
            .await?;

        let report = self.find_existing(report_id).await?;
        if report.is_locked() {
            return Err(AppError::Conflict(format!(
                "report '{report_id}' is locked and cannot be deleted"
            )));
        }

        self.reports.delete_report(report_id).await?;
        self.append_audit(
            actor,
            AuditAction::ReportDeleted,
            report_id,
            format!("deleted report for invoice '{}'", report.invoice_id()),
        )
        .await
    }

    /// Returns one report.
    pub async fn get_report(&self, actor: UserId, report_id: ReportId) -> AppResult<Report> {
        self.authorization_service
            .require_permission(actor, LabModule::Reports, Action::View)
            .await?;

        self.find_existing(report_id).await
    }

    /// Lists reports in creation order.
    pub async fn list_reports(&self, actor: UserId) -> AppResult<Vec<Report>> {
        self.authorization_service
            .require_permission(actor, LabModule::Reports, Action::View)
            .await?;

        self.reports.list_reports().await
    }

    async fn find_existing(&self, report_id: ReportId) -> AppResult<Report> {
        self.reports
            .find_report(report_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("report '{report_id}' does not exist")))
    }

    async fn append_audit(
        &self,
        actor: UserId,
        action: AuditAction,
        report_id: ReportId,
        detail: String,
    ) -> AppResult<()> {
        self.audit_repository
            .append_event(AuditEvent {
                actor,
                action,
                resource_id: report_id.to_string(),
                detail: Some(detail),
                recorded_at: self.clock.now(),
            })
            .await?;

        Ok(())
    }
}

fn ensure_unlocked_or_may_unlock(user: &User, report: &Report) -> AppResult<()> {
    if report.is_locked() {
        ensure_allowed(user, LabModule::Reports, Action::Unlock)?;
    }

    Ok(())
}
