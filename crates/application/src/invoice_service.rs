//! Invoice lifecycle: numbering, revision, status, locking and deletion.

use std::sync::Arc;

use labdesk_core::{AppError, AppResult};
use labdesk_domain::{
    Action, AuditAction, Invoice, InvoiceContent, InvoiceId, InvoiceStatus, LabModule, User,
    UserId, format_invoice_number,
};
use tracing::info;

use crate::authorization_service::ensure_allowed;
use crate::{
    AuditEvent, AuditRepository, AuthorizationService, Clock, InvoiceRepository,
    RegistryRepository,
};

/// Application service for patient invoices.
///
/// A locked invoice can only be revised, re-statused or unlocked by an account
/// holding `invoices:unlock`, and is never deleted.
#[derive(Clone)]
pub struct InvoiceService {
    authorization_service: AuthorizationService,
    invoices: Arc<dyn InvoiceRepository>,
    registry: Arc<dyn RegistryRepository>,
    audit_repository: Arc<dyn AuditRepository>,
    clock: Arc<dyn Clock>,
}

impl InvoiceService {
    /// Creates a new invoice service.
    #[must_use]
    pub fn new(
        authorization_service: AuthorizationService,
        invoices: Arc<dyn InvoiceRepository>,
        registry: Arc<dyn RegistryRepository>,
        audit_repository: Arc<dyn AuditRepository>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            authorization_service,
            invoices,
            registry,
            audit_repository,
            clock,
        }
    }

    /// Creates an unlocked draft invoice numbered after the current invoice count.
    pub async fn create_invoice(&self, actor: UserId, input: InvoiceContent) -> AppResult<Invoice> {
        self.authorization_service
            .require_permission(actor, LabModule::Invoices, Action::Create)
            .await?;
        self.ensure_parties_exist(&input).await?;

        let existing = self.invoices.count_invoices().await?;
        let invoice = Invoice::new(
            InvoiceId::new(),
            format_invoice_number(existing),
            input,
            self.clock.now(),
            actor,
        )?;

        self.invoices.save_invoice(invoice.clone()).await?;
        self.append_audit(
            actor,
            AuditAction::InvoiceCreated,
            &invoice,
            format!(
                "created {} for {:.2}",
                invoice.invoice_number(),
                invoice.final_amount()
            ),
        )
        .await?;

        info!(
            actor = %actor,
            invoice_number = invoice.invoice_number(),
            final_amount = invoice.final_amount(),
            "invoice created"
        );

        Ok(invoice)
    }

    /// Replaces the invoice content and recomputes totals.
    pub async fn update_invoice(
        &self,
        actor: UserId,
        invoice_id: InvoiceId,
        input: InvoiceContent,
    ) -> AppResult<Invoice> {
        let user = self
            .authorization_service
            .require_permission(actor, LabModule::Invoices, Action::Edit)
            .await?;
        let mut invoice = self.find_existing(invoice_id).await?;
        ensure_unlocked_or_may_unlock(&user, &invoice)?;
        self.ensure_parties_exist(&input).await?;

        invoice.revise(input)?;
        self.invoices.save_invoice(invoice.clone()).await?;

        self.append_audit(
            actor,
            AuditAction::InvoiceUpdated,
            &invoice,
            format!(
                "revised {} to {:.2}",
                invoice.invoice_number(),
                invoice.final_amount()
            ),
        )
        .await?;

        Ok(invoice)
    }

    /// Moves the invoice to another status.
    pub async fn set_status(
        &self,
        actor: UserId,
        invoice_id: InvoiceId,
        status: InvoiceStatus,
    ) -> AppResult<Invoice> {
        let user = self
            .authorization_service
            .require_permission(actor, LabModule::Invoices, Action::Edit)
            .await?;
        let mut invoice = self.find_existing(invoice_id).await?;
        ensure_unlocked_or_may_unlock(&user, &invoice)?;

        let previous = invoice.status();
        invoice.set_status(status);
        self.invoices.save_invoice(invoice.clone()).await?;

        self.append_audit(
            actor,
            AuditAction::InvoiceStatusChanged,
            &invoice,
            format!(
                "{} moved from {} to {}",
                invoice.invoice_number(),
                previous.as_str(),
                status.as_str()
            ),
        )
        .await?;

        Ok(invoice)
    }

    /// Locks or unlocks the invoice.
    pub async fn set_locked(
        &self,
        actor: UserId,
        invoice_id: InvoiceId,
        is_locked: bool,
    ) -> AppResult<Invoice> {
        let (action, audit_action) = if is_locked {
            (Action::Lock, AuditAction::InvoiceLocked)
        } else {
            (Action::Unlock, AuditAction::InvoiceUnlocked)
        };
        self.authorization_service
            .require_permission(actor, LabModule::Invoices, action)
            .await?;

        let mut invoice = self.find_existing(invoice_id).await?;
        invoice.set_locked(is_locked);
        self.invoices.save_invoice(invoice.clone()).await?;

        self.append_audit(
            actor,
            audit_action,
            &invoice,
            format!("{} {}", action.as_str(), invoice.invoice_number()),
        )
        .await?;

        Ok(invoice)
    }

    /// Deletes an unlocked invoice.
    pub async fn delete_invoice(&self, actor: UserId, invoice_id: InvoiceId) -> AppResult<()> {
        self.authorization_service
            .require_permission(actor, LabModule::Invoices, Action::Delete)
            .await?;

        let invoice = self.find_existing(invoice_id).await?;
        if invoice.is_locked() {
            return Err(AppError::Conflict(format!(
                "invoice {} is locked and cannot be deleted",
                invoice.invoice_number()
            )));
        }

        self.invoices.delete_invoice(invoice_id).await?;
        self.append_audit(
            actor,
            AuditAction::InvoiceDeleted,
            &invoice,
            format!("deleted {}", invoice.invoice_number()),
        )
        .await?;

        info!(actor = %actor, invoice_number = invoice.invoice_number(), "invoice deleted");
        Ok(())
    }

    /// Returns one invoice.
    pub async fn get_invoice(&self, actor: UserId, invoice_id: InvoiceId) -> AppResult<Invoice> {
        self.authorization_service
            .require_permission(actor, LabModule::Invoices, Action::View)
            .await?;

        self.find_existing(invoice_id).await
    }

    /// Lists invoices in creation order.
    pub async fn list_invoices(&self, actor: UserId) -> AppResult<Vec<Invoice>> {
        self.authorization_service
            .require_permission(actor, LabModule::Invoices, Action::View)
            .await?;

        self.invoices.list_invoices().await
    }

    async fn find_existing(&self, invoice_id: InvoiceId) -> AppResult<Invoice> {
        self.invoices
            .find_invoice(invoice_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("invoice '{invoice_id}' does not exist")))
    }

    async fn ensure_parties_exist(&self, content: &InvoiceContent) -> AppResult<()> {
        if self
            .registry
            .find_patient(content.patient_id)
            .await?
            .is_none()
        {
            return Err(AppError::NotFound(format!(
                "patient '{}' does not exist",
                content.patient_id
            )));
        }
        if self
            .registry
            .find_doctor(content.doctor_id)
            .await?
            .is_none()
        {
            return Err(AppError::NotFound(format!(
                "doctor '{}' does not exist",
                content.doctor_id
            )));
        }
        for item in &content.items {
            if self.registry.find_test(item.test_id).await?.is_none() {
                return Err(AppError::NotFound(format!(
                    "test '{}' ({}) is not in the catalog",
                    item.test_id, item.test_name
                )));
            }
        }

        Ok(())
    }

    async fn append_audit(
        &self,
        actor: UserId,
        action: AuditAction,
        invoice: &Invoice,
        detail: String,
    ) -> AppResult<()> {
        self.audit_repository
            .append_event(AuditEvent {
                actor,
                action,
                resource_id: invoice.id().to_string(),
                detail: Some(detail),
                recorded_at: self.clock.now(),
            })
            .await?;

        Ok(())
    }
}

fn ensure_unlocked_or_may_unlock(user: &User, invoice: &Invoice) -> AppResult<()> {
    if invoice.is_locked() {
        ensure_allowed(user, LabModule::Invoices, Action::Unlock)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests;
