use std::sync::Arc;

use labdesk_core::AppResult;
use labdesk_domain::{Action, AuditEntry, LabModule, UserId};

use crate::{AuditLogQuery, AuditRepository, AuthorizationService};

/// Application service for reading the audit trail.
#[derive(Clone)]
pub struct AuditService {
    authorization_service: AuthorizationService,
    audit_repository: Arc<dyn AuditRepository>,
}

impl AuditService {
    /// Creates a new audit service.
    #[must_use]
    pub fn new(
        authorization_service: AuthorizationService,
        audit_repository: Arc<dyn AuditRepository>,
    ) -> Self {
        Self {
            authorization_service,
            audit_repository,
        }
    }

    /// Lists audit entries newest first, filtered and paginated by `query`.
    pub async fn list_events(
        &self,
        actor: UserId,
        query: AuditLogQuery,
    ) -> AppResult<Vec<AuditEntry>> {
        self.authorization_service
            .require_permission(actor, LabModule::Audit, Action::View)
            .await?;

        let entries = self.audit_repository.list_entries().await?;

        Ok(entries
            .into_iter()
            .rev()
            .filter(|entry| query.module.is_none_or(|module| entry.module() == module))
            .filter(|entry| query.actor.is_none_or(|filter| entry.actor == filter))
            .skip(query.offset)
            .take(query.limit)
            .collect())
    }
}

#[cfg(test)]
mod tests;
