use super::*;

#[async_trait]
impl AuditRepository for InMemoryLabRepository {
    async fn append_event(&self, event: AuditEvent) -> AppResult<AuditEntry> {
        let entry = AuditEntry {
            entry_id: AuditEntryId::new(),
            actor: event.actor,
            action: event.action,
            resource_id: event.resource_id,
            detail: event.detail,
            recorded_at: event.recorded_at,
        };

        debug!(
            action = entry.action.as_str(),
            actor = %entry.actor,
            resource_id = %entry.resource_id,
            "audit entry appended"
        );

        self.audit.write().await.push(entry.clone());
        Ok(entry)
    }

    async fn list_entries(&self) -> AppResult<Vec<AuditEntry>> {
        Ok(self.audit.read().await.clone())
    }
}
