use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::identifiers::{AuditEntryId, UserId};
use crate::security::{AuditAction, LabModule};

/// Recorded audit trail entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEntry {
    /// Entry identifier.
    pub entry_id: AuditEntryId,
    /// Staff account that performed the action.
    pub actor: UserId,
    /// Stable action identifier.
    pub action: AuditAction,
    /// Identifier of the affected record.
    pub resource_id: String,
    /// Optional human-readable detail.
    pub detail: Option<String>,
    /// When the action happened.
    pub recorded_at: DateTime<Utc>,
}

impl AuditEntry {
    /// Returns the module the action belongs to.
    #[must_use]
    pub fn module(&self) -> LabModule {
        self.action.module()
    }
}
