use async_trait::async_trait;
use chrono::{DateTime, Utc};
use labdesk_core::AppResult;
use labdesk_domain::{AuditAction, AuditEntry, LabModule, UserId};

/// Canonical audit event payload emitted by application use-cases.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditEvent {
    /// Staff account that performed the action.
    pub actor: UserId,
    /// Stable audit action identifier.
    pub action: AuditAction,
    /// Identifier of the affected record.
    pub resource_id: String,
    /// Optional human-readable detail.
    pub detail: Option<String>,
    /// When the action happened.
    pub recorded_at: DateTime<Utc>,
}

/// Query parameters for audit log listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditLogQuery {
    /// Maximum rows returned.
    pub limit: usize,
    /// Number of rows skipped, counted from the newest entry.
    pub offset: usize,
    /// Optional module filter.
    pub module: Option<LabModule>,
    /// Optional acting account filter.
    pub actor: Option<UserId>,
}

impl Default for AuditLogQuery {
    fn default() -> Self {
        Self {
            limit: 50,
            offset: 0,
            module: None,
            actor: None,
        }
    }
}

/// Repository port for audit persistence.
#[async_trait]
pub trait AuditRepository: Send + Sync {
    /// Persists one audit event and returns the stored entry.
    async fn append_event(&self, event: AuditEvent) -> AppResult<AuditEntry>;

    /// Lists all entries in chronological order.
    async fn list_entries(&self) -> AppResult<Vec<AuditEntry>>;
}
