//! Landing dashboard counters.
//!
//! "Today" is the UTC calendar date of the snapshot time; records dated on
//! any other day, earlier or later, only count toward the totals.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::audit::AuditEntry;
use crate::billing::Invoice;
use crate::registry::{Patient, StockItem};
use crate::report::{Report, ReportStatus};

/// Number of audit entries shown as recent activity.
pub const RECENT_ACTIVITY_LIMIT: usize = 10;

/// Operational counters shown on the landing dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardSnapshot {
    /// All registered patients.
    pub total_patients: usize,
    /// Patients registered on today's UTC date.
    pub today_patients: usize,
    /// Sum of all invoice final amounts.
    pub total_revenue: f64,
    /// Sum of final amounts for invoices created today.
    pub today_revenue: f64,
    /// Reports still pending.
    pub pending_reports: usize,
    /// Stock items at or below their reorder level.
    pub low_stock_items: usize,
    /// Most recent audit entries, oldest first.
    pub recent_activity: Vec<AuditEntry>,
}

/// Builds the dashboard counters as of `now`.
///
/// `activity` must be in chronological order; the last
/// [`RECENT_ACTIVITY_LIMIT`] entries are kept.
#[must_use]
pub fn dashboard_snapshot(
    now: DateTime<Utc>,
    patients: &[Patient],
    invoices: &[Invoice],
    reports: &[Report],
    stock: &[StockItem],
    activity: &[AuditEntry],
) -> DashboardSnapshot {
    let today = now.date_naive();
    let is_today = |timestamp: DateTime<Utc>| timestamp.date_naive() == today;

    let recent_start = activity.len().saturating_sub(RECENT_ACTIVITY_LIMIT);

    DashboardSnapshot {
        total_patients: patients.len(),
        today_patients: patients
            .iter()
            .filter(|patient| is_today(patient.created_at))
            .count(),
        total_revenue: invoices.iter().map(Invoice::final_amount).sum(),
        today_revenue: invoices
            .iter()
            .filter(|invoice| is_today(invoice.created_at()))
            .map(Invoice::final_amount)
            .sum(),
        pending_reports: reports
            .iter()
            .filter(|report| report.status() == ReportStatus::Pending)
            .count(),
        low_stock_items: stock.iter().filter(|item| item.is_low()).count(),
        recent_activity: activity[recent_start..].to_vec(),
    }
}
