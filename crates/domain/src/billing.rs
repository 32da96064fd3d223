//! Invoices and the arithmetic behind them.
//!
//! Amounts are plain `f64` currency values. The totals functions take their
//! input as given: nothing is clamped, zero or negative quantities are summed
//! as-is and a NaN price propagates into every derived amount. Validation of
//! line items happens when an invoice is built through [`InvoiceLineItem::validate`].

use std::str::FromStr;

use chrono::{DateTime, Utc};
use labdesk_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};

use crate::identifiers::{DoctorId, InvoiceId, PatientId, TestId, UserId};

/// Prefix of every generated invoice number.
pub const INVOICE_NUMBER_PREFIX: &str = "INV";

/// Minimum digits in the numeric part of an invoice number.
pub const INVOICE_NUMBER_WIDTH: usize = 4;

/// One priced test on an invoice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvoiceLineItem {
    /// Catalog test being billed.
    pub test_id: TestId,
    /// Test name captured at billing time.
    pub test_name: String,
    /// Unit price.
    pub price: f64,
    /// Units billed.
    pub quantity: i64,
}

impl InvoiceLineItem {
    /// Checks the stored-invoice invariants: finite non-negative price, quantity of at least one.
    pub fn validate(&self) -> AppResult<()> {
        if !self.price.is_finite() || self.price < 0.0 {
            return Err(AppError::Validation(format!(
                "line item '{}' must have a finite non-negative price",
                self.test_name
            )));
        }

        if self.quantity < 1 {
            return Err(AppError::Validation(format!(
                "line item '{}' must have a quantity of at least 1",
                self.test_name
            )));
        }

        Ok(())
    }

    /// Returns `price * quantity`.
    #[must_use]
    pub fn line_total(&self) -> f64 {
        self.price * self.quantity as f64
    }
}

/// Derived invoice amounts.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InvoiceTotals {
    /// Sum of line totals.
    pub subtotal: f64,
    /// Subtotal minus discount, unclamped.
    pub final_amount: f64,
}

/// Sums `price * quantity` across all items.
#[must_use]
pub fn compute_subtotal(items: &[InvoiceLineItem]) -> f64 {
    items.iter().map(InvoiceLineItem::line_total).sum()
}

/// Subtracts an absolute discount. A discount larger than the subtotal yields a negative amount.
#[must_use]
pub fn compute_final_amount(subtotal: f64, discount: f64) -> f64 {
    subtotal - discount
}

/// Computes subtotal and final amount in one pass.
#[must_use]
pub fn compute_invoice_totals(items: &[InvoiceLineItem], discount: f64) -> InvoiceTotals {
    let subtotal = compute_subtotal(items);
    InvoiceTotals {
        subtotal,
        final_amount: compute_final_amount(subtotal, discount),
    }
}

/// Returns the number for the next invoice given how many already exist.
///
/// Numbers come from a running count, so two invoices created against the same
/// count collide. Callers serialize creation.
#[must_use]
pub fn format_invoice_number(existing_count: usize) -> String {
    format!(
        "{INVOICE_NUMBER_PREFIX}{:0width$}",
        existing_count.saturating_add(1),
        width = INVOICE_NUMBER_WIDTH
    )
}

/// Invoice lifecycle status. Any status may follow any other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvoiceStatus {
    /// Still being prepared.
    Draft,
    /// Issued to the patient.
    Finalized,
    /// Settled.
    Paid,
    /// Voided.
    Cancelled,
}

impl InvoiceStatus {
    /// Returns a stable storage value for this status.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Finalized => "finalized",
            Self::Paid => "paid",
            Self::Cancelled => "cancelled",
        }
    }

    /// Returns whether a report may be produced against an invoice in this status.
    #[must_use]
    pub fn is_reportable(&self) -> bool {
        matches!(self, Self::Finalized | Self::Paid)
    }
}

impl FromStr for InvoiceStatus {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "draft" => Ok(Self::Draft),
            "finalized" => Ok(Self::Finalized),
            "paid" => Ok(Self::Paid),
            "cancelled" => Ok(Self::Cancelled),
            _ => Err(AppError::Validation(format!(
                "unknown invoice status '{value}'"
            ))),
        }
    }
}

/// Caller-editable invoice content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvoiceContent {
    /// Billed patient.
    pub patient_id: PatientId,
    /// Referring doctor.
    pub doctor_id: DoctorId,
    /// Ordered line items.
    pub items: Vec<InvoiceLineItem>,
    /// Absolute discount.
    pub discount: f64,
    /// Free-form notes.
    pub notes: Option<String>,
    /// Payment method label, e.g. `cash`.
    pub payment_method: Option<String>,
}

/// A patient invoice with totals kept in step with its line items.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Invoice {
    id: InvoiceId,
    invoice_number: String,
    content: InvoiceContent,
    totals: InvoiceTotals,
    status: InvoiceStatus,
    is_locked: bool,
    created_at: DateTime<Utc>,
    created_by: UserId,
}

impl Invoice {
    /// Creates an unlocked draft invoice, validating every line item.
    pub fn new(
        id: InvoiceId,
        invoice_number: impl Into<String>,
        content: InvoiceContent,
        created_at: DateTime<Utc>,
        created_by: UserId,
    ) -> AppResult<Self> {
        validate_content(&content)?;
        let totals = compute_invoice_totals(&content.items, content.discount);

        Ok(Self {
            id,
            invoice_number: invoice_number.into(),
            content,
            totals,
            status: InvoiceStatus::Draft,
            is_locked: false,
            created_at,
            created_by,
        })
    }

    /// Returns the invoice identifier.
    #[must_use]
    pub fn id(&self) -> InvoiceId {
        self.id
    }

    /// Returns the human-facing invoice number.
    #[must_use]
    pub fn invoice_number(&self) -> &str {
        self.invoice_number.as_str()
    }

    /// Returns the editable content.
    #[must_use]
    pub fn content(&self) -> &InvoiceContent {
        &self.content
    }

    /// Returns the billed patient.
    #[must_use]
    pub fn patient_id(&self) -> PatientId {
        self.content.patient_id
    }

    /// Returns the referring doctor.
    #[must_use]
    pub fn doctor_id(&self) -> DoctorId {
        self.content.doctor_id
    }

    /// Returns the line items.
    #[must_use]
    pub fn items(&self) -> &[InvoiceLineItem] {
        &self.content.items
    }

    /// Returns the discount.
    #[must_use]
    pub fn discount(&self) -> f64 {
        self.content.discount
    }

    /// Returns the sum of line totals.
    #[must_use]
    pub fn total_amount(&self) -> f64 {
        self.totals.subtotal
    }

    /// Returns the amount due after discount.
    #[must_use]
    pub fn final_amount(&self) -> f64 {
        self.totals.final_amount
    }

    /// Returns the current status.
    #[must_use]
    pub fn status(&self) -> InvoiceStatus {
        self.status
    }

    /// Returns whether edits are blocked for actors without an unlock grant.
    #[must_use]
    pub fn is_locked(&self) -> bool {
        self.is_locked
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the creating staff account.
    #[must_use]
    pub fn created_by(&self) -> UserId {
        self.created_by
    }

    /// Replaces the content and recomputes totals. The invoice number is kept.
    pub fn revise(&mut self, content: InvoiceContent) -> AppResult<()> {
        validate_content(&content)?;
        self.totals = compute_invoice_totals(&content.items, content.discount);
        self.content = content;
        Ok(())
    }

    /// Sets the status.
    pub fn set_status(&mut self, status: InvoiceStatus) {
        self.status = status;
    }

    /// Sets the lock flag.
    pub fn set_locked(&mut self, is_locked: bool) {
        self.is_locked = is_locked;
    }
}

fn validate_content(content: &InvoiceContent) -> AppResult<()> {
    if content.items.is_empty() {
        return Err(AppError::Validation(
            "invoice must contain at least one line item".to_owned(),
        ));
    }

    for item in &content.items {
        item.validate()?;
    }

    if !content.discount.is_finite() || content.discount < 0.0 {
        return Err(AppError::Validation(
            "invoice discount must be a finite non-negative amount".to_owned(),
        ));
    }

    Ok(())
}
