use std::str::FromStr;

use chrono::{DateTime, Utc};
use labdesk_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};

use crate::identifiers::{DoctorId, InvoiceId, PatientId, ReportId, TestId, UserId};

/// Result of one test on a report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportTestResult {
    /// Catalog test.
    pub test_id: TestId,
    /// Test name captured at reporting time.
    pub test_name: String,
    /// Measured or observed value.
    pub result: String,
    /// Reference range printed next to the result.
    pub normal_range: String,
    /// Result unit, when applicable.
    pub unit: Option<String>,
    /// Whether the result falls outside the reference range.
    pub is_abnormal: bool,
}

/// Report lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportStatus {
    /// Awaiting processing.
    Pending,
    /// Results are being entered.
    InProgress,
    /// Results entered, awaiting verification.
    Completed,
    /// Signed off by a verifier.
    Verified,
    /// Frozen against further edits.
    Locked,
}

impl ReportStatus {
    /// Returns a stable storage value for this status.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Verified => "verified",
            Self::Locked => "locked",
        }
    }
}

impl FromStr for ReportStatus {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "pending" => Ok(Self::Pending),
            "in_progress" => Ok(Self::InProgress),
            "completed" => Ok(Self::Completed),
            "verified" => Ok(Self::Verified),
            "locked" => Ok(Self::Locked),
            _ => Err(AppError::Validation(format!(
                "unknown report status '{value}'"
            ))),
        }
    }
}

/// Caller-editable report content.
///
/// `critical_values` is set by the caller and is never derived from the
/// per-test abnormal flags; the two may disagree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportContent {
    /// Per-test results.
    pub tests: Vec<ReportTestResult>,
    /// Template the report was rendered from.
    pub template_id: Option<String>,
    /// Pathologist interpretation.
    pub interpretation: Option<String>,
    /// Whether the report carries critical values.
    pub critical_values: bool,
}

/// Lab report attached to exactly one invoice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    id: ReportId,
    invoice_id: InvoiceId,
    patient_id: PatientId,
    doctor_id: DoctorId,
    content: ReportContent,
    status: ReportStatus,
    created_at: DateTime<Utc>,
    created_by: UserId,
    verified_by: Option<UserId>,
    verified_at: Option<DateTime<Utc>>,
}

impl Report {
    /// Creates a pending report for an invoice.
    pub fn new(
        id: ReportId,
        invoice_id: InvoiceId,
        patient_id: PatientId,
        doctor_id: DoctorId,
        content: ReportContent,
        created_at: DateTime<Utc>,
        created_by: UserId,
    ) -> AppResult<Self> {
        validate_content(&content)?;

        Ok(Self {
            id,
            invoice_id,
            patient_id,
            doctor_id,
            content,
            status: ReportStatus::Pending,
            created_at,
            created_by,
            verified_by: None,
            verified_at: None,
        })
    }

    /// Returns the report identifier.
    #[must_use]
    pub fn id(&self) -> ReportId {
        self.id
    }

    /// Returns the invoice the report belongs to.
    #[must_use]
    pub fn invoice_id(&self) -> InvoiceId {
        self.invoice_id
    }

    /// Returns the patient.
    #[must_use]
    pub fn patient_id(&self) -> PatientId {
        self.patient_id
    }

    /// Returns the referring doctor.
    #[must_use]
    pub fn doctor_id(&self) -> DoctorId {
        self.doctor_id
    }

    /// Returns the editable content.
    #[must_use]
    pub fn content(&self) -> &ReportContent {
        &self.content
    }

    /// Returns the per-test results.
    #[must_use]
    pub fn tests(&self) -> &[ReportTestResult] {
        &self.content.tests
    }

    /// Returns the caller-set critical values flag.
    #[must_use]
    pub fn critical_values(&self) -> bool {
        self.content.critical_values
    }

    /// Returns the number of results flagged abnormal.
    #[must_use]
    pub fn abnormal_count(&self) -> usize {
        self.content
            .tests
            .iter()
            .filter(|test| test.is_abnormal)
            .count()
    }

    /// Returns the current status.
    #[must_use]
    pub fn status(&self) -> ReportStatus {
        self.status
    }

    /// Returns whether the report is locked.
    #[must_use]
    pub fn is_locked(&self) -> bool {
        self.status == ReportStatus::Locked
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

    /// Returns who verified the report.
    #[must_use]
    pub fn verified_by(&self) -> Option<UserId> {
        self.verified_by
    }

    /// Returns when the report was verified.
    #[must_use]
    pub fn verified_at(&self) -> Option<DateTime<Utc>> {
        self.verified_at
    }

    /// Replaces the content.
    pub fn revise(&mut self, content: ReportContent) -> AppResult<()> {
        validate_content(&content)?;
        self.content = content;
        Ok(())
    }

    /// Sets a status other than [`ReportStatus::Verified`].
    pub fn set_status(&mut self, status: ReportStatus) -> AppResult<()> {
        if status == ReportStatus::Verified {
            return Err(AppError::Validation(
                "use verify to mark a report as verified".to_owned(),
            ));
        }

        self.status = status;
        Ok(())
    }

    /// Marks a completed report as verified and stamps the verifier.
    pub fn verify(&mut self, verifier: UserId, at: DateTime<Utc>) -> AppResult<()> {
        if self.status != ReportStatus::Completed {
            return Err(AppError::Conflict(format!(
                "report '{}' must be completed before verification, current status is '{}'",
                self.id,
                self.status.as_str()
            )));
        }

        self.status = ReportStatus::Verified;
        self.verified_by = Some(verifier);
        self.verified_at = Some(at);
        Ok(())
    }
}

fn validate_content(content: &ReportContent) -> AppResult<()> {
    if content
        .tests
        .iter()
        .any(|test| test.test_name.trim().is_empty())
    {
        return Err(AppError::Validation(
            "every report test result must name its test".to_owned(),
        ));
    }

    Ok(())
}
