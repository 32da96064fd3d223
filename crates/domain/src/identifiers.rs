use std::fmt::{Display, Formatter};
use std::str::FromStr;

use labdesk_core::AppError;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

macro_rules! uuid_identifier {
    ($(#[$meta:meta])* $name:ident, $label:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Creates a new random identifier.
            #[must_use]
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Creates an identifier from an existing UUID value.
            #[must_use]
            pub fn from_uuid(value: Uuid) -> Self {
                Self(value)
            }

            /// Returns the underlying UUID value.
            #[must_use]
            pub fn as_uuid(&self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl Display for $name {
            fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
                write!(formatter, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = AppError;

            fn from_str(value: &str) -> Result<Self, Self::Err> {
                Uuid::parse_str(value.trim()).map(Self).map_err(|error| {
                    AppError::Validation(format!("invalid {} '{value}': {error}", $label))
                })
            }
        }
    };
}

uuid_identifier!(
    /// Unique identifier for a staff account.
    UserId,
    "user id"
);
uuid_identifier!(
    /// Unique identifier for a registered patient.
    PatientId,
    "patient id"
);
uuid_identifier!(
    /// Unique identifier for a referring doctor.
    DoctorId,
    "doctor id"
);
uuid_identifier!(
    /// Unique identifier for a catalog lab test.
    TestId,
    "test id"
);
uuid_identifier!(
    /// Unique identifier for an invoice.
    InvoiceId,
    "invoice id"
);
uuid_identifier!(
    /// Unique identifier for a lab report.
    ReportId,
    "report id"
);
uuid_identifier!(
    /// Unique identifier for an expense entry.
    ExpenseId,
    "expense id"
);
uuid_identifier!(
    /// Unique identifier for a stock item.
    StockItemId,
    "stock item id"
);
uuid_identifier!(
    /// Unique identifier for an audit entry.
    AuditEntryId,
    "audit entry id"
);
