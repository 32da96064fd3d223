//! Reference records billed, reported and aggregated against.

use chrono::{DateTime, Utc};
use labdesk_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};

use crate::identifiers::{DoctorId, ExpenseId, PatientId, StockItemId, TestId, UserId};

/// Patient gender as captured at registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Gender {
    /// Male.
    Male,
    /// Female.
    Female,
    /// Other or undisclosed.
    Other,
}

/// Registered patient.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Patient {
    /// Patient identifier.
    pub id: PatientId,
    /// Full name.
    pub name: String,
    /// Age in years.
    pub age: u16,
    /// Gender.
    pub gender: Gender,
    /// Phone or other contact.
    pub contact: String,
    /// Registration timestamp.
    pub created_at: DateTime<Utc>,
    /// Registering staff account.
    pub created_by: UserId,
}

/// Referring doctor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Doctor {
    /// Doctor identifier.
    pub id: DoctorId,
    /// Full name.
    pub name: String,
    /// Specialty.
    pub specialty: String,
    /// Referral commission percentage.
    pub commission_percent: f64,
    /// Whether the doctor still refers patients.
    pub is_active: bool,
    /// Registration timestamp.
    pub created_at: DateTime<Utc>,
}

/// Catalog test.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabTest {
    /// Test identifier.
    pub id: TestId,
    /// Display name.
    pub name: String,
    /// Category used by the distribution chart, e.g. `Hematology`.
    pub category: String,
    /// List price.
    pub price: f64,
    /// Sample type, e.g. `Blood`.
    pub sample_type: String,
    /// Whether the test can be billed.
    pub is_active: bool,
}

/// Operating expense.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expense {
    /// Expense identifier.
    pub id: ExpenseId,
    /// Expense category.
    pub category: String,
    /// Amount spent.
    pub amount: f64,
    /// Description.
    pub description: String,
    /// Date the expense was incurred.
    pub date: DateTime<Utc>,
    /// Recording staff account.
    pub created_by: UserId,
}

/// Inventory item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockItem {
    /// Item identifier.
    pub id: StockItemId,
    /// Item name.
    pub name: String,
    /// Item category.
    pub category: String,
    /// Units on hand.
    pub current_stock: u32,
    /// Threshold at or below which the item needs reordering.
    pub reorder_level: u32,
    /// Unit label, e.g. `Kit`.
    pub unit: String,
}

impl StockItem {
    /// Returns whether the item is at or below its reorder level.
    #[must_use]
    pub fn is_low(&self) -> bool {
        self.current_stock <= self.reorder_level
    }

    /// Applies a stock movement.
    pub fn apply(&mut self, movement: StockMovement) -> AppResult<()> {
        self.current_stock = match movement {
            StockMovement::In(quantity) => self.current_stock.saturating_add(quantity),
            StockMovement::Out(quantity) => {
                self.current_stock.checked_sub(quantity).ok_or_else(|| {
                    AppError::Validation(format!(
                        "cannot take {quantity} {} of '{}' with only {} on hand",
                        self.unit, self.name, self.current_stock
                    ))
                })?
            }
        };

        Ok(())
    }
}

/// Direction and size of a stock change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "direction", content = "quantity")]
pub enum StockMovement {
    /// Received units.
    In(u32),
    /// Consumed units.
    Out(u32),
}
