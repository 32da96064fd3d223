//! Registration of patients, referring doctors, catalog tests, expenses and
//! stock items.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use labdesk_core::{AppError, AppResult, NonEmptyString};
use labdesk_domain::{
    Action, AuditAction, Doctor, DoctorId, Expense, ExpenseId, Gender, LabModule, LabTest,
    Patient, PatientId, StockItem, StockItemId, StockMovement, TestId, UserId,
};
use tracing::{debug, info};

use crate::{AuditEvent, AuditRepository, AuthorizationService, Clock, RegistryRepository};

/// Input payload for registering a patient.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPatient {
    /// Full name.
    pub name: String,
    /// Age in years.
    pub age: u16,
    /// Gender.
    pub gender: Gender,
    /// Phone or other contact.
    pub contact: String,
}

/// Input payload for registering a referring doctor.
#[derive(Debug, Clone, PartialEq)]
pub struct NewDoctor {
    /// Full name.
    pub name: String,
    /// Specialty.
    pub specialty: String,
    /// Referral commission percentage, `0..=100`.
    pub commission_percent: f64,
}

/// Input payload for adding a catalog test.
#[derive(Debug, Clone, PartialEq)]
pub struct NewLabTest {
    /// Display name.
    pub name: String,
    /// Category, e.g. `Biochemistry`.
    pub category: String,
    /// List price.
    pub price: f64,
    /// Sample type, e.g. `Blood`.
    pub sample_type: String,
}

/// Input payload for recording an expense.
#[derive(Debug, Clone, PartialEq)]
pub struct NewExpense {
    /// Expense category.
    pub category: String,
    /// Amount spent.
    pub amount: f64,
    /// Description.
    pub description: String,
    /// Date incurred; defaults to now.
    pub date: Option<DateTime<Utc>>,
}

/// Input payload for registering a stock item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewStockItem {
    /// Item name.
    pub name: String,
    /// Item category.
    pub category: String,
    /// Units on hand.
    pub current_stock: u32,
    /// Reorder threshold.
    pub reorder_level: u32,
    /// Unit label.
    pub unit: String,
}

/// Application service for reference records.
#[derive(Clone)]
pub struct RegistryService {
    authorization_service: AuthorizationService,
    repository: Arc<dyn RegistryRepository>,
    audit_repository: Arc<dyn AuditRepository>,
    clock: Arc<dyn Clock>,
}

impl RegistryService {
    /// Creates a new registry service.
    #[must_use]
    pub fn new(
        authorization_service: AuthorizationService,
        repository: Arc<dyn RegistryRepository>,
        audit_repository: Arc<dyn AuditRepository>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            authorization_service,
            repository,
            audit_repository,
            clock,
        }
    }

    /// Registers a patient.
    pub async fn register_patient(&self, actor: UserId, input: NewPatient) -> AppResult<Patient> {
        self.authorization_service
            .require_permission(actor, LabModule::Patients, Action::Create)
            .await?;

        let patient = Patient {
            id: PatientId::new(),
            name: required_text("patient name", input.name)?,
            age: input.age,
            gender: input.gender,
            contact: input.contact.trim().to_owned(),
            created_at: self.clock.now(),
            created_by: actor,
        };

        self.repository.save_patient(patient.clone()).await?;
        self.append_audit(
            actor,
            AuditAction::PatientRegistered,
            patient.id.to_string(),
            format!("registered patient '{}'", patient.name),
        )
        .await?;

        info!(actor = %actor, patient_id = %patient.id, "patient registered");
        Ok(patient)
    }

    /// Lists patients.
    pub async fn list_patients(&self, actor: UserId) -> AppResult<Vec<Patient>> {
        self.authorization_service
            .require_permission(actor, LabModule::Patients, Action::View)
            .await?;

        self.repository.list_patients().await
    }

    /// Registers a referring doctor.
    pub async fn register_doctor(&self, actor: UserId, input: NewDoctor) -> AppResult<Doctor> {
        self.authorization_service
            .require_permission(actor, LabModule::Doctors, Action::Create)
            .await?;

        if !(0.0..=100.0).contains(&input.commission_percent) {
            return Err(AppError::Validation(format!(
                "commission must be between 0 and 100, got {}",
                input.commission_percent
            )));
        }

        let doctor = Doctor {
            id: DoctorId::new(),
            name: required_text("doctor name", input.name)?,
            specialty: input.specialty.trim().to_owned(),
            commission_percent: input.commission_percent,
            is_active: true,
            created_at: self.clock.now(),
        };

        self.repository.save_doctor(doctor.clone()).await?;
        self.append_audit(
            actor,
            AuditAction::DoctorRegistered,
            doctor.id.to_string(),
            format!("registered doctor '{}'", doctor.name),
        )
        .await?;

        Ok(doctor)
    }

    /// Lists referring doctors.
    pub async fn list_doctors(&self, actor: UserId) -> AppResult<Vec<Doctor>> {
        self.authorization_service
            .require_permission(actor, LabModule::Doctors, Action::View)
            .await?;

        self.repository.list_doctors().await
    }

    /// Adds a test to the catalog.
    pub async fn register_test(&self, actor: UserId, input: NewLabTest) -> AppResult<LabTest> {
        self.authorization_service
            .require_permission(actor, LabModule::Tests, Action::Create)
            .await?;

        non_negative_amount("test price", input.price)?;

        let test = LabTest {
            id: TestId::new(),
            name: required_text("test name", input.name)?,
            category: required_text("test category", input.category)?,
            price: input.price,
            sample_type: input.sample_type.trim().to_owned(),
            is_active: true,
        };

        self.repository.save_test(test.clone()).await?;
        self.append_audit(
            actor,
            AuditAction::TestRegistered,
            test.id.to_string(),
            format!("added '{}' to {}", test.name, test.category),
        )
        .await?;

        Ok(test)
    }

    /// Lists catalog tests.
    pub async fn list_tests(&self, actor: UserId) -> AppResult<Vec<LabTest>> {
        self.authorization_service
            .require_permission(actor, LabModule::Tests, Action::View)
            .await?;

        self.repository.list_tests().await
    }

    /// Records an operating expense.
    pub async fn record_expense(&self, actor: UserId, input: NewExpense) -> AppResult<Expense> {
        self.authorization_service
            .require_permission(actor, LabModule::Expenses, Action::Create)
            .await?;

        non_negative_amount("expense amount", input.amount)?;

        let expense = Expense {
            id: ExpenseId::new(),
            category: required_text("expense category", input.category)?,
            amount: input.amount,
            description: input.description.trim().to_owned(),
            date: input.date.unwrap_or_else(|| self.clock.now()),
            created_by: actor,
        };

        self.repository.save_expense(expense.clone()).await?;
        self.append_audit(
            actor,
            AuditAction::ExpenseRecorded,
            expense.id.to_string(),
            format!("recorded {:.2} under {}", expense.amount, expense.category),
        )
        .await?;

        Ok(expense)
    }

    /// Lists expenses.
    pub async fn list_expenses(&self, actor: UserId) -> AppResult<Vec<Expense>> {
        self.authorization_service
            .require_permission(actor, LabModule::Expenses, Action::View)
            .await?;

        self.repository.list_expenses().await
    }

    /// Registers an inventory item.
    pub async fn register_stock_item(
        &self,
        actor: UserId,
        input: NewStockItem,
    ) -> AppResult<StockItem> {
        self.authorization_service
            .require_permission(actor, LabModule::Stock, Action::Create)
            .await?;

        let item = StockItem {
            id: StockItemId::new(),
            name: required_text("stock item name", input.name)?,
            category: input.category.trim().to_owned(),
            current_stock: input.current_stock,
            reorder_level: input.reorder_level,
            unit: required_text("stock unit", input.unit)?,
        };

        self.repository.save_stock_item(item.clone()).await?;
        self.append_audit(
            actor,
            AuditAction::StockItemRegistered,
            item.id.to_string(),
            format!(
                "registered '{}' with {} {}",
                item.name, item.current_stock, item.unit
            ),
        )
        .await?;

        Ok(item)
    }

    /// Moves stock in or out of an inventory item.
    pub async fn adjust_stock(
        &self,
        actor: UserId,
        item_id: StockItemId,
        movement: StockMovement,
    ) -> AppResult<StockItem> {
        self.authorization_service
            .require_permission(actor, LabModule::Stock, Action::Edit)
            .await?;

        let mut item = self
            .repository
            .find_stock_item(item_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("stock item '{item_id}' does not exist")))?;

        item.apply(movement)?;
        self.repository.save_stock_item(item.clone()).await?;

        let detail = match movement {
            StockMovement::In(quantity) => format!("received {quantity} {}", item.unit),
            StockMovement::Out(quantity) => format!("used {quantity} {}", item.unit),
        };
        self.append_audit(
            actor,
            AuditAction::StockAdjusted,
            item_id.to_string(),
            detail,
        )
        .await?;

        if item.is_low() {
            info!(
                item_id = %item_id,
                current_stock = item.current_stock,
                reorder_level = item.reorder_level,
                "stock item at or below reorder level"
            );
        }

        Ok(item)
    }

    /// Lists inventory items.
    pub async fn list_stock_items(&self, actor: UserId) -> AppResult<Vec<StockItem>> {
        self.authorization_service
            .require_permission(actor, LabModule::Stock, Action::View)
            .await?;

        self.repository.list_stock_items().await
    }

    async fn append_audit(
        &self,
        actor: UserId,
        action: AuditAction,
        resource_id: String,
        detail: String,
    ) -> AppResult<()> {
        debug!(actor = %actor, action = action.as_str(), resource_id = %resource_id, "audit");

        self.audit_repository
            .append_event(AuditEvent {
                actor,
                action,
                resource_id,
                detail: Some(detail),
                recorded_at: self.clock.now(),
            })
            .await?;

        Ok(())
    }
}

fn required_text(field: &str, value: String) -> AppResult<String> {
    NonEmptyString::new(value.trim())
        .map(String::from)
        .map_err(|_| AppError::Validation(format!("{field} must not be empty")))
}

fn non_negative_amount(field: &str, value: f64) -> AppResult<()> {
    if value.is_finite() && value >= 0.0 {
        return Ok(());
    }

    Err(AppError::Validation(format!(
        "{field} must be a non-negative amount, got {value}"
    )))
}
