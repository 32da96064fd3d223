use std::collections::BTreeSet;
use std::str::FromStr;

use labdesk_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};

/// Module value of a grant that matches every module.
pub const ALL_MODULES: &str = "all";

/// Staff roles. The snake_case spelling is part of the stored contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Full access; bypasses grant evaluation entirely.
    Admin,
    /// Lab manager.
    Manager,
    /// Front desk staff handling registration and billing.
    Receptionist,
    /// Lab technician entering results.
    Technician,
    /// Pathologist verifying results.
    Pathologist,
    /// Accountant handling invoices and expenses.
    Accountant,
    /// Lab helper with dashboard-only access.
    LabHelper,
}

impl Role {
    /// Returns a stable storage value for this role.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Manager => "manager",
            Self::Receptionist => "receptionist",
            Self::Technician => "technician",
            Self::Pathologist => "pathologist",
            Self::Accountant => "accountant",
            Self::LabHelper => "lab_helper",
        }
    }

    /// Returns all known roles.
    #[must_use]
    pub fn all() -> &'static [Self] {
        const ALL: &[Role] = &[
            Role::Admin,
            Role::Manager,
            Role::Receptionist,
            Role::Technician,
            Role::Pathologist,
            Role::Accountant,
            Role::LabHelper,
        ];

        ALL
    }
}

impl FromStr for Role {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::all()
            .iter()
            .copied()
            .find(|role| role.as_str() == value)
            .ok_or_else(|| AppError::Validation(format!("unknown role '{value}'")))
    }
}

/// Verbs a grant can allow on a module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    /// Read access.
    View,
    /// Create new records.
    Create,
    /// Modify existing records.
    Edit,
    /// Remove records.
    Delete,
    /// Export data out of the module.
    Export,
    /// Import data into the module.
    Import,
    /// Lock records against further edits.
    Lock,
    /// Unlock records, or edit through a lock.
    Unlock,
    /// Sign off results.
    Verify,
}

impl Action {
    /// Returns a stable storage value for this action.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::View => "view",
            Self::Create => "create",
            Self::Edit => "edit",
            Self::Delete => "delete",
            Self::Export => "export",
            Self::Import => "import",
            Self::Lock => "lock",
            Self::Unlock => "unlock",
            Self::Verify => "verify",
        }
    }

    /// Returns all known actions.
    #[must_use]
    pub fn all() -> &'static [Self] {
        const ALL: &[Action] = &[
            Action::View,
            Action::Create,
            Action::Edit,
            Action::Delete,
            Action::Export,
            Action::Import,
            Action::Lock,
            Action::Unlock,
            Action::Verify,
        ];

        ALL
    }
}

impl FromStr for Action {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::all()
            .iter()
            .copied()
            .find(|action| action.as_str() == value)
            .ok_or_else(|| AppError::Validation(format!("unknown action '{value}'")))
    }
}

/// Functional areas of the lab that appear in navigation and grants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LabModule {
    /// Operational dashboard.
    Dashboard,
    /// Patient registry.
    Patients,
    /// Referring doctors.
    Doctors,
    /// Test catalog.
    Tests,
    /// Rate lists.
    Rates,
    /// Invoicing.
    Invoices,
    /// Lab reports.
    Reports,
    /// Report templates.
    Templates,
    /// Appointment scheduling.
    Appointments,
    /// Inventory.
    Stock,
    /// Expense tracking.
    Expenses,
    /// Quality control.
    Quality,
    /// Business analytics.
    Analytics,
    /// File manager.
    Files,
    /// Notification center.
    Notifications,
    /// Staff and permission administration.
    Staff,
    /// Backups.
    Backup,
    /// Audit trail.
    Audit,
    /// Lab settings.
    Settings,
}

impl LabModule {
    /// Returns the module identifier used in grants.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Dashboard => "dashboard",
            Self::Patients => "patients",
            Self::Doctors => "doctors",
            Self::Tests => "tests",
            Self::Rates => "rates",
            Self::Invoices => "invoices",
            Self::Reports => "reports",
            Self::Templates => "templates",
            Self::Appointments => "appointments",
            Self::Stock => "stock",
            Self::Expenses => "expenses",
            Self::Quality => "quality",
            Self::Analytics => "analytics",
            Self::Files => "files",
            Self::Notifications => "notifications",
            Self::Staff => "staff",
            Self::Backup => "backup",
            Self::Audit => "audit",
            Self::Settings => "settings",
        }
    }

    /// Returns every module in navigation order.
    #[must_use]
    pub fn all() -> &'static [Self] {
        const ALL: &[LabModule] = &[
            LabModule::Dashboard,
            LabModule::Patients,
            LabModule::Doctors,
            LabModule::Tests,
            LabModule::Rates,
            LabModule::Invoices,
            LabModule::Reports,
            LabModule::Templates,
            LabModule::Appointments,
            LabModule::Stock,
            LabModule::Expenses,
            LabModule::Quality,
            LabModule::Analytics,
            LabModule::Files,
            LabModule::Notifications,
            LabModule::Staff,
            LabModule::Backup,
            LabModule::Audit,
            LabModule::Settings,
        ];

        ALL
    }
}

impl FromStr for LabModule {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::all()
            .iter()
            .copied()
            .find(|module| module.as_str() == value)
            .ok_or_else(|| AppError::Validation(format!("unknown module '{value}'")))
    }
}

/// A positive grant of actions on one module, or on every module via [`ALL_MODULES`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "StoredPermission")]
pub struct Permission {
    module: String,
    actions: BTreeSet<Action>,
}

/// Unvalidated wire shape of a [`Permission`].
#[derive(Deserialize)]
struct StoredPermission {
    module: String,
    actions: BTreeSet<Action>,
}

impl TryFrom<StoredPermission> for Permission {
    type Error = AppError;

    fn try_from(value: StoredPermission) -> Result<Self, Self::Error> {
        Self::new(value.module, value.actions)
    }
}

impl Permission {
    /// Creates a grant for an arbitrary module identifier.
    pub fn new(
        module: impl Into<String>,
        actions: impl IntoIterator<Item = Action>,
    ) -> AppResult<Self> {
        let module = module.into().trim().to_owned();
        if module.is_empty() {
            return Err(AppError::Validation(
                "permission module must not be empty".to_owned(),
            ));
        }

        Ok(Self {
            module,
            actions: actions.into_iter().collect(),
        })
    }

    /// Creates a grant on a known lab module.
    #[must_use]
    pub fn on(module: LabModule, actions: &[Action]) -> Self {
        Self {
            module: module.as_str().to_owned(),
            actions: actions.iter().copied().collect(),
        }
    }

    /// Creates a grant that applies to every module.
    #[must_use]
    pub fn everywhere(actions: &[Action]) -> Self {
        Self {
            module: ALL_MODULES.to_owned(),
            actions: actions.iter().copied().collect(),
        }
    }

    /// Returns the module identifier.
    #[must_use]
    pub fn module(&self) -> &str {
        self.module.as_str()
    }

    /// Returns the granted actions.
    #[must_use]
    pub fn actions(&self) -> &BTreeSet<Action> {
        &self.actions
    }

    /// Returns whether this grant targets every module.
    #[must_use]
    pub fn is_wildcard(&self) -> bool {
        self.module == ALL_MODULES
    }

    /// Returns whether this grant allows `action` on `module`.
    #[must_use]
    pub fn allows(&self, module: &str, action: Action) -> bool {
        (self.module == module || self.is_wildcard()) && self.actions.contains(&action)
    }
}

/// Returns the grants a freshly assigned role starts with.
#[must_use]
pub fn default_permissions_for(role: Role) -> Vec<Permission> {
    use Action::{Create, Edit, Export, Lock, Unlock, Verify, View};
    use LabModule::{
        Analytics, Appointments, Dashboard, Doctors, Expenses, Invoices, Patients, Quality,
        Reports, Staff, Stock, Templates, Tests,
    };

    match role {
        Role::Admin => vec![Permission::everywhere(Action::all())],
        Role::Manager => vec![
            Permission::on(Dashboard, &[View]),
            Permission::on(Analytics, &[View, Export]),
            Permission::on(Staff, &[View, Create, Edit]),
            Permission::on(Patients, &[View, Edit]),
            Permission::on(Doctors, &[View, Create, Edit]),
            Permission::on(Tests, &[View, Create, Edit]),
            Permission::on(Stock, &[View, Create, Edit]),
            Permission::on(Expenses, &[View, Create, Edit]),
        ],
        Role::Receptionist => vec![
            Permission::on(Patients, &[View, Create, Edit]),
            Permission::on(Invoices, &[View, Create]),
            Permission::on(Reports, &[View]),
            Permission::on(Appointments, &[View, Create, Edit]),
        ],
        Role::Technician => vec![
            Permission::on(Reports, &[View, Create, Edit]),
            Permission::on(Tests, &[View]),
            Permission::on(Stock, &[View, Edit]),
            Permission::on(Quality, &[View, Create, Edit]),
        ],
        Role::Pathologist => vec![
            Permission::on(Reports, &[View, Create, Edit, Verify]),
            Permission::on(Templates, &[View, Create, Edit, Lock, Unlock]),
            Permission::on(Patients, &[View]),
            Permission::on(Tests, &[View, Create, Edit]),
        ],
        Role::Accountant => vec![
            Permission::on(Invoices, &[View, Edit]),
            Permission::on(Expenses, &[View, Create, Edit]),
            Permission::on(Analytics, &[View]),
        ],
        Role::LabHelper => vec![Permission::on(Dashboard, &[View])],
    }
}

/// Stable audit actions emitted by application use-cases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    /// A staff account was created.
    UserCreated,
    /// A staff account's role changed.
    UserRoleChanged,
    /// A staff account's custom grants were replaced.
    UserGrantsChanged,
    /// A staff account was activated or deactivated.
    UserActivationChanged,
    /// A staff account was removed.
    UserDeleted,
    /// A staff account signed in.
    UserSignedIn,
    /// A patient was registered.
    PatientRegistered,
    /// A referring doctor was registered.
    DoctorRegistered,
    /// A lab test was added to the catalog.
    TestRegistered,
    /// An expense was recorded.
    ExpenseRecorded,
    /// A stock item was registered.
    StockItemRegistered,
    /// Stock quantity moved in or out.
    StockAdjusted,
    /// An invoice was created.
    InvoiceCreated,
    /// An invoice's line items or details changed.
    InvoiceUpdated,
    /// An invoice's status changed.
    InvoiceStatusChanged,
    /// An invoice was locked.
    InvoiceLocked,
    /// An invoice was unlocked.
    InvoiceUnlocked,
    /// An invoice was deleted.
    InvoiceDeleted,
    /// A report was created.
    ReportCreated,
    /// A report's results changed.
    ReportUpdated,
    /// A report's status changed.
    ReportStatusChanged,
    /// A report was deleted.
    ReportDeleted,
    /// Analytics were exported.
    AnalyticsExported,
}

impl AuditAction {
    /// Returns a stable storage value for this action.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::UserCreated => "staff.user.created",
            Self::UserRoleChanged => "staff.user.role_changed",
            Self::UserGrantsChanged => "staff.user.grants_changed",
            Self::UserActivationChanged => "staff.user.activation_changed",
            Self::UserDeleted => "staff.user.deleted",
            Self::UserSignedIn => "staff.user.signed_in",
            Self::PatientRegistered => "patients.patient.registered",
            Self::DoctorRegistered => "doctors.doctor.registered",
            Self::TestRegistered => "tests.test.registered",
            Self::ExpenseRecorded => "expenses.expense.recorded",
            Self::StockItemRegistered => "stock.item.registered",
            Self::StockAdjusted => "stock.item.adjusted",
            Self::InvoiceCreated => "invoices.invoice.created",
            Self::InvoiceUpdated => "invoices.invoice.updated",
            Self::InvoiceStatusChanged => "invoices.invoice.status_changed",
            Self::InvoiceLocked => "invoices.invoice.locked",
            Self::InvoiceUnlocked => "invoices.invoice.unlocked",
            Self::InvoiceDeleted => "invoices.invoice.deleted",
            Self::ReportCreated => "reports.report.created",
            Self::ReportUpdated => "reports.report.updated",
            Self::ReportStatusChanged => "reports.report.status_changed",
            Self::ReportDeleted => "reports.report.deleted",
            Self::AnalyticsExported => "analytics.snapshot.exported",
        }
    }

    /// Returns the module this action belongs to.
    #[must_use]
    pub fn module(&self) -> LabModule {
        match self {
            Self::UserCreated
            | Self::UserRoleChanged
            | Self::UserGrantsChanged
            | Self::UserActivationChanged
            | Self::UserDeleted
            | Self::UserSignedIn => LabModule::Staff,
            Self::PatientRegistered => LabModule::Patients,
            Self::DoctorRegistered => LabModule::Doctors,
            Self::TestRegistered => LabModule::Tests,
            Self::ExpenseRecorded => LabModule::Expenses,
            Self::StockItemRegistered | Self::StockAdjusted => LabModule::Stock,
            Self::InvoiceCreated
            | Self::InvoiceUpdated
            | Self::InvoiceStatusChanged
            | Self::InvoiceLocked
            | Self::InvoiceUnlocked
            | Self::InvoiceDeleted => LabModule::Invoices,
            Self::ReportCreated
            | Self::ReportUpdated
            | Self::ReportStatusChanged
            | Self::ReportDeleted => LabModule::Reports,
            Self::AnalyticsExported => LabModule::Analytics,
        }
    }
}
