use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use labdesk_core::AppResult;
use labdesk_domain::{
    AuditEntry, AuditEntryId, Doctor, DoctorId, EmailAddress, Expense, Gender, Invoice,
    InvoiceContent, InvoiceId, InvoiceLineItem, LabTest, Patient, PatientId, Report, ReportId,
    Role, StockItem, StockItemId, TestId, User, UserId,
};
use tokio::sync::Mutex;

use crate::{
    AuditEvent, AuditRepository, Clock, InvoiceRepository, RegistryRepository, ReportRepository,
    UserRepository,
};

pub(crate) struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

pub(crate) fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 10, 18, 9, 30, 0)
        .single()
        .unwrap_or_else(|| unreachable!())
}

pub(crate) fn fixed_clock() -> Arc<FixedClock> {
    Arc::new(FixedClock(fixed_now()))
}

pub(crate) fn staff(username: &str, role: Role) -> User {
    User::new(
        UserId::new(),
        username,
        username,
        EmailAddress::new(format!("{username}@lab.test")).unwrap_or_else(|_| unreachable!()),
        role,
        fixed_now(),
    )
    .unwrap_or_else(|_| unreachable!())
}

pub(crate) fn line(test: &LabTest, quantity: i64) -> InvoiceLineItem {
    InvoiceLineItem {
        test_id: test.id,
        test_name: test.name.clone(),
        price: test.price,
        quantity,
    }
}

pub(crate) fn content(
    patient: &Patient,
    doctor: &Doctor,
    items: Vec<InvoiceLineItem>,
    discount: f64,
) -> InvoiceContent {
    InvoiceContent {
        patient_id: patient.id,
        doctor_id: doctor.id,
        items,
        discount,
        notes: None,
        payment_method: Some("cash".to_owned()),
    }
}

/// Single fake backing every repository port, ordered by insertion.
#[derive(Default)]
pub(crate) struct FakeLabStore {
    pub users: Mutex<Vec<User>>,
    pub invoices: Mutex<Vec<Invoice>>,
    pub reports: Mutex<Vec<Report>>,
    pub patients: Mutex<Vec<Patient>>,
    pub doctors: Mutex<Vec<Doctor>>,
    pub tests: Mutex<Vec<LabTest>>,
    pub expenses: Mutex<Vec<Expense>>,
    pub stock: Mutex<Vec<StockItem>>,
    pub audit: Mutex<Vec<AuditEntry>>,
}

impl FakeLabStore {
    pub(crate) async fn with_users(users: &[User]) -> Arc<Self> {
        let store = Arc::new(Self::default());
        store.users.lock().await.extend(users.iter().cloned());
        store
    }

    pub(crate) async fn seed_patient(&self, name: &str) -> Patient {
        let patient = Patient {
            id: PatientId::new(),
            name: name.to_owned(),
            age: 35,
            gender: Gender::Female,
            contact: "0770000000".to_owned(),
            created_at: fixed_now(),
            created_by: UserId::new(),
        };
        self.patients.lock().await.push(patient.clone());
        patient
    }

    pub(crate) async fn seed_doctor(&self, name: &str) -> Doctor {
        let doctor = Doctor {
            id: DoctorId::new(),
            name: name.to_owned(),
            specialty: "General".to_owned(),
            commission_percent: 10.0,
            is_active: true,
            created_at: fixed_now(),
        };
        self.doctors.lock().await.push(doctor.clone());
        doctor
    }

    pub(crate) async fn seed_test(&self, name: &str, category: &str, price: f64) -> LabTest {
        let test = LabTest {
            id: TestId::new(),
            name: name.to_owned(),
            category: category.to_owned(),
            price,
            sample_type: "Blood".to_owned(),
            is_active: true,
        };
        self.tests.lock().await.push(test.clone());
        test
    }

    pub(crate) async fn audit_actions(&self) -> Vec<&'static str> {
        self.audit
            .lock()
            .await
            .iter()
            .map(|entry| entry.action.as_str())
            .collect()
    }
}

fn upsert<T: Clone>(rows: &mut Vec<T>, row: T, same: impl Fn(&T) -> bool) {
    match rows.iter_mut().find(|existing| same(existing)) {
        Some(existing) => *existing = row,
        None => rows.push(row),
    }
}

#[async_trait]
impl UserRepository for FakeLabStore {
    async fn find_user(&self, user_id: UserId) -> AppResult<Option<User>> {
        Ok(self
            .users
            .lock()
            .await
            .iter()
            .find(|user| user.id() == user_id)
            .cloned())
    }

    async fn find_user_by_username(&self, username: &str) -> AppResult<Option<User>> {
        Ok(self
            .users
            .lock()
            .await
            .iter()
            .find(|user| user.username() == username)
            .cloned())
    }

    async fn find_user_by_email(&self, email: &EmailAddress) -> AppResult<Option<User>> {
        Ok(self
            .users
            .lock()
            .await
            .iter()
            .find(|user| user.email() == email)
            .cloned())
    }

    async fn list_users(&self) -> AppResult<Vec<User>> {
        Ok(self.users.lock().await.clone())
    }

    async fn save_user(&self, user: User) -> AppResult<()> {
        let user_id = user.id();
        upsert(&mut *self.users.lock().await, user, |row| row.id() == user_id);
        Ok(())
    }

    async fn delete_user(&self, user_id: UserId) -> AppResult<()> {
        self.users.lock().await.retain(|user| user.id() != user_id);
        Ok(())
    }
}

#[async_trait]
impl InvoiceRepository for FakeLabStore {
    async fn count_invoices(&self) -> AppResult<usize> {
        Ok(self.invoices.lock().await.len())
    }

    async fn find_invoice(&self, invoice_id: InvoiceId) -> AppResult<Option<Invoice>> {
        Ok(self
            .invoices
            .lock()
            .await
            .iter()
            .find(|invoice| invoice.id() == invoice_id)
            .cloned())
    }

    async fn list_invoices(&self) -> AppResult<Vec<Invoice>> {
        Ok(self.invoices.lock().await.clone())
    }

    async fn save_invoice(&self, invoice: Invoice) -> AppResult<()> {
        let invoice_id = invoice.id();
        upsert(&mut *self.invoices.lock().await, invoice, |row| {
            row.id() == invoice_id
        });
        Ok(())
    }

    async fn delete_invoice(&self, invoice_id: InvoiceId) -> AppResult<()> {
        self.invoices
            .lock()
            .await
            .retain(|invoice| invoice.id() != invoice_id);
        Ok(())
    }
}

#[async_trait]
impl ReportRepository for FakeLabStore {
    async fn find_report(&self, report_id: ReportId) -> AppResult<Option<Report>> {
        Ok(self
            .reports
            .lock()
            .await
            .iter()
            .find(|report| report.id() == report_id)
            .cloned())
    }

    async fn list_reports(&self) -> AppResult<Vec<Report>> {
        Ok(self.reports.lock().await.clone())
    }

    async fn save_report(&self, report: Report) -> AppResult<()> {
        let report_id = report.id();
        upsert(&mut *self.reports.lock().await, report, |row| {
            row.id() == report_id
        });
        Ok(())
    }

    async fn delete_report(&self, report_id: ReportId) -> AppResult<()> {
        self.reports
            .lock()
            .await
            .retain(|report| report.id() != report_id);
        Ok(())
    }
}

#[async_trait]
impl RegistryRepository for FakeLabStore {
    async fn save_patient(&self, patient: Patient) -> AppResult<()> {
        let patient_id = patient.id;
        upsert(&mut *self.patients.lock().await, patient, |row| {
            row.id == patient_id
        });
        Ok(())
    }

    async fn find_patient(&self, patient_id: PatientId) -> AppResult<Option<Patient>> {
        Ok(self
            .patients
            .lock()
            .await
            .iter()
            .find(|patient| patient.id == patient_id)
            .cloned())
    }

    async fn list_patients(&self) -> AppResult<Vec<Patient>> {
        Ok(self.patients.lock().await.clone())
    }

    async fn save_doctor(&self, doctor: Doctor) -> AppResult<()> {
        let doctor_id = doctor.id;
        upsert(&mut *self.doctors.lock().await, doctor, |row| {
            row.id == doctor_id
        });
        Ok(())
    }

    async fn find_doctor(&self, doctor_id: DoctorId) -> AppResult<Option<Doctor>> {
        Ok(self
            .doctors
            .lock()
            .await
            .iter()
            .find(|doctor| doctor.id == doctor_id)
            .cloned())
    }

    async fn list_doctors(&self) -> AppResult<Vec<Doctor>> {
        Ok(self.doctors.lock().await.clone())
    }

    async fn save_test(&self, test: LabTest) -> AppResult<()> {
        let test_id = test.id;
        upsert(&mut *self.tests.lock().await, test, |row| row.id == test_id);
        Ok(())
    }

    async fn find_test(&self, test_id: TestId) -> AppResult<Option<LabTest>> {
        Ok(self
            .tests
            .lock()
            .await
            .iter()
            .find(|test| test.id == test_id)
            .cloned())
    }

    async fn list_tests(&self) -> AppResult<Vec<LabTest>> {
        Ok(self.tests.lock().await.clone())
    }

    async fn save_expense(&self, expense: Expense) -> AppResult<()> {
        self.expenses.lock().await.push(expense);
        Ok(())
    }

    async fn list_expenses(&self) -> AppResult<Vec<Expense>> {
        Ok(self.expenses.lock().await.clone())
    }

    async fn save_stock_item(&self, item: StockItem) -> AppResult<()> {
        let item_id = item.id;
        upsert(&mut *self.stock.lock().await, item, |row| row.id == item_id);
        Ok(())
    }

    async fn find_stock_item(&self, item_id: StockItemId) -> AppResult<Option<StockItem>> {
        Ok(self
            .stock
            .lock()
            .await
            .iter()
            .find(|item| item.id == item_id)
            .cloned())
    }

    async fn list_stock_items(&self) -> AppResult<Vec<StockItem>> {
        Ok(self.stock.lock().await.clone())
    }
}

#[async_trait]
impl AuditRepository for FakeLabStore {
    async fn append_event(&self, event: AuditEvent) -> AppResult<AuditEntry> {
        let entry = AuditEntry {
            entry_id: AuditEntryId::new(),
            actor: event.actor,
            action: event.action,
            resource_id: event.resource_id,
            detail: event.detail,
            recorded_at: event.recorded_at,
        };
        self.audit.lock().await.push(entry.clone());
        Ok(entry)
    }

    async fn list_entries(&self) -> AppResult<Vec<AuditEntry>> {
        Ok(self.audit.lock().await.clone())
    }
}
