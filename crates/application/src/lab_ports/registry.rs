use async_trait::async_trait;
use labdesk_core::AppResult;
use labdesk_domain::{
    Doctor, DoctorId, Expense, LabTest, Patient, PatientId, StockItem, StockItemId, TestId,
};

/// Repository port for patients, doctors, the test catalog, expenses and stock.
///
/// List operations return records in insertion order.
#[async_trait]
pub trait RegistryRepository: Send + Sync {
    /// Inserts or replaces a patient.
    async fn save_patient(&self, patient: Patient) -> AppResult<()>;

    /// Finds a patient.
    async fn find_patient(&self, patient_id: PatientId) -> AppResult<Option<Patient>>;

    /// Lists patients.
    async fn list_patients(&self) -> AppResult<Vec<Patient>>;

    /// Inserts or replaces a doctor.
    async fn save_doctor(&self, doctor: Doctor) -> AppResult<()>;

    /// Finds a doctor.
    async fn find_doctor(&self, doctor_id: DoctorId) -> AppResult<Option<Doctor>>;

    /// Lists doctors.
    async fn list_doctors(&self) -> AppResult<Vec<Doctor>>;

    /// Inserts or replaces a catalog test.
    async fn save_test(&self, test: LabTest) -> AppResult<()>;

    /// Finds a catalog test.
    async fn find_test(&self, test_id: TestId) -> AppResult<Option<LabTest>>;

    /// Lists catalog tests.
    async fn list_tests(&self) -> AppResult<Vec<LabTest>>;

    /// Appends an expense.
    async fn save_expense(&self, expense: Expense) -> AppResult<()>;

    /// Lists expenses.
    async fn list_expenses(&self) -> AppResult<Vec<Expense>>;

    /// Inserts or replaces a stock item.
    async fn save_stock_item(&self, item: StockItem) -> AppResult<()>;

    /// Finds a stock item.
    async fn find_stock_item(&self, item_id: StockItemId) -> AppResult<Option<StockItem>>;

    /// Lists stock items.
    async fn list_stock_items(&self) -> AppResult<Vec<StockItem>>;
}
