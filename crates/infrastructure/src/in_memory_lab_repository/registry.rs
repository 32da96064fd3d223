use super::*;

#[async_trait]
impl RegistryRepository for InMemoryLabRepository {
    async fn save_patient(&self, patient: Patient) -> AppResult<()> {
        self.patients.write().await.upsert(patient.id, patient);
        Ok(())
    }

    async fn find_patient(&self, patient_id: PatientId) -> AppResult<Option<Patient>> {
        Ok(self.patients.read().await.get(patient_id))
    }

    async fn list_patients(&self) -> AppResult<Vec<Patient>> {
        Ok(self.patients.read().await.values())
    }

    async fn save_doctor(&self, doctor: Doctor) -> AppResult<()> {
        self.doctors.write().await.upsert(doctor.id, doctor);
        Ok(())
    }

    async fn find_doctor(&self, doctor_id: DoctorId) -> AppResult<Option<Doctor>> {
        Ok(self.doctors.read().await.get(doctor_id))
    }

    async fn list_doctors(&self) -> AppResult<Vec<Doctor>> {
        Ok(self.doctors.read().await.values())
    }

    async fn save_test(&self, test: LabTest) -> AppResult<()> {
        self.tests.write().await.upsert(test.id, test);
        Ok(())
    }

    async fn find_test(&self, test_id: TestId) -> AppResult<Option<LabTest>> {
        Ok(self.tests.read().await.get(test_id))
    }

    async fn list_tests(&self) -> AppResult<Vec<LabTest>> {
        Ok(self.tests.read().await.values())
    }

    async fn save_expense(&self, expense: Expense) -> AppResult<()> {
        let mut expenses = self.expenses.write().await;

        if expenses.get(expense.id).is_some() {
            return Err(AppError::Conflict(format!(
                "expense '{}' was already recorded",
                expense.id
            )));
        }

        expenses.upsert(expense.id, expense);
        Ok(())
    }

    async fn list_expenses(&self) -> AppResult<Vec<Expense>> {
        Ok(self.expenses.read().await.values())
    }

    async fn save_stock_item(&self, item: StockItem) -> AppResult<()> {
        self.stock.write().await.upsert(item.id, item);
        Ok(())
    }

    async fn find_stock_item(&self, item_id: StockItemId) -> AppResult<Option<StockItem>> {
        Ok(self.stock.read().await.get(item_id))
    }

    async fn list_stock_items(&self) -> AppResult<Vec<StockItem>> {
        Ok(self.stock.read().await.values())
    }
}
