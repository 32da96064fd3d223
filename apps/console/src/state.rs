use std::sync::Arc;

use labdesk_application::{
    AnalyticsService, AuditService, AuthorizationService, Clock, InvoiceService, RegistryService,
    ReportService, UserService,
};
use labdesk_infrastructure::{InMemoryLabRepository, SystemClock};

#[derive(Clone)]
pub struct LabState {
    pub repository: Arc<InMemoryLabRepository>,
    pub authorization_service: AuthorizationService,
    pub user_service: UserService,
    pub registry_service: RegistryService,
    pub invoice_service: InvoiceService,
    pub report_service: ReportService,
    pub analytics_service: AnalyticsService,
    pub audit_service: AuditService,
}

pub fn build_lab_state() -> LabState {
    let repository = Arc::new(InMemoryLabRepository::new());
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let authorization_service = AuthorizationService::new(repository.clone());

    LabState {
        user_service: UserService::new(
            authorization_service.clone(),
            repository.clone(),
            repository.clone(),
            clock.clone(),
        ),
        registry_service: RegistryService::new(
            authorization_service.clone(),
            repository.clone(),
            repository.clone(),
            clock.clone(),
        ),
        invoice_service: InvoiceService::new(
            authorization_service.clone(),
            repository.clone(),
            repository.clone(),
            repository.clone(),
            clock.clone(),
        ),
        report_service: ReportService::new(
            authorization_service.clone(),
            repository.clone(),
            repository.clone(),
            repository.clone(),
            clock.clone(),
        ),
        analytics_service: AnalyticsService::new(
            authorization_service.clone(),
            repository.clone(),
            repository.clone(),
            repository.clone(),
            repository.clone(),
            clock,
        ),
        audit_service: AuditService::new(authorization_service.clone(), repository.clone()),
        authorization_service,
        repository,
    }
}
