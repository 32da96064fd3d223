use chrono::{Duration, Utc};
use labdesk_application::{
    CreateReportInput, CreateUserInput, NewDoctor, NewExpense, NewLabTest, NewPatient,
    NewStockItem, UserRepository,
};
use labdesk_core::AppResult;
use labdesk_domain::{
    EmailAddress, Gender, InvoiceContent, InvoiceLineItem, InvoiceStatus, LabTest, ReportContent,
    ReportStatus, ReportTestResult, Role, StockMovement, User, UserId,
};
use tracing::info;

use crate::state::LabState;

const DEV_SEED_ADMIN_USERNAME: &str = "admin";
const DEV_SEED_ADMIN_EMAIL: &str = "admin@lab.com";
const DEV_SEED_ADMIN_DISPLAY_NAME: &str = "System Administrator";

const DEV_SEED_STAFF: [(&str, &str, &str, Role); 5] = [
    ("receptionist", "Reception Staff", "reception@lab.com", Role::Receptionist),
    ("technician", "Lab Technician", "tech@lab.com", Role::Technician),
    ("pathologist", "Dr. Pathologist", "pathologist@lab.com", Role::Pathologist),
    ("manager", "Lab Manager", "manager@lab.com", Role::Manager),
    ("accountant", "Accounts Officer", "accounts@lab.com", Role::Accountant),
];

struct SeedStaff {
    admin: UserId,
    receptionist: UserId,
    technician: UserId,
    pathologist: UserId,
    manager: UserId,
    accountant: UserId,
}

pub async fn run(state: &LabState) -> AppResult<()> {
    let staff = seed_staff(state).await?;

    let ahmad = state
        .registry_service
        .register_doctor(
            staff.manager,
            NewDoctor {
                name: "Dr. Ahmad Ali".to_owned(),
                specialty: "Internal Medicine".to_owned(),
                commission_percent: 10.0,
            },
        )
        .await?;
    let sarah = state
        .registry_service
        .register_doctor(
            staff.manager,
            NewDoctor {
                name: "Dr. Sarah Khan".to_owned(),
                specialty: "Cardiology".to_owned(),
                commission_percent: 15.0,
            },
        )
        .await?;

    let cbc = register_test(
        state,
        staff.pathologist,
        "Complete Blood Count (CBC)",
        "Hematology",
        800.0,
    )
    .await?;
    let lipid = register_test(
        state,
        staff.pathologist,
        "Lipid Profile",
        "Biochemistry",
        1200.0,
    )
    .await?;
    let lft = register_test(
        state,
        staff.pathologist,
        "Liver Function Tests",
        "Biochemistry",
        1500.0,
    )
    .await?;

    let john = state
        .registry_service
        .register_patient(
            staff.receptionist,
            NewPatient {
                name: "John Doe".to_owned(),
                age: 45,
                gender: Gender::Male,
                contact: "0300-1234567".to_owned(),
            },
        )
        .await?;
    let jane = state
        .registry_service
        .register_patient(
            staff.receptionist,
            NewPatient {
                name: "Jane Smith".to_owned(),
                age: 32,
                gender: Gender::Female,
                contact: "0300-2345678".to_owned(),
            },
        )
        .await?;

    let reagent = state
        .registry_service
        .register_stock_item(
            staff.manager,
            NewStockItem {
                name: "CBC Reagent Kit".to_owned(),
                category: "Reagents".to_owned(),
                current_stock: 5,
                reorder_level: 10,
                unit: "Kit".to_owned(),
            },
        )
        .await?;
    state
        .registry_service
        .register_stock_item(
            staff.manager,
            NewStockItem {
                name: "Sample Tubes".to_owned(),
                category: "Consumables".to_owned(),
                current_stock: 150,
                reorder_level: 50,
                unit: "Piece".to_owned(),
            },
        )
        .await?;

    for (category, amount, description, days_ago) in [
        ("Reagents", 12_500.0, "CBC reagent restock", 40),
        ("Utilities", 8_000.0, "Electricity", 5),
    ] {
        state
            .registry_service
            .record_expense(
                staff.accountant,
                NewExpense {
                    category: category.to_owned(),
                    amount,
                    description: description.to_owned(),
                    date: Some(Utc::now() - Duration::days(days_ago)),
                },
            )
            .await?;
    }

    let john_invoice = state
        .invoice_service
        .create_invoice(
            staff.receptionist,
            InvoiceContent {
                patient_id: john.id,
                doctor_id: ahmad.id,
                items: vec![line(&cbc), line(&lipid)],
                discount: 200.0,
                notes: None,
                payment_method: Some("cash".to_owned()),
            },
        )
        .await?;
    let jane_invoice = state
        .invoice_service
        .create_invoice(
            staff.receptionist,
            InvoiceContent {
                patient_id: jane.id,
                doctor_id: sarah.id,
                items: vec![line(&lft)],
                discount: 0.0,
                notes: Some("fasting sample".to_owned()),
                payment_method: Some("card".to_owned()),
            },
        )
        .await?;
    state
        .invoice_service
        .set_status(staff.accountant, john_invoice.id(), InvoiceStatus::Paid)
        .await?;
    state
        .invoice_service
        .set_status(
            staff.accountant,
            jane_invoice.id(),
            InvoiceStatus::Finalized,
        )
        .await?;

    let report = state
        .report_service
        .create_report(
            staff.technician,
            CreateReportInput {
                invoice_id: john_invoice.id(),
                content: ReportContent {
                    tests: vec![
                        result(&cbc, "13.8", "13.5 - 17.5", "g/dL", false),
                        result(&lipid, "236", "< 200", "mg/dL", true),
                    ],
                    template_id: None,
                    interpretation: Some("Raised total cholesterol.".to_owned()),
                    critical_values: false,
                },
            },
        )
        .await?;
    state
        .report_service
        .set_status(staff.technician, report.id(), ReportStatus::Completed)
        .await?;
    state
        .report_service
        .set_status(staff.pathologist, report.id(), ReportStatus::Verified)
        .await?;
    state
        .invoice_service
        .set_locked(staff.admin, john_invoice.id(), true)
        .await?;

    state
        .registry_service
        .adjust_stock(staff.technician, reagent.id, StockMovement::Out(2))
        .await?;

    info!(
        invoices = 2,
        reports = 1,
        staff = DEV_SEED_STAFF.len() + 1,
        "seeded demo lab data"
    );

    Ok(())
}

async fn seed_staff(state: &LabState) -> AppResult<SeedStaff> {
    let admin = User::new(
        UserId::new(),
        DEV_SEED_ADMIN_USERNAME,
        DEV_SEED_ADMIN_DISPLAY_NAME,
        EmailAddress::new(DEV_SEED_ADMIN_EMAIL)?,
        Role::Admin,
        Utc::now(),
    )?;
    let admin_id = admin.id();
    state.repository.save_user(admin).await?;

    let mut staff = SeedStaff {
        admin: admin_id,
        receptionist: admin_id,
        technician: admin_id,
        pathologist: admin_id,
        manager: admin_id,
        accountant: admin_id,
    };
    for (username, display_name, email, role) in DEV_SEED_STAFF {
        let user = state
            .user_service
            .create_user(
                admin_id,
                CreateUserInput {
                    username: username.to_owned(),
                    display_name: display_name.to_owned(),
                    email: email.to_owned(),
                    role,
                    custom_grants: Vec::new(),
                },
            )
            .await?;
        let slot = match role {
            Role::Receptionist => &mut staff.receptionist,
            Role::Technician => &mut staff.technician,
            Role::Pathologist => &mut staff.pathologist,
            Role::Manager => &mut staff.manager,
            Role::Accountant => &mut staff.accountant,
            Role::Admin | Role::LabHelper => continue,
        };
        *slot = user.id();
    }

    Ok(staff)
}

async fn register_test(
    state: &LabState,
    actor: UserId,
    name: &str,
    category: &str,
    price: f64,
) -> AppResult<LabTest> {
    state
        .registry_service
        .register_test(
            actor,
            NewLabTest {
                name: name.to_owned(),
                category: category.to_owned(),
                price,
                sample_type: "Blood".to_owned(),
            },
        )
        .await
}

fn line(test: &LabTest) -> InvoiceLineItem {
    InvoiceLineItem {
        test_id: test.id,
        test_name: test.name.clone(),
        price: test.price,
        quantity: 1,
    }
}

fn result(
    test: &LabTest,
    value: &str,
    normal_range: &str,
    unit: &str,
    is_abnormal: bool,
) -> ReportTestResult {
    ReportTestResult {
        test_id: test.id,
        test_name: test.name.clone(),
        result: value.to_owned(),
        normal_range: normal_range.to_owned(),
        unit: Some(unit.to_owned()),
        is_abnormal,
    }
}
