//! Reporting aggregates over in-memory collections.
//!
//! Every aggregate skips records whose foreign key cannot be resolved instead
//! of failing.

use std::collections::HashMap;

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::billing::Invoice;
use crate::identifiers::{DoctorId, TestId};
use crate::registry::{Doctor, Expense, LabTest, Patient};
use crate::report::Report;

/// Number of calendar months in a rollup.
pub const ROLLUP_MONTHS: usize = 12;

/// Number of doctors kept in the performance ranking.
pub const DOCTOR_RANKING_LIMIT: usize = 10;

const MONTH_ABBREVIATIONS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Calendar month used as a rollup key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MonthKey {
    /// Calendar year.
    pub year: i32,
    /// Month number, 1 through 12.
    pub month: u32,
}

impl MonthKey {
    /// Returns the month containing `date`.
    #[must_use]
    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// Returns the month containing `timestamp`.
    #[must_use]
    pub fn of_timestamp(timestamp: DateTime<Utc>) -> Self {
        Self::of(timestamp.date_naive())
    }

    /// Returns the preceding calendar month.
    #[must_use]
    pub fn previous(self) -> Self {
        if self.month <= 1 {
            Self {
                year: self.year - 1,
                month: 12,
            }
        } else {
            Self {
                year: self.year,
                month: self.month - 1,
            }
        }
    }

    /// Returns a chart label such as `Oct 2026`.
    #[must_use]
    pub fn label(&self) -> String {
        let index = usize::try_from(self.month.clamp(1, 12) - 1).unwrap_or(0);
        format!("{} {}", MONTH_ABBREVIATIONS[index], self.year)
    }
}

/// Returns `count` consecutive months ending with the month of `today`, oldest first.
#[must_use]
pub fn trailing_months(today: NaiveDate, count: usize) -> Vec<MonthKey> {
    let mut months = Vec::with_capacity(count);
    let mut cursor = MonthKey::of(today);
    for _ in 0..count {
        months.push(cursor);
        cursor = cursor.previous();
    }
    months.reverse();
    months
}

/// Aggregates for one calendar month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyBucket {
    /// Month key.
    pub month: MonthKey,
    /// Chart label, e.g. `Oct 2026`.
    pub label: String,
    /// Sum of invoice final amounts.
    pub revenue: f64,
    /// Sum of expense amounts.
    pub expenses: f64,
    /// Number of patients registered.
    pub patients: usize,
    /// Number of test results reported.
    pub tests: usize,
    /// Revenue minus expenses.
    pub profit: f64,
}

impl MonthlyBucket {
    fn empty(month: MonthKey) -> Self {
        Self {
            month,
            label: month.label(),
            revenue: 0.0,
            expenses: 0.0,
            patients: 0,
            tests: 0,
            profit: 0.0,
        }
    }
}

/// Buckets records into the trailing twelve months ending with `today`.
///
/// All twelve buckets are present even when empty. Records dated outside the
/// window are ignored.
#[must_use]
pub fn monthly_rollup(
    today: NaiveDate,
    invoices: &[Invoice],
    expenses: &[Expense],
    patients: &[Patient],
    reports: &[Report],
) -> Vec<MonthlyBucket> {
    let mut buckets: Vec<MonthlyBucket> = trailing_months(today, ROLLUP_MONTHS)
        .into_iter()
        .map(MonthlyBucket::empty)
        .collect();
    let index: HashMap<MonthKey, usize> = buckets
        .iter()
        .enumerate()
        .map(|(position, bucket)| (bucket.month, position))
        .collect();

    for invoice in invoices {
        if let Some(bucket) = bucket_for(&mut buckets, &index, invoice.created_at()) {
            bucket.revenue += invoice.final_amount();
        }
    }

    for expense in expenses {
        if let Some(bucket) = bucket_for(&mut buckets, &index, expense.date) {
            bucket.expenses += expense.amount;
        }
    }

    for patient in patients {
        if let Some(bucket) = bucket_for(&mut buckets, &index, patient.created_at) {
            bucket.patients += 1;
        }
    }

    for report in reports {
        if let Some(bucket) = bucket_for(&mut buckets, &index, report.created_at()) {
            bucket.tests += report.tests().len();
        }
    }

    for bucket in &mut buckets {
        bucket.profit = bucket.revenue - bucket.expenses;
    }

    buckets
}

fn bucket_for<'a>(
    buckets: &'a mut [MonthlyBucket],
    index: &HashMap<MonthKey, usize>,
    timestamp: DateTime<Utc>,
) -> Option<&'a mut MonthlyBucket> {
    let position = *index.get(&MonthKey::of_timestamp(timestamp))?;
    buckets.get_mut(position)
}

/// Number of reported tests in one catalog category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryCount {
    /// Catalog category.
    pub category: String,
    /// Number of reported results.
    pub count: usize,
}

/// Tallies report results by catalog category, in first-seen order.
///
/// Results referencing a test missing from the catalog are skipped.
#[must_use]
pub fn category_distribution(reports: &[Report], tests: &[LabTest]) -> Vec<CategoryCount> {
    let categories: HashMap<TestId, &str> = tests
        .iter()
        .map(|test| (test.id, test.category.as_str()))
        .collect();
    let mut counts: Vec<CategoryCount> = Vec::new();

    for result in reports.iter().flat_map(Report::tests) {
        let Some(category) = categories.get(&result.test_id) else {
            continue;
        };

        match counts.iter_mut().find(|entry| entry.category == *category) {
            Some(entry) => entry.count += 1,
            None => counts.push(CategoryCount {
                category: (*category).to_owned(),
                count: 1,
            }),
        }
    }

    counts
}

/// Referral totals for one doctor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DoctorPerformance {
    /// Doctor identifier.
    pub doctor_id: DoctorId,
    /// Doctor name.
    pub name: String,
    /// Number of invoices referred.
    pub referrals: usize,
    /// Sum of referred invoice final amounts.
    pub revenue: f64,
}

/// Ranks referring doctors by revenue, highest first, keeping the top ten.
///
/// Invoices naming an unknown doctor are skipped. Equal revenues keep the order
/// in which the doctors first appear in `invoices`.
#[must_use]
pub fn doctor_performance(invoices: &[Invoice], doctors: &[Doctor]) -> Vec<DoctorPerformance> {
    let names: HashMap<DoctorId, &str> = doctors
        .iter()
        .map(|doctor| (doctor.id, doctor.name.as_str()))
        .collect();
    let mut ranking: Vec<DoctorPerformance> = Vec::new();

    for invoice in invoices {
        let doctor_id = invoice.doctor_id();
        let Some(name) = names.get(&doctor_id) else {
            continue;
        };

        match ranking
            .iter_mut()
            .find(|entry| entry.doctor_id == doctor_id)
        {
            Some(entry) => {
                entry.referrals += 1;
                entry.revenue += invoice.final_amount();
            }
            None => ranking.push(DoctorPerformance {
                doctor_id,
                name: (*name).to_owned(),
                referrals: 1,
                revenue: invoice.final_amount(),
            }),
        }
    }

    ranking.sort_by(|left, right| right.revenue.total_cmp(&left.revenue));
    ranking.truncate(DOCTOR_RANKING_LIMIT);
    ranking
}

/// Headline totals across all records.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsSummary {
    /// Sum of invoice final amounts.
    pub total_revenue: f64,
    /// Sum of expense amounts.
    pub total_expenses: f64,
    /// Revenue minus expenses.
    pub net_profit: f64,
    /// Number of reported test results.
    pub total_tests: usize,
}

/// Computes headline totals.
#[must_use]
pub fn analytics_summary(
    invoices: &[Invoice],
    expenses: &[Expense],
    reports: &[Report],
) -> AnalyticsSummary {
    let total_revenue: f64 = invoices.iter().map(Invoice::final_amount).sum();
    let total_expenses: f64 = expenses.iter().map(|expense| expense.amount).sum();

    AnalyticsSummary {
        total_revenue,
        total_expenses,
        net_profit: total_revenue - total_expenses,
        total_tests: reports.iter().map(|report| report.tests().len()).sum(),
    }
}
