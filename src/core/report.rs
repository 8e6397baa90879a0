//! Report generation business logic.
//!
//! Read-side aggregation over persisted loans and payments: realized profit,
//! book-wide summary statistics, the capital position and the delinquency
//! report. Nothing here mutates state.
//!
//! Two "installments paid" metrics exist in the system on purpose: the
//! schedule module's amount-based metric (collected money divided by the
//! installment amount) and this module's payment-count metric used for
//! delinquency. The delinquency report counts payment rows because a member
//! who pays half installments twice a period has still shown up on schedule.

use crate::{
    core::schedule,
    entities::{Loan, LoanStatus, Member, Payment, loan, member},
    errors::Result,
};
use chrono::NaiveDate;
use sea_orm::{DatabaseConnection, QueryOrder, prelude::*};
use std::collections::HashMap;

/// Per-loan profit figures
#[derive(Debug, Clone)]
pub struct LoanProfit {
    /// The loan being reported on
    pub loan: loan::Model,
    /// Collected money net of principal and document charge
    pub profit: f64,
    /// Profit as a percentage of the principal (0 when principal is 0)
    pub profit_percentage: f64,
}

/// Book-wide totals
#[derive(Debug, Clone, Copy)]
pub struct SummaryStatistics {
    /// Number of loans on the book
    pub total_loans: usize,
    /// Number of loans still collecting
    pub active_loans: usize,
    /// Sum of all amounts due
    pub total_amount_due: f64,
    /// Sum of all collected money
    pub total_paid: f64,
    /// Sum of all remaining amounts
    pub total_remaining: f64,
    /// Realized profit over closed loans only
    pub total_realized_profit: f64,
    /// Realized profit over total principal, as a percentage
    pub average_profit_percentage: f64,
}

/// Capital position relative to the outstanding book
#[derive(Debug, Clone, Copy)]
pub struct CapitalReport {
    /// Current capital balance
    pub current_balance: f64,
    /// Number of loans on the book
    pub total_loans: usize,
    /// Money still out with members
    pub total_remaining: f64,
    /// Balance minus outstanding money
    pub cash_flow: f64,
}

/// Whether a loan's collections are keeping up with its schedule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DelinquencyStatus {
    /// Payment count has reached the elapsed expectation
    OnTime,
    /// Payment count trails the expectation
    Delayed,
}

/// One row of the delinquency report
#[derive(Debug, Clone)]
pub struct DelinquencyRow {
    /// Structured loan number
    pub loan_number: String,
    /// Cadence of the loan
    pub loan_type: crate::entities::LoanType,
    /// Installments expected over the loan's full date range
    pub expected_installments: u32,
    /// Number of payment rows recorded (count-based metric)
    pub paid_installments: u32,
    /// How many installments the loan is behind, 0 when on time
    pub delay: u32,
    /// On time / delayed
    pub status: DelinquencyStatus,
    /// Member's full name
    pub member_name: String,
    /// Member's mobile number
    pub member_mobile: Option<String>,
    /// Member's address assembled from the address fields
    pub member_address: String,
}

/// Realized profit of a single loan: collected money net of the principal
/// and the up-front document charge. Meaningful for closed loans; for an
/// active loan this is simply collections-to-date minus cost.
#[must_use]
pub fn loan_profit(loan: &loan::Model) -> f64 {
    loan.total_paid - (loan.principal_amount + loan.document_charge)
}

/// Profit as a percentage of principal, 0 when the principal is 0.
#[must_use]
pub fn profit_percentage(loan: &loan::Model) -> f64 {
    if loan.principal_amount == 0.0 {
        return 0.0;
    }
    loan_profit(loan) / loan.principal_amount * 100.0
}

/// Sums realized profit over all closed loans.
pub async fn total_realized_profit(db: &DatabaseConnection) -> Result<f64> {
    let closed = Loan::find()
        .filter(loan::Column::Status.eq(LoanStatus::Closed))
        .all(db)
        .await?;

    Ok(closed.iter().map(loan_profit).sum())
}

/// Per-loan profit rows over the whole book, newest first.
pub async fn profit_report(db: &DatabaseConnection) -> Result<Vec<LoanProfit>> {
    let loans = crate::core::loan::get_all_loans(db).await?;
    Ok(loans.into_iter().map(to_profit_row).collect())
}

/// Per-loan profit rows for loans created in a date range, newest first.
pub async fn profit_report_between(
    db: &DatabaseConnection,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<Vec<LoanProfit>> {
    let loans = crate::core::loan::get_loans_created_between(db, start, end).await?;
    Ok(loans.into_iter().map(to_profit_row).collect())
}

fn to_profit_row(loan: loan::Model) -> LoanProfit {
    let profit = loan_profit(&loan);
    let profit_percentage = profit_percentage(&loan);
    LoanProfit {
        loan,
        profit,
        profit_percentage,
    }
}

/// Computes book-wide summary statistics.
pub async fn summary_statistics(db: &DatabaseConnection) -> Result<SummaryStatistics> {
    let loans = crate::core::loan::get_all_loans(db).await?;

    let total_loans = loans.len();
    let active_loans = loans.iter().filter(|l| l.is_active()).count();
    let total_amount_due = loans.iter().map(|l| l.total_amount_due).sum();
    let total_paid = loans.iter().map(|l| l.total_paid).sum();
    let total_remaining = loans.iter().map(|l| l.remaining_amount).sum();
    let total_realized_profit = loans
        .iter()
        .filter(|l| l.status == LoanStatus::Closed)
        .map(loan_profit)
        .sum::<f64>();

    let total_principal: f64 = loans.iter().map(|l| l.principal_amount).sum();
    let average_profit_percentage = if total_principal > 0.0 {
        total_realized_profit / total_principal * 100.0
    } else {
        0.0
    };

    Ok(SummaryStatistics {
        total_loans,
        active_loans,
        total_amount_due,
        total_paid,
        total_remaining,
        total_realized_profit,
        average_profit_percentage,
    })
}

/// Computes the capital position: balance, outstanding book and the cash
/// flow between them.
pub async fn capital_report(db: &DatabaseConnection) -> Result<CapitalReport> {
    let account = crate::core::capital::get_capital(db).await?;
    let loans = crate::core::loan::get_all_loans(db).await?;

    let total_remaining: f64 = loans.iter().map(|l| l.remaining_amount).sum();

    Ok(CapitalReport {
        current_balance: account.current_balance,
        total_loans: loans.len(),
        total_remaining,
        cash_flow: account.current_balance - total_remaining,
    })
}

/// Builds the delinquency report over every loan on the book.
///
/// Expected installments come from the schedule rules; paid installments are
/// the count of payment rows. A positive difference marks the loan Delayed.
pub async fn delinquency_report(db: &DatabaseConnection) -> Result<Vec<DelinquencyRow>> {
    let loans_with_members = Loan::find()
        .find_also_related(Member)
        .order_by_desc(loan::Column::CreatedAt)
        .all(db)
        .await?;

    let payments = Payment::find().all(db).await?;
    let mut payment_counts: HashMap<i64, u32> = HashMap::new();
    for p in &payments {
        *payment_counts.entry(p.loan_id).or_insert(0) += 1;
    }

    let rows = loans_with_members
        .into_iter()
        .map(|(loan, member)| {
            let expected =
                schedule::expected_installments(loan.loan_type, loan.start_date, loan.end_date);
            let paid = payment_counts.get(&loan.id).copied().unwrap_or(0);
            let delay = expected.saturating_sub(paid);
            let status = if delay > 0 {
                DelinquencyStatus::Delayed
            } else {
                DelinquencyStatus::OnTime
            };

            DelinquencyRow {
                loan_number: loan.loan_number,
                loan_type: loan.loan_type,
                expected_installments: expected,
                paid_installments: paid,
                delay,
                status,
                member_name: member.as_ref().map(member::Model::full_name).unwrap_or_default(),
                member_mobile: member.as_ref().and_then(|m| m.mobile_number.clone()),
                member_address: member.as_ref().map(format_address).unwrap_or_default(),
            }
        })
        .collect();

    Ok(rows)
}

fn format_address(member: &member::Model) -> String {
    [
        Some(member.home_number.clone()),
        member.street_address.clone(),
        member.town_one.clone(),
        member.town_two.clone(),
    ]
    .into_iter()
    .flatten()
    .filter(|part| !part.is_empty())
    .collect::<Vec<_>>()
    .join(" ")
}
