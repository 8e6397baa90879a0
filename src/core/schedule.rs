//! Installment schedule business logic.
//!
//! Derives the expected number of installments and the per-installment amount
//! from a loan's cadence and date range. The counting rules are deliberately
//! simple calendar arithmetic:
//!
//! - daily: number of days between start and end
//! - weekly: full weeks, plus one for any remainder days
//! - monthly: whole months, where the final month only counts once the end
//!   day-of-month has reached the start day-of-month
//!
//! Each cadence yields at least 1 installment for a valid range. All functions
//! here are pure except [`installment_stats`], which sums the loan's recorded
//! payments.

use crate::{
    entities::{LoanType, Payment, loan, payment},
    errors::{Error, Result},
};
use chrono::{Datelike, NaiveDate};
use sea_orm::{ConnectionTrait, prelude::*};

/// Expected installment count and per-installment amount for a loan
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Schedule {
    /// Number of installments expected over the loan's date range
    pub expected: u32,
    /// Amount of a single installment, rounded to the nearest currency unit
    /// with ties away from zero
    pub installment_amount: f64,
}

/// Schedule expectation combined with the loan's actual payment totals
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InstallmentStats {
    /// Number of installments expected over the loan's date range
    pub expected: u32,
    /// Whole installments covered by the amount collected so far
    pub paid: u32,
    /// Installments still outstanding
    pub remaining: u32,
    /// Sum of all recorded payments
    pub total_paid: f64,
    /// Amount of a single installment
    pub installment_amount: f64,
}

/// Counts the expected installments for a cadence over a date range.
///
/// Assumes `start < end` (loan creation validates the range); for a
/// degenerate range every cadence still reports its minimum of 1.
#[must_use]
pub fn expected_installments(loan_type: LoanType, start: NaiveDate, end: NaiveDate) -> u32 {
    let total_days = (end - start).num_days().max(0);

    let count = match loan_type {
        LoanType::Daily => total_days,
        LoanType::Weekly => {
            let weeks = total_days / 7;
            if total_days % 7 > 0 { weeks + 1 } else { weeks }
        }
        LoanType::Monthly => {
            let mut months = i64::from(end.year() - start.year()) * 12
                + (i64::from(end.month()) - i64::from(start.month()));
            // The final month only counts once its day-of-month is reached
            if end.day() < start.day() {
                months -= 1;
            }
            months
        }
    };

    u32::try_from(count.max(1)).unwrap_or(1)
}

/// Computes the expected installment count and per-installment amount for a
/// loan's cadence, date range and total amount due.
///
/// # Errors
/// Returns [`Error::InvalidDateRange`] when `start >= end`.
pub fn compute_schedule(
    loan_type: LoanType,
    start: NaiveDate,
    end: NaiveDate,
    total_amount_due: f64,
) -> Result<Schedule> {
    if start >= end {
        return Err(Error::InvalidDateRange { start, end });
    }

    let expected = expected_installments(loan_type, start, end);
    // round() ties away from zero, which matches how collected amounts are
    // quoted to members
    let installment_amount = (total_amount_due / f64::from(expected)).round();

    Ok(Schedule {
        expected,
        installment_amount,
    })
}

/// Whole installments covered by the amount collected so far. Zero when the
/// installment amount itself is zero, so a degenerate schedule never divides
/// by zero.
#[must_use]
pub fn installments_paid(total_paid: f64, installment_amount: f64) -> u32 {
    if installment_amount <= 0.0 {
        return 0;
    }

    let paid = (total_paid / installment_amount).floor();
    if paid <= 0.0 {
        0
    } else {
        // Truncation is fine: paid is a non-negative whole number here
        paid as u32
    }
}

/// Computes the full installment picture for a loan: the schedule expectation
/// plus how many installments the recorded payments amount to.
///
/// This is the amount-based paid metric. The delinquency report intentionally
/// uses a payment-count metric instead; see `core::report`.
pub async fn installment_stats<C>(db: &C, loan: &loan::Model) -> Result<InstallmentStats>
where
    C: ConnectionTrait,
{
    let schedule = compute_schedule(
        loan.loan_type,
        loan.start_date,
        loan.end_date,
        loan.total_amount_due,
    )?;

    let payments = Payment::find()
        .filter(payment::Column::LoanId.eq(loan.id))
        .all(db)
        .await?;
    let total_paid = payments.iter().map(|p| p.paid_amount).sum::<f64>();

    let paid = installments_paid(total_paid, schedule.installment_amount);
    let remaining = schedule.expected.saturating_sub(paid);

    Ok(InstallmentStats {
        expected: schedule.expected,
        paid,
        remaining,
        total_paid,
        installment_amount: schedule.installment_amount,
    })
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::test_utils::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_daily_counts_days() {
        let expected =
            expected_installments(LoanType::Daily, date(2024, 1, 1), date(2024, 1, 10));
        assert_eq!(expected, 9);
    }

    #[test]
    fn test_daily_minimum_is_one() {
        let expected =
            expected_installments(LoanType::Daily, date(2024, 1, 1), date(2024, 1, 1));
        assert_eq!(expected, 1);
    }

    #[test]
    fn test_weekly_rounds_partial_week_up() {
        // 10 days: one full week plus 3 remainder days
        let expected =
            expected_installments(LoanType::Weekly, date(2024, 1, 1), date(2024, 1, 11));
        assert_eq!(expected, 2);
    }

    #[test]
    fn test_weekly_exact_weeks() {
        let expected =
            expected_installments(LoanType::Weekly, date(2024, 1, 1), date(2024, 1, 15));
        assert_eq!(expected, 2);
    }

    #[test]
    fn test_monthly_discounts_incomplete_final_month() {
        // Two calendar months apart, but the end day (1) is before the start
        // day (31), so the final month is not yet complete
        let expected =
            expected_installments(LoanType::Monthly, date(2024, 1, 31), date(2024, 3, 1));
        assert_eq!(expected, 1);
    }

    #[test]
    fn test_monthly_full_months() {
        let expected =
            expected_installments(LoanType::Monthly, date(2024, 1, 15), date(2024, 7, 15));
        assert_eq!(expected, 6);
    }

    #[test]
    fn test_monthly_minimum_is_one() {
        let expected =
            expected_installments(LoanType::Monthly, date(2024, 1, 1), date(2024, 1, 20));
        assert_eq!(expected, 1);
    }

    #[test]
    fn test_compute_schedule_rejects_inverted_range() {
        let result = compute_schedule(
            LoanType::Daily,
            date(2024, 2, 1),
            date(2024, 1, 1),
            10000.0,
        );
        assert!(matches!(
            result.unwrap_err(),
            Error::InvalidDateRange { .. }
        ));

        let result = compute_schedule(
            LoanType::Daily,
            date(2024, 1, 1),
            date(2024, 1, 1),
            10000.0,
        );
        assert!(matches!(
            result.unwrap_err(),
            Error::InvalidDateRange { .. }
        ));
    }

    #[test]
    fn test_installment_amount_rounds_to_nearest() {
        // 10000 over 3 installments: 3333.33.. rounds to 3333
        let schedule = compute_schedule(
            LoanType::Monthly,
            date(2024, 1, 1),
            date(2024, 4, 1),
            10000.0,
        )
        .unwrap();
        assert_eq!(schedule.expected, 3);
        assert_eq!(schedule.installment_amount, 3333.0);

        // 10001 over 8 installments: 1250.125 rounds to 1250
        let schedule = compute_schedule(
            LoanType::Monthly,
            date(2024, 1, 1),
            date(2024, 9, 1),
            10001.0,
        )
        .unwrap();
        assert_eq!(schedule.expected, 8);
        assert_eq!(schedule.installment_amount, 1250.0);
    }

    #[test]
    fn test_installments_paid_floors() {
        assert_eq!(installments_paid(0.0, 1000.0), 0);
        assert_eq!(installments_paid(999.0, 1000.0), 0);
        assert_eq!(installments_paid(1000.0, 1000.0), 1);
        assert_eq!(installments_paid(2999.0, 1000.0), 2);
    }

    #[test]
    fn test_installments_paid_guards_zero_installment() {
        assert_eq!(installments_paid(5000.0, 0.0), 0);
    }

    #[tokio::test]
    async fn test_installment_stats_over_recorded_payments() -> Result<()> {
        let (db, _member, loan) = setup_with_loan().await?;

        // Default test loan: 10000 at 10% monthly over 2024-01-01..2024-11-01,
        // so 11000 due over 10 installments of 1100
        record_test_payment(&db, loan.id, 1100.0).await?;
        record_test_payment(&db, loan.id, 1100.0).await?;
        record_test_payment(&db, loan.id, 500.0).await?;

        let loan = crate::core::loan::get_loan_by_id(&db, loan.id).await?.unwrap();
        let stats = installment_stats(&db, &loan).await?;
        assert_eq!(stats.expected, 10);
        assert_eq!(stats.installment_amount, 1100.0);
        assert_eq!(stats.total_paid, 2700.0);
        assert_eq!(stats.paid, 2);
        assert_eq!(stats.remaining, 8);

        Ok(())
    }
}
