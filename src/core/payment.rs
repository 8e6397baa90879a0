//! Payment ledger business logic.
//!
//! Recording a payment appends the payment row and folds it into the loan's
//! `total_paid`/`remaining_amount`/`status` inside one database transaction,
//! so those three fields can never disagree with the payment rows. The
//! capital credit happens after commit: a credit failure leaves the payment
//! and loan update in place and is reported as the first-class
//! [`PaymentOutcome::CapitalCreditFailed`] variant - never a silent success,
//! never an automatic rollback of collected money.

use crate::{
    core::capital,
    entities::{LoanStatus, Payment, loan, payment},
    errors::{Error, Result},
};
use chrono::NaiveDate;
use sea_orm::{
    DatabaseConnection, QueryOrder, Set, TransactionTrait, prelude::*,
};
use tracing::{info, warn};

/// Result of [`record_payment`]. The payment and loan update are committed
/// in both variants; the variants differ only in whether the capital ledger
/// moved with them.
#[derive(Debug)]
pub enum PaymentOutcome {
    /// Payment recorded, loan updated and capital credited
    Completed {
        /// The recorded payment
        payment: payment::Model,
        /// Loan snapshot after the payment was folded in
        loan: loan::Model,
    },
    /// Payment recorded and loan updated, but the capital credit failed -
    /// the ledger is behind by `payment.paid_amount` until corrected
    CapitalCreditFailed {
        /// The recorded payment
        payment: payment::Model,
        /// Loan snapshot after the payment was folded in
        loan: loan::Model,
        /// Why the capital credit failed
        reason: String,
    },
}

impl PaymentOutcome {
    /// Loan snapshot after the payment, regardless of ledger outcome
    #[must_use]
    pub fn loan(&self) -> &loan::Model {
        match self {
            Self::Completed { loan, .. } | Self::CapitalCreditFailed { loan, .. } => loan,
        }
    }

    /// The recorded payment, regardless of ledger outcome
    #[must_use]
    pub fn payment(&self) -> &payment::Model {
        match self {
            Self::Completed { payment, .. } | Self::CapitalCreditFailed { payment, .. } => {
                payment
            }
        }
    }

    /// Whether the capital ledger moved in step with the collection
    #[must_use]
    pub fn is_complete(&self) -> bool {
        matches!(self, Self::Completed { .. })
    }
}

/// Records a payment against a loan.
///
/// Preconditions: the amount is positive and does not exceed the loan's
/// remaining amount before this payment. Violations fail with a validation
/// error and no state change. On success the payment row, the loan's new
/// totals and (when the remaining amount reaches zero) the Active -> Closed
/// transition are committed atomically, then the capital account is credited.
pub async fn record_payment(
    db: &DatabaseConnection,
    loan_id: i64,
    amount: f64,
    paid_date: NaiveDate,
    remark: Option<String>,
) -> Result<PaymentOutcome> {
    let loan = crate::core::loan::get_loan_by_id(db, loan_id)
        .await?
        .ok_or_else(|| Error::LoanNotFound {
            reference: loan_id.to_string(),
        })?;

    if amount <= 0.0 || !amount.is_finite() {
        return Err(Error::InvalidAmount { amount });
    }
    if amount > loan.remaining_amount {
        return Err(Error::AmountExceedsRemaining {
            amount,
            remaining: loan.remaining_amount,
        });
    }

    let new_total_paid = loan.total_paid + amount;
    let new_remaining = loan.total_amount_due - new_total_paid;
    // One-directional: a paid-off loan closes, and a loan that is already
    // Closed (administratively) never reopens
    let new_status = if new_remaining <= 0.0 {
        LoanStatus::Closed
    } else {
        loan.status
    };

    let txn = db.begin().await?;

    let inserted = payment::ActiveModel {
        loan_id: Set(loan.id),
        paid_amount: Set(amount),
        paid_date: Set(paid_date),
        remark: Set(remark),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    let mut active: loan::ActiveModel = loan.into();
    active.total_paid = Set(new_total_paid);
    active.remaining_amount = Set(new_remaining);
    active.status = Set(new_status);
    let updated = active.update(&txn).await?;

    txn.commit().await?;

    info!(
        loan_number = %updated.loan_number,
        amount,
        remaining = updated.remaining_amount,
        closed = updated.status == LoanStatus::Closed,
        "Payment recorded"
    );

    match capital::credit(db, amount).await {
        Ok(_) => Ok(PaymentOutcome::Completed {
            payment: inserted,
            loan: updated,
        }),
        Err(err) => {
            warn!(
                loan_number = %updated.loan_number,
                amount,
                error = %err,
                "Payment recorded but capital credit failed"
            );
            Ok(PaymentOutcome::CapitalCreditFailed {
                payment: inserted,
                loan: updated,
                reason: err.to_string(),
            })
        }
    }
}

/// Retrieves all payments for a loan, newest first.
pub async fn get_payments_for_loan(
    db: &DatabaseConnection,
    loan_id: i64,
) -> Result<Vec<payment::Model>> {
    Payment::find()
        .filter(payment::Column::LoanId.eq(loan_id))
        .order_by_desc(payment::Column::PaidDate)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Retrieves payments collected within a date range (inclusive), newest
/// first.
pub async fn get_payments_between(
    db: &DatabaseConnection,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<Vec<payment::Model>> {
    Payment::find()
        .filter(payment::Column::PaidDate.gte(start))
        .filter(payment::Column::PaidDate.lte(end))
        .order_by_desc(payment::Column::PaidDate)
        .all(db)
        .await
        .map_err(Into::into)
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

    async fn loan_invariants_hold(db: &sea_orm::DatabaseConnection, loan_id: i64) {
        let loan = crate::core::loan::get_loan_by_id(db, loan_id)
            .await
            .unwrap()
            .unwrap();
        let payments = get_payments_for_loan(db, loan_id).await.unwrap();
        let paid_sum: f64 = payments.iter().map(|p| p.paid_amount).sum();

        assert_eq!(loan.total_paid, paid_sum);
        assert_eq!(loan.remaining_amount, loan.total_amount_due - loan.total_paid);
    }

    #[tokio::test]
    async fn test_record_payment_updates_loan_and_capital() -> Result<()> {
        // Default test loan: 11000 due, capital seeded at 100000 and debited
        // to 90000 by the disbursement
        let (db, _member, loan) = setup_with_loan().await?;

        let outcome = record_payment(&db, loan.id, 1100.0, date(2024, 2, 1), None).await?;
        assert!(outcome.is_complete());
        assert_eq!(outcome.loan().total_paid, 1100.0);
        assert_eq!(outcome.loan().remaining_amount, 9900.0);
        assert_eq!(outcome.loan().status, LoanStatus::Active);

        let capital = crate::core::capital::get_capital(&db).await?;
        assert_eq!(capital.current_balance, 91_100.0);

        loan_invariants_hold(&db, loan.id).await;
        Ok(())
    }

    #[tokio::test]
    async fn test_record_payment_rejects_non_positive_amount() -> Result<()> {
        let (db, _member, loan) = setup_with_loan().await?;

        for amount in [0.0, -100.0, f64::NAN] {
            let result = record_payment(&db, loan.id, amount, date(2024, 2, 1), None).await;
            assert!(matches!(result.unwrap_err(), Error::InvalidAmount { .. }));
        }

        // No side effects
        assert!(get_payments_for_loan(&db, loan.id).await?.is_empty());
        let unchanged = crate::core::loan::get_loan_by_id(&db, loan.id).await?.unwrap();
        assert_eq!(unchanged.total_paid, 0.0);
        assert_eq!(unchanged.remaining_amount, unchanged.total_amount_due);
        Ok(())
    }

    #[tokio::test]
    async fn test_record_payment_rejects_overpayment() -> Result<()> {
        let (db, _member, loan) = setup_with_loan().await?;

        let result =
            record_payment(&db, loan.id, loan.remaining_amount + 1.0, date(2024, 2, 1), None)
                .await;
        assert!(matches!(
            result.unwrap_err(),
            Error::AmountExceedsRemaining { .. }
        ));

        assert!(get_payments_for_loan(&db, loan.id).await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_record_payment_unknown_loan() -> Result<()> {
        let db = setup_test_db().await?;

        let result = record_payment(&db, 999, 100.0, date(2024, 2, 1), None).await;
        assert!(matches!(result.unwrap_err(), Error::LoanNotFound { .. }));
        Ok(())
    }

    #[tokio::test]
    async fn test_record_payment_loan_not_found_mock() -> Result<()> {
        use sea_orm::{DatabaseBackend, MockDatabase};

        // Configure MockDatabase to return no loan (simulating not found)
        let db = MockDatabase::new(DatabaseBackend::Sqlite)
            .append_query_results([Vec::<crate::entities::loan::Model>::new()])
            .into_connection();

        let result = record_payment(&db, 1, 100.0, date(2024, 2, 1), None).await;
        assert!(matches!(result.unwrap_err(), Error::LoanNotFound { .. }));
        Ok(())
    }

    #[tokio::test]
    async fn test_record_payment_propagates_data_access_errors() -> Result<()> {
        use sea_orm::{DatabaseBackend, DbErr, MockDatabase};

        let db = MockDatabase::new(DatabaseBackend::Sqlite)
            .append_query_errors([DbErr::Custom("connection reset".to_string())])
            .into_connection();

        let result = record_payment(&db, 1, 100.0, date(2024, 2, 1), None).await;
        assert!(matches!(result.unwrap_err(), Error::Database(_)));
        Ok(())
    }

    #[tokio::test]
    async fn test_final_payment_closes_loan() -> Result<()> {
        let (db, _member, loan) = setup_with_loan().await?;

        record_payment(&db, loan.id, 10_000.0, date(2024, 2, 1), None).await?;
        let outcome = record_payment(&db, loan.id, 1000.0, date(2024, 3, 1), None).await?;

        assert_eq!(outcome.loan().remaining_amount, 0.0);
        assert_eq!(outcome.loan().status, LoanStatus::Closed);

        loan_invariants_hold(&db, loan.id).await;
        Ok(())
    }

    #[tokio::test]
    async fn test_partial_payment_keeps_loan_active() -> Result<()> {
        let (db, _member, loan) = setup_with_loan().await?;

        let outcome = record_payment(&db, loan.id, 10_999.0, date(2024, 2, 1), None).await?;
        assert_eq!(outcome.loan().remaining_amount, 1.0);
        assert_eq!(outcome.loan().status, LoanStatus::Active);
        Ok(())
    }

    #[tokio::test]
    async fn test_closed_loan_rejects_further_payments() -> Result<()> {
        let (db, _member, loan) = setup_with_loan().await?;

        record_payment(&db, loan.id, 11_000.0, date(2024, 2, 1), None).await?;
        let result = record_payment(&db, loan.id, 1.0, date(2024, 3, 1), None).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::AmountExceedsRemaining { .. }
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_admin_closed_loan_never_reopens() -> Result<()> {
        let (db, _member, loan) = setup_with_loan().await?;

        // Close administratively while money is still outstanding
        crate::core::loan::close_loan(&db, loan.id).await?;

        let outcome = record_payment(&db, loan.id, 1000.0, date(2024, 2, 1), None).await?;
        assert_eq!(outcome.loan().status, LoanStatus::Closed);
        assert_eq!(outcome.loan().total_paid, 1000.0);
        Ok(())
    }

    #[tokio::test]
    async fn test_payment_without_capital_is_partial_outcome() -> Result<()> {
        let (db, member) = setup_with_member().await?;
        let codes = test_code_tables();

        // No capital seeded: disbursement already reported a partial outcome,
        // and collections must do the same while still recording the money
        let loan = match crate::core::loan::create_loan(&db, &codes, test_new_loan(member.id))
            .await?
        {
            crate::core::loan::DisbursementOutcome::CapitalDebitFailed { loan, .. } => loan,
            crate::core::loan::DisbursementOutcome::Completed { loan } => loan,
        };

        let outcome = record_payment(&db, loan.id, 500.0, date(2024, 2, 1), None).await?;
        assert!(!outcome.is_complete());
        assert!(matches!(
            outcome,
            PaymentOutcome::CapitalCreditFailed { .. }
        ));

        // The payment and loan update are committed despite the failed credit
        assert_eq!(get_payments_for_loan(&db, loan.id).await?.len(), 1);
        loan_invariants_hold(&db, loan.id).await;
        Ok(())
    }

    #[tokio::test]
    async fn test_payments_between_filters_by_paid_date() -> Result<()> {
        let (db, _member, loan) = setup_with_loan().await?;

        record_payment(&db, loan.id, 1000.0, date(2024, 2, 1), None).await?;
        record_payment(&db, loan.id, 1000.0, date(2024, 3, 1), None).await?;
        record_payment(&db, loan.id, 1000.0, date(2024, 4, 1), None).await?;

        let feb_march = get_payments_between(&db, date(2024, 2, 1), date(2024, 3, 31)).await?;
        assert_eq!(feb_march.len(), 2);
        // Newest first
        assert_eq!(feb_march[0].paid_date, date(2024, 3, 1));
        Ok(())
    }

    #[tokio::test]
    async fn test_remark_is_stored() -> Result<()> {
        let (db, _member, loan) = setup_with_loan().await?;

        let outcome = record_payment(
            &db,
            loan.id,
            1000.0,
            date(2024, 2, 1),
            Some("Collected at branch".to_string()),
        )
        .await?;
        assert_eq!(
            outcome.payment().remark.as_deref(),
            Some("Collected at branch")
        );
        Ok(())
    }
}
