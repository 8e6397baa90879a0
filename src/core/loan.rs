//! Loan lifecycle business logic.
//!
//! Creating a loan mints its identifiers, derives the amount due, inserts the
//! row and debits the capital account by the disbursed principal. The insert
//! and identifier minting share one transaction; the capital debit happens
//! after commit, and a debit failure is reported as a first-class
//! [`DisbursementOutcome::CapitalDebitFailed`] rather than rolling back the
//! already-committed loan (the office fixes the ledger manually in that case,
//! it never un-issues a loan).
//!
//! Closing is one-directional and idempotent: an Active loan closes, a Closed
//! loan stays closed, and nothing here ever reopens one.

use crate::{
    config::codes::CodeTables,
    core::{capital, schedule, sequence},
    entities::{Loan, LoanStatus, LoanType, loan},
    errors::{Error, Result},
};
use chrono::NaiveDate;
use sea_orm::{
    DatabaseConnection, QueryOrder, Set, TransactionTrait, prelude::*,
};
use tracing::{info, warn};

/// Input for issuing a new loan
#[derive(Debug, Clone)]
pub struct NewLoan {
    /// ID of the member the loan is issued to
    pub member_id: i64,
    /// Repayment cadence
    pub loan_type: LoanType,
    /// Disbursed principal (> 0)
    pub principal_amount: f64,
    /// Flat interest rate in percent (0-100)
    pub interest_rate: f64,
    /// Up-front documentation charge (>= 0)
    pub document_charge: f64,
    /// First day of the repayment period
    pub start_date: NaiveDate,
    /// Last day of the repayment period
    pub end_date: NaiveDate,
}

/// Result of [`create_loan`]. The loan row is committed in both variants;
/// the variants differ only in whether the capital ledger moved with it.
#[derive(Debug)]
pub enum DisbursementOutcome {
    /// Loan inserted and capital debited by the principal
    Completed {
        /// The newly created loan
        loan: loan::Model,
    },
    /// Loan inserted but the capital debit failed - the ledger no longer
    /// reflects the disbursement and needs manual correction
    CapitalDebitFailed {
        /// The newly created loan
        loan: loan::Model,
        /// Why the capital debit failed
        reason: String,
    },
}

impl DisbursementOutcome {
    /// The created loan, regardless of ledger outcome
    #[must_use]
    pub fn loan(&self) -> &loan::Model {
        match self {
            Self::Completed { loan } | Self::CapitalDebitFailed { loan, .. } => loan,
        }
    }

    /// Whether the capital ledger moved in step with the disbursement
    #[must_use]
    pub fn is_complete(&self) -> bool {
        matches!(self, Self::Completed { .. })
    }
}

/// Derives the amount due on a loan: principal plus flat interest.
///
/// The document charge is collected up front and deliberately kept out of
/// this figure; it reappears only in the profit formula. See
/// [`total_amount_due_with_document_charge`] for the alternative view.
#[must_use]
pub fn total_amount_due(principal_amount: f64, interest_rate: f64) -> f64 {
    principal_amount + principal_amount * interest_rate / 100.0
}

/// Alternative amount-due view that bills the document charge into the
/// repayment schedule. Not used by loan creation; offered for callers that
/// quote the all-in figure to members.
#[must_use]
pub fn total_amount_due_with_document_charge(
    principal_amount: f64,
    interest_rate: f64,
    document_charge: f64,
) -> f64 {
    total_amount_due(principal_amount, interest_rate) + document_charge
}

/// Issues a new loan to a member.
///
/// Validates the financial inputs and date range, mints the loan number and
/// loan registration number, inserts the loan (all in one transaction), then
/// debits the capital account by the principal.
///
/// # Errors
/// Validation failures ([`Error::InvalidAmount`], [`Error::InvalidInterestRate`],
/// [`Error::InvalidDateRange`], [`Error::Validation`]), a missing member
/// ([`Error::MemberNotFound`]), identifier races ([`Error::Conflict`]) and
/// storage failures all abort before any state is written.
pub async fn create_loan(
    db: &DatabaseConnection,
    codes: &CodeTables,
    new_loan: NewLoan,
) -> Result<DisbursementOutcome> {
    if new_loan.principal_amount <= 0.0 || !new_loan.principal_amount.is_finite() {
        return Err(Error::InvalidAmount {
            amount: new_loan.principal_amount,
        });
    }
    if !(0.0..=100.0).contains(&new_loan.interest_rate) {
        return Err(Error::InvalidInterestRate {
            rate: new_loan.interest_rate,
        });
    }
    if new_loan.document_charge < 0.0 || !new_loan.document_charge.is_finite() {
        return Err(Error::InvalidAmount {
            amount: new_loan.document_charge,
        });
    }

    let member = crate::core::member::get_member_by_id(db, new_loan.member_id)
        .await?
        .ok_or_else(|| Error::MemberNotFound {
            reference: new_loan.member_id.to_string(),
        })?;

    let due = total_amount_due(new_loan.principal_amount, new_loan.interest_rate);
    // Rejects start >= end before anything is written
    schedule::compute_schedule(
        new_loan.loan_type,
        new_loan.start_date,
        new_loan.end_date,
        due,
    )?;

    let txn = db.begin().await?;

    let loan_number = sequence::generate_loan_number(
        &txn,
        codes,
        member.town_two.as_deref(),
        member.member_group.as_deref(),
    )
    .await?;
    let loan_reg_number = sequence::next_loan_reg_number(&txn).await?;

    let model = loan::ActiveModel {
        loan_reg_number: Set(loan_reg_number),
        loan_number: Set(loan_number),
        member_id: Set(member.id),
        loan_type: Set(new_loan.loan_type),
        principal_amount: Set(new_loan.principal_amount),
        interest_rate: Set(new_loan.interest_rate),
        document_charge: Set(new_loan.document_charge),
        start_date: Set(new_loan.start_date),
        end_date: Set(new_loan.end_date),
        total_amount_due: Set(due),
        total_paid: Set(0.0),
        remaining_amount: Set(due),
        status: Set(LoanStatus::Active),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    };

    let inserted = model
        .insert(&txn)
        .await
        .map_err(|e| Error::from_insert(e, "loan number"))?;

    txn.commit().await?;

    info!(
        loan_number = %inserted.loan_number,
        loan_reg_number,
        principal = inserted.principal_amount,
        "Issued loan"
    );

    // The loan is committed; a failed debit must be surfaced, not hidden and
    // not compensated by deleting the loan
    match capital::debit(db, inserted.principal_amount).await {
        Ok(_) => Ok(DisbursementOutcome::Completed { loan: inserted }),
        Err(err) => {
            warn!(
                loan_number = %inserted.loan_number,
                error = %err,
                "Loan issued but capital debit failed"
            );
            Ok(DisbursementOutcome::CapitalDebitFailed {
                loan: inserted,
                reason: err.to_string(),
            })
        }
    }
}

/// Administratively closes a loan. Idempotent: closing an already-closed
/// loan returns it unchanged.
pub async fn close_loan(db: &DatabaseConnection, loan_id: i64) -> Result<loan::Model> {
    let loan = get_loan_by_id(db, loan_id)
        .await?
        .ok_or_else(|| Error::LoanNotFound {
            reference: loan_id.to_string(),
        })?;

    if loan.status == LoanStatus::Closed {
        return Ok(loan);
    }

    let mut active: loan::ActiveModel = loan.into();
    active.status = Set(LoanStatus::Closed);
    let closed = active.update(db).await?;

    info!(loan_number = %closed.loan_number, "Loan closed");
    Ok(closed)
}

/// Finds a loan by id, returning None when absent.
pub async fn get_loan_by_id(
    db: &DatabaseConnection,
    loan_id: i64,
) -> Result<Option<loan::Model>> {
    Loan::find_by_id(loan_id).one(db).await.map_err(Into::into)
}

/// Finds a loan by its structured loan number, returning None when absent.
pub async fn get_loan_by_number(
    db: &DatabaseConnection,
    loan_number: &str,
) -> Result<Option<loan::Model>> {
    Loan::find()
        .filter(loan::Column::LoanNumber.eq(loan_number))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Finds a loan by its registration number, returning None when absent.
pub async fn get_loan_by_reg_number(
    db: &DatabaseConnection,
    loan_reg_number: i64,
) -> Result<Option<loan::Model>> {
    Loan::find()
        .filter(loan::Column::LoanRegNumber.eq(loan_reg_number))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Retrieves all loans, newest first.
pub async fn get_all_loans(db: &DatabaseConnection) -> Result<Vec<loan::Model>> {
    Loan::find()
        .order_by_desc(loan::Column::CreatedAt)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Retrieves a member's loans, newest first.
pub async fn get_loans_for_member(
    db: &DatabaseConnection,
    member_id: i64,
) -> Result<Vec<loan::Model>> {
    Loan::find()
        .filter(loan::Column::MemberId.eq(member_id))
        .order_by_desc(loan::Column::CreatedAt)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Retrieves loans created within a date range (inclusive), newest first.
pub async fn get_loans_created_between(
    db: &DatabaseConnection,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<Vec<loan::Model>> {
    let start_at = start.and_hms_opt(0, 0, 0).map(|d| d.and_utc());
    // Exclusive upper bound at the next midnight keeps the whole end day in
    let end_at = end
        .succ_opt()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|d| d.and_utc());

    let mut query = Loan::find().order_by_desc(loan::Column::CreatedAt);
    if let Some(start_at) = start_at {
        query = query.filter(loan::Column::CreatedAt.gte(start_at));
    }
    if let Some(end_at) = end_at {
        query = query.filter(loan::Column::CreatedAt.lt(end_at));
    }
    query.all(db).await.map_err(Into::into)
}

/// Administratively removes a mis-entered loan by registration number.
///
/// # Errors
/// Returns [`Error::LoanNotFound`] when no loan carries the number.
pub async fn delete_loan_by_reg_number(
    db: &DatabaseConnection,
    loan_reg_number: i64,
) -> Result<()> {
    let loan = get_loan_by_reg_number(db, loan_reg_number)
        .await?
        .ok_or_else(|| Error::LoanNotFound {
            reference: loan_reg_number.to_string(),
        })?;

    let loan_number = loan.loan_number.clone();
    loan.delete(db).await?;

    warn!(loan_number = %loan_number, loan_reg_number, "Loan deleted");
    Ok(())
}
