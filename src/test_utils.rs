//! Shared test utilities.
//!
//! This module provides common helper functions for setting up test databases
//! and creating test entities with sensible defaults.

use crate::{
    config::codes::CodeTables,
    core::{loan, member, payment},
    entities::{self, LoanType},
    errors::{Error, Result},
};
use chrono::NaiveDate;
use sea_orm::{DatabaseConnection, Set, prelude::*};

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Code tables used throughout the tests: Kandy maps to town code 007 and
/// the standard three groups are present.
#[must_use]
pub fn test_code_tables() -> CodeTables {
    CodeTables::from_pairs(
        &[("Kandy", "007"), ("Matale", "012")],
        &[("Group 1", "001"), ("Group 2", "002"), ("Group 3", "003")],
    )
}

/// A registration request with sensible defaults. The NIC is the only field
/// tests usually need to vary (it must be unique).
///
/// # Defaults
/// * name: "Test Member"
/// * `home_number`: "0812223344"
/// * `town_two`: "Kandy" (town code 007 in [`test_code_tables`])
/// * `member_group`: "Group 2"
#[must_use]
pub fn test_new_member(nic: &str) -> member::NewMember {
    member::NewMember {
        first_name: "Test".to_string(),
        last_name: "Member".to_string(),
        nic_number: nic.to_string(),
        mobile_number: Some("0771234567".to_string()),
        home_number: "0812223344".to_string(),
        street_address: Some("12 Temple Road".to_string()),
        town_one: Some("Peradeniya".to_string()),
        town_two: Some("Kandy".to_string()),
        member_group: Some("Group 2".to_string()),
        is_member: true,
        first_guarantor: None,
        second_guarantor: None,
    }
}

/// A loan request with sensible defaults: 10000 principal at 10% flat with a
/// 500 document charge, monthly over 2024-01-01..2024-11-01. That yields an
/// 11000 amount due across 10 installments of 1100.
#[must_use]
pub fn test_new_loan(member_id: i64) -> loan::NewLoan {
    loan::NewLoan {
        member_id,
        loan_type: LoanType::Monthly,
        principal_amount: 10_000.0,
        interest_rate: 10.0,
        document_charge: 500.0,
        start_date: NaiveDate::from_ymd_opt(2024, 1, 1).expect("valid date"),
        end_date: NaiveDate::from_ymd_opt(2024, 11, 1).expect("valid date"),
    }
}

/// Seeds the capital account for tests that exercise disbursements and
/// collections.
pub async fn seed_test_capital(
    db: &DatabaseConnection,
    balance: f64,
) -> Result<entities::capital_account::Model> {
    crate::core::capital::ensure_capital(db, balance, None).await
}

/// Registers a member with the default request and the given NIC.
pub async fn create_test_member(
    db: &DatabaseConnection,
    nic: &str,
) -> Result<entities::member::Model> {
    member::register_member(db, test_new_member(nic)).await
}

/// Creates a loan with the default request for the given member, failing the
/// test when the capital debit did not complete.
pub async fn create_test_loan(
    db: &DatabaseConnection,
    member_id: i64,
) -> Result<entities::loan::Model> {
    match loan::create_loan(db, &test_code_tables(), test_new_loan(member_id)).await? {
        loan::DisbursementOutcome::Completed { loan } => Ok(loan),
        loan::DisbursementOutcome::CapitalDebitFailed { reason, .. } => Err(Error::Validation {
            message: format!("test loan disbursement incomplete: {reason}"),
        }),
    }
}

/// Records a payment with a fixed date, failing the test when the capital
/// credit did not complete.
pub async fn record_test_payment(
    db: &DatabaseConnection,
    loan_id: i64,
    amount: f64,
) -> Result<entities::payment::Model> {
    let paid_date = NaiveDate::from_ymd_opt(2024, 2, 1).expect("valid date");
    match payment::record_payment(db, loan_id, amount, paid_date, None).await? {
        payment::PaymentOutcome::Completed { payment, .. } => Ok(payment),
        payment::PaymentOutcome::CapitalCreditFailed { reason, .. } => Err(Error::Validation {
            message: format!("test payment incomplete: {reason}"),
        }),
    }
}

/// Inserts a member row directly with a chosen register number, bypassing
/// registration. Used by sequence tests that need specific maxima.
pub async fn insert_member_with_register_number(
    db: &DatabaseConnection,
    nic: &str,
    register_number: i64,
) -> Result<entities::member::Model> {
    entities::member::ActiveModel {
        register_number: Set(register_number),
        first_name: Set("Seeded".to_string()),
        last_name: Set("Member".to_string()),
        nic_number: Set(nic.to_string()),
        mobile_number: Set(None),
        home_number: Set("0812223344".to_string()),
        street_address: Set(None),
        town_one: Set(None),
        town_two: Set(None),
        member_group: Set(None),
        is_member: Set(true),
        created_at: Set(chrono::Utc::now()),
        first_guarantor_name: Set(None),
        first_guarantor_nic: Set(None),
        first_guarantor_tp: Set(None),
        first_guarantor_address: Set(None),
        second_guarantor_name: Set(None),
        second_guarantor_nic: Set(None),
        second_guarantor_tp: Set(None),
        second_guarantor_address: Set(None),
        ..Default::default()
    }
    .insert(db)
    .await
    .map_err(Into::into)
}

/// Inserts a loan row directly with a chosen loan number and registration
/// number, bypassing disbursement. Used by sequence tests.
pub async fn insert_loan_with_number(
    db: &DatabaseConnection,
    member_id: i64,
    loan_number: &str,
    loan_reg_number: i64,
) -> Result<entities::loan::Model> {
    entities::loan::ActiveModel {
        loan_reg_number: Set(loan_reg_number),
        loan_number: Set(loan_number.to_string()),
        member_id: Set(member_id),
        loan_type: Set(LoanType::Monthly),
        principal_amount: Set(10_000.0),
        interest_rate: Set(10.0),
        document_charge: Set(0.0),
        start_date: Set(NaiveDate::from_ymd_opt(2024, 1, 1).expect("valid date")),
        end_date: Set(NaiveDate::from_ymd_opt(2024, 11, 1).expect("valid date")),
        total_amount_due: Set(11_000.0),
        total_paid: Set(0.0),
        remaining_amount: Set(11_000.0),
        status: Set(entities::LoanStatus::Active),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await
    .map_err(Into::into)
}

/// A detached loan model for pure-function tests that never touch the store.
#[must_use]
pub fn sample_loan_model() -> entities::loan::Model {
    entities::loan::Model {
        id: 1,
        loan_reg_number: 1,
        loan_number: "12-007-002-001".to_string(),
        member_id: 1,
        loan_type: LoanType::Monthly,
        principal_amount: 10_000.0,
        interest_rate: 10.0,
        document_charge: 500.0,
        start_date: NaiveDate::from_ymd_opt(2024, 1, 1).expect("valid date"),
        end_date: NaiveDate::from_ymd_opt(2024, 11, 1).expect("valid date"),
        total_amount_due: 11_000.0,
        total_paid: 0.0,
        remaining_amount: 11_000.0,
        status: entities::LoanStatus::Active,
        created_at: chrono::Utc::now(),
    }
}

/// Sets up a complete test environment with one registered member.
/// Returns (db, member) for common test scenarios.
pub async fn setup_with_member() -> Result<(DatabaseConnection, entities::member::Model)> {
    let db = setup_test_db().await?;
    let member = create_test_member(&db, "853046782V").await?;
    Ok((db, member))
}

/// Sets up a complete test environment with seeded capital, a member and a
/// disbursed loan. Returns (db, member, loan).
pub async fn setup_with_loan()
-> Result<(DatabaseConnection, entities::member::Model, entities::loan::Model)> {
    let db = setup_test_db().await?;
    let member = create_test_member(&db, "853046782V").await?;
    seed_test_capital(&db, 100_000.0).await?;
    let loan = create_test_loan(&db, member.id).await?;
    Ok((db, member, loan))
}
