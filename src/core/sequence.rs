//! Identifier generation business logic.
//!
//! Mints the three human-readable identifier families used across the office:
//! member register numbers (dense global sequence), loan registration numbers
//! (a second, independent dense sequence used on documents), and structured
//! loan numbers carrying a decodable (town, group, ordinal) triple.
//!
//! All three are derived from the current maximum (or count) in the store, so
//! two concurrent creations can mint the same value. Callers therefore run
//! minting and the subsequent insert inside one database transaction, and the
//! unique indexes on the identifier columns turn a lost race into
//! [`crate::errors::Error::Conflict`] at insert time rather than a silent
//! overwrite.

use crate::{
    config::codes::CodeTables,
    entities::{Loan, Member, loan, member},
    errors::Result,
};
use sea_orm::{ConnectionTrait, PaginatorTrait, QueryOrder, prelude::*};

/// Fixed branch prefix every loan number starts with
pub const LOAN_NUMBER_PREFIX: &str = "12";

/// Computes the next member register number: one past the current maximum,
/// starting at 1 when no members exist.
pub async fn next_register_number<C>(db: &C) -> Result<i64>
where
    C: ConnectionTrait,
{
    let newest = Member::find()
        .order_by_desc(member::Column::RegisterNumber)
        .one(db)
        .await?;

    Ok(newest.map_or(1, |m| m.register_number + 1))
}

/// Computes the next loan registration number: one past the current maximum,
/// starting at 1 when no loans exist. Independent of the per-town-group
/// counter inside the loan number.
pub async fn next_loan_reg_number<C>(db: &C) -> Result<i64>
where
    C: ConnectionTrait,
{
    let newest = Loan::find()
        .order_by_desc(loan::Column::LoanRegNumber)
        .one(db)
        .await?;

    Ok(newest.map_or(1, |l| l.loan_reg_number + 1))
}

/// Generates the next structured loan number for a member's town and group:
/// `"12-<townCode>-<groupCode>-<seq>"` where `seq` is the count of loans
/// already carrying the same prefix, plus one, zero-padded to 3 digits.
///
/// Unmapped towns and groups resolve to `"000"`, so their loans share one
/// catch-all counter per unmapped dimension.
pub async fn generate_loan_number<C>(
    db: &C,
    codes: &CodeTables,
    town: Option<&str>,
    group: Option<&str>,
) -> Result<String>
where
    C: ConnectionTrait,
{
    let town_code = codes.town_code(town);
    let group_code = codes.group_code(group);
    let prefix = format!("{LOAN_NUMBER_PREFIX}-{town_code}-{group_code}-");

    let existing = Loan::find()
        .filter(loan::Column::LoanNumber.starts_with(&prefix))
        .count(db)
        .await?;

    Ok(format!("{prefix}{:03}", existing + 1))
}

/// Formats a register or loan registration number for display: zero-padded
/// to 6 digits.
#[must_use]
pub fn format_register_number(number: i64) -> String {
    format!("{number:06}")
}
