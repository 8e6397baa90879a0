//! Capital account business logic.
//!
//! The capital account is a single mutable row representing available
//! lendable funds. Every balance movement goes through [`debit`] or
//! [`credit`], which apply a single atomic database-level update
//! (`current_balance = current_balance +/- amount`) instead of a
//! read-modify-write cycle, so concurrent disbursements and collections
//! cannot lose updates. No lower bound is enforced: the balance going
//! negative is accepted business behavior, not a defect.
//!
//! Manual capital injections additionally append to the investments history,
//! and expenses append to the expense ledger; both pairs of writes run inside
//! one database transaction.

use crate::{
    entities::{
        CapitalAccount, Expense, Investment, capital_account, expense, investment,
    },
    errors::{Error, Result},
};
use chrono::NaiveDate;
use sea_orm::{
    ConnectionTrait, DatabaseConnection, QueryOrder, Set, TransactionTrait, prelude::*,
};
use tracing::info;

/// Fetches the capital account row.
///
/// # Errors
/// Returns [`Error::CapitalNotInitialized`] when the row has not been seeded.
pub async fn get_capital<C>(db: &C) -> Result<capital_account::Model>
where
    C: ConnectionTrait,
{
    CapitalAccount::find()
        .order_by_desc(capital_account::Column::LastUpdated)
        .one(db)
        .await?
        .ok_or(Error::CapitalNotInitialized)
}

/// Seeds the capital account on first run. Returns the existing row untouched
/// when one is already present, so calling this at every startup is safe.
pub async fn ensure_capital(
    db: &DatabaseConnection,
    starting_balance: f64,
    remark: Option<String>,
) -> Result<capital_account::Model> {
    if let Some(existing) = CapitalAccount::find().one(db).await? {
        return Ok(existing);
    }

    let seeded = capital_account::ActiveModel {
        starting_balance: Set(starting_balance),
        current_balance: Set(starting_balance),
        last_updated: Set(chrono::Utc::now()),
        remark: Set(remark),
        ..Default::default()
    }
    .insert(db)
    .await?;

    info!(balance = starting_balance, "Seeded capital account");
    Ok(seeded)
}

/// Applies a signed delta to the balance with a single atomic UPDATE and
/// returns the refreshed row.
async fn apply_delta<C>(db: &C, delta: f64) -> Result<capital_account::Model>
where
    C: ConnectionTrait,
{
    use sea_orm::sea_query::Expr;

    let account = get_capital(db).await?;

    CapitalAccount::update_many()
        .col_expr(
            capital_account::Column::CurrentBalance,
            Expr::col(capital_account::Column::CurrentBalance).add(delta),
        )
        .col_expr(
            capital_account::Column::LastUpdated,
            Expr::value(chrono::Utc::now()),
        )
        .filter(capital_account::Column::Id.eq(account.id))
        .exec(db)
        .await?;

    get_capital(db).await
}

/// Subtracts `amount` from the balance (loan disbursement, expense).
///
/// # Errors
/// Rejects non-positive or non-finite amounts with [`Error::InvalidAmount`].
pub async fn debit<C>(db: &C, amount: f64) -> Result<capital_account::Model>
where
    C: ConnectionTrait,
{
    validate_amount(amount)?;
    apply_delta(db, -amount).await
}

/// Adds `amount` to the balance (payment collection).
///
/// # Errors
/// Rejects non-positive or non-finite amounts with [`Error::InvalidAmount`].
pub async fn credit<C>(db: &C, amount: f64) -> Result<capital_account::Model>
where
    C: ConnectionTrait,
{
    validate_amount(amount)?;
    apply_delta(db, amount).await
}

/// Records a manual capital injection: credits the balance and appends an
/// entry to the append-only investments history, in one transaction.
pub async fn adjust(
    db: &DatabaseConnection,
    amount: f64,
    injected_date: NaiveDate,
    remark: Option<String>,
) -> Result<(capital_account::Model, investment::Model)> {
    validate_amount(amount)?;

    let txn = db.begin().await?;

    let account = credit(&txn, amount).await?;
    let entry = investment::ActiveModel {
        amount: Set(amount),
        injected_date: Set(injected_date),
        remark: Set(remark),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    txn.commit().await?;

    info!(amount, balance = account.current_balance, "Capital injection recorded");
    Ok((account, entry))
}

/// Records an operating expense: inserts the expense row and debits the
/// balance, in one transaction.
pub async fn record_expense(
    db: &DatabaseConnection,
    amount: f64,
    expense_date: NaiveDate,
    remark: Option<String>,
) -> Result<(capital_account::Model, expense::Model)> {
    validate_amount(amount)?;

    let txn = db.begin().await?;

    let entry = expense::ActiveModel {
        amount: Set(amount),
        remark: Set(remark),
        expense_date: Set(expense_date),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    }
    .insert(&txn)
    .await?;
    let account = debit(&txn, amount).await?;

    txn.commit().await?;

    info!(amount, balance = account.current_balance, "Expense recorded");
    Ok((account, entry))
}

/// Lists capital injections, newest first, optionally restricted to a
/// date range (inclusive).
pub async fn investment_history(
    db: &DatabaseConnection,
    range: Option<(NaiveDate, NaiveDate)>,
) -> Result<Vec<investment::Model>> {
    let mut query = Investment::find().order_by_desc(investment::Column::InjectedDate);
    if let Some((start, end)) = range {
        query = query
            .filter(investment::Column::InjectedDate.gte(start))
            .filter(investment::Column::InjectedDate.lte(end));
    }
    query.all(db).await.map_err(Into::into)
}

/// Lists expenses, newest first, optionally restricted to a date range
/// (inclusive).
pub async fn expense_history(
    db: &DatabaseConnection,
    range: Option<(NaiveDate, NaiveDate)>,
) -> Result<Vec<expense::Model>> {
    let mut query = Expense::find().order_by_desc(expense::Column::ExpenseDate);
    if let Some((start, end)) = range {
        query = query
            .filter(expense::Column::ExpenseDate.gte(start))
            .filter(expense::Column::ExpenseDate.lte(end));
    }
    query.all(db).await.map_err(Into::into)
}

fn validate_amount(amount: f64) -> Result<()> {
    if amount <= 0.0 || !amount.is_finite() {
        return Err(Error::InvalidAmount { amount });
    }
    Ok(())
}
