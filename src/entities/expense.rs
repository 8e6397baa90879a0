//! Expense entity - Append-only ledger of operating expenses.
//!
//! Inserting an expense is coupled transactionally to a capital account debit;
//! rows are never edited or deleted.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Expense database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "expenses")]
pub struct Model {
    /// Unique identifier for the expense
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Expensed amount (> 0)
    pub amount: f64,
    /// Optional description of what was paid for
    pub remark: Option<String>,
    /// Day the expense occurred
    pub expense_date: Date,
    /// When the expense row was created
    pub created_at: DateTimeUtc,
}

/// Expenses have no relationships with other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
