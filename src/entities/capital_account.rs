//! Capital account entity - The singleton lendable-funds balance.
//!
//! Exactly one row exists after seeding. Every disbursement debits it, every
//! collection credits it, and expenses/injections move it through the same
//! two primitives. The balance is allowed to go negative.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Capital account database model - singleton row
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "bank_capital")]
pub struct Model {
    /// Unique identifier (a single row exists in practice)
    #[sea_orm(primary_key)]
    pub id: i32,
    /// Balance the account was seeded with
    pub starting_balance: f64,
    /// Current lendable balance - may be negative
    pub current_balance: f64,
    /// When the balance last moved
    pub last_updated: DateTimeUtc,
    /// Optional note recorded at seeding time
    pub remark: Option<String>,
}

/// The capital account has no relationships with other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
