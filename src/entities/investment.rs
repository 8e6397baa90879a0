//! Investment entity - Append-only history of manual capital injections.
//!
//! Every administrative capital adjustment credits the capital account and
//! appends one row here. The history exists for reporting only and is never
//! mutated.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Investment database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "investments")]
pub struct Model {
    /// Unique identifier for the injection
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Injected amount (> 0)
    pub amount: f64,
    /// Day the injection was made
    pub injected_date: Date,
    /// Optional note on the source of the funds
    pub remark: Option<String>,
    /// When the history row was created
    pub created_at: DateTimeUtc,
}

/// Investments have no relationships with other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
