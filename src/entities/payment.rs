//! Payment entity - One collected installment against a loan.
//!
//! Payments are append-only: there is no edit or delete path, and a loan's
//! financial state is always a fold over its payment rows.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Payment database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "payments")]
pub struct Model {
    /// Unique identifier for the payment
    #[sea_orm(primary_key)]
    pub id: i64,
    /// ID of the loan this payment was collected against
    pub loan_id: i64,
    /// Collected amount (> 0, at most the loan's remaining amount at entry)
    pub paid_amount: f64,
    /// Day the payment was collected
    pub paid_date: Date,
    /// Optional collector remark
    pub remark: Option<String>,
    /// When the payment row was created
    pub created_at: DateTimeUtc,
}

/// Defines relationships between Payment and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each payment belongs to one loan
    #[sea_orm(
        belongs_to = "super::loan::Entity",
        from = "Column::LoanId",
        to = "super::loan::Column::Id"
    )]
    Loan,
}

impl Related<super::loan::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Loan.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
