//! Loan entity - Represents an issued loan and its running financial state.
//!
//! `total_paid` and `remaining_amount` are maintained by the payment ledger as
//! a fold over the loan's payments; `status` only ever moves Active -> Closed.
//! The `loan_number` is a structured, human-decodable code and
//! `loan_reg_number` is the separate dense sequence used on documents.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Repayment cadence of a loan
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
pub enum LoanType {
    /// One installment per day
    #[sea_orm(string_value = "daily")]
    Daily,
    /// One installment per week
    #[sea_orm(string_value = "weekly")]
    Weekly,
    /// One installment per month
    #[sea_orm(string_value = "monthly")]
    Monthly,
}

/// Lifecycle state of a loan. Transitions are one-directional: an Active loan
/// may close, a Closed loan never reopens automatically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
pub enum LoanStatus {
    /// Loan is disbursed and collecting payments
    #[sea_orm(string_value = "active")]
    Active,
    /// Loan is fully repaid (or administratively closed)
    #[sea_orm(string_value = "closed")]
    Closed,
}

/// Loan database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "loans")]
pub struct Model {
    /// Unique identifier for the loan
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Globally dense sequence, the primary human-facing loan ID on documents.
    /// Displayed zero-padded to 6 digits.
    #[sea_orm(unique)]
    pub loan_reg_number: i64,
    /// Structured code `"12-<town>-<group>-<seq>"` encoding a decodable
    /// (town, group, ordinal-within-town-group) triple
    #[sea_orm(unique)]
    pub loan_number: String,
    /// ID of the member this loan was issued to
    pub member_id: i64,
    /// Repayment cadence
    pub loan_type: LoanType,
    /// Disbursed principal (> 0)
    pub principal_amount: f64,
    /// Flat interest rate in percent (0-100)
    pub interest_rate: f64,
    /// Up-front documentation charge (>= 0), collected outside the schedule
    pub document_charge: f64,
    /// First day of the repayment period
    pub start_date: Date,
    /// Last day of the repayment period (strictly after `start_date`)
    pub end_date: Date,
    /// Derived at creation: principal plus flat interest
    pub total_amount_due: f64,
    /// Sum of all payments recorded against this loan, never decreasing
    pub total_paid: f64,
    /// `total_amount_due - total_paid`
    pub remaining_amount: f64,
    /// Lifecycle state
    pub status: LoanStatus,
    /// When the loan was created
    pub created_at: DateTimeUtc,
}

/// Defines relationships between Loan and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each loan belongs to one member
    #[sea_orm(
        belongs_to = "super::member::Entity",
        from = "Column::MemberId",
        to = "super::member::Column::Id"
    )]
    Member,
    /// One loan has many payments
    #[sea_orm(has_many = "super::payment::Entity")]
    Payments,
}

impl Related<super::member::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Member.def()
    }
}

impl Related<super::payment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Payments.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Whether the loan is still collecting payments
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.status == LoanStatus::Active
    }
}
