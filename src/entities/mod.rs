//! Entity module - Contains all SeaORM entity definitions for the database.
//! These entities represent the database tables and their relationships.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod capital_account;
pub mod expense;
pub mod investment;
pub mod loan;
pub mod member;
pub mod payment;

// Re-export specific types to avoid conflicts
pub use capital_account::{
    Column as CapitalAccountColumn, Entity as CapitalAccount, Model as CapitalAccountModel,
};
pub use expense::{Column as ExpenseColumn, Entity as Expense, Model as ExpenseModel};
pub use investment::{Column as InvestmentColumn, Entity as Investment, Model as InvestmentModel};
pub use loan::{Column as LoanColumn, Entity as Loan, LoanStatus, LoanType, Model as LoanModel};
pub use member::{Column as MemberColumn, Entity as Member, Model as MemberModel};
pub use payment::{Column as PaymentColumn, Entity as Payment, Model as PaymentModel};
