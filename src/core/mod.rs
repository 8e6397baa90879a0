//! Core business logic - framework-agnostic loan, ledger and reporting
//! operations. Everything here is callable from any frontend; the modules
//! only depend on the entities, the error types and the configuration.

/// Capital account: the singleton lendable-funds balance
pub mod capital;
/// Loan lifecycle: creation, disbursement, closing and lookups
pub mod loan;
/// Member registration and lookups
pub mod member;
/// Payment ledger: recording collections against loans
pub mod payment;
/// Profit and delinquency reporting (read-only)
pub mod report;
/// Installment schedule computation
pub mod schedule;
/// Identifier generation: register numbers, loan numbers
pub mod sequence;
