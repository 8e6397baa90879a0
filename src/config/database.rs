//! Database configuration module.
//!
//! This module handles `SQLite` database connection and table creation using `SeaORM`.
//! It provides functions for establishing database connections and creating all necessary
//! tables based on the entity definitions. The module uses `SeaORM`'s
//! `Schema::create_table_from_entity` method to automatically generate SQL statements from
//! the entity models, ensuring that the database schema matches the Rust struct definitions
//! without requiring manual SQL. Unique indexes on identifier columns (register number,
//! loan number, loan registration number, NIC) come from the entity definitions and back
//! the conflict detection in the identifier generator.

use crate::entities::{CapitalAccount, Expense, Investment, Loan, Member, Payment};
use crate::errors::Result;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Schema};

/// Gets the database URL from environment variable or returns default `SQLite` path.
#[must_use]
pub fn get_database_url() -> String {
    std::env::var("DATABASE_URL")
        .unwrap_or_else(|_| "sqlite://data/microlend.sqlite?mode=rwc".to_string())
}

/// Establishes a connection to the `SQLite` database using the `DATABASE_URL`
/// environment variable.
///
/// Falls back to a default local `SQLite` file if no environment variable is set.
pub async fn create_connection() -> Result<DatabaseConnection> {
    Database::connect(get_database_url()).await.map_err(Into::into)
}

/// Creates all necessary database tables using `SeaORM`'s schema generation from
/// entity definitions.
///
/// This function uses the `DeriveEntityModel` macros to automatically generate proper
/// SQL statements for table creation. It creates tables for members, loans, payments,
/// the capital account, expenses and investments.
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    let member_table = schema.create_table_from_entity(Member);
    let loan_table = schema.create_table_from_entity(Loan);
    let payment_table = schema.create_table_from_entity(Payment);
    let capital_table = schema.create_table_from_entity(CapitalAccount);
    let expense_table = schema.create_table_from_entity(Expense);
    let investment_table = schema.create_table_from_entity(Investment);

    db.execute(builder.build(&member_table)).await?;
    db.execute(builder.build(&loan_table)).await?;
    db.execute(builder.build(&payment_table)).await?;
    db.execute(builder.build(&capital_table)).await?;
    db.execute(builder.build(&expense_table)).await?;
    db.execute(builder.build(&investment_table)).await?;

    Ok(())
}
