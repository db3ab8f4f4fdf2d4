//! Database initialization.

use rusqlite::{Connection, Transaction, TransactionBehavior};

use crate::{
    Error, budget::create_budget_table, category::create_category_table,
    category::seed_default_categories, goal::create_goal_table, loan::create_loan_table,
    profile::create_profile_table, recurring::create_recurring_transaction_table,
    transaction::create_transaction_table, user::create_user_table,
};

/// Create the application tables and seed the shared default categories.
///
/// Safe to call on every start-up: tables are only created if they do not
/// exist and the defaults are only seeded once.
///
/// # Errors
/// This function will return an error if there is an SQL error.
pub fn initialize(connection: &Connection) -> Result<(), Error> {
    let sql_transaction =
        Transaction::new_unchecked(connection, TransactionBehavior::Exclusive)?;

    create_user_table(&sql_transaction)?;
    create_profile_table(&sql_transaction)?;
    create_category_table(&sql_transaction)?;
    create_transaction_table(&sql_transaction)?;
    create_budget_table(&sql_transaction)?;
    create_goal_table(&sql_transaction)?;
    create_loan_table(&sql_transaction)?;
    create_recurring_transaction_table(&sql_transaction)?;
    seed_default_categories(&sql_transaction)?;

    sql_transaction.commit()?;

    Ok(())
}
