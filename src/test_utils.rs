//! Shared test utilities.
//!
//! This module provides common helper functions for setting up test databases
//! and creating test entities with sensible defaults.

use crate::{
    core::{
        DayNumber,
        kinds::{MatchStrategy, TransactionKind},
        rules::{self, NewCategorizationRule},
        templates::{self, NewRecurringTemplate},
    },
    entities,
    errors::Result,
};
use sea_orm::DatabaseConnection;

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Creates a test template whose first occurrence is `next_due`.
///
/// # Defaults
/// * `amount_cents`: 2500
/// * `kind`: expense
/// * `category_id`: None
/// * `note`: None
pub async fn create_test_template(
    db: &DatabaseConnection,
    title: &str,
    next_due: DayNumber,
    frequency_days: i32,
) -> Result<entities::recurring_template::Model> {
    templates::create_template(
        db,
        NewRecurringTemplate {
            title: title.to_string(),
            amount_cents: 2500,
            kind: TransactionKind::Expense,
            category_id: None,
            note: None,
            frequency_days,
            start_date: next_due,
            remind_daily_if_overdue: false,
        },
    )
    .await
}

/// Creates an enabled test rule; `match_type` is parsed the same way persisted text is.
pub async fn create_test_rule(
    db: &DatabaseConnection,
    pattern: &str,
    match_type: &str,
    category_id: i64,
    priority: i32,
) -> Result<entities::categorization_rule::Model> {
    rules::create_rule(
        db,
        NewCategorizationRule {
            pattern: pattern.to_string(),
            strategy: MatchStrategy::from_db(match_type),
            category_id,
            priority,
        },
    )
    .await
}
