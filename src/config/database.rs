//! Database configuration module.
//!
//! This module handles `SQLite` database connection and table creation using `SeaORM`.
//! Tables are generated from the entity definitions with `Schema::create_table_from_entity`,
//! so the schema always matches the Rust structs. The one thing entities cannot express is
//! the composite unique index on the recurring back-reference, which is created explicitly.

use crate::entities::{CategorizationRule, LedgerEntry, RecurringTemplate, ledger_entry};
use crate::errors::Result;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Schema, sea_query::Index};
use tracing::{debug, info};

/// Default database location when neither config.toml nor `DATABASE_URL` name one.
pub const DEFAULT_DATABASE_URL: &str = "sqlite://data/recurring_ledger.sqlite?mode=rwc";

/// Name of the unique index guarding against double materialization.
pub const RECURRING_RUN_INDEX: &str = "idx_ledger_entries_recurring_run";

/// Establishes a connection to the database at `database_url`.
pub async fn create_connection(database_url: &str) -> Result<DatabaseConnection> {
    debug!("Connecting to database at {}", database_url);
    Database::connect(database_url).await.map_err(Into::into)
}

/// Creates all tables and indexes if they do not exist yet.
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    let mut template_table = schema.create_table_from_entity(RecurringTemplate);
    let mut entry_table = schema.create_table_from_entity(LedgerEntry);
    let mut rule_table = schema.create_table_from_entity(CategorizationRule);

    db.execute(builder.build(template_table.if_not_exists())).await?;
    db.execute(builder.build(entry_table.if_not_exists())).await?;
    db.execute(builder.build(rule_table.if_not_exists())).await?;

    // NULLs are distinct in SQLite unique indexes, so user entries never collide here
    let run_index = Index::create()
        .name(RECURRING_RUN_INDEX)
        .table(LedgerEntry)
        .col(ledger_entry::Column::RecurringTemplateId)
        .col(ledger_entry::Column::RecurringRunDate)
        .unique()
        .if_not_exists()
        .to_owned();
    db.execute(builder.build(&run_index)).await?;

    info!("Database tables ensured");
    Ok(())
}
