//! Entity module - Contains all `SeaORM` entity definitions for the database.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod categorization_rule;
pub mod ledger_entry;
pub mod recurring_template;

// Re-export specific types to avoid conflicts
pub use categorization_rule::{
    Column as CategorizationRuleColumn, Entity as CategorizationRule,
    Model as CategorizationRuleModel,
};
pub use ledger_entry::{
    Column as LedgerEntryColumn, Entity as LedgerEntry, Model as LedgerEntryModel,
};
pub use recurring_template::{
    Column as RecurringTemplateColumn, Entity as RecurringTemplate,
    Model as RecurringTemplateModel,
};
