//! Ledger entry entity - A single recorded cash movement.
//!
//! Entries are created by the user or by the materialization engine. Engine-made entries
//! carry the `(recurring_template_id, recurring_run_date)` back-reference, which is unique
//! across the table and is the only guard against posting an occurrence twice.
use crate::core::kinds::TransactionKind;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Ledger entry database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "ledger_entries")]
pub struct Model {
    /// Unique identifier for the entry
    #[sea_orm(primary_key)]
    pub id: i64,
    /// `"INCOME"` or `"EXPENSE"`
    pub kind: String,
    /// Amount in minor currency units (cents), always positive
    pub amount_cents: i64,
    /// Assigned category, `None` while uncategorized
    pub category_id: Option<i64>,
    /// Free-text description
    pub note: String,
    /// Day number the movement happened on
    pub occurred_on: i64,
    /// Template this entry was materialized from
    pub recurring_template_id: Option<i64>,
    /// Occurrence of the template this entry represents
    pub recurring_run_date: Option<i64>,
    /// When the entry was written
    pub created_at: DateTimeUtc,
}

impl Model {
    /// Typed view of the persisted kind text.
    #[must_use]
    pub fn transaction_kind(&self) -> TransactionKind {
        TransactionKind::from_db(&self.kind)
    }
}

/// Defines relationships between `LedgerEntry` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Materialized entries belong to their template
    #[sea_orm(
        belongs_to = "super::recurring_template::Entity",
        from = "Column::RecurringTemplateId",
        to = "super::recurring_template::Column::Id",
        on_delete = "SetNull"
    )]
    RecurringTemplate,
}

impl Related<super::recurring_template::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::RecurringTemplate.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
