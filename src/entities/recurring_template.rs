//! Recurring template entity - A user-defined repeating transaction (rent, subscriptions, ...).
//!
//! Dates are day numbers (days since 1970-01-01). `next_due_date` is the earliest occurrence
//! that has not been materialized yet; only the materialization engine advances it.

use crate::core::kinds::TransactionKind;
use crate::core::DayNumber;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Recurring template database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "recurring_templates")]
pub struct Model {
    /// Unique identifier, stable for the life of the template
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Human-readable title (e.g., "Rent", "Streaming")
    pub title: String,
    /// Amount in minor currency units (cents), always positive
    pub amount_cents: i64,
    /// `"INCOME"` or `"EXPENSE"`; anything else reads as expense
    pub kind: String,
    /// Category assigned to materialized entries
    pub category_id: Option<i64>,
    /// Optional note copied onto materialized entries
    pub note: Option<String>,
    /// Days between occurrences; values below 1 behave as 1
    pub frequency_days: i32,
    /// First scheduled occurrence
    pub start_date: i64,
    /// Next occurrence that has not been materialized
    pub next_due_date: i64,
    /// Last day a reminder was issued for this template
    pub last_reminder_date: Option<i64>,
    /// Whether the user wants a reminder every day while overdue
    pub remind_daily_if_overdue: bool,
    /// Inactive templates are never materialized
    pub is_active: bool,
    /// When the template was created
    pub created_at: DateTimeUtc,
}

impl Model {
    /// Typed view of the persisted kind text.
    #[must_use]
    pub fn transaction_kind(&self) -> TransactionKind {
        TransactionKind::from_db(&self.kind)
    }

    /// The next unmaterialized occurrence as a day number.
    #[must_use]
    pub const fn next_due(&self) -> DayNumber {
        DayNumber::new(self.next_due_date)
    }

    /// Frequency with non-positive values coerced upward to one day.
    #[must_use]
    pub fn effective_frequency(&self) -> i64 {
        i64::from(self.frequency_days.max(1))
    }
}

/// Defines relationships between `RecurringTemplate` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One template materializes into many ledger entries
    #[sea_orm(has_many = "super::ledger_entry::Entity")]
    LedgerEntries,
}

impl Related<super::ledger_entry::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::LedgerEntries.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
