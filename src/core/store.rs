//! Ledger store contract used by the materialization engine.
//!
//! The engine only needs two things from storage: the list of due templates, and one atomic
//! "write this occurrence and move the schedule" step per template. The `SeaORM` connection
//! implements both on top of `SQLite`, where a unique index on the back-reference columns makes
//! the insert idempotent and a guarded UPDATE makes the schedule advance optimistic.

use crate::{
    core::{
        DayNumber,
        ledger::{self, NewLedgerEntry},
    },
    entities::{RecurringTemplate, recurring_template},
    errors::Result,
};
use async_trait::async_trait;
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, TransactionTrait,
    sea_query::Expr,
};
use tracing::debug;

/// Moves a template's `next_due_date` from the value the engine read to a later one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduleAdvance {
    /// Template being advanced
    pub template_id: i64,
    /// `next_due_date` as read at the start of the run
    pub from: DayNumber,
    /// New `next_due_date`, strictly after the run's `today`
    pub to: DayNumber,
}

/// What one atomic occurrence commit actually changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CommitOutcome {
    /// A new ledger entry was written (false: the occurrence already existed)
    pub inserted: bool,
    /// The schedule moved (false: another run already moved it)
    pub advanced: bool,
}

/// Storage operations the materialization engine relies on.
#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// Active templates whose `next_due_date` is on or before `today`.
    async fn due_templates(&self, today: DayNumber) -> Result<Vec<recurring_template::Model>>;

    /// Inserts `entry` if its occurrence is absent and applies `advance`, as one unit.
    async fn commit_occurrence(
        &self,
        entry: NewLedgerEntry,
        advance: ScheduleAdvance,
    ) -> Result<CommitOutcome>;
}

#[async_trait]
impl LedgerStore for DatabaseConnection {
    async fn due_templates(&self, today: DayNumber) -> Result<Vec<recurring_template::Model>> {
        RecurringTemplate::find()
            .filter(recurring_template::Column::IsActive.eq(true))
            .filter(recurring_template::Column::NextDueDate.lte(today.value()))
            .order_by_asc(recurring_template::Column::Id)
            .all(self)
            .await
            .map_err(Into::into)
    }

    async fn commit_occurrence(
        &self,
        entry: NewLedgerEntry,
        advance: ScheduleAdvance,
    ) -> Result<CommitOutcome> {
        // Insert and advance succeed or fail together
        let txn = self.begin().await?;

        let inserted = ledger::insert_if_absent(&txn, entry).await?;

        // Only move the schedule if nobody else has moved it since we read it
        let result = RecurringTemplate::update_many()
            .col_expr(
                recurring_template::Column::NextDueDate,
                Expr::value(advance.to.value()),
            )
            .filter(recurring_template::Column::Id.eq(advance.template_id))
            .filter(recurring_template::Column::NextDueDate.eq(advance.from.value()))
            .exec(&txn)
            .await?;
        let advanced = result.rows_affected > 0;

        txn.commit().await?;

        if !advanced {
            debug!(
                "Template {} was already advanced past {} by another run",
                advance.template_id, advance.from
            );
        }

        Ok(CommitOutcome { inserted, advanced })
    }
}
