//! Ledger entry business logic - recording entries, idempotent inserts, and re-categorization.
//!
//! User-entered entries go through [`record_entry`], which fills in a category from the rules
//! when the user did not choose one. Materialized entries go through [`insert_if_absent`],
//! which relies on the unique `(recurring_template_id, recurring_run_date)` index.

use crate::{
    core::{DayNumber, categorize::Categorizer, kinds::TransactionKind},
    entities::{LedgerEntry, ledger_entry},
    errors::{Error, Result},
};
use sea_orm::{
    QueryOrder, Set,
    prelude::*,
    sea_query::{Expr, OnConflict},
};
use tracing::{debug, info, instrument};

/// Occurrence of a recurring template that an entry stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RecurringRef {
    /// Template the entry was materialized from
    pub template_id: i64,
    /// Due date of the occurrence
    pub run_date: DayNumber,
}

/// A ledger entry that has not been written yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewLedgerEntry {
    /// Income or expense
    pub kind: TransactionKind,
    /// Amount in cents, positive
    pub amount_cents: i64,
    /// Category, `None` to leave uncategorized
    pub category_id: Option<i64>,
    /// Free-text description
    pub note: String,
    /// Day the movement happened on
    pub occurred_on: DayNumber,
    /// Back-reference for materialized entries
    pub recurring: Option<RecurringRef>,
}

impl NewLedgerEntry {
    fn into_active_model(self) -> ledger_entry::ActiveModel {
        ledger_entry::ActiveModel {
            kind: Set(self.kind.as_db().to_string()),
            amount_cents: Set(self.amount_cents),
            category_id: Set(self.category_id),
            note: Set(self.note),
            occurred_on: Set(self.occurred_on.value()),
            recurring_template_id: Set(self.recurring.map(|r| r.template_id)),
            recurring_run_date: Set(self.recurring.map(|r| r.run_date.value())),
            created_at: Set(chrono::Utc::now()),
            ..Default::default()
        }
    }
}

/// Inserts `entry` unless an entry with the same recurring back-reference already exists.
///
/// Returns `true` when a row was written. A conflict on the back-reference is the expected
/// outcome of a retried or overlapping run and is reported as `false`, not as an error.
pub async fn insert_if_absent<C>(db: &C, entry: NewLedgerEntry) -> Result<bool>
where
    C: ConnectionTrait,
{
    let on_conflict = OnConflict::columns([
        ledger_entry::Column::RecurringTemplateId,
        ledger_entry::Column::RecurringRunDate,
    ])
    .do_nothing()
    .to_owned();

    let rows = LedgerEntry::insert(entry.into_active_model())
        .on_conflict(on_conflict)
        .exec_without_returning(db)
        .await?;

    Ok(rows > 0)
}

/// Records a user-entered ledger entry.
///
/// When the entry has no category, one is resolved from its note using `categorizer`;
/// if no rule matches the entry stays uncategorized.
#[instrument(skip(db, categorizer))]
pub async fn record_entry(
    db: &DatabaseConnection,
    mut entry: NewLedgerEntry,
    categorizer: &Categorizer,
) -> Result<ledger_entry::Model> {
    if entry.amount_cents <= 0 {
        return Err(Error::InvalidAmount {
            amount: entry.amount_cents,
        });
    }

    if entry.category_id.is_none() {
        entry.category_id = categorizer.resolve(&entry.note);
        debug!("Resolved category {:?} from description", entry.category_id);
    }

    let model = entry.into_active_model().insert(db).await?;
    Ok(model)
}

/// Retrieves a specific entry by its id.
pub async fn get_entry_by_id(
    db: &DatabaseConnection,
    entry_id: i64,
) -> Result<Option<ledger_entry::Model>> {
    LedgerEntry::find_by_id(entry_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// All entries materialized from one template, oldest occurrence first.
pub async fn entries_for_template(
    db: &DatabaseConnection,
    template_id: i64,
) -> Result<Vec<ledger_entry::Model>> {
    LedgerEntry::find()
        .filter(ledger_entry::Column::RecurringTemplateId.eq(template_id))
        .order_by_asc(ledger_entry::Column::RecurringRunDate)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Assigns categories to every uncategorized entry that some rule matches.
///
/// Entries that already carry a category are left alone. Returns how many entries changed.
#[instrument(skip(db, categorizer))]
pub async fn recategorize_uncategorized(
    db: &DatabaseConnection,
    categorizer: &Categorizer,
) -> Result<usize> {
    if categorizer.is_empty() {
        return Ok(0);
    }

    let uncategorized = LedgerEntry::find()
        .filter(ledger_entry::Column::CategoryId.is_null())
        .all(db)
        .await?;

    let mut updated = 0;
    for entry in uncategorized {
        let Some(category_id) = categorizer.resolve(&entry.note) else {
            continue;
        };

        // Guard on IS NULL so a category chosen meanwhile by the user is kept.
        let result = LedgerEntry::update_many()
            .col_expr(ledger_entry::Column::CategoryId, Expr::value(category_id))
            .filter(ledger_entry::Column::Id.eq(entry.id))
            .filter(ledger_entry::Column::CategoryId.is_null())
            .exec(db)
            .await?;
        if result.rows_affected > 0 {
            updated += 1;
        }
    }

    info!("Re-categorized {} ledger entries", updated);
    Ok(updated)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;

    fn user_entry(note: &str, amount_cents: i64) -> NewLedgerEntry {
        NewLedgerEntry {
            kind: TransactionKind::Expense,
            amount_cents,
            category_id: None,
            note: note.to_string(),
            occurred_on: DayNumber::new(19_000),
            recurring: None,
        }
    }

    #[tokio::test]
    async fn test_record_entry_resolves_missing_category() -> Result<()> {
        let db = setup_test_db().await?;
        let rule = create_test_rule(&db, "coffee", "CONTAINS", 42, 1).await?;
        let categorizer = Categorizer::new(&[rule]);

        let entry = record_entry(&db, user_entry("Blue Bottle Coffee", 450), &categorizer).await?;
        assert_eq!(entry.category_id, Some(42));
        assert_eq!(entry.transaction_kind(), TransactionKind::Expense);
        assert_eq!(entry.recurring_template_id, None);

        Ok(())
    }

    #[tokio::test]
    async fn test_record_entry_keeps_explicit_category() -> Result<()> {
        let db = setup_test_db().await?;
        let rule = create_test_rule(&db, "coffee", "CONTAINS", 42, 1).await?;
        let categorizer = Categorizer::new(&[rule]);

        let mut new_entry = user_entry("Coffee with a client", 1200);
        new_entry.category_id = Some(7);
        let entry = record_entry(&db, new_entry, &categorizer).await?;
        assert_eq!(entry.category_id, Some(7));

        Ok(())
    }

    #[tokio::test]
    async fn test_record_entry_leaves_unmatched_uncategorized() -> Result<()> {
        let db = setup_test_db().await?;
        let entry =
            record_entry(&db, user_entry("unlisted vendor", 999), &Categorizer::default()).await?;
        assert_eq!(entry.category_id, None);

        let stored = get_entry_by_id(&db, entry.id).await?.unwrap();
        assert_eq!(stored.note, "unlisted vendor");
        assert_eq!(stored.amount_cents, 999);

        Ok(())
    }

    #[tokio::test]
    async fn test_record_entry_rejects_non_positive_amount() -> Result<()> {
        let db = setup_test_db().await?;
        let result = record_entry(&db, user_entry("refund", 0), &Categorizer::default()).await;
        assert!(matches!(result, Err(Error::InvalidAmount { amount: 0 })));

        let result = record_entry(&db, user_entry("refund", -5), &Categorizer::default()).await;
        assert!(matches!(result, Err(Error::InvalidAmount { amount: -5 })));

        Ok(())
    }

    #[tokio::test]
    async fn test_insert_if_absent_skips_duplicate_occurrence() -> Result<()> {
        let db = setup_test_db().await?;
        let template = create_test_template(&db, "Rent", DayNumber::new(100), 30).await?;
        let mut entry = user_entry("Rent", 150_000);
        entry.recurring = Some(RecurringRef {
            template_id: template.id,
            run_date: DayNumber::new(100),
        });

        assert!(insert_if_absent(&db, entry.clone()).await?);
        assert!(!insert_if_absent(&db, entry.clone()).await?);

        entry.recurring = Some(RecurringRef {
            template_id: template.id,
            run_date: DayNumber::new(130),
        });
        assert!(insert_if_absent(&db, entry).await?);

        assert_eq!(entries_for_template(&db, template.id).await?.len(), 2);
        Ok(())
    }

    #[tokio::test]
    async fn test_user_entries_without_back_reference_never_conflict() -> Result<()> {
        let db = setup_test_db().await?;
        assert!(insert_if_absent(&db, user_entry("Lunch", 1500)).await?);
        assert!(insert_if_absent(&db, user_entry("Lunch", 1500)).await?);

        let count = LedgerEntry::find().count(&db).await?;
        assert_eq!(count, 2);
        Ok(())
    }

    #[tokio::test]
    async fn test_recategorize_only_touches_uncategorized_entries() -> Result<()> {
        let db = setup_test_db().await?;
        let empty = Categorizer::default();
        let uncategorized = record_entry(&db, user_entry("Shell 4471", 4000), &empty).await?;
        let unmatched = record_entry(&db, user_entry("unlisted vendor", 100), &empty).await?;
        let mut chosen = user_entry("Shell station snacks", 500);
        chosen.category_id = Some(9);
        let chosen = record_entry(&db, chosen, &empty).await?;

        let rule = create_test_rule(&db, r"^shell", "REGEX", 55, 1).await?;
        let updated = recategorize_uncategorized(&db, &Categorizer::new(&[rule])).await?;
        assert_eq!(updated, 1);

        let reloaded = get_entry_by_id(&db, uncategorized.id).await?.unwrap();
        assert_eq!(reloaded.category_id, Some(55));
        let reloaded = get_entry_by_id(&db, unmatched.id).await?.unwrap();
        assert_eq!(reloaded.category_id, None);
        let reloaded = get_entry_by_id(&db, chosen.id).await?.unwrap();
        assert_eq!(reloaded.category_id, Some(9));

        Ok(())
    }
}
