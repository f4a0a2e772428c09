//! Recurring template management - the user-facing side of scheduled transactions.
//!
//! These are the user actions around templates: creating, pausing, deleting. The
//! materialization engine never calls them; it only reads due templates and advances
//! `next_due_date` through the store contract. [`upcoming_occurrences`] projects the
//! schedule forward for display without touching the database.

use crate::{
    core::{DayNumber, kinds::TransactionKind},
    entities::{RecurringTemplate, recurring_template},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, prelude::*};
use tracing::{info, instrument};

/// Maximum occurrences projected per template by [`upcoming_occurrences`].
const MAX_PROJECTED_OCCURRENCES: usize = 366;

/// Input for [`create_template`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRecurringTemplate {
    /// Human-readable title
    pub title: String,
    /// Amount in cents, must be positive
    pub amount_cents: i64,
    /// Income or expense
    pub kind: TransactionKind,
    /// Category for materialized entries
    pub category_id: Option<i64>,
    /// Note copied onto materialized entries
    pub note: Option<String>,
    /// Days between occurrences; values below 1 are stored as 1
    pub frequency_days: i32,
    /// First occurrence; becomes the initial `next_due_date`
    pub start_date: DayNumber,
    /// Remind every day while overdue
    pub remind_daily_if_overdue: bool,
}

/// One projected occurrence of an active template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpcomingOccurrence {
    /// Template the occurrence belongs to
    pub template_id: i64,
    /// Template title
    pub title: String,
    /// Scheduled date
    pub date: DayNumber,
    /// Amount in cents
    pub amount_cents: i64,
    /// Income or expense
    pub kind: TransactionKind,
    /// Scheduled before `today` and not yet materialized
    pub overdue: bool,
}

/// Creates an active recurring template whose first occurrence is `start_date`.
#[instrument(skip(db))]
pub async fn create_template(
    db: &DatabaseConnection,
    new: NewRecurringTemplate,
) -> Result<recurring_template::Model> {
    if new.title.trim().is_empty() {
        return Err(Error::InvalidInput {
            message: "Template title cannot be empty".to_string(),
        });
    }

    if new.amount_cents <= 0 {
        return Err(Error::InvalidAmount {
            amount: new.amount_cents,
        });
    }

    let template = recurring_template::ActiveModel {
        title: Set(new.title.trim().to_string()),
        amount_cents: Set(new.amount_cents),
        kind: Set(new.kind.as_db().to_string()),
        category_id: Set(new.category_id),
        note: Set(new.note),
        frequency_days: Set(new.frequency_days.max(1)),
        start_date: Set(new.start_date.value()),
        next_due_date: Set(new.start_date.value()),
        last_reminder_date: Set(None),
        remind_daily_if_overdue: Set(new.remind_daily_if_overdue),
        is_active: Set(true),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    };

    let result = template.insert(db).await?;
    info!("Created recurring template {} ('{}')", result.id, result.title);
    Ok(result)
}

/// Finds a template by id, failing with [`Error::TemplateNotFound`] if it does not exist.
pub async fn get_template(
    db: &DatabaseConnection,
    template_id: i64,
) -> Result<recurring_template::Model> {
    RecurringTemplate::find_by_id(template_id)
        .one(db)
        .await?
        .ok_or(Error::TemplateNotFound { id: template_id })
}

/// All active templates, ordered by next due date.
pub async fn list_active_templates(
    db: &DatabaseConnection,
) -> Result<Vec<recurring_template::Model>> {
    RecurringTemplate::find()
        .filter(recurring_template::Column::IsActive.eq(true))
        .order_by_asc(recurring_template::Column::NextDueDate)
        .order_by_asc(recurring_template::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Pauses or resumes a template. Paused templates are never materialized.
pub async fn set_template_active(
    db: &DatabaseConnection,
    template_id: i64,
    active: bool,
) -> Result<recurring_template::Model> {
    let template = get_template(db, template_id).await?;
    let mut active_model: recurring_template::ActiveModel = template.into();
    active_model.is_active = Set(active);
    active_model.update(db).await.map_err(Into::into)
}

/// Deletes a template. Entries already materialized from it stay in the ledger.
pub async fn delete_template(db: &DatabaseConnection, template_id: i64) -> Result<()> {
    let result = RecurringTemplate::delete_by_id(template_id).exec(db).await?;
    if result.rows_affected == 0 {
        return Err(Error::TemplateNotFound { id: template_id });
    }
    Ok(())
}

/// Projects the occurrences of active templates from their `next_due_date` through
/// `today + horizon_days`, sorted by date.
///
/// Occurrences before `today` are flagged overdue; they are the ones the next engine run
/// will pick up.
#[must_use]
pub fn upcoming_occurrences(
    templates: &[recurring_template::Model],
    today: DayNumber,
    horizon_days: i64,
) -> Vec<UpcomingOccurrence> {
    let end = today
        .checked_add(horizon_days.max(0))
        .unwrap_or(DayNumber::new(i64::MAX));
    let mut occurrences = Vec::new();

    for template in templates.iter().filter(|t| t.is_active) {
        let step = template.effective_frequency();
        let mut date = template.next_due();
        let mut projected = 0;
        while date <= end && projected < MAX_PROJECTED_OCCURRENCES {
            occurrences.push(UpcomingOccurrence {
                template_id: template.id,
                title: template.title.clone(),
                date,
                amount_cents: template.amount_cents,
                kind: template.transaction_kind(),
                overdue: date < today,
            });
            let Some(next) = date.checked_add(step) else {
                break;
            };
            date = next;
            projected += 1;
        }
    }

    occurrences.sort_by(|a, b| a.date.cmp(&b.date).then(a.template_id.cmp(&b.template_id)));
    occurrences
}
