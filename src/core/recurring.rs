//! Recurring materialization engine
//!
//! Turns due recurring templates into ledger entries. For every active template whose
//! `next_due_date` is on or before `today`, the engine posts one entry for that occurrence
//! and moves `next_due_date` past `today` in a single step, so an engine that sat idle for
//! weeks catches up in one pass.
//!
//! The engine may be invoked redundantly and concurrently (startup check, daily timer,
//! retried job). Correctness comes from the store: the occurrence insert is idempotent on
//! `(template id, run date)` and the schedule advance is guarded by the value that was read.
//! A template that fails is recorded in the [`RunReport`] and the run carries on.

use crate::{
    core::{
        DayNumber,
        ledger::{NewLedgerEntry, RecurringRef},
        store::{LedgerStore, ScheduleAdvance},
    },
    entities::recurring_template,
    errors::Result,
};
use tracing::{debug, info, instrument, warn};

/// A template that could not be processed during a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateFailure {
    /// Template that failed
    pub template_id: i64,
    /// Error message from the store
    pub message: String,
}

/// Outcome of one [`run_due`] invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    /// Day the run was performed for
    pub today: DayNumber,
    /// Number of due templates found
    pub due: usize,
    /// New ledger entries written
    pub materialized: usize,
    /// Occurrences skipped because their entry already existed
    pub already_present: usize,
    /// Templates whose `next_due_date` this run moved
    pub advanced: usize,
    /// Templates that failed; the others were still processed
    pub failures: Vec<TemplateFailure>,
}

impl RunReport {
    const fn empty(today: DayNumber) -> Self {
        Self {
            today,
            due: 0,
            materialized: 0,
            already_present: 0,
            advanced: 0,
            failures: Vec::new(),
        }
    }

    /// True when every due template was processed without error.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Smallest `next_due + k * frequency` (k >= 1) strictly after `today`.
///
/// Frequencies below one day count as one day. A `next_due` already after `today` is
/// returned unchanged. `None` when the result is not representable, which only happens
/// for a corrupt stored date.
#[must_use]
pub fn next_due_after(
    next_due: DayNumber,
    frequency_days: i32,
    today: DayNumber,
) -> Option<DayNumber> {
    if next_due > today {
        return Some(next_due);
    }
    let step = i64::from(frequency_days.max(1));
    let periods = today.checked_days_since(next_due)? / step + 1;
    next_due.checked_add(periods.checked_mul(step)?)
}

/// Ledger entry for the template's earliest unfulfilled occurrence.
fn occurrence_entry(template: &recurring_template::Model) -> NewLedgerEntry {
    let run_date = template.next_due();
    NewLedgerEntry {
        kind: template.transaction_kind(),
        amount_cents: template.amount_cents,
        category_id: template.category_id,
        note: template
            .note
            .clone()
            .filter(|note| !note.trim().is_empty())
            .unwrap_or_else(|| template.title.clone()),
        occurred_on: run_date,
        recurring: Some(RecurringRef {
            template_id: template.id,
            run_date,
        }),
    }
}

/// Materializes every due recurring template for `today`.
///
/// Only a failure to list the due templates fails the whole call; the caller may retry the
/// run later. Per-template failures are collected in [`RunReport::failures`].
#[instrument(skip(store))]
pub async fn run_due<S>(store: &S, today: DayNumber) -> Result<RunReport>
where
    S: LedgerStore + ?Sized,
{
    let due = store.due_templates(today).await?;
    let mut report = RunReport::empty(today);
    report.due = due.len();

    if due.is_empty() {
        debug!("No recurring templates due on {}", today);
        return Ok(report);
    }

    for template in &due {
        let Some(to) = next_due_after(template.next_due(), template.frequency_days, today)
        else {
            warn!(
                "Template {} has an unusable next_due_date {}",
                template.id, template.next_due_date
            );
            report.failures.push(TemplateFailure {
                template_id: template.id,
                message: format!(
                    "next_due_date {} cannot be advanced past {}",
                    template.next_due_date, today
                ),
            });
            continue;
        };

        let entry = occurrence_entry(template);
        let advance = ScheduleAdvance {
            template_id: template.id,
            from: template.next_due(),
            to,
        };

        match store.commit_occurrence(entry, advance).await {
            Ok(outcome) => {
                if outcome.inserted {
                    report.materialized += 1;
                    debug!(
                        "Materialized '{}' (template {}) for {}",
                        template.title, template.id, advance.from
                    );
                } else {
                    report.already_present += 1;
                }
                if outcome.advanced {
                    report.advanced += 1;
                }
            }
            Err(e) => {
                warn!("Failed to materialize template {}: {}", template.id, e);
                report.failures.push(TemplateFailure {
                    template_id: template.id,
                    message: e.to_string(),
                });
            }
        }
    }

    info!(
        "Recurring run for {}: {} due, {} materialized, {} already present, {} failed",
        today,
        report.due,
        report.materialized,
        report.already_present,
        report.failures.len()
    );

    Ok(report)
}

/// Formats a run report into a human-readable summary for logs.
#[must_use]
pub fn format_run_summary(report: &RunReport) -> String {
    use std::fmt::Write;

    let mut summary = format!(
        "Recurring run - {} - {} templates due\n",
        report.today, report.due
    );

    // write! is infallible when writing to String
    let _ = writeln!(
        summary,
        "  Materialized: {} | Already present: {} | Advanced: {}",
        report.materialized, report.already_present, report.advanced
    );

    for failure in &report.failures {
        let _ = writeln!(
            summary,
            "  Template {} failed: {}",
            failure.template_id, failure.message
        );
    }

    summary
}
