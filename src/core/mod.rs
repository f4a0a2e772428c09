//! Core business logic, free of any trigger or presentation concerns.

/// Categorization engine - description text plus rules to an optional category
pub mod categorize;
/// Day-granularity dates used by all schedule arithmetic
pub mod day;
/// Closed enums for text-typed columns, with graceful fallback
pub mod kinds;
/// Ledger entries - user entry flow, idempotent insert, bulk re-categorization
pub mod ledger;
/// Recurring materialization engine
pub mod recurring;
/// Categorization rule store
pub mod rules;
/// Ledger store contract used by the materialization engine
pub mod store;
/// Recurring template management and schedule projection
pub mod templates;

pub use categorize::{Categorizer, resolve_category};
pub use day::DayNumber;
pub use recurring::{RunReport, run_due};
