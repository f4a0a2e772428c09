//! Schedule trigger
//!
//! Drives the materialization engine from two places: once at startup, and once a day at
//! a configured local hour. Both call the same [`run_due`], so overlapping triggers are
//! harmless. A failed run is logged and the next firing simply tries again.

use crate::{
    core::{DayNumber, RunReport, recurring::format_run_summary, run_due},
    errors::Result,
};
use chrono::{DateTime, Local, NaiveDateTime, NaiveTime, TimeDelta, TimeZone};
use sea_orm::DatabaseConnection;
use std::time::Duration;
use tracing::{error, info, warn};

/// Runs the engine once for today and logs the outcome.
pub async fn run_startup_check(db: &DatabaseConnection) -> Result<RunReport> {
    info!("Running startup check for due recurring templates");
    let report = run_due(db, DayNumber::today_local()).await?;
    log_report(&report);
    Ok(report)
}

/// Time to wait from `now` until the next `hour:00` wall-clock time in `now`'s zone.
///
/// If `now` is exactly on the hour, the run is due immediately. The target is resolved
/// to a real instant before subtracting, so days with a DST shift wait the true amount.
#[must_use]
pub fn delay_until_next_run<Tz: TimeZone>(now: &DateTime<Tz>, hour: u32) -> Duration {
    let Some(at) = NaiveTime::from_hms_opt(hour.min(23), 0, 0) else {
        return Duration::ZERO;
    };

    let zone = now.timezone();
    let mut date = now.date_naive();
    for _ in 0..2 {
        if let Some(target) = resolve_wall_time(&zone, date.and_time(at)) {
            if target >= *now {
                return target
                    .signed_duration_since(now)
                    .to_std()
                    .unwrap_or(Duration::ZERO);
            }
        }
        let Some(next) = date.succ_opt() else {
            break;
        };
        date = next;
    }

    Duration::ZERO
}

/// First instant showing `local` on the wall clock. A time skipped by a forward shift
/// resolves to one hour later.
fn resolve_wall_time<Tz: TimeZone>(zone: &Tz, local: NaiveDateTime) -> Option<DateTime<Tz>> {
    zone.from_local_datetime(&local)
        .earliest()
        .or_else(|| zone.from_local_datetime(&(local + TimeDelta::hours(1))).earliest())
}

/// Runs the engine every day at `hour` local time. Never returns.
pub async fn run_daily(db: &DatabaseConnection, hour: u32) {
    loop {
        let delay = delay_until_next_run(&Local::now(), hour);
        info!(
            "Next recurring run in {}h {}m",
            delay.as_secs() / 3600,
            (delay.as_secs() % 3600) / 60
        );
        tokio::time::sleep(delay).await;

        match run_due(db, DayNumber::today_local()).await {
            Ok(report) => log_report(&report),
            Err(e) => error!("Daily recurring run failed: {}", e),
        }

        // Skip past the firing minute so a fast run is not repeated
        tokio::time::sleep(Duration::from_secs(60)).await;
    }
}

fn log_report(report: &RunReport) {
    let summary = format_run_summary(report);
    if report.is_clean() {
        info!("{}", summary.trim_end());
    } else {
        warn!("{}", summary.trim_end());
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;
    use chrono::{FixedOffset, LocalResult, NaiveDate, Utc};

    fn at(day: u32, h: u32, m: u32) -> DateTime<Utc> {
        Utc.from_utc_datetime(&naive(2024, 3, day, h, m))
    }

    fn naive(year: i32, month: u32, day: u32, h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(year, month, day)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    /// UTC+0 until 2024-03-31 01:00 UTC, UTC+1 afterwards. Local 01:00-02:00 that
    /// night does not exist.
    #[derive(Debug, Clone, Copy)]
    struct SpringForward;

    impl SpringForward {
        fn winter() -> FixedOffset {
            FixedOffset::east_opt(0).unwrap()
        }

        fn summer() -> FixedOffset {
            FixedOffset::east_opt(3600).unwrap()
        }

        fn switch_utc() -> NaiveDateTime {
            naive(2024, 3, 31, 1, 0)
        }
    }

    impl TimeZone for SpringForward {
        type Offset = FixedOffset;

        fn from_offset(_: &FixedOffset) -> Self {
            Self
        }

        fn offset_from_local_date(&self, local: &NaiveDate) -> LocalResult<FixedOffset> {
            self.offset_from_local_datetime(&local.and_hms_opt(0, 0, 0).unwrap())
        }

        fn offset_from_local_datetime(&self, local: &NaiveDateTime) -> LocalResult<FixedOffset> {
            let switch = Self::switch_utc();
            if *local < switch {
                LocalResult::Single(Self::winter())
            } else if *local < switch + TimeDelta::hours(1) {
                LocalResult::None
            } else {
                LocalResult::Single(Self::summer())
            }
        }

        fn offset_from_utc_date(&self, utc: &NaiveDate) -> FixedOffset {
            self.offset_from_utc_datetime(&utc.and_hms_opt(0, 0, 0).unwrap())
        }

        fn offset_from_utc_datetime(&self, utc: &NaiveDateTime) -> FixedOffset {
            if *utc < Self::switch_utc() {
                Self::winter()
            } else {
                Self::summer()
            }
        }
    }

    #[test]
    fn test_delay_later_today() {
        assert_eq!(
            delay_until_next_run(&at(1, 4, 30), 6),
            Duration::from_secs(90 * 60)
        );
    }

    #[test]
    fn test_delay_rolls_to_tomorrow() {
        assert_eq!(
            delay_until_next_run(&at(1, 6, 1), 6),
            Duration::from_secs(23 * 3600 + 59 * 60)
        );
    }

    #[test]
    fn test_delay_on_the_hour_is_zero() {
        assert_eq!(delay_until_next_run(&at(1, 6, 0), 6), Duration::ZERO);
    }

    #[test]
    fn test_delay_across_month_end() {
        let now = Utc.from_utc_datetime(&naive(2024, 2, 29, 23, 0));
        assert_eq!(delay_until_next_run(&now, 0), Duration::from_secs(3600));
    }

    #[test]
    fn test_delay_over_a_clock_shift_uses_real_elapsed_time() {
        // Noon the day before the shift; 06:00 next morning is only 17 hours away
        let now = SpringForward.from_utc_datetime(&naive(2024, 3, 30, 12, 0));
        assert_eq!(delay_until_next_run(&now, 6), Duration::from_secs(17 * 3600));
    }

    #[test]
    fn test_delay_to_a_skipped_hour_runs_after_the_shift() {
        // 01:00 local does not exist on the shift night; the run fires at 02:00 local
        let now = SpringForward.from_utc_datetime(&naive(2024, 3, 31, 0, 0));
        assert_eq!(delay_until_next_run(&now, 1), Duration::from_secs(3600));
    }

    #[tokio::test]
    async fn test_startup_check_materializes_due_templates() -> Result<()> {
        let db = setup_test_db().await?;
        let today = DayNumber::today_local();
        create_test_template(&db, "Rent", today, 30).await?;
        create_test_template(&db, "Later", today + 5, 30).await?;

        let report = run_startup_check(&db).await?;
        assert_eq!(report.due, 1);
        assert_eq!(report.materialized, 1);

        let again = run_startup_check(&db).await?;
        assert_eq!(again.due, 0);

        Ok(())
    }
}
