pub mod cron;
pub mod rollover;

use chrono::{Duration, Local, NaiveDateTime, TimeZone};
use log::{error, info};
use std::sync::Arc;
use tokio::task::JoinHandle;

pub use cron::{CronError, CronSchedule};
pub use rollover::{period_of, RolloverJob, RolloverReport, RolloverState};

/// Drives a `RolloverJob` from a cron schedule on local time.
pub struct RolloverScheduler {
    schedule: CronSchedule,
    job: Arc<RolloverJob>,
}

impl RolloverScheduler {
    pub fn new(schedule: CronSchedule, job: Arc<RolloverJob>) -> Self {
        Self { schedule, job }
    }

    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(async move { self.run_forever().await })
    }

    /// The next fire time after `now`, never at or before the last one fired
    /// so a clock stepped backwards cannot repeat a run.
    fn next_fire(&self, now: NaiveDateTime, last: Option<NaiveDateTime>) -> Option<NaiveDateTime> {
        let from = last.map_or(now, |last| now.max(last));
        self.schedule.next_after(from)
    }

    async fn run_forever(self) {
        let mut last = None;
        loop {
            let now = Local::now().naive_local();
            let Some(next) = self.next_fire(now, last) else {
                error!("Rollover schedule '{}' never fires again, stopping", self.schedule);
                return;
            };

            info!("Next budget rollover at {}", next);
            tokio::time::sleep(until(next)).await;
            last = Some(next);

            // The run is stamped with the scheduled time, not the wall clock on
            // wake-up. A tick that lands while a run is in flight is skipped by
            // the job itself.
            let job = Arc::clone(&self.job);
            tokio::spawn(async move {
                job.run(next).await;
            });
        }
    }
}

fn until(next: NaiveDateTime) -> std::time::Duration {
    // A wall-clock time skipped by a DST jump fires an hour later.
    let target = Local
        .from_local_datetime(&next)
        .earliest()
        .or_else(|| Local.from_local_datetime(&(next + Duration::hours(1))).earliest());

    target
        .and_then(|t| (t - Local::now()).to_std().ok())
        .unwrap_or(std::time::Duration::ZERO)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{BudgetStore, MemoryStore};
    use rust_decimal::Decimal;
    use uuid::Uuid;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        chrono::NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
    }

    fn monthly(store: Arc<MemoryStore>) -> RolloverScheduler {
        let schedule = CronSchedule::parse("0 0 1 * *").unwrap();
        RolloverScheduler::new(schedule, Arc::new(RolloverJob::new(store)))
    }

    #[test]
    fn next_fire_follows_the_schedule() {
        let scheduler = monthly(Arc::new(MemoryStore::new()));
        assert_eq!(
            scheduler.next_fire(at(2025, 3, 14, 10, 0), None),
            Some(at(2025, 4, 1, 0, 0))
        );
    }

    #[test]
    fn clock_stepping_back_does_not_repeat_a_fire() {
        let scheduler = monthly(Arc::new(MemoryStore::new()));
        let fired = at(2025, 4, 1, 0, 0);

        // Woken up with the wall clock still in March.
        let next = scheduler.next_fire(at(2025, 3, 31, 23, 59), Some(fired));
        assert_eq!(next, Some(at(2025, 5, 1, 0, 0)));
    }

    #[test]
    fn until_a_past_time_is_zero() {
        let past = Local::now().naive_local() - Duration::hours(2);
        assert_eq!(until(past), std::time::Duration::ZERO);
    }

    #[test]
    fn until_a_future_time_is_bounded() {
        let soon = Local::now().naive_local() + Duration::minutes(30);
        let wait = until(soon);
        assert!(wait > std::time::Duration::from_secs(29 * 60));
        assert!(wait <= std::time::Duration::from_secs(30 * 60));
    }

    #[tokio::test(start_paused = true)]
    async fn spawned_scheduler_renews_budgets() {
        let store = Arc::new(MemoryStore::new());
        let budget = store
            .create_budget(Uuid::new_v4(), "Food", Decimal::new(300, 0))
            .await
            .unwrap();

        let schedule = CronSchedule::parse("* * * * *").unwrap();
        let job = Arc::new(RolloverJob::new(store.clone()));
        let handle = RolloverScheduler::new(schedule, job).spawn();

        let mut renewed = None;
        for _ in 0..50 {
            tokio::time::sleep(std::time::Duration::from_secs(30)).await;
            let budgets = store.all_budgets().await.unwrap();
            renewed = budgets[0].renewed_period.clone();
            if renewed.is_some() {
                break;
            }
        }
        handle.abort();

        assert!(renewed.is_some());
        let after = store.all_budgets().await.unwrap();
        assert_eq!(after.len(), 1);
        assert_eq!(after[0].limit_amount, budget.limit_amount);
    }
}
