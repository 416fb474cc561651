use chrono::{Datelike, NaiveDateTime};
use log::{error, info, warn};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::{
    models::Renewal,
    store::{BudgetStore, StoreError},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RolloverState {
    Idle,
    Running,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RolloverReport {
    pub period: String,
    pub renewed: usize,
    pub already_current: usize,
    pub failed: usize,
}

/// Monthly budget renewal. Limits are carried forward unchanged; each row is
/// stamped with the period so a second run in the same month is a no-op.
pub struct RolloverJob {
    budgets: Arc<dyn BudgetStore>,
    state: Mutex<RolloverState>,
}

/// Puts the job back to `Idle` however the run ends.
struct RunGuard<'a> {
    state: &'a Mutex<RolloverState>,
}

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        *lock(self.state) = RolloverState::Idle;
    }
}

fn lock(state: &Mutex<RolloverState>) -> MutexGuard<'_, RolloverState> {
    state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

pub fn period_of(now: NaiveDateTime) -> String {
    format!("{:04}-{:02}", now.year(), now.month())
}

impl RolloverJob {
    pub fn new(budgets: Arc<dyn BudgetStore>) -> Self {
        Self {
            budgets,
            state: Mutex::new(RolloverState::Idle),
        }
    }

    pub fn state(&self) -> RolloverState {
        *lock(&self.state)
    }

    fn begin(&self) -> Option<RunGuard<'_>> {
        let mut state = lock(&self.state);
        if *state == RolloverState::Running {
            return None;
        }
        *state = RolloverState::Running;
        Some(RunGuard { state: &self.state })
    }

    /// Renews every budget for the month containing `now`. Returns `None` when
    /// a run is already in progress.
    pub async fn run(&self, now: NaiveDateTime) -> Option<Result<RolloverReport, StoreError>> {
        let Some(_guard) = self.begin() else {
            warn!("Budget rollover already running, skipping this trigger");
            return None;
        };

        let period = period_of(now);
        info!("Starting budget rollover for {}", period);

        let budgets = match self.budgets.all_budgets().await {
            Ok(budgets) => budgets,
            Err(e) => {
                error!("Budget rollover could not list budgets: {}", e);
                return Some(Err(e));
            }
        };

        let mut report = RolloverReport {
            period: period.clone(),
            ..RolloverReport::default()
        };

        for budget in &budgets {
            match self.budgets.renew_budget(budget.id, &period).await {
                Ok(Renewal::Renewed) => report.renewed += 1,
                Ok(Renewal::AlreadyCurrent) => report.already_current += 1,
                Err(e) => {
                    error!("Error renewing budget {} ({}): {}", budget.id, budget.category, e);
                    report.failed += 1;
                }
            }
        }

        info!(
            "Budget rollover for {} finished: {} renewed, {} already current, {} failed",
            report.period, report.renewed, report.already_current, report.failed
        );
        Some(Ok(report))
    }
}
