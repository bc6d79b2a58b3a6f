//! Daily API quota tracking.
//!
//! Usage accrues against a budget that resets at midnight in a fixed
//! reference zone of UTC-8 (the quota boundary used by the YouTube Data
//! API, modeled without DST). The roll-over check runs before every read or
//! increment, so stale state (including state restored from disk after a
//! restart) is zeroed the first time it is touched on a new day.

use std::sync::{Mutex, PoisonError};

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

/// Hours behind UTC of the quota reset boundary.
const RESET_OFFSET_HOURS: i64 = 8;

/// Snapshot of quota usage: units consumed today and the reference-zone
/// date they belong to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuotaState {
    pub units_used: u64,
    pub reset_date: NaiveDate,
}

/// Process-wide quota store.
///
/// The mutex serializes the reset-check-then-increment sequence so
/// overlapping requests from concurrent callers cannot interleave a stale
/// read between a roll-over and an increment.
pub struct QuotaTracker {
    limit: u64,
    state: Mutex<QuotaState>,
}

impl QuotaTracker {
    /// A fresh tracker with zero usage dated today (reference zone).
    #[must_use]
    pub fn new(limit: u64) -> Self {
        Self {
            limit,
            state: Mutex::new(QuotaState {
                units_used: 0,
                reset_date: reference_date(Utc::now()),
            }),
        }
    }

    /// Restore a tracker from persisted state. The roll-over check applies
    /// on the next access, so a stale `reset_date` zeroes the counter
    /// immediately rather than leaking yesterday's usage into today.
    #[must_use]
    pub fn from_state(limit: u64, state: QuotaState) -> Self {
        Self {
            limit,
            state: Mutex::new(state),
        }
    }

    #[must_use]
    pub fn limit(&self) -> u64 {
        self.limit
    }

    /// Current state after applying the roll-over check.
    #[must_use]
    pub fn state(&self) -> QuotaState {
        self.state_at(Utc::now())
    }

    #[must_use]
    pub fn state_at(&self, now: DateTime<Utc>) -> QuotaState {
        self.with_rolled_state(now, |state| *state)
    }

    /// Add `units` to today's usage and return the updated state.
    ///
    /// Callers only record cost actually charged by the upstream; a cached
    /// or no-op result reports 0 units at the call site and never reaches
    /// this method.
    pub fn record_usage(&self, units: u64) -> QuotaState {
        self.record_usage_at(units, Utc::now())
    }

    pub fn record_usage_at(&self, units: u64, now: DateTime<Utc>) -> QuotaState {
        self.with_rolled_state(now, |state| {
            state.units_used = state.units_used.saturating_add(units);
            *state
        })
    }

    /// Units left in today's budget; zero when over budget.
    #[must_use]
    pub fn remaining(&self) -> u64 {
        self.remaining_at(Utc::now())
    }

    #[must_use]
    pub fn remaining_at(&self, now: DateTime<Utc>) -> u64 {
        self.limit.saturating_sub(self.state_at(now).units_used)
    }

    /// Locks the state, applies the daily roll-over if the reference-zone
    /// date has advanced, then runs `f`. Roll-over always precedes any
    /// read or increment.
    fn with_rolled_state<T>(&self, now: DateTime<Utc>, f: impl FnOnce(&mut QuotaState) -> T) -> T {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        let today = reference_date(now);
        if today > state.reset_date {
            state.units_used = 0;
            state.reset_date = today;
        }
        f(&mut state)
    }
}

/// Today's calendar date in the reference zone.
fn reference_date(now: DateTime<Utc>) -> NaiveDate {
    (now - Duration::hours(RESET_OFFSET_HOURS)).date_naive()
}

/// Time until the next quota reset boundary. Always positive: once today's
/// boundary has passed, the target is tomorrow's.
#[must_use]
pub fn time_to_reset(now: DateTime<Utc>) -> Duration {
    let next_midnight_ref = (reference_date(now) + Duration::days(1)).and_time(NaiveTime::MIN);
    let boundary_utc = next_midnight_ref.and_utc() + Duration::hours(RESET_OFFSET_HOURS);
    boundary_utc - now
}
