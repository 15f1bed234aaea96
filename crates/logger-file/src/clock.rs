//! Source of the current period (calendar day)

use chrono::{Local, NaiveDate};
use parking_lot::Mutex;

/// Provides "today" for rotation decisions and sequence recovery
pub trait Clock: Send + Sync + 'static {
    /// The current calendar day, time of day discarded
    fn today(&self) -> NaiveDate;
}

/// Wall clock in the local time zone
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// A clock that only moves when told to
#[derive(Debug)]
pub struct ManualClock {
    today: Mutex<NaiveDate>,
}

impl ManualClock {
    /// Create a clock stopped at `today`
    pub fn new(today: NaiveDate) -> Self {
        Self {
            today: Mutex::new(today),
        }
    }

    /// Move the clock to `today`
    pub fn set(&self, today: NaiveDate) {
        *self.today.lock() = today;
    }

    /// Advance the clock by whole days
    pub fn advance_days(&self, days: u64) {
        let mut today = self.today.lock();
        if let Some(next) = today.checked_add_days(chrono::Days::new(days)) {
            *today = next;
        }
    }
}

impl Clock for ManualClock {
    fn today(&self) -> NaiveDate {
        *self.today.lock()
    }
}
