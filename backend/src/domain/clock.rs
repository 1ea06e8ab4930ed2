use chrono::{Local, NaiveDate};
#[cfg(test)]
use std::sync::RwLock;

/// Source of "today" for the daily challenge rules
pub trait Clock: Send + Sync {
    fn today(&self) -> NaiveDate;
}

/// Local calendar date of the device
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// A clock pinned to a settable date
#[cfg(test)]
#[derive(Debug)]
pub struct FixedClock {
    date: RwLock<NaiveDate>,
}

#[cfg(test)]
impl FixedClock {
    pub fn new(date: NaiveDate) -> Self {
        Self { date: RwLock::new(date) }
    }

    pub fn set(&self, date: NaiveDate) {
        let mut guard = self.date.write().unwrap_or_else(|poisoned| poisoned.into_inner());
        *guard = date;
    }
}

#[cfg(test)]
impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        *self.date.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_clock_can_advance() {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let clock = FixedClock::new(start);
        assert_eq!(clock.today(), start);

        let next = start.succ_opt().unwrap();
        clock.set(next);
        assert_eq!(clock.today(), next);
    }
}
