//! Daily challenge rotation and the once-per-day answer rule.
//!
//! Days are compared as calendar-day stamps ("Mon Jan 01 2024"), never as
//! timestamps, so the answered flag flips back exactly at local midnight.

use chrono::{Datelike, NaiveDate};
use shared::{DailyChallenge, UserProfile};
use tracing::debug;

pub const DAY_STAMP_FORMAT: &str = "%a %b %d %Y";

/// Day-granularity stamp stored in `lastDailyDate`
pub fn day_stamp(date: NaiveDate) -> String {
    date.format(DAY_STAMP_FORMAT).to_string()
}

/// Pool index for a given day of the month
pub fn rotation_index(pool_len: usize, day_of_month: u32) -> Option<usize> {
    if pool_len == 0 {
        return None;
    }
    Some(day_of_month as usize % pool_len)
}

/// Pick today's challenge: `pool[day_of_month % pool.len()]`.
///
/// The same day of any month yields the same entry.
pub fn select_daily(pool: &[DailyChallenge], today: NaiveDate) -> Option<&DailyChallenge> {
    rotation_index(pool.len(), today.day()).map(|index| &pool[index])
}

pub fn answered_on(profile: &UserProfile, today: NaiveDate) -> bool {
    profile.last_daily_date.as_deref() == Some(day_stamp(today).as_str())
}

/// Re-derive `has_answered_daily_today` from `last_daily_date`.
///
/// Runs on every load before any daily logic.
pub fn refresh_daily_flag(mut profile: UserProfile, today: NaiveDate) -> UserProfile {
    let answered = answered_on(&profile, today);
    if profile.has_answered_daily_today != answered {
        debug!(
            "Daily flag for '{}' reset to {} (last answered: {:?})",
            profile.name, answered, profile.last_daily_date
        );
    }
    profile.has_answered_daily_today = answered;
    profile
}
