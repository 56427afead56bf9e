use log::warn;

use crate::config;
use crate::env::Clock;

const MS_PER_HOUR: f64 = 3_600_000.0;

/// Spots left on the waitlist `now_ms`, given when it opened.
///
/// Claims accrue at a fixed hourly rate against the capacity; the result never
/// drops below `MIN_SPOTS_SEED` so the banner always has something to count down.
pub fn spots_remaining_at(opened_at_ms: i64, now_ms: i64) -> u32 {
    let elapsed_hours = now_ms.saturating_sub(opened_at_ms).max(0) as f64 / MS_PER_HOUR;
    let claimed = (elapsed_hours * config::SPOTS_CLAIMED_PER_HOUR).floor() as u32;

    config::WAITLIST_CAPACITY
        .saturating_sub(claimed)
        .max(config::MIN_SPOTS_SEED)
}

pub fn calculate_spots_remaining(clock: &impl Clock) -> u32 {
    match config::parse_local_datetime(config::WAITLIST_OPENED_AT) {
        Ok(opened_at) => spots_remaining_at(opened_at, clock.now_millis()),
        Err(err) => {
            warn!("Falling back to full waitlist capacity: {}", err);
            config::WAITLIST_CAPACITY
        }
    }
}
