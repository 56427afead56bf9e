use std::fmt;

use gloo_timers::callback::Interval;
use log::{info, warn};
use yew::functional::hook;
use yew::prelude::*;

use crate::config;
use crate::env::{Clock, SystemClock};

const MS_PER_SECOND: u64 = 1_000;
const MS_PER_MINUTE: u64 = 60 * MS_PER_SECOND;
const MS_PER_HOUR: u64 = 60 * MS_PER_MINUTE;
const MS_PER_DAY: u64 = 24 * MS_PER_HOUR;

/// Remaining time split into display units.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CountdownValue {
    pub days: u64,
    pub hours: u64,
    pub minutes: u64,
    pub seconds: u64,
}

impl CountdownValue {
    /// `None` once the difference is zero or negative.
    pub fn from_millis(diff: i64) -> Option<Self> {
        if diff <= 0 {
            return None;
        }
        let diff = diff as u64;

        Some(Self {
            days: diff / MS_PER_DAY,
            hours: (diff / MS_PER_HOUR) % 24,
            minutes: (diff / MS_PER_MINUTE) % 60,
            seconds: (diff / MS_PER_SECOND) % 60,
        })
    }

    #[cfg(test)]
    pub fn as_millis(&self) -> u64 {
        self.days * MS_PER_DAY
            + self.hours * MS_PER_HOUR
            + self.minutes * MS_PER_MINUTE
            + self.seconds * MS_PER_SECOND
    }
}

pub fn pad2(n: u64) -> String {
    format!("{:02}", n)
}

impl fmt::Display for CountdownValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}d {}h {}m {}s",
            pad2(self.days),
            pad2(self.hours),
            pad2(self.minutes),
            pad2(self.seconds)
        )
    }
}

/// Countdown towards a fixed instant. The breakdown freezes at its last
/// positive value once the target has passed.
#[derive(Clone, Debug)]
pub struct Countdown {
    target_ms: i64,
    value: CountdownValue,
    finished: bool,
}

impl Countdown {
    pub fn new(target_ms: i64) -> Self {
        Self {
            target_ms,
            value: CountdownValue::default(),
            finished: false,
        }
    }

    pub fn value(&self) -> CountdownValue {
        self.value
    }

    pub fn is_finished(&self, now_ms: i64) -> bool {
        now_ms >= self.target_ms
    }

    /// Recomputes against `now_ms`, returning the new breakdown only when it was written.
    pub fn refresh(&mut self, now_ms: i64) -> Option<CountdownValue> {
        if self.is_finished(now_ms) {
            if !self.finished {
                self.finished = true;
                info!("Countdown reached its target, holding at {}", self.value);
            }
            return None;
        }

        let value = CountdownValue::from_millis(self.target_ms.saturating_sub(now_ms))?;
        self.value = value;
        Some(value)
    }

    pub fn tick(&mut self, clock: &impl Clock) -> Option<CountdownValue> {
        self.refresh(clock.now_millis())
    }
}

/// Parses an optional `drop_at` override, falling back to the configured drop.
pub fn resolve_drop_at(drop_at: Option<&str>) -> i64 {
    if let Some(value) = drop_at {
        match config::parse_local_datetime(value) {
            Ok(target) => return target,
            Err(err) => warn!("Ignoring drop_at override: {}", err),
        }
    }

    config::parse_local_datetime(config::NEXT_DROP_AT).unwrap_or_else(|err| {
        warn!("Configured drop date unusable, countdown stays at zero: {}", err);
        SystemClock.now_millis()
    })
}

#[hook]
pub fn use_countdown(target_ms: i64) -> CountdownValue {
    let time_left = use_state_eq(CountdownValue::default);

    {
        let time_left = time_left.clone();
        use_effect_with_deps(
            move |target_ms| {
                let clock = SystemClock;
                let mut countdown = Countdown::new(*target_ms);
                countdown.tick(&clock);
                time_left.set(countdown.value());

                let interval = Interval::new(config::COUNTDOWN_TICK_MS, move || {
                    if let Some(next) = countdown.tick(&clock) {
                        time_left.set(next);
                    }
                });

                move || drop(interval)
            },
            target_ms,
        );
    }

    *time_left
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exactly_two_days() {
        let target = config::parse_local_datetime("2026-02-02T00:00:00").unwrap();
        let now = config::parse_local_datetime("2026-01-31T00:00:00").unwrap();

        let mut countdown = Countdown::new(target);
        let value = countdown.refresh(now).unwrap();

        assert_eq!(
            value,
            CountdownValue { days: 2, hours: 0, minutes: 0, seconds: 0 }
        );
        assert_eq!(value.to_string(), "02d 00h 00m 00s");
    }

    #[test]
    fn breakdown_stays_within_a_second_of_the_difference() {
        let samples = [
            1_i64,
            999,
            1_000,
            59_999,
            60_000,
            3_599_999,
            3_600_000,
            86_399_999,
            86_400_000,
            93_784_567,
            1_234_567_890,
            400 * 86_400_000 + 1,
        ];

        for diff in samples {
            let value = CountdownValue::from_millis(diff).unwrap();
            let floor = value.as_millis();
            assert!(floor <= diff as u64, "diff {}", diff);
            assert!((diff as u64) < floor + 1_000, "diff {}", diff);
            assert!(value.hours < 24);
            assert!(value.minutes < 60);
            assert!(value.seconds < 60);
        }
    }

    #[test]
    fn non_positive_difference_writes_nothing() {
        assert_eq!(CountdownValue::from_millis(0), None);
        assert_eq!(CountdownValue::from_millis(-5_000), None);
    }

    #[test]
    fn freezes_after_target() {
        let mut countdown = Countdown::new(10_000);
        let last = countdown.refresh(7_500).unwrap();
        assert_eq!(last.seconds, 2);

        assert_eq!(countdown.refresh(10_000), None);
        assert_eq!(countdown.refresh(50_000), None);
        assert_eq!(countdown.value(), last);
        assert!(countdown.is_finished(10_000));
    }

    #[test]
    fn already_expired_stays_at_zero() {
        let mut countdown = Countdown::new(0);
        assert_eq!(countdown.refresh(1_000), None);
        assert_eq!(countdown.value(), CountdownValue::default());
    }

    #[test]
    fn pads_every_component() {
        let value = CountdownValue::from_millis(86_400_000 + 2 * 3_600_000 + 3 * 60_000 + 4_999).unwrap();
        assert_eq!(value.to_string(), "01d 02h 03m 04s");
        assert_eq!(pad2(123), "123");
    }

    #[test]
    fn bad_override_falls_back_to_configured_drop() {
        let configured = config::parse_local_datetime(config::NEXT_DROP_AT).unwrap();
        assert_eq!(resolve_drop_at(Some("soon")), configured);
        assert_eq!(resolve_drop_at(None), configured);
        assert_eq!(
            resolve_drop_at(Some("2027-01-01T00:00:00")),
            config::parse_local_datetime("2027-01-01T00:00:00").unwrap()
        );
    }
}
