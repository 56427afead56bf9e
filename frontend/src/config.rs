use chrono::{Local, NaiveDateTime, TimeZone};
use log::Level;
use thiserror::Error;

/// Next drop, in the visitor's local time.
pub const NEXT_DROP_AT: &str = "2026-02-02T00:00:00";

pub const COUNTDOWN_TICK_MS: u32 = 1_000;
pub const SPOTS_DECAY_MS: u32 = 60_000;

// Polling strategy only: give the first layout pass a moment before reading offsets.
pub const REFERENCE_CAPTURE_DELAY_MS: u32 = 100;

pub const MOBILE_BREAKPOINT_PX: f64 = 768.0;
pub const MOBILE_HEADER_HEIGHT_PX: f64 = 56.0;
pub const DESKTOP_HEADER_HEIGHT_PX: f64 = 72.0;

pub const WAITLIST_CAPACITY: u32 = 500;
pub const WAITLIST_OPENED_AT: &str = "2026-01-05T00:00:00";
pub const SPOTS_CLAIMED_PER_HOUR: f64 = 0.5;
pub const MIN_SPOTS_SEED: u32 = 7;

const LOCAL_DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

#[cfg(debug_assertions)]
pub fn log_level() -> Level {
    Level::Debug  // Chatty logs when running locally
}

#[cfg(not(debug_assertions))]
pub fn log_level() -> Level {
    Level::Info
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid local date-time `{value}`")]
    InvalidDateTime {
        value: String,
        #[source]
        source: chrono::ParseError,
    },
    #[error("`{0}` does not exist in the local time zone")]
    NonexistentLocalTime(String),
}

/// Parses `YYYY-MM-DDTHH:MM:SS` as a wall-clock time in the local zone and
/// returns epoch milliseconds.
pub fn parse_local_datetime(value: &str) -> Result<i64, ConfigError> {
    let naive = NaiveDateTime::parse_from_str(value, LOCAL_DATETIME_FORMAT).map_err(|source| {
        ConfigError::InvalidDateTime {
            value: value.to_string(),
            source,
        }
    })?;

    Local
        .from_local_datetime(&naive)
        .earliest()
        .map(|local| local.timestamp_millis())
        .ok_or_else(|| ConfigError::NonexistentLocalTime(value.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_the_configured_instants() {
        assert!(parse_local_datetime(NEXT_DROP_AT).is_ok());
        assert!(parse_local_datetime(WAITLIST_OPENED_AT).is_ok());
    }

    #[test]
    fn rejects_malformed_dates() {
        let err = parse_local_datetime("next tuesday").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidDateTime { .. }));
        assert!(err.to_string().contains("next tuesday"));
    }

    #[test]
    fn two_days_apart_in_wall_clock_time() {
        let start = parse_local_datetime("2026-01-31T00:00:00").unwrap();
        let end = parse_local_datetime("2026-02-02T00:00:00").unwrap();
        assert_eq!(end - start, 172_800_000);
    }
}
