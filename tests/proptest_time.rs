//! Property-based tests for run key rounding.
//!
//! Uses proptest to verify that:
//! - Rounded slots always land on a five-minute mark with zero seconds
//! - Rounding never moves the minute by more than two and a half minutes
//! - Keys are well-formed and survive a write/read through the timestamp file

use chrono::{NaiveDate, NaiveDateTime, Timelike};
use proptest::prelude::*;
use tempfile::TempDir;
use tracing::info;

use reportpub::model::RunKey;
use reportpub::util::time::{RUN_KEY_FORMAT, round_to_key, round_to_slot};
use reportpub::util::{read_key, write_key};

fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("info")
        .with_test_writer()
        .try_init();
}

fn local_time(
    year: i32,
    month: u32,
    day: u32,
    hour: u32,
    minute: u32,
    second: u32,
) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|d| d.and_hms_opt(hour, minute, second))
        .expect("valid generated time")
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 200,
        ..Default::default()
    })]

    /// Property: the slot minute is a multiple of five and seconds are dropped
    #[test]
    fn slot_is_on_five_minute_mark(
        year in 2020i32..2035i32,
        month in 1u32..=12u32,
        day in 1u32..=28u32,
        hour in 0u32..24u32,
        minute in 0u32..60u32,
        second in 0u32..60u32,
    ) {
        init_test_logging();
        let at = local_time(year, month, day, hour, minute, second);
        let slot = round_to_slot(at);
        info!("proptest_slot: at={at} slot={slot}");

        prop_assert_eq!(slot.minute() % 5, 0);
        prop_assert_eq!(slot.second(), 0);
        prop_assert_eq!(slot.nanosecond(), 0);
    }

    /// Property: rounding moves the whole-minute time by at most 2.5 minutes
    #[test]
    fn slot_is_nearest_mark(
        year in 2020i32..2035i32,
        month in 1u32..=12u32,
        day in 1u32..=28u32,
        hour in 0u32..24u32,
        minute in 0u32..60u32,
        second in 0u32..60u32,
    ) {
        init_test_logging();
        let at = local_time(year, month, day, hour, minute, second);
        let whole_minute = local_time(year, month, day, hour, minute, 0);
        let slot = round_to_slot(at);

        let distance = (slot - whole_minute).num_seconds().abs();
        prop_assert!(distance <= 150, "{at} rounded to {slot}");
        // Ties go up: minute 2 rounds down, minute 3 rounds up.
        if minute % 5 == 3 || minute % 5 == 4 {
            prop_assert!(slot > whole_minute);
        }
        if minute % 5 == 1 || minute % 5 == 2 {
            prop_assert!(slot < whole_minute);
        }
    }

    /// Property: keys use the fixed layout and parse back as the slot
    #[test]
    fn key_matches_slot_layout(
        year in 2020i32..2035i32,
        month in 1u32..=12u32,
        day in 1u32..=28u32,
        hour in 0u32..24u32,
        minute in 0u32..60u32,
    ) {
        let at = local_time(year, month, day, hour, minute, 0);
        let key = round_to_key(at);

        prop_assert_eq!(key.as_str().len(), 16);
        let parsed = NaiveDateTime::parse_from_str(key.as_str(), RUN_KEY_FORMAT);
        prop_assert_eq!(parsed.ok(), Some(round_to_slot(at)));
        prop_assert!(RunKey::new(key.as_str()).is_ok());
    }

    /// Property: write then read yields an identical key
    #[test]
    fn key_file_roundtrip(
        hour in 0u32..24u32,
        minute in 0u32..60u32,
        second in 0u32..60u32,
    ) {
        let temp = TempDir::new().expect("temp dir");
        let path = temp.path().join("timestamp.txt");
        let key = round_to_key(local_time(2026, 3, 14, hour, minute, second));

        write_key(&path, &key).expect("write key");
        let read = read_key(&path).expect("read key");

        prop_assert_eq!(read.as_str(), key.as_str());
    }
}
