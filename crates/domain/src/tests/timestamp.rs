// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use time::macros::datetime;

use crate::{format_duration, format_timestamp, now_timestamp, parse_timestamp, seconds_between};

#[test]
fn test_format_timestamp_uses_stored_layout() {
    let formatted: String = format_timestamp(datetime!(2026-03-04 05:06:07 UTC)).unwrap();
    assert_eq!(formatted, "2026-03-04 05:06:07");
}

#[test]
fn test_format_timestamp_converts_to_utc() {
    let formatted: String = format_timestamp(datetime!(2026-03-04 10:00:00 +02:00)).unwrap();
    assert_eq!(formatted, "2026-03-04 08:00:00");
}

#[test]
fn test_parse_timestamp_accepts_stored_layout() {
    let parsed = parse_timestamp("2026-03-04 05:06:07").unwrap();
    assert_eq!(parsed, datetime!(2026-03-04 05:06:07 UTC));
}

#[test]
fn test_parse_timestamp_rejects_garbage() {
    assert!(parse_timestamp("yesterday").is_err());
    assert!(parse_timestamp("2026-03-04T05:06:07Z").is_err());
}

#[test]
fn test_now_timestamp_round_trips() {
    let now: String = now_timestamp().unwrap();
    assert!(parse_timestamp(&now).is_ok());
}

#[test]
fn test_seconds_between() {
    assert_eq!(
        seconds_between("2026-01-01 10:00:00", "2026-01-01 11:30:15").unwrap(),
        5415
    );
    assert_eq!(
        seconds_between("2026-01-01 11:00:00", "2026-01-01 10:00:00").unwrap(),
        -3600
    );
}

#[test]
fn test_format_duration() {
    assert_eq!(format_duration(0), "0m");
    assert_eq!(format_duration(59), "0m");
    assert_eq!(format_duration(12 * 60), "12m");
    assert_eq!(format_duration(3600 + 5 * 60), "1h 05m");
    assert_eq!(format_duration(26 * 3600), "26h 00m");
    assert_eq!(format_duration(-30), "0m");
}
