/*!
 * Tests for time values and ranges
 */

use cutdraft::errors::DraftError;
use cutdraft::time_util::{format_subtitle_timestamp, parse_subtitle_timestamp};
use cutdraft::{SEC, TimeRange, parse_time, trange};

#[test]
fn test_parse_time_with_compound_units_should_sum_components() {
    assert_eq!(parse_time("1h2m3.5s").unwrap(), 3723 * SEC + SEC / 2);
    assert_eq!(parse_time("1.5s").unwrap(), 1_500_000);
    assert_eq!(parse_time("2m").unwrap(), 120 * SEC);
}

#[test]
fn test_parse_time_with_negative_value_should_keep_sign() {
    assert_eq!(parse_time("-2s").unwrap(), -2 * SEC);
}

#[test]
fn test_parse_time_with_integer_should_pass_through() {
    assert_eq!(parse_time(1234_i64).unwrap(), 1234);
}

#[test]
fn test_parse_time_with_garbage_should_fail() {
    for input in ["", "abc", "5x", "-"] {
        assert!(
            matches!(parse_time(input), Err(DraftError::InvalidTimeFormat(_))),
            "'{}' should be rejected",
            input
        );
    }
}

#[test]
fn test_subtitle_timestamp_should_parse_and_format() {
    let micros = parse_subtitle_timestamp("01:02:03,456").unwrap();
    assert_eq!(micros, 3723 * SEC + 456_000);
    assert_eq!(format_subtitle_timestamp(micros), "01:02:03,456");
}

#[test]
fn test_subtitle_timestamp_with_bad_fields_should_fail() {
    assert!(matches!(
        parse_subtitle_timestamp("00:61:00,000"),
        Err(DraftError::InvalidTimestamp(_))
    ));
    assert!(parse_subtitle_timestamp("1:2:3").is_err());
}

#[test]
fn test_time_range_with_negative_duration_should_fail() {
    assert!(matches!(TimeRange::new(0, -1), Err(DraftError::InvalidRange(_))));
    assert_eq!(TimeRange::new(5, 0).unwrap().end(), 5);
}

#[test]
fn test_overlaps_with_touching_ranges_should_be_false() {
    let a = TimeRange::new(0, 10).unwrap();
    let b = TimeRange::new(10, 5).unwrap();
    let c = TimeRange::new(9, 5).unwrap();
    assert!(!a.overlaps(&b));
    assert!(!b.overlaps(&a));
    assert!(a.overlaps(&c));
}

#[test]
fn test_trange_should_parse_both_ends() {
    let range = trange("1s", "2.5s").unwrap();
    assert_eq!(range, TimeRange::new(SEC, 2_500_000).unwrap());
    assert_eq!(range.export_json(), serde_json::json!({ "start": 1_000_000, "duration": 2_500_000 }));
}
