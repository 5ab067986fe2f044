use super::*;
use chrono::NaiveDateTime;

fn dt(s: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M").expect("valid fixture datetime")
}

#[test]
fn star_matches_everything() {
    let f = parse_cron("* * * * *").unwrap();
    assert!(f.matches(dt("2026-02-16 06:00")));
    assert!(f.matches(dt("2026-07-04 23:59")));
}

#[test]
fn literal_minute_and_hour() {
    let f = parse_cron("0 6 * * *").unwrap();
    assert!(f.matches(dt("2026-02-16 06:00")));
    assert!(!f.matches(dt("2026-02-16 06:01")));
    assert!(!f.matches(dt("2026-02-16 07:00")));
}

#[test]
fn range_field() {
    let f = parse_cron("0 9-17 * * *").unwrap();
    assert!(f.matches(dt("2026-02-16 09:00")));
    assert!(f.matches(dt("2026-02-16 17:00")));
    assert!(!f.matches(dt("2026-02-16 18:00")));
    assert!(!f.matches(dt("2026-02-16 08:00")));
}

#[test]
fn step_field() {
    let f = parse_cron("*/15 * * * *").unwrap();
    assert!(f.matches(dt("2026-02-16 06:00")));
    assert!(f.matches(dt("2026-02-16 06:15")));
    assert!(f.matches(dt("2026-02-16 06:30")));
    assert!(!f.matches(dt("2026-02-16 06:10")));
}

#[test]
fn range_with_step() {
    let f = parse_cron("0-30/10 * * * *").unwrap();
    assert!(f.matches(dt("2026-02-16 06:00")));
    assert!(f.matches(dt("2026-02-16 06:10")));
    assert!(f.matches(dt("2026-02-16 06:20")));
    assert!(!f.matches(dt("2026-02-16 06:30")));
    assert!(!f.matches(dt("2026-02-16 06:05")));
}

#[test]
fn value_with_step_runs_to_field_max() {
    let f = parse_cron("5/20 * * * *").unwrap();
    assert!(f.matches(dt("2026-02-16 06:05")));
    assert!(f.matches(dt("2026-02-16 06:25")));
    assert!(f.matches(dt("2026-02-16 06:45")));
    assert!(!f.matches(dt("2026-02-16 06:06")));
}

#[test]
fn list_field() {
    let f = parse_cron("0 6,12,18 * * *").unwrap();
    assert!(f.matches(dt("2026-02-16 06:00")));
    assert!(f.matches(dt("2026-02-16 12:00")));
    assert!(f.matches(dt("2026-02-16 18:00")));
    assert!(!f.matches(dt("2026-02-16 09:00")));
}

#[test]
fn day_of_week_zero_and_seven_both_mean_sunday() {
    // 2026-02-15 is a Sunday.
    let f0 = parse_cron("0 6 * * 0").unwrap();
    let f7 = parse_cron("0 6 * * 7").unwrap();
    assert!(f0.matches(dt("2026-02-15 06:00")));
    assert!(f7.matches(dt("2026-02-15 06:00")));
    assert!(!f0.matches(dt("2026-02-16 06:00")));
}

#[test]
fn dom_and_dow_are_anded_not_ored() {
    // 2026-02-16 is a Monday, day-of-month 16.
    // This field set requires BOTH day-of-month==1 AND day-of-week==Monday.
    let f = parse_cron("0 6 1 * 1").unwrap();
    assert!(!f.matches(dt("2026-02-16 06:00")), "dom doesn't match even though dow does");
    assert!(!f.matches(dt("2026-03-01 06:00")), "dow doesn't match even though dom does (Sunday)");
    // 2026-06-01 is a Monday AND day-of-month 1: both match.
    assert!(f.matches(dt("2026-06-01 06:00")));
}

#[test]
fn malformed_expressions_are_rejected() {
    assert!(parse_cron("* * * *").is_err());
    assert!(parse_cron("60 * * * *").is_err());
    assert!(parse_cron("* 24 * * *").is_err());
    assert!(parse_cron("* * 0 * *").is_err());
    assert!(parse_cron("* * * 13 *").is_err());
    assert!(parse_cron("* * * * 8").is_err());
    assert!(parse_cron("*/0 * * * *").is_err());
    assert!(parse_cron(", * * * *").is_err());
}

#[test]
fn parse_error_carries_expression_and_field() {
    let err = parse_cron("* * * 13 *").unwrap_err();
    assert_eq!(err.expression, "* * * 13 *");
    assert_eq!(err.field, Some("month"));
}

#[test]
fn previous_match_walks_backward_across_days() {
    let f = parse_cron("0 6 * * *").unwrap();
    let before = dt("2026-02-16 10:00");
    let prev = previous_cron_match(&f, before, 31).unwrap();
    assert_eq!(prev, dt("2026-02-16 06:00"));
}

#[test]
fn previous_match_skips_to_an_earlier_day_when_today_has_no_match_yet() {
    let f = parse_cron("0 6 * * *").unwrap();
    let before = dt("2026-02-16 05:00"); // before today's 06:00 fire
    let prev = previous_cron_match(&f, before, 31).unwrap();
    assert_eq!(prev, dt("2026-02-15 06:00"));
}

#[test]
fn previous_match_returns_none_outside_lookback_window() {
    // Only fires on Feb 29 of a leap year; starting well after, with a short
    // lookback, there's no match.
    let f = parse_cron("0 0 29 2 *").unwrap();
    let before = dt("2026-06-01 00:00");
    assert!(previous_cron_match(&f, before, 30).is_none());
}

#[test]
fn next_match_scans_forward() {
    let f = parse_cron("0 6 * * *").unwrap();
    let after = dt("2026-02-16 06:00");
    let next = next_cron_match(&f, after).unwrap();
    assert_eq!(next, dt("2026-02-17 06:00"));
}

#[test]
fn next_match_same_day_later_hour() {
    let f = parse_cron("0 6,18 * * *").unwrap();
    let after = dt("2026-02-16 07:00");
    let next = next_cron_match(&f, after).unwrap();
    assert_eq!(next, dt("2026-02-16 18:00"));
}

#[test]
fn cron_matches_free_function_matches_method() {
    let f = parse_cron("0 6 * * *").unwrap();
    let t = dt("2026-02-16 06:00");
    assert_eq!(cron_matches(&f, t), f.matches(t));
}
