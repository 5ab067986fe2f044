// SPDX-License-Identifier: MIT

//! Hand-written 5-field cron parser and matcher.
//!
//! Hand-written rather than pulled in from a cron crate: the AND-not-OR
//! semantics between day-of-month and day-of-week, and the specific
//! walk-backward "previous match" algorithm, are unusual enough that an
//! off-the-shelf parser's matching rules aren't guaranteed to agree
//! bit-for-bit.

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid cron expression {expression:?} (field: {field:?})")]
pub struct CronParseError {
    pub expression: String,
    pub field: Option<&'static str>,
}

/// A parsed field: the set of values (within the field's valid range) that
/// match.
#[derive(Debug, Clone, PartialEq, Eq)]
struct FieldSet {
    values: Vec<bool>,
}

impl FieldSet {
    fn new(max_exclusive: usize) -> Self {
        Self { values: vec![false; max_exclusive] }
    }

    fn contains(&self, v: u32) -> bool {
        (v as usize) < self.values.len() && self.values[v as usize]
    }

    fn set(&mut self, v: u32) {
        if (v as usize) < self.values.len() {
            self.values[v as usize] = true;
        }
    }

    fn parse(
        expr: &str,
        min: u32,
        max: u32,
        field_name: &'static str,
        original: &str,
    ) -> Result<Self, CronParseError> {
        let mut set = Self::new((max + 1) as usize);
        let err = || CronParseError { expression: original.to_string(), field: Some(field_name) };

        for part in expr.split(',') {
            let part = part.trim();
            if part.is_empty() {
                return Err(err());
            }
            let (range_part, step, has_explicit_step) = match part.split_once('/') {
                Some((r, s)) => {
                    let step: u32 = s.parse().map_err(|_| err())?;
                    if step == 0 {
                        return Err(err());
                    }
                    (r, step, true)
                }
                None => (part, 1, false),
            };

            let (lo, hi) = if range_part == "*" {
                (min, max)
            } else if let Some((a, b)) = range_part.split_once('-') {
                let lo: u32 = a.parse().map_err(|_| err())?;
                let hi: u32 = b.parse().map_err(|_| err())?;
                if lo > hi || lo < min || hi > max {
                    return Err(err());
                }
                (lo, hi)
            } else {
                let v: u32 = range_part.parse().map_err(|_| err())?;
                if v < min || v > max {
                    return Err(err());
                }
                if has_explicit_step {
                    // `v/n` means "starting at v, every n" through the field max.
                    (v, max)
                } else {
                    // A bare literal matches only itself.
                    (v, v)
                }
            };

            let mut v = lo;
            while v <= hi {
                set.set(v);
                v += step;
            }
        }
        Ok(set)
    }
}

/// Parsed fields of a 5-field cron expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CronFields {
    minute: FieldSet,
    hour: FieldSet,
    day_of_month: FieldSet,
    month: FieldSet,
    /// Normalized to 0 (Sunday) .. 6 (Saturday); a parsed `7` is folded into `0`.
    day_of_week: FieldSet,
    source: String,
}

/// Parse a standard 5-field cron expression:
/// `minute(0-59) hour(0-23) day-of-month(1-31) month(1-12) day-of-week(0-7)`
/// where both `0` and `7` mean Sunday.
pub fn parse_cron(expr: &str) -> Result<CronFields, CronParseError> {
    let fields: Vec<&str> = expr.split_whitespace().collect();
    if fields.len() != 5 {
        return Err(CronParseError { expression: expr.to_string(), field: None });
    }
    let minute = FieldSet::parse(fields[0], 0, 59, "minute", expr)?;
    let hour = FieldSet::parse(fields[1], 0, 23, "hour", expr)?;
    let day_of_month = FieldSet::parse(fields[2], 1, 31, "day_of_month", expr)?;
    let month = FieldSet::parse(fields[3], 1, 12, "month", expr)?;
    let mut day_of_week = FieldSet::parse(fields[4], 0, 7, "day_of_week", expr)?;
    if day_of_week.contains(7) {
        day_of_week.set(0);
    }
    Ok(CronFields { minute, hour, day_of_month, month, day_of_week, source: expr.to_string() })
}

impl CronFields {
    pub fn source(&self) -> &str {
        &self.source
    }

    /// True iff `t` (minute resolution) satisfies every field, ANDed
    /// together — day-of-month and day-of-week are NOT ORed, unlike POSIX
    /// cron.
    pub fn matches(&self, t: NaiveDateTime) -> bool {
        let dow = t.weekday().num_days_from_sunday();
        self.minute.contains(t.minute())
            && self.hour.contains(t.hour())
            && self.day_of_month.contains(t.day())
            && self.month.contains(t.month())
            && self.day_of_week.contains(dow)
    }
}

pub fn cron_matches(fields: &CronFields, t: NaiveDateTime) -> bool {
    fields.matches(t)
}

/// The most recent instant strictly before `before` that satisfies `fields`,
/// scanning at most `lookback_days` calendar days backward, minute
/// resolution. `None` if no match is found within the window.
pub fn previous_cron_match(
    fields: &CronFields,
    before: NaiveDateTime,
    lookback_days: u32,
) -> Option<NaiveDateTime> {
    let search_start = before - Duration::minutes(1);
    let mut day = search_start.date();
    for _ in 0..=lookback_days {
        if day_could_match(fields, day) {
            let day_start_minute = if day == search_start.date() {
                search_start.time().hour() * 60 + search_start.time().minute()
            } else {
                23 * 60 + 59
            };
            for total_min in (0..=day_start_minute).rev() {
                let hour = total_min / 60;
                let minute = total_min % 60;
                let Some(time) = NaiveTime::from_hms_opt(hour, minute, 0) else { continue };
                let candidate = NaiveDateTime::new(day, time);
                if fields.matches(candidate) {
                    return Some(candidate);
                }
            }
        }
        day = day.pred_opt()?;
    }
    None
}

/// Scan forward from `after` for the next matching instant, minute
/// resolution, bounded to 366 days. Uses day-level fast-skip: when the
/// calendar day itself can't match (dom/month/dow), the whole day is
/// skipped without scanning its minutes.
pub fn next_cron_match(fields: &CronFields, after: NaiveDateTime) -> Option<NaiveDateTime> {
    let search_start = after + Duration::minutes(1);
    let mut day = search_start.date();
    for day_offset in 0..366 {
        if day_could_match(fields, day) {
            let start_minute =
                if day_offset == 0 { search_start.time().hour() * 60 + search_start.time().minute() } else { 0 };
            for total_min in start_minute..24 * 60 {
                let hour = total_min / 60;
                let minute = total_min % 60;
                let Some(time) = NaiveTime::from_hms_opt(hour, minute, 0) else { continue };
                let candidate = NaiveDateTime::new(day, time);
                if fields.matches(candidate) {
                    return Some(candidate);
                }
            }
        }
        day = day.succ_opt()?;
    }
    None
}

fn day_could_match(fields: &CronFields, day: NaiveDate) -> bool {
    let dow = day.weekday().num_days_from_sunday();
    fields.day_of_month.contains(day.day())
        && fields.month.contains(day.month())
        && fields.day_of_week.contains(dow)
}

#[cfg(test)]
#[path = "cron_tests.rs"]
mod tests;
