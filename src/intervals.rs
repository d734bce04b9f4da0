use chrono::{DateTime, TimeZone};
use log::warn;
use crate::models::hourly::{HourlyQuantityMap, IntervalEntry};

/// Milliseconds in one hour
pub const HOUR_MS: i64 = 3_600_000;

/// Returns the key used in an HourlyQuantityMap for the hour the timestamp falls in, i.e.
/// the start of its UTC hour in milliseconds. Timestamps with different offsets that fall
/// within the same UTC hour share a key.
///
/// # Arguments
///
/// * 'date_time' - any timestamp within the hour
pub fn hour_key<Tz: TimeZone>(date_time: &DateTime<Tz>) -> i64 {
    date_time.timestamp_millis().div_euclid(HOUR_MS) * HOUR_MS
}

/// Parses an ISO-8601 duration into whole hours.
///
/// Accepts 'PT<h>H', 'P<d>D' and 'P<d>DT<h>H'. Anything else, including a zero span,
/// counts as one hour.
///
/// # Arguments
///
/// * 'duration' - the duration part of an interval, e.g. 'PT3H'
pub fn parse_hours(duration: &str) -> u32 {
    let Some(rest) = duration.trim().strip_prefix('P') else {
        return 1;
    };

    let (days, time) = match rest.split_once('T') {
        Some((d, t)) => (d, Some(t)),
        None => (rest, None),
    };

    let days = if days.is_empty() {
        Some(0)
    } else {
        days.strip_suffix('D').and_then(|d| d.parse::<u32>().ok())
    };
    let hours = match time {
        Some(t) => t.strip_suffix('H').and_then(|h| h.parse::<u32>().ok()),
        None => Some(0),
    };

    match (days, hours) {
        (Some(d), Some(h)) => d
            .checked_mul(24)
            .and_then(|d| d.checked_add(h))
            .filter(|total| *total > 0)
            .unwrap_or(1),
        _ => 1,
    }
}

/// Parses a raw interval as delivered by the grid data API, i.e. '<start>/<duration>',
/// into an IntervalEntry. Returns None if the start instant can't be parsed.
///
/// # Arguments
///
/// * 'valid_time' - the interval string, e.g. '2024-01-15T06:00:00+00:00/PT3H'
/// * 'value' - value in millimeters for the whole interval
pub fn parse_interval(valid_time: &str, value: Option<f64>) -> Option<IntervalEntry> {
    let (start, duration) = valid_time.split_once('/').unwrap_or((valid_time, ""));

    match DateTime::parse_from_rfc3339(start.trim()) {
        Ok(start) => Some(IntervalEntry { start, hours: parse_hours(duration), value }),
        Err(e) => {
            warn!("skipping interval with bad start time '{}': {}", valid_time, e);
            None
        }
    }
}

/// Spreads every interval's value evenly over the hours it spans.
///
/// Forecast revisions can make intervals overlap, in which case the contributions
/// to a shared hour are summed.
///
/// # Arguments
///
/// * 'entries' - the interval series to distribute
pub fn distribute(entries: &[IntervalEntry]) -> HourlyQuantityMap {
    let mut result = HourlyQuantityMap::new();

    for entry in entries {
        let hours = entry.hours.max(1);
        let per_hour = entry.value.unwrap_or(0.0) / hours as f64;
        let first = hour_key(&entry.start);

        for h in 0..hours as i64 {
            *result.entry(first + h * HOUR_MS).or_insert(0.0) += per_hour;
        }
    }

    result
}
