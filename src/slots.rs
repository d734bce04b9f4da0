use std::collections::BTreeMap;
use chrono::{DateTime, DurationRound, FixedOffset, TimeDelta, Timelike};
use serde::Serialize;
use crate::aggregation::aggregate;
use crate::metrics::{MetricDefinition, MetricId, Value};
use crate::models::hourly::HourlyRecord;

/// Width of a slot in hours
pub const SLOT_HOURS: i64 = 4;

/// Number of slots per day
pub const SLOTS_PER_DAY: usize = 6;

/// Number of days covered by a grid
pub const DAYS_TO_SHOW: usize = 5;

/// Total number of slots in a grid
pub const SLOT_COUNT: usize = SLOTS_PER_DAY * DAYS_TO_SHOW;

/// A fixed 4-hour window and the hourly records that start within it
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TimeSlot {
    pub start_time: DateTime<FixedOffset>,
    pub label: String,
    pub time_label: String,
    pub day_label: String,
    #[serde(skip)]
    pub records: Vec<HourlyRecord>,
}

impl TimeSlot {
    /// Returns an empty slot starting at the given time
    ///
    /// # Arguments
    ///
    /// * 'start_time' - start of the slot
    pub fn new(start_time: DateTime<FixedOffset>) -> TimeSlot {
        let day_label = start_time.format("%a %-m/%-d").to_string();
        let time_label = start_time.format("%-I %p").to_string();

        TimeSlot {
            start_time,
            label: format!("{} {}", day_label, time_label),
            time_label,
            day_label,
            records: Vec::new(),
        }
    }

    /// Returns the (exclusive) end of the slot
    pub fn end_time(&self) -> DateTime<FixedOffset> {
        self.start_time + TimeDelta::hours(SLOT_HOURS)
    }

    /// Checks whether the given time falls within the slot
    ///
    /// # Arguments
    ///
    /// * 'date_time' - the time to check
    pub fn contains(&self, date_time: &DateTime<FixedOffset>) -> bool {
        *date_time >= self.start_time && *date_time < self.end_time()
    }
}

/// An aggregated value for one metric in one slot, together with its display text
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AggregatedSlotValue {
    pub value: Option<Value>,
    pub display: String,
}

/// Returns the start of the first slot, i.e. the first record's hour rounded down to
/// a multiple of SLOT_HOURS on the same day
///
/// # Arguments
///
/// * 'first' - start time of the first hourly record
pub fn first_slot_start(first: &DateTime<FixedOffset>) -> DateTime<FixedOffset> {
    let hour = first.duration_trunc(TimeDelta::hours(1)).unwrap_or(*first);
    hour - TimeDelta::hours(hour.hour() as i64 % SLOT_HOURS)
}

/// Buckets hourly records into SLOT_COUNT consecutive slots anchored to the first record.
/// Returns no slots for an empty input, see build_slots_at for a grid that is never empty.
///
/// # Arguments
///
/// * 'records' - hourly records in ascending order
pub fn build_slots(records: &[HourlyRecord]) -> Vec<TimeSlot> {
    match records.first() {
        Some(first) => build_slots_at(records, &first.start_time),
        None => Vec::new(),
    }
}

/// Buckets hourly records into exactly SLOT_COUNT consecutive slots.
///
/// Slots are anchored to the first record, or to the given anchor when there are no
/// records, in which case all slots are empty. Records outside the covered range are
/// dropped.
///
/// # Arguments
///
/// * 'records' - hourly records in ascending order
/// * 'anchor' - time to anchor the slots to if records is empty
pub fn build_slots_at(records: &[HourlyRecord], anchor: &DateTime<FixedOffset>) -> Vec<TimeSlot> {
    let start = first_slot_start(records.first().map_or(anchor, |r| &r.start_time));
    let mut slots = (0..SLOT_COUNT as i64)
        .map(|i| TimeSlot::new(start + TimeDelta::hours(i * SLOT_HOURS)))
        .collect::<Vec<TimeSlot>>();

    let slot_ms = TimeDelta::hours(SLOT_HOURS).num_milliseconds();
    for record in records {
        let offset = (record.start_time - start).num_milliseconds();
        if offset < 0 {
            continue;
        }
        if let Some(slot) = slots.get_mut((offset / slot_ms) as usize) {
            slot.records.push(record.clone());
        }
    }

    slots
}

/// Aggregates and formats every metric for every slot
///
/// # Arguments
///
/// * 'slots' - the slots to aggregate
/// * 'metrics' - metric definitions to aggregate and format with
pub fn aggregate_slots(slots: &[TimeSlot], metrics: &[MetricDefinition]) -> BTreeMap<MetricId, Vec<AggregatedSlotValue>> {
    let mut result: BTreeMap<MetricId, Vec<AggregatedSlotValue>> = BTreeMap::new();

    for metric in metrics {
        let values = slots
            .iter()
            .map(|slot| {
                let raw = slot.records.iter().map(|r| metric.extract(r)).collect::<Vec<Option<Value>>>();
                let value = aggregate(&raw, metric.aggregation);
                let display = metric.format(value.as_ref());

                AggregatedSlotValue { value, display }
            })
            .collect::<Vec<AggregatedSlotValue>>();

        result.insert(metric.id, values);
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::{registry, UnitSystem, PLACEHOLDER};

    fn ts(s: &str) -> DateTime<FixedOffset> {
        DateTime::parse_from_rfc3339(s).unwrap()
    }

    fn hours_from(start: &str, count: i64) -> Vec<HourlyRecord> {
        let start = ts(start);
        (0..count).map(|h| HourlyRecord::new(start + TimeDelta::hours(h))).collect()
    }

    #[test]
    fn test_first_slot_start() {
        assert_eq!(first_slot_start(&ts("2024-01-15T06:30:00-07:00")), ts("2024-01-15T04:00:00-07:00"));
        assert_eq!(first_slot_start(&ts("2024-01-15T00:00:00-07:00")), ts("2024-01-15T00:00:00-07:00"));
        assert_eq!(first_slot_start(&ts("2024-01-15T23:59:00+01:00")), ts("2024-01-15T20:00:00+01:00"));
    }

    #[test]
    fn test_slot_count_is_fixed() {
        assert_eq!(build_slots(&hours_from("2024-01-15T13:00:00-07:00", 1)).len(), SLOT_COUNT);
        assert_eq!(build_slots(&hours_from("2024-01-15T13:00:00-07:00", 156)).len(), SLOT_COUNT);
        assert!(build_slots(&[]).is_empty());
    }

    #[test]
    fn test_anchored_slots_without_records() {
        let slots = build_slots_at(&[], &ts("2024-01-15T13:20:00-07:00"));

        assert_eq!(slots.len(), SLOT_COUNT);
        assert_eq!(slots[0].start_time, ts("2024-01-15T12:00:00-07:00"));
        assert!(slots.iter().all(|s| s.records.is_empty()));
    }

    #[test]
    fn test_anchor_ignored_with_records() {
        let records = hours_from("2024-01-15T06:00:00-07:00", 3);
        let slots = build_slots_at(&records, &ts("2024-01-10T00:00:00-07:00"));

        assert_eq!(slots, build_slots(&records));
        assert_eq!(slots[0].start_time, ts("2024-01-15T04:00:00-07:00"));
    }

    #[test]
    fn test_slot_membership() {
        let slots = build_slots(&hours_from("2024-01-15T00:00:00-07:00", 12));

        assert_eq!(slots[0].start_time, ts("2024-01-15T00:00:00-07:00"));
        assert_eq!(slots[1].start_time, ts("2024-01-15T04:00:00-07:00"));
        assert!(slots[1].records.iter().any(|r| r.start_time == ts("2024-01-15T05:00:00-07:00")));
        assert!(slots[2].records.iter().all(|r| r.start_time != ts("2024-01-15T05:00:00-07:00")));
        assert_eq!(slots.iter().take(3).map(|s| s.records.len()).collect::<Vec<usize>>(), vec![4, 4, 4]);
        assert!(slots[3..].iter().all(|s| s.records.is_empty()));

        for slot in &slots {
            assert!(slot.records.iter().all(|r| slot.contains(&r.start_time)));
        }
    }

    #[test]
    fn test_partial_first_slot() {
        let slots = build_slots(&hours_from("2024-01-15T06:00:00-07:00", 4));
        assert_eq!(slots[0].records.len(), 2);
        assert_eq!(slots[1].records.len(), 2);
    }

    #[test]
    fn test_records_beyond_grid_are_dropped() {
        let slots = build_slots(&hours_from("2024-01-15T00:00:00-07:00", 200));
        assert_eq!(slots.iter().map(|s| s.records.len()).sum::<usize>(), SLOT_COUNT * SLOT_HOURS as usize);
        assert_eq!(slots.last().unwrap().end_time(), ts("2024-01-20T00:00:00-07:00"));
    }

    #[test]
    fn test_labels() {
        let slot = TimeSlot::new(ts("2024-01-15T16:00:00-07:00"));
        assert_eq!(slot.day_label, "Mon 1/15");
        assert_eq!(slot.time_label, "4 PM");
        assert_eq!(slot.label, "Mon 1/15 4 PM");
    }

    #[test]
    fn test_aggregate_slots() {
        let mut records = hours_from("2024-01-15T00:00:00-07:00", 4);
        for (r, (t, snow)) in records.iter_mut().zip([(30.0, 2.0), (32.0, 0.0), (34.0, 3.0), (36.0, 0.0)]) {
            r.temperature = Some(t);
            r.snowfall_mm = snow;
            r.short_forecast = "Snow".to_string();
        }

        let slots = build_slots(&records);
        let grid = aggregate_slots(&slots, &registry(UnitSystem::Imperial));

        assert_eq!(grid.len(), 7);
        assert!(grid.values().all(|v| v.len() == SLOT_COUNT));
        assert_eq!(grid[&MetricId::Temperature][0].value, Some(Value::Number(33.0)));
        assert_eq!(grid[&MetricId::Temperature][0].display, "33°F");
        assert_eq!(grid[&MetricId::SnowAmount][0].value, Some(Value::Number(5.0)));
        assert_eq!(grid[&MetricId::Conditions][0].display, "❄️");
        assert_eq!(grid[&MetricId::SnowLevel][0].value, Some(Value::Number((0.0 + 0.0 + 5400.0 + 5800.0) / 4.0)));
    }

    #[test]
    fn test_empty_slots_are_null() {
        let slots = build_slots(&hours_from("2024-01-15T00:00:00-07:00", 1));
        let grid = aggregate_slots(&slots, &registry(UnitSystem::Metric));

        for values in grid.values() {
            assert!(values[1..].iter().all(|v| v.value.is_none() && v.display == PLACEHOLDER));
        }
    }
}
