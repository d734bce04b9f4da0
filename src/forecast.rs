use std::collections::BTreeMap;
use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use crate::intervals::distribute;
use crate::merge::merge_quantities;
use crate::metrics::{definition, registry, MetricId, UnitSystem};
use crate::models::hourly::{HourlyRecord, IntervalEntry};
use crate::slots::{aggregate_slots, build_slots_at, AggregatedSlotValue, TimeSlot};

/// The raw documents the pipeline works on, as delivered by the fetch layer
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ForecastInput {
    pub hourly: Vec<HourlyRecord>,
    pub snow: Vec<IntervalEntry>,
    pub precipitation: Vec<IntervalEntry>,
}

/// Aggregated forecast: the slots and, per metric, one value per slot in slot order
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ForecastGrid {
    pub units: UnitSystem,
    pub slots: Vec<TimeSlot>,
    pub metrics: BTreeMap<MetricId, Vec<AggregatedSlotValue>>,
}

impl ForecastGrid {
    /// Returns a grid without any slots
    ///
    /// # Arguments
    ///
    /// * 'units' - unit system of the (non-existing) display values
    pub fn empty(units: UnitSystem) -> ForecastGrid {
        ForecastGrid { units, slots: Vec::new(), metrics: BTreeMap::new() }
    }

    /// Returns a full grid where every metric is null in every slot, used for a location
    /// without any data
    ///
    /// # Arguments
    ///
    /// * 'anchor' - time to anchor the slots to
    /// * 'units' - unit system to format display values in
    pub fn null(anchor: &DateTime<FixedOffset>, units: UnitSystem) -> ForecastGrid {
        build_forecast_at(&ForecastInput::default(), anchor, units)
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Returns the slot values for the given metric
    ///
    /// # Arguments
    ///
    /// * 'id' - the metric
    pub fn values(&self, id: MetricId) -> Option<&[AggregatedSlotValue]> {
        self.metrics.get(&id).map(|v| v.as_slice())
    }

    /// Returns a copy of the grid with display values formatted for another unit system.
    /// Slot membership and aggregated values are kept as they are.
    ///
    /// # Arguments
    ///
    /// * 'units' - the unit system to format for
    pub fn with_units(&self, units: UnitSystem) -> ForecastGrid {
        let metrics = self.metrics
            .iter()
            .map(|(id, values)| {
                let values = match definition(*id, units) {
                    Some(d) => values
                        .iter()
                        .map(|v| AggregatedSlotValue { value: v.value.clone(), display: d.format(v.value.as_ref()) })
                        .collect(),
                    None => values.clone(),
                };
                (*id, values)
            })
            .collect();

        ForecastGrid { units, slots: self.slots.clone(), metrics }
    }
}

/// Runs the aggregation pipeline: distributes the interval series over hours, merges them
/// into the hourly records, buckets the records into slots and aggregates every metric.
/// Slots are anchored to the first hourly record, an input without hourly records gives
/// an empty grid.
///
/// # Arguments
///
/// * 'input' - hourly records and interval series for one location
/// * 'units' - unit system to format display values in
pub fn build_forecast(input: &ForecastInput, units: UnitSystem) -> ForecastGrid {
    match input.hourly.first() {
        Some(first) => build_forecast_at(input, &first.start_time, units),
        None => ForecastGrid::empty(units),
    }
}

/// Runs the aggregation pipeline like build_forecast, but always returns SLOT_COUNT slots.
/// The anchor is used in place of the first hourly record when there are none, which
/// leaves every slot null.
///
/// # Arguments
///
/// * 'input' - hourly records and interval series for one location
/// * 'anchor' - time to anchor the slots to if there are no hourly records
/// * 'units' - unit system to format display values in
pub fn build_forecast_at(input: &ForecastInput, anchor: &DateTime<FixedOffset>, units: UnitSystem) -> ForecastGrid {
    let snowfall = distribute(&input.snow);
    let precipitation = distribute(&input.precipitation);
    let records = merge_quantities(&input.hourly, &snowfall, &precipitation);

    let slots = build_slots_at(&records, anchor);
    let metrics = aggregate_slots(&slots, &registry(units));

    ForecastGrid { units, slots, metrics }
}
