use std::collections::BTreeMap;
use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

/// Hour-start timestamp in milliseconds since epoch mapped to a quantity for that hour
pub type HourlyQuantityMap = BTreeMap<i64, f64>;

/// One forecast observation for a single hour
///
/// The start time keeps the UTC offset of the location it was forecasted for, which is
/// what slot boundaries and labels are computed in. Snowfall and precipitation are
/// zero until the merge step has joined the interval series into the record.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HourlyRecord {
    pub start_time: DateTime<FixedOffset>,
    pub temperature: Option<f64>,
    pub wind_speed: Option<String>,
    pub wind_direction: Option<String>,
    pub precipitation_chance: Option<f64>,
    pub short_forecast: String,
    #[serde(default)]
    pub snowfall_mm: f64,
    #[serde(default)]
    pub precipitation_mm: f64,
}

impl HourlyRecord {
    /// Returns a record for the given hour with no observed values
    ///
    /// # Arguments
    ///
    /// * 'start_time' - start of the hour the record represents
    pub fn new(start_time: DateTime<FixedOffset>) -> HourlyRecord {
        HourlyRecord {
            start_time,
            temperature: None,
            wind_speed: None,
            wind_direction: None,
            precipitation_chance: None,
            short_forecast: String::new(),
            snowfall_mm: 0.0,
            precipitation_mm: 0.0,
        }
    }
}

/// A quantity observed over a span of whole hours, value in millimeters
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct IntervalEntry {
    pub start: DateTime<FixedOffset>,
    pub hours: u32,
    pub value: Option<f64>,
}
