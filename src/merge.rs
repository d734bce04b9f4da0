use crate::intervals::hour_key;
use crate::models::hourly::{HourlyQuantityMap, HourlyRecord};

/// Joins distributed snowfall and precipitation into the hourly records.
///
/// Records are matched on their exact hour-start timestamp, hours not covered by
/// a map get 0. The input records are left untouched.
///
/// # Arguments
///
/// * 'records' - hourly records in ascending order
/// * 'snowfall' - snowfall per hour in millimeters
/// * 'precipitation' - precipitation per hour in millimeters
pub fn merge_quantities(records: &[HourlyRecord], snowfall: &HourlyQuantityMap, precipitation: &HourlyQuantityMap) -> Vec<HourlyRecord> {
    records
        .iter()
        .map(|r| {
            let key = hour_key(&r.start_time);
            HourlyRecord {
                snowfall_mm: snowfall.get(&key).copied().unwrap_or(0.0),
                precipitation_mm: precipitation.get(&key).copied().unwrap_or(0.0),
                ..r.clone()
            }
        })
        .collect()
}
