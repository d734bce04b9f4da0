use crate::metrics::{Aggregation, Value, Wind};

/// Reduces the raw values extracted from one slot to a single value.
///
/// Null values are discarded first. Then:
/// * wind values get their mean speed and most frequent direction
/// * plain numbers are summed or averaged given the metric's aggregation
/// * anything else gets the most frequent value
///
/// Returns None if there is nothing left to aggregate.
///
/// # Arguments
///
/// * 'values' - raw values, one per hourly record in the slot
/// * 'aggregation' - the metric's aggregation
pub fn aggregate(values: &[Option<Value>], aggregation: Aggregation) -> Option<Value> {
    let present = values.iter().flatten().collect::<Vec<&Value>>();
    if present.is_empty() {
        return None;
    }

    let winds = present
        .iter()
        .filter_map(|v| match v {
            Value::Wind(w) => Some(w),
            _ => None,
        })
        .collect::<Vec<&Wind>>();
    if winds.len() == present.len() {
        return Some(Value::Wind(aggregate_wind(&winds)));
    }

    let numbers = present.iter().filter_map(|v| v.as_number()).collect::<Vec<f64>>();
    if numbers.len() == present.len() {
        let sum = numbers.iter().sum::<f64>();
        return match aggregation {
            Aggregation::Sum => Some(Value::Number(sum)),
            Aggregation::Average => Some(Value::Number(sum / numbers.len() as f64)),
        };
    }

    mode(&present).map(|v| (*v).clone())
}

/// Returns the most frequent value, the first seen value wins a tie
///
/// # Arguments
///
/// * 'values' - values to find the mode of
pub fn mode<T: PartialEq + Clone>(values: &[T]) -> Option<T> {
    let mut counts: Vec<(&T, usize)> = Vec::new();

    for v in values {
        match counts.iter_mut().find(|(c, _)| *c == v) {
            Some((_, n)) => *n += 1,
            None => counts.push((v, 1)),
        }
    }

    let mut best: Option<(&T, usize)> = None;
    for (v, n) in counts {
        if best.is_none_or(|(_, b)| n > b) {
            best = Some((v, n));
        }
    }

    best.map(|(v, _)| v.clone())
}

fn aggregate_wind(winds: &[&Wind]) -> Wind {
    let speeds = winds.iter().filter_map(|w| w.speed).collect::<Vec<f64>>();
    let directions = winds.iter().filter_map(|w| w.direction.clone()).collect::<Vec<String>>();

    let speed = if speeds.is_empty() {
        None
    } else {
        Some(speeds.iter().sum::<f64>() / speeds.len() as f64)
    };

    Wind { speed, direction: mode(&directions) }
}
