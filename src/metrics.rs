use std::fmt;
use std::str::FromStr;
use serde::{Deserialize, Serialize};
use crate::models::hourly::HourlyRecord;

/// Shown for a slot/metric pair without any data
pub const PLACEHOLDER: &str = "—";

/// Snow level in feet when temperature is at freezing point
const BASE_SNOW_LEVEL_FT: f64 = 5000.0;

/// Snow level change in feet per °F above freezing
const SNOW_LEVEL_FT_PER_DEGREE: f64 = 200.0;

/// Snow level is never reported above this altitude (feet)
const MAX_SNOW_LEVEL_FT: f64 = 10000.0;

const FREEZING_F: f64 = 32.0;
const KMH_PER_MPH: f64 = 1.60934;
const METERS_PER_FOOT: f64 = 0.3048;
const MM_PER_INCH: f64 = 25.4;

/// Unit system used when formatting values for display
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitSystem {
    #[default]
    Imperial,
    Metric,
}

impl fmt::Display for UnitSystem {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            UnitSystem::Imperial => write!(f, "imperial"),
            UnitSystem::Metric   => write!(f, "metric"),
        }
    }
}

impl FromStr for UnitSystem {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "imperial" => Ok(UnitSystem::Imperial),
            "metric" => Ok(UnitSystem::Metric),
            other => Err(format!("unknown unit system '{}'", other)),
        }
    }
}

/// Wind as speed (mph) and compass direction
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Wind {
    pub speed: Option<f64>,
    pub direction: Option<String>,
}

/// A raw or aggregated metric value
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Number(f64),
    Wind(Wind),
    Text(String),
}

impl Value {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }
}

/// How the values of one slot are reduced to a single value
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Aggregation {
    Average,
    Sum,
}

/// Identifies a tracked metric, ordered as the rows of the comparison table
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricId {
    Temperature,
    Wind,
    PrecipitationChance,
    Conditions,
    SnowLevel,
    SnowAmount,
    RainAmount,
}

impl fmt::Display for MetricId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            MetricId::Temperature         => write!(f, "Temperature"),
            MetricId::Wind                => write!(f, "Wind"),
            MetricId::PrecipitationChance => write!(f, "Precip %"),
            MetricId::Conditions          => write!(f, "Conditions"),
            MetricId::SnowLevel           => write!(f, "Snow level"),
            MetricId::SnowAmount          => write!(f, "Snow"),
            MetricId::RainAmount          => write!(f, "Rain"),
        }
    }
}

/// Extraction, aggregation and formatting rules for one metric.
///
/// Extracted and aggregated values are always kept in imperial units (°F, mph, ft)
/// except amounts which are kept in millimeters. Conversion to the definition's unit
/// system happens in format only, so a grid can be reformatted without aggregating again.
pub struct MetricDefinition {
    pub id: MetricId,
    pub aggregation: Aggregation,
    pub units: UnitSystem,
    extract: fn(&HourlyRecord) -> Option<Value>,
    format: fn(&Value, UnitSystem) -> String,
}

impl MetricDefinition {
    /// Extracts the raw value for this metric from an hourly record
    ///
    /// # Arguments
    ///
    /// * 'record' - the record to extract from
    pub fn extract(&self, record: &HourlyRecord) -> Option<Value> {
        (self.extract)(record)
    }

    /// Formats an aggregated value for display, PLACEHOLDER if there is no value
    ///
    /// # Arguments
    ///
    /// * 'value' - the aggregated value
    pub fn format(&self, value: Option<&Value>) -> String {
        value.map_or(PLACEHOLDER.to_string(), |v| (self.format)(v, self.units))
    }
}

/// Returns all metric definitions, in table row order, formatting for the given unit system
///
/// # Arguments
///
/// * 'units' - the unit system to format values in
pub fn registry(units: UnitSystem) -> Vec<MetricDefinition> {
    vec![
        MetricDefinition { id: MetricId::Temperature, aggregation: Aggregation::Average, units, extract: extract_temperature, format: format_temperature },
        MetricDefinition { id: MetricId::Wind, aggregation: Aggregation::Average, units, extract: extract_wind, format: format_wind },
        MetricDefinition { id: MetricId::PrecipitationChance, aggregation: Aggregation::Average, units, extract: extract_precipitation_chance, format: format_percent },
        MetricDefinition { id: MetricId::Conditions, aggregation: Aggregation::Average, units, extract: extract_conditions, format: format_conditions },
        MetricDefinition { id: MetricId::SnowLevel, aggregation: Aggregation::Average, units, extract: extract_snow_level, format: format_snow_level },
        MetricDefinition { id: MetricId::SnowAmount, aggregation: Aggregation::Sum, units, extract: extract_snowfall, format: format_snowfall },
        MetricDefinition { id: MetricId::RainAmount, aggregation: Aggregation::Sum, units, extract: extract_precipitation, format: format_precipitation },
    ]
}

/// Returns the definition for a single metric
///
/// # Arguments
///
/// * 'id' - the metric to look up
/// * 'units' - the unit system to format values in
pub fn definition(id: MetricId, units: UnitSystem) -> Option<MetricDefinition> {
    registry(units).into_iter().find(|d| d.id == id)
}

/// Derives the snow level in feet from a temperature in °F
///
/// # Arguments
///
/// * 'temperature' - temperature in °F
pub fn snow_level(temperature: Option<f64>) -> Option<f64> {
    let t = temperature?;
    if t <= FREEZING_F {
        Some(0.0)
    } else {
        Some((BASE_SNOW_LEVEL_FT + (t - FREEZING_F) * SNOW_LEVEL_FT_PER_DEGREE).clamp(0.0, MAX_SNOW_LEVEL_FT))
    }
}

/// Parses the first run of digits in a free text wind speed, e.g. '10 to 15 mph' gives 10
///
/// # Arguments
///
/// * 'text' - the wind speed text
pub fn parse_wind_speed(text: &str) -> Option<f64> {
    let digits = text
        .chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(|c| c.is_ascii_digit())
        .collect::<String>();

    digits.parse::<f64>().ok()
}

/// Maps a condition text to an icon, the first matching keyword group wins.
///
/// # Arguments
///
/// * 'text' - short forecast text, e.g. 'Chance Snow Showers'
pub fn condition_icon(text: &str) -> Option<&'static str> {
    let text = text.to_lowercase();
    let has = |keyword: &str| text.contains(keyword);

    if has("thunder") {
        Some("⛈️")
    } else if has("blizzard") {
        Some("🌬️")
    } else if has("snow") && has("rain") {
        Some("🌨️")
    } else if has("freezing rain") || has("freezing drizzle") || has("sleet") {
        Some("🧊")
    } else if has("snow") {
        Some("❄️")
    } else if has("rain") || has("showers") {
        Some("🌧️")
    } else if has("fog") || has("mist") {
        Some("🌫️")
    } else if has("partly") {
        Some("⛅")
    } else if has("mostly cloudy") {
        Some("🌥️")
    } else if has("cloudy") || has("overcast") {
        Some("☁️")
    } else if has("sunny") || has("clear") {
        Some("☀️")
    } else if has("windy") || has("breezy") {
        Some("💨")
    } else {
        None
    }
}

/// Formats an integer with comma thousands separators
///
/// # Arguments
///
/// * 'value' - the value to format
pub fn group_thousands(value: i64) -> String {
    let digits = value.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);

    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    if value < 0 {
        format!("-{}", grouped)
    } else {
        grouped
    }
}

pub fn fahrenheit_to_celsius(f: f64) -> f64 {
    (f - FREEZING_F) * 5.0 / 9.0
}

pub fn mph_to_kmh(mph: f64) -> f64 {
    mph * KMH_PER_MPH
}

pub fn feet_to_meters(feet: f64) -> f64 {
    feet * METERS_PER_FOOT
}

fn extract_temperature(record: &HourlyRecord) -> Option<Value> {
    record.temperature.map(Value::Number)
}

fn extract_wind(record: &HourlyRecord) -> Option<Value> {
    let speed = record.wind_speed.as_deref().and_then(parse_wind_speed);
    let direction = record.wind_direction.clone().filter(|d| !d.trim().is_empty());

    if speed.is_none() && direction.is_none() {
        None
    } else {
        Some(Value::Wind(Wind { speed, direction }))
    }
}

fn extract_precipitation_chance(record: &HourlyRecord) -> Option<Value> {
    record.precipitation_chance.map(Value::Number)
}

fn extract_conditions(record: &HourlyRecord) -> Option<Value> {
    let text = record.short_forecast.trim();
    if text.is_empty() {
        None
    } else {
        Some(Value::Text(text.to_string()))
    }
}

fn extract_snow_level(record: &HourlyRecord) -> Option<Value> {
    snow_level(record.temperature).map(Value::Number)
}

fn extract_snowfall(record: &HourlyRecord) -> Option<Value> {
    Some(Value::Number(record.snowfall_mm))
}

fn extract_precipitation(record: &HourlyRecord) -> Option<Value> {
    Some(Value::Number(record.precipitation_mm))
}

/// Values that ended up as something else than a number through mode aggregation
/// are shown as they are
fn format_other(value: &Value) -> String {
    match value {
        Value::Number(n) => format!("{}", n),
        Value::Wind(_) => PLACEHOLDER.to_string(),
        Value::Text(t) => t.clone(),
    }
}

fn format_temperature(value: &Value, units: UnitSystem) -> String {
    let Some(f) = value.as_number() else { return format_other(value) };
    match units {
        UnitSystem::Imperial => format!("{}°F", f.round() as i64),
        UnitSystem::Metric   => format!("{}°C", fahrenheit_to_celsius(f).round() as i64),
    }
}

fn format_wind(value: &Value, units: UnitSystem) -> String {
    let Value::Wind(wind) = value else { return format_other(value) };

    let speed = wind.speed.map(|mph| match units {
        UnitSystem::Imperial => format!("{} mph", mph.round() as i64),
        UnitSystem::Metric   => format!("{} km/h", mph_to_kmh(mph).round() as i64),
    });

    match (speed, &wind.direction) {
        (Some(s), Some(d)) => format!("{} {}", s, d),
        (Some(s), None) => s,
        (None, Some(d)) => d.clone(),
        (None, None) => PLACEHOLDER.to_string(),
    }
}

fn format_percent(value: &Value, _units: UnitSystem) -> String {
    let Some(p) = value.as_number() else { return format_other(value) };
    format!("{}%", p.round() as i64)
}

fn format_conditions(value: &Value, _units: UnitSystem) -> String {
    match value {
        Value::Text(t) => condition_icon(t).map_or(t.clone(), |icon| icon.to_string()),
        _ => format_other(value),
    }
}

fn format_snow_level(value: &Value, units: UnitSystem) -> String {
    let Some(feet) = value.as_number() else { return format_other(value) };
    match units {
        UnitSystem::Imperial => format!("{} ft", group_thousands(feet.round() as i64)),
        UnitSystem::Metric   => format!("{} m", group_thousands(feet_to_meters(feet).round() as i64)),
    }
}

fn format_snowfall(value: &Value, units: UnitSystem) -> String {
    let Some(mm) = value.as_number() else { return format_other(value) };
    match units {
        UnitSystem::Imperial => format!("{:.1}\"", mm / MM_PER_INCH),
        UnitSystem::Metric   => format!("{:.1} cm", mm / 10.0),
    }
}

fn format_precipitation(value: &Value, units: UnitSystem) -> String {
    let Some(mm) = value.as_number() else { return format_other(value) };
    match units {
        UnitSystem::Imperial => format!("{:.2}\"", mm / MM_PER_INCH),
        UnitSystem::Metric   => format!("{:.1} mm", mm),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;

    fn record() -> HourlyRecord {
        HourlyRecord::new(DateTime::parse_from_rfc3339("2024-01-15T06:00:00-07:00").unwrap())
    }

    fn metric(id: MetricId, units: UnitSystem) -> MetricDefinition {
        definition(id, units).unwrap()
    }

    #[test]
    fn test_registry_order_and_aggregation() {
        let ids = registry(UnitSystem::Imperial).iter().map(|d| d.id).collect::<Vec<MetricId>>();
        assert_eq!(ids, vec![
            MetricId::Temperature,
            MetricId::Wind,
            MetricId::PrecipitationChance,
            MetricId::Conditions,
            MetricId::SnowLevel,
            MetricId::SnowAmount,
            MetricId::RainAmount,
        ]);

        let sums = registry(UnitSystem::Metric)
            .iter()
            .filter(|d| d.aggregation == Aggregation::Sum)
            .map(|d| d.id)
            .collect::<Vec<MetricId>>();
        assert_eq!(sums, vec![MetricId::SnowAmount, MetricId::RainAmount]);
    }

    #[test]
    fn test_snow_level() {
        assert_eq!(snow_level(None), None);
        assert_eq!(snow_level(Some(32.0)), Some(0.0));
        assert_eq!(snow_level(Some(-10.0)), Some(0.0));
        assert_eq!(snow_level(Some(40.0)), Some(6600.0));
        assert_eq!(snow_level(Some(57.0)), Some(10000.0));
        assert_eq!(snow_level(Some(95.0)), Some(10000.0));
    }

    #[test]
    fn test_parse_wind_speed() {
        assert_eq!(parse_wind_speed("15 mph"), Some(15.0));
        assert_eq!(parse_wind_speed("10 to 20 mph"), Some(10.0));
        assert_eq!(parse_wind_speed("calm"), None);
        assert_eq!(parse_wind_speed(""), None);
    }

    #[test]
    fn test_extract_wind() {
        let wind = metric(MetricId::Wind, UnitSystem::Imperial);
        let mut r = record();
        assert_eq!(wind.extract(&r), None);

        r.wind_speed = Some("5 to 10 mph".to_string());
        r.wind_direction = Some("NW".to_string());
        assert_eq!(wind.extract(&r), Some(Value::Wind(Wind { speed: Some(5.0), direction: Some("NW".to_string()) })));

        r.wind_speed = None;
        assert_eq!(wind.extract(&r), Some(Value::Wind(Wind { speed: None, direction: Some("NW".to_string()) })));
    }

    #[test]
    fn test_extract_missing_fields_are_null() {
        let r = record();
        for id in [MetricId::Temperature, MetricId::Wind, MetricId::PrecipitationChance, MetricId::Conditions, MetricId::SnowLevel] {
            assert_eq!(metric(id, UnitSystem::Imperial).extract(&r), None, "{} should be null", id);
        }
        assert_eq!(metric(MetricId::SnowAmount, UnitSystem::Imperial).extract(&r), Some(Value::Number(0.0)));
    }

    #[test]
    fn test_format_temperature() {
        let v = Value::Number(33.0);
        assert_eq!(metric(MetricId::Temperature, UnitSystem::Imperial).format(Some(&v)), "33°F");
        assert_eq!(metric(MetricId::Temperature, UnitSystem::Metric).format(Some(&v)), "1°C");
        assert_eq!(metric(MetricId::Temperature, UnitSystem::Metric).format(Some(&Value::Number(-4.0))), "-20°C");
        assert_eq!(metric(MetricId::Temperature, UnitSystem::Imperial).format(None), PLACEHOLDER);
    }

    #[test]
    fn test_format_wind() {
        let v = Value::Wind(Wind { speed: Some(15.0), direction: Some("SW".to_string()) });
        assert_eq!(metric(MetricId::Wind, UnitSystem::Imperial).format(Some(&v)), "15 mph SW");
        assert_eq!(metric(MetricId::Wind, UnitSystem::Metric).format(Some(&v)), "24 km/h SW");

        let calm = Value::Wind(Wind { speed: None, direction: None });
        assert_eq!(metric(MetricId::Wind, UnitSystem::Imperial).format(Some(&calm)), PLACEHOLDER);
    }

    #[test]
    fn test_format_snow_level() {
        let v = Value::Number(6600.0);
        assert_eq!(metric(MetricId::SnowLevel, UnitSystem::Imperial).format(Some(&v)), "6,600 ft");
        assert_eq!(metric(MetricId::SnowLevel, UnitSystem::Metric).format(Some(&v)), "2,012 m");
        assert_eq!(metric(MetricId::SnowLevel, UnitSystem::Imperial).format(Some(&Value::Number(0.0))), "0 ft");
    }

    #[test]
    fn test_format_amounts() {
        let v = Value::Number(25.4);
        assert_eq!(metric(MetricId::SnowAmount, UnitSystem::Imperial).format(Some(&v)), "1.0\"");
        assert_eq!(metric(MetricId::SnowAmount, UnitSystem::Metric).format(Some(&v)), "2.5 cm");
        assert_eq!(metric(MetricId::RainAmount, UnitSystem::Imperial).format(Some(&v)), "1.00\"");
        assert_eq!(metric(MetricId::RainAmount, UnitSystem::Metric).format(Some(&v)), "25.4 mm");
    }

    #[test]
    fn test_format_percent() {
        let v = Value::Number(42.5);
        assert_eq!(metric(MetricId::PrecipitationChance, UnitSystem::Imperial).format(Some(&v)), "43%");
        assert_eq!(metric(MetricId::PrecipitationChance, UnitSystem::Metric).format(Some(&v)), "43%");
    }

    #[test]
    fn test_condition_icon_priority() {
        assert_eq!(condition_icon("Chance Showers And Thunderstorms"), Some("⛈️"));
        assert_eq!(condition_icon("Blizzard"), Some("🌬️"));
        assert_eq!(condition_icon("Rain And Snow"), Some("🌨️"));
        assert_eq!(condition_icon("Freezing Drizzle"), Some("🧊"));
        assert_eq!(condition_icon("Chance Freezing Rain"), Some("🧊"));
        assert_eq!(condition_icon("Sleet"), Some("🧊"));
        assert_eq!(condition_icon("Freezing Fog"), Some("🌫️"));
        assert_eq!(condition_icon("Snow Showers Likely"), Some("❄️"));
        assert_eq!(condition_icon("Rain Showers"), Some("🌧️"));
        assert_eq!(condition_icon("Patchy Fog"), Some("🌫️"));
        assert_eq!(condition_icon("Partly Sunny"), Some("⛅"));
        assert_eq!(condition_icon("Mostly Cloudy"), Some("🌥️"));
        assert_eq!(condition_icon("Cloudy"), Some("☁️"));
        assert_eq!(condition_icon("Mostly Clear"), Some("☀️"));
        assert_eq!(condition_icon("Breezy"), Some("💨"));
        assert_eq!(condition_icon("Haze"), None);
    }

    #[test]
    fn test_format_conditions_falls_back_to_text() {
        let c = metric(MetricId::Conditions, UnitSystem::Metric);
        assert_eq!(c.format(Some(&Value::Text("Sunny".to_string()))), "☀️");
        assert_eq!(c.format(Some(&Value::Text("Haze".to_string()))), "Haze");
    }

    #[test]
    fn test_group_thousands() {
        assert_eq!(group_thousands(0), "0");
        assert_eq!(group_thousands(999), "999");
        assert_eq!(group_thousands(1000), "1,000");
        assert_eq!(group_thousands(10000), "10,000");
        assert_eq!(group_thousands(1234567), "1,234,567");
        assert_eq!(group_thousands(-3048), "-3,048");
    }

    #[test]
    fn test_unit_system_from_str() {
        assert_eq!("Metric".parse::<UnitSystem>(), Ok(UnitSystem::Metric));
        assert_eq!("imperial".parse::<UnitSystem>(), Ok(UnitSystem::Imperial));
        assert!("kelvin".parse::<UnitSystem>().is_err());
    }
}
