use serde::Deserialize;
use chrono::{DateTime, FixedOffset};

#[derive(Deserialize)]
pub struct PointsProperties {
    #[serde(rename = "forecastHourly")]
    pub forecast_hourly: String,
    #[serde(rename = "forecastGridData")]
    pub forecast_grid_data: String,
}

#[derive(Deserialize)]
pub struct Points {
    pub properties: PointsProperties,
}

#[derive(Deserialize, Debug)]
pub struct QuantitativeValue {
    #[serde(rename = "unitCode", default)]
    pub unit_code: Option<String>,
    pub value: Option<f64>,
}

#[derive(Deserialize, Debug)]
pub struct Period {
    #[serde(rename = "startTime")]
    pub start_time: DateTime<FixedOffset>,
    #[serde(default)]
    pub temperature: Option<f64>,
    #[serde(rename = "temperatureUnit", default)]
    pub temperature_unit: Option<String>,
    #[serde(rename = "windSpeed", default)]
    pub wind_speed: Option<String>,
    #[serde(rename = "windDirection", default)]
    pub wind_direction: Option<String>,
    #[serde(rename = "probabilityOfPrecipitation", default)]
    pub probability_of_precipitation: Option<QuantitativeValue>,
    #[serde(rename = "shortForecast", default)]
    pub short_forecast: String,
}

#[derive(Deserialize)]
pub struct HourlyProperties {
    pub periods: Vec<Period>,
}

#[derive(Deserialize)]
pub struct HourlyForecast {
    pub properties: HourlyProperties,
}

#[derive(Deserialize, Debug)]
pub struct GridValue {
    #[serde(rename = "validTime")]
    pub valid_time: String,
    pub value: Option<f64>,
}

#[derive(Deserialize, Debug)]
pub struct GridSeries {
    #[serde(default)]
    pub uom: Option<String>,
    #[serde(default)]
    pub values: Vec<GridValue>,
}

#[derive(Deserialize)]
pub struct GridProperties {
    #[serde(rename = "snowfallAmount", default)]
    pub snowfall_amount: Option<GridSeries>,
    #[serde(rename = "quantitativePrecipitation", default)]
    pub quantitative_precipitation: Option<GridSeries>,
}

#[derive(Deserialize)]
pub struct GridData {
    pub properties: GridProperties,
}
