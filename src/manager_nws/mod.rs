pub mod errors;

use std::time::Duration;
use chrono::Utc;
use log::{debug, info, warn};
use serde::de::DeserializeOwned;
use ureq::Agent;
use crate::cache::{cache_key, ForecastCache};
use crate::config::ForecastParameters;
use crate::forecast::ForecastInput;
use crate::intervals::parse_interval;
use crate::manager_nws::errors::NwsError;
use crate::models::hourly::{HourlyRecord, IntervalEntry};
use crate::models::nws::{GridData, GridSeries, HourlyForecast, Points};
use crate::retry;

const REQUEST_DOMAIN: &str = "https://api.weather.gov";

/// Struct for fetching hourly forecasts and grid data from the National Weather Service
pub struct Nws {
    agent: Agent,
    user_agent: String,
    max_retries: usize,
}

impl Nws {
    /// Returns a new instance of the Nws struct
    ///
    /// # Arguments
    ///
    /// * 'config' - forecast configuration parameters
    pub fn new(config: &ForecastParameters) -> Nws {
        let agent_config = Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(config.timeout_secs)))
            .build();

        let agent = agent_config.into();

        Nws { agent, user_agent: config.user_agent.clone(), max_retries: config.max_retries }
    }

    /// Returns the forecast input for a point, from the cache if a valid entry exists
    /// and otherwise from the weather API in which case the cache is updated.
    ///
    /// # Arguments
    ///
    /// * 'cache' - cache shared by all fetches
    /// * 'lat' - latitude of the point
    /// * 'long' - longitude of the point
    pub fn get_forecast(&self, cache: &ForecastCache<ForecastInput>, lat: f64, long: f64) -> Result<ForecastInput, NwsError> {
        let key = cache_key(lat, long);
        if let Some(input) = cache.get(&key, Utc::now()) {
            debug!("using cached forecast for {}", key);
            return Ok(input);
        }

        let input = self.fetch_forecast(lat, long)?;
        cache.insert(&key, input.clone(), Utc::now());

        Ok(input)
    }

    /// Retrieves the hourly forecast and the snowfall and precipitation series for a point.
    ///
    /// The points endpoint is asked first since it knows which grid office and grid
    /// coordinates serve the point, then the hourly forecast and the grid data are
    /// retrieved from the URLs it gives.
    ///
    /// # Arguments
    ///
    /// * 'lat' - latitude of the point
    /// * 'long' - longitude of the point
    pub fn fetch_forecast(&self, lat: f64, long: f64) -> Result<ForecastInput, NwsError> {
        let points: Points = self.get_document(&format!("{}/points/{}", REQUEST_DOMAIN, cache_key(lat, long)))?;
        let hourly: HourlyForecast = self.get_document(&points.properties.forecast_hourly)?;
        let grid: GridData = self.get_document(&points.properties.forecast_grid_data)?;

        let input = ForecastInput {
            hourly: to_hourly_records(&hourly),
            snow: to_interval_entries(grid.properties.snowfall_amount.as_ref()),
            precipitation: to_interval_entries(grid.properties.quantitative_precipitation.as_ref()),
        };

        if input.hourly.is_empty() {
            return Err(NwsError::NoForecast(cache_key(lat, long)));
        }

        info!("fetched {} hours of forecast for {}", input.hourly.len(), cache_key(lat, long));
        Ok(input)
    }

    /// Sends a GET request and deserializes the returned json document
    ///
    /// # Arguments
    ///
    /// * 'url' - the URL to get
    fn get_document<T: DeserializeOwned>(&self, url: &str) -> Result<T, NwsError> {
        let json = retry!(|| self.get_request(url), self.max_retries)?;

        Ok(serde_json::from_str(&json)?)
    }

    fn get_request(&self, url: &str) -> Result<String, NwsError> {
        debug!("GET {}", url);
        let json = self.agent
            .get(url)
            .header("User-Agent", self.user_agent.as_str())
            .header("Accept", "application/geo+json")
            .call()?
            .body_mut()
            .read_to_string()?;

        Ok(json)
    }
}

/// Transforms the periods of an hourly forecast document to hourly records in
/// ascending order. Temperatures given in Celsius are converted to Fahrenheit.
///
/// # Arguments
///
/// * 'forecast' - the hourly forecast document
pub fn to_hourly_records(forecast: &HourlyForecast) -> Vec<HourlyRecord> {
    let mut records = forecast.properties.periods
        .iter()
        .map(|p| {
            let temperature = match p.temperature_unit.as_deref() {
                Some("C") => p.temperature.map(|c| c * 9.0 / 5.0 + 32.0),
                _ => p.temperature,
            };

            HourlyRecord {
                start_time: p.start_time,
                temperature,
                wind_speed: p.wind_speed.clone(),
                wind_direction: p.wind_direction.clone(),
                precipitation_chance: p.probability_of_precipitation.as_ref().and_then(|q| q.value),
                short_forecast: p.short_forecast.clone(),
                snowfall_mm: 0.0,
                precipitation_mm: 0.0,
            }
        })
        .collect::<Vec<HourlyRecord>>();

    records.sort_by_key(|r| r.start_time);
    records
}

/// Transforms a grid data series to interval entries with values in millimeters.
/// Entries with an unparseable start time are skipped, a missing series gives no entries.
///
/// # Arguments
///
/// * 'series' - the series, e.g. snowfallAmount
pub fn to_interval_entries(series: Option<&GridSeries>) -> Vec<IntervalEntry> {
    let Some(series) = series else {
        return Vec::new();
    };

    let factor = match series.uom.as_deref() {
        None | Some("wmoUnit:mm") => 1.0,
        Some("wmoUnit:cm") => 10.0,
        Some("wmoUnit:m") => 1000.0,
        Some(other) => {
            warn!("unexpected unit '{}', treating values as millimeters", other);
            1.0
        }
    };

    series.values
        .iter()
        .filter_map(|v| parse_interval(&v.valid_time, v.value.map(|x| x * factor)))
        .collect()
}
