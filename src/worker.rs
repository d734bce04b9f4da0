use std::thread;
use std::time::Duration;
use chrono::{DateTime, FixedOffset, Local, Utc};
use log::{error, info};
use resortcast::config::{Config, Location};
use resortcast::forecast::{build_forecast_at, ForecastGrid, ForecastInput};
use resortcast::metrics::UnitSystem;
use resortcast::table::render_table;
use crate::initialization::Mgr;

/// Outcome of fetching one location
pub type Settled = (Location, Result<ForecastInput, String>);

/// Fetches all locations in parallel. A failing location doesn't affect the others and
/// outcomes are returned in the same order as the given locations.
///
/// # Arguments
///
/// * 'mgr' - managers and cache
/// * 'locations' - locations to fetch forecasts for
pub fn fetch_all(mgr: &Mgr, locations: &[Location]) -> Vec<Settled> {
    thread::scope(|s| {
        let handles = locations
            .iter()
            .map(|l| (l, s.spawn(move || mgr.nws.get_forecast(&mgr.cache, l.lat, l.long).map_err(|e| e.to_string()))))
            .collect::<Vec<_>>();

        handles
            .into_iter()
            .map(|(location, handle)| {
                let outcome = handle.join().unwrap_or_else(|_| Err("fetch thread panicked".to_string()));
                (location.clone(), outcome)
            })
            .collect()
    })
}

/// Builds one grid per outcome, in outcome order. A failed location gets a grid with all
/// slots null, anchored to the first location with data or to the current time.
///
/// # Arguments
///
/// * 'settled' - fetch outcomes
/// * 'units' - unit system to display values in
/// * 'now' - current time, used as anchor if no location has data
pub fn build_grids(settled: &[Settled], units: UnitSystem, now: DateTime<FixedOffset>) -> Vec<(&str, ForecastGrid)> {
    let anchor = settled
        .iter()
        .find_map(|(_, outcome)| outcome.as_ref().ok().and_then(|i| i.hourly.first()).map(|r| r.start_time))
        .unwrap_or(now);

    settled
        .iter()
        .map(|(location, outcome)| {
            let grid = match outcome {
                Ok(input) => build_forecast_at(input, &anchor, units),
                Err(e) => {
                    error!("failed to get forecast for {}: {}", location.name, e);
                    ForecastGrid::null(&anchor, units)
                }
            };
            (location.name.as_str(), grid)
        })
        .collect()
}

/// Fetches, aggregates and prints forecasts for all configured locations, once or
/// every refresh_minutes if configured. Locations that failed are printed without data.
///
/// # Arguments
///
/// * 'config' - configuration
/// * 'mgr' - managers and cache
/// * 'units' - unit system to display values in
/// * 'json' - print grids as json instead of tables
pub fn run(config: &Config, mgr: &Mgr, units: UnitSystem, json: bool) -> anyhow::Result<()> {
    loop {
        let purged = mgr.cache.purge(Utc::now());
        if purged > 0 {
            info!("purged {} expired forecasts from cache", purged);
        }

        let settled = fetch_all(mgr, &config.locations);
        let failed = settled.iter().filter(|(_, outcome)| outcome.is_err()).count();
        info!("fetched {} locations, {} failed", settled.len() - failed, failed);

        let grids = build_grids(&settled, units, Local::now().fixed_offset());
        print_grids(&grids, json)?;

        match config.general.refresh_minutes {
            Some(minutes) => thread::sleep(Duration::from_secs(minutes * 60)),
            None => return Ok(()),
        }
    }
}

/// Prints grids to stdout, either as tables or as one json document
///
/// # Arguments
///
/// * 'grids' - location names and their grids
/// * 'json' - print as json
fn print_grids(grids: &[(&str, ForecastGrid)], json: bool) -> anyhow::Result<()> {
    if json {
        let document = grids
            .iter()
            .map(|(name, grid)| serde_json::json!({ "location": name, "grid": grid }))
            .collect::<Vec<serde_json::Value>>();
        println!("{}", serde_json::to_string_pretty(&document)?);
    } else {
        println!("Forecast as of {}\n", Local::now().format("%Y-%m-%d %H:%M"));
        for (name, grid) in grids {
            println!("{}", render_table(name, grid));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeDelta;
    use resortcast::metrics::PLACEHOLDER;
    use resortcast::models::hourly::HourlyRecord;
    use resortcast::slots::SLOT_COUNT;

    fn location(name: &str) -> Location {
        Location { name: name.to_string(), lat: 40.5884, long: -111.6386 }
    }

    fn input(start: DateTime<FixedOffset>) -> ForecastInput {
        let hourly = (0..4)
            .map(|h| {
                let mut r = HourlyRecord::new(start + TimeDelta::hours(h));
                r.temperature = Some(25.0);
                r
            })
            .collect();

        ForecastInput { hourly, ..Default::default() }
    }

    #[test]
    fn test_build_grids_keeps_location_order() {
        let start = DateTime::parse_from_rfc3339("2024-01-15T06:00:00-07:00").unwrap();
        let settled = vec![
            (location("Alta"), Err("timeout".to_string())),
            (location("Snowbird"), Ok(input(start))),
            (location("Brighton"), Err("404".to_string())),
        ];

        let grids = build_grids(&settled, UnitSystem::Imperial, Local::now().fixed_offset());

        assert_eq!(grids.iter().map(|(n, _)| *n).collect::<Vec<&str>>(), vec!["Alta", "Snowbird", "Brighton"]);
        assert!(grids.iter().all(|(_, g)| g.slots.len() == SLOT_COUNT));
        assert_eq!(grids[0].1.slots, grids[1].1.slots.iter().cloned().map(|mut s| { s.records.clear(); s }).collect::<Vec<_>>());
        assert!(grids[0].1.metrics.values().flatten().all(|v| v.value.is_none() && v.display == PLACEHOLDER));
        assert_eq!(grids[1].1.values(resortcast::metrics::MetricId::Temperature).unwrap()[0].display, "25°F");
    }

    #[test]
    fn test_build_grids_all_failed() {
        let now = DateTime::parse_from_rfc3339("2024-01-15T17:45:00-07:00").unwrap();
        let settled = vec![(location("Alta"), Err("timeout".to_string()))];

        let grids = build_grids(&settled, UnitSystem::Metric, now);

        assert_eq!(grids[0].1.slots.len(), SLOT_COUNT);
        assert_eq!(grids[0].1.slots[0].start_time, DateTime::parse_from_rfc3339("2024-01-15T16:00:00-07:00").unwrap());
    }
}
