use std::env;
use chrono::TimeDelta;
use log::info;
use resortcast::cache::ForecastCache;
use resortcast::config::{load_config, Config};
use resortcast::errors::InitError;
use resortcast::forecast::ForecastInput;
use resortcast::logging::setup_logger;
use resortcast::manager_nws::Nws;
use resortcast::metrics::UnitSystem;

const DEFAULT_CONFIG: &str = "config.toml";

/// Managers and caller owned state shared by all refresh cycles
pub struct Mgr {
    pub nws: Nws,
    pub cache: ForecastCache<ForecastInput>,
}

/// Command line arguments
#[derive(Debug, PartialEq)]
pub struct Args {
    pub config_path: Option<String>,
    pub units: Option<UnitSystem>,
    pub json: bool,
}

/// Parses command line arguments, i.e. an optional config path and the flags
/// '--metric', '--imperial' and '--json'
///
/// # Arguments
///
/// * 'args' - arguments excluding the program name
pub fn parse_args(args: &[String]) -> Result<Args, InitError> {
    let mut result = Args { config_path: None, units: None, json: false };

    for arg in args {
        match arg.as_str() {
            "--metric" => result.units = Some(UnitSystem::Metric),
            "--imperial" => result.units = Some(UnitSystem::Imperial),
            "--json" => result.json = true,
            a if a.starts_with("--") => return Err(InitError(format!("unknown option '{}'", a))),
            a if result.config_path.is_none() => result.config_path = Some(a.to_string()),
            a => return Err(InitError(format!("unexpected argument '{}'", a))),
        }
    }

    Ok(result)
}

/// Loads configuration, sets up logging and returns configuration, managers, the unit
/// system to display values in and whether to print json instead of tables
///
pub fn init() -> Result<(Config, Mgr, UnitSystem, bool), InitError> {
    let args = parse_args(&env::args().skip(1).collect::<Vec<String>>())?;

    let config_path = args.config_path
        .or_else(|| env::var("RESORTCAST_CONFIG").ok())
        .unwrap_or(DEFAULT_CONFIG.to_string());

    let config = load_config(&config_path)?;
    setup_logger(&config.general)?;

    info!("resortcast version: {}", env!("CARGO_PKG_VERSION"));
    info!("monitoring {} locations", config.locations.len());

    let units = args.units.unwrap_or(config.forecast.units);

    let mgr = Mgr {
        nws: Nws::new(&config.forecast),
        cache: ForecastCache::new(TimeDelta::minutes(config.forecast.cache_ttl_minutes)),
    };

    Ok((config, mgr, units, args.json))
}
