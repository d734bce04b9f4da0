use log4rs::append::console::ConsoleAppender;
use log4rs::append::file::FileAppender;
use log4rs::config::{Appender, Config as LogConfig, Root};
use log4rs::encode::pattern::PatternEncoder;
use log4rs::Handle;
use crate::config::General;
use crate::errors::LoggingError;

const LOG_PATTERN: &str = "{d(%Y-%m-%d %H:%M:%S)} {l} {t} - {m}{n}";

const LOG_FILE: &str = "resortcast.log";

/// Builds the log4rs configuration from the general section of the config file.
/// Logs always go to file, and to stdout as well if so configured.
///
/// # Arguments
///
/// * 'general' - general configuration parameters
pub fn log_config(general: &General) -> Result<LogConfig, LoggingError> {
    let file = FileAppender::builder()
        .encoder(Box::new(PatternEncoder::new(LOG_PATTERN)))
        .build(format!("{}{}", general.log_path, LOG_FILE))?;

    let mut builder = LogConfig::builder()
        .appender(Appender::builder().build("file", Box::new(file)));
    let mut root = Root::builder().appender("file");

    if general.log_to_stdout {
        let stdout = ConsoleAppender::builder()
            .encoder(Box::new(PatternEncoder::new(LOG_PATTERN)))
            .build();
        builder = builder.appender(Appender::builder().build("stdout", Box::new(stdout)));
        root = root.appender("stdout");
    }

    Ok(builder.build(root.build(general.log_level))?)
}

/// Sets up logging, must only be called once
///
/// # Arguments
///
/// * 'general' - general configuration parameters
pub fn setup_logger(general: &General) -> Result<Handle, LoggingError> {
    let config = log_config(general)?;

    Ok(log4rs::init_config(config)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use log::LevelFilter;

    fn general(log_to_stdout: bool) -> General {
        let dir = std::env::temp_dir();
        General {
            log_path: format!("{}/", dir.display()),
            log_level: LevelFilter::Info,
            log_to_stdout,
            refresh_minutes: None,
        }
    }

    #[test]
    fn test_log_config_appenders() {
        let config = log_config(&general(true)).unwrap();
        assert_eq!(config.appenders().len(), 2);
        assert_eq!(config.root().level(), LevelFilter::Info);

        let config = log_config(&general(false)).unwrap();
        assert_eq!(config.appenders().len(), 1);
    }

    #[test]
    fn test_log_config_bad_path() {
        let mut g = general(false);
        g.log_path = "/nonexistent/dir/\0/".to_string();
        assert!(log_config(&g).is_err());
    }
}
