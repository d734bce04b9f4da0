use std::fmt;
use std::fmt::Formatter;
use thiserror::Error;

#[derive(Error, Debug)]
#[error("ConfigError: {0}")]
pub struct ConfigError(pub String);

impl From<&str> for ConfigError {
    fn from(e: &str) -> Self { ConfigError(e.to_string()) }
}
impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self { ConfigError(e.to_string()) }
}
impl From<toml::de::Error> for ConfigError {
    fn from(e: toml::de::Error) -> Self { ConfigError(e.to_string()) }
}

#[derive(Error, Debug)]
#[error("LoggingError: {0}")]
pub struct LoggingError(pub String);

impl From<std::io::Error> for LoggingError {
    fn from(e: std::io::Error) -> Self { LoggingError(e.to_string()) }
}
impl From<log4rs::config::runtime::ConfigErrors> for LoggingError {
    fn from(e: log4rs::config::runtime::ConfigErrors) -> Self { LoggingError(e.to_string()) }
}
impl From<log::SetLoggerError> for LoggingError {
    fn from(e: log::SetLoggerError) -> Self { LoggingError(e.to_string()) }
}

pub struct InitError(pub String);

impl fmt::Display for InitError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "InitError: {}", self.0)
    }
}
impl fmt::Debug for InitError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "InitError: {}", self.0)
    }
}
impl std::error::Error for InitError {}
impl From<ConfigError> for InitError {
    fn from(e: ConfigError) -> Self { InitError(e.to_string()) }
}
impl From<LoggingError> for InitError {
    fn from(e: LoggingError) -> Self { InitError(e.to_string()) }
}
