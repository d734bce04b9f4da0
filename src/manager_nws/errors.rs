use thiserror::Error;

#[derive(Error, Debug)]
pub enum NwsError {
    #[error("http request error: {0}")]
    Request(#[from] ureq::Error),
    #[error("json document error: {0}")]
    Document(#[from] serde_json::Error),
    #[error("no forecast for {0}")]
    NoForecast(String),
}
