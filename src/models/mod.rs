pub mod hourly;
pub mod nws;
