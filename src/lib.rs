pub mod aggregation;
pub mod cache;
pub mod config;
pub mod errors;
pub mod forecast;
pub mod intervals;
pub mod logging;
pub mod manager_nws;
pub mod merge;
pub mod metrics;
pub mod models;
pub mod slots;
pub mod table;

/// Number of attempts the retry macro makes before giving up
pub const MAX_RETRIES: usize = 3;

/// Pause between retry attempts in milliseconds
pub const RETRY_DELAY_MS: u64 = 2000;

/// Calls a fallible closure until it succeeds or the number of attempts is exhausted.
/// The last error is returned if all attempts fail.
///
/// # Arguments
///
/// * 'f' - closure returning a Result
/// * 'max' - optional max number of attempts, defaults to MAX_RETRIES
#[macro_export]
macro_rules! retry {
    ($f:expr) => {
        $crate::retry!($f, $crate::MAX_RETRIES)
    };
    ($f:expr, $max:expr) => {{
        let mut attempt: usize = 1;
        loop {
            match ($f)() {
                Ok(v) => break Ok(v),
                Err(e) => {
                    if attempt >= $max {
                        break Err(e);
                    }
                    log::warn!("attempt {} of {} failed: {}", attempt, $max, e);
                    attempt += 1;
                    std::thread::sleep(std::time::Duration::from_millis($crate::RETRY_DELAY_MS));
                }
            }
        }
    }};
}
