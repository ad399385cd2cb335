//! Input checks that run before any request leaves the process.

use crate::error::{Result, WeatherError};

/// Smallest forecast horizon the provider serves.
pub const MIN_FORECAST_DAYS: u8 = 1;
/// Largest horizon available on WeatherAPI's free tier.
pub const MAX_FORECAST_DAYS: u8 = 3;

/// Ensure a WeatherAPI key is present and return it trimmed. The key's format is not checked.
pub fn validate_api_key(key: Option<&str>) -> Result<&str> {
    match key {
        Some(k) if !k.trim().is_empty() => Ok(k.trim()),
        _ => Err(WeatherError::MissingCredential),
    }
}

/// Clamp a requested forecast horizon into `[1, 3]`. Never fails.
pub fn limit_forecast_days(requested: i64) -> u8 {
    requested.clamp(i64::from(MIN_FORECAST_DAYS), i64::from(MAX_FORECAST_DAYS)) as u8
}

/// Reject empty IP strings; anything else is left for the provider to judge.
pub fn validate_ip(ip: &str) -> Result<&str> {
    let ip = ip.trim();
    if ip.is_empty() {
        return Err(WeatherError::InvalidInput(
            "IP address is required to fetch location.".to_string(),
        ));
    }
    Ok(ip)
}
