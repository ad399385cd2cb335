use async_trait::async_trait;
use std::fmt::Debug;

use crate::{
    Config, CurrentWeather, Forecast, IpQuery, LocationInfo, LocationSpec, Place, Result,
    provider::{ipapi::IpApiClient, weatherapi::WeatherApiClient},
};

pub mod ipapi;
pub mod weatherapi;

/// Everything a single WeatherAPI forecast call returns, already mapped onto the model.
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherPayload {
    pub current: CurrentWeather,
    pub forecast: Forecast,
}

/// Upstream weather data keyed by a [`LocationSpec`].
#[async_trait]
pub trait WeatherSource: Send + Sync + Debug {
    /// One request for `days` (already clamped) of data about `spec`.
    async fn fetch_weather(&self, spec: &LocationSpec, days: u8) -> Result<WeatherPayload>;

    /// Places near a coordinate pair, best match first.
    async fn search_places(&self, lat: f64, lon: f64) -> Result<Vec<Place>>;
}

/// Upstream IP geolocation.
#[async_trait]
pub trait GeoSource: Send + Sync + Debug {
    async fn fetch_ip_location(&self, query: &IpQuery) -> Result<LocationInfo>;
}

/// Build both upstream clients from config.
///
/// A missing WeatherAPI key does not fail here; it is reported by every
/// weather call before a request is sent.
pub fn sources_from_config(config: &Config) -> Result<(WeatherApiClient, IpApiClient)> {
    let weather = WeatherApiClient::with_base_url(
        config.weatherapi.api_key.clone(),
        &config.weatherapi.base_url,
        config.timeout(),
        &config.user_agent,
    )?;
    let geo =
        IpApiClient::with_base_url(&config.geolocation.base_url, config.timeout(), &config.user_agent)?;
    Ok((weather, geo))
}

pub(crate) fn build_http(
    timeout: std::time::Duration,
    user_agent: &str,
) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(user_agent)
        .build()
        .map_err(|e| crate::WeatherError::NetworkError(format!("HTTP client setup: {e}")))
}
