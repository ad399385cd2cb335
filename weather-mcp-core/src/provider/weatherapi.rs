use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::{Client, Url};
use serde::{Deserialize, de::DeserializeOwned};
use std::time::Duration;

use crate::{
    error::{Result, WeatherError},
    model::{CurrentWeather, Forecast, ForecastDay, LocationSpec, Place},
    validate::validate_api_key,
};

use super::{WeatherPayload, WeatherSource, build_http};

const PROVIDER: &str = "WeatherAPI.com";

/// Client for WeatherAPI.com's `forecast.json` and `search.json` endpoints.
#[derive(Debug, Clone)]
pub struct WeatherApiClient {
    api_key: Option<String>,
    base_url: Url,
    http: Client,
}

impl WeatherApiClient {
    /// Point the client at another host, e.g. a mock server in tests.
    pub fn with_base_url(
        api_key: Option<String>,
        base_url: &str,
        timeout: Duration,
        user_agent: &str,
    ) -> Result<Self> {
        // Trailing slash so `join` appends instead of replacing the last segment.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised).map_err(|e| {
            WeatherError::InvalidInput(format!("invalid WeatherAPI base URL '{base_url}': {e}"))
        })?;

        Ok(Self { api_key, base_url, http: build_http(timeout, user_agent)? })
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        query: &str,
        extra: &[(&str, String)],
    ) -> Result<T> {
        // Fail closed before anything touches the network.
        let key = validate_api_key(self.api_key.as_deref())?;

        let url = self.base_url.join(endpoint).map_err(|e| {
            WeatherError::InvalidInput(format!("invalid WeatherAPI endpoint '{endpoint}': {e}"))
        })?;

        tracing::debug!(endpoint, q = query, "requesting {PROVIDER}");

        let res = self
            .http
            .get(url)
            .query(&[("key", key), ("q", query)])
            .query(extra)
            .send()
            .await
            .map_err(network_error)?;

        let status = res.status();
        let body = res.text().await.map_err(network_error)?;

        if !status.is_success() {
            let err = WeatherError::from_status(status.as_u16(), query, &body, true);
            tracing::warn!(endpoint, q = query, status = status.as_u16(), "{PROVIDER} request failed");
            return Err(err);
        }

        serde_json::from_str(&body).map_err(|source| WeatherError::Decode {
            context: format!("{PROVIDER} {endpoint}"),
            source,
        })
    }
}

fn network_error(e: reqwest::Error) -> WeatherError {
    if e.is_timeout() {
        WeatherError::NetworkError(format!("{PROVIDER} (request timed out)"))
    } else {
        WeatherError::NetworkError(format!("{PROVIDER}: {e}"))
    }
}

#[derive(Debug, Deserialize)]
struct WaLocation {
    #[serde(default)]
    name: String,
    #[serde(default)]
    region: String,
    #[serde(default)]
    country: String,
    #[serde(default)]
    localtime: String,
}

impl From<WaLocation> for Place {
    fn from(l: WaLocation) -> Self {
        Place { name: l.name, region: l.region, country: l.country, local_time: l.localtime }
    }
}

#[derive(Debug, Deserialize)]
struct WaCondition {
    text: String,
}

#[derive(Debug, Deserialize)]
struct WaCurrent {
    last_updated: String,
    temp_c: f64,
    feelslike_c: f64,
    humidity: u8,
    pressure_mb: f64,
    wind_kph: f64,
    wind_dir: String,
    uv: f64,
    vis_km: f64,
    condition: WaCondition,
}

#[derive(Debug, Deserialize)]
struct WaDay {
    maxtemp_c: f64,
    mintemp_c: f64,
    avgtemp_c: f64,
    avghumidity: f64,
    maxwind_kph: f64,
    daily_chance_of_rain: u8,
    uv: f64,
    condition: WaCondition,
}

#[derive(Debug, Deserialize)]
struct WaForecastDay {
    date: NaiveDate,
    day: WaDay,
}

#[derive(Debug, Default, Deserialize)]
struct WaForecast {
    forecastday: Vec<WaForecastDay>,
}

#[derive(Debug, Deserialize)]
struct WaForecastResponse {
    location: WaLocation,
    current: WaCurrent,
    #[serde(default)]
    forecast: WaForecast,
}

#[derive(Debug, Deserialize)]
struct WaSearchHit {
    #[serde(default)]
    name: String,
    #[serde(default)]
    region: String,
    #[serde(default)]
    country: String,
}

impl From<WaForecastDay> for ForecastDay {
    fn from(d: WaForecastDay) -> Self {
        ForecastDay {
            date: d.date,
            condition: d.day.condition.text,
            max_temp_c: d.day.maxtemp_c,
            min_temp_c: d.day.mintemp_c,
            avg_temp_c: d.day.avgtemp_c,
            humidity_pct: d.day.avghumidity,
            max_wind_kph: d.day.maxwind_kph,
            chance_of_rain_pct: d.day.daily_chance_of_rain,
            uv_index: d.day.uv,
        }
    }
}

impl From<WaForecastResponse> for WeatherPayload {
    fn from(parsed: WaForecastResponse) -> Self {
        let place = Place::from(parsed.location);
        let c = parsed.current;

        WeatherPayload {
            current: CurrentWeather {
                place: place.clone(),
                last_updated: c.last_updated,
                condition: c.condition.text,
                temperature_c: c.temp_c,
                feels_like_c: c.feelslike_c,
                humidity_pct: c.humidity,
                pressure_mb: c.pressure_mb,
                wind_kph: c.wind_kph,
                wind_dir: c.wind_dir,
                uv_index: c.uv,
                visibility_km: c.vis_km,
            },
            forecast: Forecast {
                place,
                days: parsed.forecast.forecastday.into_iter().map(ForecastDay::from).collect(),
            },
        }
    }
}

#[async_trait]
impl WeatherSource for WeatherApiClient {
    async fn fetch_weather(&self, spec: &LocationSpec, days: u8) -> Result<WeatherPayload> {
        let parsed: WaForecastResponse = self
            .get_json(
                "forecast.json",
                &spec.to_query(),
                &[
                    ("days", days.to_string()),
                    ("aqi", "no".to_string()),
                    ("alerts", "no".to_string()),
                ],
            )
            .await?;

        Ok(parsed.into())
    }

    async fn search_places(&self, lat: f64, lon: f64) -> Result<Vec<Place>> {
        let query = format!("{lat},{lon}");
        let hits: Vec<WaSearchHit> = self.get_json("search.json", &query, &[]).await?;

        Ok(hits
            .into_iter()
            .map(|h| Place { name: h.name, region: h.region, country: h.country, ..Place::default() })
            .collect())
    }
}
