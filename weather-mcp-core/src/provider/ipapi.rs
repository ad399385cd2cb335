//! IP geolocation through ip-api.com. No API key required.

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::Deserialize;
use std::time::Duration;

use crate::{
    error::{Result, WeatherError},
    model::{IpQuery, LocationInfo},
};

use super::{GeoSource, build_http};

const PROVIDER: &str = "ip-api.com";

#[derive(Debug, Clone)]
pub struct IpApiClient {
    base_url: Url,
    http: Client,
}

impl IpApiClient {
    pub fn with_base_url(base_url: &str, timeout: Duration, user_agent: &str) -> Result<Self> {
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised).map_err(|e| {
            WeatherError::InvalidInput(format!("invalid ip-api base URL '{base_url}': {e}"))
        })?;

        Ok(Self { base_url, http: build_http(timeout, user_agent)? })
    }

    /// `{base}/{ip}` for an explicit address, `{base}/` to let the service use the caller's.
    fn url_for(&self, query: &IpQuery) -> Result<Url> {
        let mut url = self.base_url.clone();
        if let Some(ip) = query.as_address() {
            url.path_segments_mut()
                .map_err(|()| WeatherError::InvalidInput("ip-api base URL cannot have a path".into()))?
                .pop_if_empty()
                .push(ip);
        }
        Ok(url)
    }
}

/// ip-api.com answers 200 for lookups it could not resolve, with `status = "fail"`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IpApiResponse {
    status: String,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    query: String,
    #[serde(default)]
    city: String,
    #[serde(default)]
    region_name: String,
    #[serde(default)]
    country: String,
    #[serde(default)]
    lat: Option<f64>,
    #[serde(default)]
    lon: Option<f64>,
    #[serde(default)]
    timezone: String,
}

fn describe(query: &IpQuery) -> String {
    query.as_address().unwrap_or("your IP address").to_string()
}

impl IpApiResponse {
    fn into_location(self, query: &IpQuery) -> Result<LocationInfo> {
        if self.status != "success" {
            let message = self.message.unwrap_or_else(|| "Unknown error".to_string());
            tracing::warn!(ip = %describe(query), %message, "IP location failed");

            return Err(if message.eq_ignore_ascii_case("invalid query") {
                WeatherError::InvalidInput(format!("'{}' is not a valid IP address.", describe(query)))
            } else {
                WeatherError::InvalidLocation { query: format!("{} ({message})", describe(query)) }
            });
        }

        let (Some(lat), Some(lon)) = (self.lat, self.lon) else {
            return Err(WeatherError::InvalidLocation { query: describe(query) });
        };

        let ip = if self.query.is_empty() {
            query.as_address().unwrap_or_default().to_string()
        } else {
            self.query
        };

        Ok(LocationInfo {
            city: self.city,
            region: self.region_name,
            country: self.country,
            lat,
            lon,
            timezone: self.timezone,
            ip,
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

#[async_trait]
impl GeoSource for IpApiClient {
    async fn fetch_ip_location(&self, query: &IpQuery) -> Result<LocationInfo> {
        let url = self.url_for(query)?;
        tracing::debug!(ip = %describe(query), "requesting {PROVIDER}");

        let res = self.http.get(url).send().await.map_err(network_error)?;

        let status = res.status();
        let body = res.text().await.map_err(network_error)?;

        if !status.is_success() {
            tracing::warn!(status = status.as_u16(), "{PROVIDER} request failed");
            return Err(WeatherError::from_status(status.as_u16(), &describe(query), &body, false));
        }

        let parsed: IpApiResponse = serde_json::from_str(&body).map_err(|source| {
            WeatherError::Decode { context: PROVIDER.to_string(), source }
        })?;

        parsed.into_location(query)
    }
}
