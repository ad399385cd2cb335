//! The tool surface offered to an assistant: parse a named call, run it,
//! and render a single result string.

use serde::Deserialize;
use serde_json::{Value, json};
use std::sync::Arc;

use crate::{
    Config,
    error::{Result, WeatherError},
    format::{
        Style, format_current_location_forecast, format_current_location_info,
        format_current_location_weather, format_current_weather, format_forecast,
        format_location_info,
    },
    location::LocationService,
    model::LocationInfo,
    provider::{GeoSource, WeatherSource, sources_from_config},
    weather::WeatherService,
};

/// Forecast horizon used when a call leaves `days` out.
pub const DEFAULT_FORECAST_DAYS: i64 = 3;

/// Every tool name [`ToolCall::parse`] accepts.
pub const TOOL_NAMES: [&str; 10] = [
    "get_weather_by_city",
    "get_weather_forecast_by_city",
    "get_location_by_ip",
    "get_weather_by_coordinates",
    "get_weather_forecast_by_coordinates",
    "get_location_and_weather_by_ip",
    "get_user_current_location",
    "get_weather_at_current_location",
    "get_forecast_at_current_location",
    "reverse_geocode_coordinates",
];

pub fn default_days() -> i64 {
    DEFAULT_FORECAST_DAYS
}

#[derive(Debug, Deserialize)]
struct CityArgs {
    city: String,
}

#[derive(Debug, Deserialize)]
struct CityForecastArgs {
    city: String,
    #[serde(default = "default_days")]
    days: i64,
}

#[derive(Debug, Deserialize)]
struct IpArgs {
    ip_address: String,
}

#[derive(Debug, Deserialize)]
struct CoordinateArgs {
    lat: f64,
    lon: f64,
}

#[derive(Debug, Deserialize)]
struct CoordinateForecastArgs {
    lat: f64,
    lon: f64,
    #[serde(default = "default_days")]
    days: i64,
}

#[derive(Debug, Deserialize)]
struct DaysArgs {
    #[serde(default = "default_days")]
    days: i64,
}

/// A parsed tool invocation.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolCall {
    WeatherByCity { city: String },
    ForecastByCity { city: String, days: i64 },
    LocationByIp { ip_address: String },
    WeatherByCoordinates { lat: f64, lon: f64 },
    ForecastByCoordinates { lat: f64, lon: f64, days: i64 },
    LocationAndWeatherByIp { ip_address: String },
    AtCurrentLocation(CurrentLocationTool),
    ReverseGeocode { lat: f64, lon: f64 },
}

/// Tools whose location leg is the caller's own IP address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CurrentLocationTool {
    Location,
    Weather,
    Forecast { days: i64 },
}

impl CurrentLocationTool {
    /// Shown instead of the raw error when the caller's location cannot be resolved.
    fn unresolved_message(self) -> &'static str {
        match self {
            CurrentLocationTool::Location => {
                "❌ Sorry, I couldn't determine your current location. \
                 This might be due to network restrictions or VPN usage."
            }
            CurrentLocationTool::Weather => {
                "❌ Sorry, I couldn't determine your current location to get the weather. \
                 You can ask for weather in a specific city instead!"
            }
            CurrentLocationTool::Forecast { .. } => {
                "❌ Sorry, I couldn't determine your current location to get the forecast. \
                 You can ask for forecast in a specific city instead!"
            }
        }
    }
}

fn args<T: for<'de> Deserialize<'de>>(tool: &str, value: Value) -> Result<T> {
    // A call without arguments arrives as `null`; treat it as an empty object.
    let value = if value.is_null() { json!({}) } else { value };
    serde_json::from_value(value)
        .map_err(|e| WeatherError::InvalidInput(format!("bad arguments for {tool}: {e}")))
}

impl ToolCall {
    pub fn parse(name: &str, arguments: Value) -> Result<Self> {
        Ok(match name {
            "get_weather_by_city" => {
                let a: CityArgs = args(name, arguments)?;
                ToolCall::WeatherByCity { city: a.city }
            }
            "get_weather_forecast_by_city" => {
                let a: CityForecastArgs = args(name, arguments)?;
                ToolCall::ForecastByCity { city: a.city, days: a.days }
            }
            "get_location_by_ip" => {
                let a: IpArgs = args(name, arguments)?;
                ToolCall::LocationByIp { ip_address: a.ip_address }
            }
            "get_weather_by_coordinates" => {
                let a: CoordinateArgs = args(name, arguments)?;
                ToolCall::WeatherByCoordinates { lat: a.lat, lon: a.lon }
            }
            "get_weather_forecast_by_coordinates" => {
                let a: CoordinateForecastArgs = args(name, arguments)?;
                ToolCall::ForecastByCoordinates { lat: a.lat, lon: a.lon, days: a.days }
            }
            "get_location_and_weather_by_ip" => {
                let a: IpArgs = args(name, arguments)?;
                ToolCall::LocationAndWeatherByIp { ip_address: a.ip_address }
            }
            "get_user_current_location" => ToolCall::AtCurrentLocation(CurrentLocationTool::Location),
            "get_weather_at_current_location" => {
                ToolCall::AtCurrentLocation(CurrentLocationTool::Weather)
            }
            "get_forecast_at_current_location" => {
                let a: DaysArgs = args(name, arguments)?;
                ToolCall::AtCurrentLocation(CurrentLocationTool::Forecast { days: a.days })
            }
            "reverse_geocode_coordinates" => {
                let a: CoordinateArgs = args(name, arguments)?;
                ToolCall::ReverseGeocode { lat: a.lat, lon: a.lon }
            }
            other => {
                return Err(WeatherError::InvalidInput(format!("Unknown tool '{other}'.")));
            }
        })
    }

    pub fn name(&self) -> &'static str {
        match self {
            ToolCall::WeatherByCity { .. } => "get_weather_by_city",
            ToolCall::ForecastByCity { .. } => "get_weather_forecast_by_city",
            ToolCall::LocationByIp { .. } => "get_location_by_ip",
            ToolCall::WeatherByCoordinates { .. } => "get_weather_by_coordinates",
            ToolCall::ForecastByCoordinates { .. } => "get_weather_forecast_by_coordinates",
            ToolCall::LocationAndWeatherByIp { .. } => "get_location_and_weather_by_ip",
            ToolCall::AtCurrentLocation(CurrentLocationTool::Location) => "get_user_current_location",
            ToolCall::AtCurrentLocation(CurrentLocationTool::Weather) => {
                "get_weather_at_current_location"
            }
            ToolCall::AtCurrentLocation(CurrentLocationTool::Forecast { .. }) => {
                "get_forecast_at_current_location"
            }
            ToolCall::ReverseGeocode { .. } => "reverse_geocode_coordinates",
        }
    }
}

/// Weather and location operations behind the tool names.
#[derive(Debug, Clone)]
pub struct Toolbox {
    weather: WeatherService,
    location: LocationService,
}

impl Toolbox {
    pub fn new(weather: Arc<dyn WeatherSource>, geo: Arc<dyn GeoSource>) -> Self {
        Self {
            weather: WeatherService::new(weather.clone()),
            location: LocationService::new(geo, weather),
        }
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        let (weather, geo) = sources_from_config(config)?;
        Ok(Self::new(Arc::new(weather), Arc::new(geo)))
    }

    /// Parse and run a call. Failures come back as a readable message, never an error.
    pub async fn call(&self, name: &str, arguments: Value) -> ToolOutcome {
        match ToolCall::parse(name, arguments) {
            Ok(call) => self.run(&call).await,
            Err(err) => ToolOutcome::failure(format!("Error: {err}")),
        }
    }

    pub async fn run(&self, call: &ToolCall) -> ToolOutcome {
        let result = match call {
            ToolCall::AtCurrentLocation(tool) => match self.location.user_location().await {
                Ok(info) => self.at_location(*tool, &info).await,
                Err(err) => {
                    tracing::warn!(tool = call.name(), error = %err, "could not resolve caller location");
                    return ToolOutcome::failure(tool.unresolved_message().to_string());
                }
            },
            _ => self.execute(call).await,
        };

        match result {
            Ok(text) => ToolOutcome::success(text),
            Err(err) => {
                tracing::warn!(tool = call.name(), error = %err, "tool call failed");
                ToolOutcome::failure(format!("Error: {err}"))
            }
        }
    }

    /// Run a call, propagating the first failure. Composite tools fail as a whole.
    ///
    /// Unlike [`Self::run`], a failed caller-location lookup is returned as the raw error.
    async fn execute(&self, call: &ToolCall) -> Result<String> {
        match call {
            ToolCall::WeatherByCity { city } => {
                let w = self.weather.current_weather(city).await?;
                Ok(format_current_weather(&w, Style::Plain))
            }
            ToolCall::ForecastByCity { city, days } => {
                let f = self.weather.forecast(city, *days).await?;
                Ok(format_forecast(&f, Style::Plain))
            }
            ToolCall::LocationByIp { ip_address } => {
                let info = self.location.location_by_ip(ip_address).await?;
                Ok(format_location_info(&info))
            }
            ToolCall::WeatherByCoordinates { lat, lon } => {
                let w = self.weather.current_by_coordinates(*lat, *lon).await?;
                Ok(format_current_weather(&w, Style::Plain))
            }
            ToolCall::ForecastByCoordinates { lat, lon, days } => {
                let f = self.weather.forecast_by_coordinates(*lat, *lon, *days).await?;
                Ok(format_forecast(&f, Style::Plain))
            }
            ToolCall::LocationAndWeatherByIp { ip_address } => {
                let info = self.location.location_by_ip(ip_address).await?;
                let w = self.weather.current_by_coordinates(info.lat, info.lon).await?;
                Ok(format!(
                    "{}\n\n{}",
                    format_location_info(&info),
                    format_current_weather(&w, Style::Plain)
                ))
            }
            ToolCall::AtCurrentLocation(tool) => {
                let info = self.location.current_location_info().await?;
                self.at_location(*tool, &info).await
            }
            ToolCall::ReverseGeocode { lat, lon } => self.location.reverse_geocode(*lat, *lon).await,
        }
    }

    /// Second leg of the caller-location tools, once the IP lookup succeeded.
    async fn at_location(&self, tool: CurrentLocationTool, info: &LocationInfo) -> Result<String> {
        match tool {
            CurrentLocationTool::Location => Ok(format_current_location_info(info)),
            CurrentLocationTool::Weather => {
                let w = self.weather.current_for(&info.weather_query()).await?;
                Ok(format_current_location_weather(&w))
            }
            CurrentLocationTool::Forecast { days } => {
                let f = self.weather.forecast_for(&info.weather_query(), days).await?;
                Ok(format_current_location_forecast(&f))
            }
        }
    }
}

/// The single string a tool call produces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolOutcome {
    pub text: String,
    pub is_error: bool,
}

impl ToolOutcome {
    fn success(text: String) -> Self {
        Self { text, is_error: false }
    }

    fn failure(text: String) -> Self {
        Self { text, is_error: true }
    }
}
