//! Core library for the `weather-mcp` tool server.
//!
//! This crate defines:
//! - Configuration & credential handling
//! - Clients for WeatherAPI.com and ip-api.com behind small traits
//! - Weather and location operations, and their text formatting
//! - The tool catalog an assistant calls into
//!
//! It is used by the `weather-mcp` binary, but the operations can be reused on their own.

pub mod config;
pub mod error;
pub mod format;
pub mod location;
pub mod model;
pub mod provider;
pub mod tools;
pub mod validate;
pub mod weather;

pub use config::Config;
pub use error::{Result, WeatherError};
pub use location::LocationService;
pub use model::{CurrentWeather, Forecast, ForecastDay, IpQuery, LocationInfo, LocationSpec, Place};
pub use provider::{GeoSource, WeatherSource};
pub use tools::{TOOL_NAMES, ToolCall, ToolOutcome, Toolbox};
pub use weather::WeatherService;
