use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{Result, WeatherError};

/// Which address an IP lookup should resolve.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IpQuery {
    /// Let the provider infer the caller's public address.
    Caller,
    Address(String),
}

impl IpQuery {
    pub fn as_address(&self) -> Option<&str> {
        match self {
            IpQuery::Caller => None,
            IpQuery::Address(ip) => Some(ip.as_str()),
        }
    }
}

/// A place identified by name or coordinates.
#[derive(Debug, Clone, PartialEq)]
pub enum LocationSpec {
    City(String),
    Coordinates { lat: f64, lon: f64 },
}

impl LocationSpec {
    pub fn city(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(WeatherError::InvalidInput("A location name is required.".to_string()));
        }
        Ok(LocationSpec::City(trimmed.to_string()))
    }

    /// Build a coordinate pair, rejecting values no provider could resolve.
    pub fn coordinates(lat: f64, lon: f64) -> Result<Self> {
        if !lat.is_finite() || !(-90.0..=90.0).contains(&lat) {
            return Err(WeatherError::InvalidInput(format!(
                "Latitude must be between -90 and 90, got {lat}."
            )));
        }
        if !lon.is_finite() || !(-180.0..=180.0).contains(&lon) {
            return Err(WeatherError::InvalidInput(format!(
                "Longitude must be between -180 and 180, got {lon}."
            )));
        }
        Ok(LocationSpec::Coordinates { lat, lon })
    }

    /// The `q` parameter understood by WeatherAPI.com.
    pub fn to_query(&self) -> String {
        match self {
            LocationSpec::City(name) => name.clone(),
            LocationSpec::Coordinates { lat, lon } => format!("{lat},{lon}"),
        }
    }
}

/// Name and local clock of the place a weather record belongs to.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Place {
    pub name: String,
    pub region: String,
    pub country: String,
    pub local_time: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentWeather {
    pub place: Place,
    pub last_updated: String,
    pub condition: String,
    pub temperature_c: f64,
    pub feels_like_c: f64,
    pub humidity_pct: u8,
    pub pressure_mb: f64,
    pub wind_kph: f64,
    pub wind_dir: String,
    pub uv_index: f64,
    pub visibility_km: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastDay {
    pub date: NaiveDate,
    pub condition: String,
    pub max_temp_c: f64,
    pub min_temp_c: f64,
    pub avg_temp_c: f64,
    pub humidity_pct: f64,
    pub max_wind_kph: f64,
    pub chance_of_rain_pct: u8,
    pub uv_index: f64,
}

/// Daily forecasts in the provider's (chronological) order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Forecast {
    pub place: Place,
    pub days: Vec<ForecastDay>,
}

/// Geographic position resolved from an IP address.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationInfo {
    pub city: String,
    pub region: String,
    pub country: String,
    pub lat: f64,
    pub lon: f64,
    pub timezone: String,
    pub ip: String,
}

impl LocationInfo {
    /// The query to use when chaining into a weather lookup: the city when
    /// known, the coordinates otherwise.
    pub fn weather_query(&self) -> LocationSpec {
        if self.city.trim().is_empty() {
            LocationSpec::Coordinates { lat: self.lat, lon: self.lon }
        } else {
            LocationSpec::City(self.city.clone())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_encoding() {
        assert_eq!(LocationSpec::city(" London ").unwrap().to_query(), "London");
        assert_eq!(LocationSpec::coordinates(51.5, -0.12).unwrap().to_query(), "51.5,-0.12");
    }

    #[test]
    fn coordinates_out_of_range() {
        assert!(LocationSpec::coordinates(91.0, 0.0).is_err());
        assert!(LocationSpec::coordinates(0.0, -180.5).is_err());
        assert!(LocationSpec::coordinates(f64::NAN, 0.0).is_err());
        assert!(LocationSpec::coordinates(-90.0, 180.0).is_ok());
    }

    #[test]
    fn empty_city_is_invalid_input() {
        assert!(matches!(LocationSpec::city("  "), Err(WeatherError::InvalidInput(_))));
    }

    #[test]
    fn weather_query_falls_back_to_coordinates() {
        let mut info = LocationInfo {
            city: "Mountain View".into(),
            region: "California".into(),
            country: "United States".into(),
            lat: 37.4,
            lon: -122.1,
            timezone: "America/Los_Angeles".into(),
            ip: "8.8.8.8".into(),
        };
        assert_eq!(info.weather_query(), LocationSpec::City("Mountain View".into()));

        info.city.clear();
        assert_eq!(info.weather_query(), LocationSpec::Coordinates { lat: 37.4, lon: -122.1 });
    }
}
