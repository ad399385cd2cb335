//! Weather lookups by city name or coordinates.

use std::sync::Arc;

use crate::{
    error::{Result, WeatherError},
    model::{CurrentWeather, Forecast, LocationSpec},
    provider::WeatherSource,
    validate::limit_forecast_days,
};

#[derive(Debug, Clone)]
pub struct WeatherService {
    source: Arc<dyn WeatherSource>,
}

impl WeatherService {
    pub fn new(source: Arc<dyn WeatherSource>) -> Self {
        Self { source }
    }

    pub async fn current_weather(&self, location: &str) -> Result<CurrentWeather> {
        self.current_for(&LocationSpec::city(location)?).await
    }

    /// Forecast for `days` days; the count is clamped to `[1, 3]` before fetching.
    pub async fn forecast(&self, location: &str, days: i64) -> Result<Forecast> {
        self.forecast_for(&LocationSpec::city(location)?, days).await
    }

    /// No reverse geocoding first; the provider resolves coordinates itself.
    pub async fn current_by_coordinates(&self, lat: f64, lon: f64) -> Result<CurrentWeather> {
        self.current_for(&LocationSpec::coordinates(lat, lon)?).await
    }

    pub async fn forecast_by_coordinates(&self, lat: f64, lon: f64, days: i64) -> Result<Forecast> {
        self.forecast_for(&LocationSpec::coordinates(lat, lon)?, days).await
    }

    pub async fn current_for(&self, spec: &LocationSpec) -> Result<CurrentWeather> {
        let payload = self.source.fetch_weather(spec, 1).await?;
        Ok(payload.current)
    }

    pub async fn forecast_for(&self, spec: &LocationSpec, days: i64) -> Result<Forecast> {
        let days = limit_forecast_days(days);
        let payload = self.source.fetch_weather(spec, days).await?;

        if payload.forecast.days.is_empty() {
            return Err(WeatherError::NoForecastData { query: spec.to_query() });
        }
        Ok(payload.forecast)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::{
        model::{ForecastDay, Place},
        provider::WeatherPayload,
    };
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use std::sync::Mutex;

    /// Records every request and answers with a canned payload sized to `days`.
    #[derive(Debug, Default)]
    pub(crate) struct FakeWeather {
        pub calls: Mutex<Vec<(LocationSpec, u8)>>,
        pub empty_forecast: bool,
    }

    pub(crate) fn place() -> Place {
        Place {
            name: "Durgapur".into(),
            region: "West Bengal".into(),
            country: "India".into(),
            local_time: "2024-06-01 14:30".into(),
        }
    }

    pub(crate) fn current() -> CurrentWeather {
        CurrentWeather {
            place: place(),
            last_updated: "2024-06-01 14:15".into(),
            condition: "Partly cloudy".into(),
            temperature_c: 28.0,
            feels_like_c: 32.0,
            humidity_pct: 78,
            pressure_mb: 1008.0,
            wind_kph: 12.2,
            wind_dir: "SW".into(),
            uv_index: 7.0,
            visibility_km: 6.0,
        }
    }

    pub(crate) fn day(n: u32) -> ForecastDay {
        ForecastDay {
            date: NaiveDate::from_ymd_opt(2024, 6, n).expect("valid date"),
            condition: "Sunny".into(),
            max_temp_c: 34.1,
            min_temp_c: 26.3,
            avg_temp_c: 29.9,
            humidity_pct: 70.0,
            max_wind_kph: 18.4,
            chance_of_rain_pct: 20,
            uv_index: 8.0,
        }
    }

    #[async_trait]
    impl WeatherSource for FakeWeather {
        async fn fetch_weather(&self, spec: &LocationSpec, days: u8) -> Result<WeatherPayload> {
            self.calls.lock().unwrap().push((spec.clone(), days));
            let days = if self.empty_forecast {
                Vec::new()
            } else {
                (1..=u32::from(days)).map(day).collect()
            };
            Ok(WeatherPayload { current: current(), forecast: Forecast { place: place(), days } })
        }

        async fn search_places(&self, _lat: f64, _lon: f64) -> Result<Vec<Place>> {
            Ok(vec![place()])
        }
    }

    fn service() -> (Arc<FakeWeather>, WeatherService) {
        let fake = Arc::new(FakeWeather::default());
        (fake.clone(), WeatherService::new(fake))
    }

    #[tokio::test]
    async fn current_weather_fetches_one_day() {
        let (fake, svc) = service();
        let w = svc.current_weather("Durgapur").await.unwrap();
        assert_eq!(w.temperature_c, 28.0);

        let calls = fake.calls.lock().unwrap();
        assert_eq!(*calls, vec![(LocationSpec::City("Durgapur".into()), 1)]);
    }

    #[tokio::test]
    async fn forecast_days_are_clamped_before_fetch() {
        let (fake, svc) = service();
        let f = svc.forecast("London", 10).await.unwrap();
        assert_eq!(f.days.len(), 3);

        svc.forecast("London", -4).await.unwrap();

        let calls = fake.calls.lock().unwrap();
        assert_eq!(calls[0].1, 3);
        assert_eq!(calls[1].1, 1);
    }

    #[tokio::test]
    async fn forecast_keeps_chronological_order() {
        let (_, svc) = service();
        let f = svc.forecast("London", 3).await.unwrap();
        assert!(f.days.windows(2).all(|w| w[0].date < w[1].date));
    }

    #[tokio::test]
    async fn coordinates_are_passed_through() {
        let (fake, svc) = service();
        svc.current_by_coordinates(23.55, 87.32).await.unwrap();
        svc.forecast_by_coordinates(23.55, 87.32, 2).await.unwrap();

        let calls = fake.calls.lock().unwrap();
        assert_eq!(calls[0], (LocationSpec::Coordinates { lat: 23.55, lon: 87.32 }, 1));
        assert_eq!(calls[1], (LocationSpec::Coordinates { lat: 23.55, lon: 87.32 }, 2));
    }

    #[tokio::test]
    async fn invalid_input_never_reaches_the_source() {
        let (fake, svc) = service();
        assert!(matches!(svc.current_weather("").await, Err(WeatherError::InvalidInput(_))));
        assert!(matches!(
            svc.current_by_coordinates(120.0, 0.0).await,
            Err(WeatherError::InvalidInput(_))
        ));
        assert!(fake.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn empty_forecast_is_reported() {
        let fake = Arc::new(FakeWeather { empty_forecast: true, ..FakeWeather::default() });
        let svc = WeatherService::new(fake);
        let err = svc.forecast("Nowhere", 3).await.unwrap_err();
        assert!(matches!(err, WeatherError::NoForecastData { .. }));
    }
}
