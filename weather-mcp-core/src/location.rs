//! Where an IP address (or the caller) is, and what a coordinate pair is called.

use std::sync::Arc;

use crate::{
    error::Result,
    format::format_location_string,
    model::{IpQuery, LocationInfo},
    provider::{GeoSource, WeatherSource},
    validate::validate_ip,
};

#[derive(Debug, Clone)]
pub struct LocationService {
    geo: Arc<dyn GeoSource>,
    places: Arc<dyn WeatherSource>,
}

impl LocationService {
    pub fn new(geo: Arc<dyn GeoSource>, places: Arc<dyn WeatherSource>) -> Self {
        Self { geo, places }
    }

    /// The caller's approximate location, inferred by the provider from the request address.
    pub async fn user_location(&self) -> Result<LocationInfo> {
        self.geo.fetch_ip_location(&IpQuery::Caller).await
    }

    pub async fn location_by_ip(&self, ip: &str) -> Result<LocationInfo> {
        let ip = validate_ip(ip)?;
        self.geo.fetch_ip_location(&IpQuery::Address(ip.to_string())).await
    }

    /// Same lookup as [`Self::user_location`]; callers format it with the
    /// current-location variant.
    pub async fn current_location_info(&self) -> Result<LocationInfo> {
        self.user_location().await
    }

    /// "City, Region, Country" for a coordinate pair, or a plain
    /// "Location at lat, lon" when nothing matches.
    pub async fn reverse_geocode(&self, lat: f64, lon: f64) -> Result<String> {
        // Range check only; the search endpoint takes the raw pair.
        crate::model::LocationSpec::coordinates(lat, lon)?;

        let hits = self.places.search_places(lat, lon).await?;
        Ok(match hits.first() {
            Some(place) => format_location_string(&place.name, &place.region, &place.country),
            None => format!("Location at {lat}, {lon}"),
        })
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::{error::WeatherError, model::Place, weather::tests::FakeWeather};
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[derive(Debug, Default)]
    pub(crate) struct FakeGeo {
        pub calls: Mutex<Vec<IpQuery>>,
        pub fail: bool,
    }

    pub(crate) fn mountain_view() -> LocationInfo {
        LocationInfo {
            city: "Mountain View".into(),
            region: "California".into(),
            country: "United States".into(),
            lat: 37.4056,
            lon: -122.0775,
            timezone: "America/Los_Angeles".into(),
            ip: "8.8.8.8".into(),
        }
    }

    #[async_trait]
    impl GeoSource for FakeGeo {
        async fn fetch_ip_location(&self, query: &IpQuery) -> Result<LocationInfo> {
            self.calls.lock().unwrap().push(query.clone());
            if self.fail {
                return Err(WeatherError::NetworkError("ip-api.com (request timed out)".into()));
            }
            Ok(mountain_view())
        }
    }

    #[derive(Debug)]
    struct NoPlaces;

    #[async_trait]
    impl WeatherSource for NoPlaces {
        async fn fetch_weather(
            &self,
            _spec: &crate::LocationSpec,
            _days: u8,
        ) -> Result<crate::provider::WeatherPayload> {
            Err(WeatherError::UpstreamError { status: 500, message: String::new() })
        }

        async fn search_places(&self, _lat: f64, _lon: f64) -> Result<Vec<Place>> {
            Ok(Vec::new())
        }
    }

    #[tokio::test]
    async fn explicit_ip_and_caller_share_one_lookup() {
        let geo = Arc::new(FakeGeo::default());
        let svc = LocationService::new(geo.clone(), Arc::new(FakeWeather::default()));

        svc.location_by_ip("8.8.8.8").await.unwrap();
        svc.user_location().await.unwrap();

        let calls = geo.calls.lock().unwrap();
        assert_eq!(*calls, vec![IpQuery::Address("8.8.8.8".into()), IpQuery::Caller]);
    }

    #[tokio::test]
    async fn empty_ip_is_rejected_without_lookup() {
        let geo = Arc::new(FakeGeo::default());
        let svc = LocationService::new(geo.clone(), Arc::new(FakeWeather::default()));

        assert!(matches!(svc.location_by_ip("").await, Err(WeatherError::InvalidInput(_))));
        assert!(geo.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn reverse_geocode_formats_best_match() {
        let svc = LocationService::new(Arc::new(FakeGeo::default()), Arc::new(FakeWeather::default()));
        let name = svc.reverse_geocode(23.55, 87.32).await.unwrap();
        assert_eq!(name, "Durgapur, West Bengal, India");
    }

    #[tokio::test]
    async fn reverse_geocode_falls_back_to_coordinates() {
        let svc = LocationService::new(Arc::new(FakeGeo::default()), Arc::new(NoPlaces));
        let name = svc.reverse_geocode(1.5, -2.25).await.unwrap();
        assert_eq!(name, "Location at 1.5, -2.25");
    }
}
