//! Human-readable renderings of weather and location records.
//!
//! Every function here is total: it only ever sees records that were fetched
//! successfully, and it never fails.

use crate::model::{CurrentWeather, Forecast, ForecastDay, LocationInfo, Place};

/// Separator placed between day blocks of a forecast.
pub const FORECAST_SEPARATOR: &str = "\n---\n";

/// Appended to anything derived from an IP lookup.
pub const IP_DISCLAIMER: &str = "💡 Location detected via IP address - may be approximate";

/// Presentation flavour. The current-location tools use [`Style::Emoji`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Style {
    #[default]
    Plain,
    Emoji,
}

/// "City, Region, Country", skipping empty parts.
pub fn format_location_string(name: &str, region: &str, country: &str) -> String {
    let parts: Vec<&str> =
        [name, region, country].into_iter().map(str::trim).filter(|p| !p.is_empty()).collect();

    if parts.is_empty() { "Unknown location".to_string() } else { parts.join(", ") }
}

pub fn format_place(place: &Place) -> String {
    format_location_string(&place.name, &place.region, &place.country)
}

pub fn format_current_weather(w: &CurrentWeather, style: Style) -> String {
    let location = format_place(&w.place);
    let wind = format!("{} km/h {}", w.wind_kph, w.wind_dir);
    let wind = wind.trim_end();

    let lines = match style {
        Style::Plain => vec![
            format!("Weather for {location}:"),
            String::new(),
            format!("Current Conditions: {}", w.condition),
            format!("Temperature: {}°C (feels like {}°C)", w.temperature_c, w.feels_like_c),
            format!("Humidity: {}%", w.humidity_pct),
            format!("Pressure: {} mb", w.pressure_mb),
            format!("Wind: {wind}"),
            format!("UV Index: {}", w.uv_index),
            format!("Visibility: {} km", w.visibility_km),
            String::new(),
            format!("Local Time: {}", w.place.local_time),
            format!("Last Updated: {}", w.last_updated),
        ],
        Style::Emoji => vec![
            "🌟 Weather at Your Current Location:".to_string(),
            format!("📍 {location}"),
            String::new(),
            format!("☁️  Current Conditions: {}", w.condition),
            format!("🌡️  Temperature: {}°C (feels like {}°C)", w.temperature_c, w.feels_like_c),
            format!("💧 Humidity: {}%", w.humidity_pct),
            format!("🏔️  Pressure: {} mb", w.pressure_mb),
            format!("💨 Wind: {wind}"),
            format!("☀️  UV Index: {}", w.uv_index),
            format!("👁️  Visibility: {} km", w.visibility_km),
            String::new(),
            format!("🕐 Local Time: {}", w.place.local_time),
            format!("⏰ Last Updated: {}", w.last_updated),
        ],
    };

    lines.join("\n")
}

pub fn format_forecast_day(d: &ForecastDay, style: Style) -> String {
    let date = d.date.format("%Y-%m-%d");

    let lines = match style {
        Style::Plain => vec![
            format!("{date}:"),
            format!("Weather: {}", d.condition),
            format!("Max Temperature: {}°C", d.max_temp_c),
            format!("Min Temperature: {}°C", d.min_temp_c),
            format!("Avg Temperature: {}°C", d.avg_temp_c),
            format!("Humidity: {}%", d.humidity_pct),
            format!("Max Wind: {} km/h", d.max_wind_kph),
            format!("Chance of Rain: {}%", d.chance_of_rain_pct),
            format!("UV Index: {}", d.uv_index),
        ],
        Style::Emoji => vec![
            format!("📅 {date}:"),
            format!("☁️  Weather: {}", d.condition),
            format!("🌡️  Max Temperature: {}°C", d.max_temp_c),
            format!("🌡️  Min Temperature: {}°C", d.min_temp_c),
            format!("🌡️  Avg Temperature: {}°C", d.avg_temp_c),
            format!("💧 Humidity: {}%", d.humidity_pct),
            format!("💨 Max Wind: {} km/h", d.max_wind_kph),
            format!("🌧️  Chance of Rain: {}%", d.chance_of_rain_pct),
            format!("☀️  UV Index: {}", d.uv_index),
        ],
    };

    lines.join("\n")
}

fn format_days(days: &[ForecastDay], style: Style) -> String {
    days.iter().map(|d| format_forecast_day(d, style)).collect::<Vec<_>>().join(FORECAST_SEPARATOR)
}

/// "N-Day Weather Forecast for <place>:" followed by the day blocks.
pub fn format_forecast(f: &Forecast, style: Style) -> String {
    format!(
        "{}-Day Weather Forecast for {}:\n{}",
        f.days.len(),
        format_place(&f.place),
        format_days(&f.days, style)
    )
}

/// Forecast rendering for a place that was detected from the caller's IP.
pub fn format_current_location_forecast(f: &Forecast) -> String {
    format!(
        "🌟 {}-Day Weather Forecast for Your Location:\n📍 {}:\n\n{IP_DISCLAIMER}\n\n{}\n{}",
        f.days.len(),
        format_place(&f.place),
        "─".repeat(50),
        format_days(&f.days, Style::Emoji)
    )
}

/// Current weather for a place that was detected from the caller's IP.
pub fn format_current_location_weather(w: &CurrentWeather) -> String {
    format!("{}\n\n{IP_DISCLAIMER}", format_current_weather(w, Style::Emoji))
}

pub fn format_location_info(info: &LocationInfo) -> String {
    [
        format!("Location information for IP {}:", info.ip),
        String::new(),
        format!("City: {}", info.city),
        format!("Region: {}", info.region),
        format!("Country: {}", info.country),
        format!("Latitude: {}", info.lat),
        format!("Longitude: {}", info.lon),
        format!("Timezone: {}", info.timezone),
    ]
    .join("\n")
}

pub fn format_current_location_info(info: &LocationInfo) -> String {
    [
        "📍 Your Current Location (approximate):".to_string(),
        String::new(),
        format!("🏙️  City: {}", info.city),
        format!("🗺️  Region: {}", info.region),
        format!("🌍 Country: {}", info.country),
        format!("📐 Coordinates: {}, {}", info.lat, info.lon),
        format!("🕐 Timezone: {}", info.timezone),
        String::new(),
        "💡 Note: This location is detected using your IP address and may not be completely accurate.".to_string(),
        "If you're using a VPN, the location might show where your VPN server is located.".to_string(),
    ]
    .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        location::tests::mountain_view,
        weather::tests::{current, day, place},
    };

    #[test]
    fn location_string_skips_empty_parts() {
        assert_eq!(format_location_string("Durgapur", "West Bengal", "India"), "Durgapur, West Bengal, India");
        assert_eq!(format_location_string("Singapore", "", "Singapore"), "Singapore, Singapore");
        assert_eq!(format_location_string("", " ", "India"), "India");
        assert_eq!(format_location_string("", "", ""), "Unknown location");
    }

    #[test]
    fn current_weather_fixture() {
        let out = format_current_weather(&current(), Style::Plain);

        assert!(out.starts_with("Weather for Durgapur, West Bengal, India:"));
        assert!(out.contains("28°C"));
        assert!(out.contains("feels like 32°C"));
        assert!(out.contains("Humidity: 78%"));
        assert!(out.contains("Pressure: 1008 mb"));
        assert!(out.contains("Wind: 12.2 km/h SW"));
        assert!(out.contains("Visibility: 6 km"));
        assert!(out.ends_with("Last Updated: 2024-06-01 14:15"));
    }

    #[test]
    fn current_weather_field_order() {
        let out = format_current_weather(&current(), Style::Plain);
        let labels = [
            "Current Conditions:",
            "Temperature:",
            "Humidity:",
            "Pressure:",
            "Wind:",
            "UV Index:",
            "Visibility:",
            "Local Time:",
            "Last Updated:",
        ];
        let positions: Vec<usize> =
            labels.iter().map(|l| out.find(l).expect("label present")).collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn wind_without_direction_has_no_trailing_space() {
        let mut w = current();
        w.wind_dir.clear();
        let out = format_current_weather(&w, Style::Plain);
        assert!(out.contains("Wind: 12.2 km/h\n"));
    }

    #[test]
    fn emoji_weather_carries_markers() {
        let out = format_current_location_weather(&current());
        assert!(out.starts_with("🌟 Weather at Your Current Location:"));
        assert!(out.contains("🌡️  Temperature: 28°C (feels like 32°C)"));
        assert!(out.ends_with(IP_DISCLAIMER));
    }

    #[test]
    fn forecast_has_one_block_per_day_in_order() {
        let f = Forecast { place: place(), days: vec![day(1), day(2), day(3)] };
        let out = format_forecast(&f, Style::Plain);

        assert!(out.starts_with("3-Day Weather Forecast for Durgapur, West Bengal, India:\n"));
        assert_eq!(out.matches(FORECAST_SEPARATOR).count(), 2);

        let body = out.split_once('\n').unwrap().1;
        let blocks: Vec<&str> = body.split(FORECAST_SEPARATOR).collect();
        assert_eq!(blocks.len(), 3);
        assert!(blocks[0].starts_with("2024-06-01:"));
        assert!(blocks[1].starts_with("2024-06-02:"));
        assert!(blocks[2].starts_with("2024-06-03:"));
    }

    #[test]
    fn forecast_day_fields() {
        let out = format_forecast_day(&day(1), Style::Plain);
        assert!(out.contains("Max Temperature: 34.1°C"));
        assert!(out.contains("Min Temperature: 26.3°C"));
        assert!(out.contains("Humidity: 70%"));
        assert!(out.contains("Chance of Rain: 20%"));
        assert!(out.ends_with("UV Index: 8"));
    }

    #[test]
    fn current_location_forecast_header() {
        let f = Forecast { place: place(), days: vec![day(1), day(2)] };
        let out = format_current_location_forecast(&f);
        assert!(out.starts_with("🌟 2-Day Weather Forecast for Your Location:\n📍 Durgapur, West Bengal, India:"));
        assert!(out.contains(IP_DISCLAIMER));
        assert!(out.contains(&"─".repeat(50)));
        assert!(out.contains("📅 2024-06-02:"));
    }

    #[test]
    fn location_info_variants() {
        let info = mountain_view();

        let plain = format_location_info(&info);
        assert!(plain.starts_with("Location information for IP 8.8.8.8:"));
        assert!(plain.contains("Latitude: 37.4056"));
        assert!(plain.contains("Timezone: America/Los_Angeles"));

        let current = format_current_location_info(&info);
        assert!(current.starts_with("📍 Your Current Location (approximate):"));
        assert!(current.contains("📐 Coordinates: 37.4056, -122.0775"));
        assert!(current.contains("may not be completely accurate"));
    }
}
