//! MCP tool server over stdio, built on `rmcp`. Each tool method turns its
//! arguments into a [`ToolCall`] and hands it to the [`Toolbox`].

use rmcp::handler::server::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::*;
use rmcp::{ServerHandler, ServiceExt, tool, tool_handler, tool_router};
use schemars::JsonSchema;
use serde::Deserialize;
use weather_mcp_core::{
    ToolCall, ToolOutcome, Toolbox,
    tools::{CurrentLocationTool, default_days},
};

#[derive(Debug, Deserialize, JsonSchema)]
pub struct CityRequest {
    /// Name of the city (e.g., 'London', 'New York', 'Tokyo').
    pub city: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct CityForecastRequest {
    /// Name of the city (e.g., 'London', 'New York', 'Tokyo').
    pub city: String,
    /// Number of forecast days, 1 to 3 (default 3).
    #[serde(default = "default_days")]
    pub days: i64,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct IpRequest {
    /// IP address to look up (e.g., '8.8.8.8').
    pub ip_address: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct CoordinatesRequest {
    /// Latitude of the location.
    pub lat: f64,
    /// Longitude of the location.
    pub lon: f64,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct CoordinatesForecastRequest {
    /// Latitude of the location.
    pub lat: f64,
    /// Longitude of the location.
    pub lon: f64,
    /// Number of forecast days, 1 to 3 (default 3).
    #[serde(default = "default_days")]
    pub days: i64,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct DaysRequest {
    /// Number of forecast days, 1 to 3 (default 3).
    #[serde(default = "default_days")]
    pub days: i64,
}

#[derive(Clone)]
pub struct WeatherServer {
    toolbox: Toolbox,
    tool_router: ToolRouter<Self>,
}

#[tool_router]
impl WeatherServer {
    pub fn new(toolbox: Toolbox) -> Self {
        Self { toolbox, tool_router: Self::tool_router() }
    }

    #[tool(description = "Get current weather for any city worldwide using WeatherAPI.")]
    async fn get_weather_by_city(
        &self,
        Parameters(req): Parameters<CityRequest>,
    ) -> Result<CallToolResult, rmcp::ErrorData> {
        Ok(self.respond(ToolCall::WeatherByCity { city: req.city }).await)
    }

    #[tool(description = "Get weather forecast for any city worldwide using WeatherAPI.")]
    async fn get_weather_forecast_by_city(
        &self,
        Parameters(req): Parameters<CityForecastRequest>,
    ) -> Result<CallToolResult, rmcp::ErrorData> {
        Ok(self.respond(ToolCall::ForecastByCity { city: req.city, days: req.days }).await)
    }

    #[tool(description = "Get location information based on IP address.")]
    async fn get_location_by_ip(
        &self,
        Parameters(req): Parameters<IpRequest>,
    ) -> Result<CallToolResult, rmcp::ErrorData> {
        Ok(self.respond(ToolCall::LocationByIp { ip_address: req.ip_address }).await)
    }

    #[tool(description = "Get current weather for a specific location using latitude and longitude.")]
    async fn get_weather_by_coordinates(
        &self,
        Parameters(req): Parameters<CoordinatesRequest>,
    ) -> Result<CallToolResult, rmcp::ErrorData> {
        Ok(self.respond(ToolCall::WeatherByCoordinates { lat: req.lat, lon: req.lon }).await)
    }

    #[tool(description = "Get weather forecast for a specific location using latitude and longitude.")]
    async fn get_weather_forecast_by_coordinates(
        &self,
        Parameters(req): Parameters<CoordinatesForecastRequest>,
    ) -> Result<CallToolResult, rmcp::ErrorData> {
        let call = ToolCall::ForecastByCoordinates { lat: req.lat, lon: req.lon, days: req.days };
        Ok(self.respond(call).await)
    }

    #[tool(description = "Get location and weather information based on IP address.")]
    async fn get_location_and_weather_by_ip(
        &self,
        Parameters(req): Parameters<IpRequest>,
    ) -> Result<CallToolResult, rmcp::ErrorData> {
        Ok(self.respond(ToolCall::LocationAndWeatherByIp { ip_address: req.ip_address }).await)
    }

    #[tool(description = "Get the user's current approximate location based on their IP address.")]
    async fn get_user_current_location(&self) -> Result<CallToolResult, rmcp::ErrorData> {
        Ok(self.respond(ToolCall::AtCurrentLocation(CurrentLocationTool::Location)).await)
    }

    #[tool(description = "Get current weather at the user's detected location.")]
    async fn get_weather_at_current_location(&self) -> Result<CallToolResult, rmcp::ErrorData> {
        Ok(self.respond(ToolCall::AtCurrentLocation(CurrentLocationTool::Weather)).await)
    }

    #[tool(description = "Get weather forecast at the user's detected location.")]
    async fn get_forecast_at_current_location(
        &self,
        Parameters(req): Parameters<DaysRequest>,
    ) -> Result<CallToolResult, rmcp::ErrorData> {
        let call = ToolCall::AtCurrentLocation(CurrentLocationTool::Forecast { days: req.days });
        Ok(self.respond(call).await)
    }

    #[tool(description = "Turn latitude and longitude into a readable place name.")]
    async fn reverse_geocode_coordinates(
        &self,
        Parameters(req): Parameters<CoordinatesRequest>,
    ) -> Result<CallToolResult, rmcp::ErrorData> {
        Ok(self.respond(ToolCall::ReverseGeocode { lat: req.lat, lon: req.lon }).await)
    }
}

impl WeatherServer {
    /// Names, descriptions and input schemas of every registered tool.
    pub fn tools() -> Vec<Tool> {
        Self::tool_router().list_all()
    }

    async fn respond(&self, call: ToolCall) -> CallToolResult {
        tracing::debug!(tool = call.name(), "tool call");
        into_result(self.toolbox.run(&call).await)
    }
}

/// Tool failures are results flagged `isError`, never protocol errors.
fn into_result(outcome: ToolOutcome) -> CallToolResult {
    let content = vec![Content::text(outcome.text)];
    if outcome.is_error { CallToolResult::error(content) } else { CallToolResult::success(content) }
}

#[tool_handler]
impl ServerHandler for WeatherServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation::from_build_env(),
            instructions: Some(
                "Weather and IP-location tools. Use the city or coordinate tools when the user \
                 names a place, and the current-location tools otherwise. Forecasts cover 1 to 3 days."
                    .into(),
            ),
        }
    }
}

/// Serve until the client closes stdin.
pub async fn serve_stdio(toolbox: Toolbox) -> anyhow::Result<()> {
    let service = WeatherServer::new(toolbox).serve(rmcp::transport::stdio()).await?;
    service.waiting().await?;
    Ok(())
}
