use thiserror::Error;

/// Failures surfaced by validation, the upstream clients and the operations built on them.
#[derive(Debug, Error)]
pub enum WeatherError {
    /// No WeatherAPI key configured; raised before any request is sent.
    #[error(
        "WEATHERAPI_KEY environment variable is not set. \
         Please get an API key from weatherapi.com and add it to your .env file."
    )]
    MissingCredential,

    /// The provider rejected the configured key (HTTP 401/403).
    #[error("The weather provider rejected the configured API key.")]
    InvalidCredential,

    /// The provider could not resolve the requested place.
    #[error("No matching location found for '{query}'.")]
    InvalidLocation { query: String },

    /// Transport failure, including request timeouts.
    #[error("Network error while contacting {0}")]
    NetworkError(String),

    /// Any other non-2xx answer.
    #[error("Upstream service responded with status {status}: {message}")]
    UpstreamError { status: u16, message: String },

    /// Caller-supplied arguments that fail validation.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A 2xx body that does not match the expected shape.
    #[error("Failed to parse {context} response: {source}")]
    Decode {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("No forecast data available for {query}.")]
    NoForecastData { query: String },
}

pub type Result<T> = std::result::Result<T, WeatherError>;

impl WeatherError {
    /// Classify a non-2xx HTTP status for a request made with `query`.
    ///
    /// `credentialed` is false for providers that take no key, in which case
    /// 401/403 are reported as plain upstream errors.
    pub fn from_status(status: u16, query: &str, body: &str, credentialed: bool) -> Self {
        match status {
            401 | 403 if credentialed => WeatherError::InvalidCredential,
            400 => WeatherError::InvalidLocation { query: query.to_string() },
            _ => WeatherError::UpstreamError { status, message: truncate_body(body) },
        }
    }
}

pub(crate) fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() > MAX {
        let mut end = MAX;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...", &body[..end])
    } else {
        body.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_classification() {
        assert!(matches!(
            WeatherError::from_status(401, "London", "", true),
            WeatherError::InvalidCredential
        ));
        assert!(matches!(
            WeatherError::from_status(403, "London", "", true),
            WeatherError::InvalidCredential
        ));
        assert!(matches!(
            WeatherError::from_status(400, "Atlantis", "", true),
            WeatherError::InvalidLocation { query } if query == "Atlantis"
        ));
        assert!(matches!(
            WeatherError::from_status(503, "London", "down", true),
            WeatherError::UpstreamError { status: 503, .. }
        ));
    }

    #[test]
    fn uncredentialed_provider_never_reports_bad_key() {
        let err = WeatherError::from_status(403, "8.8.8.8", "quota", false);
        assert!(matches!(err, WeatherError::UpstreamError { status: 403, .. }));
    }

    #[test]
    fn truncate_body_respects_char_boundaries() {
        let long = "°".repeat(150);
        let out = truncate_body(&long);
        assert!(out.ends_with("..."));
        assert!(out.len() <= 203);
    }
}
