use thiserror::Error;

/// Every way a current-weather or forecast operation can fail.
///
/// The `Display` text is what a front end shows to the user as-is.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WeatherError {
    #[error("API key not configured.")]
    Configuration,

    #[error("{0}")]
    Validation(String),

    #[error("City not found. Please check the city name")]
    NotFound,

    #[error("Invalid API key.")]
    Unauthorized,

    #[error("API rate limit exceeded.")]
    RateLimited,

    #[error("API Error: {status} - {}", .message.as_deref().unwrap_or("Unknown error"))]
    Upstream { status: u16, message: Option<String> },

    #[error("Network error. Please check your internet connection.")]
    Network,

    #[error("Request failed: {0}")]
    Generic(String),
}

impl WeatherError {
    pub(crate) fn invalid_city() -> Self {
        Self::Validation("Please enter a valid city name.".to_string())
    }

    pub(crate) fn missing_coordinates() -> Self {
        Self::Validation("Latitude and longitude are required.".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upstream_message_falls_back_to_unknown() {
        let err = WeatherError::Upstream { status: 500, message: None };
        assert_eq!(err.to_string(), "API Error: 500 - Unknown error");

        let err = WeatherError::Upstream {
            status: 503,
            message: Some("service unavailable".into()),
        };
        assert_eq!(err.to_string(), "API Error: 503 - service unavailable");
    }

    #[test]
    fn validation_shows_carried_message() {
        assert_eq!(WeatherError::invalid_city().to_string(), "Please enter a valid city name.");
    }
}
