use serde::Deserialize;

use crate::{error::WeatherError, fetch::FetchFailure};

#[derive(Debug, Deserialize)]
struct UpstreamErrorBody {
    message: Option<String>,
}

/// Map a failed fetch onto the domain error taxonomy.
///
/// Status replies are decided by code first; a missing response is a
/// network problem; anything else is wrapped as a generic failure.
pub fn classify(failure: FetchFailure) -> WeatherError {
    match failure {
        FetchFailure::Status { status, body } => match status {
            404 => WeatherError::NotFound,
            401 => WeatherError::Unauthorized,
            429 => WeatherError::RateLimited,
            _ => WeatherError::Upstream {
                status,
                message: upstream_message(&body),
            },
        },
        FetchFailure::Transport(_) => WeatherError::Network,
        FetchFailure::Decode(message) => WeatherError::Generic(message),
    }
}

fn upstream_message(body: &str) -> Option<String> {
    serde_json::from_str::<UpstreamErrorBody>(body)
        .ok()
        .and_then(|b| b.message)
        .filter(|m| !m.is_empty())
}
