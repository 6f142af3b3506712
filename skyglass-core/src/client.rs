//! The weather client: the only entry point a front end talks to.
//!
//! Every current/forecast operation follows the same steps: check the key,
//! validate the query, fetch, classify any failure, then normalize or
//! aggregate the body.

use std::sync::Arc;

use reqwest::Url;
use serde::de::DeserializeOwned;
use tracing::{debug, error, warn};

use crate::{
    classify::classify,
    config::Config,
    error::WeatherError,
    fetch::{FetchFailure, HttpFetcher, ReqwestFetcher},
    forecast::transform_forecast,
    geocode::{format_places, long_enough},
    model::{Coordinates, CurrentWeather, Forecast, RawCurrentWeather, RawForecast, RawPlace, WeatherReport},
    normalize::normalize_current,
};

const CURRENT_PATH: &str = "/data/2.5/weather";
const FORECAST_PATH: &str = "/data/2.5/forecast";
const GEOCODING_PATH: &str = "/geo/1.0/direct";

#[derive(Debug, Clone, Copy)]
enum Query<'a> {
    City(&'a str),
    Coords(Coordinates),
}

impl Query<'_> {
    fn validate(self) -> Result<Self, WeatherError> {
        match self {
            Query::City(city) => {
                let city = city.trim();
                if city.is_empty() {
                    return Err(WeatherError::invalid_city());
                }
                Ok(Query::City(city))
            }
            Query::Coords(coords) => {
                coords.validate()?;
                Ok(self)
            }
        }
    }

    fn params(self) -> Vec<(&'static str, String)> {
        match self {
            Query::City(city) => vec![("q", city.to_string())],
            Query::Coords(c) => vec![("lat", c.lat.to_string()), ("lon", c.lon.to_string())],
        }
    }
}

#[derive(Debug, Clone)]
pub struct WeatherClient {
    api_key: Option<String>,
    base_url: String,
    forecast_days: usize,
    suggestion_limit: u8,
    fetcher: Arc<dyn HttpFetcher>,
}

impl WeatherClient {
    /// Client backed by a real HTTP connection pool.
    pub fn new(config: &Config) -> Result<Self, WeatherError> {
        let fetcher = ReqwestFetcher::new()
            .map_err(|e| WeatherError::Generic(format!("failed to build HTTP client: {e}")))?;
        Ok(Self::with_fetcher(config, Arc::new(fetcher)))
    }

    pub fn with_fetcher(config: &Config, fetcher: Arc<dyn HttpFetcher>) -> Self {
        Self {
            api_key: config.usable_api_key().map(str::to_owned),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            forecast_days: config.forecast_days,
            suggestion_limit: config.suggestion_limit,
            fetcher,
        }
    }

    pub async fn current_weather_by_city(&self, city: &str) -> Result<CurrentWeather, WeatherError> {
        self.current(Query::City(city)).await
    }

    pub async fn current_weather_by_coords(&self, coords: Coordinates) -> Result<CurrentWeather, WeatherError> {
        self.current(Query::Coords(coords)).await
    }

    pub async fn forecast_by_city(&self, city: &str) -> Result<Forecast, WeatherError> {
        self.forecast(Query::City(city)).await
    }

    pub async fn forecast_by_coords(&self, coords: Coordinates) -> Result<Forecast, WeatherError> {
        self.forecast(Query::Coords(coords)).await
    }

    /// Current conditions and forecast for one city, fetched concurrently.
    pub async fn report_by_city(&self, city: &str) -> Result<WeatherReport, WeatherError> {
        let (current, forecast) =
            tokio::try_join!(self.current_weather_by_city(city), self.forecast_by_city(city))?;
        Ok(WeatherReport { current, forecast })
    }

    pub async fn report_by_coords(&self, coords: Coordinates) -> Result<WeatherReport, WeatherError> {
        let (current, forecast) = tokio::try_join!(
            self.current_weather_by_coords(coords),
            self.forecast_by_coords(coords)
        )?;
        Ok(WeatherReport { current, forecast })
    }

    /// Place names matching `partial`, best effort.
    ///
    /// Never fails: short input, a missing key and upstream errors all
    /// yield an empty list. Upstream order is kept as-is.
    pub async fn suggest_cities(&self, partial: &str) -> Vec<String> {
        if !long_enough(partial) {
            return Vec::new();
        }
        let Some(key) = self.api_key.as_deref() else {
            debug!("no API key configured, skipping city suggestions");
            return Vec::new();
        };

        let limit = self.suggestion_limit.to_string();
        let url = match self.url(
            GEOCODING_PATH,
            &[("q", partial), ("limit", limit.as_str()), ("appid", key)],
        ) {
            Ok(url) => url,
            Err(e) => {
                warn!(error = %e, "could not build geocoding URL");
                return Vec::new();
            }
        };

        match self.get::<Vec<RawPlace>>(url).await {
            Ok(places) => format_places(&places),
            Err(e) => {
                warn!(error = %e, partial, "geocoding request failed");
                Vec::new()
            }
        }
    }

    async fn current(&self, query: Query<'_>) -> Result<CurrentWeather, WeatherError> {
        let url = self.weather_url(CURRENT_PATH, query)?;
        let raw: RawCurrentWeather = self.get(url).await.inspect_err(|e| {
            error!(error = %e, ?query, "current weather request failed");
        })?;
        Ok(normalize_current(raw))
    }

    async fn forecast(&self, query: Query<'_>) -> Result<Forecast, WeatherError> {
        let url = self.weather_url(FORECAST_PATH, query)?;
        let raw: RawForecast = self.get(url).await.inspect_err(|e| {
            error!(error = %e, ?query, "forecast request failed");
        })?;
        Ok(transform_forecast(raw, self.forecast_days))
    }

    /// Key check, then input validation, then the query string.
    fn weather_url(&self, path: &str, query: Query<'_>) -> Result<Url, WeatherError> {
        let key = self.api_key.as_deref().ok_or(WeatherError::Configuration)?;
        let query = query.validate()?;

        let mut params = query.params();
        params.push(("appid", key.to_string()));
        params.push(("units", "metric".to_string()));

        let pairs: Vec<(&str, &str)> = params.iter().map(|(k, v)| (*k, v.as_str())).collect();
        self.url(path, &pairs)
    }

    fn url(&self, path: &str, params: &[(&str, &str)]) -> Result<Url, WeatherError> {
        let base = format!("{}{}", self.base_url, path);
        Url::parse_with_params(&base, params)
            .map_err(|e| WeatherError::Generic(format!("invalid URL {base}: {e}")))
    }

    async fn get<T: DeserializeOwned>(&self, url: Url) -> Result<T, WeatherError> {
        let value = self.fetcher.get_json(&url).await.map_err(classify)?;
        serde_json::from_value(value).map_err(|e| classify(FetchFailure::Decode(e.to_string())))
    }
}
