//! Core library for the `skyglass` weather client.
//!
//! This crate defines:
//! - Configuration & API key handling
//! - Fetching and failure classification against OpenWeather
//! - Normalization of current conditions and daily forecast aggregation
//! - City autocomplete, recent-search memory and device location
//!
//! It is used by `skyglass-cli`, but can also be reused by other front ends.

pub mod autocomplete;
pub mod classify;
pub mod client;
pub mod config;
pub mod error;
pub mod fetch;
pub mod forecast;
pub mod geocode;
pub mod history;
pub mod location;
pub mod model;
pub mod normalize;

pub use autocomplete::{Autocomplete, AutocompleteSession, SuggestionTicket, Suggestions};
pub use client::WeatherClient;
pub use config::Config;
pub use error::WeatherError;
pub use fetch::{FetchFailure, HttpFetcher, ReqwestFetcher};
pub use history::SearchHistory;
pub use location::{FixedLocation, LocationError, LocationOptions, LocationProvider, Locator, NoLocation};
pub use model::{
    Coordinates, CurrentWeather, DailyForecastSummary, Forecast, RawForecastSample, WeatherReport,
};
