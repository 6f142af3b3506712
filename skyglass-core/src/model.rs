use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::error::WeatherError;

/// One `weather[]` entry as reported upstream.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawCondition {
    pub description: String,
    pub icon: String,
}

/// Only `temp` is guaranteed; the rest may be missing from abbreviated bodies.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawMain {
    pub temp: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feels_like: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub humidity: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pressure: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawWind {
    pub speed: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deg: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawClouds {
    pub all: u8,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawSys {
    pub sunrise: i64,
    pub sunset: i64,
}

/// Body of `GET /data/2.5/weather`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawCurrentWeather {
    pub name: String,
    pub main: RawMain,
    pub weather: Vec<RawCondition>,
    pub wind: RawWind,
    pub clouds: RawClouds,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sys: Option<RawSys>,
}

/// The `main` block of a forecast sample. Only `temp` is relied on.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawSampleMain {
    pub temp: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feels_like: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub humidity: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pressure: Option<u32>,
}

/// One 3-hour forecast step. Kept verbatim for hourly views.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawForecastSample {
    #[serde(with = "dt_txt")]
    pub dt_txt: NaiveDateTime,
    pub main: RawSampleMain,
    #[serde(default)]
    pub weather: Vec<RawCondition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wind: Option<RawWind>,
}

impl RawForecastSample {
    /// Calendar date in the upstream's reporting locale.
    pub fn date(&self) -> NaiveDate {
        self.dt_txt.date()
    }

    /// The authoritative (first) condition, if upstream sent any.
    pub fn condition(&self) -> Option<&RawCondition> {
        self.weather.first()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawForecastCity {
    pub name: String,
    #[serde(default)]
    pub country: String,
}

/// Body of `GET /data/2.5/forecast`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawForecast {
    pub list: Vec<RawForecastSample>,
    #[serde(default)]
    pub city: Option<RawForecastCity>,
}

/// One element of `GET /geo/1.0/direct`.
#[derive(Debug, Clone, Deserialize)]
pub struct RawPlace {
    pub name: String,
    pub country: String,
    #[serde(default)]
    pub state: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinates {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Build from possibly-missing parts; both must be present.
    pub fn from_parts(lat: Option<f64>, lon: Option<f64>) -> Result<Self, WeatherError> {
        match (lat, lon) {
            (Some(lat), Some(lon)) => Ok(Self { lat, lon }),
            _ => Err(WeatherError::missing_coordinates()),
        }
    }

    pub(crate) fn validate(&self) -> Result<(), WeatherError> {
        if !self.lat.is_finite() || !self.lon.is_finite() {
            return Err(WeatherError::missing_coordinates());
        }
        if !(-90.0..=90.0).contains(&self.lat) {
            return Err(WeatherError::Validation(format!(
                "Latitude must be between -90 and 90, got {}.",
                self.lat
            )));
        }
        if !(-180.0..=180.0).contains(&self.lon) {
            return Err(WeatherError::Validation(format!(
                "Longitude must be between -180 and 180, got {}.",
                self.lon
            )));
        }
        Ok(())
    }
}

/// Normalized current conditions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentWeather {
    pub city: String,
    pub temperature: i32,
    pub feels_like: Option<i32>,
    pub humidity: Option<u8>,
    pub pressure: Option<u32>,
    /// m/s, one decimal.
    pub wind_speed: f64,
    pub cloudiness: u8,
    pub description: String,
    pub icon: String,
    /// Unix seconds; absent when upstream omits `sys`.
    pub sunrise: Option<i64>,
    pub sunset: Option<i64>,
}

/// One calendar day of the forecast.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyForecastSummary {
    pub date: NaiveDate,
    /// Short English weekday, e.g. "Mon".
    pub day_name: String,
    pub min_temp: i32,
    pub max_temp: i32,
    pub description: String,
    pub icon: String,
}

/// Aggregated forecast plus the raw samples it was built from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Forecast {
    pub daily: Vec<DailyForecastSummary>,
    pub list: Vec<RawForecastSample>,
    pub city: Option<RawForecastCity>,
}

impl Forecast {
    /// The first `count` raw samples, for an hourly strip.
    pub fn next_hours(&self, count: usize) -> &[RawForecastSample] {
        &self.list[..count.min(self.list.len())]
    }
}

/// Current conditions and forecast fetched together for one query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherReport {
    pub current: CurrentWeather,
    pub forecast: Forecast,
}

mod dt_txt {
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    const FORMAT: &str = "%Y-%m-%d %H:%M:%S";

    pub fn serialize<S: Serializer>(value: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&value.format(FORMAT))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDateTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        NaiveDateTime::parse_from_str(&raw, FORMAT).map_err(D::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn forecast_sample_parses_local_timestamp() {
        let sample: RawForecastSample = serde_json::from_value(json!({
            "dt_txt": "2024-01-01 21:00:00",
            "main": { "temp": 2.5 },
            "weather": [{ "description": "light snow", "icon": "13n" }]
        }))
        .unwrap();

        assert_eq!(sample.date(), NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert_eq!(sample.condition().unwrap().icon, "13n");
        assert!(sample.wind.is_none());
    }

    #[test]
    fn forecast_sample_round_trips_timestamp_format() {
        let sample: RawForecastSample = serde_json::from_value(json!({
            "dt_txt": "2024-03-10 06:00:00",
            "main": { "temp": 4.0 }
        }))
        .unwrap();

        let back = serde_json::to_value(&sample).unwrap();
        assert_eq!(back["dt_txt"], "2024-03-10 06:00:00");
    }

    #[test]
    fn malformed_timestamp_is_rejected() {
        let res = serde_json::from_value::<RawForecastSample>(json!({
            "dt_txt": "yesterday",
            "main": { "temp": 1.0 }
        }));
        assert!(res.is_err());
    }

    #[test]
    fn coordinates_require_both_parts() {
        assert!(Coordinates::from_parts(Some(1.0), None).is_err());
        assert!(Coordinates::from_parts(None, Some(1.0)).is_err());
        assert_eq!(Coordinates::from_parts(Some(51.5), Some(-0.1)).unwrap(), Coordinates::new(51.5, -0.1));
    }

    #[test]
    fn coordinates_out_of_range_are_invalid() {
        assert!(Coordinates::new(91.0, 0.0).validate().is_err());
        assert!(Coordinates::new(0.0, -181.0).validate().is_err());
        assert!(Coordinates::new(f64::NAN, 0.0).validate().is_err());
        assert!(Coordinates::new(-33.9, 151.2).validate().is_ok());
    }

    #[test]
    fn next_hours_is_clamped() {
        let forecast = Forecast {
            daily: vec![],
            list: vec![],
            city: None,
        };
        assert!(forecast.next_hours(5).is_empty());
    }
}
