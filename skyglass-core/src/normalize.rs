use crate::model::{CurrentWeather, RawCurrentWeather};

/// Round half toward positive infinity, so `-2.5` becomes `-2`.
pub(crate) fn round_half_up(value: f64) -> i32 {
    (value + 0.5).floor() as i32
}

fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0 + 0.5).floor() / 10.0
}

/// Map a successful current-weather body into [`CurrentWeather`].
pub fn normalize_current(raw: RawCurrentWeather) -> CurrentWeather {
    let condition = raw.weather.into_iter().next().unwrap_or_default();

    CurrentWeather {
        city: raw.name,
        temperature: round_half_up(raw.main.temp),
        feels_like: raw.main.feels_like.map(round_half_up),
        humidity: raw.main.humidity,
        pressure: raw.main.pressure,
        wind_speed: round_one_decimal(raw.wind.speed),
        cloudiness: raw.clouds.all,
        description: condition.description,
        icon: condition.icon,
        sunrise: raw.sys.as_ref().map(|s| s.sunrise),
        sunset: raw.sys.as_ref().map(|s| s.sunset),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn london() -> RawCurrentWeather {
        serde_json::from_value(json!({
            "name": "London",
            "main": { "temp": 15.4, "feels_like": 14.6, "humidity": 72, "pressure": 1012 },
            "wind": { "speed": 3.26 },
            "clouds": { "all": 40 },
            "weather": [
                { "description": "scattered clouds", "icon": "03d" },
                { "description": "mist", "icon": "50d" }
            ],
            "sys": { "sunrise": 1700000000, "sunset": 1700030000 }
        }))
        .unwrap()
    }

    #[test]
    fn normalizes_london_sample() {
        let current = normalize_current(london());

        assert_eq!(current.city, "London");
        assert_eq!(current.temperature, 15);
        assert_eq!(current.feels_like, Some(15));
        assert_eq!(current.wind_speed, 3.3);
        assert_eq!(current.cloudiness, 40);
        assert_eq!(current.description, "scattered clouds");
        assert_eq!(current.icon, "03d");
        assert_eq!(current.humidity, Some(72));
        assert_eq!(current.pressure, Some(1012));
        assert_eq!(current.sunrise, Some(1700000000));
        assert_eq!(current.sunset, Some(1700030000));
    }

    #[test]
    fn abbreviated_body_leaves_optional_fields_empty() {
        let raw: RawCurrentWeather = serde_json::from_value(json!({
            "main": { "temp": 15.4 },
            "wind": { "speed": 3.26 },
            "clouds": { "all": 40 },
            "weather": [{ "description": "scattered clouds", "icon": "03d" }],
            "name": "London"
        }))
        .unwrap();

        let current = normalize_current(raw);
        assert_eq!(current.temperature, 15);
        assert_eq!(current.wind_speed, 3.3);
        assert_eq!(current.feels_like, None);
        assert_eq!(current.humidity, None);
        assert_eq!(current.sunrise, None);
    }

    #[test]
    fn rounding_goes_half_up() {
        assert_eq!(round_half_up(2.5), 3);
        assert_eq!(round_half_up(-2.5), -2);
        assert_eq!(round_half_up(-2.6), -3);
        assert_eq!(round_half_up(0.49), 0);
    }

    #[test]
    fn wind_keeps_one_decimal() {
        assert_eq!(round_one_decimal(3.26), 3.3);
        assert_eq!(round_one_decimal(0.04), 0.0);
        assert_eq!(round_one_decimal(7.0), 7.0);
    }
}
