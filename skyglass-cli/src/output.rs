use std::fmt::Display;

use chrono::DateTime;
use skyglass_core::{CurrentWeather, Forecast, WeatherReport};

const HOURLY_SAMPLES: usize = 5;

pub fn print_report(report: &WeatherReport) {
    print_current(&report.current);
    println!();
    print_forecast(&report.forecast);
}

fn print_current(current: &CurrentWeather) {
    println!("{}: {}°C, {}", current.city, current.temperature, current.description);
    println!("  feels like  {}", or_dash(current.feels_like, "°C"));
    println!("  humidity    {}", or_dash(current.humidity, "%"));
    println!("  pressure    {}", or_dash(current.pressure, " hPa"));
    println!("  wind        {} m/s", current.wind_speed);
    println!("  clouds      {}%", current.cloudiness);
    println!("  sunrise     {}", current.sunrise.map_or_else(|| "-".to_string(), clock));
    println!("  sunset      {}", current.sunset.map_or_else(|| "-".to_string(), clock));
}

fn print_forecast(forecast: &Forecast) {
    let hours = forecast.next_hours(HOURLY_SAMPLES);
    if !hours.is_empty() {
        println!("Next hours:");
        for sample in hours {
            let description = sample.condition().map(|c| c.description.as_str()).unwrap_or("");
            let wind = sample
                .wind
                .as_ref()
                .map(|w| format!(", wind {:.0} m/s", w.speed))
                .unwrap_or_default();
            println!(
                "  {}  {:>4.0}°C  {description}{wind}",
                sample.dt_txt.format("%H:%M"),
                sample.main.temp
            );
        }
        println!();
    }

    if forecast.daily.is_empty() {
        println!("No forecast available.");
        return;
    }

    println!("Daily:");
    for day in &forecast.daily {
        println!(
            "  {} {}  {:>3}° / {:>3}°  {}",
            day.day_name,
            day.date.format("%d %b"),
            day.min_temp,
            day.max_temp,
            day.description
        );
    }
}

pub fn print_suggestions(suggestions: &[String]) {
    if suggestions.is_empty() {
        println!("No suggestions.");
        return;
    }
    for suggestion in suggestions {
        println!("{suggestion}");
    }
}

fn or_dash<T: Display>(value: Option<T>, unit: &str) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{v}{unit}"))
}

fn clock(epoch_secs: i64) -> String {
    DateTime::from_timestamp(epoch_secs, 0)
        .map(|t| t.format("%H:%M UTC").to_string())
        .unwrap_or_else(|| "-".to_string())
}
