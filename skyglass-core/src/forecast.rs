//! Daily aggregation of 3-hour forecast samples.
//!
//! Samples are grouped by the calendar date of their local timestamp (no
//! timezone conversion), in the order dates are first seen. Each group
//! yields its temperature extrema and one representative condition.
//!
//! The representative is the first sample whose description mentions
//! "clear", otherwise the sample at `len / 2`. The midpoint only lands on
//! midday when the day's samples start near midnight, so treat it as a
//! heuristic rather than a noon reading.

use std::collections::HashMap;

use chrono::NaiveDate;
use tracing::debug;

use crate::{
    model::{DailyForecastSummary, Forecast, RawCondition, RawForecast, RawForecastSample},
    normalize::round_half_up,
};

const CLEAR_MARKER: &str = "clear";

/// Group `samples` into at most `days` daily summaries.
pub fn aggregate_daily(samples: &[RawForecastSample], days: usize) -> Vec<DailyForecastSummary> {
    let buckets = bucket_by_date(samples);
    debug!(samples = samples.len(), buckets = buckets.len(), days, "aggregating forecast");

    buckets
        .into_iter()
        .take(days)
        .map(|(date, bucket)| summarize(date, &bucket))
        .collect()
}

/// Aggregate a forecast body, keeping its raw sample list alongside.
pub fn transform_forecast(raw: RawForecast, days: usize) -> Forecast {
    let daily = aggregate_daily(&raw.list, days);
    Forecast {
        daily,
        list: raw.list,
        city: raw.city,
    }
}

fn bucket_by_date(samples: &[RawForecastSample]) -> Vec<(NaiveDate, Vec<&RawForecastSample>)> {
    let mut order: Vec<(NaiveDate, Vec<&RawForecastSample>)> = Vec::new();
    let mut index: HashMap<NaiveDate, usize> = HashMap::new();

    for sample in samples {
        let date = sample.date();
        let slot = *index.entry(date).or_insert_with(|| {
            order.push((date, Vec::new()));
            order.len() - 1
        });
        order[slot].1.push(sample);
    }

    order
}

// Buckets are never empty: each one is created by the sample that lands in it.
fn summarize(date: NaiveDate, bucket: &[&RawForecastSample]) -> DailyForecastSummary {
    let (min, max) = bucket.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), s| {
        (lo.min(s.main.temp), hi.max(s.main.temp))
    });

    let condition = representative(bucket).cloned().unwrap_or_default();

    DailyForecastSummary {
        date,
        day_name: date.format("%a").to_string(),
        min_temp: round_half_up(min),
        max_temp: round_half_up(max),
        description: condition.description,
        icon: condition.icon,
    }
}

fn representative<'a>(bucket: &[&'a RawForecastSample]) -> Option<&'a RawCondition> {
    bucket
        .iter()
        .copied()
        .filter_map(RawForecastSample::condition)
        .find(|c| c.description.contains(CLEAR_MARKER))
        .or_else(|| bucket.get(bucket.len() / 2).copied().and_then(RawForecastSample::condition))
}
