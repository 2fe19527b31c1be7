//! Provider response type definitions
//!
//! These types mirror the Nominatim and Open-Meteo responses and are used for
//! deserialization only.

use serde::Deserialize;

/// A Nominatim search hit
#[derive(Debug, Clone, Deserialize)]
pub struct Place {
    /// Latitude, as a decimal string
    pub lat: String,

    /// Longitude, as a decimal string
    pub lon: String,

    /// Canonical display name
    #[serde(default)]
    pub display_name: Option<String>,
}

/// Open-Meteo forecast response
#[derive(Debug, Clone, Deserialize)]
pub struct Forecast {
    /// Resolved time zone (requested with `timezone=auto`)
    #[serde(default)]
    pub timezone: Option<String>,

    /// Hourly series
    #[serde(default)]
    pub hourly: HourlySeries,

    /// Daily aggregates
    #[serde(default)]
    pub daily: DailySeries,

    /// Set by the API on invalid requests
    #[serde(default)]
    pub error: bool,

    /// Error reason accompanying `error`
    #[serde(default)]
    pub reason: Option<String>,
}

/// Hourly samples, one entry per hour
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct HourlySeries {
    pub time: Vec<String>,
    pub temperature_2m: Vec<Option<f64>>,
    pub relative_humidity_2m: Vec<Option<f64>>,
    pub precipitation: Vec<Option<f64>>,
    pub weather_code: Vec<Option<u32>>,
    pub wind_speed_10m: Vec<Option<f64>>,
}

/// Daily aggregates, one entry per day
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DailySeries {
    pub time: Vec<String>,
    pub temperature_2m_max: Vec<Option<f64>>,
    pub temperature_2m_min: Vec<Option<f64>>,
    pub precipitation_sum: Vec<Option<f64>>,
    pub weather_code: Vec<Option<u32>>,
}

/// Conditions at the first hourly sample
#[derive(Debug, Clone, PartialEq)]
pub struct CurrentConditions {
    pub time: String,
    pub temperature: Option<f64>,
    pub humidity: Option<f64>,
    pub precipitation: Option<f64>,
    pub weather_code: Option<u32>,
    pub wind_speed: Option<f64>,
}

/// One day of the forecast
#[derive(Debug, Clone, PartialEq)]
pub struct DailySummary {
    pub date: String,
    pub max_temperature: Option<f64>,
    pub min_temperature: Option<f64>,
    pub precipitation: Option<f64>,
    pub weather_code: Option<u32>,
}

fn at<T: Copy>(series: &[Option<T>], index: usize) -> Option<T> {
    series.get(index).copied().flatten()
}

impl Forecast {
    /// Conditions at the first hourly sample, if there is one
    pub fn current(&self) -> Option<CurrentConditions> {
        let hourly = &self.hourly;
        let time = hourly.time.first()?.clone();

        Some(CurrentConditions {
            time,
            temperature: at(&hourly.temperature_2m, 0),
            humidity: at(&hourly.relative_humidity_2m, 0),
            precipitation: at(&hourly.precipitation, 0),
            weather_code: at(&hourly.weather_code, 0),
            wind_speed: at(&hourly.wind_speed_10m, 0),
        })
    }

    /// At most `limit` daily summaries, in provider order
    pub fn daily_summaries(&self, limit: usize) -> Vec<DailySummary> {
        let daily = &self.daily;

        daily
            .time
            .iter()
            .take(limit)
            .enumerate()
            .map(|(i, date)| DailySummary {
                date: date.clone(),
                max_temperature: at(&daily.temperature_2m_max, i),
                min_temperature: at(&daily.temperature_2m_min, i),
                precipitation: at(&daily.precipitation_sum, i),
                weather_code: at(&daily.weather_code, i),
            })
            .collect()
    }
}
