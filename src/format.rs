//! Report formatting
//!
//! Pure functions turning provider data into the user-facing text of the
//! geocode, weather and timezone tools. Missing numeric samples render as `-`.

use chrono::{DateTime, Datelike, Timelike};
use chrono_tz::Tz;

use crate::lookup::{weather_description, SUPPORTED_LOCATIONS};
use crate::providers::types::{CurrentConditions, DailySummary};

const RULE: &str = "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━";

fn number(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| v.to_string())
}

fn describe(code: Option<u32>) -> String {
    code.map_or_else(|| "-".to_string(), |c| weather_description(c).into_owned())
}

// ==================== Geocode ====================

pub fn geocode_report(display_name: &str, latitude: f64, longitude: f64) -> String {
    format!(
        "📍 주소: {display_name}\n🌐 위도: {latitude}\n🌐 경도: {longitude}\n\n좌표: {latitude}, {longitude}"
    )
}

pub fn geocode_not_found(address: &str) -> String {
    format!(
        "죄송합니다. \"{address}\"에 대한 위치 정보를 찾을 수 없습니다.\n\n다른 검색어로 시도해보세요."
    )
}

/// Short form of [`geocode_not_found`] used for `structuredContent`
pub fn geocode_not_found_short(address: &str) -> String {
    format!("\"{address}\"에 대한 위치 정보를 찾을 수 없습니다.")
}

// ==================== Weather ====================

/// Full weather report: current conditions, the daily list, then location.
/// The header names the requested day count even if fewer days came back.
pub fn weather_report(
    current: &CurrentConditions,
    days: &[DailySummary],
    requested_days: u32,
    latitude: f64,
    longitude: f64,
    timezone: &str,
) -> String {
    let header = format!(
        "🌤️ 현재 날씨 ({time})\n{RULE}\n🌡️ 온도: {temp}°C\n💧 습도: {hum}%\n🌧️ 강수량: {precip}mm\n🌬️ 풍속: {wind}km/h\n☁️ 날씨: {desc}\n\n📊 {count}일 예보\n{RULE}\n",
        time = current.time,
        temp = number(current.temperature),
        hum = number(current.humidity),
        precip = number(current.precipitation),
        wind = number(current.wind_speed),
        desc = describe(current.weather_code),
        count = requested_days,
    );

    let daily = days
        .iter()
        .map(daily_entry)
        .collect::<Vec<_>>()
        .join("\n\n");

    format!(
        "{header}{daily}\n\n📍 위치: 위도 {latitude}, 경도 {longitude}\n🌍 시간대: {timezone}"
    )
}

fn daily_entry(day: &DailySummary) -> String {
    format!(
        "📅 {}\n   최고: {}°C / 최저: {}°C\n   날씨: {}\n   강수량: {}mm",
        day.date,
        number(day.max_temperature),
        number(day.min_temperature),
        describe(day.weather_code),
        number(day.precipitation),
    )
}

// ==================== Timezone ====================

pub fn timezone_report(location: &str, zone: &str, local_time: &str, offset: &str) -> String {
    format!(
        "📍 지역: {location}\n🕐 시간대: {zone}\n⏰ 현재 시간: {local_time}\n🌍 UTC 오프셋: {offset}"
    )
}

/// `2025년 1월 5일 오후 03:04:05 KST`
pub fn korean_wall_clock(time: &DateTime<Tz>) -> String {
    let (is_pm, hour) = time.hour12();
    let meridiem = if is_pm { "오후" } else { "오전" };

    format!(
        "{}년 {}월 {}일 {} {:02}:{:02}:{:02} {}",
        time.year(),
        time.month(),
        time.day(),
        meridiem,
        hour,
        time.minute(),
        time.second(),
        time.format("%Z"),
    )
}

/// `GMT+09:00`, `GMT-03:30`, or plain `GMT` for a zero offset
pub fn utc_offset_label(offset_seconds: i32) -> String {
    if offset_seconds == 0 {
        return "GMT".to_string();
    }

    let sign = if offset_seconds < 0 { '-' } else { '+' };
    let minutes = offset_seconds.unsigned_abs() / 60;
    format!("GMT{}{:02}:{:02}", sign, minutes / 60, minutes % 60)
}

pub fn timezone_not_found_short(location: &str) -> String {
    format!("죄송합니다. \"{location}\" 지역의 시간대 정보를 찾을 수 없습니다.")
}

pub fn timezone_not_found(location: &str) -> String {
    format!(
        "{}\n\n지원하는 지역: {SUPPORTED_LOCATIONS} 등\n또는 IANA timezone 형식으로 입력해주세요 (예: Asia/Seoul, America/New_York)",
        timezone_not_found_short(location)
    )
}
