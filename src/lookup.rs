//! Static lookup tables
//!
//! Location name to IANA zone and weather code to description. Both maps are
//! built on first use and never mutated.

use std::borrow::Cow;
use std::collections::HashMap;
use std::sync::OnceLock;

static TIMEZONES: OnceLock<HashMap<&'static str, &'static str>> = OnceLock::new();
static WEATHER_CODES: OnceLock<HashMap<u32, &'static str>> = OnceLock::new();

/// Examples listed when a location is not recognized
pub const SUPPORTED_LOCATIONS: &str =
    "Seoul, New York, Tokyo, London, Paris, Berlin, Sydney, Dubai, Singapore, Hong Kong";

fn timezones() -> &'static HashMap<&'static str, &'static str> {
    TIMEZONES.get_or_init(|| {
        HashMap::from([
            // Korea
            ("seoul", "Asia/Seoul"),
            ("서울", "Asia/Seoul"),
            ("korea", "Asia/Seoul"),
            ("한국", "Asia/Seoul"),
            // United States
            ("new york", "America/New_York"),
            ("뉴욕", "America/New_York"),
            ("los angeles", "America/Los_Angeles"),
            ("로스앤젤레스", "America/Los_Angeles"),
            ("chicago", "America/Chicago"),
            ("시카고", "America/Chicago"),
            ("san francisco", "America/Los_Angeles"),
            ("샌프란시스코", "America/Los_Angeles"),
            // Japan
            ("tokyo", "Asia/Tokyo"),
            ("도쿄", "Asia/Tokyo"),
            // China
            ("beijing", "Asia/Shanghai"),
            ("베이징", "Asia/Shanghai"),
            ("shanghai", "Asia/Shanghai"),
            ("상하이", "Asia/Shanghai"),
            // Europe
            ("london", "Europe/London"),
            ("런던", "Europe/London"),
            ("paris", "Europe/Paris"),
            ("파리", "Europe/Paris"),
            ("berlin", "Europe/Berlin"),
            ("베를린", "Europe/Berlin"),
            ("moscow", "Europe/Moscow"),
            ("모스크바", "Europe/Moscow"),
            // Elsewhere
            ("sydney", "Australia/Sydney"),
            ("시드니", "Australia/Sydney"),
            ("dubai", "Asia/Dubai"),
            ("두바이", "Asia/Dubai"),
            ("singapore", "Asia/Singapore"),
            ("싱가포르", "Asia/Singapore"),
            ("hongkong", "Asia/Hong_Kong"),
            ("hong kong", "Asia/Hong_Kong"),
            ("홍콩", "Asia/Hong_Kong"),
            ("mumbai", "Asia/Kolkata"),
            ("뭄바이", "Asia/Kolkata"),
            ("sao paulo", "America/Sao_Paulo"),
            ("상파울루", "America/Sao_Paulo"),
        ])
    })
}

fn weather_codes() -> &'static HashMap<u32, &'static str> {
    WEATHER_CODES.get_or_init(|| {
        HashMap::from([
            (0, "맑음"),
            (1, "대체로 맑음"),
            (2, "부분적으로 흐림"),
            (3, "흐림"),
            (45, "안개"),
            (48, "서리 안개"),
            (51, "약한 이슬비"),
            (53, "보통 이슬비"),
            (55, "강한 이슬비"),
            (56, "약한 동결 이슬비"),
            (57, "강한 동결 이슬비"),
            (61, "약한 비"),
            (63, "보통 비"),
            (65, "강한 비"),
            (66, "약한 동결 비"),
            (67, "강한 동결 비"),
            (71, "약한 눈"),
            (73, "보통 눈"),
            (75, "강한 눈"),
            (77, "눈알"),
            (80, "약한 소나기"),
            (81, "보통 소나기"),
            (82, "강한 소나기"),
            (85, "약한 눈 소나기"),
            (86, "강한 눈 소나기"),
            (95, "뇌우"),
            (96, "우박과 함께하는 뇌우"),
            (99, "강한 우박과 함께하는 뇌우"),
        ])
    })
}

/// Case-insensitive exact lookup in the location table
pub fn timezone_for(location: &str) -> Option<&'static str> {
    let key = location.trim().to_lowercase();
    timezones().get(key.as_str()).copied()
}

/// Resolve a location to a zone identifier candidate.
///
/// Table match first, then any input containing `/` verbatim, then a
/// title-cased retry of the table. The returned identifier is not checked
/// against the zone database.
pub fn resolve_zone_name(location: &str) -> Option<Cow<'_, str>> {
    if let Some(zone) = timezone_for(location) {
        return Some(Cow::Borrowed(zone));
    }

    if location.contains('/') {
        return Some(Cow::Borrowed(location));
    }

    timezone_for(&title_case(location)).map(Cow::Borrowed)
}

/// Upper-case the first letter of each space-separated word, lower-case the rest
pub fn title_case(text: &str) -> String {
    text.split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.flat_map(char::to_lowercase))
                    .collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

/// Describe a WMO weather code; unknown codes fall back to the raw number
pub fn weather_description(code: u32) -> Cow<'static, str> {
    match weather_codes().get(&code) {
        Some(description) => Cow::Borrowed(description),
        None => Cow::Owned(format!("날씨 코드: {}", code)),
    }
}
