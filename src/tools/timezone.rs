//! `timezone` tool

use async_trait::async_trait;
use chrono::{DateTime, Offset, Utc};
use chrono_tz::Tz;
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::Value;

use super::{FailurePolicy, Tool};
use crate::error::ToolError;
use crate::format::{
    korean_wall_clock, timezone_not_found, timezone_not_found_short, timezone_report,
    utc_offset_label,
};
use crate::lookup::resolve_zone_name;
use crate::mcp::types::{text_output_schema, CallToolResult};

#[derive(Debug, Deserialize, JsonSchema)]
pub struct TimezoneArgs {
    /// City or country name, or an IANA zone identifier (e.g. Seoul, 서울, Asia/Seoul)
    pub location: String,
}

pub struct TimezoneTool;

impl TimezoneTool {
    /// Report for `location` at instant `now`
    pub fn report_at(&self, location: &str, now: DateTime<Utc>) -> Result<CallToolResult, ToolError> {
        let Some(zone_name) = resolve_zone_name(location) else {
            return Ok(CallToolResult::structured_text(
                timezone_not_found(location),
                timezone_not_found_short(location),
            ));
        };

        let zone = zone_name
            .parse::<Tz>()
            .or_else(|_| Tz::from_str_insensitive(&zone_name))
            .map_err(|_| ToolError::InvalidTimezone {
                zone: zone_name.to_string(),
            })?;

        let local = now.with_timezone(&zone);
        let offset = utc_offset_label(local.offset().fix().local_minus_utc());
        let text = timezone_report(location, zone.name(), &korean_wall_clock(&local), &offset);

        Ok(CallToolResult::structured_text(text.clone(), text))
    }
}

#[async_trait]
impl Tool for TimezoneTool {
    type Args = TimezoneArgs;

    const NAME: &'static str = "timezone";
    const DESCRIPTION: &'static str =
        "Returns the current local time and UTC offset for a city, country or IANA time zone.";
    const FAILURE_POLICY: FailurePolicy = FailurePolicy::ReportAsText;

    fn output_schema(&self) -> Option<Value> {
        Some(text_output_schema("Time zone report"))
    }

    async fn call(&self, args: TimezoneArgs) -> Result<CallToolResult, ToolError> {
        self.report_at(&args.location, Utc::now())
    }
}
