use crate::error::InvalidDateFormat;
use anyhow::Context;
use chrono::{DateTime, Datelike, Local, NaiveDate, Utc};

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Today's calendar date, either on the host clock or at a fixed UTC offset.
pub fn today(now_utc: DateTime<Utc>, tz_offset_hours: Option<i32>) -> anyhow::Result<NaiveDate> {
    match tz_offset_hours {
        Some(hours) => {
            let offset = hours
                .checked_mul(3600)
                .and_then(chrono::FixedOffset::east_opt)
                .with_context(|| format!("invalid UTC offset: {hours}h"))?;
            Ok(now_utc.with_timezone(&offset).date_naive())
        }
        None => Ok(now_utc.with_timezone(&Local).date_naive()),
    }
}

/// Returns the override unchanged when given, otherwise `today` as `YYYY-MM-DD`.
pub fn resolve_target_date(override_date: Option<&str>, today: NaiveDate) -> anyhow::Result<String> {
    match override_date.map(str::trim).filter(|s| !s.is_empty()) {
        Some(s) => {
            parse_date(s)?;
            Ok(s.to_string())
        }
        None => Ok(today.format(DATE_FORMAT).to_string()),
    }
}

/// Monday through Friday. Public holidays are not consulted.
pub fn is_business_day(date: &str) -> anyhow::Result<bool> {
    let date = parse_date(date)?;
    Ok(!matches!(date.weekday(), chrono::Weekday::Sat | chrono::Weekday::Sun))
}

fn parse_date(s: &str) -> Result<NaiveDate, InvalidDateFormat> {
    let date = NaiveDate::parse_from_str(s, DATE_FORMAT).map_err(|err| InvalidDateFormat {
        input: s.to_string(),
        reason: err.to_string(),
    })?;

    // chrono accepts "2026-1-5"; listing dates are always zero-padded, so reject it here.
    if date.format(DATE_FORMAT).to_string() != s {
        return Err(InvalidDateFormat {
            input: s.to_string(),
            reason: "month and day must be zero-padded".to_string(),
        });
    }

    Ok(date)
}
