//! "N units ago" rendering for scrobble times.
//!
//! The user page shows times like `9 Jun 1:16pm` for scrobbles of the current
//! year and `9 Jun 2015, 1:16pm` for older ones. The year is put back before
//! the text is parsed.

use crate::data::TrackTime;
use chrono::{DateTime, Datelike, Duration, Local, NaiveDateTime, TimeZone};
use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

/// Format of the user page times once the year is present
pub const SCRAPED_DATE_FORMAT: &str = "%d %b %Y, %I:%M%p";

static YEAR: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b\d{4}\b").expect("static regex must compile"));

#[derive(Debug, Error)]
pub enum TimeAgoError {
    #[error("Cannot parse date '{0}': {1}")]
    Parse(String, chrono::ParseError),

    #[error("Date '{0}' does not exist in the local time zone")]
    NonExistent(String),
}

/// Insert `year` before the hour of a scraped date that has no year.
///
/// `9 Jun 1:16pm` becomes `9 Jun 2026, 1:16pm` and `19 Jun 11:16pm` becomes
/// `19 Jun 2026, 11:16pm`. Text that already carries a year, or has no
/// `hour:minute` part, is returned unchanged.
pub fn inject_year(text: &str, year: i32) -> String {
    let text = text.trim();
    if YEAR.is_match(text) {
        return text.to_string();
    }

    let Some((head, tail)) = text.rsplit_once(':') else {
        return text.to_string();
    };

    let hour_digits = head.chars().rev().take_while(|c| c.is_ascii_digit()).count().min(2);
    if hour_digits == 0 {
        return text.to_string();
    }

    let split = head.len() - hour_digits;
    format!("{}{}, {}:{}", &head[..split], year, &head[split..], tail)
}

fn parse_with_year(text: &str, year: i32) -> Result<DateTime<Local>, TimeAgoError> {
    let full = inject_year(text, year);
    let naive = NaiveDateTime::parse_from_str(&full, SCRAPED_DATE_FORMAT)
        .map_err(|e| TimeAgoError::Parse(full.clone(), e))?;
    Local
        .from_local_datetime(&naive)
        .earliest()
        .ok_or(TimeAgoError::NonExistent(full))
}

/// Parse a user page date in local time, relative to `now`.
///
/// A date without a year that would lie more than a day in the future is
/// taken from the previous year (a December scrobble read in January).
pub fn parse_scraped_date(text: &str, now: DateTime<Local>) -> Result<DateTime<Local>, TimeAgoError> {
    let parsed = parse_with_year(text, now.year())?;
    if !YEAR.is_match(text) && parsed > now + Duration::days(1) {
        debug!("Date '{}' lies in the future, using the previous year", text);
        return parse_with_year(text, now.year() - 1);
    }
    Ok(parsed)
}

fn plural(count: i64, unit: &str) -> String {
    if count == 1 {
        format!("{} {} ago", count, unit)
    } else {
        format!("{} {}s ago", count, unit)
    }
}

/// Render elapsed seconds in the coarsest unit that is at least one
pub fn format_elapsed(seconds: i64) -> String {
    if seconds <= 0 {
        return "0 seconds ago".to_string();
    }
    let days = seconds / 86_400;
    if days > 0 {
        return plural(days, "day");
    }
    let hours = seconds / 3_600;
    if hours > 0 {
        return plural(hours, "hour");
    }
    let minutes = seconds / 60;
    if minutes > 0 {
        return plural(minutes, "minute");
    }
    plural(seconds, "second")
}

/// Render a track time relative to `now`.
///
/// Text that is already relative ("3 hours ago") is kept, and text that
/// cannot be parsed is shown as it is.
pub fn format_time_ago_at(time: &TrackTime, now: DateTime<Local>) -> String {
    match time {
        TrackTime::Timestamp(uts) => format_elapsed(now.timestamp().saturating_sub(*uts)),
        TrackTime::Text(text) if text.contains("ago") => text.clone(),
        TrackTime::Text(text) => match parse_scraped_date(text, now) {
            Ok(played) => format_elapsed(now.timestamp().saturating_sub(played.timestamp())),
            Err(e) => {
                debug!("Showing scraped time verbatim: {}", e);
                text.clone()
            }
        },
    }
}

/// Render a track time relative to the current time
pub fn format_time_ago(time: &TrackTime) -> String {
    format_time_ago_at(time, Local::now())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn local(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> DateTime<Local> {
        Local.with_ymd_and_hms(year, month, day, hour, minute, 0).single().unwrap()
    }

    #[test]
    fn test_inject_year_single_digit_hour() {
        assert_eq!(inject_year("9 Jun 1:16pm", 2026), "9 Jun 2026, 1:16pm");
    }

    #[test]
    fn test_inject_year_two_digit_hour() {
        assert_eq!(inject_year("19 Jun 11:16pm", 2026), "19 Jun 2026, 11:16pm");
    }

    #[test]
    fn test_inject_year_day_without_leading_zero() {
        assert_eq!(inject_year("1 Jan 10:05am", 2026), "1 Jan 2026, 10:05am");
        assert_eq!(inject_year("1 Jan 9:05am", 2026), "1 Jan 2026, 9:05am");
    }

    #[test]
    fn test_inject_year_keeps_existing_year() {
        assert_eq!(inject_year("9 Jun 2015, 1:16pm", 2026), "9 Jun 2015, 1:16pm");
    }

    #[test]
    fn test_inject_year_without_time() {
        assert_eq!(inject_year("yesterday", 2026), "yesterday");
        assert_eq!(inject_year("Jun :16pm", 2026), "Jun :16pm");
    }

    #[test]
    fn test_parse_current_year() {
        let now = local(2026, 6, 15, 12, 0);
        assert_eq!(parse_scraped_date("9 Jun 1:16pm", now).unwrap(), local(2026, 6, 9, 13, 16));
        assert_eq!(parse_scraped_date("15 Jun 11:59am", now).unwrap(), local(2026, 6, 15, 11, 59));
    }

    #[test]
    fn test_parse_explicit_year() {
        let now = local(2026, 6, 15, 12, 0);
        assert_eq!(parse_scraped_date("9 Jun 2015, 1:16pm", now).unwrap(), local(2015, 6, 9, 13, 16));
    }

    #[test]
    fn test_parse_year_rollover() {
        let now = local(2026, 1, 1, 0, 30);
        assert_eq!(parse_scraped_date("31 Dec 11:50pm", now).unwrap(), local(2025, 12, 31, 23, 50));
        assert_eq!(format_time_ago_at(&TrackTime::Text("31 Dec 11:50pm".into()), now), "40 minutes ago");
    }

    #[test]
    fn test_parse_garbage() {
        let now = local(2026, 6, 15, 12, 0);
        assert!(parse_scraped_date("sometime 1:16pm", now).is_err());
    }

    #[test]
    fn test_format_elapsed_units() {
        assert_eq!(format_elapsed(3 * 86_400 + 5), "3 days ago");
        assert_eq!(format_elapsed(86_400), "1 day ago");
        assert_eq!(format_elapsed(86_399), "23 hours ago");
        assert_eq!(format_elapsed(3_600), "1 hour ago");
        assert_eq!(format_elapsed(3_599), "59 minutes ago");
        assert_eq!(format_elapsed(60), "1 minute ago");
        assert_eq!(format_elapsed(59), "59 seconds ago");
        assert_eq!(format_elapsed(1), "1 second ago");
    }

    #[test]
    fn test_format_elapsed_zero_and_negative() {
        assert_eq!(format_elapsed(0), "0 seconds ago");
        assert_eq!(format_elapsed(-120), "0 seconds ago");
    }

    #[test]
    fn test_format_time_ago_at() {
        let now = local(2026, 6, 15, 12, 0);
        let timestamp = TrackTime::Timestamp(now.timestamp() - 2 * 3_600 - 10);
        assert_eq!(format_time_ago_at(&timestamp, now), "2 hours ago");

        let scraped = TrackTime::Text("9 Jun 1:16pm".into());
        assert_eq!(format_time_ago_at(&scraped, now), "5 days ago");

        let relative = TrackTime::Text("3 minutes ago".into());
        assert_eq!(format_time_ago_at(&relative, now), "3 minutes ago");

        let unknown = TrackTime::Text("a while back".into());
        assert_eq!(format_time_ago_at(&unknown, now), "a while back");
    }

    #[test]
    fn test_web_service_timestamp() {
        let now = local(2008, 6, 12, 12, 0);
        let played = TrackTime::Timestamp(now.timestamp() - 3 * 86_400 - 7_200);
        assert_eq!(format_time_ago_at(&played, now), "3 days ago");
    }

    #[test]
    fn test_extreme_timestamps_saturate() {
        use crate::parsers::recent_tracks::parse_api_xml;

        let now = local(2026, 6, 15, 12, 0);
        let xml = r#"<recenttracks user="U"><track><artist>A</artist><name>T</name><date uts="-9223372036854775808"/></track></recenttracks>"#;
        let track = parse_api_xml(xml).unwrap();
        let time = track.time.unwrap();
        assert_eq!(time, TrackTime::Timestamp(i64::MIN));
        assert_eq!(format_time_ago_at(&time, now), format!("{} days ago", i64::MAX / 86_400));

        assert_eq!(format_time_ago_at(&TrackTime::Timestamp(i64::MAX), now), "0 seconds ago");
    }
}
