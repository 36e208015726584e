use dw_feed::{ConnectionState, EventWindow, FeedEvent};

use chrono::{DateTime, Local, NaiveDateTime, TimeZone};

/// Entity values shown per entity group.
const TAGS_PER_KIND: usize = 3;

pub struct FeedOptions {
    pub critical_only: bool,
    pub json: bool,
    pub pretty: bool,
}

/// Events that arrived since `seen` events had been observed, oldest first.
/// Events already pushed out of the window are skipped.
pub fn fresh_events(window: &EventWindow, seen: u64) -> Vec<FeedEvent> {
    let new = window.total_received().saturating_sub(seen);
    let new = usize::try_from(new).unwrap_or(usize::MAX).min(window.len());

    window.iter().take(new).rev().cloned().collect()
}

pub fn state_line(state: ConnectionState) -> String {
    match state {
        ConnectionState::Connecting => String::from("-- connecting to live feed..."),
        ConnectionState::Open => String::from("-- live feed online"),
        ConnectionState::Closed => String::from("-- live feed offline"),
    }
}

pub fn event_output(event: &FeedEvent, options: &FeedOptions) -> serde_json::Result<String> {
    if !options.json {
        return Ok(event_line(event, &Local));
    }

    if options.pretty {
        serde_json::to_string_pretty(event)
    } else {
        serde_json::to_string(event)
    }
}

/// One terminal line per event:
/// `[time] LABEL  title  url  [CRITICAL THREAT]  {tags}`
pub fn event_line<Tz>(event: &FeedEvent, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    let mut line = format!(
        "[{}] {:<12} {}",
        format_timestamp(event.timestamp(), tz),
        event.label().unwrap_or("UNKNOWN").to_uppercase(),
        event.title().unwrap_or("Untitled Document"),
    );

    if let Some(url) = event.url() {
        line.push_str("  ");
        line.push_str(url);
    }

    if event.is_critical() {
        line.push_str("  [CRITICAL THREAT]");
    }

    let tags = event.entity_tags(TAGS_PER_KIND);
    if !tags.is_empty() {
        line.push_str("  {");
        line.push_str(&tags.join(", "));
        line.push('}');
    }

    line
}

/// Wall-clock time of an event in `tz`. Accepts RFC 3339 and naive ISO-8601
/// (taken as UTC); anything else is shown verbatim.
pub fn format_timestamp<Tz>(raw: Option<&str>, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    let Some(raw) = raw else {
        return String::from("--:--:--");
    };

    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return parsed.with_timezone(tz).format("%H:%M:%S").to_string();
    }

    match NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        Ok(naive) => naive.and_utc().with_timezone(tz).format("%H:%M:%S").to_string(),
        Err(_) => raw.to_string(),
    }
}
