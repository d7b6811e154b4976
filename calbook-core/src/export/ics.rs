//! iCalendar (RFC 5545) export.

use chrono::NaiveDateTime;
use chrono_tz::Tz;
use icalendar::{Component, EventLike};
use std::path::{Path, PathBuf};

use super::{Exporter, write_file};
use crate::calendar::Calendar;
use crate::error::CalBookResult;
use crate::event::{Event, EventStatus, LocationType};
use crate::zone;

#[derive(Debug, Clone, Copy, Default)]
pub struct IcsExporter;

impl Exporter for IcsExporter {
    fn export(&self, events: &[Event], calendar: &Calendar, path: &Path) -> CalBookResult<PathBuf> {
        write_file(path, &render(events, calendar))
    }
}

fn render(events: &[Event], calendar: &Calendar) -> String {
    let zone = calendar.time_zone();

    let mut cal = icalendar::Calendar::new();
    cal.name(calendar.name());
    cal.timezone(zone.name());

    for event in events {
        cal.push(vevent(event, zone));
    }

    clean_output(&cal.done().to_string())
}

fn vevent(event: &Event, zone: Tz) -> icalendar::Event {
    let mut ics_event = icalendar::Event::new();
    ics_event.uid(&uid(event));
    ics_event.summary(event.subject());
    ics_event.add_property("DTSTART", utc_stamp(event.start(), zone));
    ics_event.add_property("DTEND", utc_stamp(event.end(), zone));

    if let Some(desc) = event.description() {
        ics_event.description(desc);
    }

    if event.location() != LocationType::None {
        ics_event.location(event.location().display_value());
    }

    let class = match event.status() {
        EventStatus::Public => "PUBLIC",
        EventStatus::Private => "PRIVATE",
    };
    ics_event.add_property("CLASS", class);

    if event.is_all_day() {
        ics_event.add_property("X-MICROSOFT-CDO-ALLDAYEVENT", "TRUE");
    }

    ics_event.done()
}

fn utc_stamp(local: NaiveDateTime, zone: Tz) -> String {
    zone::to_utc(local, zone).format("%Y%m%dT%H%M%SZ").to_string()
}

/// Stable across exports of the same event.
fn uid(event: &Event) -> String {
    format!(
        "{}-{}@calbook",
        slugify(event.subject()),
        event.start().format("%Y%m%dT%H%M")
    )
}

/// Lowercase, collapse runs of non-alphanumerics into one dash, cap at 50 chars.
fn slugify(s: &str) -> String {
    let mut slug = String::new();
    for c in s.to_lowercase().chars() {
        if c.is_alphanumeric() {
            slug.push(c);
        } else if !slug.ends_with('-') {
            slug.push('-');
        }
    }
    slug.trim_matches('-').chars().take(50).collect()
}

/// Replace the crate's PRODID with ours and drop the default CALSCALE line.
fn clean_output(ics: &str) -> String {
    let mut result = String::with_capacity(ics.len());
    for line in ics.lines() {
        if line.starts_with("PRODID:") {
            result.push_str("PRODID:-//calbook//EN\r\n");
            continue;
        }
        if line == "CALSCALE:GREGORIAN" {
            continue;
        }
        result.push_str(line);
        result.push_str("\r\n");
    }
    result
}
