//! Google Calendar flavoured CSV.

use chrono::NaiveDateTime;
use std::path::{Path, PathBuf};

use super::{Exporter, write_file};
use crate::calendar::Calendar;
use crate::error::CalBookResult;
use crate::event::{Event, EventStatus};

const HEADER: &str =
    "Subject,Start Date,Start Time,End Date,End Time,All Day Event,Description,Location,Private";

#[derive(Debug, Clone, Copy, Default)]
pub struct CsvExporter;

impl Exporter for CsvExporter {
    fn export(&self, events: &[Event], _calendar: &Calendar, path: &Path) -> CalBookResult<PathBuf> {
        write_file(path, &render(events))
    }
}

fn render(events: &[Event]) -> String {
    let mut out = String::from(HEADER);
    out.push('\n');
    for event in events {
        out.push_str(&row(event));
        out.push('\n');
    }
    out
}

fn row(event: &Event) -> String {
    let time = |dt: NaiveDateTime| {
        if event.is_all_day() {
            String::new()
        } else {
            dt.format("%I:%M %p").to_string()
        }
    };

    [
        escape(event.subject()),
        event.start().format("%m/%d/%Y").to_string(),
        time(event.start()),
        event.end().format("%m/%d/%Y").to_string(),
        time(event.end()),
        flag(event.is_all_day()).to_string(),
        escape(event.description().unwrap_or_default()),
        escape(event.location().display_value()),
        flag(event.status() == EventStatus::Private).to_string(),
    ]
    .join(",")
}

fn flag(value: bool) -> &'static str {
    if value { "True" } else { "False" }
}

/// Quote a field when it holds a separator, quote or newline.
fn escape(value: &str) -> String {
    if value.contains([',', '"', '\n']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}
