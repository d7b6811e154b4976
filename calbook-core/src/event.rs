//! Calendar events and the builder that validates them.
//!
//! Event times are wall-clock values with no zone attached; they are read in
//! the zone of whichever calendar holds the event.

use chrono::{NaiveDateTime, NaiveTime};
use std::fmt;
use std::str::FromStr;

use crate::error::{CalBookError, CalBookResult, InvalidEventKind};

/// Where an event takes place.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum LocationType {
    #[default]
    None,
    Physical,
    Online,
}

impl LocationType {
    pub fn display_value(&self) -> &'static str {
        match self {
            LocationType::None => "",
            LocationType::Physical => "Physical",
            LocationType::Online => "Online",
        }
    }

    /// Lenient lookup by display value. Unknown text maps to `None`.
    pub fn from_display_value(value: &str) -> Self {
        if value.eq_ignore_ascii_case("physical") {
            LocationType::Physical
        } else if value.eq_ignore_ascii_case("online") {
            LocationType::Online
        } else {
            LocationType::None
        }
    }
}

impl fmt::Display for LocationType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.display_value())
    }
}

/// Visibility of an event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum EventStatus {
    #[default]
    Public,
    Private,
}

impl FromStr for EventStatus {
    type Err = CalBookError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "public" => Ok(EventStatus::Public),
            "private" => Ok(EventStatus::Private),
            _ => Err(CalBookError::InvalidArgument(format!(
                "Invalid status '{}'. Expected public or private",
                s
            ))),
        }
    }
}

impl fmt::Display for EventStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            EventStatus::Public => f.write_str("PUBLIC"),
            EventStatus::Private => f.write_str("PRIVATE"),
        }
    }
}

/// Identity of an event inside a calendar.
///
/// Only subject, start and end take part; description, location, status,
/// the all-day flag and the series id do not. Field order makes the derived
/// ordering sort by start time first.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EventKey {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub subject: String,
}

impl fmt::Display for EventKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "'{}' from {} to {}",
            self.subject,
            self.start.format("%Y-%m-%dT%H:%M"),
            self.end.format("%Y-%m-%dT%H:%M")
        )
    }
}

/// A single calendar occurrence. Immutable once built; edits produce new values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    subject: String,
    start: NaiveDateTime,
    end: NaiveDateTime,
    description: Option<String>,
    location: LocationType,
    status: EventStatus,
    all_day: bool,
    series_id: Option<String>,
}

impl Event {
    pub fn builder() -> EventBuilder {
        EventBuilder::default()
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }

    pub fn start(&self) -> NaiveDateTime {
        self.start
    }

    pub fn end(&self) -> NaiveDateTime {
        self.end
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn location(&self) -> LocationType {
        self.location
    }

    pub fn status(&self) -> EventStatus {
        self.status
    }

    pub fn is_all_day(&self) -> bool {
        self.all_day
    }

    pub fn series_id(&self) -> Option<&str> {
        self.series_id.as_deref()
    }

    pub fn is_in_series(&self) -> bool {
        self.series_id.is_some()
    }

    pub fn key(&self) -> EventKey {
        EventKey {
            start: self.start,
            end: self.end,
            subject: self.subject.clone(),
        }
    }

    /// A builder pre-filled with every field of this event.
    pub fn to_builder(&self) -> EventBuilder {
        EventBuilder {
            subject: Some(self.subject.clone()),
            start: Some(self.start),
            end: Some(self.end),
            description: self.description.clone(),
            location: self.location,
            status: self.status,
            all_day: self.all_day,
            series_id: self.series_id.clone(),
        }
    }

    /// Same event with new times. Everything else, series id included, is kept.
    /// All-day events are re-normalized onto the date of `new_start`.
    pub fn copy_with_new_times(
        &self,
        new_start: NaiveDateTime,
        new_end: NaiveDateTime,
    ) -> CalBookResult<Event> {
        self.to_builder().start(new_start).end(new_end).build()
    }

    /// Same event with a different series association (or none).
    pub fn copy_with_series_id(&self, series_id: Option<String>) -> Event {
        Event {
            series_id,
            ..self.clone()
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.subject)
    }
}

const ALL_DAY_START: (u32, u32) = (8, 0);
const ALL_DAY_END: (u32, u32) = (17, 0);

fn all_day_bounds(on: NaiveDateTime) -> (NaiveDateTime, NaiveDateTime) {
    let date = on.date();
    let at = |(h, m): (u32, u32)| date.and_time(NaiveTime::from_hms_opt(h, m, 0).unwrap_or_default());
    (at(ALL_DAY_START), at(ALL_DAY_END))
}

/// Collects event fields and validates them in [`EventBuilder::build`].
#[derive(Debug, Clone, Default)]
pub struct EventBuilder {
    subject: Option<String>,
    start: Option<NaiveDateTime>,
    end: Option<NaiveDateTime>,
    description: Option<String>,
    location: LocationType,
    status: EventStatus,
    all_day: bool,
    series_id: Option<String>,
}

impl EventBuilder {
    pub fn subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    pub fn start(mut self, start: NaiveDateTime) -> Self {
        self.start = Some(start);
        self
    }

    pub fn end(mut self, end: NaiveDateTime) -> Self {
        self.end = Some(end);
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn location(mut self, location: LocationType) -> Self {
        self.location = location;
        self
    }

    pub fn status(mut self, status: EventStatus) -> Self {
        self.status = status;
        self
    }

    pub fn all_day(mut self, all_day: bool) -> Self {
        self.all_day = all_day;
        self
    }

    pub fn series_id(mut self, series_id: Option<String>) -> Self {
        self.series_id = series_id;
        self
    }

    pub fn build(self) -> CalBookResult<Event> {
        let subject = match self.subject {
            Some(s) if !s.trim().is_empty() => s,
            _ => return Err(InvalidEventKind::BlankSubject.into()),
        };

        let start = self.start.ok_or(InvalidEventKind::MissingStart)?;

        let (start, end) = if self.all_day {
            all_day_bounds(start)
        } else {
            let end = self.end.ok_or(InvalidEventKind::MissingEnd)?;
            if start >= end {
                return Err(InvalidEventKind::EndNotAfterStart.into());
            }
            (start, end)
        };

        Ok(Event {
            subject,
            start,
            end,
            description: self.description,
            location: self.location,
            status: self.status,
            all_day: self.all_day,
            series_id: self.series_id,
        })
    }
}
