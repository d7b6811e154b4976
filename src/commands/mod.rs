//! Parsed commands and how each one runs against the calendars.

mod parse;

pub use parse::parse;

use anyhow::{Context, Result};
use calbook_core::export::exporter_for;
use calbook_core::{
    CalBookError, CalendarManager, CalendarProperty, EditProperty, EditScope, EditValue,
};
use chrono::{NaiveDate, NaiveDateTime, Weekday};
use chrono_tz::Tz;
use std::collections::HashSet;

use crate::config::CalbookConfig;
use crate::view::View;

/// When a created event takes place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventTimes {
    Timed {
        start: NaiveDateTime,
        end: NaiveDateTime,
    },
    AllDay(NaiveDate),
}

/// How a created event repeats.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Repeat {
    pub weekdays: HashSet<Weekday>,
    pub until: RepeatEnd,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepeatEnd {
    Times(u32),
    Date(NaiveDate),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    CreateCalendar {
        name: String,
        zone: Option<Tz>,
    },
    UseCalendar {
        name: String,
    },
    EditCalendar {
        name: String,
        property: CalendarProperty,
        value: String,
    },
    CreateEvent {
        subject: String,
        times: EventTimes,
        repeat: Option<Repeat>,
    },
    EditEvent {
        scope: EditScope,
        property: EditProperty,
        subject: String,
        start: NaiveDateTime,
        end: Option<NaiveDateTime>,
        value: EditValue,
    },
    PrintOnDate(NaiveDate),
    PrintRange {
        start: NaiveDateTime,
        end: NaiveDateTime,
    },
    ShowStatus(NaiveDateTime),
    Export {
        file: String,
    },
    CopyEvent {
        subject: String,
        source: NaiveDateTime,
        target: String,
        target_start: NaiveDateTime,
    },
    CopyEventsOnDate {
        date: NaiveDate,
        target: String,
        target_date: NaiveDate,
    },
    CopyEventsBetween {
        start: NaiveDate,
        end: NaiveDate,
        target: String,
        target_start: NaiveDate,
    },
    Exit,
}

impl Command {
    pub fn execute(
        &self,
        manager: &mut CalendarManager,
        view: &mut dyn View,
        config: &CalbookConfig,
    ) -> Result<()> {
        match self {
            Command::CreateCalendar { name, zone } => {
                let zone = match zone {
                    Some(z) => *z,
                    None => config.default_zone()?,
                };
                manager.create_calendar(name, zone)?;
                view.message(&format!("Calendar created: {} ({})", name, zone))?;
            }
            Command::UseCalendar { name } => {
                manager.use_calendar(name)?;
                view.message(&format!("Using calendar: {}", name))?;
            }
            Command::EditCalendar {
                name,
                property,
                value,
            } => {
                manager.edit_calendar(name, *property, value)?;
                view.message(&format!("Calendar edited: {} {} set to {}", name, property, value))?;
            }
            Command::CreateEvent {
                subject,
                times,
                repeat,
            } => {
                let created = create_event(manager, subject, times, repeat.as_ref())?;
                view.message(&format!("Event created: {} ({} added)", subject, created))?;
            }
            Command::EditEvent {
                scope,
                property,
                subject,
                start,
                end,
                value,
            } => {
                let calendar = manager.active_calendar_mut()?;
                if let Some(end) = end {
                    let found = calendar.find_event(subject, *start)?;
                    if found.end() != *end {
                        return Err(CalBookError::EventNotFound {
                            subject: subject.clone(),
                            start: *start,
                        }
                        .into());
                    }
                }
                calendar.edit_event(subject, *start, *property, value, *scope)?;
                view.message(&format!("Event edited: {}", subject))?;
            }
            Command::PrintOnDate(date) => {
                let events = manager.active_calendar()?.events_on_date(*date);
                view.events_on_date(*date, &events)?;
            }
            Command::PrintRange { start, end } => {
                let events = manager.active_calendar()?.events_in_range(*start, *end);
                view.events_in_range(&events)?;
            }
            Command::ShowStatus(at) => {
                let busy = manager.active_calendar()?.is_busy(*at);
                view.busy_status(busy)?;
            }
            Command::Export { file } => {
                let calendar = manager.active_calendar()?;
                let (exporter, name) = exporter_for(file);
                let path = config.export_path(&name);
                let written = exporter
                    .export(&calendar.events(), calendar, &path)
                    .with_context(|| format!("Could not export to {}", path.display()))?;
                view.message(&format!(
                    "Calendar exported successfully to: {}",
                    written.display()
                ))?;
            }
            Command::CopyEvent {
                subject,
                source,
                target,
                target_start,
            } => {
                manager.copy_event(subject, *source, target, *target_start)?;
                view.message(&format!("Event copied: {} to {}", subject, target))?;
            }
            Command::CopyEventsOnDate {
                date,
                target,
                target_date,
            } => {
                let copied = manager.copy_events_on_date(*date, target, *target_date)?;
                view.message(&format!("{} event(s) copied to {}", copied, target))?;
            }
            Command::CopyEventsBetween {
                start,
                end,
                target,
                target_start,
            } => {
                let copied = manager.copy_events_between(*start, *end, target, *target_start)?;
                view.message(&format!("{} event(s) copied to {}", copied, target))?;
            }
            Command::Exit => {}
        }
        Ok(())
    }
}

fn create_event(
    manager: &mut CalendarManager,
    subject: &str,
    times: &EventTimes,
    repeat: Option<&Repeat>,
) -> Result<usize> {
    let calendar = manager.active_calendar_mut()?;

    let created = match (times, repeat) {
        (EventTimes::Timed { start, end }, None) => {
            calendar.create_event(subject, *start, *end, false)?;
            1
        }
        (EventTimes::AllDay(date), None) => {
            let start = date.and_time(chrono::NaiveTime::MIN);
            calendar.create_event(subject, start, start, true)?;
            1
        }
        (EventTimes::Timed { start, end }, Some(repeat)) => {
            if start.date() != end.date() {
                anyhow::bail!("A repeating event must start and end on the same day");
            }
            let (date, from, to) = (start.date(), start.time(), end.time());
            match repeat.until {
                RepeatEnd::Times(n) => {
                    calendar.create_event_series(subject, date, from, to, &repeat.weekdays, n)?
                }
                RepeatEnd::Date(last) => calendar
                    .create_event_series_till(subject, date, from, to, &repeat.weekdays, last)?,
            }
        }
        (EventTimes::AllDay(date), Some(repeat)) => match repeat.until {
            RepeatEnd::Times(n) => {
                calendar.create_all_day_event_series(subject, *date, &repeat.weekdays, n)?
            }
            RepeatEnd::Date(last) => {
                calendar.create_all_day_event_series_till(subject, *date, &repeat.weekdays, last)?
            }
        },
    };

    Ok(created)
}
