//! Registry of named calendars, the active-calendar pointer, and the
//! cross-calendar copy operations.

use chrono::{Datelike, Days, Duration, NaiveDate, NaiveDateTime, NaiveTime, Weekday};
use chrono_tz::Tz;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use tracing::info;

use crate::calendar::Calendar;
use crate::error::{CalBookError, CalBookResult};
use crate::event::Event;
use crate::zone;

/// Calendar-level properties accepted by [`CalendarManager::edit_calendar`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalendarProperty {
    Name,
    Timezone,
}

impl FromStr for CalendarProperty {
    type Err = CalBookError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "name" => Ok(CalendarProperty::Name),
            "timezone" => Ok(CalendarProperty::Timezone),
            _ => Err(CalBookError::InvalidArgument(format!(
                "Unknown calendar property '{}'. Expected name or timezone",
                s
            ))),
        }
    }
}

impl fmt::Display for CalendarProperty {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            CalendarProperty::Name => f.write_str("name"),
            CalendarProperty::Timezone => f.write_str("timezone"),
        }
    }
}

#[derive(Debug, Default)]
pub struct CalendarManager {
    calendars: HashMap<String, Calendar>,
    active: Option<String>,
    copy_counter: u32,
}

impl CalendarManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create_calendar(&mut self, name: &str, time_zone: Tz) -> CalBookResult<()> {
        if self.calendars.contains_key(name) {
            return Err(CalBookError::DuplicateCalendar(name.to_string()));
        }
        let calendar = Calendar::new(name, time_zone)?;
        info!(calendar = %name, zone = %time_zone, "calendar created");
        self.calendars.insert(name.to_string(), calendar);
        Ok(())
    }

    pub fn use_calendar(&mut self, name: &str) -> CalBookResult<()> {
        if !self.calendars.contains_key(name) {
            return Err(CalBookError::CalendarNotFound(name.to_string()));
        }
        self.active = Some(name.to_string());
        Ok(())
    }

    pub fn calendar(&self, name: &str) -> CalBookResult<&Calendar> {
        self.calendars
            .get(name)
            .ok_or_else(|| CalBookError::CalendarNotFound(name.to_string()))
    }

    fn calendar_mut(&mut self, name: &str) -> CalBookResult<&mut Calendar> {
        self.calendars
            .get_mut(name)
            .ok_or_else(|| CalBookError::CalendarNotFound(name.to_string()))
    }

    /// Names of every calendar, sorted.
    pub fn calendar_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.calendars.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn active_calendar(&self) -> CalBookResult<&Calendar> {
        let name = self.active.as_deref().ok_or(CalBookError::NoActiveCalendar)?;
        self.calendar(name)
    }

    pub fn active_calendar_mut(&mut self) -> CalBookResult<&mut Calendar> {
        let name = self.active.clone().ok_or(CalBookError::NoActiveCalendar)?;
        self.calendar_mut(&name)
    }

    /// Rename a calendar or move it to another time zone.
    pub fn edit_calendar(
        &mut self,
        name: &str,
        property: CalendarProperty,
        value: &str,
    ) -> CalBookResult<()> {
        match property {
            CalendarProperty::Name => self.rename_calendar(name, value),
            CalendarProperty::Timezone => {
                let zone = zone::parse_time_zone(value)?;
                self.calendar_mut(name)?.set_time_zone(zone)
            }
        }
    }

    fn rename_calendar(&mut self, name: &str, new_name: &str) -> CalBookResult<()> {
        if !self.calendars.contains_key(name) {
            return Err(CalBookError::CalendarNotFound(name.to_string()));
        }
        if name == new_name {
            return Ok(());
        }
        if self.calendars.contains_key(new_name) {
            return Err(CalBookError::DuplicateCalendar(new_name.to_string()));
        }

        let mut calendar = self.calendar(name)?.clone();
        calendar.set_name(new_name)?;

        self.calendars.remove(name);
        self.calendars.insert(new_name.to_string(), calendar);
        if self.active.as_deref() == Some(name) {
            self.active = Some(new_name.to_string());
        }

        info!(from = %name, to = %new_name, "calendar renamed");
        Ok(())
    }

    // COPYING:
    //
    // Copies read from the active calendar. A copy into a different calendar
    // never keeps the source series id: single copies drop it, bulk copies map
    // each source series onto one fresh id for the duration of the call.

    /// Copy one event to `target_start` in `target`, keeping its duration.
    pub fn copy_event(
        &mut self,
        subject: &str,
        source_start: NaiveDateTime,
        target: &str,
        target_start: NaiveDateTime,
    ) -> CalBookResult<()> {
        let source = self.active_calendar()?;
        let same_calendar = source.name() == target;
        self.calendar(target)?;

        let event = source.find_event(subject, source_start)?;
        let duration = event.end() - event.start();
        let mut copy = event.copy_with_new_times(target_start, target_start + duration)?;
        if !same_calendar {
            copy = copy.copy_with_series_id(None);
        }

        self.calendar_mut(target)?.add_event(copy)?;
        info!(event = %subject, target = %target, "event copied");
        Ok(())
    }

    /// Copy every event on `source_date` to `target_date` in `target`,
    /// converting wall-clock times into the target calendar's zone.
    pub fn copy_events_on_date(
        &mut self,
        source_date: NaiveDate,
        target: &str,
        target_date: NaiveDate,
    ) -> CalBookResult<usize> {
        let events = self.active_calendar()?.events_on_date(source_date);
        self.copy_into(events, target, |_| target_date)
    }

    /// Copy every event starting between `start_date` and `end_date`
    /// (inclusive) so that the block begins the week of `target_start`.
    ///
    /// Each event lands on the first day on or after `target_start` with its
    /// own weekday, pushed forward by as many weeks as it sat after the week
    /// of `start_date`.
    pub fn copy_events_between(
        &mut self,
        start_date: NaiveDate,
        end_date: NaiveDate,
        target: &str,
        target_start: NaiveDate,
    ) -> CalBookResult<usize> {
        let range_start = start_date.and_time(NaiveTime::MIN);
        let range_end = end_date
            .checked_add_days(Days::new(1))
            .map(|d| d.and_time(NaiveTime::MIN))
            .ok_or_else(|| {
                CalBookError::InvalidArgument(format!("Date {} is out of range", end_date))
            })?;

        let events: Vec<Event> = self
            .active_calendar()?
            .events()
            .into_iter()
            .filter(|e| range_start <= e.start() && e.start() < range_end)
            .collect();

        let source_week = week_start(start_date);
        self.copy_into(events, target, |event| {
            let date = event.start().date();
            let weeks = (week_start(date) - source_week).num_weeks();
            next_or_same(target_start, date.weekday()) + Duration::weeks(weeks)
        })
    }

    /// Move `events` from the active calendar into `target`, placing each on
    /// the date chosen by `place`. Nothing is inserted unless every copy fits.
    fn copy_into<F>(&mut self, events: Vec<Event>, target: &str, place: F) -> CalBookResult<usize>
    where
        F: Fn(&Event) -> NaiveDate,
    {
        let source = self.active_calendar()?;
        let from_zone = source.time_zone();
        let same_calendar = source.name() == target;
        let to_zone = self.calendar(target)?.time_zone();

        let mut series_map: HashMap<String, String> = HashMap::new();
        let mut copies = Vec::with_capacity(events.len());

        for event in &events {
            let date = place(event);
            let start = zone::convert(event.start(), from_zone, to_zone).time();
            let end = zone::convert(event.end(), from_zone, to_zone).time();
            let mut copy = event.copy_with_new_times(date.and_time(start), date.and_time(end))?;

            if !same_calendar {
                if let Some(old_id) = event.series_id() {
                    let new_id = match series_map.get(old_id) {
                        Some(id) => id.clone(),
                        None => {
                            let id = self.next_copy_series_id();
                            series_map.insert(old_id.to_string(), id.clone());
                            id
                        }
                    };
                    copy = copy.copy_with_series_id(Some(new_id));
                }
            }
            copies.push(copy);
        }

        let copied = self.calendar_mut(target)?.add_events(copies)?;
        info!(copied, target = %target, "events copied");
        Ok(copied)
    }

    fn next_copy_series_id(&mut self) -> String {
        self.copy_counter += 1;
        format!("SID_COPY_{}", self.copy_counter)
    }
}

/// Monday of the week containing `date`.
fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(i64::from(date.weekday().num_days_from_monday()))
}

/// First date on or after `date` that falls on `weekday`.
fn next_or_same(date: NaiveDate, weekday: Weekday) -> NaiveDate {
    let ahead = (7 + weekday.num_days_from_monday() - date.weekday().num_days_from_monday()) % 7;
    date + Duration::days(i64::from(ahead))
}
