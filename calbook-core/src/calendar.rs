//! A named, zone-tagged collection of events.

use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime, Weekday};
use chrono_tz::Tz;
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use tracing::{debug, info};

use crate::edit::{self, EditProperty, EditScope, EditValue};
use crate::error::{CalBookError, CalBookResult};
use crate::event::{Event, EventKey};
use crate::zone;

/// Events keyed by their identity. Ordered by start time.
type EventMap = BTreeMap<EventKey, Event>;

#[derive(Debug, Clone)]
pub struct Calendar {
    name: String,
    time_zone: Tz,
    events: EventMap,
    series_counter: u32,
}

impl Calendar {
    pub fn new(name: &str, time_zone: Tz) -> CalBookResult<Self> {
        Ok(Calendar {
            name: validate_name(name)?,
            time_zone,
            events: EventMap::new(),
            series_counter: 0,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: &str) -> CalBookResult<()> {
        self.name = validate_name(name)?;
        Ok(())
    }

    pub fn time_zone(&self) -> Tz {
        self.time_zone
    }

    /// Every event, ordered by start time.
    pub fn events(&self) -> Vec<Event> {
        self.events.values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    // SINGLE EVENTS:

    pub fn add_event(&mut self, event: Event) -> CalBookResult<()> {
        insert_unique(&mut self.events, event)
    }

    /// Insert several events, all or nothing.
    pub fn add_events(&mut self, events: Vec<Event>) -> CalBookResult<usize> {
        let count = events.len();
        self.replace(&[], events)?;
        Ok(count)
    }

    pub fn create_event(
        &mut self,
        subject: &str,
        start: NaiveDateTime,
        end: NaiveDateTime,
        all_day: bool,
    ) -> CalBookResult<()> {
        let event = Event::builder()
            .subject(subject)
            .start(start)
            .end(end)
            .all_day(all_day)
            .build()?;
        self.add_event(event)
    }

    // SERIES:
    //
    // A duplicate met halfway through generation stops it, and the occurrences
    // inserted before that point stay in the calendar.

    /// Timed series that stops after `occurrences` matching days.
    pub fn create_event_series(
        &mut self,
        subject: &str,
        start_date: NaiveDate,
        start_time: NaiveTime,
        end_time: NaiveTime,
        weekdays: &HashSet<Weekday>,
        occurrences: u32,
    ) -> CalBookResult<usize> {
        check_occurrences(occurrences)?;
        check_weekdays(weekdays)?;
        check_times(start_time, end_time)?;

        let dates = matching_days(start_date, weekdays).take(occurrences as usize);
        self.generate_series(dates, |date, series_id| {
            timed_occurrence(subject, date, start_time, end_time, series_id)
        })
    }

    /// Timed series covering every matching day up to and including `end_date`.
    pub fn create_event_series_till(
        &mut self,
        subject: &str,
        start_date: NaiveDate,
        start_time: NaiveTime,
        end_time: NaiveTime,
        weekdays: &HashSet<Weekday>,
        end_date: NaiveDate,
    ) -> CalBookResult<usize> {
        check_end_date(start_date, end_date)?;
        check_weekdays(weekdays)?;
        check_times(start_time, end_time)?;

        let dates = matching_days(start_date, weekdays).take_while(|d| *d <= end_date);
        self.generate_series(dates, |date, series_id| {
            timed_occurrence(subject, date, start_time, end_time, series_id)
        })
    }

    pub fn create_all_day_event_series(
        &mut self,
        subject: &str,
        start_date: NaiveDate,
        weekdays: &HashSet<Weekday>,
        occurrences: u32,
    ) -> CalBookResult<usize> {
        check_occurrences(occurrences)?;
        check_weekdays(weekdays)?;

        let dates = matching_days(start_date, weekdays).take(occurrences as usize);
        self.generate_series(dates, |date, series_id| {
            all_day_occurrence(subject, date, series_id)
        })
    }

    pub fn create_all_day_event_series_till(
        &mut self,
        subject: &str,
        start_date: NaiveDate,
        weekdays: &HashSet<Weekday>,
        end_date: NaiveDate,
    ) -> CalBookResult<usize> {
        check_end_date(start_date, end_date)?;
        check_weekdays(weekdays)?;

        let dates = matching_days(start_date, weekdays).take_while(|d| *d <= end_date);
        self.generate_series(dates, |date, series_id| {
            all_day_occurrence(subject, date, series_id)
        })
    }

    fn generate_series<I, F>(&mut self, dates: I, make: F) -> CalBookResult<usize>
    where
        I: Iterator<Item = NaiveDate>,
        F: Fn(NaiveDate, &str) -> CalBookResult<Event>,
    {
        let series_id = self.next_series_id();
        let mut created = 0;

        for date in dates {
            let event = make(date, &series_id)?;
            insert_unique(&mut self.events, event)?;
            created += 1;
        }

        debug!(calendar = %self.name, series = %series_id, created, "series created");
        Ok(created)
    }

    fn next_series_id(&mut self) -> String {
        self.series_counter += 1;
        format!("SID_{}", self.series_counter)
    }

    // EDITING:

    /// Change one property of the event `(subject, start)` and, depending on
    /// `scope`, of its series siblings.
    pub fn edit_event(
        &mut self,
        subject: &str,
        start: NaiveDateTime,
        property: EditProperty,
        value: &EditValue,
        scope: EditScope,
    ) -> CalBookResult<()> {
        let target = self.find_event(subject, start)?.clone();

        let Some(series_id) = target.series_id().map(str::to_string) else {
            return self.edit_single(&target, property, value);
        };

        match scope {
            EditScope::Single => self.edit_single(&target, property, value),
            EditScope::Forward => self.edit_forward(&target, &series_id, property, value),
            EditScope::AllEvents => self.edit_series(&series_id, property, value),
        }
    }

    fn edit_single(
        &mut self,
        target: &Event,
        property: EditProperty,
        value: &EditValue,
    ) -> CalBookResult<()> {
        let mut edited = edit::apply(target, property, value)?;
        if property.is_time() {
            edited = edited.copy_with_series_id(None);
        }
        self.replace_events(std::slice::from_ref(target), vec![edited])
    }

    /// Edit `target` and its later siblings. Time edits move them into a new
    /// series; earlier occurrences keep the old id.
    fn edit_forward(
        &mut self,
        target: &Event,
        series_id: &str,
        property: EditProperty,
        value: &EditValue,
    ) -> CalBookResult<()> {
        let members: Vec<Event> = self
            .series_members(series_id)
            .filter(|e| e.start() >= target.start())
            .cloned()
            .collect();

        let new_series = property.is_time().then(|| self.next_series_id());

        let edited = members
            .iter()
            .map(|e| {
                let changed = edit::apply(e, property, value)?;
                Ok(match &new_series {
                    Some(id) => changed.copy_with_series_id(Some(id.clone())),
                    None => changed,
                })
            })
            .collect::<CalBookResult<Vec<_>>>()?;

        self.replace_events(&members, edited)
    }

    fn edit_series(
        &mut self,
        series_id: &str,
        property: EditProperty,
        value: &EditValue,
    ) -> CalBookResult<()> {
        let members: Vec<Event> = self.series_members(series_id).cloned().collect();
        let edited = members
            .iter()
            .map(|e| edit::apply(e, property, value))
            .collect::<CalBookResult<Vec<_>>>()?;

        self.replace_events(&members, edited)
    }

    fn series_members<'a>(&'a self, series_id: &'a str) -> impl Iterator<Item = &'a Event> + 'a {
        self.events
            .values()
            .filter(move |e| e.series_id() == Some(series_id))
    }

    fn replace_events(&mut self, old: &[Event], new: Vec<Event>) -> CalBookResult<()> {
        let keys: Vec<EventKey> = old.iter().map(Event::key).collect();
        self.replace(&keys, new)
    }

    /// Remove `old`, then insert `new` with duplicate checks. On error the
    /// calendar is left untouched.
    fn replace(&mut self, old: &[EventKey], new: Vec<Event>) -> CalBookResult<()> {
        let mut staged = self.events.clone();
        for key in old {
            staged.remove(key);
        }
        for event in new {
            insert_unique(&mut staged, event)?;
        }
        self.events = staged;
        Ok(())
    }

    // QUERIES:

    /// Resolve the single event with this subject and start.
    pub fn find_event(&self, subject: &str, start: NaiveDateTime) -> CalBookResult<&Event> {
        let mut matches = self
            .events
            .values()
            .filter(|e| e.subject() == subject && e.start() == start);

        let found = matches.next().ok_or_else(|| CalBookError::EventNotFound {
            subject: subject.to_string(),
            start,
        })?;

        if matches.next().is_some() {
            return Err(CalBookError::AmbiguousEvent {
                subject: subject.to_string(),
                start,
            });
        }

        Ok(found)
    }

    /// Events whose span touches `date`, ordered by start time.
    pub fn events_on_date(&self, date: NaiveDate) -> Vec<Event> {
        self.events
            .values()
            .filter(|e| e.start().date() <= date && date <= e.end().date())
            .cloned()
            .collect()
    }

    /// Events overlapping `[start, end)`, ordered by start time.
    pub fn events_in_range(&self, start: NaiveDateTime, end: NaiveDateTime) -> Vec<Event> {
        self.events
            .values()
            .filter(|e| e.start() < end && start < e.end())
            .cloned()
            .collect()
    }

    /// Whether some event covers `at`, counting its start but not its end.
    pub fn is_busy(&self, at: NaiveDateTime) -> bool {
        self.events.values().any(|e| e.start() <= at && at < e.end())
    }

    // TIME ZONE:

    /// Move every timed event to `new_zone`, keeping the instants it occupies.
    /// All-day events stay on their calendar date. The event set is swapped
    /// in one step once every event has converted; if two converted events
    /// collide the change fails with `DuplicateEvent` and nothing moves.
    pub fn set_time_zone(&mut self, new_zone: Tz) -> CalBookResult<()> {
        if new_zone == self.time_zone {
            return Ok(());
        }

        let old_zone = self.time_zone;
        let mut converted = EventMap::new();

        for event in self.events.values() {
            let moved = if event.is_all_day() {
                event.clone()
            } else {
                event.copy_with_new_times(
                    zone::convert(event.start(), old_zone, new_zone),
                    zone::convert(event.end(), old_zone, new_zone),
                )?
            };
            insert_unique(&mut converted, moved)?;
        }

        self.events = converted;
        self.time_zone = new_zone;

        info!(calendar = %self.name, from = %old_zone, to = %new_zone, "time zone changed");
        Ok(())
    }
}

impl fmt::Display for Calendar {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.time_zone)
    }
}

fn insert_unique(events: &mut EventMap, event: Event) -> CalBookResult<()> {
    let key = event.key();
    if events.contains_key(&key) {
        return Err(CalBookError::DuplicateEvent(key.to_string()));
    }
    debug!(event = %key, "event added");
    events.insert(key, event);
    Ok(())
}

fn validate_name(name: &str) -> CalBookResult<String> {
    if name.trim().is_empty() {
        return Err(CalBookError::InvalidArgument(
            "Calendar name cannot be blank".to_string(),
        ));
    }
    Ok(name.to_string())
}

fn matching_days(
    start: NaiveDate,
    weekdays: &HashSet<Weekday>,
) -> impl Iterator<Item = NaiveDate> + '_ {
    start
        .iter_days()
        .filter(move |d| weekdays.contains(&d.weekday()))
}

fn timed_occurrence(
    subject: &str,
    date: NaiveDate,
    start: NaiveTime,
    end: NaiveTime,
    series_id: &str,
) -> CalBookResult<Event> {
    Event::builder()
        .subject(subject)
        .start(date.and_time(start))
        .end(date.and_time(end))
        .series_id(Some(series_id.to_string()))
        .build()
}

fn all_day_occurrence(subject: &str, date: NaiveDate, series_id: &str) -> CalBookResult<Event> {
    Event::builder()
        .subject(subject)
        .start(date.and_time(NaiveTime::MIN))
        .all_day(true)
        .series_id(Some(series_id.to_string()))
        .build()
}

fn check_occurrences(occurrences: u32) -> CalBookResult<()> {
    if occurrences == 0 {
        return Err(CalBookError::InvalidArgument(
            "Occurrences must be greater than zero".to_string(),
        ));
    }
    Ok(())
}

fn check_weekdays(weekdays: &HashSet<Weekday>) -> CalBookResult<()> {
    if weekdays.is_empty() {
        return Err(CalBookError::InvalidArgument(
            "At least one weekday must be given".to_string(),
        ));
    }
    Ok(())
}

fn check_times(start: NaiveTime, end: NaiveTime) -> CalBookResult<()> {
    if end <= start {
        return Err(CalBookError::InvalidArgument(
            "End time must be after start time".to_string(),
        ));
    }
    Ok(())
}

fn check_end_date(start: NaiveDate, end: NaiveDate) -> CalBookResult<()> {
    if end < start {
        return Err(CalBookError::InvalidArgument(
            "Series end date cannot be before its start date".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{EventStatus, LocationType};
    use chrono::Weekday::{Fri, Mon, Tue, Wed};

    fn date(m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, m, d).unwrap()
    }

    fn time(h: u32, min: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, min, 0).unwrap()
    }

    fn at(m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        date(m, d).and_time(time(h, min))
    }

    fn days(list: &[Weekday]) -> HashSet<Weekday> {
        list.iter().copied().collect()
    }

    fn calendar() -> Calendar {
        Calendar::new("Work", Tz::America__New_York).unwrap()
    }

    fn event(subject: &str, start: NaiveDateTime, end: NaiveDateTime) -> Event {
        Event::builder()
            .subject(subject)
            .start(start)
            .end(end)
            .build()
            .unwrap()
    }

    /// Five Monday standups starting 2025-05-05, 09:00-09:30.
    fn with_standups() -> Calendar {
        let mut cal = calendar();
        cal.create_event_series("Standup", date(5, 5), time(9, 0), time(9, 30), &days(&[Mon]), 5)
            .unwrap();
        cal
    }

    fn series_of(cal: &Calendar, subject: &str) -> Vec<Option<String>> {
        cal.events()
            .into_iter()
            .filter(|e| e.subject() == subject)
            .map(|e| e.series_id().map(str::to_string))
            .collect()
    }

    #[test]
    fn rejects_blank_calendar_name() {
        assert!(matches!(
            Calendar::new("  ", Tz::UTC),
            Err(CalBookError::InvalidArgument(_))
        ));
    }

    #[test]
    fn duplicate_fingerprint_is_rejected() {
        let mut cal = calendar();
        cal.add_event(event("Review", at(5, 5, 9, 0), at(5, 5, 10, 0))).unwrap();

        let twin = event("Review", at(5, 5, 9, 0), at(5, 5, 10, 0))
            .to_builder()
            .description("different notes")
            .status(EventStatus::Private)
            .build()
            .unwrap();
        assert!(matches!(
            cal.add_event(twin),
            Err(CalBookError::DuplicateEvent(_))
        ));

        cal.add_event(event("Review", at(5, 5, 9, 0), at(5, 5, 10, 30))).unwrap();
        cal.add_event(event("Retro", at(5, 5, 9, 0), at(5, 5, 10, 0))).unwrap();
        assert_eq!(cal.len(), 3);
    }

    #[test]
    fn all_day_and_timed_events_with_same_times_collide() {
        let mut cal = calendar();
        cal.create_event("Holiday", at(5, 5, 0, 0), at(5, 5, 0, 0), true).unwrap();
        let err = cal
            .create_event("Holiday", at(5, 5, 8, 0), at(5, 5, 17, 0), false)
            .unwrap_err();
        assert!(matches!(err, CalBookError::DuplicateEvent(_)));
    }

    #[test]
    fn weekly_series_by_count() {
        let mut cal = calendar();
        let created = cal
            .create_event_series("Gym", date(5, 5), time(18, 0), time(19, 0), &days(&[Mon]), 3)
            .unwrap();
        assert_eq!(created, 3);

        let events = cal.events();
        let starts: Vec<_> = events.iter().map(Event::start).collect();
        assert_eq!(starts, vec![at(5, 5, 18, 0), at(5, 12, 18, 0), at(5, 19, 18, 0)]);
        assert!(events.iter().all(|e| e.series_id() == Some("SID_1")));
        assert!(events.iter().all(|e| e.end().time() == time(19, 0)));
    }

    #[test]
    fn series_by_count_skips_non_matching_days() {
        let mut cal = calendar();
        // 2025-05-07 is a Wednesday
        cal.create_event_series("Class", date(5, 7), time(10, 0), time(11, 0), &days(&[Tue, Fri]), 3)
            .unwrap();
        let dates: Vec<_> = cal.events().iter().map(|e| e.start().date()).collect();
        assert_eq!(dates, vec![date(5, 9), date(5, 13), date(5, 16)]);
    }

    #[test]
    fn series_till_includes_end_date() {
        let mut cal = calendar();
        let created = cal
            .create_event_series_till(
                "Class",
                date(5, 5),
                time(10, 0),
                time(11, 0),
                &days(&[Mon, Wed]),
                date(5, 12),
            )
            .unwrap();
        assert_eq!(created, 3);
        let dates: Vec<_> = cal.events().iter().map(|e| e.start().date()).collect();
        assert_eq!(dates, vec![date(5, 5), date(5, 7), date(5, 12)]);
    }

    #[test]
    fn series_arguments_are_validated() {
        let mut cal = calendar();
        let mon = days(&[Mon]);

        let err = cal
            .create_event_series("x", date(5, 5), time(9, 0), time(10, 0), &mon, 0)
            .unwrap_err();
        assert!(matches!(err, CalBookError::InvalidArgument(_)));

        let err = cal
            .create_event_series("x", date(5, 5), time(9, 0), time(10, 0), &HashSet::new(), 2)
            .unwrap_err();
        assert!(matches!(err, CalBookError::InvalidArgument(_)));

        let err = cal
            .create_event_series("x", date(5, 5), time(9, 0), time(9, 0), &mon, 2)
            .unwrap_err();
        assert!(matches!(err, CalBookError::InvalidArgument(_)));

        let err = cal
            .create_event_series_till("x", date(5, 5), time(9, 0), time(10, 0), &mon, date(5, 4))
            .unwrap_err();
        assert!(matches!(err, CalBookError::InvalidArgument(_)));

        let err = cal
            .create_all_day_event_series_till("x", date(5, 5), &mon, date(5, 1))
            .unwrap_err();
        assert!(matches!(err, CalBookError::InvalidArgument(_)));

        assert!(cal.is_empty());
    }

    #[test]
    fn duplicate_mid_series_keeps_earlier_occurrences() {
        let mut cal = calendar();
        cal.add_event(event("Gym", at(5, 12, 18, 0), at(5, 12, 19, 0))).unwrap();

        let err = cal
            .create_event_series("Gym", date(5, 5), time(18, 0), time(19, 0), &days(&[Mon]), 3)
            .unwrap_err();
        assert!(matches!(err, CalBookError::DuplicateEvent(_)));

        // 05-05 from the series plus the pre-existing 05-12 event
        assert_eq!(cal.len(), 2);
        assert_eq!(cal.find_event("Gym", at(5, 5, 18, 0)).unwrap().series_id(), Some("SID_1"));
    }

    #[test]
    fn all_day_series() {
        let mut cal = calendar();
        cal.create_all_day_event_series("Gym", date(5, 5), &days(&[Mon]), 3).unwrap();

        let events = cal.events();
        assert_eq!(events.len(), 3);
        for (event, day) in events.iter().zip([5, 12, 19]) {
            assert!(event.is_all_day());
            assert_eq!(event.start(), at(5, day, 8, 0));
            assert_eq!(event.end(), at(5, day, 17, 0));
        }
    }

    #[test]
    fn each_series_gets_a_fresh_id() {
        let mut cal = with_standups();
        cal.create_all_day_event_series_till("Gym", date(5, 5), &days(&[Fri]), date(5, 31))
            .unwrap();
        assert!(series_of(&cal, "Gym").iter().all(|s| s.as_deref() == Some("SID_2")));
    }

    #[test]
    fn find_event_reports_missing_and_ambiguous() {
        let mut cal = calendar();
        cal.add_event(event("Review", at(5, 5, 9, 0), at(5, 5, 10, 0))).unwrap();
        cal.add_event(event("Review", at(5, 5, 9, 0), at(5, 5, 11, 0))).unwrap();

        assert!(matches!(
            cal.find_event("Review", at(5, 6, 9, 0)),
            Err(CalBookError::EventNotFound { .. })
        ));
        assert!(matches!(
            cal.find_event("Review", at(5, 5, 9, 0)),
            Err(CalBookError::AmbiguousEvent { .. })
        ));
    }

    #[test]
    fn single_time_edit_detaches_occurrence() {
        let mut cal = with_standups();
        cal.edit_event(
            "Standup",
            at(5, 12, 9, 0),
            EditProperty::Start,
            &EditValue::DateTime(at(1, 1, 8, 45)),
            EditScope::Single,
        )
        .unwrap();

        let moved = cal.find_event("Standup", at(5, 12, 8, 45)).unwrap();
        assert!(!moved.is_in_series());
        assert_eq!(moved.end(), at(5, 12, 9, 30));

        let siblings = series_of(&cal, "Standup");
        assert_eq!(siblings.iter().filter(|s| s.as_deref() == Some("SID_1")).count(), 4);
    }

    #[test]
    fn single_non_time_edit_keeps_series() {
        let mut cal = with_standups();
        cal.edit_event(
            "Standup",
            at(5, 12, 9, 0),
            EditProperty::Location,
            &EditValue::Location(LocationType::Online),
            EditScope::Single,
        )
        .unwrap();

        let edited = cal.find_event("Standup", at(5, 12, 9, 0)).unwrap();
        assert_eq!(edited.location(), LocationType::Online);
        assert_eq!(edited.series_id(), Some("SID_1"));
        let others = cal
            .events()
            .into_iter()
            .filter(|e| e.location() == LocationType::None)
            .count();
        assert_eq!(others, 4);
    }

    #[test]
    fn forward_time_edit_splits_series() {
        let mut cal = with_standups();
        cal.edit_event(
            "Standup",
            at(5, 19, 9, 0),
            EditProperty::End,
            &EditValue::DateTime(at(5, 19, 9, 45)),
            EditScope::Forward,
        )
        .unwrap();

        let events = cal.events();
        let (before, after): (Vec<_>, Vec<_>) =
            events.iter().partition(|e| e.start() < at(5, 19, 0, 0));

        assert_eq!(before.len(), 2);
        assert!(before.iter().all(|e| e.series_id() == Some("SID_1")));
        assert!(before.iter().all(|e| e.end().time() == time(9, 30)));

        assert_eq!(after.len(), 3);
        assert!(after.iter().all(|e| e.series_id() == Some("SID_2")));
        assert!(after.iter().all(|e| e.end().time() == time(9, 45)));
    }

    #[test]
    fn forward_property_edit_keeps_series_id() {
        let mut cal = with_standups();
        cal.edit_event(
            "Standup",
            at(5, 19, 9, 0),
            EditProperty::Subject,
            &EditValue::Text("Daily sync".to_string()),
            EditScope::Forward,
        )
        .unwrap();

        assert_eq!(series_of(&cal, "Standup").len(), 2);
        assert_eq!(series_of(&cal, "Daily sync").len(), 3);
        assert!(cal.events().iter().all(|e| e.series_id() == Some("SID_1")));
    }

    #[test]
    fn all_events_on_standalone_event_acts_like_single() {
        let mut cal = with_standups();
        cal.add_event(event("Review", at(5, 5, 13, 0), at(5, 5, 14, 0))).unwrap();
        cal.edit_event(
            "Review",
            at(5, 5, 13, 0),
            EditProperty::Start,
            &EditValue::DateTime(at(5, 5, 12, 30)),
            EditScope::AllEvents,
        )
        .unwrap();

        let review = cal.find_event("Review", at(5, 5, 12, 30)).unwrap();
        assert_eq!(review.end(), at(5, 5, 14, 0));
        assert!(!review.is_in_series());
        assert!(series_of(&cal, "Standup").iter().all(|s| s.as_deref() == Some("SID_1")));
    }

    #[test]
    fn edit_of_ambiguous_event_changes_nothing() {
        let mut cal = calendar();
        cal.add_event(event("Review", at(5, 5, 9, 0), at(5, 5, 10, 0))).unwrap();
        cal.add_event(event("Review", at(5, 5, 9, 0), at(5, 5, 11, 0))).unwrap();
        let before = cal.events();

        assert!(matches!(
            cal.edit_event(
                "Review",
                at(5, 5, 9, 0),
                EditProperty::Subject,
                &EditValue::Text("Retro".to_string()),
                EditScope::Single,
            ),
            Err(CalBookError::AmbiguousEvent { .. })
        ));
        assert_eq!(cal.events(), before);
    }

    #[test]
    fn forward_on_standalone_event_acts_like_single() {
        let mut cal = calendar();
        cal.add_event(event("Review", at(5, 5, 9, 0), at(5, 5, 10, 0))).unwrap();
        cal.edit_event(
            "Review",
            at(5, 5, 9, 0),
            EditProperty::Description,
            &EditValue::Text("bring slides".to_string()),
            EditScope::Forward,
        )
        .unwrap();
        assert_eq!(
            cal.find_event("Review", at(5, 5, 9, 0)).unwrap().description(),
            Some("bring slides")
        );
    }

    #[test]
    fn all_events_edit_touches_whole_series() {
        let mut cal = with_standups();
        cal.edit_event(
            "Standup",
            at(5, 19, 9, 0),
            EditProperty::Start,
            &EditValue::DateTime(at(5, 19, 8, 30)),
            EditScope::AllEvents,
        )
        .unwrap();

        let events = cal.events();
        assert_eq!(events.len(), 5);
        assert!(events.iter().all(|e| e.start().time() == time(8, 30)));
        assert!(events.iter().all(|e| e.series_id() == Some("SID_1")));
    }

    #[test]
    fn status_edit_across_series() {
        let mut cal = with_standups();
        cal.edit_event(
            "Standup",
            at(5, 5, 9, 0),
            EditProperty::Status,
            &EditValue::Status(EventStatus::Private),
            EditScope::AllEvents,
        )
        .unwrap();
        assert!(cal.events().iter().all(|e| e.status() == EventStatus::Private));
    }

    #[test]
    fn failed_edit_leaves_calendar_unchanged() {
        let mut cal = calendar();
        cal.add_event(event("Review", at(5, 5, 9, 0), at(5, 5, 10, 0))).unwrap();
        cal.add_event(event("Retro", at(5, 5, 9, 0), at(5, 5, 10, 0))).unwrap();
        let before = cal.events();

        let err = cal
            .edit_event(
                "Retro",
                at(5, 5, 9, 0),
                EditProperty::Subject,
                &EditValue::Text("Review".to_string()),
                EditScope::Single,
            )
            .unwrap_err();
        assert!(matches!(err, CalBookError::DuplicateEvent(_)));
        assert_eq!(cal.events(), before);

        let err = cal
            .edit_event(
                "Retro",
                at(5, 5, 9, 0),
                EditProperty::End,
                &EditValue::DateTime(at(5, 5, 8, 0)),
                EditScope::Single,
            )
            .unwrap_err();
        assert!(matches!(err, CalBookError::InvalidEvent(_)));
        assert_eq!(cal.events(), before);
    }

    #[test]
    fn edit_of_unknown_event_fails() {
        let mut cal = with_standups();
        let err = cal
            .edit_event(
                "Standup",
                at(5, 6, 9, 0),
                EditProperty::Subject,
                &EditValue::Text("x".to_string()),
                EditScope::AllEvents,
            )
            .unwrap_err();
        assert!(matches!(err, CalBookError::EventNotFound { .. }));
    }

    #[test]
    fn events_on_date_includes_multi_day_spans() {
        let mut cal = calendar();
        cal.add_event(event("Trip", at(5, 4, 20, 0), at(5, 7, 9, 0))).unwrap();
        cal.add_event(event("Lunch", at(5, 5, 12, 0), at(5, 5, 13, 0))).unwrap();
        cal.add_event(event("Call", at(5, 5, 8, 0), at(5, 5, 8, 30))).unwrap();
        cal.add_event(event("Other", at(5, 8, 8, 0), at(5, 8, 8, 30))).unwrap();

        let subjects: Vec<_> = cal
            .events_on_date(date(5, 5))
            .iter()
            .map(|e| e.subject().to_string())
            .collect();
        assert_eq!(subjects, vec!["Trip", "Call", "Lunch"]);
        assert_eq!(cal.events_on_date(date(5, 7)).len(), 1);
    }

    #[test]
    fn events_in_range_uses_strict_overlap() {
        let mut cal = calendar();
        cal.add_event(event("A", at(5, 5, 9, 0), at(5, 5, 10, 0))).unwrap();
        cal.add_event(event("B", at(5, 5, 10, 0), at(5, 5, 11, 0))).unwrap();
        cal.add_event(event("C", at(5, 5, 8, 0), at(5, 5, 12, 0))).unwrap();

        let subjects: Vec<_> = cal
            .events_in_range(at(5, 5, 10, 0), at(5, 5, 10, 30))
            .iter()
            .map(|e| e.subject().to_string())
            .collect();
        assert_eq!(subjects, vec!["C", "B"]);
    }

    #[test]
    fn busy_counts_start_but_not_end() {
        let mut cal = calendar();
        cal.add_event(event("A", at(5, 5, 9, 0), at(5, 5, 10, 0))).unwrap();

        assert!(cal.is_busy(at(5, 5, 9, 0)));
        assert!(cal.is_busy(at(5, 5, 9, 59)));
        assert!(!cal.is_busy(at(5, 5, 10, 0)));
        assert!(!cal.is_busy(at(5, 5, 8, 59)));
    }

    #[test]
    fn time_zone_change_shifts_wall_clock() {
        let mut cal = calendar();
        cal.add_event(event("Call", at(5, 5, 10, 0), at(5, 5, 11, 0))).unwrap();

        cal.set_time_zone(Tz::Europe__London).unwrap();

        let call = &cal.events()[0];
        assert_eq!(call.start(), at(5, 5, 15, 0));
        assert_eq!(call.end(), at(5, 5, 16, 0));
        assert_eq!(cal.time_zone(), Tz::Europe__London);
    }

    #[test]
    fn time_zone_round_trip_restores_times() {
        let mut cal = with_standups();
        cal.add_event(event("Late", at(5, 6, 22, 0), at(5, 6, 23, 30))).unwrap();
        let before = cal.events();

        cal.set_time_zone(Tz::Asia__Tokyo).unwrap();
        assert_ne!(cal.events(), before);
        cal.set_time_zone(Tz::America__New_York).unwrap();

        assert_eq!(cal.events(), before);
    }

    #[test]
    fn time_zone_round_trip_keeps_all_day_events_on_their_date() {
        let mut cal = calendar();
        cal.create_event("Holiday", at(5, 5, 0, 0), at(5, 5, 0, 0), true).unwrap();
        let before = cal.events();

        cal.set_time_zone(Tz::Asia__Tokyo).unwrap();
        let holiday = &cal.events()[0];
        assert_eq!((holiday.start(), holiday.end()), (at(5, 5, 8, 0), at(5, 5, 17, 0)));

        cal.set_time_zone(Tz::America__New_York).unwrap();
        assert_eq!(cal.events(), before);
    }

    #[test]
    fn time_zone_change_fails_whole_when_converted_events_collide() {
        let mut cal = calendar();
        // 02:30 does not exist on 2025-03-09 in New York and reads as 03:30.
        cal.add_event(event("A", at(3, 9, 2, 30), at(3, 9, 4, 0))).unwrap();
        cal.add_event(event("A", at(3, 9, 3, 30), at(3, 9, 4, 0))).unwrap();
        let before = cal.events();

        assert!(matches!(
            cal.set_time_zone(Tz::UTC),
            Err(CalBookError::DuplicateEvent(_))
        ));
        assert_eq!(cal.events(), before);
        assert_eq!(cal.time_zone(), Tz::America__New_York);
    }

    #[test]
    fn time_zone_change_keeps_series_ids() {
        let mut cal = with_standups();
        cal.set_time_zone(Tz::Europe__Berlin).unwrap();
        assert!(cal.events().iter().all(|e| e.series_id() == Some("SID_1")));
        assert!(cal.events().iter().all(|e| e.start().time() == time(15, 0)));
    }

    #[test]
    fn same_time_zone_is_a_no_op() {
        let mut cal = with_standups();
        let before = cal.events();
        cal.set_time_zone(Tz::America__New_York).unwrap();
        assert_eq!(cal.events(), before);
    }
}
