//! Turning one input line into a [`Command`].

use anyhow::{bail, Context, Result};
use calbook_core::zone;
use calbook_core::{EditProperty, EditScope, EditValue};
use chrono::{NaiveDate, NaiveDateTime, Weekday};
use std::collections::HashSet;

use super::{Command, EventTimes, Repeat, RepeatEnd};

const DATE_FORMAT: &str = "%Y-%m-%d";
const DATE_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M";

pub fn parse(line: &str) -> Result<Command> {
    let tokens = tokenize(line)?;
    let words: Vec<&str> = tokens.iter().map(String::as_str).collect();

    match words.as_slice() {
        [] => bail!("Command cannot be empty"),
        ["exit"] => Ok(Command::Exit),

        ["create", "calendar", "--name", name] => Ok(Command::CreateCalendar {
            name: name.to_string(),
            zone: None,
        }),
        ["create", "calendar", "--name", name, "--timezone", tz] => Ok(Command::CreateCalendar {
            name: name.to_string(),
            zone: Some(zone::parse_time_zone(tz)?),
        }),
        ["use", "calendar", "--name", name] => Ok(Command::UseCalendar {
            name: name.to_string(),
        }),
        ["edit", "calendar", "--name", name, "--property", property, value @ ..]
            if !value.is_empty() =>
        {
            Ok(Command::EditCalendar {
                name: name.to_string(),
                property: property.parse()?,
                value: value.join(" "),
            })
        }

        ["create", "event", subject, rest @ ..] => parse_create_event(subject, rest),
        ["edit", scope @ ("event" | "events" | "series"), property, rest @ ..] => {
            parse_edit_event(scope, property, rest)
        }

        ["print", "events", "on", date] => Ok(Command::PrintOnDate(parse_date(date)?)),
        ["print", "events", "from", start, "to", end] => Ok(Command::PrintRange {
            start: parse_date_time(start)?,
            end: parse_date_time(end)?,
        }),
        ["show", "status", "on", at] => Ok(Command::ShowStatus(parse_date_time(at)?)),
        ["export", "cal", file] => Ok(Command::Export {
            file: file.to_string(),
        }),

        ["copy", "events", "on", date, "--target", target, "to", to] => {
            Ok(Command::CopyEventsOnDate {
                date: parse_date(date)?,
                target: target.to_string(),
                target_date: parse_date(to)?,
            })
        }
        ["copy", "events", "between", start, "and", end, "--target", target, "to", to] => {
            Ok(Command::CopyEventsBetween {
                start: parse_date(start)?,
                end: parse_date(end)?,
                target: target.to_string(),
                target_start: parse_date(to)?,
            })
        }
        ["copy", "event", rest @ ..] => parse_copy_event(rest),

        _ => bail!("Unknown command: {}", line.trim()),
    }
}

/// `<subject> (from <dt> to <dt> | on <date>) [repeats <days> (for <n> times | until <date>)]`
fn parse_create_event(subject: &str, rest: &[&str]) -> Result<Command> {
    let (times, repeat) = match rest {
        ["from", start, "to", end, repeat @ ..] => (
            EventTimes::Timed {
                start: parse_date_time(start)?,
                end: parse_date_time(end)?,
            },
            repeat,
        ),
        ["on", date, repeat @ ..] => (EventTimes::AllDay(parse_date(date)?), repeat),
        _ => bail!("Expected 'from <start> to <end>' or 'on <date>' after the subject"),
    };

    let repeat = match repeat {
        [] => None,
        ["repeats", days, "for", n, "times"] => Some(Repeat {
            weekdays: parse_weekdays(days)?,
            until: RepeatEnd::Times(
                n.parse()
                    .with_context(|| format!("Invalid occurrence count '{}'", n))?,
            ),
        }),
        ["repeats", days, "until", date] => Some(Repeat {
            weekdays: parse_weekdays(days)?,
            until: RepeatEnd::Date(parse_date(date)?),
        }),
        _ => bail!("Expected 'repeats <days> for <n> times' or 'repeats <days> until <date>'"),
    };

    Ok(Command::CreateEvent {
        subject: subject.to_string(),
        times,
        repeat,
    })
}

/// `<subject> from <dt> [to <dt>] with <value>`; an unquoted subject may span words.
fn parse_edit_event(scope: &str, property: &str, rest: &[&str]) -> Result<Command> {
    let scope = match scope {
        "event" => EditScope::Single,
        "events" => EditScope::Forward,
        _ => EditScope::AllEvents,
    };
    let property: EditProperty = property.parse()?;

    let (subject, rest) = split_at_keyword(rest, "from")?;
    let (start, end, value) = match rest {
        [start, "to", end, "with", value @ ..] => (start, Some(parse_date_time(end)?), value),
        [start, "with", value @ ..] => (start, None, value),
        _ => bail!("Expected 'from <start> [to <end>] with <value>'"),
    };
    if value.is_empty() {
        bail!("Missing value after 'with'");
    }

    Ok(Command::EditEvent {
        scope,
        property,
        subject,
        start: parse_date_time(start)?,
        end,
        value: EditValue::parse_for(property, &value.join(" "))?,
    })
}

/// `<subject> on <dt> --target <calendar> to <dt>`
fn parse_copy_event(rest: &[&str]) -> Result<Command> {
    let (subject, rest) = split_at_keyword(rest, "on")?;
    match rest {
        [source, "--target", target, "to", to] => Ok(Command::CopyEvent {
            subject,
            source: parse_date_time(source)?,
            target: target.to_string(),
            target_start: parse_date_time(to)?,
        }),
        _ => bail!("Expected 'copy event <subject> on <start> --target <calendar> to <start>'"),
    }
}

/// Join the words before `keyword` into a subject; return the words after it.
fn split_at_keyword<'a, 'b>(words: &'b [&'a str], keyword: &str) -> Result<(String, &'b [&'a str])> {
    let Some(pos) = words.iter().position(|w| *w == keyword) else {
        bail!("Missing '{}'", keyword);
    };
    if pos == 0 {
        bail!("Missing event subject");
    }
    Ok((words[..pos].join(" "), &words[pos + 1..]))
}

/// Split on whitespace, keeping double-quoted runs together without their quotes.
fn tokenize(line: &str) -> Result<Vec<String>> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut quoted = false;

    for c in line.trim().chars() {
        match c {
            '"' => {
                in_quotes = !in_quotes;
                quoted = true;
            }
            c if c.is_whitespace() && !in_quotes => {
                if !current.is_empty() || quoted {
                    tokens.push(std::mem::take(&mut current));
                }
                quoted = false;
            }
            c => current.push(c),
        }
    }

    if in_quotes {
        bail!("Unclosed quote");
    }
    if !current.is_empty() || quoted {
        tokens.push(current);
    }
    Ok(tokens)
}

/// Weekday letters: M T W R F S U.
fn parse_weekdays(letters: &str) -> Result<HashSet<Weekday>> {
    letters
        .chars()
        .map(|c| match c {
            'M' => Ok(Weekday::Mon),
            'T' => Ok(Weekday::Tue),
            'W' => Ok(Weekday::Wed),
            'R' => Ok(Weekday::Thu),
            'F' => Ok(Weekday::Fri),
            'S' => Ok(Weekday::Sat),
            'U' => Ok(Weekday::Sun),
            other => bail!("Invalid weekday character '{}'", other),
        })
        .collect()
}

fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, DATE_FORMAT)
        .with_context(|| format!("Invalid date '{}'. Expected YYYY-MM-DD", s))
}

fn parse_date_time(s: &str) -> Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(s, DATE_TIME_FORMAT)
        .with_context(|| format!("Invalid date-time '{}'. Expected YYYY-MM-DDTHH:MM", s))
}
