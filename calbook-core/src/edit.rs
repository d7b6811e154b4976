//! Edit requests: which property changes, to what, and across which occurrences.

use chrono::NaiveDateTime;
use std::fmt;
use std::str::FromStr;

use crate::error::{CalBookError, CalBookResult};
use crate::event::{Event, EventStatus, LocationType};

/// How far an edit cascades through a series.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditScope {
    /// Only the addressed occurrence.
    Single,
    /// The addressed occurrence and every later one in its series.
    Forward,
    /// Every occurrence in the series.
    AllEvents,
}

/// Editable event properties.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditProperty {
    Subject,
    Start,
    End,
    Description,
    Location,
    Status,
}

impl EditProperty {
    /// Start and end edits move an occurrence, which detaches it from its series.
    pub fn is_time(&self) -> bool {
        matches!(self, EditProperty::Start | EditProperty::End)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EditProperty::Subject => "subject",
            EditProperty::Start => "start",
            EditProperty::End => "end",
            EditProperty::Description => "description",
            EditProperty::Location => "location",
            EditProperty::Status => "status",
        }
    }
}

impl FromStr for EditProperty {
    type Err = CalBookError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "subject" => Ok(EditProperty::Subject),
            "start" => Ok(EditProperty::Start),
            "end" => Ok(EditProperty::End),
            "description" => Ok(EditProperty::Description),
            "location" => Ok(EditProperty::Location),
            "status" => Ok(EditProperty::Status),
            _ => Err(CalBookError::InvalidArgument(format!(
                "Unknown event property '{}'",
                s
            ))),
        }
    }
}

impl fmt::Display for EditProperty {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// New value for an edited property.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditValue {
    Text(String),
    DateTime(NaiveDateTime),
    Location(LocationType),
    Status(EventStatus),
}

impl EditValue {
    /// Interpret raw command text as the value type `property` expects.
    pub fn parse_for(property: EditProperty, raw: &str) -> CalBookResult<Self> {
        match property {
            EditProperty::Subject | EditProperty::Description => {
                Ok(EditValue::Text(raw.to_string()))
            }
            EditProperty::Start | EditProperty::End => {
                NaiveDateTime::parse_from_str(raw.trim(), "%Y-%m-%dT%H:%M")
                    .map(EditValue::DateTime)
                    .map_err(|_| {
                        CalBookError::InvalidArgument(format!(
                            "Invalid date-time '{}'. Expected YYYY-MM-DDTHH:MM",
                            raw
                        ))
                    })
            }
            EditProperty::Location => Ok(EditValue::Location(LocationType::from_display_value(
                raw.trim(),
            ))),
            EditProperty::Status => raw.trim().parse().map(EditValue::Status),
        }
    }
}

/// Apply one property change to `event`.
///
/// Start and end edits take only the time of day from the new value; the
/// event keeps its original dates.
pub(crate) fn apply(event: &Event, property: EditProperty, value: &EditValue) -> CalBookResult<Event> {
    let builder = event.to_builder();

    let builder = match (property, value) {
        (EditProperty::Subject, EditValue::Text(s)) => builder.subject(s.clone()),
        (EditProperty::Description, EditValue::Text(s)) => builder.description(s.clone()),
        (EditProperty::Start, EditValue::DateTime(dt)) => {
            builder.start(event.start().date().and_time(dt.time()))
        }
        (EditProperty::End, EditValue::DateTime(dt)) => {
            builder.end(event.end().date().and_time(dt.time()))
        }
        (EditProperty::Location, EditValue::Location(l)) => builder.location(*l),
        (EditProperty::Status, EditValue::Status(s)) => builder.status(*s),
        (property, value) => {
            return Err(CalBookError::InvalidArgument(format!(
                "{:?} is not a valid value for {}",
                value, property
            )));
        }
    };

    builder.build()
}
