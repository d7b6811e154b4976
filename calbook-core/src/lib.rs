//! Core model for calbook.
//!
//! - `event`: immutable `Event` values and their validating builder
//! - `calendar`: one named, zone-tagged calendar with series and scoped edits
//! - `manager`: the calendar registry, active calendar and cross-calendar copies
//! - `export`: CSV and iCalendar writers

pub mod calendar;
pub mod edit;
pub mod error;
pub mod event;
pub mod export;
pub mod manager;
pub mod zone;

pub use calendar::Calendar;
pub use edit::{EditProperty, EditScope, EditValue};
pub use error::{CalBookError, CalBookResult, InvalidEventKind};
pub use event::{Event, EventBuilder, EventKey, EventStatus, LocationType};
pub use manager::{CalendarManager, CalendarProperty};
