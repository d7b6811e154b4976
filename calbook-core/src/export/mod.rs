//! Writing calendars out to files other calendar tools can import.

mod csv;
mod ics;

pub use self::csv::CsvExporter;
pub use self::ics::IcsExporter;

use std::path::{Path, PathBuf};

use crate::calendar::Calendar;
use crate::error::CalBookResult;
use crate::event::Event;

/// A file format that calendars can be exported to.
pub trait Exporter {
    /// Write `events` of `calendar` to `path` and return the absolute path written.
    fn export(&self, events: &[Event], calendar: &Calendar, path: &Path) -> CalBookResult<PathBuf>;
}

/// Pick an exporter from the extension of `file_name`.
///
/// `.ics` and `.ical` give iCalendar, `.csv` gives CSV. Any other name is
/// exported as CSV with `.csv` appended, so the returned path may differ from
/// the one passed in.
pub fn exporter_for(file_name: &str) -> (Box<dyn Exporter>, PathBuf) {
    let lower = file_name.to_ascii_lowercase();
    if lower.ends_with(".ics") || lower.ends_with(".ical") {
        (Box::new(IcsExporter), PathBuf::from(file_name))
    } else if lower.ends_with(".csv") {
        (Box::new(CsvExporter), PathBuf::from(file_name))
    } else {
        (Box::new(CsvExporter), PathBuf::from(format!("{}.csv", file_name)))
    }
}

/// Write `content` to `path` and resolve it to an absolute path.
fn write_file(path: &Path, content: &str) -> CalBookResult<PathBuf> {
    std::fs::write(path, content)?;
    Ok(std::fs::canonicalize(path)?)
}
