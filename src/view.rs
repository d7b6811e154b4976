//! Console output for command results.

use calbook_core::Event;
use chrono::NaiveDate;
use owo_colors::OwoColorize;
use std::io::{self, Write};

/// Where command results are shown.
pub trait View {
    fn message(&mut self, text: &str) -> io::Result<()>;
    fn error(&mut self, text: &str) -> io::Result<()>;
    fn events_on_date(&mut self, date: NaiveDate, events: &[Event]) -> io::Result<()>;
    fn events_in_range(&mut self, events: &[Event]) -> io::Result<()>;
    fn busy_status(&mut self, busy: bool) -> io::Result<()>;
}

/// Plain-text view over any writer, optionally colored.
pub struct ConsoleView<W: Write> {
    out: W,
    color: bool,
}

impl<W: Write> ConsoleView<W> {
    pub fn new(out: W, color: bool) -> Self {
        ConsoleView { out, color }
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.out
    }

    fn subject(&self, event: &Event) -> String {
        if self.color {
            event.subject().bold().to_string()
        } else {
            event.subject().to_string()
        }
    }
}

impl<W: Write> View for ConsoleView<W> {
    fn message(&mut self, text: &str) -> io::Result<()> {
        writeln!(self.out, "{}", text)
    }

    fn error(&mut self, text: &str) -> io::Result<()> {
        if self.color {
            writeln!(self.out, "{} {}", "Error:".red(), text)
        } else {
            writeln!(self.out, "Error: {}", text)
        }
    }

    fn events_on_date(&mut self, date: NaiveDate, events: &[Event]) -> io::Result<()> {
        if events.is_empty() {
            return writeln!(self.out, "No events on {}", date);
        }

        writeln!(self.out, "Events on {}:", date)?;
        for event in events {
            let line = format!(
                "{} from {} to {}{}",
                self.subject(event),
                event.start().format("%H:%M"),
                event.end().format("%H:%M"),
                location_suffix(event)
            );
            writeln!(self.out, "- {}", line)?;
        }
        Ok(())
    }

    fn events_in_range(&mut self, events: &[Event]) -> io::Result<()> {
        if events.is_empty() {
            return writeln!(self.out, "No events in the specified range.");
        }

        writeln!(self.out, "Events in range:")?;
        for event in events {
            let line = format!(
                "{} starting on {} at {}, ending on {} at {}{}",
                self.subject(event),
                event.start().format("%Y-%m-%d"),
                event.start().format("%H:%M"),
                event.end().format("%Y-%m-%d"),
                event.end().format("%H:%M"),
                location_suffix(event)
            );
            writeln!(self.out, "- {}", line)?;
        }
        Ok(())
    }

    fn busy_status(&mut self, busy: bool) -> io::Result<()> {
        let status = if busy { "busy" } else { "available" };
        if self.color {
            let colored = if busy {
                status.red().to_string()
            } else {
                status.green().to_string()
            };
            writeln!(self.out, "{}", colored)
        } else {
            writeln!(self.out, "{}", status)
        }
    }
}

fn location_suffix(event: &Event) -> String {
    match event.location().display_value() {
        "" => String::new(),
        place => format!(" at {}", place),
    }
}
