//! Reading commands line by line and running them.

use anyhow::{bail, Result};
use calbook_core::CalendarManager;
use clap::ValueEnum;
use std::io::BufRead;
use tracing::debug;

use crate::commands::{self, Command};
use crate::config::CalbookConfig;
use crate::view::View;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Mode {
    /// Read commands from the terminal
    Interactive,
    /// Run a command file that ends with `exit`
    Headless,
}

pub struct Session<'a, V: View> {
    manager: CalendarManager,
    view: V,
    config: &'a CalbookConfig,
}

impl<'a, V: View> Session<'a, V> {
    pub fn new(view: V, config: &'a CalbookConfig) -> Self {
        Session {
            manager: CalendarManager::new(),
            view,
            config,
        }
    }

    /// Run commands from `input` until `exit` or end of input.
    ///
    /// A failing command is reported through the view and the session moves
    /// on. Headless input that never reaches `exit` is an error.
    pub fn run<R: BufRead>(&mut self, input: R, mode: Mode) -> Result<()> {
        let interactive = mode == Mode::Interactive;
        if interactive {
            self.view
                .message("Calendar application started. Type 'exit' to quit.")?;
        }

        let mut exited = false;
        for (number, line) in input.lines().enumerate() {
            let line = line?;
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            debug!(line = number + 1, command = %line, "running command");
            match commands::parse(line) {
                Ok(Command::Exit) => {
                    exited = true;
                    break;
                }
                Ok(command) => {
                    if let Err(e) = command.execute(&mut self.manager, &mut self.view, self.config) {
                        self.view.error(&format!("{:#}", e))?;
                    }
                }
                Err(e) => self.view.error(&format!("Invalid command: {:#}", e))?,
            }
        }

        if interactive && exited {
            self.view.message("Exiting calendar application.")?;
        }
        if !interactive && !exited {
            bail!("Headless command file must end with 'exit'");
        }
        Ok(())
    }

    #[cfg(test)]
    pub fn into_view(self) -> V {
        self.view
    }
}
