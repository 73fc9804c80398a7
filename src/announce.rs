/**
 * NymStats
 * Copyright (C) 2018 Sebastian Schelter
 *
 * This program is free software: you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * This program is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with this program. If not, see <http://www.gnu.org/licenses/>.
 */

use std::cell::RefCell;
use std::time::Instant;

use log::{info, warn};

use crate::errors::Result;
use crate::utils;

/// Receives start and end markers of the named steps (reads, computations, saves) performed while
/// loading data. Steps nest; `end` always closes the most recently begun step.
pub trait Announce {
    fn begin(&self, message: &str);
    fn end(&self, succeeded: bool);
}

/// Logs every step with its nesting depth as indentation and reports the wall-clock time it took.
/// The stack of open steps belongs to the announcer, so independent announcers never interfere.
#[derive(Default)]
pub struct LogAnnouncer {
    open_steps: RefCell<Vec<(String, Instant)>>,
}

impl LogAnnouncer {

    pub fn new() -> Self {
        Default::default()
    }

    pub fn depth(&self) -> usize {
        self.open_steps.borrow().len()
    }
}

const INDENT: &str = "  ";

impl Announce for LogAnnouncer {

    fn begin(&self, message: &str) {
        let mut open_steps = self.open_steps.borrow_mut();
        info!("{}{} ...", INDENT.repeat(open_steps.len()), message);
        open_steps.push((message.to_string(), Instant::now()));
    }

    fn end(&self, succeeded: bool) {
        let mut open_steps = self.open_steps.borrow_mut();

        if let Some((message, started)) = open_steps.pop() {
            let elapsed = utils::format_elapsed(started.elapsed());
            let indent = INDENT.repeat(open_steps.len());

            if succeeded {
                info!("{}{} ... done ({})", indent, message, elapsed);
            } else {
                warn!("{}{} ... failed ({})", indent, message, elapsed);
            }
        }
    }
}

/// For callers who want no progress output at all
pub struct SilentAnnouncer;

impl Announce for SilentAnnouncer {
    fn begin(&self, _message: &str) {}
    fn end(&self, _succeeded: bool) {}
}

/// Runs `work` as a named step. The step is closed whether or not `work` succeeds.
pub fn step<A, T, F>(announcer: &A, message: &str, work: F) -> Result<T>
    where A: Announce + ?Sized, F: FnOnce() -> Result<T> {

    announcer.begin(message);
    let result = work();
    announcer.end(result.is_ok());

    result
}
