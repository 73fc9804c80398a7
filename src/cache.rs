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
use std::path::Path;
use std::rc::Rc;

use log::info;

use crate::announce::{self, Announce};
use crate::errors::Result;

/// Write-once cell holding the result of a derived accessor for the lifetime of its owner. The
/// first successful computation is stored; failures are not, so a later call tries again.
pub struct Memo<T> {
    value: RefCell<Option<Rc<T>>>,
}

impl<T> Default for Memo<T> {
    fn default() -> Self {
        Memo { value: RefCell::new(None) }
    }
}

impl<T> Memo<T> {

    pub fn new() -> Self {
        Default::default()
    }

    pub fn is_computed(&self) -> bool {
        self.value.borrow().is_some()
    }

    pub fn get_or_try_init<F>(&self, compute: F) -> Result<Rc<T>>
        where F: FnOnce() -> Result<T> {

        if let Some(ref value) = *self.value.borrow() {
            return Ok(Rc::clone(value));
        }

        let value = Rc::new(compute()?);
        *self.value.borrow_mut() = Some(Rc::clone(&value));

        Ok(value)
    }
}

/// On-disk tier of the cache: returns the artifact at `path` if it exists, otherwise computes the
/// value and persists it at `path` before returning it. The path is the only cache key; an
/// artifact is never invalidated when the inputs it was derived from change.
pub fn load_or_compute<T, A, L, C, S>(
    path: &Path,
    what: &str,
    announcer: &A,
    load: L,
    compute: C,
    save: S,
) -> Result<T>
    where A: Announce + ?Sized,
          L: FnOnce(&Path) -> Result<T>,
          C: FnOnce() -> Result<T>,
          S: FnOnce(&Path, &T) -> Result<()> {

    if path.is_file() {
        return announce::step(
            announcer,
            &format!("Loading {} from \"{}\"", what, path.display()),
            || load(path),
        );
    }

    info!("No cached {} at \"{}\", computing it", what, path.display());

    let value = compute()?;

    announce::step(
        announcer,
        &format!("Saving {} to \"{}\"", what, path.display()),
        || save(path, &value),
    )?;

    Ok(value)
}
