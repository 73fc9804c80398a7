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

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::errors::{Error, Result};

pub fn to_millis(duration: Duration) -> u64 {
    (duration.as_secs() * 1_000) + (duration.subsec_nanos() / 1_000_000) as u64
}

/// Seconds with millisecond resolution, e.g. `1.234s`
pub fn format_elapsed(duration: Duration) -> String {
    let millis = to_millis(duration);
    format!("{}.{:03}s", millis / 1_000, millis % 1_000)
}

/// Appends `suffix` to the file name, unlike `Path::with_extension` which would replace a dotted
/// part of a stem such as `ratings.v2`
pub fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut file_name = path.file_name().map(|name| name.to_os_string()).unwrap_or_default();
    file_name.push(suffix);
    path.with_file_name(file_name)
}

/// Writes to a sibling file first and renames it into place, so readers never observe a partially
/// written artifact. Concurrent writers race; the last rename wins.
pub fn write_atomically<F>(path: &Path, write: F) -> Result<()>
    where F: FnOnce(&mut fs::File) -> Result<()> {

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(Error::io(parent))?;
        }
    }

    let temporary = with_suffix(path, ".tmp");

    let written = fs::File::create(&temporary)
        .map_err(Error::io(&temporary))
        .and_then(|mut file| {
            write(&mut file)?;
            file.sync_all().map_err(Error::io(&temporary))
        })
        .and_then(|_| fs::rename(&temporary, path).map_err(Error::io(path)));

    if written.is_err() {
        let _ = fs::remove_file(&temporary);
    }

    written
}
