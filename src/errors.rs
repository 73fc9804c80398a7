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

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Everything that can go wrong while loading inputs or deriving statistics. Failures are a
/// deterministic function of the inputs, so nothing here is ever retried.
#[derive(Debug, Error)]
pub enum Error {
    /// A required raw or cached file is absent and no fallback exists.
    #[error("{}: missing input {}", .operation, .path.display())]
    MissingInput { path: PathBuf, operation: String },

    /// Parsed data violates an invariant of the dataset.
    #[error("malformed input {}: {}", .path.display(), .reason)]
    MalformedInput { path: PathBuf, reason: String },

    /// A dependency of a derived accessor failed.
    #[error("{}: upstream unavailable: {}", .operation, .source)]
    UpstreamUnavailable {
        operation: String,
        #[source]
        source: Box<Error>,
    },

    #[error("i/o error on {}: {}", .path.display(), .source)]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("unable to parse {}: {}", .path.display(), .source)]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("unable to decode or encode {}: {}", .path.display(), .source)]
    Encoding {
        path: PathBuf,
        #[source]
        source: bincode::Error,
    },

    #[error("invalid configuration {}: {}", .path.display(), .source)]
    Config {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {

    pub fn missing(path: &Path, operation: &str) -> Self {
        Error::MissingInput { path: path.to_path_buf(), operation: operation.to_string() }
    }

    pub fn malformed<S: Into<String>>(path: &Path, reason: S) -> Self {
        Error::MalformedInput { path: path.to_path_buf(), reason: reason.into() }
    }

    pub fn upstream(operation: &str, source: Error) -> Self {
        Error::UpstreamUnavailable { operation: operation.to_string(), source: Box::new(source) }
    }

    pub fn io(path: &Path) -> impl FnOnce(io::Error) -> Self {
        let path = path.to_path_buf();
        move |source| Error::Io { path, source }
    }

    pub fn csv(path: &Path) -> impl FnOnce(csv::Error) -> Self {
        let path = path.to_path_buf();
        move |source| Error::Csv { path, source }
    }

    pub fn encoding(path: &Path) -> impl FnOnce(bincode::Error) -> Self {
        let path = path.to_path_buf();
        move |source| Error::Encoding { path, source }
    }
}
