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

use std::fmt::Display;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::announce::{self, Announce};
use crate::errors::{Error, Result};
use crate::utils;

pub const BINARY_SUFFIX: &str = ".bin";
pub const TEXT_SUFFIX: &str = ".txt";

pub fn binary_path(stem: &Path) -> PathBuf {
    utils::with_suffix(stem, BINARY_SUFFIX)
}

pub fn text_path(stem: &Path) -> PathBuf {
    utils::with_suffix(stem, TEXT_SUFFIX)
}

/// Reads a CSV input file. We expect NO headers; records may be ragged and padded with extra
/// delimiters, which show up as empty fields.
pub fn csv_reader(path: &Path, delimiter: u8) -> Result<csv::Reader<File>> {
    csv::ReaderBuilder::new()
        .has_headers(false)
        .delimiter(delimiter)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(Error::csv(path))
}

/// Reads the array stored under `stem`, from its binary encoding `<stem>.bin` if present and from
/// the delimited text encoding `<stem>.txt` otherwise.
pub fn read_array<T, A>(stem: &Path, delimiter: u8, announcer: &A) -> Result<Vec<T>>
    where T: DeserializeOwned + FromStr, T::Err: Display, A: Announce + ?Sized {

    let binary = binary_path(stem);
    let text = text_path(stem);

    announce::step(announcer, &format!("Reading \"{}\"", stem.display()), || {
        if binary.is_file() {
            read_binary(&binary)
        } else if text.is_file() {
            read_text_array(&text, delimiter)
        } else {
            Err(Error::missing(&text, "read_array"))
        }
    })
}

fn read_text_array<T>(path: &Path, delimiter: u8) -> Result<Vec<T>>
    where T: FromStr, T::Err: Display {

    if delimiter.is_ascii_whitespace() {
        return read_whitespace_separated_array(path);
    }

    let mut reader = csv_reader(path, delimiter)?;
    let mut values = Vec::new();

    for record in reader.records() {
        let record = record.map_err(Error::csv(path))?;
        let line = record.position().map(|position| position.line()).unwrap_or(0);

        for field in record.iter().filter(|field| !field.is_empty()) {
            let value = field.parse::<T>().map_err(|failure| {
                Error::malformed(path, format!("line {}: cannot parse {:?}: {}", line, field, failure))
            })?;
            values.push(value);
        }
    }

    Ok(values)
}

/// Any run of spaces and tabs separates values
fn read_whitespace_separated_array<T>(path: &Path) -> Result<Vec<T>>
    where T: FromStr, T::Err: Display {

    let file = File::open(path).map_err(Error::io(path))?;
    let mut values = Vec::new();

    for (line_index, line) in BufReader::new(file).lines().enumerate() {
        let line = line.map_err(Error::io(path))?;

        for field in line.split_whitespace() {
            let value = field.parse::<T>().map_err(|failure| {
                Error::malformed(path, format!(
                    "line {}: cannot parse {:?}: {}", line_index + 1, field, failure))
            })?;
            values.push(value);
        }
    }

    Ok(values)
}

/// Persists an array in the binary encoding under `<stem>.bin`, where `read_array` will prefer it
/// over the text encoding from then on.
pub fn write_array<T, A>(stem: &Path, values: &[T], announcer: &A) -> Result<()>
    where T: Serialize, A: Announce + ?Sized {

    let path = binary_path(stem);

    announce::step(announcer, &format!("Saving \"{}\"", path.display()), || {
        write_binary(&path, values)
    })
}

/// Serializes `value` to `path` via an atomic rename
pub fn write_binary<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    utils::write_atomically(path, |file| {
        let mut writer = BufWriter::new(file);
        bincode::serialize_into(&mut writer, value).map_err(Error::encoding(path))?;
        writer.flush().map_err(Error::io(path))
    })
}

pub fn read_binary<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let file = File::open(path).map_err(Error::io(path))?;
    bincode::deserialize_from(BufReader::new(file)).map_err(Error::encoding(path))
}

/// Reads the comma-separated (user, nym index) assignments. Both columns are read as reals so
/// that non-integral indices can be reported as such instead of as generic parse failures.
pub fn read_nym_assignments(path: &Path) -> Result<Vec<(f64, f64)>> {
    if !path.is_file() {
        return Err(Error::missing(path, "read_nym_assignments"));
    }

    let mut reader = csv_reader(path, b',')?;
    let mut assignments = Vec::new();

    for record in reader.records() {
        let record = record.map_err(Error::csv(path))?;
        let line = record.position().map(|position| position.line()).unwrap_or(0);

        let fields: Vec<&str> = record.iter().filter(|field| !field.is_empty()).collect();

        if fields.is_empty() {
            continue;
        }

        if fields.len() != 2 {
            return Err(Error::malformed(
                path,
                format!("line {}: expected user and nym index, found {} fields", line, fields.len()),
            ));
        }

        let parse = |field: &str| {
            field.parse::<f64>().map_err(|failure| {
                Error::malformed(path, format!("line {}: cannot parse {:?}: {}", line, field, failure))
            })
        };

        assignments.push((parse(fields[0])?, parse(fields[1])?));
    }

    Ok(assignments)
}
