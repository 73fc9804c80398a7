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

use serde_derive::{Deserialize, Serialize};

use crate::errors::{Error, Result};

/// Where the raw dataset lives and where derived artifacts are kept. Derived artifact names embed
/// the `dataset_version` token; nothing else ties an artifact to the inputs it was computed from,
/// so bump the token (or delete the artifact) whenever the raw files change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    pub data_dir: PathBuf,
    pub users_file: String,
    pub items_file: String,
    pub ratings_file: String,
    pub ratings_cache_file: String,
    pub nyms_file: String,
    /// Number of nyms, inferred as the largest nym index plus one when absent
    pub nym_count: Option<usize>,
    pub rating_value_count: usize,
    /// Defaults to `<data_dir>/cache`
    pub cache_dir: Option<PathBuf>,
    pub dataset_version: String,
    /// When disabled, the ratings matrix is only ever read from its persisted artifact
    pub raw_ingestion: bool,
    /// Field delimiter of the text encoding of raw arrays
    pub text_delimiter: char,
}

impl Default for DataConfig {
    fn default() -> Self {
        DataConfig {
            data_dir: PathBuf::from("data"),
            users_file: String::from("users_big"),
            items_file: String::from("movies_big"),
            ratings_file: String::from("ratings_big"),
            ratings_cache_file: String::from("ratings.bin"),
            nyms_file: String::from("P"),
            nym_count: Some(8),
            rating_value_count: 5,
            cache_dir: None,
            dataset_version: String::from("v1"),
            raw_ingestion: true,
            text_delimiter: ' ',
        }
    }
}

impl DataConfig {

    pub fn with_data_dir<P: AsRef<Path>>(data_dir: P) -> Self {
        DataConfig { data_dir: data_dir.as_ref().to_path_buf(), ..Default::default() }
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let json = fs::read_to_string(path).map_err(Error::io(path))?;
        let config: DataConfig = serde_json::from_str(&json)
            .map_err(|source| Error::Config { path: path.to_path_buf(), source })?;

        config.validate(path)?;

        Ok(config)
    }

    fn validate(&self, path: &Path) -> Result<()> {
        if self.rating_value_count == 0 {
            return Err(Error::malformed(path, "rating_value_count must be positive"));
        }
        if !self.text_delimiter.is_ascii() {
            return Err(Error::malformed(path, "text_delimiter must be a single ascii character"));
        }
        if self.nym_count == Some(0) {
            return Err(Error::malformed(path, "nym_count must be positive when given"));
        }
        Ok(())
    }

    /// Path stem of a raw array; the loader appends `.bin` or `.txt`
    pub fn raw_path(&self, stem: &str) -> PathBuf {
        self.data_dir.join(stem)
    }

    pub fn ratings_cache_path(&self) -> PathBuf {
        self.data_dir.join(&self.ratings_cache_file)
    }

    pub fn nyms_path(&self) -> PathBuf {
        self.data_dir.join(&self.nyms_file)
    }

    pub fn cache_dir(&self) -> PathBuf {
        match self.cache_dir {
            Some(ref cache_dir) => cache_dir.clone(),
            None => self.data_dir.join("cache"),
        }
    }

    pub fn nym_stats_path(&self) -> PathBuf {
        self.cache_dir().join(format!("nym_stats_{}.bin", self.dataset_version))
    }

    pub fn group_rating_distribution_path(&self) -> PathBuf {
        self.cache_dir().join(format!("group_rating_dists_{}.bin", self.dataset_version))
    }

    /// Fails for delimiters that are not a single ascii character, which holds for configurations
    /// built in code as much as for those read from JSON
    pub fn text_delimiter_byte(&self) -> Result<u8> {
        if self.text_delimiter.is_ascii() {
            Ok(self.text_delimiter as u8)
        } else {
            Err(Error::malformed(&self.data_dir, format!(
                "text delimiter {:?} is not a single ascii character", self.text_delimiter)))
        }
    }
}
