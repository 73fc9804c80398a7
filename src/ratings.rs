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

use std::path::Path;

use serde_derive::{Deserialize, Serialize};

use crate::announce::{self, Announce};
use crate::cache;
use crate::config::DataConfig;
use crate::errors::{Error, Result};
use crate::io;
use crate::types;

/// Sparse users x items ratings in compressed sparse column layout. Ratings of item `i` are
/// `data[indptr[i]..indptr[i + 1]]`, given by the users in the same range of `indices`, sorted by
/// user. An absent entry means the user did not rate the item; zeros are never stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatingsMatrix {
    num_users: usize,
    num_items: usize,
    indptr: Vec<usize>,
    indices: Vec<u32>,
    data: Vec<f32>,
}

impl RatingsMatrix {

    /// Assembles the matrix from parallel coordinate arrays. The shape is the largest user and
    /// item index plus one. If a (user, item) pair occurs more than once, the last rating wins.
    pub fn from_triples(
        users: &[u32],
        items: &[u32],
        ratings: &[f32],
        rating_value_count: usize,
        origin: &Path,
    ) -> Result<Self> {

        if users.len() != items.len() || users.len() != ratings.len() {
            return Err(Error::malformed(origin, format!(
                "mismatched array lengths: {} users, {} items, {} ratings",
                users.len(), items.len(), ratings.len())));
        }

        for (position, rating) in ratings.iter().enumerate() {
            check_rating(*rating, rating_value_count)
                .map_err(|reason| Error::malformed(origin, format!("entry {}: {}", position, reason)))?;
        }

        let num_users = users.iter().max().map(|user| *user as usize + 1).unwrap_or(0);
        let num_items = items.iter().max().map(|item| *item as usize + 1).unwrap_or(0);

        let mut columns = types::new_sparse_columns(num_items);

        for ((user, item), rating) in users.iter().zip(items.iter()).zip(ratings.iter()) {
            columns[*item as usize].insert(*user, *rating);
        }

        let num_ratings: usize = columns.iter().map(|column| column.len()).sum();

        let mut indptr = Vec::with_capacity(num_items + 1);
        let mut indices = Vec::with_capacity(num_ratings);
        let mut data = Vec::with_capacity(num_ratings);

        indptr.push(0);

        for column in columns.into_iter() {
            let mut entries: Vec<(u32, f32)> = column.into_iter().collect();
            entries.sort_unstable_by_key(|&(user, _)| user);

            for (user, rating) in entries {
                indices.push(user);
                data.push(rating);
            }
            indptr.push(indices.len());
        }

        Ok(RatingsMatrix { num_users, num_items, indptr, indices, data })
    }

    pub fn num_users(&self) -> usize {
        self.num_users
    }

    pub fn num_items(&self) -> usize {
        self.num_items
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.num_users, self.num_items)
    }

    /// Number of stored ratings
    pub fn nnz(&self) -> usize {
        self.data.len()
    }

    /// The users who rated `item` and their ratings, sorted by user
    pub fn column(&self, item: usize) -> (&[u32], &[f32]) {
        let range = self.indptr[item]..self.indptr[item + 1];
        (&self.indices[range.clone()], &self.data[range])
    }

    pub fn get(&self, user: u32, item: usize) -> Option<f32> {
        if item >= self.num_items {
            return None;
        }
        let (users, ratings) = self.column(item);
        users.binary_search(&user).ok().map(|position| ratings[position])
    }

    /// All stored (user, item, rating) entries, column by column
    pub fn triples<'a>(&'a self) -> impl Iterator<Item=(u32, u32, f32)> + 'a {
        (0..self.num_items).flat_map(move |item| {
            let (users, ratings) = self.column(item);
            users.iter().zip(ratings.iter())
                .map(move |(user, rating)| (*user, item as u32, *rating))
        })
    }

    pub fn load(path: &Path) -> Result<Self> {
        let matrix: RatingsMatrix = io::read_binary(path)?;
        matrix.check_structure().map_err(|reason| Error::malformed(path, reason))?;
        Ok(matrix)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        io::write_binary(path, self)
    }

    fn check_structure(&self) -> ::std::result::Result<(), String> {
        if self.indptr.len() != self.num_items + 1 || self.indptr.first() != Some(&0) {
            return Err(format!("column pointers do not cover {} items", self.num_items));
        }
        if self.indices.len() != self.data.len() || self.indptr[self.num_items] != self.data.len() {
            return Err(String::from("column pointers, users and ratings disagree in length"));
        }
        if let Some(item) = (0..self.num_items).find(|&item| self.indptr[item] > self.indptr[item + 1]) {
            return Err(format!("column pointers decrease at item {}", item));
        }
        for item in 0..self.num_items {
            let (users, _) = self.column(item);
            if users.windows(2).any(|pair| pair[0] >= pair[1]) {
                return Err(format!("users of item {} are not strictly increasing", item));
            }
        }
        if self.indices.iter().any(|user| *user as usize >= self.num_users) {
            return Err(format!("user index outside of {} users", self.num_users));
        }
        Ok(())
    }

    /// Fails unless every stored rating lies in `[1, rating_value_count]`
    pub fn check_ratings(&self, rating_value_count: usize, origin: &Path) -> Result<()> {
        for (user, item, rating) in self.triples() {
            check_rating(rating, rating_value_count).map_err(|reason| {
                Error::malformed(origin, format!("user {}, item {}: {}", user, item, reason))
            })?;
        }
        Ok(())
    }
}

fn check_rating(rating: f32, rating_value_count: usize) -> ::std::result::Result<(), String> {
    if rating.is_finite() && rating >= 1.0 && rating <= rating_value_count as f32 {
        Ok(())
    } else {
        Err(format!("rating {} outside of [1, {}]", rating, rating_value_count))
    }
}

/// Returns the ratings matrix, from its persisted artifact if present. Otherwise the matrix is
/// assembled from the raw users, items and ratings arrays and persisted for later runs, unless raw
/// ingestion is disabled, in which case a missing artifact is an error.
pub fn load_ratings<A: Announce + ?Sized>(config: &DataConfig, announcer: &A) -> Result<RatingsMatrix> {

    let path = config.ratings_cache_path();

    if !config.raw_ingestion && !path.is_file() {
        return Err(Error::missing(&path, "load_ratings"));
    }

    let matrix = cache::load_or_compute(&path, "rating matrix", announcer,
        |path| RatingsMatrix::load(path),
        || ingest_raw(config, announcer),
        |path, matrix| matrix.save(path),
    )?;

    matrix.check_ratings(config.rating_value_count, &path)?;

    Ok(matrix)
}

fn ingest_raw<A: Announce + ?Sized>(config: &DataConfig, announcer: &A) -> Result<RatingsMatrix> {

    let delimiter = config.text_delimiter_byte()?;
    let ratings_stem = config.raw_path(&config.ratings_file);

    let ratings: Vec<f32> = io::read_array(&ratings_stem, delimiter, announcer)?;
    let users: Vec<u32> = io::read_array(&config.raw_path(&config.users_file), delimiter, announcer)?;
    let items: Vec<u32> = io::read_array(&config.raw_path(&config.items_file), delimiter, announcer)?;

    announce::step(announcer, "Forming rating matrix", || {
        RatingsMatrix::from_triples(&users, &items, &ratings, config.rating_value_count, &ratings_stem)
    })
}
