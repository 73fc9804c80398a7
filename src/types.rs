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

use fnv::FnvHashMap;
use ndarray::Array3;

/// The users belonging to a single nym
pub type Nym = Vec<u32>;
pub type Nyms = Vec<Nym>;

/// A column of ratings under assembly, keyed by user
pub type SparseColumn = FnvHashMap<u32, f32>;
pub type SparseColumns = Vec<SparseColumn>;

/// Indexed by [nym, item, field], see the field constants below
pub type NymStats = Array3<f64>;

/// Indexed by [nym, item, rating value - 1]
pub type GroupRatingDistribution = Array3<f64>;

pub const ITEM_INDEX: usize = 0;
pub const MEAN: usize = 1;
pub const VARIANCE: usize = 2;
pub const RATING_COUNT: usize = 3;
pub const NUM_STATS_FIELDS: usize = 4;

pub fn new_sparse_columns(num_columns: usize) -> SparseColumns {
    vec![FnvHashMap::with_capacity_and_hasher(0, Default::default()); num_columns]
}

pub fn new_nyms(num_nyms: usize) -> Nyms {
    vec![Vec::new(); num_nyms]
}

pub fn new_nym_stats(num_nyms: usize, num_items: usize) -> NymStats {
    Array3::zeros((num_nyms, num_items, NUM_STATS_FIELDS))
}

pub fn new_group_rating_distribution(
    num_nyms: usize,
    num_items: usize,
    rating_value_count: usize,
) -> GroupRatingDistribution {
    Array3::zeros((num_nyms, num_items, rating_value_count))
}
