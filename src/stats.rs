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

use ndarray::{s, Axis};

use crate::nyms;
use crate::ratings::RatingsMatrix;
use crate::types::{self, GroupRatingDistribution, NymStats, Nyms};
use crate::types::{ITEM_INDEX, MEAN, RATING_COUNT, VARIANCE};

/// Welford's online mean and (population) variance, stable for long runs of similar ratings
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct RunningStats {
    count: u64,
    mean: f64,
    m2: f64,
}

impl RunningStats {

    pub fn observe(&mut self, value: f64) {
        self.count += 1;
        let delta = value - self.mean;
        self.mean += delta / self.count as f64;
        self.m2 += delta * (value - self.mean);
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    /// Zero without observations
    pub fn mean(&self) -> f64 {
        self.mean
    }

    /// Divides by n, not n - 1. Zero without observations.
    pub fn variance(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.m2 / self.count as f64
        }
    }
}

/// Per nym and item: the item index, mean, variance and number of the ratings given by the
/// members of the nym. Items a nym never rated get `(item, 0, 0, 0)`.
pub fn nym_stats(ratings: &RatingsMatrix, nyms: &Nyms) -> NymStats {

    let num_nyms = nyms.len();
    let lookup = nyms::nym_lookup(nyms, ratings.num_users());

    let mut stats = types::new_nym_stats(num_nyms, ratings.num_items());
    let mut accumulators = vec![RunningStats::default(); num_nyms];

    for item in 0..ratings.num_items() {

        for accumulator in accumulators.iter_mut() {
            *accumulator = RunningStats::default();
        }

        let (users, values) = ratings.column(item);

        for (user, rating) in users.iter().zip(values.iter()) {
            if let Some(nym) = lookup[*user as usize] {
                accumulators[nym as usize].observe(*rating as f64);
            }
        }

        for (nym, accumulator) in accumulators.iter().enumerate() {
            stats[[nym, item, ITEM_INDEX]] = item as f64;
            stats[[nym, item, MEAN]] = accumulator.mean();
            stats[[nym, item, VARIANCE]] = accumulator.variance();
            stats[[nym, item, RATING_COUNT]] = accumulator.count() as f64;
        }
    }

    stats
}

/// Per nym and item: the empirical distribution of the rating values the members of the nym gave
/// the item, bucket `v - 1` holding the share of rating `v`. Where a nym has no ratings for an
/// item, the distribution is uniform.
///
/// Every rating must round to a value in `[1, rating_value_count]`; matrices built or loaded by
/// this crate are checked for that, anything else panics.
pub fn group_rating_distribution(
    ratings: &RatingsMatrix,
    nyms: &Nyms,
    rating_value_count: usize,
) -> GroupRatingDistribution {

    let lookup = nyms::nym_lookup(nyms, ratings.num_users());

    let mut dists =
        types::new_group_rating_distribution(nyms.len(), ratings.num_items(), rating_value_count);

    for item in 0..ratings.num_items() {
        let (users, values) = ratings.column(item);

        for (user, rating) in users.iter().zip(values.iter()) {
            if let Some(nym) = lookup[*user as usize] {
                let bucket = rating.round() as usize - 1;
                dists[[nym as usize, item, bucket]] += 1.0;
            }
        }
    }

    normalize(&mut dists);

    dists
}

/// Scales every histogram along the bucket axis to sum to one, replacing empty ones with the
/// uniform distribution
fn normalize(dists: &mut GroupRatingDistribution) {
    let num_buckets = dists.len_of(Axis(2));
    if num_buckets == 0 {
        return;
    }
    let uniform = 1.0 / num_buckets as f64;

    for mut per_item in dists.axis_iter_mut(Axis(0)) {
        for mut histogram in per_item.axis_iter_mut(Axis(0)) {
            let total = histogram.sum();
            if total > 0.0 {
                histogram /= total;
            } else {
                histogram.fill(uniform);
            }
        }
    }
}

/// Total number of ratings each nym gave, from already computed stats
pub fn ratings_per_nym(stats: &NymStats) -> Vec<u64> {
    stats.slice(s![.., .., RATING_COUNT])
        .axis_iter(Axis(0))
        .map(|counts| counts.sum() as u64)
        .collect()
}
