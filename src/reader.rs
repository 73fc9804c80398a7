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
use std::rc::Rc;

use ndarray::Axis;

use crate::announce::{self, Announce, LogAnnouncer};
use crate::cache::{self, Memo};
use crate::config::DataConfig;
use crate::errors::{Error, Result};
use crate::io;
use crate::nyms;
use crate::ratings::{self, RatingsMatrix};
use crate::stats;
use crate::types::{GroupRatingDistribution, NymStats, Nyms, NUM_STATS_FIELDS};

/// Entry point to the dataset. Every accessor computes its result at most once per reader and
/// hands out the same shared value on later calls. Derived statistics are additionally persisted
/// under the configured cache directory and served from there by later readers, without touching
/// the raw inputs.
pub struct DataReader {
    config: DataConfig,
    announcer: Box<dyn Announce>,
    ratings: Memo<RatingsMatrix>,
    nyms: Memo<Nyms>,
    nym_stats: Memo<NymStats>,
    group_rating_distribution: Memo<GroupRatingDistribution>,
}

impl DataReader {

    pub fn new(config: DataConfig) -> Self {
        DataReader::with_announcer(config, Box::new(LogAnnouncer::new()))
    }

    pub fn with_announcer(config: DataConfig, announcer: Box<dyn Announce>) -> Self {
        DataReader {
            config,
            announcer,
            ratings: Memo::new(),
            nyms: Memo::new(),
            nym_stats: Memo::new(),
            group_rating_distribution: Memo::new(),
        }
    }

    pub fn config(&self) -> &DataConfig {
        &self.config
    }

    /// The users x items ratings matrix
    pub fn ratings(&self) -> Result<Rc<RatingsMatrix>> {
        self.ratings.get_or_try_init(|| ratings::load_ratings(&self.config, &*self.announcer))
    }

    /// The users of every nym
    pub fn nyms(&self) -> Result<Rc<Nyms>> {
        self.nyms.get_or_try_init(|| nyms::load_nyms(&self.config, &*self.announcer))
    }

    pub fn nym_sizes(&self) -> Result<Vec<usize>> {
        Ok(self.nyms()?.iter().map(|nym| nym.len()).collect())
    }

    /// Item index, mean, variance and count of the ratings per nym and item, indexed by
    /// `[nym, item, field]`
    pub fn nym_stats(&self) -> Result<Rc<NymStats>> {
        const OPERATION: &str = "nym_stats";

        self.nym_stats.get_or_try_init(|| {
            let path = self.config.nym_stats_path();

            let nym_stats: NymStats = cache::load_or_compute(&path, "nym stats", &*self.announcer,
                |path| io::read_binary(path),
                || {
                    let (ratings, nyms) = self.upstream(OPERATION)?;
                    announce::step(&*self.announcer, "Computing nym stats", || {
                        Ok(stats::nym_stats(&ratings, &nyms))
                    })
                },
                |path, nym_stats| io::write_binary(path, nym_stats),
            )?;

            check_last_axis(&nym_stats, NUM_STATS_FIELDS, &path)?;

            Ok(nym_stats)
        })
    }

    /// Distribution of the rating values per nym and item, indexed by
    /// `[nym, item, rating value - 1]`
    pub fn group_rating_distribution(&self) -> Result<Rc<GroupRatingDistribution>> {
        const OPERATION: &str = "group_rating_distribution";

        self.group_rating_distribution.get_or_try_init(|| {
            let path = self.config.group_rating_distribution_path();
            let rating_value_count = self.config.rating_value_count;

            let dists: GroupRatingDistribution = cache::load_or_compute(
                &path, "rating distributions", &*self.announcer,
                |path| io::read_binary(path),
                || {
                    let (ratings, nyms) = self.upstream(OPERATION)?;
                    announce::step(&*self.announcer, "Computing rating distributions", || {
                        Ok(stats::group_rating_distribution(&ratings, &nyms, rating_value_count))
                    })
                },
                |path, dists| io::write_binary(path, dists),
            )?;

            check_last_axis(&dists, rating_value_count, &path)?;

            Ok(dists)
        })
    }

    fn upstream(&self, operation: &str) -> Result<(Rc<RatingsMatrix>, Rc<Nyms>)> {
        let ratings = self.ratings().map_err(|failure| Error::upstream(operation, failure))?;
        let nyms = self.nyms().map_err(|failure| Error::upstream(operation, failure))?;
        Ok((ratings, nyms))
    }
}

/// A persisted artifact written under a different configuration must not pass silently
fn check_last_axis(array: &ndarray::Array3<f64>, expected: usize, path: &Path) -> Result<()> {
    let found = array.len_of(Axis(2));
    if found != expected {
        return Err(Error::malformed(path, format!("expected {} values per entry, found {}", expected, found)));
    }
    Ok(())
}
