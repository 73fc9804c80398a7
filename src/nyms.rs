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

use fnv::FnvHashSet;

use crate::announce::{self, Announce};
use crate::config::DataConfig;
use crate::errors::{Error, Result};
use crate::io;
use crate::types::{self, Nyms};

/// Reads the nym file and splits its users into their nyms. Every user must be listed at most
/// once. With a configured nym count, indices at or beyond it are rejected; without one, the
/// count is the largest index plus one. Nyms nobody is assigned to stay empty.
pub fn load_nyms<A: Announce + ?Sized>(config: &DataConfig, announcer: &A) -> Result<Nyms> {
    let path = config.nyms_path();

    announce::step(announcer, &format!("Reading nyms from \"{}\"", path.display()), || {
        let assignments = io::read_nym_assignments(&path)?;
        nyms_from_assignments(&assignments, config.nym_count, &path)
    })
}

/// Upper bound on the nym count inferred from the largest nym index
pub const MAX_INFERRED_NYM_COUNT: usize = 1 << 16;

pub fn nyms_from_assignments(
    assignments: &[(f64, f64)],
    nym_count: Option<usize>,
    origin: &Path,
) -> Result<Nyms> {

    let mut parsed: Vec<(u32, usize)> = Vec::with_capacity(assignments.len());
    let mut seen_users = FnvHashSet::with_capacity_and_hasher(assignments.len(), Default::default());

    for (row, &(user, nym)) in assignments.iter().enumerate() {

        let user = as_index(user, u32::max_value() as f64)
            .ok_or_else(|| Error::malformed(origin, format!("row {}: invalid user id {}", row, user)))?
            as u32;

        let nym = as_index(nym, u32::max_value() as f64)
            .ok_or_else(|| Error::malformed(origin, format!("row {}: invalid nym index {}", row, nym)))?
            as usize;

        if let Some(nym_count) = nym_count {
            if nym >= nym_count {
                return Err(Error::malformed(origin, format!(
                    "row {}: nym index {} exceeds the configured {} nyms", row, nym, nym_count)));
            }
        }

        if !seen_users.insert(user) {
            return Err(Error::malformed(origin, format!(
                "row {}: user {} is assigned to more than one nym", row, user)));
        }

        parsed.push((user, nym));
    }

    let nym_count = match nym_count {
        Some(nym_count) => nym_count,
        None => {
            let inferred = parsed.iter().map(|&(_, nym)| nym + 1).max().unwrap_or(0);
            if inferred > MAX_INFERRED_NYM_COUNT {
                return Err(Error::malformed(origin, format!(
                    "inferred {} nyms, more than the {} allowed without a configured nym count",
                    inferred, MAX_INFERRED_NYM_COUNT)));
            }
            inferred
        }
    };

    let mut nyms = types::new_nyms(nym_count);

    for (user, nym) in parsed {
        nyms[nym].push(user);
    }

    Ok(nyms)
}

/// Non-negative, integral and at most `max`
fn as_index(value: f64, max: f64) -> Option<u64> {
    if value.is_finite() && value >= 0.0 && value.fract() == 0.0 && value <= max {
        Some(value as u64)
    } else {
        None
    }
}

/// Maps every user of the first `num_users` to its nym, if any
pub fn nym_lookup(nyms: &Nyms, num_users: usize) -> Vec<Option<u32>> {
    let mut lookup = vec![None; num_users];

    for (nym_index, nym) in nyms.iter().enumerate() {
        for user in nym.iter() {
            if let Some(entry) = lookup.get_mut(*user as usize) {
                *entry = Some(nym_index as u32);
            }
        }
    }

    lookup
}
