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

#[cfg(test)]
mod tests {

    use std::cell::RefCell;
    use std::fs;
    use std::path::Path;
    use std::rc::Rc;

    use ndarray::s;

    use crate::announce::{Announce, SilentAnnouncer};
    use crate::config::DataConfig;
    use crate::errors::Error;
    use crate::io;
    use crate::reader::DataReader;

    /* The raw dataset consists of three parallel arrays (ratings, users and items), each either in
       binary or in text form, and a comma separated file assigning users to nyms. */
    fn write_dataset(data_dir: &Path, users: &str, items: &str, ratings: &str, nyms: &str) {
        fs::write(data_dir.join("users_big.txt"), users).unwrap();
        fs::write(data_dir.join("movies_big.txt"), items).unwrap();
        fs::write(data_dir.join("ratings_big.txt"), ratings).unwrap();
        fs::write(data_dir.join("P"), nyms).unwrap();
    }

    fn remove_raw_inputs(data_dir: &Path) {
        for file in &["users_big.txt", "movies_big.txt", "ratings_big.txt", "P"] {
            fs::remove_file(data_dir.join(file)).unwrap();
        }
    }

    fn config_for(data_dir: &Path, nym_count: Option<usize>) -> DataConfig {
        let mut config = DataConfig::with_data_dir(data_dir);
        config.nym_count = nym_count;
        config
    }

    fn silent_reader(config: DataConfig) -> DataReader {
        DataReader::with_announcer(config, Box::new(SilentAnnouncer))
    }

    /// Remembers the announced steps, shared with the test after the reader takes ownership
    #[derive(Clone, Default)]
    struct RecordingAnnouncer {
        steps: Rc<RefCell<Vec<String>>>,
    }

    impl Announce for RecordingAnnouncer {
        fn begin(&self, message: &str) {
            self.steps.borrow_mut().push(message.to_string());
        }
        fn end(&self, _succeeded: bool) {}
    }

    #[test]
    fn programmatic_usage() {
        let dir = tempfile::tempdir().unwrap();
        write_dataset(dir.path(), "0\n1\n", "0\n0\n", "5\n3\n", "0,0\n1,1\n");

        /* The reader only needs to know where the data lives and how many nyms there are. */
        let reader = silent_reader(config_for(dir.path(), Some(2)));

        let nym_stats = reader.nym_stats().unwrap();

        assert_eq!(nym_stats.slice(s![0, 0, ..]).to_vec(), vec![0.0, 5.0, 0.0, 1.0]);
        assert_eq!(nym_stats.slice(s![1, 0, ..]).to_vec(), vec![0.0, 3.0, 0.0, 1.0]);

        let dists = reader.group_rating_distribution().unwrap();

        assert_eq!(dists.slice(s![0, 0, ..]).to_vec(), vec![0.0, 0.0, 0.0, 0.0, 1.0]);
        assert_eq!(dists.slice(s![1, 0, ..]).to_vec(), vec![0.0, 0.0, 1.0, 0.0, 0.0]);

        assert_eq!(reader.nym_sizes().unwrap(), vec![1, 1]);
    }

    #[test]
    fn accessors_return_the_same_value_twice() {
        let dir = tempfile::tempdir().unwrap();
        write_dataset(dir.path(), "0\n1\n2\n", "0\n1\n1\n", "4\n2\n1\n", "0,0\n1,1\n2,1\n");

        let announcer = RecordingAnnouncer::default();
        let steps = Rc::clone(&announcer.steps);
        let reader = DataReader::with_announcer(config_for(dir.path(), None), Box::new(announcer));

        let ratings = reader.ratings().unwrap();
        let nyms = reader.nyms().unwrap();
        let nym_stats = reader.nym_stats().unwrap();
        let dists = reader.group_rating_distribution().unwrap();

        let steps_after_first_calls = steps.borrow().len();

        assert!(Rc::ptr_eq(&ratings, &reader.ratings().unwrap()));
        assert!(Rc::ptr_eq(&nyms, &reader.nyms().unwrap()));
        assert!(Rc::ptr_eq(&nym_stats, &reader.nym_stats().unwrap()));
        assert!(Rc::ptr_eq(&dists, &reader.group_rating_distribution().unwrap()));

        assert_eq!(steps.borrow().len(), steps_after_first_calls);
        assert_eq!(
            steps.borrow().iter().filter(|step| step.starts_with("Reading nyms")).count(),
            1
        );
    }

    #[test]
    fn later_runs_are_served_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        write_dataset(dir.path(), "0\n1\n2\n3\n", "0\n0\n1\n2\n", "1\n1\n3\n5\n", "0,0\n1,0\n2,1\n3,1\n");

        let config = config_for(dir.path(), Some(3));

        let first_run = silent_reader(config.clone());
        let ratings = first_run.ratings().unwrap();
        let nym_stats = first_run.nym_stats().unwrap();
        let dists = first_run.group_rating_distribution().unwrap();

        assert!(config.ratings_cache_path().is_file());
        assert!(config.nym_stats_path().is_file());
        assert!(config.group_rating_distribution_path().is_file());

        /* Nothing but the artifacts is needed from now on. */
        remove_raw_inputs(dir.path());

        let second_run = silent_reader(config.clone());

        assert_eq!(*second_run.nym_stats().unwrap(), *nym_stats);
        assert_eq!(*second_run.group_rating_distribution().unwrap(), *dists);
        assert_eq!(*second_run.ratings().unwrap(), *ratings);
        assert!(second_run.nyms().is_err());
    }

    #[test]
    fn boundary_items_and_empty_nyms() {
        let dir = tempfile::tempdir().unwrap();
        /* Item 1 is never rated and only nym 0 has members. */
        write_dataset(dir.path(), "0\n1\n2\n2\n", "0\n0\n0\n2\n", "1\n1\n3\n4\n", "0,0\n1,0\n2,0\n");

        let reader = silent_reader(config_for(dir.path(), Some(3)));

        let nym_stats = reader.nym_stats().unwrap();
        let dists = reader.group_rating_distribution().unwrap();

        assert_eq!(nym_stats.shape(), &[3, 3, 4]);
        assert_eq!(dists.shape(), &[3, 3, 5]);

        for nym in 0..3 {
            assert_eq!(nym_stats.slice(s![nym, 1, ..]).to_vec(), vec![1.0, 0.0, 0.0, 0.0]);
            assert!(dists.slice(s![nym, 1, ..]).iter().all(|share| *share == 0.2));

            for item in 0..3 {
                let total: f64 = dists.slice(s![nym, item, ..]).sum();
                assert!((total - 1.0).abs() < 1e-9);
            }
        }

        let expected = [2.0 / 3.0, 0.0, 1.0 / 3.0, 0.0, 0.0];
        let shares = dists.slice(s![0, 0, ..]).to_vec();
        for (share, expected) in shares.iter().zip(expected.iter()) {
            assert!((share - expected).abs() < 1e-9);
        }
        assert_eq!(nym_stats.slice(s![2, 0, ..]).to_vec(), vec![0.0, 0.0, 0.0, 0.0]);
        assert_eq!(dists.slice(s![0, 2, ..]).to_vec(), vec![0.0, 0.0, 0.0, 1.0, 0.0]);
    }

    #[test]
    fn binary_raw_arrays() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("P"), "0,0\n1,0\n2,0\n").unwrap();

        io::write_array(&dir.path().join("users_big"), &[0_u32, 1, 2], &SilentAnnouncer).unwrap();
        io::write_array(&dir.path().join("movies_big"), &[0_u32, 0, 0], &SilentAnnouncer).unwrap();
        io::write_array(&dir.path().join("ratings_big"), &[1.0_f32, 1.0, 3.0], &SilentAnnouncer)
            .unwrap();

        let reader = silent_reader(config_for(dir.path(), Some(1)));

        let nym_stats = reader.nym_stats().unwrap();

        assert_eq!(nym_stats[[0, 0, 3]], 3.0);
        assert!((nym_stats[[0, 0, 1]] - 5.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn persisted_matrix_only() {
        let dir = tempfile::tempdir().unwrap();
        write_dataset(dir.path(), "0\n", "0\n", "5\n", "0,0\n");

        let mut config = config_for(dir.path(), Some(1));
        config.raw_ingestion = false;

        match silent_reader(config.clone()).ratings() {
            Err(Error::MissingInput { path, .. }) => assert_eq!(path, config.ratings_cache_path()),
            other => panic!("expected missing input, got {:?}", other),
        }

        config.raw_ingestion = true;
        silent_reader(config.clone()).ratings().unwrap();

        config.raw_ingestion = false;
        assert_eq!(silent_reader(config).ratings().unwrap().get(0, 0), Some(5.0));
    }

    #[test]
    fn failing_dependencies_are_reported_upstream() {
        let dir = tempfile::tempdir().unwrap();
        write_dataset(dir.path(), "0\n", "0\n", "5\n", "0,-1\n");

        let config = config_for(dir.path(), None);
        let reader = silent_reader(config.clone());

        match reader.nym_stats() {
            Err(Error::UpstreamUnavailable { operation, source }) => {
                assert_eq!(operation, "nym_stats");
                match *source {
                    Error::MalformedInput { .. } => {}
                    other => panic!("expected malformed nyms, got {:?}", other),
                }
            }
            other => panic!("expected upstream failure, got {:?}", other),
        }

        assert!(!config.nym_stats_path().exists());

        fs::remove_file(dir.path().join("ratings_big.txt")).unwrap();
        fs::remove_file(config.ratings_cache_path()).unwrap();

        match silent_reader(config).group_rating_distribution() {
            Err(Error::UpstreamUnavailable { source, .. }) => match *source {
                Error::MissingInput { .. } => {}
                other => panic!("expected missing ratings, got {:?}", other),
            },
            other => panic!("expected upstream failure, got {:?}", other),
        }
    }

    #[test]
    fn artifacts_from_another_configuration_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        write_dataset(dir.path(), "0\n", "0\n", "2\n", "0,0\n");

        let config = config_for(dir.path(), Some(1));
        silent_reader(config.clone()).group_rating_distribution().unwrap();

        let mut other_config = config;
        other_config.rating_value_count = 10;

        match silent_reader(other_config).group_rating_distribution() {
            Err(Error::MalformedInput { .. }) => {}
            other => panic!("expected malformed artifact, got {:?}", other),
        }
    }
}
