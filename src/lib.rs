//! Loads a users x items rating dataset together with a partition of its users into disjoint
//! nyms, and derives per nym and item rating statistics and rating value distributions.
//!
//! Results are cached twice: in memory for the lifetime of a [`DataReader`], and on disk as
//! artifacts at fixed paths, so later runs skip both the raw inputs and the aggregation.

pub mod announce;
pub mod cache;
pub mod config;
pub mod errors;
pub mod io;
pub mod nyms;
pub mod ratings;
pub mod reader;
pub mod stats;
pub mod types;
pub mod utils;

mod usage_tests;

pub use crate::config::DataConfig;
pub use crate::errors::{Error, Result};
pub use crate::ratings::RatingsMatrix;
pub use crate::reader::DataReader;
