//! Multi-pass probabilistic scoring: comparators, pass evaluation, the
//! algorithm driver, and the immutable algorithm configuration/cache.

pub mod cache;
pub mod comparators;
pub mod config;
pub mod driver;
pub mod pass;
pub mod similarity;

pub use cache::AlgorithmCache;
pub use config::AlgorithmConfig;
pub use driver::{link, LinkResult, PersonResult};
pub use pass::Grade;
