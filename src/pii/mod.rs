//! PII normalization and skip-value cleaning (§4.1, §4.2).

pub mod clean;
pub mod glob;
pub mod normalize;
pub mod usps;

pub use clean::{clean as clean_record, SkipValueRule};
pub use normalize::{feature_iter, normalize};
