//! Feature engineering: balanced pairs, per-sport registry, cleaning

pub mod cleaner;
pub mod pairs;
pub mod registry;

pub use cleaner::{FeatureMatrix, Scaler};
pub use pairs::{build_pairs, Observation};
pub use registry::{spec_for, Feature, SportSpec};
