//! Training loop, metrics, and dataset plumbing

pub mod metrics;
pub mod trainer;

pub use metrics::{EvalReport, Metrics, TrainingHistory};
pub use trainer::{PairBatcher, PairDataset, PairSample, Trainer};
