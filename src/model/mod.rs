//! Classifier boundary and the dense network implementation

pub mod net;

pub use net::{NetClassifier, OutcomeNet, OutcomeNetConfig};

/// Boundary for any binary probabilistic classifier
///
/// Consumes already-scaled feature rows and yields P(first contestant wins)
/// per row. Anything satisfying this is interchangeable behind the pipeline.
pub trait Classifier {
    fn predict_proba(&self, rows: &[Vec<f32>]) -> Vec<f32>;
}
