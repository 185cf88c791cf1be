//! Inference over persisted model artifacts

pub mod inference;

pub use inference::{format_prediction, load_predictor, parse_feature_vector, Predictor};
