//! Model inference for predictions
//!
//! The persisted scaler is applied on every inference path, batch and
//! interactive alike; an unscaled vector never reaches the classifier.

use burn::tensor::backend::Backend;
use std::path::Path;

use crate::features::cleaner::{FeatureMatrix, Scaler};
use crate::features::registry::{spec_for, SportSpec};
use crate::model::net::{NetClassifier, OutcomeNet, OutcomeNetConfig};
use crate::model::Classifier;
use crate::training::metrics::EvalReport;
use crate::{DataConfig, ModelConfig, Prediction, Result, Sport, SportcastError};

/// Predictor over any classifier satisfying the boundary trait
pub struct Predictor<C: Classifier> {
    classifier: C,
    scaler: Scaler,
    spec: &'static SportSpec,
}

impl<C: Classifier> Predictor<C> {
    /// Assemble a predictor, verifying the scaler against the sport's
    /// declared feature order up front
    pub fn new(classifier: C, scaler: Scaler, sport: Sport) -> Result<Self> {
        let spec = spec_for(sport);
        scaler.check_names(&spec.feature_names())?;
        Ok(Predictor {
            classifier,
            scaler,
            spec,
        })
    }

    pub fn spec(&self) -> &'static SportSpec {
        self.spec
    }

    /// Predict from a raw (unscaled) feature vector in declared order
    pub fn predict(&self, raw_features: &[f32]) -> Result<Prediction> {
        let scaled = self.scaler.transform_row(raw_features)?;
        let probs = self.classifier.predict_proba(&[scaled]);
        let probability = probs.first().copied().ok_or_else(|| {
            SportcastError::Artifact("classifier returned no probability".to_string())
        })?;
        Ok(Prediction::new(self.spec.sport, probability))
    }

    /// Evaluate against a labeled matrix, imputing with the fitted medians
    pub fn evaluate(&self, matrix: &FeatureMatrix) -> Result<EvalReport> {
        let scaled = self.scaler.transform(matrix)?;
        let probs = self.classifier.predict_proba(&scaled);
        Ok(EvalReport::from_predictions(&probs, &matrix.labels))
    }

    /// Predict a batch of raw feature vectors
    pub fn predict_batch(&self, rows: &[Vec<f32>]) -> Result<Vec<Prediction>> {
        let scaled = rows
            .iter()
            .map(|r| self.scaler.transform_row(r))
            .collect::<Result<Vec<_>>>()?;
        let probs = self.classifier.predict_proba(&scaled);
        Ok(probs
            .into_iter()
            .map(|p| Prediction::new(self.spec.sport, p))
            .collect())
    }
}

/// Load the network + scaler artifacts for a sport
///
/// A missing artifact aborts cleanly with a "train first" error.
pub fn load_predictor<B: Backend>(
    data: &DataConfig,
    model_config: &ModelConfig,
    sport: Sport,
    device: B::Device,
) -> Result<Predictor<NetClassifier<B>>>
where
    B::FloatElem: serde::Serialize + serde::de::DeserializeOwned,
    B::IntElem: serde::Serialize + serde::de::DeserializeOwned,
{
    let spec = spec_for(sport);
    let model_path = data.model_path(sport);
    let scaler_path = data.scaler_path(sport);

    if !Path::new(&format!("{}.mpk", model_path)).exists()
        || !Path::new(&scaler_path).exists()
    {
        return Err(SportcastError::NoModel {
            sport,
            path: model_path,
        });
    }

    let scaler = Scaler::load(&scaler_path)?;

    let net_config = OutcomeNetConfig::new(spec.input_dim())
        .with_hidden_dims(model_config.hidden_dims.clone())
        .with_dropout(model_config.dropout);
    let net = OutcomeNet::<B>::load(&device, &model_path, net_config)?;
    let classifier = NetClassifier::new(net, device, spec.input_dim());

    Predictor::new(classifier, scaler, sport)
}

/// Parse a comma-separated literal feature vector
pub fn parse_feature_vector(input: &str) -> Result<Vec<f32>> {
    input
        .split(',')
        .map(|s| {
            let s = s.trim();
            s.parse::<f32>()
                .map_err(|_| SportcastError::Parse(format!("invalid feature value '{}'", s)))
        })
        .collect()
}

/// Format a prediction for display
pub fn format_prediction(pred: &Prediction) -> String {
    let spec = spec_for(pred.sport);
    format!(
        r#"
┌─────────────────────────────────────────────────┐
│  {}
├─────────────────────────────────────────────────┤
│  Win probability:  {:.1}%
│  Recommendation:   {}
└─────────────────────────────────────────────────┘
"#,
        spec.label,
        pred.probability * 100.0,
        pred.recommendation
    )
}
