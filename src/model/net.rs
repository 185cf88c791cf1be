//! Dense binary classifier
//!
//! Architecture: Input(d) → Hidden(64) → ReLU → Dropout
//!                        → Hidden(32) → ReLU → Dropout
//!                        → Hidden(16) → ReLU → Dropout
//!                        → win_head(1)
//!
//! The same network is used for every sport; only the input dimension
//! changes with the sport's feature list.

use burn::module::Module;
use burn::nn::{Dropout, DropoutConfig, Linear, LinearConfig};
use burn::record::{FullPrecisionSettings, Recorder};
use burn::tensor::activation::{relu, sigmoid};
use burn::tensor::backend::Backend;
use burn::tensor::Tensor;

use crate::model::Classifier;

/// Configuration for the outcome network
#[derive(Debug, Clone)]
pub struct OutcomeNetConfig {
    /// Input dimension (the sport's feature count)
    pub input_dim: usize,
    /// Hidden layer dimensions
    pub hidden_dims: Vec<usize>,
    /// Dropout rate
    pub dropout: f64,
}

impl OutcomeNetConfig {
    pub fn new(input_dim: usize) -> Self {
        OutcomeNetConfig {
            input_dim,
            hidden_dims: vec![64, 32, 16],
            dropout: 0.2,
        }
    }

    pub fn with_hidden_dims(mut self, hidden_dims: Vec<usize>) -> Self {
        self.hidden_dims = hidden_dims;
        self
    }

    pub fn with_dropout(mut self, dropout: f64) -> Self {
        self.dropout = dropout;
        self
    }
}

/// A single hidden layer block: Linear → ReLU → Dropout
#[derive(Module, Debug)]
pub struct HiddenBlock<B: Backend> {
    linear: Linear<B>,
    dropout: Dropout,
}

impl<B: Backend> HiddenBlock<B> {
    pub fn new(device: &B::Device, in_dim: usize, out_dim: usize, dropout: f64) -> Self {
        HiddenBlock {
            linear: LinearConfig::new(in_dim, out_dim).init(device),
            dropout: DropoutConfig::new(dropout).init(),
        }
    }

    pub fn forward(&self, x: Tensor<B, 2>) -> Tensor<B, 2> {
        let x = self.linear.forward(x);
        let x = relu(x);
        self.dropout.forward(x)
    }
}

/// Feed-forward binary outcome classifier
#[derive(Module, Debug)]
pub struct OutcomeNet<B: Backend> {
    hidden: Vec<HiddenBlock<B>>,
    win_head: Linear<B>,
}

impl<B: Backend> OutcomeNet<B> {
    /// Create a new network
    pub fn new(device: &B::Device, config: OutcomeNetConfig) -> Self {
        let mut hidden = Vec::with_capacity(config.hidden_dims.len());
        let mut in_dim = config.input_dim;
        for &out_dim in &config.hidden_dims {
            hidden.push(HiddenBlock::new(device, in_dim, out_dim, config.dropout));
            in_dim = out_dim;
        }

        OutcomeNet {
            hidden,
            win_head: LinearConfig::new(in_dim, 1).init(device),
        }
    }

    /// Forward pass
    ///
    /// # Arguments
    /// * `features` - Scaled feature rows [batch, input_dim]
    ///
    /// # Returns
    /// Win logit [batch, 1] - apply sigmoid for P(win)
    pub fn forward(&self, features: Tensor<B, 2>) -> Tensor<B, 2> {
        let mut x = features;
        for block in &self.hidden {
            x = block.forward(x);
        }
        self.win_head.forward(x)
    }

    /// Save model to file
    pub fn save(&self, path: &str) -> crate::Result<()>
    where
        B::FloatElem: serde::Serialize + serde::de::DeserializeOwned,
        B::IntElem: serde::Serialize + serde::de::DeserializeOwned,
    {
        let recorder = burn::record::NamedMpkFileRecorder::<FullPrecisionSettings>::new();
        recorder
            .record(self.clone().into_record(), path.into())
            .map_err(|e| crate::SportcastError::Io(std::io::Error::other(e.to_string())))
    }

    /// Load model from file
    pub fn load(device: &B::Device, path: &str, config: OutcomeNetConfig) -> crate::Result<Self>
    where
        B::FloatElem: serde::Serialize + serde::de::DeserializeOwned,
        B::IntElem: serde::Serialize + serde::de::DeserializeOwned,
    {
        let recorder = burn::record::NamedMpkFileRecorder::<FullPrecisionSettings>::new();
        let record = recorder
            .load(path.into(), device)
            .map_err(|e| crate::SportcastError::Io(std::io::Error::other(e.to_string())))?;

        let model = Self::new(device, config);
        Ok(model.load_record(record))
    }
}

/// Classifier boundary wrapper around the network plus its device
#[derive(Clone)]
pub struct NetClassifier<B: Backend> {
    net: OutcomeNet<B>,
    device: B::Device,
    input_dim: usize,
}

impl<B: Backend> NetClassifier<B> {
    pub fn new(net: OutcomeNet<B>, device: B::Device, input_dim: usize) -> Self {
        NetClassifier {
            net,
            device,
            input_dim,
        }
    }

    pub fn net(&self) -> &OutcomeNet<B> {
        &self.net
    }
}

impl<B: Backend> Classifier for NetClassifier<B> {
    fn predict_proba(&self, rows: &[Vec<f32>]) -> Vec<f32> {
        if rows.is_empty() {
            return Vec::new();
        }

        let batch = rows.len();
        let data: Vec<f32> = rows.iter().flatten().copied().collect();
        let features = Tensor::<B, 1>::from_floats(data.as_slice(), &self.device)
            .reshape([batch, self.input_dim]);

        let probs = sigmoid(self.net.forward(features));
        let probs_data = probs.to_data();
        probs_data.as_slice::<f32>().unwrap_or(&[]).to_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    type TestBackend = NdArray<f32>;

    #[test]
    fn test_forward_shape() {
        let device = Default::default();
        let config = OutcomeNetConfig::new(11);
        let model = OutcomeNet::<TestBackend>::new(&device, config);

        let features = Tensor::random(
            [4, 11],
            burn::tensor::Distribution::Normal(0.0, 1.0),
            &device,
        );

        let logits = model.forward(features);
        assert_eq!(logits.dims(), [4, 1]);
    }

    #[test]
    fn test_single_hidden_layer() {
        let device = Default::default();
        let config = OutcomeNetConfig::new(4).with_hidden_dims(vec![8]);
        let model = OutcomeNet::<TestBackend>::new(&device, config);

        let features = Tensor::zeros([2, 4], &device);
        assert_eq!(model.forward(features).dims(), [2, 1]);
    }

    #[test]
    fn test_classifier_probabilities_in_range() {
        let device: <TestBackend as Backend>::Device = Default::default();
        let config = OutcomeNetConfig::new(4);
        let net = OutcomeNet::<TestBackend>::new(&device, config);
        let classifier = NetClassifier::new(net, device, 4);

        let rows = vec![vec![0.5, -1.0, 2.0, 0.0], vec![0.0, 0.0, 0.0, 0.0]];
        let probs = classifier.predict_proba(&rows);
        assert_eq!(probs.len(), 2);
        for p in probs {
            assert!((0.0..=1.0).contains(&p), "probability out of range: {}", p);
        }
    }

    #[test]
    fn test_empty_batch() {
        let device: <TestBackend as Backend>::Device = Default::default();
        let net = OutcomeNet::<TestBackend>::new(&device, OutcomeNetConfig::new(3));
        let classifier = NetClassifier::new(net, device, 3);
        assert!(classifier.predict_proba(&[]).is_empty());
    }
}
