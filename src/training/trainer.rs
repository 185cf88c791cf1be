//! Training loop for the outcome network

use burn::data::dataloader::DataLoaderBuilder;
use burn::data::dataset::Dataset;
use burn::optim::{AdamConfig, GradientsParams, Optimizer};
use burn::tensor::activation::sigmoid;
use burn::tensor::backend::AutodiffBackend;
use burn::tensor::{ElementConversion, Tensor};

use crate::model::net::OutcomeNet;
use crate::training::metrics::{Metrics, TrainingHistory};
use crate::{Result, SportcastError, TrainingConfig};

/// One scaled training sample: feature row plus win label
#[derive(Debug, Clone)]
pub struct PairSample {
    pub features: Vec<f32>,
    pub label: f32,
}

/// In-memory dataset of scaled observation rows
#[derive(Debug, Clone)]
pub struct PairDataset {
    samples: Vec<PairSample>,
    input_dim: usize,
}

impl PairDataset {
    pub fn new(rows: Vec<Vec<f32>>, labels: Vec<f32>) -> Result<Self> {
        if rows.len() != labels.len() {
            return Err(SportcastError::Parse(format!(
                "rows/labels length mismatch: {} vs {}",
                rows.len(),
                labels.len()
            )));
        }
        let input_dim = rows.first().map(|r| r.len()).unwrap_or(0);
        let samples = rows
            .into_iter()
            .zip(labels)
            .map(|(features, label)| PairSample { features, label })
            .collect();
        Ok(PairDataset { samples, input_dim })
    }

    pub fn input_dim(&self) -> usize {
        self.input_dim
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

impl Dataset<PairSample> for PairDataset {
    fn get(&self, index: usize) -> Option<PairSample> {
        self.samples.get(index).cloned()
    }

    fn len(&self) -> usize {
        self.samples.len()
    }
}

/// Batch of samples as tensors
#[derive(Debug, Clone)]
pub struct PairBatch<B: burn::tensor::backend::Backend> {
    /// Feature rows [batch, input_dim]
    pub features: Tensor<B, 2>,
    /// Win labels [batch]
    pub labels: Tensor<B, 1>,
}

/// Batcher for creating training batches
#[derive(Clone)]
pub struct PairBatcher<B: burn::tensor::backend::Backend> {
    device: B::Device,
    input_dim: usize,
}

impl<B: burn::tensor::backend::Backend> PairBatcher<B> {
    pub fn new(device: B::Device, input_dim: usize) -> Self {
        PairBatcher { device, input_dim }
    }
}

impl<B: burn::tensor::backend::Backend>
    burn::data::dataloader::batcher::Batcher<B, PairSample, PairBatch<B>> for PairBatcher<B>
{
    fn batch(&self, items: Vec<PairSample>, _device: &B::Device) -> PairBatch<B> {
        let batch_size = items.len();

        let mut feature_data = Vec::with_capacity(batch_size * self.input_dim);
        let mut label_data = Vec::with_capacity(batch_size);
        for sample in &items {
            feature_data.extend_from_slice(&sample.features);
            label_data.push(sample.label);
        }

        let features = Tensor::<B, 1>::from_floats(feature_data.as_slice(), &self.device)
            .reshape([batch_size, self.input_dim]);
        let labels = Tensor::<B, 1>::from_floats(label_data.as_slice(), &self.device);

        PairBatch { features, labels }
    }
}

/// Binary cross-entropy with logits (numerically stable)
fn binary_cross_entropy<B: AutodiffBackend>(
    logits: Tensor<B, 2>,
    targets: Tensor<B, 2>,
) -> Tensor<B, 1> {
    let probs = sigmoid(logits);
    let eps = 1e-7;
    let probs_clamped = probs.clamp(eps, 1.0 - eps);
    let loss = targets.clone().neg() * probs_clamped.clone().log()
        - (targets.neg() + 1.0) * (probs_clamped.neg() + 1.0).log();
    loss.mean()
}

/// Trainer for the outcome network
pub struct Trainer<B: AutodiffBackend> {
    model: OutcomeNet<B>,
    optimizer: burn::optim::adaptor::OptimizerAdaptor<burn::optim::Adam, OutcomeNet<B>, B>,
    config: TrainingConfig,
    device: B::Device,
}

impl<B: AutodiffBackend> Trainer<B>
where
    B::FloatElem: serde::Serialize + serde::de::DeserializeOwned,
    B::IntElem: serde::Serialize + serde::de::DeserializeOwned,
{
    /// Create a new trainer
    pub fn new(model: OutcomeNet<B>, config: TrainingConfig, device: B::Device) -> Self {
        let optimizer = AdamConfig::new()
            .with_weight_decay(Some(burn::optim::decay::WeightDecayConfig::new(
                config.weight_decay as f32,
            )))
            .init();

        Trainer {
            model,
            optimizer,
            config,
            device,
        }
    }

    /// Train the model, returning the best checkpoint and the history
    pub fn train(
        mut self,
        train_dataset: PairDataset,
        val_dataset: PairDataset,
    ) -> Result<(OutcomeNet<B>, TrainingHistory)> {
        if train_dataset.is_empty() || val_dataset.is_empty() {
            return Err(SportcastError::NoData(
                "not enough observations to train".to_string(),
            ));
        }

        let input_dim = train_dataset.input_dim();
        let batcher_train = PairBatcher::<B>::new(self.device.clone(), input_dim);
        let batcher_val = PairBatcher::<B>::new(self.device.clone(), input_dim);

        let batch_size = self.config.batch_size.min(train_dataset.len()).max(1);
        let val_batch_size = val_dataset.len();

        let train_loader = DataLoaderBuilder::new(batcher_train)
            .batch_size(batch_size)
            .shuffle(self.config.seed)
            .build(train_dataset);

        let val_loader = DataLoaderBuilder::new(batcher_val)
            .batch_size(val_batch_size)
            .build(val_dataset);

        let mut history = TrainingHistory::new();
        let mut best_model = self.model.clone();

        log::info!("Starting training for {} epochs", self.config.epochs);

        for epoch in 0..self.config.epochs {
            let train_metrics = self.train_epoch(train_loader.iter());
            let val_metrics = self.validate_epoch(val_loader.iter());

            history.record_epoch(epoch, &train_metrics, &val_metrics);

            log::info!(
                "Epoch {}/{}: Train: {} | Val: {}",
                epoch + 1,
                self.config.epochs,
                train_metrics,
                val_metrics
            );

            if val_metrics.avg_loss() <= history.best_val_loss {
                best_model = self.model.clone();
                log::info!("  New best model (val_loss: {:.4})", val_metrics.avg_loss());
            }

            if history.should_early_stop(self.config.early_stopping_patience) {
                log::info!(
                    "Early stopping at epoch {} (best was epoch {})",
                    epoch + 1,
                    history.best_epoch + 1
                );
                break;
            }
        }

        Ok((best_model, history))
    }

    /// Train one epoch
    fn train_epoch(&mut self, loader: impl Iterator<Item = PairBatch<B>>) -> Metrics {
        let mut metrics = Metrics::new();

        for batch in loader {
            let targets = batch.labels.clone().unsqueeze_dim(1);

            let logits = self.model.forward(batch.features.clone());
            let loss = binary_cross_entropy(logits.clone(), targets);
            let loss_val: f32 = loss.clone().into_scalar().elem();

            let grads = loss.backward();
            let grads = GradientsParams::from_grads(grads, &self.model);
            self.model = self
                .optimizer
                .step(self.config.learning_rate, self.model.clone(), grads);

            let (probs, labels) = batch_predictions(&logits, &batch.labels);
            metrics.update(loss_val, &probs, &labels);
        }

        metrics
    }

    /// Validate one epoch (no gradient updates)
    fn validate_epoch(&self, loader: impl Iterator<Item = PairBatch<B>>) -> Metrics {
        let mut metrics = Metrics::new();

        for batch in loader {
            let targets = batch.labels.clone().unsqueeze_dim(1);

            let logits = self.model.forward(batch.features.clone());
            let loss = binary_cross_entropy(logits.clone(), targets);
            let loss_val: f32 = loss.into_scalar().elem();

            let (probs, labels) = batch_predictions(&logits, &batch.labels);
            metrics.update(loss_val, &probs, &labels);
        }

        metrics
    }

    /// Get the current model
    pub fn model(&self) -> &OutcomeNet<B> {
        &self.model
    }

    /// Get the model, consuming the trainer
    pub fn into_model(self) -> OutcomeNet<B> {
        self.model
    }
}

/// Pull probabilities and targets back to the host for metric accumulation
fn batch_predictions<B: AutodiffBackend>(
    logits: &Tensor<B, 2>,
    labels: &Tensor<B, 1>,
) -> (Vec<f32>, Vec<f32>) {
    let probs = sigmoid(logits.clone());
    let probs_data = probs.to_data();
    let labels_data = labels.clone().to_data();

    let probs: Vec<f32> = probs_data.as_slice::<f32>().unwrap_or(&[]).to_vec();
    let labels: Vec<f32> = labels_data.as_slice::<f32>().unwrap_or(&[]).to_vec();
    (probs, labels)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::net::OutcomeNetConfig;
    use burn::backend::{Autodiff, NdArray};

    type TestBackend = Autodiff<NdArray<f32>>;

    fn toy_dataset(n: usize) -> PairDataset {
        // Linearly separable: label follows the sign of the first feature
        let mut rows = Vec::new();
        let mut labels = Vec::new();
        for i in 0..n {
            let sign = if i % 2 == 0 { 1.0 } else { -1.0 };
            rows.push(vec![sign, sign * 0.5, 0.0]);
            labels.push(if sign > 0.0 { 1.0 } else { 0.0 });
        }
        PairDataset::new(rows, labels).unwrap()
    }

    #[test]
    fn test_dataset_length_mismatch() {
        assert!(PairDataset::new(vec![vec![1.0]], vec![1.0, 0.0]).is_err());
    }

    #[test]
    fn test_batcher_shapes() {
        use burn::data::dataloader::batcher::Batcher;

        let device = Default::default();
        let batcher = PairBatcher::<NdArray<f32>>::new(device, 3);
        let items = vec![
            PairSample {
                features: vec![1.0, 2.0, 3.0],
                label: 1.0,
            },
            PairSample {
                features: vec![4.0, 5.0, 6.0],
                label: 0.0,
            },
        ];
        let batch = batcher.batch(items, &Default::default());
        assert_eq!(batch.features.dims(), [2, 3]);
        assert_eq!(batch.labels.dims(), [2]);
    }

    #[test]
    fn test_training_runs_and_learns() {
        let device = Default::default();
        let model = OutcomeNet::<TestBackend>::new(&device, OutcomeNetConfig::new(3));
        let config = TrainingConfig {
            epochs: 30,
            batch_size: 16,
            learning_rate: 1e-2,
            weight_decay: 0.0,
            early_stopping_patience: 30,
            train_ratio: 0.8,
            seed: 42,
        };

        let trainer = Trainer::new(model, config, device);
        let (_model, history) = trainer.train(toy_dataset(64), toy_dataset(16)).unwrap();

        assert!(!history.val_losses.is_empty());
        // A separable toy problem should end well above chance
        let final_acc = *history.val_accuracies.last().unwrap();
        assert!(final_acc > 0.6, "final val accuracy {}", final_acc);
    }

    #[test]
    fn test_empty_dataset_rejected() {
        let device = Default::default();
        let model = OutcomeNet::<TestBackend>::new(&device, OutcomeNetConfig::new(3));
        let config = TrainingConfig {
            epochs: 1,
            batch_size: 4,
            learning_rate: 1e-2,
            weight_decay: 0.0,
            early_stopping_patience: 5,
            train_ratio: 0.8,
            seed: 42,
        };
        let trainer = Trainer::new(model, config, device);
        let empty = PairDataset::new(vec![], vec![]).unwrap();
        assert!(trainer.train(empty, toy_dataset(4)).is_err());
    }
}
