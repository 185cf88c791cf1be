//! Training metrics and evaluation

use std::fmt;

/// Metrics accumulated over one epoch or one evaluation pass
///
/// Probabilities and targets are retained so AUC can be computed over the
/// whole pass rather than per batch.
#[derive(Debug, Clone, Default)]
pub struct Metrics {
    /// Summed batch losses
    pub total_loss: f64,
    /// Number of correct win predictions at the 0.5 cut
    pub correct: usize,
    /// Total predictions
    pub total: usize,
    /// Number of batches accumulated
    pub batch_count: usize,
    probs: Vec<f32>,
    targets: Vec<f32>,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Update with one batch of probabilities and binary targets
    pub fn update(&mut self, loss: f32, probs: &[f32], targets: &[f32]) {
        self.total_loss += loss as f64;
        self.batch_count += 1;
        self.total += probs.len();
        self.correct += probs
            .iter()
            .zip(targets)
            .filter(|(p, t)| (**p >= 0.5) == (**t >= 0.5))
            .count();
        self.probs.extend_from_slice(probs);
        self.targets.extend_from_slice(targets);
    }

    /// Average loss per batch
    pub fn avg_loss(&self) -> f64 {
        if self.batch_count == 0 {
            0.0
        } else {
            self.total_loss / self.batch_count as f64
        }
    }

    /// Win prediction accuracy
    pub fn accuracy(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.correct as f64 / self.total as f64
        }
    }

    /// Area under the ROC curve over everything accumulated so far
    pub fn auc(&self) -> f64 {
        roc_auc(&self.probs, &self.targets)
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

impl fmt::Display for Metrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Loss: {:.4} | Acc: {:.2}% | AUC: {:.4}",
            self.avg_loss(),
            self.accuracy() * 100.0,
            self.auc()
        )
    }
}

/// Rank-based ROC AUC with tie handling (average ranks)
///
/// Returns 0.5 for degenerate inputs (one class absent).
pub fn roc_auc(probs: &[f32], targets: &[f32]) -> f64 {
    let n = probs.len();
    let positives = targets.iter().filter(|t| **t >= 0.5).count();
    let negatives = n - positives;
    if positives == 0 || negatives == 0 {
        return 0.5;
    }

    let mut indices: Vec<usize> = (0..n).collect();
    indices.sort_by(|&a, &b| {
        probs[a]
            .partial_cmp(&probs[b])
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    // Assign average ranks across tied probabilities
    let mut ranks = vec![0.0f64; n];
    let mut i = 0;
    while i < n {
        let mut j = i;
        while j + 1 < n && probs[indices[j + 1]] == probs[indices[i]] {
            j += 1;
        }
        // 1-based ranks i+1 ..= j+1
        let avg_rank = (i + j + 2) as f64 / 2.0;
        for k in i..=j {
            ranks[indices[k]] = avg_rank;
        }
        i = j + 1;
    }

    let positive_rank_sum: f64 = (0..n)
        .filter(|&i| targets[i] >= 0.5)
        .map(|i| ranks[i])
        .sum();

    let p = positives as f64;
    let q = negatives as f64;
    (positive_rank_sum - p * (p + 1.0) / 2.0) / (p * q)
}

/// Binary cross-entropy over probabilities, clamped for stability
pub fn bce_loss(probs: &[f32], targets: &[f32]) -> f64 {
    if probs.is_empty() {
        return 0.0;
    }
    let eps = 1e-7f64;
    let sum: f64 = probs
        .iter()
        .zip(targets)
        .map(|(p, t)| {
            let p = (*p as f64).clamp(eps, 1.0 - eps);
            let t = *t as f64;
            -(t * p.ln() + (1.0 - t) * (1.0 - p).ln())
        })
        .sum();
    sum / probs.len() as f64
}

/// Result of a standalone evaluation pass
#[derive(Debug, Clone)]
pub struct EvalReport {
    pub loss: f64,
    pub accuracy: f64,
    pub auc: f64,
    pub samples: usize,
}

impl EvalReport {
    /// Evaluate probabilities against binary targets
    pub fn from_predictions(probs: &[f32], targets: &[f32]) -> Self {
        let correct = probs
            .iter()
            .zip(targets)
            .filter(|(p, t)| (**p >= 0.5) == (**t >= 0.5))
            .count();
        EvalReport {
            loss: bce_loss(probs, targets),
            accuracy: if probs.is_empty() {
                0.0
            } else {
                correct as f64 / probs.len() as f64
            },
            auc: roc_auc(probs, targets),
            samples: probs.len(),
        }
    }
}

impl fmt::Display for EvalReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Loss: {:.4} | Acc: {:.2}% | AUC: {:.4} ({} samples)",
            self.loss,
            self.accuracy * 100.0,
            self.auc,
            self.samples
        )
    }
}

/// Training history for tracking progress
#[derive(Debug, Clone, Default)]
pub struct TrainingHistory {
    pub train_losses: Vec<f64>,
    pub val_losses: Vec<f64>,
    pub train_accuracies: Vec<f64>,
    pub val_accuracies: Vec<f64>,
    pub val_aucs: Vec<f64>,
    pub best_val_loss: f64,
    pub best_epoch: usize,
}

impl TrainingHistory {
    pub fn new() -> Self {
        Self {
            best_val_loss: f64::INFINITY,
            ..Default::default()
        }
    }

    /// Record metrics for an epoch
    pub fn record_epoch(&mut self, epoch: usize, train: &Metrics, val: &Metrics) {
        self.train_losses.push(train.avg_loss());
        self.val_losses.push(val.avg_loss());
        self.train_accuracies.push(train.accuracy());
        self.val_accuracies.push(val.accuracy());
        self.val_aucs.push(val.auc());

        if val.avg_loss() < self.best_val_loss {
            self.best_val_loss = val.avg_loss();
            self.best_epoch = epoch;
        }
    }

    /// Check if we should early stop
    pub fn should_early_stop(&self, patience: usize) -> bool {
        if self.val_losses.len() < patience {
            return false;
        }
        let current_epoch = self.val_losses.len() - 1;
        current_epoch - self.best_epoch >= patience
    }
}
