//! Missing-value imputation and feature standardization
//!
//! The scaler is fit on the training partition only. Its medians, means,
//! stds, and feature name order are persisted next to the model and reused
//! verbatim for held-out partitions and for inference.

use crate::features::pairs::Observation;
use crate::features::registry::SportSpec;
use crate::{Result, SportcastError};
use serde::{Deserialize, Serialize};

/// Numeric feature table with per-cell missingness, plus the label vector
#[derive(Debug, Clone)]
pub struct FeatureMatrix {
    pub feature_names: Vec<String>,
    pub rows: Vec<Vec<Option<f32>>>,
    pub labels: Vec<f32>,
}

impl FeatureMatrix {
    /// Project observations onto a sport's declared feature order
    pub fn from_observations(observations: &[Observation], spec: &SportSpec) -> Self {
        let rows = observations
            .iter()
            .map(|obs| spec.features.iter().map(|f| obs.feature(*f)).collect())
            .collect();
        let labels = observations.iter().map(|obs| obs.label).collect();

        FeatureMatrix {
            feature_names: spec.feature_names(),
            rows,
            labels,
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Median of the observed values in a column; 0.0 for an all-missing column
fn column_median(rows: &[Vec<Option<f32>>], col: usize) -> f32 {
    let mut values: Vec<f32> = rows.iter().filter_map(|r| r[col]).collect();
    if values.is_empty() {
        return 0.0;
    }
    values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let n = values.len();
    if n % 2 == 1 {
        values[n / 2]
    } else {
        (values[n / 2 - 1] + values[n / 2]) / 2.0
    }
}

/// Fitted imputation + standardization parameters
///
/// Serialized as a JSON artifact; the feature name order doubles as the
/// training/inference contract.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scaler {
    pub feature_names: Vec<String>,
    pub medians: Vec<f32>,
    pub means: Vec<f32>,
    pub stds: Vec<f32>,
}

impl Scaler {
    /// Fit medians, means, and stds on a training matrix
    pub fn fit(matrix: &FeatureMatrix) -> Result<Self> {
        if matrix.is_empty() {
            return Err(SportcastError::NoData(
                "cannot fit scaler on an empty matrix".to_string(),
            ));
        }

        let dim = matrix.feature_names.len();
        let n = matrix.len() as f32;

        let medians: Vec<f32> = (0..dim).map(|c| column_median(&matrix.rows, c)).collect();

        // Mean/std over the imputed columns
        let mut means = vec![0.0f32; dim];
        for row in &matrix.rows {
            for (c, cell) in row.iter().enumerate() {
                means[c] += cell.unwrap_or(medians[c]);
            }
        }
        for m in &mut means {
            *m /= n;
        }

        let mut stds = vec![0.0f32; dim];
        for row in &matrix.rows {
            for (c, cell) in row.iter().enumerate() {
                let v = cell.unwrap_or(medians[c]);
                stds[c] += (v - means[c]).powi(2);
            }
        }
        for s in &mut stds {
            // Constant columns get unit scale instead of dividing by zero
            *s = (*s / n).sqrt().max(1e-3);
        }

        Ok(Scaler {
            feature_names: matrix.feature_names.clone(),
            medians,
            means,
            stds,
        })
    }

    /// Impute and standardize a matrix with the fitted parameters
    ///
    /// Applies to training and held-out partitions alike; never refits.
    pub fn transform(&self, matrix: &FeatureMatrix) -> Result<Vec<Vec<f32>>> {
        self.check_names(&matrix.feature_names)?;
        matrix
            .rows
            .iter()
            .map(|row| self.transform_optional_row(row))
            .collect()
    }

    fn transform_optional_row(&self, row: &[Option<f32>]) -> Result<Vec<f32>> {
        if row.len() != self.feature_names.len() {
            return Err(SportcastError::FeatureCount {
                expected: self.feature_names.len(),
                got: row.len(),
            });
        }
        Ok(row
            .iter()
            .enumerate()
            .map(|(c, cell)| {
                let v = cell.unwrap_or(self.medians[c]);
                (v - self.means[c]) / self.stds[c]
            })
            .collect())
    }

    /// Standardize a fully-specified inference vector
    pub fn transform_row(&self, row: &[f32]) -> Result<Vec<f32>> {
        if row.len() != self.feature_names.len() {
            return Err(SportcastError::FeatureCount {
                expected: self.feature_names.len(),
                got: row.len(),
            });
        }
        Ok(row
            .iter()
            .enumerate()
            .map(|(c, v)| (v - self.means[c]) / self.stds[c])
            .collect())
    }

    /// Fail fast on any training/inference feature order drift
    pub fn check_names(&self, names: &[String]) -> Result<()> {
        if names.len() != self.feature_names.len() {
            return Err(SportcastError::FeatureCount {
                expected: self.feature_names.len(),
                got: names.len(),
            });
        }
        for (index, (expected, got)) in self.feature_names.iter().zip(names).enumerate() {
            if expected != got {
                return Err(SportcastError::FeatureOrder {
                    index,
                    expected: expected.clone(),
                    got: got.clone(),
                });
            }
        }
        Ok(())
    }

    pub fn save(&self, path: &str) -> Result<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| SportcastError::Artifact(format!("Failed to serialize scaler: {}", e)))?;
        std::fs::write(path, json)?;
        Ok(())
    }

    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            SportcastError::Artifact(format!("Failed to read scaler {}: {}", path, e))
        })?;
        serde_json::from_str(&content)
            .map_err(|e| SportcastError::Artifact(format!("Failed to parse scaler: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matrix(rows: Vec<Vec<Option<f32>>>, names: &[&str]) -> FeatureMatrix {
        let labels = vec![0.0; rows.len()];
        FeatureMatrix {
            feature_names: names.iter().map(|s| s.to_string()).collect(),
            rows,
            labels,
        }
    }

    #[test]
    fn test_median_odd_even() {
        let m = matrix(
            vec![
                vec![Some(1.0)],
                vec![Some(5.0)],
                vec![Some(3.0)],
                vec![None],
            ],
            &["a"],
        );
        // Median over observed values {1, 3, 5}
        assert_eq!(column_median(&m.rows, 0), 3.0);

        let m = matrix(
            vec![vec![Some(1.0)], vec![Some(2.0)], vec![Some(4.0)], vec![Some(8.0)]],
            &["a"],
        );
        assert_eq!(column_median(&m.rows, 0), 3.0);
    }

    #[test]
    fn test_all_missing_column() {
        let m = matrix(vec![vec![None], vec![None]], &["a"]);
        assert_eq!(column_median(&m.rows, 0), 0.0);
    }

    #[test]
    fn test_imputation_determinism() {
        let m = matrix(
            vec![
                vec![Some(2.0), None],
                vec![None, Some(4.0)],
                vec![Some(6.0), Some(8.0)],
            ],
            &["a", "b"],
        );

        let s1 = Scaler::fit(&m).unwrap();
        let s2 = Scaler::fit(&m).unwrap();
        assert_eq!(s1.medians, s2.medians);
        assert_eq!(s1.means, s2.means);
        assert_eq!(s1.stds, s2.stds);
        assert_eq!(s1.transform(&m).unwrap(), s2.transform(&m).unwrap());
    }

    #[test]
    fn test_standardization() {
        let m = matrix(
            vec![vec![Some(1.0)], vec![Some(2.0)], vec![Some(3.0)]],
            &["a"],
        );
        let scaler = Scaler::fit(&m).unwrap();
        assert!((scaler.means[0] - 2.0).abs() < 1e-6);

        let out = scaler.transform(&m).unwrap();
        let mean: f32 = out.iter().map(|r| r[0]).sum::<f32>() / 3.0;
        assert!(mean.abs() < 1e-6);
    }

    #[test]
    fn test_scaler_reuse_on_held_out() {
        let train = matrix(
            vec![vec![Some(0.0)], vec![Some(10.0)]],
            &["a"],
        );
        let scaler = Scaler::fit(&train).unwrap();
        // mean 5, std 5
        let held_out = matrix(vec![vec![Some(15.0)], vec![None]], &["a"]);
        let out = scaler.transform(&held_out).unwrap();
        assert!((out[0][0] - 2.0).abs() < 1e-6);
        // Missing imputed with the training median (5.0) -> standardized 0
        assert!(out[1][0].abs() < 1e-6);
    }

    #[test]
    fn test_order_guard() {
        let train = matrix(vec![vec![Some(1.0), Some(2.0)]], &["a", "b"]);
        let scaler = Scaler::fit(&train).unwrap();

        let swapped = matrix(vec![vec![Some(1.0), Some(2.0)]], &["b", "a"]);
        match scaler.transform(&swapped) {
            Err(SportcastError::FeatureOrder { index, .. }) => assert_eq!(index, 0),
            other => panic!("expected order mismatch, got {:?}", other),
        }
    }

    #[test]
    fn test_count_guard() {
        let train = matrix(vec![vec![Some(1.0), Some(2.0)]], &["a", "b"]);
        let scaler = Scaler::fit(&train).unwrap();
        match scaler.transform_row(&[1.0]) {
            Err(SportcastError::FeatureCount { expected, got }) => {
                assert_eq!((expected, got), (2, 1));
            }
            other => panic!("expected count mismatch, got {:?}", other),
        }
    }

    #[test]
    fn test_constant_column_unit_scale() {
        let m = matrix(vec![vec![Some(3.0)], vec![Some(3.0)]], &["a"]);
        let scaler = Scaler::fit(&m).unwrap();
        let out = scaler.transform(&m).unwrap();
        assert!(out[0][0].is_finite());
    }

    #[test]
    fn test_json_roundtrip() {
        let m = matrix(
            vec![vec![Some(1.0), None], vec![Some(3.0), Some(2.0)]],
            &["a", "b"],
        );
        let scaler = Scaler::fit(&m).unwrap();
        let json = serde_json::to_string(&scaler).unwrap();
        let loaded: Scaler = serde_json::from_str(&json).unwrap();
        assert_eq!(loaded.feature_names, scaler.feature_names);
        assert_eq!(loaded.medians, scaler.medians);
    }
}
