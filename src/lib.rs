//! Pairwise sports match outcome prediction
//!
//! Turns raw box-score rows into balanced, sign-mirrored observation pairs
//! and trains a dense binary classifier on the result.

pub mod data;
pub mod features;
pub mod model;
pub mod predict;
pub mod training;

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Supported sports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sport {
    Tennis,
    Basketball,
    Football,
}

impl Sport {
    /// Short key used for artifact file names
    pub fn key(&self) -> &'static str {
        match self {
            Sport::Tennis => "tennis",
            Sport::Basketball => "basketball",
            Sport::Football => "football",
        }
    }

    pub fn all() -> [Sport; 3] {
        [Sport::Tennis, Sport::Basketball, Sport::Football]
    }
}

impl fmt::Display for Sport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key())
    }
}

impl std::str::FromStr for Sport {
    type Err = SportcastError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "tennis" => Ok(Sport::Tennis),
            "basketball" => Ok(Sport::Basketball),
            "football" => Ok(Sport::Football),
            other => Err(SportcastError::UnknownSport(other.to_string())),
        }
    }
}

/// A single raw match record as read from a data file
///
/// One row per historical contest, winner/loser orientation. Every field is
/// optional; missing values flow through the pipeline as missing rather than
/// failing the load.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RawMatch {
    pub winner_name: Option<String>,
    pub loser_name: Option<String>,
    pub surface: Option<String>,
    pub best_of: Option<f32>,
    pub winner_rank: Option<f32>,
    pub loser_rank: Option<f32>,
    pub winner_rank_points: Option<f32>,
    pub loser_rank_points: Option<f32>,
    pub winner_age: Option<f32>,
    pub loser_age: Option<f32>,
    pub w_ace: Option<f32>,
    pub l_ace: Option<f32>,
    pub w_df: Option<f32>,
    pub l_df: Option<f32>,
    pub w_svpt: Option<f32>,
    pub l_svpt: Option<f32>,
    #[serde(rename = "w_1stIn")]
    pub w_first_in: Option<f32>,
    #[serde(rename = "l_1stIn")]
    pub l_first_in: Option<f32>,
    #[serde(rename = "w_1stWon")]
    pub w_first_won: Option<f32>,
    #[serde(rename = "l_1stWon")]
    pub l_first_won: Option<f32>,
    #[serde(rename = "w_bpSaved")]
    pub w_bp_saved: Option<f32>,
    #[serde(rename = "l_bpSaved")]
    pub l_bp_saved: Option<f32>,
    #[serde(rename = "w_bpFaced")]
    pub w_bp_faced: Option<f32>,
    #[serde(rename = "l_bpFaced")]
    pub l_bp_faced: Option<f32>,
}

/// Recommendation thresholds (documented, not runtime-tunable)
pub const PICK_THRESHOLD: f32 = 0.50;
pub const STRONG_THRESHOLD: f32 = 0.65;

/// Coarse recommendation banded on the predicted win probability
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Recommendation {
    /// Probability >= 0.65
    StrongPick,
    /// Probability in [0.50, 0.65)
    LeanPick,
    /// Probability < 0.50
    OpponentFavored,
}

impl Recommendation {
    pub fn from_probability(p: f32) -> Self {
        if p >= STRONG_THRESHOLD {
            Recommendation::StrongPick
        } else if p >= PICK_THRESHOLD {
            Recommendation::LeanPick
        } else {
            Recommendation::OpponentFavored
        }
    }
}

impl fmt::Display for Recommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Recommendation::StrongPick => write!(f, "Strong pick"),
            Recommendation::LeanPick => write!(f, "Slight edge"),
            Recommendation::OpponentFavored => write!(f, "Opponent favored"),
        }
    }
}

/// Model prediction output
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Prediction {
    pub sport: Sport,
    /// P(first contestant wins)
    pub probability: f32,
    pub recommendation: Recommendation,
}

impl Prediction {
    pub fn new(sport: Sport, probability: f32) -> Self {
        Prediction {
            sport,
            probability,
            recommendation: Recommendation::from_probability(probability),
        }
    }
}

/// Application-wide errors
#[derive(Debug, Error)]
pub enum SportcastError {
    #[error("Unknown sport: {0}. Available: tennis, basketball, football")]
    UnknownSport(String),

    #[error("No model artifact for {sport} at {path} - run `sportcast train {sport}` first")]
    NoModel { sport: Sport, path: String },

    #[error("Feature count mismatch: model expects {expected}, got {got}")]
    FeatureCount { expected: usize, got: usize },

    #[error("Feature order mismatch at position {index}: model expects '{expected}', got '{got}'")]
    FeatureOrder {
        index: usize,
        expected: String,
        got: String,
    },

    #[error("No input data: {0}")]
    NoData(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Artifact error: {0}")]
    Artifact(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(String),
}

pub type Result<T> = std::result::Result<T, SportcastError>;

/// Application configuration loaded from config.toml
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub training: TrainingConfig,
    pub model: ModelConfig,
    pub data: DataConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingConfig {
    pub epochs: usize,
    pub batch_size: usize,
    pub learning_rate: f64,
    pub weight_decay: f64,
    pub early_stopping_patience: usize,
    /// Fraction of observations used for training (rest is validation)
    pub train_ratio: f32,
    /// Shuffle seed for the train/validation split
    pub seed: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    pub hidden_dims: Vec<usize>,
    pub dropout: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    pub data_dir: String,
    pub model_dir: String,
}

impl DataConfig {
    /// Path prefix of the network artifact for a sport (recorder adds the extension)
    pub fn model_path(&self, sport: Sport) -> String {
        format!("{}/{}_net", self.model_dir, sport.key())
    }

    /// Path of the fitted scaler artifact for a sport
    pub fn scaler_path(&self, sport: Sport) -> String {
        format!("{}/{}_scaler.json", self.model_dir, sport.key())
    }

    /// Default directory holding raw data files for a sport
    pub fn sport_data_dir(&self, sport: Sport) -> String {
        format!("{}/{}", self.data_dir, sport.key())
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            training: TrainingConfig {
                epochs: 200,
                batch_size: 64,
                learning_rate: 1e-3,
                weight_decay: 1e-4,
                early_stopping_patience: 20,
                train_ratio: 0.8,
                seed: 42,
            },
            model: ModelConfig {
                hidden_dims: vec![64, 32, 16],
                dropout: 0.2,
            },
            data: DataConfig {
                data_dir: "data".to_string(),
                model_dir: "model".to_string(),
            },
        }
    }
}

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            SportcastError::Config(format!("Failed to read config file {}: {}", path, e))
        })?;
        toml::from_str(&content)
            .map_err(|e| SportcastError::Config(format!("Failed to parse config: {}", e)))
    }

    pub fn save(&self, path: &str) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| SportcastError::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
