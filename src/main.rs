//! Sportcast CLI
//!
//! Train, evaluate, and query binary match outcome models per sport.

use clap::{Parser, Subcommand};
use sportcast::{Config, Result, Sport};

#[derive(Parser)]
#[command(name = "sportcast")]
#[command(about = "Pairwise sports match outcome prediction", long_about = None)]
struct Cli {
    /// Config file path
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a new project with default config
    Init,
    /// Train the classifier for a sport
    Train {
        /// Sport to train (tennis, basketball, football)
        sport: Sport,
        /// Input CSV files (defaults to <data_dir>/<sport>/*.csv)
        files: Vec<String>,
        /// Override number of epochs
        #[arg(long)]
        epochs: Option<usize>,
        /// Override learning rate
        #[arg(long)]
        lr: Option<f64>,
    },
    /// Evaluate a trained model on a labeled data file
    Evaluate {
        /// Sport to evaluate
        sport: Sport,
        /// Input CSV files (defaults to <data_dir>/<sport>/*.csv)
        files: Vec<String>,
    },
    /// Predict from a literal feature vector
    Predict {
        /// Sport to predict
        sport: Sport,
        /// Comma-separated feature values in the sport's declared order
        #[arg(long)]
        features: String,
    },
    /// Interactive prediction form (one prompt per feature)
    Form {
        /// Sport to predict
        sport: Sport,
    },
    /// Show the declared feature order for each sport
    Features,
}

fn main() {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level))
        .format_timestamp(None)
        .init();

    // Loaded once at startup; immutable afterwards
    let config = if std::path::Path::new(&cli.config).exists() {
        match Config::load(&cli.config) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Error loading config: {}", e);
                std::process::exit(1);
            }
        }
    } else {
        Config::default()
    };

    let result = match cli.command {
        Commands::Init => commands::init(&cli.config),
        Commands::Train {
            sport,
            files,
            epochs,
            lr,
        } => commands::train(&config, sport, &files, epochs, lr),
        Commands::Evaluate { sport, files } => commands::evaluate(&config, sport, &files),
        Commands::Predict { sport, features } => commands::predict(&config, sport, &features),
        Commands::Form { sport } => commands::form(&config, sport),
        Commands::Features => commands::features(),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

mod commands {
    use super::*;
    use burn::backend::{Autodiff, NdArray};
    use rand::seq::SliceRandom;
    use rand::SeedableRng;
    use sportcast::data::resolve_inputs;
    use sportcast::features::cleaner::{FeatureMatrix, Scaler};
    use sportcast::features::registry::spec_for;
    use sportcast::features::{build_pairs, Observation};
    use sportcast::model::net::{OutcomeNet, OutcomeNetConfig};
    use sportcast::predict::{format_prediction, load_predictor, parse_feature_vector};
    use sportcast::training::{PairDataset, Trainer};

    type InferBackend = NdArray<f32>;
    type TrainBackend = Autodiff<InferBackend>;

    pub fn init(config_path: &str) -> Result<()> {
        let config = Config::default();
        config.save(config_path)?;
        println!("Created default config at {}", config_path);

        std::fs::create_dir_all(&config.data.model_dir)?;
        for sport in Sport::all() {
            std::fs::create_dir_all(config.data.sport_data_dir(sport))?;
        }
        println!("Created data/ and model/ directories");

        println!("\nNext steps:");
        println!("  1. Edit {} to customize settings", config_path);
        println!("  2. Drop match CSV files under data/<sport>/");
        println!("  3. Run 'sportcast train tennis' to train a model");
        println!("  4. Run 'sportcast form tennis' to make predictions");

        Ok(())
    }

    pub fn train(
        config: &Config,
        sport: Sport,
        files: &[String],
        epochs: Option<usize>,
        lr: Option<f64>,
    ) -> Result<()> {
        let mut training_config = config.training.clone();
        if let Some(e) = epochs {
            training_config.epochs = e;
        }
        if let Some(lr) = lr {
            training_config.learning_rate = lr;
        }

        let spec = spec_for(sport);
        println!("Training {} model ({} features)", spec.label, spec.input_dim());

        let records = resolve_inputs(files, &config.data.sport_data_dir(sport))?;
        println!("Loaded {} match records", records.len());

        let observations = build_pairs(&records);
        println!("Built {} balanced observations", observations.len());

        // Split by match so an observation and its mirror stay on the same
        // side of the train/validation boundary
        let (train_obs, val_obs) = split_pairs(
            &observations,
            training_config.train_ratio,
            training_config.seed,
        );
        println!(
            "  {} training / {} validation observations",
            train_obs.len(),
            val_obs.len()
        );

        let train_matrix = FeatureMatrix::from_observations(&train_obs, spec);
        let val_matrix = FeatureMatrix::from_observations(&val_obs, spec);

        // Imputation and scaling parameters come from the training partition
        // only and are reused everywhere else
        let scaler = Scaler::fit(&train_matrix)?;
        let train_rows = scaler.transform(&train_matrix)?;
        let val_rows = scaler.transform(&val_matrix)?;

        let train_dataset = PairDataset::new(train_rows, train_matrix.labels.clone())?;
        let val_dataset = PairDataset::new(val_rows, val_matrix.labels.clone())?;

        let device = Default::default();
        let net_config = OutcomeNetConfig::new(spec.input_dim())
            .with_hidden_dims(config.model.hidden_dims.clone())
            .with_dropout(config.model.dropout);
        let model = OutcomeNet::<TrainBackend>::new(&device, net_config);

        let trainer = Trainer::new(model, training_config, device);
        let (best_model, history) = trainer.train(train_dataset, val_dataset)?;

        std::fs::create_dir_all(&config.data.model_dir)?;
        let model_path = config.data.model_path(sport);
        best_model.save(&model_path)?;
        scaler.save(&config.data.scaler_path(sport))?;

        println!("\nTraining complete:");
        println!("  Best epoch:    {}", history.best_epoch + 1);
        println!("  Best val loss: {:.4}", history.best_val_loss);
        if let Some(acc) = history.val_accuracies.get(history.best_epoch) {
            println!("  Val accuracy:  {:.2}%", acc * 100.0);
        }
        if let Some(auc) = history.val_aucs.get(history.best_epoch) {
            println!("  Val AUC:       {:.4}", auc);
        }
        println!("  Model saved to {}", model_path);

        Ok(())
    }

    pub fn evaluate(config: &Config, sport: Sport, files: &[String]) -> Result<()> {
        let spec = spec_for(sport);
        let predictor = load_predictor::<InferBackend>(
            &config.data,
            &config.model,
            sport,
            Default::default(),
        )?;

        let records = resolve_inputs(files, &config.data.sport_data_dir(sport))?;
        let observations = build_pairs(&records);
        let matrix = FeatureMatrix::from_observations(&observations, spec);

        let report = predictor.evaluate(&matrix)?;
        println!("{} evaluation", spec.label);
        println!("  {}", report);

        Ok(())
    }

    pub fn predict(config: &Config, sport: Sport, features: &str) -> Result<()> {
        let predictor = load_predictor::<InferBackend>(
            &config.data,
            &config.model,
            sport,
            Default::default(),
        )?;

        let raw = parse_feature_vector(features)?;
        let prediction = predictor.predict(&raw)?;
        println!("{}", format_prediction(&prediction));

        Ok(())
    }

    pub fn form(config: &Config, sport: Sport) -> Result<()> {
        use std::io::{BufRead, Write};

        let predictor = load_predictor::<InferBackend>(
            &config.data,
            &config.model,
            sport,
            Default::default(),
        )?;
        let spec = predictor.spec();

        println!("{} — enter match features (empty input keeps the default)", spec.label);

        let stdin = std::io::stdin();
        let mut lines = stdin.lock().lines();
        let mut raw = Vec::with_capacity(spec.input_dim());

        // Assembled strictly in the declared feature order
        for feature in spec.features {
            let value = loop {
                if feature.is_flag() {
                    print!("  {} (y/n) [n]: ", feature.name());
                } else {
                    print!("  {} [{}]: ", feature.name(), feature.default_value());
                }
                std::io::stdout().flush()?;

                let line = match lines.next() {
                    Some(line) => line?,
                    None => String::new(),
                };
                let input = line.trim();

                if input.is_empty() {
                    break feature.default_value();
                }
                if feature.is_flag() {
                    match input {
                        "y" | "Y" | "yes" => break 1.0,
                        "n" | "N" | "no" => break 0.0,
                        _ => println!("    Please answer y or n."),
                    }
                } else {
                    match input.parse::<f32>() {
                        Ok(v) => break v,
                        Err(_) => println!("    Not a number, try again."),
                    }
                }
            };
            raw.push(value);
        }

        let prediction = predictor.predict(&raw)?;
        println!("{}", format_prediction(&prediction));

        Ok(())
    }

    pub fn features() -> Result<()> {
        for sport in Sport::all() {
            let spec = spec_for(sport);
            println!("{} ({}):", spec.label, sport);
            for (i, feature) in spec.features.iter().enumerate() {
                let kind = if feature.is_flag() { "bool" } else { "num" };
                println!("  {:2}. {:<14} [{}]", i + 1, feature.name(), kind);
            }
            println!();
        }
        Ok(())
    }

    /// Shuffle and split observations keeping [winner, loser] pairs intact
    fn split_pairs(
        observations: &[Observation],
        train_ratio: f32,
        seed: u64,
    ) -> (Vec<Observation>, Vec<Observation>) {
        let n_pairs = observations.len() / 2;
        let mut pair_indices: Vec<usize> = (0..n_pairs).collect();
        let mut rng = rand::rngs::StdRng::seed_from_u64(seed);
        pair_indices.shuffle(&mut rng);

        let train_pairs = ((n_pairs as f32) * train_ratio) as usize;
        let mut train = Vec::with_capacity(train_pairs * 2);
        let mut val = Vec::with_capacity((n_pairs - train_pairs) * 2);

        for (i, &pair) in pair_indices.iter().enumerate() {
            let target = if i < train_pairs { &mut train } else { &mut val };
            target.push(observations[pair * 2].clone());
            target.push(observations[pair * 2 + 1].clone());
        }

        (train, val)
    }
}
