//! tabprep CLI
//!
//! Splits a raw CSV into train/test files, turns them into model-ready
//! tables with a preprocessor fitted on the training split only, then fits
//! and scores a classifier on the transformed tables.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tabprep::preprocessing::{FittedColumnTransformer, FittedTransformer};
use tabprep::{DataIngestion, DataTransformation, ModelTrainer, PipelineConfig};
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Parser, Debug)]
#[command(name = "tabprep")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Fit-once tabular preprocessing for train/test pipelines", long_about = None)]
struct Cli {
    /// TOML configuration file (artifact paths, split and training parameters)
    #[arg(short, long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Directory for every artifact, overriding the configured paths
    #[arg(long, global = true, value_name = "DIR")]
    artifacts: Option<PathBuf>,

    /// Verbose logging (`RUST_LOG`, when set, takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Copy and split a raw CSV into train and test files
    Ingest {
        /// Raw CSV dataset (header row, label in the last column)
        #[arg(short, long)]
        source: PathBuf,

        /// Fraction of rows held out for testing
        #[arg(long)]
        test_size: Option<f64>,

        /// Seed for the split shuffle
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Fit on the train file, transform both files and save the preprocessor
    Transform {
        #[arg(long)]
        train: PathBuf,

        #[arg(long)]
        test: PathBuf,
    },
    /// Fit a classifier on the transformed train file and score it on the transformed test file
    Train {
        #[arg(long)]
        train: PathBuf,

        #[arg(long)]
        test: PathBuf,
    },
    /// Ingest, transform, then train
    Run {
        #[arg(short, long)]
        source: PathBuf,
    },
    /// Transform a CSV with a saved preprocessor
    Apply {
        #[arg(short, long)]
        preprocessor: PathBuf,

        #[arg(short, long)]
        input: PathBuf,

        #[arg(short, long)]
        output: PathBuf,
    },
    /// Print a saved preprocessor's learned parameters as JSON
    Inspect {
        #[arg(short, long)]
        preprocessor: PathBuf,
    },
}

fn load_config(cli: &Cli) -> Result<PipelineConfig> {
    let mut config = match &cli.config {
        Some(path) => PipelineConfig::load_from_file(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => PipelineConfig::default(),
    };
    if let Some(dir) = &cli.artifacts {
        config.rebase(dir);
    }
    Ok(config)
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")?;

    let mut config = load_config(&cli)?;

    match cli.command {
        Commands::Ingest {
            source,
            test_size,
            seed,
        } => {
            if let Some(test_size) = test_size {
                config.ingestion.test_size = test_size;
            }
            if let Some(seed) = seed {
                config.ingestion.seed = seed;
            }
            config.validate()?;

            let (train, test) = DataIngestion::new(config.ingestion)
                .initiate(&source)
                .context("Data ingestion failed")?;
            info!("Train: {}", train.display());
            info!("Test: {}", test.display());
        }
        Commands::Transform { train, test } => {
            config.validate()?;
            let (train_out, test_out) = DataTransformation::new(config.transformation)
                .initiate(&train, &test)
                .context("Data transformation failed")?;
            info!("Transformed train: {}", train_out.display());
            info!("Transformed test: {}", test_out.display());
        }
        Commands::Train { train, test } => {
            config.validate()?;
            let report_path = config.trainer.report_path.clone();
            let model = ModelTrainer::new(config.trainer)
                .initiate(&train, &test)
                .context("Model training failed")?;
            info!("Model: {}", model.display());
            info!("Report: {}", report_path.display());
        }
        Commands::Run { source } => {
            config.validate()?;
            let report_path = config.trainer.report_path.clone();
            let (train, test) = DataIngestion::new(config.ingestion)
                .initiate(&source)
                .context("Data ingestion failed")?;
            let (train_out, test_out) = DataTransformation::new(config.transformation)
                .initiate(&train, &test)
                .context("Data transformation failed")?;
            let model = ModelTrainer::new(config.trainer)
                .initiate(&train_out, &test_out)
                .context("Model training failed")?;
            info!("Pipeline completed");
            info!("Transformed train: {}", train_out.display());
            info!("Transformed test: {}", test_out.display());
            info!("Model: {}", model.display());
            info!("Report: {}", report_path.display());
        }
        Commands::Apply {
            preprocessor,
            input,
            output,
        } => {
            let written = DataTransformation::apply(&preprocessor, &input, &output)
                .context("Applying the preprocessor failed")?;
            info!("Output: {}", written.display());
        }
        Commands::Inspect { preprocessor } => {
            let fitted = FittedColumnTransformer::load_from_file(&preprocessor).with_context(|| {
                format!("Failed to load preprocessor from {}", preprocessor.display())
            })?;
            println!("{}", fitted.to_json()?);
        }
    }

    Ok(())
}
