//! Stage configuration: artifact locations, split parameters and classifier
//! hyperparameters.
//!
//! Every field has a default, so a TOML file only needs the keys it changes:
//!
//! ```toml
//! [ingestion]
//! test_size = 0.25
//!
//! [transformation]
//! preprocessor_path = "models/preprocessor.bin"
//!
//! [trainer]
//! max_epochs = 500
//! ```

use crate::model::LogisticRegression;
use crate::preprocessing::error::PreprocessingError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

/// Default directory holding every artifact.
pub const DEFAULT_ARTIFACTS_DIR: &str = "artifacts";

/// Ingestion stage configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestionConfig {
    /// Copy of the source table as read
    pub raw_data_path: PathBuf,
    /// Training split output
    pub train_data_path: PathBuf,
    /// Held-out split output
    pub test_data_path: PathBuf,
    /// Fraction of rows held out, in (0, 1)
    pub test_size: f64,
    /// Shuffle seed
    pub seed: u64,
}

impl Default for IngestionConfig {
    fn default() -> Self {
        Self::in_dir(DEFAULT_ARTIFACTS_DIR)
    }
}

impl IngestionConfig {
    /// Default file names under `dir`.
    pub fn in_dir<P: AsRef<Path>>(dir: P) -> Self {
        let dir = dir.as_ref();
        Self {
            raw_data_path: dir.join("raw.csv"),
            train_data_path: dir.join("train.csv"),
            test_data_path: dir.join("test.csv"),
            test_size: 0.2,
            seed: 42,
        }
    }
}

/// Transformation stage configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransformationConfig {
    /// Transformed training table output
    pub transformed_train_path: PathBuf,
    /// Transformed held-out table output
    pub transformed_test_path: PathBuf,
    /// Fitted preprocessor output
    pub preprocessor_path: PathBuf,
}

impl Default for TransformationConfig {
    fn default() -> Self {
        Self::in_dir(DEFAULT_ARTIFACTS_DIR)
    }
}

impl TransformationConfig {
    /// Default file names under `dir`.
    pub fn in_dir<P: AsRef<Path>>(dir: P) -> Self {
        let dir = dir.as_ref();
        Self {
            transformed_train_path: dir.join("transformed_train.csv"),
            transformed_test_path: dir.join("transformed_test.csv"),
            preprocessor_path: dir.join("preprocessor.bin"),
        }
    }
}

/// Model training stage configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelTrainerConfig {
    /// Fitted classifier output
    pub model_path: PathBuf,
    /// Evaluation report output
    pub report_path: PathBuf,
    pub learning_rate: f64,
    pub max_epochs: usize,
    pub batch_size: usize,
    /// L2 penalty on the classifier weights
    pub l2: f64,
}

impl Default for ModelTrainerConfig {
    fn default() -> Self {
        Self::in_dir(DEFAULT_ARTIFACTS_DIR)
    }
}

impl ModelTrainerConfig {
    /// Default file names under `dir`, default hyperparameters.
    pub fn in_dir<P: AsRef<Path>>(dir: P) -> Self {
        let dir = dir.as_ref();
        Self {
            model_path: dir.join("model.bin"),
            report_path: dir.join("report.txt"),
            learning_rate: 0.1,
            max_epochs: 200,
            batch_size: 32,
            l2: 1e-4,
        }
    }

    /// The unfitted classifier these hyperparameters describe.
    pub fn classifier(&self) -> LogisticRegression {
        LogisticRegression::new()
            .learning_rate(self.learning_rate)
            .max_epochs(self.max_epochs)
            .batch_size(self.batch_size)
            .l2(self.l2)
    }
}

/// Configuration of the whole ingest, transform and train run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub ingestion: IngestionConfig,
    pub transformation: TransformationConfig,
    pub trainer: ModelTrainerConfig,
}

impl PipelineConfig {
    /// Default file names, all under `dir`.
    pub fn in_dir<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            ingestion: IngestionConfig::in_dir(&dir),
            transformation: TransformationConfig::in_dir(&dir),
            trainer: ModelTrainerConfig::in_dir(&dir),
        }
    }

    /// Point every artifact path under `dir`, keeping split parameters and
    /// hyperparameters.
    pub fn rebase<P: AsRef<Path>>(&mut self, dir: P) {
        let rebased = Self::in_dir(dir);
        self.ingestion.raw_data_path = rebased.ingestion.raw_data_path;
        self.ingestion.train_data_path = rebased.ingestion.train_data_path;
        self.ingestion.test_data_path = rebased.ingestion.test_data_path;
        self.transformation = rebased.transformation;
        self.trainer.model_path = rebased.trainer.model_path;
        self.trainer.report_path = rebased.trainer.report_path;
    }

    /// Parse a TOML document; absent keys keep their defaults.
    pub fn from_toml_str(content: &str) -> Result<Self, PreprocessingError> {
        let config: PipelineConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate configuration from a TOML file.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, PreprocessingError> {
        let path = path.as_ref();
        info!("Loading configuration from: {}", path.display());
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Check value ranges.
    pub fn validate(&self) -> Result<(), PreprocessingError> {
        let test_size = self.ingestion.test_size;
        if !(test_size > 0.0 && test_size < 1.0) {
            return Err(PreprocessingError::InvalidParameter(format!(
                "test_size must be in (0, 1), got {}",
                test_size
            )));
        }
        let t = &self.transformation;
        if t.transformed_train_path == t.transformed_test_path {
            return Err(PreprocessingError::InvalidParameter(format!(
                "transformed train and test outputs share the path {}",
                t.transformed_train_path.display()
            )));
        }
        self.trainer.classifier().validate()
    }
}
