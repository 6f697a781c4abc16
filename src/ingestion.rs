//! Ingestion stage: read a raw table, keep a copy, split it into train and
//! held-out tables on disk.

use crate::config::IngestionConfig;
use crate::dataset::{read_csv, train_test_split, write_csv};
use crate::preprocessing::error::PreprocessingError;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Create the directory that will hold `path`, if it has one.
pub(crate) fn create_parent_dir(path: &Path) -> Result<(), PreprocessingError> {
    match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => {
            std::fs::create_dir_all(dir)?;
            Ok(())
        }
        _ => Ok(()),
    }
}

/// Splits a source CSV into the train and held-out files named by its config.
#[derive(Debug, Clone, Default)]
pub struct DataIngestion {
    config: IngestionConfig,
}

impl DataIngestion {
    pub fn new(config: IngestionConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &IngestionConfig {
        &self.config
    }

    /// Run the stage on `source` and return `(train_path, test_path)`.
    ///
    /// # Errors
    /// Fails if the source cannot be read or parsed, if the split parameters
    /// are invalid for the table's size, or if an output cannot be written.
    pub fn initiate<P: AsRef<Path>>(
        &self,
        source: P,
    ) -> Result<(PathBuf, PathBuf), PreprocessingError> {
        let source = source.as_ref();
        info!("Entered the data ingestion stage");

        let table = read_csv(source)?;
        info!(
            "Dataset read from {} ({} rows, {} columns)",
            source.display(),
            table.n_rows(),
            table.n_cols()
        );

        let cfg = &self.config;
        for path in [
            &cfg.raw_data_path,
            &cfg.train_data_path,
            &cfg.test_data_path,
        ] {
            create_parent_dir(path)?;
        }

        write_csv(&table, &cfg.raw_data_path)?;
        info!("Raw data saved to {}", cfg.raw_data_path.display());

        let (train, test) = train_test_split(&table, cfg.test_size, cfg.seed)?;
        debug!(
            train_rows = train.n_rows(),
            test_rows = test.n_rows(),
            seed = cfg.seed,
            "train-test split done"
        );

        write_csv(&train, &cfg.train_data_path)?;
        write_csv(&test, &cfg.test_data_path)?;
        info!(
            "Train and test data saved to {} and {}",
            cfg.train_data_path.display(),
            cfg.test_data_path.display()
        );

        Ok((cfg.train_data_path.clone(), cfg.test_data_path.clone()))
    }
}
