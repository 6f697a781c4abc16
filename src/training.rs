//! Model training stage: fit a classifier on the transformed training table,
//! score it on the transformed held-out table, then persist the model and an
//! evaluation report.
//!
//! The last column of each table is the label; every other column is a
//! numeric feature. The model and the report are staged and renamed into
//! place together.

use crate::config::ModelTrainerConfig;
use crate::dataset::{format_float, read_csv, read_csv_with_types, Table};
use crate::model::{ClassificationReport, FittedLogisticRegression};
use crate::preprocessing::error::PreprocessingError;
use crate::serialization::SerializableParams;
use crate::staging::{commit, stage_bytes};
use ndarray::Array2;
use std::path::{Path, PathBuf};
use tracing::info;

/// A fitted classifier and its score on the held-out table.
#[derive(Debug, Clone)]
pub struct TrainedModel {
    pub model: FittedLogisticRegression,
    pub report: ClassificationReport,
}

impl TrainedModel {
    /// Report file contents: accuracy line, then the per-class table.
    pub fn report_text(&self) -> String {
        format!(
            "Accuracy: {}\nClassification Report:\n{}",
            format_float(self.report.accuracy),
            self.report
        )
    }
}

/// Build the feature matrix over `features` and read one label per row.
fn features_and_labels(
    table: &Table,
    features: &[&str],
    label: &str,
    error: impl Fn(&str, String) -> PreprocessingError,
) -> Result<(Array2<f64>, Vec<String>), PreprocessingError> {
    let mut x = Array2::<f64>::zeros((table.n_rows(), features.len()));
    for (j, &name) in features.iter().enumerate() {
        let column = table
            .column(name)
            .ok_or_else(|| error(name, "column not found in table".to_string()))?;
        for (i, value) in column.values().iter().enumerate() {
            x[[i, j]] = value
                .as_f64()
                .ok_or_else(|| error(name, format!("row {} is not numeric: '{}'", i, value)))?;
        }
    }

    let labels = table
        .column(label)
        .ok_or_else(|| error(label, "label column not found in table".to_string()))?;
    let y = labels
        .values()
        .iter()
        .enumerate()
        .map(|(i, value)| {
            if value.is_missing() {
                Err(error(label, format!("row {} has no label", i)))
            } else {
                Ok(value.to_string())
            }
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok((x, y))
}

/// Fits, scores and persists the classifier.
#[derive(Debug, Clone, Default)]
pub struct ModelTrainer {
    config: ModelTrainerConfig,
}

impl ModelTrainer {
    pub fn new(config: ModelTrainerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ModelTrainerConfig {
        &self.config
    }

    /// Fit on `train` and score on `test`, in memory.
    ///
    /// # Errors
    /// `SchemaError` if `train` has no feature column, `FitError` for a
    /// non-numeric feature or a missing label in `train`, `TransformError`
    /// for the same problems in `test` or a feature it lacks.
    pub fn train_tables(
        &self,
        train: &Table,
        test: &Table,
    ) -> Result<TrainedModel, PreprocessingError> {
        let names = train.column_names();
        let (label, features) = match names.split_last() {
            Some((label, features)) if !features.is_empty() => (*label, features),
            _ => {
                return Err(PreprocessingError::SchemaError(format!(
                    "training table needs a feature column and a label, got {} column(s)",
                    names.len()
                )))
            }
        };
        info!(
            "Training on {} rows with {} features; label: {}",
            train.n_rows(),
            features.len(),
            label
        );

        let (x_train, y_train) =
            features_and_labels(train, features, label, |c, r| PreprocessingError::fit(c, r))?;
        let model = self.config.classifier().fit(&x_train, &y_train)?;
        info!(
            "Model training completed ({} classes: {:?})",
            model.classes().len(),
            model.classes()
        );

        let (x_test, y_test) = features_and_labels(test, features, label, |c, r| {
            PreprocessingError::transform(c, r)
        })?;
        let predictions = model.predict(&x_test)?;
        let report = ClassificationReport::new(&y_test, &predictions)?;
        info!(
            "Model evaluation completed with accuracy: {}",
            format_float(report.accuracy)
        );

        Ok(TrainedModel { model, report })
    }

    /// Run the stage on the two transformed CSV files and return the model path.
    ///
    /// The held-out file is read with the training file's column types.
    pub fn initiate<P: AsRef<Path>, Q: AsRef<Path>>(
        &self,
        train_path: P,
        test_path: Q,
    ) -> Result<PathBuf, PreprocessingError> {
        let (train_path, test_path) = (train_path.as_ref(), test_path.as_ref());
        info!("Entered the model training stage");

        let train = read_csv(train_path)?;
        let test = read_csv_with_types(test_path, &train.schema())?;
        info!(
            "Train and test datasets read from {} and {}",
            train_path.display(),
            test_path.display()
        );

        let trained = self.train_tables(&train, &test)?;
        let cfg = &self.config;
        let model_bytes = trained.model.extract_params().to_bytes()?;

        commit(vec![
            stage_bytes(&model_bytes, &cfg.model_path)?,
            stage_bytes(trained.report_text().as_bytes(), &cfg.report_path)?,
        ])?;

        info!(
            "Trained model saved to {}; report saved to {}",
            cfg.model_path.display(),
            cfg.report_path.display()
        );
        Ok(cfg.model_path.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::Value;

    fn write(path: &Path, content: &str) {
        std::fs::write(path, content).unwrap();
    }

    fn table(rows: &[(f64, i64)]) -> Table {
        Table::from_rows(
            vec!["x".into(), "label".into()],
            rows.iter()
                .map(|&(x, y)| vec![Value::Float(x), Value::Int(y)])
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn test_train_tables_scores_held_out_rows() {
        let train = table(&[(-2.0, 0), (-1.0, 0), (1.0, 1), (2.0, 1)]);
        let test = table(&[(-3.0, 0), (3.0, 1), (0.5, 1)]);

        let trained = ModelTrainer::default().train_tables(&train, &test).unwrap();
        assert_eq!(trained.model.classes(), ["0", "1"]);
        assert_eq!(trained.report.accuracy, 1.0);
        assert_eq!(trained.report.support(), 3);
        assert_eq!(trained.report.classes[1].support, 2);
    }

    #[test]
    fn test_report_text_layout() {
        let train = table(&[(-2.0, 0), (2.0, 1)]);
        let trained = ModelTrainer::default().train_tables(&train, &train).unwrap();
        let text = trained.report_text();
        assert!(text.starts_with("Accuracy: 1.0\nClassification Report:\n"));
        assert!(text.contains("weighted avg"));
    }

    #[test]
    fn test_train_tables_missing_label() {
        let train = Table::from_rows(
            vec!["x".into(), "label".into()],
            vec![
                vec![Value::Float(1.0), Value::Int(1)],
                vec![Value::Float(2.0), Value::Missing],
            ],
        )
        .unwrap();
        match ModelTrainer::default().train_tables(&train, &train) {
            Err(PreprocessingError::FitError { column, .. }) => assert_eq!(column, "label"),
            other => panic!("expected FitError, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_train_tables_test_lacks_feature() {
        let train = table(&[(-1.0, 0), (1.0, 1)]);
        let test = Table::from_rows(vec!["label".into()], vec![vec![Value::Int(0)]]).unwrap();
        match ModelTrainer::default().train_tables(&train, &test) {
            Err(PreprocessingError::TransformError { column, .. }) => assert_eq!(column, "x"),
            other => panic!("expected TransformError, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_train_tables_needs_a_feature() {
        let train = Table::from_rows(vec!["label".into()], vec![vec![Value::Int(0)]]).unwrap();
        assert!(matches!(
            ModelTrainer::default().train_tables(&train, &train),
            Err(PreprocessingError::SchemaError(_))
        ));
    }

    #[test]
    fn test_initiate_persists_model_and_report() {
        let dir = tempfile::tempdir().unwrap();
        let train_path = dir.path().join("transformed_train.csv");
        let test_path = dir.path().join("transformed_test.csv");
        write(&train_path, "x,label\n-2.0,0\n-1.0,0\n1.0,1\n2.0,1\n");
        write(&test_path, "x,label\n-3.0,0\n3.0,1\n");

        let config = ModelTrainerConfig::in_dir(dir.path().join("out"));
        let model_path = ModelTrainer::new(config.clone())
            .initiate(&train_path, &test_path)
            .unwrap();
        assert_eq!(model_path, config.model_path);

        let report = std::fs::read_to_string(&config.report_path).unwrap();
        assert!(report.starts_with("Accuracy: 1.0\n"));

        let model = FittedLogisticRegression::load_from_file(&model_path).unwrap();
        assert_eq!(
            model.predict(&ndarray::array![[-5.0], [5.0]]).unwrap(),
            ["0", "1"]
        );
    }

    #[test]
    fn test_initiate_failure_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let train_path = dir.path().join("transformed_train.csv");
        let test_path = dir.path().join("transformed_test.csv");
        write(&train_path, "x,label\n-1.0,0\n1.0,1\n");
        write(&test_path, "y,label\n0.0,0\n");

        let out = dir.path().join("out");
        let trainer = ModelTrainer::new(ModelTrainerConfig::in_dir(&out));
        assert!(trainer.initiate(&train_path, &test_path).is_err());
        assert!(!out.join("model.bin").exists());
        assert!(!out.join("report.txt").exists());
    }
}
