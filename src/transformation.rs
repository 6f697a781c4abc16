//! Transformation stage: fit the preprocessor on the training table, apply
//! it to both tables and persist the results.
//!
//! Each output table holds the transformed features followed by the label
//! column, copied unchanged from its source table. Both outputs are staged in
//! temporary files next to their destinations and only renamed into place
//! once every write has succeeded, so a failed run leaves no partial output.

use crate::config::TransformationConfig;
use crate::dataset::{read_csv, read_csv_with_types, Table};
use crate::preprocessing::{
    check_shape, infer, materialize, ColumnTransformer, FittedColumnTransformer,
    FittedTransformer, PreprocessingError, Transformer,
};
use crate::serialization::SerializableParams;
use crate::staging::{commit, stage_bytes, stage_table};
use ndarray::Array2;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Result of fitting on a training table and transforming both tables.
#[derive(Debug, Clone)]
pub struct TransformedTables {
    pub train: Table,
    pub test: Table,
    pub preprocessor: FittedColumnTransformer,
}

/// Drives schema inference, fitting, transformation and persistence.
#[derive(Debug, Clone, Default)]
pub struct DataTransformation {
    config: TransformationConfig,
}

impl DataTransformation {
    pub fn new(config: TransformationConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &TransformationConfig {
        &self.config
    }

    /// Fit on `train` and transform both tables, in memory.
    ///
    /// # Errors
    /// `SchemaError` if `train` cannot be partitioned, `FitError` if a column
    /// has no estimable statistic, `TransformError` if `test` lacks a feature
    /// or the label column.
    pub fn transform_tables(
        &self,
        train: &Table,
        test: &Table,
    ) -> Result<TransformedTables, PreprocessingError> {
        let partition = infer(train)?;
        info!(
            "Numeric features: {:?}; categorical features: {:?}; label: {}",
            partition.numeric(),
            partition.categorical(),
            partition.label()
        );

        let preprocessor = ColumnTransformer::from_partition(&partition).fit(train)?;
        let train_out = labelled_output(&preprocessor, train, true)?;
        let test_out = labelled_output(&preprocessor, test, true)?;
        info!(
            "Data transformation completed ({} output features)",
            preprocessor.n_features_out()
        );

        Ok(TransformedTables {
            train: train_out,
            test: test_out,
            preprocessor,
        })
    }

    /// Run the stage on the two CSV files and return the transformed paths.
    ///
    /// The held-out file is read with the training file's column types, so
    /// both tables agree on every shared column. The fitted preprocessor is
    /// saved alongside the outputs.
    pub fn initiate<P: AsRef<Path>, Q: AsRef<Path>>(
        &self,
        train_path: P,
        test_path: Q,
    ) -> Result<(PathBuf, PathBuf), PreprocessingError> {
        let (train_path, test_path) = (train_path.as_ref(), test_path.as_ref());
        info!("Entered the data transformation stage");

        let train = read_csv(train_path)?;
        let test = read_csv_with_types(test_path, &train.schema())?;
        info!(
            "Train and test datasets read from {} and {}",
            train_path.display(),
            test_path.display()
        );

        let result = self.transform_tables(&train, &test)?;
        let cfg = &self.config;
        let preprocessor_bytes = result.preprocessor.extract_params().to_bytes()?;

        let staged = vec![
            stage_table(&result.train, &cfg.transformed_train_path)?,
            stage_table(&result.test, &cfg.transformed_test_path)?,
            stage_bytes(&preprocessor_bytes, &cfg.preprocessor_path)?,
        ];
        commit(staged)?;

        info!(
            "Transformed data saved to {} and {}; preprocessor saved to {}",
            cfg.transformed_train_path.display(),
            cfg.transformed_test_path.display(),
            cfg.preprocessor_path.display()
        );
        Ok((
            cfg.transformed_train_path.clone(),
            cfg.transformed_test_path.clone(),
        ))
    }

    /// Transform a new CSV file with a previously saved preprocessor.
    ///
    /// Feature columns are read with the types they had at fit time. The label
    /// column is carried through when the input has one.
    pub fn apply<P, Q, R>(
        preprocessor_path: P,
        input: Q,
        output: R,
    ) -> Result<PathBuf, PreprocessingError>
    where
        P: AsRef<Path>,
        Q: AsRef<Path>,
        R: AsRef<Path>,
    {
        let preprocessor = FittedColumnTransformer::load_from_file(preprocessor_path.as_ref())?;
        info!(
            "Loaded preprocessor from {} ({} input features, {} output features)",
            preprocessor_path.as_ref().display(),
            preprocessor.n_features_in(),
            preprocessor.n_features_out()
        );

        let table = read_csv_with_types(input.as_ref(), preprocessor.input_schema())?;
        let transformed = labelled_output(&preprocessor, &table, false)?;
        commit(vec![stage_table(&transformed, output.as_ref())?])?;

        info!(
            "Transformed {} rows into {}",
            transformed.n_rows(),
            output.as_ref().display()
        );
        Ok(output.as_ref().to_path_buf())
    }
}

/// Transform `source` and append its label column.
fn labelled_output(
    preprocessor: &FittedColumnTransformer,
    source: &Table,
    require_label: bool,
) -> Result<Table, PreprocessingError> {
    let matrix: Array2<f64> = preprocessor.transform(source)?;
    check_shape(&matrix, source.n_rows(), preprocessor.n_features_out())?;

    let mut table = materialize(&matrix, &preprocessor.feature_names_out())?;
    if let Some(label) = preprocessor.label() {
        match source.column(label) {
            Some(column) => table.push_column(column.clone())?,
            None if require_label => {
                return Err(PreprocessingError::transform(
                    label,
                    "label column not found in table",
                ))
            }
            None => debug!(label, "input has no label column"),
        }
    }
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::Value;

    fn write(path: &Path, content: &str) {
        std::fs::write(path, content).unwrap();
    }

    fn train_table() -> Table {
        Table::from_rows(
            vec!["age".into(), "city".into(), "label".into()],
            vec![
                vec![Value::Int(25), "NY".into(), Value::Int(1)],
                vec![Value::Missing, "LA".into(), Value::Int(0)],
                vec![Value::Int(40), "NY".into(), Value::Int(1)],
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_transform_tables_layout() {
        let test = Table::from_rows(
            vec!["age".into(), "city".into(), "label".into()],
            vec![vec![Value::Int(30), "SF".into(), Value::Missing]],
        )
        .unwrap();

        let result = DataTransformation::default()
            .transform_tables(&train_table(), &test)
            .unwrap();

        let header = ["age", "city_NY", "city_LA", "label"];
        assert_eq!(result.train.column_names(), header);
        assert_eq!(result.test.column_names(), header);
        assert_eq!(result.train.n_rows(), 3);
        assert_eq!(result.test.n_rows(), 1);
        assert_eq!(
            result.test.row(0).unwrap(),
            vec![
                &Value::Float(0.0),
                &Value::Float(0.0),
                &Value::Float(0.0),
                &Value::Missing
            ]
        );
    }

    #[test]
    fn test_transform_tables_with_colliding_names() {
        let train = Table::from_rows(
            vec!["city_NY".into(), "city".into(), "label".into()],
            vec![
                vec![Value::Int(3), "NY".into(), Value::Int(1)],
                vec![Value::Int(5), "LA".into(), Value::Int(0)],
            ],
        )
        .unwrap();

        let result = DataTransformation::default()
            .transform_tables(&train, &train)
            .unwrap();
        assert_eq!(
            result.train.column_names(),
            ["city_NY", "city_NY_1", "city_LA", "label"]
        );
        assert_eq!(
            result.train.row(0).unwrap(),
            vec![
                &Value::Float(-1.0),
                &Value::Float(1.0),
                &Value::Float(0.0),
                &Value::Int(1)
            ]
        );
    }

    #[test]
    fn test_transform_tables_requires_label_in_test() {
        let test = Table::from_rows(
            vec!["age".into(), "city".into()],
            vec![vec![Value::Int(30), "NY".into()]],
        )
        .unwrap();
        let result = DataTransformation::default().transform_tables(&train_table(), &test);
        match result {
            Err(PreprocessingError::TransformError { column, .. }) => assert_eq!(column, "label"),
            other => panic!("expected TransformError, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_initiate_persists_outputs_and_preprocessor() {
        let dir = tempfile::tempdir().unwrap();
        let train_path = dir.path().join("train.csv");
        let test_path = dir.path().join("test.csv");
        write(&train_path, "age,city,label\n25,NY,1\n,LA,0\n40,NY,1\n");
        write(&test_path, "age,city,label\n30,SF,0\n");

        let config = TransformationConfig::in_dir(dir.path().join("out"));
        let stage = DataTransformation::new(config.clone());
        let (train_out, test_out) = stage.initiate(&train_path, &test_path).unwrap();

        let train_text = std::fs::read_to_string(&train_out).unwrap();
        let test_text = std::fs::read_to_string(&test_out).unwrap();
        assert_eq!(train_text.lines().next(), test_text.lines().next());
        assert_eq!(test_text, "age,city_NY,city_LA,label\n0.0,0.0,0.0,0\n");

        let loaded = FittedColumnTransformer::load_from_file(&config.preprocessor_path).unwrap();
        assert_eq!(loaded.feature_names_out(), ["age", "city_NY", "city_LA"]);
    }

    #[test]
    fn test_initiate_failure_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let train_path = dir.path().join("train.csv");
        let test_path = dir.path().join("test.csv");
        write(&train_path, "age,city,label\n25,NY,1\n40,LA,0\n");
        // Held-out table lacks the `city` feature.
        write(&test_path, "age,label\n30,0\n");

        let out = dir.path().join("out");
        let stage = DataTransformation::new(TransformationConfig::in_dir(&out));
        assert!(matches!(
            stage.initiate(&train_path, &test_path),
            Err(PreprocessingError::TransformError { .. })
        ));
        assert!(!out.join("transformed_train.csv").exists());
        assert!(!out.join("transformed_test.csv").exists());
    }

    #[test]
    fn test_initiate_schema_error_on_single_column() {
        let dir = tempfile::tempdir().unwrap();
        let train_path = dir.path().join("train.csv");
        write(&train_path, "label\n1\n0\n");

        let stage = DataTransformation::new(TransformationConfig::in_dir(dir.path()));
        assert!(matches!(
            stage.initiate(&train_path, &train_path),
            Err(PreprocessingError::SchemaError(_))
        ));
    }

    #[test]
    fn test_apply_with_saved_preprocessor() {
        let dir = tempfile::tempdir().unwrap();
        let train_path = dir.path().join("train.csv");
        write(&train_path, "age,city,label\n25,NY,1\n,LA,0\n40,NY,1\n");

        let config = TransformationConfig::in_dir(dir.path());
        DataTransformation::new(config.clone())
            .initiate(&train_path, &train_path)
            .unwrap();

        let input = dir.path().join("new.csv");
        write(&input, "city,age\nLA,30\n");
        let output = dir.path().join("new_transformed.csv");
        DataTransformation::apply(&config.preprocessor_path, &input, &output).unwrap();

        assert_eq!(
            std::fs::read_to_string(output).unwrap(),
            "age,city_NY,city_LA\n0.0,0.0,1.0\n"
        );
    }

    #[test]
    fn test_apply_keeps_numeric_looking_levels() {
        let dir = tempfile::tempdir().unwrap();
        let train_path = dir.path().join("train.csv");
        write(&train_path, "x,code,label\n1,007,0\n2,A1,1\n3,007,0\n");

        let config = TransformationConfig::in_dir(dir.path());
        let (train_out, _) = DataTransformation::new(config.clone())
            .initiate(&train_path, &train_path)
            .unwrap();
        let train_text = std::fs::read_to_string(train_out).unwrap();
        assert_eq!(train_text.lines().next(), Some("x,code_007,code_A1,label"));

        let input = dir.path().join("new.csv");
        write(&input, "x,code\n2,007\n");
        let output = dir.path().join("new_transformed.csv");
        DataTransformation::apply(&config.preprocessor_path, &input, &output).unwrap();

        assert_eq!(
            std::fs::read_to_string(output).unwrap(),
            "x,code_007,code_A1\n0.0,1.0,0.0\n"
        );
    }
}
