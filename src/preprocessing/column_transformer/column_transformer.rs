//! ColumnTransformer implementation.
//!
//! Routes each feature column of a [`Table`] to its own branch and
//! concatenates the branch outputs horizontally: every numeric column first
//! (one output column each), then every categorical column's indicator block.

use crate::dataset::io::is_missing_token;
use crate::dataset::{Column, ColumnType, Table, Value};
use crate::preprocessing::error::PreprocessingError;
use crate::preprocessing::pipeline::{
    CategoricalPipeline, CategoricalPipelineParams, FittedCategoricalPipeline,
    FittedNumericPipeline, NumericPipeline, NumericPipelineParams, PipelineStep,
};
use crate::preprocessing::materialize::unique_names;
use crate::preprocessing::schema::FeaturePartition;
use crate::preprocessing::traits::{FittedTransformer, Transformer};
use ndarray::{s, Array2};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Read a numeric feature column as optional floats.
///
/// Integers and floats pass through; text is accepted when it is a missing
/// token or parses as a number.
fn numeric_cells(column: &Column) -> Result<Vec<Option<f64>>, PreprocessingError> {
    column
        .values()
        .iter()
        .map(|value| match value {
            v if v.is_missing() => Ok(None),
            Value::Int(_) | Value::Float(_) => Ok(value.as_f64()),
            Value::Str(s) if is_missing_token(s) => Ok(None),
            Value::Str(s) => s.trim().parse::<f64>().map(Some).map_err(|_| {
                PreprocessingError::transform(
                    column.name(),
                    format!("non-numeric value '{}'", s),
                )
            }),
            other => Err(PreprocessingError::transform(
                column.name(),
                format!("non-numeric value '{}'", other),
            )),
        })
        .collect()
}

/// Read a categorical feature column as optional levels.
fn categorical_cells(column: &Column) -> Vec<Option<String>> {
    column
        .values()
        .iter()
        .map(|value| (!value.is_missing()).then(|| value.to_string()))
        .collect()
}

/// ColumnTransformer assembles one branch per feature column.
///
/// # Example
/// ```ignore
/// use tabprep::preprocessing::{infer, ColumnTransformer, Transformer, FittedTransformer};
///
/// let partition = infer(&train)?;
/// let fitted = ColumnTransformer::from_partition(&partition).fit(&train)?;
///
/// let matrix = fitted.transform(&test)?;
/// let names = fitted.feature_names_out();
/// ```
#[derive(Clone, Debug, Default)]
pub struct ColumnTransformer {
    numeric: Vec<NumericPipeline>,
    categorical: Vec<CategoricalPipeline>,
    label: Option<String>,
}

impl ColumnTransformer {
    /// Create a new empty ColumnTransformer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Default branches for every feature of `partition`: median imputation
    /// and standardization for numeric columns, most-frequent imputation and
    /// one-hot encoding for categorical ones.
    ///
    /// Pure construction; no data is read until [`Transformer::fit`].
    pub fn from_partition(partition: &FeaturePartition) -> Self {
        Self {
            numeric: partition
                .numeric()
                .iter()
                .map(NumericPipeline::new)
                .collect(),
            categorical: partition
                .categorical()
                .iter()
                .map(CategoricalPipeline::new)
                .collect(),
            label: Some(partition.label().to_string()),
        }
    }

    /// Add a numeric branch.
    pub fn add_numeric(mut self, pipeline: NumericPipeline) -> Self {
        self.numeric.push(pipeline);
        self
    }

    /// Add a categorical branch.
    pub fn add_categorical(mut self, pipeline: CategoricalPipeline) -> Self {
        self.categorical.push(pipeline);
        self
    }

    /// Name the label column carried alongside the features.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Get the number of branches.
    pub fn len(&self) -> usize {
        self.numeric.len() + self.categorical.len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Serializable parameters for a fitted ColumnTransformer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ColumnTransformerParams {
    /// Numeric branches, in output order.
    pub numeric: Vec<NumericPipelineParams>,
    /// Categorical branches, in output order.
    pub categorical: Vec<CategoricalPipelineParams>,
    /// Label column, if one was named.
    pub label: Option<String>,
    /// Declared type of every feature column in the training table.
    pub input_types: Vec<(String, ColumnType)>,
}

/// Fitted ColumnTransformer ready for inference.
#[derive(Clone, Debug)]
pub struct FittedColumnTransformer {
    numeric: Vec<FittedNumericPipeline>,
    categorical: Vec<FittedCategoricalPipeline>,
    label: Option<String>,
    input_types: Vec<(String, ColumnType)>,
    n_features_out: usize,
}

impl FittedColumnTransformer {
    fn assemble(
        numeric: Vec<FittedNumericPipeline>,
        categorical: Vec<FittedCategoricalPipeline>,
        label: Option<String>,
        input_types: Vec<(String, ColumnType)>,
    ) -> Self {
        let n_features_out =
            numeric.len() + categorical.iter().map(|c| c.n_features_out()).sum::<usize>();
        Self {
            numeric,
            categorical,
            label,
            input_types,
            n_features_out,
        }
    }

    /// Number of feature columns read from the input table.
    pub fn n_features_in(&self) -> usize {
        self.numeric.len() + self.categorical.len()
    }

    pub fn numeric(&self) -> &[FittedNumericPipeline] {
        &self.numeric
    }

    pub fn categorical(&self) -> &[FittedCategoricalPipeline] {
        &self.categorical
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// Input columns the transformer reads, numeric first.
    pub fn feature_names_in(&self) -> Vec<&str> {
        self.numeric
            .iter()
            .map(|p| p.column())
            .chain(self.categorical.iter().map(|p| p.column()))
            .collect()
    }

    /// Feature column types seen at fit time, as a CSV type hint.
    ///
    /// Reading new data with this hint renders every categorical level the
    /// way the training table did, so `007` stays `007`.
    pub fn input_schema(&self) -> &[(String, ColumnType)] {
        &self.input_types
    }

    /// Output column names: numeric names, then `<column>_<level>` per level.
    ///
    /// A name that repeats an earlier one, or the label's, is suffixed as in
    /// [`unique_names`].
    pub fn feature_names_out(&self) -> Vec<String> {
        let mut names = Vec::with_capacity(self.n_features_out);
        names.extend(self.numeric.iter().map(|p| p.column().to_string()));
        for pipeline in &self.categorical {
            names.extend(pipeline.feature_names_out());
        }
        let reserved: Vec<&str> = self.label.as_deref().into_iter().collect();
        unique_names(&names, &reserved)
    }

    /// Branch names with the column they serve.
    pub fn step_names(&self) -> Vec<(&str, [&'static str; 2])> {
        self.numeric
            .iter()
            .map(|p| (p.column(), p.step_names()))
            .chain(self.categorical.iter().map(|p| (p.column(), p.step_names())))
            .collect()
    }

    /// Learned parameters as pretty-printed JSON, for inspection.
    pub fn to_json(&self) -> Result<String, PreprocessingError> {
        Ok(serde_json::to_string_pretty(&self.extract_params())?)
    }
}

fn require<'a>(
    data: &'a Table,
    name: &str,
    missing: impl Fn(&str) -> PreprocessingError,
) -> Result<&'a Column, PreprocessingError> {
    data.column(name).ok_or_else(|| missing(name))
}

impl Transformer for ColumnTransformer {
    type Input = Table;
    type Output = Array2<f64>;
    type Params = ColumnTransformerParams;
    type Fitted = FittedColumnTransformer;

    fn fit(&self, data: &Self::Input) -> Result<Self::Fitted, PreprocessingError> {
        if self.is_empty() {
            return Err(PreprocessingError::InvalidParameter(
                "Cannot fit empty ColumnTransformer".to_string(),
            ));
        }
        info!(
            rows = data.n_rows(),
            numeric = self.numeric.len(),
            categorical = self.categorical.len(),
            "fitting column transformer"
        );

        let not_found = |name: &str| PreprocessingError::fit(name, "column not found in table");

        let mut input_types = Vec::with_capacity(self.len());
        let mut numeric = Vec::with_capacity(self.numeric.len());
        for pipeline in &self.numeric {
            let column = require(data, pipeline.column(), not_found)?;
            input_types.push((column.name().to_string(), column.dtype()));
            let cells = numeric_cells(column).map_err(|e| match e {
                PreprocessingError::TransformError { column, reason } => {
                    PreprocessingError::FitError { column, reason }
                }
                other => other,
            })?;
            let fitted = pipeline.fit(&cells)?;
            debug!(
                column = pipeline.column(),
                median = fitted.median(),
                mean = fitted.mean(),
                std = fitted.std(),
                "fitted numeric branch"
            );
            numeric.push(fitted);
        }

        let mut categorical = Vec::with_capacity(self.categorical.len());
        for pipeline in &self.categorical {
            let column = require(data, pipeline.column(), not_found)?;
            input_types.push((column.name().to_string(), column.dtype()));
            let fitted = pipeline.fit(&categorical_cells(column))?;
            debug!(
                column = pipeline.column(),
                mode = fitted.mode(),
                levels = fitted.vocabulary().len(),
                "fitted categorical branch"
            );
            categorical.push(fitted);
        }

        let fitted = FittedColumnTransformer::assemble(
            numeric,
            categorical,
            self.label.clone(),
            input_types,
        );
        info!(
            n_features_out = fitted.n_features_out(),
            "column transformer fitted"
        );
        Ok(fitted)
    }
}

impl FittedTransformer for FittedColumnTransformer {
    type Input = Table;
    type Output = Array2<f64>;
    type Params = ColumnTransformerParams;

    fn transform(&self, data: &Self::Input) -> Result<Self::Output, PreprocessingError> {
        let not_found = |name: &str| PreprocessingError::transform(name, "column not found in table");

        // Resolve every input column before producing any output.
        let numeric_columns = self
            .numeric
            .iter()
            .map(|p| require(data, p.column(), not_found))
            .collect::<Result<Vec<_>, _>>()?;
        let categorical_columns = self
            .categorical
            .iter()
            .map(|p| require(data, p.column(), not_found))
            .collect::<Result<Vec<_>, _>>()?;

        let rows = data.n_rows();
        let mut result = Array2::<f64>::zeros((rows, self.n_features_out));

        for (j, (pipeline, column)) in self.numeric.iter().zip(numeric_columns).enumerate() {
            let scaled = pipeline.transform(&numeric_cells(column)?)?;
            for (i, x) in scaled.into_iter().enumerate() {
                result[[i, j]] = x;
            }
        }

        let mut offset = self.numeric.len();
        for (pipeline, column) in self.categorical.iter().zip(categorical_columns) {
            let width = pipeline.n_features_out();
            pipeline.transform_into(
                &categorical_cells(column),
                result.slice_mut(s![.., offset..offset + width]),
            )?;
            offset += width;
        }

        debug!(rows, cols = self.n_features_out, "transformed table");
        Ok(result)
    }

    fn extract_params(&self) -> Self::Params {
        ColumnTransformerParams {
            numeric: self.numeric.iter().map(|p| p.extract_params()).collect(),
            categorical: self
                .categorical
                .iter()
                .map(|p| p.extract_params())
                .collect(),
            label: self.label.clone(),
            input_types: self.input_types.clone(),
        }
    }

    fn from_params(params: Self::Params) -> Result<Self, PreprocessingError> {
        if params.numeric.is_empty() && params.categorical.is_empty() {
            return Err(PreprocessingError::InvalidParameter(
                "column transformer has no branches".to_string(),
            ));
        }
        let numeric = params
            .numeric
            .into_iter()
            .map(FittedNumericPipeline::from_params)
            .collect::<Result<Vec<_>, _>>()?;
        let categorical = params
            .categorical
            .into_iter()
            .map(FittedCategoricalPipeline::from_params)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::assemble(
            numeric,
            categorical,
            params.label,
            params.input_types,
        ))
    }

    fn n_features_out(&self) -> usize {
        self.n_features_out
    }
}
