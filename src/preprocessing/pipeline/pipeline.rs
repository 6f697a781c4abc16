//! Per-column preprocessing branches.
//!
//! Each branch chains two transformers over a single column, the output of
//! the first becoming the input (and the fit data) of the second:
//!
//! ```text
//! NumericPipeline:      Option<f64>    --SimpleImputer-->      f64    --StandardScaler--> f64
//! CategoricalPipeline:  Option<String> --CategoricalImputer--> String --OneHotEncoder-->  [f64; levels]
//! ```
//!
//! # Example
//! ```ignore
//! use tabprep::preprocessing::{NumericPipeline, Transformer, FittedTransformer};
//!
//! let fitted = NumericPipeline::new("age").fit(&[Some(25.0), None, Some(40.0)])?;
//! assert_eq!(fitted.median(), 25.0);
//! let out = fitted.transform(&[Some(30.0)])?;
//! ```

use crate::preprocessing::encoding::{
    FittedOneHotEncoder, HandleUnknown, OneHotEncoder, OneHotEncoderParams,
};
use crate::preprocessing::error::PreprocessingError;
use crate::preprocessing::imputation::{
    CategoricalImputeStrategy, CategoricalImputer, CategoricalImputerParams,
    FittedCategoricalImputer, FittedSimpleImputer, ImputeStrategy, SimpleImputer,
    SimpleImputerParams,
};
use crate::preprocessing::scaling::{FittedStandardScaler, StandardScaler, StandardScalerParams};
use crate::preprocessing::traits::{FittedTransformer, Transformer};
use ndarray::{Array2, ArrayViewMut2};
use serde::{Deserialize, Serialize};

/// A fitted branch that can name its steps.
pub trait PipelineStep {
    /// Column the branch reads.
    fn column(&self) -> &str;
    /// Step names, in application order.
    fn step_names(&self) -> [&'static str; 2];
}

/// Impute-then-scale branch for one numeric column (unfitted).
#[derive(Clone, Debug)]
pub struct NumericPipeline {
    column: String,
    imputer: SimpleImputer,
    scaler: StandardScaler,
}

impl NumericPipeline {
    /// Median imputation followed by standardization.
    pub fn new(column: impl Into<String>) -> Self {
        let column = column.into();
        Self {
            imputer: SimpleImputer::new(ImputeStrategy::Median).with_column(column.clone()),
            scaler: StandardScaler::new(),
            column,
        }
    }

    /// Replace the imputation strategy.
    pub fn with_imputer(mut self, strategy: ImputeStrategy) -> Self {
        self.imputer = SimpleImputer::new(strategy).with_column(self.column.clone());
        self
    }

    /// Replace the scaler.
    pub fn with_scaler(mut self, scaler: StandardScaler) -> Self {
        self.scaler = scaler;
        self
    }

    pub fn column(&self) -> &str {
        &self.column
    }
}

/// Serializable parameters for a fitted numeric branch.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NumericPipelineParams {
    pub column: String,
    pub imputer: SimpleImputerParams,
    pub scaler: StandardScalerParams,
}

/// Fitted numeric branch.
#[derive(Clone, Debug)]
pub struct FittedNumericPipeline {
    column: String,
    imputer: FittedSimpleImputer,
    scaler: FittedStandardScaler,
}

impl FittedNumericPipeline {
    /// Imputation value learned at fit time.
    pub fn median(&self) -> f64 {
        self.imputer.statistic()
    }

    pub fn mean(&self) -> f64 {
        self.scaler.mean()
    }

    pub fn std(&self) -> f64 {
        self.scaler.std()
    }
}

impl PipelineStep for FittedNumericPipeline {
    fn column(&self) -> &str {
        &self.column
    }

    fn step_names(&self) -> [&'static str; 2] {
        ["SimpleImputer", "StandardScaler"]
    }
}

impl Transformer for NumericPipeline {
    type Input = [Option<f64>];
    type Output = Vec<f64>;
    type Params = NumericPipelineParams;
    type Fitted = FittedNumericPipeline;

    fn fit(&self, data: &Self::Input) -> Result<Self::Fitted, PreprocessingError> {
        let imputer = self.imputer.fit(data)?;
        let imputed = imputer.transform(data)?;
        let scaler = self
            .scaler
            .fit(&imputed)
            .map_err(|e| PreprocessingError::fit(&self.column, e.to_string()))?;

        Ok(FittedNumericPipeline {
            column: self.column.clone(),
            imputer,
            scaler,
        })
    }
}

impl FittedTransformer for FittedNumericPipeline {
    type Input = [Option<f64>];
    type Output = Vec<f64>;
    type Params = NumericPipelineParams;

    fn transform(&self, data: &Self::Input) -> Result<Self::Output, PreprocessingError> {
        let imputed = self.imputer.transform(data)?;
        self.scaler.transform(&imputed)
    }

    fn extract_params(&self) -> Self::Params {
        NumericPipelineParams {
            column: self.column.clone(),
            imputer: self.imputer.extract_params(),
            scaler: self.scaler.extract_params(),
        }
    }

    fn from_params(params: Self::Params) -> Result<Self, PreprocessingError> {
        Ok(Self {
            column: params.column,
            imputer: FittedSimpleImputer::from_params(params.imputer)?,
            scaler: FittedStandardScaler::from_params(params.scaler)?,
        })
    }

    fn n_features_out(&self) -> usize {
        1
    }
}

/// Impute-then-encode branch for one categorical column (unfitted).
#[derive(Clone, Debug)]
pub struct CategoricalPipeline {
    column: String,
    imputer: CategoricalImputer,
    encoder: OneHotEncoder,
}

impl CategoricalPipeline {
    /// Most-frequent imputation followed by one-hot encoding that zero-fills
    /// unseen levels.
    pub fn new(column: impl Into<String>) -> Self {
        let column = column.into();
        Self {
            imputer: CategoricalImputer::new(CategoricalImputeStrategy::MostFrequent)
                .with_column(column.clone()),
            encoder: OneHotEncoder::new()
                .with_handle_unknown(HandleUnknown::Ignore)
                .with_column(column.clone()),
            column,
        }
    }

    /// Replace the imputation strategy.
    pub fn with_imputer(mut self, strategy: CategoricalImputeStrategy) -> Self {
        self.imputer = CategoricalImputer::new(strategy).with_column(self.column.clone());
        self
    }

    /// Set how levels unseen at fit time are handled.
    pub fn with_handle_unknown(mut self, strategy: HandleUnknown) -> Self {
        self.encoder = self.encoder.with_handle_unknown(strategy);
        self
    }

    pub fn column(&self) -> &str {
        &self.column
    }
}

/// Serializable parameters for a fitted categorical branch.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CategoricalPipelineParams {
    pub column: String,
    pub imputer: CategoricalImputerParams,
    pub encoder: OneHotEncoderParams,
}

/// Fitted categorical branch.
#[derive(Clone, Debug)]
pub struct FittedCategoricalPipeline {
    column: String,
    imputer: FittedCategoricalImputer,
    encoder: FittedOneHotEncoder,
}

impl FittedCategoricalPipeline {
    /// Imputation level learned at fit time.
    pub fn mode(&self) -> &str {
        self.imputer.statistic()
    }

    /// Ordered vocabulary learned at fit time.
    pub fn vocabulary(&self) -> &[String] {
        self.encoder.categories()
    }

    /// `<column>_<level>` for each vocabulary level.
    pub fn feature_names_out(&self) -> Vec<String> {
        self.encoder.feature_names_out()
    }

    /// Impute then encode into a pre-allocated block (rows × levels).
    pub(crate) fn transform_into(
        &self,
        data: &[Option<String>],
        out: ArrayViewMut2<'_, f64>,
    ) -> Result<(), PreprocessingError> {
        let imputed = self.imputer.transform(data)?;
        self.encoder.encode_into(&imputed, out)
    }
}

impl PipelineStep for FittedCategoricalPipeline {
    fn column(&self) -> &str {
        &self.column
    }

    fn step_names(&self) -> [&'static str; 2] {
        ["CategoricalImputer", "OneHotEncoder"]
    }
}

impl Transformer for CategoricalPipeline {
    type Input = [Option<String>];
    type Output = Array2<f64>;
    type Params = CategoricalPipelineParams;
    type Fitted = FittedCategoricalPipeline;

    fn fit(&self, data: &Self::Input) -> Result<Self::Fitted, PreprocessingError> {
        let imputer = self.imputer.fit(data)?;
        let imputed = imputer.transform(data)?;
        let encoder = self.encoder.fit(&imputed)?;

        Ok(FittedCategoricalPipeline {
            column: self.column.clone(),
            imputer,
            encoder,
        })
    }
}

impl FittedTransformer for FittedCategoricalPipeline {
    type Input = [Option<String>];
    type Output = Array2<f64>;
    type Params = CategoricalPipelineParams;

    fn transform(&self, data: &Self::Input) -> Result<Self::Output, PreprocessingError> {
        let mut result = Array2::<f64>::zeros((data.len(), self.encoder.n_features_out()));
        self.transform_into(data, result.view_mut())?;
        Ok(result)
    }

    fn extract_params(&self) -> Self::Params {
        CategoricalPipelineParams {
            column: self.column.clone(),
            imputer: self.imputer.extract_params(),
            encoder: self.encoder.extract_params(),
        }
    }

    fn from_params(params: Self::Params) -> Result<Self, PreprocessingError> {
        Ok(Self {
            column: params.column,
            imputer: FittedCategoricalImputer::from_params(params.imputer)?,
            encoder: FittedOneHotEncoder::from_params(params.encoder)?,
        })
    }

    fn n_features_out(&self) -> usize {
        self.encoder.n_features_out()
    }
}
