//! Core traits for preprocessing transformers.
//!
//! This module defines the two central traits:
//! - [`Transformer`]: Used during fitting; has hyperparameters and can learn from data.
//! - [`FittedTransformer`]: After fitting; immutable, ready for inference and serialization.
//!
//! The split is what keeps held-out data out of the learned statistics: only a
//! [`Transformer`] can look at data to learn, and a [`FittedTransformer`] has no
//! method that re-estimates anything.

use crate::preprocessing::error::PreprocessingError;
use crate::serialization::SerializableParams;

/// Trait for unfitted transformers with hyperparameters.
///
/// A transformer learns parameters from training data and can then transform
/// new data using those learned parameters. This trait represents the
/// configurable, unfitted state.
///
/// # Associated Types
/// - `Input`: Input data type (a column slice, or a whole [`Table`](crate::dataset::Table)).
/// - `Output`: Output data type (an imputed column, a scaled column, an indicator matrix).
/// - `Params`: Serializable representation of learned parameters.
/// - `Fitted`: The corresponding fitted transformer type.
///
/// # Example
/// ```ignore
/// use tabprep::preprocessing::{StandardScaler, Transformer, FittedTransformer};
///
/// let scaler = StandardScaler::new();
/// let fitted = scaler.fit(&[25.0, 25.0, 40.0])?;
/// let scaled = fitted.transform(&[30.0])?;
/// ```
pub trait Transformer: Clone {
    /// Input data type for transformation.
    type Input: ?Sized;
    /// Output data type after transformation.
    type Output;
    /// Serializable representation of learned parameters.
    type Params: SerializableParams;
    /// The fitted transformer type ready for inference.
    type Fitted: FittedTransformer<Params = Self::Params, Input = Self::Input, Output = Self::Output>;

    /// Fit the transformer to the training data.
    ///
    /// # Errors
    /// Returns [`PreprocessingError`] if:
    /// - Data is empty
    /// - No statistic can be estimated (e.g. every value is missing)
    fn fit(&self, data: &Self::Input) -> Result<Self::Fitted, PreprocessingError>;

    /// Fit the transformer and transform the same data in one step.
    fn fit_transform(&self, data: &Self::Input) -> Result<Self::Output, PreprocessingError> {
        let fitted = self.fit(data)?;
        fitted.transform(data)
    }
}

/// Trait for fitted transformers ready for inference.
///
/// After fitting, a transformer holds its learned parameters and never changes
/// them again. It can be serialized and deserialized for deployment.
///
/// # Guarantees
/// - `extract_params()` + `from_params()` is a round-trip.
/// - `transform` is deterministic: the same input gives bit-identical output.
pub trait FittedTransformer: Clone {
    /// Input data type for transformation.
    type Input: ?Sized;
    /// Output data type after transformation.
    type Output;
    /// Serializable representation of learned parameters.
    type Params: SerializableParams;

    /// Transform data using learned parameters.
    fn transform(&self, data: &Self::Input) -> Result<Self::Output, PreprocessingError>;

    /// Extract learned parameters as a serializable representation.
    fn extract_params(&self) -> Self::Params;

    /// Reconstruct a fitted transformer from parameters.
    fn from_params(params: Self::Params) -> Result<Self, PreprocessingError>
    where
        Self: Sized;

    /// Number of output features produced per row.
    fn n_features_out(&self) -> usize;

    /// Save the fitted transformer to a file.
    fn save_to_file<P: AsRef<std::path::Path>>(&self, path: P) -> Result<(), PreprocessingError> {
        let params = self.extract_params();
        let bytes = params
            .to_bytes()
            .map_err(|e| PreprocessingError::SerializationError(e.to_string()))?;
        std::fs::write(path, bytes)?;
        Ok(())
    }

    /// Load a fitted transformer from a file.
    fn load_from_file<P: AsRef<std::path::Path>>(path: P) -> Result<Self, PreprocessingError>
    where
        Self: Sized,
    {
        let bytes = std::fs::read(path)?;
        let params = Self::Params::from_bytes(&bytes)
            .map_err(|e| PreprocessingError::SerializationError(e.to_string()))?;
        Self::from_params(params)
    }
}
