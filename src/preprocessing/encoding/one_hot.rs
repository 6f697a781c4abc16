//! One-hot encoding for a categorical column.
//!
//! Learns the ordered vocabulary of a column at fit time and expands each
//! value into one indicator column per level.

use crate::preprocessing::encoding::HandleUnknown;
use crate::preprocessing::error::PreprocessingError;
use crate::preprocessing::traits::{FittedTransformer, Transformer};
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One-hot encoder for a categorical column.
///
/// Levels are kept in order of first appearance in the fit-time data, so the
/// output layout is fully determined by the training column.
///
/// # Example
/// ```ignore
/// use tabprep::preprocessing::{OneHotEncoder, HandleUnknown, Transformer, FittedTransformer};
///
/// let data = vec!["NY".to_string(), "LA".to_string(), "NY".to_string()];
/// let fitted = OneHotEncoder::new()
///     .with_handle_unknown(HandleUnknown::Ignore)
///     .fit(&data)?;
///
/// // Vocabulary: ["NY", "LA"]
/// let encoded = fitted.transform(&["LA".to_string(), "SF".to_string()])?;
/// // [[0, 1],
/// //  [0, 0]]   <- unseen level: all-zero block
/// ```
#[derive(Clone, Debug, Default)]
pub struct OneHotEncoder {
    /// How to handle unknown categories during transform.
    handle_unknown: HandleUnknown,
    column: String,
}

impl OneHotEncoder {
    /// Create a new OneHotEncoder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the strategy for handling unknown categories.
    pub fn with_handle_unknown(mut self, strategy: HandleUnknown) -> Self {
        self.handle_unknown = strategy;
        self
    }

    /// Name the column this encoder serves; prefixes the output feature names.
    pub fn with_column(mut self, column: impl Into<String>) -> Self {
        self.column = column.into();
        self
    }
}

/// Serializable parameters for a fitted OneHotEncoder.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OneHotEncoderParams {
    /// Column the encoder was fitted on.
    pub column: String,
    /// Levels in first-appearance order.
    pub categories: Vec<String>,
    /// Handle unknown strategy.
    pub handle_unknown: HandleUnknown,
}

/// Fitted OneHotEncoder ready for inference.
#[derive(Clone, Debug)]
pub struct FittedOneHotEncoder {
    column: String,
    categories: Vec<String>,
    index: HashMap<String, usize>,
    handle_unknown: HandleUnknown,
}

impl FittedOneHotEncoder {
    fn from_categories(
        column: String,
        categories: Vec<String>,
        handle_unknown: HandleUnknown,
    ) -> Self {
        let index = categories
            .iter()
            .enumerate()
            .map(|(i, c)| (c.clone(), i))
            .collect();
        Self {
            column,
            categories,
            index,
            handle_unknown,
        }
    }

    /// The vocabulary, in output column order.
    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    /// Position of `level` in the vocabulary.
    pub fn category_index(&self, level: &str) -> Option<usize> {
        self.index.get(level).copied()
    }

    /// Output feature names, `<column>_<level>` per level.
    pub fn feature_names_out(&self) -> Vec<String> {
        self.categories
            .iter()
            .map(|level| format!("{}_{}", self.column, level))
            .collect()
    }

    /// Write the indicator block for each value into `out`.
    ///
    /// `out` must have one row per value and one column per level.
    pub(crate) fn encode_into(
        &self,
        data: &[String],
        mut out: ndarray::ArrayViewMut2<'_, f64>,
    ) -> Result<(), PreprocessingError> {
        for (row, value) in data.iter().enumerate() {
            match self.index.get(value) {
                Some(&idx) => out[[row, idx]] = 1.0,
                None if self.handle_unknown == HandleUnknown::Error => {
                    return Err(PreprocessingError::transform(
                        &self.column,
                        format!("unknown category '{}'", value),
                    ));
                }
                // With Ignore, leave as zeros
                None => {}
            }
        }
        Ok(())
    }
}

impl Transformer for OneHotEncoder {
    type Input = [String];
    type Output = Array2<f64>;
    type Params = OneHotEncoderParams;
    type Fitted = FittedOneHotEncoder;

    fn fit(&self, data: &Self::Input) -> Result<Self::Fitted, PreprocessingError> {
        let mut categories: Vec<String> = Vec::new();
        let mut seen = std::collections::HashSet::new();
        for value in data {
            if seen.insert(value.as_str()) {
                categories.push(value.clone());
            }
        }

        if categories.is_empty() {
            return Err(PreprocessingError::fit(
                &self.column,
                "no observed category levels",
            ));
        }

        Ok(FittedOneHotEncoder::from_categories(
            self.column.clone(),
            categories,
            self.handle_unknown,
        ))
    }
}

impl FittedTransformer for FittedOneHotEncoder {
    type Input = [String];
    type Output = Array2<f64>;
    type Params = OneHotEncoderParams;

    fn transform(&self, data: &Self::Input) -> Result<Self::Output, PreprocessingError> {
        let mut result = Array2::<f64>::zeros((data.len(), self.categories.len()));
        self.encode_into(data, result.view_mut())?;
        Ok(result)
    }

    fn extract_params(&self) -> Self::Params {
        OneHotEncoderParams {
            column: self.column.clone(),
            categories: self.categories.clone(),
            handle_unknown: self.handle_unknown,
        }
    }

    fn from_params(params: Self::Params) -> Result<Self, PreprocessingError> {
        if params.categories.is_empty() {
            return Err(PreprocessingError::InvalidParameter(format!(
                "encoder for '{}' has an empty vocabulary",
                params.column
            )));
        }
        Ok(Self::from_categories(
            params.column,
            params.categories,
            params.handle_unknown,
        ))
    }

    fn n_features_out(&self) -> usize {
        self.categories.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_one_hot_vocabulary_first_appearance_order() {
        let fitted = OneHotEncoder::new()
            .fit(&strings(&["NY", "LA", "NY", "SF"]))
            .unwrap();
        assert_eq!(fitted.categories(), ["NY", "LA", "SF"]);
        assert_eq!(fitted.n_features_out(), 3);
        assert_eq!(fitted.category_index("LA"), Some(1));
    }

    #[test]
    fn test_one_hot_transform() {
        let fitted = OneHotEncoder::new().fit(&strings(&["a", "b", "c"])).unwrap();
        let encoded = fitted.transform(&strings(&["c", "a"])).unwrap();
        assert_eq!(encoded, array![[0.0, 0.0, 1.0], [1.0, 0.0, 0.0]]);
    }

    #[test]
    fn test_one_hot_unknown_ignored() {
        let fitted = OneHotEncoder::new()
            .with_handle_unknown(HandleUnknown::Ignore)
            .fit(&strings(&["NY", "LA"]))
            .unwrap();
        let encoded = fitted.transform(&strings(&["SF", "LA"])).unwrap();
        assert_eq!(encoded, array![[0.0, 0.0], [0.0, 1.0]]);
    }

    #[test]
    fn test_one_hot_unknown_error() {
        let fitted = OneHotEncoder::new()
            .with_handle_unknown(HandleUnknown::Error)
            .with_column("city")
            .fit(&strings(&["NY"]))
            .unwrap();
        let result = fitted.transform(&strings(&["SF"]));
        assert!(matches!(
            result,
            Err(PreprocessingError::TransformError { .. })
        ));
    }

    #[test]
    fn test_one_hot_feature_names() {
        let fitted = OneHotEncoder::new()
            .with_column("city")
            .fit(&strings(&["NY", "LA"]))
            .unwrap();
        assert_eq!(fitted.feature_names_out(), ["city_NY", "city_LA"]);
    }

    #[test]
    fn test_one_hot_empty_fit_fails() {
        assert!(OneHotEncoder::new().fit(&[]).is_err());
    }

    #[test]
    fn test_one_hot_empty_transform() {
        let fitted = OneHotEncoder::new().fit(&strings(&["x", "y"])).unwrap();
        let encoded = fitted.transform(&[]).unwrap();
        assert_eq!(encoded.dim(), (0, 2));
    }

    #[test]
    fn test_one_hot_params_roundtrip() {
        let fitted = OneHotEncoder::new()
            .with_column("c")
            .fit(&strings(&["b", "a"]))
            .unwrap();
        let restored = FittedOneHotEncoder::from_params(fitted.extract_params()).unwrap();
        assert_eq!(restored.categories(), fitted.categories());
        assert_eq!(
            restored.transform(&strings(&["a"])).unwrap(),
            fitted.transform(&strings(&["a"])).unwrap()
        );
    }
}
