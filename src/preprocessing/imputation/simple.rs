//! Simple Imputer.
//!
//! Imputation transformers for completing missing values in a single column.
//!
//! - [`SimpleImputer`] works on numeric columns (`Option<f64>` cells) and
//!   supports mean, median, most_frequent and constant strategies.
//! - [`CategoricalImputer`] works on categorical columns (`Option<String>`
//!   cells) and supports most_frequent and constant strategies.
//!
//! # Example
//! ```ignore
//! use tabprep::preprocessing::{Transformer, FittedTransformer, SimpleImputer, ImputeStrategy};
//!
//! let imputer = SimpleImputer::new(ImputeStrategy::Median).with_column("age");
//! let fitted = imputer.fit(&[Some(25.0), None, Some(40.0)])?;
//! assert_eq!(fitted.statistic(), 25.0);
//! let imputed = fitted.transform(&[None])?;
//! ```

use crate::preprocessing::error::PreprocessingError;
use crate::preprocessing::traits::{FittedTransformer, Transformer};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::hash::Hash;

/// Strategy for imputing missing numeric values.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub enum ImputeStrategy {
    /// Replace missing values with the mean of the column.
    Mean,
    /// Replace missing values with the median of the column.
    ///
    /// With an even number of observed values the lower middle value is used,
    /// so the statistic is always a value that was actually observed.
    #[default]
    Median,
    /// Replace missing values with the most frequent value of the column.
    MostFrequent,
    /// Replace missing values with a constant value.
    Constant(f64),
}

/// Strategy for imputing missing categorical values.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub enum CategoricalImputeStrategy {
    /// Replace missing values with the most frequent level.
    #[default]
    MostFrequent,
    /// Replace missing values with a fixed level.
    Constant(String),
}

/// Most frequent item; ties go to the item seen first.
fn most_frequent<T, I>(values: I) -> Option<T>
where
    T: Eq + Hash + Clone,
    I: IntoIterator<Item = T>,
{
    let mut counts: HashMap<T, usize> = HashMap::new();
    let mut order: Vec<T> = Vec::new();
    for value in values {
        let count = counts.entry(value.clone()).or_insert(0);
        if *count == 0 {
            order.push(value);
        }
        *count += 1;
    }

    let mut best: Option<(&T, usize)> = None;
    for value in &order {
        let count = counts[value];
        if best.map_or(true, |(_, c)| count > c) {
            best = Some((value, count));
        }
    }
    best.map(|(value, _)| value.clone())
}

/// Compute the fill value for a numeric column, ignoring missing cells.
fn compute_statistic(
    column: &str,
    data: &[Option<f64>],
    strategy: &ImputeStrategy,
) -> Result<f64, PreprocessingError> {
    if let ImputeStrategy::Constant(val) = strategy {
        return Ok(*val);
    }

    let observed: Vec<f64> = data
        .iter()
        .flatten()
        .copied()
        .filter(|v| !v.is_nan())
        .collect();

    if observed.is_empty() {
        return Err(PreprocessingError::fit(
            column,
            "every value is missing, no statistic can be computed",
        ));
    }

    let statistic = match strategy {
        ImputeStrategy::Mean => observed.iter().sum::<f64>() / observed.len() as f64,
        ImputeStrategy::Median => {
            let mut sorted = observed;
            sorted.sort_by(f64::total_cmp);
            sorted[(sorted.len() - 1) / 2]
        }
        ImputeStrategy::MostFrequent => most_frequent(observed.iter().map(|v| v.to_bits()))
            .map(f64::from_bits)
            .unwrap_or_default(),
        ImputeStrategy::Constant(val) => *val,
    };
    Ok(statistic)
}

/// Serializable parameters for a fitted SimpleImputer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SimpleImputerParams {
    /// Column the imputer was fitted on.
    pub column: String,
    /// Strategy used for imputation.
    pub strategy: ImputeStrategy,
    /// Fill value learned at fit time.
    pub statistic: f64,
}

/// SimpleImputer transformer (unfitted).
#[derive(Clone, Debug, Default)]
pub struct SimpleImputer {
    strategy: ImputeStrategy,
    column: String,
}

impl SimpleImputer {
    /// Create a new SimpleImputer with the specified strategy.
    pub fn new(strategy: ImputeStrategy) -> Self {
        Self {
            strategy,
            column: String::new(),
        }
    }

    /// Name the column this imputer serves; used in error messages.
    pub fn with_column(mut self, column: impl Into<String>) -> Self {
        self.column = column.into();
        self
    }

    pub fn strategy(&self) -> &ImputeStrategy {
        &self.strategy
    }
}

impl Transformer for SimpleImputer {
    type Input = [Option<f64>];
    type Output = Vec<f64>;
    type Params = SimpleImputerParams;
    type Fitted = FittedSimpleImputer;

    fn fit(&self, data: &Self::Input) -> Result<Self::Fitted, PreprocessingError> {
        if data.is_empty() {
            return Err(PreprocessingError::fit(
                &self.column,
                "cannot fit SimpleImputer on empty data",
            ));
        }

        let statistic = compute_statistic(&self.column, data, &self.strategy)?;

        Ok(FittedSimpleImputer {
            column: self.column.clone(),
            strategy: self.strategy.clone(),
            statistic,
        })
    }
}

/// Fitted SimpleImputer ready for inference.
#[derive(Clone, Debug)]
pub struct FittedSimpleImputer {
    column: String,
    strategy: ImputeStrategy,
    statistic: f64,
}

impl FittedSimpleImputer {
    /// The fill value learned at fit time.
    pub fn statistic(&self) -> f64 {
        self.statistic
    }
}

impl FittedTransformer for FittedSimpleImputer {
    type Input = [Option<f64>];
    type Output = Vec<f64>;
    type Params = SimpleImputerParams;

    fn transform(&self, data: &Self::Input) -> Result<Self::Output, PreprocessingError> {
        Ok(data
            .iter()
            .map(|v| match v {
                Some(x) if !x.is_nan() => *x,
                _ => self.statistic,
            })
            .collect())
    }

    fn extract_params(&self) -> Self::Params {
        SimpleImputerParams {
            column: self.column.clone(),
            strategy: self.strategy.clone(),
            statistic: self.statistic,
        }
    }

    fn from_params(params: Self::Params) -> Result<Self, PreprocessingError> {
        if !params.statistic.is_finite() {
            return Err(PreprocessingError::InvalidParameter(format!(
                "imputer statistic for '{}' must be finite",
                params.column
            )));
        }
        Ok(Self {
            column: params.column,
            strategy: params.strategy,
            statistic: params.statistic,
        })
    }

    fn n_features_out(&self) -> usize {
        1
    }
}

/// Serializable parameters for a fitted CategoricalImputer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CategoricalImputerParams {
    /// Column the imputer was fitted on.
    pub column: String,
    /// Strategy used for imputation.
    pub strategy: CategoricalImputeStrategy,
    /// Fill level learned at fit time (the mode for most_frequent).
    pub statistic: String,
}

/// Imputer for categorical columns (unfitted).
#[derive(Clone, Debug, Default)]
pub struct CategoricalImputer {
    strategy: CategoricalImputeStrategy,
    column: String,
}

impl CategoricalImputer {
    pub fn new(strategy: CategoricalImputeStrategy) -> Self {
        Self {
            strategy,
            column: String::new(),
        }
    }

    /// Name the column this imputer serves; used in error messages.
    pub fn with_column(mut self, column: impl Into<String>) -> Self {
        self.column = column.into();
        self
    }
}

impl Transformer for CategoricalImputer {
    type Input = [Option<String>];
    type Output = Vec<String>;
    type Params = CategoricalImputerParams;
    type Fitted = FittedCategoricalImputer;

    fn fit(&self, data: &Self::Input) -> Result<Self::Fitted, PreprocessingError> {
        let statistic = match &self.strategy {
            CategoricalImputeStrategy::Constant(level) => level.clone(),
            CategoricalImputeStrategy::MostFrequent => {
                most_frequent(data.iter().flatten()).cloned().ok_or_else(|| {
                    PreprocessingError::fit(&self.column, "no observed non-missing level")
                })?
            }
        };

        Ok(FittedCategoricalImputer {
            column: self.column.clone(),
            strategy: self.strategy.clone(),
            statistic,
        })
    }
}

/// Fitted CategoricalImputer ready for inference.
#[derive(Clone, Debug)]
pub struct FittedCategoricalImputer {
    column: String,
    strategy: CategoricalImputeStrategy,
    statistic: String,
}

impl FittedCategoricalImputer {
    /// The fill level learned at fit time.
    pub fn statistic(&self) -> &str {
        &self.statistic
    }
}

impl FittedTransformer for FittedCategoricalImputer {
    type Input = [Option<String>];
    type Output = Vec<String>;
    type Params = CategoricalImputerParams;

    fn transform(&self, data: &Self::Input) -> Result<Self::Output, PreprocessingError> {
        Ok(data
            .iter()
            .map(|v| v.clone().unwrap_or_else(|| self.statistic.clone()))
            .collect())
    }

    fn extract_params(&self) -> Self::Params {
        CategoricalImputerParams {
            column: self.column.clone(),
            strategy: self.strategy.clone(),
            statistic: self.statistic.clone(),
        }
    }

    fn from_params(params: Self::Params) -> Result<Self, PreprocessingError> {
        Ok(Self {
            column: params.column,
            strategy: params.strategy,
            statistic: params.statistic,
        })
    }

    fn n_features_out(&self) -> usize {
        1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn levels(values: &[Option<&str>]) -> Vec<Option<String>> {
        values.iter().map(|v| v.map(str::to_string)).collect()
    }

    #[test]
    fn test_median_odd_count() {
        let fitted = SimpleImputer::new(ImputeStrategy::Median)
            .fit(&[Some(3.0), Some(1.0), Some(2.0)])
            .unwrap();
        assert_eq!(fitted.statistic(), 2.0);
    }

    #[test]
    fn test_median_even_count_takes_lower_middle() {
        let fitted = SimpleImputer::new(ImputeStrategy::Median)
            .fit(&[Some(25.0), None, Some(40.0)])
            .unwrap();
        assert_eq!(fitted.statistic(), 25.0);
    }

    #[test]
    fn test_mean_ignores_missing() {
        let fitted = SimpleImputer::new(ImputeStrategy::Mean)
            .fit(&[Some(1.0), None, Some(3.0), Some(f64::NAN)])
            .unwrap();
        assert!((fitted.statistic() - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_most_frequent_numeric() {
        let fitted = SimpleImputer::new(ImputeStrategy::MostFrequent)
            .fit(&[Some(7.0), Some(3.0), Some(3.0), None])
            .unwrap();
        assert_eq!(fitted.statistic(), 3.0);
    }

    #[test]
    fn test_constant_strategy() {
        let fitted = SimpleImputer::new(ImputeStrategy::Constant(-1.0))
            .fit(&[None, None])
            .unwrap();
        assert_eq!(fitted.transform(&[None, Some(4.0)]).unwrap(), vec![-1.0, 4.0]);
    }

    #[test]
    fn test_transform_fills_missing_and_nan() {
        let fitted = SimpleImputer::new(ImputeStrategy::Median)
            .fit(&[Some(10.0), Some(20.0), Some(30.0)])
            .unwrap();
        let out = fitted.transform(&[None, Some(f64::NAN), Some(5.0)]).unwrap();
        assert_eq!(out, vec![20.0, 20.0, 5.0]);
    }

    #[test]
    fn test_all_missing_is_fit_error() {
        let result = SimpleImputer::new(ImputeStrategy::Median)
            .with_column("age")
            .fit(&[None, None]);
        match result {
            Err(PreprocessingError::FitError { column, .. }) => assert_eq!(column, "age"),
            other => panic!("expected FitError, got {:?}", other.map(|f| f.statistic())),
        }
    }

    #[test]
    fn test_empty_is_fit_error() {
        assert!(SimpleImputer::default().fit(&[]).is_err());
    }

    #[test]
    fn test_mode_tie_goes_to_first_seen() {
        let data = levels(&[Some("LA"), Some("NY"), None, Some("NY"), Some("LA")]);
        let fitted = CategoricalImputer::default().fit(&data).unwrap();
        assert_eq!(fitted.statistic(), "LA");
    }

    #[test]
    fn test_categorical_transform() {
        let train = levels(&[Some("NY"), Some("LA"), Some("NY")]);
        let fitted = CategoricalImputer::default().fit(&train).unwrap();
        let out = fitted.transform(&levels(&[None, Some("SF")])).unwrap();
        assert_eq!(out, vec!["NY".to_string(), "SF".to_string()]);
    }

    #[test]
    fn test_categorical_all_missing_is_fit_error() {
        let result = CategoricalImputer::default()
            .with_column("city")
            .fit(&levels(&[None, None]));
        assert!(matches!(result, Err(PreprocessingError::FitError { .. })));
    }

    #[test]
    fn test_params_roundtrip() {
        let fitted = SimpleImputer::new(ImputeStrategy::Median)
            .with_column("age")
            .fit(&[Some(1.0), Some(9.0), Some(5.0)])
            .unwrap();
        let restored = FittedSimpleImputer::from_params(fitted.extract_params()).unwrap();
        assert_eq!(restored.statistic(), 5.0);
        assert_eq!(restored.extract_params(), fitted.extract_params());
    }

    #[test]
    fn test_save_load_file() {
        let fitted = CategoricalImputer::default()
            .with_column("city")
            .fit(&levels(&[Some("NY"), Some("NY"), Some("LA")]))
            .unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("imputer.bin");
        fitted.save_to_file(&path).unwrap();

        let loaded = FittedCategoricalImputer::load_from_file(&path).unwrap();
        assert_eq!(loaded.statistic(), "NY");
    }
}
