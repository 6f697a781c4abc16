//! Standard Scaler (Z-score normalization).
//!
//! Transforms a column by removing the mean and scaling to unit variance.
//!
//! The standard score of a sample `x` is calculated as:
//! ```text
//! z = (x - u) / s
//! ```
//! where `u` is the mean of the training samples, and `s` is the population
//! standard deviation (ddof = 0). A constant column has `s = 0`, which is
//! replaced by 1 so the column is only centered.
//!
//! # Example
//! ```ignore
//! use tabprep::preprocessing::{Transformer, FittedTransformer, StandardScaler};
//!
//! let scaler = StandardScaler::new()
//!     .with_mean(true)
//!     .with_std(true);
//!
//! let fitted = scaler.fit(&[25.0, 25.0, 40.0])?;
//! let scaled = fitted.transform(&[30.0])?;
//! ```

use crate::preprocessing::error::PreprocessingError;
use crate::preprocessing::traits::{FittedTransformer, Transformer};
use serde::{Deserialize, Serialize};

/// Configuration for StandardScaler.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StandardScalerConfig {
    /// If true, center the data before scaling.
    pub with_mean: bool,
    /// If true, scale the data to unit variance.
    pub with_std: bool,
}

impl Default for StandardScalerConfig {
    fn default() -> Self {
        Self {
            with_mean: true,
            with_std: true,
        }
    }
}

/// Serializable parameters for a fitted StandardScaler.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StandardScalerParams {
    /// Configuration options.
    pub config: StandardScalerConfig,
    /// Mean of the column (0 if with_mean=false).
    pub mean: f64,
    /// Standard deviation of the column (1 if with_std=false or the column is constant).
    pub std: f64,
}

/// StandardScaler transformer (unfitted).
#[derive(Clone, Debug, Default)]
pub struct StandardScaler {
    config: StandardScalerConfig,
}

impl StandardScaler {
    /// Create a new StandardScaler with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set whether to center data by mean.
    pub fn with_mean(mut self, with_mean: bool) -> Self {
        self.config.with_mean = with_mean;
        self
    }

    /// Set whether to scale data to unit variance.
    pub fn with_std(mut self, with_std: bool) -> Self {
        self.config.with_std = with_std;
        self
    }
}

impl Transformer for StandardScaler {
    type Input = [f64];
    type Output = Vec<f64>;
    type Params = StandardScalerParams;
    type Fitted = FittedStandardScaler;

    fn fit(&self, data: &Self::Input) -> Result<Self::Fitted, PreprocessingError> {
        if data.is_empty() {
            return Err(PreprocessingError::InvalidParameter(
                "Cannot fit StandardScaler on empty data".to_string(),
            ));
        }
        if let Some(bad) = data.iter().find(|v| !v.is_finite()) {
            return Err(PreprocessingError::InvalidParameter(format!(
                "StandardScaler expects finite values, got {}",
                bad
            )));
        }

        let n = data.len() as f64;
        let sample_mean = data.iter().sum::<f64>() / n;

        let mean = if self.config.with_mean {
            sample_mean
        } else {
            0.0
        };

        let std = if self.config.with_std {
            let variance = data.iter().map(|x| (x - sample_mean).powi(2)).sum::<f64>() / n;
            variance.sqrt()
        } else {
            1.0
        };

        // Handle zero std (constant features)
        let std = if std == 0.0 { 1.0 } else { std };

        Ok(FittedStandardScaler {
            config: self.config.clone(),
            mean,
            std,
        })
    }
}

/// Fitted StandardScaler ready for inference.
#[derive(Clone, Debug)]
pub struct FittedStandardScaler {
    config: StandardScalerConfig,
    mean: f64,
    std: f64,
}

impl FittedStandardScaler {
    /// The fit-time mean.
    pub fn mean(&self) -> f64 {
        self.mean
    }

    /// The fit-time standard deviation (never 0).
    pub fn std(&self) -> f64 {
        self.std
    }

    /// Scale a single value.
    pub fn scale(&self, x: f64) -> f64 {
        (x - self.mean) / self.std
    }
}

impl FittedTransformer for FittedStandardScaler {
    type Input = [f64];
    type Output = Vec<f64>;
    type Params = StandardScalerParams;

    fn transform(&self, data: &Self::Input) -> Result<Self::Output, PreprocessingError> {
        Ok(data.iter().map(|&x| self.scale(x)).collect())
    }

    fn extract_params(&self) -> Self::Params {
        StandardScalerParams {
            config: self.config.clone(),
            mean: self.mean,
            std: self.std,
        }
    }

    fn from_params(params: Self::Params) -> Result<Self, PreprocessingError> {
        if !(params.std.is_finite() && params.std != 0.0) || !params.mean.is_finite() {
            return Err(PreprocessingError::InvalidParameter(format!(
                "invalid scaler parameters: mean={}, std={}",
                params.mean, params.std
            )));
        }
        Ok(Self {
            config: params.config,
            mean: params.mean,
            std: params.std,
        })
    }

    fn n_features_out(&self) -> usize {
        1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_scaler_fit() {
        let fitted = StandardScaler::new().fit(&[25.0, 25.0, 40.0]).unwrap();
        assert!((fitted.mean() - 30.0).abs() < 1e-12);
        assert!((fitted.std() - 50.0f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_standard_scaler_transform() {
        let data = [0.0, 0.0, 1.0, 3.0];
        let scaled = StandardScaler::new().fit_transform(&data).unwrap();

        let mean = scaled.iter().sum::<f64>() / scaled.len() as f64;
        let var = scaled.iter().map(|z| (z - mean).powi(2)).sum::<f64>() / scaled.len() as f64;
        assert!(mean.abs() < 1e-12, "mean = {}", mean);
        assert!((var - 1.0).abs() < 1e-12, "var = {}", var);
    }

    #[test]
    fn test_standard_scaler_constant_feature() {
        let fitted = StandardScaler::new().fit(&[5.0, 5.0, 5.0]).unwrap();
        assert_eq!(fitted.std(), 1.0);
        assert_eq!(fitted.mean(), 5.0);
        assert_eq!(fitted.transform(&[5.0, 7.0]).unwrap(), vec![0.0, 2.0]);
    }

    #[test]
    fn test_standard_scaler_without_mean() {
        let fitted = StandardScaler::new().with_mean(false).fit(&[1.0, 3.0]).unwrap();
        assert_eq!(fitted.mean(), 0.0);
        assert_eq!(fitted.std(), 1.0);
    }

    #[test]
    fn test_standard_scaler_without_std() {
        let fitted = StandardScaler::new().with_std(false).fit(&[1.0, 3.0]).unwrap();
        assert_eq!(fitted.std(), 1.0);
        assert_eq!(fitted.transform(&[2.0]).unwrap(), vec![0.0]);
    }

    #[test]
    fn test_standard_scaler_empty_data() {
        assert!(StandardScaler::new().fit(&[]).is_err());
    }

    #[test]
    fn test_standard_scaler_rejects_nan() {
        assert!(StandardScaler::new().fit(&[1.0, f64::NAN]).is_err());
    }

    #[test]
    fn test_standard_scaler_serialization() {
        let fitted = StandardScaler::new().fit(&[1.0, 2.0, 6.0]).unwrap();
        let restored = FittedStandardScaler::from_params(fitted.extract_params()).unwrap();

        let a = fitted.transform(&[0.5, 3.0]).unwrap();
        let b = restored.transform(&[0.5, 3.0]).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_from_params_rejects_zero_std() {
        let params = StandardScalerParams {
            config: StandardScalerConfig::default(),
            mean: 0.0,
            std: 0.0,
        };
        assert!(FittedStandardScaler::from_params(params).is_err());
    }
}
