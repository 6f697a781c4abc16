//! Multinomial logistic regression trained by mini-batch gradient descent.
//!
//! Forward pass: `softmax(X @ W + b)`.
//! Backward pass: with `G = (P - Y) / m` for a batch of `m` rows and one-hot
//! targets `Y`, `∇W = X^T · G + l2 · W` and `∇b = Σ_rows G`.
//!
//! Rows are visited in order and weights start at zero, so fitting the same
//! data twice gives the same model.

use crate::model::sort_classes;
use crate::preprocessing::error::PreprocessingError;
use crate::serialization::SerializableParams;
use ndarray::{s, Array1, Array2, Axis};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, trace};

/// Unfitted classifier: hyperparameters only.
///
/// Defaults:
/// - `learning_rate`: 0.1
/// - `max_epochs`: 200
/// - `batch_size`: 32
/// - `l2`: 0.0001
#[derive(Clone, Debug, PartialEq)]
pub struct LogisticRegression {
    learning_rate: f64,
    max_epochs: usize,
    batch_size: usize,
    l2: f64,
}

impl Default for LogisticRegression {
    fn default() -> Self {
        Self {
            learning_rate: 0.1,
            max_epochs: 200,
            batch_size: 32,
            l2: 1e-4,
        }
    }
}

impl LogisticRegression {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn learning_rate(mut self, learning_rate: f64) -> Self {
        self.learning_rate = learning_rate;
        self
    }

    pub fn max_epochs(mut self, epochs: usize) -> Self {
        self.max_epochs = epochs;
        self
    }

    pub fn batch_size(mut self, size: usize) -> Self {
        self.batch_size = size;
        self
    }

    /// L2 penalty on the weights (not the bias).
    pub fn l2(mut self, l2: f64) -> Self {
        self.l2 = l2;
        self
    }

    /// Check hyperparameter ranges.
    pub fn validate(&self) -> Result<(), PreprocessingError> {
        if !(self.learning_rate.is_finite() && self.learning_rate > 0.0) {
            return Err(PreprocessingError::InvalidParameter(format!(
                "learning_rate must be positive, got {}",
                self.learning_rate
            )));
        }
        if self.max_epochs == 0 || self.batch_size == 0 {
            return Err(PreprocessingError::InvalidParameter(
                "max_epochs and batch_size must be at least 1".to_string(),
            ));
        }
        if !(self.l2.is_finite() && self.l2 >= 0.0) {
            return Err(PreprocessingError::InvalidParameter(format!(
                "l2 must be non-negative, got {}",
                self.l2
            )));
        }
        Ok(())
    }

    /// Fit on feature rows `x` and one class name per row in `y`.
    ///
    /// # Errors
    /// `InvalidParameter` for bad hyperparameters, an empty `x`, or a `y`
    /// whose length differs from the number of rows.
    pub fn fit(
        &self,
        x: &Array2<f64>,
        y: &[String],
    ) -> Result<FittedLogisticRegression, PreprocessingError> {
        self.validate()?;
        let (n, d) = x.dim();
        if n == 0 {
            return Err(PreprocessingError::InvalidParameter(
                "cannot fit a classifier on zero rows".to_string(),
            ));
        }
        if y.len() != n {
            return Err(PreprocessingError::InvalidParameter(format!(
                "{} labels for {} rows",
                y.len(),
                n
            )));
        }

        let mut classes = y.to_vec();
        sort_classes(&mut classes);
        let index: HashMap<&str, usize> = classes
            .iter()
            .enumerate()
            .map(|(i, c)| (c.as_str(), i))
            .collect();
        let targets: Vec<usize> = y.iter().map(|c| index[c.as_str()]).collect();
        let k = classes.len();

        let mut weights = Array2::<f64>::zeros((d, k));
        let mut bias = Array1::<f64>::zeros(k);

        for epoch in 0..self.max_epochs {
            let mut total_loss = 0.0;
            for start in (0..n).step_by(self.batch_size) {
                let end = (start + self.batch_size).min(n);
                let batch_x = x.slice(s![start..end, ..]);
                let m = (end - start) as f64;

                let mut grad = softmax_rows(batch_x.dot(&weights) + &bias);
                for (i, &t) in targets[start..end].iter().enumerate() {
                    total_loss -= grad[[i, t]].max(f64::MIN_POSITIVE).ln();
                    grad[[i, t]] -= 1.0;
                }
                grad /= m;

                let mut grad_w = batch_x.t().dot(&grad);
                grad_w.scaled_add(self.l2, &weights);
                let grad_b = grad.sum_axis(Axis(0));

                weights.scaled_add(-self.learning_rate, &grad_w);
                bias.scaled_add(-self.learning_rate, &grad_b);
            }
            trace!(epoch, loss = total_loss / n as f64, "epoch done");
            if epoch + 1 == self.max_epochs {
                debug!(epochs = self.max_epochs, loss = total_loss / n as f64, "classifier fitted");
            }
        }

        Ok(FittedLogisticRegression {
            classes,
            weights,
            bias,
        })
    }
}

/// Row-wise softmax, shifted by each row's maximum.
fn softmax_rows(mut logits: Array2<f64>) -> Array2<f64> {
    for mut row in logits.rows_mut() {
        let max = row.fold(f64::NEG_INFINITY, |m, &v| m.max(v));
        row.mapv_inplace(|v| (v - max).exp());
        let sum = row.sum();
        row /= sum;
    }
    logits
}

/// Serializable parameters of a fitted classifier. Weights are stored
/// row-major, `n_features × classes.len()`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LogisticRegressionParams {
    pub classes: Vec<String>,
    pub n_features: usize,
    pub weights: Vec<f64>,
    pub bias: Vec<f64>,
}

/// Fitted classifier, inference only.
#[derive(Clone, Debug, PartialEq)]
pub struct FittedLogisticRegression {
    classes: Vec<String>,
    weights: Array2<f64>,
    bias: Array1<f64>,
}

impl FittedLogisticRegression {
    /// Class names, in the column order of [`Self::predict_proba`].
    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn n_features(&self) -> usize {
        self.weights.nrows()
    }

    /// Class probabilities, one row per input row.
    pub fn predict_proba(&self, x: &Array2<f64>) -> Result<Array2<f64>, PreprocessingError> {
        if x.ncols() != self.n_features() {
            return Err(PreprocessingError::InvalidParameter(format!(
                "classifier expects {} features, got {}",
                self.n_features(),
                x.ncols()
            )));
        }
        Ok(softmax_rows(x.dot(&self.weights) + &self.bias))
    }

    /// Most probable class per row. Ties go to the class listed first.
    pub fn predict(&self, x: &Array2<f64>) -> Result<Vec<String>, PreprocessingError> {
        let proba = self.predict_proba(x)?;
        Ok(proba
            .rows()
            .into_iter()
            .map(|row| {
                let best = row
                    .iter()
                    .enumerate()
                    .fold((0, f64::NEG_INFINITY), |best, (j, &p)| {
                        if p > best.1 {
                            (j, p)
                        } else {
                            best
                        }
                    })
                    .0;
                self.classes[best].clone()
            })
            .collect())
    }

    pub fn extract_params(&self) -> LogisticRegressionParams {
        LogisticRegressionParams {
            classes: self.classes.clone(),
            n_features: self.n_features(),
            weights: self.weights.iter().copied().collect(),
            bias: self.bias.to_vec(),
        }
    }

    pub fn from_params(params: LogisticRegressionParams) -> Result<Self, PreprocessingError> {
        let k = params.classes.len();
        if k == 0 || params.bias.len() != k {
            return Err(PreprocessingError::InvalidParameter(format!(
                "classifier has {} classes and {} biases",
                k,
                params.bias.len()
            )));
        }
        let weights = Array2::from_shape_vec((params.n_features, k), params.weights)
            .map_err(|e| PreprocessingError::InvalidParameter(format!("classifier weights: {}", e)))?;
        Ok(Self {
            classes: params.classes,
            weights,
            bias: Array1::from(params.bias),
        })
    }

    /// Save the fitted classifier to a file.
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), PreprocessingError> {
        std::fs::write(path, self.extract_params().to_bytes()?)?;
        Ok(())
    }

    /// Load a fitted classifier from a file.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, PreprocessingError> {
        let bytes = std::fs::read(path)?;
        Self::from_params(LogisticRegressionParams::from_bytes(&bytes)?)
    }
}
