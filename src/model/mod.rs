//! Classifiers fitted on transformed tables.
//!
//! Training and inference are separate types: [`LogisticRegression`] holds
//! hyperparameters only, and fitting it yields a [`FittedLogisticRegression`]
//! that carries the learned weights and class names and nothing else.
//!
//! # Example
//! ```rust
//! use ndarray::array;
//! use tabprep::model::{accuracy_score, LogisticRegression};
//!
//! let x = array![[-2.0], [-1.0], [1.0], [2.0]];
//! let y: Vec<String> = ["no", "no", "yes", "yes"].iter().map(|s| s.to_string()).collect();
//!
//! let model = LogisticRegression::new().learning_rate(0.5).fit(&x, &y).unwrap();
//! let predicted = model.predict(&x).unwrap();
//! assert_eq!(accuracy_score(&y, &predicted).unwrap(), 1.0);
//! ```

pub mod logistic;
pub mod metrics;

pub use logistic::{FittedLogisticRegression, LogisticRegression, LogisticRegressionParams};
pub use metrics::{accuracy_score, ClassMetrics, ClassificationReport};

/// Sort class names numerically when every name is a number, otherwise
/// lexicographically, and drop repeats.
pub(crate) fn sort_classes(classes: &mut Vec<String>) {
    let numeric: Option<Vec<f64>> = classes.iter().map(|c| c.parse::<f64>().ok()).collect();
    match numeric {
        Some(keys) if keys.iter().all(|k| k.is_finite()) => {
            let mut keyed: Vec<(f64, String)> = keys.into_iter().zip(classes.drain(..)).collect();
            keyed.sort_by(|a, b| a.0.total_cmp(&b.0).then_with(|| a.1.cmp(&b.1)));
            classes.extend(keyed.into_iter().map(|(_, c)| c));
        }
        _ => classes.sort(),
    }
    classes.dedup();
}
