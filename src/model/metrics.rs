//! Classification metrics over class-name labels.

use crate::model::sort_classes;
use crate::preprocessing::error::PreprocessingError;
use serde::{Deserialize, Serialize};
use std::fmt;

fn check_lengths(y_true: &[String], y_pred: &[String]) -> Result<(), PreprocessingError> {
    if y_true.len() != y_pred.len() {
        return Err(PreprocessingError::InvalidParameter(format!(
            "{} true labels but {} predictions",
            y_true.len(),
            y_pred.len()
        )));
    }
    if y_true.is_empty() {
        return Err(PreprocessingError::InvalidParameter(
            "no labels to score".to_string(),
        ));
    }
    Ok(())
}

/// Fraction of predictions equal to the true label.
pub fn accuracy_score(y_true: &[String], y_pred: &[String]) -> Result<f64, PreprocessingError> {
    check_lengths(y_true, y_pred)?;
    let correct = y_true.iter().zip(y_pred).filter(|(t, p)| t == p).count();
    Ok(correct as f64 / y_true.len() as f64)
}

fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 {
        0.0
    } else {
        num as f64 / den as f64
    }
}

/// Scores for one class. A ratio with a zero denominator is 0.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ClassMetrics {
    pub class: String,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    /// Number of rows whose true label is this class.
    pub support: usize,
}

/// Accuracy plus per-class precision, recall and F1.
///
/// Classes are every label seen in either the truth or the predictions,
/// sorted numerically when they are all numbers.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ClassificationReport {
    pub accuracy: f64,
    pub classes: Vec<ClassMetrics>,
}

impl ClassificationReport {
    pub fn new(y_true: &[String], y_pred: &[String]) -> Result<Self, PreprocessingError> {
        let accuracy = accuracy_score(y_true, y_pred)?;

        let mut names: Vec<String> = y_true.iter().chain(y_pred).cloned().collect();
        sort_classes(&mut names);

        let classes = names
            .into_iter()
            .map(|class| {
                let (mut tp, mut fp, mut fn_) = (0, 0, 0);
                for (t, p) in y_true.iter().zip(y_pred) {
                    match (*t == class, *p == class) {
                        (true, true) => tp += 1,
                        (false, true) => fp += 1,
                        (true, false) => fn_ += 1,
                        (false, false) => {}
                    }
                }
                let precision = ratio(tp, tp + fp);
                let recall = ratio(tp, tp + fn_);
                let f1 = if precision + recall > 0.0 {
                    2.0 * precision * recall / (precision + recall)
                } else {
                    0.0
                };
                ClassMetrics {
                    class,
                    precision,
                    recall,
                    f1,
                    support: tp + fn_,
                }
            })
            .collect();

        Ok(Self { accuracy, classes })
    }

    /// Total number of scored rows.
    pub fn support(&self) -> usize {
        self.classes.iter().map(|c| c.support).sum()
    }

    /// Unweighted mean of precision, recall and F1 over classes.
    pub fn macro_avg(&self) -> (f64, f64, f64) {
        let k = self.classes.len() as f64;
        let sum = self.classes.iter().fold((0.0, 0.0, 0.0), |acc, c| {
            (acc.0 + c.precision, acc.1 + c.recall, acc.2 + c.f1)
        });
        (sum.0 / k, sum.1 / k, sum.2 / k)
    }

    /// Support-weighted mean of precision, recall and F1 over classes.
    pub fn weighted_avg(&self) -> (f64, f64, f64) {
        let total = self.support() as f64;
        let sum = self.classes.iter().fold((0.0, 0.0, 0.0), |acc, c| {
            let w = c.support as f64;
            (acc.0 + w * c.precision, acc.1 + w * c.recall, acc.2 + w * c.f1)
        });
        (sum.0 / total, sum.1 / total, sum.2 / total)
    }
}

impl fmt::Display for ClassificationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self
            .classes
            .iter()
            .map(|c| c.class.len())
            .chain(std::iter::once("weighted avg".len()))
            .max()
            .unwrap_or(0);
        let support = self.support();

        writeln!(
            f,
            "{:>width$} {:>9} {:>9} {:>9} {:>9}",
            "", "precision", "recall", "f1-score", "support"
        )?;
        writeln!(f)?;
        for c in &self.classes {
            writeln!(
                f,
                "{:>width$} {:>9.2} {:>9.2} {:>9.2} {:>9}",
                c.class, c.precision, c.recall, c.f1, c.support
            )?;
        }
        writeln!(f)?;
        writeln!(
            f,
            "{:>width$} {:>9} {:>9} {:>9.2} {:>9}",
            "accuracy", "", "", self.accuracy, support
        )?;
        for (name, (p, r, f1)) in [
            ("macro avg", self.macro_avg()),
            ("weighted avg", self.weighted_avg()),
        ] {
            writeln!(
                f,
                "{:>width$} {:>9.2} {:>9.2} {:>9.2} {:>9}",
                name, p, r, f1, support
            )?;
        }
        Ok(())
    }
}
