//! Feature partitioning from a training table's column types.
//!
//! The last column is the label. Every other column lands in exactly one of
//! two feature sets: numeric (integer or floating-point) or categorical
//! (anything else). Both sets keep the table's column order, which fixes the
//! output column order of everything built on top of the partition.

use crate::dataset::{ColumnType, Table};
use crate::preprocessing::error::PreprocessingError;
use serde::{Deserialize, Serialize};

/// Numeric and categorical feature columns, plus the excluded label.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeaturePartition {
    numeric: Vec<String>,
    categorical: Vec<String>,
    label: String,
}

impl FeaturePartition {
    /// Build a partition directly.
    ///
    /// # Errors
    /// Returns [`PreprocessingError::SchemaError`] if a name appears twice or
    /// the label is also listed as a feature.
    pub fn new(
        numeric: Vec<String>,
        categorical: Vec<String>,
        label: impl Into<String>,
    ) -> Result<Self, PreprocessingError> {
        let label = label.into();
        let mut seen = std::collections::HashSet::new();
        for name in numeric.iter().chain(&categorical).chain(std::iter::once(&label)) {
            if !seen.insert(name.as_str()) {
                return Err(PreprocessingError::SchemaError(format!(
                    "column '{}' assigned more than once",
                    name
                )));
            }
        }
        Ok(Self {
            numeric,
            categorical,
            label,
        })
    }

    pub fn numeric(&self) -> &[String] {
        &self.numeric
    }

    pub fn categorical(&self) -> &[String] {
        &self.categorical
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// All feature columns: numeric first, then categorical.
    pub fn features(&self) -> impl Iterator<Item = &str> {
        self.numeric
            .iter()
            .chain(&self.categorical)
            .map(String::as_str)
    }

    pub fn n_features(&self) -> usize {
        self.numeric.len() + self.categorical.len()
    }
}

/// Partition the columns of a training table into numeric and categorical features.
///
/// # Errors
/// Returns [`PreprocessingError::SchemaError`] if the table has no rows, fewer
/// than two columns, or any column whose type could not be resolved.
///
/// # Example
/// ```rust
/// use tabprep::dataset::{Table, Value};
/// use tabprep::preprocessing::infer;
///
/// let table = Table::from_rows(
///     vec!["age".into(), "city".into(), "label".into()],
///     vec![vec![Value::Int(25), Value::from("NY"), Value::Int(1)]],
/// )
/// .unwrap();
///
/// let partition = infer(&table).unwrap();
/// assert_eq!(partition.numeric(), ["age"]);
/// assert_eq!(partition.categorical(), ["city"]);
/// assert_eq!(partition.label(), "label");
/// ```
pub fn infer(table: &Table) -> Result<FeaturePartition, PreprocessingError> {
    if table.n_cols() < 2 {
        return Err(PreprocessingError::SchemaError(format!(
            "need at least one feature column besides the label, got {} column(s)",
            table.n_cols()
        )));
    }
    if table.is_empty() {
        return Err(PreprocessingError::SchemaError(
            "cannot infer a schema from a table with no rows".to_string(),
        ));
    }

    if let Some(column) = table
        .columns()
        .iter()
        .find(|c| c.dtype() == ColumnType::Unknown)
    {
        return Err(PreprocessingError::SchemaError(format!(
            "column '{}' has no resolvable type",
            column.name()
        )));
    }

    let (features, label) = table.columns().split_at(table.n_cols() - 1);
    let (numeric, categorical): (Vec<_>, Vec<_>) =
        features.iter().partition(|c| c.dtype().is_numeric());

    FeaturePartition::new(
        numeric.iter().map(|c| c.name().to_string()).collect(),
        categorical.iter().map(|c| c.name().to_string()).collect(),
        label[0].name(),
    )
}
