//! Tabular data model shared by every pipeline stage.
//!
//! A [`Table`] is an ordered sequence of rows over a fixed set of named
//! columns. Storage is column-major: each [`Column`] carries its name, a
//! declared [`ColumnType`] and one [`Value`] per row. All columns of a table
//! have the same length.
//!
//! # Example
//!
//! ```rust
//! use tabprep::dataset::{ColumnType, Table, Value};
//!
//! let table = Table::from_rows(
//!     vec!["age".into(), "city".into(), "label".into()],
//!     vec![
//!         vec![Value::Int(25), Value::from("NY"), Value::Int(1)],
//!         vec![Value::Missing, Value::from("LA"), Value::Int(0)],
//!     ],
//! )
//! .unwrap();
//!
//! assert_eq!(table.n_rows(), 2);
//! assert_eq!(table.column("age").unwrap().dtype(), ColumnType::Integer);
//! assert_eq!(table.column("city").unwrap().dtype(), ColumnType::String);
//! ```

use crate::preprocessing::error::PreprocessingError;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

pub mod io;
pub mod split;

pub use self::io::{read_csv, read_csv_from, read_csv_with_types, write_csv, write_csv_to};
pub use self::split::train_test_split;

/// Declared type of a column.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ColumnType {
    /// Whole numbers.
    Integer,
    /// Floating-point numbers.
    Float,
    /// `true` / `false`.
    Boolean,
    /// Free text (or a mix of kinds that is not purely numeric).
    String,
    /// No value was observed, so no type could be resolved.
    Unknown,
}

impl ColumnType {
    /// Integer and floating-point columns are numeric; everything else is not.
    pub fn is_numeric(self) -> bool {
        matches!(self, ColumnType::Integer | ColumnType::Float)
    }

    /// Infer a column type from the values it holds.
    ///
    /// Missing values are ignored. A column with no present value is `Unknown`.
    pub fn infer<'a>(values: impl IntoIterator<Item = &'a Value>) -> ColumnType {
        let (mut ints, mut floats, mut bools, mut others) = (false, false, false, false);
        for value in values {
            match value {
                Value::Missing => {}
                Value::Float(x) if x.is_nan() => {}
                Value::Int(_) => ints = true,
                Value::Float(_) => floats = true,
                Value::Bool(_) => bools = true,
                Value::Str(_) => others = true,
            }
        }

        match (ints, floats, bools, others) {
            (false, false, false, false) => ColumnType::Unknown,
            (true, false, false, false) => ColumnType::Integer,
            (_, true, false, false) => ColumnType::Float,
            (false, false, true, false) => ColumnType::Boolean,
            _ => ColumnType::String,
        }
    }

    /// Whether a value of this kind may be stored in a column of `self` type.
    fn admits(self, value: &Value) -> bool {
        match (self, value) {
            (_, Value::Missing) => true,
            (ColumnType::Integer, Value::Int(_)) => true,
            (ColumnType::Float, Value::Int(_) | Value::Float(_)) => true,
            (ColumnType::Boolean, Value::Bool(_)) => true,
            (ColumnType::String, _) => true,
            (ColumnType::Unknown, Value::Float(x)) => x.is_nan(),
            _ => false,
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ColumnType::Integer => "integer",
            ColumnType::Float => "float",
            ColumnType::Boolean => "boolean",
            ColumnType::String => "string",
            ColumnType::Unknown => "unknown",
        };
        f.write_str(name)
    }
}

/// A single typed cell.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Value {
    /// Absent value.
    Missing,
    Int(i64),
    Float(f64),
    Bool(bool),
    Str(String),
}

impl Value {
    /// `Missing` and floating-point NaN both count as missing.
    pub fn is_missing(&self) -> bool {
        match self {
            Value::Missing => true,
            Value::Float(x) => x.is_nan(),
            _ => false,
        }
    }

    /// Numeric view of the value, if it has one.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(*i as f64),
            Value::Float(x) if !x.is_nan() => Some(*x),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Missing => Ok(()),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(x) if x.is_nan() => Ok(()),
            Value::Float(x) => f.write_str(&format_float(*x)),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Str(s) => f.write_str(s),
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Str(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Str(v)
    }
}

/// Shortest representation that parses back to the same `f64`.
pub fn format_float(x: f64) -> String {
    format!("{:?}", x)
}

/// A named, typed column of values.
#[derive(Clone, Debug, PartialEq)]
pub struct Column {
    name: String,
    dtype: ColumnType,
    values: Vec<Value>,
}

impl Column {
    /// Create a column, inferring its type from the values.
    pub fn new(name: impl Into<String>, values: Vec<Value>) -> Self {
        let dtype = ColumnType::infer(&values);
        Self {
            name: name.into(),
            dtype,
            values,
        }
    }

    /// Create a column with a declared type.
    ///
    /// # Errors
    /// Returns [`PreprocessingError::SchemaError`] if a present value does not fit `dtype`.
    pub fn with_type(
        name: impl Into<String>,
        dtype: ColumnType,
        values: Vec<Value>,
    ) -> Result<Self, PreprocessingError> {
        let name = name.into();
        if let Some((row, bad)) = values.iter().enumerate().find(|(_, v)| !dtype.admits(v)) {
            return Err(PreprocessingError::SchemaError(format!(
                "column '{}' declared {} but row {} holds {:?}",
                name, dtype, row, bad
            )));
        }
        Ok(Self {
            name,
            dtype,
            values,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn dtype(&self) -> ColumnType {
        self.dtype
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Number of missing cells.
    pub fn n_missing(&self) -> usize {
        self.values.iter().filter(|v| v.is_missing()).count()
    }

    fn take(&self, indices: &[usize]) -> Column {
        Column {
            name: self.name.clone(),
            dtype: self.dtype,
            values: indices.iter().map(|&i| self.values[i].clone()).collect(),
        }
    }
}

/// An ordered collection of equally long, uniquely named columns.
#[derive(Clone, Debug, PartialEq)]
pub struct Table {
    columns: Vec<Column>,
    n_rows: usize,
}

impl Table {
    /// Build a table from columns.
    ///
    /// # Errors
    /// Returns [`PreprocessingError::SchemaError`] if column lengths differ or a
    /// name is repeated.
    pub fn new(columns: Vec<Column>) -> Result<Self, PreprocessingError> {
        let n_rows = columns.first().map_or(0, Column::len);

        let mut seen = HashSet::with_capacity(columns.len());
        for column in &columns {
            if column.len() != n_rows {
                return Err(PreprocessingError::SchemaError(format!(
                    "column '{}' has {} rows, expected {}",
                    column.name,
                    column.len(),
                    n_rows
                )));
            }
            if !seen.insert(column.name.as_str()) {
                return Err(PreprocessingError::SchemaError(format!(
                    "duplicate column name '{}'",
                    column.name
                )));
            }
        }

        Ok(Self { columns, n_rows })
    }

    /// Build a table from row-major data, inferring each column's type.
    pub fn from_rows(names: Vec<String>, rows: Vec<Vec<Value>>) -> Result<Self, PreprocessingError> {
        let mut buffers: Vec<Vec<Value>> = vec![Vec::with_capacity(rows.len()); names.len()];
        for (i, row) in rows.into_iter().enumerate() {
            if row.len() != names.len() {
                return Err(PreprocessingError::SchemaError(format!(
                    "row {} has {} values, expected {}",
                    i,
                    row.len(),
                    names.len()
                )));
            }
            for (buffer, value) in buffers.iter_mut().zip(row) {
                buffer.push(value);
            }
        }

        let columns = names
            .into_iter()
            .zip(buffers)
            .map(|(name, values)| Column::new(name, values))
            .collect();
        Self::new(columns)
    }

    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    pub fn n_cols(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.n_rows == 0
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(Column::name).collect()
    }

    /// Look up a column by name.
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Column names paired with their declared types, in table order.
    pub fn schema(&self) -> Vec<(String, ColumnType)> {
        self.columns
            .iter()
            .map(|c| (c.name.clone(), c.dtype))
            .collect()
    }

    /// The values of row `index`, in column order.
    pub fn row(&self, index: usize) -> Option<Vec<&Value>> {
        (index < self.n_rows).then(|| self.columns.iter().map(|c| &c.values[index]).collect())
    }

    /// Append a column at the end of the table.
    pub fn push_column(&mut self, column: Column) -> Result<(), PreprocessingError> {
        if !self.columns.is_empty() && column.len() != self.n_rows {
            return Err(PreprocessingError::SchemaError(format!(
                "column '{}' has {} rows, expected {}",
                column.name,
                column.len(),
                self.n_rows
            )));
        }
        if self.column(&column.name).is_some() {
            return Err(PreprocessingError::SchemaError(format!(
                "duplicate column name '{}'",
                column.name
            )));
        }
        self.n_rows = column.len();
        self.columns.push(column);
        Ok(())
    }

    /// New table with the rows at `indices`, in that order. Declared types are kept.
    ///
    /// # Panics
    /// Panics if an index is out of bounds.
    pub fn take_rows(&self, indices: &[usize]) -> Table {
        Table {
            columns: self.columns.iter().map(|c| c.take(indices)).collect(),
            n_rows: indices.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Table {
        Table::from_rows(
            vec!["age".into(), "city".into(), "label".into()],
            vec![
                vec![Value::Int(25), "NY".into(), Value::Int(1)],
                vec![Value::Missing, "LA".into(), Value::Int(0)],
                vec![Value::Int(40), "NY".into(), Value::Int(1)],
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_infer_column_types() {
        let ints = [Value::Int(1), Value::Missing, Value::Int(3)];
        assert_eq!(ColumnType::infer(&ints), ColumnType::Integer);

        let mixed_numeric = [Value::Int(1), Value::Float(2.5)];
        assert_eq!(ColumnType::infer(&mixed_numeric), ColumnType::Float);

        let bools = [Value::Bool(true), Value::Bool(false)];
        assert_eq!(ColumnType::infer(&bools), ColumnType::Boolean);

        let mixed = [Value::Int(1), Value::from("x")];
        assert_eq!(ColumnType::infer(&mixed), ColumnType::String);

        let empty = [Value::Missing, Value::Float(f64::NAN)];
        assert_eq!(ColumnType::infer(&empty), ColumnType::Unknown);
    }

    #[test]
    fn test_table_from_rows() {
        let table = sample();
        assert_eq!(table.n_rows(), 3);
        assert_eq!(table.n_cols(), 3);
        assert_eq!(table.column_names(), vec!["age", "city", "label"]);
        assert_eq!(table.column("age").unwrap().n_missing(), 1);
        assert_eq!(table.row(1).unwrap()[1], &Value::from("LA"));
        assert!(table.row(3).is_none());
    }

    #[test]
    fn test_table_rejects_ragged_rows() {
        let result = Table::from_rows(
            vec!["a".into(), "b".into()],
            vec![vec![Value::Int(1), Value::Int(2)], vec![Value::Int(3)]],
        );
        assert!(matches!(result, Err(PreprocessingError::SchemaError(_))));
    }

    #[test]
    fn test_table_rejects_duplicate_names() {
        let a = Column::new("x", vec![Value::Int(1)]);
        let b = Column::new("x", vec![Value::Int(2)]);
        assert!(Table::new(vec![a, b]).is_err());
    }

    #[test]
    fn test_with_type_rejects_incompatible_value() {
        let result = Column::with_type("n", ColumnType::Integer, vec![Value::from("abc")]);
        assert!(matches!(result, Err(PreprocessingError::SchemaError(_))));

        let widened = Column::with_type("n", ColumnType::Float, vec![Value::Int(2)]).unwrap();
        assert_eq!(widened.dtype(), ColumnType::Float);
    }

    #[test]
    fn test_take_rows_keeps_types() {
        let table = sample();
        let subset = table.take_rows(&[2, 0]);
        assert_eq!(subset.n_rows(), 2);
        assert_eq!(subset.column("age").unwrap().values()[0], Value::Int(40));
        assert_eq!(subset.schema(), table.schema());
    }

    #[test]
    fn test_push_column_checks_length() {
        let mut table = sample();
        let short = Column::new("extra", vec![Value::Int(1)]);
        assert!(table.push_column(short).is_err());

        let ok = Column::new("extra", vec![Value::Int(1), Value::Int(2), Value::Int(3)]);
        table.push_column(ok).unwrap();
        assert_eq!(table.n_cols(), 4);
    }

    #[test]
    fn test_value_display() {
        assert_eq!(Value::Float(30.0).to_string(), "30.0");
        assert_eq!(Value::Float(0.1).to_string(), "0.1");
        assert_eq!(Value::Int(-3).to_string(), "-3");
        assert_eq!(Value::Missing.to_string(), "");
        assert_eq!(Value::Bool(true).to_string(), "true");
    }
}
