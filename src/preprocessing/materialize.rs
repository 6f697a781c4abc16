//! Turning a transformed matrix back into a named [`Table`].

use crate::dataset::{Column, ColumnType, Table, Value};
use crate::preprocessing::error::PreprocessingError;
use ndarray::Array2;
use std::collections::HashSet;

/// Check that `matrix` is exactly `rows × cols`.
///
/// # Errors
/// Returns [`PreprocessingError::MaterializationError`] on any mismatch.
pub fn check_shape(
    matrix: &Array2<f64>,
    rows: usize,
    cols: usize,
) -> Result<(), PreprocessingError> {
    let (got_rows, got_cols) = matrix.dim();
    if (got_rows, got_cols) != (rows, cols) {
        return Err(PreprocessingError::MaterializationError {
            expected_rows: rows,
            expected_cols: cols,
            got_rows,
            got_cols,
        });
    }
    Ok(())
}

/// Make `names` unique. The first occurrence of a name keeps it; a later
/// repeat, or a name listed in `reserved`, takes the first free `<name>_<n>`
/// with `n` counting from 1.
///
/// ```rust
/// use tabprep::preprocessing::unique_names;
///
/// let names = unique_names(&["city_NY", "city_NY", "label"], &["label"]);
/// assert_eq!(names, ["city_NY", "city_NY_1", "label_1"]);
/// ```
pub fn unique_names<S: AsRef<str>>(names: &[S], reserved: &[&str]) -> Vec<String> {
    let mut taken: HashSet<String> = reserved.iter().map(|s| s.to_string()).collect();
    names
        .iter()
        .map(|name| {
            let name = name.as_ref();
            let mut candidate = name.to_string();
            let mut n = 1;
            while taken.contains(&candidate) {
                candidate = format!("{}_{}", name, n);
                n += 1;
            }
            taken.insert(candidate.clone());
            candidate
        })
        .collect()
}

/// Build a table with one float column per matrix column, named from
/// `output_column_names` in order. Repeated names are made unique with
/// [`unique_names`].
///
/// # Errors
/// Returns [`PreprocessingError::MaterializationError`] if the matrix width
/// differs from the number of names.
///
/// # Example
/// ```rust
/// use ndarray::array;
/// use tabprep::preprocessing::materialize;
///
/// let names = vec!["age".to_string(), "city_NY".to_string()];
/// let table = materialize(&array![[0.5, 1.0], [-0.5, 0.0]], &names).unwrap();
/// assert_eq!(table.n_rows(), 2);
/// assert_eq!(table.column_names(), ["age", "city_NY"]);
/// ```
pub fn materialize(
    matrix: &Array2<f64>,
    output_column_names: &[String],
) -> Result<Table, PreprocessingError> {
    check_shape(matrix, matrix.nrows(), output_column_names.len())?;

    let columns = unique_names(output_column_names, &[])
        .into_iter()
        .zip(matrix.columns())
        .map(|(name, values)| {
            Column::with_type(
                name,
                ColumnType::Float,
                values.iter().map(|&x| Value::Float(x)).collect(),
            )
        })
        .collect::<Result<Vec<_>, _>>()?;

    Table::new(columns)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn names(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_materialize_preserves_layout() {
        let matrix = array![[1.0, 0.0, 1.0], [2.0, 1.0, 0.0]];
        let table = materialize(&matrix, &names(&["age", "city_NY", "city_LA"])).unwrap();

        assert_eq!(table.n_rows(), 2);
        assert_eq!(table.column_names(), ["age", "city_NY", "city_LA"]);
        assert_eq!(table.column("age").unwrap().dtype(), ColumnType::Float);
        assert_eq!(table.row(1).unwrap()[0], &Value::Float(2.0));
    }

    #[test]
    fn test_materialize_width_mismatch() {
        let matrix = array![[1.0, 2.0]];
        match materialize(&matrix, &names(&["only"])) {
            Err(PreprocessingError::MaterializationError {
                expected_cols,
                got_cols,
                ..
            }) => {
                assert_eq!(expected_cols, 1);
                assert_eq!(got_cols, 2);
            }
            other => panic!("expected MaterializationError, got {:?}", other),
        }
    }

    #[test]
    fn test_materialize_zero_rows() {
        let matrix = Array2::<f64>::zeros((0, 2));
        let table = materialize(&matrix, &names(&["a", "b"])).unwrap();
        assert_eq!(table.n_rows(), 0);
        assert_eq!(table.n_cols(), 2);
    }

    #[test]
    fn test_materialize_repeated_names() {
        let matrix = array![[1.0, 2.0, 3.0]];
        let table = materialize(&matrix, &names(&["a_b", "a_b", "a_b_1"])).unwrap();
        assert_eq!(table.column_names(), ["a_b", "a_b_1", "a_b_1_1"]);
        assert_eq!(table.row(0).unwrap()[2], &Value::Float(3.0));
    }

    #[test]
    fn test_unique_names_leaves_distinct_names_alone() {
        let input = names(&["age", "city_NY", "city_LA"]);
        assert_eq!(unique_names(&input, &["label"]), input);
    }

    #[test]
    fn test_check_shape_rows() {
        let matrix = Array2::<f64>::zeros((3, 2));
        assert!(check_shape(&matrix, 3, 2).is_ok());
        assert!(matches!(
            check_shape(&matrix, 4, 2),
            Err(PreprocessingError::MaterializationError { got_rows: 3, .. })
        ));
    }
}
