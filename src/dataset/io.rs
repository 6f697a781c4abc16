//! Delimited-file reading and writing for [`Table`].
//!
//! The first record is the header row naming the columns; every following
//! record is one row. Column types are inferred from the cells unless a type
//! hint is supplied, in which case hinted columns are coerced to the hinted
//! type. Reading the held-out split with the training split's schema as the
//! hint keeps both tables in agreement on every shared column.

use super::{Column, ColumnType, Table, Value};
use crate::preprocessing::error::PreprocessingError;
use csv::{ReaderBuilder, WriterBuilder};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

/// Cell contents treated as a missing value.
const MISSING_TOKENS: &[&str] = &["", "NA", "N/A", "NaN", "nan", "null", "NULL", "None"];

pub(crate) fn is_missing_token(cell: &str) -> bool {
    MISSING_TOKENS.contains(&cell.trim())
}

fn parse_bool(cell: &str) -> Option<bool> {
    let cell = cell.trim();
    if cell.eq_ignore_ascii_case("true") {
        Some(true)
    } else if cell.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

fn parse_number(cell: &str) -> Option<Value> {
    let cell = cell.trim();
    if let Ok(i) = cell.parse::<i64>() {
        return Some(Value::Int(i));
    }
    cell.parse::<f64>().ok().map(Value::Float)
}

/// Decide a column type from raw cells.
fn infer_cells(cells: &[String]) -> ColumnType {
    let mut dtype = ColumnType::Unknown;
    for cell in cells.iter().filter(|c| !is_missing_token(c)) {
        let cell_type = match parse_number(cell) {
            Some(Value::Int(_)) => ColumnType::Integer,
            Some(_) => ColumnType::Float,
            None if parse_bool(cell).is_some() => ColumnType::Boolean,
            None => return ColumnType::String,
        };
        dtype = match (dtype, cell_type) {
            (ColumnType::Unknown, t) => t,
            (a, b) if a == b => a,
            (a, b) if a.is_numeric() && b.is_numeric() => ColumnType::Float,
            _ => return ColumnType::String,
        };
    }
    dtype
}

/// Convert raw cells into a column of the given type.
fn build_column(
    name: &str,
    dtype: ColumnType,
    cells: Vec<String>,
) -> Result<Column, PreprocessingError> {
    let mut values = Vec::with_capacity(cells.len());
    for (row, cell) in cells.into_iter().enumerate() {
        if is_missing_token(&cell) {
            values.push(Value::Missing);
            continue;
        }
        let value = match dtype {
            ColumnType::Integer | ColumnType::Float => parse_number(&cell).ok_or_else(|| {
                PreprocessingError::SchemaError(format!(
                    "column '{}' row {}: expected a {} value, got '{}'",
                    name, row, dtype, cell
                ))
            })?,
            ColumnType::Boolean => parse_bool(&cell).map_or(Value::Str(cell), Value::Bool),
            ColumnType::String | ColumnType::Unknown => Value::Str(cell),
        };
        values.push(value);
    }

    // A hinted Integer column may still receive fractional cells, and a hinted
    // Boolean column free text; narrow the declared type to what is present.
    let dtype = match (dtype, ColumnType::infer(&values)) {
        (declared, ColumnType::Unknown) => declared,
        (ColumnType::Integer, ColumnType::Float) => ColumnType::Float,
        (ColumnType::Boolean, ColumnType::String) => ColumnType::String,
        (declared, _) => declared,
    };
    Column::with_type(name, dtype, values)
}

/// Read a table from any reader, optionally coercing columns to hinted types.
pub fn read_csv_from<R: Read>(
    reader: R,
    hint: Option<&[(String, ColumnType)]>,
) -> Result<Table, PreprocessingError> {
    let mut rdr = ReaderBuilder::new().has_headers(true).from_reader(reader);

    let headers: Vec<String> = rdr.headers()?.iter().map(str::to_string).collect();
    let mut cells: Vec<Vec<String>> = vec![Vec::new(); headers.len()];

    for result in rdr.records() {
        let record = result?;
        if record.len() != headers.len() {
            return Err(PreprocessingError::SchemaError(format!(
                "record has {} fields, header has {}",
                record.len(),
                headers.len()
            )));
        }
        for (buffer, field) in cells.iter_mut().zip(record.iter()) {
            buffer.push(field.to_string());
        }
    }

    let hinted: HashMap<&str, ColumnType> = hint
        .unwrap_or_default()
        .iter()
        .map(|(name, dtype)| (name.as_str(), *dtype))
        .collect();

    let columns = headers
        .iter()
        .zip(cells)
        .map(|(name, column_cells)| {
            let dtype = match hinted.get(name.as_str()) {
                Some(&t) if t != ColumnType::Unknown => t,
                _ => infer_cells(&column_cells),
            };
            build_column(name, dtype, column_cells)
        })
        .collect::<Result<Vec<_>, _>>()?;

    Table::new(columns)
}

/// Read a table from a CSV file, inferring column types.
pub fn read_csv<P: AsRef<Path>>(path: P) -> Result<Table, PreprocessingError> {
    let file = File::open(path)?;
    read_csv_from(BufReader::new(file), None)
}

/// Read a table from a CSV file, coercing columns named in `hint` to their hinted type.
pub fn read_csv_with_types<P: AsRef<Path>>(
    path: P,
    hint: &[(String, ColumnType)],
) -> Result<Table, PreprocessingError> {
    let file = File::open(path)?;
    read_csv_from(BufReader::new(file), Some(hint))
}

/// Write a table as CSV (header row first) to any writer.
pub fn write_csv_to<W: Write>(table: &Table, writer: W) -> Result<(), PreprocessingError> {
    let mut wtr = WriterBuilder::new().from_writer(writer);

    wtr.write_record(table.column_names())?;
    for row in 0..table.n_rows() {
        wtr.write_record(table.columns().iter().map(|c| c.values()[row].to_string()))?;
    }
    wtr.flush()?;
    Ok(())
}

/// Write a table to a CSV file.
pub fn write_csv<P: AsRef<Path>>(table: &Table, path: P) -> Result<(), PreprocessingError> {
    let file = File::create(path)?;
    write_csv_to(table, BufWriter::new(file))
}

#[cfg(test)]
mod tests {
    use super::*;

    const TRAIN: &str = "age,city,member,label\n25,NY,true,1\n,LA,false,0\n40,NY,TRUE,1\n";

    #[test]
    fn test_read_infers_types() {
        let table = read_csv_from(TRAIN.as_bytes(), None).unwrap();
        assert_eq!(table.n_rows(), 3);
        assert_eq!(
            table.schema(),
            vec![
                ("age".to_string(), ColumnType::Integer),
                ("city".to_string(), ColumnType::String),
                ("member".to_string(), ColumnType::Boolean),
                ("label".to_string(), ColumnType::Integer),
            ]
        );
        assert_eq!(table.column("age").unwrap().values()[1], Value::Missing);
    }

    #[test]
    fn test_read_int_and_float_widen_to_float() {
        let table = read_csv_from("x\n1\n2.5\nNA\n".as_bytes(), None).unwrap();
        let col = table.column("x").unwrap();
        assert_eq!(col.dtype(), ColumnType::Float);
        assert_eq!(col.values()[0], Value::Int(1));
        assert!(col.values()[2].is_missing());
    }

    #[test]
    fn test_all_missing_column_is_unknown() {
        let table = read_csv_from("x,y\n,1\nNA,2\n".as_bytes(), None).unwrap();
        assert_eq!(table.column("x").unwrap().dtype(), ColumnType::Unknown);
    }

    #[test]
    fn test_hint_keeps_categorical_text() {
        // "7" would infer as Integer on its own; the hint keeps it categorical.
        let hint = vec![("code".to_string(), ColumnType::String)];
        let table = read_csv_from("code\n7\n".as_bytes(), Some(&hint)).unwrap();
        let col = table.column("code").unwrap();
        assert_eq!(col.dtype(), ColumnType::String);
        assert_eq!(col.values()[0], Value::from("7"));
    }

    #[test]
    fn test_hint_all_missing_keeps_declared_type() {
        let hint = vec![("age".to_string(), ColumnType::Integer)];
        let table = read_csv_from("age\n\n".as_bytes(), Some(&hint)).unwrap();
        assert_eq!(table.column("age").unwrap().dtype(), ColumnType::Integer);
    }

    #[test]
    fn test_hint_rejects_text_in_numeric_column() {
        let hint = vec![("age".to_string(), ColumnType::Integer)];
        let result = read_csv_from("age\nabc\n".as_bytes(), Some(&hint));
        assert!(matches!(result, Err(PreprocessingError::SchemaError(_))));
    }

    #[test]
    fn test_ragged_record_fails() {
        let result = read_csv_from("a,b\n1\n".as_bytes(), None);
        assert!(result.is_err());
    }

    #[test]
    fn test_write_then_read_preserves_cells() {
        let table = read_csv_from(TRAIN.as_bytes(), None).unwrap();
        let mut buffer = Vec::new();
        write_csv_to(&table, &mut buffer).unwrap();

        let text = String::from_utf8(buffer).unwrap();
        assert!(text.starts_with("age,city,member,label\n"));
        assert!(text.contains("\n,LA,false,0\n"));

        let reread = read_csv_from(text.as_bytes(), None).unwrap();
        assert_eq!(reread.schema(), table.schema());
        assert_eq!(reread.n_rows(), 3);
    }

    #[test]
    fn test_file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("t.csv");
        let table = read_csv_from(TRAIN.as_bytes(), None).unwrap();
        write_csv(&table, &path).unwrap();
        let loaded = read_csv(&path).unwrap();
        assert_eq!(loaded.column_names(), table.column_names());
    }
}
