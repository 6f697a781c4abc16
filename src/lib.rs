//! # tabprep
//!
//! Tabular preprocessing for a train/evaluate pipeline: split a raw CSV into
//! training and held-out tables, learn imputation, scaling and one-hot
//! vocabularies from the training table only, and apply them unchanged to
//! both tables so their transformed outputs share one fixed-width schema.
//! A linear classifier is then fitted on the transformed training table and
//! scored on the held-out one.
//!
//! ## Core Design Principles
//!
//! - **Fit learns, transform applies**: fitting produces an immutable
//!   parameter bundle; transforming never re-estimates a statistic.
//! - **Stable output schema**: the transformed held-out table has exactly the
//!   training table's columns, in the same order, whatever categories it holds.
//! - **Typed failures**: every error surfaces as a [`PreprocessingError`]
//!   variant at the call boundary.
//!
//! ## Quick Start
//!
//! ```rust
//! use tabprep::dataset::{Table, Value};
//! use tabprep::preprocessing::{
//!     infer, materialize, ColumnTransformer, FittedTransformer, Transformer,
//! };
//!
//! let train = Table::from_rows(
//!     vec!["age".into(), "city".into(), "label".into()],
//!     vec![
//!         vec![Value::Int(25), Value::from("NY"), Value::Int(1)],
//!         vec![Value::Missing, Value::from("LA"), Value::Int(0)],
//!         vec![Value::Int(40), Value::from("NY"), Value::Int(1)],
//!     ],
//! )
//! .unwrap();
//!
//! let partition = infer(&train).unwrap();
//! let fitted = ColumnTransformer::from_partition(&partition)
//!     .fit(&train)
//!     .unwrap();
//!
//! let names = fitted.feature_names_out();
//! assert_eq!(names, ["age", "city_NY", "city_LA"]);
//!
//! let out = materialize(&fitted.transform(&train).unwrap(), &names).unwrap();
//! assert_eq!(out.n_rows(), 3);
//! ```
//!
//! ## Module Structure
//!
//! - `dataset`: `Table` data model, CSV reading/writing, seeded splitting
//! - `preprocessing`: schema inference, per-column transformers, the column
//!   transformer and materialization
//! - `serialization`: byte encoding of fitted parameters
//! - `model`: logistic regression classifier and classification metrics
//! - `config`: artifact paths, split parameters and classifier hyperparameters
//! - `ingestion`: raw table to train/test files
//! - `transformation`: train/test files to transformed files
//! - `training`: transformed files to a fitted model and an evaluation report

pub mod config;
pub mod dataset;
pub mod ingestion;
pub mod model;
pub mod preprocessing;
pub mod serialization;
mod staging;
pub mod training;
pub mod transformation;

pub use config::{IngestionConfig, ModelTrainerConfig, PipelineConfig, TransformationConfig};
pub use dataset::{Column, ColumnType, Table, Value};
pub use ingestion::DataIngestion;
pub use preprocessing::PreprocessingError;
pub use serialization::SerializableParams;
pub use training::{ModelTrainer, TrainedModel};
pub use transformation::{DataTransformation, TransformedTables};
