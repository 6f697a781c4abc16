//! ColumnTransformer for applying per-column branches to a table.
//!
//! Numeric features go through impute-then-scale, categorical features
//! through impute-then-encode, and the outputs are concatenated into one
//! dense matrix.

#[allow(clippy::module_inception)]
mod column_transformer;

pub use column_transformer::{
    ColumnTransformer, ColumnTransformerParams, FittedColumnTransformer,
};
