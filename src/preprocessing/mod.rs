//! Column-wise preprocessing for mixed-type tables.
//!
//! Transformers follow a two-phase design: an unfitted transformer holds only
//! hyperparameters, and fitting it produces an immutable fitted transformer
//! that applies the learned statistics to any number of tables without ever
//! re-estimating them.
//!
//! # Core Traits
//!
//! - [`Transformer`]: Unfitted transformer with hyperparameters
//! - [`FittedTransformer`]: Fitted transformer ready for inference
//!
//! # Stages
//!
//! 1. [`infer`] partitions a training table into numeric and categorical
//!    features (the last column is the label).
//! 2. [`ColumnTransformer::from_partition`] wires one branch per feature:
//!    [`NumericPipeline`] (median imputation, standardization) or
//!    [`CategoricalPipeline`] (most-frequent imputation, one-hot encoding).
//! 3. [`Transformer::fit`] learns every statistic from the training table;
//!    [`FittedTransformer::transform`] turns any table with the same feature
//!    columns into a dense matrix of fixed width.
//! 4. [`materialize`] names the matrix columns and returns a [`Table`](crate::dataset::Table).
//!
//! # Example
//!
//! ```ignore
//! use tabprep::preprocessing::{
//!     infer, materialize, ColumnTransformer, FittedTransformer, Transformer,
//! };
//!
//! let partition = infer(&train)?;
//! let fitted = ColumnTransformer::from_partition(&partition).fit(&train)?;
//!
//! let names = fitted.feature_names_out();
//! let train_out = materialize(&fitted.transform(&train)?, &names)?;
//! let test_out = materialize(&fitted.transform(&test)?, &names)?;
//!
//! // Save for later use
//! fitted.save_to_file("preprocessor.bin")?;
//! ```

pub mod column_transformer;
pub mod encoding;
pub mod error;
pub mod imputation;
pub mod materialize;
pub mod pipeline;
pub mod scaling;
pub mod schema;
pub mod traits;

// Re-export main types
pub use column_transformer::{ColumnTransformer, ColumnTransformerParams, FittedColumnTransformer};
pub use encoding::{FittedOneHotEncoder, HandleUnknown, OneHotEncoder, OneHotEncoderParams};
pub use error::PreprocessingError;
pub use imputation::{
    CategoricalImputeStrategy, CategoricalImputer, CategoricalImputerParams,
    FittedCategoricalImputer, FittedSimpleImputer, ImputeStrategy, SimpleImputer,
    SimpleImputerParams,
};
pub use materialize::{check_shape, materialize, unique_names};
pub use pipeline::{
    CategoricalPipeline, CategoricalPipelineParams, FittedCategoricalPipeline,
    FittedNumericPipeline, NumericPipeline, NumericPipelineParams, PipelineStep,
};
pub use scaling::{
    FittedStandardScaler, StandardScaler, StandardScalerConfig, StandardScalerParams,
};
pub use schema::{infer, FeaturePartition};
pub use traits::{FittedTransformer, Transformer};
