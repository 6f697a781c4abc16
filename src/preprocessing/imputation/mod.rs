//! Missing value imputation transformers.
//!
//! | Transformer | Column kind | Strategies |
//! |-------------|-------------|------------|
//! | [`SimpleImputer`] | numeric | mean, median, most_frequent, constant |
//! | [`CategoricalImputer`] | categorical | most_frequent, constant |
//!
//! Missing cells are `None` (numeric `NaN` also counts as missing).

mod simple;

pub use simple::{
    CategoricalImputeStrategy, CategoricalImputer, CategoricalImputerParams,
    FittedCategoricalImputer, FittedSimpleImputer, ImputeStrategy, SimpleImputer,
    SimpleImputerParams,
};
