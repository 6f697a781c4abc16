//! Feature scaling transformers.
//!
//! ## StandardScaler
//! Standardizes a numeric column to zero mean and unit variance using
//! statistics learned at fit time.

mod standard;

pub use standard::{
    FittedStandardScaler, StandardScaler, StandardScalerConfig, StandardScalerParams,
};
