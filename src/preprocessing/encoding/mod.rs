//! Categorical feature encoding transformers.
//!
//! # OneHotEncoder
//! Expands a categorical column into one binary indicator column per level
//! observed at fit time.
//!
//! ```ignore
//! // Input:  ["NY", "LA", "NY"]
//! // Output: [[1,0], [0,1], [1,0]]   (levels: NY, LA)
//! ```
//!
//! Levels are compared by their textual form, so a categorical column may
//! hold strings, booleans, or numbers rendered as text.

mod one_hot;

pub use one_hot::{FittedOneHotEncoder, OneHotEncoder, OneHotEncoderParams};

/// Strategy for handling unknown categories during transform.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum HandleUnknown {
    /// Raise an error when unknown categories are encountered.
    Error,
    /// Ignore unknown categories (the row's block is all zeros).
    #[default]
    Ignore,
}
