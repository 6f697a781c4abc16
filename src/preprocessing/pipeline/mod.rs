//! Per-column transformer chains.
//!
//! | Component | Chain |
//! |-----------|-------|
//! | [`NumericPipeline`] | median imputation → standardization |
//! | [`CategoricalPipeline`] | most-frequent imputation → one-hot encoding |

#[allow(clippy::module_inception)]
pub mod pipeline;

pub use pipeline::{
    CategoricalPipeline, CategoricalPipelineParams, FittedCategoricalPipeline,
    FittedNumericPipeline, NumericPipeline, NumericPipelineParams, PipelineStep,
};
