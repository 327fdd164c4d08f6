use thiserror::Error;

use crate::dataset::Label;

/// Everything that can go wrong while loading data or fitting a fold.
///
/// None of these are retried: each one aborts the current fold (or the load)
/// and leaves the decision of what to do next to the caller.
#[derive(Debug, Error)]
pub enum BayesError {
    #[error("line {line}: {message}")]
    Parse { line: u64, message: String },

    #[error("training fold has no rows labelled {label}")]
    EmptyClass { label: Label },

    #[error("cannot compute a statistic over zero rows")]
    EmptyDataset,

    #[error("shape mismatch: expected {expected} values, got {actual}")]
    ShapeMismatch { expected: usize, actual: usize },

    #[error("invalid value for {name}: {value}")]
    InvalidParameter { name: &'static str, value: String },

    #[error(transparent)]
    Csv(#[from] csv::Error),
}

pub type Result<T> = std::result::Result<T, BayesError>;
