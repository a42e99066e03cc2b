//! Error types surfaced across the predictor interface.

use thiserror::Error;

/// Errors reported when building a predictor from its configuration.
///
/// These are fatal: no predictor value exists after a build fails.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PredictorError {
    #[error("predictor size {0} is not a power of two")]
    InvalidPredictorSize(usize),
}
